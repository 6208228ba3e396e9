use crate::display::{OverlayResource, RasterMeta};
use crate::error::LoadError;
use crate::models::{geometry::GeometryExtent, overlay::OverlayKind};
use crate::reader::crs::{CrsRegistry, ExtentProjector};
use crate::reader::raster::{RasterGrid, decode_geotiff};
use crate::traits::{Backend, MapSurface, RasterFetch, TileKey};
use crate::utils::style::{cut_tiles, encode_png, paint_canvas};
use image::RgbaImage;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::{task, time};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct LoaderSettings {
    pub tile_size: u32,
    pub opacity: f32,
    pub timeout: Duration,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        LoaderSettings {
            tile_size: 256,
            opacity: 0.7,
            timeout: Duration::from_secs(30),
        }
    }
}

struct RenderedTile {
    col: u32,
    row: u32,
    png: Vec<u8>,
    bounds: [[f64; 2]; 2],
}

struct Rendered {
    meta: RasterMeta,
    bounds: GeometryExtent,
    canvas: RgbaImage,
    tiles: Vec<RenderedTile>,
}

/// Fetches, decodes and renders one overlay kind for one fire.
///
/// Display handles are created only once every fallible step has
/// succeeded, so a failed load leaves nothing behind on the surface.
pub struct OverlayLoader {
    backend: Arc<dyn Backend>,
    surface: Arc<dyn MapSurface>,
    crs: Mutex<CrsRegistry>,
    settings: LoaderSettings,
}

impl OverlayLoader {
    pub fn new(
        backend: Arc<dyn Backend>,
        surface: Arc<dyn MapSurface>,
        settings: LoaderSettings,
    ) -> Self {
        OverlayLoader {
            backend,
            surface,
            crs: Mutex::new(CrsRegistry::with_mtbs_aliases()),
            settings,
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.registry().is_defined(name)
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, CrsRegistry> {
        self.crs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn load(
        &self,
        kind: OverlayKind,
        fire_id: &str,
    ) -> Result<OverlayResource, LoadError> {
        info!(kind = %kind, fire = fire_id, "loading overlay");
        let bytes = self.fetch(kind, fire_id).await?;

        let grid = decode_geotiff(bytes).await.inspect_err(|e| {
            warn!(kind = %kind, fire = fire_id, error = %e, "overlay decode failed");
        })?;

        let needed = tile_count(grid.width, grid.height, self.settings.tile_size);
        let capacity = self.surface.tile_capacity();
        if needed > capacity {
            warn!(
                kind = %kind,
                fire = fire_id,
                tiles = needed,
                capacity,
                "overlay does not fit the tile cache"
            );
            return Err(LoadError::DecodeFailed(format!(
                "overlay needs {} tiles, the tile cache holds {}",
                needed, capacity
            )));
        }

        let name = grid.spatial_ref.normalized();
        let definition = self.declare(&name, &grid);
        let tile_size = self.settings.tile_size;
        let rendered = task::spawn_blocking(move || render(grid, kind, name, &definition, tile_size))
            .await
            .map_err(|e| LoadError::DecodeFailed(e.to_string()))?
            .inspect_err(|e| {
                warn!(kind = %kind, fire = fire_id, error = %e, "overlay render failed");
            })?;

        let resource = self.attach_handles(kind, rendered);
        info!(
            kind = %kind,
            fire = fire_id,
            layer = resource.id().0,
            tiles = resource.tile_keys().len(),
            "overlay ready"
        );
        Ok(resource)
    }

    async fn fetch(&self, kind: OverlayKind, fire_id: &str) -> Result<Vec<u8>, LoadError> {
        match time::timeout(self.settings.timeout, self.backend.raster(kind, fire_id)).await {
            Ok(Ok(RasterFetch::Payload(bytes))) => Ok(bytes),
            Ok(Ok(RasterFetch::Missing(status))) => {
                info!(kind = %kind, fire = fire_id, status, "no raster available");
                Err(LoadError::Unavailable)
            }
            Ok(Err(e)) => {
                warn!(kind = %kind, fire = fire_id, error = %e, "raster request failed");
                Err(LoadError::Unavailable)
            }
            Err(_) => {
                warn!(
                    kind = %kind,
                    fire = fire_id,
                    timeout_secs = self.settings.timeout.as_secs_f64(),
                    "raster request timed out"
                );
                Err(LoadError::Unavailable)
            }
        }
    }

    /// Declares the raster's own definition under its name if the name is
    /// free, then resolves the name to a PROJ input.
    fn declare(&self, name: &str, grid: &RasterGrid) -> String {
        let mut registry = self.registry();
        if let Some(definition) = grid.definition.as_deref() {
            if registry.define(name, definition) {
                debug!(name, definition, "declared projection");
            }
        }
        registry.resolve(name)
    }

    fn attach_handles(&self, kind: OverlayKind, rendered: Rendered) -> OverlayResource {
        let surface = &self.surface;
        let id = surface.next_layer_id();
        let container = surface.create_container(id, self.settings.opacity);
        let canvas = surface.create_canvas(container, rendered.canvas);
        let mut resource = OverlayResource::new(
            surface.clone(),
            id,
            kind,
            rendered.meta,
            rendered.bounds,
            self.settings.opacity,
            container,
            canvas,
        );
        for tile in rendered.tiles {
            let key = TileKey {
                layer: id,
                col: tile.col,
                row: tile.row,
            };
            surface.cache_tile(key, tile.png);
            resource.push_tile(key, tile.bounds);
        }
        resource
    }
}

/// Tiles `cut_tiles` produces for a `width` x `height` canvas.
fn tile_count(width: usize, height: usize, tile_size: u32) -> u64 {
    let size = tile_size.max(1) as u64;
    (width as u64).div_ceil(size) * (height as u64).div_ceil(size)
}

fn render(
    grid: RasterGrid,
    kind: OverlayKind,
    projection: String,
    definition: &str,
    tile_size: u32,
) -> Result<Rendered, LoadError> {
    let projector = ExtentProjector::new(definition).map_err(LoadError::DecodeFailed)?;
    let extent = grid.extent();
    let bounds = projector.extent(&extent).map_err(LoadError::DecodeFailed)?;

    let canvas = paint_canvas(&grid, &kind.profile().colour_table);
    let dimensions = canvas.dimensions();
    let mut tiles = Vec::new();
    for tile in cut_tiles(&canvas, tile_size) {
        let png = encode_png(&tile.image).map_err(LoadError::DecodeFailed)?;
        let window = extent.window(dimensions, tile.origin, tile.end);
        let tile_bounds = projector
            .extent(&window)
            .map_err(LoadError::DecodeFailed)?;
        tiles.push(RenderedTile {
            col: tile.col,
            row: tile.row,
            png,
            bounds: tile_bounds.lat_lng_bounds(),
        });
    }

    Ok(Rendered {
        meta: RasterMeta {
            width: grid.width,
            height: grid.height,
            pixel_width: grid.pixel_width(),
            pixel_height: grid.pixel_height(),
            projection,
            nodata: grid.nodata,
            extent,
        },
        bounds,
        canvas,
        tiles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MemoryMap;
    use crate::error::BackendError;
    use crate::models::fire::{Fire, FireFilter};
    use crate::models::scenario::{Scenario, ScenarioState};
    use crate::reader::raster::fixtures::{epsg, geotiff_bytes};
    use async_trait::async_trait;
    use gdal::spatial_ref::SpatialRef;

    enum Reply {
        Bytes(Vec<u8>),
        Status(u16),
        Fail,
        Hang,
    }

    struct StaticBackend(Reply);

    #[async_trait]
    impl Backend for StaticBackend {
        async fn fires(&self, _: &FireFilter) -> Result<Vec<Fire>, BackendError> {
            Ok(Vec::new())
        }

        async fn scenario(&self, _: &ScenarioState) -> Result<Scenario, BackendError> {
            Ok(Scenario::default())
        }

        async fn raster(&self, _: OverlayKind, _: &str) -> Result<RasterFetch, BackendError> {
            match &self.0 {
                Reply::Bytes(bytes) => Ok(RasterFetch::Payload(bytes.clone())),
                Reply::Status(status) => Ok(RasterFetch::Missing(*status)),
                Reply::Fail => Err(BackendError::Request("connection refused".into())),
                Reply::Hang => {
                    time::sleep(Duration::from_secs(60)).await;
                    Err(BackendError::Status(504))
                }
            }
        }

        async fn ask(&self, _: &str, _: &str) -> Result<String, BackendError> {
            Ok(String::new())
        }
    }

    fn loader(reply: Reply, settings: LoaderSettings) -> (Arc<MemoryMap>, OverlayLoader) {
        let map = Arc::new(MemoryMap::new(64));
        let loader = OverlayLoader::new(Arc::new(StaticBackend(reply)), map.clone(), settings);
        (map, loader)
    }

    fn burn_severity_tiff() -> Vec<u8> {
        let data: Vec<f32> = (0..300 * 20).map(|i| (i % 6) as f32).collect();
        geotiff_bytes(
            300,
            20,
            &epsg(4326),
            [-121.8, 0.001, 0.0, 39.9, 0.0, -0.001],
            data,
            Some(255.0),
        )
    }

    #[tokio::test]
    async fn test_load_renders_tiles_and_places_extent() {
        let (map, loader) = loader(
            Reply::Bytes(burn_severity_tiff()),
            LoaderSettings::default(),
        );

        let resource = loader.load(OverlayKind::BurnSeverity, "camp-fire-2018").await.unwrap();

        assert_eq!(resource.meta().width, 300);
        assert_eq!(resource.meta().projection, "4326");
        let keys = resource.tile_keys();
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|k| map.tile(k).is_some()));
        let container = resource.container().unwrap();
        assert_eq!(map.container_opacity(container), Some(0.7));
        assert_eq!(map.canvas_size(resource.canvas().unwrap()), Some((300, 20)));

        let placement = resource.placement();
        assert!((placement.bounds[0][1] + 121.8).abs() < 1e-9);
        assert!((placement.bounds[1][0] - 39.9).abs() < 1e-9);
        // not attached until the registry adds it
        assert!(!map.is_active(resource.id()));
    }

    #[tokio::test]
    async fn test_missing_raster_is_unavailable_without_handles() {
        let (map, loader) = loader(Reply::Status(404), LoaderSettings::default());
        let result = loader.load(OverlayKind::ReburnRisk, "x").await;
        assert_eq!(result.unwrap_err(), LoadError::Unavailable);
        assert_eq!(map.container_count(), 0);
        assert_eq!(map.canvas_count(), 0);
    }

    #[tokio::test]
    async fn test_network_failure_is_unavailable() {
        let (_, loader) = loader(Reply::Fail, LoaderSettings::default());
        let result = loader.load(OverlayKind::BestNextSteps, "x").await;
        assert_eq!(result.unwrap_err(), LoadError::Unavailable);
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let settings = LoaderSettings {
            timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let (_, loader) = loader(Reply::Hang, settings);
        let result = loader.load(OverlayKind::BurnSeverity, "x").await;
        assert_eq!(result.unwrap_err(), LoadError::Unavailable);
    }

    #[tokio::test]
    async fn test_undecodable_payload_leaves_nothing_behind() {
        let (map, loader) = loader(
            Reply::Bytes(b"<html>gateway error</html>".to_vec()),
            LoaderSettings::default(),
        );
        let result = loader.load(OverlayKind::BurnSeverity, "x").await;
        assert!(matches!(result, Err(LoadError::DecodeFailed(_))));
        assert_eq!(map.container_count(), 0);
        assert!(map.active_layers().is_empty());
    }

    #[tokio::test]
    async fn test_overlay_larger_than_tile_cache_is_rejected() {
        let map = Arc::new(MemoryMap::new(1));
        let backend = Arc::new(StaticBackend(Reply::Bytes(burn_severity_tiff())));
        let loader = OverlayLoader::new(backend, map.clone(), LoaderSettings::default());
        assert_eq!(map.tile_capacity(), 1);

        let result = loader.load(OverlayKind::BurnSeverity, "camp-fire-2018").await;

        assert!(matches!(result, Err(LoadError::DecodeFailed(_))));
        assert_eq!(map.container_count(), 0);
        assert_eq!(map.canvas_count(), 0);
    }

    #[test]
    fn test_tile_count_matches_cut_grid() {
        assert_eq!(tile_count(300, 20, 256), 2);
        assert_eq!(tile_count(512, 512, 256), 4);
        assert_eq!(tile_count(513, 1, 256), 3);
    }

    #[tokio::test]
    async fn test_user_defined_albers_uses_registered_definition() {
        let sref = SpatialRef::from_proj4(
            "+proj=aea +lat_1=29.5 +lat_2=45.5 +lat_0=23.0 +lon_0=-96.0 \
             +x_0=0 +y_0=0 +datum=NAD83 +units=m +no_defs",
        )
        .unwrap();
        let bytes = geotiff_bytes(
            2,
            2,
            &sref,
            [-30.0, 30.0, 0.0, 30.0, 0.0, -30.0],
            vec![1.0, 2.0, 3.0, 4.0],
            None,
        );
        let (_, loader) = loader(Reply::Bytes(bytes), LoaderSettings::default());

        let resource = loader.load(OverlayKind::BurnSeverity, "x").await.unwrap();

        let bounds = resource.bounds();
        assert!(bounds.minx < -96.0 && bounds.maxx > -96.0);
        assert!(bounds.miny < 23.0 && bounds.maxy > 23.0);
        assert!(loader.is_declared("32767"));
    }
}
