use crate::models::{geometry::GeometryExtent, overlay::OverlayKind};
use crate::traits::{CanvasId, ContainerId, LayerId, MapSurface, TileKey};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Metadata of the decoded raster behind an overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RasterMeta {
    pub width: usize,
    pub height: usize,
    pub pixel_width: f64,
    pub pixel_height: f64,
    /// Normalised reference-system name the overlay was built against.
    pub projection: String,
    pub nodata: Option<f32>,
    /// Extent in the raster's native reference system.
    pub extent: GeometryExtent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedTile {
    pub col: u32,
    pub row: u32,
    /// `[[south, west], [north, east]]`
    pub bounds: [[f64; 2]; 2],
}

/// What a client needs to draw an attached overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPlacement {
    pub layer: LayerId,
    pub kind: OverlayKind,
    pub bounds: [[f64; 2]; 2],
    pub opacity: f32,
    pub tiles: Vec<PlacedTile>,
    pub raster: RasterMeta,
}

struct DisplayHandles {
    container: ContainerId,
    canvas: CanvasId,
    tiles: Vec<TileKey>,
}

/// Screen resources of one decoded raster overlay.
///
/// Released exactly once, either explicitly through [`OverlayResource::release`]
/// or when dropped. Release removes the layer from the map's active set and
/// from its display group, then frees the tile cache entries, canvas and
/// container together.
pub struct OverlayResource {
    id: LayerId,
    kind: OverlayKind,
    meta: RasterMeta,
    bounds: GeometryExtent,
    opacity: f32,
    placed: Vec<PlacedTile>,
    handles: Option<DisplayHandles>,
    surface: Arc<dyn MapSurface>,
}

impl OverlayResource {
    /// Takes ownership of handles already created on `surface`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        surface: Arc<dyn MapSurface>,
        id: LayerId,
        kind: OverlayKind,
        meta: RasterMeta,
        bounds: GeometryExtent,
        opacity: f32,
        container: ContainerId,
        canvas: CanvasId,
    ) -> Self {
        OverlayResource {
            id,
            kind,
            meta,
            bounds,
            opacity,
            placed: Vec::new(),
            handles: Some(DisplayHandles {
                container,
                canvas,
                tiles: Vec::new(),
            }),
            surface,
        }
    }

    pub(crate) fn push_tile(&mut self, key: TileKey, bounds: [[f64; 2]; 2]) {
        if let Some(handles) = self.handles.as_mut() {
            handles.tiles.push(key);
            self.placed.push(PlacedTile {
                col: key.col,
                row: key.row,
                bounds,
            });
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn kind(&self) -> OverlayKind {
        self.kind
    }

    pub fn meta(&self) -> &RasterMeta {
        &self.meta
    }

    /// Lon/lat extent.
    pub fn bounds(&self) -> GeometryExtent {
        self.bounds
    }

    pub fn container(&self) -> Option<ContainerId> {
        self.handles.as_ref().map(|h| h.container)
    }

    pub fn canvas(&self) -> Option<CanvasId> {
        self.handles.as_ref().map(|h| h.canvas)
    }

    pub fn tile_keys(&self) -> Vec<TileKey> {
        self.handles
            .as_ref()
            .map(|h| h.tiles.clone())
            .unwrap_or_default()
    }

    pub fn placement(&self) -> OverlayPlacement {
        OverlayPlacement {
            layer: self.id,
            kind: self.kind,
            bounds: self.bounds.lat_lng_bounds(),
            opacity: self.opacity,
            tiles: self.placed.clone(),
            raster: self.meta.clone(),
        }
    }

    pub fn release(mut self) {
        self.release_handles();
    }

    fn release_handles(&mut self) {
        let Some(handles) = self.handles.take() else {
            return;
        };
        self.surface.remove_from_map(self.id);
        self.surface.remove_from_group(self.kind, self.id);
        for key in &handles.tiles {
            self.surface.evict_tile(key);
        }
        self.surface.destroy_canvas(handles.canvas);
        self.surface.destroy_container(handles.container);
        self.surface.invalidate();
        self.placed.clear();
        debug!(
            layer = self.id.0,
            kind = %self.kind,
            tiles = handles.tiles.len(),
            "released overlay"
        );
    }
}

impl Drop for OverlayResource {
    fn drop(&mut self) {
        self.release_handles();
    }
}

impl fmt::Debug for OverlayResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayResource")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("meta", &self.meta)
            .field("released", &self.handles.is_none())
            .finish()
    }
}
