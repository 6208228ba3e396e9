use crate::error::LoadError;
use crate::models::geometry::GeometryExtent;
use crate::reader::crs::{SpatialReference, USER_DEFINED_CODE};
use gdal::Dataset;
use gdal::spatial_ref::SpatialRef;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::task;
use tracing::warn;

static MEM_FILE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Band 1 of a decoded GeoTIFF plus its georeferencing.
#[derive(Debug, Clone)]
pub struct RasterGrid {
    pub width: usize,
    pub height: usize,
    pub geo_transform: [f64; 6],
    /// Row-major from the top-left cell.
    pub values: Vec<f32>,
    pub nodata: Option<f32>,
    pub spatial_ref: SpatialReference,
    /// PROJ definition carried by the raster when it has no authority code.
    pub definition: Option<String>,
}

impl RasterGrid {
    pub fn pixel_width(&self) -> f64 {
        self.geo_transform[1].abs()
    }

    pub fn pixel_height(&self) -> f64 {
        self.geo_transform[5].abs()
    }

    pub fn extent(&self) -> GeometryExtent {
        GeometryExtent::from_geo_transform(&self.geo_transform, self.width, self.height)
    }

    pub fn value(&self, col: usize, row: usize) -> Option<f32> {
        (col < self.width && row < self.height).then(|| self.values[row * self.width + col])
    }
}

/// Decodes GeoTIFF bytes through GDAL's in-memory filesystem.
pub async fn decode_geotiff(bytes: Vec<u8>) -> Result<RasterGrid, LoadError> {
    task::spawn_blocking(move || {
        let seq = MEM_FILE_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = format!("/vsimem/firelens-{}.tif", seq);
        gdal::vsi::create_mem_file(&path, bytes).map_err(decode_failed)?;
        let grid = read_grid(&path);
        release_mem_file(&path);
        grid
    })
    .await
    .map_err(|e| LoadError::DecodeFailed(e.to_string()))?
}

/// Unlinks an in-memory GDAL file. Returns whether it was removed.
fn release_mem_file(path: &str) -> bool {
    match gdal::vsi::unlink_mem_file(path) {
        Ok(()) => true,
        Err(e) => {
            warn!(path, error = %e, "failed to release in-memory raster");
            false
        }
    }
}

fn decode_failed(err: impl ToString) -> LoadError {
    LoadError::DecodeFailed(err.to_string())
}

fn read_grid(path: &str) -> Result<RasterGrid, LoadError> {
    let ds = Dataset::open(path).map_err(decode_failed)?;
    let (width, height) = ds.raster_size();
    if width == 0 || height == 0 {
        return Err(LoadError::DecodeFailed("raster has no cells".to_string()));
    }
    let geo_transform = ds.geo_transform().map_err(decode_failed)?;

    let band = ds.rasterband(1).map_err(decode_failed)?;
    let nodata = band.no_data_value().map(|v| v as f32);
    let values: Vec<f32> = band
        .read_as::<f32>((0, 0), (width, height), (width, height), None)
        .map_err(decode_failed)?
        .data()
        .to_vec();

    let (spatial_ref, definition) = match ds.spatial_ref() {
        Ok(sref) => describe(&sref)?,
        Err(e) => return Err(decode_failed(format!("missing spatial reference: {}", e))),
    };

    Ok(RasterGrid {
        width,
        height,
        geo_transform,
        values,
        nodata,
        spatial_ref,
        definition,
    })
}

/// EPSG codes map to `Code`, other authorities to `Named("AUTH:code")`,
/// anything else to the user-defined code with its PROJ definition.
fn describe(sref: &SpatialRef) -> Result<(SpatialReference, Option<String>), LoadError> {
    if let Ok(authority) = sref.authority() {
        if let Some((name, code)) = authority.split_once(':') {
            if name.eq_ignore_ascii_case("EPSG") {
                if let Ok(code) = code.parse::<i32>() {
                    return Ok((SpatialReference::Code(code), None));
                }
            }
            return Ok((SpatialReference::Named(authority.clone()), None));
        }
    }
    let definition = sref.to_proj4().map_err(decode_failed)?;
    Ok((
        SpatialReference::Code(USER_DEFINED_CODE),
        Some(format!("{} +type=crs", definition.trim())),
    ))
}
