pub mod crs;
pub mod http;
pub mod raster;

pub use crs::{CrsRegistry, SpatialReference};
pub use http::HttpBackend;
pub use raster::{RasterGrid, decode_geotiff};
