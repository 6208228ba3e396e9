pub mod backend;
pub mod surface;

pub use backend::{Backend, RasterFetch};
pub use surface::{CanvasId, ContainerId, LayerId, MapSurface, MarkerShape, TileKey};
