pub mod fire;
pub mod geometry;
pub mod overlay;
pub mod scenario;
pub mod style;
