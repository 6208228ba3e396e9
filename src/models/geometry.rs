use serde::Serialize;

/// Axis-aligned extent in whatever CRS the owner declares.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeometryExtent {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl From<(f64, f64, f64, f64)> for GeometryExtent {
    fn from(extent: (f64, f64, f64, f64)) -> Self {
        GeometryExtent {
            minx: extent.0,
            miny: extent.1,
            maxx: extent.2,
            maxy: extent.3,
        }
    }
}

impl GeometryExtent {
    /// Extent of a north-up raster from its GDAL geo-transform.
    pub fn from_geo_transform(gt: &[f64; 6], width: usize, height: usize) -> Self {
        let x0 = gt[0];
        let y0 = gt[3];
        let x1 = gt[0] + gt[1] * width as f64;
        let y1 = gt[3] + gt[5] * height as f64;
        GeometryExtent {
            minx: x0.min(x1),
            miny: y0.min(y1),
            maxx: x0.max(x1),
            maxy: y0.max(y1),
        }
    }

    /// Sub-extent covering pixel window `[col0, col1) x [row0, row1)` of a
    /// `width` x `height` grid spanning this extent, rows counted from the top.
    pub fn window(
        &self,
        (width, height): (u32, u32),
        (col0, row0): (u32, u32),
        (col1, row1): (u32, u32),
    ) -> Self {
        let dx = (self.maxx - self.minx) / width as f64;
        let dy = (self.maxy - self.miny) / height as f64;
        GeometryExtent {
            minx: self.minx + col0 as f64 * dx,
            maxx: self.minx + col1 as f64 * dx,
            maxy: self.maxy - row0 as f64 * dy,
            miny: self.maxy - row1 as f64 * dy,
        }
    }

    /// Leaflet-style `[[south, west], [north, east]]` for lon/lat extents.
    pub fn lat_lng_bounds(&self) -> [[f64; 2]; 2] {
        [[self.miny, self.minx], [self.maxy, self.maxx]]
    }
}
