use crate::models::geometry::GeometryExtent;
use proj::Proj;
use serde::Serialize;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;

/// EPSG's user-defined code, used when a raster carries only a definition.
pub const USER_DEFINED_CODE: i32 = 32767;

pub const MTBS_ALBERS: &str = "+proj=aea +lat_1=29.5 +lat_2=45.5 +lat_0=23.0 +lon_0=-96.0 \
     +x_0=0 +y_0=0 +datum=NAD83 +units=m +no_defs +type=crs";

const MTBS_ALIASES: [&str; 5] = [
    "32767",
    "EPSG:32767",
    "EPSG:5070",
    "ESRI:102003",
    "MTBS_ALBERS",
];

const R_MAJOR: f64 = 6378137.0;

/// Spatial reference as reported by the decoder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SpatialReference {
    Code(i32),
    Named(String),
}

impl SpatialReference {
    /// Registry key: numeric codes become their string form.
    pub fn normalized(&self) -> String {
        match self {
            SpatialReference::Code(code) => code.to_string(),
            SpatialReference::Named(name) => name.clone(),
        }
    }
}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized())
    }
}

/// Name to PROJ definition lookup shared by every overlay load.
#[derive(Debug, Clone, Default)]
pub struct CrsRegistry {
    definitions: HashMap<String, String>,
}

impl CrsRegistry {
    /// Registry with the MTBS Albers equal-area aliases declared.
    pub fn with_mtbs_aliases() -> Self {
        let mut registry = CrsRegistry::default();
        for alias in MTBS_ALIASES {
            registry.define(alias, MTBS_ALBERS);
        }
        registry
    }

    /// Declares `name` unless it is already known. Returns whether it was added.
    pub fn define(&mut self, name: &str, definition: &str) -> bool {
        if self.definitions.contains_key(name) {
            return false;
        }
        self.definitions
            .insert(name.to_string(), definition.to_string());
        true
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// PROJ input for `name`: a declared definition, else `EPSG:<code>`
    /// for bare or EPSG-prefixed numeric codes, else the name itself.
    pub fn resolve(&self, name: &str) -> String {
        if let Some(definition) = self.definitions.get(name) {
            return definition.clone();
        }
        let code = name.strip_prefix("EPSG:").unwrap_or(name);
        match code.parse::<i32>() {
            Ok(code) => format!("EPSG:{}", code),
            Err(_) => name.to_string(),
        }
    }
}

/// from Web Mercator (x, y in meters) → longitude, latitude (degrees)
pub fn mercator_to_lon_lat(x: f64, y: f64) -> (f64, f64) {
    let lon = x / (R_MAJOR * PI / 180.0);
    let lat_rad = 2.0 * ((y / R_MAJOR).exp().atan()) - PI / 2.0;
    let lat = lat_rad * 180.0 / PI;
    (lon, lat)
}

/// Converts native extents to lon/lat for display placement.
pub enum ExtentProjector {
    Identity,
    Mercator,
    Proj(Proj),
}

impl ExtentProjector {
    /// Projector from `definition`, as returned by [`CrsRegistry::resolve`],
    /// to lon/lat.
    pub fn new(definition: &str) -> Result<Self, String> {
        match definition {
            "EPSG:4326" => Ok(ExtentProjector::Identity),
            "EPSG:3857" => Ok(ExtentProjector::Mercator),
            _ => Proj::new_known_crs(definition, "EPSG:4326", None)
                .map(ExtentProjector::Proj)
                .map_err(|e| format!("unsupported projection '{}': {}", definition, e)),
        }
    }

    pub fn point(&self, x: f64, y: f64) -> Result<(f64, f64), String> {
        match self {
            ExtentProjector::Identity => Ok((x, y)),
            ExtentProjector::Mercator => Ok(mercator_to_lon_lat(x, y)),
            ExtentProjector::Proj(proj) => proj
                .convert((x, y))
                .map_err(|e| format!("projection failed: {}", e)),
        }
    }

    /// Bounding box of the four projected corners.
    pub fn extent(&self, extent: &GeometryExtent) -> Result<GeometryExtent, String> {
        let corners = [
            (extent.minx, extent.miny),
            (extent.minx, extent.maxy),
            (extent.maxx, extent.miny),
            (extent.maxx, extent.maxy),
        ];
        let mut out = GeometryExtent::from((
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        ));
        for (x, y) in corners {
            let (lon, lat) = self.point(x, y)?;
            out.minx = out.minx.min(lon);
            out.miny = out.miny.min(lat);
            out.maxx = out.maxx.max(lon);
            out.maxy = out.maxy.max(lat);
        }
        Ok(out)
    }
}
