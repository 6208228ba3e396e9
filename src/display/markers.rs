use crate::models::scenario::FallbackFeature;
use crate::traits::MarkerShape;
use colorgrad::Color;

pub const DEFAULT_RADIUS_M: f64 = 12_000.0;
pub const DEFAULT_COLOUR: &str = "#ff6a00";
const DEFAULT_INTENSITY: f64 = 0.3;
const STROKE_WEIGHT: f32 = 1.1;

/// Parses a CSS colour, falling back to the default marker orange.
pub fn parse_colour(colour: Option<&str>) -> [u8; 4] {
    colour
        .and_then(|c| Color::from_html(c).ok())
        .or_else(|| Color::from_html(DEFAULT_COLOUR).ok())
        .map(|c| c.to_rgba8())
        .unwrap_or([255, 106, 0, 255])
}

/// Circles drawn in place of an unavailable raster. Features without
/// coordinates are skipped.
pub fn fallback_markers(features: &[FallbackFeature]) -> Vec<MarkerShape> {
    features
        .iter()
        .filter_map(|feature| {
            let center = feature.coords?;
            let [r, g, b, _] = parse_colour(feature.color.as_deref());
            let intensity = feature.intensity.unwrap_or(DEFAULT_INTENSITY).clamp(0.0, 1.0);
            let fill_alpha = ((0.15 + intensity * 0.35) * 255.0).round() as u8;
            Some(MarkerShape {
                center,
                radius_m: feature.radius.unwrap_or(DEFAULT_RADIUS_M),
                stroke: [r, g, b, 255],
                fill: [r, g, b, fill_alpha],
                weight: STROKE_WEIGHT,
            })
        })
        .collect()
}
