use crate::models::style::{
    BEST_NEXT_STEPS_LEGEND, BEST_NEXT_STEPS_STOPS, BURN_SEVERITY_LEGEND, BURN_SEVERITY_STOPS,
    ColourTable, LegendItem, REBURN_RISK_LEGEND, REBURN_RISK_STOPS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three mutually exclusive analysis overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayKind {
    BurnSeverity,
    ReburnRisk,
    BestNextSteps,
}

/// Per-kind configuration record for the overlay pipeline.
#[derive(Debug)]
pub struct OverlayProfile {
    /// Path segment under `/api/` serving the GeoTIFF.
    pub path: &'static str,
    pub title: &'static str,
    pub colour_table: ColourTable,
    pub legend: &'static [LegendItem],
    /// Colour used for locally generated fallback features.
    pub fallback_colour: &'static str,
}

static BURN_SEVERITY: OverlayProfile = OverlayProfile {
    path: "burn-severity",
    title: "Burn Severity",
    colour_table: ColourTable(BURN_SEVERITY_STOPS),
    legend: BURN_SEVERITY_LEGEND,
    fallback_colour: "#ff4e1f",
};

static REBURN_RISK: OverlayProfile = OverlayProfile {
    path: "reburn-risk",
    title: "Reburn Risk",
    colour_table: ColourTable(REBURN_RISK_STOPS),
    legend: REBURN_RISK_LEGEND,
    fallback_colour: "#ff6b35",
};

static BEST_NEXT_STEPS: OverlayProfile = OverlayProfile {
    path: "best-next-steps",
    title: "Best Next Steps",
    colour_table: ColourTable(BEST_NEXT_STEPS_STOPS),
    legend: BEST_NEXT_STEPS_LEGEND,
    fallback_colour: "#4ecdc4",
};

impl OverlayKind {
    pub const ALL: [OverlayKind; 3] = [
        OverlayKind::BurnSeverity,
        OverlayKind::ReburnRisk,
        OverlayKind::BestNextSteps,
    ];

    pub fn key(self) -> &'static str {
        match self {
            OverlayKind::BurnSeverity => "burnSeverity",
            OverlayKind::ReburnRisk => "reburnRisk",
            OverlayKind::BestNextSteps => "bestNextSteps",
        }
    }

    pub fn profile(self) -> &'static OverlayProfile {
        match self {
            OverlayKind::BurnSeverity => &BURN_SEVERITY,
            OverlayKind::ReburnRisk => &REBURN_RISK,
            OverlayKind::BestNextSteps => &BEST_NEXT_STEPS,
        }
    }

    /// Backend path of the raster for `fire_id`.
    pub fn raster_path(self, fire_id: &str) -> String {
        format!("/api/{}/{}.tif", self.profile().path, fire_id)
    }

    pub fn others(self) -> impl Iterator<Item = OverlayKind> {
        Self::ALL.into_iter().filter(move |k| *k != self)
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for OverlayKind {
    type Err = String;

    /// Accepts either the camelCase key or the backend path segment.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OverlayKind::ALL
            .into_iter()
            .find(|k| k.key().eq_ignore_ascii_case(s) || k.profile().path == s)
            .ok_or_else(|| format!("Unknown overlay kind: '{}'", s))
    }
}
