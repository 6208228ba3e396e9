use crate::models::fire::{DEFAULT_FIRE_ID, Fire};
use crate::models::overlay::OverlayKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index of the stage shown when nothing else is requested.
pub const DEFAULT_STAGE: usize = 2;

// (label, description, days from ignition)
const STAGES: [(&str, &str, i32); 5] = [
    ("Pre-fire baseline", "Vegetation health before ignition", -30),
    (
        "Active response (Day 0)",
        "Fire perimeter with live suppression actions",
        0,
    ),
    (
        "Initial assessment (Day 7)",
        "First MTBS-inspired burn severity mapping",
        7,
    ),
    (
        "Stabilization phase (Day 30)",
        "Treatment crews in the field; erosion control active",
        30,
    ),
    (
        "Recovery outlook (Year 1)",
        "Predicted vegetation recovery and infrastructure repairs",
        365,
    ),
];

pub const STAGE_COUNT: usize = STAGES.len();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStage {
    pub value: usize,
    pub label: String,
    pub description: String,
    #[serde(default, alias = "days_from_ignition")]
    pub days_from_ignition: i32,
}

impl TimelineStage {
    /// Out-of-range indices resolve to the initial assessment stage.
    pub fn at(index: usize) -> Self {
        let value = if index < STAGE_COUNT {
            index
        } else {
            DEFAULT_STAGE
        };
        let (label, description, days) = STAGES[value];
        TimelineStage {
            value,
            label: label.to_string(),
            description: description.to_string(),
            days_from_ignition: days,
        }
    }

    pub fn all() -> Vec<Self> {
        (0..STAGE_COUNT).map(Self::at).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PriorityKey {
    Community,
    Watershed,
    Infrastructure,
}

impl PriorityKey {
    pub const ALL: [PriorityKey; 3] = [
        PriorityKey::Community,
        PriorityKey::Watershed,
        PriorityKey::Infrastructure,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PriorityKey::Community => "Community safety",
            PriorityKey::Watershed => "Watershed health",
            PriorityKey::Infrastructure => "Infrastructure readiness",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            PriorityKey::Community => "Focus on structures and evacuation corridors.",
            PriorityKey::Watershed => "Stabilize slopes and drinking water sources.",
            PriorityKey::Infrastructure => "Keep roads, utilities, and communications online.",
        }
    }
}

/// The three 0-100 weightings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priorities {
    pub community: u8,
    pub watershed: u8,
    pub infrastructure: u8,
}

impl Default for Priorities {
    fn default() -> Self {
        Priorities {
            community: 70,
            watershed: 55,
            infrastructure: 60,
        }
    }
}

impl Priorities {
    pub fn get(&self, key: PriorityKey) -> u8 {
        match key {
            PriorityKey::Community => self.community,
            PriorityKey::Watershed => self.watershed,
            PriorityKey::Infrastructure => self.infrastructure,
        }
    }

    pub fn set(&mut self, key: PriorityKey, value: u8) {
        let value = value.min(100);
        match key {
            PriorityKey::Community => self.community = value,
            PriorityKey::Watershed => self.watershed = value,
            PriorityKey::Infrastructure => self.infrastructure = value,
        }
    }

    /// Highest weighting; ties go to the earlier key.
    pub fn top(&self) -> PriorityKey {
        PriorityKey::ALL
            .into_iter()
            .fold(PriorityKey::Community, |best, key| {
                if self.get(key) > self.get(best) {
                    key
                } else {
                    best
                }
            })
    }
}

/// Mutable session state read by the scenario request builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioState {
    pub fire_id: String,
    timeline: usize,
    pub priorities: Priorities,
}

impl Default for ScenarioState {
    fn default() -> Self {
        ScenarioState {
            fire_id: DEFAULT_FIRE_ID.to_string(),
            timeline: DEFAULT_STAGE,
            priorities: Priorities::default(),
        }
    }
}

impl ScenarioState {
    pub fn new(fire_id: impl Into<String>) -> Self {
        ScenarioState {
            fire_id: fire_id.into(),
            ..Default::default()
        }
    }

    pub fn timeline(&self) -> usize {
        self.timeline
    }

    pub fn set_timeline(&mut self, index: usize) {
        self.timeline = index.min(STAGE_COUNT - 1);
    }

    pub fn stage(&self) -> TimelineStage {
        TimelineStage::at(self.timeline)
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("fireId", self.fire_id.clone()),
            ("timeline", self.timeline.to_string()),
            ("priorityCommunity", self.priorities.community.to_string()),
            ("priorityWatershed", self.priorities.watershed.to_string()),
            (
                "priorityInfrastructure",
                self.priorities.infrastructure.to_string(),
            ),
        ]
    }
}

/// Simple shape drawn when no raster is available for a kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FallbackFeature {
    /// `[lat, lng]`
    #[serde(default)]
    pub coords: Option<[f64; 2]>,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub intensity: Option<f64>,
}

pub type ScenarioLayers = BTreeMap<OverlayKind, Vec<FallbackFeature>>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hotspot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub coords: Option<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrioritySummary {
    pub label: String,
    pub score: f64,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub category: String,
    pub title: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reburn_risk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incidents: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acres: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Body of `GET /api/scenario`, or its locally generated stand-in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub fire: Option<Fire>,
    #[serde(default)]
    pub timeline: Option<TimelineStage>,
    #[serde(default)]
    pub layers: ScenarioLayers,
    #[serde(default)]
    pub markers: Vec<Hotspot>,
    #[serde(default)]
    pub priorities: Vec<PrioritySummary>,
    #[serde(default)]
    pub insights: Vec<Insight>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub stats: ScenarioStats,
    #[serde(default)]
    pub map_tip: Option<String>,
}
