use crate::models::fire::{Fire, fallback_fires};
use crate::models::overlay::OverlayKind;
use crate::models::scenario::{
    FallbackFeature, Hotspot, Insight, PriorityKey, PrioritySummary, Scenario, ScenarioLayers,
    ScenarioState, ScenarioStats, TimelineStage,
};
use rand::Rng;

const FEATURES_PER_KIND: usize = 2;
const HOTSPOTS: usize = 3;

fn jitter(rng: &mut impl Rng, value: f64, delta: f64) -> f64 {
    value + (rng.random::<f64>() * 2.0 - 1.0) * delta
}

fn jittered(rng: &mut impl Rng, fire: &Fire, delta: f64) -> Option<[f64; 2]> {
    fire.position()
        .map(|(lat, lng)| [jitter(rng, lat, delta), jitter(rng, lng, delta)])
}

/// Stand-in scenario for when the backend cannot be reached.
pub fn build_mock_scenario(
    state: &ScenarioState,
    catalog: &[Fire],
    rng: &mut impl Rng,
) -> Scenario {
    let fire = catalog
        .iter()
        .find(|f| f.id == state.fire_id)
        .cloned()
        .or_else(|| fallback_fires().into_iter().next())
        .unwrap_or_default();
    let timeline = state.stage();

    let mut layers = ScenarioLayers::new();
    for kind in OverlayKind::ALL {
        let features = (0..FEATURES_PER_KIND)
            .map(|_| FallbackFeature {
                coords: jittered(rng, &fire, 0.25),
                radius: Some(10_000.0 + rng.random::<f64>() * 12_000.0),
                color: Some(kind.profile().fallback_colour.to_string()),
                intensity: Some((0.55 + rng.random::<f64>() * 0.35).clamp(0.2, 1.0)),
            })
            .collect();
        layers.insert(kind, features);
    }

    let markers = (0..HOTSPOTS)
        .map(|idx| Hotspot {
            id: None,
            title: Some(format!("Sector {}", idx + 1)),
            details: Some("Model hotspot preview based on MTBS-style segmentation.".to_string()),
            coords: jittered(rng, &fire, 0.3),
        })
        .collect();

    let priorities = PriorityKey::ALL
        .into_iter()
        .map(|key| PrioritySummary {
            label: key.label().to_string(),
            score: state.priorities.get(key) as f64,
            summary: key.summary().to_string(),
        })
        .collect();

    let area = fire.region.clone().unwrap_or_else(|| fire.state.clone());
    let stats = ScenarioStats {
        confidence: Some(0.9),
        incidents: Some(6),
        updated: Some(format!(
            "{} · Updated {} mins ago",
            area,
            rng.random_range(10..70)
        )),
        acres: Some(fire.acres),
        ..Default::default()
    };

    Scenario {
        insights: insights(&fire, &timeline),
        next_steps: next_steps(&fire, state.priorities.top(), &timeline),
        map_tip: Some(format!("{} · {}", timeline.label, timeline.description)),
        fire: Some(fire),
        timeline: Some(timeline),
        layers,
        markers,
        priorities,
        stats,
    }
}

fn insights(fire: &Fire, timeline: &TimelineStage) -> Vec<Insight> {
    let insight = |category: &str, title: &str, detail: String| Insight {
        category: category.to_string(),
        title: title.to_string(),
        detail,
    };
    vec![
        insight(
            "Action",
            "Crew routing",
            format!(
                "Assign crews to {} within the {} window.",
                fire.region.as_deref().unwrap_or("priority sectors"),
                timeline.label
            ),
        ),
        insight(
            "Monitoring",
            "Hydrology sensors",
            "4 gauges exceeded limits; refresh feeds every 15 minutes.".to_string(),
        ),
        insight(
            "Community",
            "Next briefing",
            "Push narrated map to the public viewer with a short link.".to_string(),
        ),
    ]
}

fn next_steps(fire: &Fire, focus: PriorityKey, timeline: &TimelineStage) -> Vec<String> {
    let mut steps = match focus {
        PriorityKey::Community => vec![
            format!(
                "Pre-position structure protection teams near the {}.",
                fire.region.as_deref().unwrap_or("WUI fringe")
            ),
            "Publish a plain-language alert that outlines open roads and shelters.".to_string(),
        ],
        PriorityKey::Watershed => vec![
            "Deploy BAER crews to mulch high-severity headwaters.".to_string(),
            "Stage sediment-control wattles upstream of drinking water intakes.".to_string(),
        ],
        PriorityKey::Infrastructure => vec![
            "Inspect transmission lines and primary transportation corridors.".to_string(),
            "Patch scorched culverts with quick-build materials.".to_string(),
        ],
    };
    steps.push(format!(
        "Refresh the {} briefing and send to local EOCs.",
        timeline.label.to_lowercase()
    ));
    steps
}
