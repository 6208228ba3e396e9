use crate::models::{overlay::OverlayKind, scenario::TimelineStage};
use serde::Serialize;

const DASHED_BORDER: &str = "1px dashed rgba(255, 255, 255, 0.3)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: &'static str,
    pub colour: &'static str,
    pub tooltip: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<&'static str>,
}

/// Display instructions for the legend and the toggle controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendView {
    pub visible: bool,
    pub title: Option<&'static str>,
    pub entries: Vec<LegendEntry>,
    /// Holds at most the active kind.
    pub checked: Vec<OverlayKind>,
}

pub fn present(active: Option<OverlayKind>) -> LegendView {
    let Some(kind) = active else {
        return LegendView {
            visible: false,
            title: None,
            entries: Vec::new(),
            checked: Vec::new(),
        };
    };
    let profile = kind.profile();
    LegendView {
        visible: true,
        title: Some(profile.title),
        entries: profile
            .legend
            .iter()
            .map(|item| LegendEntry {
                label: item.label,
                colour: item.colour,
                tooltip: item.tooltip,
                border: item.dashed_border.then_some(DASHED_BORDER),
            })
            .collect(),
        checked: vec![kind],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageView {
    pub label: String,
    pub description: String,
}

pub fn present_stage(index: usize) -> StageView {
    let stage = TimelineStage::at(index);
    StageView {
        label: stage.label,
        description: stage.description,
    }
}

pub fn toggle_tip(kind: OverlayKind, enabled: bool) -> String {
    format!(
        "{} layer {}. Tap a fire pin to load MTBS-style burn severity overlays, then drag the sliders to test scenarios.",
        kind.profile().title,
        if enabled { "enabled" } else { "disabled" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_active_hides_legend() {
        let view = present(None);
        assert!(!view.visible);
        assert!(view.entries.is_empty());
        assert!(view.checked.is_empty());
    }

    #[test]
    fn test_burn_severity_legend_marks_unburned_dashed() {
        let view = present(Some(OverlayKind::BurnSeverity));
        assert_eq!(view.title, Some("Burn Severity"));
        assert_eq!(view.entries.len(), 6);
        assert_eq!(view.entries[0].label, "Unburned");
        assert_eq!(view.entries[0].border, Some(DASHED_BORDER));
        assert!(view.entries[1..].iter().all(|e| e.border.is_none()));
        assert_eq!(view.checked, vec![OverlayKind::BurnSeverity]);
    }

    #[test]
    fn test_each_kind_checks_only_itself() {
        for kind in OverlayKind::ALL {
            assert_eq!(present(Some(kind)).checked, vec![kind]);
        }
        assert_eq!(present(Some(OverlayKind::ReburnRisk)).entries.len(), 3);
        assert_eq!(present(Some(OverlayKind::BestNextSteps)).entries.len(), 4);
    }

    #[test]
    fn test_stage_and_tip_text() {
        let stage = present_stage(3);
        assert_eq!(stage.label, "Stabilization phase (Day 30)");
        assert_eq!(
            stage.description,
            "Treatment crews in the field; erosion control active"
        );
        assert_eq!(
            toggle_tip(OverlayKind::ReburnRisk, false),
            "Reburn Risk layer disabled. Tap a fire pin to load MTBS-style burn severity overlays, then drag the sliders to test scenarios."
        );
    }
}
