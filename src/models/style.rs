use image::Rgba;

/// Fully transparent pixel used for unmapped, NaN and no-data cells.
pub const TRANSPARENT: [u8; 4] = [255, 255, 255, 0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColourStop {
    pub value: f32,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl ColourStop {
    pub const fn new(value: f32, red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        ColourStop {
            value,
            red,
            green,
            blue,
            alpha,
        }
    }

    pub fn rgba(&self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }
}

/// Exact-match lookup table from classified cell value to colour.
#[derive(Debug, Clone, Copy)]
pub struct ColourTable(pub &'static [ColourStop]);

impl ColourTable {
    pub fn stops(&self) -> &'static [ColourStop] {
        self.0
    }

    /// Cells are rounded to the nearest class before lookup.
    pub fn colour_for(&self, raw: f32, nodata: Option<f32>) -> Rgba<u8> {
        if raw.is_nan() || nodata.map(|nd| raw == nd).unwrap_or(false) {
            return Rgba(TRANSPARENT);
        }
        let class = raw.round();
        self.0
            .iter()
            .find(|stop| stop.value == class)
            .map(|stop| Rgba(stop.rgba()))
            .unwrap_or(Rgba(TRANSPARENT))
    }
}

/// One row of a map legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendItem {
    pub label: &'static str,
    pub colour: &'static str,
    pub tooltip: &'static str,
    pub dashed_border: bool,
}

impl LegendItem {
    const fn new(label: &'static str, colour: &'static str, tooltip: &'static str) -> Self {
        LegendItem {
            label,
            colour,
            tooltip,
            dashed_border: false,
        }
    }
}

// MTBS 6-class burn severity
pub(crate) const BURN_SEVERITY_STOPS: &[ColourStop] = &[
    ColourStop::new(0.0, 255, 255, 255, 0),
    ColourStop::new(1.0, 0, 100, 0, 200),
    ColourStop::new(2.0, 144, 238, 144, 200),
    ColourStop::new(3.0, 255, 255, 0, 200),
    ColourStop::new(4.0, 255, 165, 0, 200),
    ColourStop::new(5.0, 255, 0, 0, 200),
];

pub(crate) const REBURN_RISK_STOPS: &[ColourStop] = &[
    ColourStop::new(0.0, 0, 153, 0, 200),
    ColourStop::new(1.0, 255, 165, 0, 200),
    ColourStop::new(2.0, 255, 0, 0, 200),
    ColourStop::new(255.0, 255, 255, 255, 0),
];

pub(crate) const BEST_NEXT_STEPS_STOPS: &[ColourStop] = &[
    ColourStop::new(0.0, 128, 128, 128, 200),
    ColourStop::new(1.0, 255, 255, 0, 200),
    ColourStop::new(2.0, 0, 102, 0, 200),
    ColourStop::new(3.0, 153, 102, 51, 200),
    ColourStop::new(255.0, 255, 255, 255, 0),
];

pub(crate) const BURN_SEVERITY_LEGEND: &[LegendItem] = &[
    LegendItem {
        label: "Unburned",
        colour: "transparent",
        tooltip: "Areas with no fire damage or vegetation loss",
        dashed_border: true,
    },
    LegendItem::new(
        "Low severity",
        "rgba(0, 100, 0, 0.78)",
        "Minimal vegetation damage, soil mostly intact",
    ),
    LegendItem::new(
        "Low-Moderate",
        "rgba(144, 238, 144, 0.78)",
        "Some vegetation loss, moderate soil impact",
    ),
    LegendItem::new(
        "Moderate",
        "rgba(255, 255, 0, 0.78)",
        "Significant vegetation loss, increased erosion risk",
    ),
    LegendItem::new(
        "High",
        "rgba(255, 165, 0, 0.78)",
        "Severe vegetation loss, high erosion and runoff risk",
    ),
    LegendItem::new(
        "High (increased)",
        "rgba(255, 0, 0, 0.78)",
        "Complete vegetation loss, highest erosion and runoff risk",
    ),
];

pub(crate) const REBURN_RISK_LEGEND: &[LegendItem] = &[
    LegendItem::new(
        "Low",
        "rgba(0, 153, 0, 0.78)",
        "Low probability of subsequent fires in this area",
    ),
    LegendItem::new(
        "Medium",
        "rgba(255, 165, 0, 0.78)",
        "Moderate probability of subsequent fires based on fuel accumulation",
    ),
    LegendItem::new(
        "High",
        "rgba(255, 0, 0, 0.78)",
        "High probability of subsequent fires due to fuel buildup and burn history",
    ),
];

pub(crate) const BEST_NEXT_STEPS_LEGEND: &[LegendItem] = &[
    LegendItem::new(
        "Abandon/Monitor",
        "rgba(128, 128, 128, 0.78)",
        "Monitor natural recovery, minimal intervention needed",
    ),
    LegendItem::new(
        "Fuel Reduction",
        "rgba(255, 255, 0, 0.78)",
        "Reduce fuel loads to prevent future fires",
    ),
    LegendItem::new(
        "Reforest",
        "rgba(0, 102, 0, 0.78)",
        "Priority areas for tree planting and forest restoration",
    ),
    LegendItem::new(
        "Soil Stabilization",
        "rgba(153, 102, 51, 0.78)",
        "Urgent soil stabilization needed to prevent erosion",
    ),
];
