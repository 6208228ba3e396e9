use serde::{Deserialize, Serialize};

/// One incident from the fire catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fire {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    /// `[lat, lng]`, only sent with scenario payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<[f64; 2]>,
    #[serde(default)]
    pub acres: f64,
    #[serde(default, alias = "start_date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl Fire {
    /// Explicit year, else the year prefix of the start date.
    pub fn resolved_year(&self) -> Option<i32> {
        self.year.or_else(|| {
            self.start_date
                .as_deref()
                .and_then(|d| d.split('-').next())
                .and_then(|y| y.parse().ok())
        })
    }

    /// `(lat, lng)` from the scenario centre or the catalog coordinates.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.center, self.lat, self.lng) {
            (Some([lat, lng]), _, _) => Some((lat, lng)),
            (None, Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl FireFilter {
    pub fn matches(&self, fire: &Fire) -> bool {
        let state_ok = self
            .state
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| fire.state.eq_ignore_ascii_case(s.trim()))
            .unwrap_or(true);
        let year_ok = self
            .year
            .map(|y| fire.resolved_year() == Some(y))
            .unwrap_or(true);
        state_ok && year_ok
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(state) = self.state.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("state", state.trim().to_string()));
        }
        if let Some(year) = self.year {
            pairs.push(("year", year.to_string()));
        }
        pairs
    }
}

/// Body of `GET /api/fires`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FireCatalog {
    #[serde(default)]
    pub fires: Vec<Fire>,
}

pub const DEFAULT_FIRE_ID: &str = "camp-fire-2018";

fn fallback_fire(
    id: &str,
    name: &str,
    state: &str,
    (lat, lng): (f64, f64),
    acres: f64,
    year: i32,
    region: &str,
) -> Fire {
    Fire {
        id: id.to_string(),
        name: name.to_string(),
        state: state.to_string(),
        lat: Some(lat),
        lng: Some(lng),
        center: None,
        acres,
        start_date: None,
        year: Some(year),
        region: Some(region.to_string()),
        zipcode: None,
        summary: None,
        cause: None,
    }
}

/// Built-in catalog used whenever the backend is unreachable.
pub fn fallback_fires() -> Vec<Fire> {
    vec![
        fallback_fire(
            DEFAULT_FIRE_ID,
            "Camp Fire",
            "CA",
            (39.73, -121.6),
            153_336.0,
            2018,
            "Paradise & Magalia",
        ),
        fallback_fire(
            "dixie-fire-2021",
            "Dixie Fire",
            "CA",
            (40.18, -121.23),
            963_309.0,
            2021,
            "Feather River Watershed",
        ),
        fallback_fire(
            "bootleg-fire-2021",
            "Bootleg Fire",
            "OR",
            (42.56, -121.5),
            413_765.0,
            2021,
            "Fremont-Winema NF",
        ),
        fallback_fire(
            "maui-fire-2023",
            "Lahaina Wildfire",
            "HI",
            (20.88, -156.68),
            6_700.0,
            2023,
            "West Maui",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_fire_with_snake_case_date() {
        let json = r#"{"id":"canyon-fire-2016","name":"Canyon Fire","state":"CA",
            "lat":34.597,"lng":-120.584,"acres":12749,"start_date":"2016-09-18",
            "region":"California","zipcode":"93436","perimeter_radius":14000}"#;
        let fire: Fire = serde_json::from_str(json).unwrap();
        assert_eq!(fire.start_date.as_deref(), Some("2016-09-18"));
        assert_eq!(fire.resolved_year(), Some(2016));
        assert_eq!(fire.zipcode.as_deref(), Some("93436"));
    }

    #[test]
    fn test_scenario_fire_centre_wins_over_coordinates() {
        let json = r#"{"id":"a","name":"A","startDate":"2021-07-13","center":[40.0,-121.0]}"#;
        let fire: Fire = serde_json::from_str(json).unwrap();
        assert_eq!(fire.position(), Some((40.0, -121.0)));
        assert_eq!(fire.resolved_year(), Some(2021));
    }

    #[test]
    fn test_filter_by_state_and_year() {
        let fires = fallback_fires();
        let filter = FireFilter {
            state: Some("ca".into()),
            year: Some(2021),
        };
        let hits: Vec<_> = fires.iter().filter(|f| filter.matches(f)).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "dixie-fire-2021");
        assert!(FireFilter::default().matches(&fires[3]));
    }
}
