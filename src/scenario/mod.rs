pub mod mock;

use crate::models::fire::{Fire, FireFilter, fallback_fires};
use crate::models::scenario::{Scenario, ScenarioState};
use crate::traits::Backend;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

pub const ASK_FAILED: &str =
    "Could not generate an answer. Try rephrasing your question or check your connection.";
pub const NO_ANSWER: &str = "No answer available.";

/// Fire catalog together with where it came from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FireListing {
    pub fires: Vec<Fire>,
    pub from_fallback: bool,
}

/// Scenario and catalog requests with local fallbacks; never fails.
pub struct ScenarioService {
    backend: Arc<dyn Backend>,
}

impl ScenarioService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        ScenarioService { backend }
    }

    pub async fn fetch_fires(&self, filter: &FireFilter) -> FireListing {
        match self.backend.fires(filter).await {
            Ok(fires) => FireListing {
                fires: fires
                    .into_iter()
                    .map(|mut fire| {
                        fire.year = fire.resolved_year();
                        fire
                    })
                    .collect(),
                from_fallback: false,
            },
            Err(e) => {
                warn!(error = %e, "using fallback fire catalog");
                FireListing {
                    fires: fallback_fires()
                        .into_iter()
                        .filter(|fire| filter.matches(fire))
                        .collect(),
                    from_fallback: true,
                }
            }
        }
    }

    pub async fn fetch_scenario(&self, state: &ScenarioState, catalog: &[Fire]) -> Scenario {
        match self.backend.scenario(state).await {
            Ok(scenario) => scenario,
            Err(e) => {
                warn!(error = %e, fire = %state.fire_id, "falling back to mock scenario");
                mock::build_mock_scenario(state, catalog, &mut rand::rng())
            }
        }
    }

    pub async fn ask(&self, fire_id: &str, question: &str) -> String {
        match self.backend.ask(fire_id, question).await {
            Ok(answer) if answer.trim().is_empty() => NO_ANSWER.to_string(),
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, fire = fire_id, "ask request failed");
                ASK_FAILED.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::models::overlay::OverlayKind;
    use crate::traits::RasterFetch;
    use async_trait::async_trait;

    struct Offline;

    #[async_trait]
    impl Backend for Offline {
        async fn fires(&self, _: &FireFilter) -> Result<Vec<Fire>, BackendError> {
            Err(BackendError::Request("offline".into()))
        }

        async fn scenario(&self, _: &ScenarioState) -> Result<Scenario, BackendError> {
            Err(BackendError::Status(502))
        }

        async fn raster(&self, _: OverlayKind, _: &str) -> Result<RasterFetch, BackendError> {
            Err(BackendError::Request("offline".into()))
        }

        async fn ask(&self, _: &str, _: &str) -> Result<String, BackendError> {
            Err(BackendError::Request("offline".into()))
        }
    }

    struct Empty;

    #[async_trait]
    impl Backend for Empty {
        async fn fires(&self, _: &FireFilter) -> Result<Vec<Fire>, BackendError> {
            Ok(vec![Fire {
                id: "canyon-fire-2016".into(),
                name: "Canyon Fire".into(),
                start_date: Some("2016-09-18".into()),
                ..Default::default()
            }])
        }

        async fn scenario(&self, _: &ScenarioState) -> Result<Scenario, BackendError> {
            Ok(Scenario::default())
        }

        async fn raster(&self, _: OverlayKind, _: &str) -> Result<RasterFetch, BackendError> {
            Ok(RasterFetch::Missing(404))
        }

        async fn ask(&self, _: &str, question: &str) -> Result<String, BackendError> {
            Ok(format!("echo: {}", question))
        }
    }

    #[tokio::test]
    async fn test_offline_catalog_is_filtered_fallback() {
        let service = ScenarioService::new(Arc::new(Offline));
        let listing = service
            .fetch_fires(&FireFilter {
                state: Some("OR".into()),
                year: None,
            })
            .await;
        assert!(listing.from_fallback);
        assert_eq!(listing.fires.len(), 1);
        assert_eq!(listing.fires[0].id, "bootleg-fire-2021");
    }

    #[tokio::test]
    async fn test_backend_fires_get_resolved_year() {
        let service = ScenarioService::new(Arc::new(Empty));
        let listing = service.fetch_fires(&FireFilter::default()).await;
        assert!(!listing.from_fallback);
        assert_eq!(listing.fires[0].year, Some(2016));
    }

    #[tokio::test]
    async fn test_offline_scenario_is_mocked() {
        let service = ScenarioService::new(Arc::new(Offline));
        let scenario = service
            .fetch_scenario(&ScenarioState::new("maui-fire-2023"), &fallback_fires())
            .await;
        assert_eq!(scenario.fire.unwrap().name, "Lahaina Wildfire");
        assert_eq!(scenario.layers.len(), 3);
    }

    #[tokio::test]
    async fn test_ask_failure_is_plain_text() {
        let offline = ScenarioService::new(Arc::new(Offline));
        assert_eq!(offline.ask("x", "why?").await, ASK_FAILED);
        let online = ScenarioService::new(Arc::new(Empty));
        assert_eq!(online.ask("x", "why?").await, "echo: why?");
    }
}
