use crate::error::BackendError;
use crate::models::{
    fire::{Fire, FireFilter},
    overlay::OverlayKind,
    scenario::{Scenario, ScenarioState},
};
use async_trait::async_trait;

/// Outcome of a raster request that reached the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterFetch {
    Payload(Vec<u8>),
    /// Non-success status; 404 means no raster exists for the fire.
    Missing(u16),
}

/// Request/response contract of the analysis API.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn fires(&self, filter: &FireFilter) -> Result<Vec<Fire>, BackendError>;
    async fn scenario(&self, state: &ScenarioState) -> Result<Scenario, BackendError>;
    async fn raster(&self, kind: OverlayKind, fire_id: &str) -> Result<RasterFetch, BackendError>;
    async fn ask(&self, fire_id: &str, question: &str) -> Result<String, BackendError>;
}
