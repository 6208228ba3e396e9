use crate::error::BackendError;
use crate::models::{
    fire::{Fire, FireCatalog, FireFilter},
    overlay::OverlayKind,
    scenario::{Scenario, ScenarioState},
};
use crate::traits::{Backend, RasterFetch};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize)]
struct AskResponse {
    #[serde(default)]
    answer: String,
}

/// Analysis API client.
#[derive(Clone)]
pub struct HttpBackend {
    base: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Request(format!("http client init failed: {}", e)))?;
        Ok(HttpBackend {
            base: base.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BackendError> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fires(&self, filter: &FireFilter) -> Result<Vec<Fire>, BackendError> {
        let catalog: FireCatalog = self.get_json("/api/fires", &filter.query_pairs()).await?;
        Ok(catalog.fires)
    }

    async fn scenario(&self, state: &ScenarioState) -> Result<Scenario, BackendError> {
        self.get_json("/api/scenario", &state.query_pairs()).await
    }

    async fn raster(&self, kind: OverlayKind, fire_id: &str) -> Result<RasterFetch, BackendError> {
        let url = self.url(&kind.raster_path(fire_id));
        debug!(url = %url, kind = %kind, "GET raster");
        let response = self
            .client
            .get(&url)
            .header("Accept", "image/tiff,application/octet-stream")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Ok(RasterFetch::Missing(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        Ok(RasterFetch::Payload(bytes.to_vec()))
    }

    async fn ask(&self, fire_id: &str, question: &str) -> Result<String, BackendError> {
        let query = [
            ("fireId", fire_id.to_string()),
            ("question", question.to_string()),
        ];
        let body: AskResponse = self.get_json("/api/ask", &query).await?;
        Ok(body.answer)
    }
}
