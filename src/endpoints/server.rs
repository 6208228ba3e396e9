use crate::config::Config;
use crate::controller::ExclusivityController;
use crate::display::MemoryMap;
use crate::endpoints::handlers::{
    ask_handler, get_layers, get_scenario, list_fires, overlay_tile, put_scenario, select_fire,
    toggle_layer, webmap_handler, zoom_handler,
};
use crate::loader::OverlayLoader;
use crate::models::{
    fire::{Fire, FireFilter},
    scenario::{Scenario, ScenarioState},
};
use crate::reader::HttpBackend;
use crate::registry::LayerRegistry;
use crate::scenario::ScenarioService;
use crate::traits::{Backend, MapSurface};
use crate::utils::status::{print_fire_summary, print_overlay_summary};
use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Per-session view state the scenario requests are built from.
pub struct Session {
    pub query: ScenarioState,
    pub catalog: Vec<Fire>,
    pub scenario: Option<Scenario>,
}

pub struct AppState {
    pub config: Config,
    pub service: ScenarioService,
    pub controller: ExclusivityController,
    pub surface: Arc<MemoryMap>,
    pub session: RwLock<Session>,
}

impl AppState {
    /// Fetches the scenario for the current session and hands its marker
    /// features to the controller.
    pub async fn refresh_scenario(&self) -> Scenario {
        let (query, catalog) = {
            let session = self.session.read().await;
            (session.query.clone(), session.catalog.clone())
        };
        let scenario = self.service.fetch_scenario(&query, &catalog).await;
        self.controller.set_fallback(scenario.layers.clone()).await;
        self.session.write().await.scenario = Some(scenario.clone());
        scenario
    }
}

pub struct MapServer {
    state: Arc<AppState>,
}

impl MapServer {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let backend = HttpBackend::new(&config.api_base, config.load_timeout())?;
        Self::with_backend(config, Arc::new(backend)).await
    }

    /// Builds the display groups, then the registry and controller on top
    /// of them, and loads the initial catalog and scenario.
    pub async fn with_backend(config: Config, backend: Arc<dyn Backend>) -> anyhow::Result<Self> {
        let surface = Arc::new(MemoryMap::new(config.tile_cache_entries));
        let map: Arc<dyn MapSurface> = surface.clone();

        let registry = LayerRegistry::new(map.clone());
        let loader = OverlayLoader::new(backend.clone(), map, config.loader_settings());
        let controller =
            ExclusivityController::new(registry, Arc::new(loader)).with_settle(config.settle());
        controller.set_fire(Some(config.fire_id.clone())).await;

        let service = ScenarioService::new(backend);
        let listing = service.fetch_fires(&FireFilter::default()).await;
        print_overlay_summary(&config);
        print_fire_summary(&listing.fires, listing.from_fallback);

        let state = Arc::new(AppState {
            session: RwLock::new(Session {
                query: ScenarioState::new(config.fire_id.clone()),
                catalog: listing.fires,
                scenario: None,
            }),
            config,
            service,
            controller,
            surface,
        });
        let scenario = state.refresh_scenario().await;
        info!(
            fire = %state.config.fire_id,
            features = scenario.layers.values().map(Vec::len).sum::<usize>(),
            "initial scenario loaded"
        );

        Ok(Self { state })
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(webmap_handler))
            .route("/map", get(webmap_handler))
            .route("/fires", get(list_fires))
            .route("/fires/{fire_id}/select", post(select_fire))
            .route("/scenario", get(get_scenario).put(put_scenario))
            .route("/layers", get(get_layers))
            .route("/layers/{kind}", post(toggle_layer))
            .route("/viewport/zoom", post(zoom_handler))
            .route("/overlay/{layer}/{col}/{row}", get(overlay_tile))
            .route("/ask", get(ask_handler))
            .with_state(self.state.clone())
    }

    pub async fn start(self) -> anyhow::Result<()> {
        let app = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;

        println!(
            r#"
    🔥 FireLens serving on {}

    🗺️ Recovery map with exclusive overlays
       → http://{}/map

    📚 Overlay state (JSON)
       → http://{}/layers

    🛰️ Analysis API
       → {}
            "#,
            addr, addr, addr, self.state.config.api_base
        );

        axum::serve(listener, app).await?;

        Ok(())
    }
}
