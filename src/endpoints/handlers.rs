use crate::controller::{ControllerSnapshot, Transition};
use crate::endpoints::map::INDEX_HTML;
use crate::endpoints::server::AppState;
use crate::legend::{LegendView, StageView, present, present_stage, toggle_tip};
use crate::models::{
    fire::FireFilter,
    overlay::OverlayKind,
    scenario::{PriorityKey, Scenario, ScenarioState},
};
use crate::traits::{LayerId, MapSurface, TileKey};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
pub struct LayersResponse {
    legend: LegendView,
    stage: StageView,
    snapshot: ControllerSnapshot,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransitionView {
    outcome: &'static str,
    kind: Option<OverlayKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl From<&Transition> for TransitionView {
    fn from(transition: &Transition) -> Self {
        let (outcome, kind, reason) = match transition {
            Transition::Attached(kind) => ("attached", Some(*kind), None),
            Transition::Fallback { kind, reason } => {
                ("fallback", Some(*kind), Some(reason.to_string()))
            }
            Transition::Unchanged => ("unchanged", None, None),
            Transition::Cleared => ("cleared", None, None),
            Transition::Superseded => ("superseded", None, None),
        };
        TransitionView {
            outcome,
            kind,
            reason,
        }
    }
}

#[derive(Serialize)]
struct ToggleResponse {
    transition: TransitionView,
    tip: String,
    layers: LayersResponse,
}

#[derive(Serialize)]
struct SessionResponse {
    scenario: Scenario,
    layers: LayersResponse,
}

#[derive(Serialize)]
struct ScenarioResponse {
    state: ScenarioState,
    stage: StageView,
    scenario: Option<Scenario>,
}

#[derive(Deserialize)]
pub struct ToggleRequest {
    checked: bool,
}

#[derive(Deserialize, Default)]
pub struct PrioritiesUpdate {
    community: Option<u8>,
    watershed: Option<u8>,
    infrastructure: Option<u8>,
}

#[derive(Deserialize)]
pub struct ScenarioUpdate {
    timeline: Option<usize>,
    #[serde(default)]
    priorities: PrioritiesUpdate,
}

#[derive(Deserialize)]
pub struct AskQuery {
    question: String,
}

pub async fn webmap_handler() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn layers_view(state: &AppState) -> LayersResponse {
    let snapshot = state.controller.snapshot().await;
    let timeline = state.session.read().await.query.timeline();
    LayersResponse {
        legend: present(snapshot.active),
        stage: present_stage(timeline),
        snapshot,
    }
}

pub async fn get_layers(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(layers_view(&state).await))
}

pub async fn toggle_layer(
    Path(kind): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<ToggleRequest>,
) -> impl IntoResponse {
    let kind: OverlayKind = match kind.parse() {
        Ok(kind) => kind,
        Err(e) => return (StatusCode::BAD_REQUEST, e).into_response(),
    };
    let transition = state.controller.toggle(kind, request.checked).await;
    let response = ToggleResponse {
        transition: TransitionView::from(&transition),
        tip: toggle_tip(kind, request.checked),
        layers: layers_view(&state).await,
    };
    (StatusCode::OK, Json(response)).into_response()
}

pub async fn zoom_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.controller.on_zoom().await;
    (StatusCode::OK, Json(layers_view(&state).await))
}

pub async fn list_fires(
    Query(filter): Query<FireFilter>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let listing = state.service.fetch_fires(&filter).await;
    if filter == FireFilter::default() {
        state.session.write().await.catalog = listing.fires.clone();
    }
    (StatusCode::OK, Json(listing))
}

pub async fn get_scenario(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session.read().await;
    let response = ScenarioResponse {
        state: session.query.clone(),
        stage: present_stage(session.query.timeline()),
        scenario: session.scenario.clone(),
    };
    (StatusCode::OK, Json(response))
}

pub async fn put_scenario(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ScenarioUpdate>,
) -> impl IntoResponse {
    {
        let mut session = state.session.write().await;
        if let Some(timeline) = update.timeline {
            session.query.set_timeline(timeline);
        }
        let changes = [
            (PriorityKey::Community, update.priorities.community),
            (PriorityKey::Watershed, update.priorities.watershed),
            (PriorityKey::Infrastructure, update.priorities.infrastructure),
        ];
        for (key, value) in changes {
            if let Some(value) = value {
                session.query.priorities.set(key, value);
            }
        }
    }
    let scenario = state.refresh_scenario().await;
    state.controller.reload().await;
    let response = SessionResponse {
        scenario,
        layers: layers_view(&state).await,
    };
    (StatusCode::OK, Json(response))
}

pub async fn select_fire(
    Path(fire_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    if fire_id.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "Empty fire id").into_response();
    }
    state.session.write().await.query.fire_id = fire_id.clone();
    state.controller.set_fire(Some(fire_id)).await;
    let scenario = state.refresh_scenario().await;
    state.controller.reload().await;
    let response = SessionResponse {
        scenario,
        layers: layers_view(&state).await,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// `/overlay/{layer}/{col}/{row}.png`; the row segment carries the suffix.
pub async fn overlay_tile(
    Path((layer, col, row)): Path<(u64, u32, String)>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let Ok(row) = row.trim_end_matches(".png").parse::<u32>() else {
        return (StatusCode::BAD_REQUEST, "Invalid tile row").into_response();
    };
    let key = TileKey {
        layer: LayerId(layer),
        col,
        row,
    };
    match state.surface.tile(&key) {
        Some(png) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/png")],
            png.as_ref().clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Tile not found").into_response(),
    }
}

pub async fn ask_handler(
    Query(query): Query<AskQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let fire_id = state.session.read().await.query.fire_id.clone();
    let answer = state.service.ask(&fire_id, &query.question).await;
    (StatusCode::OK, Json(serde_json::json!({ "answer": answer })))
}
