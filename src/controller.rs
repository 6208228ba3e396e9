use crate::display::{OverlayPlacement, markers::fallback_markers};
use crate::error::LoadError;
use crate::loader::OverlayLoader;
use crate::models::{overlay::OverlayKind, scenario::ScenarioLayers};
use crate::registry::LayerRegistry;
use crate::traits::MarkerShape;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Phase {
    Idle {
        active: Option<OverlayKind>,
    },
    Loading {
        requested: OverlayKind,
        generation: u64,
    },
    Resyncing,
}

impl Phase {
    /// Kind that is selected or being loaded.
    pub fn current(&self) -> Option<OverlayKind> {
        match self {
            Phase::Idle { active } => *active,
            Phase::Loading { requested, .. } => Some(*requested),
            Phase::Resyncing => None,
        }
    }
}

/// Outcome of a controller request.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// A raster overlay was attached for the kind.
    Attached(OverlayKind),
    /// The kind is selected with marker content in place of a raster.
    Fallback {
        kind: OverlayKind,
        reason: LoadError,
    },
    /// The request matched the current selection.
    Unchanged,
    Cleared,
    /// A later selection took over while this load was in flight; its
    /// result was released without being attached.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSnapshot {
    pub phase: Phase,
    pub active: Option<OverlayKind>,
    pub fire_id: Option<String>,
    pub overlay: Option<OverlayPlacement>,
    pub markers: Vec<MarkerShape>,
}

/// Kind a load is started for.
enum Target {
    Kind(OverlayKind),
    /// The selection at the time the session lock is held; forces a restart.
    Current,
}

struct Session {
    registry: LayerRegistry,
    phase: Phase,
    generation: u64,
    fire_id: Option<String>,
    fallback: ScenarioLayers,
}

/// Keeps at most one overlay kind on the map.
///
/// Every exclusivity change runs its teardown while holding the session
/// lock, so a new request waits for the previous teardown to finish. The
/// lock is released while the loader awaits the backend; each load carries
/// the generation it was started for and its result is released, never
/// attached, when the generation has moved on.
pub struct ExclusivityController {
    session: Mutex<Session>,
    loader: Arc<OverlayLoader>,
    settle: Duration,
}

impl ExclusivityController {
    pub fn new(registry: LayerRegistry, loader: Arc<OverlayLoader>) -> Self {
        ExclusivityController {
            session: Mutex::new(Session {
                registry,
                phase: Phase::Idle { active: None },
                generation: 0,
                fire_id: None,
                fallback: ScenarioLayers::new(),
            }),
            loader,
            settle: Duration::ZERO,
        }
    }

    /// Pause inserted between teardown and load to let an asynchronous
    /// display library finish its own bookkeeping.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub async fn phase(&self) -> Phase {
        self.session.lock().await.phase
    }

    pub async fn active(&self) -> Option<OverlayKind> {
        match self.session.lock().await.phase {
            Phase::Idle { active } => active,
            _ => None,
        }
    }

    /// Sets the fire later loads are issued for. Does not reload.
    pub async fn set_fire(&self, fire_id: Option<String>) {
        self.session.lock().await.fire_id = fire_id;
    }

    /// Replaces the marker features drawn when a raster is unavailable.
    pub async fn set_fallback(&self, layers: ScenarioLayers) {
        self.session.lock().await.fallback = layers;
    }

    pub async fn select(&self, kind: OverlayKind) -> Transition {
        self.start(Target::Kind(kind)).await
    }

    /// Re-runs the load for whatever kind is selected when the session
    /// lock is taken, e.g. after a fire change.
    pub async fn reload(&self) -> Transition {
        self.start(Target::Current).await
    }

    /// Maps a checkbox event onto select or deselect.
    pub async fn toggle(&self, kind: OverlayKind, checked: bool) -> Transition {
        if checked {
            self.select(kind).await
        } else {
            self.deselect(kind).await
        }
    }

    /// Clears `kind` if it is the current selection.
    pub async fn deselect(&self, kind: OverlayKind) -> Transition {
        let mut session = self.session.lock().await;
        if session.phase.current() != Some(kind) {
            return Transition::Unchanged;
        }
        session.generation += 1;
        session.registry.clear(kind);
        session.phase = Phase::Idle { active: None };
        info!(kind = %kind, "overlay deselected");
        Transition::Cleared
    }

    async fn start(&self, target: Target) -> Transition {
        let (kind, generation, fire_id) = {
            let mut session = self.session.lock().await;
            let current = session.phase.current();
            let kind = match target {
                Target::Kind(kind) if current == Some(kind) => {
                    debug!(kind = %kind, "selection unchanged");
                    return Transition::Unchanged;
                }
                Target::Kind(kind) => kind,
                Target::Current => match current {
                    Some(kind) => kind,
                    None => return Transition::Unchanged,
                },
            };
            session.generation += 1;
            session.registry.clear_all();
            session.phase = Phase::Loading {
                requested: kind,
                generation: session.generation,
            };
            (kind, session.generation, session.fire_id.clone())
        };

        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        let outcome = match fire_id.as_deref() {
            Some(fire_id) => self.loader.load(kind, fire_id).await,
            None => Err(LoadError::Unavailable),
        };

        let mut session = self.session.lock().await;
        if session.generation != generation {
            info!(
                kind = %kind,
                generation,
                current = session.generation,
                "discarding superseded overlay load"
            );
            // dropping the resource releases it
            return Transition::Superseded;
        }

        let transition = match outcome {
            Ok(resource) => {
                session.registry.set(resource);
                Transition::Attached(kind)
            }
            Err(reason) => {
                let features = session.fallback.get(&kind).cloned().unwrap_or_default();
                info!(
                    kind = %kind,
                    reason = %reason,
                    features = features.len(),
                    "substituting fallback markers"
                );
                session
                    .registry
                    .render_fallback(kind, fallback_markers(&features));
                Transition::Fallback { kind, reason }
            }
        };
        session.registry.show_only(kind);
        session.phase = Phase::Idle { active: Some(kind) };
        transition
    }

    /// Forces every kind but the active one off the map. A no-op unless a
    /// kind is selected and no load is in flight.
    pub async fn on_zoom(&self) {
        let mut session = self.session.lock().await;
        let Phase::Idle { active: Some(kind) } = session.phase else {
            debug!(phase = ?session.phase, "zoom resync skipped");
            return;
        };
        session.phase = Phase::Resyncing;
        for other in kind.others() {
            session.registry.force_detach(other);
        }
        session.registry.show_only(kind);
        session.phase = Phase::Idle { active: Some(kind) };
        debug!(kind = %kind, "resynced after zoom");
    }

    pub async fn snapshot(&self) -> ControllerSnapshot {
        let session = self.session.lock().await;
        let active = match session.phase {
            Phase::Idle { active } => active,
            _ => None,
        };
        let surface = session.registry.surface();
        ControllerSnapshot {
            phase: session.phase,
            active,
            fire_id: session.fire_id.clone(),
            overlay: active.and_then(|kind| session.registry.placement(kind)),
            markers: active
                .map(|kind| surface.group_markers(kind))
                .unwrap_or_default(),
        }
    }
}
