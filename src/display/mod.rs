pub mod markers;
pub mod resource;

use crate::models::overlay::OverlayKind;
use crate::traits::{CanvasId, ContainerId, LayerId, MapSurface, MarkerShape, TileKey};
use image::RgbaImage;
use moka::sync::Cache;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

pub use resource::{OverlayPlacement, OverlayResource, PlacedTile, RasterMeta};

#[derive(Default)]
struct GroupState {
    attached: bool,
    layers: BTreeSet<LayerId>,
    markers: Vec<MarkerShape>,
}

struct Container {
    layer: LayerId,
    opacity: f32,
}

#[derive(Default)]
struct MapState {
    groups: HashMap<OverlayKind, GroupState>,
    active: BTreeSet<LayerId>,
    containers: HashMap<ContainerId, Container>,
    canvases: HashMap<CanvasId, (ContainerId, RgbaImage)>,
    next_id: u64,
    redraws: u64,
}

impl MapState {
    fn group(&mut self, kind: OverlayKind) -> &mut GroupState {
        self.groups.entry(kind).or_default()
    }

    fn mint(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process map: one display group per overlay kind, an active-layer
/// set, and the screen resources (containers, canvases, tiles) overlays
/// occupy while they exist.
#[derive(Clone)]
pub struct MemoryMap {
    state: Arc<Mutex<MapState>>,
    tiles: Cache<TileKey, Arc<Vec<u8>>>,
}

impl MemoryMap {
    /// Creates every display group, attached and empty.
    pub fn new(tile_capacity: u64) -> Self {
        let mut state = MapState::default();
        for kind in OverlayKind::ALL {
            state.group(kind).attached = true;
        }
        MemoryMap {
            state: Arc::new(Mutex::new(state)),
            tiles: Cache::new(tile_capacity),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MapState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn redraws(&self) -> u64 {
        self.lock().redraws
    }

    pub fn container_count(&self) -> usize {
        self.lock().containers.len()
    }

    pub fn canvas_count(&self) -> usize {
        self.lock().canvases.len()
    }

    pub fn container_opacity(&self, id: ContainerId) -> Option<f32> {
        self.lock().containers.get(&id).map(|c| c.opacity)
    }

    pub fn container_layer(&self, id: ContainerId) -> Option<LayerId> {
        self.lock().containers.get(&id).map(|c| c.layer)
    }

    pub fn canvas_size(&self, id: CanvasId) -> Option<(u32, u32)> {
        self.lock().canvases.get(&id).map(|(_, img)| img.dimensions())
    }
}

impl MapSurface for MemoryMap {
    fn attach_group(&self, kind: OverlayKind) {
        let mut state = self.lock();
        let group = state.group(kind);
        group.attached = true;
        let layers: Vec<_> = group.layers.iter().copied().collect();
        state.active.extend(layers);
    }

    fn detach_group(&self, kind: OverlayKind) {
        let mut state = self.lock();
        let group = state.group(kind);
        group.attached = false;
        let layers: Vec<_> = group.layers.iter().copied().collect();
        for layer in layers {
            state.active.remove(&layer);
        }
    }

    fn group_attached(&self, kind: OverlayKind) -> bool {
        self.lock().group(kind).attached
    }

    fn add_to_group(&self, kind: OverlayKind, layer: LayerId) {
        let mut state = self.lock();
        let group = state.group(kind);
        group.layers.insert(layer);
        if group.attached {
            state.active.insert(layer);
        }
    }

    fn remove_from_group(&self, kind: OverlayKind, layer: LayerId) -> bool {
        let mut state = self.lock();
        let removed = state.group(kind).layers.remove(&layer);
        if removed {
            state.active.remove(&layer);
        }
        removed
    }

    fn group_layers(&self, kind: OverlayKind) -> Vec<LayerId> {
        self.lock().group(kind).layers.iter().copied().collect()
    }

    fn add_markers(&self, kind: OverlayKind, markers: Vec<MarkerShape>) {
        self.lock().group(kind).markers.extend(markers);
    }

    fn group_markers(&self, kind: OverlayKind) -> Vec<MarkerShape> {
        self.lock().group(kind).markers.clone()
    }

    fn clear_group(&self, kind: OverlayKind) {
        let mut state = self.lock();
        let group = state.group(kind);
        group.markers.clear();
        let layers = std::mem::take(&mut group.layers);
        for layer in layers {
            state.active.remove(&layer);
        }
    }

    fn remove_from_map(&self, layer: LayerId) -> bool {
        self.lock().active.remove(&layer)
    }

    fn is_active(&self, layer: LayerId) -> bool {
        self.lock().active.contains(&layer)
    }

    fn active_layers(&self) -> Vec<LayerId> {
        self.lock().active.iter().copied().collect()
    }

    fn next_layer_id(&self) -> LayerId {
        LayerId(self.lock().mint())
    }

    fn create_container(&self, layer: LayerId, opacity: f32) -> ContainerId {
        let mut state = self.lock();
        let id = ContainerId(state.mint());
        state.containers.insert(id, Container { layer, opacity });
        id
    }

    fn destroy_container(&self, id: ContainerId) -> bool {
        self.lock().containers.remove(&id).is_some()
    }

    fn container_exists(&self, id: ContainerId) -> bool {
        self.lock().containers.contains_key(&id)
    }

    fn create_canvas(&self, container: ContainerId, image: RgbaImage) -> CanvasId {
        let mut state = self.lock();
        let id = CanvasId(state.mint());
        state.canvases.insert(id, (container, image));
        id
    }

    fn destroy_canvas(&self, id: CanvasId) -> bool {
        self.lock().canvases.remove(&id).is_some()
    }

    fn canvas_exists(&self, id: CanvasId) -> bool {
        self.lock().canvases.contains_key(&id)
    }

    fn cache_tile(&self, key: TileKey, png: Vec<u8>) {
        self.tiles.insert(key, Arc::new(png));
    }

    fn evict_tile(&self, key: &TileKey) {
        self.tiles.invalidate(key);
    }

    fn tile(&self, key: &TileKey) -> Option<Arc<Vec<u8>>> {
        self.tiles.get(key)
    }

    fn tile_capacity(&self) -> u64 {
        self.tiles.policy().max_capacity().unwrap_or(u64::MAX)
    }

    fn invalidate(&self) {
        self.lock().redraws += 1;
    }
}
