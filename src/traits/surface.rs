use crate::models::overlay::OverlayKind;
use image::RgbaImage;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LayerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ContainerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CanvasId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TileKey {
    pub layer: LayerId,
    pub col: u32,
    pub row: u32,
}

/// Circle drawn in place of an unavailable raster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerShape {
    /// `[lat, lng]`
    pub center: [f64; 2],
    pub radius_m: f64,
    pub stroke: [u8; 4],
    pub fill: [u8; 4],
    pub weight: f32,
}

/// Capabilities the overlay engine needs from the map library.
///
/// A layer is active on the map while it belongs to a group that is
/// attached, unless it was removed from the map directly. All methods are
/// idempotent: removing something absent is a no-op returning `false`.
pub trait MapSurface: Send + Sync {
    fn attach_group(&self, kind: OverlayKind);
    fn detach_group(&self, kind: OverlayKind);
    fn group_attached(&self, kind: OverlayKind) -> bool;
    fn add_to_group(&self, kind: OverlayKind, layer: LayerId);
    fn remove_from_group(&self, kind: OverlayKind, layer: LayerId) -> bool;
    fn group_layers(&self, kind: OverlayKind) -> Vec<LayerId>;
    fn add_markers(&self, kind: OverlayKind, markers: Vec<MarkerShape>);
    fn group_markers(&self, kind: OverlayKind) -> Vec<MarkerShape>;
    /// Drops every layer and marker from the group.
    fn clear_group(&self, kind: OverlayKind);

    fn remove_from_map(&self, layer: LayerId) -> bool;
    fn is_active(&self, layer: LayerId) -> bool;
    fn active_layers(&self) -> Vec<LayerId>;

    fn next_layer_id(&self) -> LayerId;
    fn create_container(&self, layer: LayerId, opacity: f32) -> ContainerId;
    fn destroy_container(&self, id: ContainerId) -> bool;
    fn container_exists(&self, id: ContainerId) -> bool;
    fn create_canvas(&self, container: ContainerId, image: RgbaImage) -> CanvasId;
    fn destroy_canvas(&self, id: CanvasId) -> bool;
    fn canvas_exists(&self, id: CanvasId) -> bool;
    fn cache_tile(&self, key: TileKey, png: Vec<u8>);
    fn evict_tile(&self, key: &TileKey);
    fn tile(&self, key: &TileKey) -> Option<Arc<Vec<u8>>>;
    /// Most tiles the cache holds before it starts evicting.
    fn tile_capacity(&self) -> u64;

    /// Request a redraw after structural changes.
    fn invalidate(&self);
}
