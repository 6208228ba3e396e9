use crate::display::{OverlayPlacement, OverlayResource};
use crate::models::overlay::OverlayKind;
use crate::traits::{MapSurface, MarkerShape};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Tracks the overlay occupying each kind's display group.
///
/// Holds at most one resource per kind. Clearing releases the resource's
/// screen handles and empties the group, so repeated clears are no-ops.
pub struct LayerRegistry {
    surface: Arc<dyn MapSurface>,
    entries: BTreeMap<OverlayKind, OverlayResource>,
}

impl LayerRegistry {
    /// Must be constructed after the surface has created its groups.
    pub fn new(surface: Arc<dyn MapSurface>) -> Self {
        LayerRegistry {
            surface,
            entries: BTreeMap::new(),
        }
    }

    pub fn surface(&self) -> &Arc<dyn MapSurface> {
        &self.surface
    }

    /// Records `resource` as the occupant of its kind and places it in the
    /// kind's group, releasing any previous occupant first.
    pub fn set(&mut self, resource: OverlayResource) {
        let kind = resource.kind();
        self.clear(kind);
        self.surface.add_to_group(kind, resource.id());
        debug!(kind = %kind, layer = resource.id().0, "overlay registered");
        self.entries.insert(kind, resource);
    }

    pub fn get(&self, kind: OverlayKind) -> Option<&OverlayResource> {
        self.entries.get(&kind)
    }

    pub fn placement(&self, kind: OverlayKind) -> Option<OverlayPlacement> {
        self.get(kind).map(OverlayResource::placement)
    }

    /// Kinds with a recorded overlay.
    pub fn occupied(&self) -> Vec<OverlayKind> {
        self.entries.keys().copied().collect()
    }

    /// Draws fallback markers into the kind's group in place of a raster.
    pub fn render_fallback(&mut self, kind: OverlayKind, markers: Vec<MarkerShape>) {
        self.clear(kind);
        debug!(kind = %kind, markers = markers.len(), "rendering fallback markers");
        self.surface.add_markers(kind, markers);
        self.surface.invalidate();
    }

    /// Releases the kind's overlay and empties its group. Returns whether
    /// an overlay was recorded.
    pub fn clear(&mut self, kind: OverlayKind) -> bool {
        let released = match self.entries.remove(&kind) {
            Some(resource) => {
                resource.release();
                true
            }
            None => false,
        };
        self.surface.clear_group(kind);
        released
    }

    /// Releases every overlay, then empties and detaches every group.
    pub fn clear_all(&mut self) {
        for kind in OverlayKind::ALL {
            self.clear(kind);
        }
        for kind in OverlayKind::ALL {
            self.surface.clear_group(kind);
            self.surface.detach_group(kind);
        }
        self.surface.invalidate();
    }

    /// Hard removal of everything belonging to `kind`, including layers the
    /// registry does not know about that are still in the group.
    pub fn force_detach(&mut self, kind: OverlayKind) {
        self.surface.detach_group(kind);
        self.clear(kind);
        for layer in self.surface.group_layers(kind) {
            self.surface.remove_from_map(layer);
        }
        self.surface.clear_group(kind);
    }

    /// Attaches only `kind`'s group.
    pub fn show_only(&mut self, kind: OverlayKind) {
        for other in kind.others() {
            self.surface.detach_group(other);
        }
        self.surface.attach_group(kind);
        self.surface.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{MemoryMap, RasterMeta};
    use crate::models::geometry::GeometryExtent;
    use image::RgbaImage;

    fn resource(map: &Arc<MemoryMap>, kind: OverlayKind) -> OverlayResource {
        let surface: Arc<dyn MapSurface> = map.clone();
        let id = surface.next_layer_id();
        let container = surface.create_container(id, 0.7);
        let canvas = surface.create_canvas(container, RgbaImage::new(1, 1));
        let extent = GeometryExtent::from((0.0, 0.0, 1.0, 1.0));
        let meta = RasterMeta {
            width: 1,
            height: 1,
            pixel_width: 1.0,
            pixel_height: 1.0,
            projection: "4326".into(),
            nodata: None,
            extent,
        };
        OverlayResource::new(surface, id, kind, meta, extent, 0.7, container, canvas)
    }

    fn registry() -> (Arc<MemoryMap>, LayerRegistry) {
        let map = Arc::new(MemoryMap::new(16));
        let registry = LayerRegistry::new(map.clone());
        (map, registry)
    }

    #[test]
    fn test_set_replaces_previous_occupant() {
        let (map, mut registry) = registry();
        let first = resource(&map, OverlayKind::BurnSeverity);
        let first_id = first.id();
        registry.set(first);
        let second = resource(&map, OverlayKind::BurnSeverity);
        let second_id = second.id();
        registry.set(second);

        assert!(!map.is_active(first_id));
        assert!(map.is_active(second_id));
        assert_eq!(map.group_layers(OverlayKind::BurnSeverity), vec![second_id]);
        assert_eq!(map.container_count(), 1);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (map, mut registry) = registry();
        registry.set(resource(&map, OverlayKind::ReburnRisk));
        assert!(registry.clear(OverlayKind::ReburnRisk));
        assert!(!registry.clear(OverlayKind::ReburnRisk));
        assert!(registry.get(OverlayKind::ReburnRisk).is_none());
        assert_eq!(map.canvas_count(), 0);
    }

    #[test]
    fn test_clear_all_detaches_every_group() {
        let (map, mut registry) = registry();
        for kind in OverlayKind::ALL {
            registry.set(resource(&map, kind));
        }
        registry.clear_all();
        registry.clear_all();

        assert!(registry.occupied().is_empty());
        assert!(map.active_layers().is_empty());
        assert_eq!(map.container_count(), 0);
        for kind in OverlayKind::ALL {
            assert!(!map.group_attached(kind));
            assert!(map.group_layers(kind).is_empty());
        }
    }

    #[test]
    fn test_force_detach_removes_stray_layers() {
        let (map, mut registry) = registry();
        registry.set(resource(&map, OverlayKind::BestNextSteps));
        let stray = map.next_layer_id();
        map.add_to_group(OverlayKind::BestNextSteps, stray);

        registry.force_detach(OverlayKind::BestNextSteps);

        assert!(!map.is_active(stray));
        assert!(map.group_layers(OverlayKind::BestNextSteps).is_empty());
        assert!(!map.group_attached(OverlayKind::BestNextSteps));
    }

    #[test]
    fn test_show_only_attaches_single_group() {
        let (map, mut registry) = registry();
        let redraws = map.redraws();
        registry.show_only(OverlayKind::ReburnRisk);
        assert_eq!(map.redraws(), redraws + 1);
        assert!(map.group_attached(OverlayKind::ReburnRisk));
        assert!(!map.group_attached(OverlayKind::BurnSeverity));
        assert!(!map.group_attached(OverlayKind::BestNextSteps));
    }

    #[test]
    fn test_fallback_markers_replace_overlay() {
        let (map, mut registry) = registry();
        registry.set(resource(&map, OverlayKind::BurnSeverity));
        registry.render_fallback(
            OverlayKind::BurnSeverity,
            vec![MarkerShape {
                center: [39.7, -121.6],
                radius_m: 12000.0,
                stroke: [255, 78, 31, 255],
                fill: [255, 78, 31, 64],
                weight: 1.1,
            }],
        );
        assert!(registry.get(OverlayKind::BurnSeverity).is_none());
        assert_eq!(map.group_markers(OverlayKind::BurnSeverity).len(), 1);
        assert_eq!(map.container_count(), 0);
    }
}
