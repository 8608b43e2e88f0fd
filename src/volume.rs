//! Tracked volumes: the capability trait owners implement, the shareable
//! registration handle, and a ready-made interior-mutable volume type.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, RwLock};

use crate::core::types::Mat4;
use crate::math::Aabb;

/// Capabilities a tracked object supplies to the culling engine.
///
/// The engine only ever reads through this trait; the single-shot dirty
/// flag is the one observable side effect (consumed on read). The event
/// receivers default to no-ops so data-only volumes stay trivial.
pub trait CullingVolume: Send + Sync {
    /// Axis-aligned bounds in the owner's local space.
    fn local_bounds(&self) -> Aabb;

    /// The owner's local-to-world transform.
    fn local_to_world(&self) -> Mat4;

    /// Static transforms are sampled once at registration and never
    /// re-polled during refresh.
    fn transform_static(&self) -> bool {
        false
    }

    /// Single-shot bounds-changed flag, cleared by this read.
    fn take_bounds_dirty(&self) -> bool {
        false
    }

    /// The volume entered the frustum.
    fn on_became_visible(&self) {}

    /// The volume left the frustum.
    fn on_became_invisible(&self) {}

    /// The volume's LOD band changed; receives the active threshold table
    /// and the new band index.
    fn on_lod_changed(&self, _levels: &[f32], _band: usize) {}
}

const UNREGISTERED: i32 = -1;

/// Shareable handle pairing a [`CullingVolume`] with its registry slot.
///
/// The slot is a lookup key, not an identity: the registry reassigns it
/// whenever another volume is swap-moved into the vacated position during
/// removal. `None` means unregistered.
#[derive(Clone)]
pub struct VolumeHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    slot: AtomicI32,
    source: Arc<dyn CullingVolume>,
}

impl VolumeHandle {
    pub fn new(source: Arc<dyn CullingVolume>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                slot: AtomicI32::new(UNREGISTERED),
                source,
            }),
        }
    }

    /// Wrap a volume that is not shared elsewhere.
    pub fn wrap(volume: impl CullingVolume + 'static) -> Self {
        Self::new(Arc::new(volume))
    }

    /// Current slot, or `None` while unregistered.
    pub fn slot(&self) -> Option<usize> {
        let raw = self.inner.slot.load(Ordering::Acquire);
        (raw != UNREGISTERED).then_some(raw as usize)
    }

    pub fn is_registered(&self) -> bool {
        self.slot().is_some()
    }

    pub fn source(&self) -> &Arc<dyn CullingVolume> {
        &self.inner.source
    }

    pub(crate) fn set_slot(&self, slot: usize) {
        self.inner.slot.store(slot as i32, Ordering::Release);
    }

    pub(crate) fn clear_slot(&self) {
        self.inner.slot.store(UNREGISTERED, Ordering::Release);
    }

    /// Same underlying registration, not merely the same source volume.
    pub(crate) fn same_handle(a: &VolumeHandle, b: &VolumeHandle) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

/// Ready-made volume backed by interior-mutable bounds and transform.
///
/// Owners keep an `Arc<AabbVolume>`, mutate it from their side, and the
/// engine picks changes up through the dirty flag and refresh sampling.
pub struct AabbVolume {
    local_bounds: RwLock<Aabb>,
    local_to_world: RwLock<Mat4>,
    bounds_dirty: AtomicBool,
    transform_static: bool,
}

impl AabbVolume {
    /// Dynamic volume at the identity transform.
    pub fn new(local_bounds: Aabb) -> Self {
        Self::with_transform(local_bounds, Mat4::IDENTITY, false)
    }

    pub fn with_transform(local_bounds: Aabb, local_to_world: Mat4, transform_static: bool) -> Self {
        Self {
            local_bounds: RwLock::new(local_bounds),
            local_to_world: RwLock::new(local_to_world),
            bounds_dirty: AtomicBool::new(false),
            transform_static,
        }
    }

    /// Replace the local bounds; raises the dirty flag only when the stored
    /// bounds actually change.
    pub fn set_local_bounds(&self, bounds: Aabb) {
        let mut current = self.local_bounds.write().unwrap();
        if *current != bounds {
            *current = bounds;
            self.bounds_dirty.store(true, Ordering::Release);
        }
    }

    pub fn set_local_to_world(&self, matrix: Mat4) {
        *self.local_to_world.write().unwrap() = matrix;
    }

    /// Force a bounds re-read on the next refresh sample.
    pub fn mark_bounds_dirty(&self) {
        self.bounds_dirty.store(true, Ordering::Release);
    }
}

impl CullingVolume for AabbVolume {
    fn local_bounds(&self) -> Aabb {
        *self.local_bounds.read().unwrap()
    }

    fn local_to_world(&self) -> Mat4 {
        *self.local_to_world.read().unwrap()
    }

    fn transform_static(&self) -> bool {
        self.transform_static
    }

    fn take_bounds_dirty(&self) -> bool {
        self.bounds_dirty.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec3;

    #[test]
    fn test_handle_starts_unregistered() {
        let handle = VolumeHandle::wrap(AabbVolume::new(Aabb::default()));
        assert_eq!(handle.slot(), None);
        assert!(!handle.is_registered());
    }

    #[test]
    fn test_dirty_flag_is_single_shot() {
        let volume = AabbVolume::new(Aabb::default());
        volume.set_local_bounds(Aabb::from_center_half_extent(Vec3::ZERO, Vec3::ONE));
        assert!(volume.take_bounds_dirty());
        assert!(!volume.take_bounds_dirty());
    }

    #[test]
    fn test_unchanged_bounds_do_not_dirty() {
        let bounds = Aabb::from_center_half_extent(Vec3::ZERO, Vec3::ONE);
        let volume = AabbVolume::new(bounds);
        volume.take_bounds_dirty();
        volume.set_local_bounds(bounds);
        assert!(!volume.take_bounds_dirty());
    }

    #[test]
    fn test_clones_share_slot() {
        let handle = VolumeHandle::wrap(AabbVolume::new(Aabb::default()));
        let alias = handle.clone();
        handle.set_slot(7);
        assert_eq!(alias.slot(), Some(7));
        assert!(VolumeHandle::same_handle(&handle, &alias));
    }
}
