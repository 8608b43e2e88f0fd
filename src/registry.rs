//! Dense slot registry of tracked volumes
//!
//! Every live volume occupies one slot in a set of parallel arrays (handle,
//! local bounds, local-to-world, world bounds). Insertion appends; removal
//! swap-removes and patches the moved survivor's slot, so iteration stays a
//! flat scan over `0..len` with no holes.

use crate::core::types::Mat4;
use crate::math::Aabb;
use crate::volume::VolumeHandle;

/// Initial capacity of the parallel arrays. Growth doubles and never shrinks.
pub const DEFAULT_CAPACITY: usize = 1024;

pub struct VolumeRegistry {
    entries: Vec<VolumeHandle>,
    local_bounds: Vec<Aabb>,
    local_to_world: Vec<Mat4>,
    world_bounds: Vec<Aabb>,
    /// Recompute the whole world-bounds array on the next refresh.
    bounds_pending: bool,
}

impl VolumeRegistry {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            local_bounds: Vec::with_capacity(capacity),
            local_to_world: Vec::with_capacity(capacity),
            world_bounds: Vec::with_capacity(capacity),
            bounds_pending: false,
        }
    }

    /// Number of live slots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Handle occupying `slot`. Panics when the slot is not live.
    pub fn handle_at(&self, slot: usize) -> &VolumeHandle {
        &self.entries[slot]
    }

    /// Current world-space bounds, one per live slot.
    pub fn world_bounds(&self) -> &[Aabb] {
        &self.world_bounds
    }

    fn grow_for_push(&mut self) {
        if self.entries.len() == self.entries.capacity() {
            let target = (self.entries.capacity() * 2).max(DEFAULT_CAPACITY);
            let extra = target - self.entries.len();
            self.entries.reserve_exact(extra);
            self.local_bounds.reserve_exact(extra);
            self.local_to_world.reserve_exact(extra);
            self.world_bounds.reserve_exact(extra);
        }
    }

    /// Register a volume, returning its slot.
    ///
    /// Duplicate registration is a logged no-op returning the existing slot.
    /// The new slot's world bounds are seeded unbounded; the pending
    /// whole-array recompute replaces them on the next unpaused refresh.
    pub fn add(&mut self, handle: &VolumeHandle) -> usize {
        if let Some(slot) = handle.slot() {
            log::warn!("volume already registered at slot {slot}, ignoring add");
            return slot;
        }
        self.grow_for_push();
        let slot = self.entries.len();
        let source = handle.source();
        self.local_bounds.push(source.local_bounds());
        self.local_to_world.push(source.local_to_world());
        self.world_bounds.push(Aabb::UNBOUNDED);
        self.entries.push(handle.clone());
        handle.set_slot(slot);
        self.bounds_pending = true;
        log::debug!("registered volume at slot {slot}");
        slot
    }

    /// Unregister a volume, swap-removing its slot across all arrays.
    ///
    /// Returns the vacated slot, or `None` when the call degraded to a
    /// no-op: unregistered handle, empty registry, or a recorded slot that
    /// does not hold this handle (index corruption, reported loudly). The
    /// handle's slot is reset on every path so it cannot be double-removed.
    pub fn remove(&mut self, handle: &VolumeHandle) -> Option<usize> {
        let slot = handle.slot()?;
        if self.entries.is_empty() {
            log::warn!("remove requested for slot {slot} but the registry is empty");
            handle.clear_slot();
            return None;
        }
        if slot >= self.entries.len() || !VolumeHandle::same_handle(&self.entries[slot], handle) {
            log::warn!(
                "slot {slot} does not hold the volume being removed; \
                 registry indices were corrupted elsewhere"
            );
            handle.clear_slot();
            return None;
        }

        self.entries.swap_remove(slot);
        self.local_bounds.swap_remove(slot);
        self.local_to_world.swap_remove(slot);
        self.world_bounds.swap_remove(slot);
        if slot < self.entries.len() {
            // Patch the survivor that was swapped into the vacated slot
            self.entries[slot].set_slot(slot);
        }
        handle.clear_slot();
        log::debug!("unregistered volume from slot {slot}");
        Some(slot)
    }

    /// Round-robin staleness sampling.
    ///
    /// Visits a `1/stride` fraction of slots starting at `tick % stride`,
    /// re-reading local bounds whose owner raised the dirty flag and
    /// re-polling non-static transforms. Returns whether the world-bounds
    /// array needs recomputation (a sampled change, or pending
    /// registration traffic).
    pub fn refresh(&mut self, tick: u64, stride: usize) -> bool {
        let stride = stride.max(1);
        let mut changed = std::mem::take(&mut self.bounds_pending);
        let start = (tick % stride as u64) as usize;
        for i in (start..self.entries.len()).step_by(stride) {
            let source = self.entries[i].source();
            if source.take_bounds_dirty() {
                self.local_bounds[i] = source.local_bounds();
                changed = true;
            }
            if !source.transform_static() {
                let matrix = source.local_to_world();
                if matrix != self.local_to_world[i] {
                    self.local_to_world[i] = matrix;
                    changed = true;
                }
            }
        }
        changed
    }

    /// Split borrow for the world-bounds recompute batch:
    /// `(local_bounds, local_to_world, world_bounds)`.
    pub fn bounds_arrays_mut(&mut self) -> (&[Aabb], &[Mat4], &mut [Aabb]) {
        (&self.local_bounds, &self.local_to_world, &mut self.world_bounds)
    }
}

impl Default for VolumeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
