//! Frame orchestrator
//!
//! One `CullingEngine` serves one camera. Each tick it samples registered
//! volumes for staleness, recomputes world bounds when needed, runs the
//! culling batch into the back buffer, diffs against the front buffer and
//! dispatches the resulting transition events to the owning volumes. The
//! buffers swap roles every full pass.

use crate::core::camera::CameraView;
use crate::core::types::Result;
use crate::culling::{CullingBackend, FrustumSnapshot, ParallelBackend};
use crate::events::{check_events, CullState, LodTable, TransitionEvent};
use crate::registry::VolumeRegistry;
use crate::volume::VolumeHandle;

/// What the next tick does.
///
/// `FullUpdate` is the steady state. The others are one-shot escalations
/// scheduled by registration traffic or resync requests; the tick consumes
/// them and falls back to `FullUpdate`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum FrameState {
    /// Sample staleness, recull, diff.
    #[default]
    FullUpdate,
    /// Neutralize the previous pass first so every currently visible slot
    /// re-announces itself, then proceed as a full update.
    CullOnly,
    /// Diff only, no culling. Used right after registration so the seeded
    /// states surface without waiting for a full pass.
    CheckEventOnly,
}

#[derive(Clone, Copy, Debug)]
pub struct CullingConfig {
    /// Staleness sampling visits one slot in `refresh_stride` per tick.
    pub refresh_stride: usize,
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self { refresh_stride: 3 }
    }
}

/// Tracks a set of volumes against one camera and reports visibility and
/// LOD band transitions.
pub struct CullingEngine {
    registry: VolumeRegistry,
    backend: Box<dyn CullingBackend>,
    config: CullingConfig,
    lod_levels: LodTable,
    // Ping-pong cull-state buffers; `flip` parity decides which is current.
    ctx0: Vec<CullState>,
    ctx1: Vec<CullState>,
    flip: u64,
    frame_state: FrameState,
    /// Skip staleness sampling for one tick after registration traffic.
    pause_refresh: bool,
    tick: u64,
    events: Vec<TransitionEvent>,
}

impl CullingEngine {
    pub fn new() -> Self {
        Self::with_backend(Box::new(ParallelBackend))
    }

    pub fn with_backend(backend: Box<dyn CullingBackend>) -> Self {
        Self {
            registry: VolumeRegistry::new(),
            backend,
            config: CullingConfig::default(),
            lod_levels: LodTable::default(),
            ctx0: Vec::new(),
            ctx1: Vec::new(),
            flip: 0,
            frame_state: FrameState::default(),
            pause_refresh: false,
            tick: 0,
            events: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn lod_levels(&self) -> &[f32] {
        self.lod_levels.levels()
    }

    pub fn set_refresh_stride(&mut self, stride: usize) {
        self.config.refresh_stride = stride.max(1);
    }

    /// Replace the LOD threshold table.
    ///
    /// Every slot's band may shift under the new table, so a resync is
    /// scheduled: the next tick re-announces all visible slots at their
    /// new bands.
    pub fn set_lod_levels(&mut self, levels: Vec<f32>) -> Result<()> {
        self.lod_levels = LodTable::new(levels)?;
        self.frame_state = FrameState::CullOnly;
        Ok(())
    }

    /// Re-announce every currently visible slot on the next tick.
    ///
    /// For consumers that lost their own state (level reload, pool reset)
    /// and need the transitions replayed.
    pub fn request_resync(&mut self) {
        self.frame_state = FrameState::CullOnly;
    }

    /// Register a volume, returning its slot.
    ///
    /// The slot is seeded so the next tick emits its first transition
    /// immediately instead of waiting out the refresh stride: previous
    /// state invisible, current optimistically visible. The real cull
    /// result replaces the seed on the first full pass.
    pub fn add(&mut self, handle: &VolumeHandle) -> usize {
        if handle.is_registered() {
            // Logged no-op in the registry
            return self.registry.add(handle);
        }
        if self.frame_state == FrameState::FullUpdate {
            // The diff-only frame scheduled here walks every slot, and after
            // a full pass the non-current buffer is one tick stale. Bring it
            // up to date first so only the seeds below can differ. Later
            // adds in the same inter-tick window must skip this or they
            // would erase the earlier seeds.
            let (prev, curr) = split_buffers(&mut self.ctx0, &mut self.ctx1, self.flip);
            curr.copy_from_slice(prev);
            self.frame_state = FrameState::CheckEventOnly;
        }
        let slot = self.registry.add(handle);
        self.ctx0.push(CullState::INVISIBLE);
        self.ctx1.push(CullState::INVISIBLE);
        let (prev, curr) = split_buffers(&mut self.ctx0, &mut self.ctx1, self.flip);
        prev[slot] = CullState::INVISIBLE;
        curr[slot] = CullState::VISIBLE;
        self.pause_refresh = true;
        slot
    }

    /// Unregister a volume. The survivor swapped into its slot keeps both
    /// of its buffered states, so the swap itself never fabricates events.
    pub fn remove(&mut self, handle: &VolumeHandle) {
        if let Some(slot) = self.registry.remove(handle) {
            self.ctx0.swap_remove(slot);
            self.ctx1.swap_remove(slot);
            self.pause_refresh = true;
        }
    }

    /// Advance one frame and return the transitions it produced.
    ///
    /// Events are also dispatched to each affected volume's callbacks
    /// before this returns; the slice is for consumers that drain events
    /// centrally.
    pub fn tick(&mut self, camera: &CameraView) -> &[TransitionEvent] {
        self.tick += 1;
        self.events.clear();
        if self.registry.is_empty() {
            self.frame_state = FrameState::FullUpdate;
            self.pause_refresh = false;
            return &self.events;
        }

        if std::mem::take(&mut self.pause_refresh) {
            // Registration traffic landed this frame; let it settle.
        } else if self.registry.refresh(self.tick, self.config.refresh_stride) {
            let (local, matrices, world) = self.registry.bounds_arrays_mut();
            self.backend.refresh_world_bounds(local, matrices, world);
        }

        match std::mem::take(&mut self.frame_state) {
            FrameState::FullUpdate => self.full_update(camera),
            FrameState::CullOnly => self.cull_only(camera),
            FrameState::CheckEventOnly => self.check_events_now(),
        }

        self.dispatch();
        &self.events
    }

    fn full_update(&mut self, camera: &CameraView) {
        let snapshot = FrustumSnapshot::from_camera(camera);
        let (prev, curr) = split_buffers(&mut self.ctx0, &mut self.ctx1, self.flip);
        self.backend.cull(&snapshot, self.registry.world_bounds(), curr);
        check_events(prev, curr, &self.lod_levels, &mut self.events);
        self.flip += 1;
    }

    fn cull_only(&mut self, camera: &CameraView) {
        // Neutral previous state: after the cull, every visible slot diffs
        // against invisible and re-announces itself.
        let (prev, _) = split_buffers(&mut self.ctx0, &mut self.ctx1, self.flip);
        prev.fill(CullState::INVISIBLE);
        self.full_update(camera);
    }

    fn check_events_now(&mut self) {
        let (prev, curr) = split_buffers(&mut self.ctx0, &mut self.ctx1, self.flip);
        check_events(prev, curr, &self.lod_levels, &mut self.events);
        // Absorb what was just reported so a repeated diff stays quiet
        for event in &self.events {
            prev[event.slot] = curr[event.slot];
        }
    }

    fn dispatch(&self) {
        for event in &self.events {
            let volume = self.registry.handle_at(event.slot).source();
            if event.became_visible() {
                volume.on_became_visible();
            } else if event.became_invisible() {
                volume.on_became_invisible();
            }
            if event.lod_changed() {
                volume.on_lod_changed(self.lod_levels.levels(), event.current_lod());
            }
        }
    }
}

impl Default for CullingEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve the ping-pong buffers into `(previous, current)` for the given
/// parity. Free function so callers can hold the registry borrowed at the
/// same time.
fn split_buffers<'a>(
    ctx0: &'a mut Vec<CullState>,
    ctx1: &'a mut Vec<CullState>,
    flip: u64,
) -> (&'a mut [CullState], &'a mut [CullState]) {
    if flip % 2 == 0 {
        (ctx1, ctx0)
    } else {
        (ctx0, ctx1)
    }
}
