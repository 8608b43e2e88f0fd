//! Culltrack - frustum culling and LOD tracking for dynamic AABB populations
//!
//! One [`engine::CullingEngine`] per camera tracks a population of
//! axis-aligned bounding volumes, determines per tick which are inside the
//! view frustum and which LOD band their apparent viewport size falls into,
//! and emits edge-triggered transition events only when that state changes.

pub mod core;
pub mod math;
pub mod volume;
pub mod registry;
pub mod culling;
pub mod events;
pub mod engine;
