//! Execution strategy for the per-slot batch scans

use crate::core::types::Mat4;
use crate::events::CullState;
use crate::math::Aabb;

use super::FrustumSnapshot;

/// Strategy for running the independent per-slot batches.
///
/// Implementations share the same per-item math, so visibility bits and LOD
/// bands always agree for identical input; they differ only in execution
/// model. Chosen once at engine construction. A GPU-readback strategy would
/// also plug in here, but readback latency makes it non-competitive at this
/// scale.
pub trait CullingBackend: Send + Sync {
    /// Rebuild world bounds from local bounds and transforms.
    fn refresh_world_bounds(&self, local: &[Aabb], local_to_world: &[Mat4], world: &mut [Aabb]);

    /// Compute `(visible, height)` for every slot into `out`.
    fn cull(&self, snapshot: &FrustumSnapshot, world: &[Aabb], out: &mut [CullState]);
}
