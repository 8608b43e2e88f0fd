//! LOD banding and edge-triggered visibility events
//!
//! Each tracked slot carries a packed state byte: bit 7 is the visibility
//! flag, bits 0..=6 the LOD band index. Comparing the byte across two
//! consecutive culls yields exactly the set of slots whose visibility or
//! band changed, so consumers only ever hear about transitions.

use crate::core::error::Error;
use crate::core::types::Result;

/// Visibility flag, bit 7 of the packed state byte.
pub const VISIBLE_MASK: u8 = 0b1000_0000;
/// LOD band index, bits 0..=6 of the packed state byte.
pub const LOD_MASK: u8 = 0b0111_1111;

/// Raw per-slot cull result for one pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CullState {
    /// Viewport-relative height of the projected bounds, in [0, 1] for
    /// on-screen boxes, exactly 1.0 when the box straddles the camera plane.
    pub height: f32,
    pub visible: bool,
}

impl CullState {
    pub const INVISIBLE: CullState = CullState { height: 0.0, visible: false };
    /// Optimistic sentinel for freshly seeded slots: visible at full
    /// viewport height.
    pub const VISIBLE: CullState = CullState { height: 1.0, visible: true };

    /// Pack into the state byte under the given band table.
    pub fn pack(&self, levels: &LodTable) -> u8 {
        let band = levels.band_for_height(self.height) as u8;
        (band & LOD_MASK) | if self.visible { VISIBLE_MASK } else { 0 }
    }
}

/// Relative-height thresholds mapping projected size to a LOD band.
///
/// Thresholds are strictly descending; band `i` covers heights in
/// `(levels[i], levels[i - 1]]` and the last band extends down to zero.
///
/// ```
/// use culltrack::events::LodTable;
///
/// let table = LodTable::new(vec![0.75, 0.5, 0.33, 0.15]).unwrap();
/// assert_eq!(table.band_for_height(0.9), 0);
/// assert_eq!(table.band_for_height(0.6), 1);
/// assert_eq!(table.band_for_height(0.2), 3);
/// assert_eq!(table.band_for_height(0.05), 3);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LodTable {
    levels: Vec<f32>,
}

impl LodTable {
    /// Bands must fit in the 7 low bits of the state byte.
    pub const MAX_LEVELS: usize = LOD_MASK as usize;

    /// Unity-flavored default: full detail down to full-viewport height,
    /// then halving, with a generous cull-distance tail.
    pub const DEFAULT_LEVELS: [f32; 4] = [1.0, 0.5, 0.25, 0.025];

    /// Validates that `levels` is strictly descending and short enough to
    /// index with 7 bits. An empty table is valid and maps every height to
    /// band 0.
    pub fn new(levels: Vec<f32>) -> Result<Self> {
        if levels.len() > Self::MAX_LEVELS {
            return Err(Error::LodTooManyLevels(levels.len()));
        }
        for (index, pair) in levels.windows(2).enumerate() {
            if pair[1] >= pair[0] {
                return Err(Error::LodNotDescending {
                    index: index + 1,
                    prev: pair[0],
                    next: pair[1],
                });
            }
        }
        Ok(Self { levels })
    }

    /// Table with no thresholds; every height lands in band 0.
    pub fn none() -> Self {
        Self { levels: Vec::new() }
    }

    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

    /// Band index for a projected height. First threshold the height
    /// exceeds wins; heights at or below the last threshold stay in the
    /// last band.
    pub fn band_for_height(&self, height: f32) -> usize {
        for (band, threshold) in self.levels.iter().enumerate() {
            if height > *threshold {
                return band;
            }
        }
        self.levels.len().saturating_sub(1)
    }
}

impl Default for LodTable {
    fn default() -> Self {
        Self { levels: Self::DEFAULT_LEVELS.to_vec() }
    }
}

/// One slot whose packed state changed between two consecutive culls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionEvent {
    pub slot: usize,
    pub prev_state: u8,
    pub curr_state: u8,
}

impl TransitionEvent {
    pub fn is_visible(&self) -> bool {
        self.curr_state & VISIBLE_MASK != 0
    }

    pub fn was_visible(&self) -> bool {
        self.prev_state & VISIBLE_MASK != 0
    }

    pub fn became_visible(&self) -> bool {
        self.is_visible() && !self.was_visible()
    }

    pub fn became_invisible(&self) -> bool {
        !self.is_visible() && self.was_visible()
    }

    pub fn previous_lod(&self) -> usize {
        (self.prev_state & LOD_MASK) as usize
    }

    pub fn current_lod(&self) -> usize {
        (self.curr_state & LOD_MASK) as usize
    }

    pub fn lod_changed(&self) -> bool {
        self.previous_lod() != self.current_lod()
    }
}

/// Diff two cull passes, appending an event per slot whose packed state
/// differs. Runs sequentially; the packing is branch-light and the diff is
/// memory-bound, so splitting it does not pay off.
pub fn check_events(
    prev: &[CullState],
    curr: &[CullState],
    levels: &LodTable,
    out: &mut Vec<TransitionEvent>,
) {
    debug_assert_eq!(prev.len(), curr.len());
    for (slot, (prev, curr)) in prev.iter().zip(curr).enumerate() {
        let prev_state = prev.pack(levels);
        let curr_state = curr.pack(levels);
        if prev_state != curr_state {
            out.push(TransitionEvent { slot, prev_state, curr_state });
        }
    }
}
