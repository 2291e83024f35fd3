use std::sync::{Mutex, MutexGuard, PoisonError};

/// Number of contact slots tracked.
pub const MAX_TOUCH: usize = 4;

/// Marker for "no contact" in `tracking_id` and "unknown" in the positions.
pub const SENTINEL: i32 = -1;

/// Per-contact state for one hardware slot.
///
/// `pos_x`/`pos_y` are display coordinates, already transposed from the
/// device axes by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub tracking_id: i32,
    pub touch_down: bool,
    pub pos_x: i32,
    pub pos_y: i32,
    pub removed: bool,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            tracking_id: SENTINEL,
            touch_down: false,
            pos_x: SENTINEL,
            pos_y: SENTINEL,
            removed: false,
        }
    }
}

impl Slot {
    pub fn is_active(&self) -> bool {
        self.tracking_id != SENTINEL
    }

    /// Drops the contact; positions go back to the sentinel.
    pub fn release(&mut self) {
        self.tracking_id = SENTINEL;
        self.pos_x = SENTINEL;
        self.pos_y = SENTINEL;
        self.touch_down = false;
        self.removed = true;
    }

    /// Active and anchored inside a `width` x `height` surface.
    pub fn is_drawable(&self, width: u32, height: u32) -> bool {
        self.is_active()
            && self.pos_x >= 0
            && self.pos_y >= 0
            && (self.pos_x as u32) < width
            && (self.pos_y as u32) < height
    }
}

/// The slot table shared by the decoder and the renderer.
///
/// Every field of every slot lives behind one lock, so the renderer always
/// sees a consistent `(tracking_id, pos_x, pos_y)` tuple.
#[derive(Debug, Default)]
pub struct SlotTable {
    slots: Mutex<[Slot; MAX_TOUCH]>,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the table for mutation.
    ///
    /// A poisoned lock still hands out the data: slots are plain values and
    /// stay valid even if a holder panicked mid-update.
    pub fn lock(&self) -> MutexGuard<'_, [Slot; MAX_TOUCH]> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copies the whole table out.
    pub fn snapshot(&self) -> [Slot; MAX_TOUCH] {
        *self.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_table_holds_sentinels() {
        let table = SlotTable::new();
        for slot in table.snapshot() {
            assert_eq!(slot, Slot::default());
            assert!(!slot.is_active());
            assert_eq!((slot.pos_x, slot.pos_y), (SENTINEL, SENTINEL));
        }
    }

    #[test]
    fn release_restores_sentinels_and_latches_removed() {
        let mut slot = Slot {
            tracking_id: 12,
            touch_down: true,
            pos_x: 30,
            pos_y: 40,
            removed: false,
        };
        slot.release();
        assert!(!slot.is_active());
        assert!(!slot.touch_down);
        assert!(slot.removed);
        assert_eq!((slot.pos_x, slot.pos_y), (SENTINEL, SENTINEL));
    }

    #[test]
    fn drawable_needs_id_and_in_bounds_anchor() {
        let mut slot = Slot {
            tracking_id: 1,
            pos_x: 99,
            pos_y: 49,
            ..Slot::default()
        };
        assert!(slot.is_drawable(100, 50));
        assert!(!slot.is_drawable(99, 50));
        assert!(!slot.is_drawable(100, 49));

        slot.pos_x = SENTINEL;
        assert!(!slot.is_drawable(100, 50));

        slot.pos_x = 10;
        slot.tracking_id = SENTINEL;
        assert!(!slot.is_drawable(100, 50));
    }
}
