//! The slot pool.
//!
//! Detached slots are pooled by kind and handed back out instead of being
//! re-created. During a data-change pass an additional "active" index maps
//! positions to the slots that were bound to them before the change, so
//! the layout engine can match old slots to unchanged positions before
//! falling back to pool-by-kind reuse.

use std::collections::HashMap;

use tracing::trace;

use crate::adapter::KindId;

use super::slot::Slot;

/// Per-kind pools of detached slots, plus the active-slot index used
/// across data-change transitions.
///
/// Obtain and release never fail; a pool miss is an ordinary `None`.
#[derive(Debug)]
pub struct Recycler {
    /// Detached slots keyed by kind. Order within a pool is irrelevant.
    pools: Vec<Vec<Slot>>,
    /// Slots still bound to their pre-change positions.
    active: HashMap<i32, Slot>,
}

impl Default for Recycler {
    fn default() -> Self {
        Self::new()
    }
}

impl Recycler {
    /// Creates a recycler with a single kind pool.
    pub fn new() -> Self {
        Self {
            pools: vec![Vec::new()],
            active: HashMap::new(),
        }
    }

    /// Resizes the per-kind pools.
    ///
    /// Slots of kinds that no longer exist are dropped.
    pub fn set_kind_count(&mut self, count: usize) {
        let count = count.max(1);
        self.pools.truncate(count);
        self.pools.resize_with(count, Vec::new);
    }

    /// Whether slots of `kind` are pooled at all.
    pub fn should_recycle(&self, kind: KindId) -> bool {
        kind.is_recyclable() && (kind.0 as usize) < self.pools.len()
    }

    /// Takes a pooled slot of the given kind, if one is available.
    ///
    /// The caller must rebind the slot (position, span, flags) before
    /// attaching it; the returned slot's fields are stale.
    pub fn obtain(&mut self, kind: KindId) -> Option<Slot> {
        if !self.should_recycle(kind) {
            return None;
        }
        self.pools[kind.0 as usize].pop()
    }

    /// Returns a detached slot to the pool keyed by its kind.
    ///
    /// Slots of non-recyclable kinds are dropped.
    pub fn release(&mut self, slot: Slot) {
        if self.should_recycle(slot.kind) {
            self.pools[slot.kind.0 as usize].push(slot);
        } else {
            trace!(position = slot.position, kind = slot.kind.0, "dropping non-recyclable slot");
        }
    }

    /// Records a slot still bound to `position` for the duration of a
    /// data-change pass.
    pub fn track_active(&mut self, slot: Slot) {
        self.active.insert(slot.position, slot);
    }

    /// Takes the active slot previously bound to `position`, if any.
    pub fn claim_active(&mut self, position: i32) -> Option<Slot> {
        self.active.remove(&position)
    }

    /// Moves all unclaimed active slots into the kind pools.
    ///
    /// Called at the end of a pass so no slot is left in limbo.
    pub fn scrap_active(&mut self) {
        let leftovers: Vec<Slot> = self.active.drain().map(|(_, slot)| slot).collect();
        for slot in leftovers {
            self.release(slot);
        }
    }

    /// Drops every pooled and active slot.
    pub fn clear(&mut self) {
        for pool in &mut self.pools {
            pool.clear();
        }
        self.active.clear();
    }

    /// Total number of pooled (not active) slots.
    pub fn pooled_count(&self) -> usize {
        self.pools.iter().map(Vec::len).sum()
    }
}
