//! Object number bookkeeping
//!
//! Tracks the highest object number handed out, a sorted pool of freed ids
//! that can be reused, and numbers that must never be handed out again
//! because their generation counter is exhausted.

use crate::error::{PdfError, Result};
use crate::objects::ObjectId;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct IdAllocator {
    object_count: u32,
    free: BTreeSet<ObjectId>,
    unavailable: BTreeSet<u32>,
    can_reuse: bool,
    max_generation: u16,
    max_object_number: u32,
}

impl IdAllocator {
    pub fn new(can_reuse: bool, max_generation: u16, max_object_number: u32) -> Self {
        Self {
            object_count: 0,
            free: BTreeSet::new(),
            unavailable: BTreeSet::new(),
            can_reuse,
            max_generation,
            max_object_number,
        }
    }

    /// Highest object number seen so far.
    pub fn object_count(&self) -> u32 {
        self.object_count
    }

    pub fn can_reuse(&self) -> bool {
        self.can_reuse
    }

    /// Disabling reuse drops every pooled id.
    pub fn set_can_reuse(&mut self, can_reuse: bool) {
        self.can_reuse = can_reuse;
        if !can_reuse {
            self.free.clear();
        }
    }

    /// Pooled ids in ascending order.
    pub fn free_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.free.iter().copied()
    }

    pub fn is_unavailable(&self, number: u32) -> bool {
        self.unavailable.contains(&number)
    }

    /// Next id for a new object: the lowest pooled id when reuse is
    /// enabled, otherwise a fresh number with generation 0.
    pub fn allocate(&mut self) -> Result<ObjectId> {
        if self.can_reuse {
            if let Some(id) = self.free.pop_first() {
                return Ok(id);
            }
        }

        let mut number = self.object_count.saturating_add(1);
        while self.unavailable.contains(&number) {
            number = number.saturating_add(1);
        }
        if number > self.max_object_number {
            return Err(PdfError::ValueOutOfRange(format!(
                "Reached the maximum number of indirect objects ({})",
                self.max_object_number
            )));
        }
        Ok(ObjectId::new(number, 0))
    }

    /// Raises the object count to cover `id`. Returns whether it changed.
    pub fn try_increment_object_count(&mut self, id: ObjectId) -> bool {
        if id.number() > self.object_count {
            self.object_count = id.number();
            true
        } else {
            false
        }
    }

    /// Pools `id` unless its generation is exhausted, in which case the
    /// number is retired for good. Returns whether `id` is now pooled.
    pub fn try_add_free(&mut self, id: ObjectId) -> bool {
        if id.generation() >= self.max_generation {
            debug!("Retiring object number {}: generation exhausted", id.number());
            self.reserve(id.number());
            return false;
        }
        self.add_free(id)
    }

    /// Pools the successor generation of a deleted `id`. Returns the
    /// generation that was pooled, or `None` if nothing was pooled because
    /// the number was retired or reuse is disabled.
    pub fn release(&mut self, id: ObjectId) -> Option<u16> {
        let Some(next_generation) = id.generation().checked_add(1) else {
            self.reserve(id.number());
            return None;
        };
        let next = ObjectId::new(id.number(), next_generation);
        self.try_add_free(next).then_some(next_generation)
    }

    /// Pools `id` without the generation check. Duplicates are ignored.
    /// Returns whether `id` is in the pool afterwards.
    pub fn add_free(&mut self, id: ObjectId) -> bool {
        self.try_increment_object_count(id);
        if !self.can_reuse || self.unavailable.contains(&id.number()) {
            return false;
        }
        if !self.free.insert(id) {
            debug!("{id} is already in the free list");
        }
        true
    }

    /// Marks `number` as never to be handed out.
    pub fn reserve(&mut self, number: u32) {
        self.unavailable.insert(number);
        self.claim_number(number);
    }

    /// Drops every pooled id with this number because it is in use again.
    pub fn claim_number(&mut self, number: u32) {
        self.free.retain(|id| id.number() != number);
    }

    /// Drops every pooled id whose number is in `numbers`.
    pub fn claim_numbers(&mut self, numbers: &BTreeSet<u32>) {
        self.free.retain(|id| !numbers.contains(&id.number()));
    }

    /// Forgets all free and retired numbers and sets the count, as after
    /// renumbering into a dense range.
    pub fn reset(&mut self, object_count: u32) {
        self.free.clear();
        self.unavailable.clear();
        self.object_count = object_count;
    }
}
