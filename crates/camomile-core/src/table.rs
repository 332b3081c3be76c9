//! Fixed-capacity, positionally addressed parameter table.

use crate::error::{Error, Result};
use crate::param::{ParameterBinding, ParameterSlot};

/// Number of host-visible parameters.
///
/// Slot indices `0..CAPACITY` are the parameter identifiers the host sees
/// for the lifetime of the plugin.
pub const CAPACITY: usize = 32;

/// The host-visible parameter table.
///
/// Always holds exactly [`CAPACITY`] slots. Identity is positional: slot `i`
/// is host parameter `i` regardless of which patch is loaded. The table is
/// plain data; the processor guards it with a single lock.
#[derive(Clone, Debug)]
pub struct ParameterTable {
    slots: [ParameterSlot; CAPACITY],
}

impl Default for ParameterTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterTable {
    /// A table of unbound slots.
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| ParameterSlot::unbound()),
        }
    }

    /// Number of slots (always [`CAPACITY`]).
    #[inline]
    pub const fn size(&self) -> usize {
        CAPACITY
    }

    /// The slot at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= CAPACITY`. Hosts never query outside the range
    /// they were given.
    #[inline]
    pub fn get(&self, index: usize) -> &ParameterSlot {
        &self.slots[index]
    }

    /// The slot at `index`, or [`Error::OutOfRange`].
    pub fn try_get(&self, index: usize) -> Result<&ParameterSlot> {
        self.slots.get(index).ok_or(Error::OutOfRange {
            index,
            capacity: CAPACITY,
        })
    }

    /// Set the normalized value of the slot at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= CAPACITY`.
    #[inline]
    pub fn set(&mut self, index: usize, value: f32) {
        self.slots[index].set_normalized_value(value);
    }

    /// Replace every slot: `slots` fill positions from 0, the rest become unbound.
    ///
    /// Fails with [`Error::CapacityExceeded`] without touching the table if
    /// more than [`CAPACITY`] slots are supplied.
    pub fn replace_all(&mut self, slots: Vec<ParameterSlot>) -> Result<()> {
        if slots.len() > CAPACITY {
            return Err(Error::CapacityExceeded {
                len: slots.len(),
                capacity: CAPACITY,
            });
        }
        let mut incoming = slots.into_iter();
        for slot in &mut self.slots {
            *slot = incoming.next().unwrap_or_default();
        }
        Ok(())
    }

    /// Reset every slot to unbound.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            *slot = ParameterSlot::unbound();
        }
    }

    /// Reset the table, then bind `bindings` positionally from slot 0.
    ///
    /// Bindings beyond [`CAPACITY`] are dropped. Returns `(bound, dropped)`.
    pub fn bind<I>(&mut self, bindings: I) -> (usize, usize)
    where
        I: IntoIterator<Item = ParameterBinding>,
    {
        self.reset();
        let mut bound = 0;
        let mut dropped = 0;
        for binding in bindings {
            if bound < CAPACITY {
                self.slots[bound] = ParameterSlot::bound(binding);
                bound += 1;
            } else {
                dropped += 1;
            }
        }
        (bound, dropped)
    }

    /// Number of bound slots.
    pub fn bound_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_bound()).count()
    }

    /// Iterate over all slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterSlot> {
        self.slots.iter()
    }
}
