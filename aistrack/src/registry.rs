//! Thread-safe store of the vessels a source currently knows about.
//!
//! Every operation takes the same lock for the duration of an in-memory
//! copy only. Callers work on [`ShipRegistry::snapshot`] outside the lock.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use crate::ship::ShipRecord;

#[derive(Debug, Default)]
struct RegistryState {
    ships: BTreeMap<u32, ShipRecord>,
    generation: u64,
}

/// Mapping of MMSI to the latest [`ShipRecord`], iterated in MMSI order.
#[derive(Debug, Default)]
pub struct ShipRegistry {
    state: Mutex<RegistryState>,
}

impl ShipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any existing record with the same MMSI.
    pub fn upsert(&self, record: ShipRecord) {
        let mut state = self.state.lock();
        state.ships.insert(record.mmsi(), record);
        state.generation += 1;
    }

    /// Atomically replace the whole contents.
    ///
    /// Readers observe either the previous set or the new one, never a mix.
    /// Duplicate MMSIs in `records` resolve to the last occurrence.
    pub fn replace_all<I>(&self, records: I)
    where
        I: IntoIterator<Item = ShipRecord>,
    {
        // Build outside the lock; the swap is the only locked step
        let ships: BTreeMap<u32, ShipRecord> =
            records.into_iter().map(|r| (r.mmsi(), r)).collect();

        let mut state = self.state.lock();
        state.ships = ships;
        state.generation += 1;
    }

    /// Point-in-time copy of every record in MMSI order.
    pub fn snapshot(&self) -> Vec<ShipRecord> {
        self.state.lock().ships.values().cloned().collect()
    }

    /// Copy of one vessel's record.
    pub fn get(&self, mmsi: u32) -> Option<ShipRecord> {
        self.state.lock().ships.get(&mmsi).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().ships.is_empty()
    }

    /// Counter bumped by every mutation.
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }
}
