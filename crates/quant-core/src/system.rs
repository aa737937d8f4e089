use serde::Serialize;

use crate::constants::NO_ENERGY;
use crate::equivalence::{EngineStats, EquivalenceEngine};
use crate::error::{QuantError, Result};
use crate::history::History;
use crate::prefix::PrefixIndex;

/// Snapshot of tree and engine occupancy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SystemStats {
    pub nodes: usize,
    #[serde(flatten)]
    pub engine: EngineStats,
}

/// Owns the prefix tree and the equivalence engine behind it.
///
/// Every failing operation checks its preconditions before touching either
/// structure, so an `Err` leaves the system exactly as it was.
#[derive(Debug, Default)]
pub struct QuantSystem {
    index: PrefixIndex,
    engine: EquivalenceEngine,
}

impl QuantSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> &PrefixIndex {
        &self.index
    }

    pub fn engine(&self) -> &EquivalenceEngine {
        &self.engine
    }

    /// Declare `history` and every prefix of it. Always succeeds.
    pub fn declare(&mut self, history: &History) {
        self.index.declare(history);
    }

    /// Remove `history` and everything below it. Absent histories are
    /// accepted silently.
    pub fn remove(&mut self, history: &History) {
        self.index.remove(history, &mut self.engine);
    }

    pub fn valid(&self, history: &History) -> bool {
        self.index.valid(history)
    }

    /// Energy recorded for `history`'s class.
    ///
    /// A stored value of [`NO_ENERGY`] is reported as missing.
    pub fn energy(&self, history: &History) -> Result<u64> {
        let node = self
            .index
            .lookup(history)
            .ok_or_else(|| QuantError::NotDeclared(history.to_string()))?;
        node.identifier()
            .and_then(|id| self.engine.get_energy(id))
            .filter(|energy| *energy != NO_ENERGY)
            .ok_or_else(|| QuantError::NoEnergy(history.to_string()))
    }

    /// Assign `energy` to `history`'s class, or to `history` alone if it
    /// has never been merged with anything.
    pub fn set_energy(&mut self, history: &History, energy: u64) -> Result<()> {
        let node = self
            .index
            .lookup(history)
            .ok_or_else(|| QuantError::NotDeclared(history.to_string()))?;

        let id = match node.identifier() {
            Some(id) => id,
            None => {
                let id = self.engine.create_identifier();
                self.index.attach(history, id);
                id
            }
        };
        self.engine.set_energy(id, energy);
        Ok(())
    }

    /// Make `a` and `b` share one energy from now on.
    ///
    /// At least one side must already have energy. A side without energy
    /// adopts the other's. Two energised classes settle on the
    /// [`merge_energy`](crate::merge_energy) of both.
    pub fn equal(&mut self, a: &History, b: &History) -> Result<()> {
        let id_a = self
            .index
            .lookup(a)
            .ok_or_else(|| QuantError::NotDeclared(a.to_string()))?
            .identifier();
        let id_b = self
            .index
            .lookup(b)
            .ok_or_else(|| QuantError::NotDeclared(b.to_string()))?
            .identifier();

        if a == b {
            return Ok(());
        }

        let (anchor, other, other_id) = match (id_a, id_b) {
            (None, None) => return Err(QuantError::NoEnergyToMerge(a.to_string(), b.to_string())),
            (Some(anchor), id) => (anchor, b, id),
            (None, Some(anchor)) => (anchor, a, None),
        };

        let other_id = match other_id {
            Some(id) => id,
            None => {
                let id = self.engine.create_identifier();
                self.index.attach(other, id);
                id
            }
        };
        self.engine.union(anchor, other_id);
        Ok(())
    }

    pub fn stats(&self) -> SystemStats {
        SystemStats {
            nodes: self.index.len(),
            engine: self.engine.stats(),
        }
    }
}
