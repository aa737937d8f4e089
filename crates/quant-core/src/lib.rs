//! History quantization engine.
//!
//! Keeps a prefix tree of histories over the alphabet {0, 1, 2, 3}. Any
//! history may carry an energy value, and histories can be declared equal so
//! that they share one energy from then on. Equal histories are grouped by a
//! dynamic union-find with per-class energy and slot reuse.
//!
//! Zero I/O: pure data structures with no opinions about input format or output.

pub mod constants;
pub mod equivalence;
pub mod error;
pub mod history;
pub mod prefix;
pub mod system;

pub use constants::{ALPHABET_SIZE, NO_ENERGY};
pub use equivalence::{EngineStats, EquivalenceEngine, Identifier, merge_energy};
pub use error::{QuantError, Result};
pub use history::{History, ParseHistoryError, Symbol};
pub use prefix::{Node, PrefixIndex};
pub use system::{QuantSystem, SystemStats};
