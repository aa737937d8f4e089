/// Number of distinct symbols a history may contain.
pub const ALPHABET_SIZE: usize = 4;

/// Stored energy that the query layer reports as "no energy recorded".
/// The engine itself keeps and returns it like any other value.
pub const NO_ENERGY: u64 = 0;
