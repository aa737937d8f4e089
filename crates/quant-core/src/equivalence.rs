//! Dynamic union-find with per-class energy.
//!
//! Every class keeps its members in a dense `Vec`. Every identifier records
//! its class slot and its position inside that `Vec`, so any member can be
//! removed in O(1) by swapping the last member into its place. Merges move
//! the smaller class into the larger one, member by member. That bounds the
//! total migration work at O(n log n) without path compression.
//!
//! Identifier numbers and class slots both live in dense arenas. Freed
//! entries go onto a reuse stack that is drained before either arena grows.

use std::fmt;

use serde::Serialize;

/// Opaque handle to an element of the engine.
///
/// Valid from [`EquivalenceEngine::create_identifier`] until
/// [`EquivalenceEngine::delete_identifier`]; the number may be handed out
/// again afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(u32);

impl Identifier {
    pub fn value(self) -> u32 {
        self.0
    }

    fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an identifier currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Binding {
    /// Number is on the free stack.
    Free,
    /// Live, no class yet.
    Unattached,
    /// Live member of `class`, stored at `members[position]`.
    Attached { class: usize, position: usize },
}

#[derive(Debug)]
struct Class {
    members: Vec<Identifier>,
    energy: u64,
}

/// Counters describing arena occupancy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub live_identifiers: usize,
    pub free_identifiers: usize,
    pub classes: usize,
    pub free_class_slots: usize,
}

/// Mean of two energies rounded down, computed without overflow.
///
/// `a/2 + b/2` falls one short of `(a + b) / 2` only when both halves were
/// truncated, i.e. when both inputs are odd. Symmetric in its arguments.
pub fn merge_energy(a: u64, b: u64) -> u64 {
    a / 2 + b / 2 + (a & b & 1)
}

#[derive(Debug, Default)]
pub struct EquivalenceEngine {
    bindings: Vec<Binding>,
    free_ids: Vec<Identifier>,
    classes: Vec<Option<Class>>,
    free_classes: Vec<usize>,
}

impl EquivalenceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an identifier that belongs to no class.
    pub fn create_identifier(&mut self) -> Identifier {
        let id = match self.free_ids.pop() {
            Some(id) => {
                tracing::trace!(%id, "recycled identifier");
                id
            }
            None => {
                let raw = u32::try_from(self.bindings.len())
                    .unwrap_or_else(|_| panic!("identifier space exhausted"));
                self.bindings.push(Binding::Free);
                Identifier(raw)
            }
        };
        self.bindings[id.slot()] = Binding::Unattached;
        id
    }

    /// Drop `id` from its class (destroying the class if it empties) and
    /// return its number to the free stack.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live.
    pub fn delete_identifier(&mut self, id: Identifier) {
        match self.binding(id) {
            Binding::Free => panic!("delete of identifier {id} that is not live"),
            Binding::Unattached => {}
            Binding::Attached { class, position } => self.detach(class, position),
        }
        self.bindings[id.slot()] = Binding::Free;
        self.free_ids.push(id);
    }

    /// Energy of `id`'s class, or `None` while `id` has no class.
    pub fn get_energy(&self, id: Identifier) -> Option<u64> {
        match self.binding(id) {
            Binding::Attached { class, .. } => Some(self.class(class).energy),
            _ => None,
        }
    }

    /// Set the energy of `id`'s whole class, founding a singleton class
    /// when `id` has none.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live.
    pub fn set_energy(&mut self, id: Identifier, energy: u64) {
        match self.binding(id) {
            Binding::Free => panic!("set_energy on identifier {id} that is not live"),
            Binding::Attached { class, .. } => self.class_mut(class).energy = energy,
            Binding::Unattached => {
                let class = self.alloc_class(Class {
                    members: vec![id],
                    energy,
                });
                self.bindings[id.slot()] = Binding::Attached { class, position: 0 };
                tracing::debug!(%id, class, energy, "created class");
            }
        }
    }

    /// Merge the classes of `id1` and `id2`.
    ///
    /// An unattached `id2` simply joins `id1`'s class. Two distinct classes
    /// are merged smaller-into-larger and the survivor takes the
    /// [`merge_energy`] of both energies. On a size tie `id1`'s class survives.
    ///
    /// # Panics
    ///
    /// Panics if `id1` is not attached to a class or `id2` is not live.
    pub fn union(&mut self, id1: Identifier, id2: Identifier) {
        let Binding::Attached { class: class1, .. } = self.binding(id1) else {
            panic!("union requires {id1} to belong to a class");
        };

        let class2 = match self.binding(id2) {
            Binding::Free => panic!("union with identifier {id2} that is not live"),
            Binding::Unattached => {
                self.push_member(class1, id2);
                return;
            }
            Binding::Attached { class, .. } => class,
        };
        if class1 == class2 {
            return;
        }

        let (large, small) = if self.class(class1).members.len() < self.class(class2).members.len()
        {
            (class2, class1)
        } else {
            (class1, class2)
        };

        let absorbed = self.classes[small]
            .take()
            .unwrap_or_else(|| panic!("class slot {small} is empty"));
        let survivor = self.class_mut(large);
        let merged = merge_energy(survivor.energy, absorbed.energy);
        tracing::debug!(
            large,
            small,
            large_size = survivor.members.len(),
            small_size = absorbed.members.len(),
            large_energy = survivor.energy,
            small_energy = absorbed.energy,
            merged,
            "merged classes"
        );
        survivor.energy = merged;

        for member in absorbed.members {
            self.push_member(large, member);
        }
        self.free_classes.push(small);
    }

    /// Number of members in `id`'s class; 0 while unattached.
    pub fn class_size(&self, id: Identifier) -> usize {
        match self.binding(id) {
            Binding::Attached { class, .. } => self.class(class).members.len(),
            _ => 0,
        }
    }

    /// True if both identifiers are attached to the same class.
    pub fn same_class(&self, a: Identifier, b: Identifier) -> bool {
        match (self.binding(a), self.binding(b)) {
            (Binding::Attached { class: ca, .. }, Binding::Attached { class: cb, .. }) => ca == cb,
            _ => false,
        }
    }

    pub fn is_live(&self, id: Identifier) -> bool {
        self.bindings
            .get(id.slot())
            .is_some_and(|b| *b != Binding::Free)
    }

    pub fn live_identifiers(&self) -> usize {
        self.bindings.len() - self.free_ids.len()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len() - self.free_classes.len()
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            live_identifiers: self.live_identifiers(),
            free_identifiers: self.free_ids.len(),
            classes: self.class_count(),
            free_class_slots: self.free_classes.len(),
        }
    }

    // --- internals ---

    fn binding(&self, id: Identifier) -> Binding {
        self.bindings
            .get(id.slot())
            .copied()
            .unwrap_or(Binding::Free)
    }

    fn class(&self, slot: usize) -> &Class {
        self.classes[slot]
            .as_ref()
            .unwrap_or_else(|| panic!("class slot {slot} is empty"))
    }

    fn class_mut(&mut self, slot: usize) -> &mut Class {
        self.classes[slot]
            .as_mut()
            .unwrap_or_else(|| panic!("class slot {slot} is empty"))
    }

    fn alloc_class(&mut self, class: Class) -> usize {
        match self.free_classes.pop() {
            Some(slot) => {
                self.classes[slot] = Some(class);
                slot
            }
            None => {
                self.classes.push(Some(class));
                self.classes.len() - 1
            }
        }
    }

    /// Append `id` to `class` and rebind it there. Leaves any previous
    /// membership untouched.
    fn push_member(&mut self, class: usize, id: Identifier) {
        let members = &mut self.class_mut(class).members;
        let position = members.len();
        members.push(id);
        self.bindings[id.slot()] = Binding::Attached { class, position };
    }

    /// Remove the member at `position` of `class` by swapping the last
    /// member into its place; frees the class slot once it is empty.
    fn detach(&mut self, class: usize, position: usize) {
        let members = &mut self.class_mut(class).members;
        members.swap_remove(position);
        let moved = members.get(position).copied();
        let now_empty = members.is_empty();

        if let Some(moved) = moved {
            self.bindings[moved.slot()] = Binding::Attached { class, position };
        }
        if now_empty {
            self.classes[class] = None;
            self.free_classes.push(class);
            tracing::trace!(class, "destroyed empty class");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energised(engine: &mut EquivalenceEngine, energy: u64) -> Identifier {
        let id = engine.create_identifier();
        engine.set_energy(id, energy);
        id
    }

    /// Every attached identifier must sit exactly where its binding says.
    fn assert_consistent(engine: &EquivalenceEngine) {
        for (raw, binding) in engine.bindings.iter().enumerate() {
            if let Binding::Attached { class, position } = *binding {
                let members = &engine.class(class).members;
                assert_eq!(
                    members[position].value() as usize,
                    raw,
                    "binding of #{raw} points at the wrong member"
                );
            }
        }
        for (slot, class) in engine.classes.iter().enumerate() {
            let Some(class) = class else {
                assert!(engine.free_classes.contains(&slot));
                continue;
            };
            assert!(!class.members.is_empty(), "empty class {slot} survived");
            for (position, id) in class.members.iter().enumerate() {
                assert_eq!(
                    engine.binding(*id),
                    Binding::Attached {
                        class: slot,
                        position
                    }
                );
            }
        }
    }

    #[test]
    fn test_create_identifier_is_unattached() {
        let mut engine = EquivalenceEngine::new();
        let id = engine.create_identifier();
        assert!(engine.is_live(id));
        assert_eq!(engine.get_energy(id), None);
        assert_eq!(engine.class_size(id), 0);
        assert_eq!(engine.class_count(), 0);
    }

    #[test]
    fn test_set_energy_creates_singleton() {
        let mut engine = EquivalenceEngine::new();
        let id = energised(&mut engine, 42);
        assert_eq!(engine.get_energy(id), Some(42));
        assert_eq!(engine.class_size(id), 1);
        assert_eq!(engine.class_count(), 1);
    }

    #[test]
    fn test_zero_energy_is_stored() {
        let mut engine = EquivalenceEngine::new();
        let id = energised(&mut engine, 0);
        assert_eq!(engine.get_energy(id), Some(0));
    }

    #[test]
    fn test_set_energy_overwrites_whole_class() {
        let mut engine = EquivalenceEngine::new();
        let a = energised(&mut engine, 10);
        let b = energised(&mut engine, 20);
        engine.union(a, b);
        engine.set_energy(b, 99);
        assert_eq!(engine.get_energy(a), Some(99));
        assert_eq!(engine.get_energy(b), Some(99));
    }

    #[test]
    fn test_union_folds_unattached_without_energy_change() {
        let mut engine = EquivalenceEngine::new();
        let a = energised(&mut engine, 10);
        let b = engine.create_identifier();
        engine.union(a, b);
        assert!(engine.same_class(a, b));
        assert_eq!(engine.get_energy(b), Some(10));
        assert_eq!(engine.class_count(), 1);
        assert_consistent(&engine);
    }

    #[test]
    fn test_union_averages_energy() {
        let mut engine = EquivalenceEngine::new();
        let a = energised(&mut engine, 10);
        let b = energised(&mut engine, 7);
        engine.union(a, b);
        assert_eq!(engine.get_energy(a), Some(8));
        assert_eq!(engine.get_energy(b), Some(8));
        assert_eq!(engine.class_count(), 1);
        assert_eq!(engine.stats().free_class_slots, 1);
    }

    #[test]
    fn test_union_same_class_is_noop() {
        let mut engine = EquivalenceEngine::new();
        let a = energised(&mut engine, 10);
        let b = energised(&mut engine, 7);
        engine.union(a, b);
        engine.union(b, a);
        engine.union(a, a);
        assert_eq!(engine.get_energy(a), Some(8));
        assert_eq!(engine.class_size(a), 2);
    }

    #[test]
    fn test_union_moves_small_into_large() {
        let mut engine = EquivalenceEngine::new();
        let big = energised(&mut engine, 100);
        for _ in 0..3 {
            let extra = engine.create_identifier();
            engine.union(big, extra);
        }
        let small = energised(&mut engine, 50);
        let Binding::Attached { class: big_class, .. } = engine.binding(big) else {
            panic!("big must be attached");
        };

        // small is the first argument, but the bigger class must survive
        engine.union(small, big);
        assert_eq!(
            engine.binding(small),
            Binding::Attached {
                class: big_class,
                position: 4
            }
        );
        assert_eq!(engine.class_size(big), 5);
        assert_eq!(engine.get_energy(small), Some(75));
        assert_consistent(&engine);
    }

    #[test]
    fn test_delete_swaps_last_member_into_hole() {
        let mut engine = EquivalenceEngine::new();
        let a = energised(&mut engine, 1);
        let b = engine.create_identifier();
        let c = engine.create_identifier();
        engine.union(a, b);
        engine.union(a, c);

        engine.delete_identifier(a);
        assert!(!engine.is_live(a));
        assert_eq!(engine.class_size(b), 2);
        assert!(engine.same_class(b, c));
        assert_consistent(&engine);
    }

    #[test]
    fn test_delete_last_member_destroys_class() {
        let mut engine = EquivalenceEngine::new();
        let a = energised(&mut engine, 5);
        engine.delete_identifier(a);
        assert_eq!(engine.class_count(), 0);
        assert_eq!(engine.stats().free_class_slots, 1);

        // the freed slot is reused before the arena grows
        let b = energised(&mut engine, 6);
        assert_eq!(engine.classes.len(), 1);
        assert_eq!(engine.get_energy(b), Some(6));
    }

    #[test]
    fn test_identifiers_recycled_lifo() {
        let mut engine = EquivalenceEngine::new();
        let a = engine.create_identifier();
        let b = engine.create_identifier();
        engine.delete_identifier(a);
        engine.delete_identifier(b);
        assert_eq!(engine.create_identifier(), b);
        assert_eq!(engine.create_identifier(), a);
        assert_eq!(engine.stats().live_identifiers, 2);
        assert_eq!(engine.create_identifier().value(), 2);
    }

    #[test]
    fn test_recycled_identifier_starts_unattached() {
        let mut engine = EquivalenceEngine::new();
        let a = energised(&mut engine, 3);
        engine.delete_identifier(a);
        let again = engine.create_identifier();
        assert_eq!(again, a);
        assert_eq!(engine.get_energy(again), None);
    }

    #[test]
    #[should_panic(expected = "not live")]
    fn test_double_delete_panics() {
        let mut engine = EquivalenceEngine::new();
        let a = engine.create_identifier();
        engine.delete_identifier(a);
        engine.delete_identifier(a);
    }

    #[test]
    #[should_panic(expected = "belong to a class")]
    fn test_union_requires_attached_first() {
        let mut engine = EquivalenceEngine::new();
        let a = engine.create_identifier();
        let b = energised(&mut engine, 1);
        engine.union(a, b);
    }

    #[test]
    fn test_merge_energy_examples() {
        assert_eq!(merge_energy(10, 7), 8);
        assert_eq!(merge_energy(7, 10), 8);
        assert_eq!(merge_energy(9, 7), 8);
        assert_eq!(merge_energy(3, 5), 4);
        assert_eq!(merge_energy(0, 1), 0);
        assert_eq!(merge_energy(1, 1), 1);
        assert_eq!(merge_energy(u64::MAX, u64::MAX), u64::MAX);
        assert_eq!(merge_energy(u64::MAX, u64::MAX - 1), u64::MAX - 1);
    }
}
