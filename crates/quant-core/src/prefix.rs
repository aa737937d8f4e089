//! Prefix tree over the four-symbol alphabet.
//!
//! Each node exclusively owns its children, so the edges form a strict tree.
//! Erasing a subtree and dropping the whole tree both walk an explicit stack
//! instead of recursing. History length is unbounded, and recursion depth
//! would follow it.

use crate::constants::ALPHABET_SIZE;
use crate::equivalence::{EquivalenceEngine, Identifier};
use crate::history::Symbol;

/// One history reachable from the root.
///
/// `id` is `None` until the history first receives energy.
#[derive(Debug, Default)]
pub struct Node {
    children: [Option<Box<Node>>; ALPHABET_SIZE],
    id: Option<Identifier>,
}

impl Node {
    pub fn identifier(&self) -> Option<Identifier> {
        self.id
    }

    pub fn child(&self, symbol: Symbol) -> Option<&Node> {
        self.children[symbol.index()].as_deref()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    fn take_children(&mut self) -> impl Iterator<Item = Box<Node>> + '_ {
        self.children.iter_mut().filter_map(Option::take)
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut stack: Vec<Box<Node>> = self.take_children().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.take_children());
            // `node` drops here with no children left
        }
    }
}

/// Prefix tree keyed by symbol paths. The empty path is the root.
#[derive(Debug, Default)]
pub struct PrefixIndex {
    root: Node,
    len: usize,
}

impl PrefixIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes below the root.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Create every missing node along `path`. Returns how many were created.
    pub fn declare(&mut self, path: &[Symbol]) -> usize {
        let mut created = 0;
        let mut current = &mut self.root;
        for symbol in path {
            current = current.children[symbol.index()].get_or_insert_with(|| {
                created += 1;
                Box::default()
            });
        }
        self.len += created;
        created
    }

    /// Erase the node at `path` together with its whole subtree, deleting
    /// every identifier found there from `engine`.
    ///
    /// An empty or absent path is left alone. Returns the number of nodes
    /// erased.
    pub fn remove(&mut self, path: &[Symbol], engine: &mut EquivalenceEngine) -> usize {
        let Some((last, parent_path)) = path.split_last() else {
            return 0;
        };
        let Some(parent) = self.lookup_mut(parent_path) else {
            return 0;
        };
        let Some(subtree) = parent.children[last.index()].take() else {
            return 0;
        };

        let erased = erase(subtree, engine);
        self.len -= erased;
        tracing::debug!(depth = path.len(), erased, "erased subtree");
        erased
    }

    /// True if a node exists at exactly `path`.
    pub fn valid(&self, path: &[Symbol]) -> bool {
        self.lookup(path).is_some()
    }

    pub fn lookup(&self, path: &[Symbol]) -> Option<&Node> {
        path.iter()
            .try_fold(&self.root, |node, symbol| node.child(*symbol))
    }

    pub fn lookup_mut(&mut self, path: &[Symbol]) -> Option<&mut Node> {
        let mut current = &mut self.root;
        for symbol in path {
            current = current.children[symbol.index()].as_deref_mut()?;
        }
        Some(current)
    }

    /// Bind `id` to the node at `path`, returning the binding it replaced.
    /// `None` if the path is absent.
    pub(crate) fn attach(
        &mut self,
        path: &[Symbol],
        id: Identifier,
    ) -> Option<Option<Identifier>> {
        self.lookup_mut(path).map(|node| node.id.replace(id))
    }
}

/// Release a detached subtree depth-first, handing each identifier back to
/// `engine`. Returns the number of nodes released.
fn erase(subtree: Box<Node>, engine: &mut EquivalenceEngine) -> usize {
    let mut erased = 0;
    let mut stack = vec![subtree];
    while let Some(mut node) = stack.pop() {
        stack.extend(node.take_children());
        if let Some(id) = node.id.take() {
            engine.delete_identifier(id);
        }
        erased += 1;
    }
    erased
}
