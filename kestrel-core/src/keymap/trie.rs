//! Prefix trie of key bindings.
//!
//! `BindingTrie` maps key sequences to bindings. Children are keyed by the
//! normalized key, so lookups compare keys by binding equality. A node with
//! neither a binding nor children is never kept in the tree.

use std::sync::Arc;

use foldhash::HashMap;

use super::binding::Binding;
use crate::input::{Key, KeySequence};

/// A trie node: an optional terminal binding plus children.
#[derive(Debug, Clone, Default)]
pub struct BindingNode {
    binding: Option<Arc<Binding>>,
    children: HashMap<Key, BindingNode>,
    /// Insertion order of `children`, for stable enumeration.
    order: Vec<Key>,
}

impl BindingNode {
    #[must_use]
    pub fn binding(&self) -> Option<&Arc<Binding>> {
        self.binding.as_ref()
    }

    #[must_use]
    pub fn child(&self, key: &Key) -> Option<&Self> {
        self.children.get(&key.normalize())
    }

    /// Children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&Key, &Self)> {
        self.order.iter().filter_map(|k| self.children.get(k).map(|c| (k, c)))
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.binding.is_none() && self.children.is_empty()
    }

    /// Walk `keys` down from this node, ignoring terminal bindings on the way.
    #[must_use]
    pub fn walk(&self, keys: &[Key]) -> Option<&Self> {
        keys.iter().try_fold(self, |node, key| node.child(key))
    }

    /// Every terminal binding under this node, depth first.
    ///
    /// `prefix` is the path from the trie root to this node; each leaf path
    /// is reported from the root.
    #[must_use]
    pub fn leaves(&self, prefix: KeySequence) -> Leaves<'_> {
        Leaves {
            stack: vec![(self, prefix)],
        }
    }

    fn insert(&mut self, keys: &[Key], binding: Arc<Binding>) -> Option<Arc<Binding>> {
        match keys.split_first() {
            None => self.binding.replace(binding),
            Some((first, rest)) => {
                let key = first.normalize();
                if !self.children.contains_key(&key) {
                    self.order.push(key);
                }
                self.children.entry(key).or_default().insert(rest, binding)
            }
        }
    }

    fn remove(&mut self, keys: &[Key]) -> Option<Arc<Binding>> {
        let Some((first, rest)) = keys.split_first() else {
            return self.binding.take();
        };
        let key = first.normalize();
        let child = self.children.get_mut(&key)?;
        let removed = child.remove(rest);
        if child.is_empty() {
            self.children.remove(&key);
            self.order.retain(|k| *k != key);
        }
        removed
    }
}

/// Outcome of looking up a key sequence.
#[derive(Debug)]
pub enum Lookup<'a> {
    /// No binding starts with the sequence.
    Absent,
    /// The sequence is a strict prefix of at least one binding.
    Interior(&'a BindingNode),
    /// The sequence reaches a binding.
    Terminal(&'a Arc<Binding>),
}

/// One terminal binding found by [`BindingNode::leaves`].
#[derive(Debug, Clone)]
pub struct Leaf<'a> {
    pub path: KeySequence,
    pub binding: &'a Arc<Binding>,
}

/// Lazy depth-first enumeration of terminal bindings.
pub struct Leaves<'a> {
    stack: Vec<(&'a BindingNode, KeySequence)>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = Leaf<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, path)) = self.stack.pop() {
            let children: Vec<_> = node.children().collect();
            for (key, child) in children.into_iter().rev() {
                self.stack.push((child, path.with(*key)));
            }
            if let Some(binding) = &node.binding {
                return Some(Leaf { path, binding });
            }
        }
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct BindingTrie {
    root: BindingNode,
}

impl BindingTrie {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bindings(bindings: impl IntoIterator<Item = Binding>) -> Self {
        let mut trie = Self::new();
        for binding in bindings {
            trie.insert(binding);
        }
        trie
    }

    #[must_use]
    pub fn root(&self) -> &BindingNode {
        &self.root
    }

    /// Bind `binding.from`, replacing any binding already at that exact
    /// path. Returns the replaced binding. Empty sequences are never bound.
    pub fn insert(&mut self, binding: Binding) -> Option<Arc<Binding>> {
        if binding.from.is_empty() {
            log::warn!("ignoring binding '{}' with an empty key sequence", binding.name);
            return None;
        }
        let keys = binding.from.clone();
        self.root.insert(&keys, Arc::new(binding))
    }

    /// Unbind `keys`, pruning nodes left without bindings or children.
    pub fn remove(&mut self, keys: &[Key]) -> Option<Arc<Binding>> {
        if keys.is_empty() {
            return None;
        }
        self.root.remove(keys)
    }

    /// Resolve `keys`. Every key must be on a path from the root; the
    /// binding, if any, is the one at the end of that path.
    #[must_use]
    pub fn lookup(&self, keys: &[Key]) -> Lookup<'_> {
        let Some(node) = self.root.walk(keys) else {
            return Lookup::Absent;
        };
        match &node.binding {
            Some(binding) if !keys.is_empty() => Lookup::Terminal(binding),
            _ if node.has_children() => Lookup::Interior(node),
            _ => Lookup::Absent,
        }
    }

    /// The node at `keys`, if one exists.
    #[must_use]
    pub fn node(&self, keys: &[Key]) -> Option<&BindingNode> {
        self.root.walk(keys)
    }

    /// Every terminal binding at or below `prefix`.
    #[must_use]
    pub fn leaves(&self, prefix: &[Key]) -> Leaves<'_> {
        match self.node(prefix) {
            Some(node) => node.leaves(KeySequence::from(prefix)),
            None => Leaves { stack: Vec::new() },
        }
    }

    /// Where typing `remaining` after reaching `from` would land.
    #[must_use]
    pub fn predict<'a>(from: &'a BindingNode, remaining: &[Key]) -> Option<&'a BindingNode> {
        from.walk(remaining)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.root.leaves(KeySequence::new()).count()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::input::{parse_sequence, KeyModifiers};
    use crate::keymap::binding::Action;

    fn seq(text: &str) -> KeySequence {
        parse_sequence(text).expect("should parse")
    }

    fn binding(from: &str, name: &str) -> Binding {
        Binding::new(seq(from), name, "", Action::new(|_| {}))
    }

    fn leaf_names(trie: &BindingTrie, prefix: &str) -> Vec<(String, String)> {
        trie.leaves(&seq(prefix))
            .map(|leaf| (leaf.path.to_string(), leaf.binding.name.clone()))
            .collect()
    }

    #[test]
    fn reinsert_replaces_terminal() {
        let mut trie = BindingTrie::new();
        assert!(trie.insert(binding("ab", "X")).is_none());
        let replaced = trie.insert(binding("ab", "Y")).expect("X should be replaced");
        assert_eq!(replaced.name, "X");
        assert_eq!(leaf_names(&trie, ""), [("ab".to_string(), "Y".to_string())]);
        match trie.lookup(&seq("ab")) {
            Lookup::Terminal(b) => assert_eq!(b.name, "Y"),
            other => panic!("expected Terminal, got {other:?}"),
        }
    }

    #[test]
    fn shared_prefix_is_interior() {
        let trie = BindingTrie::from_bindings([binding("ab", "X"), binding("ac", "Y")]);
        match trie.lookup(&seq("a")) {
            Lookup::Interior(node) => {
                assert!(node.binding().is_none());
                assert_eq!(node.children().count(), 2);
            }
            other => panic!("expected Interior, got {other:?}"),
        }
        assert!(matches!(trie.lookup(&seq("x")), Lookup::Absent));
        assert!(matches!(trie.lookup(&seq("abc")), Lookup::Absent));
        assert_eq!(
            leaf_names(&trie, ""),
            [("ab".to_string(), "X".to_string()), ("ac".to_string(), "Y".to_string())]
        );
    }

    #[test]
    fn lookup_running_past_a_binding_is_absent() {
        let trie = BindingTrie::from_bindings([binding("ab", "X")]);
        assert!(matches!(trie.lookup(&seq("abc")), Lookup::Absent));
        assert!(matches!(trie.lookup(&seq("abab")), Lookup::Absent));
        match trie.lookup(&seq("ab")) {
            Lookup::Terminal(b) => assert_eq!(b.name, "X"),
            other => panic!("expected Terminal, got {other:?}"),
        }
    }

    #[test]
    fn binding_with_children_is_terminal() {
        let trie = BindingTrie::from_bindings([binding("g", "G"), binding("gg", "GG")]);
        assert!(matches!(trie.lookup(&seq("g")), Lookup::Terminal(b) if b.name == "G"));
        assert!(matches!(trie.lookup(&seq("gg")), Lookup::Terminal(b) if b.name == "GG"));
        assert!(matches!(trie.lookup(&seq("ggg")), Lookup::Absent));
    }

    #[test]
    fn lookup_past_the_tree_is_absent() {
        let trie = BindingTrie::from_bindings([binding("ab", "X")]);
        assert!(matches!(trie.lookup(&seq("ax")), Lookup::Absent));
        assert!(matches!(trie.lookup(&seq("b")), Lookup::Absent));
    }

    #[test]
    fn empty_lookup_on_empty_trie_is_absent() {
        let trie = BindingTrie::new();
        assert!(matches!(trie.lookup(&[]), Lookup::Absent));
        assert!(trie.is_empty());
    }

    #[test]
    fn lookup_ignores_extra_modifiers() {
        let trie = BindingTrie::from_bindings([binding("<C-a>", "X")]);
        let key = parse_sequence("<C-a>").expect("parse")[0].with_modifiers(KeyModifiers::SHIFT | KeyModifiers::MOD2);
        assert!(matches!(trie.lookup(&[key]), Lookup::Terminal(_)));
        assert!(matches!(trie.lookup(&seq("a")), Lookup::Absent));
    }

    #[test]
    fn leaves_under_prefix_report_root_paths() {
        let trie = BindingTrie::from_bindings([binding("gg", "top"), binding("ge", "end"), binding("x", "close")]);
        assert_eq!(
            leaf_names(&trie, "g"),
            [("gg".to_string(), "top".to_string()), ("ge".to_string(), "end".to_string())]
        );
        assert!(leaf_names(&trie, "q").is_empty());
        assert_eq!(trie.len(), 3);
    }

    #[test]
    fn leaves_yield_node_binding_before_children() {
        let trie = BindingTrie::from_bindings([binding("ab", "deep"), binding("a", "shallow")]);
        let names: Vec<_> = leaf_names(&trie, "").into_iter().map(|(_, n)| n).collect();
        assert_eq!(names, ["shallow", "deep"]);
    }

    #[test]
    fn leaves_are_restartable() {
        let trie = BindingTrie::from_bindings([binding("ab", "X"), binding("c", "Y")]);
        let first: Vec<_> = leaf_names(&trie, "");
        let second: Vec<_> = leaf_names(&trie, "");
        assert_eq!(first, second);
    }

    #[test]
    fn predict_walks_without_committing() {
        let trie = BindingTrie::from_bindings([binding("gg", "top"), binding("gte", "x")]);
        let g = trie.node(&seq("g")).expect("g node");
        let landed = BindingTrie::predict(g, &seq("t")).expect("gt node");
        assert!(landed.binding().is_none());
        let landed = BindingTrie::predict(g, &seq("g")).expect("gg node");
        assert_eq!(landed.binding().map(|b| b.name.as_str()), Some("top"));
        assert!(BindingTrie::predict(g, &seq("z")).is_none());
    }

    #[test]
    fn remove_prunes_empty_nodes() {
        let mut trie = BindingTrie::from_bindings([binding("abc", "X"), binding("ad", "Y")]);
        assert_eq!(trie.remove(&seq("abc")).map(|b| b.name.clone()), Some("X".to_string()));
        assert!(trie.node(&seq("ab")).is_none());
        assert!(matches!(trie.lookup(&seq("a")), Lookup::Interior(_)));
        assert!(trie.remove(&seq("abc")).is_none());
        trie.remove(&seq("ad"));
        assert!(trie.is_empty());
    }

    #[test]
    fn empty_sequence_is_not_bound() {
        let mut trie = BindingTrie::new();
        assert!(trie.insert(binding("", "X")).is_none());
        assert!(trie.is_empty());
    }

    proptest! {
        #[test]
        fn last_insert_wins_and_leaves_are_unique(
            paths in prop::collection::vec(("[a-d]{1,3}", 0u8..4), 1..24)
        ) {
            let mut trie = BindingTrie::new();
            let mut expected = std::collections::BTreeMap::new();
            for (path, tag) in &paths {
                trie.insert(binding(path, &tag.to_string()));
                expected.insert(path.clone(), tag.to_string());
            }
            let mut seen = std::collections::BTreeMap::new();
            for leaf in trie.leaves(&[]) {
                prop_assert!(seen.insert(leaf.path.to_string(), leaf.binding.name.clone()).is_none());
            }
            prop_assert_eq!(seen, expected);
        }
    }
}
