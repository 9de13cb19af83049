//! Key bindings and the trie that dispatches them.
//!
//! Raw bindings (`from` key-sequence text, `to` action text) are resolved
//! against a builtin table by [`parse_raw_bindings`] and stored in a
//! [`BindingTrie`] that the normal mode consults on every key.

pub mod binding;
pub mod trie;

pub use binding::{
    parse_raw_bindings, rebind, Action, Binding, Builtin, BuiltinTable, CommandRunner, RawBinding,
};
pub use trie::{BindingNode, BindingTrie, Leaf, Leaves, Lookup};
