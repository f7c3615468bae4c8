//! Single-pass pre-order traversal.
//!
//! A node is dispatched before any of its children are visited, so state a
//! check records on a parent is visible while its subtree is walked. A
//! function literal is dispatched with the scope chain as it stood outside of
//! it and entered right after.

use tree_sitter::Node;

use crate::rule::{FileCheck, Visit};
use crate::scope::{FunctionId, ScopeChain};
use crate::syntax::{NodeKind, ParsedFile};

/// A check together with the node kinds it subscribed to.
pub struct Subscriber<'a> {
    /// Kinds forwarded to `check`.
    pub interests: &'static [NodeKind],
    /// The per-file check.
    pub check: Box<dyn FileCheck + 'a>,
}

/// Walks the whole tree of `file` once, feeding each subscriber.
///
/// Returns the number of nodes visited.
pub fn walk(file: &ParsedFile<'_>, subscribers: &mut [Subscriber<'_>]) -> usize {
    let root = file.root();
    let mut scopes = ScopeChain::new();
    let mut cursor = root.walk();
    let mut visited = 0;

    loop {
        let node = cursor.node();
        let kind = NodeKind::classify(&node);
        visited += 1;

        if kind != NodeKind::Other {
            dispatch(file, &scopes, node, kind, subscribers);
        }
        if kind == NodeKind::FunctionLiteral {
            scopes.enter(FunctionId::of(&node));
        }

        if cursor.goto_first_child() {
            continue;
        }

        // Leave finished nodes until one has a next sibling.
        loop {
            if NodeKind::classify(&cursor.node()) == NodeKind::FunctionLiteral {
                scopes.exit();
            }
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return visited;
            }
        }
    }
}

fn dispatch(
    file: &ParsedFile<'_>,
    scopes: &ScopeChain,
    node: Node<'_>,
    kind: NodeKind,
    subscribers: &mut [Subscriber<'_>],
) {
    let visit = Visit {
        node,
        kind,
        file,
        scopes,
    };
    for sub in subscribers.iter_mut() {
        if sub.interests.contains(&kind) {
            sub.check.visit(&visit);
        }
    }
}
