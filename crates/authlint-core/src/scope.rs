//! Lexical scope chain of function literals.
//!
//! The traversal enters and exits function literals as it walks. Every
//! function remembers the function it was lexically nested in, so any
//! function can resolve its enclosing function without touching the tree.

use std::collections::HashMap;

use tree_sitter::Node;

/// Identity of a function-literal node within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(usize);

impl FunctionId {
    /// Identity of `node`.
    #[must_use]
    pub fn of(node: &Node<'_>) -> Self {
        Self(node.id())
    }
}

/// Function-literal nesting recorded during a single file pass.
#[derive(Debug, Default)]
pub struct ScopeChain {
    enclosing: HashMap<FunctionId, Option<FunctionId>>,
    open: Vec<FunctionId>,
}

impl ScopeChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters a function literal nested in the current innermost one.
    pub fn enter(&mut self, function: FunctionId) {
        self.enclosing.insert(function, self.innermost());
        self.open.push(function);
    }

    /// Leaves the innermost function literal.
    pub fn exit(&mut self) {
        self.open.pop();
    }

    /// The innermost function literal currently open, if any.
    #[must_use]
    pub fn innermost(&self) -> Option<FunctionId> {
        self.open.last().copied()
    }

    /// The function literal lexically enclosing `function`.
    ///
    /// `None` for top-level functions and for functions never entered.
    #[must_use]
    pub fn enclosing(&self, function: FunctionId) -> Option<FunctionId> {
        self.enclosing.get(&function).copied().flatten()
    }

    /// Walks outward from the innermost open function to the outermost.
    pub fn ancestors(&self) -> impl Iterator<Item = FunctionId> + '_ {
        std::iter::successors(self.innermost(), move |f| self.enclosing(*f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_and_exit_track_innermost() {
        let mut chain = ScopeChain::new();
        assert_eq!(chain.innermost(), None);

        chain.enter(FunctionId(1));
        chain.enter(FunctionId(2));
        assert_eq!(chain.innermost(), Some(FunctionId(2)));
        assert_eq!(chain.ancestors().count(), 2);

        chain.exit();
        assert_eq!(chain.innermost(), Some(FunctionId(1)));
    }

    #[test]
    fn enclosing_survives_exit() {
        let mut chain = ScopeChain::new();
        chain.enter(FunctionId(1));
        chain.enter(FunctionId(2));
        chain.exit();
        chain.exit();

        assert_eq!(chain.enclosing(FunctionId(2)), Some(FunctionId(1)));
        assert_eq!(chain.enclosing(FunctionId(1)), None);
        assert_eq!(chain.enclosing(FunctionId(99)), None);
    }

    #[test]
    fn ancestors_walk_outward() {
        let mut chain = ScopeChain::new();
        chain.enter(FunctionId(1));
        chain.enter(FunctionId(2));
        chain.exit();
        chain.enter(FunctionId(3));
        chain.enter(FunctionId(4));

        let walked: Vec<FunctionId> = chain.ancestors().collect();
        assert_eq!(walked, vec![FunctionId(4), FunctionId(3), FunctionId(1)]);
    }
}
