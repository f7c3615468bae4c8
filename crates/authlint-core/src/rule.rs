//! Rule traits for defining lint rules.

use tree_sitter::Node;

use crate::context::FileContext;
use crate::scope::ScopeChain;
use crate::syntax::{NodeKind, ParsedFile};
use crate::types::{Severity, Violation};

/// A per-file lint rule over the TypeScript syntax tree.
///
/// A rule declares which [`NodeKind`]s it observes and, for every file,
/// builds a fresh [`FileCheck`] that holds all per-file state. The analyzer
/// walks the tree once and feeds each check the nodes it subscribed to.
///
/// # Example
///
/// ```ignore
/// use authlint_core::{FileCheck, FileContext, NodeKind, Rule, Violation, Visit};
///
/// pub struct NoEval;
///
/// impl Rule for NoEval {
///     fn name(&self) -> &'static str { "no-eval" }
///     fn code(&self) -> &'static str { "X001" }
///     fn interests(&self) -> &'static [NodeKind] { &[NodeKind::CallExpression] }
///
///     fn create<'a>(&'a self, _ctx: &FileContext<'a>) -> Option<Box<dyn FileCheck + 'a>> {
///         Some(Box::new(EvalCheck::default()))
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "no-raw-convex-function").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "AUTH001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Whether this rule requires a reason when using allow directives.
    ///
    /// By default, rules with `Severity::Error` require a reason.
    fn requires_allow_reason(&self) -> bool {
        self.default_severity() == Severity::Error
    }

    /// Node kinds this rule wants to observe.
    fn interests(&self) -> &'static [NodeKind];

    /// Builds the per-file check for `ctx`.
    ///
    /// Returning `None` means the rule registers no node handlers for this
    /// file at all.
    fn create<'a>(&'a self, ctx: &FileContext<'a>) -> Option<Box<dyn FileCheck + 'a>>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// Per-file state of a rule, fed nodes in pre-order.
pub trait FileCheck {
    /// Handles one node of a subscribed kind.
    fn visit(&mut self, visit: &Visit<'_, '_>);

    /// Ends the file pass and returns the violations in emission order.
    fn finish(self: Box<Self>) -> Vec<Violation>;
}

/// A node handed to a [`FileCheck`], with the file and scope chain around it.
pub struct Visit<'v, 't> {
    /// The node being visited.
    pub node: Node<'t>,
    /// Its classified kind.
    pub kind: NodeKind,
    /// The file being walked.
    pub file: &'v ParsedFile<'v>,
    /// Function literals lexically enclosing `node`.
    pub scopes: &'v ScopeChain,
}

impl Visit<'_, '_> {
    /// Source text of the visited node.
    #[must_use]
    pub fn text(&self) -> &str {
        self.file.text(&self.node)
    }
}
