//! Tracks which function literals are authenticated handlers.
//!
//! An authenticated handler is the function literal passed as the `handler`
//! property of the first argument of an approved wrapper call:
//!
//! ```text
//! authenticatedQuery({ args: {}, handler: async (ctx) => { ... } })
//!                                         ^^^^^^^^^^^^^^^^^^^^^^^^^ root
//! ```
//!
//! Registration happens when the wrapper call is visited. The traversal is
//! pre-order, so the handler is registered before any node inside its body
//! is checked.

use std::collections::HashSet;

use authlint_core::syntax::{callee_identifier, first_argument, import_declaration, object_property};
use authlint_core::{ConventionsConfig, FunctionId, NodeKind, ParsedFile, ScopeChain};
use tree_sitter::Node;

use crate::aliases::{ImportAliases, ModuleMatcher};

/// Property of the wrapper's definition object holding the callback.
const HANDLER_PROPERTY: &str = "handler";

/// Wrapper imports and registered handler roots of one file.
#[derive(Debug)]
pub struct HandlerScopes {
    aliases: ImportAliases,
    roots: HashSet<FunctionId>,
}

impl HandlerScopes {
    /// Creates an empty tracker for `conventions`.
    ///
    /// Wrappers are recognized when imported from one of the wrapper module
    /// spellings, from any specifier containing the wrapper substring, or
    /// re-exported through the generated server module.
    #[must_use]
    pub fn new(conventions: &ConventionsConfig) -> Self {
        let modules = ModuleMatcher::new()
            .exact(conventions.wrapper_modules.iter().cloned())
            .containing([conventions.wrapper_module_substring.clone()])
            .containing(conventions.server_modules.iter().cloned());
        let wrappers = conventions.wrapper_names().map(str::to_owned);

        Self {
            aliases: ImportAliases::new(modules, wrappers),
            roots: HashSet::new(),
        }
    }

    /// Records wrapper imports from an import declaration.
    pub fn observe_import(&mut self, file: &ParsedFile<'_>, node: &Node<'_>) {
        if let Some(decl) = import_declaration(file, node) {
            self.aliases.register(&decl);
        }
    }

    /// Registers the handler of a wrapper call.
    ///
    /// Returns the registered root, or `None` when `call` is not a wrapper
    /// call or its handler is not an inline function literal.
    pub fn observe_call(&mut self, file: &ParsedFile<'_>, call: &Node<'_>) -> Option<FunctionId> {
        let local = callee_identifier(file, call)?;
        let wrapper = self.aliases.resolve(local)?;

        let definition = first_argument(call)?;
        let handler = object_property(file, &definition, HANDLER_PROPERTY)?;
        if NodeKind::classify(&handler) != NodeKind::FunctionLiteral {
            tracing::debug!(
                "{wrapper} call at line {} has a non-literal handler",
                call.start_position().row + 1
            );
            return None;
        }

        let root = FunctionId::of(&handler);
        self.roots.insert(root);
        Some(root)
    }

    /// Returns true if `function` is a registered handler.
    #[must_use]
    pub fn is_root(&self, function: FunctionId) -> bool {
        self.roots.contains(&function)
    }

    /// The registered handler enclosing the current position, if any.
    ///
    /// Walks every enclosing function literal outward, so helpers nested in
    /// a handler are inside it too.
    #[must_use]
    pub fn enclosing_root(&self, scopes: &ScopeChain) -> Option<FunctionId> {
        scopes.ancestors().find(|f| self.is_root(*f))
    }

    /// Returns true if no handler has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
