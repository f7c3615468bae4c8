//! Rule to forbid `ctx.auth.getUserIdentity()` inside authenticated handlers.
//!
//! # Rationale
//!
//! `authenticatedQuery` / `authenticatedMutation` resolve the caller's
//! identity before the handler runs and hand it over on the context. Looking
//! it up again inside the handler duplicates work and bypasses the single
//! place where a missing identity is rejected.
//!
//! # Detected Patterns
//!
//! - `ctx.auth.getUserIdentity()` anywhere lexically inside a handler passed
//!   to an approved wrapper, including inside helper closures declared in the
//!   handler body
//!
//! # Not Detected
//!
//! - A bare reference without a call (`const f = ctx.auth.getUserIdentity`)
//! - The same call in functions that are never passed as a wrapper handler
//! - Anything in the exempt auth module

use authlint_core::syntax::{call_callee, member_chain};
use authlint_core::{
    ConventionsConfig, FileCheck, FileContext, NodeKind, ParsedFile, Rule, Severity, Suggestion,
    Violation, Visit,
};
use tree_sitter::Node;

use crate::handler_scope::HandlerScopes;

/// Rule code for no-ctx-identity-lookup.
pub const CODE: &str = "AUTH002";

/// Rule name for no-ctx-identity-lookup.
pub const NAME: &str = "no-ctx-identity-lookup";

/// Message identifier reported by this rule.
pub const MESSAGE_ID: &str = "useContextIdentity";

/// Forbids the identity lookup inside authenticated handlers.
#[derive(Debug, Clone)]
pub struct NoCtxIdentityLookup {
    conventions: ConventionsConfig,
    severity: Severity,
}

impl Default for NoCtxIdentityLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl NoCtxIdentityLookup {
    /// Creates the rule with the default conventions.
    #[must_use]
    pub fn new() -> Self {
        Self::from_conventions(&ConventionsConfig::default())
    }

    /// Creates the rule from configured conventions.
    #[must_use]
    pub fn from_conventions(conventions: &ConventionsConfig) -> Self {
        Self {
            conventions: conventions.clone(),
            severity: Severity::Error,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn forbidden_call_text(&self) -> String {
        format!("{}()", self.conventions.forbidden_call.join("."))
    }

    /// Returns true if `call` invokes the forbidden member chain.
    fn is_forbidden_call(&self, file: &ParsedFile<'_>, call: &Node<'_>) -> bool {
        let Some(callee) = call_callee(call) else {
            return false;
        };
        if NodeKind::classify(&callee) != NodeKind::MemberExpression {
            return false;
        }
        member_chain(file, &callee).is_some_and(|chain| {
            chain.len() == self.conventions.forbidden_call.len()
                && chain
                    .iter()
                    .zip(&self.conventions.forbidden_call)
                    .all(|(seg, want)| *seg == want.as_str())
        })
    }
}

impl Rule for NoCtxIdentityLookup {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids ctx.auth.getUserIdentity() inside authenticated handlers"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::ImportDeclaration, NodeKind::CallExpression]
    }

    fn create<'a>(&'a self, ctx: &FileContext<'a>) -> Option<Box<dyn FileCheck + 'a>> {
        if ctx.path_ends_with(&self.conventions.exempt_file) {
            tracing::debug!("{NAME}: {} is the exempt file", ctx.path.display());
            return None;
        }

        Some(Box::new(IdentityLookupCheck {
            rule: self,
            handlers: HandlerScopes::new(&self.conventions),
            violations: Vec::new(),
        }))
    }
}

struct IdentityLookupCheck<'a> {
    rule: &'a NoCtxIdentityLookup,
    handlers: HandlerScopes,
    violations: Vec<Violation>,
}

impl FileCheck for IdentityLookupCheck<'_> {
    fn visit(&mut self, visit: &Visit<'_, '_>) {
        match visit.kind {
            NodeKind::ImportDeclaration => self.handlers.observe_import(visit.file, &visit.node),
            NodeKind::CallExpression => {
                if let Some(root) = self.handlers.observe_call(visit.file, &visit.node) {
                    tracing::debug!("{NAME}: registered handler {root:?}");
                    return;
                }
                if self.handlers.is_empty() || !self.rule.is_forbidden_call(visit.file, &visit.node) {
                    return;
                }
                if self.handlers.enclosing_root(visit.scopes).is_none() {
                    return;
                }
                self.report(visit);
            }
            _ => {}
        }
    }

    fn finish(self: Box<Self>) -> Vec<Violation> {
        self.violations
    }
}

impl IdentityLookupCheck<'_> {
    fn report(&mut self, visit: &Visit<'_, '_>) {
        let call = self.rule.forbidden_call_text();
        self.violations.push(
            Violation::new(
                CODE,
                NAME,
                self.rule.severity,
                visit.file.location(&visit.node),
                format!("`{call}` inside an authenticated handler; the wrapper already resolved the identity"),
            )
            .with_message_id(MESSAGE_ID)
            .with_suggestion(Suggestion::new(
                "read the identity the authenticated wrapper places on the handler context",
            )),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authlint_core::Analyzer;
    use std::path::Path;

    const IMPORT: &str = "import { authenticatedQuery, authenticatedMutation } from \"./auth\";\n";

    fn check(path: &str, src: &str) -> Vec<Violation> {
        Analyzer::builder()
            .root("/repo")
            .rule(NoCtxIdentityLookup::new())
            .build()
            .expect("analyzer should build")
            .check_source(&Path::new("/repo").join(path), src)
            .expect("source should parse")
    }

    fn lines(violations: &[Violation]) -> Vec<usize> {
        violations.iter().map(|v| v.location.line).collect()
    }

    #[test]
    fn flags_lookup_directly_in_handler() {
        let src = format!(
            "{IMPORT}export const me = authenticatedQuery({{\n  args: {{}},\n  handler: async (ctx) => {{\n    await ctx.auth.getUserIdentity();\n  }},\n}});\n"
        );
        let v = check("convex/notes.ts", &src);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].message_id.as_deref(), Some(MESSAGE_ID));
        assert_eq!((v[0].location.line, v[0].location.column), (5, 11));
        assert_eq!(v[0].location.length, "ctx.auth.getUserIdentity()".len());
    }

    #[test]
    fn flags_lookup_in_nested_helpers() {
        let src = format!(
            r#"{IMPORT}export const a = authenticatedMutation({{
  handler: async (ctx) => {{
    const load = async () => {{
      if (true) {{
        return ctx.auth.getUserIdentity();
      }}
    }};
    function again() {{
      return [1].map(() => ctx.auth.getUserIdentity());
    }}
    return load();
  }},
}});
"#
        );
        assert_eq!(lines(&check("convex/notes.ts", &src)), vec![6, 10]);
    }

    #[test]
    fn ignores_lookup_outside_handlers() {
        let src = format!(
            r#"{IMPORT}export async function helper(ctx) {{
  return ctx.auth.getUserIdentity();
}}
export const a = authenticatedQuery({{
  args: {{ id: ctx.auth.getUserIdentity() }},
  handler: helper,
}});
"#
        );
        assert!(check("convex/notes.ts", &src).is_empty());
    }

    #[test]
    fn ignores_reference_without_call_and_other_chains() {
        let src = format!(
            r#"{IMPORT}export const a = authenticatedQuery({{
  handler: async (ctx, args) => {{
    const lookup = ctx.auth.getUserIdentity;
    await args.auth.getUserIdentity();
    await ctx.auth.getUserIdentity.call(null);
    await ctx.auth["getUserIdentity"]();
    await context.auth.getUserIdentity();
  }},
}});
"#
        );
        assert!(check("convex/notes.ts", &src).is_empty());
    }

    #[test]
    fn ignores_handlers_of_unimported_wrappers() {
        let src = r#"export const a = authenticatedQuery({
  handler: async (ctx) => ctx.auth.getUserIdentity(),
});
"#;
        assert!(check("convex/notes.ts", src).is_empty());
    }

    #[test]
    fn handler_scope_ends_with_the_handler() {
        let src = format!(
            r#"{IMPORT}export const a = authenticatedQuery({{ handler: async (ctx) => 1 }});
export const b = async (ctx) => ctx.auth.getUserIdentity();
"#
        );
        assert!(check("convex/notes.ts", &src).is_empty());
    }

    #[test]
    fn exempt_file_registers_no_handlers() {
        let src = format!(
            "{IMPORT}export const a = authenticatedQuery({{ handler: async (ctx) => ctx.auth.getUserIdentity() }});\n"
        );
        assert!(check("convex/auth.ts", &src).is_empty());
    }
}
