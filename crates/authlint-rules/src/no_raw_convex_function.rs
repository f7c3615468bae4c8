//! Rule to forbid direct calls of the raw Convex function factories.
//!
//! # Rationale
//!
//! `query` and `mutation` from the generated server module build endpoints
//! with no authentication. Every endpoint outside the auth module must be
//! built with the matching wrapper (`authenticatedQuery`,
//! `authenticatedMutation`), which resolves the caller's identity first.
//!
//! # Detected Patterns
//!
//! - `query({...})` / `mutation({...})` where the callee is a named import
//!   from a module path containing `_generated/server`, under any local name
//!
//! # Allowed Patterns
//!
//! - Anything in the exempt auth module (`convex/auth.ts`), which defines
//!   the wrappers on top of the raw factories
//!
//! There is no autofix: the wrapped forms take a different handler signature.

use authlint_core::syntax::{callee_identifier, call_callee, import_declaration};
use authlint_core::{
    BannedCall, ConventionsConfig, FileCheck, FileContext, NodeKind, Rule, Severity, Suggestion,
    Violation, Visit,
};

use crate::aliases::{ImportAliases, ModuleMatcher};

/// Rule code for no-raw-convex-function.
pub const CODE: &str = "AUTH001";

/// Rule name for no-raw-convex-function.
pub const NAME: &str = "no-raw-convex-function";

/// Forbids direct calls of the raw query/mutation factories.
#[derive(Debug, Clone)]
pub struct NoRawConvexFunction {
    banned: Vec<BannedCall>,
    server_modules: Vec<String>,
    exempt_file: String,
    severity: Severity,
}

impl Default for NoRawConvexFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl NoRawConvexFunction {
    /// Creates the rule with the default conventions.
    #[must_use]
    pub fn new() -> Self {
        Self::from_conventions(&ConventionsConfig::default())
    }

    /// Creates the rule from configured conventions.
    #[must_use]
    pub fn from_conventions(conventions: &ConventionsConfig) -> Self {
        Self {
            banned: conventions.banned.clone(),
            server_modules: conventions.server_modules.clone(),
            exempt_file: conventions.exempt_file.clone(),
            severity: Severity::Error,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn banned_entry(&self, canonical: &str) -> Option<&BannedCall> {
        self.banned.iter().find(|b| b.raw == canonical)
    }
}

impl Rule for NoRawConvexFunction {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids raw query/mutation factories where an authenticated wrapper exists"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::ImportDeclaration, NodeKind::CallExpression]
    }

    fn create<'a>(&'a self, ctx: &FileContext<'a>) -> Option<Box<dyn FileCheck + 'a>> {
        if ctx.path_ends_with(&self.exempt_file) {
            tracing::debug!("{NAME}: {} is the exempt file", ctx.path.display());
            return None;
        }

        let aliases = ImportAliases::new(
            ModuleMatcher::new().containing(self.server_modules.iter().cloned()),
            self.banned.iter().map(|b| b.raw.clone()),
        );
        Some(Box::new(RawCallCheck {
            rule: self,
            aliases,
            violations: Vec::new(),
        }))
    }
}

struct RawCallCheck<'a> {
    rule: &'a NoRawConvexFunction,
    aliases: ImportAliases,
    violations: Vec<Violation>,
}

impl FileCheck for RawCallCheck<'_> {
    fn visit(&mut self, visit: &Visit<'_, '_>) {
        match visit.kind {
            NodeKind::ImportDeclaration => {
                if let Some(decl) = import_declaration(visit.file, &visit.node) {
                    self.aliases.register(&decl);
                }
            }
            NodeKind::CallExpression => self.check_call(visit),
            _ => {}
        }
    }

    fn finish(self: Box<Self>) -> Vec<Violation> {
        self.violations
    }
}

impl RawCallCheck<'_> {
    fn check_call(&mut self, visit: &Visit<'_, '_>) {
        if self.aliases.is_empty() {
            return;
        }
        let Some(local) = callee_identifier(visit.file, &visit.node) else {
            return;
        };
        let Some(canonical) = self.aliases.resolve(local) else {
            return;
        };
        let Some(banned) = self.rule.banned_entry(canonical) else {
            return;
        };
        let Some(callee) = call_callee(&visit.node) else {
            return;
        };

        let source = self
            .aliases
            .binding(local)
            .map_or("", |b| b.source.as_str());
        self.violations.push(
            Violation::new(
                CODE,
                NAME,
                self.rule.severity,
                visit.file.location(&callee),
                format!(
                    "Use `{}` instead of `{}` from `{source}`",
                    banned.wrapper, banned.raw
                ),
            )
            .with_message_id(&banned.message_id)
            .with_suggestion(Suggestion::new(format!(
                "import `{}` from the auth module; its handler receives the resolved identity",
                banned.wrapper
            ))),
        );
    }
}
