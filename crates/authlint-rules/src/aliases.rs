//! Per-file import alias table.
//!
//! Maps a local binding name to the name it was imported as, for the symbols
//! and source modules a rule cares about. Each rule builds its own table when
//! its per-file check is created, so nothing leaks between files.

use std::collections::{HashMap, HashSet};

use authlint_core::ImportDecl;

/// Which module specifiers an alias table accepts imports from.
#[derive(Debug, Clone, Default)]
pub struct ModuleMatcher {
    exact: Vec<String>,
    contains: Vec<String>,
}

impl ModuleMatcher {
    /// Creates a matcher that accepts nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts specifiers equal to any of `specs`.
    #[must_use]
    pub fn exact<I, S>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exact.extend(specs.into_iter().map(Into::into));
        self
    }

    /// Accepts specifiers containing any of `fragments`.
    #[must_use]
    pub fn containing<I, S>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contains.extend(
            fragments
                .into_iter()
                .map(Into::into)
                .filter(|f: &String| !f.is_empty()),
        );
        self
    }

    /// Returns true if `source` is accepted.
    #[must_use]
    pub fn matches(&self, source: &str) -> bool {
        self.exact.iter().any(|e| e == source)
            || self.contains.iter().any(|c| source.contains(c.as_str()))
    }
}

/// One imported binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Name exported by the source module.
    pub canonical: String,
    /// Module specifier it was imported from.
    pub source: String,
}

/// Local name → canonical name for tracked imports of one file.
#[derive(Debug, Clone)]
pub struct ImportAliases {
    modules: ModuleMatcher,
    symbols: HashSet<String>,
    bindings: HashMap<String, Binding>,
}

impl ImportAliases {
    /// Creates an empty table tracking `symbols` imported from `modules`.
    #[must_use]
    pub fn new<I, S>(modules: ModuleMatcher, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modules,
            symbols: symbols.into_iter().map(Into::into).collect(),
            bindings: HashMap::new(),
        }
    }

    /// Records the tracked specifiers of an import declaration.
    ///
    /// Returns how many bindings were recorded. A local name imported twice
    /// keeps the later binding.
    pub fn register(&mut self, decl: &ImportDecl) -> usize {
        if !self.modules.matches(&decl.source) {
            return 0;
        }

        let mut recorded = 0;
        for spec in &decl.specifiers {
            if !self.symbols.contains(&spec.imported) {
                continue;
            }
            self.bindings.insert(
                spec.local.clone(),
                Binding {
                    canonical: spec.imported.clone(),
                    source: decl.source.clone(),
                },
            );
            recorded += 1;
        }
        recorded
    }

    /// Canonical name of `local`, if it is a tracked import.
    #[must_use]
    pub fn resolve(&self, local: &str) -> Option<&str> {
        self.bindings.get(local).map(|b| b.canonical.as_str())
    }

    /// Full binding of `local`, if it is a tracked import.
    #[must_use]
    pub fn binding(&self, local: &str) -> Option<&Binding> {
        self.bindings.get(local)
    }

    /// Returns true if no binding has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
