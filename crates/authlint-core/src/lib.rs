//! # authlint-core
//!
//! Core framework for authlint, a linter for authentication conventions in
//! Convex TypeScript code bases.
//!
//! This crate is the host traversal engine the rules plug into:
//!
//! - [`ParsedFile`] and [`NodeKind`] over the tree-sitter TypeScript grammar
//! - [`ScopeChain`] for lexical function-literal nesting
//! - [`Rule`] / [`FileCheck`] for per-file rules with node-kind subscriptions
//! - [`Analyzer`] for discovering files and running a single pre-order pass
//!   over each of them
//! - [`Violation`] for representing lint findings
//!
//! ## Example
//!
//! ```ignore
//! use authlint_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./convex")
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! print!("{}", result.format_report());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod rule;
mod types;

pub mod allowance;
pub mod scope;
pub mod syntax;
pub mod traverse;

pub use allowance::{AllowCheck, AllowDirectives};
pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError, SOURCE_EXTENSIONS};
pub use config::{AnalyzerConfig, BannedCall, Config, ConfigError, ConventionsConfig, RuleConfig};
pub use context::{path_ends_with, FileContext};
pub use rule::{FileCheck, Rule, RuleBox, Visit};
pub use scope::{FunctionId, ScopeChain};
pub use syntax::{ImportDecl, ImportSpecifier, NodeKind, ParseError, ParsedFile};
pub use types::{LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic};
