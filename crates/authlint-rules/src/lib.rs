//! # authlint-rules
//!
//! Built-in lint rules for authlint.
//!
//! Both rules enforce the authentication conventions of a Convex backend:
//! endpoints are built with the authenticated wrappers, and handlers read the
//! identity the wrapper resolved instead of looking it up again.
//!
//! ## Available Rules
//!
//! | Code | Name | Message ids |
//! |------|------|-------------|
//! | AUTH001 | `no-raw-convex-function` | `useAuthenticatedQuery`, `useAuthenticatedMutation` |
//! | AUTH002 | `no-ctx-identity-lookup` | `useContextIdentity` |
//!
//! ## Usage
//!
//! ```ignore
//! use authlint_core::Analyzer;
//! use authlint_rules::{NoCtxIdentityLookup, NoRawConvexFunction};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./convex")
//!     .rule(NoRawConvexFunction::new())
//!     .rule(NoCtxIdentityLookup::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aliases;
pub mod handler_scope;
pub mod no_ctx_identity_lookup;
pub mod no_raw_convex_function;
mod presets;

pub use aliases::{Binding, ImportAliases, ModuleMatcher};
pub use handler_scope::HandlerScopes;
pub use no_ctx_identity_lookup::NoCtxIdentityLookup;
pub use no_raw_convex_function::NoRawConvexFunction;
pub use presets::{all_rules, rule_by_name};

/// Re-export core types for convenience.
pub use authlint_core::{Rule, Severity, Violation};
