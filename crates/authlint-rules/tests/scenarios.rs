//! End-to-end checks of both rules through a single analyzer pass.

use std::path::Path;

use authlint_core::{Analyzer, Config, LintResult, Violation};
use authlint_rules::{all_rules, NoCtxIdentityLookup, NoRawConvexFunction};

fn analyzer() -> Analyzer {
    let mut builder = Analyzer::builder().root("/app");
    for rule in all_rules(&Config::default().conventions) {
        builder = builder.rule_box(rule);
    }
    builder.build().expect("analyzer should build")
}

fn check(path: &str, src: &str) -> Vec<Violation> {
    analyzer()
        .check_source(&Path::new("/app").join(path), src)
        .expect("source should parse")
}

fn ids(violations: &[Violation]) -> Vec<&str> {
    violations
        .iter()
        .filter_map(|v| v.message_id.as_deref())
        .collect()
}

fn at(v: &Violation) -> (usize, usize) {
    (v.location.line, v.location.column)
}

#[test]
fn raw_query_call_is_reported_at_the_callee() {
    let src = r#"import { query } from "./_generated/server";

export const list = query({
  args: {},
  handler: async (ctx) => ctx.db.query("notes").collect(),
});
"#;
    let v = check("convex/notes.ts", src);
    assert_eq!(ids(&v), vec!["useAuthenticatedQuery"]);
    assert_eq!(at(&v[0]), (3, 21));
    assert_eq!(v[0].location.length, 5);
}

#[test]
fn identity_lookup_in_handler_is_reported_at_the_call() {
    let src = r#"import { authenticatedQuery } from "./auth";

export const me = authenticatedQuery({
  args: {},
  handler: async (ctx) => {
    await ctx.auth.getUserIdentity();
  },
});
"#;
    let v = check("convex/notes.ts", src);
    assert_eq!(ids(&v), vec!["useContextIdentity"]);
    assert_eq!(at(&v[0]), (6, 11));
}

#[test]
fn identity_lookup_in_nested_helper_is_reported_once() {
    let src = r#"import { authenticatedQuery } from "./auth";

export const me = authenticatedQuery({
  args: {},
  handler: async (ctx) => {
    const lookup = async () => {
      return await ctx.auth.getUserIdentity();
    };
    return await lookup();
  },
});
"#;
    let v = check("convex/notes.ts", src);
    assert_eq!(ids(&v), vec!["useContextIdentity"]);
    assert_eq!(at(&v[0]), (7, 20));
}

#[test]
fn exempt_file_yields_nothing_from_either_rule() {
    let src = r#"import { query, mutation } from "./_generated/server";
import { authenticatedQuery } from "./auth";

export const whoami = query({
  handler: async (ctx) => ctx.auth.getUserIdentity(),
});
export const me = authenticatedQuery({
  handler: async (ctx) => ctx.auth.getUserIdentity(),
});
export const save = mutation({ handler: async () => {} });
"#;
    assert!(check("convex/auth.ts", src).is_empty());
    assert!(analyzer()
        .check_source(Path::new(r"C:\app\convex\auth.ts"), src)
        .expect("source should parse")
        .is_empty());
    assert_eq!(check("convex/notes.ts", src).len(), 3);
}

#[test]
fn every_aliased_call_is_reported_once() {
    for local in ["query", "q", "rawQuery", "$query"] {
        let src = format!(
            "import {{ query as {local} }} from \"../_generated/server\";\n{local}({{}});\nfoo({local}({{}}));\n"
        );
        let v = check("convex/deep/items.ts", &src);
        assert_eq!(ids(&v), vec!["useAuthenticatedQuery"; 2], "alias {local}");
        assert_eq!(at(&v[0]), (2, 1));
        assert_eq!(v[0].location.length, local.len());
    }
}

#[test]
fn identity_lookup_outside_handlers_is_never_reported() {
    let src = r#"import { authenticatedQuery } from "./auth";
import { query } from "./_generated/server";

async function currentUser(ctx) {
  return await ctx.auth.getUserIdentity();
}

export const open = query({
  handler: async (ctx) => ctx.auth.getUserIdentity(),
});
"#;
    let v = check("convex/users.ts", src);
    assert_eq!(ids(&v), vec!["useAuthenticatedQuery"]);
}

#[test]
fn diagnostics_of_both_rules_follow_source_order() {
    let src = r#"import { query } from "./_generated/server";
import { authenticatedQuery } from "./auth";
export const me = authenticatedQuery({ handler: async (ctx) => ctx.auth.getUserIdentity() });
export const list = query({});
"#;
    let v = check("convex/notes.ts", src);
    assert_eq!(ids(&v), vec!["useContextIdentity", "useAuthenticatedQuery"]);
    assert_eq!(at(&v[0]), (3, 64));
    assert_eq!(at(&v[1]), (4, 21));
}

#[test]
fn files_do_not_share_import_state() {
    let analyzer = analyzer();
    let first = "import { query } from './_generated/server';\nimport { authenticatedQuery } from './auth';\n";
    let second = "query({});\nauthenticatedQuery({ handler: async (ctx) => ctx.auth.getUserIdentity() });\n";

    assert!(analyzer
        .check_source(Path::new("/app/convex/a.ts"), first)
        .expect("source should parse")
        .is_empty());
    assert!(analyzer
        .check_source(Path::new("/app/convex/b.ts"), second)
        .expect("source should parse")
        .is_empty());
}

#[test]
fn malformed_source_degrades_to_no_findings() {
    let src = "import { query } from './_generated/server';\nquery(\nauthenticatedQuery({ handler: ";
    let v = check("convex/broken.ts", src);
    assert!(v.len() <= 1);
    assert!(ids(&v).iter().all(|id| *id == "useAuthenticatedQuery"));
}

#[test]
fn rules_can_run_alone() {
    let src = r#"import { query } from "./_generated/server";
import { authenticatedQuery } from "./auth";
query({});
authenticatedQuery({ handler: async (ctx) => ctx.auth.getUserIdentity() });
"#;
    let only_b = Analyzer::builder()
        .root("/app")
        .rule(NoCtxIdentityLookup::new())
        .build()
        .expect("analyzer should build");
    let v = only_b
        .check_source(Path::new("/app/convex/x.tsx"), src)
        .expect("source should parse");
    assert_eq!(ids(&v), vec!["useContextIdentity"]);

    let only_a = Analyzer::builder()
        .root("/app")
        .rule(NoRawConvexFunction::new())
        .build()
        .expect("analyzer should build");
    let v = only_a
        .check_source(Path::new("/app/convex/x.ts"), src)
        .expect("source should parse");
    assert_eq!(ids(&v), vec!["useAuthenticatedQuery"]);
}

#[test]
fn disabled_rule_in_config_is_skipped() {
    let config = Config::parse(
        r#"
[rules.no-ctx-identity-lookup]
enabled = false

[rules.no-raw-convex-function]
severity = "warning"
"#,
    )
    .expect("config should parse");
    let mut builder = Analyzer::builder().root("/app");
    for rule in all_rules(&config.conventions) {
        builder = builder.rule_box(rule);
    }
    let analyzer = builder.config(config).build().expect("analyzer should build");

    let src = r#"import { query } from "./_generated/server";
import { authenticatedQuery } from "./auth";
query({ handler: async (ctx) => 1 });
authenticatedQuery({ handler: async (ctx) => ctx.auth.getUserIdentity() });
"#;
    let v = analyzer
        .check_source(Path::new("/app/convex/x.ts"), src)
        .expect("source should parse");
    assert_eq!(ids(&v), vec!["useAuthenticatedQuery"]);
    assert_eq!(v[0].severity, authlint_core::Severity::Warning);
}

#[test]
fn compact_report() {
    let src = r#"import { query, mutation as rawMutation } from "./_generated/server";
import { authenticatedQuery } from "./auth";

export const list = query({ handler: async () => [] });
export const save = rawMutation({ handler: async () => {} });
export const me = authenticatedQuery({
  handler: async (ctx) => ctx.auth.getUserIdentity(),
});
"#;
    let mut result = LintResult {
        violations: check("convex/notes.ts", src),
        files_checked: 1,
    };
    result.sort();
    let compact: Vec<String> = result.violations.iter().map(ToString::to_string).collect();

    insta::assert_snapshot!(compact.join("\n"), @r"
    convex/notes.ts:4:21: error [AUTH001] Use `authenticatedQuery` instead of `query` from `./_generated/server` (useAuthenticatedQuery)
    convex/notes.ts:5:21: error [AUTH001] Use `authenticatedMutation` instead of `mutation` from `./_generated/server` (useAuthenticatedMutation)
    convex/notes.ts:7:27: error [AUTH002] `ctx.auth.getUserIdentity()` inside an authenticated handler; the wrapper already resolved the identity (useContextIdentity)
    ");
}
