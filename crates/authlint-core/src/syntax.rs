//! Syntax layer over the tree-sitter TypeScript grammar.
//!
//! [`NodeKind::classify`] is the only place that looks at grammar kind
//! strings. Rules match on [`NodeKind`] and read nodes through the typed
//! helpers below (`import_declaration`, `call_callee`, `member_chain`, ...).

use tree_sitter::{Language, Node, Parser, Tree};

use crate::context::FileContext;
use crate::types::Location;

/// Node kinds the rule engine dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    /// `import { a as b } from "mod"`
    ImportDeclaration,
    /// `callee(args)`
    CallExpression,
    /// `object.property`
    MemberExpression,
    /// A plain identifier reference.
    Identifier,
    /// `{ key: value }`
    ObjectLiteral,
    /// Arrow functions, function expressions and declarations, methods.
    FunctionLiteral,
    /// Everything else; never dispatched.
    Other,
}

impl NodeKind {
    /// Classifies a tree-sitter node.
    #[must_use]
    pub fn classify(node: &Node<'_>) -> Self {
        // Keyword tokens share kind names with nodes (`function`, `import`).
        if !node.is_named() {
            return Self::Other;
        }
        match node.kind() {
            "import_statement" => Self::ImportDeclaration,
            "call_expression" => Self::CallExpression,
            "member_expression" => Self::MemberExpression,
            "identifier" => Self::Identifier,
            "object" => Self::ObjectLiteral,
            "arrow_function"
            | "function_expression"
            | "function_declaration"
            | "generator_function"
            | "generator_function_declaration"
            | "method_definition" => Self::FunctionLiteral,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ImportDeclaration => "ImportDeclaration",
            Self::CallExpression => "CallExpression",
            Self::MemberExpression => "MemberExpression",
            Self::Identifier => "Identifier",
            Self::ObjectLiteral => "ObjectLiteral",
            Self::FunctionLiteral => "FunctionLiteral",
            Self::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Errors raised while preparing a syntax tree.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The grammar could not be loaded into the parser.
    #[error("incompatible TypeScript grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    /// The parser produced no tree.
    #[error("parser returned no tree")]
    NoTree,
}

/// A parsed source file bound to its [`FileContext`].
pub struct ParsedFile<'a> {
    ctx: &'a FileContext<'a>,
    tree: Tree,
}

impl<'a> ParsedFile<'a> {
    /// Parses the file contents with the TypeScript (or TSX) grammar.
    ///
    /// Source with syntax errors still produces a tree; error nodes are
    /// simply never classified as anything but [`NodeKind::Other`].
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar cannot be loaded or no tree is produced.
    pub fn parse(ctx: &'a FileContext<'a>) -> Result<Self, ParseError> {
        let language: Language = if ctx.is_jsx() {
            tree_sitter_typescript::LANGUAGE_TSX.into()
        } else {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        };

        let mut parser = Parser::new();
        parser.set_language(&language)?;
        let tree = parser.parse(ctx.content, None).ok_or(ParseError::NoTree)?;

        if tree.root_node().has_error() {
            tracing::debug!(
                "Syntax errors in {}, analyzing partial tree",
                ctx.relative_path.display()
            );
        }

        Ok(Self { ctx, tree })
    }

    /// The file this tree was parsed from.
    #[must_use]
    pub fn context(&self) -> &'a FileContext<'a> {
        self.ctx
    }

    /// Root node of the tree.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`.
    #[must_use]
    pub fn text(&self, node: &Node<'_>) -> &'a str {
        node.utf8_text(self.ctx.content.as_bytes()).unwrap_or("")
    }

    /// Location of `node`, relative to the project root.
    #[must_use]
    pub fn location(&self, node: &Node<'_>) -> Location {
        let start = node.start_position();
        Location::new(self.ctx.relative_path.clone(), start.row + 1, start.column + 1)
            .with_span(node.start_byte(), node.end_byte() - node.start_byte())
    }
}

/// A named import specifier: `imported as local`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpecifier {
    /// Binding name in this file.
    pub local: String,
    /// Name exported by the source module.
    pub imported: String,
}

/// An import declaration with its named specifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Module path, without quotes.
    pub source: String,
    /// Named specifiers; default and namespace imports are not included.
    pub specifiers: Vec<ImportSpecifier>,
}

/// Reads an `import` statement.
///
/// Returns `None` for anything that is not an import with a string source.
#[must_use]
pub fn import_declaration(file: &ParsedFile<'_>, node: &Node<'_>) -> Option<ImportDecl> {
    if node.kind() != "import_statement" {
        return None;
    }
    let source = string_value(file, &node.child_by_field_name("source")?)?;

    let mut specifiers = Vec::new();
    let mut cursor = node.walk();
    for clause in node.named_children(&mut cursor) {
        if clause.kind() != "import_clause" {
            continue;
        }
        let mut clause_cursor = clause.walk();
        for named in clause.named_children(&mut clause_cursor) {
            if named.kind() != "named_imports" {
                continue;
            }
            let mut spec_cursor = named.walk();
            for spec in named.named_children(&mut spec_cursor) {
                if spec.kind() != "import_specifier" {
                    continue;
                }
                let Some(name) = spec.child_by_field_name("name") else {
                    continue;
                };
                let imported = if name.kind() == "string" {
                    match string_value(file, &name) {
                        Some(s) => s,
                        None => continue,
                    }
                } else {
                    file.text(&name).to_owned()
                };
                let local = spec
                    .child_by_field_name("alias")
                    .map_or_else(|| imported.clone(), |a| file.text(&a).to_owned());
                specifiers.push(ImportSpecifier { local, imported });
            }
        }
    }

    Some(ImportDecl { source, specifiers })
}

/// Contents of a string literal node, quotes stripped.
#[must_use]
pub fn string_value(file: &ParsedFile<'_>, node: &Node<'_>) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let text = file.text(node);
    let inner = text.get(1..text.len().checked_sub(1)?)?;
    Some(inner.to_owned())
}

/// Strips any number of wrapping parentheses.
#[must_use]
pub fn unwrap_parens<'t>(node: Node<'t>) -> Node<'t> {
    let mut current = node;
    while current.kind() == "parenthesized_expression" {
        match current.named_child(0) {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

/// Callee of a call expression.
#[must_use]
pub fn call_callee<'t>(call: &Node<'t>) -> Option<Node<'t>> {
    if call.kind() != "call_expression" {
        return None;
    }
    call.child_by_field_name("function")
}

/// Name of the callee when it is a plain identifier.
#[must_use]
pub fn callee_identifier<'a>(file: &ParsedFile<'a>, call: &Node<'_>) -> Option<&'a str> {
    let callee = call_callee(call)?;
    (callee.kind() == "identifier").then(|| file.text(&callee))
}

/// First argument of a call expression, skipping comments.
#[must_use]
pub fn first_argument<'t>(call: &Node<'t>) -> Option<Node<'t>> {
    let args = call.child_by_field_name("arguments")?;
    if args.kind() != "arguments" {
        // tagged template: `fn\`...\``
        return None;
    }
    let mut cursor = args.walk();
    let first = args
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment");
    first
}

/// Looks up a property of an object literal by identifier key.
///
/// For `key: value` pairs the (parenthesis-stripped) value is returned; for
/// method shorthand `key() {}` the method node itself is returned, since it
/// is the function literal.
#[must_use]
pub fn object_property<'t>(file: &ParsedFile<'_>, object: &Node<'t>, name: &str) -> Option<Node<'t>> {
    if NodeKind::classify(object) != NodeKind::ObjectLiteral {
        return None;
    }
    let mut cursor = object.walk();
    let found = object.named_children(&mut cursor).find_map(|prop| match prop.kind() {
        "pair" => {
            let key = prop.child_by_field_name("key")?;
            if key.kind() == "property_identifier" && file.text(&key) == name {
                prop.child_by_field_name("value").map(unwrap_parens)
            } else {
                None
            }
        }
        "method_definition" => {
            let key = prop.child_by_field_name("name")?;
            (key.kind() == "property_identifier" && file.text(&key) == name).then_some(prop)
        }
        _ => None,
    });
    found
}

/// Flattens a member chain rooted at an identifier: `a.b.c` → `["a", "b", "c"]`.
///
/// Returns `None` for computed access (`a[b]`) or non-identifier roots.
#[must_use]
pub fn member_chain<'a>(file: &ParsedFile<'a>, node: &Node<'_>) -> Option<Vec<&'a str>> {
    let mut segments = Vec::new();
    let mut current = unwrap_parens(*node);
    loop {
        match current.kind() {
            "member_expression" => {
                let property = current.child_by_field_name("property")?;
                if property.kind() != "property_identifier" {
                    return None;
                }
                segments.push(file.text(&property));
                current = unwrap_parens(current.child_by_field_name("object")?);
            }
            "identifier" => {
                segments.push(file.text(&current));
                break;
            }
            _ => return None,
        }
    }
    segments.reverse();
    Some(segments)
}
