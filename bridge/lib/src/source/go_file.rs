use std::path::{Path, PathBuf};

use tree_sitter::{Node, Parser};

use crate::error::ExtractionError;
use crate::source::{
    Declaration, ImportDecl, Initializer, RawField, RawMethod, TypeExpr, ValueDecl,
};

/// A parsed Go source file reduced to its top-level declarations.
#[derive(Debug, Clone)]
pub struct GoFile {
    /// Path the source was read from.
    pub path: PathBuf,
    /// Name from the `package` clause.
    pub package: String,
    pub declarations: Vec<Declaration>,
}

impl GoFile {
    /// Reads and parses the file on disk.
    ///
    /// ## Errors
    /// Returns an error if the file cannot be read or does not parse cleanly.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ExtractionError> {
        let path = path.as_ref().to_path_buf();
        let source = std::fs::read_to_string(&path).map_err(|source| ExtractionError::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(path, &source)
    }

    /// Parses Go source text.
    ///
    /// Any error or missing node in the syntax tree rejects the whole file.
    pub fn parse(path: impl Into<PathBuf>, source: &str) -> Result<Self, ExtractionError> {
        let path = path.into();

        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_go::LANGUAGE.into())?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ExtractionError::ParseFailed { path: path.clone() })?;
        let root = tree.root_node();

        if root.has_error() {
            let (line, column) = first_error_position(root);
            return Err(ExtractionError::Syntax { path, line, column });
        }

        let reader = NodeReader {
            source: source.as_bytes(),
        };

        let mut package = None;
        let mut declarations = Vec::new();
        let mut cursor = root.walk();

        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "package_clause" => {
                    package = find_child_by_kind(node, "package_identifier")
                        .or_else(|| find_child_by_kind(node, "identifier"))
                        .map(|n| reader.text(n));
                }
                "import_declaration" => reader.imports(node, &mut declarations),
                "type_declaration" => reader.types(node, &mut declarations),
                "const_declaration" | "var_declaration" => reader.values(node, &mut declarations),
                _ => {}
            }
        }

        let package = package.ok_or_else(|| ExtractionError::MissingPackage { path: path.clone() })?;

        Ok(Self {
            path,
            package,
            declarations,
        })
    }
}

struct NodeReader<'s> {
    source: &'s [u8],
}

impl NodeReader<'_> {
    fn text(&self, node: Node<'_>) -> String {
        node.utf8_text(self.source)
            .map(str::to_string)
            .unwrap_or_default()
    }

    fn imports(&self, node: Node<'_>, out: &mut Vec<Declaration>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => out.extend(self.import_spec(child)),
                "import_spec_list" => self.imports(child, out),
                _ => {}
            }
        }
    }

    fn import_spec(&self, node: Node<'_>) -> Option<Declaration> {
        let path = node.child_by_field_name("path").map(|n| self.text(n))?;
        let path = path.trim_matches(|c| c == '"' || c == '`').to_string();
        let alias = node.child_by_field_name("name").map(|n| self.text(n));

        Some(Declaration::Import(ImportDecl { alias, path }))
    }

    fn types(&self, node: Node<'_>, out: &mut Vec<Declaration>) {
        let mut cursor = node.walk();
        for spec in node.named_children(&mut cursor) {
            if !matches!(spec.kind(), "type_spec" | "type_alias") {
                continue;
            }

            let Some(name) = spec.child_by_field_name("name").map(|n| self.text(n)) else {
                continue;
            };

            if spec.child_by_field_name("type_parameters").is_some() {
                tracing::debug!(%name, "skipping generic type declaration");
                continue;
            }

            let Some(ty) = spec.child_by_field_name("type") else {
                continue;
            };

            let declaration = match ty.kind() {
                "struct_type" => Declaration::Struct {
                    name,
                    fields: self.struct_fields(ty),
                },
                "interface_type" => Declaration::Interface {
                    name,
                    methods: self.interface_methods(ty),
                },
                _ => Declaration::Named {
                    name,
                    underlying: self.type_expr(ty),
                },
            };
            out.push(declaration);
        }
    }

    fn struct_fields(&self, node: Node<'_>) -> Vec<RawField> {
        let Some(list) = find_child_by_kind(node, "field_declaration_list") else {
            return Vec::new();
        };

        let mut fields = Vec::new();
        let mut cursor = list.walk();
        for decl in list.named_children(&mut cursor) {
            if decl.kind() != "field_declaration" {
                continue;
            }
            fields.push(self.field(decl));
        }
        fields
    }

    fn interface_methods(&self, node: Node<'_>) -> Vec<RawMethod> {
        let mut methods = Vec::new();
        let mut cursor = node.walk();

        for elem in node.named_children(&mut cursor) {
            if !matches!(elem.kind(), "method_elem" | "method_spec") {
                continue;
            }

            let Some(name) = elem.child_by_field_name("name").map(|n| self.text(n)) else {
                continue;
            };

            let parameters = elem.child_by_field_name("parameters");
            let params = parameters
                .map(|list| self.parameter_list(list))
                .unwrap_or_default();
            let variadic = parameters.is_some_and(|list| {
                let mut cursor = list.walk();
                list.named_children(&mut cursor)
                    .filter(|decl| decl.kind() != "comment")
                    .last()
                    .is_some_and(|decl| decl.kind() == "variadic_parameter_declaration")
            });

            let results = match elem.child_by_field_name("result") {
                Some(result) if result.kind() == "parameter_list" => self.parameter_list(result),
                Some(result) => vec![RawField {
                    names: Vec::new(),
                    ty: self.type_expr(result),
                }],
                None => Vec::new(),
            };

            methods.push(RawMethod {
                name,
                params,
                results,
                variadic,
            });
        }

        methods
    }

    fn parameter_list(&self, node: Node<'_>) -> Vec<RawField> {
        let mut fields = Vec::new();
        let mut cursor = node.walk();

        for decl in node.named_children(&mut cursor) {
            match decl.kind() {
                "parameter_declaration" => fields.push(self.field(decl)),
                "variadic_parameter_declaration" => {
                    let mut field = self.field(decl);
                    field.ty = TypeExpr::List(Box::new(field.ty));
                    fields.push(field);
                }
                _ => {}
            }
        }

        fields
    }

    /// Reads a `field_declaration` or `parameter_declaration`.
    fn field(&self, node: Node<'_>) -> RawField {
        let mut cursor = node.walk();
        let names = node
            .children_by_field_name("name", &mut cursor)
            .map(|n| self.text(n))
            .collect();

        let ty = node
            .child_by_field_name("type")
            .map(|n| self.type_expr(n))
            .unwrap_or_else(|| TypeExpr::Unsupported(self.text(node)));

        RawField { names, ty }
    }

    fn type_expr(&self, node: Node<'_>) -> TypeExpr {
        match node.kind() {
            "type_identifier" | "identifier" => TypeExpr::named(self.text(node)),
            "qualified_type" => {
                let qualifier = node.child_by_field_name("package").map(|n| self.text(n));
                let name = node.child_by_field_name("name").map(|n| self.text(n));
                match (qualifier, name) {
                    (Some(qualifier), Some(name)) => TypeExpr::qualified(qualifier, name),
                    _ => TypeExpr::Unsupported(self.text(node)),
                }
            }
            "slice_type" | "array_type" => match node.child_by_field_name("element") {
                Some(element) => TypeExpr::List(Box::new(self.type_expr(element))),
                None => TypeExpr::Unsupported(self.text(node)),
            },
            "map_type" => {
                let key = node.child_by_field_name("key");
                let value = node.child_by_field_name("value");
                match (key, value) {
                    (Some(key), Some(value)) => TypeExpr::Map {
                        key: Box::new(self.type_expr(key)),
                        value: Box::new(self.type_expr(value)),
                    },
                    _ => TypeExpr::Unsupported(self.text(node)),
                }
            }
            "parenthesized_type" => {
                let mut cursor = node.walk();
                let inner = node.named_children(&mut cursor).next();
                match inner {
                    Some(inner) => self.type_expr(inner),
                    None => TypeExpr::Unsupported(self.text(node)),
                }
            }
            _ => TypeExpr::Unsupported(self.text(node)),
        }
    }

    fn values(&self, node: Node<'_>, out: &mut Vec<Declaration>) {
        let mut cursor = node.walk();
        for spec in node.named_children(&mut cursor) {
            match spec.kind() {
                "const_spec" | "var_spec" => self.value_spec(spec, out),
                "var_spec_list" => self.values(spec, out),
                _ => {}
            }
        }
    }

    fn value_spec(&self, node: Node<'_>, out: &mut Vec<Declaration>) {
        let type_name = node
            .child_by_field_name("type")
            .map(|n| self.type_expr(n))
            .and_then(|ty| match ty {
                TypeExpr::Named { name, .. } => Some(name),
                _ => None,
            });

        let values: Vec<Node<'_>> = match node.child_by_field_name("value") {
            Some(list) => {
                let mut cursor = list.walk();
                list.named_children(&mut cursor)
                    .filter(|n| n.kind() != "comment")
                    .collect()
            }
            None => Vec::new(),
        };

        let mut cursor = node.walk();
        let names: Vec<String> = node
            .children_by_field_name("name", &mut cursor)
            .map(|n| self.text(n))
            .collect();

        for (index, name) in names.into_iter().enumerate() {
            let initializer = match values.get(index) {
                Some(value) if is_literal(*value) => Initializer::Literal(self.text(*value)),
                Some(value) => Initializer::Expression(self.text(*value)),
                None => Initializer::Absent,
            };

            out.push(Declaration::Value(ValueDecl {
                name,
                type_name: type_name.clone(),
                initializer,
            }));
        }
    }
}

fn is_literal(node: Node<'_>) -> bool {
    match node.kind() {
        "int_literal"
        | "float_literal"
        | "imaginary_literal"
        | "rune_literal"
        | "interpreted_string_literal"
        | "raw_string_literal"
        | "true"
        | "false" => true,
        // Signed numeric literals such as `-1`.
        "unary_expression" => node
            .child_by_field_name("operand")
            .is_some_and(|operand| {
                matches!(
                    operand.kind(),
                    "int_literal" | "float_literal" | "imaginary_literal"
                )
            }),
        _ => false,
    }
}

fn find_child_by_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|child| child.kind() == kind)
}

/// One-based line and column of the first error or missing node.
fn first_error_position(root: Node<'_>) -> (usize, usize) {
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let start = node.start_position();
            return (start.row.saturating_add(1), start.column.saturating_add(1));
        }

        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    let start = root.start_position();
    (start.row.saturating_add(1), start.column.saturating_add(1))
}
