//! Declaration parser boundary.
//!
//! Go source is parsed with tree-sitter and classified once into the
//! [`Declaration`] sum type. Nothing downstream touches syntax nodes.

pub mod go_file;

pub use go_file::GoFile;

/// A type expression as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `int64`, `Toy`, or `second.Toy` (with `qualifier = Some("second")`).
    Named {
        qualifier: Option<String>,
        name: String,
    },
    /// `[]T` or `[N]T`.
    List(Box<TypeExpr>),
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// Anything else (pointers, channels, funcs, inline structs, generics).
    Unsupported(String),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            qualifier: None,
            name: name.into(),
        }
    }

    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            qualifier: Some(qualifier.into()),
            name: name.into(),
        }
    }

    /// The bare kind string used by the model (`second.Toy` -> `Toy`,
    /// `[]Role` -> `[]Role`, maps collapse to `map[K]V`).
    ///
    /// Unsupported expressions render as an empty string.
    pub fn kind(&self) -> String {
        match self {
            Self::Named { name, .. } => name.clone(),
            Self::List(element) => format!("[]{}", element.kind()),
            Self::Map { key, value } => format!("map[{}]{}", key.kind(), value.kind()),
            Self::Unsupported(_) => String::new(),
        }
    }
}

/// A parameter or struct field. `names` is empty for unnamed parameters and
/// embedded struct fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    pub names: Vec<String>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMethod {
    pub name: String,
    pub params: Vec<RawField>,
    pub results: Vec<RawField>,
    /// The last param is `...T` (stored in `params` as `[]T`).
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Initializer {
    /// A single literal, kept verbatim (`2`, `"admin"`, `-1`).
    Literal(String),
    /// Any other expression, including `iota`.
    Expression(String),
    /// No initializer (implicit repetition inside a `const` block).
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub alias: Option<String>,
    pub path: String,
}

impl ImportDecl {
    /// Package name the import binds, honouring an alias.
    pub fn package_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueDecl {
    pub name: String,
    pub type_name: Option<String>,
    pub initializer: Initializer,
}

/// Top-level declarations the extractor cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Struct { name: String, fields: Vec<RawField> },
    /// A named type whose underlying type is not a struct or interface.
    Named { name: String, underlying: TypeExpr },
    Interface { name: String, methods: Vec<RawMethod> },
    Import(ImportDecl),
    Value(ValueDecl),
}

/// Go's export rule: an identifier is exported when it starts with an
/// upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
