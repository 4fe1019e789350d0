//! Type mapping from Go kinds to the vocabularies of the generated artifacts.
//!
//! [`map_kind`] is the client-side mapper (TypeScript). [`go_type_ref`]
//! decides how a field is spelled inside generated Go code and which import
//! that spelling needs.

use std::fmt;

use serde::Serialize;

use crate::model::{Arity, FieldSignature, IntermediateModel};

/// Go's predeclared scalar types.
pub fn is_builtin(kind: &str) -> bool {
    matches!(
        kind,
        "bool"
            | "byte"
            | "complex128"
            | "complex64"
            | "error"
            | "float32"
            | "float64"
            | "int"
            | "int16"
            | "int32"
            | "int64"
            | "int8"
            | "rune"
            | "string"
            | "uint"
            | "uint16"
            | "uint32"
            | "uint64"
            | "uint8"
            | "uintptr"
    )
}

/// Kind name of the well-known timestamp type (`time.Time`).
pub const TIMESTAMP_KIND: &str = "Time";

/// A TypeScript type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsKind {
    Boolean,
    Number,
    String,
    Date,
    /// Untyped placeholder used for maps and unclassified fields.
    Any,
    Array(Box<TsKind>),
    /// A generated type with the same name as the Go type.
    Named(String),
}

impl fmt::Display for TsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => f.write_str("boolean"),
            Self::Number => f.write_str("number"),
            Self::String => f.write_str("string"),
            Self::Date => f.write_str("Date"),
            Self::Any => f.write_str("any"),
            Self::Array(element) => write!(f, "{element}[]"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Maps a Go kind string to its TypeScript counterpart. First match wins.
///
/// ## Examples
///
/// ```
/// use bridge_lib::mapping::{map_kind, TsKind};
///
/// assert_eq!(map_kind("int64"), TsKind::Number);
/// assert_eq!(map_kind("[]Toy").to_string(), "Toy[]");
/// assert_eq!(map_kind("map[string]int"), TsKind::Any);
/// ```
pub fn map_kind(kind: &str) -> TsKind {
    match kind {
        "bool" => TsKind::Boolean,
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
        | "uint64" | "uintptr" | "byte" | "rune" => TsKind::Number,
        "float32" | "float64" => TsKind::Number,
        "string" => TsKind::String,
        TIMESTAMP_KIND => TsKind::Date,
        "error" | "complex64" | "complex128" => TsKind::String,
        "" => TsKind::Any,
        _ => {
            if let Some(element) = kind.strip_prefix("[]") {
                TsKind::Array(Box::new(map_kind(element)))
            } else if kind.starts_with("map[") {
                TsKind::Any
            } else {
                TsKind::Named(kind.to_string())
            }
        }
    }
}

/// Maps a field, honouring its arity.
pub fn map_field(field: &FieldSignature) -> TsKind {
    let kind = map_kind(&field.kind);
    match field.arity {
        Arity::Single => kind,
        Arity::List => TsKind::Array(Box::new(kind)),
    }
}

/// Splits `map[K]V` into `(K, V)`, respecting nested brackets.
pub fn split_map_kind(kind: &str) -> Option<(&str, &str)> {
    let inner = kind.strip_prefix("map[")?;
    let mut depth = 1usize;

    for (idx, c) in inner.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&inner[..idx], &inner[idx + 1..]));
                }
            }
            _ => {}
        }
    }

    None
}

/// How a field is written in generated Go code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoTypeRef {
    pub spelling: String,
    /// Import paths the spelling depends on, sorted and de-duplicated.
    pub imports: Vec<String>,
}

/// Resolves the Go spelling of `field` as seen from a generated package.
///
/// Every non-builtin type is qualified with its owning package, even the API
/// package itself, because the generated code lives in its own package. Map
/// keys and values lost their qualifiers during extraction, so they are
/// resolved by name against the extracted types; a map part that resolves to
/// nothing is spelled `any`.
pub fn go_type_ref(field: &FieldSignature, model: &IntermediateModel) -> GoTypeRef {
    let mut imports = Vec::new();
    let mut spelling = go_spelling(&field.kind, field.owning_package.as_deref(), model, &mut imports);
    if field.arity == Arity::List {
        spelling.insert_str(0, "[]");
    }

    imports.sort();
    imports.dedup();
    GoTypeRef { spelling, imports }
}

fn go_spelling(
    kind: &str,
    owner: Option<&str>,
    model: &IntermediateModel,
    imports: &mut Vec<String>,
) -> String {
    if let Some(element) = kind.strip_prefix("[]") {
        return format!("[]{}", go_spelling(element, owner, model, imports));
    }

    if let Some((key, value)) = split_map_kind(kind) {
        let key = go_map_part(key, model, imports);
        let value = go_map_part(value, model, imports);
        return format!("map[{key}]{value}");
    }

    if kind.is_empty() {
        return "any".to_string();
    }
    if is_builtin(kind) {
        return kind.to_string();
    }

    if let Some(package) = owner {
        imports.extend(model.imports.path_of(package).map(str::to_string));
        return format!("{package}.{kind}");
    }
    if kind == TIMESTAMP_KIND {
        imports.push("time".to_string());
        return "time.Time".to_string();
    }

    kind.to_string()
}

fn go_map_part(kind: &str, model: &IntermediateModel, imports: &mut Vec<String>) -> String {
    let mut base = kind;
    while let Some(rest) = base.strip_prefix("[]") {
        base = rest;
    }

    let owner = model
        .types_named(base)
        .next()
        .map(|ty| ty.owning_package.as_str());
    let spelled_as_declared =
        is_builtin(base) || base == TIMESTAMP_KIND || base.starts_with("map[");
    if owner.is_none() && !spelled_as_declared {
        return "any".to_string();
    }

    go_spelling(kind, owner, model, imports)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityReason {
    /// The declared type was not an identifier, selector, array or map.
    Unclassified,
    /// A map whose key or value is not a builtin; rendered opaquely.
    OpaqueMap,
    /// A named type that no visited package declares.
    UnresolvedType,
}

impl fmt::Display for AmbiguityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unclassified => f.write_str("type could not be classified"),
            Self::OpaqueMap => f.write_str("map with non-builtin key or value is emitted opaquely"),
            Self::UnresolvedType => f.write_str("type is not declared in any visited package"),
        }
    }
}

/// A field whose generated type is a degraded placeholder.
///
/// Never fatal; surfaced to the caller as a warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingAmbiguity {
    /// `Type` or `Interface.Method`.
    pub owner: String,
    pub field: String,
    pub kind: String,
    pub reason: AmbiguityReason,
}

impl fmt::Display for MappingAmbiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.owner, self.field, self.reason)
    }
}

/// Lists every field of the model whose mapping degrades.
pub fn ambiguities(model: &IntermediateModel) -> Vec<MappingAmbiguity> {
    let mut found = Vec::new();

    for ty in &model.types {
        for field in ty.fields() {
            found.extend(ambiguity_of(&ty.name, field));
        }
    }

    if let Some(api) = model.primary_api() {
        for method in &api.methods {
            let owner = format!("{}.{}", api.name, method.name);
            for field in method.params.iter().chain(&method.results) {
                found.extend(ambiguity_of(&owner, field));
            }
        }
    }

    found
}

fn ambiguity_of(owner: &str, field: &FieldSignature) -> Option<MappingAmbiguity> {
    let base = field.base_kind();

    let reason = if field.is_unclassified() {
        AmbiguityReason::Unclassified
    } else if let Some((key, value)) = split_map_kind(base) {
        if is_builtin(key) && is_builtin(value) {
            return None;
        }
        AmbiguityReason::OpaqueMap
    } else if !is_builtin(base) && base != TIMESTAMP_KIND && field.owning_package.is_none() {
        AmbiguityReason::UnresolvedType
    } else {
        return None;
    };

    Some(MappingAmbiguity {
        owner: owner.to_string(),
        field: field.name.clone(),
        kind: field.kind.clone(),
        reason,
    })
}
