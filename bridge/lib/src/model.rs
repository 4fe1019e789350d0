//! The intermediate model shared by extraction and emission.
//!
//! Extraction is the only writer. Every emitter receives `&IntermediateModel`
//! and never mutates it.

use std::collections::BTreeMap;

use serde::Serialize;

/// Whether a field holds one value or a list of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    Single,
    List,
}

/// One named, typed slot of a struct, a parameter list or a result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSignature {
    pub name: String,
    /// Bare type name (`int64`, `Toy`), a collapsed `map[K]V`, or empty when
    /// the declared type could not be classified.
    pub kind: String,
    pub arity: Arity,
    /// Package declaring `kind`, when `kind` names an extracted type.
    pub owning_package: Option<String>,
}

impl FieldSignature {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, arity: Arity) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            arity,
            owning_package: None,
        }
    }

    pub fn with_owner(mut self, package: impl Into<String>) -> Self {
        self.owning_package = Some(package.into());
        self
    }

    /// The kind with every list prefix removed (`[]int` -> `int`).
    pub fn base_kind(&self) -> &str {
        let mut kind = self.kind.as_str();
        while let Some(rest) = kind.strip_prefix("[]") {
            kind = rest;
        }
        kind
    }

    pub fn is_map(&self) -> bool {
        self.base_kind().starts_with("map[")
    }

    pub fn is_unclassified(&self) -> bool {
        self.kind.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum TypeVariant {
    Struct { fields: Vec<FieldSignature> },
    /// A named scalar such as `type Role int`.
    Enum { underlying: String },
}

/// An exported type found during extraction.
///
/// Identity is the pair `(name, owning_package)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDeclaration {
    pub name: String,
    pub owning_package: String,
    #[serde(flatten)]
    pub variant: TypeVariant,
}

impl TypeDeclaration {
    pub fn fields(&self) -> &[FieldSignature] {
        match &self.variant {
            TypeVariant::Struct { fields } => fields,
            TypeVariant::Enum { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<FieldSignature>,
    pub results: Vec<FieldSignature>,
    /// The method's last result is `error` (dropped from `results`).
    pub returns_error: bool,
    /// The last param was declared `...T`; it is recorded as a list of `T`.
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceDeclaration {
    pub name: String,
    pub owning_package: String,
    pub methods: Vec<MethodSignature>,
}

/// Package name to fully-qualified import path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImportMap(BTreeMap<String, String>);

impl ImportMap {
    /// Registers `package` unless it is already known.
    ///
    /// Returns `true` when the entry was new.
    pub fn register(&mut self, package: &str, path: &str) -> bool {
        if self.0.contains_key(package) {
            return false;
        }
        self.0.insert(package.to_string(), path.to_string());
        true
    }

    pub fn path_of(&self, package: &str) -> Option<&str> {
        self.0.get(package).map(String::as_str)
    }

}

/// A constant captured verbatim; the literal is never evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constant {
    pub name: String,
    pub literal: String,
}

/// Named type to the constants declared with that type, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConstantGroups(BTreeMap<String, Vec<Constant>>);

impl ConstantGroups {
    pub fn push(&mut self, type_name: &str, name: &str, literal: &str) {
        self.0
            .entry(type_name.to_string())
            .or_default()
            .push(Constant {
                name: name.to_string(),
                literal: literal.to_string(),
            });
    }

    pub fn group(&self, type_name: &str) -> &[Constant] {
        self.0.get(type_name).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Everything extraction learned about the schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntermediateModel {
    /// Types in the order they were extracted.
    pub types: Vec<TypeDeclaration>,
    pub interfaces: BTreeMap<String, InterfaceDeclaration>,
    /// Name of the interface that becomes the generated service surface.
    pub primary_interface: Option<String>,
    pub api_package: Option<String>,
    pub imports: ImportMap,
    pub constants: ConstantGroups,
}

impl IntermediateModel {
    pub fn primary_api(&self) -> Option<&InterfaceDeclaration> {
        self.primary_interface
            .as_deref()
            .and_then(|name| self.interfaces.get(name))
    }

    pub fn find_type(&self, name: &str, package: &str) -> Option<&TypeDeclaration> {
        self.types
            .iter()
            .find(|ty| ty.name == name && ty.owning_package == package)
    }

    /// Every extracted type called `name`, in extraction order.
    pub fn types_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TypeDeclaration> {
        self.types.iter().filter(move |ty| ty.name == name)
    }

    /// Import path of the primary API's package.
    pub fn api_import_path(&self) -> Option<&str> {
        self.api_package
            .as_deref()
            .and_then(|package| self.imports.path_of(package))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_kind_strips_nested_list_prefixes() {
        let field = FieldSignature::new("grid", "[]int", Arity::List);
        assert_eq!(field.base_kind(), "int");
    }

    #[test]
    fn map_detection_sees_through_lists() {
        assert!(FieldSignature::new("m", "map[string]int", Arity::Single).is_map());
        assert!(FieldSignature::new("m", "[]map[string]int", Arity::List).is_map());
        assert!(!FieldSignature::new("m", "Toy", Arity::Single).is_map());
    }

    #[test]
    fn import_map_keeps_first_registration() {
        let mut imports = ImportMap::default();
        assert!(imports.register("shop", "example.com/shop"));
        assert!(!imports.register("shop", "example.com/other"));
        assert_eq!(imports.path_of("shop"), Some("example.com/shop"));
        assert_eq!(imports.path_of("other"), None);
    }

    #[test]
    fn constant_groups_preserve_declaration_order() {
        let mut constants = ConstantGroups::default();
        constants.push("Role", "RoleAdmin", "2");
        constants.push("Role", "RoleUnknown", "0");

        let names: Vec<_> = constants.group("Role").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["RoleAdmin", "RoleUnknown"]);
        assert!(constants.group("Missing").is_empty());
    }
}
