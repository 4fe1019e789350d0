//! Model extraction.
//!
//! Walks the entry file's package and, one hop deep, the in-module packages it
//! imports. The result is an [`IntermediateModel`] that no emitter mutates.
//!
//! ## Depth policy
//!
//! | depth | records types/constants | records interfaces | follows local imports |
//! |---|---|---|---|
//! | [`Depth::Root`] | yes | yes | yes |
//! | [`Depth::Dependency`] | yes | no | no |
//!
//! A type declared two import hops away is therefore never part of the model.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ExtractionError;
use crate::mapping::is_builtin;
use crate::model::{
    Arity, FieldSignature, InterfaceDeclaration, IntermediateModel, MethodSignature,
    TypeDeclaration, TypeVariant,
};
use crate::naming::{dedupe, unnamed_field_name};
use crate::source::{
    Declaration, GoFile, ImportDecl, Initializer, RawField, RawMethod, TypeExpr, ValueDecl,
    is_exported,
};

/// Distance, in local-import hops, from the entry package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Root,
    Dependency,
}

impl Depth {
    pub fn level(self) -> u8 {
        match self {
            Self::Root => 0,
            Self::Dependency => 1,
        }
    }

    pub fn follows_imports(self) -> bool {
        matches!(self, Self::Root)
    }

    pub fn records_interfaces(self) -> bool {
        matches!(self, Self::Root)
    }
}

/// Inputs that tell local imports apart from third-party ones.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Module path (`github.com/acme/shop`). Imports equal to it or below it are local.
    pub module_root: String,
    /// Directory on disk that `module_root` refers to.
    pub module_dir: PathBuf,
}

impl ExtractOptions {
    pub fn new(module_root: impl Into<String>) -> Self {
        Self {
            module_root: module_root.into(),
            module_dir: PathBuf::from("."),
        }
    }

    pub fn with_module_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.module_dir = dir.into();
        self
    }

    /// Path below the module root, or `None` for imports outside the module.
    ///
    /// Matching stops at segment boundaries, so `github.com/acme/shopify` is
    /// not inside `github.com/acme/shop`.
    fn module_relative<'p>(&self, import_path: &'p str) -> Option<&'p str> {
        let root = self.module_root.trim_end_matches('/');
        if root.is_empty() {
            return None;
        }

        match import_path.strip_prefix(root)? {
            "" => Some(""),
            rest => rest.strip_prefix('/'),
        }
    }

    fn is_local(&self, import_path: &str) -> bool {
        self.module_relative(import_path).is_some()
    }

    /// Directory holding the package behind a local import path.
    fn dir_for_import(&self, import_path: &str) -> PathBuf {
        let relative = self.module_relative(import_path).unwrap_or(import_path);

        if relative.is_empty() {
            self.module_dir.clone()
        } else {
            self.module_dir.join(relative)
        }
    }

    /// Import path of a package directory.
    fn import_path_for(&self, dir: &Path) -> String {
        let dir = canonical(dir);
        let module_dir = canonical(&self.module_dir);

        match dir.strip_prefix(&module_dir) {
            Ok(relative) if relative.as_os_str().is_empty() => self.module_root.clone(),
            Ok(relative) => {
                let segments: Vec<_> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                format!("{}/{}", self.module_root, segments.join("/"))
            }
            Err(_) => {
                let leaf = dir
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("{}/{}", self.module_root, leaf)
            }
        }
    }
}

/// Builds the intermediate model for the package containing `entry`.
///
/// ## Errors
///
/// Fails if the entry file cannot be read, a visited directory cannot be
/// listed, or any visited file does not parse. No partial model is returned.
pub fn extract(entry: &Path, options: &ExtractOptions) -> Result<IntermediateModel, ExtractionError> {
    fs::File::open(entry).map_err(|source| ExtractionError::Io {
        path: entry.to_path_buf(),
        source,
    })?;

    let dir = match entry.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None => {
            return Err(ExtractionError::NoParentDirectory {
                path: entry.to_path_buf(),
            });
        }
    };

    let mut extractor = Extractor {
        options,
        model: IntermediateModel::default(),
        visited: BTreeSet::new(),
    };
    extractor.visit_dir(&dir, Depth::Root)?;

    let packages = extractor.visited.len();
    let mut model = extractor.model;
    resolve_owners(&mut model);

    tracing::debug!(
        types = model.types.len(),
        interfaces = model.interfaces.len(),
        packages,
        "extraction finished"
    );

    Ok(model)
}

struct Extractor<'o> {
    options: &'o ExtractOptions,
    model: IntermediateModel,
    visited: BTreeSet<PathBuf>,
}

/// Per-file facts needed while converting fields.
struct FileScope {
    package: String,
    import_path: String,
    /// Bound package name to import path.
    imports: BTreeMap<String, String>,
}

impl FileScope {
    /// Provisional owner for a named type: the import path it comes from.
    fn owner_hint(&self, ty: &TypeExpr) -> Option<String> {
        match ty {
            TypeExpr::Named { qualifier, name } if !is_builtin(name) => Some(match qualifier {
                Some(q) => self.imports.get(q).cloned().unwrap_or_else(|| q.clone()),
                None => self.import_path.clone(),
            }),
            TypeExpr::List(element) => self.owner_hint(element),
            _ => None,
        }
    }
}

impl Extractor<'_> {
    fn visit_dir(&mut self, dir: &Path, depth: Depth) -> Result<(), ExtractionError> {
        if !self.visited.insert(canonical(dir)) {
            tracing::debug!(dir = %dir.display(), "package already visited");
            return Ok(());
        }

        let import_path = self.options.import_path_for(dir);
        tracing::debug!(
            dir = %dir.display(),
            %import_path,
            depth = depth.level(),
            "visiting package"
        );

        for path in go_files_in(dir)? {
            let file = GoFile::read(&path)?;
            self.visit_file(file, &import_path, depth)?;
        }

        Ok(())
    }

    fn visit_file(
        &mut self,
        file: GoFile,
        import_path: &str,
        depth: Depth,
    ) -> Result<(), ExtractionError> {
        self.model.imports.register(&file.package, import_path);

        let scope = FileScope {
            package: file.package.clone(),
            import_path: import_path.to_string(),
            imports: file
                .declarations
                .iter()
                .filter_map(|d| match d {
                    Declaration::Import(import) => {
                        Some((import.package_name().to_string(), import.path.clone()))
                    }
                    _ => None,
                })
                .collect(),
        };

        for declaration in file.declarations {
            match declaration {
                Declaration::Struct { name, fields } => {
                    if is_exported(&name) {
                        self.record_struct(name, fields, &scope);
                    }
                }
                Declaration::Named { name, underlying } => {
                    if is_exported(&name) {
                        self.record_named(name, underlying, &scope);
                    }
                }
                Declaration::Interface { name, methods } => {
                    if is_exported(&name) && depth.records_interfaces() {
                        self.record_interface(name, methods, &scope);
                    }
                }
                Declaration::Value(value) => self.record_value(value),
                Declaration::Import(import) => self.follow_import(&import, depth)?,
            }
        }

        Ok(())
    }

    fn record_struct(&mut self, name: String, raw: Vec<RawField>, scope: &FileScope) {
        let mut fields = Vec::new();

        for field in raw {
            if field.names.is_empty() {
                tracing::debug!(r#struct = %name, "skipping embedded field");
                continue;
            }

            for field_name in &field.names {
                if !is_exported(field_name) {
                    continue;
                }
                fields.push(signature(&name, field_name, &field.ty, scope));
            }
        }

        self.push_type(TypeDeclaration {
            name,
            owning_package: scope.package.clone(),
            variant: TypeVariant::Struct { fields },
        });
    }

    fn record_named(&mut self, name: String, underlying: TypeExpr, scope: &FileScope) {
        match underlying {
            TypeExpr::Named {
                qualifier: None,
                name: kind,
            } if is_builtin(&kind) => self.push_type(TypeDeclaration {
                name,
                owning_package: scope.package.clone(),
                variant: TypeVariant::Enum { underlying: kind },
            }),
            other => {
                tracing::debug!(%name, underlying = %other.kind(), "skipping non-scalar named type");
            }
        }
    }

    fn push_type(&mut self, declaration: TypeDeclaration) {
        if self
            .model
            .find_type(&declaration.name, &declaration.owning_package)
            .is_some()
        {
            tracing::warn!(
                name = %declaration.name,
                package = %declaration.owning_package,
                "duplicate type declaration ignored"
            );
            return;
        }
        self.model.types.push(declaration);
    }

    fn record_interface(&mut self, name: String, methods: Vec<RawMethod>, scope: &FileScope) {
        if self.model.interfaces.contains_key(&name) {
            tracing::warn!(%name, "duplicate interface declaration ignored");
            return;
        }

        let methods = methods
            .into_iter()
            .map(|method| {
                let owner = format!("{}.{}", name, method.name);
                let returns_error = method
                    .results
                    .last()
                    .is_some_and(|result| result.ty == TypeExpr::named("error"));
                MethodSignature {
                    returns_error,
                    variadic: method.variadic,
                    params: payload_fields(&owner, method.params, scope),
                    results: payload_fields(&owner, method.results, scope),
                    name: method.name,
                }
            })
            .collect();

        if self.model.primary_interface.is_none() {
            tracing::debug!(interface = %name, package = %scope.package, "primary API");
            self.model.primary_interface = Some(name.clone());
            self.model.api_package = Some(scope.package.clone());
        }

        self.model.interfaces.insert(
            name.clone(),
            InterfaceDeclaration {
                name,
                owning_package: scope.package.clone(),
                methods,
            },
        );
    }

    fn record_value(&mut self, value: ValueDecl) {
        let ValueDecl {
            name,
            type_name,
            initializer,
        } = value;

        if !is_exported(&name) {
            return;
        }

        if let (Some(type_name), Initializer::Literal(literal)) = (type_name, initializer) {
            self.model.constants.push(&type_name, &name, &literal);
        }
    }

    fn follow_import(&mut self, import: &ImportDecl, depth: Depth) -> Result<(), ExtractionError> {
        if !depth.follows_imports() || !self.options.is_local(&import.path) {
            return Ok(());
        }

        let dir = self.options.dir_for_import(&import.path);
        self.visit_dir(&dir, Depth::Dependency).inspect_err(|e| {
            tracing::error!(
                import = %import.path,
                dir = %dir.display(),
                error = %e,
                "failed to follow local import"
            );
        })
    }
}

/// Params or results minus the transport-implicit context and error slots.
fn payload_fields(owner: &str, raw: Vec<RawField>, scope: &FileScope) -> Vec<FieldSignature> {
    let mut fields: Vec<FieldSignature> = Vec::new();

    for field in raw {
        let kind = field.ty.kind().to_lowercase();
        if kind == "context" || kind == "error" {
            continue;
        }

        if field.names.is_empty() {
            let taken: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();
            let name = dedupe(unnamed_field_name(&field.ty), &taken);
            fields.push(signature(owner, &name, &field.ty, scope));
        } else {
            for name in &field.names {
                fields.push(signature(owner, name, &field.ty, scope));
            }
        }
    }

    fields
}

fn signature(owner: &str, name: &str, ty: &TypeExpr, scope: &FileScope) -> FieldSignature {
    let (kind, arity) = match ty {
        TypeExpr::List(element) => (element.kind(), Arity::List),
        other => (other.kind(), Arity::Single),
    };

    if kind.is_empty() {
        tracing::warn!(
            %owner,
            field = %name,
            declared = ?ty,
            "unclassifiable field type; recording an empty kind"
        );
    }

    let mut field = FieldSignature::new(name, kind, arity);
    field.owning_package = scope.owner_hint(ty);
    field
}

/// Replaces provisional owner hints with the package of an extracted type of
/// that name, or clears them.
fn resolve_owners(model: &mut IntermediateModel) {
    let declared: Vec<(String, String, Option<String>)> = model
        .types
        .iter()
        .map(|ty| {
            let path = model.imports.path_of(&ty.owning_package).map(str::to_string);
            (ty.name.clone(), ty.owning_package.clone(), path)
        })
        .collect();

    let resolve = |field: &mut FieldSignature| {
        let hint = field.owning_package.take();
        let base = field.base_kind();
        let mut candidates = declared.iter().filter(|(name, _, _)| name == base);

        let hinted = hint.as_deref().and_then(|hint| {
            declared.iter().find(|(name, package, path)| {
                name == base && (path.as_deref() == Some(hint) || package == hint)
            })
        });

        field.owning_package = hinted
            .or_else(|| candidates.next())
            .map(|(_, package, _)| package.clone());
    };

    for ty in &mut model.types {
        if let TypeVariant::Struct { fields } = &mut ty.variant {
            fields.iter_mut().for_each(&resolve);
        }
    }

    for interface in model.interfaces.values_mut() {
        for method in &mut interface.methods {
            method.params.iter_mut().for_each(&resolve);
            method.results.iter_mut().for_each(&resolve);
        }
    }
}

/// Go sources of a package directory, sorted, without test files.
fn go_files_in(dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
    let entries = fs::read_dir(dir).map_err(|source| ExtractionError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ExtractionError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_go = path.extension().is_some_and(|ext| ext == "go");
        let is_test = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with("_test.go"));

        if path.is_file() && is_go && !is_test {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_rules_are_explicit() {
        assert!(Depth::Root.follows_imports());
        assert!(Depth::Root.records_interfaces());
        assert!(!Depth::Dependency.follows_imports());
        assert!(!Depth::Dependency.records_interfaces());
        assert_eq!(Depth::Dependency.level(), 1);
    }

    #[test]
    fn local_imports_sit_below_the_module_root() {
        let options = ExtractOptions::new("github.com/acme/shop");
        assert!(options.is_local("github.com/acme/shop/catalog"));
        assert!(options.is_local("github.com/acme/shop"));
        assert!(!options.is_local("time"));
        assert!(!ExtractOptions::new("").is_local("time"));
    }

    #[test]
    fn module_root_matches_whole_segments_only() {
        let options = ExtractOptions::new("github.com/acme/shop");
        assert!(!options.is_local("github.com/acme/shopify/widgets"));
        assert!(!options.is_local("github.com/acme/shop-tools"));
        assert!(!options.is_local("mirror/github.com/acme/shop/catalog"));
    }

    #[test]
    fn import_directories_are_relative_to_module_dir() {
        let options = ExtractOptions::new("github.com/acme/shop").with_module_dir("/src/shop");
        assert_eq!(
            options.dir_for_import("github.com/acme/shop/api/catalog"),
            PathBuf::from("/src/shop/api/catalog")
        );
        assert_eq!(
            options.dir_for_import("github.com/acme/shop"),
            PathBuf::from("/src/shop")
        );
    }

    fn scope() -> FileScope {
        FileScope {
            package: "example".into(),
            import_path: "shop/example".into(),
            imports: BTreeMap::from([("cat".to_string(), "shop/catalog".to_string())]),
        }
    }

    #[test]
    fn payload_fields_drop_context_and_error() {
        let raw = vec![
            RawField {
                names: vec!["ctx".into()],
                ty: TypeExpr::qualified("context", "Context"),
            },
            RawField {
                names: vec!["roles".into()],
                ty: TypeExpr::List(Box::new(TypeExpr::named("Role"))),
            },
            RawField {
                names: vec![],
                ty: TypeExpr::named("error"),
            },
        ];

        let fields = payload_fields("Example.HasPermission", raw, &scope());
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "roles");
        assert_eq!(fields[0].kind, "Role");
        assert_eq!(fields[0].arity, Arity::List);
        assert_eq!(fields[0].owning_package.as_deref(), Some("shop/example"));
    }

    #[test]
    fn unnamed_payload_fields_get_distinct_names() {
        let raw = vec![
            RawField {
                names: vec![],
                ty: TypeExpr::named("bool"),
            },
            RawField {
                names: vec![],
                ty: TypeExpr::named("bool"),
            },
        ];

        let fields = payload_fields("Example.Check", raw, &scope());
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["bool", "bool2"]);
        assert!(fields.iter().all(|f| f.owning_package.is_none()));
    }

    #[test]
    fn qualified_hints_follow_import_aliases() {
        let hint = scope().owner_hint(&TypeExpr::qualified("cat", "Toy"));
        assert_eq!(hint.as_deref(), Some("shop/catalog"));
    }

    #[test]
    fn resolve_owners_clears_unknown_kinds() {
        let mut model = IntermediateModel::default();
        model.imports.register("catalog", "shop/catalog");
        model.types.push(TypeDeclaration {
            name: "Toy".into(),
            owning_package: "catalog".into(),
            variant: TypeVariant::Struct { fields: vec![] },
        });
        model.types.push(TypeDeclaration {
            name: "Shelf".into(),
            owning_package: "catalog".into(),
            variant: TypeVariant::Struct {
                fields: vec![
                    FieldSignature::new("Toys", "Toy", Arity::List).with_owner("shop/catalog"),
                    FieldSignature::new("At", "Time", Arity::Single).with_owner("time"),
                ],
            },
        });

        resolve_owners(&mut model);

        let fields = model.types[1].fields();
        assert_eq!(fields[0].owning_package.as_deref(), Some("catalog"));
        assert_eq!(fields[1].owning_package, None);
    }
}
