use std::path::PathBuf;

use bridge_lib::model::{Arity, TypeVariant};
use bridge_lib::{ExtractOptions, ExtractionError, extract};

const MODULE: &str = "github.com/acme/shop";

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn shop_options() -> ExtractOptions {
    ExtractOptions::new(MODULE).with_module_dir(fixtures().join("shop"))
}

fn shop_model() -> bridge_lib::IntermediateModel {
    extract(&fixtures().join("shop/example/example.go"), &shop_options())
        .expect("shop fixture should extract")
}

#[test]
fn primary_interface_is_the_first_root_interface() {
    let model = shop_model();

    assert_eq!(model.primary_interface.as_deref(), Some("Example"));
    assert_eq!(model.api_package.as_deref(), Some("example"));
    assert_eq!(model.api_import_path(), Some("github.com/acme/shop/example"));
    assert!(model.interfaces.contains_key("Auditor"));
}

#[test]
fn methods_keep_declaration_order_without_context_or_error() {
    let model = shop_model();
    let api = model.primary_api().unwrap();

    let names: Vec<_> = api.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["HasPermission", "Pack", "WhatsTheTime", "Tally", "Put"]);

    let has_permission = &api.methods[0];
    assert_eq!(has_permission.params.len(), 1);
    assert_eq!(has_permission.params[0].name, "roles");
    assert_eq!(has_permission.params[0].kind, "Role");
    assert_eq!(has_permission.params[0].arity, Arity::List);
    assert_eq!(has_permission.params[0].owning_package.as_deref(), Some("example"));
    assert_eq!(has_permission.results[0].name, "bool");
    assert!(has_permission.returns_error);

    let tally = &api.methods[3];
    assert_eq!(tally.params[0].kind, "map[string]int");
    assert_eq!(tally.results.len(), 1);
    assert_eq!(tally.results[0].name, "total");

    let put = &api.methods[4];
    let shape: Vec<_> = put
        .params
        .iter()
        .map(|p| (p.name.as_str(), p.kind.as_str(), p.arity))
        .collect();
    assert_eq!(
        shape,
        [
            ("a", "int64", Arity::Single),
            ("b", "string", Arity::Single),
            ("c", "Toy", Arity::List),
        ]
    );
    assert_eq!(put.params[2].owning_package.as_deref(), Some("catalog"));
    assert!(put.results.is_empty());
    assert!(put.returns_error);
    assert!(!put.variadic);
}

#[test]
fn one_hop_types_are_present_and_two_hop_types_are_not() {
    let model = shop_model();

    assert!(model.find_type("Toy", "catalog").is_some());
    assert!(model.find_type("Size", "catalog").is_some());
    assert_eq!(model.types_named("Part").count(), 0);
    assert!(!model.interfaces.contains_key("Inventory"));
    assert_eq!(model.imports.path_of("deep"), None);
}

#[test]
fn struct_fields_keep_order_and_resolve_owners_through_aliases() {
    let model = shop_model();
    let bundle = model.find_type("Bundle", "example").unwrap();

    let fields = bundle.fields();
    let shape: Vec<_> = fields
        .iter()
        .map(|f| (f.name.as_str(), f.kind.as_str(), f.arity))
        .collect();
    assert_eq!(
        shape,
        [
            ("A", "int64", Arity::Single),
            ("B", "string", Arity::Single),
            ("C", "Toy", Arity::List),
        ]
    );
    assert_eq!(fields[2].owning_package.as_deref(), Some("catalog"));
}

#[test]
fn unexported_fields_and_unclassified_types_are_handled() {
    let model = shop_model();
    let shelf = model.find_type("Shelf", "example").unwrap();

    let names: Vec<_> = shelf.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["Items", "Owner", "Label"]);
    assert!(shelf.fields()[1].is_unclassified());
    assert!(shelf.fields()[0].is_map());
}

#[test]
fn enums_and_their_literal_constants_are_captured() {
    let model = shop_model();

    let role = model.find_type("Role", "example").unwrap();
    assert_eq!(
        role.variant,
        TypeVariant::Enum {
            underlying: "int".into()
        }
    );

    let roles: Vec<_> = model
        .constants
        .group("Role")
        .iter()
        .map(|c| (c.name.as_str(), c.literal.as_str()))
        .collect();
    assert_eq!(roles, [("Unknown", "0"), ("User", "1"), ("Admin", "2")]);

    let sizes: Vec<_> = model.constants.group("Size").iter().map(|c| c.literal.as_str()).collect();
    assert_eq!(sizes, ["\"small\"", "\"large\""]);
}

#[test]
fn test_files_are_ignored() {
    let model = shop_model();
    assert_eq!(model.types_named("OnlyInTests").count(), 0);
}

#[test]
fn extraction_is_deterministic() {
    assert_eq!(shop_model(), shop_model());
}

#[test]
fn missing_entry_file_is_an_io_error() {
    let err = extract(&fixtures().join("shop/example/missing.go"), &shop_options()).unwrap_err();
    assert!(matches!(err, ExtractionError::Io { .. }));
}

#[test]
fn syntax_errors_abort_extraction() {
    let options = ExtractOptions::new(MODULE).with_module_dir(fixtures());
    let err = extract(&fixtures().join("broken/broken.go"), &options).unwrap_err();
    assert!(matches!(err, ExtractionError::Syntax { .. }));
}

#[test]
fn package_without_interfaces_has_no_primary_api() {
    let options = ExtractOptions::new(MODULE).with_module_dir(fixtures());
    let model = extract(&fixtures().join("plain/plain.go"), &options).unwrap();

    assert!(model.primary_api().is_none());
    assert!(model.find_type("Note", "plain").is_some());
}

#[test]
fn dependency_syntax_errors_abort_extraction() {
    let options = ExtractOptions::new(MODULE).with_module_dir(fixtures());
    let result = extract(&fixtures().join("depsyntax/api.go"), &options);

    match result {
        Err(ExtractionError::Syntax { path, .. }) => {
            assert!(path.ends_with("depsyntax/dep/dep.go"), "{}", path.display());
        }
        other => panic!("expected a syntax error in the dependency, got {other:?}"),
    }
}

#[test]
fn missing_dependency_directory_aborts_extraction() {
    let options = ExtractOptions::new(MODULE).with_module_dir(fixtures());
    let result = extract(&fixtures().join("depmissing/api.go"), &options);

    match result {
        Err(ExtractionError::ReadDir { path, source }) => {
            assert!(path.ends_with("depmissing/nope"), "{}", path.display());
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected the missing dependency to fail, got {other:?}"),
    }
}

#[test]
fn imports_sharing_a_name_prefix_with_the_module_are_not_followed() {
    let options = ExtractOptions::new(MODULE).with_module_dir(fixtures());
    let model = extract(&fixtures().join("thirdparty/api.go"), &options).unwrap();

    assert_eq!(model.primary_interface.as_deref(), Some("Store"));
    assert_eq!(model.imports.path_of("widgets"), None);

    let get = &model.primary_api().unwrap().methods[0];
    assert_eq!(get.results[0].kind, "Widget");
    assert_eq!(get.results[0].owning_package, None);
}
