//! TypeScript client emission.

use crate::emit::templates::{TemplateSet, render};
use crate::emit::{client_route, primary_api, require_names};
use crate::error::EmissionError;
use crate::mapping::map_field;
use crate::model::{Constant, FieldSignature, IntermediateModel, TypeVariant};

/// Renders the TypeScript service for the primary interface.
///
/// Emits, in order: one async method per RPC method, the
/// `<Method>Request`/`<Method>Response` interfaces of every method, then one
/// interface or enum per extracted type. `service_name` defaults to the
/// primary interface name and also prefixes every request URL.
///
/// ## Errors
///
/// Returns [`EmissionError`] when the model has no primary interface, a member
/// has no name, or a template references an unknown placeholder.
pub fn emit_client(
    model: &IntermediateModel,
    service_name: Option<&str>,
    templates: &TemplateSet,
) -> Result<String, EmissionError> {
    let api = primary_api(model)?;
    let service = service_name.unwrap_or(&api.name);

    let mut methods = String::new();
    let mut types = String::new();

    for method in &api.methods {
        let owner = format!("{}.{}", api.name, method.name);
        let route = client_route(service, &method.name);

        methods.push_str(&render(
            &templates.ts_method,
            &[("method", &method.name), ("route", &route)],
        )?);

        types.push_str(&interface(
            templates,
            &format!("{}Request", method.name),
            &owner,
            &method.params,
        )?);
        types.push_str(&interface(
            templates,
            &format!("{}Response", method.name),
            &owner,
            &method.results,
        )?);
    }

    for ty in &model.types {
        let rendered = match &ty.variant {
            TypeVariant::Struct { fields } => interface(templates, &ty.name, &ty.name, fields)?,
            TypeVariant::Enum { .. } => enumeration(templates, &ty.name, model.constants.group(&ty.name))?,
        };
        types.push_str(&rendered);
    }

    tracing::debug!(
        %service,
        methods = api.methods.len(),
        types = model.types.len(),
        "rendered TypeScript client"
    );

    render(
        &templates.ts_file,
        &[("service", service), ("methods", &methods), ("types", &types)],
    )
}

fn interface(
    templates: &TemplateSet,
    name: &str,
    owner: &str,
    fields: &[FieldSignature],
) -> Result<String, EmissionError> {
    require_names(owner, fields)?;

    let mut members = String::new();
    for field in fields {
        members.push_str(&render(
            &templates.ts_member,
            &[("name", &field.name), ("kind", &map_field(field).to_string())],
        )?);
    }

    render(&templates.ts_interface, &[("name", name), ("members", &members)])
}

/// Constants keep their declared names and order; an enum without constants
/// renders empty.
fn enumeration(
    templates: &TemplateSet,
    name: &str,
    constants: &[Constant],
) -> Result<String, EmissionError> {
    let mut members = String::new();
    for constant in constants {
        members.push_str(&render(
            &templates.ts_enum_member,
            &[("name", &constant.name), ("literal", &constant.literal)],
        )?);
    }

    render(&templates.ts_enum, &[("name", name), ("members", &members)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::Template;
    use crate::model::{
        Arity, InterfaceDeclaration, MethodSignature, TypeDeclaration, TypeVariant,
    };

    fn model() -> IntermediateModel {
        let mut model = IntermediateModel::default();
        model.imports.register("example", "shop/example");
        model.api_package = Some("example".into());
        model.primary_interface = Some("Example".into());
        model.interfaces.insert(
            "Example".into(),
            InterfaceDeclaration {
                name: "Example".into(),
                owning_package: "example".into(),
                methods: vec![
                    MethodSignature {
                        name: "HasPermission".into(),
                        params: vec![
                            FieldSignature::new("roles", "Role", Arity::List).with_owner("example"),
                        ],
                        results: vec![FieldSignature::new("bool", "bool", Arity::Single)],
                        returns_error: true,
                        variadic: false,
                    },
                    MethodSignature {
                        name: "Ping".into(),
                        params: vec![],
                        results: vec![],
                        returns_error: true,
                        variadic: false,
                    },
                ],
            },
        );
        model.types.push(TypeDeclaration {
            name: "Role".into(),
            owning_package: "example".into(),
            variant: TypeVariant::Enum {
                underlying: "int".into(),
            },
        });
        model.constants.push("Role", "Unknown", "0");
        model.constants.push("Role", "User", "1");
        model.constants.push("Role", "Admin", "2");
        model
    }

    #[test]
    fn one_service_method_per_rpc_in_declaration_order() {
        let text = emit_client(&model(), None, &TemplateSet::default()).unwrap();

        assert_eq!(text.matches("public async ").count(), 2);
        let has_permission = text.find("public async HasPermission(").unwrap();
        let ping = text.find("public async Ping(").unwrap();
        assert!(has_permission < ping);
        assert!(text.contains("export class Example {"));
        assert!(text.contains("'/example/haspermission'"));
    }

    #[test]
    fn envelopes_use_declared_member_names() {
        let text = emit_client(&model(), None, &TemplateSet::default()).unwrap();

        assert!(text.contains("export interface HasPermissionRequest {\n  roles: Role[];\n}"));
        assert!(text.contains("export interface HasPermissionResponse {\n  bool: boolean;\n}"));
        assert!(text.contains("export interface PingRequest {\n}"));
    }

    #[test]
    fn enums_keep_constant_order() {
        let text = emit_client(&model(), None, &TemplateSet::default()).unwrap();
        assert!(text.contains("export enum Role {\n  Unknown = 0,\n  User = 1,\n  Admin = 2,\n}"));
    }

    #[test]
    fn enum_without_constants_is_empty() {
        let mut model = model();
        model.types.push(TypeDeclaration {
            name: "Level".into(),
            owning_package: "example".into(),
            variant: TypeVariant::Enum {
                underlying: "string".into(),
            },
        });

        let text = emit_client(&model, None, &TemplateSet::default()).unwrap();
        assert!(text.contains("export enum Level {\n}"));
    }

    #[test]
    fn service_name_overrides_class_and_routes() {
        let text = emit_client(&model(), Some("Perms"), &TemplateSet::default()).unwrap();
        assert!(text.contains("export class Perms {"));
        assert!(text.contains("'/perms/ping'"));
    }

    #[test]
    fn missing_primary_interface_fails() {
        let err = emit_client(&IntermediateModel::default(), None, &TemplateSet::default())
            .unwrap_err();
        assert!(matches!(err, EmissionError::NoPrimaryInterface));
    }

    #[test]
    fn unknown_placeholder_in_custom_template_fails() {
        let mut templates = TemplateSet::default();
        templates.ts_member = Template::new("ts_member", "  {{name}}: {{type}};\n");

        let err = emit_client(&model(), None, &templates).unwrap_err();
        assert!(matches!(
            err,
            EmissionError::UnresolvedPlaceholder { template: "ts_member", .. }
        ));
    }
}
