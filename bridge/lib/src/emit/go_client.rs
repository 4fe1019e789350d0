//! Go client emission.
//!
//! The client posts each request envelope to the same route the generated
//! server registers and decodes the response envelope. Every method returns
//! the interface's results followed by an `error`.

use crate::emit::templates::{TemplateSet, render};
use crate::emit::{GoImports, api_package, column_width, go_envelopes, primary_api, server_route};
use crate::error::EmissionError;
use crate::mapping::go_type_ref;
use crate::model::{IntermediateModel, MethodSignature};
use crate::naming::{dedupe, is_go_keyword, upper_first};

const BASE_IMPORTS: &[&str] = &[
    "bytes",
    "context",
    "encoding/json",
    "fmt",
    "io",
    "net/http",
    "strings",
];

/// Names bound inside every generated client method.
const METHOD_LOCALS: &[&str] = &["c", "ctx", "req", "resp", "err"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoClientOptions {
    /// Go package name of the generated file.
    pub package: String,
}

impl Default for GoClientOptions {
    fn default() -> Self {
        Self {
            package: "client".to_string(),
        }
    }
}

/// Renders a Go client for the primary interface.
///
/// ## Errors
///
/// Returns [`EmissionError`] when the model has no primary interface, a member
/// has no name, or a template references an unknown placeholder.
pub fn emit_go_client(
    model: &IntermediateModel,
    options: &GoClientOptions,
    templates: &TemplateSet,
) -> Result<String, EmissionError> {
    let api = primary_api(model)?;
    let package = api_package(model, api);

    let mut imports = GoImports::default();
    for path in BASE_IMPORTS {
        imports.add(path);
    }

    let mut methods = String::new();
    for method in &api.methods {
        let owner = format!("{}.{}", api.name, method.name);
        let envelopes = go_envelopes(model, templates, &owner, method, &mut imports)?;
        methods.push_str(&client_method(
            model,
            templates,
            method,
            &envelopes,
            &server_route(package, &method.name),
        )?);
    }

    tracing::debug!(
        package = %options.package,
        methods = api.methods.len(),
        "rendered Go client"
    );

    render(
        &templates.go_client_file,
        &[
            ("package", &options.package),
            ("imports", &imports.render()),
            ("service", &api.name),
            ("methods", &methods),
        ],
    )
}

fn client_method(
    model: &IntermediateModel,
    templates: &TemplateSet,
    method: &MethodSignature,
    envelopes: &str,
    route: &str,
) -> Result<String, EmissionError> {
    let mut taken: Vec<String> = METHOD_LOCALS.iter().map(|s| s.to_string()).collect();
    let mut params = String::new();
    let mut assignments = Vec::with_capacity(method.params.len());

    for (index, param) in method.params.iter().enumerate() {
        let local = if is_go_keyword(&param.name) {
            format!("{}Arg", param.name)
        } else {
            param.name.clone()
        };
        let local = dedupe(local, &taken);
        taken.push(local.clone());

        let mut kind = go_type_ref(param, model).spelling;
        if method.variadic && index + 1 == method.params.len() {
            if let Some(element) = kind.strip_prefix("[]") {
                kind = format!("...{element}");
            }
        }
        params.push_str(&format!(", {local} {kind}"));
        assignments.push((format!("{}:", upper_first(&param.name)), local));
    }

    // gofmt aligns the values of a keyed composite literal.
    let key_width = column_width(assignments.iter().map(|(key, _)| key.as_str()));
    let request_fields: String = assignments
        .iter()
        .map(|(key, local)| format!("\t\t{key:<key_width$} {local},\n"))
        .collect();

    let results: String = method
        .results
        .iter()
        .map(|result| format!("{}, ", go_type_ref(result, model).spelling))
        .collect();
    let returns: String = method
        .results
        .iter()
        .map(|result| format!("resp.{}, ", upper_first(&result.name)))
        .collect();

    render(
        &templates.go_client_method,
        &[
            ("envelopes", envelopes),
            ("method", &method.name),
            ("params", &params),
            ("results", &results),
            ("request_fields", &request_fields),
            ("route", route),
            ("returns", &returns),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Arity, FieldSignature, InterfaceDeclaration};

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
                        name: "Lookup".into(),
                        params: vec![
                            FieldSignature::new("req", "string", Arity::Single),
                            FieldSignature::new("type", "int", Arity::Single),
                        ],
                        results: vec![],
                        returns_error: true,
                        variadic: false,
                    },
                    MethodSignature {
                        name: "Tag".into(),
                        params: vec![
                            FieldSignature::new("label", "string", Arity::Single),
                            FieldSignature::new("roles", "Role", Arity::List).with_owner("example"),
                        ],
                        results: vec![],
                        returns_error: true,
                        variadic: true,
                    },
                ],
            },
        );
        model
    }

    fn emit(model: &IntermediateModel) -> String {
        emit_go_client(model, &GoClientOptions::default(), &TemplateSet::default()).unwrap()
    }

    #[test]
    fn methods_post_to_server_routes() {
        let text = emit(&model());

        assert!(text.contains("package client\n"));
        assert!(text.contains(
            "func (c *Client) HasPermission(ctx context.Context, roles []example.Role) (bool, error) {"
        ));
        assert!(text.contains("err := c.post(ctx, \"/example/haspermission\", &req, &resp)"));
        assert!(text.contains("return resp.Bool, err"));
    }

    #[test]
    fn envelopes_and_imports_are_emitted() {
        let text = emit(&model());

        assert!(text.contains("type HasPermissionRequest struct {\n\tRoles []example.Role `json:\"roles\"`\n}"));
        assert!(text.contains("\t\"shop/example\"\n"));
        assert_eq!(text.matches("\t\"context\"\n").count(), 1);
    }

    #[test]
    fn parameter_names_avoid_locals_and_keywords() {
        let text = emit(&model());

        assert!(text.contains("(ctx context.Context, req2 string, typeArg int) (error) {"));
        assert!(text.contains("\t\tReq:  req2,\n\t\tType: typeArg,\n"));
        assert!(text.contains("\treturn err\n"));
    }

    #[test]
    fn variadic_parameters_keep_their_spread_form() {
        let text = emit(&model());

        assert!(text.contains(
            "func (c *Client) Tag(ctx context.Context, label string, roles ...example.Role) (error) {"
        ));
        assert!(text.contains("\t\tLabel: label,\n\t\tRoles: roles,\n"));
        assert!(text.contains("type TagRequest struct {\n\tLabel string         `json:\"label\"`\n\tRoles []example.Role `json:\"roles\"`\n}"));
    }
}
