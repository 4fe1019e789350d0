//! Go HTTP server emission.
//!
//! The generated file exposes `New(api, auth, basic)`, an `Endpoint`
//! enumeration with the `AllEndpoints` sentinel, `Wrap` (CORS, `OPTIONS`,
//! base auth, then the all-routes predicate or the route's own predicate),
//! one `Handle<Method>` per RPC method and `AuthorizationToken(ctx)`.

use crate::emit::templates::{TemplateSet, render};
use crate::emit::{GoImports, api_package, column_width, go_envelopes, primary_api, server_route};
use crate::error::EmissionError;
use crate::model::{IntermediateModel, MethodSignature};
use crate::naming::{placeholder, upper_first};

/// Imports every generated server needs regardless of the schema.
const BASE_IMPORTS: &[&str] = &["context", "net/http", "strings"];

/// Imports used only by handlers.
const HANDLER_IMPORTS: &[&str] = &["encoding/json", "io"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOptions {
    /// Go package name of the generated file.
    pub package: String,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            package: "server".to_string(),
        }
    }
}

/// Renders the Go server for the primary interface.
///
/// ## Errors
///
/// Returns [`EmissionError`] when the model has no primary interface, a member
/// has no name, or a template references an unknown placeholder.
pub fn emit_server(
    model: &IntermediateModel,
    options: &ServerOptions,
    templates: &TemplateSet,
) -> Result<String, EmissionError> {
    let api = primary_api(model)?;
    let package = api_package(model, api);
    let api_type = format!("{package}.{}", api.name);
    let api_import = model.api_import_path();

    let mut additional = GoImports::default();
    let endpoints = endpoint_consts(api.methods.iter().map(|method| method.name.as_str()));
    let mut paths = String::new();
    let mut routes = String::new();
    let mut handler_parts = Vec::with_capacity(api.methods.len());

    for method in &api.methods {
        let route = server_route(package, &method.name);
        let owner = format!("{}.{}", api.name, method.name);

        paths.push_str(&format!(
            "\tcase {}Endpoint:\n\t\treturn \"{route}\"\n",
            method.name
        ));
        routes.push_str(&format!(
            "\thttp.HandleFunc(\"{route}\", s.Wrap({name}Endpoint, Handle{name}(s.API)))\n",
            name = method.name
        ));

        let envelopes = go_envelopes(model, templates, &owner, method, &mut additional)?;
        handler_parts.push((method, envelopes));
    }

    // Placeholders must not shadow any package the file imports.
    let mut taken = additional.bound_names();
    taken.push(package.to_string());

    let mut handlers = String::new();
    for (method, envelopes) in handler_parts {
        let invoke = invocation(method, &taken);
        handlers.push_str(&render(
            &templates.server_handler,
            &[
                ("envelopes", &envelopes),
                ("method", &method.name),
                ("api_type", &api_type),
                ("invoke", &invoke),
            ],
        )?);
    }

    let mut imports = GoImports::default();
    for path in BASE_IMPORTS {
        imports.add(path);
    }
    if !api.methods.is_empty() {
        for path in HANDLER_IMPORTS {
            imports.add(path);
        }
    }
    if let Some(path) = api_import {
        imports.add(path);
    }
    for path in additional.paths() {
        if Some(path) != api_import {
            imports.add(path);
        }
    }

    tracing::debug!(
        package = %options.package,
        api = %api_type,
        routes = api.methods.len(),
        "rendered Go server"
    );

    render(
        &templates.server_file,
        &[
            ("package", &options.package),
            ("imports", &imports.render()),
            ("api_type", &api_type),
            ("endpoints", &endpoints),
            ("paths", &paths),
            ("routes", &routes),
            ("handlers", &handlers),
        ],
    )
}

/// The body of the `Endpoint` const block: one identifier per method, then the
/// `AllEndpoints` sentinel, with the name column aligned.
fn endpoint_consts<'a>(methods: impl Iterator<Item = &'a str>) -> String {
    let mut names: Vec<String> = methods.map(|method| format!("{method}Endpoint")).collect();
    names.push("AllEndpoints".to_string());
    let width = column_width(names.iter().map(String::as_str));

    names
        .iter()
        .enumerate()
        .map(|(index, name)| format!("\t{name:<width$} Endpoint = {index}\n"))
        .collect()
}

/// The call into the API plus the response assignments, indented for the
/// handler body.
fn invocation(method: &MethodSignature, taken: &[String]) -> String {
    let mut taken = taken.to_vec();
    let mut bindings = Vec::with_capacity(method.results.len());
    for index in 0..method.results.len() {
        let name = placeholder(&method.name, index, &taken);
        taken.push(name.clone());
        bindings.push(name);
    }

    let mut args: String = method
        .params
        .iter()
        .map(|param| format!(", req.{}", upper_first(&param.name)))
        .collect();
    if method.variadic {
        args.push_str("...");
    }
    let call = format!("api.{}(ctx{args})", method.name);

    let mut lhs = bindings.clone();
    if method.returns_error {
        lhs.push("err".to_string());
    }

    let mut out = match (bindings.is_empty(), method.returns_error) {
        (true, false) => format!("\t\t{call}\n"),
        (true, true) => format!("\t\terr = {call}\n"),
        (false, _) => format!("\t\t{} := {call}\n", lhs.join(", ")),
    };

    if method.returns_error {
        out.push_str(
            "\t\tif err != nil {\n\
             \t\t\thttp.Error(w, err.Error(), http.StatusInternalServerError)\n\
             \t\t\treturn\n\
             \t\t}\n",
        );
    }

    out.push_str(&format!("\n\t\tvar resp {}Response\n", method.name));
    for (result, binding) in method.results.iter().zip(&bindings) {
        out.push_str(&format!("\t\tresp.{} = {binding}\n", upper_first(&result.name)));
    }

    out
}
