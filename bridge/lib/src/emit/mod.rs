//! Artifact emitters.
//!
//! Each emitter is a pure function of the [`IntermediateModel`] and a
//! [`TemplateSet`]: the same inputs always produce byte-identical text.
//!
//! - [`typescript`] renders the browser client
//! - [`server`] renders the Go HTTP server with its auth wrapper
//! - [`go_client`] renders a Go client for the same routes

pub mod go_client;
pub mod server;
pub mod templates;
pub mod typescript;

use std::collections::BTreeSet;

pub use go_client::{GoClientOptions, emit_go_client};
pub use server::{ServerOptions, emit_server};
pub use templates::{Template, TemplateSet, render};
pub use typescript::emit_client;

use crate::error::EmissionError;
use crate::mapping::go_type_ref;
use crate::model::{FieldSignature, InterfaceDeclaration, IntermediateModel, MethodSignature};
use crate::naming::upper_first;

/// Path the TypeScript client posts to, relative to its backend URL.
pub fn client_route(service: &str, method: &str) -> String {
    format!("{}/{}", service.to_lowercase(), method.to_lowercase())
}

/// Path the Go server registers for `method`.
pub fn server_route(api_package: &str, method: &str) -> String {
    format!("/{}/{}", api_package, method.to_lowercase())
}

pub(crate) fn primary_api(model: &IntermediateModel) -> Result<&InterfaceDeclaration, EmissionError> {
    model.primary_api().ok_or(EmissionError::NoPrimaryInterface)
}

/// Package the server routes are namespaced under.
pub(crate) fn api_package<'m>(model: &'m IntermediateModel, api: &'m InterfaceDeclaration) -> &'m str {
    model.api_package.as_deref().unwrap_or(&api.owning_package)
}

pub(crate) fn require_names(owner: &str, fields: &[FieldSignature]) -> Result<(), EmissionError> {
    if fields.iter().any(|field| field.name.is_empty()) {
        return Err(EmissionError::UnnamedMember {
            owner: owner.to_string(),
        });
    }
    Ok(())
}

/// Import paths referenced by generated Go code, sorted and de-duplicated.
#[derive(Debug, Default)]
pub(crate) struct GoImports(BTreeSet<String>);

impl GoImports {
    pub(crate) fn add(&mut self, path: &str) {
        self.0.insert(path.to_string());
    }

    pub(crate) fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Last path segment of every import, i.e. the identifiers they bind.
    pub(crate) fn bound_names(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|path| path.rsplit('/').next().unwrap_or(path).to_string())
            .collect()
    }

    pub(crate) fn render(&self) -> String {
        self.0.iter().map(|path| format!("\t\"{path}\"\n")).collect()
    }
}

/// Renders the `<Method>Request` and `<Method>Response` Go structs and records
/// the imports their field types need.
pub(crate) fn go_envelopes(
    model: &IntermediateModel,
    templates: &TemplateSet,
    owner: &str,
    method: &MethodSignature,
    imports: &mut GoImports,
) -> Result<String, EmissionError> {
    require_names(owner, &method.params)?;
    require_names(owner, &method.results)?;

    let request = go_envelope(
        model,
        templates,
        &format!("{}Request", method.name),
        &method.params,
        imports,
    )?;
    let response = go_envelope(
        model,
        templates,
        &format!("{}Response", method.name),
        &method.results,
        imports,
    )?;

    Ok(request + &response)
}

fn go_envelope(
    model: &IntermediateModel,
    templates: &TemplateSet,
    name: &str,
    fields: &[FieldSignature],
    imports: &mut GoImports,
) -> Result<String, EmissionError> {
    let columns: Vec<(String, String)> = fields
        .iter()
        .map(|field| {
            let reference = go_type_ref(field, model);
            for path in &reference.imports {
                imports.add(path);
            }
            (upper_first(&field.name), reference.spelling)
        })
        .collect();

    // gofmt aligns the name, type and tag columns of a struct.
    let name_width = column_width(columns.iter().map(|(name, _)| name.as_str()));
    let kind_width = column_width(columns.iter().map(|(_, kind)| kind.as_str()));

    let mut body = String::new();
    for ((member, kind), field) in columns.iter().zip(fields) {
        body.push_str(&render(
            &templates.go_envelope_field,
            &[
                ("name", &format!("{member:<name_width$}")),
                ("kind", &format!("{kind:<kind_width$}")),
                ("wire", &field.name),
            ],
        )?);
    }

    render(&templates.go_envelope, &[("name", name), ("fields", &body)])
}

/// Width of the widest cell, in characters.
pub(crate) fn column_width<'a>(cells: impl IntoIterator<Item = &'a str>) -> usize {
    cells
        .into_iter()
        .map(|cell| cell.chars().count())
        .max()
        .unwrap_or(0)
}
