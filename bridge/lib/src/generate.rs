//! The generation pipeline: extract once, then render and write each
//! requested artifact independently.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::GenerateOptions;
use crate::emit::{emit_client, emit_go_client, emit_server};
use crate::error::{BridgeError, EmissionError};
use crate::extract::extract;
use crate::mapping::{MappingAmbiguity, ambiguities};
use crate::model::IntermediateModel;
use crate::output::write_artifact;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    TypeScriptClient,
    GoServer,
    GoClient,
}

impl Artifact {
    pub fn label(self) -> &'static str {
        match self {
            Self::TypeScriptClient => "TypeScript client",
            Self::GoServer => "Go server",
            Self::GoClient => "Go client",
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One artifact that rendered successfully.
#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    pub artifact: Artifact,
    pub path: PathBuf,
    pub text: String,
    /// `false` for dry runs.
    pub written: bool,
}

/// Outcome of a run. Extraction failures abort the run instead.
#[derive(Debug)]
pub struct GenerationReport {
    pub model: IntermediateModel,
    pub warnings: Vec<MappingAmbiguity>,
    pub rendered: Vec<RenderedArtifact>,
    pub failures: Vec<BridgeError>,
}

impl GenerationReport {
    /// Every requested artifact rendered (and, unless dry-running, was written).
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn written(&self) -> impl Iterator<Item = &RenderedArtifact> {
        self.rendered.iter().filter(|artifact| artifact.written)
    }
}

/// Runs the pipeline described by `options`.
///
/// ## Errors
///
/// Returns an error only for invalid options or a failed extraction. Emission
/// and write failures are collected per artifact in
/// [`GenerationReport::failures`] so the remaining artifacts are still
/// produced.
pub fn generate(options: &GenerateOptions) -> Result<GenerationReport, BridgeError> {
    options.validate()?;

    let model = extract(&options.entry, &options.extract)?;
    tracing::info!(
        artifacts = options.requested(),
        dry_run = options.dry_run,
        "model extracted"
    );

    let warnings = ambiguities(&model);
    for warning in &warnings {
        tracing::warn!(
            owner = %warning.owner,
            field = %warning.field,
            kind = %warning.kind,
            "{}",
            warning.reason
        );
    }

    let mut report = GenerationReport {
        model,
        warnings,
        rendered: Vec::new(),
        failures: Vec::new(),
    };

    if let Some(target) = &options.typescript {
        let text = emit_client(
            &report.model,
            target.service_name.as_deref(),
            &options.templates,
        );
        finish(&mut report, Artifact::TypeScriptClient, &target.path, text, options.dry_run);
    }

    if let Some(target) = &options.server {
        let text = emit_server(&report.model, &target.options, &options.templates);
        finish(&mut report, Artifact::GoServer, &target.path, text, options.dry_run);
    }

    if let Some(target) = &options.go_client {
        let text = emit_go_client(&report.model, &target.options, &options.templates);
        finish(&mut report, Artifact::GoClient, &target.path, text, options.dry_run);
    }

    Ok(report)
}

fn finish(
    report: &mut GenerationReport,
    artifact: Artifact,
    path: &Path,
    text: Result<String, EmissionError>,
    dry_run: bool,
) {
    let text = match text {
        Ok(text) => text,
        Err(source) => {
            tracing::error!(%artifact, error = %source, "emission failed");
            report.failures.push(BridgeError::Emission {
                artifact: artifact.label(),
                source,
            });
            return;
        }
    };

    let written = if dry_run {
        false
    } else {
        match write_artifact(path, &text) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(%artifact, error = %e, "write failed");
                report.failures.push(e.into());
                return;
            }
        }
    };

    report.rendered.push(RenderedArtifact {
        artifact,
        path: path.to_path_buf(),
        text,
        written,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop_fixture() -> GenerateOptions {
        let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        GenerateOptions::new(fixtures.join("shop/example/example.go"), "github.com/acme/shop")
            .with_module_dir(fixtures.join("shop"))
            .with_typescript("unused.ts", None)
            .dry_run(true)
    }

    #[test]
    fn artifact_labels() {
        assert_eq!(Artifact::GoServer.to_string(), "Go server");
        assert_eq!(Artifact::TypeScriptClient.label(), "TypeScript client");
    }

    #[test]
    #[tracing_test::traced_test]
    fn ambiguities_are_logged_as_warnings() {
        let report = generate(&shop_fixture()).unwrap();

        assert!(!report.warnings.is_empty());
        assert!(logs_contain("map with non-builtin key or value is emitted opaquely"));
        assert!(logs_contain("Shelf"));
    }

    #[test]
    #[tracing_test::traced_test]
    fn unclassified_fields_are_logged_during_extraction() {
        generate(&shop_fixture()).unwrap();
        assert!(logs_contain("unclassifiable field type"));
    }

    #[test]
    fn invalid_options_are_rejected_before_extraction() {
        let options = GenerateOptions::new("does/not/exist.go", "");
        assert!(matches!(generate(&options), Err(BridgeError::Config(_))));
    }
}
