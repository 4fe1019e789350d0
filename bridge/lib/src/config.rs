//! Generation options.

use std::path::PathBuf;

use crate::emit::{GoClientOptions, ServerOptions, TemplateSet};
use crate::error::BridgeError;
use crate::extract::ExtractOptions;

/// Where the TypeScript client goes and what its service is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeScriptTarget {
    pub path: PathBuf,
    /// Defaults to the primary interface name.
    pub service_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoServerTarget {
    pub path: PathBuf,
    pub options: ServerOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoClientTarget {
    pub path: PathBuf,
    pub options: GoClientOptions,
}

/// Everything one generation run needs.
///
/// Artifacts left as `None` are not generated. A run with no artifacts only
/// extracts the model.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// A Go file inside the package that declares the API interface.
    pub entry: PathBuf,
    pub extract: ExtractOptions,
    pub typescript: Option<TypeScriptTarget>,
    pub server: Option<GoServerTarget>,
    pub go_client: Option<GoClientTarget>,
    pub templates: TemplateSet,
    /// Render artifacts without writing them.
    pub dry_run: bool,
}

impl GenerateOptions {
    pub fn new(entry: impl Into<PathBuf>, module_root: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            extract: ExtractOptions::new(module_root),
            typescript: None,
            server: None,
            go_client: None,
            templates: TemplateSet::default(),
            dry_run: false,
        }
    }

    pub fn with_module_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extract = self.extract.with_module_dir(dir);
        self
    }

    pub fn with_typescript(mut self, path: impl Into<PathBuf>, service_name: Option<String>) -> Self {
        self.typescript = Some(TypeScriptTarget {
            path: path.into(),
            service_name,
        });
        self
    }

    pub fn with_server(mut self, path: impl Into<PathBuf>, package: Option<String>) -> Self {
        let mut options = ServerOptions::default();
        if let Some(package) = package {
            options.package = package;
        }
        self.server = Some(GoServerTarget {
            path: path.into(),
            options,
        });
        self
    }

    pub fn with_go_client(mut self, path: impl Into<PathBuf>, package: Option<String>) -> Self {
        let mut options = GoClientOptions::default();
        if let Some(package) = package {
            options.package = package;
        }
        self.go_client = Some(GoClientTarget {
            path: path.into(),
            options,
        });
        self
    }

    pub fn with_templates(mut self, templates: TemplateSet) -> Self {
        self.templates = templates;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Number of artifacts this run will render.
    pub fn requested(&self) -> usize {
        usize::from(self.typescript.is_some())
            + usize::from(self.server.is_some())
            + usize::from(self.go_client.is_some())
    }

    /// Rejects options no run could succeed with.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.extract.module_root.trim().is_empty() {
            return Err(BridgeError::Config("module root must not be empty".into()));
        }

        if self.entry.extension().is_none_or(|ext| ext != "go") {
            return Err(BridgeError::Config(format!(
                "entry `{}` is not a .go file",
                self.entry.display()
            )));
        }

        let packages = [
            self.server.as_ref().map(|s| s.options.package.as_str()),
            self.go_client.as_ref().map(|c| c.options.package.as_str()),
        ];
        for package in packages.into_iter().flatten() {
            if !is_package_name(package) {
                return Err(BridgeError::Config(format!(
                    "`{package}` is not a valid Go package name"
                )));
            }
        }

        Ok(())
    }
}

fn is_package_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
