//! Go interface to RPC bridge generator.
//!
//! Reads a Go package that declares an API interface, builds an
//! [`IntermediateModel`](model::IntermediateModel) of its methods and the
//! types they use, and renders:
//!
//! - a TypeScript client service that posts JSON to one route per method
//! - a Go HTTP server that decodes requests, calls the interface and encodes
//!   responses, guarded by an auth wrapper
//! - optionally, a Go client for the same routes
//!
//! ## Modules
//!
//! - [`source`] - tree-sitter parsing into [`Declaration`](source::Declaration)s
//! - [`extract`] - package traversal (entry package plus one import hop)
//! - [`model`] - the intermediate model
//! - [`mapping`] - Go kind to TypeScript/Go type mapping and ambiguity reports
//! - [`emit`] - template-driven emitters
//! - [`output`] - artifact writing
//! - [`generate`] - the end-to-end pipeline
//!
//! ## Example Usage
//!
//! ```no_run
//! use bridge_lib::{GenerateOptions, generate};
//!
//! let options = GenerateOptions::new("backend/example.go", "github.com/acme/shop")
//!     .with_typescript("frontend/services/example.ts", None)
//!     .with_server("backend/server/server_gen.go", None);
//!
//! let report = generate(&options).unwrap();
//! for warning in &report.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! assert!(report.is_success());
//! ```

pub mod config;
pub mod emit;
pub mod error;
pub mod extract;
pub mod generate;
pub mod mapping;
pub mod model;
pub mod naming;
pub mod output;
pub mod source;

pub use config::GenerateOptions;
pub use error::{BridgeError, EmissionError, ExtractionError, OutputError};
pub use extract::{Depth, ExtractOptions, extract};
pub use generate::{Artifact, GenerationReport, RenderedArtifact, generate};
pub use model::IntermediateModel;
