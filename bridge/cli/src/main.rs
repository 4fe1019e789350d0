//! Bridge CLI - generate a TypeScript client and Go server from a Go interface

use std::path::PathBuf;
use std::process::ExitCode;

use bridge_lib::{BridgeError, GenerateOptions, GenerationReport, generate};
use clap::Parser;
use owo_colors::{OwoColorize, Stream};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "bridge",
    version,
    about = "Generate a TypeScript RPC client and Go HTTP server from a Go API interface"
)]
struct Cli {
    /// Go file inside the package that declares the API interface
    #[arg(long, value_name = "FILE")]
    api: PathBuf,

    /// Go module path; imports containing it are followed one hop
    #[arg(long = "mod", value_name = "MODULE")]
    module: String,

    /// Directory the module path refers to
    #[arg(long = "mod-dir", value_name = "DIR", default_value = ".")]
    module_dir: PathBuf,

    /// Write the TypeScript client to this file
    #[arg(long, value_name = "FILE")]
    ts: Option<PathBuf>,

    /// Class name and URL prefix of the TypeScript service
    #[arg(long = "ts-service", value_name = "NAME", requires = "ts")]
    ts_service: Option<String>,

    /// Write the Go server to this file
    #[arg(long, value_name = "FILE")]
    server: Option<PathBuf>,

    /// Package name of the generated server
    #[arg(long = "server-package", value_name = "NAME", requires = "server")]
    server_package: Option<String>,

    /// Write a Go client to this file
    #[arg(long = "go-client", value_name = "FILE")]
    go_client: Option<PathBuf>,

    /// Package name of the generated Go client
    #[arg(long = "go-client-package", value_name = "NAME", requires = "go_client")]
    go_client_package: Option<String>,

    /// Print generated artifacts instead of writing them
    #[arg(long)]
    dry_run: bool,

    /// Print the extracted model as JSON
    #[arg(long)]
    dump_model: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> GenerateOptions {
        let mut options = GenerateOptions::new(&self.api, &self.module)
            .with_module_dir(&self.module_dir)
            .dry_run(self.dry_run);

        if let Some(path) = &self.ts {
            options = options.with_typescript(path, self.ts_service.clone());
        }
        if let Some(path) = &self.server {
            options = options.with_server(path, self.server_package.clone());
        }
        if let Some(path) = &self.go_client {
            options = options.with_go_client(path, self.go_client_package.clone());
        }

        options
    }
}

/// Initialize tracing subscriber with verbosity level.
///
/// `RUST_LOG` takes precedence over `-v`. Logs go to stderr so generated
/// text on stdout stays clean.
fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,bridge_lib=info".to_string(),
            2 => "info,bridge_lib=debug".to_string(),
            _ => "debug,bridge_lib=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbose >= 2)
                .with_file(verbose >= 3)
                .with_line_number(verbose >= 3)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!(
                "{} {e}",
                "error:".if_supports_color(Stream::Stderr, |t| t.red())
            );
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every requested artifact was produced.
fn run(cli: &Cli) -> Result<bool, BridgeError> {
    let options = cli.options();
    if options.requested() == 0 && !cli.dump_model {
        eprintln!(
            "{} nothing to generate; pass --ts, --server or --go-client",
            "warning:".if_supports_color(Stream::Stderr, |t| t.yellow())
        );
    }

    let report = generate(&options)?;

    if cli.dump_model {
        let json = serde_json::to_string_pretty(&report.model)
            .map_err(|e| BridgeError::Config(format!("cannot serialize model: {e}")))?;
        println!("{json}");
    }

    if cli.dry_run {
        for artifact in &report.rendered {
            println!("// ===== {} ({}) =====", artifact.artifact, artifact.path.display());
            println!("{}", artifact.text);
        }
    }

    print_summary(&report);
    Ok(report.is_success())
}

fn print_summary(report: &GenerationReport) {
    for warning in &report.warnings {
        eprintln!(
            "{} {warning}",
            "warning:".if_supports_color(Stream::Stderr, |t| t.yellow())
        );
    }

    for artifact in report.written() {
        eprintln!(
            "{} {} -> {}",
            "wrote".if_supports_color(Stream::Stderr, |t| t.green()),
            artifact.artifact,
            artifact.path.display()
        );
    }

    for failure in &report.failures {
        eprintln!(
            "{} {failure}",
            "error:".if_supports_color(Stream::Stderr, |t| t.red())
        );
    }
}
