#![allow(clippy::print_stderr, clippy::print_stdout)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use screen_bindgen::logging::init_tracing;
use screen_bindgen::{
    generate, GeneratorConfig, NpmScriptFormatter, PostGenerationFormatter, RunMode,
    SourceProject,
};

#[derive(Parser, Debug)]
#[command(
    name = "screen-bindgen",
    version,
    about = "Generates per-screen binding modules from the core auth SDK sources"
)]
struct Args {
    /// Root of the core SDK checkout.
    #[arg(long = "core-sdk", default_value = "../auth0-acul-js")]
    core_sdk: PathBuf,

    /// Root of the binding package to generate into.
    #[arg(long = "package", default_value = ".")]
    package: PathBuf,

    /// Do not run `npm run lint:fix` after writing.
    #[arg(long)]
    skip_format: bool,

    /// Compare generated output with the files on disk instead of writing.
    #[arg(long)]
    check: bool,

    /// Print the generation report as JSON on stdout.
    #[arg(long = "report-json")]
    report_json: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> Result<u8> {
    let config = GeneratorConfig::new(&args.core_sdk, &args.package);
    let mode = if args.check {
        RunMode::Check
    } else {
        RunMode::Write
    };
    let formatter = NpmScriptFormatter::default();
    let formatter: Option<&dyn PostGenerationFormatter> = if args.skip_format {
        None
    } else {
        Some(&formatter)
    };

    let mut project = SourceProject::from_fs();
    let report = generate(&config, &mut project, formatter, mode)
        .with_context(|| format!("generation from {} failed", args.core_sdk.display()))?;

    if args.report_json {
        let json = report.to_json().context("failed to serialize the generation report")?;
        println!("{}", json);
    }

    if report.diagnostics.has_errors() {
        eprintln!("Utility methods without a utility map entry:");
        for unmapped in report.diagnostics.unmapped() {
            eprintln!("  - {}", unmapped);
        }
    }
    if !report.stale.is_empty() {
        eprintln!("Generated files out of date (re-run without --check):");
        for path in &report.stale {
            eprintln!("  - {}", config.display_path(path).display());
        }
    }

    Ok(report.exit_status())
}
