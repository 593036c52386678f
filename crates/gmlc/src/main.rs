//! GML semantic analyzer
//!
//! Usage: gmlc [OPTIONS] <paths>...

use anyhow::{bail, Context};
use clap::Parser as ClapParser;
use gml_analyzer::common::DiagnosticReporter;
use gml_analyzer::driver::{type_listing, Pipeline};
use gml_analyzer::frontend::FrontendConfig;
use gml_analyzer::project::AnalysisConfig;
use gml_analyzer::sema::{NativeSpec, Severity};
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser, Debug)]
#[command(name = "gmlc")]
#[command(author = "GML Tools Team")]
#[command(version)]
#[command(about = "Semantic analyzer for GameMaker Language projects", long_about = None)]
struct Args {
    /// Source files or project directories
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Analysis config (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Native function database replacing the built-in one (JSON)
    #[arg(long)]
    native: Option<PathBuf>,

    /// Do not report unused global functions
    #[arg(long)]
    no_unused: bool,

    /// Treat undeclared references as errors
    #[arg(long)]
    strict: bool,

    /// Print the inferred type of every global
    #[arg(long)]
    types: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump CST (for debugging)
    #[arg(long)]
    dump_cst: bool,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(2);
        }
    }
}

/// Returns whether the project is free of errors
fn run(args: &Args) -> anyhow::Result<bool> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if args.no_unused {
        config.report_unused = false;
    }
    if args.strict {
        config.undeclared_severity = Severity::Error;
    }

    let mut pipeline = Pipeline::new(config).with_frontend(FrontendConfig {
        dump_tokens: args.dump_tokens,
        dump_cst: args.dump_cst,
        verbose: args.verbose,
    });
    if let Some(path) = &args.native {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let natives = NativeSpec::from_json(&text).with_context(|| format!("parsing {}", path.display()))?;
        pipeline = pipeline.with_natives(natives);
    }

    let sources = Pipeline::collect_sources(&args.paths)?;
    if sources.is_empty() {
        bail!("no .gml files found");
    }

    let mut reporter = DiagnosticReporter::new();
    let project = pipeline.load(&sources, &mut reporter)?;
    let summary = Pipeline::report(&project, &reporter);

    if args.types {
        print!("{}", type_listing(&project));
    }
    if args.verbose {
        eprintln!(
            "Analyzed {} file(s): {} error(s), {} warning(s), {} note(s)",
            summary.files, summary.errors, summary.warnings, summary.infos
        );
    }
    Ok(summary.errors == 0)
}
