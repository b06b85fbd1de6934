use std::time::Duration;

use anyhow::Result;
use sitefill::{Config, HttpGeocoder, Mode, Pipeline, PipelineReport, Precedence};
use tracing::warn;

use crate::cli::{EnrichArgs, ModeArg, PrecedenceArg};

/// Layer CLI flags over the config file (or the defaults).
fn build_config(args: &EnrichArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_toml_file(path)?,
        None => Config::default(),
    };

    if let Some(input) = &args.input { config.input = input.clone(); }
    if let Some(output) = &args.output { config.output = output.clone(); }
    if let Some(path) = &args.partial_output { config.partial_output = Some(path.clone()); }
    if let Some(path) = &args.boundaries { config.boundaries = Some(path.clone()); }
    if let Some(path) = &args.lookup { config.lookup = Some(path.clone()); }
    if let Some(key) = &args.api_key { config.api_key = key.clone(); }
    if let Some(endpoint) = &args.endpoint { config.endpoint = endpoint.clone(); }
    if let Some(n) = args.max_requests { config.max_requests = n; }
    if let Some(secs) = args.timeout { config.timeout_secs = secs; }
    if let Some(encoding) = &args.encoding { config.encoding = encoding.clone(); }
    if let Some(proj4) = &args.source_proj4 { config.boundary.source_proj4 = Some(proj4.clone()); }
    if let Some(mode) = args.mode {
        config.mode = match mode {
            ModeArg::Forward => Mode::Forward,
            ModeArg::Reverse => Mode::Reverse,
        };
    }
    if let Some(precedence) = args.precedence {
        config.precedence = match precedence {
            PrecedenceArg::RecordFirst => Precedence::RecordFirst,
            PrecedenceArg::BoundaryFirst => Precedence::BoundaryFirst,
        };
    }

    config.validate()?;
    Ok(config)
}

fn print_report(report: &PipelineReport, verbose: u8) {
    println!("Geocoding stage updated {} row(s): {}", report.geocode_changes.len(), report.geocode_changes);
    match &report.boundary_changes {
        Some(changes) => println!("Boundary stage updated {} row(s): {}", changes.len(), changes),
        None => println!("Boundary stage skipped; output holds geocoding results only"),
    }
    if let Some(path) = &report.partial_output {
        println!("Partial results: {}", path.display());
    }
    println!("Saved {} row(s) to {}", report.rows, report.output.display());
    println!("Rows updated: {}", report.changes);

    if verbose > 0 {
        println!("Requests used: {}", report.requests_used);
        for (status, count) in &report.statuses {
            println!("  {status}: {count}");
        }
    }
}

pub fn run(cli: &crate::cli::Cli, args: &EnrichArgs) -> Result<()> {
    let config = build_config(args)?;
    if config.api_key.is_empty() {
        warn!("no API key set (--api-key or GEOCODE_API_KEY); geocoding calls will be rejected");
    }

    let geocoder = HttpGeocoder::new(&config.endpoint, &config.api_key, Duration::from_secs(config.timeout_secs))?;
    let report = Pipeline::new(config, &geocoder)?.run()?;

    print_report(&report, cli.verbose);
    Ok(())
}
