use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

use jobsift_client::{ClientSettings, default_registry};
use jobsift_core::catalog;
use jobsift_core::dispatch::{DispatchOutcome, Dispatcher};
use jobsift_core::validate::validate;

#[derive(Parser)]
#[command(name = "jobsift", version, about = "Job listing ingestion and normalization")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape one or more sources and print normalized listings as JSON
    Scrape {
        #[command(flatten)]
        request: RequestArgs,

        /// Default proxies (comma separated) when the request names none
        #[arg(long, env = "JOBSIFT_PROXIES", value_delimiter = ',')]
        proxies: Vec<String>,

        /// Default CA bundle (PEM) when the request names none
        #[arg(long, env = "JOBSIFT_CA_CERT")]
        ca_cert: Option<String>,

        /// Skip TLS certificate verification
        #[arg(long, default_value_t = false)]
        insecure: bool,

        /// Product Hunt API token
        #[arg(long, env = "PRODUCTHUNT_TOKEN", hide_env_values = true)]
        producthunt_token: Option<String>,

        /// Pretty-print the JSON output
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Validate a request without touching the network
    Validate {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Show supported sources, countries, and job types
    Catalog,
}

/// Request fields. Flags override values read from `--config`.
#[derive(Args)]
struct RequestArgs {
    /// JSON file holding a raw request object
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source(s) to scrape, e.g. "jsjobbs,producthunt"
    #[arg(short, long, value_delimiter = ',')]
    source: Vec<String>,

    /// Text filter
    #[arg(short = 't', long)]
    search_term: Option<String>,

    #[arg(short, long)]
    location: Option<String>,

    #[arg(long)]
    country: Option<String>,

    /// fulltime, parttime, contract, or internship
    #[arg(short, long)]
    job_type: Option<String>,

    #[arg(short = 'n', long)]
    results_wanted: Option<i64>,

    #[arg(long)]
    offset: Option<i64>,

    /// Search radius in miles (0-200)
    #[arg(long)]
    distance: Option<i64>,

    /// Only remote listings
    #[arg(long, default_value_t = false)]
    remote: bool,

    #[arg(long, default_value_t = false)]
    easy_apply: bool,

    #[arg(long, default_value_t = false)]
    fetch_full_description: bool,

    /// Report every salary as a yearly figure
    #[arg(long, default_value_t = false)]
    enforce_annual_salary: bool,

    /// Only listings posted within this many hours
    #[arg(long)]
    hours_old: Option<i64>,

    /// markdown, html, or plain
    #[arg(long)]
    description_format: Option<String>,
}

impl RequestArgs {
    /// Merge the config file (if any) with explicit flags into a raw request.
    fn to_raw(&self) -> Result<Value> {
        let mut raw = match &self.config {
            Some(path) => load_config(path)?,
            None => Map::new(),
        };

        let mut set = |key: &str, value: Value| {
            raw.insert(key.to_string(), value);
        };

        match self.source.as_slice() {
            [] => {}
            [one] => set("source", json!(one)),
            many => set("source", json!(many)),
        }
        if let Some(v) = &self.search_term {
            set("search_term", json!(v));
        }
        if let Some(v) = &self.location {
            set("location", json!(v));
        }
        if let Some(v) = &self.country {
            set("country", json!(v));
        }
        if let Some(v) = &self.job_type {
            set("job_type", json!(v));
        }
        if let Some(v) = self.results_wanted {
            set("results_wanted", json!(v));
        }
        if let Some(v) = self.offset {
            set("offset", json!(v));
        }
        if let Some(v) = self.distance {
            set("distance", json!(v));
        }
        if let Some(v) = self.hours_old {
            set("hours_old", json!(v));
        }
        if let Some(v) = &self.description_format {
            set("description_format", json!(v));
        }
        for (flag, key) in [
            (self.remote, "is_remote"),
            (self.easy_apply, "easy_apply"),
            (self.fetch_full_description, "fetch_full_description"),
            (self.enforce_annual_salary, "enforce_annual_salary"),
        ] {
            if flag {
                set(key, json!(true));
            }
        }

        Ok(Value::Object(raw))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries JSON only
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jobsift=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            request,
            proxies,
            ca_cert,
            insecure,
            producthunt_token,
            pretty,
        } => {
            let settings = ClientSettings {
                proxies,
                ca_cert,
                accept_invalid_certs: insecure,
                producthunt_token,
            };
            cmd_scrape(&request, settings, pretty).await?;
        }
        Commands::Validate { request } => cmd_validate(&request)?,
        Commands::Catalog => print_json(&catalog::stats(), true)?,
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<Map<String, Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&text).context("Invalid JSON in config file")?;
    match value {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Config file must contain a JSON object"),
    }
}

async fn cmd_scrape(request: &RequestArgs, settings: ClientSettings, pretty: bool) -> Result<()> {
    let raw = request.to_raw()?;
    let dispatcher = Dispatcher::new(default_registry(settings));

    let outcome = dispatcher.run(&raw).await;
    print_json(&outcome, pretty)?;

    match outcome {
        DispatchOutcome::Success(report) => {
            tracing::info!(
                "Found {} listings in {:.1}s",
                report.total_count,
                report.elapsed_seconds
            );
            Ok(())
        }
        DispatchOutcome::Failure(failure) => anyhow::bail!(
            "Scrape failed: {} (HTTP {}): {}",
            failure.error_kind,
            failure.error_kind.http_status(),
            failure.detail
        ),
    }
}

fn cmd_validate(request: &RequestArgs) -> Result<()> {
    let raw = request.to_raw()?;
    let result = validate(&raw);
    print_json(&result, true)?;

    if !result.is_valid {
        anyhow::bail!("Configuration has {} error(s)", result.errors.len());
    }
    for warning in &result.warnings {
        tracing::warn!("{warning}");
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> RequestArgs {
        let mut argv = vec!["jobsift", "validate"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Commands::Validate { request } => request,
            _ => panic!("expected validate"),
        }
    }

    #[test]
    fn flags_become_raw_request() {
        let raw = parse(&["-s", "jsjobbs", "-t", "rust", "-n", "5", "--remote"])
            .to_raw()
            .unwrap();
        assert_eq!(raw["source"], json!("jsjobbs"));
        assert_eq!(raw["search_term"], json!("rust"));
        assert_eq!(raw["results_wanted"], json!(5));
        assert_eq!(raw["is_remote"], json!(true));
        assert!(raw.get("easy_apply").is_none());
    }

    #[test]
    fn multiple_sources_become_a_list() {
        let raw = parse(&["--source", "jsjobbs,producthunt"]).to_raw().unwrap();
        assert_eq!(raw["source"], json!(["jsjobbs", "producthunt"]));
        assert!(validate(&raw).is_valid);
    }

    #[test]
    fn flags_override_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("request.json");
        std::fs::write(&path, r#"{"source": "producthunt", "offset": 3, "search_term": "ai"}"#)
            .unwrap();

        let raw = parse(&["-c", path.to_str().unwrap(), "-t", "rust"])
            .to_raw()
            .unwrap();

        assert_eq!(raw["source"], json!("producthunt"));
        assert_eq!(raw["offset"], json!(3));
        assert_eq!(raw["search_term"], json!("rust"));
    }

    #[test]
    fn config_file_must_hold_an_object() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("request.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let err = parse(&["-c", path.to_str().unwrap()]).to_raw().unwrap_err();
        assert!(err.to_string().contains("JSON object"));

        let missing = tmp.path().join("missing.json");
        let err = load_config(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
