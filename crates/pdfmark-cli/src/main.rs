use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt};

use pdfmark_core::{
    CrossRefWork, Doi, MarkBuilder, MarkConfig, MarkFailure, MarkOutcome, Record, RecordSummary,
    Unixref,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "pdfmark",
    about = "Turn CrossRef metadata records into XMP packets",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting PDFMARK_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Config file to use instead of ~/.config/pdfmark/config.toml.
    #[arg(long, global = true, env = "PDFMARK_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an XMP packet from a stored record.
    Xmp {
        file: PathBuf,
        #[command(flatten)]
        source: SourceArgs,
        /// Write the packet here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override packet.padding from the config.
        #[arg(long)]
        padding: Option<usize>,
    },

    /// Show what a stored record exposes.
    Inspect {
        file: PathBuf,
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
struct SourceArgs {
    #[arg(long, value_enum, default_value_t = RecordFormat::Auto)]
    format: RecordFormat,

    /// DOI the record was looked up with. Needed for registry error
    /// records, which carry no DOI of their own.
    #[arg(long)]
    doi: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RecordFormat {
    Auto,
    Unixref,
    CrossrefJson,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file path.
    Path,
    /// Print the effective config.
    Show,
    /// Write the default config to the config path.
    Init {
        #[arg(long)]
        force: bool,
    },
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();
    init_tracing();

    let json_output = cli.json || std::env::var("PDFMARK_JSON").as_deref() == Ok("1");
    let config_path = cli.config.clone().unwrap_or_else(MarkConfig::config_path);
    let config = MarkConfig::load_from(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    debug!(path = %config_path.display(), "config loaded");

    match cli.command {
        Commands::Xmp {
            file,
            source,
            output,
            padding,
        } => {
            let record = load_record(&file, &source)?;
            let mut packet_config = config.packet.clone();
            if let Some(padding) = padding {
                packet_config.padding = padding;
            }

            match MarkBuilder::new(packet_config).on_metadata(record.as_ref()) {
                MarkOutcome::Success(packet) => match output {
                    Some(path) => {
                        std::fs::write(&path, packet.as_bytes())
                            .with_context(|| format!("writing {}", path.display()))?;
                        if json_output {
                            print_json(&serde_json::json!({
                                "status": "ok",
                                "data": {
                                    "doi": record.doi(),
                                    "output": path,
                                    "bytes": packet.len(),
                                },
                                "meta": { "duration_ms": start.elapsed().as_millis() }
                            }))?;
                        } else {
                            println!("{} → {} ({} bytes)", record.doi(), path.display(), packet.len());
                        }
                    }
                    None if json_output => {
                        print_json(&serde_json::json!({
                            "status": "ok",
                            "data": { "doi": record.doi(), "packet": packet.as_str() },
                            "meta": { "duration_ms": start.elapsed().as_millis() }
                        }))?;
                    }
                    None => {
                        let mut stdout = std::io::stdout().lock();
                        stdout.write_all(packet.as_bytes())?;
                        stdout.write_all(b"\n")?;
                    }
                },
                MarkOutcome::Failure(failure) => {
                    if json_output {
                        print_json(&failure_envelope(&failure))?;
                    } else {
                        eprintln!("{failure}");
                    }
                    std::process::exit(failure.code.exit_code());
                }
            }
        }

        Commands::Inspect { file, source } => {
            let record = load_record(&file, &source)?;
            let summary = RecordSummary::from_record(record.as_ref());

            if json_output {
                print_json(&serde_json::json!({
                    "status": if summary.is_clean() { "ok" } else { "partial" },
                    "data": summary,
                    "meta": { "duration_ms": start.elapsed().as_millis() }
                }))?;
            } else {
                print_summary(&summary);
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Path => {
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":{"path":config_path}}))?;
                } else {
                    println!("{}", config_path.display());
                }
            }
            ConfigAction::Show => {
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":config}))?;
                } else {
                    print!("{}", config.to_toml()?);
                }
            }
            ConfigAction::Init { force } => {
                if config_path.exists() && !force {
                    anyhow::bail!(
                        "{} already exists (use --force to overwrite)",
                        config_path.display()
                    );
                }
                MarkConfig::default().save_to(&config_path)?;
                println!("✓ Config: {}", config_path.display());
            }
        },
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn failure_envelope(failure: &MarkFailure) -> serde_json::Value {
    serde_json::json!({ "status": "error", "data": failure })
}

fn detect_format(contents: &str) -> RecordFormat {
    if contents.trim_start().starts_with('{') {
        RecordFormat::CrossrefJson
    } else {
        RecordFormat::Unixref
    }
}

fn load_record(file: &Path, source: &SourceArgs) -> Result<Box<dyn Record>> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let doi = source.doi.as_deref().map(Doi::parse).transpose()?;

    let format = match source.format {
        RecordFormat::Auto => detect_format(&contents),
        explicit => explicit,
    };
    debug!(?format, file = %file.display(), "reading record");

    let record: Box<dyn Record> = match (format, &doi) {
        (RecordFormat::CrossrefJson, _) => Box::new(CrossRefWork::parse(&contents)?),
        (_, Some(doi)) => Box::new(Unixref::parse_with_doi(&contents, &doi.normalized)?),
        (_, None) => Box::new(Unixref::parse(&contents)?),
    };

    if let Some(doi) = &doi
        && !record.doi().eq_ignore_ascii_case(&doi.normalized)
    {
        warn!(requested = %doi, found = record.doi(), "record DOI differs from --doi");
    }

    Ok(record)
}

fn print_summary(summary: &RecordSummary) {
    println!("DOI:      {}", summary.doi);
    match summary.record_type {
        Some(record_type) => println!("Type:     {record_type:?}"),
        None => println!("Type:     unknown"),
    }
    if let Some(date) = &summary.publication_date {
        println!("Date:     {date}");
    }
    for title in &summary.titles {
        println!("Title:    {title}");
    }
    for contributor in &summary.contributors {
        println!("Author:   {contributor}");
    }
    for problem in &summary.problems {
        println!("✗ {problem}");
    }
}
