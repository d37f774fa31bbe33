use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use sheetpivot_core::logging::init_logging;
use sheetpivot_core::{ConverterConfig, Session};
use std::path::PathBuf;

mod formatter;

#[derive(Parser)]
#[command(name = "sheetpivot")]
#[command(about = "Convert evaluation sheets from one row per method to one column per method", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the Excel/ODS file to convert
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Output file (defaults to <FILE stem>_converted.xlsx next to the input)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Methods to report, in column order (overrides the configuration)
    #[arg(short, long, value_delimiter = ',', value_name = "METHOD")]
    methods: Vec<String>,

    /// Worksheet to read (defaults to the first one)
    #[arg(long, value_name = "SHEET")]
    sheet: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output for scripting
    Json,
}

fn load_config(cli: &Cli) -> Result<ConverterConfig> {
    let mut config = if let Some(config_path) = &cli.config {
        ConverterConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("sheetpivot.toml");
        if default_config_path.exists() {
            ConverterConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            ConverterConfig::default()
        }
    };

    if !cli.methods.is_empty() {
        config.methods = cli.methods.clone();
    }
    if cli.sheet.is_some() {
        config.input_sheet = cli.sheet.clone();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = load_config(&cli)?;

    let mut session = Session::new(config);
    session.select(&cli.file);
    session.set_output(cli.output.clone());

    let outcome = match cli.format {
        OutputFormat::Human => {
            let mut sink = formatter::HumanSink;
            let outcome = session.convert(&mut sink);
            formatter::print_human_summary(&outcome);
            outcome
        }
        OutputFormat::Json => {
            let mut events: Vec<String> = Vec::new();
            let outcome = session.convert(&mut events);
            formatter::print_json(&cli.file, &outcome, events)?;
            outcome
        }
    };

    if outcome.is_err() {
        std::process::exit(1);
    }
    Ok(())
}
