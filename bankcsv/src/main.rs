//! bankcsv CLI - check bank statement CSVs before importing them
//!
//! # Main Commands
//!
//! ```bash
//! bankcsv validate statement.csv --profile xero-uk   # Check one CSV
//! bankcsv validate                                    # Prompt for the file
//! bankcsv profiles                                    # List validation profiles
//! ```
//!
//! # Generator Commands (for maintainers)
//!
//! ```bash
//! bankcsv fixtures                 # catalog.yaml -> fixtures/<region>/*.yaml
//! bankcsv samples --ci             # fixtures -> samples/, MANIFEST.json, checksums.txt
//! bankcsv release                  # samples -> releases/*.zip
//! ```
//!
//! Exit status: `0` clean, `1` issues found, `2` fatal error.

use bankcsv::error::{CliError, CliResult};
use bankcsv::logging::{init_logging, LogConfig};
use bankcsv::{
    generate_all, generate_fixtures, package_release, validate_file, GenerateSettings, Report,
    ValidatorConfig, DEFAULT_PROFILE, EXIT_CLEAN,
};
use clap::{ArgAction, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;

/// Exit status for errors that stop a command before it produces a result.
const EXIT_FATAL: u8 = 2;

#[derive(Parser)]
#[command(name = "bankcsv", version)]
#[command(
    about = "Validate bank statement CSVs before importing them into your accounting software",
    long_about = None
)]
struct Cli {
    /// More diagnostic output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a CSV file against a validation profile
    Validate {
        /// Path to the CSV file (prompted for when omitted)
        csv: Option<PathBuf>,

        /// Validation profile
        #[arg(short, long, default_value = DEFAULT_PROFILE)]
        profile: String,

        /// Config file (default: bundled configuration)
        #[arg(short, long, env = "BANKCSV_CONFIG")]
        config: Option<PathBuf>,
    },

    /// List available validation profiles
    Profiles {
        /// Config file (default: bundled configuration)
        #[arg(short, long, env = "BANKCSV_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Expand fixtures/catalog.yaml into per-bank fixtures
    Fixtures {
        /// Repository root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Render fixtures into CSV samples, manifest and checksums
    Samples {
        /// Repository root
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Keep the previous manifest timestamp (also enabled by CI=true)
        #[arg(long)]
        ci: bool,
    },

    /// Package samples into release zip bundles
    Release {
        /// Repository root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() -> ExitCode {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&LogConfig::from_verbosity(cli.verbose));

    let result = match cli.command {
        Commands::Validate {
            csv,
            profile,
            config,
        } => cmd_validate(csv, &profile, config.as_deref()),

        Commands::Profiles { config } => cmd_profiles(config.as_deref()),

        Commands::Fixtures { root } => cmd_fixtures(root),

        Commands::Samples { root, ci } => cmd_samples(root, ci),

        Commands::Release { root } => cmd_release(root),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn cmd_validate(csv: Option<PathBuf>, profile_name: &str, config_path: Option<&Path>) -> CliResult<u8> {
    let csv_path = match csv {
        Some(path) => path,
        None => prompt_for_file()?,
    };

    let config = ValidatorConfig::load_or_bundled(config_path)?;
    let profile = config.profile(profile_name)?;
    let issues = validate_file(&csv_path, &config, profile)?;

    let report = Report::new(issues, profile.label());
    if let Err(e) = report.render(&mut io::stdout().lock()) {
        warn!(error = %e, "could not write report to stdout");
    }

    Ok(report.exit_code())
}

/// Ask for a path on stdin, accepting a dragged-and-dropped (quoted) path.
fn prompt_for_file() -> CliResult<PathBuf> {
    print!("Drag & drop your CSV here (or type the path) and press Enter:\n> ");
    io::stdout().flush().ok();

    read_answer(io::stdin().lock())
}

/// First line of `input` as a path, with whitespace and quotes trimmed.
fn read_answer<R: BufRead>(mut input: R) -> CliResult<PathBuf> {
    let mut answer = String::new();
    let read = input.read_line(&mut answer).map_err(CliError::Prompt)?;
    let answer = answer.trim().trim_matches('"');

    if read == 0 || answer.is_empty() {
        return Err(CliError::NoInput);
    }
    Ok(PathBuf::from(answer))
}

fn cmd_profiles(config_path: Option<&Path>) -> CliResult<u8> {
    let config = ValidatorConfig::load_or_bundled(config_path)?;

    for (key, profile) in &config.profiles {
        println!("{:<16} {}", key, profile.label());
    }
    Ok(EXIT_CLEAN)
}

fn cmd_fixtures(root: PathBuf) -> CliResult<u8> {
    let settings = GenerateSettings::new(root);
    let written = generate_fixtures(&settings)?;

    println!("📄 Generated {} fixture(s):", written.len());
    for path in &written {
        println!("   {}", settings.relative(path));
    }
    Ok(EXIT_CLEAN)
}

fn cmd_samples(root: PathBuf, ci: bool) -> CliResult<u8> {
    let settings = GenerateSettings::from_env(root, ci);
    let manifest = generate_all(&settings)?;

    println!(
        "📦 Generated {} sample(s) and {} edge case(s)",
        manifest.summary.total_samples, manifest.summary.total_edge_cases
    );
    println!("   Softwares: {}", manifest.summary.softwares.join(", "));
    println!("   Countries: {}", manifest.summary.countries.join(", "));
    println!("   Manifest:  {}", manifest.generated_at);
    Ok(EXIT_CLEAN)
}

fn cmd_release(root: PathBuf) -> CliResult<u8> {
    let settings = GenerateSettings::new(root);
    let produced = package_release(&settings)?;

    println!("✨ Release bundles ready:");
    for path in &produced {
        println!(" - {}", settings.relative(path));
    }
    Ok(EXIT_CLEAN)
}
