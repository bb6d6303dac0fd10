//! fbq CLI - Command-line interface for Facebook Quantifier
//!
//! Commands:
//! - quantify: Turn one or more export folders into CSV activity tables
//! - categories: List the registered categories and where they are read from

use clap::{Parser, Subcommand, ValueEnum};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use facebook_quantifier::registry::{registry, SourceFiles};
use facebook_quantifier::{
    DayBoundary, IdentityMatch, MessageAttribution, Quantification, Quantifier, QuantifierConfig,
    QuantifyError, QUANTIFIER_VERSION,
};

/// Prefix Facebook gives export folders
const EXPORT_PREFIX: &str = "facebook-";

/// fbq - Quantify user activity in a Facebook data export
#[derive(Parser)]
#[command(name = "fbq")]
#[command(version = QUANTIFIER_VERSION)]
#[command(about = "Count Facebook activity per day from a 'Download Your Information' export", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quantify export folders into CSV activity tables
    Quantify {
        /// Export folder; when omitted, ./facebook-<user name> folders are scanned
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// Name of the user, used to tell sent from received messages
        #[arg(short, long)]
        user: Option<String>,

        /// How the user name is compared with message senders
        /// (default: exact for --user, normalized for names taken from folder names)
        #[arg(long)]
        identity_match: Option<MatchMode>,

        /// Output CSV path (single folder only; default facebook_data_<user>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the run report as JSON to this path (single folder only)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Print the run report as JSON instead of the text summary
        #[arg(long)]
        json: bool,

        /// Cut days in the local timezone instead of UTC
        #[arg(long)]
        local_time: bool,

        /// Load base configuration from a JSON file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List registered categories and their source files
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MatchMode {
    /// Case-sensitive equality
    Exact,
    /// Ignore whitespace and case
    Normalized,
}

impl From<MatchMode> for IdentityMatch {
    fn from(mode: MatchMode) -> Self {
        match mode {
            MatchMode::Exact => IdentityMatch::Exact,
            MatchMode::Normalized => IdentityMatch::Normalized,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("facebook_quantifier={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), FbqCliError> {
    match cli.command {
        Commands::Quantify {
            folder,
            user,
            identity_match,
            output,
            report,
            json,
            local_time,
            config,
        } => {
            let base = match config {
                Some(path) => QuantifierConfig::from_json_file(&path)?,
                None => QuantifierConfig::default(),
            };
            let base = if local_time {
                base.with_day_boundary(DayBoundary::Local)
            } else {
                base
            };

            let targets = resolve_targets(folder, user, identity_match, &base)?;
            let single = targets.len() == 1;
            if !single && (output.is_some() || report.is_some()) {
                return Err(FbqCliError::OutputNeedsSingleFolder);
            }

            for target in targets {
                cmd_quantify(
                    &target,
                    output.as_deref(),
                    report.as_deref(),
                    json,
                )?;
            }
            Ok(())
        }

        Commands::Categories { json } => cmd_categories(json),
    }
}

/// An export folder with the configuration to quantify it with
struct Target {
    folder: PathBuf,
    label: String,
    config: QuantifierConfig,
}

fn resolve_targets(
    folder: Option<PathBuf>,
    user: Option<String>,
    identity_match: Option<MatchMode>,
    base: &QuantifierConfig,
) -> Result<Vec<Target>, FbqCliError> {
    let folders = match folder {
        Some(folder) => {
            let folder = expand_home(&folder);
            if !folder.is_dir() {
                return Err(FbqCliError::NotAFolder(folder));
            }
            vec![folder]
        }
        None => scan_export_folders(Path::new("."))?,
    };

    if folders.is_empty() {
        return Err(FbqCliError::NoExportFound);
    }
    if user.is_some() && folders.len() > 1 {
        return Err(FbqCliError::AmbiguousUser(folders.len()));
    }

    let mut targets = Vec::new();
    for folder in folders {
        let mut config = base.clone();

        // --user, then the configured identity, then the folder name
        let (identity, default_match) = match (&user, &base.identity) {
            (Some(user), _) => (Some(user.clone()), base.identity_match),
            (None, Some(configured)) => (Some(configured.clone()), base.identity_match),
            (None, None) => match user_from_folder(&folder) {
                Some(derived) => (Some(derived), IdentityMatch::Normalized),
                None => (None, base.identity_match),
            },
        };
        config.identity = identity;
        config.identity_match = identity_match.map(Into::into).unwrap_or(default_match);

        let label = config
            .identity
            .as_deref()
            .map(file_label)
            .unwrap_or_else(|| file_label(&folder_name(&folder)));

        targets.push(Target {
            folder,
            label,
            config,
        });
    }

    Ok(targets)
}

fn scan_export_folders(dir: &Path) -> Result<Vec<PathBuf>, FbqCliError> {
    let mut folders: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && folder_name(path).starts_with(EXPORT_PREFIX))
        .collect();
    folders.sort();
    Ok(folders)
}

/// `facebook-janedoe` -> `janedoe`
fn user_from_folder(folder: &Path) -> Option<String> {
    folder_name(folder)
        .strip_prefix(EXPORT_PREFIX)
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
}

fn folder_name(folder: &Path) -> String {
    folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_label(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

fn cmd_quantify(
    target: &Target,
    output: Option<&Path>,
    report_path: Option<&Path>,
    json: bool,
) -> Result<(), FbqCliError> {
    tracing::info!(folder = %target.folder.display(), "checking export folder");

    let quantifier = Quantifier::new(target.config.clone())?;
    let result = quantifier.quantify(&target.folder)?;

    let csv_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("facebook_data_{}.csv", target.label)));
    let writer = BufWriter::new(File::create(&csv_path)?);
    result.table.write_csv(writer)?;

    if let Some(path) = report_path {
        fs::write(path, result.report.to_json_pretty()?)?;
    }

    if json {
        println!("{}", result.report.to_json_pretty()?);
    } else {
        print_summary(target, &result, &csv_path);
    }

    Ok(())
}

fn print_summary(target: &Target, result: &Quantification, csv_path: &Path) {
    let report = &result.report;

    println!("Export: {}", target.folder.display());
    println!(
        "User:   {}",
        target.config.identity.as_deref().unwrap_or("(none)")
    );
    println!();

    for (category, count) in report.found() {
        println!("  - Number of dates found for {}: {}", category, count);
    }

    if report.message_attribution == MessageAttribution::Fallback {
        println!();
        println!(
            "No sent messages found; verify that the user name matches the name used in Messenger."
        );
    }

    if !report.zero_matches.is_empty() {
        let names: Vec<&str> = report.zero_matches.iter().map(|c| c.as_str()).collect();
        println!();
        println!("No dates found for the following categories:");
        println!("  {}", names.join(", "));
        println!("Usually this means that Facebook has no record of them.");
    }

    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &report.warnings {
            let path = warning
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!("  [WARN] {} {}: {}", warning.entry, path, warning.reason);
        }
    }

    if report.discarded_timestamps > 0 {
        println!(
            "  [WARN] {} unparseable timestamps discarded",
            report.discarded_timestamps
        );
    }

    println!();
    println!(
        "Saved file: {} ({} days, {} categories)",
        csv_path.display(),
        result.table.rows.len(),
        result.table.columns.len()
    );
}

fn cmd_categories(json: bool) -> Result<(), FbqCliError> {
    let listing: Vec<CategoryListing> = registry()
        .iter()
        .map(|entry| CategoryListing {
            entry: entry.name.to_string(),
            rule: entry.rule.kind().to_string(),
            categories: entry
                .rule
                .categories()
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            sources: match entry.sources {
                SourceFiles::Candidates(paths) => paths.iter().map(|p| p.to_string()).collect(),
                SourceFiles::Recursive { dir, extension } => {
                    vec![format!("{}/**/*.{}", dir, extension)]
                }
            },
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        println!("Registered categories");
        println!("=====================");
        for item in &listing {
            println!("{} ({})", item.entry, item.rule);
            println!("  categories: {}", item.categories.join(", "));
            for source in &item.sources {
                println!("  source:     {}", source);
            }
        }
    }

    Ok(())
}

// Error types

#[derive(Debug)]
enum FbqCliError {
    Io(io::Error),
    Quantify(QuantifyError),
    Json(serde_json::Error),
    NotAFolder(PathBuf),
    NoExportFound,
    AmbiguousUser(usize),
    OutputNeedsSingleFolder,
}

impl From<io::Error> for FbqCliError {
    fn from(e: io::Error) -> Self {
        FbqCliError::Io(e)
    }
}

impl From<QuantifyError> for FbqCliError {
    fn from(e: QuantifyError) -> Self {
        FbqCliError::Quantify(e)
    }
}

impl From<serde_json::Error> for FbqCliError {
    fn from(e: serde_json::Error) -> Self {
        FbqCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<FbqCliError> for CliError {
    fn from(e: FbqCliError) -> Self {
        match e {
            FbqCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            FbqCliError::Quantify(QuantifyError::ExportRootNotFound(path)) => CliError {
                code: "EXPORT_NOT_FOUND".to_string(),
                message: format!("Export folder not found: {}", path.display()),
                hint: Some("Pass the unzipped export folder with --folder".to_string()),
            },
            FbqCliError::Quantify(e) => CliError {
                code: "QUANTIFY_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            FbqCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            FbqCliError::NotAFolder(path) => CliError {
                code: "NOT_A_FOLDER".to_string(),
                message: format!("Specified path is not a folder: {}", path.display()),
                hint: Some("Point --folder at the unzipped export".to_string()),
            },
            FbqCliError::NoExportFound => CliError {
                code: "NO_EXPORT_FOUND".to_string(),
                message: "Could not find any facebook-<user name> folder".to_string(),
                hint: Some(
                    "Provide the folder with --folder or run fbq next to the export folder"
                        .to_string(),
                ),
            },
            FbqCliError::AmbiguousUser(count) => CliError {
                code: "AMBIGUOUS_USER".to_string(),
                message: format!("{} export folders found but only one user name provided", count),
                hint: Some("Pick the folder with --folder".to_string()),
            },
            FbqCliError::OutputNeedsSingleFolder => CliError {
                code: "OUTPUT_NEEDS_SINGLE_FOLDER".to_string(),
                message: "--output and --report apply to a single export folder".to_string(),
                hint: Some("Pick the folder with --folder".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct CategoryListing {
    entry: String,
    rule: String,
    categories: Vec<String>,
    sources: Vec<String>,
}
