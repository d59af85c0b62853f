use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use uuid::Uuid;

use imgdrop_core::{ErrorMetadata, UploadConfig};
use imgdrop_processing::{extension_of, FormatRegistry, ImageUploader, UploadError};
use imgdrop_storage::{create_storage, DiscardStorage, Storage};

mod telemetry;

#[derive(Parser, Debug)]
#[command(name = "imgdrop")]
#[command(about = "Validate image files and store them as <id>.<format>")]
struct Cli {
    /// Output format for results
    #[arg(long, value_enum, default_value = "text", global = true)]
    output: Output,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate an image and store it
    Save(SaveArgs),
    /// List accepted format tokens
    Formats,
}

#[derive(clap::Args, Debug)]
struct SaveArgs {
    /// Image file to upload
    file: PathBuf,

    /// Identifier used as the file stem (default: random UUID)
    #[arg(long)]
    id: Option<String>,

    /// Claimed format token (default: lowercased extension of FILE)
    #[arg(long)]
    format: Option<String>,

    /// Destination directory (default: UPLOAD_DIR)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Size limit in bytes, 0 = unlimited (default: MAX_FILE_SIZE_*)
    #[arg(long, value_name = "BYTES")]
    max_size: Option<u64>,

    /// Validate without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Output {
    Text,
    Json,
}

#[derive(Serialize)]
struct SavedReport<'a> {
    path: String,
    identifier: &'a str,
    format: &'a str,
    dry_run: bool,
}

#[derive(Serialize)]
struct ErrorReport {
    code: &'static str,
    status: u16,
    message: String,
    detail: String,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = UploadConfig::from_env().context("Invalid configuration")?;
    telemetry::init_tracing(config.log_format);

    let registry = Arc::new(
        FormatRegistry::from_tokens(&config.allowed_formats)
            .context("Invalid ALLOWED_FORMATS")?,
    );

    match cli.command {
        Command::Formats => {
            print_formats(&registry, cli.output)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Save(args) => save(&config, registry, args, cli.output),
    }
}

fn save(
    config: &UploadConfig,
    registry: Arc<FormatRegistry>,
    args: SaveArgs,
    output: Output,
) -> Result<ExitCode> {
    let format = match args.format {
        Some(format) => format,
        None => {
            let name = args
                .file
                .file_name()
                .and_then(|n| n.to_str())
                .with_context(|| format!("Invalid file name: {}", args.file.display()))?;
            extension_of(name).to_lowercase()
        }
    };
    let identifier = args.id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let directory = args.dir.unwrap_or_else(|| config.upload_dir.clone());
    let size_limit = args.max_size.unwrap_or(config.max_file_size_bytes);

    let storage: Arc<dyn Storage> = if args.dry_run {
        Arc::new(DiscardStorage::new())
    } else {
        create_storage(config).context("Failed to initialize storage")?
    };

    let source = File::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    tracing::debug!(
        file = %args.file.display(),
        backend = %storage.backend_type(),
        "Saving image"
    );

    let uploader = ImageUploader::with_registry(storage, registry);
    match uploader.save_file(source, &directory, &identifier, &format, size_limit) {
        Ok(path) => {
            let report = SavedReport {
                path: path.display().to_string(),
                identifier: &identifier,
                format: &format,
                dry_run: args.dry_run,
            };
            match output {
                Output::Text => println!("{}", report.path),
                Output::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            print_error(&e, output, config.is_production())?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_formats(registry: &FormatRegistry, output: Output) -> Result<()> {
    let tokens = registry.tokens();
    match output {
        Output::Text => {
            for token in tokens {
                println!("{}", token);
            }
        }
        Output::Json => println!("{}", serde_json::to_string_pretty(&tokens)?),
    }
    Ok(())
}

fn print_error(err: &UploadError, output: Output, hide_sensitive: bool) -> Result<()> {
    let detail = if hide_sensitive && err.is_sensitive() {
        String::new()
    } else {
        err.to_string()
    };
    let report = ErrorReport {
        code: err.error_code(),
        status: err.http_status_code(),
        message: err.client_message(),
        detail,
    };

    match output {
        Output::Text => {
            eprintln!("error[{}]: {}", report.code, report.message);
            if !report.detail.is_empty() {
                eprintln!("  {}", report.detail);
            }
            if let Some(action) = err.suggested_action() {
                eprintln!("  hint: {}", action);
            }
        }
        Output::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
