use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use docsort_core::config_file::resolve_config;
use docsort_core::{Classifier, Config, Engines};
use docsort_pdf_mupdf::MupdfBackend;

mod output;

use output::ColorMode;

/// Document Sorter - Classify PDFs as bank statements or salary slips
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the tesseract binary
    #[arg(long, global = true)]
    tesseract: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a PDF is a bank statement
    Bank(ClassifyArgs),

    /// Check whether a PDF is a salary slip
    Salary(ClassifyArgs),

    /// Print the text the classifier would score
    Text {
        /// Path to the PDF
        file_path: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[derive(clap::Args, Debug)]
struct ClassifyArgs {
    /// Path to the PDF to classify
    file_path: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Override the score needed to accept the document type
    #[arg(long)]
    threshold: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docsort=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Resolve configuration: CLI flags > env vars > config files > defaults
    let (mut config, _) = resolve_config();
    if let Some(path) = cli.tesseract {
        config.tesseract_path = path;
    }
    config.create_scratch_root()?;

    match cli.command {
        Command::Bank(args) => {
            if let Some(t) = args.threshold {
                config.bank_threshold = t;
            }
            let config = Arc::new(config);
            let classifier = Classifier::bank_statement(config.clone(), engines(&config));
            classify(&classifier, &args)
        }
        Command::Salary(args) => {
            if let Some(t) = args.threshold {
                config.salary_threshold = t;
            }
            let config = Arc::new(config);
            let classifier = Classifier::salary_slip(config.clone(), engines(&config));
            classify(&classifier, &args)
        }
        Command::Text {
            file_path,
            no_color,
        } => {
            let config = Arc::new(config);
            let classifier = Classifier::bank_statement(config.clone(), engines(&config));
            print_text(&classifier, &file_path, ColorMode(!no_color))
        }
    }
}

fn engines(config: &Config) -> Engines {
    Engines::new(Arc::new(MupdfBackend::new()), config)
}

fn ensure_exists(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    Ok(())
}

fn classify(classifier: &Classifier, args: &ClassifyArgs) -> anyhow::Result<()> {
    ensure_exists(&args.file_path)?;
    let result = classifier.classify_path(&args.file_path)?;

    let mut stdout = std::io::stdout();
    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &result)?;
        writeln!(stdout)?;
        return Ok(());
    }

    let file_name = args
        .file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| args.file_path.display().to_string());
    output::print_result(
        &mut stdout,
        &file_name,
        &result,
        classifier.profile().threshold,
        ColorMode(!args.no_color),
    )?;
    Ok(())
}

fn print_text(classifier: &Classifier, path: &Path, color: ColorMode) -> anyhow::Result<()> {
    ensure_exists(path)?;
    let (text, scanned) = classifier.extract_text(path)?;
    output::print_text(&mut std::io::stdout(), &text, scanned, color)?;
    Ok(())
}
