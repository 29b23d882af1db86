//! Command-line interface for sectorsplit.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{default_period_label, validate_period_label};
use crate::error::Result;
use crate::ingest::{ingest, preview};
use crate::registry::{Registry, SignerDirectory};
use crate::schema::TargetSchema;
use crate::sheet::CellValue;
use crate::workbook::write_outputs;

/// Sectorsplit - Split merged sector report sheets into per-school workbooks.
#[derive(Parser)]
#[command(name = "sectorsplit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split a merged report into per-school files plus a combined workbook.
    Split {
        /// Path to the uploaded .xlsx report
        input: PathBuf,

        /// Target schema YAML file
        #[arg(short, long)]
        schema: PathBuf,

        /// School registry YAML file
        #[arg(short, long)]
        registry: PathBuf,

        /// Signer directory YAML file
        #[arg(long)]
        signers: Option<PathBuf>,

        /// Reporting period in YYYY-MM format (default: current month)
        #[arg(short, long)]
        period: Option<String>,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the detected header and data rows without splitting.
    Preview {
        /// Path to the uploaded .xlsx report
        input: PathBuf,

        /// Target schema YAML file
        #[arg(short, long)]
        schema: PathBuf,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Split {
            input,
            schema,
            registry,
            signers,
            period,
            output,
        } => split_command(
            &input,
            &schema,
            &registry,
            signers.as_deref(),
            period.as_deref(),
            output.as_deref(),
        ),
        Commands::Preview { input, schema } => preview_command(&input, &schema),
    }
}

/// Execute the split command.
fn split_command(
    input: &Path,
    schema_path: &Path,
    registry_path: &Path,
    signers_path: Option<&Path>,
    period: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    // Use the current month if no period provided
    let period_label = period
        .map(String::from)
        .unwrap_or_else(default_period_label);

    // Validate the period before reading anything
    validate_period_label(&period_label)?;

    let schema = TargetSchema::from_yaml(&fs::read_to_string(schema_path)?)?;
    let registry = Registry::from_yaml(&fs::read_to_string(registry_path)?)?;
    let signers = match signers_path {
        Some(path) => SignerDirectory::from_yaml(&fs::read_to_string(path)?)?,
        None => SignerDirectory::default(),
    };

    println!(
        "{} {} for period {}",
        style("Splitting").bold(),
        style(input.display()).cyan(),
        style(&period_label).green()
    );
    println!();

    // Create progress spinner
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );

    pb.set_message("Reading workbook...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let bytes = fs::read(input)?;
    let outcome = match ingest(&bytes, &schema, &registry, &signers, &period_label) {
        Ok(outcome) => outcome,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    println!("  Schools: {}", style(outcome.units.len()).green());
    for unit in &outcome.units {
        println!("    {}", unit.unit_name);
    }

    pb.set_message("Writing workbooks...");

    let out_dir = output.unwrap_or(Path::new("."));
    let run = match write_outputs(&outcome, out_dir) {
        Ok(run) => run,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    println!();
    println!(
        "{} {}",
        style("Saved to:").green().bold(),
        run.run_dir.display()
    );

    Ok(())
}

/// Execute the preview command.
fn preview_command(input: &Path, schema_path: &Path) -> Result<()> {
    let schema = TargetSchema::from_yaml(&fs::read_to_string(schema_path)?)?;
    let bytes = fs::read(input)?;
    let sheet_preview = preview(&bytes, &schema)?;

    println!(
        "{} row {} (school column: {})",
        style("Header:").bold(),
        sheet_preview.header_row_index + 1,
        style(&sheet_preview.headers[sheet_preview.unit_column]).cyan()
    );
    println!("  {}", sheet_preview.headers.join(" | "));
    println!();
    println!(
        "{} {} rows ({} selected by default)",
        style("Data:").bold(),
        sheet_preview.rows.len(),
        sheet_preview.selected.len()
    );
    for (index, row) in sheet_preview.rows.iter().enumerate() {
        let marker = if sheet_preview.selected.contains(&index) {
            "*"
        } else {
            " "
        };
        let cells: Vec<String> = row.iter().map(CellValue::to_display).collect();
        println!("{marker} {:>4}  {}", index + 1, cells.join(" | "));
    }

    Ok(())
}
