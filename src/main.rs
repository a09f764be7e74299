use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use policy_clerk::domain::Document;
use policy_clerk::logging;
use policy_clerk::pipeline::normalize::dataset_to_csv;
use policy_clerk::pipeline::review::cell_field_name;
use policy_clerk::{AppConfig, Clerk};

#[derive(Parser)]
#[command(name = "policy_clerk")]
#[command(about = "Extracts insurance policy data from PDFs into the shared spreadsheet")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sheets uploads can target
    Sheets,
    /// Print the column schema of a sheet
    Columns {
        #[arg(long)]
        sheet: String,
    },
    /// Run the upload pipeline on local files and print the rows as CSV
    Extract {
        #[arg(long)]
        sheet: String,
        /// Files to extract from (PDFs; other files get placeholder text)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Append the extracted rows to the spreadsheet
        #[arg(long)]
        save: bool,
        /// Print the generated client email draft
        #[arg(long)]
        summary: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = logging::init_logging();
    let cli = Cli::parse();

    let config = AppConfig::load().context("loading configuration")?;

    if let Commands::Sheets = cli.command {
        for sheet in config.catalog.sheets() {
            let kind = if sheet.is_grouped() { "grouped" } else { "flat" };
            println!("{:<14} {}", sheet.name, kind);
        }
        return Ok(());
    }

    let clerk = Clerk::from_config(config).context("connecting services")?;

    match cli.command {
        Commands::Sheets => {}
        Commands::Columns { sheet } => {
            let schema = clerk.columns(&sheet).await?;
            for (i, column) in schema.columns().iter().enumerate() {
                println!("{:>3}  {}", i, column);
            }
        }
        Commands::Extract { sheet, files, save, summary } => {
            let mut documents = Vec::with_capacity(files.len());
            for path in &files {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                documents.push(Document::new(name, bytes));
            }

            info!("Extracting {} files for {}", documents.len(), sheet);
            let outcome = clerk.upload(&sheet, documents).await?;
            for message in &outcome.file_errors {
                eprintln!("⚠️  {}", message);
            }
            for warning in &outcome.warnings {
                eprintln!("⚠️  {}", warning);
            }
            if outcome.failed_calls > 0 {
                eprintln!("⚠️  {} of {} extraction calls failed", outcome.failed_calls, outcome.calls);
            }

            println!("{}", outcome.schema.columns().join(","));
            println!("{}", dataset_to_csv(&outcome.dataset)?);

            if save {
                // Same shape the review form submits
                let mut fields = std::collections::HashMap::new();
                fields.insert("row_count".to_string(), outcome.dataset.len().to_string());
                for (r, row) in outcome.dataset.rows().iter().enumerate() {
                    for (c, value) in row.values().iter().enumerate() {
                        fields.insert(cell_field_name(r, c), value.clone());
                    }
                }
                match clerk.save(&outcome.sheet.name, &fields).await {
                    Ok(saved) => println!(
                        "✅ Saved {} rows to {}{}",
                        saved.append.updated_rows,
                        saved.sheet_name,
                        if saved.append.cleared { " (old rows cleared)" } else { "" }
                    ),
                    Err(e) => {
                        error!("Save failed: {}", e);
                        return Err(e.into());
                    }
                }
            }

            if summary {
                println!("\n{}", outcome.summary);
            }
        }
    }
    Ok(())
}
