//! Structure Schema Converter CLI
//!
//! Converts a JSON Structure schema into an Iceberg schema, a zero-row
//! Parquet file, or an XML Schema.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use structure_schemas::{convert, ConvertRequest, ConverterConfig, IcebergFormat, Target};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "structure-convert")]
#[command(about = "Convert JSON Structure schemas to Iceberg, Parquet and XSD")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit an Apache Iceberg schema
    Iceberg {
        #[command(flatten)]
        common: CommonArgs,

        /// Output encoding (defaults to the configured format)
        #[arg(long, value_enum)]
        format: Option<IcebergFormat>,
    },

    /// Emit a zero-row Apache Parquet file carrying the schema
    Parquet {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Emit an XML Schema
    Xsd {
        #[command(flatten)]
        common: CommonArgs,

        /// Target namespace URI
        #[arg(long)]
        target_namespace: Option<String>,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Structure schema to convert
    input: PathBuf,

    /// Output file
    #[arg(short, long)]
    out: PathBuf,

    /// Record type to use as the root when the document has no object root
    #[arg(short, long)]
    record_type: Option<String>,

    /// Additional schema documents or directories for cross-document references
    #[arg(short, long)]
    include: Vec<PathBuf>,

    /// Append the CloudEvents envelope columns to the root record
    #[arg(long)]
    emit_cloudevents_columns: bool,

    /// Configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.command {
        Commands::Iceberg { common, .. } | Commands::Parquet { common } | Commands::Xsd { common, .. } => {
            ConverterConfig::load_from(common.config.as_deref()).context("loading configuration")?
        }
    };

    let (common, target) = match cli.command {
        Commands::Iceberg { common, format } => {
            let format = format.unwrap_or(config.iceberg.format);
            (common, Target::Iceberg { format })
        }
        Commands::Parquet { common } => (common, Target::Parquet),
        Commands::Xsd { common, target_namespace } => {
            let target_namespace = target_namespace.or_else(|| config.xsd.target_namespace.clone());
            (common, Target::Xsd { target_namespace })
        }
    };

    let mut options = config.translate_options();
    options.envelope_columns |= common.emit_cloudevents_columns;

    println!("📦 Structure Convert");
    println!("  Input:  {}", common.input.display());
    println!("  Target: {}", target.name());
    println!();

    let request = ConvertRequest {
        input: common.input.clone(),
        includes: common.include,
        output: common.out,
        record_type: common.record_type,
        target,
        options,
    };

    let report = convert(&request)
        .with_context(|| format!("converting {}", common.input.display()))?;

    println!("📊 Conversion Summary:");
    println!("  Record:    {}", report.record);
    println!("  Fields:    {}", report.fields);
    println!("  Field IDs: {}", report.field_ids);
    println!("  Output:    {}", report.output.path.display());
    println!("  Size:      {} bytes", report.output.bytes);
    println!("  SHA-256:   {}", report.output.checksum);

    let warnings: Vec<_> = report.diagnostics.warnings().collect();
    if !warnings.is_empty() {
        println!();
        println!("⚠️  {} warning(s):", warnings.len());
        for warning in warnings {
            println!("  {}", warning);
        }
    }

    println!();
    println!("✅ Wrote {}", report.output.path.display());
    Ok(())
}
