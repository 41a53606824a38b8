//! Process command - extract purchasing data from a single invoice text file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use rust_decimal::Decimal;
use tracing::{debug, info};

use foodcost_core::{
    FoodcostConfig, InvoiceExtractor, InvoiceRecord, RawDocument, RecordExtractor,
};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input text file (OCR output or a vendor email body)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// OCR confidence of the input text (0-100)
    #[arg(long)]
    ocr_confidence: Option<f32>,

    /// Print extraction warnings to stderr
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV line items
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = if let Some(path) = config_path {
        FoodcostConfig::from_file(std::path::Path::new(path))?
    } else {
        FoodcostConfig::default()
    };

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let text = fs::read_to_string(&args.input)?;

    let mut document = RawDocument::from_text(text);
    if let Some(name) = args.input.file_name().and_then(|s| s.to_str()) {
        document = document.with_source_id(name);
    }
    if let Some(confidence) = args.ocr_confidence {
        document = document.with_confidence(confidence);
    }

    let extractor = InvoiceExtractor::from_config(&config);
    let record = extractor.extract(&document);

    if args.show_warnings && !record.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &record.warnings {
            eprintln!("  - {}", warning);
        }
    }

    // Format output
    let output = format_record(&record, args.format)?;

    // Write output
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_record(record: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    // Write header
    wtr.write_record([
        "item_code",
        "description",
        "pack_size",
        "quantity",
        "unit_price",
        "total_price",
    ])?;

    // One row per line item
    for item in &record.items {
        wtr.write_record([
            item.item_code.as_str(),
            item.description.as_str(),
            item.pack_size.as_str(),
            &item.quantity.to_string(),
            &item.unit_price.to_string(),
            &item.total_price.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Distributor: {}\n", record.fields.distributor));
    if let Some(number) = &record.fields.invoice_number {
        output.push_str(&format!("Invoice: {}\n", number));
    }
    if let Some(number) = &record.fields.order_number {
        output.push_str(&format!("Order: {}\n", number));
    }
    if let Some(date) = record.fields.invoice_date {
        output.push_str(&format!("Invoice date: {}\n", date));
    }
    if let Some(date) = record.fields.delivery_date {
        output.push_str(&format!("Delivery date: {}\n", date));
    }
    output.push_str("\n");

    if !record.items.is_empty() {
        output.push_str("Items:\n");
        for item in &record.items {
            let per_pound = match item.price_per_pound {
                Some(ppp) => format!("  ${}/lb", ppp.round_dp(4)),
                None => String::new(),
            };
            output.push_str(&format!(
                "  {:<10} {:<34} {:>10} {:>6} {:>10}{}\n",
                item.item_code,
                item.description,
                item.pack_size,
                item.quantity,
                item.unit_price,
                per_pound
            ));
        }
        output.push_str("\n");
    }

    output.push_str("Summary:\n");
    output.push_str(&format!(
        "  Subtotal: {}\n",
        display_amount(record.fields.subtotal)
    ));
    output.push_str(&format!("  Tax:      {}\n", display_amount(record.fields.tax)));
    output.push_str(&format!(
        "  Total:    {}\n",
        display_amount(record.fields.total)
    ));

    if !record.warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in &record.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    output
}

fn display_amount(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("${}", v),
        None => "-".to_string(),
    }
}
