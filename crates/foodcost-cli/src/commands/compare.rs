//! Compare command - price the same products across two invoices.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use rust_decimal::Decimal;
use tracing::info;

use foodcost_core::{
    compare_vendors_filtered, ComparisonReport, Distributor, FoodcostConfig, InvoiceExtractor,
    InvoiceRecord, RawDocument, RecordExtractor, VendorItems,
};

/// Arguments for the compare command.
#[derive(Args)]
pub struct CompareArgs {
    /// First vendor's invoice (text file or saved JSON record)
    #[arg(required = true)]
    input_a: PathBuf,

    /// Second vendor's invoice (text file or saved JSON record)
    #[arg(required = true)]
    input_b: PathBuf,

    /// Label for the first vendor (default: distributor tag)
    #[arg(long)]
    label_a: Option<String>,

    /// Label for the second vendor (default: distributor tag)
    #[arg(long)]
    label_b: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: super::process::OutputFormat,

    /// Drop matches with absolute savings below this amount
    #[arg(long)]
    min_savings: Option<Decimal>,
}

pub async fn run(args: CompareArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    // Load configuration
    let config = if let Some(path) = config_path {
        FoodcostConfig::from_file(Path::new(path))?
    } else {
        FoodcostConfig::default()
    };

    let extractor = InvoiceExtractor::from_config(&config);

    let vendor_a = load_vendor(&args.input_a, args.label_a.as_deref(), &extractor)?;
    let vendor_b = load_vendor(&args.input_b, args.label_b.as_deref(), &extractor)?;

    info!(
        "Comparing {} items from {} against {} items from {}",
        vendor_a.items.len(),
        vendor_a.label,
        vendor_b.items.len(),
        vendor_b.label
    );

    let min_savings = args.min_savings.unwrap_or(config.comparison.min_savings);
    let report = compare_vendors_filtered(&vendor_a, &vendor_b, min_savings);

    let output = match args.format {
        super::process::OutputFormat::Json => serde_json::to_string(&report)?,
        super::process::OutputFormat::Csv => format_csv(&report)?,
        super::process::OutputFormat::Text => format_text(&report),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Report written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Load one vendor's items from a saved JSON record or raw invoice text.
fn load_vendor(
    path: &Path,
    label: Option<&str>,
    extractor: &InvoiceExtractor,
) -> anyhow::Result<VendorItems> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let text = fs::read_to_string(path)?;

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let record: InvoiceRecord = if extension.eq_ignore_ascii_case("json") {
        serde_json::from_str(&text)?
    } else {
        let mut document = RawDocument::from_text(text);
        if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
            document = document.with_source_id(name);
        }
        extractor.extract(&document)
    };

    let label = match label {
        Some(l) => l.to_string(),
        None => default_label(path, &record),
    };

    Ok(VendorItems::from_record(label, &record))
}

/// Distributor tag when identified, file name otherwise.
fn default_label(path: &Path, record: &InvoiceRecord) -> String {
    match record.fields.distributor {
        Distributor::Unknown => path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string(),
        d => d.tag().to_string(),
    }
}

fn format_csv(report: &ComparisonReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "product_name",
        "price_a",
        "price_b",
        "savings",
        "savings_percent",
        "preferred_source",
        "category",
    ])?;

    for m in &report.matches {
        wtr.write_record([
            m.product_name.as_str(),
            &m.price_a.round_dp(4).to_string(),
            &m.price_b.round_dp(4).to_string(),
            &m.savings.round_dp(4).to_string(),
            &m.savings_percent.round_dp(2).to_string(),
            m.preferred_source.as_str(),
            &m.category.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(report: &ComparisonReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Comparing {} vs {}\n",
        report.source_a, report.source_b
    ));
    output.push_str(&format!(
        "Matched {} products ({} only in {}, {} only in {})\n",
        report.matched_count,
        report.only_in_a.len(),
        report.source_a,
        report.only_in_b.len(),
        report.source_b
    ));
    output.push_str("\n");

    if report.matches.is_empty() {
        output.push_str("No matched products.\n");
    } else {
        for m in &report.matches {
            output.push_str(&format!(
                "  {:<36} {:>10} vs {:>10}  save {:>9} ({:>6}%)  {} [{}]\n",
                m.product_name,
                format!("${}", m.price_a.round_dp(4)),
                format!("${}", m.price_b.round_dp(4)),
                format!("${}", m.savings.round_dp(4)),
                m.savings_percent.round_dp(1),
                m.preferred_source,
                m.category
            ));
        }
    }

    output.push_str("\n");
    output.push_str("Totals:\n");
    output.push_str(&format!(
        "  Per-pound savings: ${}\n",
        report.total_per_pound_savings.round_dp(4)
    ));
    output.push_str(&format!(
        "  Per-case savings:  ${}\n",
        report.total_per_case_savings.round_dp(2)
    ));

    if !report.only_in_a.is_empty() {
        output.push_str(&format!("\nOnly in {}:\n", report.source_a));
        for name in &report.only_in_a {
            output.push_str(&format!("  - {}\n", name));
        }
    }
    if !report.only_in_b.is_empty() {
        output.push_str(&format!("\nOnly in {}:\n", report.source_b));
        for name in &report.only_in_b {
            output.push_str(&format!("  - {}\n", name));
        }
    }

    output
}
