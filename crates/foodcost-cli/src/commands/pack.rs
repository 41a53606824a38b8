//! Pack command - normalize a single pack-size token.

use clap::Args;
use console::style;
use rust_decimal::Decimal;

use foodcost_core::pack::parse_pack_size_with;
use foodcost_core::{CanSizeTable, FoodcostConfig};

/// Arguments for the pack command.
#[derive(Args)]
pub struct PackArgs {
    /// Pack-size token, e.g. "6/1#", "3/6LB", "6/#10", "4/1 GAL"
    #[arg(required = true)]
    token: String,

    /// Case price, to derive a per-pound price
    #[arg(short, long)]
    price: Option<Decimal>,
}

pub async fn run(args: PackArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    // Load configuration
    let config = if let Some(path) = config_path {
        FoodcostConfig::from_file(std::path::Path::new(path))?
    } else {
        FoodcostConfig::default()
    };

    let mut cans = CanSizeTable::builtin();
    for can in &config.pack.can_sizes {
        cans = cans.with_size(can.code.as_str(), can.ounces);
    }

    let pack = parse_pack_size_with(&args.token, &cans);

    println!("Token:  {}", pack.original);
    println!("Unit:   {}", pack.unit);
    if let Some(count) = pack.count {
        println!("Count:  {}", count);
    }
    if let Some(pounds) = pack.total_pounds {
        println!("Pounds: {}", pounds.round_dp(4));
    }
    if let Some(ounces) = pack.total_ounces {
        println!("Ounces: {}", ounces.round_dp(4));
    }

    if let Some(price) = args.price {
        match pack.price_per_pound(price) {
            Some(per_pound) => println!(
                "{} ${} per pound at ${} per case",
                style("✓").green(),
                per_pound.round_dp(4),
                price
            ),
            None => println!(
                "{} No weight basis for a per-pound price",
                style("ℹ").blue()
            ),
        }
    }

    Ok(())
}
