//! List command - print stored invoice records.

use std::path::PathBuf;

use clap::Args;
use console::style;

use fapiao_core::store::{JsonStore, RecordSink};

use super::{load_config, store_path};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Record store file
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: ListArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = JsonStore::open(store_path(&config, args.store.as_ref()))?;
    let records = store.list_all().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{} No invoices stored", style("ℹ").blue());
        return Ok(());
    }

    for record in &records {
        let status = match record.status {
            fapiao_core::models::InvoiceStatus::Approved => style("approved").green(),
            fapiao_core::models::InvoiceStatus::Pending => style("pending").yellow(),
        };
        println!(
            "{}  {}  {}  {}  {}  {}  [{}]",
            record.id,
            record.invoice.invoice_number,
            record.invoice.invoice_type,
            record.invoice.date,
            record.invoice.amount,
            record.invoice.vendor,
            status
        );
    }
    println!();
    println!("{} {} record(s)", style("✓").green(), records.len());

    Ok(())
}
