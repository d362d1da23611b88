//! Status command - update one stored record's workflow status.

use std::path::PathBuf;

use clap::Args;
use console::style;

use fapiao_core::models::InvoiceStatus;
use fapiao_core::store::{JsonStore, RecordSink};

use super::{load_config, store_path};

/// Arguments for the status command.
#[derive(Args)]
pub struct StatusArgs {
    /// Record id
    #[arg(required = true)]
    id: String,

    /// New status (pending or approved)
    #[arg(required = true)]
    status: InvoiceStatusArg,

    /// Record store file
    #[arg(short, long)]
    store: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum InvoiceStatusArg {
    Pending,
    Approved,
}

impl From<InvoiceStatusArg> for InvoiceStatus {
    fn from(arg: InvoiceStatusArg) -> Self {
        match arg {
            InvoiceStatusArg::Pending => InvoiceStatus::Pending,
            InvoiceStatusArg::Approved => InvoiceStatus::Approved,
        }
    }
}

pub async fn run(args: StatusArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = JsonStore::open(store_path(&config, args.store.as_ref()))?;

    let record = store.update_status(&args.id, args.status.into()).await?;

    println!(
        "{} {} is now {}",
        style("✓").green(),
        record.invoice.invoice_number,
        record.status
    );
    Ok(())
}
