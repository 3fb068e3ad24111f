//! Registry item commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use registry_core::config::AppConfig;
use registry_core::error::AppError;
use registry_core::types::{Money, RegistryItemId};
use registry_database::Stores;
use registry_entity::registry::CreateRegistryItem;
use registry_service::RegistryService;

use crate::output::{self, OutputFormat};

/// Arguments for registry commands
#[derive(Debug, Args)]
pub struct RegistryArgs {
    /// Registry subcommand
    #[command(subcommand)]
    pub command: RegistryCommand,
}

/// Registry subcommands
#[derive(Debug, Subcommand)]
pub enum RegistryCommand {
    /// List registry items with their progress
    List,
    /// Add an item to the registry
    Seed {
        /// Item title
        #[arg(long)]
        title: String,
        /// Item description
        #[arg(long, default_value = "")]
        description: String,
        /// Target amount in major units (e.g. 250.00)
        #[arg(long)]
        price: f64,
    },
    /// List gifts recorded against one item
    Gifts {
        /// Registry item id
        id: RegistryItemId,
    },
}

/// Registry item row for table output
#[derive(Debug, Serialize, Tabled)]
struct ItemRow {
    /// Item ID
    id: String,
    /// Title
    title: String,
    /// Target
    price: String,
    /// Given so far
    given: String,
    /// Still needed
    remaining: String,
    /// Goal reached
    reached: bool,
    /// Number of gifts
    gifts: usize,
}

/// Gift row for table output
#[derive(Debug, Serialize, Tabled)]
struct GiftRow {
    /// Gift ID
    id: String,
    /// Amount
    amount: String,
    /// Comment
    comment: String,
    /// Gateway transaction
    transaction: String,
    /// Recorded at
    created_at: String,
}

/// Execute registry commands
pub async fn execute(
    args: &RegistryArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let stores = super::open_stores(config).await?;
    let result = run(args, &stores, format).await;
    stores.close().await;
    result
}

async fn run(args: &RegistryArgs, stores: &Stores, format: OutputFormat) -> Result<(), AppError> {
    let registry = RegistryService::new(stores.registry.clone());

    match &args.command {
        RegistryCommand::List => {
            let rows: Vec<ItemRow> = registry
                .snapshot()
                .await?
                .into_iter()
                .map(|view| ItemRow {
                    id: view.item.id.to_string(),
                    title: view.item.title.clone(),
                    price: view.item.total_price.to_string(),
                    given: view.item.total_given.to_string(),
                    remaining: view.item.remaining().to_string(),
                    reached: view.item.goal_reached,
                    gifts: view.comments.len(),
                })
                .collect();
            output::print_list(&rows, format);
            Ok(())
        }
        RegistryCommand::Seed {
            title,
            description,
            price,
        } => {
            let item = registry
                .seed(CreateRegistryItem {
                    title: title.clone(),
                    description: description.clone(),
                    total_price: Money::from_major(*price)?,
                })
                .await?;
            match format {
                OutputFormat::Json => output::print_json(&item),
                OutputFormat::Table => {
                    output::print_success("Registry item created.");
                    output::print_kv("id", &item.id.to_string());
                    output::print_kv("title", &item.title);
                    output::print_kv("price", &item.total_price.to_string());
                }
            }
            Ok(())
        }
        RegistryCommand::Gifts { id } => {
            registry.get(*id).await?;
            let rows: Vec<GiftRow> = stores
                .gifts
                .list_for_registry(*id)
                .await?
                .into_iter()
                .map(|gift| GiftRow {
                    id: gift.id.to_string(),
                    amount: gift.amount.to_string(),
                    comment: gift.comment,
                    transaction: gift.transaction.0.id,
                    created_at: gift.created_at.to_rfc3339(),
                })
                .collect();
            output::print_list(&rows, format);
            Ok(())
        }
    }
}
