mod checkout;
mod db;
mod products;

use std::path::PathBuf;

use akaun_core::{CartItem, SortKey};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "akaun-cli")]
#[command(about = "Akaun storefront command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Catalog queries
    Products {
        #[command(subcommand)]
        command: ProductCommands,
    },
    /// Price a cart and print the order message link
    Checkout {
        /// Cart line as `<product id>[:<quantity>]`; repeat for more lines
        #[arg(long = "item", value_name = "ID[:QTY]", required = true, value_parser = checkout::parse_cart_item)]
        items: Vec<CartItem>,
        /// Customer name printed in the message
        #[arg(long)]
        name: String,
        /// Customer contact number printed in the message
        #[arg(long)]
        contact: String,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Insert products from a YAML seed file
    Seed {
        /// Path to the seed file
        #[arg(long, default_value = "config/products.yaml")]
        file: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
enum ProductCommands {
    /// List products, filtered like the storefront
    List {
        /// Case-insensitive match on name or server
        #[arg(long)]
        query: Option<String>,
        /// Category or game tag; `all` disables the filter
        #[arg(long, default_value = akaun_core::ALL)]
        category: String,
        /// `ready`, `preorder`, or `all`
        #[arg(long, default_value = akaun_core::ALL)]
        stock: String,
        /// Sort by name, price, description, or date
        #[arg(long)]
        sort: Option<SortKey>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("akaun-cli ready; run with --help to list commands");
        return Ok(());
    };

    let config = akaun_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = akaun_db::PoolConfig::from_app_config(&config);
    let pool = akaun_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => db::run_db_ping(&pool).await?,
            DbCommands::Migrate => db::run_db_migrate(&pool).await?,
            DbCommands::Seed { file } => db::run_db_seed(&pool, &file).await?,
        },
        Commands::Products { command } => match command {
            ProductCommands::List {
                query,
                category,
                stock,
                sort,
            } => {
                products::run_products_list(
                    &pool,
                    query.as_deref().unwrap_or(""),
                    &category,
                    &stock,
                    sort,
                )
                .await?;
            }
        },
        Commands::Checkout {
            items,
            name,
            contact,
        } => checkout::run_checkout(&pool, &config, &items, &name, &contact).await?,
    }

    Ok(())
}
