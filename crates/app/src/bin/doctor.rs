//! Checks a deployment: store reachability, tables and service mappings.

use anyhow::Context;
use clap::{Parser, Subcommand};

use menuiserie_app::AppContext;
use menuiserie_infra::{Config, DataStore, PostgrestStore, Query, Table};

#[derive(Parser, Debug)]
#[command(name = "menuiserie-doctor")]
#[command(about = "Diagnostics for the menuiserie data store")]
struct Args {
    #[command(subcommand)]
    check: Check,
}

#[derive(Subcommand, Debug)]
enum Check {
    /// Reach the store, read a few clients and probe every table.
    Connection,
    /// Run the catalog and project services against live data.
    Services,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env().context("loading configuration")?;
    menuiserie_observability::init(config.log_format);

    match args.check {
        Check::Connection => connection(&config).await,
        Check::Services => services(&config).await,
    }
}

async fn connection(config: &Config) -> anyhow::Result<()> {
    let store = PostgrestStore::new(config)?;

    println!("1. Connection");
    let clients = store
        .select(&Query::from(Table::Clients).limit(5))
        .await
        .context("reading clients")?;
    println!("✅ {} clients read", clients.len());
    if let Some(first) = clients.first() {
        println!(
            "   first: {} {} <{}>",
            first.get("last_name").and_then(|v| v.as_str()).unwrap_or("?"),
            first.get("first_name").and_then(|v| v.as_str()).unwrap_or(""),
            first.get("email").and_then(|v| v.as_str()).unwrap_or("?"),
        );
    }

    println!("2. Tables");
    let mut failures = 0;
    for table in Table::ALL {
        match store.select(&Query::from(table).limit(1)).await {
            Ok(_) => println!("✅ {table}"),
            Err(err) => {
                failures += 1;
                println!("❌ {table}: {err}");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} table(s) unreachable");
    }
    Ok(())
}

async fn services(config: &Config) -> anyhow::Result<()> {
    let ctx = AppContext::connect(config)?;

    println!("1. Categories");
    let categories = ctx.products.list_categories().await?;
    println!("✅ {} categories", categories.len());
    if let Some(first) = categories.first() {
        println!("   first: {} ({})", first.name, first.description);
    }

    println!("2. Products");
    let products = ctx.products.list().await?;
    println!("✅ {} products", products.len());
    for product in products.iter().take(3) {
        let ranges = product.dimension_ranges();
        println!(
            "   {} [{}] width {}..{} height {}..{}",
            product.name,
            product.product_type,
            ranges.width.min,
            ranges.width.max,
            ranges.height.min,
            ranges.height.max,
        );
    }

    println!("3. Projects with clients");
    let projects = ctx.projects.list().await?;
    println!("✅ {} projects", projects.len());
    for project in projects.iter().take(2) {
        println!(
            "   {} for {} ({} configured product(s), status {:?})",
            project.name,
            project.client.display_name(),
            project.products.len(),
            project.status,
        );
        for configured in project.products.iter().take(2) {
            println!(
                "     {} x{} {}x{} mm",
                configured.product.name,
                configured.quantity,
                configured.dimensions.width,
                configured.dimensions.height,
            );
        }
    }

    Ok(())
}
