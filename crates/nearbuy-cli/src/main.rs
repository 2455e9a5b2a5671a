mod catalog;
mod query;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use nearbuy_db::NewItem;
use nearbuy_geo::Coordinate;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nearbuy-cli")]
#[command(about = "Nearby seller search command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Register a seller with its items and index it on the grid
    RegisterSeller {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        /// Seller location as `lat,long`
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        location: Coordinate,
        #[arg(long, default_value = "")]
        image_url: String,
        /// Item as `name:category:price`; repeatable
        #[arg(long = "item", value_parser = parse_item)]
        items: Vec<NewItem>,
    },
    /// Write missing grid cell rows for sellers that have none
    IndexCells,
    /// Find sellers near a location
    Nearby {
        /// User location as `lat,long`
        #[arg(value_parser = parse_coordinate, allow_hyphen_values = true)]
        location: Coordinate,
        #[arg(long, default_value_t = nearbuy_core::DEFAULT_PAGE_LIMIT)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Case-insensitive substring of the seller or item name
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        seller_id: Option<i64>,
    },
    /// Shortest delivery route through the given sellers
    Route {
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        origin: Coordinate,
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        destination: Coordinate,
        seller_ids: Vec<i64>,
    },
}

/// Parses and range-checks a `lat,long` argument.
fn parse_coordinate(raw: &str) -> Result<Coordinate, String> {
    let coordinate: Coordinate = raw.parse().map_err(|e: nearbuy_geo::GeoError| e.to_string())?;
    coordinate.validate().map_err(|e| e.to_string())?;
    Ok(coordinate)
}

fn parse_item(raw: &str) -> Result<NewItem, String> {
    let mut parts = raw.splitn(3, ':');
    let (Some(name), Some(category), Some(price)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected name:category:price, got {raw:?}"));
    };
    let price: i64 = price
        .trim()
        .parse()
        .map_err(|e| format!("invalid price {price:?}: {e}"))?;
    if price < 0 {
        return Err(format!("price must not be negative, got {price}"));
    }
    Ok(NewItem {
        name: name.trim().to_string(),
        category: category.trim().to_string(),
        price,
        image_url: String::new(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("nearbuy-cli ready; run with --help for commands");
        return Ok(());
    };

    let config = Arc::new(nearbuy_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = nearbuy_db::PoolConfig::from_app_config(&config);
    let pool = nearbuy_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Migrate => {
            let applied = nearbuy_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::RegisterSeller {
            name,
            category,
            location,
            image_url,
            items,
        } => {
            let seller = nearbuy_db::NewSeller {
                name,
                category,
                image_url,
                location,
            };
            catalog::run_register_seller(&pool, &seller, &items).await?;
        }
        Commands::IndexCells => catalog::run_index_cells(&pool).await?,
        Commands::Nearby {
            location,
            limit,
            offset,
            name,
            category,
            seller_id,
        } => {
            let filter = nearbuy_core::SearchFilter {
                seller_id,
                name,
                category,
                limit,
                offset,
            };
            query::run_nearby(pool, &config, location, &filter).await?;
        }
        Commands::Route {
            origin,
            destination,
            seller_ids,
        } => query::run_route(pool, &config, origin, destination, &seller_ids).await?,
    }

    Ok(())
}
