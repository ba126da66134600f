use crate::api::Api;
use crate::config::PizzaConfig;
use crate::prelude::{println, *};
use colored::Colorize;
use pizza_core::address::{Address, ServiceMethod};
use pizza_core::store::{transform_stores, Store, StoreOutput};
use serde_json::Value;

#[derive(Debug, clap::Parser)]
#[command(name = "store")]
#[command(about = "Find stores and read store details")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List stores near an address that are open for the service method
    #[clap(name = "nearby")]
    Nearby(LocateOptions),

    /// Show the closest open store to an address
    #[clap(name = "closest")]
    Closest(LocateOptions),

    /// Show a store's profile
    #[clap(name = "info")]
    Info(InfoOptions),

    /// Show one of a store's coupons
    #[clap(name = "coupon")]
    Coupon(CouponOptions),
}

#[derive(Debug, clap::Args, Clone)]
pub struct LocateOptions {
    /// Address as "street, city, region, zip[, country]"
    #[arg(value_name = "ADDRESS")]
    pub address: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct InfoOptions {
    #[arg(value_name = "STORE_ID")]
    pub store_id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct CouponOptions {
    #[arg(value_name = "STORE_ID")]
    pub store_id: String,

    #[arg(value_name = "COUPON_ID")]
    pub coupon_id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = PizzaConfig::load(&global)?;
    let api = Api::from_config(&config)?;

    match app.command {
        Commands::Nearby(options) => nearby(&api, &config, options).await,
        Commands::Closest(options) => closest(&api, &config, options).await,
        Commands::Info(options) => info(&api, options).await,
        Commands::Coupon(options) => coupon(&api, &config, options).await,
    }
}

/// Parse an address, defaulting its country to the configured one
fn parse_address(raw: &str, config: &PizzaConfig) -> Result<Address> {
    Ok(Address::parse_in(raw, config.country)?)
}

async fn nearby(api: &Api, config: &PizzaConfig, options: LocateOptions) -> Result<()> {
    let address = parse_address(&options.address, config)?;
    let stores = api.nearby_stores(&address, config.service).await?;
    let output = transform_stores(&stores, config.service);

    if options.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", format_stores_text(&output, &address, config.service));
    }

    Ok(())
}

async fn closest(api: &Api, config: &PizzaConfig, options: LocateOptions) -> Result<()> {
    let address = parse_address(&options.address, config)?;
    let store = api.closest_store(&address, config.service).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&store.data)?);
    } else {
        println!("{}", store);
    }

    Ok(())
}

async fn info(api: &Api, options: InfoOptions) -> Result<()> {
    let details = api.store_details(&options.store_id).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&details)?);
    } else {
        let store = Store::new(details, api.urls().country);
        print!("{}", format_store_details(&store));
    }

    Ok(())
}

async fn coupon(api: &Api, config: &PizzaConfig, options: CouponOptions) -> Result<()> {
    let coupon = api
        .store_coupon(&options.store_id, &options.coupon_id, &config.lang)
        .await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&coupon)?);
    } else {
        print!("{}", format_coupon_text(&coupon));
    }

    Ok(())
}

fn format_stores_text(stores: &[StoreOutput], address: &Address, service: ServiceMethod) -> String {
    let mut result = String::new();

    result.push_str(&f!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&f!(
        "{}\n",
        f!("STORES NEAR {}", address).to_uppercase().bright_cyan().bold()
    ));
    result.push_str(&f!("{}\n", "=".repeat(80).bright_cyan()));

    if stores.is_empty() {
        result.push_str(&f!("\n{}\n", "No local stores are currently open.".yellow()));
        return result;
    }

    for (idx, store) in stores.iter().enumerate() {
        result.push_str(&f!(
            "\n{} {}\n",
            f!("[{}]", idx + 1).yellow().bold(),
            f!("Store #{}", store.id).white().bold()
        ));
        result.push_str(&f!("    {}: {}\n", "Address".green(), store.address));
        if let Some(phone) = &store.phone {
            result.push_str(&f!("    {}: {}\n", "Phone".green(), phone));
        }
        result.push_str(&f!(
            "    {}: {} | {}: {}\n",
            "Open".green(),
            if store.is_open { "Yes" } else { "No" },
            service.as_str().green(),
            store
                .minutes
                .as_ref()
                .map(|m| f!("{m} min"))
                .unwrap_or_else(|| "unknown".to_string())
        ));
        result.push_str(&f!(
            "    {}: {}\n",
            "Menu".green(),
            f!("pizza menu show {}", store.id).cyan()
        ));
    }

    result.push('\n');
    result
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn format_coupon_text(coupon: &Value) -> String {
    let code = coupon.get("Code").map(value_text).unwrap_or_default();
    let name = coupon.get("Name").map(value_text).unwrap_or_default();
    let mut result = f!("{} {}\n", f!("[{code}]").yellow().bold(), name.white().bold());

    let mut table = crate::prelude::new_table();
    let mut rows = 0;
    if let Some(fields) = coupon.as_object() {
        for (key, value) in fields {
            if key == "Code" || key == "Name" || value.is_object() || value.is_array() {
                continue;
            }
            let text = value_text(value);
            if !text.is_empty() {
                table.add_row(prettytable::row![key, text]);
                rows += 1;
            }
        }
    }

    if rows > 0 {
        result.push_str(&table.to_string());
    }

    result
}

fn format_store_details(store: &Store) -> String {
    let mut result = f!("{}\n", store);

    let mut table = crate::prelude::new_table();
    let mut rows = 0;
    for (label, key) in [
        ("Phone", "Phone"),
        ("Time zone", "TimeZoneCode"),
        ("Delivery hours", "HoursDescription"),
        ("Minimum delivery order", "MinimumDeliveryOrderAmount"),
    ] {
        if let Some(value) = store.data.get(key).filter(|v| !v.is_null()) {
            table.add_row(prettytable::row![label, value_text(value)]);
            rows += 1;
        }
    }

    if rows > 0 {
        result.push('\n');
        result.push_str(&table.to_string());
    }

    result
}
