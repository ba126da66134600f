use crate::api::Api;
use crate::config::PizzaConfig;
use crate::prelude::{println, *};
use colored::Colorize;
use log::info;
use pizza_core::checkout::{parse_plan, CheckoutPlan};
use pizza_core::order::Order;
use pizza_core::payment::Payment;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, clap::Parser)]
#[command(name = "order")]
#[command(about = "Validate, price and place orders from a checkout plan")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Ask the store to validate the order
    #[clap(name = "validate")]
    Validate(OrderOptions),

    /// Price the order without placing it
    #[clap(name = "price")]
    Price(OrderOptions),

    /// Place the order (dry run unless --confirm is given)
    #[clap(name = "place")]
    Place(PlaceOptions),
}

#[derive(Debug, clap::Args, Clone)]
pub struct OrderOptions {
    /// Checkout plan (TOML)
    #[arg(value_name = "PLAN")]
    pub plan: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct PlaceOptions {
    #[clap(flatten)]
    pub order: OrderOptions,

    /// Actually place the order; without it the order is priced and paid for only
    #[arg(long)]
    pub confirm: bool,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = PizzaConfig::load(&global)?;
    let api = Api::from_config(&config)?;

    match app.command {
        Commands::Validate(options) => validate(&api, &config, options).await,
        Commands::Price(options) => price(&api, &config, options).await,
        Commands::Place(options) => place(&api, &config, options).await,
    }
}

fn load_plan(path: &Path) -> Result<CheckoutPlan> {
    let text = fs::read_to_string(path)
        .with_context(|| f!("Failed to read checkout plan {}", path.display()))?;
    Ok(parse_plan(&text)?)
}

/// Build the order described by `plan`
///
/// Without a store in the plan, the closest open store to the customer is used.
async fn build_order(api: &Api, config: &PizzaConfig, plan: &CheckoutPlan) -> Result<Order> {
    let customer = match plan.customer_in(config.country)? {
        Some(customer) => customer,
        None => config
            .customer
            .clone()
            .ok_or_eyre("No customer: add a [customer] table to the plan or the config file")?,
    };
    let service = plan.service.unwrap_or(config.service);

    let store_id = match &plan.store {
        Some(id) => id.clone(),
        None => {
            let store = api.closest_store(&customer.address, service).await?;
            info!("Using closest store #{}", store.id);
            store.id
        }
    };

    let menu = api.store_menu(&store_id, &config.lang).await?;

    let mut order = Order::new(&store_id, customer, config.country);
    order.set_service_method(service);
    order.set_language(&config.lang);
    plan.apply(&mut order, &menu)?;

    Ok(order)
}

async fn validate(api: &Api, config: &PizzaConfig, options: OrderOptions) -> Result<()> {
    let plan = load_plan(&options.plan)?;
    let mut order = build_order(api, config, &plan).await?;

    let valid = api.validate(&mut order).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&order.data)?);
    } else if valid {
        println!("{}", "Order is valid".green());
    } else {
        println!("{}", "Order was rejected by the store".red());
    }

    Ok(())
}

async fn price(api: &Api, config: &PizzaConfig, options: OrderOptions) -> Result<()> {
    let plan = load_plan(&options.plan)?;
    let mut order = build_order(api, config, &plan).await?;

    let response = api.price(&mut order).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", format_order_summary(&order));
    }

    Ok(())
}

/// Price the plan's order and attach its payment, placing it only with `confirm`
///
/// Card payments are checked before any request is made.
async fn place_order(
    api: &Api,
    config: &PizzaConfig,
    plan: &CheckoutPlan,
    confirm: bool,
) -> Result<(Order, Value)> {
    let payment = plan.payment();
    if let Payment::CreditCard(card) = &payment {
        if !card.validate() {
            return Err(eyre!("{} failed validation", card));
        }
    }

    let mut order = build_order(api, config, plan).await?;

    let response = if confirm {
        api.place(&mut order, &payment).await?
    } else {
        api.pay_with(&mut order, &payment).await?
    };

    Ok((order, response))
}

async fn place(api: &Api, config: &PizzaConfig, options: PlaceOptions) -> Result<()> {
    let plan = load_plan(&options.order.plan)?;
    let (order, response) = place_order(api, config, &plan, options.confirm).await?;

    if options.order.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    print!("{}", format_order_summary(&order));
    if !options.confirm {
        println!(
            "\n{} {}",
            "Dry run:".yellow().bold(),
            "re-run with --confirm to place this order".yellow()
        );
        return Ok(());
    }

    println!(
        "\n{} {}",
        "Order placed for".green().bold(),
        order.customer.first_name.green().bold()
    );
    if let Some(status) = response.get("Status") {
        println!("Status: {}", status);
    }

    Ok(())
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn format_order_summary(order: &Order) -> String {
    let mut result = f!("{}\n", order);

    let mut products = crate::prelude::new_table();
    products.add_row(prettytable::row!["Code", "Qty", "Name", "Price"]);
    for product in order.products() {
        products.add_row(prettytable::row![
            value_text(&product["Code"]),
            value_text(&product["Qty"]),
            value_text(&product["Name"]),
            value_text(&product["Price"])
        ]);
    }
    result.push('\n');
    result.push_str(&products.to_string());

    if let Some(amounts) = order.data.get("Amounts").and_then(Value::as_object) {
        if !amounts.is_empty() {
            let mut table = crate::prelude::new_table();
            for (key, value) in amounts {
                table.add_row(prettytable::row![key, value_text(value)]);
            }
            result.push_str(&f!("\n{}\n", "Amounts".bold()));
            result.push_str(&table.to_string());
        }
    }

    let wait = order
        .data
        .get("EstimatedWaitMinutes")
        .map(value_text)
        .unwrap_or_default();
    if !wait.is_empty() {
        result.push_str(&f!("\n{}: {} minutes\n", "Estimated wait".bold(), wait));
    }

    result
}
