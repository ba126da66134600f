use crate::api::Api;
use crate::config::PizzaConfig;
use crate::prelude::{println, *};
use colored::Colorize;
use pizza_core::tracking::OrderStatus;
use serde_json::Value;

#[derive(Debug, clap::Parser)]
#[command(name = "track")]
#[command(about = "Track orders by phone number or order key")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Track every recent order for a phone number
    #[clap(name = "phone")]
    Phone(PhoneOptions),

    /// Track one order by store and order key
    #[clap(name = "order")]
    Order(OrderKeyOptions),
}

#[derive(Debug, clap::Args, Clone)]
pub struct PhoneOptions {
    #[arg(value_name = "PHONE")]
    pub phone: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct OrderKeyOptions {
    #[arg(value_name = "STORE_ID")]
    pub store_id: String,

    #[arg(value_name = "ORDER_KEY")]
    pub order_key: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = PizzaConfig::load(&global)?;
    let api = Api::from_config(&config)?;

    match app.command {
        Commands::Phone(options) => {
            let statuses = api.track_by_phone(&options.phone).await?;
            if options.json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else {
                print!("{}", format_statuses_text(&statuses));
            }
            Ok(())
        }
        Commands::Order(options) => {
            let data = api
                .track_by_order(&options.store_id, &options.order_key)
                .await?;
            if options.json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                print!("{}", format_statuses_text(&statuses_from_json(data)));
            }
            Ok(())
        }
    }
}

/// Status objects from a JSON tracker response, which is either one object or a list
fn statuses_from_json(data: Value) -> Vec<OrderStatus> {
    match data {
        Value::Object(status) => vec![status],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(status) => Some(status),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn format_statuses_text(statuses: &[OrderStatus]) -> String {
    if statuses.is_empty() {
        return f!("{}\n", "No matching orders found.".yellow());
    }

    let mut result = String::new();
    for (idx, status) in statuses.iter().enumerate() {
        result.push_str(&f!("\n{}\n", f!("Order {}", idx + 1).bright_cyan().bold()));

        let mut table = crate::prelude::new_table();
        for (key, value) in status {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if !text.is_empty() {
                table.add_row(prettytable::row![key, text]);
            }
        }
        result.push_str(&table.to_string());
    }
    result
}
