use crate::api::Api;
use crate::config::PizzaConfig;
use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use pizza_core::menu::{parse_conditions, render_menu, transform_menu, transform_search, SearchHit};

#[derive(Debug, clap::Parser)]
#[command(name = "menu")]
#[command(about = "Show and search a store's menu")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Print the coupon, preconfigured and regular menus
    #[clap(name = "show")]
    Show(ShowOptions),

    /// Search orderable variants by field
    #[clap(name = "search")]
    Search(SearchOptions),
}

#[derive(Debug, clap::Args, Clone)]
pub struct ShowOptions {
    #[arg(value_name = "STORE_ID", env = "PIZZA_STORE")]
    pub store_id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct SearchOptions {
    #[arg(value_name = "STORE_ID", env = "PIZZA_STORE")]
    pub store_id: String,

    /// Condition as FIELD=TEXT (e.g. SizeCode=14, Name=Pepperoni, Toppings=P); repeatable
    #[arg(short = 'w', long = "where", value_name = "FIELD=TEXT")]
    pub conditions: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = PizzaConfig::load(&global)?;
    let api = Api::from_config(&config)?;

    match app.command {
        Commands::Show(options) => show(&api, &config, options).await,
        Commands::Search(options) => search(&api, &config, options).await,
    }
}

async fn show(api: &Api, config: &PizzaConfig, options: ShowOptions) -> Result<()> {
    let menu = api.store_menu(&options.store_id, &config.lang).await?;

    if menu.is_empty() {
        eprintln!("Store {} returned an empty menu", options.store_id);
        return Ok(());
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&transform_menu(&menu))?);
    } else {
        print!("{}", render_menu(&menu));
    }

    Ok(())
}

async fn search(api: &Api, config: &PizzaConfig, options: SearchOptions) -> Result<()> {
    let conditions = parse_conditions(&options.conditions)?;
    let menu = api.store_menu(&options.store_id, &config.lang).await?;
    let hits = transform_search(&menu.search(&conditions));

    if options.json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else {
        print!("{}", format_hits_text(&hits));
    }

    Ok(())
}

fn format_hits_text(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return f!("{}\n", "No menu items match.".yellow());
    }

    let width = hits.iter().map(|hit| hit.code.len()).max().unwrap_or(0) + 2;
    let mut result = String::new();
    for hit in hits {
        result.push_str(&f!(
            "{:<width$}{} {}\n",
            hit.code,
            hit.name,
            f!("${}", hit.price).bright_yellow()
        ));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn hit(code: &str, name: &str, price: &str) -> SearchHit {
        SearchHit {
            code: code.to_string(),
            name: name.to_string(),
            price: price.to_string(),
            product_code: String::new(),
            size_code: String::new(),
            toppings: BTreeMap::new(),
        }
    }

    #[test]
    fn test_format_hits_text_aligns_codes() {
        colored::control::set_override(false);

        let formatted = format_hits_text(&[
            hit("14SCREEN", "Large Hand Tossed", "13.99"),
            hit("20BCOKE", "Coke", "1.99"),
        ]);

        assert_eq!(
            formatted,
            "14SCREEN  Large Hand Tossed $13.99\n20BCOKE   Coke $1.99\n"
        );
    }

    #[test]
    fn test_format_hits_text_empty() {
        colored::control::set_override(false);

        assert_eq!(format_hits_text(&[]), "No menu items match.\n");
    }
}
