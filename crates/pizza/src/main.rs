use crate::prelude::*;
use clap::Parser;
use std::path::PathBuf;

mod api;
mod config;
mod error;
mod menu;
mod order;
mod prelude;
mod store;
mod track;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Find stores, browse menus, price, place and track pizza orders"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct Global {
    /// Country code (us, ca)
    #[clap(long, env = "PIZZA_COUNTRY", global = true)]
    country: Option<String>,

    /// Menu language
    #[clap(long, env = "PIZZA_LANG", global = true)]
    lang: Option<String>,

    /// Service method (Delivery, Carryout)
    #[clap(long, env = "PIZZA_SERVICE", global = true)]
    service: Option<String>,

    /// Override the ordering API host (e.g. http://127.0.0.1:8080)
    #[clap(long, env = "PIZZA_ORDER_HOST", global = true)]
    order_host: Option<String>,

    /// Override the order tracker host
    #[clap(long, env = "PIZZA_TRACKER_HOST", global = true)]
    tracker_host: Option<String>,

    /// Path to the configuration file
    #[clap(long, env = "PIZZA_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Whether to display additional information.
    #[clap(long, env = "PIZZA_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Find stores and read store details
    Store(crate::store::App),

    /// Show and search a store's menu
    Menu(crate::menu::App),

    /// Validate, price and place orders
    Order(crate::order::App),

    /// Track orders
    Track(crate::track::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Store(sub_app) => crate::store::run(sub_app, app.global).await,
        SubCommands::Menu(sub_app) => crate::menu::run(sub_app, app.global).await,
        SubCommands::Order(sub_app) => crate::order::run(sub_app, app.global).await,
        SubCommands::Track(sub_app) => crate::track::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
