//! Core library for pizza
//!
//! This crate implements the **Functional Core** of the pizza ordering client,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`pizza_core`** (this crate): Pure transformation functions with zero I/O
//! - **`pizza`**: HTTP transport, configuration and the CLI (the Imperative Shell)
//!
//! Every function here takes data the shell already fetched (store-locator
//! results, menu documents, pricing responses, tracker XML) and either
//! interprets it or assembles the next request body. Nothing in this crate
//! talks to the network, so every module is tested with fixture data.
//!
//! # Module Organization
//!
//! - [`country`]: Countries and the endpoint URL table for each of them
//! - [`address`]: Street addresses and the delivery/carryout service method
//! - [`customer`]: The person an order is for
//! - [`store`]: Store-locator filtering and store summaries
//! - [`menu`]: Menu parsing, category tree, search and rendering
//! - [`order`]: Order payload assembly and response merging
//! - [`payment`]: Card type detection, card validation, payment entries
//! - [`tracking`]: Tracker SOAP response parsing
//! - [`checkout`]: TOML checkout plans
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use pizza_core::{menu::Menu, order::Order};
//!
//! let menu = Menu::from_json(&menu_response)?;
//! let mut order = Order::new("4336", customer, Country::Us);
//! order.add_item(&menu, "14SCREEN", 1)?;
//!
//! // Body for the price-order endpoint
//! let body = order.prepare()?;
//! ```

pub mod address;
pub mod checkout;
pub mod country;
pub mod customer;
pub mod error;
pub mod menu;
pub mod order;
pub mod payment;
pub mod store;
pub mod tracking;

pub use error::Error;
