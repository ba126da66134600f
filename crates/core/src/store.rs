use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::address::ServiceMethod;
use crate::country::Country;
use crate::error::Error;

/// A store returned by the store locator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Store {
    pub id: String,
    pub country: Country,
    pub data: Value,
}

impl Store {
    pub fn new(data: Value, country: Country) -> Self {
        let id = match data.get("StoreID") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => "-1".to_string(),
        };

        Self { id, country, data }
    }

    pub fn address_description(&self) -> &str {
        self.data
            .get("AddressDescription")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn is_open(&self) -> bool {
        self.data
            .get("IsOpen")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Store #{}\nAddress: {}\n\nOpen Now: {}",
            self.id,
            self.address_description(),
            if self.is_open() { "Yes" } else { "No" }
        )
    }
}

/// Stores from a store-locator response that are online and open for `service`
///
/// The locator's ordering (closest first) is preserved.
pub fn open_stores(response: &Value, service: ServiceMethod, country: Country) -> Vec<Store> {
    response
        .get("Stores")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|store| {
            let online = store
                .get("IsOnlineNow")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let service_open = store
                .get("ServiceIsOpen")
                .and_then(|open| open.get(service.as_str()))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            online && service_open
        })
        .map(|store| Store::new(store.clone(), country))
        .collect()
}

/// First store of a filtered locator result
pub fn closest(stores: Vec<Store>) -> Result<Store, Error> {
    stores.into_iter().next().ok_or(Error::NoOpenStores)
}

/// Summary row for store listings
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StoreOutput {
    pub id: String,
    pub address: String,
    pub phone: Option<String>,
    pub is_open: bool,
    pub minutes: Option<String>,
}

/// Summaries of `stores`, with wait times for `service`
pub fn transform_stores(stores: &[Store], service: ServiceMethod) -> Vec<StoreOutput> {
    stores
        .iter()
        .map(|store| StoreOutput {
            id: store.id.clone(),
            address: store.address_description().replace('\n', ", "),
            phone: store
                .data
                .get("Phone")
                .and_then(Value::as_str)
                .map(str::to_string),
            is_open: store.is_open(),
            minutes: store
                .data
                .get("ServiceMethodEstimatedWaitMinutes")
                .and_then(|estimates| estimates.get(service.as_str()))
                .and_then(|estimate| {
                    let min = estimate.get("Min")?;
                    let max = estimate.get("Max")?;
                    Some(format!("{min}-{max}"))
                }),
        })
        .collect()
}
