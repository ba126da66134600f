//! Order payload assembly
//!
//! The ordering API takes the whole order as one JSON object on every call
//! (validate, price, place) and answers with an updated copy of it. [`Order`]
//! keeps that object as an untyped map so fields the API adds on pricing
//! (amounts, business date, wait estimate) survive round trips unchanged.

use std::fmt;

use serde_json::{json, Map, Value};

use crate::address::{Address, ServiceMethod};
use crate::country::Country;
use crate::customer::Customer;
use crate::error::Error;
use crate::menu::Menu;
use crate::payment::Payment;
use crate::store::Store;

/// Keys that must be present and non-empty before the order is sent
const REQUIRED_KEYS: [&str; 3] = ["Products", "StoreID", "Address"];

/// Status code the API uses to report a failed call
pub const STATUS_FAILURE: i64 = -1;

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub store_id: String,
    pub country: Country,
    pub customer: Customer,
    pub data: Map<String, Value>,
}

/// Fresh order payload delivering to `address`
pub fn initial_order_data(address: &Address, country: Country) -> Map<String, Value> {
    let data = json!({
        "Address": {
            "Street": address.street,
            "City": address.city,
            "Region": address.region,
            "PostalCode": address.zip,
            "Type": "House",
        },
        "Coupons": [],
        "CustomerID": "",
        "Extension": "",
        "OrderChannel": "OLO",
        "OrderID": "",
        "NoCombine": true,
        "OrderMethod": "Web",
        "OrderTaker": null,
        "Payments": [],
        "Products": [],
        "Market": "",
        "Currency": "",
        "ServiceMethod": ServiceMethod::Delivery.as_str(),
        "Tags": {},
        "Version": "1.0",
        "SourceOrganizationURI": country.order_domain(),
        "LanguageCode": "en",
        "Partners": {},
        "NewUser": true,
        "metaData": {},
        "Amounts": {},
        "BusinessDate": "",
        "EstimatedWaitMinutes": "",
        "PriceOrderTime": "",
        "AmountsBreakdown": {},
    });

    match data {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl Order {
    pub fn new(store_id: &str, customer: Customer, country: Country) -> Self {
        let data = initial_order_data(&customer.address, country);
        Self {
            store_id: store_id.to_string(),
            country,
            customer,
            data,
        }
    }

    /// Start an order for `customer` at `store`
    pub fn begin_customer_order(customer: Customer, store: &Store) -> Self {
        Order::new(&store.id, customer, store.country)
    }

    pub fn products(&self) -> &[Value] {
        self.list("Products")
    }

    pub fn coupons(&self) -> &[Value] {
        self.list("Coupons")
    }

    pub fn payments(&self) -> &[Value] {
        self.list("Payments")
    }

    fn list(&self, key: &str) -> &[Value] {
        self.data
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn list_mut(&mut self, key: &str) -> &mut Vec<Value> {
        let entry = self
            .data
            .entry(key)
            .or_insert_with(|| Value::Array(Vec::new()));
        if !entry.is_array() {
            *entry = Value::Array(Vec::new());
        }
        match entry {
            Value::Array(items) => items,
            _ => unreachable!("{key} was just set to an array"),
        }
    }

    /// Add `qty` of the menu variant `code`, returning the product entry
    pub fn add_item(&mut self, menu: &Menu, code: &str, qty: u32) -> Result<Value, Error> {
        let variant = menu
            .variant(code)
            .ok_or_else(|| Error::UnknownCode(code.to_string()))?;

        let mut item = variant.as_map().clone();
        item.insert("ID".to_string(), json!(1));
        item.insert("isNew".to_string(), json!(true));
        item.insert("Qty".to_string(), json!(qty));
        item.insert("AutoRemove".to_string(), json!(false));

        let item = Value::Object(item);
        self.list_mut("Products").push(item.clone());
        Ok(item)
    }

    /// Remove the first product with `code`
    pub fn remove_item(&mut self, code: &str) -> Result<Value, Error> {
        remove_by_code(self.list_mut("Products"), code)
    }

    /// Add a menu coupon, returning the coupon entry
    pub fn add_coupon(&mut self, menu: &Menu, code: &str, qty: u32) -> Result<Value, Error> {
        if !menu.is_coupon(code) {
            return Err(Error::UnknownCode(code.to_string()));
        }

        let coupon = json!({
            "Code": code,
            "Qty": qty,
            "ID": 1,
            "IsNew": true,
        });
        self.list_mut("Coupons").push(coupon.clone());
        Ok(coupon)
    }

    /// Remove the first coupon with `code`
    pub fn remove_coupon(&mut self, code: &str) -> Result<Value, Error> {
        remove_by_code(self.list_mut("Coupons"), code)
    }

    pub fn set_service_method(&mut self, method: ServiceMethod) {
        self.data
            .insert("ServiceMethod".to_string(), json!(method.as_str()));
    }

    pub fn set_language(&mut self, lang: &str) {
        self.data.insert("LanguageCode".to_string(), json!(lang));
    }

    /// Stamp store and customer details and build the request body
    ///
    /// Fails when the order has no products, no store or no address.
    pub fn prepare(&mut self) -> Result<Value, Error> {
        self.data.insert("StoreID".to_string(), json!(self.store_id));
        self.data
            .insert("Email".to_string(), json!(self.customer.email));
        self.data
            .insert("FirstName".to_string(), json!(self.customer.first_name));
        self.data
            .insert("LastName".to_string(), json!(self.customer.last_name));
        self.data
            .insert("Phone".to_string(), json!(self.customer.phone));

        for key in REQUIRED_KEYS {
            if !self.data.get(key).is_some_and(is_truthy) {
                return Err(Error::MissingOrderField(key.to_string()));
            }
        }

        Ok(json!({ "Order": self.data }))
    }

    /// Fold the API's copy of the order back into the payload
    ///
    /// Empty lists in the response never overwrite local values.
    pub fn merge_response(&mut self, response: &Value) -> Result<(), Error> {
        let order = response
            .get("Order")
            .and_then(Value::as_object)
            .ok_or_else(|| Error::Shape("response has no \"Order\" object".to_string()))?;

        for (key, value) in order {
            if matches!(value, Value::Array(items) if items.is_empty()) {
                continue;
            }
            self.data.insert(key.clone(), value.clone());
        }

        Ok(())
    }

    /// Customer total from the last pricing call, 0 before pricing
    pub fn customer_amount(&self) -> Value {
        self.data
            .get("Amounts")
            .and_then(|amounts| amounts.get("Customer"))
            .cloned()
            .unwrap_or_else(|| json!(0))
    }

    /// Replace the order's payments with a single `payment`
    pub fn apply_payment(&mut self, payment: &Payment) -> Result<(), Error> {
        let entry = payment.to_json(self.customer_amount())?;
        self.data
            .insert("Payments".to_string(), Value::Array(vec![entry]));
        Ok(())
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.products().len();
        let items = if count == 0 {
            "no".to_string()
        } else {
            count.to_string()
        };
        write!(
            f,
            "An order for {} with {} items in it",
            self.customer.first_name, items
        )
    }
}

fn remove_by_code(items: &mut Vec<Value>, code: &str) -> Result<Value, Error> {
    let position = items
        .iter()
        .position(|item| item.get("Code").and_then(Value::as_str) == Some(code))
        .ok_or_else(|| Error::NotInOrder(code.to_string()))?;
    Ok(items.remove(position))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// True unless the response reports `Status: -1`
pub fn status_ok(response: &Value) -> bool {
    response.get("Status").and_then(Value::as_i64) != Some(STATUS_FAILURE)
}

/// Error out when a pricing response reports failure
pub fn check_price(response: &Value) -> Result<(), Error> {
    if status_ok(response) {
        Ok(())
    } else {
        Err(Error::PriceFailed(response.to_string()))
    }
}
