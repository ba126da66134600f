//! Checkout plans: an order described in a TOML file
//!
//! ```toml
//! store = "4336"          # optional, closest store when omitted
//! service = "Carryout"    # optional, "Delivery" by default
//!
//! [customer]
//! first_name = "Jane"
//! last_name = "Doe"
//! email = "jane@example.com"
//! phone = "5551234567"
//! address = "1 Main St, Springfield, IL, 62701"
//!
//! [[items]]
//! code = "14SCREEN"
//! qty = 2
//!
//! [[coupons]]
//! code = "9193"
//!
//! [card]                  # optional, cash when omitted
//! number = "4111111111111111"
//! expiration = "0128"
//! cvv = "123"
//! zip = "62701"
//! ```

use serde::Deserialize;

use crate::address::{Address, ServiceMethod};
use crate::country::Country;
use crate::customer::{Customer, CustomerRecord};
use crate::error::Error;
use crate::menu::Menu;
use crate::order::Order;
use crate::payment::{CreditCard, Payment};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlanLine {
    pub code: String,
    #[serde(default = "default_qty")]
    pub qty: u32,
}

fn default_qty() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckoutPlan {
    #[serde(default)]
    pub store: Option<String>,
    #[serde(default)]
    pub service: Option<ServiceMethod>,
    #[serde(default)]
    pub customer: Option<CustomerRecord>,
    #[serde(default)]
    pub items: Vec<PlanLine>,
    #[serde(default)]
    pub coupons: Vec<PlanLine>,
    #[serde(default)]
    pub card: Option<CreditCard>,
}

pub fn parse_plan(text: &str) -> Result<CheckoutPlan, Error> {
    let plan: CheckoutPlan = toml::from_str(text).map_err(|e| Error::Plan(e.to_string()))?;

    if let Some(customer) = &plan.customer {
        customer
            .address
            .parse::<Address>()
            .map_err(|e| Error::Plan(format!("customer address: {e}")))?;
    }

    Ok(plan)
}

impl CheckoutPlan {
    /// The plan's customer, with the address in `country` unless it names its own
    pub fn customer_in(&self, country: Country) -> Result<Option<Customer>, Error> {
        self.customer
            .clone()
            .map(|record| record.into_customer(country))
            .transpose()
    }

    pub fn payment(&self) -> Payment {
        match &self.card {
            Some(card) => Payment::CreditCard(card.clone()),
            None => Payment::Cash,
        }
    }

    /// Fill `order` with the plan's service method, items and coupons
    pub fn apply(&self, order: &mut Order, menu: &Menu) -> Result<(), Error> {
        if let Some(service) = self.service {
            order.set_service_method(service);
        }
        for line in &self.items {
            order.add_item(menu, &line.code, line.qty)?;
        }
        for line in &self.coupons {
            order.add_coupon(menu, &line.code, line.qty)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::country::Country;
    use crate::menu::tests::fixture_menu;
    use crate::payment::CardType;
    use serde_json::json;

    const PLAN: &str = r#"
store = "4336"
service = "Carryout"

[customer]
first_name = "Jane"
last_name = "Doe"
email = "jane@example.com"
phone = "5551234567"
address = "1 Main St, Springfield, IL, 62701"

[[items]]
code = "14SCREEN"
qty = 2

[[items]]
code = "20BCOKE"

[[coupons]]
code = "9193"

[card]
number = "4111111111111111"
expiration = "0128"
cvv = "123"
zip = "62701"
"#;

    #[test]
    fn test_parse_plan() {
        let plan = parse_plan(PLAN).unwrap();

        assert_eq!(plan.store.as_deref(), Some("4336"));
        assert_eq!(plan.service, Some(ServiceMethod::Carryout));
        assert_eq!(plan.items.len(), 2);
        assert_eq!(plan.items[1].qty, 1);
        assert_eq!(plan.customer.as_ref().unwrap().first_name, "Jane");
        assert_eq!(plan.card.as_ref().unwrap().card_type, Some(CardType::Visa));
    }

    #[test]
    fn test_parse_minimal_plan() {
        let plan = parse_plan("[[items]]\ncode = \"14SCREEN\"\n").unwrap();

        assert_eq!(plan.store, None);
        assert_eq!(plan.customer, None);
        assert_eq!(plan.payment(), Payment::Cash);
    }

    #[test]
    fn test_parse_invalid_plan() {
        assert!(matches!(parse_plan("items = 3"), Err(Error::Plan(_))));
        assert!(matches!(
            parse_plan("[customer]\naddress = \"nowhere\"\n"),
            Err(Error::Plan(_))
        ));
    }

    #[test]
    fn test_apply_plan() {
        let plan = parse_plan(PLAN).unwrap();
        let menu = fixture_menu();
        let customer = plan.customer_in(Country::Us).unwrap().unwrap();
        let mut order = Order::new("4336", customer, Country::Us);

        plan.apply(&mut order, &menu).unwrap();

        assert_eq!(order.products().len(), 2);
        assert_eq!(order.products()[0]["Qty"], json!(2));
        assert_eq!(order.coupons().len(), 1);
        assert_eq!(order.data["ServiceMethod"], json!("Carryout"));
        assert!(matches!(plan.payment(), Payment::CreditCard(_)));
    }

    #[test]
    fn test_apply_plan_unknown_item() {
        let plan = parse_plan("[[items]]\ncode = \"NOPE\"\n").unwrap();
        let menu = fixture_menu();
        let customer = Customer::new("Jane", "Doe", "", "", "1 Main St, Springfield").unwrap();
        let mut order = Order::new("4336", customer, Country::Us);

        assert_eq!(
            plan.apply(&mut order, &menu),
            Err(Error::UnknownCode("NOPE".to_string()))
        );
    }

    #[test]
    fn test_plan_customer_in_country() {
        let plan = parse_plan(
            "[customer]\nfirst_name = \"Jane\"\naddress = \"290 Bremner Blvd, Toronto, ON, M5V 3L9\"\n",
        )
        .unwrap();

        let customer = plan.customer_in(Country::Ca).unwrap().unwrap();

        assert_eq!(customer.address.country, Country::Ca);
        assert_eq!(customer.address.city, "Toronto");
    }
}
