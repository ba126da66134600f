use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::country::Country;
use crate::error::Error;

/// The person the order is for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CustomerRecord")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
}

/// Customer as written in config and checkout files, address as a single line
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CustomerRecord {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub address: String,
}

impl Customer {
    pub fn new(
        first_name: &str,
        last_name: &str,
        email: &str,
        phone: &str,
        address: &str,
    ) -> Result<Self, Error> {
        Ok(Self {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email: email.trim().to_string(),
            phone: phone.trim().to_string(),
            address: address.parse()?,
        })
    }
}

impl CustomerRecord {
    /// Build the customer, placing the address in `default_country` unless
    /// the address line names its own country
    pub fn into_customer(self, default_country: Country) -> Result<Customer, Error> {
        Ok(Customer {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: Address::parse_in(&self.address, default_country)?,
        })
    }
}

impl TryFrom<CustomerRecord> for Customer {
    type Error = Error;

    fn try_from(record: CustomerRecord) -> Result<Self, Self::Error> {
        record.into_customer(Country::default())
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {} {}\nEmail: {}\nPhone: {}\nAddress: {}",
            self.first_name, self.last_name, self.email, self.phone, self.address
        )
    }
}
