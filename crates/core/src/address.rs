use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::country::Country;
use crate::error::Error;

/// How the order reaches the customer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceMethod {
    #[default]
    Delivery,
    Carryout,
}

impl ServiceMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceMethod::Delivery => "Delivery",
            ServiceMethod::Carryout => "Carryout",
        }
    }
}

impl fmt::Display for ServiceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "delivery" => Ok(ServiceMethod::Delivery),
            "carryout" => Ok(ServiceMethod::Carryout),
            other => Err(Error::UnsupportedService(other.to_string())),
        }
    }
}

/// A North American street address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub region: String,
    pub zip: String,
    pub country: Country,
}

impl Address {
    pub fn new(street: &str, city: &str, region: &str, zip: &str, country: Country) -> Self {
        Self {
            street: street.trim().to_string(),
            city: city.trim().to_string(),
            region: region.trim().to_string(),
            zip: zip.trim().to_string(),
            country,
        }
    }

    /// Address in the shape the ordering API expects
    pub fn data(&self) -> Value {
        json!({
            "Street": self.street,
            "City": self.city,
            "Region": self.region,
            "PostalCode": self.zip,
        })
    }

    pub fn line1(&self) -> String {
        self.street.clone()
    }

    pub fn line2(&self) -> String {
        format!("{}, {}, {}", self.city, self.region, self.zip)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            self.street, self.city, self.region, self.zip
        )
    }
}

impl Address {
    /// Parse `street, city[, region[, zip[, country]]]`, using
    /// `default_country` when the fifth part is absent
    pub fn parse_in(s: &str, default_country: Country) -> Result<Self, Error> {
        let parts: Vec<&str> = s.split(',').collect();

        if parts.len() < 2 || parts.len() > 5 {
            return Err(Error::InvalidAddress(format!(
                "expected \"street, city[, region[, zip[, country]]]\", got {s:?}"
            )));
        }

        let country = match parts.get(4) {
            Some(code) => code.parse()?,
            None => default_country,
        };

        Ok(Address::new(
            parts[0],
            parts[1],
            parts.get(2).copied().unwrap_or(""),
            parts.get(3).copied().unwrap_or(""),
            country,
        ))
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse_in(s, Country::default())
    }
}
