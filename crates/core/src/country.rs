//! Country-specific endpoint tables for the ordering API
//!
//! Every endpoint lives on one of two hosts: the ordering host (store locator,
//! menus, pricing, ordering) and the tracker host. Both hosts can be
//! overridden, which is how the shell points the client at a local server.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use urlencoding::encode;

use crate::error::Error;

/// Countries served by the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    #[default]
    Us,
    Ca,
}

impl Country {
    pub fn code(&self) -> &'static str {
        match self {
            Country::Us => "us",
            Country::Ca => "ca",
        }
    }

    /// Vendor domain, also used as the order's `SourceOrganizationURI`
    pub fn order_domain(&self) -> &'static str {
        match self {
            Country::Us => "order.dominos.com",
            Country::Ca => "order.dominos.ca",
        }
    }

    fn tracker_domain(&self) -> &'static str {
        match self {
            Country::Us => "trkweb.dominos.com",
            Country::Ca => "trkweb.dominos.ca",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Country {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "us" => Ok(Country::Us),
            "ca" => Ok(Country::Ca),
            other => Err(Error::UnsupportedCountry(other.to_string())),
        }
    }
}

/// URL builder for one country
#[derive(Debug, Clone, PartialEq)]
pub struct Urls {
    pub country: Country,
    order_host: String,
    tracker_host: String,
}

impl Urls {
    pub fn new(country: Country) -> Self {
        Self {
            country,
            order_host: format!("https://{}", country.order_domain()),
            tracker_host: format!("https://{}", country.tracker_domain()),
        }
    }

    /// Replace either host, keeping the country defaults for the other one
    pub fn with_hosts(mut self, order_host: Option<String>, tracker_host: Option<String>) -> Self {
        if let Some(host) = order_host {
            self.order_host = host.trim_end_matches('/').to_string();
        }
        if let Some(host) = tracker_host {
            self.tracker_host = host.trim_end_matches('/').to_string();
        }
        self
    }

    pub fn order_host(&self) -> &str {
        &self.order_host
    }

    pub fn tracker_host(&self) -> &str {
        &self.tracker_host
    }

    pub fn find_url(&self, line1: &str, line2: &str, service: &str) -> String {
        format!(
            "{}/power/store-locator?s={}&c={}&type={}",
            self.order_host,
            encode(line1),
            encode(line2),
            encode(service)
        )
    }

    pub fn info_url(&self, store_id: &str) -> String {
        format!("{}/power/store/{}/profile", self.order_host, encode(store_id))
    }

    pub fn menu_url(&self, store_id: &str, lang: &str) -> String {
        format!(
            "{}/power/store/{}/menu?lang={}&structured=true",
            self.order_host,
            encode(store_id),
            encode(lang)
        )
    }

    pub fn place_url(&self) -> String {
        format!("{}/power/place-order", self.order_host)
    }

    pub fn price_url(&self) -> String {
        format!("{}/power/price-order", self.order_host)
    }

    pub fn validate_url(&self) -> String {
        format!("{}/power/validate-order", self.order_host)
    }

    pub fn coupon_url(&self, store_id: &str, coupon_id: &str, lang: &str) -> String {
        format!(
            "{}/power/store/{}/coupon/{}?lang={}",
            self.order_host,
            encode(store_id),
            encode(coupon_id),
            encode(lang)
        )
    }

    pub fn track_by_order_url(&self, store_id: &str, order_key: &str) -> String {
        format!(
            "{}/orderstorage/GetTrackerData?StoreID={}&OrderKey={}",
            self.tracker_host,
            encode(store_id),
            encode(order_key)
        )
    }

    pub fn track_by_phone_url(&self, phone: &str) -> String {
        format!(
            "{}/orderstorage/GetTrackerData?Phone={}",
            self.tracker_host,
            encode(phone)
        )
    }
}

impl Default for Urls {
    fn default() -> Self {
        Self::new(Country::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_from_str() {
        assert_eq!("us".parse::<Country>().unwrap(), Country::Us);
        assert_eq!(" CA ".parse::<Country>().unwrap(), Country::Ca);
        assert_eq!(
            "mx".parse::<Country>(),
            Err(Error::UnsupportedCountry("mx".to_string()))
        );
    }

    #[test]
    fn test_us_urls() {
        let urls = Urls::new(Country::Us);

        assert_eq!(
            urls.info_url("4336"),
            "https://order.dominos.com/power/store/4336/profile"
        );
        assert_eq!(
            urls.menu_url("4336", "en"),
            "https://order.dominos.com/power/store/4336/menu?lang=en&structured=true"
        );
        assert_eq!(urls.place_url(), "https://order.dominos.com/power/place-order");
        assert_eq!(urls.price_url(), "https://order.dominos.com/power/price-order");
        assert_eq!(
            urls.validate_url(),
            "https://order.dominos.com/power/validate-order"
        );
        assert_eq!(
            urls.track_by_phone_url("5551234567"),
            "https://trkweb.dominos.com/orderstorage/GetTrackerData?Phone=5551234567"
        );
    }

    #[test]
    fn test_canada_urls() {
        let urls = Urls::new(Country::Ca);

        assert_eq!(
            urls.coupon_url("10090", "9193", "fr"),
            "https://order.dominos.ca/power/store/10090/coupon/9193?lang=fr"
        );
        assert_eq!(
            urls.track_by_order_url("10090", "abc"),
            "https://trkweb.dominos.ca/orderstorage/GetTrackerData?StoreID=10090&OrderKey=abc"
        );
    }

    #[test]
    fn test_find_url_encodes_address_lines() {
        let urls = Urls::new(Country::Us);

        let url = urls.find_url("700 Pennsylvania Ave", "Washington, DC, 20408", "Delivery");

        assert_eq!(
            url,
            "https://order.dominos.com/power/store-locator?s=700%20Pennsylvania%20Ave&c=Washington%2C%20DC%2C%2020408&type=Delivery"
        );
    }

    #[test]
    fn test_with_hosts_overrides() {
        let urls = Urls::new(Country::Us).with_hosts(Some("http://127.0.0.1:1234/".to_string()), None);

        assert_eq!(urls.order_host(), "http://127.0.0.1:1234");
        assert_eq!(urls.tracker_host(), "https://trkweb.dominos.com");
        assert_eq!(urls.price_url(), "http://127.0.0.1:1234/power/price-order");
    }
}
