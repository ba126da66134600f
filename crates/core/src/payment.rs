//! Card type detection and the payment entries attached to an order

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Error;

/// Card networks recognized by the ordering API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardType {
    Visa,
    Mastercard,
    Amex,
    Diners,
    Discover,
    Jcb,
    Enroute,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Visa => "VISA",
            CardType::Mastercard => "MASTERCARD",
            CardType::Amex => "AMEX",
            CardType::Diners => "DINERS",
            CardType::Discover => "DISCOVER",
            CardType::Jcb => "JCB",
            CardType::Enroute => "ENROUTE",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Checked in order, first match wins.
static CARD_PATTERNS: LazyLock<Vec<(CardType, Regex)>> = LazyLock::new(|| {
    [
        (CardType::Visa, r"^4[0-9]{12}(?:[0-9]{3})?$"),
        (CardType::Mastercard, r"^5[1-5][0-9]{14}$"),
        (CardType::Amex, r"^3[47][0-9]{13}$"),
        (CardType::Diners, r"^3(?:0[0-5]|[68][0-9])[0-9]{11}$"),
        (CardType::Discover, r"^6(?:011|5[0-9]{2})[0-9]{12}$"),
        (CardType::Jcb, r"^(?:2131|1800|35\d{3})\d{11}$"),
        (CardType::Enroute, r"^(?:2014|2149)\d{11}$"),
    ]
    .into_iter()
    .map(|(card_type, pattern)| (card_type, Regex::new(pattern).unwrap()))
    .collect()
});

static CVV_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").unwrap());
static ZIP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}(?:-[0-9]{4})?$").unwrap());

/// Detect the card network from the card number
pub fn find_card_type(number: &str) -> Option<CardType> {
    CARD_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(number))
        .map(|(card_type, _)| *card_type)
}

/// A credit card used to pay for an order
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "CardRecord")]
pub struct CreditCard {
    pub number: String,
    pub expiration: String,
    pub cvv: String,
    pub zip: String,
    pub card_type: Option<CardType>,
}

#[derive(Debug, Deserialize)]
struct CardRecord {
    number: String,
    expiration: String,
    cvv: String,
    zip: String,
}

impl From<CardRecord> for CreditCard {
    fn from(record: CardRecord) -> Self {
        CreditCard::new(&record.number, &record.expiration, &record.cvv, &record.zip)
    }
}

impl CreditCard {
    pub fn new(number: &str, expiration: &str, cvv: &str, zip: &str) -> Self {
        let number = number.trim().to_string();
        let card_type = find_card_type(&number);

        Self {
            number,
            expiration: expiration.trim().to_string(),
            cvv: cvv.trim().to_string(),
            zip: zip.trim().to_string(),
            card_type,
        }
    }

    /// True when every field looks usable
    pub fn validate(&self) -> bool {
        !self.number.is_empty()
            && self.card_type.is_some()
            && !self.expiration.is_empty()
            && CVV_PATTERN.is_match(&self.cvv)
            && ZIP_PATTERN.is_match(&self.zip)
    }

    pub fn last_four(&self) -> String {
        let digits: Vec<char> = self.number.chars().collect();
        digits[digits.len().saturating_sub(4)..].iter().collect()
    }
}

impl fmt::Display for CreditCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credit Card with last four #{}", self.last_four())
    }
}

/// Payment method attached to an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payment {
    Cash,
    CreditCard(CreditCard),
}

impl Payment {
    /// Payment entry in the ordering API's schema
    ///
    /// `amount` is the customer total reported by the last pricing call.
    pub fn to_json(&self, amount: Value) -> Result<Value, Error> {
        match self {
            Payment::Cash => Ok(json!({ "Type": "Cash" })),
            Payment::CreditCard(card) => {
                let card_type = card.card_type.ok_or_else(|| {
                    Error::InvalidCard(format!("unrecognized card number ending in {}", card.last_four()))
                })?;
                let number: u64 = card
                    .number
                    .parse()
                    .map_err(|_| Error::InvalidCard("card number is not numeric".to_string()))?;
                let security_code: u32 = card
                    .cvv
                    .parse()
                    .map_err(|_| Error::InvalidCard("security code is not numeric".to_string()))?;
                // ZIP+4 does not fit the integer the API expects for plain ZIPs.
                let postal_code = match card.zip.parse::<u64>() {
                    Ok(zip) => json!(zip),
                    Err(_) => json!(card.zip),
                };

                Ok(json!({
                    "Type": "CreditCard",
                    "Expiration": card.expiration,
                    "Amount": amount,
                    "CardType": card_type.as_str(),
                    "Number": number,
                    "SecurityCode": security_code,
                    "PostalCode": postal_code,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_card_type() {
        assert_eq!(find_card_type("4111111111111111"), Some(CardType::Visa));
        assert_eq!(find_card_type("4222222222222"), Some(CardType::Visa));
        assert_eq!(find_card_type("5500000000000004"), Some(CardType::Mastercard));
        assert_eq!(find_card_type("340000000000009"), Some(CardType::Amex));
        assert_eq!(find_card_type("30000000000004"), Some(CardType::Diners));
        assert_eq!(find_card_type("6011000000000004"), Some(CardType::Discover));
        assert_eq!(find_card_type("3530111333300000"), Some(CardType::Jcb));
        assert_eq!(find_card_type("201400000000009"), Some(CardType::Enroute));
        assert_eq!(find_card_type("1234"), None);
        assert_eq!(find_card_type(""), None);
    }

    #[test]
    fn test_credit_card_validate() {
        let card = CreditCard::new(" 4111111111111111 ", "0128", "123", "20408");
        assert_eq!(card.card_type, Some(CardType::Visa));
        assert!(card.validate());

        let zip_plus_four = CreditCard::new("4111111111111111", "0128", "1234", "20408-0001");
        assert!(zip_plus_four.validate());
    }

    #[test]
    fn test_credit_card_validate_rejects_bad_fields() {
        assert!(!CreditCard::new("1234", "0128", "123", "20408").validate());
        assert!(!CreditCard::new("4111111111111111", "", "123", "20408").validate());
        assert!(!CreditCard::new("4111111111111111", "0128", "12", "20408").validate());
        assert!(!CreditCard::new("4111111111111111", "0128", "123", "2040").validate());
    }

    #[test]
    fn test_credit_card_display() {
        let card = CreditCard::new("4111111111111111", "0128", "123", "20408");

        assert_eq!(card.to_string(), "Credit Card with last four #1111");
    }

    #[test]
    fn test_credit_card_deserialize_detects_type() {
        let card: CreditCard = toml::from_str(
            r#"
number = "5500000000000004"
expiration = "0128"
cvv = "123"
zip = "20408"
"#,
        )
        .unwrap();

        assert_eq!(card.card_type, Some(CardType::Mastercard));
    }

    #[test]
    fn test_cash_payment_json() {
        assert_eq!(Payment::Cash.to_json(json!(0)).unwrap(), json!({ "Type": "Cash" }));
    }

    #[test]
    fn test_card_payment_json() {
        let card = CreditCard::new("4111111111111111", "0128", "123", "20408");

        let payment = Payment::CreditCard(card).to_json(json!(21.5)).unwrap();

        assert_eq!(
            payment,
            json!({
                "Type": "CreditCard",
                "Expiration": "0128",
                "Amount": 21.5,
                "CardType": "VISA",
                "Number": 4111111111111111u64,
                "SecurityCode": 123,
                "PostalCode": 20408,
            })
        );
    }

    #[test]
    fn test_card_payment_zip_plus_four_stays_text() {
        let card = CreditCard::new("4111111111111111", "0128", "123", "20408-0001");

        let payment = Payment::CreditCard(card).to_json(json!(0)).unwrap();

        assert_eq!(payment["PostalCode"], json!("20408-0001"));
    }

    #[test]
    fn test_card_payment_unknown_type() {
        let card = CreditCard::new("9999", "0128", "123", "20408");

        let result = Payment::CreditCard(card).to_json(json!(0));

        assert!(matches!(result, Err(Error::InvalidCard(_))));
    }
}
