//! Parsing for the order tracker's SOAP response
//!
//! Tracking by phone answers with a SOAP envelope:
//! `Envelope > Body > GetTrackerDataResponse > OrderStatuses > OrderStatus*`.
//! Each `OrderStatus` is flattened into an ordered map of child element name
//! to its text.

use serde_json::{Map, Value};

use crate::error::Error;

/// One tracked order, child element name → text
pub type OrderStatus = Map<String, Value>;

/// Extract every `OrderStatus` from a tracker response body
pub fn parse_tracker_xml(text: &str) -> Result<Vec<OrderStatus>, Error> {
    let doc = roxmltree::Document::parse(text).map_err(|e| Error::Tracker(e.to_string()))?;

    let response = doc
        .descendants()
        .find(|node| node.is_element() && node.tag_name().name() == "GetTrackerDataResponse")
        .ok_or_else(|| Error::Tracker("missing GetTrackerDataResponse".to_string()))?;

    let statuses = response
        .children()
        .find(|node| node.is_element() && node.tag_name().name() == "OrderStatuses")
        .ok_or_else(|| Error::Tracker("missing OrderStatuses".to_string()))?;

    Ok(statuses
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "OrderStatus")
        .map(|status| {
            status
                .children()
                .filter(|field| field.is_element())
                .map(|field| {
                    let text = field.text().unwrap_or_default().trim().to_string();
                    (field.tag_name().name().to_string(), Value::String(text))
                })
                .collect()
        })
        .collect())
}
