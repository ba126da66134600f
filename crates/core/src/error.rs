//! Error type shared by every transformation in the core crate

/// Errors raised while assembling or interpreting vendor data
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Unsupported country: {0}")]
    UnsupportedCountry(String),

    #[error("Unsupported service method: {0}")]
    UnsupportedService(String),

    #[error("Code {0} is not on the menu")]
    UnknownCode(String),

    #[error("Product {product} listed in category {category} was not found on the menu")]
    ProductNotFound { product: String, category: String },

    #[error("Code {0} is not in the order")]
    NotInOrder(String),

    #[error("Order has invalid value for key \"{0}\"")]
    MissingOrderField(String),

    #[error("Get price failed: {0}")]
    PriceFailed(String),

    #[error("Invalid card: {0}")]
    InvalidCard(String),

    #[error("No local stores are currently open")]
    NoOpenStores,

    #[error("Unexpected response shape: {0}")]
    Shape(String),

    #[error("Tracker response error: {0}")]
    Tracker(String),

    #[error("Invalid checkout plan: {0}")]
    Plan(String),
}

pub type Result<T> = std::result::Result<T, Error>;
