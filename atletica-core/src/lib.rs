pub mod customer;
pub mod product;
pub mod sale;
pub mod report;
pub mod repository;

pub use customer::{ContactUpdate, Customer, NewCustomer};
pub use product::{Product, ProductDraft, MAX_UNIT_PRICE_CENTS};
pub use report::{LowStockRow, MembershipReport, StockReport, StockStats};
pub use repository::{CustomerRepository, ProductRepository, SaleRepository};
pub use sale::{LineRequest, PaymentMethod, Sale, SaleFilter, SaleLine, SaleSummary};

use uuid::Uuid;

/// Every failure a shop operation can surface to its caller.
#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} already exists: {key}")]
    DuplicateKey { entity: &'static str, key: String },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("{entity} {key} is referenced by recorded sales")]
    InUse { entity: &'static str, key: String },

    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl ShopError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        ShopError::NotFound { entity, key: key.to_string() }
    }

    pub fn duplicate(entity: &'static str, key: impl ToString) -> Self {
        ShopError::DuplicateKey { entity, key: key.to_string() }
    }

    pub fn in_use(entity: &'static str, key: impl ToString) -> Self {
        ShopError::InUse { entity, key: key.to_string() }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        ShopError::InvalidValue(msg.into())
    }
}

pub type ShopResult<T> = Result<T, ShopError>;
