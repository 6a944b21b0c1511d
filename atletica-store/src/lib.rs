pub mod app_config;
pub mod database;
pub mod customer_repo;
pub mod catalog_repo;
pub mod sale_repo;
pub mod memory;
mod error;

pub use database::DbClient;
pub use customer_repo::StoreCustomerRepository;
pub use catalog_repo::StoreProductRepository;
pub use sale_repo::StoreSaleRepository;
pub use memory::InMemoryStore;

/// Turns a user-typed fragment into an `ILIKE` pattern, escaping wildcards.
pub(crate) fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
