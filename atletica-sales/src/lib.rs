pub mod pricing;
pub mod processor;
pub mod reports;

pub use pricing::DiscountPolicy;
pub use processor::{SalesLimits, SalesProcessor, SalesQuery};
pub use reports::ReportService;
