pub mod registry;
pub mod validation;

pub use registry::CustomerRegistry;
