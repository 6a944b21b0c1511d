pub mod inventory;
pub mod validation;

pub use inventory::{alert_if_low, InventoryManager};
