pub mod money;
pub mod pii;

pub use money::{format_brl, percent_of};
pub use pii::Masked;
