pub mod competition;
pub mod portfolio;
pub mod quote;

pub use competition::*;
pub use portfolio::*;
pub use quote::*;
