//! ivb-domain
//!
//! Pure domain models (budget categories, transactions, application state,
//! monthly summaries). No I/O, no CLI, no storage. Only data types and enums.

pub mod category;
pub mod common;
pub mod month;
pub mod state;
pub mod summary;
pub mod transaction;

pub use category::*;
pub use common::*;
pub use month::*;
pub use state::*;
pub use summary::*;
pub use transaction::*;
