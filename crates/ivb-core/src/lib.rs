//! ivb-core
//!
//! Business logic for the investment budget tracker: catalog maintenance,
//! ledger validation, import reconciliation, monthly aggregation and display
//! formatting. Depends on ivb-domain. No CLI, no terminal I/O; persistence is
//! reached only through the [`storage::KeyValueStore`] contract.

pub mod aggregator;
pub mod app;
pub mod catalog;
mod coerce;
pub mod error;
pub mod format;
pub mod ledger;
pub mod reconciler;
pub mod storage;

pub use aggregator::compute_month;
pub use app::BudgetTracker;
pub use catalog::CatalogService;
pub use error::{CoreError, ValidationError};
pub use format::{format_money, format_rate, MoneyFormatter};
pub use ledger::TransactionService;
pub use reconciler::{ImportReport, StateReconciler};
pub use storage::{KeyValueStore, MemoryStore, PersistenceGateway};
