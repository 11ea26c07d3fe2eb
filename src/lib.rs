//! Storefront order ledger and installment payments
//!
//! Orders, payment plans, the daily settlement and reminder jobs, and the
//! HTTP surface that exposes them.

pub mod app;
pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use app::AppServices;
pub use modules::installments;
pub use modules::notifications;
pub use modules::orders;
pub use modules::payments;
pub use modules::scheduler;
