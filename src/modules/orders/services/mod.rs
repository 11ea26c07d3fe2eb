pub mod order_number;
pub mod order_service;
pub mod payment_state;

pub use order_number::{format_order_number, OrderNumberGenerator};
pub use order_service::OrderService;
pub use payment_state::{apply_payment_state, derive_payment_state, PaymentState};
