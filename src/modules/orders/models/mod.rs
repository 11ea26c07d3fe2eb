pub mod ach_details;
pub mod order;
pub mod order_item;
pub mod payment_summary;

pub use ach_details::{AchAccountType, AchDetails};
pub use order::{CreateOrderRequest, Order, OrderStatus, PaymentStatus, DEFAULT_PAYMENT_METHOD};
pub use order_item::OrderItem;
pub use payment_summary::PaymentSummary;
