pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{CreateOrderRequest, Order, OrderStatus, PaymentStatus, PaymentSummary};
pub use repositories::{InMemoryOrderRepository, MySqlOrderRepository, OrderFilter, OrderRepository};
pub use services::{OrderNumberGenerator, OrderService};
