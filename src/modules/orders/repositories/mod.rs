pub mod in_memory_order_repository;
pub mod mysql_order_repository;
pub mod order_repository;

pub use in_memory_order_repository::InMemoryOrderRepository;
pub use mysql_order_repository::MySqlOrderRepository;
pub use order_repository::{prepare_for_write, OrderFilter, OrderRepository};
