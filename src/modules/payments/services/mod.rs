pub mod provider_trait;
pub mod simulated;

pub use provider_trait::{ChargeReceipt, ChargeRequest, PaymentHandle, PaymentProvider};
pub use simulated::SimulatedProvider;
