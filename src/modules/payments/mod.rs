// Payment provider boundary

pub mod services;

pub use services::{
    ChargeReceipt, ChargeRequest, PaymentHandle, PaymentProvider, SimulatedProvider,
};
