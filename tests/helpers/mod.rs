// Shared fixtures for the unit and integration suites.
//
// Include with `#[path = "../helpers/mod.rs"] mod helpers;`.
#![allow(dead_code)]

pub mod database;
pub mod doubles;
pub mod harness;
pub mod order_data;

pub use database::*;
pub use doubles::*;
pub use harness::*;
pub use order_data::*;
