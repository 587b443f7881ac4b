//! SeaORM entities, one module per table.

pub mod category;
pub mod hire;
pub mod payment;
pub mod provider;
pub mod service;
pub mod user;
