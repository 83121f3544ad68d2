//! Business logic services.

pub mod order_service;
pub mod token_service;
