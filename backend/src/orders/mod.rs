pub mod models;
pub mod pricing;
pub mod service;
