// src/config/mod.rs
pub mod service;
pub mod universe;

pub use service::ServiceConfig;
pub use universe::UniverseConfig;
