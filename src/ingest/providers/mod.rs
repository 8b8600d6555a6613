// src/ingest/providers/mod.rs
pub mod finnhub;
pub mod fixture;

pub use finnhub::FinnhubClient;
pub use fixture::StaticNewsProvider;
