// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod article;
pub mod config;
pub mod cycle;
pub mod ingest;
pub mod market;
pub mod matcher;
pub mod metrics;
pub mod mood;
pub mod pipeline;
pub mod sectors;
pub mod sentiment;
pub mod suggest;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::article::{Article, DropReason, DropStats, RawArticle};
pub use crate::config::{ServiceConfig, UniverseConfig};
pub use crate::cycle::CycleCoordinator;
pub use crate::mood::MarketMood;
pub use crate::pipeline::{run_cycle, PipelineOptions, Snapshot};
pub use crate::sectors::{SectorDefinition, SectorImpact};
pub use crate::sentiment::{classify, Classification, LexiconScorer, ScoredArticle, TextScorer};
pub use crate::suggest::{Action, CompanyDefinition, CompanySuggestion};
