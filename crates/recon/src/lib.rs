//! `welltag-recon`: well-record reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables and a registry snapshot,
//! returns tagged results. No CLI or file dependencies.

pub mod annotate;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod index;
pub mod matcher;
pub mod model;
pub mod reconcile;
pub mod similarity;
pub mod table;
pub mod tokenize;

pub use config::ReconConfig;
pub use engine::{process_table, run};
pub use error::ReconError;
pub use index::{CanonicalIndex, RegistrySource};
pub use model::{InputRecord, MatchResult, ReconResult, ReconSummary};
pub use table::Table;
