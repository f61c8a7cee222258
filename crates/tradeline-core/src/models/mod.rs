//! Data models for tradelines and pipeline configuration.

pub mod config;
pub mod tradeline;

pub use config::PipelineConfig;
pub use tradeline::{AccountStatus, AccountType, CreditBureau, PersistenceRecord, Tradeline};
