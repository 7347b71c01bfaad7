pub mod aggregator;
pub mod api;
pub mod changelog_parser;
pub mod client;
pub mod config;
pub mod error;
pub mod extractor;
pub mod field_catalog;
pub mod models;
pub mod pipeline;
pub mod report;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{Auth, JiraClient, JiraConfig, Transport};
pub use error::{Error, Result};
pub use models::*;

pub use aggregator::{RestCallCounter, SubTaskAggregator, is_bug};
pub use api::JiraApi;
pub use changelog_parser::ChangelogParser;
pub use config::ReportConfig;
pub use extractor::{DateFailurePolicy, FieldExtractor, extract_field};
pub use field_catalog::FieldCatalog;
pub use pipeline::{PipelineConfig, PipelineStats, ReportPipeline};
pub use report::{report_line, write_report};
