//! 🎫 ytx -- YouTrack tickets in, Danswer documents out.
//!
//! Two ways out:
//! - **API mode**: every ticket becomes an ingestion document POSTed to Danswer.
//! - **File mode**: every ticket becomes `{issueKey}.json` next to a
//!   `.danswer_metadata.json` manifest, and the lot gets zipped for the file connector.
//!
//! The CLI builds an [`app_config::AppConfig`] and a [`MigrationJob`] and hands
//! both to [`run`]. Nothing in here reads globals.

use std::path::PathBuf;

use anyhow::{Context, Result};

pub mod app_config;
pub(crate) mod backends;
pub mod common;
pub mod fields;
pub(crate) mod progress;
pub(crate) mod supervisors;
pub mod text;
pub mod transforms;

use crate::app_config::AppConfig;
use crate::supervisors::Supervisor;

/// 🎯 Where the tickets are going. Each variant carries exactly what it needs,
/// so "api mode without a connector id" can't be built in the first place.
#[derive(Debug, Clone)]
pub enum Mode {
    Api {
        danswer_url: String,
        danswer_key: String,
        cc_pair_id: i64,
    },
    File {
        output_path: PathBuf,
    },
}

/// 📋 One migration run: which YouTrack, which dates, which way out.
#[derive(Debug, Clone)]
pub struct MigrationJob {
    /// 📡 As typed by the operator. Its host feeds the API client; the string itself feeds the links.
    pub youtrack_url: String,
    pub youtrack_token: String,
    /// 📅 Substituted verbatim into `queries.indexing_issues`.
    pub start_date: String,
    pub end_date: String,
    pub mode: Mode,
}

/// 🚀 Liveness, fetch, map, deliver, summarize. `Err` means the run as a whole failed.
pub async fn run(app_config: AppConfig, job: MigrationJob) -> Result<()> {
    Supervisor::new(app_config, job)
        .run()
        .await
        .context("💀 The migration did not finish")
}
