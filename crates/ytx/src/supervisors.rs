//! 🎬 *[camera pans across a dimly lit support queue]*
//! 🎬 *[dramatic orchestral music swells]*
//! 🎬 "In a world where tickets pile up endlessly..."
//! 🎬 "One supervisor dared to move them all."
//! 🎬 *[record scratch]* 🦆
//!
//! 📦 The Supervisor -- part middle manager, part helicopter parent. It checks
//! that everyone showed up (liveness), gets the list (pagination), and walks
//! the tickets one at a time through a transform and into a sink.
//!
//! ```text
//!  YouTrack ──pages──▶ Vec<Value> ──▶ for each ticket:
//!                                      transform ──Err──▶ log + skip
//!                                         │Ok
//!                                         ▼
//!                                       sink.send ──Err──▶ log + carry on
//!                                         │Ok
//!                                         ▼
//!                                      log "(i/n)"
//!  ...then sink.close() and a summary table.
//! ```
//!
//! ⚠️ Strictly sequential. One page, then the next. One ticket, start to finish,
//! then the next. No tasks are spawned. If you want parallelism, bring a reason.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::{error, info};

use crate::app_config::AppConfig;
use crate::backends::danswer::DanswerSink;
use crate::backends::{DanswerClient, FileSink, Sink, YouTrackClient, collect_all};
use crate::progress::{ProgressMetrics, Tally};
use crate::transforms::{DanswerFileRecord, DanswerIngestion, TicketTransform, ticket_key_hint};
use crate::{MigrationJob, Mode};

/// 📦 The Supervisor: owns the config and the job, borrows everything else.
pub(crate) struct Supervisor {
    app_config: AppConfig,
    job: MigrationJob,
}

impl Supervisor {
    pub(crate) fn new(app_config: AppConfig, job: MigrationJob) -> Self {
        Self { app_config, job }
    }

    /// 🚀 The whole run: liveness, fetch, migrate, summarize.
    ///
    /// Liveness failures and pagination failures are fatal. Per-ticket failures are not.
    pub(crate) async fn run(&self) -> Result<()> {
        let youtrack = YouTrackClient::new(
            &self.job.youtrack_url,
            &self.job.youtrack_token,
            &self.app_config.youtrack,
        )?;
        if !youtrack.is_active().await {
            bail!(
                "💀 YouTrack API has not been loaded correctly: {} did not answer the liveness check with a 200",
                youtrack.base_url()
            );
        }
        info!("📡 YouTrack API loaded: {}", youtrack.info());

        match &self.job.mode {
            Mode::Api {
                danswer_url,
                danswer_key,
                cc_pair_id,
            } => {
                let danswer = DanswerClient::new(danswer_url, danswer_key)?;
                if !danswer.is_active().await {
                    bail!(
                        "💀 Danswer API has not been loaded correctly: {} did not answer the liveness check with a 200",
                        danswer_url
                    );
                }
                info!("📡 Danswer API loaded: {}", danswer.info());

                let tickets = self.fetch_tickets(&youtrack).await?;
                info!("🚀 Sending {} YouTrack issues to Danswer API", tickets.len());
                let mapper = DanswerIngestion::new(self.job.youtrack_url.as_str(), *cc_pair_id);
                let mut sink = DanswerSink::new(danswer);
                let metrics = migrate(tickets, &mapper, &mut sink, |key, outcome, i, n| {
                    let the_tally = Tally::from(*outcome);
                    match the_tally {
                        Tally::Updated => info!("🔄 Item {key} updated in Connector {cc_pair_id} ({i}/{n})."),
                        _ => info!("🆕 Item {key} added to Connector {cc_pair_id} ({i}/{n})."),
                    }
                    the_tally
                })
                .await?;
                info!("✅ Completed sending {} YouTrack items to Danswer API", metrics.counts().processed);
                info!("📊 Migration summary\n{}", metrics.finish());
            }
            Mode::File { output_path } => {
                let tickets = self.fetch_tickets(&youtrack).await?;
                info!(
                    "🗂️ Converting {} YouTrack items to Danswer JSON files format",
                    tickets.len()
                );
                let mapper = DanswerFileRecord::new(
                    self.job.youtrack_url.as_str(),
                    self.app_config.danswer.metadata_primary_owners.clone(),
                );
                let mut sink =
                    FileSink::new(output_path, self.app_config.danswer.zip_folder_name.as_str())
                        .await?;
                let metrics = migrate(tickets, &mapper, &mut sink, |key, path, i, n| {
                    info!("📁 Saved {key} to {} ({i}/{n})", path.display());
                    Tally::Written
                })
                .await?;
                info!("📊 Migration summary\n{}", metrics.finish());
            }
        }
        Ok(())
    }

    /// 📚 Fill in the query template and drain every page.
    async fn fetch_tickets(&self, youtrack: &YouTrackClient) -> Result<Vec<Value>> {
        info!(
            "🔍 Querying YouTrack for issues from {} to {}",
            self.job.start_date, self.job.end_date
        );
        let the_query = self
            .app_config
            .queries
            .indexing_query(&self.job.start_date, &self.job.end_date);
        let mut source = youtrack.query_source(
            the_query,
            self.app_config.queries.fields.as_str(),
            self.app_config.youtrack.page_size,
        );
        collect_all(&mut source)
            .await
            .context("💀 Fetching tickets from YouTrack fell over mid-pagination. Nothing was migrated.")
    }
}

/// 🔄 The per-ticket loop, shared by both modes.
///
/// `on_delivered(key, receipt, i, n)` logs the success line for the mode and says
/// which bucket it goes in. Mapping errors and sink errors are logged here with
/// the ticket key and counted. The sink is always closed at the end, and a close
/// failure IS returned.
pub(crate) async fn migrate<T, K, F>(
    tickets: Vec<Value>,
    mapper: &T,
    sink: &mut K,
    mut on_delivered: F,
) -> Result<ProgressMetrics>
where
    T: TicketTransform,
    K: Sink<Payload = T::Output>,
    F: FnMut(&str, &K::Receipt, usize, usize) -> Tally,
{
    let the_total = tickets.len();
    let mut metrics = ProgressMetrics::new("YouTrack", the_total as u64);

    for (the_index, the_raw) in tickets.into_iter().enumerate() {
        let the_position = the_index + 1;
        let the_key = ticket_key_hint(&the_raw).to_string();

        let the_payload = match mapper.transform_raw(the_raw) {
            Ok(payload) => payload,
            Err(the_error) => {
                error!(
                    "💀 Error processing {} ({}/{}), skipping it: {:?}",
                    the_key,
                    the_position,
                    the_total,
                    anyhow::Error::from(the_error)
                );
                metrics.tick(Tally::Skipped);
                continue;
            }
        };

        match sink.send(the_payload).await {
            Ok(the_receipt) => {
                let the_tally = on_delivered(&the_key, &the_receipt, the_position, the_total);
                metrics.tick(the_tally);
            }
            Err(the_error) => {
                error!(
                    "💀 Error processing issue {} ({}/{}): {:?}",
                    the_key, the_position, the_total, the_error
                );
                metrics.tick(Tally::Failed);
            }
        }
    }

    sink.close()
        .await
        .context("💀 The sink would not close. Whatever it was building is unfinished.")?;
    Ok(metrics)
}
