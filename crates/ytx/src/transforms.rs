// ai
//! 🔄 Transforms -- the Rosetta Stone of ticket migration 🎭🚀
//!
//! 🎬 COLD OPEN -- INT. OPEN-PLAN OFFICE -- THE DAY AFTER THE REORG
//!
//! "We're moving support knowledge into Danswer," the VP announced.
//! "Just export the tickets," said someone who had never exported a ticket.
//! (Narrator: the tickets had HTML in them. And custom fields. And opinions.)
//!
//! This module turns one raw YouTrack ticket into one of two things:
//!
//! ```text
//!                        ┌────────────────────────┐
//!                    ┌──▶│ DanswerIngestion       │──▶ IngestionPayload ──▶ POST /ingestion
//!  raw JSON ──▶ Ticket ─┤ └────────────────────────┘
//!                    └──▶│ DanswerFileRecord      │──▶ FileBundle ──▶ {key}.json + manifest row
//!                        └────────────────────────┘
//! ```
//!
//! Both sides apply the same business rules (issue type table, custom-field
//! sentinels, link templating, the naive-"Z" timestamps). Only the shape differs.
//!
//! ## Knowledge Graph 🧠
//! - Depends on: `common` (shapes), `fields` (extraction), `text` (normalization)
//! - Used by: `supervisors` (one call per ticket, skip on `Err`)
//! - Failure model: every failure is a [`MappingError`]. The supervisor logs it with
//!   the ticket key and moves on. Nothing in here may abort a batch.

use serde_json::Value;
use thiserror::Error;

use crate::common::Ticket;

pub(crate) mod file_record;
pub(crate) mod ingestion;

pub(crate) use file_record::DanswerFileRecord;
pub(crate) use ingestion::DanswerIngestion;

/// 💀 Why a ticket didn't make it. Every variant means "skip this one, carry on".
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("ticket JSON does not have the expected shape: {0}")]
    MalformedTicket(#[from] serde_json::Error),

    #[error("ticket has no project, so its issue type cannot be derived")]
    MissingProject,

    #[error("comment '{comment_id}' has no {field}")]
    MissingCommentField {
        comment_id: String,
        field: &'static str,
    },

    #[error("timestamp {0} is outside the representable date range")]
    TimestampOutOfRange(i64),
}

/// 📥 One ticket in, one mapped thing out, or a reason why not.
///
/// Implementors carry their own context (hosts, connector ids, owners), so the
/// trait takes `&self`. The compiler monomorphizes each call site, same as ever.
pub(crate) trait TicketTransform {
    type Output;

    fn transform_ticket(&self, ticket: Ticket) -> Result<Self::Output, MappingError>;

    /// 🔄 Parse raw JSON into a [`Ticket`] and transform it in one go.
    fn transform_raw(&self, raw: Value) -> Result<Self::Output, MappingError> {
        let the_ticket: Ticket = serde_json::from_value(raw)?;
        self.transform_ticket(the_ticket)
    }
}

/// 🏷️ Best-effort key for log lines, readable even when the ticket is malformed.
pub(crate) fn ticket_key_hint(raw: &Value) -> &str {
    raw.get("idReadable")
        .and_then(Value::as_str)
        .unwrap_or("<no idReadable>")
}

/// ⏰ Naive-"Z" timestamp or a [`MappingError::TimestampOutOfRange`].
pub(crate) fn naive_z(epoch_millis: i64) -> Result<String, MappingError> {
    crate::text::epoch_millis_to_naive_z(epoch_millis)
        .ok_or(MappingError::TimestampOutOfRange(epoch_millis))
}
