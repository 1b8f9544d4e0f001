// ai
//! 📦 Common data structures -- the building blocks of ytx
//!
//! ---
//!
//! 🎬 COLD OPEN -- INT. SUPPORT DESK -- 4:55 PM ON A FRIDAY
//!
//! A ticket arrives. "Login fails," it says. It has no description worth the
//! name, a `<p>` tag wrapped around a single apology, and three custom fields,
//! one of which is null and one of which is an object pretending to be a
//! string. It belongs to a project. Probably. Nobody checked.
//!
//! This module defines the shapes that ferry that ticket from YouTrack to
//! Danswer: the raw [`Ticket`] as the tracker hands it over, and the
//! [`IngestionPayload`] / [`FileRecord`] / [`ManifestEntry`] shapes it leaves as.
//!
//! 🦆
//!
//! Unknown fields on a ticket are kept in `extra` so file mode can pass them
//! through untouched. Fields we know about but don't want are modelled
//! explicitly so dropping them is a type-level decision, not a `remove()` call.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================
//  📥 INBOUND -- what YouTrack hands us
// ============================================================

/// 🎫 One YouTrack issue, as returned by `/api/issues`.
///
/// `summary`, `id`, `idReadable` and `created` are required. A ticket missing
/// any of them fails deserialization and gets skipped by the orchestrator,
/// which is exactly what happens to it in the ticket tracker's own UI anyway.
#[derive(Debug, Clone, Deserialize)]
pub struct Ticket {
    pub id: String,
    #[serde(rename = "idReadable")]
    pub id_readable: String,
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    /// ⏱️ epoch milliseconds
    pub created: i64,
    #[serde(default)]
    pub project: Option<Project>,
    #[serde(rename = "customFields", default)]
    pub custom_fields: Vec<CustomField>,
    #[serde(default)]
    pub links: Vec<IssueLink>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// 🏷️ YouTrack's `$type` bookkeeping tag. Read so we can throw it away on purpose.
    #[serde(rename = "$type", default)]
    pub type_tag: Option<String>,
    /// 📦 everything else the field selection asked for
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub name: Option<String>,
}

/// 🔧 A custom field. The value is whatever YouTrack felt like sending:
/// a string, a number, null, a list, or an object with a `name`.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomField {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Value,
}

/// 🔗 One link group ("relates to", "duplicates", ...) and the issues on the other end.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueLink {
    #[serde(default)]
    pub issues: Vec<Option<LinkedIssue>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkedIssue {
    #[serde(rename = "idReadable", default)]
    pub id_readable: Option<String>,
}

/// 💬 A comment. Only `id` is mandatory; file mode insists on `author` and
/// `created` later, API mode never looks at them.
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub author: Option<CommentAuthor>,
    #[serde(rename = "$type", default)]
    pub type_tag: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentAuthor {
    #[serde(default)]
    pub name: Option<String>,
}

// ============================================================
//  📤 OUTBOUND (API mode) -- what Danswer's ingestion endpoint eats
// ============================================================

/// 📡 The full body POSTed to `/danswer-api/ingestion`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestionPayload {
    pub cc_pair_id: i64,
    pub document: IngestionDocument,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestionDocument {
    pub id: String,
    /// Order matters: description first, then comments as they appeared.
    pub sections: Vec<Section>,
    pub source: String,
    pub semantic_identifier: String,
    pub doc_updated_at: String,
    pub metadata: DocumentMetadata,
}

/// 📄 One span of text plus the link it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// 🏷️ The "tags" Danswer shows in its UI. Custom-field values stay as raw
/// JSON because YouTrack is allowed to send lists and numbers here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMetadata {
    #[serde(rename = "type")]
    pub issue_type: String,
    #[serde(rename = "issueKey")]
    pub issue_key: String,
    pub organization: Value,
    pub recipients: Value,
    pub created: String,
    pub links: Vec<String>,
    pub state: Value,
}

/// ✅ What the sink made of our document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// 🆕 never seen before
    Created,
    /// 🔄 same id existed, content replaced
    Updated,
}

/// 📬 Just the bit of the ingestion response we care about.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IngestionResponse {
    pub already_existed: bool,
}

impl From<IngestionResponse> for IngestOutcome {
    fn from(response: IngestionResponse) -> Self {
        if response.already_existed {
            IngestOutcome::Updated
        } else {
            IngestOutcome::Created
        }
    }
}

// ============================================================
//  📤 OUTBOUND (file mode) -- what lands on disk
// ============================================================

/// 🗂️ A ticket, sanded down for Danswer's file connector.
///
/// `$type`, `customFields`, `idReadable`, `id` and `project` are gone
/// because this struct has no field for them.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FileRecord {
    pub summary: String,
    pub description: Option<String>,
    pub created: String,
    pub comments: Vec<FileComment>,
    #[serde(rename = "issueKey")]
    pub issue_key: String,
    pub organization: Value,
    pub state: Value,
    pub recipients: Value,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub links: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FileComment {
    pub text: Option<String>,
    pub created: String,
    pub author: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 📋 One row of `.danswer_metadata.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestEntry {
    pub filename: String,
    pub file_display_name: String,
    pub primary_owners: Vec<String>,
    pub link: String,
}

/// 📦 Everything the file sink needs for one ticket: where, what, and the manifest row.
#[derive(Debug, Clone, PartialEq)]
pub struct FileBundle {
    pub file_name: String,
    pub record: FileRecord,
    pub manifest_entry: ManifestEntry,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn the_one_where_a_ticket_keeps_its_unknown_fields_in_the_attic() -> anyhow::Result<()> {
        let the_ticket: Ticket = serde_json::from_value(json!({
            "id": "3-1",
            "idReadable": "SUP-1",
            "summary": "Login fails",
            "created": 1700000000000i64,
            "$type": "Issue",
            "reporter": {"login": "kevin"}
        }))?;

        assert_eq!(the_ticket.type_tag.as_deref(), Some("Issue"));
        assert!(the_ticket.project.is_none());
        assert!(the_ticket.comments.is_empty());
        assert_eq!(the_ticket.extra["reporter"]["login"], "kevin");
        assert!(
            !the_ticket.extra.contains_key("$type"),
            "modelled fields must not leak into the flatten bucket"
        );
        Ok(())
    }

    #[test]
    fn the_one_where_a_ticket_without_a_summary_is_turned_away() {
        let the_result = serde_json::from_value::<Ticket>(json!({
            "id": "3-2",
            "idReadable": "SUP-2",
            "created": 0
        }));
        assert!(the_result.is_err());
    }

    #[test]
    fn the_one_where_sections_without_links_say_nothing_about_links() -> anyhow::Result<()> {
        let the_section = Section {
            text: "hi".to_string(),
            link: None,
        };
        assert_eq!(serde_json::to_value(&the_section)?, json!({"text": "hi"}));
        Ok(())
    }

    #[test]
    fn the_one_where_already_existed_means_updated() {
        assert_eq!(
            IngestOutcome::from(IngestionResponse { already_existed: true }),
            IngestOutcome::Updated
        );
        assert_eq!(
            IngestOutcome::from(IngestionResponse { already_existed: false }),
            IngestOutcome::Created
        );
    }
}
