// ai
//! 📡 Danswer Ingestion Transform -- one ticket, one document, N+1 sections 🚀
//!
//! 🎬 COLD OPEN -- INT. DANSWER INGESTION ENDPOINT -- WAITING
//!
//! The endpoint wants a document. It wants an id so it can tell an update from
//! an insert. It wants sections, because its chunker likes clean borders. It
//! wants a title, some tags, and a timestamp. It does not want HTML.
//!
//! ## Knowledge Graph 🧠
//! - Implements: `TicketTransform` (Ticket → `IngestionPayload`)
//! - Section 0: the description (stripped, URL-encoded, `"No description"` if empty)
//! - Sections 1..: comments in ticket order, silently dropped when they normalize to nothing
//! - Document id = YouTrack's internal `id`, so re-runs update instead of duplicate
//! - `doc_updated_at` = now, naive-"Z" (see `text` for the confession)

use tracing::trace;

use super::{MappingError, TicketTransform, naive_z};
use crate::common::{DocumentMetadata, IngestionDocument, IngestionPayload, Section, Ticket};
use crate::fields::{
    comment_link, custom_field, issue_link, issue_type_from_project, linked_issue_keys,
    project_name,
};
use crate::text::{encode_embedded_urls, normalize, now_naive_z, strip_markup};

/// 🏷️ Danswer's DocumentSource for the generic ingestion API.
pub const INGESTION_SOURCE: &str = "ingestion_api";

/// 🕳️ What the description section says when the ticket said nothing.
pub const NO_DESCRIPTION: &str = "No description";

/// 📡 DanswerIngestion -- knows the YouTrack host (for links) and the connector it feeds.
#[derive(Debug, Clone)]
pub(crate) struct DanswerIngestion {
    youtrack_host: String,
    cc_pair_id: i64,
}

impl DanswerIngestion {
    pub(crate) fn new(youtrack_host: impl Into<String>, cc_pair_id: i64) -> Self {
        Self {
            youtrack_host: youtrack_host.into(),
            cc_pair_id,
        }
    }
}

impl TicketTransform for DanswerIngestion {
    type Output = IngestionPayload;

    fn transform_ticket(&self, ticket: Ticket) -> Result<IngestionPayload, MappingError> {
        let the_key = ticket.id_readable.as_str();
        let the_host = self.youtrack_host.as_str();

        // -- 📄 the description ALWAYS gets a section. empty or not. it's the law.
        let the_description = strip_markup(ticket.description.as_deref())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());
        let the_description_text =
            encode_embedded_urls(Some(the_description.as_str())).unwrap_or(the_description);

        let the_issue_type = issue_type_from_project(project_name(&ticket)?);

        let the_metadata = DocumentMetadata {
            issue_type: the_issue_type.to_string(),
            issue_key: the_key.to_string(),
            organization: custom_field(&ticket, "Organization"),
            recipients: custom_field(&ticket, "Active recipients"),
            created: naive_z(ticket.created)?,
            links: linked_issue_keys(&ticket)
                .iter()
                .map(|linked_key| issue_link(the_host, linked_key))
                .collect(),
            state: custom_field(&ticket, "State"),
        };

        let mut the_sections = Vec::with_capacity(1 + ticket.comments.len());
        the_sections.push(Section {
            text: the_description_text,
            link: Some(issue_link(the_host, the_key)),
        });

        for the_comment in &ticket.comments {
            // -- 💬 a comment that normalizes to nothing doesn't get a section. not even an empty one.
            let Some(the_text) =
                normalize(the_comment.text.as_deref()).filter(|text| !text.is_empty())
            else {
                trace!(
                    "🗑️ comment {} on {} normalized to nothing, no section for it",
                    the_comment.id, the_key
                );
                continue;
            };
            the_sections.push(Section {
                text: the_text,
                link: Some(comment_link(the_host, the_key, &the_comment.id)),
            });
        }

        Ok(IngestionPayload {
            cc_pair_id: self.cc_pair_id,
            document: IngestionDocument {
                semantic_identifier: format!("{} - {}", the_key, ticket.summary),
                id: ticket.id,
                sections: the_sections,
                source: INGESTION_SOURCE.to_string(),
                doc_updated_at: now_naive_z(),
                metadata: the_metadata,
            },
        })
    }
}
