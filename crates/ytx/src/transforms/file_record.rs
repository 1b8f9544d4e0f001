// ai
//! 🗂️ Danswer File Record Transform -- tickets, sanded down for the file connector 📦
//!
//! Danswer's file connector takes a zip of documents plus a
//! `.danswer_metadata.json` that says who owns what and where it came from.
//! This transform produces one document and one manifest row per ticket.
//! Writing them is the file sink's job.
//!
//! Differences from the ingestion transform, all deliberate:
//! - markup is stripped but URLs are NOT percent-encoded
//! - the description may stay `null`; there is no "No description" placeholder
//! - comments keep their (naive-"Z") timestamps and a flattened author name
//!
//! ## Knowledge Graph 🧠
//! - Implements: `TicketTransform` (Ticket → `FileBundle`)
//! - Dropped on the floor: `$type`, `customFields`, `idReadable`, `id`, `project`
//!   (on the ticket) and `id`, `$type` (on each comment)
//! - Unknown ticket/comment fields ride along untouched via `extra`

use super::{MappingError, TicketTransform, naive_z};
use crate::common::{FileBundle, FileComment, FileRecord, ManifestEntry, Ticket};
use crate::fields::{
    custom_field, issue_link, issue_type_from_project, linked_issue_keys, project_name,
};
use crate::text::strip_markup;

/// 🗂️ DanswerFileRecord -- knows the YouTrack host and who to list as owners.
#[derive(Debug, Clone)]
pub(crate) struct DanswerFileRecord {
    youtrack_host: String,
    primary_owners: Vec<String>,
}

impl DanswerFileRecord {
    pub(crate) fn new(youtrack_host: impl Into<String>, primary_owners: Vec<String>) -> Self {
        Self {
            youtrack_host: youtrack_host.into(),
            primary_owners,
        }
    }
}

impl TicketTransform for DanswerFileRecord {
    type Output = FileBundle;

    fn transform_ticket(&self, ticket: Ticket) -> Result<FileBundle, MappingError> {
        let the_host = self.youtrack_host.as_str();
        let the_key = ticket.id_readable.clone();

        let mut the_comments = Vec::with_capacity(ticket.comments.len());
        for the_comment in &ticket.comments {
            let the_created = the_comment.created.ok_or_else(|| MappingError::MissingCommentField {
                comment_id: the_comment.id.clone(),
                field: "created",
            })?;
            let the_author = the_comment
                .author
                .as_ref()
                .and_then(|author| author.name.clone())
                .ok_or_else(|| MappingError::MissingCommentField {
                    comment_id: the_comment.id.clone(),
                    field: "author name",
                })?;
            the_comments.push(FileComment {
                text: strip_markup(the_comment.text.as_deref()),
                created: naive_z(the_created)?,
                author: the_author,
                extra: the_comment.extra.clone(),
            });
        }

        let the_issue_type = issue_type_from_project(project_name(&ticket)?).to_string();
        let the_link = issue_link(the_host, &the_key);
        let the_file_name = format!("{the_key}.json");

        let the_record = FileRecord {
            description: strip_markup(ticket.description.as_deref()),
            created: naive_z(ticket.created)?,
            comments: the_comments,
            organization: custom_field(&ticket, "Organization"),
            state: custom_field(&ticket, "State"),
            recipients: custom_field(&ticket, "Active recipients"),
            issue_type: the_issue_type,
            links: linked_issue_keys(&ticket)
                .iter()
                .map(|linked_key| issue_link(the_host, linked_key))
                .collect(),
            issue_key: the_key.clone(),
            summary: ticket.summary.clone(),
            extra: ticket.extra,
        };

        let the_manifest_entry = ManifestEntry {
            filename: the_file_name.clone(),
            file_display_name: format!("{} - {}", the_key, the_record.summary),
            primary_owners: self.primary_owners.clone(),
            link: the_link,
        };

        Ok(FileBundle {
            file_name: the_file_name,
            record: the_record,
            manifest_entry: the_manifest_entry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local};
    use serde_json::{Value, json};

    const HOST: &str = "https://yt.example.com";

    fn local_naive_z(epoch_millis: i64) -> String {
        DateTime::from_timestamp_millis(epoch_millis)
            .expect("in range")
            .with_timezone(&Local)
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string()
    }

    fn the_chatty_ticket() -> Value {
        json!({
            "$type": "Issue",
            "id": "3-7",
            "idReadable": "SUP-7",
            "summary": "Printer on fire",
            "description": "<p>It is <b>very</b> on fire: https://x.io/?a=1</p>",
            "created": 1700000000000i64,
            "project": {"name": "Support", "$type": "Project"},
            "customFields": [
                {"name": "Organization", "value": "ACME"},
                {"name": "State", "value": {"name": "Open"}}
            ],
            "links": [{"issues": [{"idReadable": "INC-1"}]}],
            "reporter": {"login": "kevin"},
            "comments": [{
                "$type": "IssueComment",
                "id": "4-1",
                "text": "<p>Have you tried water?</p>",
                "created": 1700000060000i64,
                "author": {"name": "Jen", "$type": "User"}
            }]
        })
    }

    #[test]
    fn the_one_where_the_bookkeeping_is_shredded_and_the_rest_is_renamed() -> anyhow::Result<()> {
        let the_bundle = DanswerFileRecord::new(HOST, vec!["owner@acme.io".to_string()])
            .transform_raw(the_chatty_ticket())?;
        let the_json = serde_json::to_value(&the_bundle.record)?;
        let the_object = the_json.as_object().expect("a record is an object");

        for the_doomed in ["$type", "customFields", "idReadable", "id", "project"] {
            assert!(!the_object.contains_key(the_doomed), "{the_doomed} should be gone");
        }
        assert_eq!(the_json["issueKey"], "SUP-7");
        assert_eq!(the_json["organization"], "ACME");
        assert_eq!(the_json["state"], "Open");
        assert_eq!(the_json["recipients"], "Unknown");
        assert_eq!(the_json["type"], "Support Ticket");
        assert_eq!(the_json["links"], json!(["https://yt.example.com/issue/INC-1"]));
        assert_eq!(the_json["reporter"]["login"], "kevin", "unknown fields ride along");
        assert_eq!(the_json["created"], local_naive_z(1700000000000));
        Ok(())
    }

    #[test]
    fn the_one_where_file_mode_strips_but_never_encodes() -> anyhow::Result<()> {
        let the_bundle =
            DanswerFileRecord::new(HOST, vec![]).transform_raw(the_chatty_ticket())?;
        assert_eq!(
            the_bundle.record.description.as_deref(),
            Some("It is very on fire: https://x.io/?a=1")
        );
        Ok(())
    }

    #[test]
    fn the_one_where_comments_get_flattened_authors_and_lose_their_ids() -> anyhow::Result<()> {
        let the_bundle =
            DanswerFileRecord::new(HOST, vec![]).transform_raw(the_chatty_ticket())?;
        let the_comment = serde_json::to_value(&the_bundle.record.comments[0])?;

        assert_eq!(the_comment["author"], "Jen");
        assert_eq!(the_comment["text"], "Have you tried water?");
        assert_eq!(the_comment["created"], local_naive_z(1700000060000));
        assert!(the_comment.get("id").is_none());
        assert!(the_comment.get("$type").is_none());
        Ok(())
    }

    #[test]
    fn the_one_where_the_manifest_row_points_home() -> anyhow::Result<()> {
        let the_bundle = DanswerFileRecord::new(HOST, vec!["owner@acme.io".to_string()])
            .transform_raw(the_chatty_ticket())?;

        assert_eq!(the_bundle.file_name, "SUP-7.json");
        assert_eq!(
            the_bundle.manifest_entry,
            ManifestEntry {
                filename: "SUP-7.json".to_string(),
                file_display_name: "SUP-7 - Printer on fire".to_string(),
                primary_owners: vec!["owner@acme.io".to_string()],
                link: "https://yt.example.com/issue/SUP-7".to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn the_one_where_an_empty_description_stays_null_in_file_mode() -> anyhow::Result<()> {
        let mut the_ticket = the_chatty_ticket();
        the_ticket["description"] = Value::Null;
        let the_bundle = DanswerFileRecord::new(HOST, vec![]).transform_raw(the_ticket)?;
        assert_eq!(the_bundle.record.description, None);
        Ok(())
    }

    #[test]
    fn the_one_where_an_authorless_comment_sinks_the_whole_ticket() {
        let mut the_ticket = the_chatty_ticket();
        the_ticket["comments"][0]["author"] = Value::Null;
        let the_result = DanswerFileRecord::new(HOST, vec![]).transform_raw(the_ticket);
        assert!(matches!(
            the_result,
            Err(MappingError::MissingCommentField { field: "author name", .. })
        ));
    }

    #[test]
    fn the_one_where_no_project_means_no_file() {
        let mut the_ticket = the_chatty_ticket();
        the_ticket["project"] = Value::Null;
        let the_result = DanswerFileRecord::new(HOST, vec![]).transform_raw(the_ticket);
        assert!(matches!(the_result, Err(MappingError::MissingProject)));
    }
}
