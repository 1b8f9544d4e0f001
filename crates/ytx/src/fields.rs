//! 🔎 Fields -- digging typed values out of a ticket that was never very typed to begin with.
//!
//! Two policies live here on purpose and must stay two:
//! - [`custom_field`] never fails. Missing? Null? Wrong name? `"Unknown"`.
//! - [`project_name`] fails loudly when the ticket has no project at all.
//!
//! Callers rely on the second one skipping the ticket. Folding it into the
//! first would quietly turn "skip" into "Unknown" for every project-less ticket.

use serde_json::Value;

use crate::common::Ticket;
use crate::transforms::MappingError;

/// 🏷️ The sentinel. For when YouTrack shrugs.
pub const UNKNOWN: &str = "Unknown";

/// 🔧 Look up a custom field by exact (case-sensitive) name. First match wins.
///
/// - object value → its `name`, or `"Unknown"` if that's missing/empty
/// - null value → `"Unknown"`
/// - anything else (string, number, list) → verbatim
/// - no such field → `"Unknown"`
pub fn custom_field(ticket: &Ticket, name: &str) -> Value {
    let Some(the_field) = ticket
        .custom_fields
        .iter()
        .find(|field| field.name.as_deref() == Some(name))
    else {
        return Value::from(UNKNOWN);
    };

    match &the_field.value {
        Value::Object(the_object) => match the_object.get("name") {
            Some(Value::String(the_name)) if !the_name.is_empty() => Value::from(the_name.as_str()),
            _ => Value::from(UNKNOWN),
        },
        Value::Null => Value::from(UNKNOWN),
        honestly_anything_else => honestly_anything_else.clone(),
    }
}

/// 🔗 Every `links[].issues[].idReadable`, in order, duplicates and all.
/// Null entries and entries without a key are skipped without comment.
pub fn linked_issue_keys(ticket: &Ticket) -> Vec<String> {
    ticket
        .links
        .iter()
        .flat_map(|link| link.issues.iter())
        .flatten()
        .filter_map(|linked| linked.id_readable.clone())
        .collect()
}

/// 📁 `ticket.project.name`. No project → [`MappingError::MissingProject`].
///
/// A project without a name is allowed and comes back as `None`.
pub fn project_name(ticket: &Ticket) -> Result<Option<&str>, MappingError> {
    let the_project = ticket
        .project
        .as_ref()
        .ok_or(MappingError::MissingProject)?;
    Ok(the_project.name.as_deref())
}

/// 🗂️ Project name → issue type. Two entries. That's the whole table.
pub fn issue_type_from_project(project_name: Option<&str>) -> &'static str {
    match project_name {
        Some("Support") => "Support Ticket",
        Some("Incidents") => "Incident",
        _ => UNKNOWN,
    }
}

pub fn issue_link(host: &str, issue_key: &str) -> String {
    format!("{host}/issue/{issue_key}")
}

pub fn comment_link(host: &str, issue_key: &str, comment_id: &str) -> String {
    format!("{host}/issue/{issue_key}#comment={comment_id}")
}
