//! 🔧 App Configuration -- the sacred TOML-to-struct pipeline, now with tickets.
//!
//! 📡 "Config not found: We looked everywhere. Under the couch. Behind the fridge.
//! In the junk drawer. Nothing." -- every developer at 3am 🦆
//!
//! 🏗️ Powered by Figment. Env vars (`YTX_*`, `__` for nesting) merged with an
//! optional TOML file, file wins on conflicts. Every field has a default, so an
//! empty environment and no file is a perfectly valid configuration.
//!
//! ```toml
//! [youtrack]
//! use_https = true
//! verify_ssl = true
//! page_size = 200
//!
//! [danswer]
//! metadata_primary_owners = ["support@acme.io"]
//! zip_folder_name = "danswer_export.zip"
//!
//! [logging]
//! format = "compact"      # pretty | compact | json
//! file_name = "ytx.log"   # omit for stderr
//!
//! [queries]
//! indexing_issues = "created: {start_date} .. {end_date}"
//! fields = "id,idReadable,summary,..."
//! ```
//!
//! Secrets (tokens, API keys) are NOT config. They come in on the command line.

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use std::path::Path;
// 🚀 tracing::info -- because println! in production is a cry for help.
use tracing::info;

/// 📦 The AppConfig: one struct to rule them all, four sections to find them.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub youtrack: YouTrackConfig,
    #[serde(default)]
    pub danswer: DanswerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub queries: QueriesConfig,
}

/// 📡 How we talk to YouTrack.
#[derive(Debug, Deserialize, Clone)]
pub struct YouTrackConfig {
    /// 🔒 `true` → https, `false` → http. The scheme in `--youtrack-url` is ignored.
    #[serde(default = "default_true")]
    pub use_https: bool,
    /// 🔒 `false` accepts any certificate. For the self-signed box under someone's desk.
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
    /// 📦 `$top` per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for YouTrackConfig {
    fn default() -> Self {
        Self {
            use_https: true,
            verify_ssl: true,
            page_size: default_page_size(),
        }
    }
}

/// 🗂️ File-mode knobs for Danswer's file connector.
#[derive(Debug, Deserialize, Clone)]
pub struct DanswerConfig {
    /// 👥 Listed as `primary_owners` on every manifest row.
    #[serde(default)]
    pub metadata_primary_owners: Vec<String>,
    /// 📦 Archive name, created inside the output directory.
    #[serde(default = "default_zip_folder_name")]
    pub zip_folder_name: String,
}

impl Default for DanswerConfig {
    fn default() -> Self {
        Self {
            metadata_primary_owners: Vec::new(),
            zip_folder_name: default_zip_folder_name(),
        }
    }
}

/// 🎨 How the log lines look.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

/// 🍞 Where the breadcrumbs go.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// 📁 `None` → stderr.
    #[serde(default)]
    pub file_name: Option<String>,
}

/// 🔍 What we ask YouTrack for.
#[derive(Debug, Deserialize, Clone)]
pub struct QueriesConfig {
    /// 📅 Search query template. `{start_date}` and `{end_date}` get filled in from the CLI.
    #[serde(default = "default_indexing_issues")]
    pub indexing_issues: String,
    /// 🧾 YouTrack `fields` selection. The mappers need everything in the default, at minimum.
    #[serde(default = "default_fields")]
    pub fields: String,
}

impl Default for QueriesConfig {
    fn default() -> Self {
        Self {
            indexing_issues: default_indexing_issues(),
            fields: default_fields(),
        }
    }
}

impl QueriesConfig {
    /// 📅 Fill the date placeholders. Plain substitution, no date validation.
    pub fn indexing_query(&self, start_date: &str, end_date: &str) -> String {
        self.indexing_issues
            .replace("{start_date}", start_date)
            .replace("{end_date}", end_date)
    }
}

fn default_true() -> bool {
    true
}

// 📦 200 per page. YouTrack is fine with it. We asked nicely.
fn default_page_size() -> usize {
    200
}

fn default_zip_folder_name() -> String {
    "danswer_export.zip".to_string()
}

fn default_indexing_issues() -> String {
    "created: {start_date} .. {end_date}".to_string()
}

fn default_fields() -> String {
    "id,idReadable,summary,description,created,project(name),\
     customFields(name,value(name)),links(issues(idReadable)),\
     comments(id,text,created,author(name))"
        .to_string()
}

/// 🚀 Load the config -- from a file, from env vars, or from the sheer power of defaults.
///
/// - `config_file_name` is None → env vars only.
/// - `config_file_name` is Some → env vars + TOML file, merged. TOML wins on conflicts.
///
/// 💀 Returns an error if the config is unparseable. The message says which layer to blame.
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    info!(
        "🔧 Loading configuration: {:#?}",
        config_file_name.unwrap_or(Path::new(""))
    );

    // 🏗️ env vars first. YTX_YOUTRACK__VERIFY_SSL=false → youtrack.verify_ssl
    let config = Figment::new().merge(Env::prefixed("YTX_").split("__"));

    let config = match config_file_name {
        Some(file_name) => config.merge(Toml::file(file_name)),
        None => config,
    };

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}' and environment variables (YTX_*). \
             The file exists in our hearts, but apparently not in valid TOML.",
            path.display()
        ),
        None => "💀 Failed to parse configuration from environment variables (YTX_*). \
                 No file was provided, so this one's all on the environment."
            .to_string(),
    };

    config.extract().context(context_msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_test_config(contents: &str) -> tempfile::NamedTempFile {
        let mut the_file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("💀 Failed to create a temp config. The filesystem said 'new phone who dis'.");
        the_file
            .write_all(contents.as_bytes())
            .expect("💀 Failed to write test config.");
        the_file
    }

    #[test]
    fn the_one_where_every_section_gets_its_say() {
        let the_file = write_test_config(
            r#"
            [youtrack]
            use_https = false
            verify_ssl = false
            page_size = 50

            [danswer]
            metadata_primary_owners = ["a@acme.io", "b@acme.io"]
            zip_folder_name = "out.zip"

            [logging]
            format = "json"
            file_name = "ytx.log"

            [queries]
            indexing_issues = "project: SUP created: {start_date} .. {end_date}"
            fields = "id,idReadable"
            "#,
        );

        let app_config = load_config(Some(the_file.path()))
            .expect("💀 A fully specified config should parse. No excuses.");

        assert!(!app_config.youtrack.use_https);
        assert!(!app_config.youtrack.verify_ssl);
        assert_eq!(app_config.youtrack.page_size, 50);
        assert_eq!(
            app_config.danswer.metadata_primary_owners,
            vec!["a@acme.io", "b@acme.io"]
        );
        assert_eq!(app_config.danswer.zip_folder_name, "out.zip");
        assert_eq!(app_config.logging.format, LogFormat::Json);
        assert_eq!(app_config.logging.file_name.as_deref(), Some("ytx.log"));
        assert_eq!(app_config.queries.fields, "id,idReadable");
    }

    #[test]
    fn the_one_where_defaults_show_up_uninvited_but_helpful() {
        let the_file = write_test_config(
            r#"
            [danswer]
            metadata_primary_owners = ["owner@acme.io"]
            "#,
        );

        let app_config: AppConfig = Figment::new()
            .merge(Toml::file(the_file.path()))
            .extract()
            .expect("💀 Defaults should fill in the rest. Serde left us on read otherwise.");

        assert!(app_config.youtrack.use_https);
        assert!(app_config.youtrack.verify_ssl);
        assert_eq!(app_config.youtrack.page_size, 200);
        assert_eq!(app_config.danswer.zip_folder_name, "danswer_export.zip");
        assert_eq!(app_config.logging.format, LogFormat::Compact);
        assert_eq!(app_config.logging.file_name, None);
        assert!(app_config.queries.fields.contains("comments(id,text,created,author(name))"));
    }

    #[test]
    fn the_one_where_an_empty_world_is_still_a_valid_config() {
        let app_config: AppConfig = Figment::new()
            .extract()
            .expect("💀 Nothing at all should still be a config.");
        assert_eq!(app_config.youtrack.page_size, 200);
        assert!(app_config.danswer.metadata_primary_owners.is_empty());
    }

    #[test]
    fn the_one_where_a_typo_in_the_log_format_is_not_forgiven() {
        let the_file = write_test_config(
            r#"
            [logging]
            format = "fancy"
            "#,
        );
        assert!(load_config(Some(the_file.path())).is_err());
    }

    #[test]
    fn the_one_where_the_dates_find_their_placeholders() {
        let the_queries = QueriesConfig::default();
        assert_eq!(
            the_queries.indexing_query("2024-01-01", "2024-01-31"),
            "created: 2024-01-01 .. 2024-01-31"
        );
    }
}
