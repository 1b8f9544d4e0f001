// ai
//! 📡 YouTrack -- the source of all tickets, and therefore all problems.
//!
//! 🎬 COLD OPEN -- INT. `/api/issues` -- 200 TICKETS AT A TIME
//!
//! YouTrack will hand you its issues, but only in pages, and only if you say
//! `$top` and `$skip` out loud. It will not tell you how many there are. You
//! find out when a page comes back short. Or empty. Like a vending machine that
//! only reveals it's out of snacks by eating your dollar.
//!
//! ## Knowledge Graph 🧠
//! - `YouTrackClient`: bearer-token HTTP client. Scheme comes from config, host from the CLI.
//! - `YouTrackSource`: `Source` impl that walks `$skip` forward one page at a time.
//! - Stops on an empty page OR a page shorter than `$top`. Either one means "that's all".
//! - Transport errors and non-2xx are fatal for the call. No retries. Retries are a lifestyle.

use std::fmt;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::{Value, json};
use tracing::{debug, trace};

use crate::app_config::YouTrackConfig;
use crate::backends::Source;

const ISSUES_ENDPOINT: &str = "/api/issues";
const LIVENESS_ENDPOINT: &str = "/api/admin/projects";

/// 📡 Talks to one YouTrack instance. Cheap to clone, the connection pool is shared.
#[derive(Clone)]
pub(crate) struct YouTrackClient {
    client: reqwest::Client,
    base_url: String,
    scheme: &'static str,
    verify_ssl: bool,
    token: String,
}

impl fmt::Debug for YouTrackClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 🔒 token omitted. logs are forever.
        f.debug_struct("YouTrackClient")
            .field("base_url", &self.base_url)
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

/// 🔍 `host[:port]` out of whatever the operator typed. A bare `yt.example.com` is accepted too.
fn netloc_of(youtrack_url: &str) -> Result<String> {
    let the_candidate = if youtrack_url.contains("://") {
        youtrack_url.to_string()
    } else {
        format!("https://{youtrack_url}")
    };
    let the_url = Url::parse(&the_candidate).context(format!(
        "💀 '{youtrack_url}' doesn't look like a YouTrack URL. We squinted. Still no."
    ))?;
    let Some(the_host) = the_url.host_str() else {
        bail!("💀 '{youtrack_url}' has no host. A URL without a host is just a hope.");
    };
    Ok(match the_url.port() {
        Some(the_port) => format!("{the_host}:{the_port}"),
        None => the_host.to_string(),
    })
}

impl YouTrackClient {
    /// 🚀 Build a client for `{scheme}://{netloc}` where the scheme comes from `use_https`.
    pub(crate) fn new(youtrack_url: &str, token: &str, config: &YouTrackConfig) -> Result<Self> {
        let scheme = if config.use_https { "https" } else { "http" };
        let base_url = format!("{scheme}://{}", netloc_of(youtrack_url)?);

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .context("💀 The HTTP client refused to be born. The TLS stack wept. Probably a cursed system cert store.")?;

        Ok(Self {
            client,
            base_url,
            scheme,
            verify_ssl: config.verify_ssl,
            token: token.to_string(),
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 📡 Authenticated GET with query params. Non-2xx becomes an `Err`.
    async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<reqwest::Response> {
        let the_url = format!("{}{}", self.base_url, endpoint);
        trace!("📡 GET {} {:?}", the_url, params);
        let the_response = self
            .client
            .get(&the_url)
            .bearer_auth(&self.token)
            .query(params)
            .send()
            .await
            .context(format!("💀 GET {the_url} never made it back. The network ate it."))?;
        the_response
            .error_for_status()
            .context(format!("💀 YouTrack said no to GET {the_url}."))
    }

    /// 📦 One page of issues for a project. No pagination, no `$skip`.
    // -- the migration itself always goes through a query; this is the by-project read
    #[allow(dead_code)]
    pub(crate) async fn get_issues(
        &self,
        project: &str,
        max_results: usize,
        fields: Option<&str>,
    ) -> Result<Vec<Value>> {
        let mut the_params = vec![
            ("project", project.to_string()),
            ("$top", max_results.to_string()),
        ];
        if let Some(the_fields) = fields {
            the_params.push(("fields", the_fields.to_string()));
        }
        self.get(ISSUES_ENDPOINT, &the_params)
            .await?
            .json()
            .await
            .context("💀 YouTrack's issue list was not a JSON array. It was something else. Something worse.")
    }

    /// 📦 One page of a query, `$top` tickets starting at `$skip`.
    pub(crate) async fn issues_page(
        &self,
        query: &str,
        fields: &str,
        top: usize,
        skip: usize,
    ) -> Result<Vec<Value>> {
        let the_params = [
            ("query", query.to_string()),
            ("fields", fields.to_string()),
            ("$top", top.to_string()),
            ("$skip", skip.to_string()),
        ];
        self.get(ISSUES_ENDPOINT, &the_params)
            .await?
            .json()
            .await
            .context(format!(
                "💀 Page at $skip={skip} was not a JSON array of tickets."
            ))
    }

    /// 🩺 Is anybody home? `200` from the projects endpoint means yes. Anything else means no.
    pub(crate) async fn is_active(&self) -> bool {
        let the_url = format!("{}{}", self.base_url, LIVENESS_ENDPOINT);
        match self.client.get(&the_url).bearer_auth(&self.token).send().await {
            Ok(the_response) => {
                debug!("🩺 YouTrack liveness: {}", the_response.status());
                the_response.status() == reqwest::StatusCode::OK
            }
            Err(the_error) => {
                debug!("🩺 YouTrack liveness probe failed: {:?}", the_error);
                false
            }
        }
    }

    /// 🪪 What we're connected to, for the startup log line.
    pub(crate) fn info(&self) -> Value {
        json!({
            "base_url": self.base_url,
            "scheme": self.scheme,
            "verify_ssl": self.verify_ssl,
        })
    }

    /// 🚰 A paging source over `query`.
    pub(crate) fn query_source(
        &self,
        query: impl Into<String>,
        fields: impl Into<String>,
        page_size: usize,
    ) -> YouTrackSource {
        YouTrackSource {
            client: self.clone(),
            query: query.into(),
            fields: fields.into(),
            page_size: page_size.max(1),
            skip: 0,
            exhausted: false,
        }
    }
}

/// 🚰 Walks a query one `$top`-sized page at a time.
#[derive(Debug)]
pub(crate) struct YouTrackSource {
    client: YouTrackClient,
    query: String,
    fields: String,
    page_size: usize,
    skip: usize,
    exhausted: bool,
}

#[async_trait]
impl Source for YouTrackSource {
    async fn next_page(&mut self) -> Result<Option<Vec<Value>>> {
        if self.exhausted {
            return Ok(None);
        }

        let the_page = self
            .client
            .issues_page(&self.query, &self.fields, self.page_size, self.skip)
            .await?;
        debug!(
            "📦 fetched {} tickets at $skip={}",
            the_page.len(),
            self.skip
        );

        // -- 🛑 a short page is the last page. an empty page is also the last page, just sadder.
        if the_page.len() < self.page_size {
            self.exhausted = true;
        }
        if the_page.is_empty() {
            return Ok(None);
        }
        self.skip += self.page_size;
        Ok(Some(the_page))
    }
}
