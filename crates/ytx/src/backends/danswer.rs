// ai
//! 📡 Danswer -- the API-mode sink. One document in, one verdict out.
//!
//! POST `{base}/danswer-api/ingestion` with the payload. Danswer answers with
//! `already_existed`, which is the whole difference between "added" and
//! "updated" in the logs. Everything else in the response is ignored.
//!
//! ## Knowledge Graph 🧠
//! - `DanswerClient`: bearer-auth HTTP client plus liveness and info.
//! - `DanswerSink`: `Sink` impl over the client. No buffering. `close` is a no-op.
//! - Non-2xx is an error for THAT document. The supervisor logs it and keeps going.

use std::fmt;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::backends::Sink;
use crate::common::{IngestOutcome, IngestionPayload, IngestionResponse};

/// 📡 Talks to one Danswer deployment.
#[derive(Clone)]
pub(crate) struct DanswerClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for DanswerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DanswerClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl DanswerClient {
    pub(crate) fn new(danswer_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("💀 The HTTP client refused to be born. The TLS stack wept. The architect shrugged.")?;
        Ok(Self {
            client,
            // -- one slash of difference. infinite suffering of difference.
            base_url: danswer_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// 📬 Ingest one document. `already_existed` decides the outcome.
    pub(crate) async fn post_ingest_document(
        &self,
        payload: &IngestionPayload,
    ) -> Result<IngestOutcome> {
        let the_url = format!("{}/danswer-api/ingestion", self.base_url);
        debug!(
            "📡 POST {} for document {}",
            the_url, payload.document.id
        );
        let the_response = self
            .client
            .post(&the_url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .context(format!("💀 POST {the_url} never made it back. The network ate it."))?
            .error_for_status()
            .context(format!(
                "💀 Danswer refused document '{}'. The payload was rendered with love. The status code was not.",
                payload.document.id
            ))?;
        let the_verdict: IngestionResponse = the_response
            .json()
            .await
            .context("💀 Danswer answered, but not with anything that has an `already_existed` in it.")?;
        Ok(the_verdict.into())
    }

    /// 🩺 `200` from the default connector's docs endpoint means alive. Anything else means not.
    pub(crate) async fn is_active(&self) -> bool {
        let the_url = format!("{}/danswer-api/connector-docs/0", self.base_url);
        match self.client.get(&the_url).bearer_auth(&self.api_key).send().await {
            Ok(the_response) => {
                debug!("🩺 Danswer liveness: {}", the_response.status());
                the_response.status() == reqwest::StatusCode::OK
            }
            Err(the_error) => {
                debug!("🩺 Danswer liveness probe failed: {:?}", the_error);
                false
            }
        }
    }

    pub(crate) fn info(&self) -> Value {
        json!({ "base_url": self.base_url })
    }
}

/// 🕳️ The API-mode sink. A client in a trench coat.
#[derive(Debug)]
pub(crate) struct DanswerSink {
    client: DanswerClient,
}

impl DanswerSink {
    pub(crate) fn new(client: DanswerClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Sink for DanswerSink {
    type Payload = IngestionPayload;
    type Receipt = IngestOutcome;

    async fn send(&mut self, payload: IngestionPayload) -> Result<IngestOutcome> {
        self.client.post_ingest_document(&payload).await
    }

    /// 🗑️ Nothing to flush. Every document already left the building.
    async fn close(&mut self) -> Result<()> {
        debug!("🗑️ Danswer sink closing. No buffer to flush, just vibes to release");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::{DanswerIngestion, TicketTransform};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn a_payload() -> IngestionPayload {
        DanswerIngestion::new("https://yt.example.com", 5)
            .transform_raw(json!({
                "id": "3-1",
                "idReadable": "SUP-1",
                "summary": "Login fails",
                "description": "<p>Can't log in</p>",
                "created": 1700000000000i64,
                "project": {"name": "Support"}
            }))
            .expect("💀 the test ticket should map")
    }

    async fn ingestion_answers(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/danswer-api/ingestion"))
            .and(header("Authorization", "Bearer dn_key"))
            .and(body_partial_json(json!({
                "cc_pair_id": 5,
                "document": {"id": "3-1", "source": "ingestion_api"}
            })))
            .respond_with(response)
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn the_one_where_a_new_document_is_created() -> Result<()> {
        let the_server = MockServer::start().await;
        ingestion_answers(
            &the_server,
            ResponseTemplate::new(200)
                .set_body_json(json!({"document_id": "3-1", "already_existed": false})),
        )
        .await;

        let mut the_sink = DanswerSink::new(DanswerClient::new(&the_server.uri(), "dn_key")?);
        assert_eq!(the_sink.send(a_payload()).await?, IngestOutcome::Created);
        the_sink.close().await
    }

    #[tokio::test]
    async fn the_one_where_a_familiar_document_is_updated() -> Result<()> {
        let the_server = MockServer::start().await;
        ingestion_answers(
            &the_server,
            ResponseTemplate::new(200)
                .set_body_json(json!({"document_id": "3-1", "already_existed": true})),
        )
        .await;

        // -- trailing slash on purpose. it should not become a double slash.
        let the_client = DanswerClient::new(&format!("{}/", the_server.uri()), "dn_key")?;
        assert_eq!(
            the_client.post_ingest_document(&a_payload()).await?,
            IngestOutcome::Updated
        );
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_danswer_says_no() -> Result<()> {
        let the_server = MockServer::start().await;
        ingestion_answers(&the_server, ResponseTemplate::new(422)).await;

        let the_client = DanswerClient::new(&the_server.uri(), "dn_key")?;
        assert!(the_client.post_ingest_document(&a_payload()).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_liveness_is_checked_at_connector_zero() -> Result<()> {
        let the_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/danswer-api/connector-docs/0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&the_server)
            .await;

        let the_client = DanswerClient::new(&the_server.uri(), "dn_key")?;
        assert!(the_client.is_active().await);
        assert_eq!(the_client.info(), json!({"base_url": the_server.uri()}));
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_a_403_means_not_alive() -> Result<()> {
        let the_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/danswer-api/connector-docs/0"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&the_server)
            .await;

        let the_client = DanswerClient::new(&the_server.uri(), "dn_key")?;
        assert!(!the_client.is_active().await);
        Ok(())
    }
}
