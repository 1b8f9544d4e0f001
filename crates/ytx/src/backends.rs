//! 🔌 Backends -- where the real I/O happens.
//!
//! 🚰 Sources pour tickets, Sinks slurp up whatever the transforms made of them.
//! And in between, we panic! (kidding, we use anyhow)
//!
//! 🎭 The casting agency:
//! - `youtrack` -- the only Source that matters. Paged `/api/issues` reads.
//! - `danswer` -- the API-mode Sink. One POST per document.
//! - `file` -- the file-mode Sink. One JSON file per ticket, a manifest, a zip.
//! - `in_mem` -- test doubles for both traits. Never leaves `cfg(test)`.
//!
//! 🦆 The duck is here because every file must have one. This is law. Do not question the duck.

use std::fmt::Debug;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

pub(crate) mod danswer;
pub(crate) mod file;
#[cfg(test)]
pub(crate) mod in_mem;
pub(crate) mod youtrack;

pub(crate) use danswer::DanswerClient;
pub(crate) use file::FileSink;
pub(crate) use youtrack::YouTrackClient;

/// 🚰 A source that produces pages of raw tickets.
///
/// # Contract
/// - `next_page` returns `Ok(Some(page))` while data flows and `Ok(None)` once the well is dry.
/// - Tickets stay raw JSON here. Turning them into anything typed is the transform's job,
///   so one malformed ticket can be skipped without losing the page.
/// - `&mut self` because sources have state. And feelings. Mostly an offset.
#[async_trait]
pub(crate) trait Source: Debug + Send {
    async fn next_page(&mut self) -> Result<Option<Vec<Value>>>;
}

/// 🕳️ A sink that consumes mapped documents, one at a time.
///
/// # Contract
/// - `send` delivers one payload and reports what happened to it (`Receipt`).
///   An `Err` is about THAT payload only; the caller decides whether to carry on.
/// - `close` finalizes whatever the sink was building. MUST be called.
///   Skipping `close` is a bug. It is also considered rude.
#[async_trait]
pub(crate) trait Sink: Debug + Send {
    type Payload: Send + 'static;
    type Receipt: Send;

    async fn send(&mut self, payload: Self::Payload) -> Result<Self::Receipt>;

    async fn close(&mut self) -> Result<()>;
}

/// 📚 Drain a source into one in-memory sequence, page order preserved.
///
/// The whole result set is held in memory before mapping starts. Fine for a date
/// window of tickets. Not fine for "all tickets since the dawn of time".
pub(crate) async fn collect_all<S: Source + ?Sized>(source: &mut S) -> Result<Vec<Value>> {
    let mut the_tickets = Vec::new();
    while let Some(the_page) = source.next_page().await? {
        the_tickets.extend(the_page);
    }
    Ok(the_tickets)
}
