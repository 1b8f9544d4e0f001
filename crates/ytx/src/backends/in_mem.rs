//! 🧪 In-memory backends -- a source that never hits the network and a sink that never forgets.
//!
//! Test doubles for the supervisor. Compiled under `cfg(test)` only.

use std::collections::{HashSet, VecDeque};
use std::fmt::Debug;
use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::backends::{Sink, Source};

/// 🚰 Hands out pre-baked pages, in order, then `None` forever.
#[derive(Debug, Default)]
pub(crate) struct InMemorySource {
    pages: VecDeque<Vec<Value>>,
}

impl InMemorySource {
    pub(crate) fn new(pages: Vec<Vec<Value>>) -> Self {
        Self {
            pages: pages.into(),
        }
    }
}

#[async_trait]
impl Source for InMemorySource {
    async fn next_page(&mut self) -> Result<Option<Vec<Value>>> {
        Ok(self.pages.pop_front())
    }
}

/// 📦 A sink that hoards every payload it accepts and answers with a fixed receipt.
///
/// Clone-able because tests need to peek inside after handing the sink to the
/// supervisor. The `Arc` means every clone shares the same Vec.
///
/// `failing_on` makes the n-th `send` (0-based, counting every attempt) fail,
/// so tests can watch the supervisor shrug and carry on.
#[derive(Debug, Clone)]
pub(crate) struct InMemorySink<P, R> {
    pub(crate) received: Arc<Mutex<Vec<P>>>,
    pub(crate) closed: Arc<Mutex<bool>>,
    receipt: R,
    fail_on: HashSet<usize>,
    attempts: usize,
}

impl<P, R> InMemorySink<P, R> {
    pub(crate) fn new(receipt: R) -> Self {
        Self {
            received: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(Mutex::new(false)),
            receipt,
            fail_on: HashSet::new(),
            attempts: 0,
        }
    }

    pub(crate) fn failing_on(mut self, attempt: usize) -> Self {
        self.fail_on.insert(attempt);
        self
    }
}

#[async_trait]
impl<P, R> Sink for InMemorySink<P, R>
where
    P: Debug + Send + 'static,
    R: Debug + Clone + Send + Sync,
{
    type Payload = P;
    type Receipt = R;

    async fn send(&mut self, payload: P) -> Result<R> {
        let the_attempt = self.attempts;
        self.attempts += 1;
        if self.fail_on.contains(&the_attempt) {
            bail!("💀 in-memory sink was told to fail on attempt {the_attempt}, and it is nothing if not obedient");
        }
        self.received.lock().await.push(payload);
        Ok(self.receipt.clone())
    }

    async fn close(&mut self) -> Result<()> {
        *self.closed.lock().await = true;
        Ok(())
    }
}
