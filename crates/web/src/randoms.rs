//! Background random-number worker
//!
//! The generator is an independent worker reached by message passing:
//! handlers send a request over an mpsc channel and await the reply on a
//! per-request oneshot, so a large batch never stalls the accept loop.
//! Generation itself runs on the blocking pool.

use std::collections::BTreeMap;

use rand::Rng;
use tokio::sync::{mpsc, oneshot};

/// Largest value (inclusive) produced by the generator
const MAX_VALUE: u32 = 1000;
/// Batch size when the request does not specify one
pub const DEFAULT_COUNT: u64 = 100_000_000;
/// Upper bound on a single batch
pub const MAX_COUNT: u64 = 100_000_000;

/// Frequency map: value drawn -> occurrences
pub type Frequencies = BTreeMap<u32, u64>;

struct RandomsRequest {
    count: u64,
    respond_to: oneshot::Sender<Frequencies>,
}

/// Handle for submitting generation requests to the worker
#[derive(Clone)]
pub struct RandomsHandle {
    tx: mpsc::Sender<RandomsRequest>,
}

#[derive(Debug, thiserror::Error)]
pub enum RandomsError {
    #[error("random-number worker is not running")]
    WorkerGone,
}

impl RandomsHandle {
    /// Draw `count` values in 1..=1000 and count occurrences.
    ///
    /// `count` is clamped to [`MAX_COUNT`].
    pub async fn generate(&self, count: u64) -> Result<Frequencies, RandomsError> {
        let (respond_to, response) = oneshot::channel();
        let count = count.min(MAX_COUNT);

        self.tx
            .send(RandomsRequest { count, respond_to })
            .await
            .map_err(|_| RandomsError::WorkerGone)?;

        response.await.map_err(|_| RandomsError::WorkerGone)
    }
}

/// Spawn the worker task and return a handle to it
pub fn spawn_worker() -> RandomsHandle {
    let (tx, mut rx) = mpsc::channel::<RandomsRequest>(16);

    tokio::spawn(async move {
        while let Some(RandomsRequest { count, respond_to }) = rx.recv().await {
            // CPU-bound; keep it off the async event loop
            let result = tokio::task::spawn_blocking(move || generate_frequencies(count)).await;

            match result {
                Ok(frequencies) => {
                    // The requester may have gone away; nothing to do then
                    let _ = respond_to.send(frequencies);
                }
                Err(err) => {
                    tracing::error!(error = %err, "random generation task failed");
                }
            }
        }

        tracing::info!("random-number worker stopped");
    });

    RandomsHandle { tx }
}

fn generate_frequencies(count: u64) -> Frequencies {
    let mut rng = rand::thread_rng();
    let mut frequencies = Frequencies::new();

    for _ in 0..count {
        let value = rng.gen_range(1..=MAX_VALUE);
        *frequencies.entry(value).or_insert(0) += 1;
    }

    frequencies
}
