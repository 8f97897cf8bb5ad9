//! Runtime - drives one operator
//!
//! Data tuples arrive as JSON lines and leave as JSON lines. Control payloads
//! arrive on a channel and are handled in arrival order by one blocking
//! worker, so scoring continues against the current model until the swap.

pub mod watcher;

use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::logic::operator::{ControlOutcome, Operator};
use crate::logic::tuple::Record;

pub use watcher::ControlFileWatcher;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub received: u64,
    pub undecodable: u64,
    pub submitted: u64,
    pub dropped: u64,
    pub control_messages: u64,
    pub reloads: u64,
    pub reload_failures: u64,
}

#[derive(Debug, Default)]
struct ControlTally {
    reloads: u64,
    reload_failures: u64,
}

pub struct OperatorRunner {
    operator: Arc<dyn Operator>,
}

impl OperatorRunner {
    pub fn new(operator: Arc<dyn Operator>) -> Self {
        Self { operator }
    }

    /// Run until `data` is exhausted
    pub async fn run<R, W>(
        &self,
        data: R,
        mut control: mpsc::Receiver<String>,
        mut output: W,
    ) -> anyhow::Result<RunSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut summary = RunSummary::default();
        let mut lines = data.lines();
        let mut control_open = true;
        let input_schema = Arc::clone(&self.operator.context().input_schema);
        let (work, worker) = self.spawn_control_worker();

        loop {
            tokio::select! {
                biased;

                message = control.recv(), if control_open => match message {
                    Some(payload) => {
                        summary.control_messages += 1;
                        if work.send(payload).is_err() {
                            log::error!("Control worker stopped, dropping control message");
                        }
                    }
                    None => control_open = false,
                },

                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    summary.received += 1;

                    let tuple = match Record::from_json_str(Arc::clone(&input_schema), &line) {
                        Ok(tuple) => tuple,
                        Err(e) => {
                            log::error!("Dropping undecodable tuple: {}", e);
                            summary.undecodable += 1;
                            continue;
                        }
                    };

                    let mut port: Vec<Record> = Vec::with_capacity(1);
                    if self.operator.process(&tuple, &mut port) {
                        summary.submitted += 1;
                    } else {
                        summary.dropped += 1;
                    }

                    for out in port {
                        let mut encoded = serde_json::to_string(&out.to_json())?;
                        encoded.push('\n');
                        output.write_all(encoded.as_bytes()).await?;
                    }
                }
            }
        }

        output.flush().await?;

        drop(work);
        match worker.await {
            Ok(tally) => {
                summary.reloads = tally.reloads;
                summary.reload_failures = tally.reload_failures;
            }
            Err(e) => log::error!("Control worker failed: {}", e),
        }

        log::info!(
            "{}: input exhausted ({} received, {} submitted, {} dropped, {} undecodable)",
            self.operator.context().name,
            summary.received,
            summary.submitted,
            summary.dropped,
            summary.undecodable
        );
        Ok(summary)
    }

    fn spawn_control_worker(&self) -> (mpsc::UnboundedSender<String>, JoinHandle<ControlTally>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<String>();
        let operator = Arc::clone(&self.operator);

        let worker = tokio::task::spawn_blocking(move || {
            let mut tally = ControlTally::default();
            while let Some(payload) = receiver.blocking_recv() {
                match operator.process_control(&payload) {
                    ControlOutcome::Reloaded => tally.reloads += 1,
                    ControlOutcome::ReloadFailed => tally.reload_failures += 1,
                    ControlOutcome::Ignored => {}
                }
            }
            tally
        });

        (sender, worker)
    }
}
