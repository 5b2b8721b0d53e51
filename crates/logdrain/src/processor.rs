// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Log processor worker turning drain lines into metric records.
//!
//! Producers push [`LogData`] through a [`LogDrainHandle`]; a single
//! [`LogProcessor`] task classifies and transforms each line in arrival order
//! and forwards the resulting [`MetricRecord`]s to the consumer's queue. Both
//! queues are bounded, so a slow consumer suspends the worker and a busy
//! worker suspends the producers.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, trace, warn, Dispatch};
use ustr::Ustr;

use crate::classifier::classify;
use crate::metric::{LogData, MetricRecord};
use crate::transform::transform;

/// Context shared by every line of one ingested payload.
#[derive(Clone, Debug)]
pub struct BatchContext {
    pub app: Ustr,
    pub tags: Arc<Vec<String>>,
    pub prefix: Ustr,
}

impl BatchContext {
    pub fn new(app: &str, tags: Vec<String>, prefix: &str) -> Self {
        BatchContext {
            app: Ustr::from(app),
            tags: Arc::new(tags),
            prefix: Ustr::from(prefix),
        }
    }

    pub fn log_data(&self, line: impl Into<String>) -> LogData {
        LogData {
            app: self.app,
            tags: Arc::clone(&self.tags),
            prefix: self.prefix,
            line: line.into(),
        }
    }
}

/// Producer side of the processor's input queue.
///
/// The processor stops once every handle has been dropped.
#[derive(Clone)]
pub struct LogDrainHandle {
    tx: mpsc::Sender<LogData>,
}

impl LogDrainHandle {
    pub async fn send(&self, data: LogData) -> Result<(), mpsc::error::SendError<LogData>> {
        self.tx.send(data).await
    }

    /// Queues every non-empty line of a newline delimited payload, returning
    /// how many were queued. A trailing `'\r'` is stripped from each line.
    pub async fn ingest(
        &self,
        ctx: &BatchContext,
        payload: &str,
    ) -> Result<usize, mpsc::error::SendError<LogData>> {
        let mut queued = 0;
        for line in payload.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            self.send(ctx.log_data(line)).await?;
            queued += 1;
        }
        Ok(queued)
    }
}

pub struct LogProcessor {
    rx: mpsc::Receiver<LogData>,
    out: mpsc::Sender<MetricRecord>,
    dispatch: Option<Dispatch>,
}

impl LogProcessor {
    /// Creates a processor with an input queue of `capacity` lines writing
    /// into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize, out: mpsc::Sender<MetricRecord>) -> (Self, LogDrainHandle) {
        let (tx, rx) = mpsc::channel(capacity);
        let processor = LogProcessor {
            rx,
            out,
            dispatch: None,
        };
        (processor, LogDrainHandle { tx })
    }

    /// Sends this processor's diagnostics to `dispatch` instead of the
    /// default subscriber.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Processes lines until the input queue is closed, then hands the output
    /// sender back so the caller decides when the output queue closes.
    pub async fn run(mut self) -> mpsc::Sender<MetricRecord> {
        self.scoped(|| debug!("Log processor started"));

        while let Some(data) = self.rx.recv().await {
            let Some(record) = self.scoped(|| Self::process(&data)) else {
                continue;
            };
            if let Err(e) = self.out.send(record).await {
                self.scoped(|| error!("Failed to send {} record - receiver dropped", e.0.kind));
            }
        }

        self.scoped(|| debug!("Log processor stopped"));
        self.out
    }

    /// Classifies and transforms a single line.
    ///
    /// Unroutable lines are dropped silently, lines that fail to decode are
    /// dropped with a warning.
    pub fn process(data: &LogData) -> Option<MetricRecord> {
        trace!("{}", data.line);
        let (kind, body) = classify(&data.line)?;

        match transform(kind, data, body) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Failed to parse {} line: {}", kind, e);
                None
            }
        }
    }

    fn scoped<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}
