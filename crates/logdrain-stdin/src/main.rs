// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use logdrain::config::Config;
use logdrain::metric::MetricRecord;
use logdrain::processor::LogProcessor;

#[tokio::main]
pub async fn main() {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading logdrain configuration: {e}");
            return;
        }
    };

    let env_filter = match EnvFilter::try_new(&config.log_level) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("could not parse log level in configuration: {e}");
            return;
        }
    };
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
        return;
    }

    debug!("Logging subsystem enabled");

    let (out_tx, out_rx) = mpsc::channel::<MetricRecord>(config.queue_capacity);
    let (processor, handle) = LogProcessor::new(config.queue_capacity, out_tx);
    let worker = tokio::spawn(processor.run());
    let printer = tokio::spawn(print_records(out_rx));

    let ctx = config.batch_context();
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut received = 0usize;
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.is_empty() => continue,
            Ok(Some(line)) => {
                if handle.send(ctx.log_data(line)).await.is_err() {
                    error!("Log processor stopped before stdin was drained");
                    break;
                }
                received += 1;
            }
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read from stdin: {e}");
                break;
            }
        }
    }
    drop(handle);

    // the worker returns its output sender once the input queue is drained
    match worker.await {
        Ok(out_tx) => drop(out_tx),
        Err(e) => error!("Log processor task failed: {e}"),
    }
    match printer.await {
        Ok(printed) => info!("Processed {received} lines into {printed} records"),
        Err(e) => error!("Record printer task failed: {e}"),
    }
}

async fn print_records(mut rx: mpsc::Receiver<MetricRecord>) -> usize {
    let mut stdout = io::stdout();
    let mut printed = 0;
    while let Some(record) = rx.recv().await {
        let mut json = match serde_json::to_vec(&record) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize {} record: {e}", record.kind);
                continue;
            }
        };
        json.push(b'\n');
        if let Err(e) = stdout.write_all(&json).await {
            error!("Failed to write record to stdout: {e}");
            break;
        }
        printed += 1;
    }
    if let Err(e) = stdout.flush().await {
        error!("Failed to flush stdout: {e}");
    }
    printed
}
