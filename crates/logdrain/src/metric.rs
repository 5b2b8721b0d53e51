// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Records flowing into and out of the log processor.

use std::sync::Arc;

use hashbrown::HashMap;
use serde::Serialize;
use ustr::Ustr;

/// One inbound log-drain line plus the context shared by its batch.
///
/// `app`, `tags` and `prefix` are shared by every line of a request and are
/// never mutated by the processor.
#[derive(Clone, Debug)]
pub struct LogData {
    pub app: Ustr,
    pub tags: Arc<Vec<String>>,
    pub prefix: Ustr,
    pub line: String,
}

/// The originating subsystem of a log line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[display("router")]
    Router,
    #[display("dyno_sample")]
    DynoSample,
    #[display("pg_sample")]
    PgSample,
    #[display("redis_sample")]
    RedisSample,
    #[display("scaling")]
    Scaling,
    #[display("release")]
    Release,
}

/// A value split into its numeral and trailing unit, both kept as text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MetricValue {
    pub magnitude: String,
    pub unit: String,
}

impl MetricValue {
    pub fn new(magnitude: impl Into<String>, unit: impl Into<String>) -> Self {
        MetricValue {
            magnitude: magnitude.into(),
            unit: unit.into(),
        }
    }

    /// Splits `value` after its rightmost ASCII digit.
    ///
    /// Everything up to and including that digit is the magnitude, the rest is
    /// the unit. A value without any digit is kept whole as the magnitude.
    ///
    /// ```
    /// use logdrain::metric::MetricValue;
    ///
    /// assert_eq!(MetricValue::split("233092kB"), MetricValue::new("233092", "kB"));
    /// assert_eq!(MetricValue::split("0.315"), MetricValue::new("0.315", ""));
    /// assert_eq!(MetricValue::split("info"), MetricValue::new("info", ""));
    /// ```
    pub fn split(value: &str) -> Self {
        match value.rfind(|c: char| c.is_ascii_digit()) {
            // digits are single byte, so i + 1 is a char boundary
            Some(i) => MetricValue::new(&value[..=i], &value[i + 1..]),
            None => MetricValue::new(value, ""),
        }
    }
}

/// Normalized output of the processor, consumed once by a downstream encoder.
///
/// Router and sample kinds carry `metrics` only, scaling carries both
/// `metrics` and `events`, release carries `events` only.
#[derive(Clone, Debug, Serialize)]
pub struct MetricRecord {
    pub kind: MessageKind,
    pub app: Ustr,
    pub tags: Arc<Vec<String>>,
    pub prefix: Ustr,
    pub metrics: HashMap<String, MetricValue>,
    pub events: Vec<String>,
}

impl MetricRecord {
    /// Creates an empty record borrowing the shared context of `data`.
    pub fn new(kind: MessageKind, data: &LogData) -> Self {
        MetricRecord {
            kind,
            app: data.app,
            tags: Arc::clone(&data.tags),
            prefix: data.prefix,
            metrics: HashMap::with_capacity(5),
            events: Vec::new(),
        }
    }
}
