// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Kind specific conversion of a message body into a [`MetricRecord`].

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::errors::ParseError;
use crate::logfmt::{self, Handler};
use crate::metric::{LogData, MessageKind, MetricRecord, MetricValue};

const SOURCE_KEY: &str = "source";
const DYNO_KEY: &str = "dyno";
const DYNO_TYPE_TAG_PREFIX: &str = "dynotype:";

lazy_static! {
    static ref DYNO_NUMBER_REGEX: Regex =
        Regex::new(r"\.[0-9]+$").expect("failed creating regex");
    static ref SCALING_REGEX: Regex =
        Regex::new(r"Scaled to (.*) by user .*").expect("failed creating regex");
    static ref SCALED_DYNO_REGEX: Regex =
        Regex::new(r"([^@ ]*)@([^: ]*):([^ ]*)").expect("failed creating regex");
}

impl Handler for MetricRecord {
    fn handle_logfmt(&mut self, key: &str, val: &str) {
        let value = MetricValue::split(val);
        debug!(
            key,
            val = value.magnitude.as_str(),
            unit = value.unit.as_str(),
            "Decoded metric value"
        );
        self.metrics.insert(key.to_string(), value);
    }
}

/// Builds the record for a classified line.
pub fn transform(
    kind: MessageKind,
    data: &LogData,
    body: &str,
) -> Result<MetricRecord, ParseError> {
    match kind {
        MessageKind::Release => Ok(release(data, body)),
        MessageKind::Scaling => parse_scaling_message(data, body),
        MessageKind::Router
        | MessageKind::DynoSample
        | MessageKind::PgSample
        | MessageKind::RedisSample => parse_metrics(kind, data, body),
    }
}

/// Decodes a `key=value` body, splitting every value into magnitude and unit.
/// Later duplicates of a key replace earlier ones.
pub fn parse_metrics(
    kind: MessageKind,
    data: &LogData,
    body: &str,
) -> Result<MetricRecord, ParseError> {
    let mut record = MetricRecord::new(kind, data);
    logfmt::decode(body, &mut record)?;

    if kind == MessageKind::DynoSample {
        rename_dyno_source(&mut record);
    }
    Ok(record)
}

/// Replaces `source` with `dyno` and tags the record with the dyno type,
/// e.g. `source=web.1` becomes `dyno=web.1` and `dynotype:web`.
///
/// The shared tag list is copied before the tag is added.
fn rename_dyno_source(record: &mut MetricRecord) {
    let Some(source) = record.metrics.remove(SOURCE_KEY) else {
        return;
    };
    let dyno_type = DYNO_NUMBER_REGEX.replace(&source.magnitude, "");

    let mut tags = Vec::with_capacity(record.tags.len() + 1);
    tags.extend(record.tags.iter().cloned());
    tags.push(format!("{DYNO_TYPE_TAG_PREFIX}{dyno_type}"));
    record.tags = Arc::new(tags);

    record.metrics.insert(DYNO_KEY.to_string(), source);
}

/// Parses `Scaled to <name>@<count>:<type> ... by user <who>` into one metric
/// per dyno formation, keeping the raw message as the record's event.
pub fn parse_scaling_message(data: &LogData, message: &str) -> Result<MetricRecord, ParseError> {
    let scaling_info = SCALING_REGEX
        .captures(message)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| ParseError::ScalingNotMatched(message.to_string()))?;

    let mut record = MetricRecord::new(MessageKind::Scaling, data);
    for dyno_info in SCALED_DYNO_REGEX.captures_iter(scaling_info.as_str()) {
        let (_, [dyno_name, count, dyno_type]) = dyno_info.extract();
        debug!(dyno_name, count, dyno_type, "Scaled dyno");
        record
            .metrics
            .insert(dyno_name.to_string(), MetricValue::new(count, dyno_type));
    }
    record.events.push(message.to_string());
    Ok(record)
}

/// Release messages are forwarded verbatim as an event.
pub fn release(data: &LogData, message: &str) -> MetricRecord {
    let mut record = MetricRecord::new(MessageKind::Release, data);
    record.events.push(message.to_string());
    record
}
