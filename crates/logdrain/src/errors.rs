// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Error for a single log line that could not be turned into a metric record
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParseError {
    #[error("unterminated quoted value")]
    UnterminatedString,
    #[error("invalid escape sequence in quoted value: {0}")]
    InvalidEscape(String),
    #[error("Scaling message not matched: {0}")]
    ScalingNotMatched(String),
}

/// Error building the drain configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}
