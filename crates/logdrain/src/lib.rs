// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Turns platform log-drain lines (router, dyno, database add-ons, API events)
//! into normalized metric records for a downstream metrics encoder.
//!
//! ```text
//!   raw line ──> classifier ──> logfmt decoder / scaling / release ──> MetricRecord
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod classifier;
pub mod config;
pub mod errors;
pub mod logfmt;
pub mod metric;
pub mod processor;
pub mod transform;
