// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Routes a syslog framed drain line to the subsystem that produced it.
//!
//! A drain line looks like
//!
//! ```text
//! 255 <158>1 2015-04-02T11:52:34.520012+00:00 host heroku router - at=info ...
//! ```
//!
//! The header before `" - "` is whitespace separated; its fourth to sixth
//! tokens are host, app name and process id. The part after the first
//! `" - "` is the message body.

use crate::metric::MessageKind;

const HEADER_DELIMITER: &str = " - ";
const MIN_HEADER_TOKENS: usize = 6;

/// Returns the kind of a line and its message body, or `None` for lines that
/// carry nothing this drain understands.
pub fn classify(line: &str) -> Option<(MessageKind, &str)> {
    let mut parts = line.split(HEADER_DELIMITER);
    let header = parts.next()?;
    let body = parts.next()?;

    let headers: Vec<&str> = header.split_whitespace().collect();
    if headers.len() < MIN_HEADER_TOKENS {
        return None;
    }
    let (app_name, proc_id) = (headers[4], headers[5]);
    tracing::trace!(host = headers[3], app_name, proc_id, "Line headers");

    let kind = match (app_name, proc_id) {
        ("heroku", "router") => MessageKind::Router,
        ("heroku", _) => MessageKind::DynoSample,
        ("app", "api") if body.starts_with("Release") => MessageKind::Release,
        ("app", "api") => MessageKind::Scaling,
        ("app", "heroku-postgres") => MessageKind::PgSample,
        ("app", "heroku-redis") => MessageKind::RedisSample,
        _ => return None,
    };
    Some((kind, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "222 <134>1 2015-04-07T16:01:43.517062+00:00 host";

    fn line(app_name: &str, proc_id: &str, body: &str) -> String {
        format!("{PREFIX} {app_name} {proc_id} - {body}")
    }

    #[test]
    fn test_classify_routes() {
        let cases = [
            ("heroku", "router", "at=info", MessageKind::Router),
            ("heroku", "web.1", "source=web.1", MessageKind::DynoSample),
            ("heroku", "api", "this_is=1", MessageKind::DynoSample),
            ("app", "api", "Release v138 created", MessageKind::Release),
            ("app", "api", "Scaled to web@1:Free", MessageKind::Scaling),
            ("app", "heroku-postgres", "addon=foo", MessageKind::PgSample),
            ("app", "heroku-redis", "addon=foo", MessageKind::RedisSample),
        ];
        for (app_name, proc_id, body, kind) in cases {
            let l = line(app_name, proc_id, body);
            assert_eq!(classify(&l), Some((kind, body)), "{l}");
        }
    }

    #[test]
    fn test_classify_unknown_routes() {
        assert_eq!(classify(&line("app", "web.1", "hello")), None);
        assert_eq!(classify(&line("myapp", "router", "at=info")), None);
        assert_eq!(classify(&line("app", "heroku-kafka", "a=1")), None);
    }

    #[test]
    fn test_classify_requires_delimiter() {
        assert_eq!(classify(&format!("{PREFIX} heroku router at=info")), None);
        assert_eq!(classify(&format!("{PREFIX} heroku router -at=info")), None);
    }

    #[test]
    fn test_classify_requires_six_header_tokens() {
        assert_eq!(classify("<134>1 2015-04-07 host heroku - at=info"), None);
        assert_eq!(classify(" - at=info"), None);
    }

    #[test]
    fn test_classify_trims_and_collapses_header_whitespace() {
        let l = "\t\t255  <158>1 2015-04-02T11:52:34+00:00   host heroku router - at=info";
        assert_eq!(classify(l), Some((MessageKind::Router, "at=info")));
    }

    #[test]
    fn test_classify_body_stops_at_next_delimiter() {
        let l = line("heroku", "router", "at=info - trailing");
        assert_eq!(classify(&l), Some((MessageKind::Router, "at=info")));
    }

    #[test]
    fn test_classify_release_prefix_is_case_sensitive() {
        let l = line("app", "api", "release v1");
        assert_eq!(classify(&l), Some((MessageKind::Scaling, "release v1")));
    }
}
