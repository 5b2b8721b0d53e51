// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use logdrain::metric::MetricValue;
use logdrain::processor::{BatchContext, LogProcessor};

fn process_lines(c: &mut Criterion) {
    let ctx = BatchContext::new("bench", vec!["env:bench".to_string()], "heroku.");
    let lines = vec![
        ("router", r#"255 <158>1 2015-04-02T11:52:34.520012+00:00 host heroku router - at=info method=POST path="/users" host=myapp.com fwd="24.76.242.18" dyno=web.1 connect=1ms service=37ms status=201 bytes=828"#),
        ("dyno_sample", "229 <45>1 2015-04-02T11:48:16.839257+00:00 host heroku web.1 - source=web.1 dyno=heroku.35930502.b9de5fce sample#load_avg_1m=0.01 sample#load_avg_5m=0.02"),
        ("scaling", "222 <134>1 2017-05-13T15:35:33.787162+00:00 host app api - Scaled to mailer@3:Performance-L web@5:Standard-2X by user someuser@gmail.com"),
        ("unroutable", "222 <134>1 2017-05-13T15:35:33.787162+00:00 host app web.1 - GET /health 200"),
    ];

    let mut group = c.benchmark_group("process");
    for (name, line) in lines {
        let data = ctx.log_data(line);
        group.bench_function(name, |b| {
            b.iter(|| LogProcessor::process(black_box(&data)))
        });
    }
    group.finish();
}

fn split_values(c: &mut Criterion) {
    c.bench_function("split", |b| {
        b.iter(|| {
            for value in ["233092kB", "1ms", "0.315", "info", "176289040bytes"] {
                black_box(MetricValue::split(black_box(value)));
            }
        })
    });
}

criterion_group!(benches, process_lines, split_values);
criterion_main!(benches);
