//! Bucket templates through the full StatsD line path.

use segmatch::FieldValue;
use segmatch_statsd::{MetricKind, SampleValue, StatsdParser};

fn parser(templates: &[&str]) -> StatsdParser {
    StatsdParser::new("_", templates, false).unwrap()
}

#[test]
fn template_tags_and_measurement() {
    let p = parser(&["measurement.measurement.host.service"]);
    let samples = p.parse_line("cpu.idle.localhost:1|c").unwrap();

    assert_eq!(samples[0].name, "cpu_idle");
    assert_eq!(samples[0].tags["host"], "localhost");
    assert!(!samples[0].tags.contains_key("service"));
}

#[test]
fn unmatched_bucket_uses_default_template() {
    let p = parser(&["cpu.idle.* measurement.measurement.host"]);
    let samples = p.parse_line("mem.free.web01:1|g").unwrap();
    assert_eq!(samples[0].name, "mem_free_web01");
}

#[test]
fn bucket_tags_with_template() {
    let p = parser(&["measurement.measurement.region"]);
    let samples = p
        .parse_line("cpu.idle.west,host=localhost,region=east:1|c")
        .unwrap();

    assert_eq!(samples[0].name, "cpu_idle");
    assert_eq!(samples[0].tags["host"], "localhost");
    assert_eq!(samples[0].tags["region"], "west");
}

#[test]
fn fields_become_metric_fields() {
    let p = parser(&["* measurement.measurement.field"]);
    let (samples, errors) = p.parse("my.counter.f1:1|c\nmy.gauge.f2:10.1|g\nmy.set.f1:a|s\n");
    assert!(errors.is_empty());

    let metrics: Vec<_> = samples.iter().map(|s| s.to_metric()).collect();
    assert_eq!(metrics[0].name, "my_counter");
    assert_eq!(metrics[0].field("f1"), Some(&FieldValue::Int(1)));
    assert_eq!(metrics[1].field("f2"), Some(&FieldValue::Float(10.1)));
    assert_eq!(metrics[2].field("f1"), Some(&FieldValue::String("a".into())));
    assert_eq!(metrics[2].tag("metric_type"), Some("set"));
}

#[test]
fn datadog_tags_override_bucket_tags() {
    let p = parser(&[]).with_datadog_tags(true);
    let samples = p
        .parse_line("my_timer,host=a:3|ms|@0.1|#host:b")
        .unwrap();

    assert_eq!(samples[0].kind, MetricKind::Timing);
    assert_eq!(samples[0].value, SampleValue::Float(3.0));
    assert_eq!(samples[0].tags["host"], "b");
}
