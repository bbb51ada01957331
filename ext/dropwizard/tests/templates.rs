//! Registry keys decomposed by templates.

use segmatch::{FieldValue, Metric};
use segmatch_dropwizard::DropwizardParser;
use std::collections::BTreeMap;

const SAMPLE: &str = r#"{
    "version": "3.0.0",
    "counters": {},
    "meters": {},
    "gauges": {
        "vm.memory.heap.committed": { "value": 1 },
        "vm.memory.heap.init": { "value": 2 },
        "vm.memory.heap.max": { "value": 3 },
        "vm.memory.heap.usage": { "value": 4 },
        "vm.memory.heap.used": { "value": 5 },
        "vm.memory.non-heap.committed": { "value": 6 },
        "vm.memory.non-heap.init": { "value": 7 },
        "vm.memory.non-heap.max": { "value": 8 },
        "vm.memory.non-heap.usage": { "value": 9 },
        "vm.memory.non-heap.used": { "value": 10 }
    },
    "histograms": {
        "jenkins.job.building.duration": {
            "count": 1, "max": 2, "mean": 3, "min": 4, "p50": 5, "p75": 6,
            "p95": 7, "p98": 8, "p99": 9, "p999": 10, "stddev": 11
        }
    },
    "timers": {}
}"#;

fn parse() -> Vec<Metric> {
    DropwizardParser::new(
        "_",
        [
            "jenkins.* measurement.metric.metric.field",
            "vm.* measurement.measurement.pool.field",
        ],
    )
    .unwrap()
    .parse(SAMPLE.as_bytes())
    .unwrap()
}

fn find<'a>(metrics: &'a [Metric], name: &str, pool: Option<&str>, field: &str) -> &'a Metric {
    metrics
        .iter()
        .find(|m| {
            m.name == name
                && pool.map_or(true, |p| m.tag("pool") == Some(p))
                && m.field(field).is_some()
        })
        .unwrap_or_else(|| panic!("no {name} metric with field {field}"))
}

fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

#[test]
fn one_metric_per_key() {
    assert_eq!(parse().len(), 11);
}

#[test]
fn field_prefix_from_template() {
    let metrics = parse();
    let jenkins = find(&metrics, "jenkins", None, "duration_count");

    let expected: BTreeMap<String, FieldValue> = [
        "count", "max", "mean", "min", "p50", "p75", "p95", "p98", "p99", "p999", "stddev",
    ]
    .iter()
    .zip(1_i32..)
    .map(|(name, v)| (format!("duration_{name}"), FieldValue::Float(f64::from(v))))
    .collect();
    assert_eq!(jenkins.fields, expected);
    assert_eq!(
        jenkins.tags,
        tags(&[("metric_type", "histogram"), ("metric", "job_building")])
    );
}

#[test]
fn pools_split_into_tags() {
    let metrics = parse();

    let heap = find(&metrics, "vm_memory", Some("heap"), "committed_value");
    assert_eq!(heap.fields.len(), 1);
    assert_eq!(heap.field("committed_value"), Some(&FieldValue::Float(1.0)));
    assert_eq!(heap.tags, tags(&[("metric_type", "gauge"), ("pool", "heap")]));

    let non_heap = find(&metrics, "vm_memory", Some("non-heap"), "committed_value");
    assert_eq!(non_heap.field("committed_value"), Some(&FieldValue::Float(6.0)));
}
