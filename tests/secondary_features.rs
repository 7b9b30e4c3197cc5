//! End-to-end checks over the public API: raw records in, feature reports out

use cortex_secondary::encoder::ReportEncoder;
use cortex_secondary::{
    coverage_of, ComputeError, CortexConfig, FeatureContext, FeatureOptions, FeatureOutput,
    FeatureRegistry, FeatureRequest, MemorySink, MemorySource, RecordAdapter, DATA_QUALITY,
    FRECHET,
};
use pretty_assertions::assert_eq;

const DAY: i64 = 86_400_000;

fn records() -> &'static str {
    r#"{"participant": "U1", "sensor": "lamp.accelerometer", "timestamp": 500, "x": 0.01, "y": 0.02, "z": 9.81}
{"participant": "U1", "sensor": "lamp.accelerometer", "timestamp": 2500, "x": 0.02, "y": 0.01, "z": 9.79}
{"participant": "U1", "sensor": "lamp.accelerometer", "timestamp": 4999, "x": 0.00, "y": 0.03, "z": 9.80}
{"participant": "U2", "sensor": "lamp.accelerometer", "timestamp": 1500, "x": 0.00, "y": 0.00, "z": 9.80}
{"participant": "U1", "sensor": "lamp.gps", "timestamp": 0, "latitude": 42.3601, "longitude": -71.0589}
{"participant": "U1", "sensor": "lamp.gps", "timestamp": 3600000, "latitude": 42.3611, "longitude": -71.0570}
{"participant": "U1", "sensor": "lamp.gps", "timestamp": 86400000, "latitude": 42.3601, "longitude": -71.0589}
{"participant": "U1", "sensor": "lamp.gps", "timestamp": 90000000, "latitude": 42.3611, "longitude": -71.0570}
"#
}

fn source() -> MemorySource {
    let records = RecordAdapter::parse_ndjson(records()).unwrap();
    assert!(RecordAdapter::validate_records(&records).is_empty());
    MemorySource::from_records(records).unwrap()
}

#[test]
fn data_quality_from_raw_records() {
    let source = source();
    let sink = MemorySink::new();
    let config = CortexConfig::default();
    let ctx = FeatureContext::new(&source, &sink, &config);
    let registry = FeatureRegistry::with_defaults();

    let output = registry
        .compute(
            DATA_QUALITY,
            &ctx,
            &FeatureRequest::new("U1", 0, 5000),
            &FeatureOptions::default().with_sensor("accelerometer"),
        )
        .unwrap();
    let value = output.scalar().unwrap();
    assert!((value - 0.6).abs() < 1e-12);

    // Other participants' samples never leak in
    let other = registry
        .compute(
            DATA_QUALITY,
            &ctx,
            &FeatureRequest::new("U2", 0, 5000),
            &FeatureOptions::default().with_sensor("accelerometer"),
        )
        .unwrap();
    assert!((other.scalar().unwrap() - 0.2).abs() < 1e-12);
    assert!(sink.is_empty());
}

#[test]
fn data_quality_unsupported_sensor_reports_notice() {
    let source = source();
    let sink = MemorySink::new();
    let config = CortexConfig::default();
    let ctx = FeatureContext::new(&source, &sink, &config);

    let output = FeatureRegistry::with_defaults()
        .compute(
            DATA_QUALITY,
            &ctx,
            &FeatureRequest::new("U1", 0, 5000),
            &FeatureOptions::default().with_sensor("bluetooth"),
        )
        .unwrap();

    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json, serde_json::json!({"timestamp": 0, "value": null}));
    assert_eq!(sink.entries().len(), 1);
}

#[test]
fn data_quality_invalid_bin_size() {
    let source = source();
    let sink = MemorySink::new();
    let config = CortexConfig::default();
    let ctx = FeatureContext::new(&source, &sink, &config);

    let result = FeatureRegistry::with_defaults().compute(
        DATA_QUALITY,
        &ctx,
        &FeatureRequest::new("U1", 0, 5000),
        &FeatureOptions::default()
            .with_sensor("gps")
            .with_bin_size(0),
    );
    assert!(matches!(result, Err(ComputeError::InvalidWindow { .. })));
}

#[test]
fn frechet_against_previous_day() {
    let source = source();
    let sink = MemorySink::new();
    let config = CortexConfig::default();
    let ctx = FeatureContext::new(&source, &sink, &config);

    let output = FeatureRegistry::with_defaults()
        .compute(
            FRECHET,
            &ctx,
            &FeatureRequest::new("U1", DAY, 2 * DAY),
            &FeatureOptions::default(),
        )
        .unwrap();

    // Same route on both days
    match output {
        FeatureOutput::Frechet(result) => {
            assert_eq!(result.timestamp, DAY);
            assert_eq!(result.frechet_distance, Some(0.0));
        }
        other => panic!("unexpected output {other:?}"),
    }
}

#[test]
fn report_wraps_output() {
    let source = source();
    let sink = MemorySink::new();
    let config = CortexConfig::default();
    let ctx = FeatureContext::new(&source, &sink, &config);
    let request = FeatureRequest::new("U1", 0, 3 * 600_000);

    let output = FeatureRegistry::with_defaults()
        .compute(
            DATA_QUALITY,
            &ctx,
            &request,
            &FeatureOptions::default().with_sensor("gps"),
        )
        .unwrap();

    let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
    let json = encoder.encode_to_json(DATA_QUALITY, &request, output).unwrap();
    let report: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(report["producer"]["instance_id"], "test-instance");
    assert_eq!(report["provenance"]["participant"], "U1");
    assert_eq!(report["provenance"]["window_end"], 1_800_000);
    let value = report["result"]["value"].as_f64().unwrap();
    assert!((value - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn empty_input_reports_zero_coverage() {
    let records = RecordAdapter::parse_ndjson("").unwrap();
    assert!(records.is_empty());
    let source = MemorySource::from_records(records).unwrap();
    let sink = MemorySink::new();
    let config = CortexConfig::default();
    let ctx = FeatureContext::new(&source, &sink, &config);
    let registry = FeatureRegistry::with_defaults();
    let request = FeatureRequest::new("U1", 0, 3000);

    let output = registry
        .compute(
            DATA_QUALITY,
            &ctx,
            &request,
            &FeatureOptions::default().with_sensor("accelerometer"),
        )
        .unwrap();
    let report = ReportEncoder::with_instance_id("test-instance".to_string())
        .encode(DATA_QUALITY, &request, output);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(
        json["result"],
        serde_json::json!({"timestamp": 0, "value": 0.0})
    );

    let frechet = registry
        .compute(FRECHET, &ctx, &request, &FeatureOptions::default())
        .unwrap();
    assert_eq!(frechet.scalar(), None);
}

#[test]
fn coverage_properties() {
    assert_eq!(coverage_of(&[], 0, 3000, 1000).unwrap(), 0.0);
    assert_eq!(coverage_of(&[0, 1000, 2000], 0, 3000, 1000).unwrap(), 1.0);
    assert!(matches!(
        coverage_of(&[0], 0, 3000, 0),
        Err(ComputeError::InvalidWindow { .. })
    ));

    let timestamps: Vec<i64> = (0..1000).map(|k| (k * 37_411) % 86_400_000).collect();
    let value = coverage_of(&timestamps, 0, 86_400_000, 60_000).unwrap();
    assert!((0.0..=1.0).contains(&value));
    assert_eq!(value, coverage_of(&timestamps, 0, 86_400_000, 60_000).unwrap());
}
