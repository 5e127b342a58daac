use phplot::chart::*;
use phplot::data::classify::classify;
use phplot::data::{NormalizedDataset, RawRow, TimeKind};

fn dataset(kind: TimeKind, values: &[f64]) -> NormalizedDataset {
    NormalizedDataset {
        time_column: if kind == TimeKind::Timestamp { "pc_time" } else { "samp_num" }.to_string(),
        time_kind: kind,
        value_columns: vec!["pH_free".to_string()],
        has_sample_index: false,
        rows: values
            .iter()
            .enumerate()
            .map(|(i, v)| RawRow {
                time: Some(i as f64),
                sample_index: None,
                values: vec![Some(*v)],
            })
            .collect(),
    }
}

#[test]
fn chart_has_three_series_with_fixed_roles() {
    let ds = dataset(TimeKind::Timestamp, &[7.0, 7.1, 7.0, 7.2, 7.1, 7.05, 14.0]);
    let c = classify(&ds, "pH_free").unwrap();
    let chart = build_chart(&ds, "pH_free", &c);

    assert_eq!(chart.title, "pH_free vs pc_time");
    assert_eq!(chart.series.len(), 3);
    let normal = chart.series_by_role(SeriesRole::Normal).unwrap();
    assert_eq!(normal.name, "pH_free");
    assert_eq!(normal.mode, DrawMode::LinesAndMarkers);

    let out = chart.series_by_role(SeriesRole::Outliers).unwrap();
    assert_eq!(out.name, OUTLIER_SERIES_NAME);
    assert_eq!(out.points.len(), 1);
    assert_eq!(out.marker.unwrap().symbol, MarkerSymbol::Cross);

    let aux = chart.series_by_role(SeriesRole::Auxiliary).unwrap();
    assert_eq!(aux.name, AUXILIARY_SERIES_NAME);
    assert_eq!(aux.y_axis, YAxisSide::Secondary);
    assert_eq!(aux.line.unwrap().dash, LineDash::Dotted);
    assert!(chart.y2_axis.is_some());
    assert_eq!(chart.legend, LegendPlacement::TopRightHorizontal);
    assert_eq!(chart.transition_ms, TRANSITION_MS);
}

#[test]
fn outlier_series_is_present_even_when_empty() {
    let ds = dataset(TimeKind::Timestamp, &[7.0, 7.0, 7.0]);
    let c = classify(&ds, "pH_free").unwrap();
    let chart = build_chart(&ds, "pH_free", &c);
    let out = chart.series_by_role(SeriesRole::Outliers).unwrap();
    assert!(out.points.is_empty());
    assert!(!chart.is_placeholder());
}

#[test]
fn x_axis_format_follows_time_kind() {
    let ds = dataset(TimeKind::Timestamp, &[7.0]);
    let chart = build_chart(&ds, "pH_free", &classify(&ds, "pH_free").unwrap());
    assert!(matches!(chart.x_axis.format, AxisFormat::DateTime { tick_angle: 45, .. }));
    assert_eq!(chart.x_axis.scale, AxisScale::Date);

    let ds = dataset(TimeKind::Ordinal, &[7.0]);
    let chart = build_chart(&ds, "pH_free", &classify(&ds, "pH_free").unwrap());
    assert_eq!(chart.x_axis.format, AxisFormat::Numeric);
    assert_eq!(chart.x_axis.title.as_deref(), Some("samp_num"));
    assert!(chart.x_axis.autorange);
}

#[test]
fn column_not_found_placeholder_names_the_metric() {
    let chart = ChartDescription::column_not_found("ph_x");
    assert!(chart.is_placeholder());
    assert_eq!(chart.title, "Error: Selected column 'ph_x' not found");
    assert_eq!(chart.x_axis.title.as_deref(), Some("Time"));
    assert_eq!(chart.y_axis.title.as_deref(), Some("pH"));
}

#[test]
fn chart_serializes_to_json() {
    let ds = dataset(TimeKind::Ordinal, &[7.0, 7.1]);
    let chart = build_chart(&ds, "pH_free", &classify(&ds, "pH_free").unwrap());
    let v = serde_json::to_value(&chart).unwrap();
    assert_eq!(v["title"], "pH_free vs samp_num");
    assert_eq!(v["series"].as_array().unwrap().len(), 3);
}
