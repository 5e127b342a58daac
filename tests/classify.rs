use phplot::data::classify::{classify, quantile, IqrFence};
use phplot::data::{NormalizedDataset, RawRow, TimeKind};

fn dataset(values: &[Option<f64>], samples: Option<&[Option<f64>]>) -> NormalizedDataset {
    let rows = values
        .iter()
        .enumerate()
        .map(|(i, v)| RawRow {
            time: Some(i as f64 * 10.0),
            sample_index: samples.and_then(|s| s[i]),
            values: vec![*v],
        })
        .collect();
    NormalizedDataset {
        time_column: "pc_time".to_string(),
        time_kind: TimeKind::Timestamp,
        value_columns: vec!["ph_total".to_string()],
        has_sample_index: samples.is_some(),
        rows,
    }
}

fn ys(points: &[phplot::data::SeriesPoint]) -> Vec<f64> {
    points.iter().map(|p| p.y).collect()
}

#[test]
fn quantile_interpolates_linearly() {
    let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
    assert_eq!(quantile(&sorted, 0.0), Some(1.0));
    assert_eq!(quantile(&sorted, 0.5), Some(3.0));
    assert_eq!(quantile(&sorted, 1.0), Some(5.0));
    assert_eq!(quantile(&[2.5], 0.75), Some(2.5));
}

#[test]
fn fence_bounds_are_inclusive() {
    let f = IqrFence::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    assert_eq!((f.q1, f.q3), (2.0, 4.0));
    assert_eq!((f.lower, f.upper), (-1.0, 7.0));
    assert!(f.contains(7.0));
    assert!(!f.contains(7.0001));
    assert!(IqrFence::from_values(&[]).is_none());
}

#[test]
fn extreme_value_is_flagged_as_outlier() {
    let mut v: Vec<Option<f64>> = (0..10).map(|i| Some(7.0 + i as f64 * 0.01)).collect();
    v.push(Some(12.0));
    let c = classify(&dataset(&v, None), "ph_total").unwrap();
    assert_eq!(c.normal.len(), 10);
    assert_eq!(ys(&c.outliers), vec![12.0]);
    assert_eq!(c.outliers[0].x, Some(100.0));
}

#[test]
fn normal_and_outliers_partition_non_null_values() {
    let v = [Some(7.0), None, Some(7.1), Some(7.2), Some(1.0), Some(7.05), Some(7.15), None, Some(7.12)];
    let ds = dataset(&v, None);
    let c = classify(&ds, "ph_total").unwrap();
    assert_eq!(ds.non_null_count("ph_total"), 7);
    assert_eq!(c.normal.len() + c.outliers.len(), ds.non_null_count("ph_total"));
    assert_eq!(ys(&c.outliers), vec![1.0]);
    // auxiliary covers every row, nulls included
    assert_eq!(c.auxiliary.len(), v.len());
}

#[test]
fn too_few_inliers_disables_outlier_detection() {
    let v = [Some(7.0), Some(7.1), Some(7.2), Some(20.0)];
    let c = classify(&dataset(&v, None), "ph_total").unwrap();
    assert_eq!(c.normal.len(), 4);
    assert!(c.outliers.is_empty());
}

#[test]
fn all_identical_values_are_normal() {
    let v = vec![Some(7.0); 8];
    let c = classify(&dataset(&v, None), "ph_total").unwrap();
    assert_eq!(c.normal.len(), 8);
    assert!(c.outliers.is_empty());
}

#[test]
fn empty_and_all_null_metrics_give_empty_series() {
    let c = classify(&dataset(&[], None), "ph_total").unwrap();
    assert!(c.normal.is_empty() && c.outliers.is_empty() && c.auxiliary.is_empty());
    assert!(c.fence.is_none());

    let c = classify(&dataset(&[None, None], None), "ph_total").unwrap();
    assert!(c.normal.is_empty());
    assert_eq!(c.auxiliary.len(), 2);
}

#[test]
fn auxiliary_uses_sample_index_with_ordinal_fallback() {
    let v = [Some(7.0), Some(7.1), Some(7.2)];
    let c = classify(&dataset(&v, Some(&[Some(100.0), None, Some(102.0)][..])), "ph_total").unwrap();
    assert_eq!(ys(&c.auxiliary), vec![100.0, 1.0, 102.0]);

    let c = classify(&dataset(&v, None), "ph_total").unwrap();
    assert_eq!(ys(&c.auxiliary), vec![0.0, 1.0, 2.0]);
}

#[test]
fn unknown_metric_is_none() {
    let ds = dataset(&[Some(7.0)], None);
    assert!(classify(&ds, "pH_free").is_none());
    assert_eq!(ds.non_null_count("pH_free"), 0);
}
