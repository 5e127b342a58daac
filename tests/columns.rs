use phplot::data::columns::*;

fn hdr(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| c.to_string()).collect()
}

#[test]
fn primary_time_column_wins_over_everything() {
    let h = hdr(&["samp_num", "ph_time", "pc_time", "pH_free"]);
    let t = resolve_time_column(&h).unwrap();
    assert_eq!(t.name, "pc_time");
    assert_eq!(t.index, 2);
    assert_eq!(t.rule, TimeRule::PrimaryTimestamp);
}

#[test]
fn time_rules_fall_through_in_order() {
    let t = resolve_time_column(&hdr(&["samp_num", "ph_time", "ph_total"])).unwrap();
    assert_eq!(t.rule, TimeRule::SecondaryTimestamp);

    let t = resolve_time_column(&hdr(&["ph_total", "samp_num"])).unwrap();
    assert_eq!(t.rule, TimeRule::SampleIndex);
    assert_eq!(t.parse, TimeParse::Ordinal);

    let t = resolve_time_column(&hdr(&["when", "ph_total"])).unwrap();
    assert_eq!(t.rule, TimeRule::FirstColumn);
    assert_eq!(t.name, "when");
    assert_eq!(t.parse, TimeParse::Auto);

    assert!(resolve_time_column(&[]).is_none());
}

#[test]
fn demotion_only_applies_to_time_like_names() {
    let h = hdr(&["pc_time", "samp_num", "pH_free"]);
    let chosen = resolve_time_column(&h).unwrap();
    let d = demotion_target(&chosen, &h).unwrap();
    assert_eq!(d.name, "samp_num");
    assert_eq!(d.rule, TimeRule::SampleIndex);

    // first column fallback when there is no counter
    let h = hdr(&["row", "pc_time", "pH_free"]);
    let chosen = resolve_time_column(&h).unwrap();
    let d = demotion_target(&chosen, &h).unwrap();
    assert_eq!(d.name, "row");
    assert_eq!(d.rule, TimeRule::FirstColumn);

    // a non-temporal first column is never demoted
    let h = hdr(&["label", "pH"]);
    let chosen = resolve_time_column(&h).unwrap();
    assert!(demotion_target(&chosen, &h).is_none());
}

#[test]
fn known_pair_preferred_over_ph_token_columns() {
    let cols = resolve_value_columns(&hdr(&["pc_time", "ph_total", "phase", "pH_free"]));
    assert_eq!(cols, vec!["pH_free".to_string(), "ph_total".to_string()]);
}

#[test]
fn ph_token_fallback_skips_time_columns() {
    let cols = resolve_value_columns(&hdr(&["ph_time", "PH_sensor", "temp", "alpha_ph"]));
    assert_eq!(cols, vec!["PH_sensor".to_string(), "alpha_ph".to_string()]);

    assert!(resolve_value_columns(&hdr(&["pc_time", "temp"])).is_empty());
}

#[test]
fn default_metric_prefers_total_then_free_then_first() {
    assert_eq!(default_metric(&hdr(&["pH_free", "ph_total"])), Some("ph_total"));
    assert_eq!(default_metric(&hdr(&["pH_sensor", "pH_free"])), Some("pH_free"));
    assert_eq!(default_metric(&hdr(&["pH_sensor", "ph2"])), Some("pH_sensor"));
    assert_eq!(default_metric(&[]), None);
}
