use proptest::prelude::*;
use roster_map::{Classifier, KnowledgeBase, MappingStore, Rule};
use roster_model::{CellValue, Column, Confidence, FieldKind, MatchType};

fn classifier() -> Classifier {
    Classifier::default()
}

#[test]
fn perfect_identifier_column_short_circuits() {
    let store = KnowledgeBase::new();
    let columns = vec![
        Column::new("NPI", vec!["1234567890", "9876543210"]),
        Column::new("Phone", vec!["5551234567890"]),
    ];
    let result = classifier().detect_npi(&columns, &store);

    assert_eq!(result.column_name(), Some("NPI"));
    let detection = result.detection.unwrap();
    assert_eq!(detection.match_type, MatchType::ValuePattern);
    assert_eq!(result.mutations.len(), 1);
    assert_eq!(result.mutations[0].normalized_name, "npi");
    assert_eq!(result.mutations[0].confidence, Confidence::new(6.0));
}

#[test]
fn identifier_confidence_is_clamped() {
    let classifier = classifier();
    assert_eq!(
        classifier
            .npi_confidence(&Column::new("NPI Number", vec!["1234567890"]))
            .value(),
        100.0
    );
    assert_eq!(
        classifier
            .npi_confidence(&Column::new("Foo", vec!["abc"]))
            .value(),
        0.0
    );
}

#[test]
fn spreadsheet_floats_score_as_identifiers() {
    let store = KnowledgeBase::new();
    let columns = vec![
        Column::new("Provider", vec![CellValue::Float(1417469156.0)]),
        Column::new("Count", vec![CellValue::Integer(12)]),
    ];
    let result = classifier().detect_npi(&columns, &store);
    assert_eq!(result.column_name(), Some("Provider"));
}

#[test]
fn gender_detected_from_values_alone() {
    let store = KnowledgeBase::new();
    let columns = vec![Column::new("Col3", vec!["M", "F", "M"])];
    let result = classifier().detect(FieldKind::Gender, &columns, &store);

    let detection = result.detection.unwrap();
    assert_eq!(detection.column_name, "Col3");
    assert_eq!(detection.match_type, MatchType::ValuePattern);
    assert_eq!(detection.confidence, Some(Confidence::new(100.0)));
}

#[test]
fn earlier_column_wins_before_later_exact_header() {
    let store = KnowledgeBase::new();
    let columns = vec![
        Column::new("Region", vec!["CA", "NY", "TX"]),
        Column::new("State", vec!["x", "y"]),
    ];
    let result = classifier().detect(FieldKind::State, &columns, &store);
    assert_eq!(result.column_name(), Some("Region"));
}

#[test]
fn state_abbreviation_header_matches_pattern() {
    let store = KnowledgeBase::new();
    let columns = vec![
        Column::new("First Name", vec!["Ana"]),
        Column::new("Provider St.", vec!["n/a"]),
    ];
    let detection = classifier()
        .detect(FieldKind::State, &columns, &store)
        .detection
        .unwrap();
    assert_eq!(detection.column_name, "Provider St.");
    assert_eq!(detection.match_type, MatchType::PartialHeader);
}

#[test]
fn knowledge_base_precedes_patterns() {
    let mut store = KnowledgeBase::new();
    store.add(
        FieldKind::Npi,
        "PROV_NPI",
        Confidence::new(80.0),
        MatchType::ValuePattern,
    );
    let columns = vec![Column::header_only("PROV_NPI")];
    let result = classifier().detect_npi(&columns, &store);

    assert_eq!(result.column_name(), Some("PROV_NPI"));
    let detection = result.detection.unwrap();
    assert_eq!(detection.match_type, MatchType::KnowledgeBase);
    assert_eq!(detection.confidence, Some(Confidence::new(80.0)));
    assert!(result.mutations.is_empty());
}

#[test]
fn known_identifier_is_not_learned_twice() {
    let mut store = KnowledgeBase::new();
    let columns = vec![Column::new("Provider", vec!["1234567890"])];
    let classifier = classifier();

    let first = classifier.detect_npi(&columns, &store);
    store.apply_all(&first.mutations);
    assert_eq!(store.entries(FieldKind::Npi).len(), 1);

    let second = classifier.detect_npi(&columns, &store);
    assert_eq!(
        second.detection.unwrap().match_type,
        MatchType::KnowledgeBase
    );
    assert!(second.mutations.is_empty());
}

#[test]
fn non_identifier_detectors_never_write() {
    let store = KnowledgeBase::new();
    let columns = vec![Column::new("Sex", vec!["F"])];
    let result = classifier().detect(FieldKind::Gender, &columns, &store);
    assert!(result.detection.is_some());
    assert!(result.mutations.is_empty());
}

#[test]
fn missing_values_lower_the_ratio() {
    let store = KnowledgeBase::new();
    let columns = vec![Column::new(
        "Col",
        vec![
            CellValue::from("M"),
            CellValue::Missing,
            CellValue::Missing,
        ],
    )];
    let result = classifier().detect(FieldKind::Gender, &columns, &store);
    assert!(result.detection.is_none());
}

/// Column named `name` with `hits` copies of `hit` followed by misses, `total` values in all.
fn ratio_column(name: &str, hit: &str, hits: usize, total: usize) -> Column {
    let values: Vec<&str> = (0..total)
        .map(|index| if index < hits { hit } else { "zzz" })
        .collect();
    Column::new(name, values)
}

#[test]
fn value_thresholds_accept_at_boundary_and_reject_below() {
    let store = KnowledgeBase::new();
    // (field, matching value, (hits, total) just below, (hits, total) at threshold)
    let cases = [
        (FieldKind::Gender, "F", (2, 5), (1, 2)),
        (FieldKind::ProfessionalSuffix, "MD", (1, 5), (2, 5)),
        (FieldKind::Headshot, "https://cdn.test/a.png", (2, 5), (1, 2)),
        (FieldKind::AdditionalLanguages, "Spanish", (1, 5), (2, 5)),
        (FieldKind::State, "TX", (2, 5), (1, 2)),
        (FieldKind::PracticeCloudId, "PT_100", (2, 5), (1, 2)),
        (FieldKind::PatientsAccepted, "Adults", (1, 5), (2, 5)),
    ];
    for (field, hit, (below_hits, below_total), (at_hits, at_total)) in cases {
        let below = ratio_column("Q1", hit, below_hits, below_total);
        let at = ratio_column("Q2", hit, at_hits, at_total);

        let result = classifier().detect(field, std::slice::from_ref(&below), &store);
        assert_eq!(result.column_name(), None, "{field} below threshold");

        let result = classifier().detect(field, &[below, at], &store);
        let detection = result
            .detection
            .unwrap_or_else(|| panic!("{field} at threshold"));
        assert_eq!(detection.column_name, "Q2", "{field}");
        assert_eq!(detection.match_type, MatchType::ValuePattern, "{field}");
        assert_eq!(
            detection.confidence,
            Some(Confidence::new(at_hits as f64 / at_total as f64 * 100.0)),
            "{field}"
        );
    }
}

#[test]
fn postal_codes_alone_do_not_make_a_zip_column() {
    let store = KnowledgeBase::new();
    let classifier = classifier();
    let columns = vec![Column::new("Q1", vec!["02139", "10001", "94105"])];
    assert_eq!(
        classifier
            .detect(FieldKind::Zip, &columns, &store)
            .column_name(),
        None
    );

    let rules = classifier.rules_for(FieldKind::Zip).expect("zip rules");
    assert!(
        !rules
            .rules()
            .iter()
            .any(|rule| matches!(rule, Rule::ValuePattern { .. }))
    );
    assert!(classifier.rules_for(FieldKind::Npi).is_none());
}

#[test]
fn report_records_group_fields_per_column() {
    let store = KnowledgeBase::new();
    let columns = vec![
        Column::new("NPI", vec!["1234567890", "9876543210"]),
        Column::new("Credentials", vec!["MD", "DO"]),
    ];
    let report = classifier().detect_all(&columns, &store);

    assert!(!report.unmatched_fields().contains(&FieldKind::Npi));
    assert!(report.unmatched_fields().contains(&FieldKind::City));
    assert_eq!(report.mutations.len(), 1);

    let json = serde_json::to_string(&report.mapping_records()).unwrap();
    insta::assert_snapshot!(json, @r#"[{"columnName":"NPI","detectedAs":"npi"},{"columnName":"Credentials","detectedAs":["professionalSuffix","state"]}]"#);
}

#[test]
fn ranking_keeps_order_of_equal_columns() {
    let store = KnowledgeBase::new();
    let columns = vec![
        Column::new("Alpha", vec!["abc"]),
        Column::new("Beta", vec!["xyz"]),
    ];
    let ranked = classifier().rank(&columns, &store);
    let names: Vec<&str> = ranked.iter().map(|column| column.name.as_str()).collect();
    assert_eq!(names, ["Alpha", "Beta"]);
    assert!(ranked.iter().all(|column| !column.is_identifier_column));
}

#[test]
fn ranking_does_not_touch_store() {
    let store = KnowledgeBase::new();
    let columns = vec![Column::new("NPI", vec!["1234567890"])];
    let ranked = classifier().rank(&columns, &store);
    assert!(ranked[0].is_identifier_column);
    assert!(store.is_empty());
}

proptest! {
    #[test]
    fn identifier_confidence_stays_in_range(
        name in ".{0,12}",
        examples in prop::collection::vec("[0-9a-z -]{0,14}", 0..6),
    ) {
        let column = Column::new(name, examples);
        let value = classifier().npi_confidence(&column).value();
        prop_assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn header_only_columns_never_match_by_value(
        names in prop::collection::vec("[a-z ]{0,10}", 1..5),
    ) {
        let store = KnowledgeBase::new();
        let columns: Vec<Column> = names.into_iter().map(Column::header_only).collect();
        let report = classifier().detect_all(&columns, &store);
        for found in &report.matches {
            prop_assert_ne!(found.detection.match_type, MatchType::ValuePattern);
        }
    }

    #[test]
    fn ranking_is_stable_for_equal_confidence(
        names in prop::collection::vec("[a-m]{1,8}", 1..8),
    ) {
        let store = KnowledgeBase::new();
        let columns: Vec<Column> = names
            .iter()
            .map(|name| Column::new(name.as_str(), vec!["text"]))
            .collect();
        let ranked = classifier().rank(&columns, &store);
        let ranked_names: Vec<&str> = ranked.iter().map(|column| column.name.as_str()).collect();
        let input_names: Vec<&str> = names.iter().map(String::as_str).collect();
        prop_assert_eq!(ranked_names, input_names);
    }
}
