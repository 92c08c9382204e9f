use roster_map::{Classifier, FieldStatus, KnowledgeBase, MappingSession, MappingStore};
use roster_model::{Column, Confidence, FieldKind, MatchType};

fn roster_columns() -> Vec<Column> {
    vec![
        Column::new("Provider NPI", vec!["1234567890", "1093817465"]),
        Column::new("First", vec!["Ana", "Luis"]),
        Column::new("Last", vec!["Ruiz", "Park"]),
        Column::new("Degree", vec!["DO", "NP"]),
        Column::new("Spoken", vec!["English, Spanish", "Korean"]),
        Column::new("Town", vec!["Austin", "Dallas"]),
        Column::new("Region", vec!["TX", "TX"]),
        Column::new("Postal Code", vec!["78701", "75201-1234"]),
    ]
}

#[test]
fn session_suggests_typical_roster() {
    let store = KnowledgeBase::new();
    let session = MappingSession::from_columns(&Classifier::default(), &roster_columns(), &store);

    let expect = [
        (FieldKind::Npi, "Provider NPI"),
        (FieldKind::FirstName, "First"),
        (FieldKind::LastName, "Last"),
        (FieldKind::ProfessionalSuffix, "Degree"),
        (FieldKind::AdditionalLanguages, "Spoken"),
        (FieldKind::City, "Town"),
        (FieldKind::State, "Region"),
        (FieldKind::Zip, "Postal Code"),
    ];
    for (field, column) in expect {
        let suggestion = session
            .suggestion_for(field)
            .unwrap_or_else(|| panic!("no suggestion for {field}"));
        assert_eq!(suggestion.column_name, column, "{field}");
    }
    assert_eq!(session.status(FieldKind::Headshot), FieldStatus::Unmapped);
    assert_eq!(session.detector_mutations().len(), 1);
}

#[test]
fn accepted_mappings_become_records_and_confirmations() {
    let mut store = KnowledgeBase::new();
    let classifier = Classifier::default();
    let mut session = MappingSession::from_columns(&classifier, &roster_columns(), &store);

    assert!(session.accept_suggestion(FieldKind::City));
    assert!(session.accept_suggestion(FieldKind::State));
    session
        .accept_manual(FieldKind::LocationName, "Town")
        .expect("known column");
    assert!(!session.accept_suggestion(FieldKind::Headshot));

    let city = session.accepted_for(FieldKind::City).expect("accepted");
    assert_eq!(city.column_name, "Town");
    assert_eq!(city.match_type, Some(MatchType::ExactHeader));
    assert_eq!(city.confidence, Some(Confidence::MAX));
    let manual = session
        .accepted_for(FieldKind::LocationName)
        .expect("accepted");
    assert_eq!(manual.column_name, "Town");
    assert_eq!(manual.match_type, None);
    assert!(session.accepted_for(FieldKind::Headshot).is_none());

    let summary = session.summary();
    assert_eq!(summary.accepted, 3);
    assert_eq!(summary.total_fields, 20);
    assert_eq!(
        summary.accepted + summary.suggested + summary.unmapped,
        summary.total_fields
    );
    assert_eq!(summary.available_columns, 6);

    let records = session.to_records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].column_name, "Town");
    assert_eq!(
        records[0].detected_as.fields(),
        [FieldKind::LocationName, FieldKind::City]
    );
    assert_eq!(records[1].column_name, "Region");

    let added = store.confirm_all(&session.confirmations());
    assert_eq!(added, 3);
    assert_eq!(store.confirm_all(&session.confirmations()), 0);

    let town = store.find(FieldKind::LocationName, "TOWN").expect("confirmed");
    assert_eq!(town.confidence, Confidence::MAX);
    assert_eq!(town.match_type, MatchType::ExactHeader);
    let region = store.find(FieldKind::State, "region").expect("confirmed");
    assert_eq!(region.match_type, MatchType::ValuePattern);
}

#[test]
fn confirmed_headers_are_found_first_next_time() {
    let mut store = KnowledgeBase::new();
    store.confirm(
        FieldKind::PracticeName,
        "Org",
        Confidence::MAX,
        MatchType::ExactHeader,
    );
    let columns = vec![
        Column::new("Practice Name", vec!["Northside"]),
        Column::new("Org", vec!["Northside Clinic"]),
    ];
    let session = MappingSession::from_columns(&Classifier::default(), &columns, &store);

    // Columns are scanned in order, so the keyword hit on the first column
    // still wins over the store entry for the second.
    let suggestion = session.suggestion_for(FieldKind::PracticeName).unwrap();
    assert_eq!(suggestion.column_name, "Practice Name");
    assert_eq!(suggestion.match_type, MatchType::ExactHeader);

    let reordered: Vec<Column> = columns.into_iter().rev().collect();
    let session = MappingSession::from_columns(&Classifier::default(), &reordered, &store);
    let suggestion = session.suggestion_for(FieldKind::PracticeName).unwrap();
    assert_eq!(suggestion.column_name, "Org");
    assert_eq!(suggestion.match_type, MatchType::KnowledgeBase);
}
