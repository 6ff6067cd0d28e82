//! Property-based tests for the evidence extractor using proptest.

use proptest::prelude::*;

use hta_core::{EvidenceExtractor, LiteratureRecord, ProjectCategory};

fn category_strategy() -> impl Strategy<Value = ProjectCategory> {
    prop_oneof![
        Just(ProjectCategory::HpvVaccine),
        Just(ProjectCategory::NcdScreening),
        Just(ProjectCategory::Dialysis),
        Just(ProjectCategory::Mdrtb),
        Just(ProjectCategory::AiTbCxr),
        Just(ProjectCategory::General),
    ]
}

/// Abstract fragments biased towards trigger words and numeric values.
fn abstract_strategy() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("efficacy".to_string()),
        Just("Cost".to_string()),
        Just("coverage".to_string()),
        Just("sensitivity".to_string()),
        Just("specificity".to_string()),
        Just("survival".to_string()),
        Just("cure".to_string()),
        Just("accuracy".to_string()),
        (0u32..1000).prop_map(|n| format!("{n}%")),
        (0u32..100, 0u32..100).prop_map(|(a, b)| format!("{a}.{b}%")),
        (1u32..100_000).prop_map(|n| format!("${n}")),
        (1u32..999, 0u32..999).prop_map(|(a, b)| format!("₹{a},{b:03}")),
        "[a-z ]{0,12}",
    ];
    prop::collection::vec(fragment, 0..12).prop_map(|parts| parts.join(" "))
}

fn records_strategy() -> impl Strategy<Value = Vec<LiteratureRecord>> {
    prop::collection::vec(
        (any::<u32>(), "[A-Za-z ]{0,20}", abstract_strategy()).prop_map(|(id, title, text)| {
            LiteratureRecord::new(id.to_string())
                .with_title(title)
                .with_abstract(text)
                .with_year("2020")
        }),
        0..20,
    )
}

proptest! {
    #[test]
    fn extraction_is_deterministic(
        records in records_strategy(),
        category in category_strategy(),
    ) {
        let extractor = EvidenceExtractor::new(category);
        let first = serde_json::to_string(&extractor.extract_with_report(&records)).unwrap();
        let second = serde_json::to_string(&extractor.extract_with_report(&records)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn extraction_preserves_input_order(
        records in records_strategy(),
        category in category_strategy(),
    ) {
        let outcome = EvidenceExtractor::new(category).extract_with_report(&records);
        prop_assert_eq!(outcome.total(), records.len());

        // Retained points appear in the same relative order as their records.
        let retained_indices: Vec<usize> = (0..records.len())
            .filter(|i| !outcome.dropped.iter().any(|d| d.index == *i))
            .collect();
        prop_assert_eq!(retained_indices.len(), outcome.data_points.len());
        for (point, idx) in outcome.data_points.iter().zip(&retained_indices) {
            prop_assert_eq!(&point.identifier, &records[*idx].identifier);
        }

        let dropped_indices: Vec<usize> = outcome.dropped.iter().map(|d| d.index).collect();
        let mut sorted = dropped_indices.clone();
        sorted.sort_unstable();
        prop_assert_eq!(dropped_indices, sorted);
    }

    #[test]
    fn retained_points_carry_a_metric(
        records in records_strategy(),
        category in category_strategy(),
    ) {
        let extractor = EvidenceExtractor::new(category);
        let outcome = extractor.extract_with_report(&records);
        for point in &outcome.data_points {
            prop_assert!(point.field_count() >= 5);
        }
        // Re-running the rules on a dropped record finds no metric.
        for dropped in &outcome.dropped {
            let record = &records[dropped.index];
            let lowered = record.abstract_text.to_lowercase();
            let matches = extractor
                .rules()
                .rules_for(category)
                .iter()
                .filter(|r| r.fires(&lowered))
                .filter_map(|r| r.kind.extract(&lowered))
                .count();
            prop_assert_eq!(matches, 0);
        }
    }

    #[test]
    fn general_category_yields_nothing(records in records_strategy()) {
        let points = EvidenceExtractor::new(ProjectCategory::General).extract(&records);
        prop_assert!(points.is_empty());
    }

    #[test]
    fn empty_text_is_always_dropped(
        id in "[0-9]{1,8}",
        category in category_strategy(),
    ) {
        let record = LiteratureRecord::new(id);
        let points = EvidenceExtractor::new(category).extract(&[record]);
        prop_assert!(points.is_empty());
    }

    #[test]
    fn extracted_percentages_are_plain_numbers(text in abstract_strategy()) {
        if let Some(value) = hta_core::extraction::extract_percentage(&text.to_lowercase()) {
            prop_assert!(value.parse::<f64>().is_ok());
        }
        if let Some(value) = hta_core::extraction::extract_currency(&text.to_lowercase()) {
            prop_assert!(!value.contains(','));
            prop_assert!(value.parse::<f64>().is_ok());
        }
    }
}
