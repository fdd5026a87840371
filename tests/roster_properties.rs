//! Property tests for roster parsing
//!
//! Covers the count, ordering and repeatability guarantees over generated
//! rosters.

use proptest::prelude::*;
use roster::roster::{parse, CategoryColumn};

const HEADER: &str = "firstname,lastname,age,field";

fn rows() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[A-Z][a-z]{0,7}", "[A-Z]{1,4}"), 0..40)
}

fn render(rows: &[(String, String)], blank_every: usize) -> String {
    let mut content = String::from(HEADER);
    content.push('\n');
    for (i, (name, field)) in rows.iter().enumerate() {
        if blank_every > 0 && i % blank_every == 0 {
            content.push('\n');
        }
        content.push_str(&format!("{name},Doe,30,{field}\n"));
    }
    content
}

proptest! {
    #[test]
    fn prop_total_equals_data_lines(rows in rows(), blank_every in 0usize..5) {
        let report = parse(&render(&rows, blank_every), &CategoryColumn::Last);

        prop_assert_eq!(report.total(), rows.len());
        prop_assert_eq!(report.skipped(), 0);
    }

    #[test]
    fn prop_first_occurrence_order(rows in rows()) {
        let report = parse(&render(&rows, 0), &CategoryColumn::Last);

        let mut expected: Vec<&str> = Vec::new();
        for (_, field) in &rows {
            if !expected.contains(&field.as_str()) {
                expected.push(field);
            }
        }
        prop_assert_eq!(report.categories().collect::<Vec<_>>(), expected);

        for group in &report {
            let in_file_order: Vec<&String> = rows
                .iter()
                .filter(|(_, field)| *field == group.category)
                .map(|(name, _)| name)
                .collect();
            prop_assert_eq!(group.identifiers.iter().collect::<Vec<_>>(), in_file_order);
        }
    }

    #[test]
    fn prop_policies_agree_on_four_columns(rows in rows()) {
        let content = render(&rows, 0);
        prop_assert_eq!(
            parse(&content, &CategoryColumn::Last),
            parse(&content, &CategoryColumn::Index(3))
        );
    }

    #[test]
    fn prop_parse_is_repeatable(rows in rows(), blank_every in 0usize..5) {
        let content = render(&rows, blank_every);
        prop_assert_eq!(
            parse(&content, &CategoryColumn::Last),
            parse(&content, &CategoryColumn::Last)
        );
    }
}
