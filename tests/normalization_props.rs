//! Property tests for unit normalization and page set construction
use proptest::prelude::*;

use catalog_price_crawler_lib::crawling::PageSource;
use catalog_price_crawler_lib::domain::{UnitError, Volume};

fn known_unit() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["kg", "g", "hg", "l", "ml", "dl", "stk", "c", "pcs"])
}

proptest! {
    #[test]
    fn normalization_ignores_case(value in 0.0f64..10_000.0, raw in known_unit(), upper in any::<bool>()) {
        let spelled = if upper { raw.to_uppercase() } else { raw.to_string() };
        prop_assert_eq!(Volume::normalize(value, &spelled).unwrap(), Volume::normalize(value, raw).unwrap());
    }

    #[test]
    fn normalization_never_grows_the_value(value in 0.0f64..10_000.0, raw in known_unit()) {
        let volume = Volume::normalize(value, raw).unwrap();
        prop_assert!(volume.value <= value);
        prop_assert!(volume.value >= 0.0);
    }

    #[test]
    fn unknown_units_are_rejected(raw in "[a-z]{3,8}") {
        prop_assume!(!["stk", "pcs"].contains(&raw.as_str()));
        prop_assert_eq!(Volume::normalize(1.0, &raw), Err(UnitError::UnknownUnit(raw.clone())));
    }

    #[test]
    fn page_source_keeps_first_occurrence_of_each_page(numbers in prop::collection::vec(1u32..40, 0..64)) {
        let source = PageSource::new(numbers.clone(), 10);

        let mut expected = Vec::new();
        for n in numbers {
            if !expected.contains(&n) {
                expected.push(n);
            }
        }
        prop_assert_eq!(source.numbers(), expected.as_slice());
        prop_assert_eq!(source.len(), expected.len());
        prop_assert!(source.iter().all(|page| page.size == 10));
    }
}
