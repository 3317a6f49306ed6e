// Property checks for the stderr error grammar

use gitkeeper::remote::errors::CLASSIFIED_KINDS;
use gitkeeper::remote::parse_error_record;
use gitkeeper::RemoteErrorKind;
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_unclassified_keeps_raw_text(stderr in any::<String>()) {
        let record = parse_error_record(&stderr);
        if record.kind == RemoteErrorKind::Unclassified {
            prop_assert_eq!(&record.message, &stderr);
            prop_assert_eq!(record.field("message"), Some(stderr.as_str()));
        }
    }

    #[test]
    fn prop_well_formed_payload_classifies(
        index in 0..CLASSIFIED_KINDS.len(),
        values in prop::collection::vec("[a-zA-Z0-9 ._:/-]{0,12}", 2),
        reversed in any::<bool>(),
    ) {
        let kind = CLASSIFIED_KINDS[index];
        let mut pairs: Vec<String> = kind
            .fields()
            .iter()
            .zip(&values)
            .map(|(name, value)| format!("{name}=`{value}`"))
            .collect();
        if reversed {
            pairs.reverse();
        }

        let record = parse_error_record(&format!("cmd: {}: {}\n", kind.label(), pairs.join(" ")));

        prop_assert_eq!(record.kind, kind);
        for (name, value) in kind.fields().iter().zip(&values) {
            prop_assert_eq!(record.field(name), Some(value.as_str()));
        }
    }

    #[test]
    fn prop_stray_backtick_falls_back(value in "[a-z]{0,8}") {
        let stderr = format!("user create: User exists: login=`{value}`x`");
        let record = parse_error_record(&stderr);
        prop_assert_eq!(record.kind, RemoteErrorKind::Unclassified);
    }
}
