// this_file: crates/sdftext-unicode/src/proptests.rs

use super::*;
use proptest::prelude::*;

fn assert_partition(spans: &[(usize, usize)], len: usize) -> Result<(), TestCaseError> {
    let mut next = 0;
    for &(start, count) in spans {
        prop_assert_eq!(start, next);
        prop_assert!(count > 0);
        next = start + count;
    }
    prop_assert_eq!(next, len);
    Ok(())
}

// Property: script runs partition the input in order
proptest! {
    #[test]
    fn prop_script_runs_partition(s in "[a-zA-Z αβγ漢字مرحبا0-9\\n.,]{1,40}") {
        let classifier = ScriptClassifier::new();
        let text: Vec<char> = s.chars().collect();
        let mut runs = Vec::new();
        classifier.script_runs(&text, &mut runs);

        let spans: Vec<_> = runs.iter().map(|r| (r.start, r.count)).collect();
        assert_partition(&spans, text.len())?;

        for run in &runs {
            prop_assert!(run.first_unique >= run.start);
            prop_assert!(run.first_unique < run.start + run.count);
        }
    }
}

// Property: bidi runs partition the input in order
proptest! {
    #[test]
    fn prop_bidi_runs_partition(s in "[a-z שלום مرحبا\\n\\r0-9]{1,40}") {
        let text: Vec<char> = s.chars().collect();
        let mut runs = Vec::new();
        find_bidi_runs(&text, &mut runs);

        let spans: Vec<_> = runs.iter().map(|r| (r.start, r.count)).collect();
        assert_partition(&spans, text.len())?;
    }
}

// Property: decoding agrees across encodings for any valid string
proptest! {
    #[test]
    fn prop_decode_encodings_agree(s in "\\PC{0,32}") {
        let utf16: Vec<u16> = s.encode_utf16().collect();
        let mut from_utf8 = Vec::new();
        let mut from_utf16 = Vec::new();

        TextInput::from(s.as_str()).decode_into(&mut from_utf8).unwrap();
        TextInput::Utf16(&utf16).decode_into(&mut from_utf16).unwrap();
        prop_assert_eq!(from_utf8, from_utf16);
    }
}
