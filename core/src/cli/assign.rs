//! Assignment parser for `add` arguments.
//!
//! `l=Home $ r=1-5 $ info=a=b` becomes
//! `[("Location", "Home"), ("Rates", "1-5"), ("Info", "a=b")]`.
//!
//! Segments are separated by `$`. Each segment splits on its first `=`, so
//! values may contain `=`. A segment without `=` is a bare field token with
//! an empty value. Empty segments and segments with an empty field token are
//! skipped. Every token must resolve against the schema or the whole parse
//! fails.

use crate::error::StoreError;
use crate::schema::FieldSchema;


/// Separator between assignments.
pub const ASSIGNMENT_SEPARATOR: char = '$';

/// Separator between field token and value.
pub const VALUE_SEPARATOR: char = '=';


/// Split raw text into trimmed `(token, value)` pairs without resolving
/// tokens.
pub fn split_assignments(raw: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for segment in raw.split(ASSIGNMENT_SEPARATOR) {
        let (token, value) = segment.split_once(VALUE_SEPARATOR).unwrap_or((segment, ""));
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        pairs.push((token.to_string(), value.trim().to_string()));
    }
    pairs
}


/// Parse raw text into canonical `(field, value)` pairs.
///
/// Fails with `FieldNotFound` on the first token the schema does not know;
/// no pairs are returned in that case.
pub fn parse_assignments(
    raw: &str,
    schema: &FieldSchema,
) -> Result<Vec<(String, String)>, StoreError> {
    split_assignments(raw)
        .into_iter()
        .map(|(token, value)| {
            let field = schema.resolve(&token)?;
            Ok((field.to_string(), value))
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tests::test_schema;

    fn pairs(v: &[(&str, &str)]) -> Vec<(String, String)> {
        v.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
    }

    #[test]
    fn two_assignments() {
        let got = parse_assignments("l=Home $ r=1-5", &test_schema()).unwrap();
        assert_eq!(got, pairs(&[("Location", "Home"), ("Rates", "1-5")]));
    }

    #[test]
    fn embedded_equals_preserved() {
        let got = parse_assignments("info=a=b=c", &test_schema()).unwrap();
        assert_eq!(got, pairs(&[("Info", "a=b=c")]));
    }

    #[test]
    fn empty_input_is_no_pairs() {
        assert!(parse_assignments("", &test_schema()).unwrap().is_empty());
        assert!(parse_assignments("   ", &test_schema()).unwrap().is_empty());
    }

    #[test]
    fn empty_and_trailing_segments_skipped() {
        let got = parse_assignments("$ l=Home $$ $", &test_schema()).unwrap();
        assert_eq!(got, pairs(&[("Location", "Home")]));
    }

    #[test]
    fn empty_token_skipped() {
        let got = parse_assignments("=orphan $ r=9-5", &test_schema()).unwrap();
        assert_eq!(got, pairs(&[("Rates", "9-5")]));
    }

    #[test]
    fn values_and_tokens_trimmed() {
        let got = parse_assignments("  LOC =  Big hall  ", &test_schema()).unwrap();
        assert_eq!(got, pairs(&[("Location", "Big hall")]));
    }

    #[test]
    fn empty_value_allowed() {
        let got = parse_assignments("r=", &test_schema()).unwrap();
        assert_eq!(got, pairs(&[("Rates", "")]));
    }

    #[test]
    fn unknown_field_aborts_everything() {
        match parse_assignments("l=Home $ colour=red $ r=1", &test_schema()) {
            Err(StoreError::FieldNotFound(f)) => assert_eq!(f, "colour"),
            other => panic!("expected FieldNotFound, got {:?}", other),
        }
    }

    #[test]
    fn bare_token_sets_empty_value() {
        let got = parse_assignments("l $ r=9-5", &test_schema()).unwrap();
        assert_eq!(got, pairs(&[("Location", ""), ("Rates", "9-5")]));
    }

    #[test]
    fn bare_unknown_token_is_unknown_field() {
        match parse_assignments("l=Home $ oops", &test_schema()) {
            Err(StoreError::FieldNotFound(f)) => assert_eq!(f, "oops"),
            other => panic!("expected FieldNotFound, got {:?}", other),
        }
    }

    #[test]
    fn repeated_field_keeps_both_in_order() {
        let got = parse_assignments("l=a $ loc=b", &test_schema()).unwrap();
        assert_eq!(got, pairs(&[("Location", "a"), ("Location", "b")]));
    }

    #[test]
    fn split_does_not_resolve() {
        let got = split_assignments("colour=red");
        assert_eq!(got, pairs(&[("colour", "red")]));
    }
}
