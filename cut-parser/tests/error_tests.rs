//! Tests for parser error types and how malformed values are reported

use cut_core::{CaseTables, Declarations};
use cut_parser::error::{ErrorKind, ParseError};
use cut_parser::parse_value;

fn parse_err(source: &str) -> ParseError {
    let mut case = CaseTables::default();
    let kb = Declarations::new();
    parse_value(source, &mut case, &kb).unwrap_err()
}

#[test]
fn test_unexpected_token_error() {
    let error = ParseError::UnexpectedToken {
        position: 7,
        expected: "Comma".to_string(),
        found: "}".to_string(),
    };

    let error_msg = error.to_string();
    assert!(error_msg.contains("Unexpected token at position 7"));
    assert!(error_msg.contains("expected Comma"));
    assert!(error_msg.contains("found }"));
    assert_eq!(error.kind(), ErrorKind::UnexpectedToken);
}

#[test]
fn test_unclosed_delimiter_error() {
    let error = ParseError::UnclosedDelimiter {
        delimiter: "Element{".to_string(),
        position: 0,
    };
    assert_eq!(
        error.to_string(),
        "Unclosed delimiter 'Element{' opened at position 0"
    );
    assert_eq!(error.kind(), ErrorKind::UnclosedDelimiter);
}

#[test]
fn test_invalid_index_error() {
    let error = ParseError::InvalidIndex("x S64b".to_string());
    assert!(error.to_string().contains("x S64b"));
    assert_eq!(error.kind(), ErrorKind::InvalidIndex);
}

#[test]
fn test_converts_to_malformed_expression() {
    let error: cut_core::Error = ParseError::UnexpectedEof.into();
    assert!(matches!(error, cut_core::Error::MalformedExpression(_)));
    assert!(error.is_case_local());
}

#[test]
fn test_unbalanced_inputs_are_rejected() {
    let cases = [
        ("Element{reg_$0<int *,p>,2,int", ErrorKind::UnclosedDelimiter),
        ("SymRegion{SymRegion{p}", ErrorKind::UnclosedDelimiter),
        ("conj_$1{int, LC1", ErrorKind::UnclosedDelimiter),
        ("Element{p,1,int}}", ErrorKind::UnexpectedToken),
        ("SymRegion{p}.", ErrorKind::UnexpectedToken),
        ("Element{p,,int}", ErrorKind::InvalidIndex),
    ];
    for (source, kind) in cases {
        assert_eq!(parse_err(source).kind(), kind, "input: {}", source);
    }
}

#[test]
fn test_error_position_points_at_offender() {
    match parse_err("Element{p}") {
        ParseError::UnexpectedToken { position, found, .. } => {
            assert_eq!(position, 9);
            assert_eq!(found, "}");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
