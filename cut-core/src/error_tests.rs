#[cfg(test)]
mod tests {
    use crate::error::*;
    use std::io;

    // ===== Display Tests =====

    #[test]
    fn test_unknown_function_error() {
        let err = Error::UnknownFunction("foo".to_string());
        assert_eq!(err.to_string(), "Unknown function: foo");
    }

    #[test]
    fn test_malformed_expression_error() {
        let err = Error::MalformedExpression("unclosed '{' at 7".to_string());
        assert_eq!(err.to_string(), "Malformed expression: unclosed '{' at 7");
    }

    #[test]
    fn test_unresolvable_type_error() {
        let err = Error::UnresolvableType {
            ty: "int *".to_string(),
            depth: 1,
        };
        assert_eq!(
            err.to_string(),
            "Unresolvable type: no pointer element at depth 1 in 'int *'"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing.json");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }

    // ===== Classification Tests =====

    #[test]
    fn test_case_local_errors() {
        assert!(Error::UnknownFunction("f".into()).is_case_local());
        assert!(Error::MalformedExpression("x".into()).is_case_local());
        assert!(Error::UnresolvableType {
            ty: "int".into(),
            depth: 0
        }
        .is_case_local());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(!Error::KnowledgeBase("gone".into()).is_case_local());
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert!(!Error::from(io_err).is_case_local());
        assert!(!Error::Other(anyhow::anyhow!("boom")).is_case_local());
    }
}
