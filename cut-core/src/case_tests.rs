#[cfg(test)]
mod tests {
    use crate::ast::Expr;
    use crate::case::*;
    use crate::knowledge::Declarations;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // ===== Model Parsing Tests =====

    #[test]
    fn test_parse_model_lines() {
        let values = parse_model("reg_$0 -> 5\nreg_$1 -> -3\n");
        assert_eq!(values, map(&[("reg_$0", "5"), ("reg_$1", "-3")]));
    }

    #[test]
    fn test_parse_model_normalises_hex() {
        let values = parse_model("x -> #x1A");
        assert_eq!(values.get("x").map(String::as_str), Some("0x1A"));
    }

    #[test]
    fn test_parse_model_ignores_lines_without_binding() {
        let values = parse_model("\nnot a binding\ny->7");
        assert_eq!(values, map(&[("y", "7")]));
    }

    // ===== Preprocessor Tests =====

    #[test]
    fn test_builtin_parameters_are_dropped_everywhere() {
        let raw = RawCase {
            parameters: map(&[("reg_$0", "__builtin_expect"), ("reg_$1", "n")]),
            model: "reg_$0 -> 1\nreg_$1 -> 2".to_string(),
            types: map(&[("reg_$0", "long"), ("reg_$1", "int")]),
        };
        let tables = preprocess(raw, &Declarations::new());

        assert!(!tables.parameters.contains_key("reg_$0"));
        assert!(!tables.values.contains_key("reg_$0"));
        assert!(!tables.types.contains_key("reg_$0"));
        assert_eq!(tables.parameters.get("reg_$1").map(String::as_str), Some("n"));
    }

    #[test]
    fn test_conjured_call_results_move_to_call_tables() {
        let kb = Declarations::new().with_function("get_len", &[]);
        let raw = RawCase {
            parameters: map(&[("conj_$3", "get_len"), ("conj_$4", "unknown_fn")]),
            model: "conj_$3 -> 8\nconj_$4 -> 9".to_string(),
            types: map(&[("conj_$3", "int"), ("conj_$4", "int")]),
        };
        let tables = preprocess(raw, &kb);

        assert!(!tables.parameters.contains_key("conj_$3"));
        assert!(!tables.values.contains_key("conj_$3"));
        assert_eq!(tables.call_names, map(&[("conj_$3", "get_len")]));
        assert_eq!(tables.call_values, map(&[("conj_$3", "8")]));

        // Not a known function: passes through unchanged
        assert!(tables.parameters.contains_key("conj_$4"));
        assert!(tables.values.contains_key("conj_$4"));
    }

    #[test]
    fn test_no_symbol_in_both_main_and_call_tables() {
        let kb = Declarations::new().with_function("f", &[]);
        let raw = RawCase {
            parameters: map(&[("conj_$1", "f"), ("reg_$2", "x")]),
            model: "conj_$1 -> 0\nreg_$2 -> 1".to_string(),
            types: BTreeMap::new(),
        };
        let tables = preprocess(raw, &kb);
        for name in tables.call_names.keys() {
            assert!(!tables.parameters.contains_key(name));
            assert!(!tables.values.contains_key(name));
        }
    }

    // ===== Table Tests =====

    #[test]
    fn test_register_keeps_first_definition() {
        let mut tables = CaseTables::default();
        assert!(tables.register(
            "reg_$0",
            "p",
            Expr::ident("p"),
            Some("int *".into()),
            Slot::root("reg_$0")
        ));
        assert!(!tables.register(
            "reg_$0",
            "q",
            Expr::ident("q"),
            Some("char *".into()),
            Slot::root("reg_$0")
        ));

        assert_eq!(tables.asts["reg_$0"], Expr::ident("p"));
        assert_eq!(tables.types["reg_$0"], "int *");
        assert_eq!(tables.order, vec!["reg_$0".to_string()]);
    }

    #[test]
    fn test_size_hints_take_maximum() {
        let mut tables = CaseTables::default();
        let slot = Slot::root("p");
        assert_eq!(tables.size_hint("p", 0), 1);
        assert_eq!(tables.recorded_size_hint("p", 0), None);

        tables.record_size_hint(&slot, 3);
        tables.record_size_hint(&slot, 2);
        assert_eq!(tables.size_hint("p", 0), 3);

        tables.record_size_hint(&slot.element(), 5);
        assert_eq!(tables.size_hint("p", 1), 5);
        assert_eq!(tables.size_hint("p", 0), 3);
    }
}
