//! C type spelling utilities
//!
//! Type spellings come verbatim from the front-end (`"struct node *"`,
//! `"const char *const"`, `"int (*)(int, char)"`). Nothing here parses C
//! declarators in general; only the pointer suffix and typedef names are
//! interpreted.

use crate::traits::KnowledgeBase;
use rustc_hash::FxHashSet;

const QUALIFIERS: [&str; 3] = ["const", "volatile", "restrict"];

/// Split a spelling into its base name and trailing pointer/qualifier suffix.
///
/// `"int *"` → `("int", " *")`, `"char *const"` → `("char", " *const")`.
pub fn split_pointer_suffix(spelling: &str) -> (&str, &str) {
    let mut cut = spelling.len();
    loop {
        let rest = &spelling[..cut];
        let trimmed = rest.trim_end();
        if trimmed.len() != rest.len() {
            cut = trimmed.len();
            continue;
        }
        if let Some(stripped) = rest.strip_suffix('*') {
            cut = stripped.len();
            continue;
        }
        let qualifier = QUALIFIERS.iter().find_map(|q| {
            let stripped = rest.strip_suffix(q)?;
            // Only a whole word, and never the entire base.
            let boundary = stripped.ends_with(|c: char| c == '*' || c.is_whitespace());
            (boundary && !stripped.trim().trim_end_matches('*').trim().is_empty())
                .then_some(stripped.len())
        });
        match qualifier {
            Some(len) => cut = len,
            None => break,
        }
    }
    (&spelling[..cut], &spelling[cut..])
}

/// Split leading `const `/`volatile ` qualifiers off a base name
fn split_qualifier_prefix(base: &str) -> (&str, &str) {
    let mut rest = base;
    loop {
        let next = QUALIFIERS
            .iter()
            .find_map(|q| rest.strip_prefix(q).filter(|r| r.starts_with(' ')));
        match next {
            Some(r) => rest = r.trim_start(),
            None => break,
        }
    }
    let prefix_len = base.len() - rest.len();
    (&base[..prefix_len], rest)
}

/// Resolve a spelling through the typedef table until no typedef applies.
///
/// The trailing pointer suffix is kept aside and reattached; pointer
/// suffixes found inside typedef targets accumulate in front of it. A name
/// already visited ends the walk, so self-referential tables terminate.
pub fn real_type(kb: &dyn KnowledgeBase, spelling: &str) -> String {
    let (base, suffix) = split_pointer_suffix(spelling.trim());
    let (prefix, base) = split_qualifier_prefix(base);

    let mut base = base.to_string();
    let mut suffix = suffix.to_string();
    let mut seen = FxHashSet::default();

    while seen.insert(base.clone()) {
        let Some(target) = kb.typedef_target(&base) else {
            break;
        };
        let (target_base, target_suffix) = split_pointer_suffix(target.trim());
        suffix = format!("{}{}", target_suffix, suffix);
        base = target_base.to_string();
    }

    format!("{}{}{}", prefix, base, suffix)
}

/// Byte positions of every `*` outside parentheses
fn pointer_markers(spelling: &str) -> Vec<usize> {
    let mut depth = 0usize;
    let mut markers = Vec::new();
    for (pos, c) in spelling.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '*' if depth == 0 => markers.push(pos),
            _ => {}
        }
    }
    markers
}

/// Number of pointer indirections in a spelling
pub fn pointer_depth(spelling: &str) -> usize {
    pointer_markers(spelling).len()
}

pub fn is_pointer(spelling: &str) -> bool {
    pointer_depth(spelling) > 0
}

/// Type stored in the buffer reached after `depth` dereferences.
///
/// That is everything before the `(depth + 1)`-th pointer marker counted
/// from the right: `element_type("int **", 0)` is `"int *"` and
/// `element_type("int **", 1)` is `"int"`.
pub fn element_type(spelling: &str, depth: usize) -> Option<String> {
    let markers = pointer_markers(spelling);
    let pos = *markers.iter().rev().nth(depth)?;
    let element = spelling[..pos].trim_end();
    (!element.is_empty()).then(|| element.to_string())
}

/// A resolved spelling that carries no usable element type
pub fn is_void_like(resolved: &str) -> bool {
    resolved
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|word| word == "void")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::Declarations;

    #[test]
    fn test_split_pointer_suffix() {
        assert_eq!(split_pointer_suffix("int"), ("int", ""));
        assert_eq!(split_pointer_suffix("int *"), ("int", " *"));
        assert_eq!(split_pointer_suffix("struct node **"), ("struct node", " **"));
        assert_eq!(split_pointer_suffix("char *const"), ("char", " *const"));
        assert_eq!(split_pointer_suffix("const"), ("const", ""));
    }

    #[test]
    fn test_real_type_follows_chain() {
        let kb = Declarations::new()
            .with_typedef("u8", "uint8_t")
            .with_typedef("uint8_t", "unsigned char");
        assert_eq!(real_type(&kb, "u8"), "unsigned char");
        assert_eq!(real_type(&kb, "u8 *"), "unsigned char *");
        assert_eq!(real_type(&kb, "const u8 *"), "const unsigned char *");
    }

    #[test]
    fn test_real_type_accumulates_pointer_typedefs() {
        let kb = Declarations::new().with_typedef("node_ptr", "struct node *");
        let resolved = real_type(&kb, "node_ptr *");
        assert_eq!(pointer_depth(&resolved), 2);
        assert!(resolved.starts_with("struct node"));
    }

    #[test]
    fn test_real_type_terminates_on_cycle() {
        let kb = Declarations::new()
            .with_typedef("a_t", "b_t")
            .with_typedef("b_t", "a_t")
            .with_typedef("self_t", "self_t");
        let resolved = real_type(&kb, "a_t");
        assert!(resolved == "a_t" || resolved == "b_t");
        assert_eq!(real_type(&kb, "self_t *"), "self_t *");
    }

    #[test]
    fn test_real_type_unknown_is_fixed_point() {
        let kb = Declarations::new();
        assert_eq!(real_type(&kb, "struct opaque *"), "struct opaque *");
    }

    #[test]
    fn test_pointer_depth_ignores_function_pointers() {
        assert_eq!(pointer_depth("int"), 0);
        assert_eq!(pointer_depth("int **"), 2);
        assert_eq!(pointer_depth("int (*)(int, char *)"), 0);
        assert!(is_pointer("void *"));
        assert!(!is_pointer("int (*)(void)"));
    }

    #[test]
    fn test_element_type() {
        assert_eq!(element_type("int *", 0).as_deref(), Some("int"));
        assert_eq!(element_type("int **", 0).as_deref(), Some("int *"));
        assert_eq!(element_type("int **", 1).as_deref(), Some("int"));
        assert_eq!(element_type("char *const *", 0).as_deref(), Some("char *const"));
        assert_eq!(element_type("int *", 1), None);
        assert_eq!(element_type("int", 0), None);
    }

    #[test]
    fn test_void_like() {
        assert!(is_void_like("void *"));
        assert!(is_void_like("const void *"));
        assert!(!is_void_like("int *"));
        assert!(!is_void_like("avoid_t"));
    }
}
