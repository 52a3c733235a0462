//! JSON-backed knowledge base
//!
//! The C front-end dumps what it extracted from each translation unit
//! (function signatures, global variables, typedefs and record layouts)
//! as JSON. A dump holds either one object or an array of them, one per
//! translation unit, and all of them are merged into a single
//! [`Declarations`] table.

use crate::error::{Error, Result};
use crate::traits::KnowledgeBase;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// A name with its C type spelling (function parameter or record field)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedName {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl TypedName {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Declarations {
    #[serde(default)]
    pub functions: BTreeMap<String, Vec<TypedName>>,

    #[serde(default)]
    pub variables: BTreeMap<String, String>,

    #[serde(default)]
    pub typedefs: BTreeMap<String, String>,

    #[serde(default)]
    pub structs: BTreeMap<String, Vec<TypedName>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Dump {
    Many(Vec<Declarations>),
    One(Declarations),
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a dump holding one translation unit or an array of them
    pub fn from_json_str(source: &str) -> Result<Self> {
        let dump: Dump = serde_json::from_str(source)
            .map_err(|e| Error::KnowledgeBase(format!("invalid declarations dump: {}", e)))?;
        let units = match dump {
            Dump::Many(units) => units,
            Dump::One(unit) => vec![unit],
        };

        let mut merged = Declarations::new();
        for unit in units {
            merged.merge(unit);
        }
        Ok(merged)
    }

    /// Load a dump from disk. Any failure here is fatal for the run.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::KnowledgeBase(format!("cannot read {}: {}", path.display(), e))
        })?;
        let decls = Self::from_json_str(&content)?;
        debug!(
            "Loaded {} functions, {} typedefs from {}",
            decls.functions.len(),
            decls.typedefs.len(),
            path.display()
        );
        Ok(decls)
    }

    /// Merge another translation unit. The first definition of a name wins.
    pub fn merge(&mut self, other: Declarations) {
        merge_table(&mut self.functions, other.functions, "function");
        merge_table(&mut self.variables, other.variables, "variable");
        merge_table(&mut self.typedefs, other.typedefs, "typedef");
        merge_table(&mut self.structs, other.structs, "struct");
    }

    pub fn with_function(mut self, name: &str, params: &[(&str, &str)]) -> Self {
        let params = params
            .iter()
            .map(|(name, ty)| TypedName::new(*name, *ty))
            .collect();
        self.functions.insert(name.to_string(), params);
        self
    }

    pub fn with_variable(mut self, name: &str, ty: &str) -> Self {
        self.variables.insert(name.to_string(), ty.to_string());
        self
    }

    pub fn with_typedef(mut self, name: &str, target: &str) -> Self {
        self.typedefs.insert(name.to_string(), target.to_string());
        self
    }

    pub fn with_struct(mut self, name: &str, fields: &[(&str, &str)]) -> Self {
        let fields = fields
            .iter()
            .map(|(name, ty)| TypedName::new(*name, *ty))
            .collect();
        self.structs.insert(name.to_string(), fields);
        self
    }
}

fn merge_table<V: PartialEq + std::fmt::Debug>(
    into: &mut BTreeMap<String, V>,
    from: BTreeMap<String, V>,
    what: &str,
) {
    for (name, value) in from {
        match into.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(existing) => {
                if *existing.get() != value {
                    warn!(
                        "{} redefinition of '{}' ignored: kept {:?}, dropped {:?}",
                        what,
                        existing.key(),
                        existing.get(),
                        value
                    );
                }
            }
        }
    }
}

/// Strip a leading `struct `/`union ` keyword from a record spelling
fn record_name(name: &str) -> &str {
    let name = name.trim();
    name.strip_prefix("struct ")
        .or_else(|| name.strip_prefix("union "))
        .map(str::trim)
        .unwrap_or(name)
}

impl KnowledgeBase for Declarations {
    fn function_parameters(&self, name: &str) -> Option<&[TypedName]> {
        self.functions.get(name).map(Vec::as_slice)
    }

    fn global_variable_type(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    fn typedef_target(&self, name: &str) -> Option<&str> {
        self.typedefs.get(name.trim()).map(String::as_str)
    }

    fn struct_fields(&self, name: &str) -> Option<&[TypedName]> {
        self.structs
            .get(name.trim())
            .or_else(|| self.structs.get(record_name(name)))
            .map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_unit() {
        let decls = Declarations::from_json_str(
            r#"{
                "functions": { "foo": [ {"name": "p", "type": "int *"}, {"name": "n", "type": "int"} ] },
                "typedefs": { "u8": "unsigned char" }
            }"#,
        )
        .unwrap();

        let params = decls.function_parameters("foo").unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0], TypedName::new("p", "int *"));
        assert_eq!(params[1].name, "n");
        assert_eq!(decls.typedef_target("u8"), Some("unsigned char"));
        assert!(decls.global_variable_type("g").is_none());
    }

    #[test]
    fn test_merge_units_first_definition_wins() {
        let decls = Declarations::from_json_str(
            r#"[
                { "variables": { "g": "int" } },
                { "variables": { "g": "long", "h": "char" } }
            ]"#,
        )
        .unwrap();

        assert_eq!(decls.global_variable_type("g"), Some("int"));
        assert_eq!(decls.global_variable_type("h"), Some("char"));
    }

    #[test]
    fn test_struct_lookup_accepts_keyword() {
        let decls = Declarations::new().with_struct("node", &[("next", "struct node *")]);
        assert!(decls.struct_fields("node").is_some());
        assert_eq!(decls.struct_fields("struct node").unwrap()[0].name, "next");
        assert!(decls.struct_fields("union other").is_none());
    }

    #[test]
    fn test_invalid_dump_is_knowledge_base_error() {
        let err = Declarations::from_json_str("[1, 2").unwrap_err();
        assert!(matches!(err, Error::KnowledgeBase(_)));
        assert!(!err.is_case_local());
    }

    #[test]
    fn test_missing_file_is_knowledge_base_error() {
        let err = Declarations::load(Path::new("/nonexistent/cut_knowledge.json")).unwrap_err();
        assert!(matches!(err, Error::KnowledgeBase(_)));
    }

    #[test]
    fn test_has_function() {
        let decls = Declarations::new().with_function("bar", &[]);
        assert!(decls.has_function("bar"));
        assert!(!decls.has_function("baz"));
    }
}
