//! Core traits for dependency injection and extensibility

use crate::knowledge::TypedName;

/// Declarations oracle backed by a C front-end.
///
/// Every query answers `None` when the name is unknown; callers treat
/// absence as a fixed point rather than an error.
pub trait KnowledgeBase: Send + Sync {
    /// Parameters of a function, in declaration order
    fn function_parameters(&self, name: &str) -> Option<&[TypedName]>;

    /// Declared type of a global variable
    fn global_variable_type(&self, name: &str) -> Option<&str>;

    /// One level of typedef resolution
    fn typedef_target(&self, name: &str) -> Option<&str>;

    /// Fields of a struct or union, in declaration order
    fn struct_fields(&self, name: &str) -> Option<&[TypedName]>;

    /// Check if a function is declared
    fn has_function(&self, name: &str) -> bool {
        self.function_parameters(name).is_some()
    }
}
