//! Core types and data structures for cut
//!
//! This crate provides the fundamental building blocks shared by the
//! translator crates, including:
//! - Expression trees recovered from symbolic values
//! - Case descriptions and the case preprocessor
//! - The knowledge base contract and its JSON-backed implementation
//! - C type spelling utilities
//! - Error types

pub mod ast;
pub mod case;
pub mod error;
pub mod knowledge;
pub mod traits;
pub mod types;

pub use ast::Expr;
pub use case::{preprocess, CaseTables, RawCase, Slot};
pub use error::{Error, Result};
pub use knowledge::{Declarations, TypedName};
pub use traits::KnowledgeBase;
