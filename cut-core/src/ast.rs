//! Expression trees for symbolic values and their C rendering

use serde::{Deserialize, Serialize};
use std::fmt;

/// An expression recovered from one symbolic value.
///
/// Trees are built by the parser and owned by a single case; they are
/// never shared across cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// A bare name or literal token, kept verbatim
    Identifier(String),
    /// `base[index]`
    ArrayAccess { base: Box<Expr>, index: i64 },
    /// `base.field` or `base->field`
    FieldAccess {
        base: Box<Expr>,
        field: String,
        via_pointer: bool,
    },
    /// `(target_type) inner`
    Cast { target_type: String, inner: Box<Expr> },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }

    pub fn index(base: Expr, index: i64) -> Self {
        Expr::ArrayAccess {
            base: Box::new(base),
            index,
        }
    }

    pub fn field(base: Expr, field: impl Into<String>, via_pointer: bool) -> Self {
        Expr::FieldAccess {
            base: Box::new(base),
            field: field.into(),
            via_pointer,
        }
    }

    pub fn cast(target_type: impl Into<String>, inner: Expr) -> Self {
        Expr::Cast {
            target_type: target_type.into(),
            inner: Box::new(inner),
        }
    }

    /// True when this node is an index into another expression
    pub fn is_array_access(&self) -> bool {
        matches!(self, Expr::ArrayAccess { .. })
    }

    /// Name of the identifier, if this node is one
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expr::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Postfix operands need no parentheses; casts do.
    fn is_simple(&self) -> bool {
        !matches!(self, Expr::Cast { .. })
    }

    /// Rewrite every identifier through `f`, bottom-up.
    ///
    /// `f` returns `None` to keep the identifier as is.
    pub fn map_identifiers<F>(&self, f: &mut F) -> Expr
    where
        F: FnMut(&str) -> Option<Expr>,
    {
        match self {
            Expr::Identifier(name) => f(name).unwrap_or_else(|| self.clone()),
            Expr::ArrayAccess { base, index } => Expr::index(base.map_identifiers(f), *index),
            Expr::FieldAccess {
                base,
                field,
                via_pointer,
            } => Expr::field(base.map_identifiers(f), field.clone(), *via_pointer),
            Expr::Cast { target_type, inner } => {
                Expr::cast(target_type.clone(), inner.map_identifiers(f))
            }
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_simple() {
            write!(f, "{}", self)
        } else {
            write!(f, "({})", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier(name) => write!(f, "{}", name),
            Expr::ArrayAccess { base, index } => {
                base.fmt_operand(f)?;
                write!(f, "[{}]", index)
            }
            Expr::FieldAccess {
                base,
                field,
                via_pointer,
            } => {
                base.fmt_operand(f)?;
                let link = if *via_pointer { "->" } else { "." };
                write!(f, "{}{}", link, field)
            }
            Expr::Cast { target_type, inner } => {
                write!(f, "({}) ", target_type)?;
                inner.fmt_operand(f)
            }
        }
    }
}

#[cfg(test)]
#[path = "ast_tests.rs"]
mod tests;
