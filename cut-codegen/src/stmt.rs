//! Minimal C statement model and its text rendering

use std::fmt::Write;

/// One statement of a generated test body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CStmt {
    /// `TYPE NAME;`
    Declare {
        /// Type spelling
        ty: String,
        /// Declared name
        name: String,
    },
    /// `TARGET = VALUE;`
    Assign {
        /// Rendered lvalue
        target: String,
        /// Rendered rvalue
        value: String,
    },
    /// `FUNCTION(ARGS...);`
    Call {
        /// Callee name
        function: String,
        /// Rendered arguments
        args: Vec<String>,
    },
    /// `for (int VAR = 0; VAR < BOUND; VAR++) { BODY }`
    For {
        /// Counter name
        var: String,
        /// Exclusive upper bound
        bound: u64,
        /// Loop body
        body: Vec<CStmt>,
    },
}

impl CStmt {
    /// Declaration statement
    pub fn declare(ty: impl Into<String>, name: impl Into<String>) -> Self {
        CStmt::Declare {
            ty: ty.into(),
            name: name.into(),
        }
    }

    /// Assignment statement
    pub fn assign(target: impl Into<String>, value: impl Into<String>) -> Self {
        CStmt::Assign {
            target: target.into(),
            value: value.into(),
        }
    }

    /// Call statement
    pub fn call(function: impl Into<String>, args: Vec<String>) -> Self {
        CStmt::Call {
            function: function.into(),
            args,
        }
    }

    /// Write this statement at nesting `level`
    pub fn render(&self, out: &mut String, indent: usize, level: usize) {
        let pad = " ".repeat(indent * level);
        match self {
            CStmt::Declare { ty, name } => {
                let _ = writeln!(out, "{}{};", pad, declarator(ty, name));
            }
            CStmt::Assign { target, value } => {
                let _ = writeln!(out, "{}{} = {};", pad, target, value);
            }
            CStmt::Call { function, args } => {
                let _ = writeln!(out, "{}{}({});", pad, function, args.join(", "));
            }
            CStmt::For { var, bound, body } => {
                let _ = writeln!(
                    out,
                    "{}for (int {var} = 0; {var} < {}; {var}++)",
                    pad,
                    bound,
                    var = var
                );
                let _ = writeln!(out, "{}{{", pad);
                for stmt in body {
                    stmt.render(out, indent, level + 1);
                }
                let _ = writeln!(out, "{}}}", pad);
            }
        }
    }
}

/// A `void NAME()` function definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CFunction {
    /// Function name
    pub name: String,
    /// Body statements
    pub body: Vec<CStmt>,
}

impl CFunction {
    /// Render the whole definition
    pub fn render(&self, indent: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "void {}()", self.name);
        out.push_str("{\n");
        for stmt in &self.body {
            stmt.render(&mut out, indent, 1);
        }
        out.push_str("}\n");
        out
    }
}

/// Place `name` inside a type spelling. Function pointer spellings take
/// the name inside their `(*)`.
fn declarator(ty: &str, name: &str) -> String {
    match ty.find("(*)") {
        Some(pos) => format!("{}(*{}){}", &ty[..pos], name, &ty[pos + 3..]),
        None => format!("{} {}", ty, name),
    }
}
