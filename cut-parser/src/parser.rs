//! Recursive descent parser and resolver for symbolic value expressions
//!
//! Parsing and analysis happen in one pass. Definitions met along the way
//! (`reg_$N<TYPE,INNER>`) are registered in the case tables immediately,
//! and every element access grows the size hint of the slot it indexes,
//! because later productions depend on what earlier ones registered.
//!
//! Grammar, dispatched on the leading token:
//!
//! ```text
//! expr    := element | region | regdef | atom
//! element := "Element{" expr "," INDEX "," TYPE "}" fields
//! region  := "SymRegion{" expr "}" fields
//! regdef  := reg_$N "<" TYPE "," expr ">"
//! fields  := ("." WORD)*
//! atom    := any tokens up to the enclosing delimiter
//! ```

use crate::error::ParseError;
use crate::lexer::{Lexer, Token};
use cut_core::types::{is_pointer, is_void_like, real_type, split_pointer_suffix};
use cut_core::{CaseTables, Expr, KnowledgeBase, Slot};
use tracing::{debug, trace};

pub type ParseResult<T> = Result<T, ParseError>;

/// Result of parsing one (sub-)expression
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub expr: Expr,
    /// Symbol whose binding this expression is, if any
    pub symbol: Option<String>,
    /// Storage this expression addresses, when it is known
    pub slot: Option<Slot>,
}

impl Parsed {
    fn plain(expr: Expr) -> Self {
        Self {
            expr,
            symbol: None,
            slot: None,
        }
    }
}

/// Delimiter that ends the expression currently being parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    End,
    Comma,
    Gt,
    RBrace,
}

pub struct Parser<'a, 'c> {
    lexer: Lexer<'a>,
    case: &'c mut CaseTables,
    kb: &'c dyn KnowledgeBase,
    /// Current parsing depth to prevent stack overflow
    depth: usize,
    /// Maximum allowed parsing depth
    max_depth: usize,
    /// Parameters whose parse is in progress, outermost first
    resolving: Vec<String>,
}

impl<'a, 'c> Parser<'a, 'c> {
    /// Default maximum parsing depth
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    pub fn new(
        source: &'a str,
        case: &'c mut CaseTables,
        kb: &'c dyn KnowledgeBase,
    ) -> ParseResult<Self> {
        Ok(Self {
            lexer: Lexer::new(source)?,
            case,
            kb,
            depth: 0,
            max_depth: Self::DEFAULT_MAX_DEPTH,
            resolving: Vec::new(),
        })
    }

    /// Set the maximum parsing depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse the whole input as one expression
    pub fn parse(mut self) -> ParseResult<Parsed> {
        let parsed = self.parse_expr(Stop::End)?;
        match self.lexer.peek_token() {
            None => Ok(parsed),
            Some(_) => Err(self.unexpected("end of expression")),
        }
    }

    /// Check and increment depth, returning error if max depth exceeded
    fn enter_recursion(&mut self) -> ParseResult<()> {
        if self.depth >= self.max_depth {
            return Err(ParseError::MaxDepthExceeded {
                depth: self.depth,
                max_depth: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Decrement depth when leaving a recursive call
    fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn parse_expr(&mut self, stop: Stop) -> ParseResult<Parsed> {
        self.enter_recursion()?;

        trace!("parse_expr at {} ({:?})", self.lexer.position(), stop);
        let result = match self.lexer.peek_token() {
            Some(Token::ElementOpen) => self.parse_element(),
            Some(Token::SymRegionOpen) => self.parse_region(),
            Some(Token::Register(_)) if self.lexer.peek_nth(1) == Some(Token::Lt) => {
                self.parse_register_definition()
            }
            Some(_) => self.parse_atom(stop),
            None => Err(ParseError::UnexpectedEof),
        };

        self.exit_recursion();
        result
    }

    /// `Element{INNER,INDEX,TYPE}` with optional field suffixes
    fn parse_element(&mut self) -> ParseResult<Parsed> {
        let opened_at = self.lexer.position();
        self.expect_token(Token::ElementOpen)?;

        let inner = self.parse_expr(Stop::Comma)?;
        self.expect_close(Token::Comma, "Element{", opened_at)?;
        let index_text = self.raw_until(Stop::Comma, "Element{", opened_at)?;
        self.expect_close(Token::Comma, "Element{", opened_at)?;
        let element_ty = self.raw_until(Stop::RBrace, "Element{", opened_at)?;
        self.expect_close(Token::RBrace, "Element{", opened_at)?;

        let index = parse_index(&index_text)?;

        // The base's declared type decides whether the access needs a cast.
        let mut base = inner.expr;
        if let Some(declared) = self.declared_type(inner.symbol.as_deref(), &base) {
            if is_void_like(&real_type(self.kb, &declared)) {
                let narrowed = format!("{} *", element_ty);
                debug!("narrowing {} from '{}' to '{}'", base, declared, narrowed);
                if let Some(owner) = &inner.symbol {
                    self.case.types.insert(owner.clone(), narrowed.clone());
                }
                base = Expr::cast(narrowed, base);
            }
        }

        let slot = match inner.slot {
            Some(slot) => {
                let size = u64::try_from(index.saturating_add(1)).unwrap_or(0);
                self.case.record_size_hint(&slot, size);
                Some(slot.element())
            }
            None => {
                debug!("no owner for indexed base {}", base);
                None
            }
        };

        let expr = Expr::index(base, index);
        if self.lexer.peek_token() == Some(Token::Dot) {
            let via_pointer = element_ty.contains('*');
            let expr = self.parse_fields(expr, via_pointer, Some(element_ty))?;
            return Ok(Parsed::plain(expr));
        }

        Ok(Parsed {
            expr,
            symbol: None,
            slot,
        })
    }

    /// `SymRegion{INNER}` unwraps; `SymRegion{INNER}.FIELD` is a field access
    fn parse_region(&mut self) -> ParseResult<Parsed> {
        let opened_at = self.lexer.position();
        self.expect_token(Token::SymRegionOpen)?;
        let inner = self.parse_expr(Stop::RBrace)?;
        self.expect_close(Token::RBrace, "SymRegion{", opened_at)?;

        if self.lexer.peek_token() != Some(Token::Dot) {
            return Ok(inner);
        }

        let declared = self.declared_type(inner.symbol.as_deref(), &inner.expr);
        let via_pointer = declared
            .as_deref()
            .map(|ty| is_pointer(&real_type(self.kb, ty)))
            .unwrap_or(false);
        let expr = self.parse_fields(inner.expr, via_pointer, declared)?;
        Ok(Parsed::plain(expr))
    }

    /// `reg_$N<TYPE,INNER>`: define a symbol and return its bound expression
    fn parse_register_definition(&mut self) -> ParseResult<Parsed> {
        let opened_at = self.lexer.position();
        let name = match self.lexer.next_token() {
            Some(Token::Register(name)) => name.to_string(),
            _ => return Err(self.unexpected("register")),
        };
        self.expect_token(Token::Lt)?;
        let declared = self.raw_until(Stop::Comma, "<", opened_at)?;
        self.expect_close(Token::Comma, "<", opened_at)?;

        let inner_start = self.lexer.position();
        let inner = self.parse_expr(Stop::Gt)?;
        let inner_end = self.lexer.consumed_end().max(inner_start);
        let inner_raw = self.lexer.source()[inner_start..inner_end].to_string();
        self.expect_close(Token::Gt, "<", opened_at)?;

        let resolved = real_type(self.kb, &declared);
        let slot = inner.slot.clone().unwrap_or_else(|| Slot::root(name.as_str()));
        self.case.register(
            &name,
            &inner_raw,
            inner.expr.clone(),
            Some(resolved),
            slot,
        );

        Ok(Parsed {
            slot: self.case.slots.get(&name).cloned(),
            symbol: Some(name),
            expr: inner.expr,
        })
    }

    /// Anything else: the raw text up to the enclosing delimiter.
    ///
    /// A lone `reg_$N` or `conj_$N` names a symbol whose binding is looked
    /// up later; `conj_$N{...}` payloads stay part of the raw text.
    fn parse_atom(&mut self, stop: Stop) -> ParseResult<Parsed> {
        let start = self.lexer.position();
        let mut items: Vec<Token<'a>> = Vec::new();
        let mut nesting = 0usize;
        let mut angles = 0usize;

        while let Some(token) = self.lexer.peek_token() {
            if nesting == 0 {
                if ends_atom(token, stop, angles) {
                    break;
                }
                items.push(token);
            }
            match token {
                t if t.opens_brace() => nesting += 1,
                Token::LParen | Token::LBracket => nesting += 1,
                Token::RBrace | Token::RParen | Token::RBracket => nesting -= 1,
                Token::Lt if matches!(items.iter().rev().nth(1), Some(Token::Register(_))) => {
                    angles += 1
                }
                Token::Gt if angles > 0 => angles -= 1,
                _ => {}
            }
            self.lexer.next_token();
        }

        if nesting > 0 {
            return Err(ParseError::UnclosedDelimiter {
                delimiter: "{".to_string(),
                position: start,
            });
        }

        let raw = self.lexer.source()[start..self.lexer.consumed_end().max(start)].trim();
        if raw.is_empty() {
            return Err(self.unexpected("expression"));
        }

        let symbol = match items.as_slice() {
            [Token::Register(name)] | [Token::Conjured(name)] => Some(name.to_string()),
            [Token::Conjured(name), Token::LBrace] => Some(name.to_string()),
            _ => None,
        };
        if let Some(name) = symbol.as_deref() {
            resolve_parameter(self.case, self.kb, name, &self.resolving, self.max_depth)?;
        }
        let slot = symbol
            .as_deref()
            .and_then(|name| self.case.slots.get(name).cloned());
        Ok(Parsed {
            expr: Expr::ident(raw),
            symbol,
            slot,
        })
    }

    /// `.a.b...` suffixes. The first link is given; later links follow the
    /// record layouts known to the knowledge base.
    fn parse_fields(
        &mut self,
        mut expr: Expr,
        mut via_pointer: bool,
        mut record_ty: Option<String>,
    ) -> ParseResult<Expr> {
        while self.lexer.peek_token() == Some(Token::Dot) {
            self.lexer.next_token();
            let field = match self.lexer.next_token() {
                Some(Token::Word(field)) => field.to_string(),
                _ => return Err(self.unexpected("field name")),
            };
            let field_ty = record_ty
                .as_deref()
                .and_then(|record| self.field_type(record, &field));
            expr = Expr::field(expr, field, via_pointer);
            via_pointer = field_ty
                .as_deref()
                .map(|ty| is_pointer(&real_type(self.kb, ty)))
                .unwrap_or(false);
            record_ty = field_ty;
        }
        Ok(expr)
    }

    fn field_type(&self, record: &str, field: &str) -> Option<String> {
        let resolved = real_type(self.kb, record);
        let (base, _) = split_pointer_suffix(&resolved);
        self.kb
            .struct_fields(base)?
            .iter()
            .find(|f| f.name == field)
            .map(|f| f.ty.clone())
    }

    /// Declared type of an expression's owner: its symbol's entry in the
    /// type table, or a global variable's declared type.
    fn declared_type(&self, symbol: Option<&str>, expr: &Expr) -> Option<String> {
        if let Some(ty) = symbol.and_then(|s| self.case.types.get(s)) {
            return Some(ty.clone());
        }
        expr.as_identifier()
            .and_then(|name| self.kb.global_variable_type(name))
            .map(str::to_string)
    }

    /// Raw source text up to `stop` at nesting depth zero, not consuming it
    fn raw_until(&mut self, stop: Stop, opener: &str, opened_at: usize) -> ParseResult<String> {
        let start = self.lexer.position();
        let mut nesting = 0usize;
        loop {
            let Some(token) = self.lexer.peek_token() else {
                return Err(ParseError::UnclosedDelimiter {
                    delimiter: opener.to_string(),
                    position: opened_at,
                });
            };
            if nesting == 0 && ends_atom(token, stop, 0) {
                break;
            }
            match token {
                t if t.opens_brace() => nesting += 1,
                Token::LParen | Token::LBracket => nesting += 1,
                Token::RBrace | Token::RParen | Token::RBracket => nesting -= 1,
                _ => {}
            }
            self.lexer.next_token();
        }
        let end = self.lexer.consumed_end().max(start);
        Ok(self.lexer.source()[start..end].trim().to_string())
    }

    fn expect_token(&mut self, expected: Token<'a>) -> ParseResult<()> {
        match self.lexer.peek_token() {
            Some(token) if token == expected => {
                self.lexer.next_token();
                Ok(())
            }
            Some(_) => Err(self.unexpected(&format!("{:?}", expected))),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    /// Like `expect_token`, but running out of input means `opener` was
    /// never closed
    fn expect_close(&mut self, expected: Token<'a>, opener: &str, opened_at: usize) -> ParseResult<()> {
        match self.expect_token(expected) {
            Err(ParseError::UnexpectedEof) => Err(ParseError::UnclosedDelimiter {
                delimiter: opener.to_string(),
                position: opened_at,
            }),
            other => other,
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            position: self.lexer.position(),
            expected: expected.to_string(),
            found: self.lexer.peek_slice().to_string(),
        }
    }
}

/// Parse parameter `name` of the case and register its tree.
///
/// Parameters it refers to by bare name are resolved on the way, so a
/// reference finds its owner whatever order the table lists them in.
/// `resolving` holds the parameters already being parsed; a reference back
/// into one of them is left unowned instead of looping.
pub(crate) fn resolve_parameter(
    case: &mut CaseTables,
    kb: &dyn KnowledgeBase,
    name: &str,
    resolving: &[String],
    max_depth: usize,
) -> ParseResult<()> {
    if case.is_registered(name) || resolving.iter().any(|r| r == name) {
        return Ok(());
    }
    let Some(raw) = case.parameters.get(name).cloned() else {
        return Ok(());
    };
    trace!("resolving {} = {}", name, raw);

    let mut parser = Parser::new(&raw, case, kb)?.with_max_depth(max_depth);
    parser.resolving = resolving.to_vec();
    parser.resolving.push(name.to_string());
    let parsed = parser.parse()?;

    let ty = match &parsed.symbol {
        Some(symbol) if !case.types.contains_key(name) => case.types.get(symbol).cloned(),
        _ => None,
    };
    let slot = parsed.slot.unwrap_or_else(|| Slot::root(name));
    if !case.register(name, &raw, parsed.expr, ty, slot) {
        debug!("{} already defined while parsing its own value", name);
    }
    Ok(())
}

/// Whether `token` at nesting depth zero terminates the current segment
fn ends_atom(token: Token<'_>, stop: Stop, angles: usize) -> bool {
    match token {
        Token::RBrace | Token::RParen | Token::RBracket => true,
        Token::Comma => stop == Stop::Comma && angles == 0,
        Token::Gt => stop == Stop::Gt && angles == 0,
        _ => false,
    }
}

/// Element indices carry a trailing width annotation (`2 S64b`)
fn parse_index(text: &str) -> ParseResult<i64> {
    let word = text
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::InvalidIndex(text.to_string()))?;
    let (negative, digits) = match word.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, word),
    };
    let value = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse::<i64>(),
    }
    .map_err(|_| ParseError::InvalidIndex(text.to_string()))?;
    Ok(if negative { -value } else { value })
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
