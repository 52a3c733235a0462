//! Lexer for symbolic value expressions using logos
//!
//! Only the leading markers of the value language and its delimiters are
//! distinguished. Everything else is a `Word`; callers recover the exact
//! source text of type spellings and literals from token spans.

use crate::error::ParseError;
use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, PartialEq, Clone, Copy)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token<'a> {
    // Markers
    #[token("Element{")]
    ElementOpen,
    #[token("SymRegion{")]
    SymRegionOpen,
    #[regex(r"reg_\$[0-9]+", priority = 10)]
    Register(&'a str),
    #[regex(r"conj_\$[0-9]+", priority = 10)]
    Conjured(&'a str),

    // Delimiters
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // Punctuation
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,
    #[token("-")]
    Minus,

    #[regex(r"[^ \t\n\r{}()\[\]<>,.\-]+", priority = 1)]
    Word(&'a str),
}

impl Token<'_> {
    /// Tokens that open a brace-delimited group
    pub fn opens_brace(&self) -> bool {
        matches!(
            self,
            Token::ElementOpen | Token::SymRegionOpen | Token::LBrace
        )
    }
}

/// Pre-tokenised input with one token of lookahead beyond the cursor
#[derive(Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<(Token<'a>, Range<usize>)>,
    cursor: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Result<Self, ParseError> {
        let mut tokens = Vec::new();
        let mut inner = Token::lexer(source);
        while let Some(token) = inner.next() {
            let span = inner.span();
            match token {
                Ok(token) => tokens.push((token, span)),
                Err(()) => {
                    return Err(ParseError::UnexpectedToken {
                        position: span.start,
                        expected: "value expression".to_string(),
                        found: inner.slice().to_string(),
                    })
                }
            }
        }
        Ok(Self {
            source,
            tokens,
            cursor: 0,
        })
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn peek_token(&self) -> Option<Token<'a>> {
        self.peek_nth(0)
    }

    pub fn peek_nth(&self, n: usize) -> Option<Token<'a>> {
        self.tokens.get(self.cursor + n).map(|(token, _)| *token)
    }

    pub fn next_token(&mut self) -> Option<Token<'a>> {
        let token = self.peek_token()?;
        self.cursor += 1;
        Some(token)
    }

    /// Byte offset of the next token, or the end of input
    pub fn position(&self) -> usize {
        self.tokens
            .get(self.cursor)
            .map(|(_, span)| span.start)
            .unwrap_or(self.source.len())
    }

    /// Byte offset just past the last consumed token
    pub fn consumed_end(&self) -> usize {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|(_, span)| span.end)
            .unwrap_or(0)
    }

    /// Source text of the next token, for diagnostics
    pub fn peek_slice(&self) -> &'a str {
        self.tokens
            .get(self.cursor)
            .map(|(_, span)| &self.source[span.clone()])
            .unwrap_or("end of input")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token<'_>> {
        let mut lexer = Lexer::new(source).unwrap();
        std::iter::from_fn(|| lexer.next_token()).collect()
    }

    #[test]
    fn test_markers() {
        assert_eq!(
            tokens("Element{ SymRegion{ reg_$0 conj_$12"),
            vec![
                Token::ElementOpen,
                Token::SymRegionOpen,
                Token::Register("reg_$0"),
                Token::Conjured("conj_$12"),
            ]
        );
    }

    #[test]
    fn test_register_definition() {
        assert_eq!(
            tokens("reg_$0<int *,p>"),
            vec![
                Token::Register("reg_$0"),
                Token::Lt,
                Token::Word("int"),
                Token::Word("*"),
                Token::Comma,
                Token::Word("p"),
                Token::Gt,
            ]
        );
    }

    #[test]
    fn test_arrow_and_minus() {
        assert_eq!(
            tokens("a->b -1"),
            vec![
                Token::Word("a"),
                Token::Arrow,
                Token::Word("b"),
                Token::Minus,
                Token::Word("1"),
            ]
        );
    }

    #[test]
    fn test_field_suffix() {
        assert_eq!(
            tokens("}.len"),
            vec![Token::RBrace, Token::Dot, Token::Word("len")]
        );
    }

    #[test]
    fn test_marker_prefix_inside_word_is_word() {
        assert_eq!(tokens("reg_$"), vec![Token::Word("reg_$")]);
        assert_eq!(tokens("Elements"), vec![Token::Word("Elements")]);
    }

    #[test]
    fn test_positions() {
        let mut lexer = Lexer::new("ab, cd").unwrap();
        assert_eq!(lexer.position(), 0);
        lexer.next_token();
        assert_eq!(lexer.consumed_end(), 2);
        lexer.next_token();
        assert_eq!(lexer.position(), 4);
        assert_eq!(lexer.peek_slice(), "cd");
        lexer.next_token();
        assert_eq!(lexer.position(), 6);
        assert_eq!(lexer.peek_slice(), "end of input");
    }
}
