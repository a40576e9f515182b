//! Byte-level lexer for Lox source.
//!
//! [`Scanner`] walks a `&[u8]` and yields `Result<Token>` items, one per
//! lexeme, ending with a single `EOF` token.  A lexical error is yielded in
//! place of the offending lexeme and scanning resumes right after it, so one
//! pass reports every bad character.  [`scan_tokens`] drains a scanner into
//! a vector and hands errors to a [`Reporter`].
//!
//! Line comments are skipped with `memchr`; keywords come from a
//! compile-time `phf` table.
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! let kinds: Vec<String> = Scanner::new(b"var x = 1; // trailing")
//!     .filter_map(|t| t.ok())
//!     .map(|t| t.token_type.name().to_string())
//!     .collect();
//!
//! assert_eq!(kinds, ["VAR", "IDENTIFIER", "EQUAL", "NUMBER", "SEMICOLON", "EOF"]);
//! ```

use std::borrow::Cow;
use std::iter::FusedIterator;

use log::{debug, info};
use memchr::memchr;
use phf::phf_map;

use crate::error::{LoxError, Reporter, Result};
use crate::token::{Token, TokenType};

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"class"  => TokenType::CLASS,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"for"    => TokenType::FOR,
    b"fun"    => TokenType::FUN,
    b"if"     => TokenType::IF,
    b"nil"    => TokenType::NIL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super"  => TokenType::SUPER,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

pub struct Scanner<'a> {
    src: &'a [u8],
    /// First byte of the lexeme being scanned.
    start: usize,
    /// Next byte to look at.
    curr: usize,
    line: usize,
    eof_emitted: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Scanner {
            src,
            start: 0,
            curr: 0,
            line: 1,
            eof_emitted: false,
        }
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.curr >= self.src.len()
    }

    /// Current byte, or `0` past the end.
    #[inline]
    fn peek(&self) -> u8 {
        self.src.get(self.curr).copied().unwrap_or(0)
    }

    #[inline]
    fn peek_next(&self) -> u8 {
        self.src.get(self.curr + 1).copied().unwrap_or(0)
    }

    #[inline]
    fn bump(&mut self) -> u8 {
        let byte: u8 = self.peek();
        self.curr += 1;
        byte
    }

    /// `matched` if the next byte is `next` (consuming it), else `single`.
    fn either(&mut self, next: u8, matched: TokenType, single: TokenType) -> TokenType {
        if !self.is_at_end() && self.peek() == next {
            self.curr += 1;
            matched
        } else {
            single
        }
    }

    fn lexeme(&self) -> Cow<'a, str> {
        let src: &'a [u8] = self.src;
        String::from_utf8_lossy(&src[self.start..self.curr])
    }

    /// Scan the lexeme starting at `self.start`.  `None` means it was
    /// whitespace or a comment and produced no token.
    fn lex_token(&mut self) -> Option<Result<TokenType>> {
        let token_type: TokenType = match self.bump() {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            b'!' => self.either(b'=', TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.either(b'=', TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.either(b'=', TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.either(b'=', TokenType::GREATER_EQUAL, TokenType::GREATER),

            b'/' if self.peek() == b'/' => {
                self.skip_line_comment();
                return None;
            }
            b'/' => TokenType::SLASH,

            b' ' | b'\r' | b'\t' => return None,

            b'\n' => {
                self.line += 1;
                return None;
            }

            b'"' => return Some(self.string()),

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                return Some(Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", self.lexeme()),
                )))
            }
        };

        Some(Ok(token_type))
    }

    /// Leaves `curr` on the newline so it is still counted.
    fn skip_line_comment(&mut self) {
        self.curr = match memchr(b'\n', &self.src[self.curr..]) {
            Some(offset) => self.curr + offset,
            None => self.src.len(),
        };
    }

    /// Strings may span lines.  An unterminated one is reported on the line
    /// where input ran out.
    fn string(&mut self) -> Result<TokenType> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.bump() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        self.curr += 1;

        let body: &[u8] = &self.src[self.start + 1..self.curr - 1];
        Ok(TokenType::STRING(String::from_utf8_lossy(body).into_owned()))
    }

    /// Digits with an optional `.digits` fraction; a bare trailing `.` is
    /// left for the next token.
    fn number(&mut self) -> TokenType {
        self.skip_digits();

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.curr += 1;
            self.skip_digits();
        }

        // Only ASCII digits and one dot were consumed, so this always parses.
        let value: f64 = self.lexeme().parse().unwrap_or_default();
        TokenType::NUMBER(value)
    }

    fn skip_digits(&mut self) {
        while self.peek().is_ascii_digit() {
            self.curr += 1;
        }
    }

    fn identifier(&mut self) -> TokenType {
        while matches!(self.peek(), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.curr += 1;
        }

        KEYWORDS
            .get(&self.src[self.start..self.curr])
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.is_at_end() {
                if self.eof_emitted {
                    return None;
                }

                self.eof_emitted = true;
                return Some(Ok(Token::new(TokenType::EOF, "", self.line)));
            }

            self.start = self.curr;

            match self.lex_token() {
                None => continue,

                Some(Err(e)) => return Some(Err(e)),

                Some(Ok(token_type)) => {
                    debug!("Scanned {:?} on line {}", token_type, self.line);

                    return Some(Ok(Token::new(token_type, self.lexeme(), self.line)));
                }
            }
        }
    }
}

impl<'a> FusedIterator for Scanner<'a> {}

/// Scan the whole buffer, reporting every lexical error.
///
/// Returns the tokens (always terminated by `EOF`) and whether any error was
/// reported.
pub fn scan_tokens(src: &[u8], reporter: &mut dyn Reporter) -> (Vec<Token>, bool) {
    let mut tokens: Vec<Token> = Vec::new();
    let mut had_error = false;

    for result in Scanner::new(src) {
        match result {
            Ok(token) => tokens.push(token),

            Err(e) => {
                had_error = true;
                reporter.report(&e);
            }
        }
    }

    info!("Scanned {} token(s), had_error={}", tokens.len(), had_error);

    (tokens, had_error)
}
