//! Lexical analysis (tokenization)
//!
//! The lexer converts Sayso source code into a stream of tokens with span
//! information. Matching is maximal-munch; whitespace, line breaks, and
//! `#` line comments are skipped. Any character that starts no token is a
//! lexical error and tokenization halts immediately.

use crate::diagnostic::Diagnostic;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Lexer state for tokenizing source code
pub struct Lexer {
    /// Characters of source code
    chars: Vec<char>,
    /// Current position in chars
    current: usize,
    /// Current line number (1-indexed)
    line: u32,
    /// Current column number (1-indexed)
    column: u32,
    /// Start position of current token
    start_pos: usize,
    /// Collected diagnostics
    diagnostics: Vec<Diagnostic>,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let chars: Vec<char> = source.chars().collect();
        Self {
            chars,
            current: 0,
            line: 1,
            column: 1,
            start_pos: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize the source code, returning tokens and any diagnostics.
    ///
    /// A lexical error stops the scan: the returned token stream ends at
    /// the offending character and the diagnostics vector is non-empty.
    pub fn tokenize(&mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();

        loop {
            match self.next_token() {
                Some(token) => {
                    let is_eof = token.kind == TokenKind::Eof;
                    tokens.push(token);
                    if is_eof {
                        break;
                    }
                }
                None => break,
            }
        }

        (tokens, std::mem::take(&mut self.diagnostics))
    }

    /// Scan the next token; `None` after a lexical error
    fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace_and_comments();

        self.start_pos = self.current;

        if self.is_at_end() {
            return Some(self.make_token(TokenKind::Eof, ""));
        }

        let start_line = self.line;
        let start_column = self.column;
        let c = self.advance();

        let token = match c {
            '(' => self.make_token(TokenKind::LeftParen, "("),
            ')' => self.make_token(TokenKind::RightParen, ")"),
            '{' => self.make_token(TokenKind::LeftBrace, "{"),
            '}' => self.make_token(TokenKind::RightBrace, "}"),
            '[' => self.make_token(TokenKind::LeftBracket, "["),
            ']' => self.make_token(TokenKind::RightBracket, "]"),
            ',' => self.make_token(TokenKind::Comma, ","),
            ':' => self.make_token(TokenKind::Colon, ":"),
            '+' => self.make_token(TokenKind::Plus, "+"),
            '-' => self.make_token(TokenKind::Minus, "-"),
            '*' => self.make_token(TokenKind::Star, "*"),
            '/' => self.make_token(TokenKind::Slash, "/"),

            '.' => {
                if self.match_char('.') {
                    self.make_token(TokenKind::DotDot, "..")
                } else {
                    self.error_at(start_line, start_column, "Unexpected character '.'");
                    return None;
                }
            }
            '=' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::EqEq, "==")
                } else {
                    self.error_at(start_line, start_column, "Unexpected character '='");
                    return None;
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::NotEq, "!=")
                } else {
                    self.error_at(start_line, start_column, "Unexpected character '!'");
                    return None;
                }
            }
            '<' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::Le, "<=")
                } else {
                    self.make_token(TokenKind::Lt, "<")
                }
            }
            '>' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::Ge, ">=")
                } else {
                    self.make_token(TokenKind::Gt, ">")
                }
            }

            '"' => match self.string(start_line, start_column) {
                Some(token) => token,
                None => return None,
            },

            c if c.is_ascii_digit() => self.number(),

            c if c.is_alphabetic() || c == '_' => self.identifier(),

            _ => {
                self.error_at(
                    start_line,
                    start_column,
                    &format!("Unexpected character '{}'", c),
                );
                return None;
            }
        };

        Some(token)
    }

    /// Skip whitespace, line breaks, and `#` line comments
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            if self.is_at_end() {
                return;
            }

            match self.peek() {
                ' ' | '\r' | '\t' => {
                    self.advance();
                }
                '\n' => {
                    self.advance();
                    self.line += 1;
                    self.column = 1;
                }
                '#' => {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    /// Scan a string literal. The stored lexeme has the delimiters
    /// stripped; escape sequences are kept verbatim (`\"` keeps both
    /// characters but does not terminate the literal).
    fn string(&mut self, start_line: u32, start_column: u32) -> Option<Token> {
        let content_start = self.current;

        while !self.is_at_end() && self.peek() != '"' {
            let c = self.advance();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else if c == '\\' && !self.is_at_end() {
                // Escaped character, including an escaped quote
                self.advance();
            }
        }

        if self.is_at_end() {
            self.error_at(start_line, start_column, "Unterminated string literal");
            return None;
        }

        let content: String = self.chars[content_start..self.current].iter().collect();
        self.advance(); // closing quote
        Some(self.make_token(TokenKind::String, content))
    }

    /// Scan an integer or floating-point literal. A literal is
    /// floating-point iff it contains a decimal point; `1..2` therefore
    /// lexes as `1`, `..`, `2`.
    fn number(&mut self) -> Token {
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            self.advance();
        }

        if !self.is_at_end()
            && self.peek() == '.'
            && self
                .peek_next()
                .map(|c| c.is_ascii_digit())
                .unwrap_or(false)
        {
            self.advance(); // '.'
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let lexeme: String = self.chars[self.start_pos..self.current].iter().collect();
        self.make_token(TokenKind::Number, lexeme)
    }

    /// Scan an identifier or reserved word
    fn identifier(&mut self) -> Token {
        while !self.is_at_end() && (self.peek().is_alphanumeric() || self.peek() == '_') {
            self.advance();
        }

        let lexeme: String = self.chars[self.start_pos..self.current].iter().collect();
        match TokenKind::is_keyword(&lexeme) {
            Some(kind) => self.make_token(kind, lexeme),
            None => self.make_token(TokenKind::Identifier, lexeme),
        }
    }

    fn make_token(&self, kind: TokenKind, lexeme: impl Into<String>) -> Token {
        Token::new(kind, lexeme, Span::new(self.start_pos, self.current))
    }

    fn error_at(&mut self, line: u32, column: u32, message: &str) {
        self.diagnostics.push(
            Diagnostic::error_with_code("SY0001", message, Span::new(self.start_pos, self.current))
                .with_line(line as usize)
                .with_column(column as usize)
                .with_label("lexical error"),
        );
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        self.column += 1;
        c
    }

    fn peek(&self) -> char {
        self.chars[self.current]
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.current + 1).copied()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }
}
