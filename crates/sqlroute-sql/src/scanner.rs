//! Lexical scanner for SQL text
//!
//! This is a deliberately small SQL lexer. It only tells apart the token
//! kinds needed to find bind markers without looking inside quoted text or
//! comments:
//!
//! - whitespace runs
//! - `--` line comments (newline included)
//! - `/* */` block comments, which nest
//! - identifiers (keywords included)
//! - `"quoted"` identifiers and `'string'` literals, with doubled-quote escapes
//! - numeric literals
//! - operators
//!
//! Lexical rules follow the PostgreSQL documentation
//! (<https://www.postgresql.org/docs/current/sql-syntax-lexical.html>).
//! Nothing is validated: malformed input still yields a token stream that
//! covers the input exactly, ending with a single [`TokenKind::Eof`].
//!
//! The scanner walks bytes. Every delimiter it looks for is ASCII, so token
//! boundaries always land on UTF-8 character boundaries.

use std::iter::FusedIterator;

/// Characters forming whitespace tokens
const SPACE: &[u8] = b" \t\r\n";

/// Characters that may start an operator
const OPERATOR_START: &[u8] = b"?()<=>|:.![],;+-^*/%";

/// Characters that end an identifier (not included in it)
const DELIMITERS: &[u8] = b" \t\r\n'\"()[],;$:.+-*/<>=~!@#%^&|`?";

/// Two-character operators, checked before single characters
const TWO_CHAR_OPERATORS: [&[u8]; 8] = [b"<=", b"<>", b">=", b"||", b"::", b"..", b"->", b"!="];

/// Single-character operators
const ONE_CHAR_OPERATORS: &[u8] = b"()[],;.+-^*/%<>=";

/// Kind of a scanned token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Run of spaces, tabs, carriage returns and newlines
    Whitespace,

    /// `--` comment, up to and including the newline
    LineComment,

    /// `/* */` comment, nested comments included
    BlockComment,

    /// Bare identifier or keyword, including `:name` bind markers
    Identifier,

    /// `"double quoted"` identifier
    QuotedIdentifier,

    /// `'single quoted'` string literal
    StringLiteral,

    /// Numeric constant
    Numeric,

    /// Operator or punctuation
    Operator,

    /// End of input, always the last token
    Eof,
}

impl TokenKind {
    /// Whether bind markers inside this kind of token are ignored
    pub fn is_opaque(&self) -> bool {
        matches!(
            self,
            Self::LineComment | Self::BlockComment | Self::QuotedIdentifier | Self::StringLiteral
        )
    }
}

/// A classified slice of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Token kind
    pub kind: TokenKind,

    /// Byte offset of the token in the input
    pub pos: usize,

    /// Exact source text of the token
    pub text: &'a str,
}

impl<'a> Token<'a> {
    /// Byte offset just past the token
    pub fn end(&self) -> usize {
        self.pos + self.text.len()
    }

    /// Whether a quoted token or block comment is properly closed.
    ///
    /// Always true for the other kinds.
    pub fn is_terminated(&self) -> bool {
        let bytes = self.text.as_bytes();
        match self.kind {
            TokenKind::QuotedIdentifier | TokenKind::StringLiteral => {
                // opening quote + doubled escapes + closing quote is even
                let quote = bytes[0];
                bytes.iter().filter(|&&b| b == quote).count() % 2 == 0
            }
            TokenKind::BlockComment => block_comment_depth(bytes) == 0,
            _ => true,
        }
    }
}

impl std::fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "<EOF>"),
            TokenKind::Whitespace => write!(f, "<Space>"),
            TokenKind::LineComment => write!(f, "<Comment>      {}", self.text.trim_end()),
            TokenKind::BlockComment => write!(f, "<BlockComment> {}", self.text),
            TokenKind::Identifier => write!(f, "<Identifier>   {}", self.text),
            TokenKind::QuotedIdentifier => write!(f, "<\"Identifier\"> {}", self.text),
            TokenKind::StringLiteral => write!(f, "<String>       {}", self.text),
            TokenKind::Numeric => write!(f, "<Numeric>      {}", self.text),
            TokenKind::Operator => write!(f, "<Operator>     {}", self.text),
        }
    }
}

/// Nesting depth left open at the end of a block comment's text
fn block_comment_depth(bytes: &[u8]) -> usize {
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match (bytes[i], bytes.get(i + 1).copied()) {
            (b'/', Some(b'*')) => {
                depth += 1;
                i += 2;
            }
            (b'*', Some(b'/')) => {
                depth = depth.saturating_sub(1);
                i += 2;
                if depth == 0 {
                    return if i == bytes.len() { 0 } else { 1 };
                }
            }
            _ => i += 1,
        }
    }
    depth
}

/// Pull-based SQL token scanner.
///
/// Single pass: once [`TokenKind::Eof`] has been yielded the iterator is
/// exhausted. Create a new scanner to scan again.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    start: usize,
    depth: usize,
    done: bool,
}

impl<'a> Scanner<'a> {
    /// Create a scanner over `input`
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
            depth: 0,
            done: false,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    fn rest(&self) -> &'a [u8] {
        &self.input.as_bytes()[self.pos..]
    }

    fn emit(&mut self, kind: TokenKind) -> Token<'a> {
        let token = Token {
            kind,
            pos: self.start,
            text: &self.input[self.start..self.pos],
        };
        self.start = self.pos;
        token
    }

    /// Scan one token starting at `self.pos`, which is not at end of input
    fn scan(&mut self) -> TokenKind {
        let c = self.rest()[0];
        match c {
            b'\'' => self.scan_quoted(b'\'', TokenKind::StringLiteral),
            b'"' => self.scan_quoted(b'"', TokenKind::QuotedIdentifier),
            b'-' if self.peek_at(1) == Some(b'-') => self.scan_line_comment(),
            b'/' if self.peek_at(1) == Some(b'*') => self.scan_block_comment(),
            b'.' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => self.scan_numeric(),
            b'0'..=b'9' => self.scan_numeric(),
            _ if SPACE.contains(&c) => self.scan_space(),
            _ if OPERATOR_START.contains(&c) => self.scan_operator(),
            _ => self.scan_identifier(),
        }
    }

    fn scan_space(&mut self) -> TokenKind {
        while self.peek().is_some_and(|c| SPACE.contains(&c)) {
            self.pos += 1;
        }
        TokenKind::Whitespace
    }

    fn scan_operator(&mut self) -> TokenKind {
        let rest = self.rest();

        if rest.len() >= 3 && rest.starts_with(b"??") && matches!(rest[2], b'(' | b')') {
            self.pos += 3;
            return TokenKind::Operator;
        }

        if rest.len() >= 2 && TWO_CHAR_OPERATORS.iter().any(|op| *op == &rest[..2]) {
            self.pos += 2;
            return TokenKind::Operator;
        }

        if ONE_CHAR_OPERATORS.contains(&rest[0]) {
            self.pos += 1;
            return TokenKind::Operator;
        }

        // `:name`, `?`, `!`, `|` and friends
        self.scan_identifier()
    }

    fn scan_identifier(&mut self) -> TokenKind {
        // the first character belongs to the identifier even if it is a delimiter
        self.pos += 1;
        while self.peek().is_some_and(|c| !DELIMITERS.contains(&c)) {
            self.pos += 1;
        }
        TokenKind::Identifier
    }

    /// Quoted text is read byte by byte; a doubled quote is an escaped quote.
    fn scan_quoted(&mut self, quote: u8, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        loop {
            match self.rest().iter().position(|&b| b == quote) {
                Some(i) => self.pos += i + 1,
                None => {
                    self.pos = self.input.len();
                    break;
                }
            }
            if self.peek() != Some(quote) {
                break;
            }
            self.pos += 1;
        }
        kind
    }

    fn scan_numeric(&mut self) -> TokenKind {
        let mut fraction = false;
        let mut exponent = false;

        while let Some(c) = self.peek() {
            match c {
                b'0'..=b'9' => self.pos += 1,
                b'.' if !fraction => {
                    fraction = true;
                    self.pos += 1;
                }
                b'e' | b'E' if !exponent => {
                    exponent = true;
                    // a fraction is allowed again in the exponent
                    fraction = false;
                    self.pos += 1;
                    if matches!(self.peek(), Some(b'+' | b'-')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
        TokenKind::Numeric
    }

    fn scan_line_comment(&mut self) -> TokenKind {
        self.pos += 2;
        match self.rest().iter().position(|&b| b == b'\n') {
            Some(i) => self.pos += i + 1,
            None => self.pos = self.input.len(),
        }
        TokenKind::LineComment
    }

    /// An unterminated comment runs to end of input, closing every level.
    fn scan_block_comment(&mut self) -> TokenKind {
        self.pos += 2;
        self.depth = 1;
        while self.depth > 0 {
            match (self.peek(), self.peek_at(1)) {
                (None, _) => self.depth = 0,
                (Some(b'*'), Some(b'/')) => {
                    self.pos += 2;
                    self.depth -= 1;
                }
                (Some(b'/'), Some(b'*')) => {
                    self.pos += 2;
                    self.depth += 1;
                }
                _ => self.pos += 1,
            }
        }
        TokenKind::BlockComment
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.pos >= self.input.len() {
            self.done = true;
            return Some(self.emit(TokenKind::Eof));
        }

        let kind = self.scan();
        Some(self.emit(kind))
    }
}

impl FusedIterator for Scanner<'_> {}

/// Scan `input` into a lazy token sequence
pub fn tokenize(input: &str) -> Scanner<'_> {
    Scanner::new(input)
}
