//! Lexer: tokenizes formula text.
//!
//! Produces the token stream the parser consumes. Connectives are accepted
//! both as ASCII symbols (`~ & | -> <->`) and as lowercase keywords
//! (`not and or implies iff`). Brackets and angle brackets are emitted as
//! separate tokens; the parser assembles them into modal operators.

use crate::error::{Result, SyntaxError};

/// A token produced by the lexer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The raw text of the token
    pub text: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub col: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            col,
        }
    }

    /// Human-readable description used in error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Ident => format!("identifier '{}'", self.text),
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}

/// Token types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    True,
    False,
    BoxWord,
    DiamondWord,

    // Connectives
    Not,
    And,
    Or,
    Implies,
    Iff,

    Ident,

    // Structural
    LParen,
    RParen,
    LBracket,
    RBracket,
    LAngle,
    RAngle,

    // End of input
    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::BoxWord => write!(f, "box"),
            Self::DiamondWord => write!(f, "diamond"),
            Self::Not => write!(f, "~"),
            Self::And => write!(f, "&"),
            Self::Or => write!(f, "|"),
            Self::Implies => write!(f, "->"),
            Self::Iff => write!(f, "<->"),
            Self::Ident => write!(f, "identifier"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::LBracket => write!(f, "["),
            Self::RBracket => write!(f, "]"),
            Self::LAngle => write!(f, "<"),
            Self::RAngle => write!(f, ">"),
            Self::Eof => write!(f, "end of input"),
        }
    }
}

/// Words reserved by the grammar. They cannot name propositions or modalities.
pub const KEYWORDS: &[&str] = &[
    "true", "false", "not", "and", "or", "implies", "iff", "box", "diamond",
];

fn keyword(word: &str) -> Option<TokenKind> {
    match word {
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "not" => Some(TokenKind::Not),
        "and" => Some(TokenKind::And),
        "or" => Some(TokenKind::Or),
        "implies" => Some(TokenKind::Implies),
        "iff" => Some(TokenKind::Iff),
        "box" => Some(TokenKind::BoxWord),
        "diamond" => Some(TokenKind::DiamondWord),
        _ => None,
    }
}

/// Returns true if `name` is a valid proposition or modality identifier.
///
/// Identifiers are letters, digits and underscores, not starting with a
/// digit, and not one of the [`KEYWORDS`].
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && keyword(name).is_none()
}

/// Lexer for formula text.
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    /// Create a new lexer from input text.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Tokenize the entire input. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.pos >= self.input.len() {
                tokens.push(Token::new(TokenKind::Eof, "", self.line, self.col));
                break;
            }

            let token = self.next_token()?;
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token> {
        let ch = self.input[self.pos];
        let line = self.line;
        let col = self.col;

        match ch {
            '(' => Ok(self.single(TokenKind::LParen, "(")),
            ')' => Ok(self.single(TokenKind::RParen, ")")),
            '[' => Ok(self.single(TokenKind::LBracket, "[")),
            ']' => Ok(self.single(TokenKind::RBracket, "]")),
            '>' => Ok(self.single(TokenKind::RAngle, ">")),
            '~' | '!' => Ok(self.single(TokenKind::Not, ch.to_string())),
            '&' => {
                self.advance();
                if self.peek_at(0) == Some('&') {
                    self.advance();
                    return Ok(Token::new(TokenKind::And, "&&", line, col));
                }
                Ok(Token::new(TokenKind::And, "&", line, col))
            }
            '|' => {
                self.advance();
                if self.peek_at(0) == Some('|') {
                    self.advance();
                    return Ok(Token::new(TokenKind::Or, "||", line, col));
                }
                Ok(Token::new(TokenKind::Or, "|", line, col))
            }
            '-' if self.peek_at(1) == Some('>') => {
                self.advance();
                self.advance();
                Ok(Token::new(TokenKind::Implies, "->", line, col))
            }
            '<' if self.peek_at(1) == Some('-') && self.peek_at(2) == Some('>') => {
                self.advance();
                self.advance();
                self.advance();
                Ok(Token::new(TokenKind::Iff, "<->", line, col))
            }
            '<' => Ok(self.single(TokenKind::LAngle, "<")),
            c if c.is_ascii_alphabetic() || c == '_' => Ok(self.read_word()),
            _ => Err(SyntaxError::UnexpectedChar { ch, line, col }),
        }
    }

    fn single(&mut self, kind: TokenKind, text: impl Into<String>) -> Token {
        let token = Token::new(kind, text, self.line, self.col);
        self.advance();
        token
    }

    fn read_word(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        let mut text = String::new();

        while let Some(c) = self.peek_at(0) {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = keyword(&text).unwrap_or(TokenKind::Ident);
        Token::new(kind, text, line, col)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_at(0) {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        if self.pos < self.input.len() {
            if self.input[self.pos] == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
            self.pos += 1;
        }
    }
}
