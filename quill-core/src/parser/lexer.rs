use crate::error::{QuillError, Result};
use std::fmt;

/// Kinds of tokens in the Quill language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Number,
    Identifier,

    // End of input
    Eof,

    // Grouping and operators
    Equals,       // =
    Comma,        // ,
    Dot,          // .
    Colon,        // :
    Semicolon,    // ;
    OpenParen,    // (
    CloseParen,   // )
    OpenBrace,    // {
    CloseBrace,   // }
    OpenBracket,  // [
    CloseBracket, // ]
    BinaryOperator,

    // Keywords
    Let,
    Const,
    Fn,
}

/// A classified lexical unit with the text it was produced from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(value: impl Into<String>, kind: TokenKind) -> Self {
        Token {
            value: value.into(),
            kind,
        }
    }

    fn eof() -> Self {
        Token::new(EOF_VALUE, TokenKind::Eof)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.value)
    }
}

/// Text carried by the terminal token
pub const EOF_VALUE: &str = "EndOfFile";

/// Reserved words, matched exactly against a run of letters
fn keyword(ident: &str) -> Option<TokenKind> {
    match ident {
        "let" => Some(TokenKind::Let),
        "const" => Some(TokenKind::Const),
        "fn" => Some(TokenKind::Fn),
        _ => None,
    }
}

fn is_skippable(ch: char) -> bool {
    matches!(ch, ' ' | '\n' | '\t')
}

/// Tokenizes input strings into tokens
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Lexer {
            input: chars,
            position: 0,
            current_char,
        }
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    /// Consume the current character as a single-character token
    fn single(&mut self, ch: char, kind: TokenKind) -> Token {
        self.advance();
        Token::new(ch, kind)
    }

    /// Read a maximal run of characters matching `pred`
    fn read_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut result = String::new();

        while let Some(ch) = self.current_char {
            if pred(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        result
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token> {
        while let Some(ch) = self.current_char {
            if is_skippable(ch) {
                self.advance();
            } else {
                break;
            }
        }

        let Some(ch) = self.current_char else {
            return Ok(Token::eof());
        };

        let token = match ch {
            '+' | '-' | '*' | '/' | '%' => self.single(ch, TokenKind::BinaryOperator),
            '(' => self.single(ch, TokenKind::OpenParen),
            ')' => self.single(ch, TokenKind::CloseParen),
            '{' => self.single(ch, TokenKind::OpenBrace),
            '}' => self.single(ch, TokenKind::CloseBrace),
            '[' => self.single(ch, TokenKind::OpenBracket),
            ']' => self.single(ch, TokenKind::CloseBracket),
            '=' => self.single(ch, TokenKind::Equals),
            ';' => self.single(ch, TokenKind::Semicolon),
            ':' => self.single(ch, TokenKind::Colon),
            ',' => self.single(ch, TokenKind::Comma),
            '.' => self.single(ch, TokenKind::Dot),

            c if c.is_ascii_digit() => {
                let number = self.read_while(|c| c.is_ascii_digit());
                Token::new(number, TokenKind::Number)
            }

            c if c.is_alphabetic() => {
                let ident = self.read_while(char::is_alphabetic);
                let kind = keyword(&ident).unwrap_or(TokenKind::Identifier);
                Token::new(ident, kind)
            }

            other => return Err(QuillError::Lex { character: other }),
        };

        Ok(token)
    }

    /// Tokenize the entire input into a vector of tokens
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);

            if is_eof {
                break;
            }
        }

        tracing::trace!(count = tokens.len(), "tokenized source");
        Ok(tokens)
    }
}

/// Tokenize `source` in one call
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).tokenize()
}
