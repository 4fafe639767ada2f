// quill-core/src/parser/mod.rs

pub mod ast;
pub mod lexer;
pub mod statement_parser;

pub use ast::{BinaryOperator, Expression, Program, Property, Statement};
pub use lexer::{tokenize, Lexer, Token, TokenKind};
pub use statement_parser::{produce_ast, StatementParser};
