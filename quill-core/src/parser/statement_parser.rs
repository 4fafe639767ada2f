//! Recursive-descent parser
//!
//! Parses programs like:
//! - `let x = 10;`
//! - `const point = { x, y: 2 };`
//! - `fn add(a, b) { a + b }`
//! - `add(point.x, point[key]) * 2`
//!
//! Precedence, loosest to tightest: assignment, additive, multiplicative,
//! call/member, primary.

use crate::error::{QuillError, Result};
use crate::parser::ast::{BinaryOperator, Expression, Program, Property, Statement};
use crate::parser::lexer::{Lexer, Token, TokenKind, EOF_VALUE};

/// Parses a token sequence into a `Program`
pub struct StatementParser {
    tokens: Vec<Token>,
    position: usize,
}

impl StatementParser {
    /// Create a new statement parser from input string
    pub fn new(input: &str) -> Result<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self::from_tokens(tokens))
    }

    /// Build a parser over an already tokenized input
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            tokens.push(Token::new(EOF_VALUE, TokenKind::Eof));
        }
        StatementParser {
            tokens,
            position: 0,
        }
    }

    /// Current token, without consuming it
    fn at(&self) -> &Token {
        // The lexer always terminates the sequence with Eof, and `eat` never
        // moves past it.
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    /// Consume and return the current token
    fn eat(&mut self) -> Token {
        let token = self.at().clone();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    /// Consume the current token if it has the given kind
    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token> {
        if self.at().kind == kind {
            Ok(self.eat())
        } else {
            Err(QuillError::syntax(message, self.at().to_string()))
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.at().kind == kind
    }

    fn not_eof(&self) -> bool {
        !self.check(TokenKind::Eof)
    }

    /// Parse a complete program (sequence of statements)
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut program = Program::new();

        while self.not_eof() {
            program.push(self.parse_statement()?);
        }

        tracing::debug!(statements = program.len(), "parsed program");
        Ok(program)
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.at().kind {
            TokenKind::Let | TokenKind::Const => self.parse_var_declaration(),
            TokenKind::Fn => self.parse_fn_declaration(),
            _ => {
                let expr = self.parse_expression()?;
                // Expression statements may be terminated by a semicolon
                if self.check(TokenKind::Semicolon) {
                    self.eat();
                }
                Ok(Statement::Expression(expr))
            }
        }
    }

    /// `(let | const) IDENT (= expr)? ;`
    fn parse_var_declaration(&mut self) -> Result<Statement> {
        let constant = self.eat().kind == TokenKind::Const;
        let identifier = self
            .expect(
                TokenKind::Identifier,
                "Expected identifier name following let | const keywords",
            )?
            .value;

        if self.check(TokenKind::Semicolon) {
            if constant {
                return Err(QuillError::syntax(
                    format!("Must assign value to constant expression '{}'", identifier),
                    self.at().to_string(),
                ));
            }
            self.eat();
            return Ok(Statement::VarDeclaration {
                constant: false,
                identifier,
                value: None,
            });
        }

        self.expect(
            TokenKind::Equals,
            "Expected equals token following identifier in var declaration",
        )?;
        let value = self.parse_expression()?;
        self.expect(
            TokenKind::Semicolon,
            "Variable declaration statement must end with semicolon",
        )?;

        Ok(Statement::VarDeclaration {
            constant,
            identifier,
            value: Some(value),
        })
    }

    /// `fn IDENT ( params ) { statement* }`
    fn parse_fn_declaration(&mut self) -> Result<Statement> {
        self.eat(); // fn
        let name = self
            .expect(
                TokenKind::Identifier,
                "Expected function name following fn keyword",
            )?
            .value;

        let mut parameters = Vec::new();
        for arg in self.parse_args()? {
            match arg {
                Expression::Identifier(param) => parameters.push(param),
                other => {
                    return Err(QuillError::syntax(
                        "Inside function declaration expected parameters to be identifiers",
                        other.kind_name(),
                    ))
                }
            }
        }

        self.expect(
            TokenKind::OpenBrace,
            "Expected function body following declaration",
        )?;

        let mut body = Vec::new();
        while self.not_eof() && !self.check(TokenKind::CloseBrace) {
            body.push(self.parse_statement()?);
        }

        self.expect(
            TokenKind::CloseBrace,
            "Closing brace expected inside function declaration",
        )?;

        Ok(Statement::FunctionDeclaration {
            name,
            parameters,
            body,
        })
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_assignment_expr()
    }

    /// Right-associative: `a = b = c` parses as `a = (b = c)`
    fn parse_assignment_expr(&mut self) -> Result<Expression> {
        let left = self.parse_additive_expr()?;

        if self.check(TokenKind::Equals) {
            self.eat();
            let value = self.parse_assignment_expr()?;
            return Ok(Expression::Assignment {
                assignee: Box::new(left),
                value: Box::new(value),
            });
        }

        Ok(left)
    }

    /// `{ key, key: expr, }`
    fn parse_object_expr(&mut self) -> Result<Expression> {
        self.expect(TokenKind::OpenBrace, "Expected '{' to open object literal")?;
        let mut properties = Vec::new();

        while self.not_eof() && !self.check(TokenKind::CloseBrace) {
            let key = self
                .expect(TokenKind::Identifier, "Object literal key expected")?
                .value;

            match self.at().kind {
                // Shorthand: { key, }
                TokenKind::Comma => {
                    self.eat();
                    properties.push(Property { key, value: None });
                    continue;
                }
                // Shorthand: { key }
                TokenKind::CloseBrace => {
                    properties.push(Property { key, value: None });
                    continue;
                }
                _ => {}
            }

            self.expect(
                TokenKind::Colon,
                "Missing colon following identifier in object literal",
            )?;
            let value = self.parse_expression()?;
            properties.push(Property {
                key,
                value: Some(value),
            });

            if !self.check(TokenKind::CloseBrace) {
                self.expect(
                    TokenKind::Comma,
                    "Expected comma or closing brace following property",
                )?;
            }
        }

        self.expect(
            TokenKind::CloseBrace,
            "Object literal missing closing brace",
        )?;
        Ok(Expression::ObjectLiteral { properties })
    }

    /// Operator of the current token, if it is one of `allowed`
    fn binary_operator(&self, allowed: &[BinaryOperator]) -> Option<BinaryOperator> {
        let token = self.at();
        if token.kind != TokenKind::BinaryOperator {
            return None;
        }
        BinaryOperator::from_symbol(&token.value).filter(|op| allowed.contains(op))
    }

    /// `multiplicative (("+" | "-") multiplicative)*`, left-associative
    fn parse_additive_expr(&mut self) -> Result<Expression> {
        let mut left = self.parse_multiplicative_expr()?;

        while let Some(operator) =
            self.binary_operator(&[BinaryOperator::Add, BinaryOperator::Subtract])
        {
            self.eat();
            let right = self.parse_multiplicative_expr()?;
            left = Expression::binary(left, operator, right);
        }

        Ok(left)
    }

    /// `callMember (("*" | "/" | "%") callMember)*`, left-associative
    fn parse_multiplicative_expr(&mut self) -> Result<Expression> {
        let mut left = self.parse_call_member_expr()?;

        while let Some(operator) = self.binary_operator(&[
            BinaryOperator::Multiply,
            BinaryOperator::Divide,
            BinaryOperator::Modulo,
        ]) {
            self.eat();
            let right = self.parse_call_member_expr()?;
            left = Expression::binary(left, operator, right);
        }

        Ok(left)
    }

    /// `primary ( "(" args ")" | "." IDENT | "[" expr "]" )*`
    fn parse_call_member_expr(&mut self) -> Result<Expression> {
        let mut expr = self.parse_primary_expr()?;

        loop {
            match self.at().kind {
                TokenKind::OpenParen => {
                    let arguments = self.parse_args()?;
                    expr = Expression::Call {
                        arguments,
                        callee: Box::new(expr),
                    };
                }
                TokenKind::Dot => {
                    self.eat();
                    let name = self.expect(
                        TokenKind::Identifier,
                        "Cannot use dot operator without an identifier on the right",
                    )?;
                    expr = Expression::Member {
                        object: Box::new(expr),
                        property: Box::new(Expression::Identifier(name.value)),
                        computed: false,
                    };
                }
                TokenKind::OpenBracket => {
                    self.eat();
                    let property = self.parse_expression()?;
                    self.expect(
                        TokenKind::CloseBracket,
                        "Missing closing bracket in computed member access",
                    )?;
                    expr = Expression::Member {
                        object: Box::new(expr),
                        property: Box::new(property),
                        computed: true,
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// `"(" (expr ("," expr)*)? ")"`
    fn parse_args(&mut self) -> Result<Vec<Expression>> {
        self.expect(TokenKind::OpenParen, "Expected open parenthesis")?;

        let mut args = Vec::new();
        if !self.check(TokenKind::CloseParen) {
            args.push(self.parse_expression()?);
            while self.check(TokenKind::Comma) {
                self.eat();
                args.push(self.parse_expression()?);
            }
        }

        self.expect(TokenKind::CloseParen, "Missing closing parenthesis")?;
        Ok(args)
    }

    fn parse_primary_expr(&mut self) -> Result<Expression> {
        match self.at().kind {
            TokenKind::Identifier => Ok(Expression::Identifier(self.eat().value)),

            TokenKind::Number => {
                let token = self.eat();
                // A run of ASCII digits always parses as f64
                let value = token
                    .value
                    .parse::<f64>()
                    .map_err(|_| QuillError::syntax("Invalid numeric literal", token.to_string()))?;
                Ok(Expression::NumericLiteral(value))
            }

            TokenKind::OpenParen => {
                self.eat();
                let value = self.parse_expression()?;
                self.expect(
                    TokenKind::CloseParen,
                    "Unexpected token found inside parenthesised expression. Expected closing parenthesis",
                )?;
                Ok(value)
            }

            TokenKind::OpenBrace => self.parse_object_expr(),

            _ => {
                let token = self.at();
                let found = if token.kind == TokenKind::Eof {
                    EOF_VALUE.to_string()
                } else {
                    token.to_string()
                };
                Err(QuillError::syntax(
                    "Unexpected token found during parsing",
                    found,
                ))
            }
        }
    }
}

/// Tokenize and parse `source` into a `Program`
pub fn produce_ast(source: &str) -> Result<Program> {
    StatementParser::new(source)?.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn num(n: f64) -> Expression {
        Expression::NumericLiteral(n)
    }

    fn ident(name: &str) -> Expression {
        Expression::identifier(name)
    }

    fn single_expression(source: &str) -> Expression {
        let program = produce_ast(source).unwrap();
        assert_eq!(program.len(), 1);
        match program.body.into_iter().next() {
            Some(Statement::Expression(expr)) => expr,
            other => panic!("Expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_program() {
        let program = produce_ast("").unwrap();
        assert!(program.is_empty());
    }

    #[test]
    fn test_one_child_per_statement() {
        let program = produce_ast("let x = 1; fn f() { x } f(); x = 2").unwrap();
        assert_eq!(program.len(), 4);
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            single_expression("2 + 3 * 4"),
            Expression::binary(
                num(2.0),
                BinaryOperator::Add,
                Expression::binary(num(3.0), BinaryOperator::Multiply, num(4.0)),
            )
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        assert_eq!(
            single_expression("(2 + 3) * 4"),
            Expression::binary(
                Expression::binary(num(2.0), BinaryOperator::Add, num(3.0)),
                BinaryOperator::Multiply,
                num(4.0),
            )
        );
    }

    #[test]
    fn test_left_associative_subtraction() {
        assert_eq!(
            single_expression("10 - 2 - 3"),
            Expression::binary(
                Expression::binary(num(10.0), BinaryOperator::Subtract, num(2.0)),
                BinaryOperator::Subtract,
                num(3.0),
            )
        );
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert_eq!(
            single_expression("a = b = 3"),
            Expression::Assignment {
                assignee: Box::new(ident("a")),
                value: Box::new(Expression::Assignment {
                    assignee: Box::new(ident("b")),
                    value: Box::new(num(3.0)),
                }),
            }
        );
    }

    #[test]
    fn test_var_declarations() {
        let program = produce_ast("let x; const y = 5;").unwrap();

        assert_eq!(
            program.body,
            vec![
                Statement::VarDeclaration {
                    constant: false,
                    identifier: "x".to_string(),
                    value: None,
                },
                Statement::VarDeclaration {
                    constant: true,
                    identifier: "y".to_string(),
                    value: Some(num(5.0)),
                },
            ]
        );
    }

    #[test]
    fn test_const_requires_initializer() {
        assert_eq!(
            produce_ast("const x; 1"),
            Err(QuillError::syntax(
                "Must assign value to constant expression 'x'",
                "Semicolon(;)"
            ))
        );
    }

    #[test]
    fn test_declaration_requires_semicolon() {
        assert!(produce_ast("let x = 5").is_err());
    }

    #[test]
    fn test_function_declaration() {
        let program = produce_ast("fn add(a, b) { a + b }").unwrap();

        assert_eq!(
            program.body,
            vec![Statement::FunctionDeclaration {
                name: "add".to_string(),
                parameters: vec!["a".to_string(), "b".to_string()],
                body: vec![Statement::Expression(Expression::binary(
                    ident("a"),
                    BinaryOperator::Add,
                    ident("b"),
                ))],
            }]
        );
    }

    #[test]
    fn test_function_parameters_must_be_identifiers() {
        let err = produce_ast("fn bad(1) { }").unwrap_err();
        assert!(matches!(err, QuillError::Syntax { .. }));
    }

    #[test]
    fn test_unclosed_function_body() {
        assert!(produce_ast("fn f() { 1").is_err());
    }

    #[test]
    fn test_object_literal_with_shorthand_and_trailing_comma() {
        assert_eq!(
            single_expression("{ a: 1, b, c: 2, }"),
            Expression::ObjectLiteral {
                properties: vec![
                    Property {
                        key: "a".to_string(),
                        value: Some(num(1.0)),
                    },
                    Property {
                        key: "b".to_string(),
                        value: None,
                    },
                    Property {
                        key: "c".to_string(),
                        value: Some(num(2.0)),
                    },
                ],
            }
        );
    }

    #[test]
    fn test_empty_object_literal() {
        assert_eq!(
            single_expression("{}"),
            Expression::ObjectLiteral { properties: vec![] }
        );
    }

    #[test]
    fn test_object_missing_colon() {
        assert!(produce_ast("{ a 1 }").is_err());
    }

    #[test]
    fn test_call_member_chains() {
        assert_eq!(
            single_expression("a.b()"),
            Expression::Call {
                arguments: vec![],
                callee: Box::new(Expression::Member {
                    object: Box::new(ident("a")),
                    property: Box::new(ident("b")),
                    computed: false,
                }),
            }
        );

        assert_eq!(
            single_expression("a[b].c"),
            Expression::Member {
                object: Box::new(Expression::Member {
                    object: Box::new(ident("a")),
                    property: Box::new(ident("b")),
                    computed: true,
                }),
                property: Box::new(ident("c")),
                computed: false,
            }
        );
    }

    #[test]
    fn test_call_arguments_and_curried_call() {
        assert_eq!(
            single_expression("f(1, x + 2)(3)"),
            Expression::Call {
                arguments: vec![num(3.0)],
                callee: Box::new(Expression::Call {
                    arguments: vec![
                        num(1.0),
                        Expression::binary(ident("x"), BinaryOperator::Add, num(2.0)),
                    ],
                    callee: Box::new(ident("f")),
                }),
            }
        );
    }

    #[test]
    fn test_call_binds_tighter_than_multiplication() {
        assert_eq!(
            single_expression("2 * f(3)"),
            Expression::binary(
                num(2.0),
                BinaryOperator::Multiply,
                Expression::Call {
                    arguments: vec![num(3.0)],
                    callee: Box::new(ident("f")),
                },
            )
        );
    }

    #[test]
    fn test_unexpected_leading_token() {
        let err = produce_ast(";").unwrap_err();
        match err {
            QuillError::Syntax { found, .. } => assert!(found.contains("Semicolon")),
            other => panic!("Expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_end_of_input() {
        let err = produce_ast("1 +").unwrap_err();
        assert_eq!(
            err,
            QuillError::syntax("Unexpected token found during parsing", "EndOfFile")
        );
    }

    #[test]
    fn test_lex_error_propagates() {
        assert_eq!(
            produce_ast("let x = #;").unwrap_err(),
            QuillError::Lex { character: '#' }
        );
    }
}
