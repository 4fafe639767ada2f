use std::fmt;

// ============================================================================
// Program and statements
// ============================================================================

/// A program is a sequence of top-level statements
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Statement>,
}

impl Program {
    pub fn new() -> Self {
        Program { body: Vec::new() }
    }

    pub fn push(&mut self, stmt: Statement) {
        self.body.push(stmt);
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Statement types
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `let x = 1;`, `const y = 2;`, `let z;`
    VarDeclaration {
        constant: bool,
        identifier: String,
        value: Option<Expression>,
    },

    /// `fn add(a, b) { a + b }`
    FunctionDeclaration {
        name: String,
        parameters: Vec<String>,
        body: Vec<Statement>,
    },

    /// Any expression used in statement position
    Expression(Expression),
}

// ============================================================================
// Expressions
// ============================================================================

/// Arithmetic operators accepted by `BinaryOperator` tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOperator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinaryOperator::Add),
            "-" => Some(BinaryOperator::Subtract),
            "*" => Some(BinaryOperator::Multiply),
            "/" => Some(BinaryOperator::Divide),
            "%" => Some(BinaryOperator::Modulo),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
        }
    }

    /// Apply the operator with IEEE-754 semantics (no zero-division guard)
    pub fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOperator::Add => lhs + rhs,
            BinaryOperator::Subtract => lhs - rhs,
            BinaryOperator::Multiply => lhs * rhs,
            BinaryOperator::Divide => lhs / rhs,
            BinaryOperator::Modulo => lhs % rhs,
        }
    }
}

/// A single `key` or `key: value` entry of an object literal
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: String,
    /// `None` for shorthand `{ key }`, resolved from scope at evaluation time
    pub value: Option<Expression>,
}

/// Expression types
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `target = value`. The target is an expression so that member targets
    /// can be parsed, but only identifiers evaluate.
    Assignment {
        assignee: Box<Expression>,
        value: Box<Expression>,
    },

    /// `object.property` or `object[property]`
    Member {
        object: Box<Expression>,
        property: Box<Expression>,
        computed: bool,
    },

    /// `callee(arguments...)`
    Call {
        arguments: Vec<Expression>,
        callee: Box<Expression>,
    },

    /// `{ a: 1, b }`
    ObjectLiteral { properties: Vec<Property> },

    NumericLiteral(f64),

    Identifier(String),

    Binary {
        left: Box<Expression>,
        right: Box<Expression>,
        operator: BinaryOperator,
    },
}

impl Expression {
    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(name.into())
    }

    pub fn binary(left: Expression, operator: BinaryOperator, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            right: Box::new(right),
            operator,
        }
    }

    /// Node-kind name, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expression::Assignment { .. } => "AssignmentExpr",
            Expression::Member { .. } => "MemberExpr",
            Expression::Call { .. } => "CallExpr",
            Expression::ObjectLiteral { .. } => "ObjectLiteral",
            Expression::NumericLiteral(_) => "NumericLiteral",
            Expression::Identifier(_) => "Identifier",
            Expression::Binary { .. } => "BinaryExpr",
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Assignment { assignee, value } => write!(f, "{} = {}", assignee, value),
            Expression::Member {
                object,
                property,
                computed: true,
            } => write!(f, "{}[{}]", object, property),
            Expression::Member {
                object, property, ..
            } => write!(f, "{}.{}", object, property),
            Expression::Call { arguments, callee } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expression::ObjectLiteral { properties } => {
                write!(f, "{{")?;
                for (i, prop) in properties.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    match &prop.value {
                        Some(value) => write!(f, " {}: {}", prop.key, value)?,
                        None => write!(f, " {}", prop.key)?,
                    }
                }
                if properties.is_empty() {
                    write!(f, "}}")
                } else {
                    write!(f, " }}")
                }
            }
            Expression::NumericLiteral(n) => write!(f, "{}", n),
            Expression::Identifier(name) => write!(f, "{}", name),
            Expression::Binary {
                left,
                right,
                operator,
            } => write!(f, "({} {} {})", left, operator.symbol(), right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_symbols() {
        for symbol in ["+", "-", "*", "/", "%"] {
            let op = BinaryOperator::from_symbol(symbol).unwrap();
            assert_eq!(op.symbol(), symbol);
        }
        assert_eq!(BinaryOperator::from_symbol("^"), None);
    }

    #[test]
    fn test_operator_apply() {
        assert_eq!(BinaryOperator::Modulo.apply(7.0, 3.0), 1.0);
        assert!(BinaryOperator::Divide.apply(1.0, 0.0).is_infinite());
    }

    #[test]
    fn test_display_groups_binary() {
        let expr = Expression::binary(
            Expression::NumericLiteral(2.0),
            BinaryOperator::Add,
            Expression::binary(
                Expression::NumericLiteral(3.0),
                BinaryOperator::Multiply,
                Expression::NumericLiteral(4.0),
            ),
        );
        assert_eq!(expr.to_string(), "(2 + (3 * 4))");
    }

    #[test]
    fn test_display_object_literal() {
        let expr = Expression::ObjectLiteral {
            properties: vec![
                Property {
                    key: "a".to_string(),
                    value: Some(Expression::NumericLiteral(1.0)),
                },
                Property {
                    key: "b".to_string(),
                    value: None,
                },
            ],
        };
        assert_eq!(expr.to_string(), "{ a: 1, b }");
    }
}
