//! Tagged node variants making up the abstract syntax tree.

use crate::token::Token;

/// A parsed program: a flat sequence of top-level statements.
#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn token_literal(&self) -> &str {
        self.statements
            .first()
            .map(|s| s.token_literal())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub struct Identifier {
    pub token: Token,
    pub name: String,
}

impl Identifier {
    pub fn token_literal(&self) -> &str {
        &self.token.literal
    }
}

#[derive(Debug, Clone)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

impl BlockStatement {
    pub fn token_literal(&self) -> &str {
        &self.token.literal
    }
}

#[derive(Debug, Clone)]
pub enum Statement {
    Let(LetStatement),
    Set(SetStatement),
    Return(ReturnStatement),
    Expression(ExpressionStatement),
    Block(BlockStatement),
}

impl Statement {
    pub fn token_literal(&self) -> &str {
        match self {
            Statement::Let(s) => &s.token.literal,
            Statement::Set(s) => &s.token.literal,
            Statement::Return(s) => &s.token.literal,
            Statement::Expression(s) => &s.token.literal,
            Statement::Block(s) => &s.token.literal,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LetStatement {
    pub token: Token,
    pub name: Identifier,
    pub value: Expression,
}

#[derive(Debug, Clone)]
pub struct SetStatement {
    pub token: Token,
    pub name: Identifier,
    pub value: Expression,
}

#[derive(Debug, Clone)]
pub struct ReturnStatement {
    pub token: Token,
    pub value: Expression,
}

#[derive(Debug, Clone)]
pub struct ExpressionStatement {
    pub token: Token,
    pub value: Expression,
}

#[derive(Debug, Clone)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral { token: Token, value: i64 },
    StringLiteral { token: Token, value: String },
    BooleanLiteral { token: Token, value: bool },
    ArrayLiteral {
        token: Token,
        elements: Vec<Expression>,
    },
    HashLiteral {
        token: Token,
        pairs: Vec<(Expression, Expression)>,
    },
    Prefix {
        token: Token,
        operator: String,
        right: Box<Expression>,
    },
    Infix {
        token: Token,
        left: Box<Expression>,
        operator: String,
        right: Box<Expression>,
    },
    If {
        token: Token,
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    FunctionLiteral {
        token: Token,
        parameters: Vec<Identifier>,
        body: BlockStatement,
    },
    Call {
        token: Token,
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Index {
        token: Token,
        left: Box<Expression>,
        index: Box<Expression>,
    },
}

impl Expression {
    pub fn token_literal(&self) -> &str {
        match self {
            Expression::Identifier(i) => i.token_literal(),
            Expression::IntegerLiteral { token, .. } => &token.literal,
            Expression::StringLiteral { token, .. } => &token.literal,
            Expression::BooleanLiteral { token, .. } => &token.literal,
            Expression::ArrayLiteral { token, .. } => &token.literal,
            Expression::HashLiteral { token, .. } => &token.literal,
            Expression::Prefix { token, .. } => &token.literal,
            Expression::Infix { token, .. } => &token.literal,
            Expression::If { token, .. } => &token.literal,
            Expression::FunctionLiteral { token, .. } => &token.literal,
            Expression::Call { token, .. } => &token.literal,
            Expression::Index { token, .. } => &token.literal,
        }
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for s in &self.statements {
            write!(f, "{}", s)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl std::fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for s in &self.statements {
            write!(f, "{}", s)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::Let(s) => write!(f, "{} {} = {};", s.token.literal, s.name, s.value),
            Statement::Set(s) => write!(f, "{} {} \"{}\";", s.token.literal, s.name, s.value),
            Statement::Return(s) => write!(f, "{} {};", s.token.literal, s.value),
            Statement::Expression(s) => write!(f, "{}", s.value),
            Statement::Block(s) => write!(f, "{}", s),
        }
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Identifier(i) => write!(f, "{}", i),
            Expression::IntegerLiteral { token, .. } => write!(f, "{}", token.literal),
            Expression::StringLiteral { token, .. } => write!(f, "{}", token.literal),
            Expression::BooleanLiteral { token, .. } => write!(f, "{}", token.literal),
            Expression::ArrayLiteral { elements, .. } => {
                write!(f, "[")?;
                let rendered: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "{}", rendered.join(", "))?;
                write!(f, "]")
            }
            Expression::HashLiteral { pairs, .. } => {
                write!(f, "{{")?;
                let rendered: Vec<String> =
                    pairs.iter().map(|(k, v)| format!("{}:{}", k, v)).collect();
                write!(f, "{}", rendered.join(", "))?;
                write!(f, "}}")
            }
            Expression::Prefix {
                operator, right, ..
            } => write!(f, "({}{})", operator, right),
            Expression::Infix {
                left,
                operator,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if{} {}", condition, consequence)?;
                if let Some(alt) = alternative {
                    write!(f, "else{}", alt)?;
                }
                Ok(())
            }
            Expression::FunctionLiteral {
                token,
                parameters,
                body,
            } => {
                let params: Vec<String> = parameters.iter().map(|p| p.to_string()).collect();
                write!(f, "{}({}){}", token.literal, params.join(", "), body)
            }
            Expression::Call {
                function,
                arguments,
                ..
            } => {
                let args: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", function, args.join(", "))
            }
            Expression::Index { left, index, .. } => write!(f, "({}[{}])", left, index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn program_token_literal_is_first_statement() {
        let stmt = Statement::Let(LetStatement {
            token: Token::new(TokenKind::Let, "let"),
            name: Identifier {
                token: Token::new(TokenKind::Ident, "x"),
                name: "x".to_string(),
            },
            value: Expression::IntegerLiteral {
                token: Token::new(TokenKind::Int, "5"),
                value: 5,
            },
        });
        let program = Program {
            statements: vec![stmt],
        };
        assert_eq!(program.token_literal(), "let");
    }

    #[test]
    fn empty_program_token_literal_is_empty() {
        let program = Program { statements: vec![] };
        assert_eq!(program.token_literal(), "");
    }
}
