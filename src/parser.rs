//! Recursive-descent parser with Pratt-style precedence climbing for expressions.

use crate::ast::{
    BlockStatement, Expression, ExpressionStatement, Identifier, LetStatement, Program,
    ReturnStatement, SetStatement, Statement,
};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    To,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::To => Precedence::To,
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Slash | TokenKind::Asterisk => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

/// Parses `input` and returns the resulting program plus any diagnostics.
///
/// A non-empty diagnostic list means the program is not safe to evaluate,
/// even though a (possibly partial) `Program` is always returned.
pub fn parse(input: &str) -> (Program, Vec<String>) {
    let mut p = Parser::new(Lexer::new(input));
    let program = p.parse_program();
    (program, p.errors)
}

/// A Pratt parser over a token stream, tracking a list of diagnostic strings.
pub struct Parser {
    lexer: Lexer,
    errors: Vec<String>,
    trace: bool,

    current_token: Token,
    peek_token: Token,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        Self::with_trace(lexer, false)
    }

    /// Same as [`Parser::new`] but with the optional parse-trace diagnostic
    /// (written to stderr) turned on.
    pub fn with_trace(mut lexer: Lexer, trace: bool) -> Self {
        let current_token = lexer.next_token();
        let peek_token = lexer.next_token();
        Self {
            lexer,
            errors: Vec::new(),
            trace,
            current_token,
            peek_token,
        }
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    fn next_token(&mut self) {
        std::mem::swap(&mut self.current_token, &mut self.peek_token);
        self.peek_token = self.lexer.next_token();
    }

    fn current_token_is(&self, kind: TokenKind) -> bool {
        self.current_token.kind == kind
    }

    fn peek_token_is(&self, kind: TokenKind) -> bool {
        self.peek_token.kind == kind
    }

    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_token_is(kind) {
            self.next_token();
            true
        } else {
            self.peek_error(kind);
            false
        }
    }

    fn peek_error(&mut self, expected: TokenKind) {
        self.errors.push(format!(
            "expected next token to be {}, got {} instead",
            expected, self.peek_token.kind
        ));
    }

    fn no_prefix_parse_fn_error(&mut self, kind: TokenKind) {
        self.errors
            .push(format!("no prefix parse function for {} found", kind));
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek_token.kind)
    }

    fn current_precedence(&self) -> Precedence {
        precedence_of(self.current_token.kind)
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.current_token_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }
        Program { statements }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current_token.kind {
            TokenKind::Let => self.parse_let_statement().map(Statement::Let),
            TokenKind::Set => self.parse_set_statement().map(Statement::Set),
            TokenKind::Return => self.parse_return_statement().map(Statement::Return),
            _ => self.parse_expression_statement().map(Statement::Expression),
        }
    }

    fn parse_let_statement(&mut self) -> Option<LetStatement> {
        let token = self.current_token.clone();

        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let name = Identifier {
            token: self.current_token.clone(),
            name: self.current_token.literal.clone(),
        };

        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }

        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(LetStatement {
            token,
            name,
            value,
        })
    }

    fn parse_set_statement(&mut self) -> Option<SetStatement> {
        let token = self.current_token.clone();

        if !self.expect_peek(TokenKind::RepoPath) {
            return None;
        }
        let name = Identifier {
            token: self.current_token.clone(),
            name: self.current_token.literal.clone(),
        };

        self.next_token();
        let value = self.parse_string_literal()?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(SetStatement {
            token,
            name,
            value,
        })
    }

    fn parse_return_statement(&mut self) -> Option<ReturnStatement> {
        let token = self.current_token.clone();

        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(ReturnStatement { token, value })
    }

    fn parse_expression_statement(&mut self) -> Option<ExpressionStatement> {
        let token = self.current_token.clone();
        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(ExpressionStatement { token, value })
    }

    fn parse_block_statement(&mut self) -> BlockStatement {
        let token = self.current_token.clone();
        let mut statements = Vec::new();

        self.next_token();

        while !self.current_token_is(TokenKind::RBrace) && !self.current_token_is(TokenKind::Eof)
        {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }

        BlockStatement { token, statements }
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        if self.trace {
            eprintln!("parseExpression {}", self.current_token.literal);
        }

        let mut left = self.parse_prefix()?;

        while !self.peek_token_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            if !self.has_infix(self.peek_token.kind) {
                return Some(left);
            }
            self.next_token();
            left = self.parse_infix(left)?;
        }

        Some(left)
    }

    fn has_infix(&self, kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Slash
                | TokenKind::Asterisk
                | TokenKind::Eq
                | TokenKind::NotEq
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::To
                | TokenKind::LParen
                | TokenKind::LBracket
        )
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.current_token.kind {
            TokenKind::Ident => Some(Expression::Identifier(self.parse_identifier())),
            TokenKind::Int => self.parse_integer_literal(),
            TokenKind::String => self.parse_string_literal(),
            TokenKind::True | TokenKind::False => Some(self.parse_boolean()),
            TokenKind::Bang | TokenKind::Minus => self.parse_prefix_expression(),
            TokenKind::LParen => self.parse_grouped_expression(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::Function => self.parse_function_literal(),
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_hash_literal(),
            other => {
                self.no_prefix_parse_fn_error(other);
                None
            }
        }
    }

    fn parse_infix(&mut self, left: Expression) -> Option<Expression> {
        match self.current_token.kind {
            TokenKind::LParen => self.parse_call_expression(left),
            TokenKind::LBracket => self.parse_index_expression(left),
            _ => self.parse_infix_expression(left),
        }
    }

    fn parse_identifier(&self) -> Identifier {
        Identifier {
            token: self.current_token.clone(),
            name: self.current_token.literal.clone(),
        }
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        let token = self.current_token.clone();
        match token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::IntegerLiteral { token, value }),
            Err(_) => {
                self.errors
                    .push(format!("could not parse {:?} as integer", token.literal));
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        let token = self.current_token.clone();
        Some(Expression::StringLiteral {
            value: token.literal.clone(),
            token,
        })
    }

    fn parse_boolean(&self) -> Expression {
        Expression::BooleanLiteral {
            token: self.current_token.clone(),
            value: self.current_token_is(TokenKind::True),
        }
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let token = self.current_token.clone();
        let operator = token.literal.clone();

        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;

        Some(Expression::Prefix {
            token,
            operator,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.current_token.clone();
        let operator = token.literal.clone();
        let precedence = self.current_precedence();

        self.next_token();
        let right = self.parse_expression(precedence)?;

        Some(Expression::Infix {
            token,
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let exp = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }

        Some(exp)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        let token = self.current_token.clone();

        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }

        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }

        let consequence = self.parse_block_statement();
        let mut alternative = None;

        if self.peek_token_is(TokenKind::Else) {
            self.next_token();
            if !self.expect_peek(TokenKind::LBrace) {
                return None;
            }
            alternative = Some(self.parse_block_statement());
        }

        Some(Expression::If {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        let token = self.current_token.clone();

        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;

        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let body = self.parse_block_statement();

        Some(Expression::FunctionLiteral {
            token,
            parameters,
            body,
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut identifiers = Vec::new();

        if self.peek_token_is(TokenKind::RParen) {
            self.next_token();
            return Some(identifiers);
        }

        self.next_token();
        identifiers.push(self.parse_identifier());

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            identifiers.push(self.parse_identifier());
        }

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }

        Some(identifiers)
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let token = self.current_token.clone();
        let elements = self.parse_expression_list(TokenKind::RBracket)?;
        Some(Expression::ArrayLiteral { token, elements })
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let token = self.current_token.clone();
        let mut pairs = Vec::new();

        while !self.peek_token_is(TokenKind::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;

            if !self.expect_peek(TokenKind::Colon) {
                return None;
            }

            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;

            pairs.push((key, value));

            if !self.peek_token_is(TokenKind::RBrace) && !self.expect_peek(TokenKind::Comma) {
                return None;
            }
        }

        if !self.expect_peek(TokenKind::RBrace) {
            return None;
        }

        Some(Expression::HashLiteral { token, pairs })
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let token = self.current_token.clone();
        let arguments = self.parse_expression_list(TokenKind::RParen)?;
        Some(Expression::Call {
            token,
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.current_token.clone();

        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::RBracket) {
            return None;
        }

        Some(Expression::Index {
            token,
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut list = Vec::new();

        if self.peek_token_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }

        Some(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(input: &str) -> Program {
        let (program, errors) = parse(input);
        assert!(errors.is_empty(), "parser errors: {:?}", errors);
        program
    }

    #[test]
    fn let_statement() {
        let program = parse_ok("let x = 5;");
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            Statement::Let(s) => {
                assert_eq!(s.name.name, "x");
                match &s.value {
                    Expression::IntegerLiteral { value, .. } => assert_eq!(*value, 5),
                    other => panic!("expected integer literal, got {:?}", other),
                }
            }
            other => panic!("expected let statement, got {:?}", other),
        }
    }

    #[test]
    fn set_statement() {
        let program = parse_ok(r#"set repopath "/tmp/r";"#);
        match &program.statements[0] {
            Statement::Set(s) => {
                assert_eq!(s.name.name, "repopath");
                match &s.value {
                    Expression::StringLiteral { value, .. } => assert_eq!(value, "/tmp/r"),
                    other => panic!("expected string literal, got {:?}", other),
                }
            }
            other => panic!("expected set statement, got {:?}", other),
        }
    }

    #[test]
    fn function_literal_parameters_and_body() {
        let program = parse_ok("fn(x, y) { x + y }");
        match &program.statements[0] {
            Statement::Expression(es) => match &es.value {
                Expression::FunctionLiteral {
                    parameters, body, ..
                } => {
                    assert_eq!(parameters.len(), 2);
                    assert_eq!(parameters[0].name, "x");
                    assert_eq!(parameters[1].name, "y");
                    assert_eq!(body.statements.len(), 1);
                }
                other => panic!("expected function literal, got {:?}", other),
            },
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn operator_precedence() {
        let cases = [
            ("-a * b", "((-a) * b)"),
            ("a + b * c", "(a + (b * c))"),
            ("a == b < c", "(a == (b < c))"),
            ("!-a", "(!(-a))"),
            ("a + b + c", "((a + b) + c)"),
            ("a + b - c", "((a + b) - c)"),
            ("3 + 4 * 5 == 3 * 1 + 4 * 5", "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))"),
            ("a -> b -> c", "((a -> b) -> c)"),
        ];

        for (input, expected) in cases {
            let program = parse_ok(input);
            assert_eq!(program.to_string(), expected, "input was {:?}", input);
        }
    }

    #[test]
    fn semicolons_are_optional() {
        let program = parse_ok("let x = 1\nlet y = 2");
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn errors_on_missing_closing_paren() {
        let (_, errors) = parse("(1 + 2");
        assert!(!errors.is_empty());
        assert!(errors[0].contains("expected next token to be )"));
    }

    #[test]
    fn errors_on_no_prefix_parse_fn() {
        let (_, errors) = parse("1 +");
        assert!(errors.iter().any(|e| e.contains("no prefix parse function for EOF")));
    }

    #[test]
    fn errors_on_integer_overflow() {
        let (_, errors) = parse("99999999999999999999999999;");
        assert!(errors.iter().any(|e| e.contains("could not parse")));
    }

    #[test]
    fn array_and_hash_literals() {
        let program = parse_ok(r#"[1, 2 * 2, 3 + 3]"#);
        match &program.statements[0] {
            Statement::Expression(es) => match &es.value {
                Expression::ArrayLiteral { elements, .. } => assert_eq!(elements.len(), 3),
                other => panic!("expected array literal, got {:?}", other),
            },
            other => panic!("{:?}", other),
        }

        let program = parse_ok(r#"{"one": 1, "two": 2}"#);
        match &program.statements[0] {
            Statement::Expression(es) => match &es.value {
                Expression::HashLiteral { pairs, .. } => assert_eq!(pairs.len(), 2),
                other => panic!("expected hash literal, got {:?}", other),
            },
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn index_expression() {
        let program = parse_ok("myArray[1 + 1]");
        match &program.statements[0] {
            Statement::Expression(es) => {
                assert!(matches!(es.value, Expression::Index { .. }));
            }
            other => panic!("{:?}", other),
        }
    }
}
