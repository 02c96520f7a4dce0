//! Recursive-descent expression parser.
//!
//! Precedence, loosest first: `or`, `and`, `== !=`, `< <= > >=`, `+ -`,
//! `* / %`, unary `-`/`not`, then calls and atoms.

use super::lexer::Token;
use super::types::{BinaryOp, Expr, UnaryOp};

/// Deepest expression tree the parser builds. Evaluation and drop both
/// recurse over the tree, so this bounds their stack use too.
pub const MAX_NESTING: usize = 256;

pub struct ExprParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> ExprParser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    pub fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, expected: &Token) -> Result<(), String> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(format!(
                "expected {}, found {}",
                expected.describe(),
                self.found()
            ))
        }
    }

    pub fn found(&self) -> String {
        self.peek()
            .map(Token::describe)
            .unwrap_or_else(|| "end of line".to_string())
    }

    /// Fails unless every token was consumed.
    pub fn finish(&self) -> Result<(), String> {
        if self.is_done() {
            Ok(())
        } else {
            Err(format!("unexpected {}", self.found()))
        }
    }

    pub fn expression(&mut self) -> Result<Expr, String> {
        self.or()
    }

    fn or(&mut self) -> Result<Expr, String> {
        self.chain(Self::and, |token| match token {
            Token::Or => Some(BinaryOp::Or),
            _ => None,
        })
    }

    fn and(&mut self) -> Result<Expr, String> {
        self.chain(Self::equality, |token| match token {
            Token::And => Some(BinaryOp::And),
            _ => None,
        })
    }

    fn equality(&mut self) -> Result<Expr, String> {
        self.chain(Self::comparison, |token| match token {
            Token::EqEq => Some(BinaryOp::Eq),
            Token::NotEq => Some(BinaryOp::Ne),
            _ => None,
        })
    }

    fn comparison(&mut self) -> Result<Expr, String> {
        self.chain(Self::additive, |token| match token {
            Token::Less => Some(BinaryOp::Lt),
            Token::LessEq => Some(BinaryOp::Le),
            Token::Greater => Some(BinaryOp::Gt),
            Token::GreaterEq => Some(BinaryOp::Ge),
            _ => None,
        })
    }

    fn additive(&mut self) -> Result<Expr, String> {
        self.chain(Self::multiplicative, |token| match token {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn multiplicative(&mut self) -> Result<Expr, String> {
        self.chain(Self::unary, |token| match token {
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            Token::Percent => Some(BinaryOp::Rem),
            _ => None,
        })
    }

    /// Left-associative run of `operand (op operand)*` at one precedence
    /// level. Every operator deepens the tree, so each one counts against
    /// the nesting limit.
    fn chain(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, String>,
        operator: fn(&Token) -> Option<BinaryOp>,
    ) -> Result<Expr, String> {
        let outer = self.depth;
        let mut lhs = operand(self)?;
        while let Some(op) = self.peek().and_then(operator) {
            self.pos += 1;
            self.nest()?;
            let rhs = operand(self)?;
            lhs = binary(op, lhs, rhs);
        }
        self.depth = outer;
        Ok(lhs)
    }

    fn nest(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err("expression nested too deeply".to_string());
        }
        Ok(())
    }

    fn unary(&mut self) -> Result<Expr, String> {
        let op = match self.peek() {
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Not) => UnaryOp::Not,
            _ => return self.primary(),
        };
        self.pos += 1;
        let outer = self.depth;
        self.nest()?;
        let operand = self.unary()?;
        self.depth = outer;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn primary(&mut self) -> Result<Expr, String> {
        let found = self.found();
        match self.advance() {
            Some(Token::Int(value)) => Ok(Expr::Int(*value)),
            Some(Token::Str(value)) => Ok(Expr::Str(value.clone())),
            Some(Token::True) => Ok(Expr::Bool(true)),
            Some(Token::False) => Ok(Expr::Bool(false)),
            Some(Token::Nil) => Ok(Expr::Nil),
            Some(Token::ParenOpen) => {
                let outer = self.depth;
                self.nest()?;
                let inner = self.expression()?;
                self.expect(&Token::ParenClose)?;
                self.depth = outer;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if !self.eat(&Token::ParenOpen) {
                    return Ok(Expr::Var(name.clone()));
                }
                let outer = self.depth;
                self.nest()?;
                let mut args = Vec::new();
                if !self.eat(&Token::ParenClose) {
                    loop {
                        args.push(self.expression()?);
                        if self.eat(&Token::ParenClose) {
                            break;
                        }
                        self.expect(&Token::Comma)?;
                    }
                }
                self.depth = outer;
                Ok(Expr::Call {
                    name: name.clone(),
                    args,
                })
            }
            _ => Err(format!("expected an expression, found {found}")),
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

/// Parse a complete expression from `tokens`.
pub fn parse_expression(tokens: &[Token]) -> Result<Expr, String> {
    let mut parser = ExprParser::new(tokens);
    let expr = parser.expression()?;
    parser.finish()?;
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::lex_line;

    fn parse(source: &str) -> Expr {
        parse_expression(&lex_line(source).unwrap()).unwrap()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(
            parse("1 + 2 * 3"),
            binary(
                BinaryOp::Add,
                Expr::Int(1),
                binary(BinaryOp::Mul, Expr::Int(2), Expr::Int(3))
            )
        );
    }

    #[test]
    fn subtraction_is_left_associative() {
        assert_eq!(
            parse("5 - 2 - 1"),
            binary(
                BinaryOp::Sub,
                binary(BinaryOp::Sub, Expr::Int(5), Expr::Int(2)),
                Expr::Int(1)
            )
        );
    }

    #[test]
    fn nested_calls() {
        assert_eq!(
            parse("fib(n - 1) + fib(n - 2)"),
            binary(
                BinaryOp::Add,
                Expr::Call {
                    name: "fib".into(),
                    args: vec![binary(
                        BinaryOp::Sub,
                        Expr::Var("n".into()),
                        Expr::Int(1)
                    )],
                },
                Expr::Call {
                    name: "fib".into(),
                    args: vec![binary(
                        BinaryOp::Sub,
                        Expr::Var("n".into()),
                        Expr::Int(2)
                    )],
                },
            )
        );
    }

    #[test]
    fn logical_operators_are_loosest() {
        assert_eq!(
            parse("not a or b and c < 1"),
            binary(
                BinaryOp::Or,
                Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(Expr::Var("a".into())),
                },
                binary(
                    BinaryOp::And,
                    Expr::Var("b".into()),
                    binary(BinaryOp::Lt, Expr::Var("c".into()), Expr::Int(1))
                )
            )
        );
    }

    #[test]
    fn reports_trailing_tokens() {
        let err = parse_expression(&lex_line("1 2").unwrap()).unwrap_err();
        assert_eq!(err, "unexpected integer `2`");
    }

    #[test]
    fn reports_unclosed_call() {
        let err = parse_expression(&lex_line("f(1, 2").unwrap()).unwrap_err();
        assert!(err.contains("end of line"), "{err}");
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let source = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
        let err = parse_expression(&lex_line(&source).unwrap()).unwrap_err();
        assert_eq!(err, "expression nested too deeply");

        let negations = format!("{}1", "- ".repeat(MAX_NESTING + 1));
        assert!(parse_expression(&lex_line(&negations).unwrap()).is_err());

        let sum = vec!["1"; MAX_NESTING + 2].join(" + ");
        assert!(parse_expression(&lex_line(&sum).unwrap()).is_err());
    }

    #[test]
    fn nesting_below_the_limit_parses() {
        let source = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse(&source), Expr::Int(1));
        let sum = vec!["1"; 50].join(" + ");
        assert!(parse_expression(&lex_line(&sum).unwrap()).is_ok());
    }
}
