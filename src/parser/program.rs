use std::path::Path;
use std::rc::Rc;

use super::expr::{parse_expression, ExprParser};
use super::lexer::{lex_line, Token};
use super::types::{Branch, Expr, Function, Input, Program, Stmt, StmtKind};
use super::SyntaxError;

/// One non-blank physical line, already tokenized.
#[derive(Debug)]
struct SourceLine {
    number: usize,
    tokens: Vec<Token>,
}

/// Which keyword closed a block.
#[derive(Debug, PartialEq)]
enum Closer {
    End,
    Else,
    Elsif,
    Eof,
}

struct BlockParser {
    lines: Vec<SourceLine>,
    pos: usize,
    path: Rc<Path>,
}

/// Parse a whole file. Line numbers in the result are 1-based physical lines.
pub fn parse_program(path: Rc<Path>, source: &str) -> Result<Program, SyntaxError> {
    let mut lines = Vec::new();
    for (index, text) in source.lines().enumerate() {
        let tokens = lex_line(text).map_err(|message| SyntaxError::new(index + 1, message))?;
        if !tokens.is_empty() {
            lines.push(SourceLine {
                number: index + 1,
                tokens,
            });
        }
    }

    let mut parser = BlockParser {
        lines,
        pos: 0,
        path: Rc::clone(&path),
    };
    let (body, closer, line) = parser.block()?;
    if closer != Closer::Eof {
        return Err(SyntaxError::new(line, "unexpected block terminator"));
    }
    Ok(Program { path, body })
}

/// Parse one line typed at the debugger prompt.
pub fn parse_input(source: &str) -> Result<Input, SyntaxError> {
    let tokens = lex_line(source).map_err(|message| SyntaxError::new(1, message))?;
    if tokens.is_empty() {
        return Ok(Input::Empty);
    }
    if let [Token::Ident(name), Token::Assign, rest @ ..] = tokens.as_slice() {
        let value = parse_expression(rest).map_err(|message| SyntaxError::new(1, message))?;
        return Ok(Input::Assign {
            name: name.clone(),
            value,
        });
    }
    let expr = parse_expression(&tokens).map_err(|message| SyntaxError::new(1, message))?;
    Ok(Input::Expr(expr))
}

impl BlockParser {
    /// Parse statements until `end`, `else`, `elsif` or end of file.
    /// Returns the statements, what closed them, and the closing line.
    fn block(&mut self) -> Result<(Vec<Stmt>, Closer, usize), SyntaxError> {
        let mut body = Vec::new();
        while self.pos < self.lines.len() {
            let number = self.lines[self.pos].number;
            let closer = match self.lines[self.pos].tokens.first() {
                Some(Token::End) => Some(Closer::End),
                Some(Token::Else) => Some(Closer::Else),
                Some(Token::Elsif) => Some(Closer::Elsif),
                _ => None,
            };
            if let Some(closer) = closer {
                // `elsif` keeps its line for the caller to read the condition.
                if closer != Closer::Elsif {
                    self.expect_bare(number)?;
                    self.pos += 1;
                }
                return Ok((body, closer, number));
            }
            body.push(self.statement()?);
        }
        let last = self.lines.last().map_or(0, |line| line.number);
        Ok((body, Closer::Eof, last))
    }

    fn expect_bare(&self, number: usize) -> Result<(), SyntaxError> {
        let tokens = &self.lines[self.pos].tokens;
        if tokens.len() > 1 {
            return Err(SyntaxError::new(
                number,
                format!("unexpected {} after {}", tokens[1].describe(), tokens[0].describe()),
            ));
        }
        Ok(())
    }

    fn statement(&mut self) -> Result<Stmt, SyntaxError> {
        let number = self.lines[self.pos].number;
        let tokens = std::mem::take(&mut self.lines[self.pos].tokens);
        self.pos += 1;
        let err = |message: String| SyntaxError::new(number, message);

        let kind = match tokens.as_slice() {
            [Token::If, cond @ ..] => {
                let cond = parse_expression(cond).map_err(err)?;
                self.if_chain(number, cond)?
            }
            [Token::While, cond @ ..] => {
                let cond = parse_expression(cond).map_err(err)?;
                let body = self.closed_block(number, "while")?;
                StmtKind::While { cond, body }
            }
            [Token::Def, rest @ ..] => {
                let (name, params) = signature(rest).map_err(err)?;
                let body = self.closed_block(number, "def")?;
                StmtKind::Def(Rc::new(Function {
                    name,
                    params,
                    body,
                    path: Rc::clone(&self.path),
                    line: number,
                }))
            }
            [Token::Return] => StmtKind::Return(None),
            [Token::Return, value @ ..] => {
                StmtKind::Return(Some(parse_expression(value).map_err(err)?))
            }
            [Token::Print, rest @ ..] => StmtKind::Print(arguments(rest).map_err(err)?),
            [Token::Import, Token::Str(target)] => StmtKind::Import(target.clone()),
            [Token::Import, ..] => {
                return Err(err("import expects a single string path".to_string()))
            }
            [Token::Debugger] => StmtKind::Debugger,
            [Token::Ident(name), Token::Assign, value @ ..] => StmtKind::Assign {
                name: name.clone(),
                value: parse_expression(value).map_err(err)?,
            },
            _ => StmtKind::Expr(parse_expression(&tokens).map_err(err)?),
        };

        Ok(Stmt { line: number, kind })
    }

    fn closed_block(&mut self, opened_at: usize, keyword: &str) -> Result<Vec<Stmt>, SyntaxError> {
        let (body, closer, line) = self.block()?;
        match closer {
            Closer::End => Ok(body),
            Closer::Eof => Err(SyntaxError::new(
                opened_at,
                format!("`{keyword}` is missing its `end`"),
            )),
            Closer::Else | Closer::Elsif => Err(SyntaxError::new(
                line,
                format!("`else`/`elsif` inside `{keyword}` without `if`"),
            )),
        }
    }

    fn if_chain(&mut self, opened_at: usize, cond: Expr) -> Result<StmtKind, SyntaxError> {
        let mut branches = Vec::new();
        let mut branch_line = opened_at;
        let mut branch_cond = cond;

        loop {
            let (body, closer, line) = self.block()?;
            branches.push(Branch {
                line: branch_line,
                cond: branch_cond,
                body,
            });
            match closer {
                Closer::End => {
                    return Ok(StmtKind::If {
                        branches,
                        otherwise: Vec::new(),
                    })
                }
                Closer::Else => {
                    let otherwise = self.closed_block(line, "else")?;
                    return Ok(StmtKind::If {
                        branches,
                        otherwise,
                    });
                }
                Closer::Elsif => {
                    let tokens = std::mem::take(&mut self.lines[self.pos].tokens);
                    self.pos += 1;
                    branch_cond = parse_expression(&tokens[1..])
                        .map_err(|message| SyntaxError::new(line, message))?;
                    branch_line = line;
                }
                Closer::Eof => {
                    return Err(SyntaxError::new(opened_at, "`if` is missing its `end`"))
                }
            }
        }
    }
}

/// `name(a, b)` after `def`.
fn signature(tokens: &[Token]) -> Result<(String, Vec<String>), String> {
    let mut parser = ExprParser::new(tokens);
    let found = parser.found();
    let name = match parser.advance() {
        Some(Token::Ident(name)) => name.clone(),
        _ => return Err(format!("expected a function name, found {found}")),
    };
    let mut params = Vec::new();
    if parser.eat(&Token::ParenOpen) && !parser.eat(&Token::ParenClose) {
        loop {
            let found = parser.found();
            match parser.advance() {
                Some(Token::Ident(param)) if params.contains(param) => {
                    return Err(format!("duplicate parameter `{param}`"));
                }
                Some(Token::Ident(param)) => params.push(param.clone()),
                _ => return Err(format!("expected a parameter name, found {found}")),
            }
            if parser.eat(&Token::ParenClose) {
                break;
            }
            parser.expect(&Token::Comma)?;
        }
    }
    parser.finish()?;
    Ok((name, params))
}

/// Comma-separated expressions, possibly none.
fn arguments(tokens: &[Token]) -> Result<Vec<Expr>, String> {
    let mut parser = ExprParser::new(tokens);
    let mut values = Vec::new();
    if parser.is_done() {
        return Ok(values);
    }
    loop {
        values.push(parser.expression()?);
        if parser.is_done() {
            return Ok(values);
        }
        parser.expect(&Token::Comma)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(source: &str) -> Result<Program, SyntaxError> {
        let path: Rc<Path> = Rc::from(PathBuf::from("/tmp/test.scrip"));
        parse_program(path, source)
    }

    #[test]
    fn statements_keep_physical_line_numbers() {
        let program = parse("# header\n\nx = 1\n\nprint x\n").unwrap();
        let lines: Vec<usize> = program.body.iter().map(|stmt| stmt.line).collect();
        assert_eq!(lines, vec![3, 5]);
    }

    #[test]
    fn function_definition() {
        let program = parse("def add(a, b)\n  return a + b\nend\n").unwrap();
        let StmtKind::Def(function) = &program.body[0].kind else {
            panic!("expected a def, got {:?}", program.body[0]);
        };
        assert_eq!(function.name, "add");
        assert_eq!(function.params, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(function.body.len(), 1);
        assert_eq!(function.body[0].line, 2);
    }

    #[test]
    fn if_elsif_else_chain() {
        let source = "if x < 0\n  print 1\nelsif x == 0\n  print 2\nelse\n  print 3\nend\n";
        let program = parse(source).unwrap();
        let StmtKind::If { branches, otherwise } = &program.body[0].kind else {
            panic!("expected an if");
        };
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].line, 1);
        assert_eq!(branches[1].line, 3);
        assert_eq!(otherwise.len(), 1);
        assert_eq!(otherwise[0].line, 6);
    }

    #[test]
    fn missing_end_points_at_opening_line() {
        let err = parse("x = 1\nwhile x < 3\n  x = x + 1\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("missing its `end`"));
    }

    #[test]
    fn stray_end_is_rejected() {
        let err = parse("x = 1\nend\n").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn prompt_input_forms() {
        assert_eq!(parse_input("   ").unwrap(), Input::Empty);
        assert_eq!(
            parse_input("x = 1").unwrap(),
            Input::Assign {
                name: "x".into(),
                value: Expr::Int(1)
            }
        );
        assert_eq!(
            parse_input("x == 1").unwrap(),
            Input::Expr(Expr::Binary {
                op: crate::parser::BinaryOp::Eq,
                lhs: Box::new(Expr::Var("x".into())),
                rhs: Box::new(Expr::Int(1)),
            })
        );
        assert!(parse_input("while x").is_err());
    }
}
