//! Line lexer for Scrip source.

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
pub enum Token {
    #[regex(r"#[^\n]*", logos::skip, allow_greedy = true)]
    Comment,

    #[token("def")]
    Def,
    #[token("end")]
    End,
    #[token("if")]
    If,
    #[token("elsif")]
    Elsif,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("return")]
    Return,
    #[token("print")]
    Print,
    #[token("import")]
    Import,
    #[token("debugger")]
    Debugger,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("nil")]
    Nil,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    Str(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(",")]
    Comma,
    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEq,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEq,
}

impl Token {
    /// Short human-readable form used in syntax errors.
    pub fn describe(&self) -> String {
        match self {
            Token::Int(value) => format!("integer `{value}`"),
            Token::Str(_) => "string literal".to_string(),
            Token::Ident(name) => format!("`{name}`"),
            other => format!("`{}`", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Token::Comment => "#",
            Token::Def => "def",
            Token::End => "end",
            Token::If => "if",
            Token::Elsif => "elsif",
            Token::Else => "else",
            Token::While => "while",
            Token::Return => "return",
            Token::Print => "print",
            Token::Import => "import",
            Token::Debugger => "debugger",
            Token::True => "true",
            Token::False => "false",
            Token::Nil => "nil",
            Token::And => "and",
            Token::Or => "or",
            Token::Not => "not",
            Token::ParenOpen => "(",
            Token::ParenClose => ")",
            Token::Comma => ",",
            Token::Assign => "=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Less => "<",
            Token::LessEq => "<=",
            Token::Greater => ">",
            Token::GreaterEq => ">=",
            Token::Int(_) | Token::Str(_) | Token::Ident(_) => "",
        }
    }
}

fn unescape(literal: &str) -> Option<String> {
    let body = &literal[1..literal.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            _ => return None,
        }
    }
    Some(out)
}

/// Tokenize a single source line. Comments are dropped.
pub fn lex_line(source: &str) -> Result<Vec<Token>, String> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(Token::Comment) => {}
            Ok(token) => tokens.push(token),
            Err(()) => {
                let slice = lexer.slice();
                return Err(if slice.starts_with('"') {
                    format!("invalid string literal {slice}")
                } else if slice.starts_with(|c: char| c.is_ascii_digit()) {
                    format!("integer literal `{slice}` is out of range")
                } else {
                    format!("unexpected character(s) `{slice}`")
                });
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_and_identifiers() {
        let tokens = lex_line("def define(x)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Def,
                Token::Ident("define".into()),
                Token::ParenOpen,
                Token::Ident("x".into()),
                Token::ParenClose,
            ]
        );
    }

    #[test]
    fn comments_are_dropped() {
        let tokens = lex_line("x = 1 # set x").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2], Token::Int(1));
    }

    #[test]
    fn hash_inside_string_is_not_a_comment() {
        let tokens = lex_line(r#"print "a # b""#).unwrap();
        assert_eq!(tokens, vec![Token::Print, Token::Str("a # b".into())]);
    }

    #[test]
    fn string_escapes() {
        let tokens = lex_line(r#""line\n\"quoted\"""#).unwrap();
        assert_eq!(tokens, vec![Token::Str("line\n\"quoted\"".into())]);
    }

    #[test]
    fn comparison_operators_prefer_longest_match() {
        let tokens = lex_line("a <= b == c != d >= e").unwrap();
        assert_eq!(tokens[1], Token::LessEq);
        assert_eq!(tokens[3], Token::EqEq);
        assert_eq!(tokens[5], Token::NotEq);
        assert_eq!(tokens[7], Token::GreaterEq);
    }

    #[test]
    fn rejects_unknown_characters() {
        let err = lex_line("x = 1 @ 2").unwrap_err();
        assert!(err.contains('@'), "{err}");
    }

    #[test]
    fn rejects_oversized_integers() {
        let err = lex_line("99999999999999999999").unwrap_err();
        assert!(err.contains("out of range"), "{err}");
    }
}
