use std::path::Path;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Str(String),
    Bool(bool),
    Nil,
    Var(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

/// One `if`/`elsif` arm. `line` is where its condition is written.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub line: usize,
    pub cond: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Assign { name: String, value: Expr },
    Expr(Expr),
    Print(Vec<Expr>),
    If {
        branches: Vec<Branch>,
        otherwise: Vec<Stmt>,
    },
    While { cond: Expr, body: Vec<Stmt> },
    Def(Rc<Function>),
    Return(Option<Expr>),
    Import(String),
    Debugger,
}

/// A statement and the 1-based source line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub line: usize,
    pub kind: StmtKind,
}

#[derive(Debug, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub path: Rc<Path>,
    pub line: usize,
}

/// A parsed source file.
#[derive(Debug)]
pub struct Program {
    pub path: Rc<Path>,
    pub body: Vec<Stmt>,
}

/// What the debugger prompt can evaluate against a live frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Empty,
    Assign { name: String, value: Expr },
    Expr(Expr),
}
