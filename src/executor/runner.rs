use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::debugger::{LineHook, NoopHook, Resume};
use crate::error::{Result, ScriptError};
use crate::parser::{
    parse_program, BinaryOp, Expr, Function, Input, Program, Stmt, StmtKind, SyntaxError, UnaryOp,
};
use crate::paths;

use super::frame::ScriptFrame;
use super::prelude::{PRELUDE, PRELUDE_PATH};
use super::value::Value;

pub const DEFAULT_MAX_DEPTH: usize = 200;

type Scope = HashMap<String, Value>;

/// How a block finished.
enum Flow {
    Normal,
    Return(Value),
}

/// Tree-walking interpreter that reports every statement to a [`LineHook`].
pub struct Interpreter {
    functions: HashMap<String, Rc<Function>>,
    /// `scopes[0]` is the top level; each active call pushes one.
    scopes: Vec<Scope>,
    loaded: HashSet<PathBuf>,
    prelude_loaded: bool,
    lib_dir: Option<PathBuf>,
    max_depth: usize,
    out: Box<dyn Write>,
}

impl Interpreter {
    pub fn new(out: Box<dyn Write>) -> Self {
        Self {
            functions: HashMap::new(),
            scopes: vec![Scope::new()],
            loaded: HashSet::new(),
            prelude_loaded: false,
            lib_dir: None,
            max_depth: DEFAULT_MAX_DEPTH,
            out,
        }
    }

    /// Directory searched by `import` when a path is not found next to the
    /// importing file.
    pub fn with_lib_dir(mut self, lib_dir: Option<PathBuf>) -> Self {
        self.lib_dir = lib_dir.map(|dir| paths::normalize(&dir));
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn call_depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Look up a variable of the top-level scope.
    pub fn top_level(&self, name: &str) -> Option<&Value> {
        self.scopes.first().and_then(|scope| scope.get(name))
    }

    pub fn is_defined(&self, function: &str) -> bool {
        self.functions.contains_key(function)
    }

    /// Load and run a program file.
    pub fn run_file(&mut self, path: &Path, hook: &mut dyn LineHook) -> Result<()> {
        let path = paths::normalize(path);
        let source = fs::read_to_string(&path).map_err(|source| ScriptError::Load {
            path: path.clone(),
            source,
        })?;
        self.run_source(&path, &source, hook)
    }

    /// Run `source` as if it were the file at `path`.
    pub fn run_source(&mut self, path: &Path, source: &str, hook: &mut dyn LineHook) -> Result<()> {
        self.load_prelude()?;
        let path = paths::normalize(path);
        debug!(path = %path.display(), "running program");
        let program = parse(Rc::from(path.as_path()), source)?;
        self.loaded.insert(path);
        self.exec_block(&program.body, &program.path, hook)?;
        Ok(())
    }

    fn load_prelude(&mut self) -> Result<()> {
        if self.prelude_loaded {
            return Ok(());
        }
        self.prelude_loaded = true;
        let program = parse(Rc::from(Path::new(PRELUDE_PATH)), PRELUDE)?;
        self.exec_block(&program.body, &program.path, &mut NoopHook)?;
        Ok(())
    }

    pub(crate) fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub(crate) fn truncate_scopes(&mut self, len: usize) {
        self.scopes.truncate(len.max(1));
    }

    fn scope_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Evaluate prompt input in the current scope. Tracing is off: nothing
    /// evaluated here can suspend again.
    pub(crate) fn eval_input(&mut self, input: &Input) -> Result<Value> {
        let mut hook = NoopHook;
        match input {
            Input::Empty => Ok(Value::Nil),
            Input::Expr(expr) => self.eval_expr(expr, &mut hook),
            Input::Assign { name, value } => {
                let value = self.eval_expr(value, &mut hook)?;
                self.scope_mut().insert(name.clone(), value.clone());
                Ok(value)
            }
        }
    }

    fn trace(&mut self, path: &Path, line: usize, hook: &mut dyn LineHook) -> Result<()> {
        let mut frame = ScriptFrame::new(self, path, line);
        match hook.on_line(&mut frame) {
            Resume::Continue => Ok(()),
            Resume::Exit => Err(ScriptError::Exit),
        }
    }

    fn exec_block(&mut self, body: &[Stmt], path: &Path, hook: &mut dyn LineHook) -> Result<Flow> {
        for stmt in body {
            // A `debugger` statement is its own, single event.
            if !matches!(stmt.kind, StmtKind::Debugger) {
                self.trace(path, stmt.line, hook)?;
            }
            let flow = self
                .exec_stmt(stmt, path, hook)
                .map_err(|err| err.at(path, stmt.line))?;
            if let Flow::Return(value) = flow {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt, path: &Path, hook: &mut dyn LineHook) -> Result<Flow> {
        match &stmt.kind {
            StmtKind::Assign { name, value } => {
                let value = self.eval_expr(value, hook)?;
                self.scope_mut().insert(name.clone(), value);
            }
            StmtKind::Expr(expr) => {
                self.eval_expr(expr, hook)?;
            }
            StmtKind::Print(args) => {
                let mut parts = Vec::with_capacity(args.len());
                for arg in args {
                    parts.push(self.eval_expr(arg, hook)?.to_string());
                }
                writeln!(self.out, "{}", parts.join(" "))?;
            }
            StmtKind::If {
                branches,
                otherwise,
            } => {
                for (index, branch) in branches.iter().enumerate() {
                    // The first condition shares the statement's own line event.
                    if index > 0 {
                        self.trace(path, branch.line, hook)?;
                    }
                    if self.eval_expr(&branch.cond, hook)?.is_truthy() {
                        return self.exec_block(&branch.body, path, hook);
                    }
                }
                return self.exec_block(otherwise, path, hook);
            }
            StmtKind::While { cond, body } => {
                let mut first = true;
                loop {
                    if !first {
                        self.trace(path, stmt.line, hook)?;
                    }
                    first = false;
                    if !self.eval_expr(cond, hook)?.is_truthy() {
                        break;
                    }
                    if let Flow::Return(value) = self.exec_block(body, path, hook)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
            StmtKind::Def(function) => {
                trace!(name = %function.name, "defining function");
                self.functions
                    .insert(function.name.clone(), Rc::clone(function));
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, hook)?,
                    None => Value::Nil,
                };
                return Ok(Flow::Return(value));
            }
            StmtKind::Import(target) => self.import(target, path, hook)?,
            StmtKind::Debugger => {
                let mut frame = ScriptFrame::new(self, path, stmt.line);
                if hook.on_debugger_statement(&mut frame) == Resume::Exit {
                    return Err(ScriptError::Exit);
                }
            }
        }
        Ok(Flow::Normal)
    }

    fn import(&mut self, target: &str, from: &Path, hook: &mut dyn LineHook) -> Result<()> {
        let path = self.resolve_import(target, from);
        if self.loaded.contains(&path) {
            trace!(path = %path.display(), "already imported");
            return Ok(());
        }
        let source = fs::read_to_string(&path).map_err(|source| ScriptError::Load {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "importing");
        let program = parse(Rc::from(path.as_path()), &source)?;
        self.loaded.insert(path);

        // Every file's top level shares the program's globals, wherever the
        // import statement runs.
        let callers = self.scopes.split_off(1);
        let result = self.exec_block(&program.body, &program.path, hook);
        self.scopes.truncate(1);
        self.scopes.extend(callers);
        result.map(|_| ())
    }

    fn resolve_import(&self, target: &str, from: &Path) -> PathBuf {
        let base = match from.parent() {
            Some(dir) if !paths::is_synthetic(from) => dir.join(target),
            _ => PathBuf::from(target),
        };
        let local = paths::normalize(&base);
        if local.exists() {
            return local;
        }
        match &self.lib_dir {
            Some(lib_dir) if lib_dir.join(target).exists() => paths::normalize(&lib_dir.join(target)),
            _ => local,
        }
    }

    fn enter_scope(&mut self, scope: Scope) -> Result<()> {
        if self.call_depth() >= self.max_depth {
            return Err(ScriptError::RecursionLimit(self.max_depth));
        }
        self.scopes.push(scope);
        Ok(())
    }

    fn eval_expr(&mut self, expr: &Expr, hook: &mut dyn LineHook) -> Result<Value> {
        match expr {
            Expr::Int(value) => Ok(Value::Int(*value)),
            Expr::Str(value) => Ok(Value::Str(value.clone())),
            Expr::Bool(value) => Ok(Value::Bool(*value)),
            Expr::Nil => Ok(Value::Nil),
            Expr::Var(name) => self
                .scopes
                .last()
                .and_then(|scope| scope.get(name))
                .cloned()
                .ok_or_else(|| ScriptError::UndefinedVariable(name.clone())),
            Expr::Unary { op, operand } => {
                let value = self.eval_expr(operand, hook)?;
                unary(*op, value)
            }
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval_expr(lhs, hook)?;
                match op {
                    BinaryOp::And if !lhs.is_truthy() => Ok(lhs),
                    BinaryOp::Or if lhs.is_truthy() => Ok(lhs),
                    BinaryOp::And | BinaryOp::Or => self.eval_expr(rhs, hook),
                    _ => {
                        let rhs = self.eval_expr(rhs, hook)?;
                        binary(*op, lhs, rhs)
                    }
                }
            }
            Expr::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg, hook)?);
                }
                self.call(name, values, hook)
            }
        }
    }

    fn call(&mut self, name: &str, args: Vec<Value>, hook: &mut dyn LineHook) -> Result<Value> {
        let Some(function) = self.functions.get(name).cloned() else {
            return native(name, args);
        };
        if args.len() != function.params.len() {
            return Err(ScriptError::Arity {
                name: name.to_string(),
                given: args.len(),
                expected: function.params.len(),
            });
        }

        let scope: Scope = function.params.iter().cloned().zip(args).collect();
        self.enter_scope(scope)?;
        let result = self.exec_block(&function.body, &function.path, hook);
        self.scopes.pop();

        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

fn parse(path: Rc<Path>, source: &str) -> Result<Program> {
    parse_program(Rc::clone(&path), source).map_err(|SyntaxError { line, message }| {
        ScriptError::Syntax {
            path: path.to_path_buf(),
            line,
            message,
        }
    })
}

fn native(name: &str, args: Vec<Value>) -> Result<Value> {
    let expected = match name {
        "len" | "str" | "int" => 1,
        _ => return Err(ScriptError::UndefinedFunction(name.to_string())),
    };
    let [arg] = <[Value; 1]>::try_from(args).map_err(|args| ScriptError::Arity {
        name: name.to_string(),
        given: args.len(),
        expected,
    })?;

    match (name, arg) {
        ("len", Value::Str(text)) => Ok(Value::Int(text.chars().count() as i64)),
        ("str", value) => Ok(Value::Str(value.to_string())),
        ("int", Value::Int(value)) => Ok(Value::Int(value)),
        ("int", Value::Bool(value)) => Ok(Value::Int(i64::from(value))),
        ("int", Value::Nil) => Ok(Value::Int(0)),
        ("int", Value::Str(text)) => text.trim().parse().map(Value::Int).map_err(|_| {
            ScriptError::TypeMismatch {
                op: "int",
                operands: format!("string {text:?}"),
            }
        }),
        (_, value) => Err(ScriptError::TypeMismatch {
            op: if name == "len" { "len" } else { "int" },
            operands: value.type_name().to_string(),
        }),
    }
}

fn unary(op: UnaryOp, value: Value) -> Result<Value> {
    match (op, value) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
        (UnaryOp::Neg, Value::Int(value)) => value
            .checked_neg()
            .map(Value::Int)
            .ok_or(ScriptError::Overflow("-")),
        (UnaryOp::Neg, value) => Err(ScriptError::TypeMismatch {
            op: "-",
            operands: value.type_name().to_string(),
        }),
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value> {
    let symbol = op.symbol();
    match (op, lhs, rhs) {
        (BinaryOp::Eq, lhs, rhs) => Ok(Value::Bool(lhs == rhs)),
        (BinaryOp::Ne, lhs, rhs) => Ok(Value::Bool(lhs != rhs)),
        (BinaryOp::Add, lhs @ Value::Str(_), rhs) | (BinaryOp::Add, lhs, rhs @ Value::Str(_)) => {
            Ok(Value::Str(format!("{lhs}{rhs}")))
        }
        (_, Value::Int(lhs), Value::Int(rhs)) => integer(op, lhs, rhs),
        (BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge, Value::Str(lhs), Value::Str(rhs)) => {
            Ok(Value::Bool(compare(op, lhs.cmp(&rhs))))
        }
        (_, lhs, rhs) => Err(ScriptError::TypeMismatch {
            op: symbol,
            operands: format!("{} and {}", lhs.type_name(), rhs.type_name()),
        }),
    }
}

fn integer(op: BinaryOp, lhs: i64, rhs: i64) -> Result<Value> {
    let overflow = || ScriptError::Overflow(op.symbol());
    let value = match op {
        BinaryOp::Add => lhs.checked_add(rhs).ok_or_else(overflow)?,
        BinaryOp::Sub => lhs.checked_sub(rhs).ok_or_else(overflow)?,
        BinaryOp::Mul => lhs.checked_mul(rhs).ok_or_else(overflow)?,
        BinaryOp::Div | BinaryOp::Rem if rhs == 0 => return Err(ScriptError::DivisionByZero),
        BinaryOp::Div => lhs.checked_div(rhs).ok_or_else(overflow)?,
        BinaryOp::Rem => lhs.checked_rem(rhs).ok_or_else(overflow)?,
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            return Ok(Value::Bool(compare(op, lhs.cmp(&rhs))))
        }
        BinaryOp::And | BinaryOp::Or => {
            return Err(ScriptError::TypeMismatch {
                op: op.symbol(),
                operands: "int and int".to_string(),
            })
        }
    };
    Ok(Value::Int(value))
}

fn compare(op: BinaryOp, ordering: std::cmp::Ordering) -> bool {
    match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::Ge => ordering.is_ge(),
        BinaryOp::Eq => ordering.is_eq(),
        _ => ordering.is_ne(),
    }
}
