//! Abstract syntax tree
//!
//! Node types produced by the parser and consumed by the interpreter.
//! Nodes are immutable once constructed; statement bodies are plain
//! statement vectors (the surface language has no block scoping, so
//! bodies carry no scope information of their own).

use crate::span::Span;
use std::collections::HashMap;
use std::rc::Rc;

/// A parsed program: the top-level statement sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// An identifier with its source location
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

// === Statements ===

/// Statement node
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `doc "text" <stmt>` documentation wrapper
    Doc(DocStmt),
    /// `say e1, e2 with sep between`
    Print(PrintStmt),
    /// `add e to x` / `subtract e from x` / `multiply x by e` / `divide x by e`
    Compound(CompoundStmt),
    /// `input <prompt>`
    Input(InputStmt),
    /// `remember <expr> as <name>`
    Remember(RememberStmt),
    /// `if <cond> then … [else …] end`
    If(IfStmt),
    /// `for each x in xs do … end`
    ForEach(ForEachStmt),
    /// `for each k, v in m do … end`
    ForEachPair(ForEachPairStmt),
    /// `when name(params) … end`
    FuncDef(Rc<FuncDef>),
    /// `get <filename>`
    Import(ImportStmt),
    /// `try … if_it_fails … end`
    TryCatch(TryCatchStmt),
    /// `return <expr>`
    Return(ReturnStmt),
    /// Bare expression statement (calls and lambda literals included)
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocStmt {
    pub text: String,
    pub stmt: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintStmt {
    pub exprs: Vec<Expr>,
    /// Separator between values; defaults to a single space
    pub sep: Option<Expr>,
    pub span: Span,
}

/// Read-modify-write operator for compound assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl CompoundOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompoundOp::Add => "add",
            CompoundOp::Subtract => "subtract",
            CompoundOp::Multiply => "multiply",
            CompoundOp::Divide => "divide",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompoundStmt {
    /// Target is always a plain variable
    pub target: Identifier,
    pub op: CompoundOp,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputStmt {
    pub prompt: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RememberStmt {
    pub name: Identifier,
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_body: Vec<Stmt>,
    pub else_body: Option<Vec<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForEachStmt {
    pub var: Identifier,
    pub iterable: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForEachPairStmt {
    pub key: Identifier,
    pub value: Identifier,
    pub iterable: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// A named function definition.
///
/// `defaults` and `variadic` are representable and consulted by the
/// interpreter, but the surface grammar does not currently populate them.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub name: String,
    pub params: Vec<String>,
    /// Default-value expression per parameter name, evaluated in the
    /// caller's environment when the argument is unsupplied
    pub defaults: HashMap<String, Expr>,
    /// When set, extra positional arguments collect into an `args` binding
    pub variadic: bool,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    pub filename: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryCatchStmt {
    pub try_body: Vec<Stmt>,
    pub catch_body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Expr,
    pub span: Span,
}

// === Expressions ===

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal, Span),
    /// String literal containing `{identifier}` placeholders
    Template(TemplateExpr),
    Variable(Identifier),
    Binary(BinaryExpr),
    List(ListExpr),
    Map(MapExpr),
    Lambda(Rc<LambdaExpr>),
    Call(CallExpr),
}

impl Expr {
    /// Source location of this expression
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(_, span) => *span,
            Expr::Template(t) => t.span,
            Expr::Variable(id) => id.span,
            Expr::Binary(b) => b.span,
            Expr::List(l) => l.span,
            Expr::Map(m) => m.span,
            Expr::Lambda(l) => l.span,
            Expr::Call(c) => c.span,
        }
    }
}

/// Literal value as written in source
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer literal (no decimal point)
    Int(i64),
    /// Floating-point literal (contains a decimal point)
    Float(f64),
    Str(String),
    /// `yes` / `no`
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateExpr {
    /// Raw template text with placeholders intact
    pub text: String,
    pub span: Span,
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `..`, display-string concatenation
    Concat,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// Boolean combination; no surface grammar path produces these two
    And,
    /// Boolean combination; no surface grammar path produces these two
    Or,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Concat => "..",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapExpr {
    /// Key/value pairs in declared order
    pub pairs: Vec<(Expr, Expr)>,
    pub span: Span,
}

/// An anonymous function literal (`lambda (a, b) -> … end`)
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpr {
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// A call; the callee is always a plain name, never an expression
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Identifier,
    pub args: Vec<Expr>,
    pub span: Span,
}
