//! Abstract Syntax Tree (AST) definitions
//!
//! A source file parses into a [`Unit`]: an optional package declaration,
//! imports, and an ordered list of top-level function declarations.
//! Every node carries a [`Span`] whose `line` feeds stack frames.

use crate::span::Span;

/// Top-level syntax tree for one source file
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub package: Option<PackageDecl>,
    pub imports: Vec<ImportDecl>,
    pub functions: Vec<FunctionDecl>,
}

/// `package test.lang;`
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDecl {
    pub path: String,
    pub span: Span,
}

/// `import ballerina.lang.json;` or `import ballerina.lang.json as j;`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// Fully qualified package path
    pub path: String,
    /// Local alias (last path segment unless renamed)
    pub alias: Identifier,
    pub span: Span,
}

/// Identifier with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

/// Function declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Identifier,
    pub params: Vec<Param>,
    /// Declared return types; empty for functions returning nothing
    pub return_types: Vec<TypeRef>,
    pub body: Block,
    pub span: Span,
}

impl FunctionDecl {
    /// Line of the `function` keyword
    pub fn line(&self) -> u32 {
        self.span.line
    }
}

/// Function parameter (`string name`)
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub type_ref: TypeRef,
    pub name: Identifier,
    pub span: Span,
}

/// Built-in value types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Int,
    Float,
    String,
    Boolean,
    Json,
}

impl PrimitiveType {
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Int => "int",
            PrimitiveType::Float => "float",
            PrimitiveType::String => "string",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Json => "json",
        }
    }
}

/// Type reference as written in source
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Primitive(PrimitiveType, Span),
    /// `T[]`
    Array(Box<TypeRef>, Span),
}

impl TypeRef {
    pub fn span(&self) -> Span {
        match self {
            TypeRef::Primitive(_, span) | TypeRef::Array(_, span) => *span,
        }
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeRef::Primitive(p, _) => write!(f, "{}", p.name()),
            TypeRef::Array(inner, _) => write!(f, "{}[]", inner),
        }
    }
}

/// Block of statements
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl(VarDecl),
    Assign(Assign),
    Return(ReturnStmt),
    If(IfStmt),
    While(WhileStmt),
    Break(Span),
    Expr(ExprStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::VarDecl(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::Break(span) => *span,
            Stmt::Expr(s) => s.span,
        }
    }

    /// Source line the statement starts on
    pub fn line(&self) -> u32 {
        self.span().line
    }
}

/// `string[] fruits;` / `int x = 1;`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub type_ref: TypeRef,
    pub name: Identifier,
    pub init: Option<Expr>,
    pub span: Span,
}

/// Left-hand side of an assignment
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    Name(Identifier),
    /// `name[index]`
    Index { name: Identifier, index: Box<Expr> },
}

/// `target = value;`
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub target: AssignTarget,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_block: Block,
    pub else_block: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal, Span),
    Identifier(Identifier),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Call(CallExpr),
    Index(IndexExpr),
    ArrayLiteral(ArrayLiteral),
    JsonObject(JsonObjectLiteral),
    Group(GroupExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(_, span) => *span,
            Expr::Identifier(id) => id.span,
            Expr::Unary(u) => u.span,
            Expr::Binary(b) => b.span,
            Expr::Call(c) => c.span,
            Expr::Index(i) => i.span,
            Expr::ArrayLiteral(a) => a.span,
            Expr::JsonObject(o) => o.span,
            Expr::Group(g) => g.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
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
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
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

/// Callee name, optionally qualified by an import alias (`json:getString`)
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionName {
    pub alias: Option<Identifier>,
    pub name: Identifier,
}

impl std::fmt::Display for FunctionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{}:{}", alias.name, self.name.name),
            None => write!(f, "{}", self.name.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: FunctionName,
    pub args: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub target: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub elements: Vec<Expr>,
    pub span: Span,
}

/// `{"name": expr, ...}`
#[derive(Debug, Clone, PartialEq)]
pub struct JsonObjectLiteral {
    pub entries: Vec<(String, Expr)>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupExpr {
    pub expr: Box<Expr>,
    pub span: Span,
}
