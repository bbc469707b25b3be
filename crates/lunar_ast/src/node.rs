//! AST node definitions.
//!
//! The node shapes follow the Mozilla-Parser-API-inspired structure that
//! Lua tooling conventionally consumes: every node serializes with a
//! `"type"` tag, statements and expressions are closed tagged unions, and
//! location data (`loc`/`range`) appears only when tracking is enabled.
//!
//! Function statements and function expressions intentionally share the
//! `FunctionDeclaration` node type. Likewise all five literal kinds share
//! the `Literal` payload, and `and`/`or` chains share the binary payload
//! under the `LogicalExpression` tag.

use lunar_core::{Location, TextRange};
use serde::Serialize;

// ============================================================================
// Node metadata
// ============================================================================

/// Optional source-location data attached to every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NodeMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<TextRange>,
}

/// Uniform access to a node's type tag and metadata, used by the location
/// tracker and the `on_create_node` observer.
pub trait AstNode {
    fn node_type(&self) -> &'static str;
    fn meta(&self) -> &NodeMeta;
    fn meta_mut(&mut self) -> &mut NodeMeta;
}

macro_rules! impl_ast_node {
    ($($ty:ident),* $(,)?) => {
        $(impl AstNode for $ty {
            fn node_type(&self) -> &'static str { stringify!($ty) }
            fn meta(&self) -> &NodeMeta { &self.meta }
            fn meta_mut(&mut self) -> &mut NodeMeta { &mut self.meta }
        })*
    };
}

macro_rules! delegate_ast_node {
    ($enum:ident { $($variant:ident),* $(,)? }) => {
        impl AstNode for $enum {
            fn node_type(&self) -> &'static str {
                match self { $($enum::$variant(inner) => inner.node_type(),)* }
            }
            fn meta(&self) -> &NodeMeta {
                match self { $($enum::$variant(inner) => inner.meta(),)* }
            }
            fn meta_mut(&mut self) -> &mut NodeMeta {
                match self { $($enum::$variant(inner) => inner.meta_mut(),)* }
            }
        }
    };
}

// ============================================================================
// Chunk
// ============================================================================

/// A block is a sequence of statements.
pub type Block = Vec<Statement>;

/// The root node of a parsed source unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Chunk {
    pub body: Block,
    /// Present when comment collection is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
    /// Present when scope tracking is enabled: one entry per distinct
    /// global name, in first-use order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub globals: Option<Vec<Identifier>>,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Statement {
    LabelStatement(LabelStatement),
    BreakStatement(BreakStatement),
    GotoStatement(GotoStatement),
    ReturnStatement(ReturnStatement),
    IfStatement(IfStatement),
    WhileStatement(WhileStatement),
    DoStatement(DoStatement),
    RepeatStatement(RepeatStatement),
    LocalStatement(LocalStatement),
    AssignmentStatement(AssignmentStatement),
    CallStatement(CallStatement),
    FunctionDeclaration(FunctionDeclaration),
    ForNumericStatement(ForNumericStatement),
    ForGenericStatement(ForGenericStatement),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct LabelStatement {
    pub label: Identifier,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct BreakStatement {
    #[serde(flatten)]
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct GotoStatement {
    pub label: Identifier,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ReturnStatement {
    pub arguments: Vec<Expression>,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct IfStatement {
    pub clauses: Vec<IfStatementClause>,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

/// One arm of an `if` statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IfStatementClause {
    IfClause(IfClause),
    ElseifClause(ElseifClause),
    ElseClause(ElseClause),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct IfClause {
    pub condition: Expression,
    pub body: Block,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ElseifClause {
    pub condition: Expression,
    pub body: Block,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ElseClause {
    pub body: Block,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Block,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct DoStatement {
    pub body: Block,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct RepeatStatement {
    pub condition: Expression,
    pub body: Block,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct LocalStatement {
    pub variables: Vec<Identifier>,
    pub init: Vec<Expression>,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

/// Targets are identifiers, member expressions or index expressions; the
/// parser guarantees nothing else lands here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct AssignmentStatement {
    pub variables: Vec<Expression>,
    pub init: Vec<Expression>,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct CallStatement {
    pub expression: Expression,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

/// Shared by function statements (named, possibly local) and function
/// expressions (anonymous).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct FunctionDeclaration {
    /// `None` for anonymous functions; otherwise an identifier or a
    /// member-expression chain (`a.b.c`, `a:m`).
    pub identifier: Option<Box<Expression>>,
    #[serde(rename = "isLocal")]
    pub is_local: bool,
    /// Identifiers, optionally terminated by a single vararg literal.
    pub parameters: Vec<Expression>,
    pub body: Block,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ForNumericStatement {
    pub variable: Identifier,
    pub start: Expression,
    pub end: Expression,
    pub step: Option<Expression>,
    pub body: Block,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ForGenericStatement {
    pub variables: Vec<Identifier>,
    pub iterators: Vec<Expression>,
    pub body: Block,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Expression {
    Identifier(Identifier),
    Literal(Literal),
    TableConstructorExpression(TableConstructorExpression),
    BinaryExpression(BinaryExpression),
    UnaryExpression(UnaryExpression),
    MemberExpression(MemberExpression),
    IndexExpression(IndexExpression),
    CallExpression(CallExpression),
    TableCallExpression(TableCallExpression),
    StringCallExpression(StringCallExpression),
    FunctionDeclaration(FunctionDeclaration),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Identifier {
    pub name: String,
    /// Set when scope tracking is enabled.
    #[serde(rename = "isLocal", skip_serializing_if = "Option::is_none")]
    pub is_local: Option<bool>,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

/// The five literal kinds, also the serialized `"type"` tag.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub enum LiteralKind {
    StringLiteral,
    NumericLiteral,
    BooleanLiteral,
    NilLiteral,
    VarargLiteral,
}

impl LiteralKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LiteralKind::StringLiteral => "StringLiteral",
            LiteralKind::NumericLiteral => "NumericLiteral",
            LiteralKind::BooleanLiteral => "BooleanLiteral",
            LiteralKind::NilLiteral => "NilLiteral",
            LiteralKind::VarargLiteral => "VarargLiteral",
        }
    }
}

/// The interpreted value of a literal. Nil literals and strings discarded
/// by the `none` encoding mode have no value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Literal {
    #[serde(rename = "type")]
    pub kind: LiteralKind,
    pub value: Option<LiteralValue>,
    /// The raw source slice of the literal.
    pub raw: String,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct TableConstructorExpression {
    pub fields: Vec<TableField>,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TableField {
    TableKey(TableKey),
    TableKeyString(TableKeyString),
    TableValue(TableValue),
}

/// `[key] = value`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct TableKey {
    pub key: Expression,
    pub value: Expression,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

/// `name = value`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct TableKeyString {
    pub key: Identifier,
    pub value: Expression,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

/// A positional field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct TableValue {
    pub value: Expression,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

/// `and`/`or` serialize as `LogicalExpression`, everything else as
/// `BinaryExpression`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub enum BinaryExpressionKind {
    BinaryExpression,
    LogicalExpression,
}

impl BinaryExpressionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryExpressionKind::BinaryExpression => "BinaryExpression",
            BinaryExpressionKind::LogicalExpression => "LogicalExpression",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpression {
    #[serde(rename = "type")]
    pub kind: BinaryExpressionKind,
    pub operator: String,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct UnaryExpression {
    pub operator: String,
    pub argument: Box<Expression>,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

/// `base.name` or `base:name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct MemberExpression {
    pub indexer: String,
    pub identifier: Identifier,
    pub base: Box<Expression>,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

/// `base[index]`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct IndexExpression {
    pub base: Box<Expression>,
    pub index: Box<Expression>,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct CallExpression {
    pub base: Box<Expression>,
    pub arguments: Vec<Expression>,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

/// `f{ ... }` — a call whose sole argument is a table constructor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct TableCallExpression {
    pub base: Box<Expression>,
    pub arguments: TableConstructorExpression,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

/// `f"..."` — a call whose sole argument is a string literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct StringCallExpression {
    pub base: Box<Expression>,
    pub argument: Literal,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Comment {
    pub value: String,
    pub raw: String,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

// ============================================================================
// AstNode implementations
// ============================================================================

impl_ast_node! {
    Chunk,
    LabelStatement,
    BreakStatement,
    GotoStatement,
    ReturnStatement,
    IfStatement,
    IfClause,
    ElseifClause,
    ElseClause,
    WhileStatement,
    DoStatement,
    RepeatStatement,
    LocalStatement,
    AssignmentStatement,
    CallStatement,
    FunctionDeclaration,
    ForNumericStatement,
    ForGenericStatement,
    Identifier,
    TableConstructorExpression,
    TableKey,
    TableKeyString,
    TableValue,
    UnaryExpression,
    MemberExpression,
    IndexExpression,
    CallExpression,
    TableCallExpression,
    StringCallExpression,
    Comment,
}

impl AstNode for Literal {
    fn node_type(&self) -> &'static str {
        self.kind.as_str()
    }
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }
}

impl AstNode for BinaryExpression {
    fn node_type(&self) -> &'static str {
        self.kind.as_str()
    }
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }
}

delegate_ast_node!(Statement {
    LabelStatement,
    BreakStatement,
    GotoStatement,
    ReturnStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    RepeatStatement,
    LocalStatement,
    AssignmentStatement,
    CallStatement,
    FunctionDeclaration,
    ForNumericStatement,
    ForGenericStatement,
});

delegate_ast_node!(Expression {
    Identifier,
    Literal,
    TableConstructorExpression,
    BinaryExpression,
    UnaryExpression,
    MemberExpression,
    IndexExpression,
    CallExpression,
    TableCallExpression,
    StringCallExpression,
    FunctionDeclaration,
});

delegate_ast_node!(IfStatementClause {
    IfClause,
    ElseifClause,
    ElseClause,
});

delegate_ast_node!(TableField {
    TableKey,
    TableKeyString,
    TableValue,
});
