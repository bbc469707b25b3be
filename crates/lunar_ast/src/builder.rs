//! Node constructors.
//!
//! One function per grammar production. The parser builds every node
//! through these, then stamps location data and fires the
//! `on_create_node` observer, so the construction itself stays pure.

use crate::node::*;
use crate::token_kind::TokenKind;

pub fn label_statement(label: Identifier) -> Statement {
    Statement::LabelStatement(LabelStatement { label, meta: NodeMeta::default() })
}

pub fn break_statement() -> Statement {
    Statement::BreakStatement(BreakStatement { meta: NodeMeta::default() })
}

pub fn goto_statement(label: Identifier) -> Statement {
    Statement::GotoStatement(GotoStatement { label, meta: NodeMeta::default() })
}

pub fn return_statement(arguments: Vec<Expression>) -> Statement {
    Statement::ReturnStatement(ReturnStatement { arguments, meta: NodeMeta::default() })
}

pub fn if_statement(clauses: Vec<IfStatementClause>) -> Statement {
    Statement::IfStatement(IfStatement { clauses, meta: NodeMeta::default() })
}

pub fn if_clause(condition: Expression, body: Block) -> IfStatementClause {
    IfStatementClause::IfClause(IfClause { condition, body, meta: NodeMeta::default() })
}

pub fn elseif_clause(condition: Expression, body: Block) -> IfStatementClause {
    IfStatementClause::ElseifClause(ElseifClause { condition, body, meta: NodeMeta::default() })
}

pub fn else_clause(body: Block) -> IfStatementClause {
    IfStatementClause::ElseClause(ElseClause { body, meta: NodeMeta::default() })
}

pub fn while_statement(condition: Expression, body: Block) -> Statement {
    Statement::WhileStatement(WhileStatement { condition, body, meta: NodeMeta::default() })
}

pub fn do_statement(body: Block) -> Statement {
    Statement::DoStatement(DoStatement { body, meta: NodeMeta::default() })
}

pub fn repeat_statement(condition: Expression, body: Block) -> Statement {
    Statement::RepeatStatement(RepeatStatement { condition, body, meta: NodeMeta::default() })
}

pub fn local_statement(variables: Vec<Identifier>, init: Vec<Expression>) -> Statement {
    Statement::LocalStatement(LocalStatement { variables, init, meta: NodeMeta::default() })
}

pub fn assignment_statement(variables: Vec<Expression>, init: Vec<Expression>) -> Statement {
    Statement::AssignmentStatement(AssignmentStatement {
        variables,
        init,
        meta: NodeMeta::default(),
    })
}

pub fn call_statement(expression: Expression) -> Statement {
    Statement::CallStatement(CallStatement { expression, meta: NodeMeta::default() })
}

/// Used for function statements and function expressions alike; the caller
/// wraps the result in the fitting union.
pub fn function_declaration(
    identifier: Option<Expression>,
    parameters: Vec<Expression>,
    is_local: bool,
    body: Block,
) -> FunctionDeclaration {
    FunctionDeclaration {
        identifier: identifier.map(Box::new),
        is_local,
        parameters,
        body,
        meta: NodeMeta::default(),
    }
}

pub fn for_numeric_statement(
    variable: Identifier,
    start: Expression,
    end: Expression,
    step: Option<Expression>,
    body: Block,
) -> Statement {
    Statement::ForNumericStatement(ForNumericStatement {
        variable,
        start,
        end,
        step,
        body,
        meta: NodeMeta::default(),
    })
}

pub fn for_generic_statement(
    variables: Vec<Identifier>,
    iterators: Vec<Expression>,
    body: Block,
) -> Statement {
    Statement::ForGenericStatement(ForGenericStatement {
        variables,
        iterators,
        body,
        meta: NodeMeta::default(),
    })
}

pub fn chunk(body: Block) -> Chunk {
    Chunk { body, comments: None, globals: None, meta: NodeMeta::default() }
}

pub fn identifier(name: String) -> Identifier {
    Identifier { name, is_local: None, meta: NodeMeta::default() }
}

/// Build a literal from the token kind that produced it.
pub fn literal(kind: TokenKind, value: Option<LiteralValue>, raw: String) -> Expression {
    let kind = match kind {
        TokenKind::StringLiteral => LiteralKind::StringLiteral,
        TokenKind::NumericLiteral => LiteralKind::NumericLiteral,
        TokenKind::BooleanLiteral => LiteralKind::BooleanLiteral,
        TokenKind::NilLiteral => LiteralKind::NilLiteral,
        _ => LiteralKind::VarargLiteral,
    };
    Expression::Literal(Literal { kind, value, raw, meta: NodeMeta::default() })
}

pub fn table_key(key: Expression, value: Expression) -> TableField {
    TableField::TableKey(TableKey { key, value, meta: NodeMeta::default() })
}

pub fn table_key_string(key: Identifier, value: Expression) -> TableField {
    TableField::TableKeyString(TableKeyString { key, value, meta: NodeMeta::default() })
}

pub fn table_value(value: Expression) -> TableField {
    TableField::TableValue(TableValue { value, meta: NodeMeta::default() })
}

pub fn table_constructor_expression(fields: Vec<TableField>) -> TableConstructorExpression {
    TableConstructorExpression { fields, meta: NodeMeta::default() }
}

/// `and`/`or` become a `LogicalExpression`, everything else a
/// `BinaryExpression`.
pub fn binary_expression(operator: String, left: Expression, right: Expression) -> Expression {
    let kind = if operator == "and" || operator == "or" {
        BinaryExpressionKind::LogicalExpression
    } else {
        BinaryExpressionKind::BinaryExpression
    };
    Expression::BinaryExpression(BinaryExpression {
        kind,
        operator,
        left: Box::new(left),
        right: Box::new(right),
        meta: NodeMeta::default(),
    })
}

pub fn unary_expression(operator: String, argument: Expression) -> Expression {
    Expression::UnaryExpression(UnaryExpression {
        operator,
        argument: Box::new(argument),
        meta: NodeMeta::default(),
    })
}

pub fn member_expression(base: Expression, indexer: &str, identifier: Identifier) -> Expression {
    Expression::MemberExpression(MemberExpression {
        indexer: indexer.to_string(),
        identifier,
        base: Box::new(base),
        meta: NodeMeta::default(),
    })
}

pub fn index_expression(base: Expression, index: Expression) -> Expression {
    Expression::IndexExpression(IndexExpression {
        base: Box::new(base),
        index: Box::new(index),
        meta: NodeMeta::default(),
    })
}

pub fn call_expression(base: Expression, arguments: Vec<Expression>) -> Expression {
    Expression::CallExpression(CallExpression {
        base: Box::new(base),
        arguments,
        meta: NodeMeta::default(),
    })
}

pub fn table_call_expression(base: Expression, arguments: TableConstructorExpression) -> Expression {
    Expression::TableCallExpression(TableCallExpression {
        base: Box::new(base),
        arguments,
        meta: NodeMeta::default(),
    })
}

pub fn string_call_expression(base: Expression, argument: Literal) -> Expression {
    Expression::StringCallExpression(StringCallExpression {
        base: Box::new(base),
        argument,
        meta: NodeMeta::default(),
    })
}

pub fn comment(value: String, raw: String) -> Comment {
    Comment { value, raw, meta: NodeMeta::default() }
}
