//! Parser integration tests.
//!
//! Verifies statement and expression structure, dialect-dependent grammar,
//! error messages, and the JSON shape of the produced tree.

use lunar_ast::{Chunk, Expression, IfStatementClause, Statement};
use lunar_core::{LuaVersion, Options};
use lunar_parser::{parse, Parser};

fn options_for(version: LuaVersion) -> Options {
    Options { lua_version: version, ..Options::default() }
}

fn parse_ok(source: &str) -> Chunk {
    parse(source, Options::default()).unwrap_or_else(|error| {
        panic!("parse failed for {:?}: {}", source, error);
    })
}

fn parse_version(source: &str, version: LuaVersion) -> Chunk {
    parse(source, options_for(version)).unwrap_or_else(|error| {
        panic!("parse failed for {:?}: {}", source, error);
    })
}

fn parse_error(source: &str, version: LuaVersion) -> String {
    match parse(source, options_for(version)) {
        Ok(_) => panic!("expected error for {:?}", source),
        Err(error) => match error {
            lunar_diagnostics::Error::Syntax(syntax) => syntax.message,
            other => panic!("expected syntax error, got {}", other),
        },
    }
}

fn assert_statement_count(source: &str, expected: usize) {
    assert_eq!(parse_ok(source).body.len(), expected, "source: {}", source);
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_parse_local_statement() {
    assert_statement_count("local x", 1);
    assert_statement_count("local x, y = 1, 2", 1);
    let chunk = parse_ok("local a, b = 1");
    match &chunk.body[0] {
        Statement::LocalStatement(local) => {
            assert_eq!(local.variables.len(), 2);
            assert_eq!(local.init.len(), 1);
        }
        other => panic!("expected LocalStatement, got {:?}", other),
    }
}

#[test]
fn test_parse_assignment() {
    let chunk = parse_ok("a, b = 1, 2");
    match &chunk.body[0] {
        Statement::AssignmentStatement(assignment) => {
            assert_eq!(assignment.variables.len(), 2);
            assert_eq!(assignment.init.len(), 2);
        }
        other => panic!("expected AssignmentStatement, got {:?}", other),
    }
}

#[test]
fn test_parse_member_chain_assignment() {
    let chunk = parse_ok("a.b.c = 1");
    match &chunk.body[0] {
        Statement::AssignmentStatement(assignment) => {
            assert_eq!(assignment.variables.len(), 1);
            match &assignment.variables[0] {
                Expression::MemberExpression(member) => {
                    assert_eq!(member.identifier.name, "c");
                    match member.base.as_ref() {
                        Expression::MemberExpression(inner) => {
                            assert_eq!(inner.identifier.name, "b");
                        }
                        other => panic!("expected nested member, got {:?}", other),
                    }
                }
                other => panic!("expected MemberExpression target, got {:?}", other),
            }
        }
        other => panic!("expected AssignmentStatement, got {:?}", other),
    }
}

#[test]
fn test_parse_call_statement() {
    let chunk = parse_ok("f()");
    match &chunk.body[0] {
        Statement::CallStatement(call) => match &call.expression {
            Expression::CallExpression(_) => {}
            other => panic!("expected CallExpression, got {:?}", other),
        },
        other => panic!("expected CallStatement, got {:?}", other),
    }
}

#[test]
fn test_call_targets_cannot_join_assignment_lists() {
    let message = parse_error("f(), g()", LuaVersion::Lua51);
    assert!(message.starts_with("unexpected symbol ','"), "got: {}", message);
}

#[test]
fn test_call_is_not_an_lvalue() {
    assert!(parse("f() = 1", options_for(LuaVersion::Lua51)).is_err());
}

#[test]
fn test_parse_if_statement() {
    let chunk = parse_ok("if a then b() elseif c then d() else e() end");
    match &chunk.body[0] {
        Statement::IfStatement(statement) => {
            assert_eq!(statement.clauses.len(), 3);
            assert!(matches!(statement.clauses[0], IfStatementClause::IfClause(_)));
            assert!(matches!(statement.clauses[1], IfStatementClause::ElseifClause(_)));
            assert!(matches!(statement.clauses[2], IfStatementClause::ElseClause(_)));
        }
        other => panic!("expected IfStatement, got {:?}", other),
    }
}

#[test]
fn test_parse_loops() {
    assert_statement_count("while a do b() end", 1);
    assert_statement_count("repeat a() until b", 1);
    assert_statement_count("do x() end", 1);
}

#[test]
fn test_parse_numeric_for() {
    let chunk = parse_ok("for i = 1, 10, 2 do end");
    match &chunk.body[0] {
        Statement::ForNumericStatement(statement) => {
            assert_eq!(statement.variable.name, "i");
            assert!(statement.step.is_some());
        }
        other => panic!("expected ForNumericStatement, got {:?}", other),
    }
}

#[test]
fn test_parse_generic_for() {
    let chunk = parse_ok("for k, v in pairs(t) do end");
    match &chunk.body[0] {
        Statement::ForGenericStatement(statement) => {
            assert_eq!(statement.variables.len(), 2);
            assert_eq!(statement.iterators.len(), 1);
        }
        other => panic!("expected ForGenericStatement, got {:?}", other),
    }
}

#[test]
fn test_parse_function_declaration() {
    let chunk = parse_ok("function a.b:c(x, y, ...) end");
    match &chunk.body[0] {
        Statement::FunctionDeclaration(declaration) => {
            assert!(!declaration.is_local);
            assert_eq!(declaration.parameters.len(), 3);
            match declaration.identifier.as_deref() {
                Some(Expression::MemberExpression(member)) => {
                    assert_eq!(member.indexer, ":");
                    assert_eq!(member.identifier.name, "c");
                }
                other => panic!("expected member-expression name, got {:?}", other),
            }
        }
        other => panic!("expected FunctionDeclaration, got {:?}", other),
    }
}

#[test]
fn test_parse_local_function() {
    let chunk = parse_ok("local function f() return f end");
    match &chunk.body[0] {
        Statement::FunctionDeclaration(declaration) => {
            assert!(declaration.is_local);
        }
        other => panic!("expected FunctionDeclaration, got {:?}", other),
    }
}

#[test]
fn test_local_requires_name() {
    let message = parse_error("local 1", LuaVersion::Lua51);
    assert_eq!(message, "<name> expected near '1'");
}

#[test]
fn test_parse_return_forms() {
    assert_statement_count("return", 1);
    assert_statement_count("return 1", 1);
    assert_statement_count("return 1, 2;", 1);
    let chunk = parse_ok("return 1, 2");
    match &chunk.body[0] {
        Statement::ReturnStatement(statement) => assert_eq!(statement.arguments.len(), 2),
        other => panic!("expected ReturnStatement, got {:?}", other),
    }
}

#[test]
fn test_return_must_be_last() {
    assert!(parse("return 1 x = 2", options_for(LuaVersion::Lua51)).is_err());
}

#[test]
fn test_empty_statement_gated() {
    // 5.2 eats bare semicolons without a node.
    assert_eq!(parse_version(";;", LuaVersion::Lua52).body.len(), 0);
    assert!(parse(";", options_for(LuaVersion::Lua51)).is_err());
}

#[test]
fn test_missing_end() {
    let message = parse_error("if a then", LuaVersion::Lua51);
    assert_eq!(message, "'end' expected near '<eof>'");
}

#[test]
fn test_chunk_must_consume_everything() {
    let message = parse_error("end", LuaVersion::Lua51);
    assert!(message.starts_with("unexpected keyword 'end'"), "got: {}", message);
}

// ============================================================================
// Expressions
// ============================================================================

fn single_expression(source: &str) -> Expression {
    let chunk = parse_ok(source);
    match chunk.body.into_iter().next() {
        Some(Statement::ReturnStatement(mut statement)) => statement.arguments.remove(0),
        other => panic!("expected return statement, got {:?}", other),
    }
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    match single_expression("return 1 + 2 * 3") {
        Expression::BinaryExpression(binary) => {
            assert_eq!(binary.operator, "+");
            match binary.right.as_ref() {
                Expression::BinaryExpression(right) => assert_eq!(right.operator, "*"),
                other => panic!("expected nested multiplication, got {:?}", other),
            }
        }
        other => panic!("expected BinaryExpression, got {:?}", other),
    }
}

#[test]
fn test_power_is_right_associative() {
    // 2 ^ 3 ^ 2 parses as 2 ^ (3 ^ 2).
    match single_expression("return 2 ^ 3 ^ 2") {
        Expression::BinaryExpression(binary) => {
            assert_eq!(binary.operator, "^");
            assert!(matches!(binary.right.as_ref(), Expression::BinaryExpression(_)));
            assert!(matches!(binary.left.as_ref(), Expression::Literal(_)));
        }
        other => panic!("expected BinaryExpression, got {:?}", other),
    }
}

#[test]
fn test_concat_is_right_associative() {
    match single_expression("return 'a' .. 'b' .. 'c'") {
        Expression::BinaryExpression(binary) => {
            assert_eq!(binary.operator, "..");
            assert!(matches!(binary.right.as_ref(), Expression::BinaryExpression(_)));
        }
        other => panic!("expected BinaryExpression, got {:?}", other),
    }
}

#[test]
fn test_unary_binds_tighter_than_binary() {
    // -x + y is (-x) + y.
    match single_expression("return -x + y") {
        Expression::BinaryExpression(binary) => {
            assert_eq!(binary.operator, "+");
            assert!(matches!(binary.left.as_ref(), Expression::UnaryExpression(_)));
        }
        other => panic!("expected BinaryExpression, got {:?}", other),
    }
}

#[test]
fn test_unary_power_interaction() {
    // -2 ^ 2 is -(2 ^ 2) because ^ binds above unary minus.
    match single_expression("return -2 ^ 2") {
        Expression::UnaryExpression(unary) => {
            assert_eq!(unary.operator, "-");
            assert!(matches!(unary.argument.as_ref(), Expression::BinaryExpression(_)));
        }
        other => panic!("expected UnaryExpression, got {:?}", other),
    }
}

#[test]
fn test_logical_operators_get_their_own_tag() {
    match single_expression("return a and b or c") {
        Expression::BinaryExpression(binary) => {
            assert_eq!(binary.kind.as_str(), "LogicalExpression");
            assert_eq!(binary.operator, "or");
            match binary.left.as_ref() {
                Expression::BinaryExpression(left) => {
                    assert_eq!(left.kind.as_str(), "LogicalExpression");
                    assert_eq!(left.operator, "and");
                }
                other => panic!("expected nested and, got {:?}", other),
            }
        }
        other => panic!("expected logical expression, got {:?}", other),
    }
}

#[test]
fn test_comparison_is_binary() {
    match single_expression("return a < b") {
        Expression::BinaryExpression(binary) => {
            assert_eq!(binary.kind.as_str(), "BinaryExpression");
            assert_eq!(binary.operator, "<");
        }
        other => panic!("expected BinaryExpression, got {:?}", other),
    }
}

#[test]
fn test_bitwise_operators_in_53() {
    let chunk = parse_version("return a | b ~ c & d", LuaVersion::Lua53);
    match &chunk.body[0] {
        Statement::ReturnStatement(statement) => match &statement.arguments[0] {
            Expression::BinaryExpression(binary) => assert_eq!(binary.operator, "|"),
            other => panic!("expected BinaryExpression, got {:?}", other),
        },
        other => panic!("expected ReturnStatement, got {:?}", other),
    }
}

#[test]
fn test_parenthesized_expression() {
    match single_expression("return (1 + 2) * 3") {
        Expression::BinaryExpression(binary) => assert_eq!(binary.operator, "*"),
        other => panic!("expected BinaryExpression, got {:?}", other),
    }
}

#[test]
fn test_index_and_member_chain() {
    match single_expression("return t[1].x") {
        Expression::MemberExpression(member) => {
            assert_eq!(member.indexer, ".");
            assert!(matches!(member.base.as_ref(), Expression::IndexExpression(_)));
        }
        other => panic!("expected MemberExpression, got {:?}", other),
    }
}

#[test]
fn test_method_call_requires_arguments() {
    assert_statement_count("obj:method(1)", 1);
    assert_statement_count("obj:method 'x'", 1);
    assert_statement_count("obj:method { }", 1);
    let message = parse_error("return obj:method", LuaVersion::Lua51);
    assert_eq!(message, "function arguments expected near '<eof>'");
}

#[test]
fn test_string_and_table_call_sugar() {
    match single_expression("return f 'x'") {
        Expression::StringCallExpression(_) => {}
        other => panic!("expected StringCallExpression, got {:?}", other),
    }
    match single_expression("return f { 1 }") {
        Expression::TableCallExpression(_) => {}
        other => panic!("expected TableCallExpression, got {:?}", other),
    }
}

#[test]
fn test_table_constructor_field_kinds() {
    let chunk = parse_ok("t = { [k] = 1, name = 2, 3; 4 }");
    match &chunk.body[0] {
        Statement::AssignmentStatement(assignment) => match &assignment.init[0] {
            Expression::TableConstructorExpression(table) => {
                assert_eq!(table.fields.len(), 4);
                let tags: Vec<&str> = table
                    .fields
                    .iter()
                    .map(|field| match field {
                        lunar_ast::TableField::TableKey(_) => "TableKey",
                        lunar_ast::TableField::TableKeyString(_) => "TableKeyString",
                        lunar_ast::TableField::TableValue(_) => "TableValue",
                    })
                    .collect();
                assert_eq!(tags, ["TableKey", "TableKeyString", "TableValue", "TableValue"]);
            }
            other => panic!("expected table constructor, got {:?}", other),
        },
        other => panic!("expected AssignmentStatement, got {:?}", other),
    }
}

#[test]
fn test_name_value_field_needs_equals_lookahead() {
    // Without `=` in the lookahead the name is a value expression.
    let chunk = parse_ok("t = { name }");
    match &chunk.body[0] {
        Statement::AssignmentStatement(assignment) => match &assignment.init[0] {
            Expression::TableConstructorExpression(table) => {
                assert!(matches!(table.fields[0], lunar_ast::TableField::TableValue(_)));
            }
            other => panic!("expected table constructor, got {:?}", other),
        },
        other => panic!("expected AssignmentStatement, got {:?}", other),
    }
}

#[test]
fn test_anonymous_function_expression() {
    match single_expression("return function(a, b) return a end") {
        Expression::FunctionDeclaration(declaration) => {
            assert!(declaration.identifier.is_none());
            assert_eq!(declaration.parameters.len(), 2);
        }
        other => panic!("expected FunctionDeclaration, got {:?}", other),
    }
}

#[test]
fn test_vararg_in_vararg_function() {
    assert_statement_count("function f(...) return ... end", 1);
    // The chunk itself is a vararg function.
    assert_statement_count("return ...", 1);
}

#[test]
fn test_vararg_outside_vararg_function() {
    let message = parse_error("function f() return ... end", LuaVersion::Lua51);
    assert_eq!(message, "cannot use '...' outside a vararg function near '...'");
}

#[test]
fn test_vararg_must_be_last_parameter() {
    let message = parse_error("function f(..., a) end", LuaVersion::Lua51);
    assert_eq!(message, "')' expected near ','");
}

// ============================================================================
// Ambiguous call syntax
// ============================================================================

#[test]
fn test_call_on_new_line_is_ambiguous_in_51() {
    let message = parse_error("f()\n(g)()", LuaVersion::Lua51);
    assert_eq!(message, "ambiguous syntax (function call x new statement) near '('");
}

#[test]
fn test_call_on_new_line_accepted_in_52() {
    // 5.2 reads the parenthesis as a continuation of the call chain.
    let chunk = parse_version("f()\n(g)()", LuaVersion::Lua52);
    assert_eq!(chunk.body.len(), 1);
}

#[test]
fn test_call_on_same_line_fine_in_51() {
    assert_statement_count("f()(g)()", 1);
}

// ============================================================================
// Dialects
// ============================================================================

#[test]
fn test_goto_statement_needs_labels_feature() {
    assert!(parse("goto done ::done::", options_for(LuaVersion::Lua52)).is_ok());
    // In 5.1 `goto` is a plain identifier, and `::` is not a token.
    assert!(parse("goto done ::done::", options_for(LuaVersion::Lua51)).is_err());
}

#[test]
fn test_contextual_goto_in_luajit() {
    assert!(parse("goto done ::done::", options_for(LuaVersion::LuaJit)).is_ok());
    // `goto` still works as a variable name when no goto statement reads.
    assert!(parse("goto = 1", options_for(LuaVersion::LuaJit)).is_ok());
}

#[test]
fn test_break_placement_by_dialect() {
    // 5.1: break must close the block.
    assert!(parse("while true do break x = 1 end", options_for(LuaVersion::Lua51)).is_err());
    // 5.2 relaxes the placement.
    assert!(parse("while true do break x = 1 end", options_for(LuaVersion::Lua52)).is_ok());
}

// ============================================================================
// Chunk payload and serialization
// ============================================================================

#[test]
fn test_comments_collected_by_default() {
    let chunk = parse_ok("-- leading\nx = 1 -- trailing");
    let comments = chunk.comments.expect("comments missing");
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].value, " leading");
}

#[test]
fn test_comments_absent_when_disabled() {
    let options = Options { comments: false, ..Options::default() };
    let chunk = parse("x = 1 -- note", options).unwrap();
    assert!(chunk.comments.is_none());
}

#[test]
fn test_chunk_json_shape() {
    let chunk = parse_ok("local x = 1");
    let json = serde_json::to_value(&chunk).unwrap();
    assert_eq!(json["type"], "Chunk");
    assert_eq!(json["body"][0]["type"], "LocalStatement");
    assert_eq!(json["body"][0]["variables"][0]["type"], "Identifier");
    assert_eq!(json["body"][0]["init"][0]["type"], "NumericLiteral");
    assert_eq!(json["body"][0]["init"][0]["value"], 1.0);
    assert_eq!(json["body"][0]["init"][0]["raw"], "1");
}

#[test]
fn test_incremental_input_matches_one_shot() {
    let mut parser = Parser::new(Options::default());
    parser.write("local x ");
    parser.write("= 1\n");
    parser.write("return x");
    let incremental = parser.finish().unwrap();
    let one_shot = parse_ok("local x = 1\nreturn x");
    assert_eq!(incremental, one_shot);
}

#[test]
fn test_shebang_input() {
    let chunk = parse_ok("#!/usr/bin/env lua\nreturn 1");
    assert_eq!(chunk.body.len(), 1);
}

#[test]
fn test_empty_chunk() {
    let chunk = parse_ok("");
    assert!(chunk.body.is_empty());
}

#[test]
fn test_syntax_error_positions() {
    let error = match parse("x = 1\ny =", options_for(LuaVersion::Lua51)) {
        Err(lunar_diagnostics::Error::Syntax(error)) => error,
        other => panic!("expected syntax error, got {:?}", other),
    };
    assert_eq!(error.line, 2);
    assert_eq!(error.message, "<expression> expected near '<eof>'");
}
