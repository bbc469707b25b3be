//! Scope tracking tests: `isLocal` annotation, the chunk-level globals
//! list, and the observer callbacks.

use lunar_ast::{Chunk, Expression, Statement};
use lunar_core::Options;
use lunar_parser::{parse, Callbacks, Parser};
use std::cell::RefCell;
use std::rc::Rc;

fn parse_scoped(source: &str) -> Chunk {
    let options = Options { scope: true, ..Options::default() };
    parse(source, options).unwrap_or_else(|error| {
        panic!("parse failed for {:?}: {}", source, error);
    })
}

fn global_names(chunk: &Chunk) -> Vec<String> {
    chunk
        .globals
        .as_ref()
        .expect("globals missing")
        .iter()
        .map(|identifier| identifier.name.clone())
        .collect()
}

#[test]
fn test_local_vs_global_annotation() {
    let chunk = parse_scoped("local x\nx = 1\ny = 2");
    assert_eq!(global_names(&chunk), ["y"]);

    match &chunk.body[1] {
        Statement::AssignmentStatement(assignment) => match &assignment.variables[0] {
            Expression::Identifier(identifier) => assert_eq!(identifier.is_local, Some(true)),
            other => panic!("expected identifier, got {:?}", other),
        },
        other => panic!("expected assignment, got {:?}", other),
    }
    match &chunk.body[2] {
        Statement::AssignmentStatement(assignment) => match &assignment.variables[0] {
            Expression::Identifier(identifier) => assert_eq!(identifier.is_local, Some(false)),
            other => panic!("expected identifier, got {:?}", other),
        },
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn test_globals_deduplicated_by_name() {
    let chunk = parse_scoped("y = 1\ny = 2\nprint(y)");
    assert_eq!(global_names(&chunk), ["y", "print"]);
}

#[test]
fn test_globals_absent_without_scope_option() {
    let chunk = parse("x = 1", Options::default()).unwrap();
    assert!(chunk.globals.is_none());
}

#[test]
fn test_globals_entries_are_marked_global() {
    let chunk = parse_scoped("x = 1");
    let globals = chunk.globals.unwrap();
    assert_eq!(globals[0].is_local, Some(false));
    let json = serde_json::to_value(&globals[0]).unwrap();
    assert_eq!(json["isLocal"], false);
}

#[test]
fn test_function_parameters_are_local() {
    let chunk = parse_scoped("function f(a) a = 1 end");
    assert_eq!(global_names(&chunk), ["f"]);
    match &chunk.body[0] {
        Statement::FunctionDeclaration(declaration) => {
            match &declaration.body[0] {
                Statement::AssignmentStatement(assignment) => match &assignment.variables[0] {
                    Expression::Identifier(identifier) => {
                        assert_eq!(identifier.is_local, Some(true))
                    }
                    other => panic!("expected identifier, got {:?}", other),
                },
                other => panic!("expected assignment, got {:?}", other),
            }
        }
        other => panic!("expected function declaration, got {:?}", other),
    }
}

#[test]
fn test_locals_do_not_leak_out_of_blocks() {
    let chunk = parse_scoped("do local x = 1 end\nx = 2");
    assert_eq!(global_names(&chunk), ["x"]);
}

#[test]
fn test_local_function_is_visible_in_own_body() {
    let chunk = parse_scoped("local function f() return f end");
    assert!(global_names(&chunk).is_empty());
    match &chunk.body[0] {
        Statement::FunctionDeclaration(declaration) => match &declaration.body[0] {
            Statement::ReturnStatement(statement) => match &statement.arguments[0] {
                Expression::Identifier(identifier) => assert_eq!(identifier.is_local, Some(true)),
                other => panic!("expected identifier, got {:?}", other),
            },
            other => panic!("expected return, got {:?}", other),
        },
        other => panic!("expected function declaration, got {:?}", other),
    }
}

#[test]
fn test_global_function_statement_name() {
    // A plain `function f()` does not declare a local.
    let chunk = parse_scoped("function f() end\nf()");
    assert_eq!(global_names(&chunk), ["f"]);
}

#[test]
fn test_loop_variables_are_local() {
    let chunk = parse_scoped("for i = 1, 2 do print(i) end");
    assert_eq!(global_names(&chunk), ["print"]);

    let chunk = parse_scoped("for k, v in pairs(t) do x = k end");
    assert_eq!(global_names(&chunk), ["pairs", "t", "x"]);
}

#[test]
fn test_initializers_cannot_see_their_own_declaration() {
    // `local x = x` reads the outer (global) x.
    let chunk = parse_scoped("local x = x");
    assert_eq!(global_names(&chunk), ["x"]);
    match &chunk.body[0] {
        Statement::LocalStatement(local) => {
            assert_eq!(local.variables[0].is_local, Some(true));
            match &local.init[0] {
                Expression::Identifier(identifier) => assert_eq!(identifier.is_local, Some(false)),
                other => panic!("expected identifier, got {:?}", other),
            }
        }
        other => panic!("expected local statement, got {:?}", other),
    }
}

// ============================================================================
// Callbacks
// ============================================================================

#[test]
fn test_scope_callbacks_balance() {
    let creates = Rc::new(RefCell::new(0usize));
    let destroys = Rc::new(RefCell::new(0usize));

    let callbacks = Callbacks {
        on_create_scope: Some(Box::new({
            let creates = Rc::clone(&creates);
            move || *creates.borrow_mut() += 1
        })),
        on_destroy_scope: Some(Box::new({
            let destroys = Rc::clone(&destroys);
            move || *destroys.borrow_mut() += 1
        })),
        ..Callbacks::default()
    };

    let options = Options { scope: true, ..Options::default() };
    let mut parser = Parser::with_callbacks(options, callbacks);
    parser.write("do local x = 1 end function f(a) if a then return end end");
    parser.finish().unwrap();

    let creates = *creates.borrow();
    assert_eq!(creates, *destroys.borrow());
    assert!(creates > 0);
}

#[test]
fn test_local_declaration_callback() {
    let declared = Rc::new(RefCell::new(Vec::new()));

    let callbacks = Callbacks {
        on_local_declaration: Some(Box::new({
            let declared = Rc::clone(&declared);
            move |name: &str| declared.borrow_mut().push(name.to_string())
        })),
        ..Callbacks::default()
    };

    let options = Options { scope: true, ..Options::default() };
    let mut parser = Parser::with_callbacks(options, callbacks);
    parser.write("local a, b = 1, 2 for i = 1, 2 do end");
    parser.finish().unwrap();

    assert_eq!(*declared.borrow(), ["a", "b", "i"]);
}

#[test]
fn test_on_create_node_sees_every_node() {
    let types = Rc::new(RefCell::new(Vec::new()));

    let callbacks = Callbacks {
        on_create_node: Some(Box::new({
            let types = Rc::clone(&types);
            move |node: &dyn lunar_ast::AstNode| types.borrow_mut().push(node.node_type())
        })),
        ..Callbacks::default()
    };

    let mut parser = Parser::with_callbacks(Options::default(), callbacks);
    parser.write("-- note\nlocal x = 1");
    parser.finish().unwrap();

    let types = types.borrow();
    assert_eq!(
        *types,
        ["Comment", "Identifier", "NumericLiteral", "LocalStatement", "Chunk"]
    );
}
