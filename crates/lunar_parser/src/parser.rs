//! The Lua parser.
//!
//! A single-pass recursive descent parser for statements with precedence
//! climbing for expressions. Exactly two live tokens are held (current and
//! lookahead) plus the previous token for end-of-node positions; advancing
//! goes through `next()` alone.
//!
//! Expression nesting recurses on the call stack, so pathologically nested
//! input is bounded by stack depth rather than by a counter.

use crate::callbacks::Callbacks;
use crate::flow::FlowContext;
use crate::marker::Marker;
use crate::precedence::{binary_precedence, UNARY_PRECEDENCE};
use crate::scope::ScopeTracker;
use lunar_ast::builder;
use lunar_ast::{
    AstNode, Block, Chunk, Expression, FunctionDeclaration, Identifier, LiteralValue, Statement,
    TableConstructorExpression, TokenKind,
};
use lunar_core::{Features, Options, TextRange};
use lunar_diagnostics::{format_message, messages, Error, SyntaxError};
use lunar_lexer::{Lexer, Token, TokenValue};

/// Parse a complete source text in one call.
pub fn parse(input: &str, options: Options) -> Result<Chunk, Error> {
    let mut parser = Parser::new(options);
    parser.write(input);
    parser.finish()
}

/// A parse session being assembled. Input can be supplied incrementally
/// with [`Parser::write`] before a single [`Parser::finish`] call runs the
/// parse. Sessions are independent; concurrent parses simply use separate
/// `Parser` values.
#[derive(Debug)]
pub struct Parser {
    input: String,
    options: Options,
    callbacks: Callbacks,
}

impl Parser {
    pub fn new(options: Options) -> Self {
        Self { input: String::new(), options, callbacks: Callbacks::default() }
    }

    pub fn with_callbacks(options: Options, callbacks: Callbacks) -> Self {
        Self { input: String::new(), options, callbacks }
    }

    /// Append a piece of source text.
    pub fn write(&mut self, chunk: &str) -> &mut Self {
        self.input.push_str(chunk);
        self
    }

    /// Parse the accumulated input into a chunk.
    pub fn finish(self) -> Result<Chunk, Error> {
        let Parser { input, options, callbacks } = self;

        let mut features = Features::for_version(options.lua_version);
        if let Some(extended) = options.extended_identifiers {
            features.extended_identifiers = extended;
        }

        let lexer = Lexer::new(input, &options, features);
        let mut session = Session::new(lexer, options, features, callbacks)?;
        let chunk = session.run()?;
        Ok(chunk)
    }
}

// ============================================================================
// Session
// ============================================================================

/// All mutable state of one in-flight parse. Nothing is shared between
/// sessions.
struct Session {
    lexer: Lexer,
    options: Options,
    features: Features,
    callbacks: Callbacks,
    track_locations: bool,
    token: Token,
    lookahead: Token,
    previous: Option<Token>,
    markers: Vec<Marker>,
    scopes: ScopeTracker,
    globals: Vec<Identifier>,
    /// How many collected comments have been reported to `on_create_node`.
    comments_reported: usize,
}

impl Session {
    fn new(
        mut lexer: Lexer,
        options: Options,
        features: Features,
        callbacks: Callbacks,
    ) -> Result<Self, SyntaxError> {
        let lookahead = lexer.lex()?;
        let placeholder = Token {
            kind: TokenKind::Eof,
            value: TokenValue::Str("<eof>".to_string()),
            range: TextRange::empty(0),
            line: 1,
            line_start: 0,
            last_line: None,
            last_line_start: None,
        };
        let track_locations = options.track_locations();
        let mut session = Self {
            lexer,
            options,
            features,
            callbacks,
            track_locations,
            token: placeholder,
            lookahead,
            previous: None,
            markers: Vec::new(),
            scopes: ScopeTracker::new(),
            globals: Vec::new(),
            comments_reported: 0,
        };
        session.report_new_comments();
        Ok(session)
    }

    fn run(&mut self) -> Result<Chunk, SyntaxError> {
        let mut chunk = self.parse_chunk()?;
        if self.options.comments {
            chunk.comments = Some(std::mem::take(&mut self.lexer.comments));
        }
        if self.options.scope {
            chunk.globals = Some(std::mem::take(&mut self.globals));
        }
        // The marker stack must drain exactly; leftovers mean the tracking
        // logic itself is broken, not the input.
        assert!(self.markers.is_empty(), "location tracking failed");
        Ok(chunk)
    }

    // ========================================================================
    // Token handling
    // ========================================================================

    /// Shift lookahead into the current token and lex a new lookahead.
    /// This is the only way the parser advances.
    fn next(&mut self) -> Result<(), SyntaxError> {
        let new_lookahead = self.lexer.lex()?;
        let old_lookahead = std::mem::replace(&mut self.lookahead, new_lookahead);
        self.previous = Some(std::mem::replace(&mut self.token, old_lookahead));
        self.report_new_comments();
        Ok(())
    }

    /// Comments are intercepted by the lexer; report any new ones to the
    /// node observer in source order.
    fn report_new_comments(&mut self) {
        if let Some(on_create_node) = &mut self.callbacks.on_create_node {
            for comment in &self.lexer.comments[self.comments_reported..] {
                on_create_node(comment);
            }
        }
        self.comments_reported = self.lexer.comments.len();
    }

    /// Consume the current token if its text matches; report success.
    fn consume(&mut self, value: &str) -> Result<bool, SyntaxError> {
        if self.token.is(value) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Like `consume`, but failure is a syntax error.
    fn expect(&mut self, value: &str) -> Result<(), SyntaxError> {
        if self.token.is(value) {
            self.next()
        } else {
            let near = self.lexer.token_text(&self.token);
            Err(self
                .token
                .error(format_message(messages::EXPECTED, &[value, &near])))
        }
    }

    /// A general "unexpected token" error, naming the token's class and
    /// the lookahead as context.
    fn unexpected(&self, found: &Token) -> SyntaxError {
        let near = self.lexer.token_text(&self.lookahead);
        match found.kind {
            TokenKind::Eof => found.error(format_message(messages::UNEXPECTED_EOF, &[])),
            TokenKind::NilLiteral => {
                found.error(format_message(messages::UNEXPECTED, &["symbol", "nil", &near]))
            }
            kind => {
                let text = self.lexer.token_text(found);
                found.error(format_message(
                    messages::UNEXPECTED,
                    &[kind.description(), &text, &near],
                ))
            }
        }
    }

    /// "<name> expected near 'x'" and friends.
    fn unexpected_token(&self, expected: &str, token: &Token) -> SyntaxError {
        let near = self.lexer.token_text(token);
        token.error(format_message(messages::EXPECTED_TOKEN, &[expected, &near]))
    }

    // ========================================================================
    // Location tracking
    // ========================================================================

    fn create_marker(&self) -> Marker {
        Marker::from_token(&self.token)
    }

    /// Push a marker for the current token.
    fn mark_location(&mut self) {
        if self.track_locations {
            self.markers.push(self.create_marker());
        }
    }

    fn push_location(&mut self, marker: Marker) {
        if self.track_locations {
            self.markers.push(marker);
        }
    }

    fn discard_location(&mut self) {
        if self.track_locations {
            self.markers.pop();
        }
    }

    /// Pop the node's marker, stamp the node, and fire the node observer.
    fn finish_node<N: AstNode>(&mut self, mut node: N) -> N {
        if self.track_locations {
            if let Some(marker) = self.markers.pop() {
                let previous = self.previous.as_ref().unwrap_or(&self.token);
                marker.bless(&mut node, previous, self.options.locations, self.options.ranges);
            }
        }
        if let Some(on_create_node) = &mut self.callbacks.on_create_node {
            on_create_node(&node);
        }
        node
    }

    // ========================================================================
    // Scope tracking
    // ========================================================================

    fn create_scope(&mut self) {
        self.scopes.create();
        if let Some(on_create_scope) = &mut self.callbacks.on_create_scope {
            on_create_scope();
        }
    }

    fn destroy_scope(&mut self) {
        self.scopes.destroy();
        if let Some(on_destroy_scope) = &mut self.callbacks.on_destroy_scope {
            on_destroy_scope();
        }
    }

    fn scope_identifier_name(&mut self, name: &str) {
        if let Some(on_local_declaration) = &mut self.callbacks.on_local_declaration {
            on_local_declaration(name);
        }
        self.scopes.add_name(name);
    }

    /// Declare the identifier in the current scope and mark it local.
    fn scope_identifier(&mut self, node: &mut Identifier) {
        let name = node.name.clone();
        self.scope_identifier_name(&name);
        self.attach_scope(node, true);
    }

    /// Stamp `is_local`; globals are also recorded once per name on the
    /// chunk-level list.
    fn attach_scope(&mut self, node: &mut Identifier, is_local: bool) {
        node.is_local = Some(is_local);
        if !is_local && !self.globals.iter().any(|global| global.name == node.name) {
            self.globals.push(node.clone());
        }
    }

    // ========================================================================
    // Chunk and blocks
    // ========================================================================

    //     chunk ::= block
    fn parse_chunk(&mut self) -> Result<Chunk, SyntaxError> {
        self.next()?;
        self.mark_location();
        if self.options.scope {
            self.create_scope();
        }
        let mut flow = FlowContext::new(self.features.labels);
        flow.allow_vararg = true;
        flow.push_scope(false);
        let body = self.parse_block(&mut flow)?;
        flow.pop_scope()?;
        if self.options.scope {
            self.destroy_scope();
        }
        if self.token.kind != TokenKind::Eof {
            return Err(self.unexpected(&self.token.clone()));
        }
        // An empty body means no token was ever consumed; complete the
        // chunk's location against the EOF token instead.
        if self.track_locations && body.is_empty() {
            self.previous = Some(self.token.clone());
        }
        Ok(self.finish_node(builder::chunk(body)))
    }

    //     block ::= {stat} [retstat]
    fn parse_block(&mut self, flow: &mut FlowContext) -> Result<Block, SyntaxError> {
        let mut block = Vec::new();

        while !self.is_block_follow() {
            // `return` must close the block, and so must `break` in
            // dialects without relaxed placement.
            if self.token.is("return") || (!self.features.relaxed_break && self.token.is("break")) {
                if let Some(statement) = self.parse_statement(flow)? {
                    block.push(statement);
                }
                break;
            }
            let statement = self.parse_statement(flow)?;
            self.consume(";")?;
            // Some statements produce no node (the empty statement) and
            // are simply not appended.
            if let Some(statement) = statement {
                block.push(statement);
            }
        }

        Ok(block)
    }

    /// Whether the current token syntactically closes a block.
    fn is_block_follow(&self) -> bool {
        if self.token.kind == TokenKind::Eof {
            return true;
        }
        if self.token.kind != TokenKind::Keyword {
            return false;
        }
        matches!(
            self.token.value.as_str(),
            Some("else") | Some("elseif") | Some("end") | Some("until")
        )
    }

    // ========================================================================
    // Statements
    // ========================================================================

    //     statement ::= break | goto | do | while | repeat | return
    //          | if | for | function | local | label | assignment
    //          | functioncall | ';'
    fn parse_statement(
        &mut self,
        flow: &mut FlowContext,
    ) -> Result<Option<Statement>, SyntaxError> {
        self.mark_location();

        if self.token.kind == TokenKind::Punctuator && self.consume("::")? {
            return self.parse_label_statement(flow).map(Some);
        }

        // A bare `;` is eaten without producing a node.
        if self.features.empty_statement && self.consume(";")? {
            self.discard_location();
            return Ok(None);
        }

        flow.raise_deferred_errors()?;

        if self.token.kind == TokenKind::Keyword {
            match self.token.value.as_str().unwrap_or("") {
                "local" => {
                    self.next()?;
                    return self.parse_local_statement(flow).map(Some);
                }
                "if" => {
                    self.next()?;
                    return self.parse_if_statement(flow).map(Some);
                }
                "return" => {
                    self.next()?;
                    return self.parse_return_statement(flow).map(Some);
                }
                "function" => {
                    self.next()?;
                    let name = self.parse_function_name()?;
                    let declaration = self.parse_function_declaration(Some(name), false)?;
                    return Ok(Some(Statement::FunctionDeclaration(declaration)));
                }
                "while" => {
                    self.next()?;
                    return self.parse_while_statement(flow).map(Some);
                }
                "for" => {
                    self.next()?;
                    return self.parse_for_statement(flow).map(Some);
                }
                "repeat" => {
                    self.next()?;
                    return self.parse_repeat_statement(flow).map(Some);
                }
                "break" => {
                    self.next()?;
                    if !flow.is_in_loop() {
                        let near = self.token.value.text();
                        return Err(self
                            .token
                            .error(format_message(messages::NO_LOOP_TO_BREAK, &[&near])));
                    }
                    return self.parse_break_statement().map(Some);
                }
                "do" => {
                    self.next()?;
                    return self.parse_do_statement(flow).map(Some);
                }
                "goto" => {
                    self.next()?;
                    return self.parse_goto_statement(flow).map(Some);
                }
                _ => {}
            }
        }

        // LuaJIT: `goto` is an ordinary name unless it reads as a goto
        // statement right here.
        if self.features.contextual_goto
            && self.token.kind == TokenKind::Identifier
            && self.token.value.as_str() == Some("goto")
            && self.lookahead.kind == TokenKind::Identifier
            && self.lookahead.value.as_str() != Some("goto")
        {
            self.next()?;
            return self.parse_goto_statement(flow).map(Some);
        }

        // Assignments memorize the start location and push it by hand.
        self.discard_location();

        self.parse_assignment_or_call_statement(flow).map(Some)
    }

    //     label ::= '::' Name '::'
    fn parse_label_statement(&mut self, flow: &mut FlowContext) -> Result<Statement, SyntaxError> {
        let name_token = self.token.clone();
        let mut label = self.parse_identifier()?;

        if self.options.scope {
            let name = name_token.value.as_str().unwrap_or("").to_string();
            self.scope_identifier_name(&format!("::{}::", name));
            self.attach_scope(&mut label, true);
        }

        self.expect("::")?;

        flow.add_label(name_token.value.as_str().unwrap_or(""), &name_token)?;
        Ok(self.finish_node(builder::label_statement(label)))
    }

    //     break ::= 'break'
    fn parse_break_statement(&mut self) -> Result<Statement, SyntaxError> {
        Ok(self.finish_node(builder::break_statement()))
    }

    //     goto ::= 'goto' Name
    fn parse_goto_statement(&mut self, flow: &mut FlowContext) -> Result<Statement, SyntaxError> {
        let name = self.token.value.as_str().unwrap_or("").to_string();
        let goto_token = self.previous.clone().unwrap_or_else(|| self.token.clone());
        let label = self.parse_identifier()?;

        flow.add_goto(name, goto_token);
        Ok(self.finish_node(builder::goto_statement(label)))
    }

    //     do ::= 'do' block 'end'
    fn parse_do_statement(&mut self, flow: &mut FlowContext) -> Result<Statement, SyntaxError> {
        if self.options.scope {
            self.create_scope();
        }
        flow.push_scope(false);
        let body = self.parse_block(flow)?;
        flow.pop_scope()?;
        if self.options.scope {
            self.destroy_scope();
        }
        self.expect("end")?;
        Ok(self.finish_node(builder::do_statement(body)))
    }

    //     while ::= 'while' exp 'do' block 'end'
    fn parse_while_statement(&mut self, flow: &mut FlowContext) -> Result<Statement, SyntaxError> {
        let condition = self.parse_expected_expression(flow)?;
        self.expect("do")?;
        if self.options.scope {
            self.create_scope();
        }
        flow.push_scope(true);
        let body = self.parse_block(flow)?;
        flow.pop_scope()?;
        if self.options.scope {
            self.destroy_scope();
        }
        self.expect("end")?;
        Ok(self.finish_node(builder::while_statement(condition, body)))
    }

    //     repeat ::= 'repeat' block 'until' exp
    fn parse_repeat_statement(&mut self, flow: &mut FlowContext) -> Result<Statement, SyntaxError> {
        if self.options.scope {
            self.create_scope();
        }
        flow.push_scope(true);
        let body = self.parse_block(flow)?;
        self.expect("until")?;
        flow.raise_deferred_errors()?;
        // The condition can still see locals declared in the body.
        let condition = self.parse_expected_expression(flow)?;
        flow.pop_scope()?;
        if self.options.scope {
            self.destroy_scope();
        }
        Ok(self.finish_node(builder::repeat_statement(condition, body)))
    }

    //     retstat ::= 'return' [exp {',' exp}] [';']
    fn parse_return_statement(&mut self, flow: &mut FlowContext) -> Result<Statement, SyntaxError> {
        let mut expressions = Vec::new();

        if !self.token.is("end") {
            if let Some(expression) = self.parse_expression(flow)? {
                expressions.push(expression);
            }
            while self.consume(",")? {
                expressions.push(self.parse_expected_expression(flow)?);
            }
            self.consume(";")?;
        }
        Ok(self.finish_node(builder::return_statement(expressions)))
    }

    //     if ::= 'if' exp 'then' block {elif} ['else' block] 'end'
    //     elif ::= 'elseif' exp 'then' block
    fn parse_if_statement(&mut self, flow: &mut FlowContext) -> Result<Statement, SyntaxError> {
        let mut clauses = Vec::new();

        // The first clause begins where the statement does; its marker is
        // a copy of the one already on the stack.
        if self.track_locations {
            if let Some(&top) = self.markers.last() {
                self.markers.push(top);
            }
        }
        let condition = self.parse_expected_expression(flow)?;
        self.expect("then")?;
        if self.options.scope {
            self.create_scope();
        }
        flow.push_scope(false);
        let body = self.parse_block(flow)?;
        flow.pop_scope()?;
        if self.options.scope {
            self.destroy_scope();
        }
        clauses.push(self.finish_node(builder::if_clause(condition, body)));

        let mut marker = self.create_marker();
        while self.consume("elseif")? {
            self.push_location(marker);
            let condition = self.parse_expected_expression(flow)?;
            self.expect("then")?;
            if self.options.scope {
                self.create_scope();
            }
            flow.push_scope(false);
            let body = self.parse_block(flow)?;
            flow.pop_scope()?;
            if self.options.scope {
                self.destroy_scope();
            }
            clauses.push(self.finish_node(builder::elseif_clause(condition, body)));
            marker = self.create_marker();
        }

        if self.consume("else")? {
            // The `else` keyword itself is part of the clause.
            if self.track_locations {
                let else_token = self.previous.clone().unwrap_or_else(|| self.token.clone());
                self.markers.push(Marker::from_token(&else_token));
            }
            if self.options.scope {
                self.create_scope();
            }
            flow.push_scope(false);
            let body = self.parse_block(flow)?;
            flow.pop_scope()?;
            if self.options.scope {
                self.destroy_scope();
            }
            clauses.push(self.finish_node(builder::else_clause(body)));
        }

        self.expect("end")?;
        Ok(self.finish_node(builder::if_statement(clauses)))
    }

    //     for ::= Name '=' exp ',' exp [',' exp] 'do' block 'end'
    //     for ::= namelist 'in' explist 'do' block 'end'
    //     namelist ::= Name {',' Name}
    //     explist ::= exp {',' exp}
    fn parse_for_statement(&mut self, flow: &mut FlowContext) -> Result<Statement, SyntaxError> {
        let mut variable = self.parse_identifier()?;

        // The loop variable is local to the loop.
        if self.options.scope {
            self.create_scope();
            self.scope_identifier(&mut variable);
        }

        // `=` after the first name selects the numeric form.
        if self.consume("=")? {
            let start = self.parse_expected_expression(flow)?;
            self.expect(",")?;
            let end = self.parse_expected_expression(flow)?;
            let step = if self.consume(",")? {
                Some(self.parse_expected_expression(flow)?)
            } else {
                None
            };

            self.expect("do")?;
            flow.push_scope(true);
            let body = self.parse_block(flow)?;
            flow.pop_scope()?;
            self.expect("end")?;
            if self.options.scope {
                self.destroy_scope();
            }

            Ok(self.finish_node(builder::for_numeric_statement(variable, start, end, step, body)))
        } else {
            let mut variables = vec![variable];
            while self.consume(",")? {
                let mut variable = self.parse_identifier()?;
                if self.options.scope {
                    self.scope_identifier(&mut variable);
                }
                variables.push(variable);
            }
            self.expect("in")?;

            let mut iterators = Vec::new();
            loop {
                iterators.push(self.parse_expected_expression(flow)?);
                if !self.consume(",")? {
                    break;
                }
            }

            self.expect("do")?;
            flow.push_scope(true);
            let body = self.parse_block(flow)?;
            flow.pop_scope()?;
            self.expect("end")?;
            if self.options.scope {
                self.destroy_scope();
            }

            Ok(self.finish_node(builder::for_generic_statement(variables, iterators, body)))
        }
    }

    //     local ::= 'local' 'function' Name funcdecl
    //        | 'local' Name {',' Name} ['=' exp {',' exp}]
    fn parse_local_statement(&mut self, flow: &mut FlowContext) -> Result<Statement, SyntaxError> {
        if self.token.kind == TokenKind::Identifier {
            let mut variables = Vec::new();
            let mut init = Vec::new();

            loop {
                let name = self.parse_identifier()?;
                flow.add_local(name.name.clone());
                variables.push(name);
                if !self.consume(",")? {
                    break;
                }
            }

            if self.consume("=")? {
                loop {
                    init.push(self.parse_expected_expression(flow)?);
                    if !self.consume(",")? {
                        break;
                    }
                }
            }

            // The declarations don't exist until the whole statement has
            // been read, so the initializers can't refer to them.
            if self.options.scope {
                for variable in &mut variables {
                    self.scope_identifier(variable);
                }
            }

            Ok(self.finish_node(builder::local_statement(variables, init)))
        } else if self.consume("function")? {
            let mut name = self.parse_identifier()?;
            flow.add_local(name.name.clone());

            if self.options.scope {
                self.scope_identifier(&mut name);
                self.create_scope();
            }

            // Member-expression names are not allowed on local functions.
            let identifier = Expression::Identifier(name);
            let declaration = self.parse_function_declaration(Some(identifier), true)?;
            Ok(Statement::FunctionDeclaration(declaration))
        } else {
            Err(self.unexpected_token("<name>", &self.token.clone()))
        }
    }

    //     assignment ::= varlist '=' explist
    //     var ::= Name | prefixexp '[' exp ']' | prefixexp '.' Name
    //     varlist ::= var {',' var}
    //
    //     call ::= prefixexp args | prefixexp ':' Name args
    fn parse_assignment_or_call_statement(
        &mut self,
        flow: &mut FlowContext,
    ) -> Result<Statement, SyntaxError> {
        let start_marker = self.create_marker();
        let mut marker = start_marker;
        let mut targets: Vec<Expression> = Vec::new();
        // Some(true): definitely assignable. Some(false): definitely not.
        // None: the suffix chain ended in a call.
        let mut lvalue: Option<bool>;

        loop {
            if !targets.is_empty() {
                marker = self.create_marker();
            }

            let mut base = if self.token.kind == TokenKind::Identifier {
                let name = self.token.value.as_str().unwrap_or("").to_string();
                let mut identifier = self.parse_identifier()?;
                if self.options.scope {
                    let is_local = self.scopes.has_name(&name);
                    self.attach_scope(&mut identifier, is_local);
                }
                lvalue = Some(true);
                Expression::Identifier(identifier)
            } else if self.token.is("(") {
                self.next()?;
                let inner = self.parse_expected_expression(flow)?;
                self.expect(")")?;
                lvalue = Some(false);
                inner
            } else {
                return Err(self.unexpected(&self.token.clone()));
            };

            loop {
                let suffix = if self.token.kind == TokenKind::StringLiteral {
                    "\""
                } else {
                    self.token.value.as_str().unwrap_or("")
                };
                match suffix {
                    "." | "[" => lvalue = Some(true),
                    ":" | "(" | "{" | "\"" => lvalue = None,
                    _ => break,
                }
                base = self.parse_prefix_expression_part(base, marker, flow)?;
            }

            targets.push(base);

            if !self.token.is(",") {
                break;
            }
            // Every target before a comma must itself be assignable.
            if lvalue != Some(true) {
                return Err(self.unexpected(&self.token.clone()));
            }
            self.next()?;
        }

        if targets.len() == 1 && lvalue.is_none() {
            self.push_location(marker);
            if let Some(expression) = targets.pop() {
                return Ok(self.finish_node(builder::call_statement(expression)));
            }
        }
        if lvalue != Some(true) {
            return Err(self.unexpected(&self.token.clone()));
        }

        self.expect("=")?;

        let mut values = Vec::new();
        loop {
            values.push(self.parse_expected_expression(flow)?);
            if !self.consume(",")? {
                break;
            }
        }

        self.push_location(start_marker);
        Ok(self.finish_node(builder::assignment_statement(targets, values)))
    }

    // ========================================================================
    // Non-statements
    // ========================================================================

    //     Identifier ::= Name
    fn parse_identifier(&mut self) -> Result<Identifier, SyntaxError> {
        self.mark_location();
        if self.token.kind != TokenKind::Identifier {
            return Err(self.unexpected_token("<name>", &self.token.clone()));
        }
        let name = self.token.value.as_str().unwrap_or("").to_string();
        self.next()?;
        Ok(self.finish_node(builder::identifier(name)))
    }

    //     funcdecl ::= '(' [parlist] ')' block 'end'
    //     parlist ::= Name {',' Name} [',' '...'] | '...'
    //
    // The name has already been parsed, which leaves this production shared
    // between function statements and anonymous function expressions. Each
    // function body gets its own flow context: `break` and `goto` never
    // cross a function boundary.
    fn parse_function_declaration(
        &mut self,
        name: Option<Expression>,
        is_local: bool,
    ) -> Result<FunctionDeclaration, SyntaxError> {
        let mut flow = FlowContext::new(self.features.labels);
        flow.push_scope(false);

        let mut parameters: Vec<Expression> = Vec::new();
        self.expect("(")?;

        if !self.consume(")")? {
            loop {
                if self.token.kind == TokenKind::Identifier {
                    let mut parameter = self.parse_identifier()?;
                    // Parameters are local to the function.
                    if self.options.scope {
                        self.scope_identifier(&mut parameter);
                    }
                    parameters.push(Expression::Identifier(parameter));
                    if self.consume(",")? {
                        continue;
                    }
                } else if self.token.kind == TokenKind::VarargLiteral {
                    // Nothing may follow a vararg, so the list ends here.
                    flow.allow_vararg = true;
                    if let Some(parameter) = self.parse_primary_expression(&mut flow)? {
                        parameters.push(parameter);
                    }
                } else {
                    return Err(self.unexpected_token("<name> or '...'", &self.token.clone()));
                }
                self.expect(")")?;
                break;
            }
        }

        let body = self.parse_block(&mut flow)?;
        flow.pop_scope()?;
        self.expect("end")?;
        if self.options.scope {
            self.destroy_scope();
        }

        Ok(self.finish_node(builder::function_declaration(name, parameters, is_local, body)))
    }

    //     funcname ::= Name {'.' Name} [':' Name]
    fn parse_function_name(&mut self) -> Result<Expression, SyntaxError> {
        let marker = self.create_marker();
        let mut identifier = self.parse_identifier()?;

        if self.options.scope {
            let is_local = self.scopes.has_name(&identifier.name);
            self.attach_scope(&mut identifier, is_local);
            self.create_scope();
        }

        let mut base = Expression::Identifier(identifier);
        while self.consume(".")? {
            self.push_location(marker);
            let name = self.parse_identifier()?;
            base = self.finish_node(builder::member_expression(base, ".", name));
        }

        if self.consume(":")? {
            self.push_location(marker);
            let name = self.parse_identifier()?;
            base = self.finish_node(builder::member_expression(base, ":", name));
            if self.options.scope {
                self.scope_identifier_name("self");
            }
        }

        Ok(base)
    }

    //     tableconstructor ::= '{' [fieldlist] '}'
    //     fieldlist ::= field {fieldsep field} [fieldsep]
    //     field ::= '[' exp ']' '=' exp | Name '=' exp | exp
    //     fieldsep ::= ',' | ';'
    fn parse_table_constructor(
        &mut self,
        flow: &mut FlowContext,
    ) -> Result<TableConstructorExpression, SyntaxError> {
        let mut fields = Vec::new();

        loop {
            self.mark_location();
            if self.token.kind == TokenKind::Punctuator && self.consume("[")? {
                let key = self.parse_expected_expression(flow)?;
                self.expect("]")?;
                self.expect("=")?;
                let value = self.parse_expected_expression(flow)?;
                fields.push(self.finish_node(builder::table_key(key, value)));
            } else if self.token.kind == TokenKind::Identifier {
                // Only a `=` in the lookahead makes this a keyed field;
                // otherwise the name is the start of a value expression.
                if self.lookahead.is("=") {
                    let key = self.parse_identifier()?;
                    self.next()?;
                    let value = self.parse_expected_expression(flow)?;
                    fields.push(self.finish_node(builder::table_key_string(key, value)));
                } else {
                    let value = self.parse_expected_expression(flow)?;
                    fields.push(self.finish_node(builder::table_value(value)));
                }
            } else {
                match self.parse_expression(flow)? {
                    Some(value) => fields.push(self.finish_node(builder::table_value(value))),
                    None => {
                        self.discard_location();
                        break;
                    }
                }
            }
            if self.token.is(",") || self.token.is(";") {
                self.next()?;
                continue;
            }
            break;
        }
        self.expect("}")?;
        Ok(self.finish_node(builder::table_constructor_expression(fields)))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    //     exp ::= (unop exp | primary | prefixexp) {binop exp}
    fn parse_expression(
        &mut self,
        flow: &mut FlowContext,
    ) -> Result<Option<Expression>, SyntaxError> {
        self.parse_sub_expression(0, flow)
    }

    /// Parse an expression, failing if none is there.
    fn parse_expected_expression(
        &mut self,
        flow: &mut FlowContext,
    ) -> Result<Expression, SyntaxError> {
        match self.parse_expression(flow)? {
            Some(expression) => Ok(expression),
            None => Err(self.unexpected_token("<expression>", &self.token.clone())),
        }
    }

    fn is_unary(&self, token: &Token) -> bool {
        match token.kind {
            TokenKind::Punctuator => {
                matches!(token.value.as_str(), Some("#") | Some("-") | Some("~"))
            }
            TokenKind::Keyword => token.value.as_str() == Some("not"),
            _ => false,
        }
    }

    /// Precedence climbing. Right-associative operators (`^` and `..`)
    /// recurse one level below their own precedence so they bind rightward.
    fn parse_sub_expression(
        &mut self,
        min_precedence: u8,
        flow: &mut FlowContext,
    ) -> Result<Option<Expression>, SyntaxError> {
        let marker = self.create_marker();
        let mut operator = self.token.value.as_str().unwrap_or("").to_string();

        let mut expression = None;
        if self.is_unary(&self.token) {
            self.mark_location();
            self.next()?;
            let argument = match self.parse_sub_expression(UNARY_PRECEDENCE, flow)? {
                Some(argument) => argument,
                None => return Err(self.unexpected_token("<expression>", &self.token.clone())),
            };
            expression = Some(self.finish_node(builder::unary_expression(operator, argument)));
        }
        if expression.is_none() {
            expression = self.parse_primary_expression(flow)?;
            if expression.is_none() {
                expression = self.parse_prefix_expression(flow)?;
            }
        }
        let mut expression = match expression {
            Some(expression) => expression,
            // Not a valid left-hand side at all.
            None => return Ok(None),
        };

        loop {
            operator = self.token.value.as_str().unwrap_or("").to_string();
            let precedence =
                if matches!(self.token.kind, TokenKind::Punctuator | TokenKind::Keyword) {
                    binary_precedence(&operator)
                } else {
                    0
                };
            if precedence == 0 || precedence <= min_precedence {
                break;
            }
            let mut sub_precedence = precedence;
            if operator == "^" || operator == ".." {
                sub_precedence -= 1;
            }
            self.next()?;
            let right = match self.parse_sub_expression(sub_precedence, flow)? {
                Some(right) => right,
                None => return Err(self.unexpected_token("<expression>", &self.token.clone())),
            };
            // Wrap the whole left-hand side, back to where it started.
            self.push_location(marker);
            expression = self.finish_node(builder::binary_expression(operator, expression, right));
        }

        Ok(Some(expression))
    }

    //     prefixexp ::= prefix {suffix}
    //     prefix ::= Name | '(' exp ')'
    //     suffix ::= '[' exp ']' | '.' Name | ':' Name args | args
    fn parse_prefix_expression(
        &mut self,
        flow: &mut FlowContext,
    ) -> Result<Option<Expression>, SyntaxError> {
        let marker = self.create_marker();

        let mut base = if self.token.kind == TokenKind::Identifier {
            let name = self.token.value.as_str().unwrap_or("").to_string();
            let mut identifier = self.parse_identifier()?;
            if self.options.scope {
                let is_local = self.scopes.has_name(&name);
                self.attach_scope(&mut identifier, is_local);
            }
            Expression::Identifier(identifier)
        } else if self.consume("(")? {
            let inner = self.parse_expected_expression(flow)?;
            self.expect(")")?;
            inner
        } else {
            return Ok(None);
        };

        loop {
            if !self.starts_suffix() {
                break;
            }
            base = self.parse_prefix_expression_part(base, marker, flow)?;
        }

        Ok(Some(base))
    }

    /// Whether the current token continues a prefix-expression suffix
    /// chain.
    fn starts_suffix(&self) -> bool {
        match self.token.kind {
            TokenKind::Punctuator => matches!(
                self.token.value.as_str(),
                Some("[") | Some(".") | Some(":") | Some("(") | Some("{")
            ),
            TokenKind::StringLiteral => true,
            _ => false,
        }
    }

    /// Consume one suffix: indexing, member access, a method call (which
    /// must be followed by call arguments) or call arguments directly.
    fn parse_prefix_expression_part(
        &mut self,
        base: Expression,
        marker: Marker,
        flow: &mut FlowContext,
    ) -> Result<Expression, SyntaxError> {
        if self.token.kind == TokenKind::Punctuator {
            match self.token.value.as_str().unwrap_or("") {
                "[" => {
                    self.push_location(marker);
                    self.next()?;
                    let index = self.parse_expected_expression(flow)?;
                    self.expect("]")?;
                    return Ok(self.finish_node(builder::index_expression(base, index)));
                }
                "." => {
                    self.push_location(marker);
                    self.next()?;
                    let identifier = self.parse_identifier()?;
                    return Ok(self.finish_node(builder::member_expression(base, ".", identifier)));
                }
                ":" => {
                    self.push_location(marker);
                    self.next()?;
                    let identifier = self.parse_identifier()?;
                    let base = self.finish_node(builder::member_expression(base, ":", identifier));
                    // A method reference is only valid as a call.
                    self.push_location(marker);
                    return self.parse_call_expression(base, flow);
                }
                "(" | "{" => {
                    self.push_location(marker);
                    return self.parse_call_expression(base, flow);
                }
                _ => {}
            }
        } else if self.token.kind == TokenKind::StringLiteral {
            self.push_location(marker);
            return self.parse_call_expression(base, flow);
        }

        Err(self.unexpected(&self.token.clone()))
    }

    //     args ::= '(' [explist] ')' | tableconstructor | String
    fn parse_call_expression(
        &mut self,
        base: Expression,
        flow: &mut FlowContext,
    ) -> Result<Expression, SyntaxError> {
        if self.token.kind == TokenKind::Punctuator {
            match self.token.value.as_str().unwrap_or("") {
                "(" => {
                    // Under strict Lua 5.1 rules a parenthesis on a new
                    // line reads as a new statement, which the reference
                    // implementation rejects as ambiguous.
                    if !self.features.empty_statement {
                        let previous_line =
                            self.previous.as_ref().map_or(self.token.line, |token| token.line);
                        if self.token.line != previous_line {
                            return Err(self.lexer.error_here(format_message(
                                messages::AMBIGUOUS_SYNTAX,
                                &[&self.token.value.text()],
                            )));
                        }
                    }
                    self.next()?;

                    let mut arguments = Vec::new();
                    if let Some(expression) = self.parse_expression(flow)? {
                        arguments.push(expression);
                    }
                    while self.consume(",")? {
                        arguments.push(self.parse_expected_expression(flow)?);
                    }

                    self.expect(")")?;
                    return Ok(self.finish_node(builder::call_expression(base, arguments)));
                }
                "{" => {
                    self.mark_location();
                    self.next()?;
                    let table = self.parse_table_constructor(flow)?;
                    return Ok(self.finish_node(builder::table_call_expression(base, table)));
                }
                _ => {}
            }
        } else if self.token.kind == TokenKind::StringLiteral {
            if let Some(Expression::Literal(argument)) = self.parse_primary_expression(flow)? {
                return Ok(self.finish_node(builder::string_call_expression(base, argument)));
            }
        }

        Err(self.unexpected_token("function arguments", &self.token.clone()))
    }

    //     primary ::= String | Numeric | nil | true | false
    //          | functiondef | tableconstructor | '...'
    fn parse_primary_expression(
        &mut self,
        flow: &mut FlowContext,
    ) -> Result<Option<Expression>, SyntaxError> {
        let marker = self.create_marker();
        let kind = self.token.kind;

        if kind == TokenKind::VarargLiteral && !flow.allow_vararg {
            let near = self.token.value.text();
            return Err(self
                .token
                .error(format_message(messages::CANNOT_USE_VARARG, &[&near])));
        }

        if kind.is_literal() {
            self.push_location(marker);
            let raw = self
                .lexer
                .slice(self.token.range.start, self.token.range.end)
                .to_string();
            let value = match &self.token.value {
                TokenValue::Str(text) => Some(LiteralValue::String(text.clone())),
                TokenValue::Number(number) => Some(LiteralValue::Number(*number)),
                TokenValue::Bool(boolean) => Some(LiteralValue::Boolean(*boolean)),
                TokenValue::None => None,
            };
            self.next()?;
            return Ok(Some(self.finish_node(builder::literal(kind, value, raw))));
        }

        if kind == TokenKind::Keyword && self.token.value.as_str() == Some("function") {
            self.push_location(marker);
            self.next()?;
            if self.options.scope {
                self.create_scope();
            }
            let declaration = self.parse_function_declaration(None, false)?;
            return Ok(Some(Expression::FunctionDeclaration(declaration)));
        }

        if self.consume("{")? {
            self.push_location(marker);
            let table = self.parse_table_constructor(flow)?;
            return Ok(Some(Expression::TableConstructorExpression(table)));
        }

        Ok(None)
    }
}
