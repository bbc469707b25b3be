//! Control-flow validation for `break`, `goto` and labels.
//!
//! Dialects with labels get the full context: a stack of per-block scope
//! records tracking labels, declared locals and gotos whose target hasn't
//! been seen yet. A forward goto stays pending until a matching label
//! appears or every scope it could reach has closed; a goto that would
//! skip over a local declaration is deferred and surfaced at the next
//! statement boundary, where the position is contextually right.
//!
//! Dialects without labels only need loop-nesting depth for `break`.

use lunar_diagnostics::{format_message, messages, SyntaxError};
use lunar_lexer::Token;
use rustc_hash::FxHashMap;

struct Label {
    local_count: usize,
    line: usize,
}

struct FlowScope {
    labels: FxHashMap<String, Label>,
    locals: Vec<String>,
    deferred_gotos: Vec<PendingGoto>,
    is_loop: bool,
}

struct PendingGoto {
    /// The deepest scope count this goto could still resolve in.
    max_depth: usize,
    target: String,
    token: Token,
    /// Locals declared per enclosing scope at the time of the goto.
    local_counts: Vec<usize>,
}

enum FlowKind {
    Full {
        scopes: Vec<FlowScope>,
        pending_gotos: Vec<PendingGoto>,
    },
    Loop {
        level: usize,
        loop_levels: Vec<usize>,
    },
}

/// One flow context exists per function body (and one for the chunk).
pub(crate) struct FlowContext {
    /// Whether `...` may be used in this function.
    pub allow_vararg: bool,
    kind: FlowKind,
}

impl FlowContext {
    /// `labels` selects the full context; without it the loop-only context
    /// is enough, since the grammar never produces goto or label
    /// statements.
    pub fn new(labels: bool) -> Self {
        let kind = if labels {
            FlowKind::Full { scopes: Vec::new(), pending_gotos: Vec::new() }
        } else {
            FlowKind::Loop { level: 0, loop_levels: Vec::new() }
        };
        Self { allow_vararg: false, kind }
    }

    pub fn is_in_loop(&self) -> bool {
        match &self.kind {
            FlowKind::Full { scopes, .. } => scopes.iter().any(|scope| scope.is_loop),
            FlowKind::Loop { loop_levels, .. } => !loop_levels.is_empty(),
        }
    }

    pub fn push_scope(&mut self, is_loop: bool) {
        match &mut self.kind {
            FlowKind::Full { scopes, .. } => {
                scopes.push(FlowScope {
                    labels: FxHashMap::default(),
                    locals: Vec::new(),
                    deferred_gotos: Vec::new(),
                    is_loop,
                });
            }
            FlowKind::Loop { level, loop_levels } => {
                *level += 1;
                if is_loop {
                    loop_levels.push(*level);
                }
            }
        }
    }

    /// Close the current scope. Pending gotos that could only have
    /// resolved inside it are now known to have no visible label.
    pub fn pop_scope(&mut self) -> Result<(), SyntaxError> {
        match &mut self.kind {
            FlowKind::Full { scopes, pending_gotos } => {
                let depth = scopes.len();
                for goto in pending_gotos.iter_mut() {
                    if goto.max_depth >= depth {
                        goto.max_depth -= 1;
                        if goto.max_depth == 0 {
                            return Err(goto.token.error(format_message(
                                messages::LABEL_NOT_VISIBLE,
                                &[&goto.target],
                            )));
                        }
                    }
                }
                scopes.pop();
                Ok(())
            }
            FlowKind::Loop { level, loop_levels } => {
                if loop_levels.last().copied() == Some(*level) {
                    loop_levels.pop();
                }
                *level -= 1;
                Ok(())
            }
        }
    }

    /// Record a goto. Resolves immediately against any already-visible
    /// label; otherwise it goes on the pending list with a snapshot of the
    /// per-scope local counts.
    pub fn add_goto(&mut self, target: String, token: Token) {
        match &mut self.kind {
            FlowKind::Full { scopes, pending_gotos } => {
                let mut local_counts = Vec::with_capacity(scopes.len());
                for scope in scopes.iter() {
                    local_counts.push(scope.locals.len());
                    if scope.labels.contains_key(&target) {
                        return;
                    }
                }
                pending_gotos.push(PendingGoto {
                    max_depth: scopes.len(),
                    target,
                    token,
                    local_counts,
                });
            }
            FlowKind::Loop { .. } => {
                unreachable!("goto is not part of this dialect's grammar")
            }
        }
    }

    /// Declare a label, resolving matching pending gotos. A goto whose
    /// snapshot shows fewer locals than now exist at this depth would jump
    /// into those locals' scope; it is deferred rather than accepted.
    pub fn add_label(&mut self, name: &str, token: &Token) -> Result<(), SyntaxError> {
        match &mut self.kind {
            FlowKind::Full { scopes, pending_gotos } => {
                let depth = scopes.len();
                if let Some(existing) = scopes[depth - 1].labels.get(name) {
                    return Err(token.error(format_message(
                        messages::LABEL_ALREADY_DEFINED,
                        &[name, &existing.line.to_string()],
                    )));
                }

                let local_count = scopes[depth - 1].locals.len();
                let mut kept = Vec::with_capacity(pending_gotos.len());
                for goto in pending_gotos.drain(..) {
                    if goto.max_depth >= depth && goto.target == name {
                        if goto.local_counts[depth - 1] < local_count {
                            scopes[depth - 1].deferred_gotos.push(goto);
                        }
                        continue;
                    }
                    kept.push(goto);
                }
                *pending_gotos = kept;

                scopes[depth - 1]
                    .labels
                    .insert(name.to_string(), Label { local_count, line: token.line });
                Ok(())
            }
            FlowKind::Loop { .. } => {
                unreachable!("labels are not part of this dialect's grammar")
            }
        }
    }

    pub fn add_local(&mut self, name: String) {
        match &mut self.kind {
            FlowKind::Full { scopes, .. } => {
                if let Some(scope) = scopes.last_mut() {
                    scope.locals.push(name);
                }
            }
            FlowKind::Loop { .. } => {}
        }
    }

    /// Surface deferred goto violations. Called at statement boundaries so
    /// the error appears at the earliest correct point rather than at
    /// scope exit.
    pub fn raise_deferred_errors(&self) -> Result<(), SyntaxError> {
        match &self.kind {
            FlowKind::Full { scopes, .. } => {
                let Some(scope) = scopes.last() else {
                    return Ok(());
                };
                if let Some(goto) = scope.deferred_gotos.first() {
                    let local = &scope.locals[goto.local_counts[scopes.len() - 1]];
                    return Err(goto.token.error(format_message(
                        messages::GOTO_JUMP_IN_LOCAL_SCOPE,
                        &[&goto.target, local],
                    )));
                }
                Ok(())
            }
            FlowKind::Loop { .. } => Ok(()),
        }
    }
}
