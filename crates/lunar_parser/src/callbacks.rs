//! Observer hooks fired while parsing.

use lunar_ast::AstNode;
use std::fmt;

/// Callbacks invoked at the corresponding parse events. All are optional;
/// an empty set costs nothing.
#[derive(Default)]
pub struct Callbacks {
    /// Fired when a syntax node has been completed (including comments).
    pub on_create_node: Option<Box<dyn FnMut(&dyn AstNode)>>,
    /// Fired when a new lexical scope is created. Only meaningful with
    /// scope tracking enabled.
    pub on_create_scope: Option<Box<dyn FnMut()>>,
    /// Fired when the current lexical scope is destroyed.
    pub on_destroy_scope: Option<Box<dyn FnMut()>>,
    /// Fired with the variable's name when a local is declared.
    pub on_local_declaration: Option<Box<dyn FnMut(&str)>>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_create_node", &self.on_create_node.is_some())
            .field("on_create_scope", &self.on_create_scope.is_some())
            .field("on_destroy_scope", &self.on_destroy_scope.is_some())
            .field("on_local_declaration", &self.on_local_declaration.is_some())
            .finish()
    }
}
