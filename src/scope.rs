// ABOUTME: Post-parse decoration: parent back-references and per-scope binding contexts

use crate::ast::{Ast, NodeId, NodeKind};

/// Decorate a freshly parsed tree: set `parent` on every node and install
/// the context of each scope-introducing node. `Lets` nodes carry their
/// binding list, `Lambda` nodes their parameters, and `Program` starts empty
/// (the native tables are its conceptual tail). Each `define` appends its
/// binding to the nearest enclosing scope, in source order.
pub fn decorate(ast: &mut Ast) {
    if let Some(root) = ast.root() {
        visit(ast, root, None);
    }
}

fn visit(ast: &mut Ast, node: NodeId, parent: Option<NodeId>) {
    ast.node_mut(node).parent = parent;

    let context = match &ast.node(node).kind {
        NodeKind::Program { .. } => Some(Vec::new()),
        NodeKind::Lets { bindings, .. } => Some(bindings.clone()),
        NodeKind::Lambda { params, .. } => Some(params.clone()),
        _ => None,
    };
    if let Some(context) = context {
        ast.node_mut(node).context = context;
    }

    if let NodeKind::Define { binding } = &ast.node(node).kind {
        let binding = *binding;
        if let Some(scope) = enclosing_scope(ast, node) {
            ast.node_mut(scope).context.push(binding);
        }
    }

    let children = ast.node(node).children();
    for child in children {
        visit(ast, child, Some(node));
    }
}

/// Nearest ancestor that introduces a scope. Parents above `node` are
/// already set when this runs (the pass descends).
fn enclosing_scope(ast: &Ast, node: NodeId) -> Option<NodeId> {
    let mut current = ast.node(node).parent;
    while let Some(id) = current {
        if ast.node(id).is_scope() {
            return Some(id);
        }
        current = ast.node(id).parent;
    }
    None
}
