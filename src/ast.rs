// ABOUTME: AST arena: tagged nodes with parent back-references and per-scope binding contexts

use crate::value::Value;

/// Handle into the [`Ast`] arena. Children are owned id lists; parents are
/// non-owning back-references, so the tree carries no cyclic ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

/// A pre-parsed number: integer when the source text has no dot, real
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i64),
    Real(f64),
}

impl Numeric {
    pub fn to_value(self) -> Value {
        match self {
            Numeric::Int(i) => Value::Int(i),
            Numeric::Real(r) => Value::Real(r),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetKind {
    Let,
    LetStar,
    LetRec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    TestThen,
    Else,
}

/// The value cell of a binding. `Unbound` cells are invisible to lookup;
/// `Uninitialized` is the letrec placeholder, visible but fatal to read.
#[derive(Debug, Clone)]
pub enum Slot {
    Unbound,
    Uninitialized,
    Bound(Value),
}

/// Callee of a call expression: a name looked up through the scope chain, or
/// an inline lambda form applied anonymously.
#[derive(Debug, Clone)]
pub enum CallTarget {
    Named(String),
    Lambda(NodeId),
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Number {
        text: String,
        value: Numeric,
    },
    Str(String),
    Char(char),
    Bool(bool),
    List(Vec<NodeId>),
    Pair(NodeId, NodeId),
    Null,
    Empty,
    /// A named slot: a definition when `init` is present, a bare reference
    /// otherwise. The slot holds the evaluated value once installed.
    Binding {
        name: String,
        init: Option<NodeId>,
        slot: Slot,
    },
    Call {
        target: CallTarget,
        operands: Vec<NodeId>,
    },
    Lambda {
        params: Vec<NodeId>,
        body: Vec<NodeId>,
    },
    Define {
        binding: NodeId,
    },
    Lets {
        kind: LetKind,
        bindings: Vec<NodeId>,
        body: Vec<NodeId>,
    },
    Set {
        target: NodeId,
        expr: NodeId,
    },
    If {
        test: NodeId,
        then: NodeId,
        els: NodeId,
    },
    Cond {
        clauses: Vec<NodeId>,
    },
    And {
        exprs: Vec<NodeId>,
    },
    Or {
        exprs: Vec<NodeId>,
    },
    Not {
        expr: NodeId,
    },
    CondClause {
        kind: ClauseKind,
        test: Option<NodeId>,
        body: Vec<NodeId>,
    },
    Program {
        body: Vec<NodeId>,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    /// Bindings this node introduces, in declaration order. Populated by
    /// scope decoration on Program, Lets and Lambda nodes only.
    pub context: Vec<NodeId>,
    pub kind: NodeKind,
}

impl Node {
    /// Owned children of this node, in evaluation order.
    pub fn children(&self) -> Vec<NodeId> {
        match &self.kind {
            NodeKind::Number { .. }
            | NodeKind::Str(_)
            | NodeKind::Char(_)
            | NodeKind::Bool(_)
            | NodeKind::Null
            | NodeKind::Empty => Vec::new(),
            NodeKind::List(items) => items.clone(),
            NodeKind::Pair(car, cdr) => vec![*car, *cdr],
            NodeKind::Binding { init, .. } => init.iter().copied().collect(),
            NodeKind::Call { target, operands } => {
                let mut children = Vec::with_capacity(operands.len() + 1);
                if let CallTarget::Lambda(id) = target {
                    children.push(*id);
                }
                children.extend(operands.iter().copied());
                children
            }
            NodeKind::Lambda { params, body } => {
                params.iter().chain(body.iter()).copied().collect()
            }
            NodeKind::Define { binding } => vec![*binding],
            NodeKind::Lets { bindings, body, .. } => {
                bindings.iter().chain(body.iter()).copied().collect()
            }
            NodeKind::Set { target, expr } => vec![*target, *expr],
            NodeKind::If { test, then, els } => vec![*test, *then, *els],
            NodeKind::Cond { clauses } => clauses.clone(),
            NodeKind::And { exprs } | NodeKind::Or { exprs } => exprs.clone(),
            NodeKind::Not { expr } => vec![*expr],
            NodeKind::CondClause { test, body, .. } => {
                test.iter().chain(body.iter()).copied().collect()
            }
            NodeKind::Program { body } => body.clone(),
        }
    }

    /// Whether this node introduces a scope of its own.
    pub fn is_scope(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Program { .. } | NodeKind::Lets { .. } | NodeKind::Lambda { .. }
        )
    }
}

/// The arena. Every node of a parse lives here and dies with it; evaluator
/// results are separate owned [`Value`]s, so dropping results never touches
/// the tree.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Ast {
            nodes: Vec::new(),
            root: None,
        }
    }

    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent: None,
            context: Vec::new(),
            kind,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// The unique Program node.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// The slot of a binding node, if `id` names one.
    pub fn binding_slot(&self, id: NodeId) -> Option<&Slot> {
        match &self.node(id).kind {
            NodeKind::Binding { slot, .. } => Some(slot),
            _ => None,
        }
    }

    pub fn set_binding_slot(&mut self, id: NodeId, value: Slot) {
        if let NodeKind::Binding { slot, .. } = &mut self.node_mut(id).kind {
            *slot = value;
        }
    }

    pub fn binding_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Binding { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn binding_init(&self, id: NodeId) -> Option<NodeId> {
        match &self.node(id).kind {
            NodeKind::Binding { init, .. } => *init,
            _ => None,
        }
    }
}
