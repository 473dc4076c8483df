// ABOUTME: Evaluator reducing decorated AST nodes to values under the node-context scope chain

use crate::ast::{Ast, CallTarget, ClauseKind, LetKind, NodeId, NodeKind, Slot};
use crate::builtins::{self, Arity, NativeProc};
use crate::error::EvalError;
use crate::value::Value;

/// The interpreter state: the decorated tree plus the static native tables
/// consulted once the lexical chain runs out.
pub struct Interp {
    ast: Ast,
}

impl Interp {
    pub fn new(ast: Ast) -> Self {
        Interp { ast }
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Evaluate every top-level expression in order, collecting the
    /// printable results. The first error aborts the run.
    pub fn run(&mut self) -> Result<Vec<Value>, EvalError> {
        let Some(root) = self.ast.root() else {
            return Ok(Vec::new());
        };
        let body = match &self.ast.node(root).kind {
            NodeKind::Program { body } => body.clone(),
            _ => Vec::new(),
        };

        let mut results = Vec::new();
        for expr in body {
            let value = self.eval(expr)?;
            if !matches!(value, Value::Void) {
                results.push(value);
            }
        }
        Ok(results)
    }

    /// Reduce one node to a value. Identifier references resolve through the
    /// node's own parent chain; no separate environment is threaded.
    pub fn eval(&mut self, node: NodeId) -> Result<Value, EvalError> {
        match &self.ast.node(node).kind {
            NodeKind::Number { value, .. } => Ok(value.to_value()),
            NodeKind::Str(s) => Ok(Value::Str(s.clone())),
            NodeKind::Char(c) => Ok(Value::Char(*c)),
            NodeKind::Bool(b) => Ok(Value::Bool(*b)),
            NodeKind::Null | NodeKind::Empty => Ok(Value::List(Vec::new())),

            NodeKind::List(items) => {
                let items = items.clone();
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item)?);
                }
                Ok(Value::List(values))
            }

            NodeKind::Pair(car, cdr) => {
                let (car, cdr) = (*car, *cdr);
                let car = self.eval(car)?;
                let cdr = self.eval(cdr)?;
                Ok(Value::Pair(Box::new((car, cdr))))
            }

            NodeKind::Binding { name, .. } => {
                let name = name.clone();
                self.lookup(node, &name)
            }

            NodeKind::Lambda { .. } => Ok(Value::Closure {
                name: None,
                lambda: node,
            }),

            NodeKind::Define { binding } => {
                let binding = *binding;
                self.eval_define(binding)
            }

            NodeKind::Lets {
                kind,
                bindings,
                body,
            } => {
                let (kind, bindings, body) = (*kind, bindings.clone(), body.clone());
                self.eval_lets(kind, &bindings, &body)
            }

            NodeKind::Set { target, expr } => {
                let (target, expr) = (*target, *expr);
                self.eval_set(node, target, expr)
            }

            NodeKind::If { test, then, els } => {
                let (test, then, els) = (*test, *then, *els);
                if self.eval(test)?.is_truthy() {
                    self.eval(then)
                } else {
                    self.eval(els)
                }
            }

            NodeKind::And { exprs } => {
                let exprs = exprs.clone();
                let mut last = Value::Bool(true);
                for expr in exprs {
                    last = self.eval(expr)?;
                    if !last.is_truthy() {
                        return Ok(last);
                    }
                }
                Ok(last)
            }

            NodeKind::Or { exprs } => {
                let exprs = exprs.clone();
                for expr in exprs {
                    let value = self.eval(expr)?;
                    if value.is_truthy() {
                        return Ok(value);
                    }
                }
                Ok(Value::Bool(false))
            }

            NodeKind::Not { expr } => {
                let expr = *expr;
                let value = self.eval(expr)?;
                Ok(Value::Bool(!value.is_truthy()))
            }

            NodeKind::Cond { clauses } => {
                let clauses = clauses.clone();
                self.eval_cond(&clauses)
            }

            NodeKind::Call { target, operands } => {
                let (target, operands) = (target.clone(), operands.clone());
                self.eval_call(node, target, &operands)
            }

            NodeKind::CondClause { .. } | NodeKind::Program { .. } => Err(
                EvalError::runtime_error("eval", "form evaluated outside its context"),
            ),
        }
    }

    /// `(define name expr)`: evaluate the initializer, adopt the name for a
    /// still-anonymous closure, install the slot. No printable value.
    fn eval_define(&mut self, binding: NodeId) -> Result<Value, EvalError> {
        let name = self
            .ast
            .binding_name(binding)
            .unwrap_or_default()
            .to_string();
        let init = self.ast.binding_init(binding).ok_or_else(|| {
            EvalError::runtime_error("define", format!("{}: missing initializer", name))
        })?;

        let mut value = self.eval(init)?;
        if let Value::Closure { name: closure_name, .. } = &mut value {
            if closure_name.is_none() {
                *closure_name = Some(name);
            }
        }
        self.ast.set_binding_slot(binding, Slot::Bound(value));
        Ok(Value::Void)
    }

    /// The let family. Slots are reset on entry so a re-entered form starts
    /// from a clean frame; `Unbound` slots stay invisible to lookup, which
    /// is what gives each variant its initializer visibility.
    fn eval_lets(
        &mut self,
        kind: LetKind,
        bindings: &[NodeId],
        body: &[NodeId],
    ) -> Result<Value, EvalError> {
        match kind {
            LetKind::Let => {
                for &binding in bindings {
                    self.ast.set_binding_slot(binding, Slot::Unbound);
                }
                // every initializer sees only the enclosing scope
                let mut values = Vec::with_capacity(bindings.len());
                for &binding in bindings {
                    let init = self.binding_init(binding)?;
                    values.push(self.eval(init)?);
                }
                for (&binding, value) in bindings.iter().zip(values) {
                    self.ast.set_binding_slot(binding, Slot::Bound(value));
                }
            }
            LetKind::LetStar => {
                for &binding in bindings {
                    self.ast.set_binding_slot(binding, Slot::Unbound);
                }
                // each initializer sees the bindings before it
                for &binding in bindings {
                    let init = self.binding_init(binding)?;
                    let value = self.eval(init)?;
                    self.ast.set_binding_slot(binding, Slot::Bound(value));
                }
            }
            LetKind::LetRec => {
                // placeholders first: the whole frame is visible, reading an
                // uninitialized slot is fatal
                for &binding in bindings {
                    self.ast.set_binding_slot(binding, Slot::Uninitialized);
                }
                for &binding in bindings {
                    let init = self.binding_init(binding)?;
                    let value = self.eval(init)?;
                    self.ast.set_binding_slot(binding, Slot::Bound(value));
                }
            }
        }

        let mut last = Value::Void;
        for &expr in body {
            last = self.eval(expr)?;
        }
        Ok(last)
    }

    fn eval_set(
        &mut self,
        node: NodeId,
        target: NodeId,
        expr: NodeId,
    ) -> Result<Value, EvalError> {
        let name = self
            .ast
            .binding_name(target)
            .unwrap_or_default()
            .to_string();
        let binding = self
            .resolve_binding(node, &name)
            .ok_or_else(|| EvalError::SetUndefined(name.clone()))?;
        let value = self.eval(expr)?;
        self.ast.set_binding_slot(binding, Slot::Bound(value));
        Ok(Value::Void)
    }

    fn eval_cond(&mut self, clauses: &[NodeId]) -> Result<Value, EvalError> {
        for &clause in clauses {
            let (kind, test, body) = match &self.ast.node(clause).kind {
                NodeKind::CondClause { kind, test, body } => (*kind, *test, body.clone()),
                _ => continue,
            };

            let fired = match kind {
                ClauseKind::Else => true,
                ClauseKind::TestThen => match test {
                    Some(test) => self.eval(test)?.is_truthy(),
                    None => false,
                },
            };

            if fired {
                let mut last = Value::Void;
                for expr in body {
                    last = self.eval(expr)?;
                }
                return Ok(last);
            }
        }
        Ok(Value::Void)
    }

    /// Resolve the callee, evaluate operands left to right in the caller's
    /// scope, and apply.
    fn eval_call(
        &mut self,
        node: NodeId,
        target: CallTarget,
        operands: &[NodeId],
    ) -> Result<Value, EvalError> {
        let callee = match target {
            CallTarget::Named(name) => self.lookup(node, &name)?,
            CallTarget::Lambda(lambda) => self.eval(lambda)?,
        };

        let mut args = Vec::with_capacity(operands.len());
        for &operand in operands {
            args.push(self.eval(operand)?);
        }

        self.apply(&callee, &args)
    }

    /// Apply a procedure value to already-evaluated arguments. Natives are
    /// arity-checked here; user closures bind positionally after saving the
    /// previous frame, so re-entrant calls restore what they found.
    pub fn apply(&mut self, callee: &Value, args: &[Value]) -> Result<Value, EvalError> {
        match callee {
            Value::Native(proc) => {
                check_native_arity(proc, args.len())?;
                (proc.run)(self, args)
            }

            Value::Closure { name, lambda } => {
                let lambda = *lambda;
                let (params, body) = match &self.ast.node(lambda).kind {
                    NodeKind::Lambda { params, body } => (params.clone(), body.clone()),
                    _ => {
                        return Err(EvalError::NotCallable(
                            name.clone().unwrap_or_else(|| "anonymous".to_string()),
                        ))
                    }
                };

                if args.len() != params.len() {
                    let display = name.clone().unwrap_or_else(|| "anonymous".to_string());
                    return Err(EvalError::arity_error(
                        &display,
                        params.len().to_string(),
                        args.len(),
                    ));
                }

                // snapshot the whole frame: parameters plus any defines
                // contributed into this lambda's context
                let frame = self.ast.node(lambda).context.clone();
                let saved: Vec<(NodeId, Slot)> = frame
                    .iter()
                    .map(|&b| (b, self.snapshot_slot(b)))
                    .collect();

                for &binding in &frame {
                    self.ast.set_binding_slot(binding, Slot::Unbound);
                }
                for (&param, arg) in params.iter().zip(args) {
                    self.ast.set_binding_slot(param, Slot::Bound(arg.clone()));
                }

                let mut result = Ok(Value::Void);
                for &expr in &body {
                    result = self.eval(expr);
                    if result.is_err() {
                        break;
                    }
                }

                for (binding, slot) in saved {
                    self.ast.set_binding_slot(binding, slot);
                }
                result
            }

            other => Err(EvalError::NotCallable(other.type_name().to_string())),
        }
    }

    /// Nearest-ancestor-first name resolution starting at `from`, with a
    /// final fallback to the built-in and add-on tables. `Unbound` slots are
    /// skipped; `Uninitialized` ones are fatal to read.
    fn lookup(&self, from: NodeId, name: &str) -> Result<Value, EvalError> {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = self.ast.node(id);
            for &binding in node.context.iter().rev() {
                if self.ast.binding_name(binding) != Some(name) {
                    continue;
                }
                match self.ast.binding_slot(binding) {
                    Some(Slot::Bound(value)) => return Ok(value.clone()),
                    Some(Slot::Uninitialized) => {
                        return Err(EvalError::UseBeforeInitialization(name.to_string()))
                    }
                    _ => {}
                }
            }
            current = node.parent;
        }

        match builtins::find_native(name) {
            Some(proc) => Ok(Value::Native(proc)),
            None => Err(EvalError::UndefinedSymbol(name.to_string())),
        }
    }

    /// Nearest binding of `name` regardless of slot state; used by `set!`,
    /// which assigns rather than reads.
    fn resolve_binding(&self, from: NodeId, name: &str) -> Option<NodeId> {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = self.ast.node(id);
            for &binding in node.context.iter().rev() {
                if self.ast.binding_name(binding) == Some(name) {
                    return Some(binding);
                }
            }
            current = node.parent;
        }
        None
    }

    fn binding_init(&self, binding: NodeId) -> Result<NodeId, EvalError> {
        self.ast.binding_init(binding).ok_or_else(|| {
            EvalError::runtime_error(
                "let",
                format!(
                    "{}: missing initializer",
                    self.ast.binding_name(binding).unwrap_or_default()
                ),
            )
        })
    }

    fn snapshot_slot(&self, binding: NodeId) -> Slot {
        self.ast
            .binding_slot(binding)
            .cloned()
            .unwrap_or(Slot::Unbound)
    }
}

fn check_native_arity(proc: &NativeProc, given: usize) -> Result<(), EvalError> {
    match proc.arity {
        Arity::Exactly(n) if given != n => {
            Err(EvalError::arity_error(proc.name, n.to_string(), given))
        }
        Arity::AtLeast(n) if given < n => Err(EvalError::arity_error(
            proc.name,
            format!("at least {}", n),
            given,
        )),
        _ => Ok(()),
    }
}
