//! Environment for variable scopes
//!
//! Scopes live in an arena and are addressed by `ScopeId`. Each scope points
//! at its lexical parent, so lookups walk the declaration chain rather than
//! the call stack. Function values hold a `ScopeId` instead of owning their
//! declaration scope, which keeps mutually referring scopes free of `Rc`
//! cycles.
//!
//! A call scope is freed when its call returns, unless a function was
//! declared in it. Such a scope is retained and swept once no reachable value
//! refers to it any more.

use crate::error::{Result, RuntimeError};
use crate::runtime::builtins;
use crate::runtime::value::{ObjectRef, Value};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Handle to a scope stored in an `Environment`
///
/// Slots are reused after a scope is freed; the generation tells a stale
/// handle apart from the slot's new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
    index: usize,
    generation: u32,
}

impl ScopeId {
    /// The root scope every environment is created with
    pub const GLOBAL: ScopeId = ScopeId {
        index: 0,
        generation: 0,
    };

    pub fn index(self) -> usize {
        self.index
    }
}

/// A single scope: bindings, the names among them that are constant, and
/// the enclosing scope
#[derive(Debug, Default)]
pub struct Scope {
    variables: HashMap<String, Value>,
    constants: HashSet<String>,
    parent: Option<ScopeId>,
    /// Set once a function is declared here
    captured: bool,
}

impl Scope {
    fn with_parent(parent: Option<ScopeId>) -> Self {
        Scope {
            parent,
            ..Scope::default()
        }
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn is_constant(&self, name: &str) -> bool {
        self.constants.contains(name)
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    scope: Option<Scope>,
}

/// Arena of scopes
#[derive(Debug)]
pub struct Environment {
    slots: Vec<Slot>,
    /// Released slots available for reuse
    free: Vec<usize>,
    /// Returned call scopes kept alive because a function was declared in
    /// them, oldest first
    retained: Vec<ScopeId>,
    /// Number of programs currently being evaluated
    depth: usize,
}

impl Environment {
    /// Create an environment holding an empty global scope
    pub fn new() -> Self {
        Environment {
            slots: vec![Slot {
                generation: 0,
                scope: Some(Scope::with_parent(None)),
            }],
            free: Vec::new(),
            retained: Vec::new(),
            depth: 0,
        }
    }

    /// Create an environment whose global scope carries the built-ins
    pub fn with_globals() -> Self {
        let mut env = Self::new();
        builtins::register_globals(&mut env);
        env
    }

    /// Allocate a fresh scope under `parent`
    pub fn create_scope(&mut self, parent: ScopeId) -> ScopeId {
        let scope = Some(Scope::with_parent(Some(parent)));

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.scope = scope;
            ScopeId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                scope,
            });
            ScopeId {
                index: self.slots.len() - 1,
                generation: 0,
            }
        }
    }

    /// Give up a scope once its call has returned. Uncaptured scopes are
    /// freed at once; captured ones are retained until `collect_retained`
    /// finds them unreachable. The global scope is never released.
    pub fn release_scope(&mut self, id: ScopeId) {
        if id == ScopeId::GLOBAL {
            return;
        }

        let captured = match self.scope(id) {
            Some(scope) => scope.captured,
            None => return,
        };
        if captured {
            self.retained.push(id);
        } else {
            self.free_slot(id);
        }
    }

    fn free_slot(&mut self, id: ScopeId) {
        let Some(slot) = self.slots.get_mut(id.index) else {
            return;
        };
        if slot.generation != id.generation || slot.scope.is_none() {
            return;
        }

        slot.scope = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
    }

    /// Mark a scope as holding a function declaration
    pub fn mark_captured(&mut self, id: ScopeId) {
        if let Some(scope) = self.scope_mut(id) {
            scope.captured = true;
        }
    }

    /// Borrow a live scope
    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.scope.as_ref())
    }

    fn scope_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.scope.as_mut())
    }

    /// Number of live scopes, global included
    pub fn live_scopes(&self) -> usize {
        self.slots.iter().filter(|s| s.scope.is_some()).count()
    }

    /// Number of retained call scopes; pass it to `collect_retained` to
    /// sweep only the scopes retained after this point
    pub fn retained_len(&self) -> usize {
        self.retained.len()
    }

    pub(crate) fn enter_program(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn exit_program(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Sweep every retained scope, treating `roots` as reachable. Skipped
    /// while an enclosing program is still running, since its in-flight
    /// values are not visible here.
    pub fn collect(&mut self, roots: &[Value]) {
        if self.depth == 0 {
            self.collect_retained(0, roots);
        }
    }

    /// Free the scopes retained since `from` that are unreachable from every
    /// other live scope and from `roots`
    pub fn collect_retained(&mut self, from: usize, roots: &[Value]) {
        if self.retained.len() <= from {
            return;
        }

        let pending = self.retained.split_off(from);
        let marked = self.mark(&pending, roots);

        let mut freed = 0;
        for id in pending {
            if marked.get(id.index).copied().unwrap_or(false) {
                self.retained.push(id);
            } else {
                self.free_slot(id);
                freed += 1;
            }
        }

        tracing::trace!(freed, retained = self.retained.len(), "swept call scopes");
    }

    /// Slots reachable from every live scope outside `pending` and from
    /// `roots`
    fn mark(&self, pending: &[ScopeId], roots: &[Value]) -> Vec<bool> {
        let mut marked = vec![false; self.slots.len()];
        let mut seen_objects = HashSet::new();
        let mut stack: Vec<ScopeId> = Vec::new();

        for (index, slot) in self.slots.iter().enumerate() {
            if slot.scope.is_some() && !pending.iter().any(|id| id.index == index) {
                stack.push(ScopeId {
                    index,
                    generation: slot.generation,
                });
            }
        }
        for value in roots {
            trace_value(value, &mut stack, &mut seen_objects);
        }

        while let Some(id) = stack.pop() {
            let Some(scope) = self.scope(id) else {
                continue;
            };
            if std::mem::replace(&mut marked[id.index], true) {
                continue;
            }

            stack.extend(scope.parent());
            for value in scope.variables.values() {
                trace_value(value, &mut stack, &mut seen_objects);
            }
        }

        marked
    }

    /// Declare `name` in `scope`. Fails if `scope` itself already has it;
    /// ancestors are not consulted.
    pub fn declare_var(
        &mut self,
        scope: ScopeId,
        name: &str,
        value: Value,
        constant: bool,
    ) -> Result<Value> {
        let target = self
            .scope_mut(scope)
            .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_string()))?;

        if target.contains(name) {
            return Err(RuntimeError::AlreadyDeclared(name.to_string()).into());
        }

        target.variables.insert(name.to_string(), value.clone());
        if constant {
            target.constants.insert(name.to_string());
        }

        tracing::trace!(name, constant, scope = scope.index, "declared variable");
        Ok(value)
    }

    /// Assign to the nearest existing binding of `name`
    pub fn assign_var(&mut self, scope: ScopeId, name: &str, value: Value) -> Result<Value> {
        let owner = self.resolve(scope, name)?;
        let target = self
            .scope_mut(owner)
            .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_string()))?;

        if target.is_constant(name) {
            return Err(RuntimeError::ConstantReassignment(name.to_string()).into());
        }

        target.variables.insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Read the nearest binding of `name`
    pub fn lookup_var(&self, scope: ScopeId, name: &str) -> Result<Value> {
        let owner = self.resolve(scope, name)?;
        self.scope(owner)
            .and_then(|s| s.variables.get(name))
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_string()).into())
    }

    /// Find the scope that declares `name`, walking from `scope` to the root
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Result<ScopeId> {
        let mut current = Some(scope);

        while let Some(id) = current {
            let Some(s) = self.scope(id) else {
                break;
            };
            if s.contains(name) {
                return Ok(id);
            }
            current = s.parent;
        }

        Err(RuntimeError::UndefinedVariable(name.to_string()).into())
    }

    /// All bindings of one scope, sorted by name (for the REPL `env` command)
    pub fn bindings(&self, scope: ScopeId) -> Vec<(&String, &Value)> {
        let mut result: Vec<(&String, &Value)> = self
            .scope(scope)
            .map(|s| s.variables.iter().collect())
            .unwrap_or_default();
        result.sort_by(|a, b| a.0.cmp(b.0));
        result
    }
}

/// Push the scopes a value keeps alive
fn trace_value(value: &Value, stack: &mut Vec<ScopeId>, seen_objects: &mut HashSet<*const ()>) {
    match value {
        Value::Function(func) => stack.push(func.declaration_scope),
        Value::Object(props) => {
            if seen_objects.insert(object_key(props)) {
                for property in props.borrow().values() {
                    trace_value(property, stack, seen_objects);
                }
            }
        }
        _ => {}
    }
}

fn object_key(props: &ObjectRef) -> *const () {
    Rc::as_ptr(props) as *const ()
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
