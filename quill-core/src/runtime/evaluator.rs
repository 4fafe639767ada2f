//! Tree-walking evaluator
//!
//! Every AST shape is handled by an exhaustive `match`, so a new node kind
//! cannot be added without deciding how it evaluates.

use crate::error::{Result, RuntimeError};
use crate::parser::ast::{BinaryOperator, Expression, Program, Property, Statement};
use crate::runtime::environment::{Environment, ScopeId};
use crate::runtime::value::{FunctionValue, Value};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Evaluates parsed programs against an environment
pub struct Evaluator<'env> {
    env: &'env mut Environment,
}

impl<'env> Evaluator<'env> {
    /// Create a new evaluator
    pub fn new(env: &'env mut Environment) -> Self {
        Evaluator { env }
    }

    /// Evaluate each top-level statement in order; the last value is the
    /// program's result (`Null` when the program is empty)
    pub fn evaluate_program(&mut self, program: &Program, scope: ScopeId) -> Result<Value> {
        self.env.enter_program();
        let result = self.evaluate_block(&program.body, scope);
        self.env.exit_program();

        self.env.collect(result_roots(&result));
        result
    }

    fn evaluate_block(&mut self, statements: &[Statement], scope: ScopeId) -> Result<Value> {
        let mut last = Value::Null;
        for stmt in statements {
            last = self.evaluate_statement(stmt, scope)?;
        }
        Ok(last)
    }

    pub fn evaluate_statement(&mut self, stmt: &Statement, scope: ScopeId) -> Result<Value> {
        match stmt {
            Statement::VarDeclaration {
                constant,
                identifier,
                value,
            } => {
                let value = match value {
                    Some(expr) => self.evaluate_expression(expr, scope)?,
                    None => Value::Null,
                };
                self.env.declare_var(scope, identifier, value, *constant)
            }

            Statement::FunctionDeclaration {
                name,
                parameters,
                body,
            } => {
                // Calls parent their scope to this one, so it must outlive
                // its own call while the function is reachable.
                self.env.mark_captured(scope);
                let func = FunctionValue {
                    name: name.clone(),
                    parameters: parameters.clone(),
                    declaration_scope: scope,
                    body: body.clone(),
                };
                self.env
                    .declare_var(scope, name, Value::Function(Rc::new(func)), true)
            }

            Statement::Expression(expr) => self.evaluate_expression(expr, scope),
        }
    }

    pub fn evaluate_expression(&mut self, expr: &Expression, scope: ScopeId) -> Result<Value> {
        match expr {
            Expression::NumericLiteral(n) => Ok(Value::Number(*n)),

            Expression::Identifier(name) => self.env.lookup_var(scope, name),

            Expression::ObjectLiteral { properties } => self.eval_object_expr(properties, scope),

            Expression::Binary {
                left,
                right,
                operator,
            } => self.eval_binary_expr(left, *operator, right, scope),

            Expression::Assignment { assignee, value } => {
                let Expression::Identifier(name) = assignee.as_ref() else {
                    return Err(RuntimeError::InvalidAssignmentTarget(assignee.to_string()).into());
                };
                let value = self.evaluate_expression(value, scope)?;
                self.env.assign_var(scope, name, value)
            }

            Expression::Member {
                object,
                property,
                computed,
            } => self.eval_member_expr(object, property, *computed, scope),

            Expression::Call { arguments, callee } => self.eval_call_expr(arguments, callee, scope),
        }
    }

    /// Left operand is fully evaluated before the right; no short-circuit
    fn eval_binary_expr(
        &mut self,
        left: &Expression,
        operator: BinaryOperator,
        right: &Expression,
        scope: ScopeId,
    ) -> Result<Value> {
        let lhs = self.evaluate_expression(left, scope)?;
        let rhs = self.evaluate_expression(right, scope)?;

        match (&lhs, &rhs) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(operator.apply(*l, *r))),
            _ => {
                tracing::debug!(
                    operator = operator.symbol(),
                    lhs = lhs.type_name(),
                    rhs = rhs.type_name(),
                    "non-numeric operands, yielding null"
                );
                Ok(Value::Null)
            }
        }
    }

    fn eval_object_expr(&mut self, properties: &[Property], scope: ScopeId) -> Result<Value> {
        let mut object = BTreeMap::new();

        for Property { key, value } in properties {
            let runtime_val = match value {
                Some(expr) => self.evaluate_expression(expr, scope)?,
                // Shorthand `{ key }`
                None => self.env.lookup_var(scope, key)?,
            };
            object.insert(key.clone(), runtime_val);
        }

        Ok(Value::object(object))
    }

    fn eval_member_expr(
        &mut self,
        object: &Expression,
        property: &Expression,
        computed: bool,
        scope: ScopeId,
    ) -> Result<Value> {
        let target = self.evaluate_expression(object, scope)?;

        let key = match (computed, property) {
            (false, Expression::Identifier(name)) => name.clone(),
            (false, other) => other.to_string(),
            (true, expr) => self.evaluate_expression(expr, scope)?.to_string(),
        };

        let Value::Object(props) = &target else {
            return Err(RuntimeError::InvalidMemberAccess(format!(
                "{} ({})",
                target,
                target.type_name()
            ))
            .into());
        };

        let found = props.borrow().get(&key).cloned();
        found.ok_or_else(|| RuntimeError::PropertyNotFound(key).into())
    }

    /// Arguments are evaluated left to right, then the callee
    fn eval_call_expr(
        &mut self,
        arguments: &[Expression],
        callee: &Expression,
        scope: ScopeId,
    ) -> Result<Value> {
        let mut args = Vec::with_capacity(arguments.len());
        for arg in arguments {
            args.push(self.evaluate_expression(arg, scope)?);
        }

        match self.evaluate_expression(callee, scope)? {
            Value::NativeFunction(native) => {
                tracing::debug!(name = %native.name, args = args.len(), "calling native function");
                native.call(&args, &mut *self.env, scope)
            }
            Value::Function(func) => self.call_function(&func, args),
            other => Err(RuntimeError::NotCallable(format!(
                "{} ({})",
                other,
                other.type_name()
            ))
            .into()),
        }
    }

    /// Run a user function in a fresh scope parented to its declaration
    /// scope. Missing arguments are bound to `Null`; extra ones are dropped.
    fn call_function(&mut self, func: &FunctionValue, args: Vec<Value>) -> Result<Value> {
        tracing::debug!(name = %func.name, args = args.len(), "calling function");
        if args.len() != func.parameters.len() {
            tracing::debug!(
                name = %func.name,
                expected = func.parameters.len(),
                got = args.len(),
                "argument count mismatch"
            );
        }

        let retained = self.env.retained_len();
        let call_scope = self.env.create_scope(func.declaration_scope);
        let result = self
            .bind_parameters(func, args, call_scope)
            .and_then(|_| self.evaluate_block(&func.body, call_scope));

        // Values computed by enclosing frames predate this call, so only the
        // result can still reach scopes retained during it.
        self.env.release_scope(call_scope);
        self.env.collect_retained(retained, result_roots(&result));

        result
    }

    fn bind_parameters(
        &mut self,
        func: &FunctionValue,
        args: Vec<Value>,
        call_scope: ScopeId,
    ) -> Result<()> {
        let mut args = args.into_iter();
        for param in &func.parameters {
            let value = args.next().unwrap_or_default();
            self.env.declare_var(call_scope, param, value, false)?;
        }
        Ok(())
    }
}

fn result_roots(result: &Result<Value>) -> &[Value] {
    match result {
        Ok(value) => std::slice::from_ref(value),
        Err(_) => &[],
    }
}

/// Evaluate a program in `scope` of `env`
pub fn evaluate(program: &Program, env: &mut Environment, scope: ScopeId) -> Result<Value> {
    Evaluator::new(env).evaluate_program(program, scope)
}
