//! Runtime values produced by the evaluator

use crate::error::Result;
use crate::parser::ast::Statement;
use crate::runtime::environment::{Environment, ScopeId};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Host callable: receives evaluated arguments plus the calling scope
pub type NativeHandler = Rc<dyn Fn(&[Value], &mut Environment, ScopeId) -> Result<Value>>;

/// Shared, mutable property map backing `Value::Object`
pub type ObjectRef = Rc<RefCell<BTreeMap<String, Value>>>;

/// A function provided by the host rather than declared in source
#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    handler: NativeHandler,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&[Value], &mut Environment, ScopeId) -> Result<Value> + 'static,
    {
        NativeFunction {
            name: name.into(),
            handler: Rc::new(handler),
        }
    }

    pub fn call(&self, args: &[Value], env: &mut Environment, scope: ScopeId) -> Result<Value> {
        (self.handler)(args, env, scope)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A user-defined function
#[derive(Debug)]
pub struct FunctionValue {
    pub name: String,
    pub parameters: Vec<String>,
    /// Scope the function was declared in; call scopes are parented to it
    pub declaration_scope: ScopeId,
    pub body: Vec<Statement>,
}

/// Runtime value
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Number(f64),
    Boolean(bool),
    Object(ObjectRef),
    NativeFunction(NativeFunction),
    Function(Rc<FunctionValue>),
}

impl Value {
    pub fn object(properties: BTreeMap<String, Value>) -> Self {
        Value::Object(Rc::new(RefCell::new(properties)))
    }

    pub fn native(
        name: impl Into<String>,
        handler: impl Fn(&[Value], &mut Environment, ScopeId) -> Result<Value> + 'static,
    ) -> Self {
        Value::NativeFunction(NativeFunction::new(name, handler))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Look up a property on an object value
    pub fn get_property(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(props) => props.borrow().get(key).cloned(),
            _ => None,
        }
    }

    /// Name of the value's tag, as used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Object(_) => "object",
            Value::NativeFunction(_) => "native-fn",
            Value::Function(_) => "function",
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

// Objects compare by contents; functions compare by identity
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(&a.handler, &b.handler),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Object(props) => {
                let props = props.borrow();
                if props.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{ ")?;
                for (i, (key, value)) in props.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, " }}")
            }
            Value::NativeFunction(native) => write!(f, "<native fn {}>", native.name),
            Value::Function(func) => write!(f, "<fn {}({})>", func.name, func.parameters.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Number(14.0).to_string(), "14");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Boolean(true).to_string(), "true");
    }

    #[test]
    fn test_display_object() {
        let mut props = BTreeMap::new();
        props.insert("b".to_string(), Value::Number(7.0));
        props.insert("a".to_string(), Value::Number(1.0));

        assert_eq!(Value::object(props).to_string(), "{ a: 1, b: 7 }");
        assert_eq!(Value::object(BTreeMap::new()).to_string(), "{}");
    }

    #[test]
    fn test_objects_share_by_reference() {
        let original = Value::object(BTreeMap::new());
        let alias = original.clone();

        if let Value::Object(props) = &original {
            props
                .borrow_mut()
                .insert("k".to_string(), Value::Boolean(false));
        }

        assert_eq!(alias.get_property("k"), Some(Value::Boolean(false)));
    }

    #[test]
    fn test_native_equality_is_identity() {
        let a = Value::native("a", |_, _, _| Ok(Value::Null));
        let b = Value::native("a", |_, _, _| Ok(Value::Null));

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::from(1.0).type_name(), "number");
        assert_eq!(Value::from(true).type_name(), "boolean");
        assert_eq!(Value::Null.as_number(), None);
    }
}
