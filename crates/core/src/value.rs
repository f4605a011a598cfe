//! Dynamic value model for dispatch
//!
//! This module defines:
//! - Value: Unified enum carried across the dynamic dispatch boundary
//! - ParamType: Declared parameter types in method signatures
//! - The assignability table used during candidate matching
//!
//! ## Assignability Rules
//!
//! Primitive matching uses an explicit widening table rather than implicit
//! coercion at use sites:
//! - Int is assignable to Int and Float (numeric widening)
//! - Char is assignable to Char and Int (widening)
//! - Bool, Float, Str only to themselves
//! - A Handle (wrapped player/role reference) is assignable to a declared
//!   role type only through role-typed substitution, which the dispatch
//!   engine performs; the table alone never accepts a Handle.

use crate::error::{Error, Result};
use crate::types::{NodeId, TypeKey};
use std::fmt;

/// Value passed to and returned from dynamically dispatched members
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value (void returns)
    Unit,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754)
    Float(f64),
    /// Single character
    Char(char),
    /// UTF-8 string
    Str(String),
    /// Reference to a wrapped player/role node
    Handle(NodeId),
}

impl Value {
    /// Short tag naming the variant, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Str(_) => "str",
            Value::Handle(_) => "handle",
        }
    }

    /// Extract an integer, or fail with TypeMismatch
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(v) => Ok(*v),
            other => Err(Error::TypeMismatch {
                expected: "int".into(),
                actual: other.kind().into(),
            }),
        }
    }

    /// Extract a float; an integer widens
    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            other => Err(Error::TypeMismatch {
                expected: "float".into(),
                actual: other.kind().into(),
            }),
        }
    }

    /// Extract a bool, or fail with TypeMismatch
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(v) => Ok(*v),
            other => Err(Error::TypeMismatch {
                expected: "bool".into(),
                actual: other.kind().into(),
            }),
        }
    }

    /// Extract a char, or fail with TypeMismatch
    pub fn as_char(&self) -> Result<char> {
        match self {
            Value::Char(v) => Ok(*v),
            other => Err(Error::TypeMismatch {
                expected: "char".into(),
                actual: other.kind().into(),
            }),
        }
    }

    /// Borrow the string contents, or fail with TypeMismatch
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::Str(v) => Ok(v),
            other => Err(Error::TypeMismatch {
                expected: "str".into(),
                actual: other.kind().into(),
            }),
        }
    }

    /// Extract a node handle, or fail with TypeMismatch
    pub fn as_handle(&self) -> Result<NodeId> {
        match self {
            Value::Handle(v) => Ok(*v),
            other => Err(Error::TypeMismatch {
                expected: "handle".into(),
                actual: other.kind().into(),
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => f.write_str("()"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "'{v}'"),
            Value::Str(v) => write!(f, "{v:?}"),
            Value::Handle(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<NodeId> for Value {
    fn from(v: NodeId) -> Self {
        Value::Handle(v)
    }
}

/// Declared parameter type in a registered method signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Boolean parameter
    Bool,
    /// Integer parameter
    Int,
    /// Float parameter (accepts Int via widening)
    Float,
    /// Character parameter
    Char,
    /// String parameter
    Str,
    /// A registered role/player type; Handle arguments are substituted
    /// with the sub-role of this type by the dispatch engine
    Of(TypeKey),
}

impl ParamType {
    /// Whether `arg` is assignable to this declared type
    ///
    /// Handle arguments are never accepted directly by the table; the
    /// dispatch engine resolves them through role-typed substitution and
    /// only then re-checks the substituted node's type against `Of`.
    pub fn accepts(&self, arg: &Value) -> bool {
        matches!(
            (self, arg),
            (ParamType::Bool, Value::Bool(_))
                | (ParamType::Int, Value::Int(_))
                | (ParamType::Int, Value::Char(_))
                | (ParamType::Float, Value::Float(_))
                | (ParamType::Float, Value::Int(_))
                | (ParamType::Char, Value::Char(_))
                | (ParamType::Str, Value::Str(_))
        )
    }

    /// The role type this parameter requires, if any
    pub fn role_type(&self) -> Option<TypeKey> {
        match self {
            ParamType::Of(key) => Some(*key),
            _ => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Bool => f.write_str("bool"),
            ParamType::Int => f.write_str("int"),
            ParamType::Float => f.write_str("float"),
            ParamType::Char => f.write_str("char"),
            ParamType::Str => f.write_str("str"),
            ParamType::Of(key) => write!(f, "{key}"),
        }
    }
}
