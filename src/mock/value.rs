//! Scripted return values.

use std::fmt;

use strum::IntoStaticStr;

use crate::ids::ObjectRef;

/// A value queued as the result of a mocked call.
///
/// Primitive variants mirror the typed accessors on
/// [`MockRegistry`](crate::mock::MockRegistry); [`Value::Object`] and
/// [`Value::Null`] cover reference results, which the target runtime turns
/// back into live objects.
#[derive(Clone, Copy, Debug, PartialEq, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Value {
    /// A boolean.
    Bool(bool),
    /// A signed 8-bit integer.
    Byte(i8),
    /// A signed 16-bit integer.
    Short(i16),
    /// A signed 32-bit integer.
    Int(i32),
    /// A signed 64-bit integer.
    Long(i64),
    /// A 32-bit float.
    Float(f32),
    /// A 64-bit float.
    Double(f64),
    /// A character.
    Char(char),
    /// A reference to an existing object.
    Object(ObjectRef),
    /// The null reference.
    Null,
}

impl Value {
    /// Short lowercase name of the variant, used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.into()
    }

    /// Returns `true` for [`Value::Object`] and [`Value::Null`].
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}i8"),
            Value::Short(v) => write!(f, "{v}i16"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}L"),
            Value::Float(v) => write!(f, "{v}f"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v:?}"),
            Value::Object(obj) => write!(f, "{obj}"),
            Value::Null => write!(f, "null"),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    char => Char,
    ObjectRef => Object,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Int(1).type_name(), "int");
        assert_eq!(Value::Double(1.5).type_name(), "double");
        assert_eq!(Value::Null.type_name(), "null");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(10_i32), Value::Int(10));
        assert_eq!(Value::from('x'), Value::Char('x'));
        assert!(Value::from(ObjectRef(4)).is_reference());
        assert!(!Value::from(true).is_reference());
    }
}
