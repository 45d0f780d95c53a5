//! Constant values produced by elaboration-time evaluation.

use std::fmt;

use crate::LogicVec;

/// The result of evaluating a constant expression.
///
/// `Invalid` marks a value that could not be computed; it propagates
/// through further evaluation without producing cascading diagnostics.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum ConstantValue {
    #[default]
    Invalid,
    Integer(LogicVec),
    Real(f64),
    Str(String),
    /// Element values of an array or struct, in declaration order.
    Aggregate(Vec<ConstantValue>),
    /// The null class handle.
    Null,
}

impl ConstantValue {
    pub fn is_invalid(&self) -> bool {
        matches!(self, ConstantValue::Invalid)
    }

    /// A 1-bit integer from a boolean.
    pub fn from_bool(b: bool) -> Self {
        ConstantValue::Integer(LogicVec::from_bool(b))
    }

    /// View as an integral value.
    pub fn integer(&self) -> Option<&LogicVec> {
        match self {
            ConstantValue::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// Extract a fully-known signed integer.
    pub fn to_i64(&self) -> Option<i64> {
        self.integer().and_then(LogicVec::to_i64)
    }

    /// Interpret as a condition. `None` means unknown (an X condition).
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            ConstantValue::Integer(v) => v.reduce_bool(),
            ConstantValue::Real(r) => Some(*r != 0.0),
            ConstantValue::Str(s) => Some(!s.is_empty()),
            ConstantValue::Null => Some(false),
            ConstantValue::Aggregate(_) | ConstantValue::Invalid => None,
        }
    }

    /// Whether the value contains any unknown bits.
    pub fn has_unknown(&self) -> bool {
        match self {
            ConstantValue::Integer(v) => v.has_unknown(),
            ConstantValue::Aggregate(elems) => elems.iter().any(ConstantValue::has_unknown),
            ConstantValue::Invalid => true,
            _ => false,
        }
    }
}

impl From<LogicVec> for ConstantValue {
    fn from(v: LogicVec) -> Self {
        ConstantValue::Integer(v)
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Invalid => write!(f, "<invalid>"),
            ConstantValue::Integer(v) => write!(f, "{v}"),
            ConstantValue::Real(r) => write!(f, "{r}"),
            ConstantValue::Str(s) => write!(f, "\"{s}\""),
            ConstantValue::Null => write!(f, "null"),
            ConstantValue::Aggregate(elems) => {
                write!(f, "'{{")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_conversion() {
        assert_eq!(ConstantValue::from_bool(true).to_bool(), Some(true));
        assert_eq!(ConstantValue::Real(0.0).to_bool(), Some(false));
        assert_eq!(ConstantValue::Str(String::new()).to_bool(), Some(false));
        assert_eq!(ConstantValue::Null.to_bool(), Some(false));
        assert_eq!(ConstantValue::Invalid.to_bool(), None);
        assert_eq!(
            ConstantValue::Integer(LogicVec::filled_x(4, false)).to_bool(),
            None
        );
    }

    #[test]
    fn display_aggregate() {
        let v = ConstantValue::Aggregate(vec![
            ConstantValue::Integer(LogicVec::new(32, true, 1)),
            ConstantValue::Integer(LogicVec::new(32, true, 2)),
        ]);
        assert_eq!(v.to_string(), "'{1, 2}");
    }

    #[test]
    fn invalid_propagates_unknown() {
        assert!(ConstantValue::Invalid.has_unknown());
        assert!(!ConstantValue::Null.has_unknown());
    }
}
