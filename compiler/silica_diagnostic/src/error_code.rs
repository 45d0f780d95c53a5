use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where the leading digits indicate the phase:
/// - E4-0xx: name lookup errors
/// - E4-1xx: type errors
/// - E4-2xx: argument binding errors
/// - E4-3xx: access rule errors
/// - E5xxx: constant evaluation errors
/// - E9xxx: internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lookup Errors (E40xx)
    /// Undeclared identifier
    E4001,
    /// Ambiguous name
    E4002,
    /// Symbol is not a value
    E4003,
    /// Symbol is not callable
    E4004,
    /// Unknown system subroutine
    E4005,
    /// Duplicate definition in scope
    E4006,
    /// Symbol is not a type
    E4007,
    /// Cyclic reference between declarations
    E4008,

    // Type Errors (E41xx)
    /// Assignment type incompatibility
    E4101,
    /// Invalid cast
    E4102,
    /// Expression is not assignable
    E4103,
    /// Expression is not boolean convertible
    E4104,
    /// Invalid operands for binary operator
    E4105,
    /// Invalid operand for unary operator
    E4106,
    /// Type cannot be indexed
    E4107,
    /// Conditional arms have incompatible types
    E4108,
    /// Unknown member of type
    E4109,
    /// Type is not an array for this method
    E4110,

    // Argument Errors (E42xx)
    /// Too few arguments
    E4201,
    /// Too many arguments
    E4202,
    /// Duplicate argument assignment
    E4203,
    /// Named argument does not exist
    E4204,
    /// Argument has no value and no default
    E4205,
    /// Argument cannot be empty
    E4206,
    /// Ordered argument after named argument
    E4207,
    /// Named arguments not allowed here
    E4208,
    /// `with` clause not allowed for this subroutine
    E4209,
    /// Iterator call requires a `with` clause
    E4210,
    /// Expected an iterator name
    E4211,
    /// Expected an iteration expression
    E4212,

    // Access Errors (E43xx)
    /// Automatic variable referenced from static context
    E4301,
    /// Non-static class property referenced without an object
    E4302,
    /// Nested access to non-static class property
    E4303,
    /// Automatic variable referenced from static initializer
    E4304,
    /// Non-static class method called without an object
    E4305,
    /// Nested call to non-static class method
    E4306,

    // Declaration Errors (E44xx)
    /// Automatic lifetime outside a procedural context
    E4401,
    /// Const variable without an initializer
    E4402,

    // Constant Evaluation Errors (E5xxx)
    /// Reference to non-constant variable in constant expression
    E5001,
    /// Hierarchical name in constant expression
    E5002,
    /// Class value in constant expression
    E5003,
    /// Task call in constant expression
    E5004,
    /// DPI import call in constant expression
    E5005,
    /// Method not allowed in constant expression
    E5006,
    /// Subroutine not allowed in constant expression
    E5007,
    /// Void function call in constant expression
    E5008,
    /// Output/inout/ref argument in constant expression
    E5009,
    /// Constant function may not reference generate scope
    E5010,
    /// Constant function may only reference local identifiers
    E5011,
    /// Identifier used before declaration in constant function
    E5012,
    /// Disable target is not an enclosing block
    E5013,
    /// Division by zero in constant expression
    E5014,
    /// Recursion depth exceeded
    E5901,
    /// Step budget exceeded
    E5902,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
    /// Too many errors
    E9002,
}

impl ErrorCode {
    /// Get the numeric code as a string (e.g., "E4001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lookup
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            ErrorCode::E4005 => "E4005",
            ErrorCode::E4006 => "E4006",
            ErrorCode::E4007 => "E4007",
            ErrorCode::E4008 => "E4008",
            // Type
            ErrorCode::E4101 => "E4101",
            ErrorCode::E4102 => "E4102",
            ErrorCode::E4103 => "E4103",
            ErrorCode::E4104 => "E4104",
            ErrorCode::E4105 => "E4105",
            ErrorCode::E4106 => "E4106",
            ErrorCode::E4107 => "E4107",
            ErrorCode::E4108 => "E4108",
            ErrorCode::E4109 => "E4109",
            ErrorCode::E4110 => "E4110",
            // Argument
            ErrorCode::E4201 => "E4201",
            ErrorCode::E4202 => "E4202",
            ErrorCode::E4203 => "E4203",
            ErrorCode::E4204 => "E4204",
            ErrorCode::E4205 => "E4205",
            ErrorCode::E4206 => "E4206",
            ErrorCode::E4207 => "E4207",
            ErrorCode::E4208 => "E4208",
            ErrorCode::E4209 => "E4209",
            ErrorCode::E4210 => "E4210",
            ErrorCode::E4211 => "E4211",
            ErrorCode::E4212 => "E4212",
            // Access
            ErrorCode::E4301 => "E4301",
            ErrorCode::E4302 => "E4302",
            ErrorCode::E4303 => "E4303",
            ErrorCode::E4304 => "E4304",
            ErrorCode::E4305 => "E4305",
            ErrorCode::E4306 => "E4306",
            // Declaration
            ErrorCode::E4401 => "E4401",
            ErrorCode::E4402 => "E4402",
            // Constant evaluation
            ErrorCode::E5001 => "E5001",
            ErrorCode::E5002 => "E5002",
            ErrorCode::E5003 => "E5003",
            ErrorCode::E5004 => "E5004",
            ErrorCode::E5005 => "E5005",
            ErrorCode::E5006 => "E5006",
            ErrorCode::E5007 => "E5007",
            ErrorCode::E5008 => "E5008",
            ErrorCode::E5009 => "E5009",
            ErrorCode::E5010 => "E5010",
            ErrorCode::E5011 => "E5011",
            ErrorCode::E5012 => "E5012",
            ErrorCode::E5013 => "E5013",
            ErrorCode::E5014 => "E5014",
            ErrorCode::E5901 => "E5901",
            ErrorCode::E5902 => "E5902",
            // Internal
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// Check if this is a constant evaluation error (E5xxx range).
    pub fn is_const_eval_error(&self) -> bool {
        self.as_str().starts_with("E5")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_display() {
        assert_eq!(ErrorCode::E4001.to_string(), "E4001");
        assert_eq!(ErrorCode::E4402.as_str(), "E4402");
        assert_eq!(ErrorCode::E5901.as_str(), "E5901");
        assert!(ErrorCode::E5001.is_const_eval_error());
        assert!(!ErrorCode::E4101.is_const_eval_error());
    }
}
