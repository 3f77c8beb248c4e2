//! Typed query parameters.

use std::fmt;

/// A positional query parameter with an explicit type tag.
///
/// The tag is chosen by the caller, either by constructing a variant
/// directly or through a `From` conversion from a concrete Rust type. It is
/// never guessed from the contents of a value, so `"42"` stays a string and
/// `42` stays an integer.
#[derive(Debug, Clone, PartialEq)]
pub enum BindParam {
    /// Integer parameter (mysqli tag `i`).
    Int(i64),
    /// String parameter (mysqli tag `s`).
    Text(String),
    /// Floating point parameter (mysqli tag `d`).
    Float(f64),
}

impl BindParam {
    /// Creates a text parameter.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns the driver type tag for this parameter.
    #[must_use]
    pub const fn type_tag(&self) -> char {
        match self {
            Self::Int(_) => 'i',
            Self::Text(_) => 's',
            Self::Float(_) => 'd',
        }
    }

    /// Returns the type tags for a parameter list, in order.
    #[must_use]
    pub fn type_tags(params: &[BindParam]) -> String {
        params.iter().map(BindParam::type_tag).collect()
    }
}

impl fmt::Display for BindParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for BindParam {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for BindParam {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for BindParam {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for BindParam {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for BindParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for BindParam {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for BindParam {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}
