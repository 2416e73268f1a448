use std::fmt;

/// A sampled or expected value, as reported in check results and mismatches.
#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Int(u32),
    Bool(bool),
    Percent(f64),
    String(String),
    None,
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Val::Int(v) => write!(f, "{} (0x{:02x})", v, v),
            Val::Bool(b) => write!(f, "{}", *b as u8),
            Val::Percent(p) => write!(f, "{:.1}%", p),
            Val::String(s) => f.write_str(s),
            Val::None => f.write_str("-"),
        }
    }
}

impl From<u32> for Val {
    fn from(v: u32) -> Self {
        Val::Int(v)
    }
}

impl From<u8> for Val {
    fn from(v: u8) -> Self {
        Val::Int(v as u32)
    }
}

impl From<bool> for Val {
    fn from(b: bool) -> Self {
        Val::Bool(b)
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Self {
        Val::String(s.to_string())
    }
}

impl From<String> for Val {
    fn from(s: String) -> Self {
        Val::String(s)
    }
}
