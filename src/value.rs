use std::{cell::RefCell, fmt, rc::Rc};

use crate::keyword::Keyword;

/// Lists are shared by reference: assigning or passing a list aliases it.
pub type ListRef = Rc<RefCell<Vec<Value>>>;

#[derive(Clone)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(ListRef),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn empty_list() -> Value {
        Value::list(Vec::new())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "bool",
            Value::Integer(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "str",
            Value::List(_) => "list",
        }
    }

    /// Zero, the empty string and the empty list are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
        }
    }

    /// Copies list contents recursively instead of sharing them.
    pub fn deep_copy(&self) -> Value {
        match self {
            Value::List(items) => {
                Value::list(items.borrow().iter().map(Value::deep_copy).collect())
            }
            other => other.clone(),
        }
    }

    /// Re-encodes the value as program text that evaluates back to it.
    pub fn literal(&self) -> String {
        match self {
            Value::Boolean(true) => Keyword::True.as_str().to_string(),
            Value::Boolean(false) => Keyword::False.as_str().to_string(),
            Value::Integer(n) if *n >= 0 => encode_integer(*n),
            Value::Integer(n) => format!(
                "{} {} {} {}",
                Keyword::ToInt.as_str(),
                Keyword::StringOpen.as_str(),
                n,
                Keyword::StringClose.as_str()
            ),
            Value::Float(x) => format!(
                "{} {} {:?} {}",
                Keyword::ToFloat.as_str(),
                Keyword::StringOpen.as_str(),
                x,
                Keyword::StringClose.as_str()
            ),
            Value::String(s) if s.is_empty() => format!(
                "{} {}",
                Keyword::StringOpen.as_str(),
                Keyword::StringClose.as_str()
            ),
            Value::String(s) => format!(
                "{} {} {}",
                Keyword::StringOpen.as_str(),
                s,
                Keyword::StringClose.as_str()
            ),
            Value::List(_) => format!("{} {:?}", Keyword::EmptyList.as_str(), self),
        }
    }

    /// Equality across kinds the way the arithmetic sees them. Booleans count
    /// as 0 and 1 against numbers, and lists compare element by element.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                (*a as f64) == *b
            }
            (Value::Boolean(a), Value::Integer(b)) | (Value::Integer(b), Value::Boolean(a)) => {
                i64::from(*a) == *b
            }
            (Value::Boolean(a), Value::Float(b)) | (Value::Float(b), Value::Boolean(a)) => {
                f64::from(u8::from(*a)) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(l, r)| l.loose_eq(r))
            }
            _ => false,
        }
    }
}

/// `tun` repeated `n + 1` times followed by `sahur`.
pub fn encode_integer(n: i64) -> String {
    let mut text = String::new();
    for _ in 0..=n {
        text.push_str(Keyword::IntIncrement.as_str());
        text.push(' ');
    }
    text.push_str(Keyword::IntClose.as_str());
    text
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", item)?;
                }
                write!(f, "]")
            }
            other => write!(f, "{}", other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::List(_) => write!(f, "{:?}", self),
        }
    }
}
