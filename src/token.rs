use crate::value::Value;

/// Operators as queued by the parser. The first block are plain value
/// operators; the rest act on the statement or the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Subtract,
    Multiply,
    IntDivide,
    FloatDivide,
    Modulo,
    Greater,
    Equals,
    Or,
    And,
    Not,
    Concat,
    ToBool,
    ToInt,
    ToStr,
    ToFloat,
    Append,
    IndexGet,
    RemoveLast,
    Split,
    Length,
    Input,

    IndexPut,
    Print,
    CheckFlag,
    CaptureCondition,
    Assign,
    SetReturn,
}

impl Op {
    pub fn name(self) -> &'static str {
        match self {
            Op::Add => "touch",
            Op::Subtract => "#shrink",
            Op::Multiply => "cavendish",
            Op::IntDivide => "big25",
            Op::FloatDivide => "bigf",
            Op::Modulo => "crockpot",
            Op::Greater => "mogs",
            Op::Equals => "vibes",
            Op::Or => "chill",
            Op::And => "grind",
            Op::Not => "L",
            Op::Concat => "stroke",
            Op::ToBool => "sayong",
            Op::ToInt => "spill",
            Op::ToStr => "lowkey",
            Op::ToFloat => "tf",
            Op::Append => "ad",
            Op::IndexGet => "gt",
            Op::RemoveLast => "rm",
            Op::Split => "BOOM",
            Op::Length => "girth",
            Op::Input => "chat?",
            Op::IndexPut => "pt",
            Op::Print => "yap",
            Op::CheckFlag => "hawk",
            Op::CaptureCondition => "yo",
            Op::Assign => "rizz",
            Op::SetReturn => "dih",
        }
    }
}

/// One entry of a statement queue.
#[derive(Debug, Clone)]
pub enum Token {
    Op(Op),
    Ident(String),
    /// A call with its raw argument words, captured before any evaluation.
    Call { name: String, args: Vec<String> },
    Literal(Value),
}

impl Token {
    pub fn deep_copy(&self) -> Token {
        match self {
            Token::Literal(value) => Token::Literal(value.deep_copy()),
            other => other.clone(),
        }
    }
}

pub type Queue = Vec<Token>;

pub fn deep_copy_queue(queue: &[Token]) -> Queue {
    queue.iter().map(Token::deep_copy).collect()
}
