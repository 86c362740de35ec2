//! The fixed keyword vocabulary. Spellings are the wire format.

use crate::token::Op;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // statement frame
    StatementOpen,
    StatementClose,
    NoOp,
    Bind,
    // literals
    IntIncrement,
    IntClose,
    StringOpen,
    StringClose,
    True,
    False,
    EmptyList,
    // branches
    CondOpen,
    Then,
    Else,
    BodyClose,
    GroupPop,
    // loops
    LoopCondition,
    LoopOpen,
    LoopClose,
    // functions
    FnOpen,
    ParamsClose,
    FnClose,
    Return,
    // imports
    ImportOpen,
    ImportDo,
    ImportSomething,
    // arithmetic
    Add,
    Subtract,
    Multiply,
    IntDivide,
    FloatDivide,
    Modulo,
    // comparison and logic
    Greater,
    Equals,
    Or,
    And,
    Not,
    // conversions
    ToBool,
    ToInt,
    ToStr,
    ToFloat,
    // lists and strings
    Append,
    IndexGet,
    RemoveLast,
    IndexPut,
    Split,
    Length,
    Concat,
    // io
    Print,
    Input,
    // comments
    CommentOpen,
    CommentClose,
}

const SPELLINGS: &[(Keyword, &str)] = &[
    (Keyword::StatementOpen, "ts"),
    (Keyword::StatementClose, "pmo"),
    (Keyword::NoOp, "sybau"),
    (Keyword::Bind, "rizz"),
    (Keyword::IntIncrement, "tun"),
    (Keyword::IntClose, "sahur"),
    (Keyword::StringOpen, "legit"),
    (Keyword::StringClose, "bro"),
    (Keyword::True, "sigma"),
    (Keyword::False, "beta"),
    (Keyword::EmptyList, "ls"),
    (Keyword::CondOpen, "hawk"),
    (Keyword::Then, "lion"),
    (Keyword::Else, "tiger"),
    (Keyword::BodyClose, "fr"),
    (Keyword::GroupPop, "ong"),
    (Keyword::LoopCondition, "yo"),
    (Keyword::LoopOpen, "kid"),
    (Keyword::LoopClose, "gurt"),
    (Keyword::FnOpen, "LEBRON"),
    (Keyword::ParamsClose, "ngl"),
    (Keyword::FnClose, "GOAT"),
    (Keyword::Return, "dih"),
    (Keyword::ImportOpen, "REF"),
    (Keyword::ImportDo, "DO"),
    (Keyword::ImportSomething, "SOMETHING"),
    (Keyword::Add, "touch"),
    (Keyword::Subtract, "#shrink"),
    (Keyword::Multiply, "cavendish"),
    (Keyword::IntDivide, "big25"),
    (Keyword::FloatDivide, "bigf"),
    (Keyword::Modulo, "crockpot"),
    (Keyword::Greater, "mogs"),
    (Keyword::Equals, "vibes"),
    (Keyword::Or, "chill"),
    (Keyword::And, "grind"),
    (Keyword::Not, "L"),
    (Keyword::ToBool, "sayong"),
    (Keyword::ToInt, "spill"),
    (Keyword::ToStr, "lowkey"),
    (Keyword::ToFloat, "tf"),
    (Keyword::Append, "ad"),
    (Keyword::IndexGet, "gt"),
    (Keyword::RemoveLast, "rm"),
    (Keyword::IndexPut, "pt"),
    (Keyword::Split, "BOOM"),
    (Keyword::Length, "girth"),
    (Keyword::Concat, "stroke"),
    (Keyword::Print, "yap"),
    (Keyword::Input, "chat?"),
    (Keyword::CommentOpen, "->"),
    (Keyword::CommentClose, "<-"),
];

/// Words that were internal operator names in earlier interpreters. They stay
/// reserved so programs accepted here are accepted there.
const LEGACY_RESERVED: &[&str] = &[
    "print", "set", "if", "then", "else", "cond", "add", "get", "remove", "put", "len", "ret",
    "+", "-", "*", "/", "%", "./", "or", "and", "not", "legoat", "[]",
];

impl Keyword {
    pub fn from_word(word: &str) -> Option<Keyword> {
        SPELLINGS
            .iter()
            .find(|(_, spelling)| *spelling == word)
            .map(|(keyword, _)| *keyword)
    }

    pub fn as_str(self) -> &'static str {
        SPELLINGS
            .iter()
            .find(|(keyword, _)| *keyword == self)
            .map(|(_, spelling)| *spelling)
            .unwrap_or("<unknown>")
    }

    /// The evaluator operator a keyword queues when it appears in expression
    /// position.
    pub fn operator(self) -> Option<Op> {
        let op = match self {
            Keyword::Add => Op::Add,
            Keyword::Subtract => Op::Subtract,
            Keyword::Multiply => Op::Multiply,
            Keyword::IntDivide => Op::IntDivide,
            Keyword::FloatDivide => Op::FloatDivide,
            Keyword::Modulo => Op::Modulo,
            Keyword::Greater => Op::Greater,
            Keyword::Equals => Op::Equals,
            Keyword::Or => Op::Or,
            Keyword::And => Op::And,
            Keyword::Not => Op::Not,
            Keyword::Concat => Op::Concat,
            Keyword::ToBool => Op::ToBool,
            Keyword::ToInt => Op::ToInt,
            Keyword::ToStr => Op::ToStr,
            Keyword::ToFloat => Op::ToFloat,
            Keyword::Append => Op::Append,
            Keyword::IndexGet => Op::IndexGet,
            Keyword::RemoveLast => Op::RemoveLast,
            Keyword::Split => Op::Split,
            Keyword::Length => Op::Length,
            Keyword::Input => Op::Input,
            _ => return None,
        };
        Some(op)
    }
}

pub fn is_reserved(word: &str) -> bool {
    Keyword::from_word(word).is_some() || LEGACY_RESERVED.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spellings_round_trip() {
        for (keyword, spelling) in SPELLINGS {
            assert_eq!(Keyword::from_word(spelling), Some(*keyword));
            assert_eq!(keyword.as_str(), *spelling);
        }
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(Keyword::from_word("LEBRON"), Some(Keyword::FnOpen));
        assert_eq!(Keyword::from_word("lebron"), None);
        assert_eq!(Keyword::from_word("l"), None);
    }

    #[test]
    fn legacy_names_are_reserved() {
        assert!(is_reserved("print"));
        assert!(is_reserved("chat?"));
        assert!(!is_reserved("counter"));
    }
}
