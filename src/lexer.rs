use std::mem;

/// One whitespace-delimited piece of program text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    pub line: usize,
}

impl Word {
    pub fn new(text: impl Into<String>, line: usize) -> Self {
        Self {
            text: text.into(),
            line,
        }
    }
}

pub struct Lexer<'a> {
    chars: std::str::Chars<'a>,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars(),
            line: 1,
        }
    }

    /// Splits the input on any whitespace. Words keep the line they start on.
    pub fn lex(mut self) -> Vec<Word> {
        let mut words = Vec::new();
        let mut current = String::new();
        let mut start_line = self.line;

        while let Some(ch) = self.chars.next() {
            if ch.is_whitespace() {
                if !current.is_empty() {
                    words.push(Word::new(mem::take(&mut current), start_line));
                }
                if ch == '\n' {
                    self.line += 1;
                }
                continue;
            }

            if current.is_empty() {
                start_line = self.line;
            }
            current.push(ch);
        }

        if !current.is_empty() {
            words.push(Word::new(current, start_line));
        }

        words
    }
}
