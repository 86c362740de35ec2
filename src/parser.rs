//! The fused tokenizer/parser state machine. Words are consumed one at a time;
//! each `pmo` hands the statement queue built so far to the evaluator.

use std::{fmt, mem, rc::Rc};

use tracing::debug;

use crate::{
    control,
    error::{LangError, LangResult, Location},
    evaluator,
    function::FunctionDef,
    interpreter::Interpreter,
    keyword::{is_reserved, Keyword},
    lexer::Word,
    loader,
    scope::Scope,
    token::{Op, Queue, Token},
    value::Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Head,
    Binding,
    Expression,
    Integer,
    Text,
    End,
    Skip,
    Comment,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Start => "Start",
            State::Head => "statement head",
            State::Binding => "identifier binding",
            State::Expression => "expression",
            State::Integer => "integer literal",
            State::Text => "string literal",
            State::End => "end of statement",
            State::Skip => "skipped branch body",
            State::Comment => "comment",
        };
        f.write_str(name)
    }
}

pub struct Parser<'w> {
    words: &'w [Word],
    pos: usize,
    state: State,
    resume: State,
    queue: Queue,
    int_value: i64,
    text: String,
    skip_depth: usize,
    top_level: bool,
    returned: Option<Value>,
}

impl<'w> Parser<'w> {
    /// A parser for a body (function, loop) with its own fresh queue.
    pub fn new(words: &'w [Word]) -> Self {
        Self {
            words,
            pos: 0,
            state: State::Start,
            resume: State::Start,
            queue: Queue::new(),
            int_value: 0,
            text: String::new(),
            skip_depth: 0,
            top_level: false,
            returned: None,
        }
    }

    /// A parser for a whole program or module. Its statements are counted.
    pub fn top_level(words: &'w [Word]) -> Self {
        Self {
            top_level: true,
            ..Self::new(words)
        }
    }

    /// Runs every statement in order and returns the last `dih` value.
    pub fn run(
        mut self,
        ctx: &mut Interpreter,
        mut local: Option<&mut Scope>,
    ) -> LangResult<Option<Value>> {
        while let Some(word) = self.next_word() {
            if let Err(err) = self.step(ctx, local.as_deref_mut(), word) {
                return Err(err.at(self.location(ctx, word.line)));
            }
        }
        self.finish(ctx)
    }

    fn next_word(&mut self) -> Option<&'w Word> {
        let words = self.words;
        let word = words.get(self.pos)?;
        self.pos += 1;
        Some(word)
    }

    fn location(&self, ctx: &Interpreter, line: usize) -> Location {
        let statement = if self.top_level {
            ctx.statements + 1
        } else {
            ctx.statements
        };
        Location::new(statement, line)
    }

    fn step(
        &mut self,
        ctx: &mut Interpreter,
        local: Option<&mut Scope>,
        word: &'w Word,
    ) -> LangResult<()> {
        let keyword = Keyword::from_word(&word.text);

        if self.state == State::Comment {
            if keyword == Some(Keyword::CommentClose) {
                self.state = self.resume;
            }
            return Ok(());
        }
        if keyword == Some(Keyword::CommentOpen) {
            self.resume = self.state;
            self.state = State::Comment;
            return Ok(());
        }

        match self.state {
            State::Start => self.statement_start(ctx, word, keyword),
            State::Head => self.statement_head(ctx, local, word, keyword),
            State::Binding => self.binding(word),
            State::Expression => self.expression(ctx, local.as_deref(), word, keyword),
            State::Integer => self.integer(word, keyword),
            State::Text => {
                self.string(word, keyword);
                Ok(())
            }
            State::End => self.statement_end(ctx, local, word, keyword),
            State::Skip => {
                self.skip(keyword);
                Ok(())
            }
            State::Comment => Ok(()),
        }
    }

    fn statement_start(
        &mut self,
        ctx: &mut Interpreter,
        word: &Word,
        keyword: Option<Keyword>,
    ) -> LangResult<()> {
        match keyword {
            Some(Keyword::StatementOpen) => {
                self.state = State::Head;
                Ok(())
            }
            Some(Keyword::FnOpen) => self.declare_function(ctx),
            Some(Keyword::ImportOpen) => self.import_modules(ctx),
            _ => Err(LangError::parse(format!(
                "Expected statement head (ts, LEBRON or REF), found '{}'",
                word.text
            ))),
        }
    }

    fn statement_head(
        &mut self,
        ctx: &mut Interpreter,
        local: Option<&mut Scope>,
        word: &Word,
        keyword: Option<Keyword>,
    ) -> LangResult<()> {
        match keyword {
            Some(Keyword::Print) => self.open_expression(Op::Print),
            Some(Keyword::Bind) => self.state = State::Binding,
            Some(Keyword::NoOp) => self.state = State::Expression,
            Some(Keyword::CondOpen) => self.open_expression(Op::CheckFlag),
            Some(Keyword::IndexPut) => self.open_expression(Op::IndexPut),
            Some(Keyword::Return) => self.open_expression(Op::SetReturn),
            Some(Keyword::Then) => self.enter_branch(ctx.flags.top()?),
            Some(Keyword::Else) => self.enter_branch(!ctx.flags.top()?),
            Some(Keyword::BodyClose) => self.state = State::End,
            Some(Keyword::GroupPop) => {
                ctx.flags.pop()?;
                self.state = State::End;
            }
            Some(Keyword::LoopOpen) => return self.open_loop(ctx, local),
            _ => {
                return Err(LangError::parse(format!(
                    "Assignment or function expected after ts, found '{}'",
                    word.text
                )))
            }
        }
        Ok(())
    }

    fn open_expression(&mut self, op: Op) {
        self.queue.push(Token::Op(op));
        self.state = State::Expression;
    }

    fn enter_branch(&mut self, taken: bool) {
        if taken {
            self.state = State::End;
        } else {
            self.skip_depth = 0;
            self.state = State::Skip;
        }
    }

    fn binding(&mut self, word: &Word) -> LangResult<()> {
        check_identifier(&word.text)?;
        self.queue.push(Token::Ident(word.text.clone()));
        self.queue.push(Token::Op(Op::Assign));
        self.state = State::Expression;
        Ok(())
    }

    fn expression(
        &mut self,
        ctx: &Interpreter,
        local: Option<&Scope>,
        word: &Word,
        keyword: Option<Keyword>,
    ) -> LangResult<()> {
        if let Some(keyword) = keyword {
            if let Some(op) = keyword.operator() {
                self.queue.push(Token::Op(op));
                return Ok(());
            }
            match keyword {
                Keyword::IntIncrement => {
                    self.int_value = 0;
                    self.state = State::Integer;
                }
                Keyword::StringOpen => {
                    self.text.clear();
                    self.state = State::Text;
                }
                Keyword::True => self.complete_operand(Token::Literal(Value::Boolean(true))),
                Keyword::False => self.complete_operand(Token::Literal(Value::Boolean(false))),
                Keyword::EmptyList => self.complete_operand(Token::Literal(Value::empty_list())),
                _ => {
                    return Err(LangError::parse(format!(
                        "Not a valid expression: unexpected '{}' in state {}",
                        word.text, self.state
                    )))
                }
            }
            return Ok(());
        }

        let name = word.text.as_str();
        let is_variable =
            local.is_some_and(|scope| scope.contains(name)) || ctx.globals.contains(name);
        if is_variable {
            self.complete_operand(Token::Ident(name.to_string()));
            return Ok(());
        }

        if let Some(arity) = ctx.functions.arity(name) {
            let mut args = Vec::with_capacity(arity);
            for _ in 0..arity {
                let arg = self.next_word().ok_or_else(|| {
                    LangError::parse(format!(
                        "Call to '{}' expects {} argument(s) but the input ended",
                        name, arity
                    ))
                })?;
                args.push(arg.text.clone());
            }
            self.complete_operand(Token::Call {
                name: name.to_string(),
                args,
            });
            return Ok(());
        }

        Err(LangError::reference(format!(
            "Not a valid expression: '{}' is not a variable or function",
            name
        )))
    }

    fn complete_operand(&mut self, token: Token) {
        self.queue.push(token);
        self.state = State::End;
    }

    fn integer(&mut self, word: &Word, keyword: Option<Keyword>) -> LangResult<()> {
        match keyword {
            Some(Keyword::IntIncrement) => {
                self.int_value = self.int_value.checked_add(1).ok_or_else(|| {
                    LangError::parse("Integer literal is too large")
                })?;
                Ok(())
            }
            Some(Keyword::IntClose) => {
                self.complete_operand(Token::Literal(Value::Integer(self.int_value)));
                Ok(())
            }
            _ => Err(LangError::parse(format!(
                "Integer literal interrupted by '{}'; expected tun or sahur",
                word.text
            ))),
        }
    }

    fn string(&mut self, word: &Word, keyword: Option<Keyword>) {
        if keyword == Some(Keyword::StringClose) {
            if self.text.ends_with(' ') {
                self.text.pop();
            }
            let text = mem::take(&mut self.text);
            self.complete_operand(Token::Literal(Value::String(text)));
        } else {
            self.text.push_str(&word.text);
            self.text.push(' ');
        }
    }

    fn statement_end(
        &mut self,
        ctx: &mut Interpreter,
        local: Option<&mut Scope>,
        word: &'w Word,
        keyword: Option<Keyword>,
    ) -> LangResult<()> {
        match keyword {
            Some(Keyword::LoopCondition) => {
                self.queue.push(Token::Op(Op::CaptureCondition));
                Ok(())
            }
            Some(Keyword::StatementClose) => {
                self.state = State::Start;
                self.execute(ctx, local, word.line)
            }
            _ => {
                self.state = State::Expression;
                self.expression(ctx, local.as_deref(), word, keyword)
            }
        }
    }

    fn execute(
        &mut self,
        ctx: &mut Interpreter,
        local: Option<&mut Scope>,
        line: usize,
    ) -> LangResult<()> {
        let queue = mem::take(&mut self.queue);
        if self.top_level {
            ctx.statements += 1;
            debug!(statement = ctx.statements, tokens = queue.len(), "evaluating statement");
        }
        let location = Location::new(ctx.statements, line);
        let outcome = evaluator::evaluate(ctx, local, queue).map_err(|e| e.at(location))?;
        if outcome.returned.is_some() {
            self.returned = outcome.returned;
        }
        Ok(())
    }

    /// Lexical skip to the `fr` closing this body. Nested then/else bodies are
    /// counted so their `fr` does not end the skip early.
    fn skip(&mut self, keyword: Option<Keyword>) {
        match keyword {
            Some(Keyword::Then) | Some(Keyword::Else) => self.skip_depth += 1,
            Some(Keyword::BodyClose) if self.skip_depth == 0 => self.state = State::End,
            Some(Keyword::BodyClose) => self.skip_depth -= 1,
            _ => {}
        }
    }

    /// `LEBRON name params… ngl body… GOAT`
    fn declare_function(&mut self, ctx: &mut Interpreter) -> LangResult<()> {
        let name = self
            .next_word()
            .ok_or_else(|| LangError::parse("LEBRON must be followed by a function name"))?;
        check_identifier(&name.text)?;

        let mut params = Vec::new();
        loop {
            let word = self.next_word().ok_or_else(|| {
                LangError::parse(format!(
                    "Parameter list of '{}' is never closed with ngl",
                    name.text
                ))
            })?;
            if Keyword::from_word(&word.text) == Some(Keyword::ParamsClose) {
                break;
            }
            check_identifier(&word.text)?;
            params.push(word.text.clone());
        }

        let start = self.pos;
        let end = self.matching_close(Keyword::FnOpen, Keyword::FnClose).ok_or_else(|| {
            LangError::parse(format!("Body of '{}' is never closed with GOAT", name.text))
        })?;
        let body: Rc<[Word]> = self.words[start..end].into();

        debug!(function = %name.text, params = params.len(), "declaring function");
        ctx.functions
            .declare(FunctionDef::new(name.text.clone(), params, body));
        Ok(())
    }

    /// `ts kid pmo body… ts gurt pmo`
    fn open_loop(&mut self, ctx: &mut Interpreter, local: Option<&mut Scope>) -> LangResult<()> {
        self.expect(Keyword::StatementClose, "kid")?;

        let words = self.words;
        let start = self.pos;
        let end = self
            .matching_close(Keyword::LoopOpen, Keyword::LoopClose)
            .ok_or_else(|| LangError::parse("Loop opened with kid is never closed with gurt"))?;
        let body = match words[start..end].split_last() {
            Some((last, body)) if Keyword::from_word(&last.text) == Some(Keyword::StatementOpen) => {
                body
            }
            _ => return Err(LangError::parse("Loop must be closed with ts gurt pmo")),
        };
        self.expect(Keyword::StatementClose, "gurt")?;

        if let Some(value) = control::run_loop(ctx, local, body)? {
            self.returned = Some(value);
        }
        self.state = State::Start;
        Ok(())
    }

    /// `REF a, b DO SOMETHING`
    fn import_modules(&mut self, ctx: &mut Interpreter) -> LangResult<()> {
        let (names, next) = loader::read_directive(self.words, self.pos)?;
        self.pos = next;
        for name in names {
            loader::load_module(ctx, &name)?;
        }
        Ok(())
    }

    /// Advances past the close keyword that balances an already-consumed
    /// open keyword and returns the close keyword's index.
    fn matching_close(&mut self, open: Keyword, close: Keyword) -> Option<usize> {
        let mut level = 1usize;
        while let Some(word) = self.next_word() {
            match Keyword::from_word(&word.text) {
                Some(k) if k == open => level += 1,
                Some(k) if k == close => {
                    level -= 1;
                    if level == 0 {
                        return Some(self.pos - 1);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn expect(&mut self, keyword: Keyword, after: &str) -> LangResult<()> {
        match self.next_word() {
            Some(word) if Keyword::from_word(&word.text) == Some(keyword) => Ok(()),
            Some(word) => Err(LangError::parse(format!(
                "Expected {} after {}, found '{}'",
                keyword.as_str(),
                after,
                word.text
            ))),
            None => Err(LangError::parse(format!(
                "Expected {} after {}, found end of input",
                keyword.as_str(),
                after
            ))),
        }
    }

    fn finish(self, ctx: &Interpreter) -> LangResult<Option<Value>> {
        let message = match self.state {
            State::Start => return Ok(self.returned),
            State::Comment => "Comment opened with -> is never closed with <-".to_string(),
            State::Skip => "Branch body is never closed with fr".to_string(),
            State::Integer => "Integer literal is never closed with sahur".to_string(),
            State::Text => "String literal is never closed with bro".to_string(),
            state => format!("Statement is never closed with pmo (input ended in state {})", state),
        };
        let line = self.words.last().map(|word| word.line).unwrap_or(1);
        Err(LangError::parse(message).at(self.location(ctx, line)))
    }
}

fn check_identifier(name: &str) -> LangResult<()> {
    if is_reserved(name) {
        return Err(LangError::parse(format!(
            "'{}' is reserved by the language",
            name
        )));
    }
    Ok(())
}
