//! Executes one statement queue with an accumulator and an operand stack.
//! Tokens are taken from the back, so the statement head runs last.

use std::{
    io::{BufRead, Write},
    mem,
};

use tracing::trace;

use crate::{
    error::{LangError, LangResult},
    function,
    interpreter::Interpreter,
    ops,
    scope::{self, Scope},
    token::{Op, Queue, Token},
    value::Value,
};

/// What a statement left behind.
#[derive(Debug, Default)]
pub struct Outcome {
    /// The accumulator after the last token.
    pub value: Option<Value>,
    /// Set by a `dih` head.
    pub returned: Option<Value>,
}

pub fn evaluate(
    ctx: &mut Interpreter,
    local: Option<&mut Scope>,
    queue: Queue,
) -> LangResult<Outcome> {
    let mut evaluator = Evaluator {
        queue,
        accumulator: None,
        operands: Vec::new(),
        assigning: false,
        flag: None,
        returned: None,
    };
    evaluator.run(ctx, local)?;

    if let Some(flag) = evaluator.flag {
        ctx.flags.push(flag);
    }
    Ok(Outcome {
        value: evaluator.accumulator,
        returned: evaluator.returned,
    })
}

struct Evaluator {
    queue: Queue,
    accumulator: Option<Value>,
    operands: Vec<Value>,
    assigning: bool,
    flag: Option<bool>,
    returned: Option<Value>,
}

impl Evaluator {
    fn run(&mut self, ctx: &mut Interpreter, mut local: Option<&mut Scope>) -> LangResult<()> {
        while let Some(token) = self.queue.pop() {
            match token {
                Token::Literal(value) => self.push_value(value),
                Token::Ident(name) => self.identifier(ctx, local.as_deref_mut(), name)?,
                Token::Call { name, args } => {
                    let args = resolve_args(ctx, local.as_deref(), &name, &args)?;
                    if let Some(result) = function::invoke(ctx, &name, args)? {
                        self.queue.push(Token::Literal(result));
                    }
                }
                Token::Op(op) => self.operator(ctx, op)?,
            }
        }
        Ok(())
    }

    fn push_value(&mut self, value: Value) {
        if self.accumulator.is_none() {
            self.accumulator = Some(value);
        } else {
            self.operands.push(value);
        }
    }

    fn identifier(
        &mut self,
        ctx: &mut Interpreter,
        local: Option<&mut Scope>,
        name: String,
    ) -> LangResult<()> {
        if self.assigning {
            self.assigning = false;
            let value = self.accumulator.clone().ok_or_else(|| {
                LangError::runtime(format!("Nothing to bind to '{}'", name))
            })?;
            trace!(name = %name, value = ?value, "bind");
            scope::bind(local, &mut ctx.globals, &name, value);
            return Ok(());
        }

        let value = scope::lookup(local.as_deref(), &ctx.globals, &name)
            .cloned()
            .ok_or_else(|| LangError::reference(format!("Unknown variable '{}'", name)))?;
        self.queue.push(Token::Literal(value));
        Ok(())
    }

    fn operator(&mut self, ctx: &mut Interpreter, op: Op) -> LangResult<()> {
        match op {
            Op::Assign => self.assigning = true,
            Op::SetReturn => self.returned = Some(self.take_accumulator(op)?),
            Op::CheckFlag => self.flag = Some(self.take_accumulator(op)?.is_truthy()),
            // The rest of the queue becomes the loop condition; it is only
            // evaluated once the loop opens.
            Op::CaptureCondition => ctx.loops.capture(mem::take(&mut self.queue)),
            Op::Print => {
                let value = self.take_accumulator(op)?;
                writeln!(ctx.output, "{} ({})", value.literal(), value)?;
            }
            Op::IndexPut => {
                if self.operands.len() != 2 {
                    return Err(LangError::type_error(format!(
                        "pt needs a list and an index, found {} operand(s)",
                        self.operands.len()
                    )));
                }
                let value = self.take_accumulator(op)?;
                let list = self.pop_operand(op)?;
                let index = self.pop_operand(op)?;
                ops::put(list, index, value)?;
            }
            Op::Input => self.input(ctx)?,
            op if ops::is_unary(op) => self.unary(op)?,
            op => self.binary(op)?,
        }
        Ok(())
    }

    fn unary(&mut self, op: Op) -> LangResult<()> {
        if let Some(top) = self.operands.pop() {
            self.operands.push(ops::unary(op, top)?);
            return Ok(());
        }
        let value = self.take_accumulator(op)?;
        self.accumulator = Some(ops::unary(op, value)?);
        Ok(())
    }

    fn binary(&mut self, op: Op) -> LangResult<()> {
        if self.operands.len() > 1 {
            let first = self.pop_operand(op)?;
            let second = self.pop_operand(op)?;
            self.operands.push(ops::binary(op, first, second)?);
            return Ok(());
        }
        let first = self.pop_operand(op)?;
        let second = self.take_accumulator(op)?;
        self.accumulator = Some(ops::binary(op, first, second)?);
        Ok(())
    }

    /// `chat?` writes its operand as a prompt and yields the line read back.
    fn input(&mut self, ctx: &mut Interpreter) -> LangResult<()> {
        let from_operand = !self.operands.is_empty();
        let prompt = if from_operand {
            self.operands.pop()
        } else {
            self.accumulator.take()
        };
        if let Some(prompt) = prompt {
            write!(ctx.output, "{}", prompt)?;
        }
        ctx.output.flush()?;

        let mut line = String::new();
        if ctx.input.read_line(&mut line)? == 0 {
            return Err(LangError::runtime("chat? reached the end of input"));
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).to_string();

        if from_operand {
            self.operands.push(Value::String(trimmed));
        } else {
            self.accumulator = Some(Value::String(trimmed));
        }
        Ok(())
    }

    fn take_accumulator(&mut self, op: Op) -> LangResult<Value> {
        self.accumulator
            .take()
            .ok_or_else(|| missing_operand(op))
    }

    fn pop_operand(&mut self, op: Op) -> LangResult<Value> {
        self.operands.pop().ok_or_else(|| missing_operand(op))
    }
}

fn missing_operand(op: Op) -> LangError {
    LangError::type_error(format!("'{}' is missing an operand", op.name()))
}

/// Argument words are integer text or names bound in the caller's scope.
fn resolve_args(
    ctx: &Interpreter,
    local: Option<&Scope>,
    callee: &str,
    args: &[String],
) -> LangResult<Vec<Value>> {
    args.iter()
        .map(|arg| {
            if !arg.is_empty() && arg.chars().all(|c| c.is_ascii_digit()) {
                return arg.parse::<i64>().map(Value::Integer).map_err(|_| {
                    LangError::runtime(format!("Argument '{}' does not fit in an int", arg))
                });
            }
            scope::lookup(local, &ctx.globals, arg)
                .cloned()
                .ok_or_else(|| {
                    LangError::reference(format!(
                        "Unknown argument '{}' for function '{}'",
                        arg, callee
                    ))
                })
        })
        .collect()
}
