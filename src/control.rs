//! Branch flags and loop templates.

use tracing::{debug, trace};

use crate::{
    error::{LangError, LangResult},
    evaluator,
    interpreter::Interpreter,
    lexer::Word,
    parser::Parser,
    scope::Scope,
    token::{deep_copy_queue, Queue},
    value::Value,
};

/// Outcomes of `hawk` conditions. `lion`/`tiger` read the top, `ong` pops it.
#[derive(Debug, Default)]
pub struct FlagStack {
    flags: Vec<bool>,
}

impl FlagStack {
    pub fn push(&mut self, flag: bool) {
        self.flags.push(flag);
    }

    pub fn top(&self) -> LangResult<bool> {
        self.flags.last().copied().ok_or_else(|| {
            LangError::parse("Branch marker with no open condition (missing hawk)")
        })
    }

    pub fn pop(&mut self) -> LangResult<bool> {
        self.flags
            .pop()
            .ok_or_else(|| LangError::parse("ong with no open condition to pop"))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Condition templates indexed by loop nesting depth. `yo` fills the slot for
/// the current depth; `kid` claims it and the slot is dropped on exit.
#[derive(Debug, Default)]
pub struct LoopTemplates {
    conditions: Vec<Option<Queue>>,
    depth: usize,
}

impl LoopTemplates {
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn capture(&mut self, condition: Queue) {
        if self.conditions.len() <= self.depth {
            self.conditions.resize_with(self.depth + 1, || None);
        }
        self.conditions[self.depth] = Some(condition);
    }

    fn open(&mut self) -> LangResult<usize> {
        let depth = self.depth;
        match self.conditions.get(depth) {
            Some(Some(_)) => {
                self.depth += 1;
                Ok(depth)
            }
            _ => Err(LangError::parse(
                "kid opened a loop but no condition was captured with yo",
            )),
        }
    }

    /// A fresh copy of the condition for one iteration.
    fn condition(&self, depth: usize) -> Queue {
        self.conditions
            .get(depth)
            .and_then(Option::as_ref)
            .map(|queue| deep_copy_queue(queue))
            .unwrap_or_default()
    }

    fn close(&mut self, depth: usize) {
        self.depth = depth;
        self.conditions.truncate(depth);
    }
}

/// Runs a loop whose condition was captured at the current depth. The last
/// `dih` value seen in the body is handed back to the enclosing body.
pub(crate) fn run_loop(
    ctx: &mut Interpreter,
    mut local: Option<&mut Scope>,
    body: &[Word],
) -> LangResult<Option<Value>> {
    let depth = ctx.loops.open()?;
    debug!(depth, body_words = body.len(), "loop opened");

    let result = iterate(ctx, local.as_deref_mut(), body, depth);

    ctx.loops.close(depth);
    debug!(depth, "loop closed");
    result
}

fn iterate(
    ctx: &mut Interpreter,
    mut local: Option<&mut Scope>,
    body: &[Word],
    depth: usize,
) -> LangResult<Option<Value>> {
    let mut returned = None;
    let mut iteration = 0usize;

    loop {
        let condition = ctx.loops.condition(depth);
        let outcome = evaluator::evaluate(ctx, local.as_deref_mut(), condition)?;
        let keep_going = match outcome.returned.or(outcome.value) {
            Some(value) => value.is_truthy(),
            None => {
                return Err(LangError::runtime(
                    "Loop condition evaluated to no value",
                ))
            }
        };
        if !keep_going {
            break;
        }

        iteration += 1;
        trace!(depth, iteration, "loop iteration");
        if let Some(value) = Parser::new(body).run(ctx, local.as_deref_mut())? {
            returned = Some(value);
        }
    }

    Ok(returned)
}
