use std::{collections::HashMap, rc::Rc};

use tracing::debug;

use crate::{
    error::{LangError, LangResult},
    interpreter::Interpreter,
    lexer::Word,
    parser::Parser,
    scope::Scope,
    value::Value,
};

/// Stack left before a call grows onto a fresh segment. One call cycle
/// (parse, evaluate, invoke) can take tens of kilobytes in debug builds.
const RED_ZONE: usize = 256 * 1024;
const STACK_PER_CALL: usize = 1024 * 1024;

/// A declared function: parameter names and the body words between `ngl` and
/// `GOAT`. The body is shared and never mutated; each call re-parses it.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<[Word]>,
}

impl FunctionDef {
    pub fn new(name: String, params: Vec<String>, body: Rc<[Word]>) -> Self {
        Self { name, params, body }
    }
}

#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Rc<FunctionDef>>,
}

impl FunctionRegistry {
    /// Redeclaring a name replaces the earlier definition.
    pub fn declare(&mut self, def: FunctionDef) {
        if self.functions.contains_key(&def.name) {
            debug!(function = %def.name, "redeclared");
        }
        self.functions.insert(def.name.clone(), Rc::new(def));
    }

    pub fn get(&self, name: &str) -> Option<Rc<FunctionDef>> {
        self.functions.get(name).cloned()
    }

    pub fn arity(&self, name: &str) -> Option<usize> {
        self.functions.get(name).map(|def| def.params.len())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Runs a function body in a fresh local scope. Lists in `args` still alias
/// the caller's lists.
#[tracing::instrument(level = "debug", skip(ctx, args))]
pub(crate) fn invoke(
    ctx: &mut Interpreter,
    name: &str,
    args: Vec<Value>,
) -> LangResult<Option<Value>> {
    let def = ctx
        .functions
        .get(name)
        .ok_or_else(|| LangError::reference(format!("Unknown function '{}'", name)))?;

    if def.params.len() != args.len() {
        return Err(LangError::arity(format!(
            "Function '{}' expects {} arguments ({}), found {}",
            name,
            def.params.len(),
            def.params.join(", "),
            args.len()
        )));
    }
    if ctx.call_depth >= ctx.max_call_depth {
        return Err(LangError::runtime(format!(
            "Maximum call depth of {} exceeded while calling '{}'",
            ctx.max_call_depth, name
        )));
    }

    let mut scope = Scope::new();
    for (param, value) in def.params.iter().zip(args) {
        scope.set(param.as_str(), value);
    }

    ctx.call_depth += 1;
    let result = stacker::maybe_grow(RED_ZONE, STACK_PER_CALL, || {
        Parser::new(&def.body).run(ctx, Some(&mut scope))
    });
    ctx.call_depth -= 1;

    debug!(returned = result.as_ref().map(|r| r.is_some()).unwrap_or(false), "call finished");
    result
}
