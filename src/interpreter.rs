use std::{
    io::{self, BufRead, Write},
    rc::Rc,
};

use tracing::debug;

use crate::{
    config::Config,
    control::{FlagStack, LoopTemplates},
    error::LangResult,
    function::{FunctionDef, FunctionRegistry},
    lexer::Lexer,
    loader::ModuleLoader,
    parser::Parser,
    scope::Scope,
    value::Value,
};

/// Everything one run owns. Passed by `&mut` through every parser, evaluator
/// and invocation, so separate runs never share state.
pub struct Interpreter {
    pub(crate) globals: Scope,
    pub(crate) functions: FunctionRegistry,
    pub(crate) flags: FlagStack,
    pub(crate) loops: LoopTemplates,
    pub(crate) loader: ModuleLoader,
    pub(crate) statements: usize,
    pub(crate) call_depth: usize,
    pub(crate) max_call_depth: usize,
    pub(crate) output: Box<dyn Write>,
    pub(crate) input: Box<dyn BufRead>,
}

impl Interpreter {
    /// Reads `chat?` input from stdin and prints to stdout.
    pub fn new(config: Config) -> Self {
        Self::with_io(
            config,
            Box::new(io::BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        )
    }

    pub fn with_io(config: Config, input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        Self {
            globals: Scope::new(),
            functions: FunctionRegistry::default(),
            flags: FlagStack::default(),
            loops: LoopTemplates::default(),
            loader: ModuleLoader::new(&config),
            statements: 0,
            call_depth: 0,
            max_call_depth: config.max_call_depth,
            output,
            input,
        }
    }

    /// Runs a whole program. Imports are resolved before the first statement.
    pub fn run_source(&mut self, source: &str) -> LangResult<()> {
        let words = Lexer::new(source).lex();
        debug!(words = words.len(), "program lexed");
        self.loader.check_imports(&words)?;

        let result = Parser::top_level(&words).run(self, None);
        self.output.flush()?;
        result.map(|_| ())
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn function(&self, name: &str) -> Option<Rc<FunctionDef>> {
        self.functions.get(name)
    }

    /// Branch flags still waiting for their `ong`.
    pub fn flag_depth(&self) -> usize {
        self.flags.len()
    }

    pub fn statements_run(&self) -> usize {
        self.statements
    }
}
