//! `REF a, b DO SOMETHING` resolution against the standard and user library
//! roots. Each module runs once per interpreter, in the global scope.

use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;
use walkdir::WalkDir;

use crate::{
    config::{Config, MODULE_EXTENSION},
    error::{LangError, LangResult, Location},
    interpreter::Interpreter,
    keyword::Keyword,
    lexer::{Lexer, Word},
    parser::Parser,
};

/// One library directory and the modules found directly inside it.
#[derive(Debug)]
struct LibraryRoot {
    dir: PathBuf,
    modules: BTreeMap<String, PathBuf>,
}

impl LibraryRoot {
    /// A missing directory is an empty library.
    fn discover(dir: &Path) -> Self {
        let modules = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|entry| {
                let path = entry.into_path();
                if path.extension().and_then(|ext| ext.to_str()) != Some(MODULE_EXTENSION) {
                    return None;
                }
                let stem = path.file_stem()?.to_str()?.to_string();
                Some((stem, path))
            })
            .collect();
        Self {
            dir: dir.to_path_buf(),
            modules,
        }
    }
}

#[derive(Debug)]
pub struct ModuleLoader {
    stdlib: LibraryRoot,
    userlib: LibraryRoot,
    loaded: HashSet<String>,
    loading: HashSet<String>,
}

impl ModuleLoader {
    pub fn new(config: &Config) -> Self {
        let stdlib = LibraryRoot::discover(&config.stdlib_dir);
        let userlib = LibraryRoot::discover(&config.userlib_dir);
        debug!(
            stdlib = %stdlib.dir.display(),
            stdlib_modules = stdlib.modules.len(),
            userlib = %userlib.dir.display(),
            userlib_modules = userlib.modules.len(),
            "library roots discovered"
        );
        Self {
            stdlib,
            userlib,
            loaded: HashSet::new(),
            loading: HashSet::new(),
        }
    }

    /// The file a module name refers to. Names are only ever looked up among
    /// discovered files, never joined onto a path.
    pub fn resolve(&self, name: &str) -> LangResult<&Path> {
        match (self.stdlib.modules.get(name), self.userlib.modules.get(name)) {
            (Some(path), None) | (None, Some(path)) => Ok(path.as_path()),
            (Some(_), Some(_)) => Err(LangError::import(format!(
                "Module '{}' exists in both {} and {}",
                name,
                self.stdlib.dir.display(),
                self.userlib.dir.display()
            ))),
            (None, None) => Err(LangError::import(format!(
                "Failed to load module '{}': it is neither in the stdlib ({}) nor the userlib ({})",
                name,
                self.stdlib.dir.display(),
                self.userlib.dir.display()
            ))),
        }
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains(name)
    }

    /// Resolves every `REF` directive in a program before anything runs, so
    /// a missing module aborts the run up front. Comments and string literals
    /// are passed over; malformed directives are left for the parser.
    pub fn check_imports(&self, words: &[Word]) -> LangResult<()> {
        let mut pos = 0;
        while let Some(word) = words.get(pos) {
            pos += 1;
            match Keyword::from_word(&word.text) {
                Some(Keyword::CommentOpen) => pos = skip_past(words, pos, Keyword::CommentClose),
                Some(Keyword::StringOpen) => pos = skip_past(words, pos, Keyword::StringClose),
                Some(Keyword::ImportOpen) => {
                    if let Ok((names, next)) = read_directive(words, pos) {
                        for name in &names {
                            self.resolve(name)
                                .map_err(|e| e.at(Location::new(0, word.line)))?;
                        }
                        pos = next;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn skip_past(words: &[Word], from: usize, close: Keyword) -> usize {
    words[from.min(words.len())..]
        .iter()
        .position(|w| Keyword::from_word(&w.text) == Some(close))
        .map(|offset| from + offset + 1)
        .unwrap_or(words.len())
}

/// Reads the names of a directive whose `REF` sits just before `start`.
/// Returns the names and the position after `SOMETHING`.
pub fn read_directive(words: &[Word], start: usize) -> LangResult<(Vec<String>, usize)> {
    let mut names = Vec::new();
    let mut pos = start;
    loop {
        let word = words.get(pos).ok_or_else(|| {
            LangError::parse("Import directive is never closed with DO SOMETHING")
        })?;
        pos += 1;
        if Keyword::from_word(&word.text) == Some(Keyword::ImportDo) {
            break;
        }
        names.extend(
            word.text
                .split(',')
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        );
    }

    match words.get(pos) {
        Some(word) if Keyword::from_word(&word.text) == Some(Keyword::ImportSomething) => {
            Ok((names, pos + 1))
        }
        _ => Err(LangError::parse(
            "Failed to correctly import modules. Are you closing with DO SOMETHING?",
        )),
    }
}

/// Runs a module's statements in the global scope unless it already ran.
pub(crate) fn load_module(ctx: &mut Interpreter, name: &str) -> LangResult<()> {
    if ctx.loader.is_loaded(name) {
        debug!(module = name, "already loaded");
        return Ok(());
    }
    if ctx.loader.loading.contains(name) {
        return Err(LangError::import(format!(
            "Import cycle detected involving module '{}'",
            name
        )));
    }

    let path = ctx.loader.resolve(name)?.to_path_buf();
    let source = fs::read_to_string(&path).map_err(|e| {
        LangError::import(format!(
            "Failed to read module '{}' ({}): {}",
            name,
            path.display(),
            e
        ))
    })?;
    let words = Lexer::new(&source).lex();

    debug!(module = name, path = %path.display(), words = words.len(), "loading module");
    ctx.loader.loading.insert(name.to_string());
    let result = Parser::top_level(&words).run(ctx, None);
    ctx.loader.loading.remove(name);
    result.map_err(|e| e.in_module(name))?;

    ctx.loader.loaded.insert(name.to_string());
    Ok(())
}
