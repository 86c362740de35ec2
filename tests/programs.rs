use std::{fs, io, path::Path};

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tspmo_lang::{run_file, Config, Interpreter, LangError, LangResult, SharedBuffer, Value};
use walkdir::WalkDir;

fn run_with(config: Config, input: &str, source: &str) -> (Interpreter, SharedBuffer, LangResult<()>) {
    let output = SharedBuffer::new();
    let mut interpreter = Interpreter::with_io(
        config,
        Box::new(io::Cursor::new(input.to_string())),
        Box::new(output.clone()),
    );
    let result = interpreter.run_source(source);
    (interpreter, output, result)
}

fn run(source: &str) -> LangResult<(Interpreter, String)> {
    let (interpreter, output, result) = run_with(Config::default(), "", source);
    result?;
    Ok((interpreter, output.contents()))
}

#[test]
fn assignment_then_print() -> LangResult<()> {
    let (_, output) = run("ts rizz x tun tun sahur pmo ts yap x pmo")?;
    assert_eq!(output, "tun tun sahur (1)\n");
    Ok(())
}

#[test]
fn printed_literals_are_valid_programs() -> LangResult<()> {
    let values = [
        Value::Integer(0),
        Value::Integer(4),
        Value::Integer(-12),
        Value::Float(1.5),
        Value::Boolean(false),
        Value::String("hello there".into()),
    ];
    for value in values {
        let (interpreter, _) = run(&format!("ts rizz v {} pmo", value.literal()))?;
        let bound = interpreter.global("v").expect("v should be bound");
        assert_eq!(bound.type_name(), value.type_name());
        assert!(bound.loose_eq(&value), "{:?} != {:?}", bound, value);
    }
    Ok(())
}

#[test]
fn counter_loop_runs_three_times() -> LangResult<()> {
    let source = "
        ts rizz counter tun sahur pmo
        ts rizz runs tun sahur pmo
        -> while 3 > counter <-
        ts sybau mogs tun tun tun tun sahur counter yo pmo
        ts kid pmo
            ts rizz runs touch runs tun tun sahur pmo
            ts rizz counter touch counter tun tun sahur pmo
        ts gurt pmo
        ts yap runs pmo
    ";
    let (_, output) = run(source)?;
    assert_eq!(output, "tun tun tun tun sahur (3)\n");
    Ok(())
}

#[test]
fn loop_condition_may_be_written_with_dih() -> LangResult<()> {
    let source = "
        ts rizz n tun tun tun sahur pmo
        ts dih n yo pmo
        ts kid pmo
            ts rizz n #shrink n tun tun sahur pmo
        ts gurt pmo
        ts yap n pmo
    ";
    let (_, output) = run(source)?;
    assert_eq!(output, "tun sahur (0)\n");
    Ok(())
}

#[test]
fn or_of_zero_and_five_is_five() -> LangResult<()> {
    let (_, output) = run("ts yap chill tun sahur tun tun tun tun tun tun sahur pmo")?;
    assert_eq!(output, "tun tun tun tun tun tun sahur (5)\n");
    Ok(())
}

#[test]
fn two_parameter_function_gets_a_fresh_scope() -> LangResult<()> {
    let source = "
        ts rizz a legit outer bro pmo
        ts rizz word legit hi bro pmo
        LEBRON show a b ngl
            ts yap a pmo
            ts yap b pmo
            ts rizz a touch a tun tun sahur pmo
            ts dih a pmo
        GOAT
        ts rizz r show 1 word pmo
        ts yap r pmo
        ts yap a pmo
    ";
    let (_, output) = run(source)?;
    assert_eq!(
        output,
        "tun tun sahur (1)\nlegit hi bro (hi)\ntun tun tun sahur (2)\nlegit outer bro (outer)\n"
    );
    Ok(())
}

#[test]
fn skipped_branch_may_mention_undefined_names() -> LangResult<()> {
    let source = "
        ts hawk mogs tun tun sahur tun sahur pmo
        ts lion pmo ts yap legit taken bro pmo ts fr pmo
        ts tiger pmo ts yap nowhere pmo ts sybau nothing_here pmo ts fr pmo
        ts ong pmo
    ";
    let (interpreter, output) = run(source)?;
    assert_eq!(output, "legit taken bro (taken)\n");
    assert_eq!(interpreter.flag_depth(), 0);
    Ok(())
}

#[test]
fn lists_and_strings() -> LangResult<()> {
    let source = "
        ts rizz words BOOM legit the quick fox bro pmo
        ts yap girth words pmo
        ts pt words tun sahur legit a bro pmo
        ts sybau ad words legit jumps bro pmo
        ts yap stroke gt words tun sahur gt words spill legit -1 bro pmo
        ts sybau rm words pmo
        ts yap words pmo
    ";
    let (_, output) = run(source)?;
    assert_eq!(
        output,
        "tun tun tun tun sahur (3)\nlegit ajumps bro (ajumps)\nls [\"a\", \"quick\", \"fox\"] ([\"a\", \"quick\", \"fox\"])\n"
    );
    Ok(())
}

#[test]
fn input_is_read_line_by_line() -> LangResult<()> {
    let source = "
        ts rizz name chat? legit who? bro pmo
        ts rizz age spill chat? legit age? bro pmo
        ts yap name pmo
        ts yap touch age tun tun sahur pmo
    ";
    let (_, output, result) = run_with(Config::default(), "Ada\n36\n", source);
    result?;
    assert_eq!(
        output.contents(),
        format!("who?age?legit Ada bro (Ada)\n{} (37)\n", tspmo_lang::value::encode_integer(37))
    );
    Ok(())
}

#[test]
fn missing_module_stops_the_program_before_it_starts() -> io::Result<()> {
    let (stdlib, userlib) = (tempfile::tempdir()?, tempfile::tempdir()?);
    let config = Config::default()
        .with_stdlib_dir(stdlib.path())
        .with_userlib_dir(userlib.path());
    let source = "ts yap legit started bro pmo REF nowhere DO SOMETHING";
    let (interpreter, output, result) = run_with(config, "", source);

    assert!(matches!(result, Err(LangError::Import(_, _))));
    assert_eq!(output.contents(), "");
    assert_eq!(interpreter.statements_run(), 0);
    Ok(())
}

#[test]
fn user_modules_share_the_global_scope() -> Result<(), Box<dyn std::error::Error>> {
    let (stdlib, userlib) = (tempfile::tempdir()?, tempfile::tempdir()?);
    fs::write(
        userlib.path().join("greet.pmo"),
        "ts rizz greeting legit hello bro pmo\nLEBRON twice x ngl ts dih cavendish x tun tun tun sahur pmo GOAT\n",
    )?;
    let config = Config::default()
        .with_stdlib_dir(stdlib.path())
        .with_userlib_dir(userlib.path());
    let source = "REF greet DO SOMETHING ts yap greeting pmo ts yap twice 4 pmo";
    let (_, output, result) = run_with(config, "", source);
    result?;
    assert_eq!(
        output.contents(),
        format!("legit hello bro (hello)\n{} (8)\n", tspmo_lang::value::encode_integer(8))
    );
    Ok(())
}

#[test]
fn errors_inside_modules_name_the_module() -> Result<(), Box<dyn std::error::Error>> {
    let (stdlib, userlib) = (tempfile::tempdir()?, tempfile::tempdir()?);
    fs::write(userlib.path().join("broken.pmo"), "ts yap missing pmo")?;
    let config = Config::default()
        .with_stdlib_dir(stdlib.path())
        .with_userlib_dir(userlib.path());
    let (_, _, result) = run_with(config, "", "REF broken DO SOMETHING");
    match result {
        Err(LangError::Reference(message, Some(_))) => {
            assert!(message.starts_with("in module 'broken': "), "{}", message)
        }
        other => panic!("expected reference error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn bundled_math_module() -> LangResult<()> {
    let source = "
        REF math DO SOMETHING
        ts rizz five tun tun tun tun tun tun sahur pmo
        ts rizz neg spill legit -7 bro pmo
        ts yap factorial five pmo
        ts yap pow 2 five pmo
        ts yap abs neg pmo
        ts yap max neg five pmo
        ts yap even five pmo
    ";
    let (_, output) = run(source)?;
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec![
            format!("{} (120)", tspmo_lang::value::encode_integer(120)).as_str(),
            format!("{} (32)", tspmo_lang::value::encode_integer(32)).as_str(),
            "tun tun tun tun tun tun tun tun sahur (7)",
            "tun tun tun tun tun tun sahur (5)",
            "beta (false)",
        ]
    );
    Ok(())
}

#[test]
fn bundled_lists_module() -> LangResult<()> {
    let source = "
        REF lists, math DO SOMETHING
        ts rizz xs range 4 pmo
        ts rizz total sum xs pmo
        ts rizz flipped reverse xs pmo
        ts rizz end last flipped pmo
        ts rizz needle tun tun tun sahur pmo
        ts rizz has contains xs needle pmo
    ";
    let (interpreter, _) = run(source)?;
    assert!(matches!(interpreter.global("total"), Some(Value::Integer(6))));
    assert!(matches!(interpreter.global("end"), Some(Value::Integer(0))));
    assert!(matches!(interpreter.global("has"), Some(Value::Boolean(true))));
    match interpreter.global("flipped") {
        Some(list) => assert_eq!(list.to_string(), "[3, 2, 1, 0]"),
        None => panic!("flipped should be bound"),
    }
    Ok(())
}

#[test]
fn run_file_reports_missing_source() {
    let missing = Path::new("definitely/not/a/program.pmo");
    match run_file(missing, &Config::for_program(missing)) {
        Err(LangError::Runtime(message, None)) => assert!(message.contains("not found")),
        other => panic!("expected runtime error, got {:?}", other),
    }
}

#[test]
fn run_file_reads_the_program() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let program = dir.path().join("main.pmo");
    fs::write(&program, "ts rizz x tun sahur pmo")?;
    run_file(&program, &Config::for_program(&program))?;
    Ok(())
}

#[test]
fn demo_programs_run() -> Result<(), Box<dyn std::error::Error>> {
    let mut count = 0;
    for entry in WalkDir::new("demos")
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "pmo"))
    {
        let path = entry.path();
        let source = fs::read_to_string(path)?;
        let config = Config::for_program(path);
        let (_, _, result) = run_with(config, "", &source);
        if let Err(e) = result {
            panic!("demo {:?} failed: {}", path, e);
        }
        count += 1;
    }
    assert!(count > 0, "no demo programs found in demos/");
    Ok(())
}
