mod demos;

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use fluffy::{EvalError, EvalOptions, Evaluator, FluffyError, List, Value, read_fluffy_toml};
use tracing::debug;

const DEFAULT_CONFIG: &str = "fluffy.toml";

fn trace_timing_enabled() -> bool {
    env::var("FLUFFY_TRACE_TIMING").is_ok_and(|v| v == "1")
}

macro_rules! timing_step {
    ($trace:expr, $label:expr, $block:expr) => {{
        let _t0 = if $trace { Some(Instant::now()) } else { None };
        let result = $block;
        if let Some(t0) = _t0 {
            eprintln!(
                "[FLUFFY_TIMING] {:40} {:>8.1}ms",
                $label,
                t0.elapsed().as_secs_f64() * 1000.0
            );
        }
        result
    }};
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), FluffyError> {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_help();
        return Ok(());
    };
    let rest: Vec<String> = args.collect();

    match command.as_str() {
        "-h" | "--help" | "help" => {
            print_help();
            Ok(())
        }
        "-V" | "--version" | "version" => {
            println!("fluffy {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "demos" => {
            cmd_demos();
            Ok(())
        }
        "run" => cmd_run(&rest),
        "range" => cmd_range(&rest),
        other => Err(FluffyError::InvalidCommand(format!(
            "unknown command `{other}`, see `fluffy --help`"
        ))),
    }
}

fn print_help() {
    println!(
        "fluffy {}\n\nUSAGE:\n  fluffy <COMMAND>\n\nCOMMANDS:\n  demos\n  run <demo> [args...] [--json] [--config <path>] [--env <value>]\n  range <start> [second] <end>\n\n  -h, --help\n  -V, --version\n\nENVIRONMENT:\n  FLUFFY_TRACE_TIMING=1  print command timings to stderr",
        env!("CARGO_PKG_VERSION")
    );
}

fn cmd_demos() {
    for demo in demos::DEMOS {
        println!("{:10} {:10} {}", demo.name, demo.monad.name(), demo.summary);
    }
}

#[derive(Debug, Default, PartialEq)]
struct RunFlags {
    json: bool,
    config: Option<PathBuf>,
    env: Option<String>,
    positional: Vec<String>,
}

fn parse_run_flags(args: &[String]) -> Result<RunFlags, FluffyError> {
    let mut flags = RunFlags::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => flags.json = true,
            "--config" => flags.config = Some(PathBuf::from(flag_value(&mut iter, "--config")?)),
            "--env" => flags.env = Some(flag_value(&mut iter, "--env")?),
            _ => flags.positional.push(arg.clone()),
        }
    }
    Ok(flags)
}

fn flag_value<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<String, FluffyError> {
    iter.next()
        .cloned()
        .ok_or_else(|| FluffyError::InvalidCommand(format!("{flag} expects a value")))
}

/// `--config` wins; otherwise `./fluffy.toml` is used when present.
fn load_options(config: Option<&Path>) -> Result<EvalOptions, FluffyError> {
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG);
            if !default.is_file() {
                return Ok(EvalOptions::default());
            }
            default
        }
    };
    let config = read_fluffy_toml(&path)?;
    debug!(path = %path.display(), options = ?config.eval, "loaded config");
    Ok(config.eval)
}

/// Integers, then floats, then booleans; anything else is text.
fn parse_value(arg: &str) -> Value {
    if let Ok(value) = arg.parse::<i64>() {
        return Value::Int(value);
    }
    if let Ok(value) = arg.parse::<f64>() {
        return Value::Float(value);
    }
    match arg {
        "true" | "True" => Value::Bool(true),
        "false" | "False" => Value::Bool(false),
        _ => Value::text(arg),
    }
}

fn cmd_run(args: &[String]) -> Result<(), FluffyError> {
    let trace = trace_timing_enabled();
    let flags = parse_run_flags(args)?;
    let Some((name, rest)) = flags.positional.split_first() else {
        print_help();
        return Ok(());
    };
    let demo = demos::find(name).ok_or_else(|| {
        FluffyError::InvalidCommand(format!("unknown demo `{name}`, see `fluffy demos`"))
    })?;
    let options = timing_step!(trace, "load config", load_options(flags.config.as_deref()))?;
    let sequence = timing_step!(trace, "build sequence", demo.sequence())?;
    let arguments = rest.iter().map(|arg| parse_value(arg)).collect();
    let evaluator = Evaluator::new(options);
    let mut result = timing_step!(
        trace,
        format!("evaluate {name}"),
        evaluator.evaluate(&sequence, demo.monad, arguments)
    )?;
    if let Value::Function(_) = result {
        let env = flags.env.as_deref().map_or(Value::Unit, parse_value);
        result = timing_step!(trace, "run reader", result.run_reader(env))?;
    }
    print_value(&result, flags.json)
}

fn cmd_range(args: &[String]) -> Result<(), FluffyError> {
    let bounds = args
        .iter()
        .map(|arg| {
            arg.parse::<i64>().map_err(|_| {
                FluffyError::InvalidCommand(format!("range bound `{arg}` is not an integer"))
            })
        })
        .collect::<Result<Vec<i64>, FluffyError>>()?;
    let list = match bounds.as_slice() {
        [start, end] => List::range(*start, *end),
        [start, second, end] => {
            List::progression(*start, *second, *end).map_err(EvalError::from)?
        }
        _ => {
            return Err(FluffyError::InvalidCommand(
                "usage: fluffy range <start> [second] <end>".to_string(),
            ));
        }
    };
    println!("{list}");
    Ok(())
}

fn print_value(value: &Value, json: bool) -> Result<(), FluffyError> {
    if json {
        let output = serde_json::to_string_pretty(value)
            .map_err(|err| FluffyError::Io(io::Error::other(err)))?;
        println!("{output}");
    } else {
        println!("{value}");
    }
    Ok(())
}
