use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use dnjs::interpreter::value::{Closure, Function, Value};
use dnjs::render;
use dnjs::{interpret_path, interpret_source, Module};

/// FILENAME is the dnjs file to be evaluated, or - for standard input.
/// Remaining ARGS are files passed in as arguments to the evaluated dnjs
/// if it is a function.
#[derive(Parser, Debug)]
#[command(name = "dnjs", version, about, long_about = None)]
struct Args {
    /// Pick an exported variable to return as opposed to the default.
    #[arg(long)]
    name: Option<String>,

    /// Indent outputted JSON.
    #[arg(long)]
    pretty: bool,

    /// Post process m(...) nodes to <html>.
    #[arg(long)]
    html: bool,

    /// Post process to css.
    #[arg(long)]
    css: bool,

    /// Post-process the output with another dnjs function, eg: 'd=>d.value'.
    #[arg(short, long)]
    process: Option<String>,

    /// Print value as literal.
    #[arg(long)]
    raw: bool,

    /// Print value as csv.
    #[arg(long)]
    csv: bool,

    filename: String,

    args: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let module = if args.filename == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("reading stdin")?;
        interpret_source(&source)?
    } else {
        interpret_path(Path::new(&args.filename))?
    };

    let mut value = select_value(&module, &args)?;

    let closure = match &value {
        Value::Function(Function::Closure(closure)) => Some(closure.clone()),
        _ => None,
    };
    if let Some(closure) = closure {
        value = call_with_argument_files(&closure, &args.args)?;
    } else if !args.args.is_empty() {
        bail!("too many arguments provided, try put them before the filename, or dnjs --help");
    }

    if args.html {
        print!("{}", render::to_html(&value)?);
        return Ok(());
    }
    if args.css {
        print!("{}", render::to_css(&value)?);
        return Ok(());
    }

    if let Some(process_source) = &args.process {
        value = post_process(process_source, value)?;
    }

    if args.csv {
        return print_csv(&value, args.raw);
    }
    if args.raw {
        println!("{}", rawify(&value)?);
        return Ok(());
    }

    println!("{}", to_json(&value, args.pretty)?);
    Ok(())
}

fn select_value(module: &Module, args: &Args) -> Result<Value> {
    match &args.name {
        Some(name) => module
            .exports
            .get(name)
            .cloned()
            .with_context(|| format!("module {} does not export {}", args.filename, name)),
        None => module
            .main_value()
            .cloned()
            .with_context(|| format!("{} has no default export", args.filename)),
    }
}

/// Each CLI argument is itself a dnjs file; its default export (or bare
/// value) is passed positionally to the selected function.
fn call_with_argument_files(closure: &Closure, paths: &[String]) -> Result<Value> {
    if paths.len() != closure.arity() {
        bail!(
            "function needs calling with {} argument(s), see dnjs --help",
            closure.arity()
        );
    }
    let mut call_args = Vec::with_capacity(paths.len());
    for path in paths {
        let argument = interpret_path(Path::new(path))?;
        call_args.push(
            argument
                .main_value()
                .cloned()
                .with_context(|| format!("{path} has no default export"))?,
        );
    }
    let node = closure.node.clone();
    Ok(closure.call(&node, call_args)?)
}

fn post_process(process_source: &str, value: Value) -> Result<Value> {
    let module = interpret_source(process_source)?;
    let Some(Value::Function(Function::Closure(f))) = module.value else {
        bail!("--process argument must be a dnjs function");
    };
    let node = f.node.clone();
    Ok(f.call(&node, vec![value])?)
}

fn print_csv(value: &Value, raw: bool) -> Result<()> {
    let Value::Array(rows) = value else {
        bail!("value cannot be converted to csv: {value:?}");
    };
    for row in rows {
        let Value::Array(cells) = row else {
            bail!("value cannot be converted to csv: {row:?}");
        };
        let rendered = cells
            .iter()
            .map(|cell| {
                if raw {
                    rawify(cell)
                } else {
                    Ok(serde_json::to_string(cell)?)
                }
            })
            .collect::<Result<Vec<_>>>()?;
        println!("{}", rendered.join(","));
    }
    Ok(())
}

/// Scalars print bare (strings unquoted); sequences and mappings print
/// as JSON.
fn rawify(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Str(s) => Ok(s.clone()),
        Value::Int(_) | Value::Float(_) => Ok(value.display_string()),
        Value::Array(_) | Value::Object(_) => Ok(serde_json::to_string(value)?),
        _ => bail!("unsupported type for --raw output: {value:?}"),
    }
}

fn to_json(value: &Value, pretty: bool) -> Result<String> {
    if !pretty {
        return Ok(serde_json::to_string(value)?);
    }
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8(buffer)?)
}
