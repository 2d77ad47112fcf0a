use clap::Parser;
use std::collections::HashMap;
use std::process;
use zexpr::{Equation, Numeric, GLSL_COMPLEX};

#[derive(Parser)]
#[command(name = "zexpr")]
#[command(about = "Evaluate, differentiate and cross-compile complex-valued expressions")]
#[command(version)]
struct Args {
    /// Expression to process, e.g. "a*x*x + exp(-b*x)"
    expression: String,

    /// Variable binding as NAME=VALUE (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    set: Vec<String>,

    /// Print the parsed postfix sequence instead of evaluating
    #[arg(long)]
    rpn: bool,

    /// Emit GLSL source for the expression instead of evaluating
    #[arg(long)]
    emit_glsl: bool,

    /// Print the symbolic derivative with respect to a variable
    #[arg(long, value_name = "VARIABLE")]
    derive: Option<String>,
}

fn main() {
    let args = Args::parse();

    match run(&args) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<String, Box<dyn std::error::Error>> {
    let eq = Equation::new(args.expression.as_str())?;

    if args.rpn {
        return Ok(eq.rpn().to_string());
    }

    if args.emit_glsl {
        return Ok(eq.to_source_string(&GLSL_COMPLEX)?);
    }

    if let Some(variable) = &args.derive {
        return Ok(eq.derivative(variable)?.to_string());
    }

    let mut bindings = HashMap::new();
    for pair in &args.set {
        let (name, value) = pair
            .split_once('=')
            .ok_or("bindings must use NAME=VALUE form")?;
        bindings.insert(name.to_string(), Numeric::Real(value.parse()?));
    }

    let value = eq.eval(&bindings)?;
    Ok(value.to_string())
}
