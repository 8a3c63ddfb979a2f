use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use schemer::Error;
use schemer::ast::{Function, Value};
use schemer::evaluator::{self, Environment, create_global_env};
use schemer::reader::{ReadConfig, Reader};
use std::panic;
use std::process;
use std::rc::Rc;

fn main() {
    let result = panic::catch_unwind(|| {
        run_repl();
    });

    if let Err(panic_info) = result {
        eprintln!("The REPL encountered an unexpected error and must exit.");

        if let Some(msg) = panic_info.downcast_ref::<&str>() {
            eprintln!("Error: {msg}");
        } else if let Some(msg) = panic_info.downcast_ref::<String>() {
            eprintln!("Error: {msg}");
        } else {
            eprintln!("Error: Unknown panic occurred");
        }

        process::exit(1);
    }
}

fn run_repl() {
    println!("Schemer - minimal Scheme interpreter");
    println!("Enter S-expressions like: (+ 1 2)");
    println!("Type :help for more commands, or Ctrl+C to exit.");
    println!();

    let mut rl = DefaultEditor::new().expect("Could not initialize REPL");
    let env = create_global_env();

    // Callable from user code as (help)
    env.register_primitive("help", help_primitive);

    let config = ReadConfig {
        handle_comments: true,
    };

    loop {
        match rl.readline("schemer> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Handle special commands
                match line {
                    ":help" => {
                        print_help();
                        continue;
                    }
                    ":env" => {
                        print_environment(&env);
                        continue;
                    }
                    ":quit" | ":exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {}
                }

                // A line may hold several top-level forms; read and
                // evaluate each in order, stopping the line on error.
                let mut forms = Reader::with_config(line, config);
                while !forms.at_eof() {
                    match forms.read().and_then(|expr| evaluator::eval(&expr, &env)) {
                        Ok(result) => println!("{result}"),
                        Err(e) => {
                            println!("Error: {e}");
                            break;
                        }
                    }
                }
            }

            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }
}

fn help_primitive(_args: &[Value]) -> Result<Value, Error> {
    print_help();
    Ok(Value::Nil)
}

fn print_help() {
    println!("Schemer - minimal Scheme interpreter:");
    println!("  :help      - Show this help message");
    println!("  :env       - Show current environment bindings");
    println!("  :quit      - Exit the interpreter");
    println!("  :exit      - Exit the interpreter");
    println!("  Ctrl+C     - Exit the interpreter");
    println!();
    println!("Supported syntax:");
    println!("  Integers: 42, -5");
    println!("  Booleans: #t, #f");
    println!("  Lists: (1 2 3), quoted with (quote (1 2 3))");
    println!("  Special forms: quote, and, or, if, define, lambda");
    println!("  Primitives: + - * abs < > <= >= = car cdr cons list null? eq? not");
    println!();
    println!("Examples:");
    println!("  (+ 1 2 3)");
    println!("  (define square (lambda (x) (* x x)))");
    println!("  (square 7)");
    println!("  (if (< 1 2) (quote yes) (quote no))");
    println!();
}

fn print_environment(env: &Rc<Environment>) {
    let bindings = env.get_all_bindings();

    if bindings.is_empty() {
        println!("Environment is empty.");
        return;
    }

    println!("Environment bindings ({} total):", bindings.len());
    println!();

    // Separate primitives from user-defined values
    let mut primitives = Vec::new();
    let mut user_defined = Vec::new();

    for (name, value) in bindings {
        match &value {
            Value::Function(function) if matches!(function.as_ref(), Function::Primitive { .. }) => {
                primitives.push(name);
            }
            _ => user_defined.push((name, value)),
        }
    }

    if !primitives.is_empty() {
        println!("Primitives ({}):", primitives.len());
        // Print in columns for readability
        let mut col = 0;
        for name in primitives {
            print!("  {name:<15}");
            col += 1;
            if col % 4 == 0 {
                println!();
            }
        }
        if col % 4 != 0 {
            println!();
        }
        println!();
    }

    if !user_defined.is_empty() {
        println!("User-defined values ({}):", user_defined.len());
        for (name, value) in user_defined {
            println!("  {name} = {value}");
        }
    }
}
