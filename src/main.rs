//! Interactive REPL entry point.
//!
//! Installs a SIGINT handler that flips the engine's cancellation flag
//! rather than terminating the process outright, so a long `build` can be
//! interrupted cleanly and the REPL keeps running afterward.

use albert::Repl;
use anyhow::Context;
use std::io::{self, BufRead, Write};
use std::sync::atomic::Ordering;

fn main() -> anyhow::Result<()> {
    let mut repl = Repl::new();
    let cancel = repl.engine.cancellation_token();
    ctrlc::set_handler(move || {
        cancel.store(true, Ordering::Relaxed);
    })
    .context("failed to install SIGINT handler")?;

    println!("albert: interactive nonassociative-algebra build engine");
    println!("type `help` for a list of commands, `quit` to exit");

    let stdin = io::stdin();
    loop {
        print!("albert> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed == "quit" || trimmed == "exit" {
            break;
        }
        match repl.dispatch(trimmed) {
            Ok(output) => {
                if !output.is_empty() {
                    println!("{output}");
                }
            }
            Err(e) => eprintln!("error: {e:#}"),
        }
    }
    Ok(())
}
