//! Command dispatch for the interactive nonassociative-algebra REPL.
//!
//! Kept as a library, separate from `main.rs`'s stdin loop and Ctrl-C
//! wiring, so the command grammar is unit-testable without a terminal.

use algebra::driver::BuildProgress;
use algebra::Engine;
use anyhow::{bail, Context};

pub struct Repl {
    pub engine: Engine,
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

impl Repl {
    pub fn new() -> Self {
        Self { engine: Engine::new() }
    }

    /// Run one command line, returning the text to print (possibly empty).
    /// Mirrors `ext::utils`'s command-handler pattern: parse, dispatch,
    /// wrap errors with `anyhow::Context` naming the command that failed.
    pub fn dispatch(&mut self, line: &str) -> anyhow::Result<String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(String::new());
        }
        let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match cmd {
            "set_field" => {
                let p: u32 = rest.parse().context("set_field expects a prime number")?;
                self.engine.set_field(p).context("set_field")?;
                Ok(format!("field set to GF({p})"))
            }
            "set_generators" => {
                if rest.is_empty() {
                    bail!("set_generators expects a generator word, e.g. `3a2b2c`");
                }
                self.engine.set_generators(rest).context("set_generators")?;
                Ok(format!("generators set: {rest}"))
            }
            "add_identity" => {
                let (name, body) = rest.split_once(char::is_whitespace).context("add_identity expects <name> <expression>")?;
                self.engine.add_identity(name, body.trim()).context("add_identity")?;
                Ok(format!("identity `{name}` added"))
            }
            "remove_identity" => {
                self.engine.remove_identity(rest).context("remove_identity")?;
                Ok(format!("identity `{rest}` removed"))
            }
            "remove_all" => {
                self.engine.remove_all_identities();
                Ok("all identities removed".to_string())
            }
            "list_identities" => {
                let names = self.engine.identity_names();
                if names.is_empty() {
                    Ok("(no identities declared)".to_string())
                } else {
                    Ok(names.join("\n"))
                }
            }
            "build" => {
                let max_degree: u32 = rest.parse().context("build expects a maximum degree")?;
                eprintln!("Degree    Current Dimension   Elapsed Time(in seconds)");
                let mut last: Option<BuildProgress> = None;
                self.engine
                    .build(max_degree, |p| {
                        eprint!("{}", format_progress(&p));
                        last = Some(p);
                    })
                    .map_err(|e| anyhow::anyhow!(e.to_string()))
                    .context("build")?;
                eprintln!("Build completed. {}", format_density(last.as_ref()));
                Ok(format!("built up to degree {max_degree}"))
            }
            "is_identity" => {
                let holds = self.engine.is_identity(rest).context("is_identity")?;
                Ok(holds.to_string())
            }
            "expand" => {
                let v = self.engine.expand(rest).context("expand")?;
                Ok(format_alg_element(&v))
            }
            "view_basis" => {
                let degree: u32 = rest.parse().context("view_basis expects a degree")?;
                let elements = self.engine.view_basis(degree);
                if elements.is_empty() {
                    Ok(format!("(no basis elements at degree {degree})"))
                } else {
                    Ok(elements
                        .into_iter()
                        .map(|(b, e)| format!("{b}: {:?}", e.kind))
                        .collect::<Vec<_>>()
                        .join("\n"))
                }
            }
            "view_mult" => {
                let mut parts = rest.split_whitespace();
                let i: u32 = parts.next().context("view_mult expects two basis indices")?.parse()?;
                let j: u32 = parts.next().context("view_mult expects two basis indices")?.parse()?;
                let product = self.engine.view_mult(algebra::basis::Basis(i), algebra::basis::Basis(j));
                Ok(format_alg_element(&product))
            }
            "help" => Ok(HELP_TEXT.to_string()),
            _ => bail!("unknown command `{cmd}` (type `help` for a list)"),
        }
    }
}

fn format_progress(p: &BuildProgress) -> String {
    format!(
        "{:<10}{:<21}{:.2}\n",
        p.degree,
        p.current_dimension,
        p.elapsed.as_secs_f64()
    )
}

/// Mirrors `Build.c`'s end-of-build `"Last Matrix NN.NN%% dense."` line,
/// reported for the final degree/type the driver processed.
fn format_density(last: Option<&BuildProgress>) -> String {
    match last {
        Some(p) if p.cols > 0 => {
            let density = 100.0 * p.rows as f64 / p.cols as f64;
            format!("Last matrix {density:.2}% dense.")
        }
        _ => "Last matrix 0.00% dense.".to_string(),
    }
}

fn format_alg_element(v: &fp::SparseVec) -> String {
    if v.is_zero() {
        return "0".to_string();
    }
    v.iter_nonzero()
        .map(|(b, c)| format!("{c}*b{b}"))
        .collect::<Vec<_>>()
        .join(" + ")
}

const HELP_TEXT: &str = "\
Commands:
  set_field <p>                 set the ground field GF(p)
  set_generators <word>         declare generators with multiplicities, e.g. 3a2b2c
  add_identity <name> <expr>    add a defining identity, e.g. xy=yx or [x,y]
  remove_identity <name>        remove a previously added identity
  remove_all                    remove every identity
  list_identities                list declared identity names
  build <max_degree>             grow the basis up through <max_degree>
  is_identity <expr>              check whether an identity holds so far
  expand <expr>                   evaluate an algebra-element expression
  view_basis <degree>             list basis elements at a degree
  view_mult <i> <j>                show the product of two basis elements
  help                             show this text";
