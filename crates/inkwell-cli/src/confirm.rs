//! Interactive confirmation gating destructive commands.
//!
//! The core never blocks on user input; this capability lives entirely in
//! the CLI and is bypassed with `--yes`.

use std::io::{self, BufRead, Write};

/// Capability to ask the operator a yes/no question.
pub trait Confirmer {
    fn ask(&self, prompt: &str) -> bool;
}

/// Reads the answer from stdin.
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn ask(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Always answers yes; used for `--yes`.
pub struct AlwaysConfirm;

impl Confirmer for AlwaysConfirm {
    fn ask(&self, _prompt: &str) -> bool {
        true
    }
}
