//! Python pattern simulator.
//!
//! Not an interpreter. The simulator scans the source line by line for one
//! recognizable idiom — a `print(...)` call — and synthesizes what a real
//! interpreter would have printed for literal arguments only. Everything
//! else becomes an opaque placeholder, never an evaluated value.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::exec::traits::ExecutionStrategy;
use crate::exec::ExecutionResult;

fn print_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*print\s*\((.*)\)\s*(?:#.*)?$").unwrap())
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap())
}

/// Synthesized output for one `print(...)` argument.
fn render_argument(arg: &str) -> String {
    let arg = arg.trim();
    if let Some(literal) = string_literal(arg) {
        return literal.to_string();
    }
    if arg.parse::<f64>().is_ok() {
        return arg.to_string();
    }
    if identifier_re().is_match(arg) {
        return format!("[Variable: {arg}]");
    }
    format!("[Expression: {arg}]")
}

/// The inner text of a plain single- or double-quoted string literal, if
/// the argument is exactly one.
fn string_literal(arg: &str) -> Option<&str> {
    for quote in ['"', '\''] {
        if arg.len() >= 2 && arg.starts_with(quote) && arg.ends_with(quote) {
            let inner = &arg[1..arg.len() - 1];
            if !inner.contains(quote) {
                return Some(inner);
            }
        }
    }
    None
}

pub struct PythonSimulator;

impl PythonSimulator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PythonSimulator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionStrategy for PythonSimulator {
    fn name(&self) -> &str {
        "python-sim"
    }

    fn disclaimer(&self) -> Option<&str> {
        Some("Simulated Python execution (pattern-based, not a real interpreter)")
    }

    async fn run(&self, content: &str, _budget: Duration) -> ExecutionResult {
        let mut output = String::new();
        for line in content.lines() {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let Some(caps) = print_re().captures(line) {
                output.push_str(&render_argument(&caps[1]));
                output.push('\n');
            }
            // Lines that are not print calls produce no output
        }
        ExecutionResult::ok(output)
    }
}
