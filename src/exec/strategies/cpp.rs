//! C++ pattern simulator.
//!
//! Like the Python simulator, this is a lexical scanner, not a compiler.
//! The one idiom it understands is a `cout <<` insertion chain on a single
//! line; string and numeric literals print as a real program would,
//! `endl` breaks the line, and anything else is echoed as a placeholder.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::exec::traits::ExecutionStrategy;
use crate::exec::ExecutionResult;

fn cout_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:std\s*::\s*)?cout\s*<<\s*(.*?);?\s*$").unwrap())
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap())
}

/// Minimal escape handling for recognized string literals.
fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Append one `<<` segment to the line buffer.
fn render_segment(segment: &str, output: &mut String) {
    let segment = segment.trim();
    if segment.is_empty() {
        return;
    }
    if segment == "endl" || segment == "std::endl" {
        output.push('\n');
        return;
    }
    if segment.len() >= 2 && segment.starts_with('"') && segment.ends_with('"') {
        let inner = &segment[1..segment.len() - 1];
        if !inner.contains('"') {
            output.push_str(&unescape(inner));
            return;
        }
    }
    if segment.len() == 3 && segment.starts_with('\'') && segment.ends_with('\'') {
        output.push(segment.chars().nth(1).unwrap_or('?'));
        return;
    }
    if segment.parse::<f64>().is_ok() {
        output.push_str(segment);
        return;
    }
    if identifier_re().is_match(segment) {
        output.push_str(&format!("[Variable: {segment}]"));
        return;
    }
    output.push_str(&format!("[Expression: {segment}]"));
}

pub struct CppSimulator;

impl CppSimulator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CppSimulator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionStrategy for CppSimulator {
    fn name(&self) -> &str {
        "cpp-sim"
    }

    fn disclaimer(&self) -> Option<&str> {
        Some("Simulated C++ execution (pattern-based, not a compiler)")
    }

    async fn run(&self, content: &str, _budget: Duration) -> ExecutionResult {
        let mut output = String::new();
        for line in content.lines() {
            let Some(caps) = cout_re().captures(line) else {
                continue;
            };
            for segment in caps[1].split("<<") {
                render_segment(segment, &mut output);
            }
        }
        // A chain without endl still ends the transcript line
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        ExecutionResult::ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(source: &str) -> String {
        let result = CppSimulator::new().run(source, Duration::from_secs(5)).await;
        assert!(result.success);
        result.output
    }

    #[tokio::test]
    async fn test_hello_world_chain() {
        let source = r#"
#include <iostream>

int main() {
    std::cout << "Hello World!" << std::endl;
    return 0;
}
"#;
        assert_eq!(run(source).await, "Hello World!\n");
    }

    #[tokio::test]
    async fn test_unqualified_cout_and_endl() {
        assert_eq!(run(r#"cout << "hi" << endl;"#).await, "hi\n");
    }

    #[tokio::test]
    async fn test_numeric_and_char_literals() {
        assert_eq!(run(r#"cout << 42 << '!' << endl;"#).await, "42!\n");
    }

    #[tokio::test]
    async fn test_identifier_becomes_variable_placeholder() {
        assert_eq!(run("cout << total << endl;").await, "[Variable: total]\n");
    }

    #[tokio::test]
    async fn test_expression_becomes_expression_placeholder() {
        assert_eq!(
            run("cout << a + b << endl;").await,
            "[Expression: a + b]\n"
        );
    }

    #[tokio::test]
    async fn test_escapes_in_string_literals() {
        assert_eq!(run(r#"cout << "a\nb";"#).await, "a\nb\n");
    }

    #[tokio::test]
    async fn test_non_cout_lines_are_silent() {
        assert_eq!(run("int x = 5;\nx++;").await, "");
    }
}
