//! Human-readable tree dump, one node per line.
//!
//! ```text
//! BLOCK:
//!   PATH:each [PATH:items]
//!   PROGRAM:
//!     {{ PATH:name [] }}
//! ```

use super::expr::*;
use super::nodes::*;
use crate::visitor::{Visitor, walk};
use std::fmt;

/// Indented printer for a [`Program`], built on [`Visitor`].
#[derive(Debug, Default)]
pub struct Printer {
    out: String,
    padding: usize,
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print a whole program and return the text.
    pub fn print(program: &Program) -> String {
        let mut printer = Printer::new();
        printer.visit_program(program);
        printer.out
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.padding {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn nested(&mut self, label: &str, program: &Program) {
        self.line(label);
        self.padding += 1;
        self.visit_program(program);
        self.padding -= 1;
    }
}

impl Visitor for Printer {
    fn visit_program(&mut self, program: &Program) {
        if !program.block_params.is_empty() {
            let params = program.block_params.join(" ");
            self.line(&format!("BLOCK PARAMS: [ {} ]", params));
        }
        walk::walk_program(self, program);
    }

    fn visit_mustache(&mut self, mustache: &MustacheStatement) {
        let body = call_string(&mustache.expr);
        if mustache.escaped {
            self.line(&format!("{{{{ {} }}}}", body));
        } else {
            self.line(&format!("{{{{{{ {} }}}}}}", body));
        }
    }

    fn visit_block(&mut self, block: &BlockStatement) {
        self.line("BLOCK:");
        self.padding += 1;
        self.line(&call_string(&block.expr));
        if let Some(program) = &block.program {
            self.nested("PROGRAM:", program);
        }
        if let Some(inverse) = &block.inverse {
            self.nested("{{^}}", inverse);
        }
        self.padding -= 1;
    }

    fn visit_partial(&mut self, partial: &PartialStatement) {
        let call = partial_string(&partial.name, &partial.params, partial.hash.as_ref());
        self.line(&format!("{{{{> PARTIAL:{} }}}}", call));
    }

    fn visit_partial_block(&mut self, partial: &PartialBlockStatement) {
        let call = partial_string(&partial.name, &partial.params, partial.hash.as_ref());
        self.line(&format!("{{{{> PARTIAL BLOCK:{} }}}}", call));
        self.padding += 1;
        self.nested("PROGRAM:", &partial.program);
        self.padding -= 1;
    }

    fn visit_content(&mut self, content: &ContentStatement) {
        self.line(&format!("CONTENT[ '{}' ]", content.value));
    }

    fn visit_comment(&mut self, comment: &CommentStatement) {
        self.line(&format!("{{{{! '{}' }}}}", comment.value));
    }
}

/// `head [params] HASH{..}` for a call form, `head []` for a bare value.
fn call_string(expr: &Expression) -> String {
    match expr {
        Expression::SubExpression(sexpr) => {
            sexpr_string(&path_string(&sexpr.path), &sexpr.params, sexpr.hash.as_ref())
        }
        other => format!("{} []", expr_to_string(other)),
    }
}

fn partial_string(name: &Expression, params: &[Expression], hash: Option<&Hash>) -> String {
    let name = match name {
        Expression::Path(path) => path.original.clone(),
        other => expr_to_string(other),
    };
    let mut out = name;
    if let Some(param) = params.first() {
        out.push(' ');
        out.push_str(&expr_to_string(param));
    }
    if let Some(hash) = hash {
        out.push(' ');
        out.push_str(&hash_string(hash));
    }
    out
}

fn sexpr_string(head: &str, params: &[Expression], hash: Option<&Hash>) -> String {
    let params: Vec<String> = params.iter().map(expr_to_string).collect();
    let mut out = format!("{} [{}]", head, params.join(", "));
    if let Some(hash) = hash {
        out.push(' ');
        out.push_str(&hash_string(hash));
    }
    out
}

fn path_string(path: &PathExpression) -> String {
    let prefix = if path.data { "@" } else { "" };
    let mut parts = "../".repeat(path.depth as usize);
    parts.push_str(&path.parts.join("/"));
    format!("{}PATH:{}", prefix, parts)
}

fn hash_string(hash: &Hash) -> String {
    let pairs: Vec<String> = hash
        .pairs
        .iter()
        .map(|pair| format!("{}={}", pair.key, expr_to_string(&pair.value)))
        .collect();
    format!("HASH{{{}}}", pairs.join(", "))
}

/// Concise single-line rendering of an expression.
pub fn expr_to_string(expr: &Expression) -> String {
    match expr {
        Expression::SubExpression(sexpr) => format!(
            "({})",
            sexpr_string(&path_string(&sexpr.path), &sexpr.params, sexpr.hash.as_ref())
        ),
        Expression::Path(path) => path_string(path),
        Expression::String(s) => format!("\"{}\"", s.value),
        Expression::Number(n) => format!("NUMBER{{{}}}", n.original),
        Expression::Boolean(b) => format!("BOOLEAN{{{}}}", b.value),
        Expression::Undefined(_) => "UNDEFINED".to_string(),
        Expression::Null(_) => "NULL".to_string(),
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Printer::print(self))
    }
}
