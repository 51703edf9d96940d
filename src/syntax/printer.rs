//! Printing of syntax trees back to source text.

use std::fmt;

use crate::codegen::escape::{property_key, string_literal};

use super::ast::{Binding, Expr, Node, SourceUnit, Statement};

/// Print a generated expression on a single line.
pub fn print_expr(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);
    out
}

/// Print a generated statement, including its trailing `;`.
pub fn print_statement(statement: &Statement) -> String {
    match statement {
        Statement::Const { binding, init } => {
            format!("const {} = {};", print_binding(binding), print_expr(init))
        }
    }
}

/// Print a unit. Unmodified nodes reproduce their original text.
pub fn print_unit(unit: &SourceUnit) -> String {
    unit.to_string()
}

fn print_binding(binding: &Binding) -> String {
    match binding {
        Binding::Ident(name) => name.clone(),
        Binding::Object(pairs) if pairs.is_empty() => "{}".to_string(),
        Binding::Object(pairs) => {
            let parts: Vec<String> = pairs
                .iter()
                .map(|(property, local)| {
                    if property == local {
                        local.clone()
                    } else {
                        format!("{}: {}", property_key(property), local)
                    }
                })
                .collect();
            format!("{{ {} }}", parts.join(", "))
        }
    }
}

fn write_expr(out: &mut String, expr: &Expr) {
    match expr {
        Expr::Null => out.push_str("null"),
        Expr::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Expr::Number(n) => out.push_str(n),
        Expr::String(s) => out.push_str(&string_literal(s)),
        Expr::Ident(name) => out.push_str(name),
        Expr::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, item);
            }
            out.push(']');
        }
        Expr::Object(properties) if properties.is_empty() => out.push_str("{}"),
        Expr::Object(properties) => {
            out.push_str("{ ");
            for (i, property) in properties.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&property_key(&property.key));
                out.push_str(": ");
                write_expr(out, &property.value);
            }
            out.push_str(" }");
        }
        Expr::Member { object, property } => {
            write_expr(out, object);
            out.push('.');
            out.push_str(property);
        }
        Expr::Call { callee, args } => {
            write_expr(out, callee);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, arg);
            }
            out.push(')');
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Verbatim(text) => f.write_str(text),
            Node::Import(decl) => f.write_str(&decl.text),
            Node::DynamicImport(dynamic) => f.write_str(&dynamic.text),
            Node::Generated(statements) => {
                let printed: Vec<String> = statements.iter().map(print_statement).collect();
                f.write_str(&printed.join(" "))
            }
        }
    }
}

impl fmt::Display for SourceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}
