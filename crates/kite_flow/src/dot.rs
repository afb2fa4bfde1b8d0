//! Graphviz rendering.

use crate::cfg::ControlFlowGraph;
use kite_semantic::{BoundTreePrinter, SymbolTable};
use std::fmt::Write;

impl ControlFlowGraph {
    /// Render the graph in Graphviz dot syntax.
    pub fn to_dot(&self, symbols: &SymbolTable) -> String {
        let mut printer = BoundTreePrinter::new(symbols);
        let mut out = String::from("digraph G {\n");

        for block in self.blocks() {
            let label = if block.is_start {
                "<Start>".to_string()
            } else if block.is_end {
                "<End>".to_string()
            } else {
                block
                    .statements
                    .iter()
                    .map(|statement| escape(printer.print(statement).trim()))
                    .collect::<Vec<_>>()
                    .join("\\l")
                    + "\\l"
            };
            let _ = writeln!(out, "    N{} [label = \"{}\", shape = box]", block.id.0, label);
        }

        for edge in self.edges() {
            match &edge.condition {
                Some(condition) => {
                    let text = escape(&printer.print_expression_to_string(condition));
                    let _ = writeln!(out, "    N{} -> N{} [label = \"{}\"]", edge.from.0, edge.to.0, text);
                }
                None => {
                    let _ = writeln!(out, "    N{} -> N{}", edge.from.0, edge.to.0);
                }
            }
        }

        out.push_str("}\n");
        out
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\l")
}
