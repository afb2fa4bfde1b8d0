//! Return and definite-assignment analyses.

use crate::cfg::{BlockId, ControlFlowGraph};
use kite_core::text::Location;
use kite_semantic::{
    for_each_expression, BoundExpressionKind, BoundStatement, SymbolTable, VariableId, VariableKind,
};
use rustc_hash::FxHashSet;

/// A read of a local that some path from START reaches without assigning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UninitializedRead {
    pub variable: VariableId,
    pub location: Location,
}

impl ControlFlowGraph {
    /// Whether every block flowing into END ends in `return`.
    pub fn all_paths_return(&self) -> bool {
        self.predecessors(self.end()).all(|block| self.block(block).ends_with_return())
    }

    /// Every read of a local variable that is not definitely assigned, in
    /// block and statement order. Parameters are always assigned, and so
    /// are locals declared outside this body.
    pub fn uninitialized_reads(&self, symbols: &SymbolTable) -> Vec<UninitializedRead> {
        let declared: FxHashSet<VariableId> = self
            .blocks()
            .iter()
            .flat_map(|block| block.statements.iter())
            .filter_map(|statement| match &**statement {
                BoundStatement::VariableDeclaration(declaration) => Some(declaration.variable),
                _ => None,
            })
            .collect();

        let mut reads = Vec::new();
        for block in self.blocks() {
            for (index, statement) in block.statements.iter().enumerate() {
                for (variable, location) in local_reads(statement, symbols) {
                    if !declared.contains(&variable) {
                        continue;
                    }
                    let mut visited = FxHashSet::default();
                    if !self.assigned_before(block.id, index, variable, &mut visited) {
                        reads.push(UninitializedRead { variable, location });
                    }
                }
            }
        }
        reads
    }

    /// Whether `variable` is assigned on every path from START to statement
    /// `index` of `block`. A block already on the current walk counts as
    /// assigning, so loops do not make a read look uninitialized by
    /// themselves.
    fn assigned_before(
        &self,
        block: BlockId,
        index: usize,
        variable: VariableId,
        visited: &mut FxHashSet<BlockId>,
    ) -> bool {
        let basic_block = self.block(block);
        if basic_block.statements[..index].iter().any(|statement| assigns(statement, variable)) {
            return true;
        }
        if basic_block.is_start {
            return false;
        }
        let predecessors: Vec<BlockId> = self.predecessors(block).collect();
        for predecessor in predecessors {
            if !visited.insert(predecessor) {
                continue;
            }
            let length = self.block(predecessor).statements.len();
            if !self.assigned_before(predecessor, length, variable, visited) {
                return false;
            }
        }
        true
    }
}

fn local_reads(statement: &BoundStatement, symbols: &SymbolTable) -> Vec<(VariableId, Location)> {
    let mut reads = Vec::new();
    for_each_expression(statement, &mut |expression| {
        if let BoundExpressionKind::Variable(variable) = expression.kind {
            if symbols.variable(variable).kind == VariableKind::Local {
                reads.push((variable, expression.location));
            }
        }
    });
    reads
}

fn assigns(statement: &BoundStatement, variable: VariableId) -> bool {
    if let BoundStatement::VariableDeclaration(declaration) = statement {
        if declaration.variable == variable && declaration.initializer.is_some() {
            return true;
        }
    }
    let mut found = false;
    for_each_expression(statement, &mut |expression| {
        if let BoundExpressionKind::Assignment(assignment) = &expression.kind {
            found |= assignment.variable == variable;
        }
    });
    found
}
