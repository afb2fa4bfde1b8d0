//! Basic blocks and edges.
//!
//! Blocks are split at labels and after every goto, conditional goto and
//! return. Edge guards that are boolean literals are folded: a `true` guard
//! becomes an unconditional edge, a `false` guard drops the edge. Blocks
//! unreachable from START are removed once all edges exist.

use kite_lowering::{InstructionStream, LoweringError};
use kite_semantic::{
    BoundExpression, BoundExpressionKind, BoundStatement, BoundUnaryExpression, BoundUnaryOperator, BuiltinTypes,
};
use kite_syntax::{LiteralValue, UnaryOperatorKind};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BlockId(pub u32);

impl BlockId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EdgeId(pub u32);

impl EdgeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub id: BlockId,
    pub statements: Vec<Rc<BoundStatement>>,
    pub is_start: bool,
    pub is_end: bool,
    pub incoming: Vec<EdgeId>,
    pub outgoing: Vec<EdgeId>,
}

impl BasicBlock {
    fn new(id: BlockId, statements: Vec<Rc<BoundStatement>>) -> Self {
        Self { id, statements, is_start: false, is_end: false, incoming: Vec::new(), outgoing: Vec::new() }
    }

    pub fn last_statement(&self) -> Option<&BoundStatement> {
        self.statements.last().map(|statement| statement.as_ref())
    }

    pub fn ends_with_return(&self) -> bool {
        matches!(self.last_statement(), Some(BoundStatement::Return(_)))
    }
}

/// A control transfer between two blocks. `condition` is `None` for an
/// unconditional edge.
#[derive(Debug, Clone)]
pub struct Edge {
    pub from: BlockId,
    pub to: BlockId,
    pub condition: Option<Rc<BoundExpression>>,
}

#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    blocks: Vec<BasicBlock>,
    edges: Vec<Edge>,
    start: BlockId,
    end: BlockId,
}

impl ControlFlowGraph {
    /// Build the graph of a lowered body.
    pub fn from_body(body: &BoundStatement, builtins: &BuiltinTypes) -> Result<Self, LoweringError> {
        let stream = InstructionStream::new(body)?;
        Ok(Self::build(&stream, builtins))
    }

    pub fn build(stream: &InstructionStream, builtins: &BuiltinTypes) -> Self {
        let mut builder = GraphBuilder::new(*builtins);
        builder.split_blocks(stream.statements());
        builder.connect_blocks();
        let graph = builder.finish();
        tracing::trace!(
            statements = stream.len(),
            blocks = graph.blocks.len(),
            edges = graph.edges.len(),
            "built control-flow graph"
        );
        graph
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.index()]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn start(&self) -> BlockId {
        self.start
    }

    pub fn end(&self) -> BlockId {
        self.end
    }

    /// Blocks with an edge into `id`.
    pub fn predecessors(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.block(id).incoming.iter().map(move |&edge| self.edge(edge).from)
    }

    /// Blocks `id` has an edge to.
    pub fn successors(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.block(id).outgoing.iter().map(move |&edge| self.edge(edge).to)
    }
}

// ============================================================================
// Construction
// ============================================================================

struct GraphBuilder {
    builtins: BuiltinTypes,
    /// Body blocks in statement order; START and END are added by `finish`.
    body: Vec<Vec<Rc<BoundStatement>>>,
    /// Edges between body positions, where `body.len()` stands for END and
    /// `None` as a source stands for START.
    edges: Vec<(Option<usize>, usize, Option<Rc<BoundExpression>>)>,
}

impl GraphBuilder {
    fn new(builtins: BuiltinTypes) -> Self {
        Self { builtins, body: Vec::new(), edges: Vec::new() }
    }

    fn split_blocks(&mut self, statements: &[Rc<BoundStatement>]) {
        let mut current: Vec<Rc<BoundStatement>> = Vec::new();
        for statement in statements {
            match statement.as_ref() {
                BoundStatement::Label(_) => {
                    if !current.is_empty() {
                        self.body.push(std::mem::take(&mut current));
                    }
                    current.push(Rc::clone(statement));
                }
                BoundStatement::Goto(_) | BoundStatement::ConditionalGoto(_) | BoundStatement::Return(_) => {
                    current.push(Rc::clone(statement));
                    self.body.push(std::mem::take(&mut current));
                }
                _ => current.push(Rc::clone(statement)),
            }
        }
        if !current.is_empty() {
            self.body.push(current);
        }
    }

    fn connect_blocks(&mut self) {
        let end = self.body.len();
        let mut label_blocks = FxHashMap::default();
        for (index, block) in self.body.iter().enumerate() {
            if let Some(BoundStatement::Label(label)) = block.first().map(|s| s.as_ref()) {
                label_blocks.insert(*label, index);
            }
        }

        self.edges.push((None, 0, None));

        for index in 0..self.body.len() {
            let next = index + 1;
            let last = self.body[index].last().cloned();
            match last.as_deref() {
                Some(BoundStatement::Goto(label)) => {
                    let target = label_blocks.get(label).copied().unwrap_or(end);
                    self.connect(index, target, None);
                }
                Some(BoundStatement::ConditionalGoto(goto)) => {
                    let target = label_blocks.get(&goto.label).copied().unwrap_or(end);
                    let (jump_condition, fall_condition) = if goto.jump_if_true {
                        (Rc::clone(&goto.condition), self.negate(&goto.condition))
                    } else {
                        (self.negate(&goto.condition), Rc::clone(&goto.condition))
                    };
                    self.connect(index, target, Some(jump_condition));
                    self.connect(index, next, Some(fall_condition));
                }
                Some(BoundStatement::Return(_)) => self.connect(index, end, None),
                _ => self.connect(index, next, None),
            }
        }
    }

    fn connect(&mut self, from: usize, to: usize, condition: Option<Rc<BoundExpression>>) {
        match condition.as_ref().and_then(|condition| condition.as_bool_literal()) {
            Some(false) => {}
            Some(true) => self.edges.push((Some(from), to, None)),
            None => self.edges.push((Some(from), to, condition)),
        }
    }

    fn negate(&self, condition: &Rc<BoundExpression>) -> Rc<BoundExpression> {
        if let Some(value) = condition.as_bool_literal() {
            return BoundExpression::new(
                BoundExpressionKind::Literal(LiteralValue::Bool(!value)),
                condition.ty,
                condition.location,
            );
        }
        if let BoundExpressionKind::Unary(unary) = &condition.kind {
            if unary.operator.kind == UnaryOperatorKind::LogicalNegation {
                return Rc::clone(&unary.operand);
            }
        }
        BoundExpression::new(
            BoundExpressionKind::Unary(BoundUnaryExpression {
                operator: BoundUnaryOperator::logical_negation(&self.builtins),
                operand: Rc::clone(condition),
            }),
            self.builtins.bool,
            condition.location,
        )
    }

    /// Keep the blocks reachable from START, plus END, and renumber them.
    fn finish(self) -> ControlFlowGraph {
        let body_count = self.body.len();
        // Node numbering while pruning: 0 is START, 1..=body_count the body
        // blocks, body_count + 1 END.
        let node = |position: Option<usize>| position.map_or(0, |p| p + 1);
        let end_node = body_count + 1;

        let mut successors = vec![Vec::new(); body_count + 2];
        for (from, to, _) in &self.edges {
            successors[node(*from)].push(*to + 1);
        }

        let mut reachable = vec![false; body_count + 2];
        let mut queue = VecDeque::from([0]);
        reachable[0] = true;
        while let Some(current) = queue.pop_front() {
            for &next in &successors[current] {
                if !reachable[next] {
                    reachable[next] = true;
                    queue.push_back(next);
                }
            }
        }
        reachable[end_node] = true;

        let pruned = reachable.iter().filter(|&&r| !r).count();
        if pruned > 0 {
            tracing::trace!(pruned, "removed unreachable blocks");
        }

        let mut renumbered = vec![None; body_count + 2];
        let mut blocks = Vec::new();
        let mut body = self.body.into_iter();
        for old in 0..body_count + 2 {
            let statements = if old == 0 || old == end_node { Vec::new() } else { body.next().unwrap_or_default() };
            if !reachable[old] {
                continue;
            }
            let id = BlockId(blocks.len() as u32);
            let mut block = BasicBlock::new(id, statements);
            block.is_start = old == 0;
            block.is_end = old == end_node;
            renumbered[old] = Some(id);
            blocks.push(block);
        }

        let mut edges = Vec::new();
        for (from, to, condition) in self.edges {
            let (Some(from), Some(to)) = (renumbered[node(from)], renumbered[to + 1]) else {
                continue;
            };
            let id = EdgeId(edges.len() as u32);
            blocks[from.index()].outgoing.push(id);
            blocks[to.index()].incoming.push(id);
            edges.push(Edge { from, to, condition });
        }

        ControlFlowGraph {
            start: BlockId(0),
            end: BlockId(blocks.len() as u32 - 1),
            blocks,
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kite_core::text::{Location, SourceId, TextSpan};
    use kite_semantic::{BoundReturnStatement, LabelId, SymbolTable};

    fn literal(symbols: &SymbolTable, value: bool) -> Rc<BoundExpression> {
        BoundExpression::new(
            BoundExpressionKind::Literal(LiteralValue::Bool(value)),
            symbols.builtins().bool,
            Location::new(SourceId(0), TextSpan::new(0, 4)),
        )
    }

    fn ret() -> Rc<BoundStatement> {
        Rc::new(BoundStatement::Return(BoundReturnStatement { expression: None }))
    }

    #[test]
    fn test_empty_body_connects_start_to_end() {
        let symbols = SymbolTable::new();
        let graph = ControlFlowGraph::from_body(&BoundStatement::block(Vec::new()), symbols.builtins())
            .expect("valid body");
        assert_eq!(graph.blocks().len(), 2);
        assert_eq!(graph.edges().len(), 1);
        assert!(graph.block(graph.start()).is_start);
        assert!(graph.block(graph.end()).is_end);
    }

    #[test]
    fn test_code_after_return_is_pruned() {
        let symbols = SymbolTable::new();
        let body = BoundStatement::block(vec![ret(), ret(), BoundStatement::label(LabelId(0)), ret()]);
        let graph = ControlFlowGraph::from_body(&body, symbols.builtins()).expect("valid body");
        // START, the first return, END.
        assert_eq!(graph.blocks().len(), 3);
        assert_eq!(graph.predecessors(graph.end()).count(), 1);
    }

    #[test]
    fn test_literal_guards_are_folded() {
        let symbols = SymbolTable::new();
        let body = BoundStatement::block(vec![
            BoundStatement::conditional_goto(LabelId(0), literal(&symbols, true), true),
            ret(),
            BoundStatement::label(LabelId(0)),
            ret(),
        ]);
        let graph = ControlFlowGraph::from_body(&body, symbols.builtins()).expect("valid body");

        // The fall-through block holding the first return is unreachable.
        assert_eq!(graph.blocks().len(), 4);
        assert!(graph.edges().iter().all(|edge| edge.condition.is_none()));
    }

    #[test]
    fn test_negated_literal_guard_is_folded() {
        let symbols = SymbolTable::new();
        let body = BoundStatement::block(vec![
            BoundStatement::conditional_goto(LabelId(0), literal(&symbols, true), false),
            ret(),
            BoundStatement::label(LabelId(0)),
            ret(),
        ]);
        let graph = ControlFlowGraph::from_body(&body, symbols.builtins()).expect("valid body");
        let label_reachable = graph
            .blocks()
            .iter()
            .any(|block| matches!(block.statements.first().map(|s| s.as_ref()), Some(BoundStatement::Label(_))));
        assert!(!label_reachable);
    }
}
