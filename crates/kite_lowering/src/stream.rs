//! Lowered bodies as flat instruction streams.

use kite_semantic::{BoundStatement, LabelId};
use rustc_hash::FxHashMap;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoweringError {
    #[error("jump to undefined label {0}")]
    UnknownLabel(LabelId),
    #[error("label {0} is defined more than once")]
    DuplicateLabel(LabelId),
    #[error("statement {0} was not lowered")]
    NotLowered(usize),
}

/// A lowered body as a statement vector plus a label to index map, ready
/// to be executed with a program counter.
#[derive(Debug, Clone)]
pub struct InstructionStream {
    statements: Vec<Rc<BoundStatement>>,
    labels: FxHashMap<LabelId, usize>,
}

impl InstructionStream {
    /// Index the output of the lowerer. Every jump must target a label
    /// defined exactly once in the same body.
    pub fn new(body: &BoundStatement) -> Result<Self, LoweringError> {
        let statements = match body {
            BoundStatement::Block(block) => block.statements.clone(),
            _ => vec![Rc::new(body.clone())],
        };

        let mut labels = FxHashMap::default();
        for (index, statement) in statements.iter().enumerate() {
            match statement.as_ref() {
                BoundStatement::Label(label) => {
                    if labels.insert(*label, index).is_some() {
                        return Err(LoweringError::DuplicateLabel(*label));
                    }
                }
                statement if statement.is_structured() => return Err(LoweringError::NotLowered(index)),
                _ => {}
            }
        }

        for statement in &statements {
            if let Some(target) = Self::jump_target(statement) {
                if !labels.contains_key(&target) {
                    return Err(LoweringError::UnknownLabel(target));
                }
            }
        }

        Ok(Self { statements, labels })
    }

    /// The label a goto or conditional goto jumps to.
    pub fn jump_target(statement: &BoundStatement) -> Option<LabelId> {
        match statement {
            BoundStatement::Goto(label) => Some(*label),
            BoundStatement::ConditionalGoto(goto) => Some(goto.label),
            _ => None,
        }
    }

    pub fn statements(&self) -> &[Rc<BoundStatement>] {
        &self.statements
    }

    /// Index of the statement defining `label`.
    pub fn label_index(&self, label: LabelId) -> Option<usize> {
        self.labels.get(&label).copied()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_indices() {
        let body = BoundStatement::block(vec![
            BoundStatement::label(LabelId(0)),
            BoundStatement::goto(LabelId(1)),
            BoundStatement::label(LabelId(1)),
        ]);
        let stream = InstructionStream::new(&body).expect("well-formed stream");
        assert_eq!(stream.len(), 3);
        assert_eq!(stream.label_index(LabelId(1)), Some(2));
        assert_eq!(stream.label_index(LabelId(5)), None);
    }

    #[test]
    fn test_rejects_unknown_label() {
        let body = BoundStatement::block(vec![BoundStatement::goto(LabelId(4))]);
        assert_eq!(InstructionStream::new(&body).unwrap_err(), LoweringError::UnknownLabel(LabelId(4)));
    }

    #[test]
    fn test_rejects_structured_statement() {
        let body = BoundStatement::block(vec![BoundStatement::block(Vec::new())]);
        assert_eq!(InstructionStream::new(&body).unwrap_err(), LoweringError::NotLowered(0));
    }
}
