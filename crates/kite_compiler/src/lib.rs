//! kite_compiler: Compilation orchestration.
//!
//! Collects the syntax trees of one compilation, binds them (optionally on
//! top of a previous submission) and produces the final, sorted diagnostic
//! list together with the bound program.

pub mod options;

pub use kite_binder::{BindError, BoundProgram};
pub use options::CompilerOptions;

use kite_binder::ProgramBinder;
use kite_diagnostics::{DiagnosticCollection, SourceFiles};
use kite_syntax::SyntaxTree;

/// One compilation: a forest of syntax trees plus options.
pub struct Compilation {
    pub options: CompilerOptions,
    trees: Vec<SyntaxTree>,
    /// The submission this one continues, if any.
    previous: Option<BoundProgram>,
}

impl Compilation {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options, trees: Vec::new(), previous: None }
    }

    /// A compilation that sees everything the global scopes of `previous`
    /// declared.
    pub fn continue_with(previous: BoundProgram, options: CompilerOptions) -> Self {
        Self { options, trees: Vec::new(), previous: Some(previous) }
    }

    pub fn add_tree(&mut self, tree: SyntaxTree) {
        self.trees.push(tree);
    }

    pub fn add_trees(&mut self, trees: impl IntoIterator<Item = SyntaxTree>) {
        self.trees.extend(trees);
    }

    /// Add a tree serialized by an out-of-process parser.
    pub fn add_tree_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let tree = SyntaxTree::from_json(json)?;
        self.trees.push(tree);
        Ok(())
    }

    pub fn trees(&self) -> &[SyntaxTree] {
        &self.trees
    }

    pub fn previous(&self) -> Option<&BoundProgram> {
        self.previous.as_ref()
    }

    /// Bind every tree. The returned program's diagnostics hold the parser
    /// diagnostics and the binder's, sorted by position.
    #[tracing::instrument(skip_all, fields(trees = self.trees.len()))]
    pub fn bind(&self) -> Result<BoundProgram, BindError> {
        let mut binder = ProgramBinder::new(&self.trees, self.options.bind_options());
        if let Some(previous) = &self.previous {
            binder = binder.with_previous(previous);
        }
        let mut program = binder.bind()?;

        let mut diagnostics = DiagnosticCollection::new();
        for tree in &self.trees {
            diagnostics.extend_from_slice(&tree.diagnostics);
        }
        diagnostics.extend(std::mem::take(&mut program.diagnostics));
        diagnostics.sort();
        if let Some(max) = self.options.max_diagnostics {
            diagnostics.truncate(max);
        }
        program.diagnostics = diagnostics;

        tracing::debug!(
            diagnostics = program.diagnostics.len(),
            errors = program.diagnostics.error_count(),
            "compilation bound"
        );
        Ok(program)
    }

    /// File names and line maps of this compilation's trees.
    pub fn source_files(&self) -> SourceFiles {
        let mut files = SourceFiles::new();
        for tree in &self.trees {
            files.add(tree.source, tree.file_name.clone(), tree.line_map());
        }
        files
    }

    /// Render the diagnostics of `program` as `file(line,col): ...` lines.
    pub fn render_diagnostics(&self, program: &BoundProgram) -> Vec<String> {
        let files = self.source_files();
        program.diagnostics.diagnostics().iter().map(|diagnostic| diagnostic.render(&files)).collect()
    }
}
