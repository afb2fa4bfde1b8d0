//! kite_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Every user-facing finding of the binding pipeline is a [`Diagnostic`]
//! built from a [`DiagnosticMessage`] template in [`messages`]. Binders never
//! abort on a semantic error; they push into a [`DiagnosticCollection`] that is
//! threaded through every pass and merged at pass boundaries.

use kite_core::text::{LineAndColumn, LineMap, Location, SourceId};
use rustc_hash::FxHashSet;
use std::fmt;

/// Diagnostic category. The binding core only produces errors; warnings
/// exist for producers upstream of it (the parser).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message template with a stable code and a category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The stable diagnostic code (e.g. `KT2001`).
    pub code: &'static str,
    /// The category of this diagnostic.
    pub category: DiagnosticCategory,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Where the finding is anchored, if anywhere.
    pub location: Option<Location>,
    /// The resolved message text.
    pub message_text: String,
    /// The diagnostic code.
    pub code: &'static str,
    /// The category.
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// Create a new diagnostic without location info (global diagnostic).
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            location: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// Create a new diagnostic anchored at a source location.
    pub fn with_location(location: Location, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            location: Some(location),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// Whether this is an error diagnostic.
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }

    /// Render as `file(line,col): error KT0000: message` using the given
    /// source table for line information.
    pub fn render(&self, sources: &SourceFiles) -> String {
        match self.location.and_then(|loc| sources.resolve(loc)) {
            Some((file, start, _)) => {
                format!("{}({}): {} {}: {}", file, start, self.category, self.code, self.message_text)
            }
            None => self.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = self.location {
            write!(f, "{:?}: ", location)?;
        }
        write!(f, "{} {}: {}", self.category, self.code, self.message_text)
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// File names and line maps of every source of a compilation, used to turn
/// a [`Location`] into line/column information.
#[derive(Debug, Clone, Default)]
pub struct SourceFiles {
    files: Vec<(SourceId, String, LineMap)>,
}

impl SourceFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, source: SourceId, file_name: impl Into<String>, line_map: LineMap) {
        self.files.push((source, file_name.into(), line_map));
    }

    pub fn file_name(&self, source: SourceId) -> Option<&str> {
        self.files
            .iter()
            .find(|(id, _, _)| *id == source)
            .map(|(_, name, _)| name.as_str())
    }

    /// File name plus start and end line/column of a location.
    pub fn resolve(&self, location: Location) -> Option<(&str, LineAndColumn, LineAndColumn)> {
        let (_, name, map) = self.files.iter().find(|(id, _, _)| *id == location.source)?;
        let (start, end) = map.range_of(location.span);
        Some((name.as_str(), start, end))
    }
}

/// A collection of diagnostics accumulated during compilation.
///
/// Append-only and de-duplicating: a diagnostic with the same code, location
/// and message as one already present is dropped.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<(&'static str, Option<Location>, String)>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic. Returns `false` if an identical finding was already
    /// recorded.
    pub fn add(&mut self, diagnostic: Diagnostic) -> bool {
        let key = (diagnostic.code, diagnostic.location, diagnostic.message_text.clone());
        if !self.seen.insert(key) {
            return false;
        }
        self.diagnostics.push(diagnostic);
        true
    }

    /// Report a templated error at `location`.
    pub fn report(&mut self, location: Location, message: &DiagnosticMessage, args: &[&str]) {
        self.add(Diagnostic::with_location(location, message, args));
    }

    /// Report a templated error with no source anchor.
    pub fn report_global(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        self.add(Diagnostic::new(message, args));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.category == DiagnosticCategory::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Error)
            .count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Merge another collection into this one, keeping de-duplication.
    pub fn extend(&mut self, other: DiagnosticCollection) {
        for diagnostic in other.diagnostics {
            self.add(diagnostic);
        }
    }

    pub fn extend_from_slice(&mut self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            self.add(diagnostic.clone());
        }
    }

    /// Keep at most `max` diagnostics.
    pub fn truncate(&mut self, max: usize) {
        self.diagnostics.truncate(max);
    }

    /// Sort diagnostics by source and position. Global diagnostics come first;
    /// the sort is stable so findings at one position keep report order.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            let a_key = a.location.map(|l| (l.source, l.span.start));
            let b_key = b.location.map(|l| (l.source, l.span.start));
            a_key.cmp(&b_key)
        });
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Declaration errors (1000-1099)
    // ========================================================================
    pub const CLASS_0_IS_ALREADY_DECLARED: DiagnosticMessage = diag!("KT1001", Error, "A class named '{0}' is already declared.");
    pub const FIELD_0_IS_ALREADY_DECLARED_IN_1: DiagnosticMessage = diag!("KT1002", Error, "Field '{0}' is already declared in type '{1}'.");
    pub const METHOD_0_IS_ALREADY_DECLARED_IN_1: DiagnosticMessage = diag!("KT1003", Error, "Method '{0}' is already declared in type '{1}'.");
    pub const PARAMETER_0_IS_ALREADY_DECLARED: DiagnosticMessage = diag!("KT1004", Error, "A parameter named '{0}' is already declared.");
    pub const VARIABLE_0_IS_ALREADY_DECLARED: DiagnosticMessage = diag!("KT1005", Error, "Variable '{0}' is already declared.");
    pub const MEMBER_0_CANNOT_SHARE_THE_NAME_OF_ITS_CLASS: DiagnosticMessage = diag!("KT1006", Error, "Member '{0}' cannot share the name of its enclosing class.");
    pub const MEMBER_0_IS_DECLARED_AS_FIELD_AND_METHOD_IN_1: DiagnosticMessage = diag!("KT1007", Error, "Member '{0}' is ambiguous: it is declared as both a field and a method in type '{1}'.");
    pub const _0_EXPECTS_1_TYPE_ARGUMENTS_BUT_2_WERE_SUPPLIED: DiagnosticMessage = diag!("KT1008", Error, "'{0}' expects {1} type argument(s) but {2} were supplied.");
    pub const TYPE_0_DOES_NOT_SATISFY_CONSTRAINT_1_OF_2: DiagnosticMessage = diag!("KT1009", Error, "Type '{0}' does not satisfy the constraint '{1}' of type parameter '{2}'.");
    pub const PARAMETER_0_REQUIRES_AN_EXPLICIT_TYPE: DiagnosticMessage = diag!("KT1010", Error, "Parameter '{0}' requires an explicit type.");
    pub const METHOD_0_CANNOT_BE_BOTH_VIRTUAL_AND_OVERRIDE: DiagnosticMessage = diag!("KT1011", Error, "Method '{0}' cannot be both virtual and override.");
    pub const TYPE_PARAMETER_0_IS_ALREADY_DECLARED: DiagnosticMessage = diag!("KT1012", Error, "Type parameter '{0}' is already declared.");
    pub const VARIABLE_0_REQUIRES_A_TYPE_OR_AN_INITIALIZER: DiagnosticMessage = diag!("KT1013", Error, "Variable '{0}' requires a type or an initializer.");
    pub const _0_IS_NOT_A_TYPE_PARAMETER_OF_1: DiagnosticMessage = diag!("KT1014", Error, "'{0}' is not a type parameter of '{1}'.");
    pub const STATIC_METHOD_0_CANNOT_BE_VIRTUAL_OR_OVERRIDE: DiagnosticMessage = diag!("KT1015", Error, "Static method '{0}' cannot be virtual or override.");
    pub const FUNCTION_0_IS_ALREADY_DECLARED_IN_THIS_SCOPE: DiagnosticMessage = diag!("KT1016", Error, "A function named '{0}' is already declared in this scope.");

    // ========================================================================
    // Name resolution errors (2000-2099)
    // ========================================================================
    pub const THE_NAME_0_DOES_NOT_EXIST: DiagnosticMessage = diag!("KT2001", Error, "The name '{0}' does not exist in the current context.");
    pub const TYPE_0_DOES_NOT_EXIST: DiagnosticMessage = diag!("KT2002", Error, "Type '{0}' does not exist.");
    pub const METHOD_0_DOES_NOT_EXIST: DiagnosticMessage = diag!("KT2003", Error, "Method '{0}' does not exist in the current context.");
    pub const TYPE_1_HAS_NO_METHOD_0: DiagnosticMessage = diag!("KT2004", Error, "Type '{1}' does not contain a method named '{0}'.");
    pub const TYPE_1_HAS_NO_FIELD_0: DiagnosticMessage = diag!("KT2005", Error, "Type '{1}' does not contain a field named '{0}'.");
    pub const ACCESS_TO_0_IS_AMBIGUOUS_BETWEEN_1: DiagnosticMessage = diag!("KT2006", Error, "Access to '{0}' is ambiguous between {1}.");
    pub const TYPE_NAME_0_IS_AMBIGUOUS: DiagnosticMessage = diag!("KT2007", Error, "The type name '{0}' is ambiguous.");
    pub const _0_IS_A_TYPE_NOT_A_VALUE: DiagnosticMessage = diag!("KT2008", Error, "'{0}' is a type and cannot be used as a value.");
    pub const THIS_IS_NOT_AVAILABLE_IN_A_STATIC_CONTEXT: DiagnosticMessage = diag!("KT2009", Error, "'this' is not available in a static context.");
    pub const INSTANCE_MEMBER_0_CANNOT_BE_ACCESSED_THROUGH_TYPE_1: DiagnosticMessage = diag!("KT2010", Error, "Instance member '{0}' cannot be accessed through type '{1}'.");
    pub const STATIC_MEMBER_0_MUST_BE_ACCESSED_THROUGH_TYPE_1: DiagnosticMessage = diag!("KT2011", Error, "Static member '{0}' must be accessed through type '{1}'.");
    pub const INSTANCE_MEMBER_0_IN_STATIC_CONTEXT: DiagnosticMessage = diag!("KT2012", Error, "Instance member '{0}' cannot be used in a static context.");

    // ========================================================================
    // Type checking errors (3000-3099)
    // ========================================================================
    pub const CANNOT_IMPLICITLY_CONVERT_0_TO_1: DiagnosticMessage = diag!("KT3001", Error, "Cannot implicitly convert type '{0}' to '{1}'. An explicit conversion exists.");
    pub const CANNOT_CONVERT_0_TO_1: DiagnosticMessage = diag!("KT3002", Error, "Cannot convert type '{0}' to '{1}'.");
    pub const UNARY_OPERATOR_0_IS_NOT_DEFINED_FOR_1: DiagnosticMessage = diag!("KT3003", Error, "Unary operator '{0}' is not defined for type '{1}'.");
    pub const BINARY_OPERATOR_0_IS_NOT_DEFINED_FOR_1_AND_2: DiagnosticMessage = diag!("KT3004", Error, "Binary operator '{0}' is not defined for types '{1}' and '{2}'.");
    pub const EXPRESSION_MUST_HAVE_A_VALUE: DiagnosticMessage = diag!("KT3005", Error, "Expression must have a value.");
    pub const _0_REQUIRES_1_ARGUMENTS_BUT_WAS_GIVEN_2: DiagnosticMessage = diag!("KT3006", Error, "'{0}' requires {1} argument(s) but was given {2}.");
    pub const _0_IS_READONLY: DiagnosticMessage = diag!("KT3007", Error, "'{0}' is read-only and cannot be assigned to.");
    pub const INVALID_EXPRESSION_STATEMENT: DiagnosticMessage = diag!("KT3008", Error, "Only assignment and call expressions can be used as a statement.");
    pub const CANNOT_CREATE_AN_INSTANCE_OF_0: DiagnosticMessage = diag!("KT3009", Error, "Cannot create an instance of '{0}'.");

    // ========================================================================
    // Control flow errors (4000-4099)
    // ========================================================================
    pub const _0_CAN_ONLY_BE_USED_INSIDE_A_LOOP: DiagnosticMessage = diag!("KT4001", Error, "'{0}' can only be used inside a loop.");
    pub const RETURN_OUTSIDE_OF_A_METHOD: DiagnosticMessage = diag!("KT4002", Error, "'return' can only be used inside a method.");
    pub const METHOD_0_RETURNS_VOID: DiagnosticMessage = diag!("KT4003", Error, "Method '{0}' returns Void; 'return' must not be followed by an expression.");
    pub const METHOD_0_MUST_RETURN_A_VALUE_OF_TYPE_1: DiagnosticMessage = diag!("KT4004", Error, "Method '{0}' must return a value of type '{1}'.");
    pub const NOT_ALL_CODE_PATHS_OF_0_RETURN_A_VALUE: DiagnosticMessage = diag!("KT4005", Error, "Not all code paths of '{0}' return a value.");
    pub const USE_OF_POSSIBLY_UNINITIALIZED_VARIABLE_0: DiagnosticMessage = diag!("KT4006", Error, "Use of possibly uninitialized variable '{0}'.");

    // ========================================================================
    // Inheritance errors (5000-5099)
    // ========================================================================
    pub const TYPE_0_CANNOT_INHERIT_FROM_ITSELF: DiagnosticMessage = diag!("KT5001", Error, "Type '{0}' cannot inherit from itself.");
    pub const MEMBER_0_OF_1_IS_INTRODUCED_BY_BOTH_2_AND_3: DiagnosticMessage = diag!("KT5002", Error, "Member '{0}' inherited by '{1}' is introduced incompatibly by both '{2}' and '{3}'.");
    pub const METHOD_0_IS_ALREADY_DECLARED_IN_BASE_1: DiagnosticMessage = diag!("KT5003", Error, "Method '{0}' is already declared in base type '{1}'.");
    pub const METHOD_0_HAS_NO_VIRTUAL_METHOD_TO_OVERRIDE: DiagnosticMessage = diag!("KT5004", Error, "Method '{0}' is marked override but no virtual method to override was found.");
    pub const METHOD_0_DOES_NOT_MATCH_OVERRIDDEN_IN_1: DiagnosticMessage = diag!("KT5005", Error, "Method '{0}' does not match the signature of the method it overrides in '{1}'.");
    pub const TYPE_0_CANNOT_DERIVE_FROM_BUILTIN_1: DiagnosticMessage = diag!("KT5006", Error, "Type '{0}' cannot derive from built-in type '{1}'.");
    pub const MEMBER_0_HIDES_INHERITED_MEMBER_OF_1: DiagnosticMessage = diag!("KT5007", Error, "Member '{0}' hides an inherited member of '{1}'.");

    // ========================================================================
    // Program shape errors (6000-6099)
    // ========================================================================
    pub const GLOBAL_STATEMENTS_MUST_BE_CONFINED_TO_A_SINGLE_FILE: DiagnosticMessage = diag!("KT6001", Error, "Global statements must be confined to a single file.");
    pub const MAIN_CANNOT_BE_DECLARED_IN_A_SCRIPT: DiagnosticMessage = diag!("KT6002", Error, "'main' cannot be declared when compiling a script.");
    pub const MAIN_MUST_HAVE_THE_CORRECT_SIGNATURE: DiagnosticMessage = diag!("KT6003", Error, "'main' must be static, take no parameters and return Void.");
    pub const MAIN_CANNOT_BE_USED_WITH_GLOBAL_STATEMENTS: DiagnosticMessage = diag!("KT6004", Error, "'main' cannot be declared together with global statements.");
    pub const TYPE_0_CONFLICTS_WITH_THE_ENTRY_POINT_TYPE: DiagnosticMessage = diag!("KT6005", Error, "Type '{0}' conflicts with the synthesized entry-point type.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use kite_core::text::TextSpan;

    fn at(start: u32) -> Location {
        Location::new(SourceId(0), TextSpan::new(start, 3))
    }

    #[test]
    fn test_format_message() {
        let msg = format_message("Cannot convert type '{0}' to '{1}'.", &["Int", "Bool"]);
        assert_eq!(msg, "Cannot convert type 'Int' to 'Bool'.");
    }

    #[test]
    fn test_format_message_no_args() {
        let msg = format_message("Expression must have a value.", &[]);
        assert_eq!(msg, "Expression must have a value.");
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::with_location(at(10), &messages::THE_NAME_0_DOES_NOT_EXIST, &["foo"]);
        let display = format!("{}", diag);
        assert!(display.contains("KT2001"));
        assert!(display.contains("foo"));
    }

    #[test]
    fn test_diagnostic_render_with_line_info() {
        let mut sources = SourceFiles::new();
        sources.add(SourceId(0), "main.kt", LineMap::new("class A {}\nvar x = y\n"));
        let diag = Diagnostic::with_location(at(19), &messages::THE_NAME_0_DOES_NOT_EXIST, &["y"]);
        assert_eq!(
            diag.render(&sources),
            "main.kt(2,9): error KT2001: The name 'y' does not exist in the current context."
        );
    }

    #[test]
    fn test_collection_deduplicates_identical_findings() {
        let mut collection = DiagnosticCollection::new();
        assert!(collection.add(Diagnostic::with_location(at(1), &messages::THE_NAME_0_DOES_NOT_EXIST, &["x"])));
        assert!(!collection.add(Diagnostic::with_location(at(1), &messages::THE_NAME_0_DOES_NOT_EXIST, &["x"])));
        // Same code and message, different location: a distinct finding.
        assert!(collection.add(Diagnostic::with_location(at(5), &messages::THE_NAME_0_DOES_NOT_EXIST, &["x"])));
        // Same location, different message.
        assert!(collection.add(Diagnostic::with_location(at(1), &messages::THE_NAME_0_DOES_NOT_EXIST, &["y"])));
        assert_eq!(collection.len(), 3);
        assert!(collection.has_errors());
        assert_eq!(collection.error_count(), 3);
    }

    #[test]
    fn test_extend_keeps_deduplication() {
        let mut a = DiagnosticCollection::new();
        a.report(at(1), &messages::EXPRESSION_MUST_HAVE_A_VALUE, &[]);
        let mut b = DiagnosticCollection::new();
        b.report(at(1), &messages::EXPRESSION_MUST_HAVE_A_VALUE, &[]);
        b.report_global(&messages::GLOBAL_STATEMENTS_MUST_BE_CONFINED_TO_A_SINGLE_FILE, &[]);
        a.extend(b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_collection_sort() {
        let mut collection = DiagnosticCollection::new();
        collection.report(Location::new(SourceId(1), TextSpan::new(0, 1)), &messages::EXPRESSION_MUST_HAVE_A_VALUE, &[]);
        collection.report(at(9), &messages::EXPRESSION_MUST_HAVE_A_VALUE, &[]);
        collection.report(at(2), &messages::EXPRESSION_MUST_HAVE_A_VALUE, &[]);
        collection.report_global(&messages::GLOBAL_STATEMENTS_MUST_BE_CONFINED_TO_A_SINGLE_FILE, &[]);
        collection.sort();
        let starts: Vec<_> = collection
            .diagnostics()
            .iter()
            .map(|d| d.location.map(|l| (l.source.0, l.span.start)))
            .collect();
        assert_eq!(starts, vec![None, Some((0, 2)), Some((0, 9)), Some((1, 0))]);
    }
}
