use std::fmt;

use crate::{SemanticError, Span};

/// The severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Informational message; never affects success.
    Info,
    /// Suspicious but valid code.
    Warning,
    /// The program is invalid.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single diagnostic produced while binding.
///
/// Carries the structured [`SemanticError`] so that consumers can match on the kind;
/// the human-readable message is its `Display` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// What went wrong, with its location.
    pub error: SemanticError,
}

impl Diagnostic {
    /// Create an error-level diagnostic.
    pub fn error(error: SemanticError) -> Self {
        Self {
            severity: Severity::Error,
            error,
        }
    }

    /// Create a warning-level diagnostic.
    pub fn warning(error: SemanticError) -> Self {
        Self {
            severity: Severity::Warning,
            error,
        }
    }

    /// Wrap a message from the parsing layer.
    pub fn forwarded(severity: Severity, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity,
            error: SemanticError::Forwarded {
                message: message.into(),
                span,
            },
        }
    }

    /// The human-readable message.
    pub fn message(&self) -> String {
        self.error.to_string()
    }

    /// Where the problem is.
    pub fn span(&self) -> Span {
        self.error.span()
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.error)
    }
}

impl From<SemanticError> for Diagnostic {
    fn from(error: SemanticError) -> Self {
        Diagnostic::error(error)
    }
}

/// An ordered collection of diagnostics.
///
/// Keeps insertion order and tracks whether any error was added, so the common
/// "did it succeed" query needs no scan.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl Diagnostics {
    /// Creates a new, empty diagnostics collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic to the collection.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Adds every diagnostic from an iterator, keeping their order.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    /// Returns `true` if the collection contains any error diagnostics.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Returns `true` if the collection contains no diagnostics.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns the total number of diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Iterates over all diagnostics in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Iterates over the error diagnostics only.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Iterates over the warning diagnostics only.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Consumes the collection, returning the diagnostics in order.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn undefined(name: &str) -> SemanticError {
        SemanticError::UndefinedIdentifier {
            name: name.into(),
            span: Span::new(1, 1, name.len() as u32),
        }
    }

    #[test]
    fn tracks_errors() {
        let mut diagnostics = Diagnostics::new();
        assert!(!diagnostics.has_errors());

        diagnostics.push(Diagnostic::warning(undefined("a")));
        assert!(!diagnostics.has_errors());

        diagnostics.push(Diagnostic::error(undefined("b")));
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.errors().count(), 1);
        assert_eq!(diagnostics.warnings().count(), 1);
    }

    #[test]
    fn display_prefixes_severity() {
        let diagnostic = Diagnostic::error(undefined("x"));
        assert_eq!(diagnostic.to_string(), "error: at 1:1: undefined identifier 'x'");
    }

    #[test]
    fn forwarded_keeps_message() {
        let diagnostic = Diagnostic::forwarded(Severity::Warning, "missing newline", Span::new(4, 1, 0));
        assert_eq!(diagnostic.message(), "at 4:1: missing newline");
        assert_eq!(diagnostic.severity, Severity::Warning);
    }
}
