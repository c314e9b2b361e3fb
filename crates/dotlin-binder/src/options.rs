//! Binder configuration.

/// Switches that change what the binder reports, never what it resolves.
///
/// ```
/// use dotlin_binder::BinderOptions;
///
/// let options = BinderOptions::default().with_warn_on_recursive_purity(false);
/// assert!(options.report_ambiguous_overloads);
/// assert!(!options.warn_on_recursive_purity);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinderOptions {
    /// Report `AmbiguousInvocation` when the two best overloads are equally specific.
    /// Dispatch uses the first in declaration order either way.
    pub report_ambiguous_overloads: bool,
    /// Warn when a purity check runs into a function whose own check is still running.
    pub warn_on_recursive_purity: bool,
    /// Chain every user module beneath `dotlin.lang` so the built-ins are visible
    /// without an explicit import.
    pub implicit_builtin_import: bool,
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            report_ambiguous_overloads: true,
            warn_on_recursive_purity: true,
            implicit_builtin_import: true,
        }
    }
}

impl BinderOptions {
    pub fn with_report_ambiguous_overloads(mut self, enabled: bool) -> Self {
        self.report_ambiguous_overloads = enabled;
        self
    }

    pub fn with_warn_on_recursive_purity(mut self, enabled: bool) -> Self {
        self.warn_on_recursive_purity = enabled;
        self
    }

    pub fn with_implicit_builtin_import(mut self, enabled: bool) -> Self {
        self.implicit_builtin_import = enabled;
        self
    }
}
