use std::fmt;

/// Fully-qualified name of a type, function or module.
///
/// # Examples
///
/// ```
/// use dotlin_core::QualifiedName;
///
/// let int = QualifiedName::new("Int", vec!["dotlin".into(), "lang".into()]);
/// assert_eq!(int.to_string(), "dotlin.lang.Int");
/// assert_eq!(int.simple_name(), "Int");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    /// Simple name (e.g., "Int", "opPlus")
    pub name: String,
    /// Module path (e.g., ["dotlin", "lang"]); empty for the root package
    pub package: Vec<String>,
}

impl QualifiedName {
    /// Create a new qualified name inside a package.
    pub fn new(name: impl Into<String>, package: Vec<String>) -> Self {
        Self {
            name: name.into(),
            package,
        }
    }

    /// Create a qualified name in the root package.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: Vec::new(),
        }
    }

    /// Create from a dotted string (e.g., "dotlin.lang.Int").
    ///
    /// The last segment is the name, the rest is the package.
    pub fn from_dotted(s: &str) -> Self {
        let mut parts: Vec<String> = s
            .split('.')
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        match parts.pop() {
            Some(name) => Self {
                name,
                package: parts,
            },
            None => Self::root(""),
        }
    }

    /// Get the simple (unqualified) name.
    pub fn simple_name(&self) -> &str {
        &self.name
    }

    /// Get the package path.
    pub fn package_path(&self) -> &[String] {
        &self.package
    }

    /// Check if this name lives in the root package.
    pub fn is_root(&self) -> bool {
        self.package.is_empty()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.package {
            write!(f, "{}.", segment)?;
        }
        write!(f, "{}", self.name)
    }
}
