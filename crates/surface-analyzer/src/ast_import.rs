//! External-package import descriptors.

/// What an external import binds: a named export (possibly `default`) or
/// the module's namespace object.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExportName {
    Named(String),
    Namespace,
}

/// Origin of a symbol imported from outside the project.
///
/// Value type: two imports with equal fields are interchangeable, and the
/// symbol table deduplicates symbols by this value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AstImport {
    /// Module specifier of the external package (never a relative path).
    pub module_path: String,
    pub export_name: ExportName,
}

impl AstImport {
    pub fn named(module_path: impl Into<String>, export_name: impl Into<String>) -> AstImport {
        AstImport {
            module_path: module_path.into(),
            export_name: ExportName::Named(export_name.into()),
        }
    }

    pub fn namespace(module_path: impl Into<String>) -> AstImport {
        AstImport {
            module_path: module_path.into(),
            export_name: ExportName::Namespace,
        }
    }

    /// Whether this is a default import (`import X from 'pkg'`).
    pub fn is_default(&self) -> bool {
        matches!(&self.export_name, ExportName::Named(n) if n == "default")
    }
}

/// Whether a module specifier stays within the project.
pub fn is_local_module_path(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_identity() {
        let a = AstImport::named("widgets", "Widget");
        let b = AstImport::named("widgets", "Widget");
        assert_eq!(a, b);
        assert_ne!(a, AstImport::named("widgets", "Gadget"));
        assert_ne!(a, AstImport::namespace("widgets"));
    }

    #[test]
    fn test_local_module_paths() {
        assert!(is_local_module_path("./helpers"));
        assert!(is_local_module_path("../lib/helpers"));
        assert!(!is_local_module_path("widgets"));
        assert!(!is_local_module_path("@scope/widgets"));
    }
}
