//! Language-specific analyzer implementations.

mod java;
mod javascript;
mod python;
mod typescript;

pub use java::JavaAnalyzer;
pub use javascript::JavaScriptAnalyzer;
pub use python::PythonAnalyzer;
pub use typescript::TypeScriptAnalyzer;

use super::LanguageAnalyzer;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};

/// Static storage for Java analyzer.
static JAVA_ANALYZER: OnceCell<JavaAnalyzer> = OnceCell::new();

/// Static storage for JavaScript analyzer.
static JAVASCRIPT_ANALYZER: OnceCell<JavaScriptAnalyzer> = OnceCell::new();

/// Static storage for Python analyzer.
static PYTHON_ANALYZER: OnceCell<PythonAnalyzer> = OnceCell::new();

/// Static storage for TypeScript analyzer.
static TYPESCRIPT_ANALYZER: OnceCell<TypeScriptAnalyzer> = OnceCell::new();

/// Whether analyzers have been registered.
static REGISTERED: AtomicBool = AtomicBool::new(false);

/// Register all available language analyzers.
///
/// Idempotent; safe to call from multiple entry points.
pub fn register_analyzers() {
    if REGISTERED.swap(true, Ordering::SeqCst) {
        return; // Already registered
    }

    JAVA_ANALYZER.get_or_init(JavaAnalyzer::new);
    JAVASCRIPT_ANALYZER.get_or_init(JavaScriptAnalyzer::new);
    PYTHON_ANALYZER.get_or_init(PythonAnalyzer::new);
    TYPESCRIPT_ANALYZER.get_or_init(TypeScriptAnalyzer::new);
}

/// Get an analyzer for the given file extension.
///
/// Returns None if no analyzer is registered for the extension.
pub fn get_analyzer(ext: &str) -> Option<&'static dyn LanguageAnalyzer> {
    // Ensure analyzers are registered
    register_analyzers();

    match ext {
        "java" => JAVA_ANALYZER.get().map(|a| a as &'static dyn LanguageAnalyzer),
        "js" | "jsx" | "mjs" | "cjs" => {
            JAVASCRIPT_ANALYZER.get().map(|a| a as &'static dyn LanguageAnalyzer)
        }
        "py" => PYTHON_ANALYZER.get().map(|a| a as &'static dyn LanguageAnalyzer),
        "ts" | "tsx" | "mts" => {
            TYPESCRIPT_ANALYZER.get().map(|a| a as &'static dyn LanguageAnalyzer)
        }
        _ => None,
    }
}

/// Language identifier for a file extension, if supported.
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "java" => Some("java"),
        "js" | "jsx" | "mjs" | "cjs" => Some("javascript"),
        "py" => Some("python"),
        "ts" | "tsx" | "mts" => Some("typescript"),
        _ => None,
    }
}
