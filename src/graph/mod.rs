//! Cross-file import graph and dead-code detection.

mod builder;
mod dead_code;

pub use builder::{
    BuildOutcome, DependencyGraph, DependencyGraphBuilder, FileNode, GraphOptions,
    DEFAULT_ENTRY_PATTERNS,
};
pub use dead_code::{
    is_test_file, DeadCodeDetectionResult, DeadCodeDetector, DeadCodeOptions, PossiblyDead,
};
