use thiserror::Error;

/// Fatal structural failures. These mean the builder state itself is
/// inconsistent, so the document is abandoned rather than finished into a
/// structurally unsound tree. User-input problems are reported through
/// [`crate::diagnostics::Diagnostic`] instead and never abort the build.
#[derive(Error, Debug)]
pub enum SkeletonError {
    #[error("no enclosing part-group for the part at position {position}")]
    MissingContainer { position: usize },

    #[error("part-group stack unbalanced after allocation ({remaining} entries left)")]
    UnbalancedStack { remaining: usize },
}
