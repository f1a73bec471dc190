//! MSR - Music Score Representation skeleton builder
//!
//! This library reads the `<part-list>` of a MusicXML document and builds
//! the skeleton of a score representation tree: parts and part-groups,
//! properly nested under an implicit outermost group. Part-group markup is
//! positional and allows structurally impossible (overlapping) groupings;
//! those are detected and reported as diagnostics rather than silently
//! accepted.

pub mod builder;
pub mod diagnostics;
pub mod error;
pub mod positions;
pub mod registry;
pub mod skeleton;
pub mod types;
pub mod xml;

// Re-export commonly used types
pub use builder::SkeletonBuilder;
pub use builder::build_skeleton;
pub use diagnostics::Diagnostic;
pub use diagnostics::DiagnosticKind;
pub use error::SkeletonError;
pub use skeleton::ScoreSkeleton;
pub use types::descriptor::GroupDescriptor;
pub use types::event::PartListEvent;
pub use types::part::Part;
pub use types::part_group::GroupBarline;
pub use types::part_group::GroupSymbol;
pub use types::part_group::PartGroup;
pub use types::part_group::ScoreElement;
pub use xml::parse_part_list;
