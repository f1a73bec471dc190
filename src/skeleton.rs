use crate::diagnostics::Diagnostic;
use crate::types::descriptor::GroupDescriptor;
use crate::types::part::Part;
use crate::types::part_group::{PartGroup, ScoreElement};
use std::collections::HashMap;
use std::fmt;

/// The finished part/part-group skeleton of one score.
///
/// Parts and groups live in arenas; `groups[0]` is the implicit group
/// that directly or indirectly contains everything. The descriptor
/// ledger keeps every observed part-group start/stop for diagnostics,
/// including abandoned ones.
#[derive(Debug, Clone)]
pub struct ScoreSkeleton {
    pub parts: Vec<Part>,
    pub by_id: HashMap<String, usize>,
    pub groups: Vec<PartGroup>,
    pub descriptors: Vec<GroupDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ScoreSkeleton {
    pub fn implicit_group(&self) -> &PartGroup {
        &self.groups[0]
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn part_by_id(&self, id: &str) -> Option<&Part> {
        self.by_id.get(id).map(|&index| &self.parts[index])
    }

    /// Depth-first traversal of every element below the implicit group,
    /// in score order. The callback receives the nesting depth (0 for
    /// direct children of the score) and the element.
    pub fn walk<F: FnMut(usize, &ScoreElement)>(&self, mut f: F) {
        self.walk_from(0, 0, &mut f);
    }

    fn walk_from<F: FnMut(usize, &ScoreElement)>(&self, group: usize, depth: usize, f: &mut F) {
        for child in &self.groups[group].children {
            f(depth, child);
            if let ScoreElement::Group(sub) = child {
                self.walk_from(*sub, depth + 1, f);
            }
        }
    }

    fn fmt_group(&self, f: &mut fmt::Formatter<'_>, group: usize, depth: usize) -> fmt::Result {
        for child in &self.groups[group].children {
            match child {
                ScoreElement::Part(p) => {
                    writeln!(f, "{}{}", "  ".repeat(depth), self.parts[*p])?;
                }
                ScoreElement::Group(g) => {
                    writeln!(f, "{}{}", "  ".repeat(depth), self.groups[*g])?;
                    self.fmt_group(f, *g, depth + 1)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for ScoreSkeleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "score ({} parts, {} part-groups)",
            self.parts.len(),
            self.groups.len() - 1
        )?;
        self.fmt_group(f, 0, 1)
    }
}
