use std::fmt;

/// One observed start/stop occurrence of a part-group.
///
/// Not the same thing as a part-group number: a number can be closed and
/// reopened later in the same part-list, which produces a second
/// descriptor for the same number. Descriptors are never deleted; the
/// all-time ledger keeps them for diagnostics after the build.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDescriptor {
    pub number: i32,
    /// Arena index of the group this descriptor opened.
    pub group: usize,
    /// Part count at the time of the start.
    pub start_position: usize,
    pub start_line: usize,
    /// Part count at the time of the stop; `None` while still open.
    /// The implicit outermost group closes with `usize::MAX` so that it
    /// sorts as last-closing everywhere.
    pub stop_position: Option<usize>,
    pub stop_line: Option<usize>,
}

impl GroupDescriptor {
    pub fn new(number: i32, group: usize, start_position: usize, start_line: usize) -> Self {
        Self {
            number,
            group,
            start_position,
            start_line,
            stop_position: None,
            stop_line: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.stop_position.is_none()
    }

    /// Stop position for ordering purposes; an open descriptor sorts as
    /// open-ended.
    pub fn sort_stop_position(&self) -> usize {
        self.stop_position.unwrap_or(usize::MAX)
    }
}

impl fmt::Display for GroupDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "part-group {} (positions {}..", self.number, self.start_position)?;
        match self.stop_position {
            Some(usize::MAX) => write!(f, "end")?,
            Some(stop) => write!(f, "{}", stop)?,
            None => write!(f, "?")?,
        }
        write!(f, ", line {})", self.start_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let mut descriptor = GroupDescriptor::new(3, 1, 2, 14);
        assert!(descriptor.is_open());
        assert_eq!(descriptor.to_string(), "part-group 3 (positions 2..?, line 14)");

        descriptor.stop_position = Some(5);
        descriptor.stop_line = Some(30);
        assert!(!descriptor.is_open());
        assert_eq!(descriptor.to_string(), "part-group 3 (positions 2..5, line 14)");
        assert_eq!(descriptor.sort_stop_position(), 5);
    }
}
