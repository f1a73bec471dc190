use crate::types::part_group::{GroupBarline, GroupSymbol};
use std::fmt;

/// One element of the `<part-list>`, in document order.
///
/// The group presentation events (name, abbreviation, symbol, barline)
/// always follow the `GroupStart` they belong to, because they are nested
/// children of the `<part-group type="start">` element.
#[derive(Debug, Clone, PartialEq)]
pub enum PartListEvent {
    GroupStart {
        number: i32,
        line: usize,
    },
    GroupStop {
        number: i32,
        line: usize,
    },
    GroupName {
        value: String,
        line: usize,
    },
    GroupAbbreviation {
        value: String,
        line: usize,
    },
    GroupSymbol {
        symbol: GroupSymbol,
        line: usize,
    },
    GroupBarline {
        barline: GroupBarline,
        line: usize,
    },
    ScorePart {
        id: String,
        name: Option<String>,
        abbreviation: Option<String>,
        instrument: Option<String>,
        line: usize,
    },
    EndOfList {
        line: usize,
    },
}

impl PartListEvent {
    /// Source line the event came from.
    pub fn line(&self) -> usize {
        match self {
            PartListEvent::GroupStart { line, .. }
            | PartListEvent::GroupStop { line, .. }
            | PartListEvent::GroupName { line, .. }
            | PartListEvent::GroupAbbreviation { line, .. }
            | PartListEvent::GroupSymbol { line, .. }
            | PartListEvent::GroupBarline { line, .. }
            | PartListEvent::ScorePart { line, .. }
            | PartListEvent::EndOfList { line } => *line,
        }
    }
}

impl fmt::Display for PartListEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartListEvent::GroupStart { number, .. } => {
                write!(f, "part-group {} start", number)
            }
            PartListEvent::GroupStop { number, .. } => {
                write!(f, "part-group {} stop", number)
            }
            PartListEvent::GroupName { value, .. } => {
                write!(f, "group-name \"{}\"", value)
            }
            PartListEvent::GroupAbbreviation { value, .. } => {
                write!(f, "group-abbreviation \"{}\"", value)
            }
            PartListEvent::GroupSymbol { symbol, .. } => {
                write!(f, "group-symbol {}", symbol)
            }
            PartListEvent::GroupBarline { barline, .. } => {
                write!(f, "group-barline {}", barline)
            }
            PartListEvent::ScorePart { id, name, .. } => {
                write!(f, "score-part \"{}\"", id)?;
                if let Some(name) = name {
                    write!(f, " ({})", name)?;
                }
                Ok(())
            }
            PartListEvent::EndOfList { .. } => {
                write!(f, "end of part-list")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line() {
        let event = PartListEvent::GroupStart { number: 1, line: 7 };
        assert_eq!(event.line(), 7);

        let event = PartListEvent::EndOfList { line: 42 };
        assert_eq!(event.line(), 42);
    }

    #[test]
    fn test_display() {
        let event = PartListEvent::ScorePart {
            id: "P1".to_string(),
            name: Some("Flute".to_string()),
            abbreviation: None,
            instrument: None,
            line: 3,
        };
        assert_eq!(event.to_string(), "score-part \"P1\" (Flute)");

        let event = PartListEvent::GroupStop { number: 2, line: 9 };
        assert_eq!(event.to_string(), "part-group 2 stop");
    }
}
