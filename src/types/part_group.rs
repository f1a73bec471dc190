use anyhow::anyhow;
use std::fmt;
use std::str::FromStr;

/// The `<group-symbol>` drawn left of the staves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupSymbol {
    #[default]
    None,
    Brace,
    Bracket,
    Line,
    Square,
}

impl fmt::Display for GroupSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GroupSymbol::None => "none",
            GroupSymbol::Brace => "brace",
            GroupSymbol::Bracket => "bracket",
            GroupSymbol::Line => "line",
            GroupSymbol::Square => "square",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for GroupSymbol {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" => Ok(GroupSymbol::None),
            "brace" => Ok(GroupSymbol::Brace),
            "bracket" => Ok(GroupSymbol::Bracket),
            "line" => Ok(GroupSymbol::Line),
            "square" => Ok(GroupSymbol::Square),
            _ => Err(anyhow!("Invalid group symbol: {}", s)),
        }
    }
}

/// The `<group-barline>` policy: whether barlines run through the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBarline {
    #[default]
    Yes,
    No,
    Mensurstrich,
}

impl fmt::Display for GroupBarline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GroupBarline::Yes => "yes",
            GroupBarline::No => "no",
            GroupBarline::Mensurstrich => "Mensurstrich",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for GroupBarline {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "yes" => Ok(GroupBarline::Yes),
            "no" => Ok(GroupBarline::No),
            "Mensurstrich" => Ok(GroupBarline::Mensurstrich),
            _ => Err(anyhow!("Invalid group barline: {}", s)),
        }
    }
}

/// A child of a part-group: either a part or a nested part-group,
/// both referred to by arena index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreElement {
    Part(usize),
    Group(usize),
}

/// One resolved `<part-group>`.
///
/// The external number can be reused within a document, so every group
/// also carries its permanent arena index. Index 0 is the implicit group
/// that ultimately contains everything.
#[derive(Debug, Clone, PartialEq)]
pub struct PartGroup {
    pub number: i32,
    pub index: usize,
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    pub symbol: GroupSymbol,
    pub barline: GroupBarline,
    pub children: Vec<ScoreElement>,
    /// Arena index of the containing part-group, set once during nesting.
    /// Only the implicit group stays without a parent.
    pub parent: Option<usize>,
}

impl PartGroup {
    pub fn new(number: i32, index: usize) -> Self {
        Self {
            number,
            index,
            name: None,
            abbreviation: None,
            symbol: GroupSymbol::default(),
            barline: GroupBarline::default(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn is_implicit(&self) -> bool {
        self.index == 0
    }
}

impl fmt::Display for PartGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_implicit() {
            write!(f, "score")?;
        } else {
            write!(f, "part-group {}", self.number)?;
        }
        if let Some(name) = &self.name {
            write!(f, " \"{}\"", name)?;
        }
        if self.symbol != GroupSymbol::None {
            write!(f, " [{}]", self.symbol)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_round_trip() {
        for s in ["none", "brace", "bracket", "line", "square"] {
            assert_eq!(s.parse::<GroupSymbol>().unwrap().to_string(), s);
        }
        assert!("curly".parse::<GroupSymbol>().is_err());
        assert!("".parse::<GroupSymbol>().is_err());
    }

    #[test]
    fn test_barline_round_trip() {
        for s in ["yes", "no", "Mensurstrich"] {
            assert_eq!(s.parse::<GroupBarline>().unwrap().to_string(), s);
        }
        // MusicXML spells this value capitalized
        assert!("mensurstrich".parse::<GroupBarline>().is_err());
    }

    #[test]
    fn test_display() {
        let mut group = PartGroup::new(2, 1);
        assert_eq!(group.to_string(), "part-group 2");

        group.name = Some("Strings".to_string());
        group.symbol = GroupSymbol::Bracket;
        assert_eq!(group.to_string(), "part-group 2 \"Strings\" [bracket]");

        let implicit = PartGroup::new(0, 0);
        assert_eq!(implicit.to_string(), "score");
    }
}
