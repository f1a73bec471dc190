use crate::types::event::PartListEvent;
use crate::types::part_group::{GroupBarline, GroupSymbol};
use anyhow::{Context, Result, anyhow, bail};
use roxmltree::{Document, Node};

/// Extract the part-list event stream from a MusicXML document.
///
/// Only the `<part-list>` is read; everything else in the score is left
/// to later build stages. Elements inside the part-list that do not
/// affect the skeleton are skipped. Every event carries the 1-based
/// source line it came from, for diagnostics.
pub fn parse_part_list(xml: &str) -> Result<Vec<PartListEvent>> {
    let doc = Document::parse(xml).context("invalid XML")?;
    let root = doc.root_element();
    let root_name = root.tag_name().name();
    if root_name != "score-partwise" && root_name != "score-timewise" {
        bail!("not a MusicXML score (root element is <{}>)", root_name);
    }

    let Some(part_list) = root.children().find(|n| n.has_tag_name("part-list")) else {
        bail!("missing <part-list>");
    };

    let mut events = Vec::new();
    for child in part_list.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "part-group" => parse_part_group(&doc, child, &mut events)?,
            "score-part" => events.push(parse_score_part(&doc, child)?),
            _ => {}
        }
    }
    events.push(PartListEvent::EndOfList {
        line: doc.text_pos_at(part_list.range().end).row as usize,
    });
    Ok(events)
}

fn parse_part_group(doc: &Document, node: Node, events: &mut Vec<PartListEvent>) -> Result<()> {
    let line = line_of(doc, node);
    let number = match node.attribute("number") {
        Some(value) => value
            .trim()
            .parse::<i32>()
            .map_err(|_| anyhow!("line {}: invalid part-group number \"{}\"", line, value))?,
        // the number attribute defaults to 1
        None => 1,
    };

    match node.attribute("type") {
        Some("start") => {
            events.push(PartListEvent::GroupStart { number, line });
            for child in node.children().filter(|n| n.is_element()) {
                let child_line = line_of(doc, child);
                match child.tag_name().name() {
                    "group-name" => {
                        if let Some(value) = text_of(child) {
                            events.push(PartListEvent::GroupName {
                                value,
                                line: child_line,
                            });
                        }
                    }
                    "group-abbreviation" => {
                        if let Some(value) = text_of(child) {
                            events.push(PartListEvent::GroupAbbreviation {
                                value,
                                line: child_line,
                            });
                        }
                    }
                    "group-symbol" => {
                        let symbol = child
                            .text()
                            .unwrap_or("")
                            .parse::<GroupSymbol>()
                            .map_err(|e| anyhow!("line {}: {}", child_line, e))?;
                        events.push(PartListEvent::GroupSymbol {
                            symbol,
                            line: child_line,
                        });
                    }
                    "group-barline" => {
                        let barline = child
                            .text()
                            .unwrap_or("")
                            .parse::<GroupBarline>()
                            .map_err(|e| anyhow!("line {}: {}", child_line, e))?;
                        events.push(PartListEvent::GroupBarline {
                            barline,
                            line: child_line,
                        });
                    }
                    _ => {}
                }
            }
        }
        Some("stop") => events.push(PartListEvent::GroupStop { number, line }),
        Some(other) => bail!("line {}: invalid part-group type \"{}\"", line, other),
        None => bail!("line {}: part-group without a type attribute", line),
    }
    Ok(())
}

fn parse_score_part(doc: &Document, node: Node) -> Result<PartListEvent> {
    let line = line_of(doc, node);
    let Some(id) = node.attribute("id") else {
        bail!("line {}: score-part without an id attribute", line);
    };

    let mut name = None;
    let mut abbreviation = None;
    let mut instrument = None;
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "part-name" => name = text_of(child),
            "part-abbreviation" => abbreviation = text_of(child),
            "score-instrument" => {
                // a part can declare several instruments; the first one
                // names the part in the skeleton
                if instrument.is_none() {
                    instrument = child
                        .children()
                        .find(|n| n.has_tag_name("instrument-name"))
                        .and_then(text_of);
                }
            }
            _ => {}
        }
    }

    Ok(PartListEvent::ScorePart {
        id: id.to_string(),
        name,
        abbreviation,
        instrument,
        line,
    })
}

fn line_of(doc: &Document, node: Node) -> usize {
    doc.text_pos_at(node.range().start).row as usize
}

fn text_of(node: Node) -> Option<String> {
    node.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_skeleton;
    use crate::diagnostics::DiagnosticKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_part_list() {
        let xml = r#"<?xml version="1.0"?>
<score-partwise version="3.1">
  <part-list>
    <part-group number="1" type="start">
      <group-name>Strings</group-name>
      <group-symbol>bracket</group-symbol>
      <group-barline>yes</group-barline>
    </part-group>
    <score-part id="P1">
      <part-name>Violin I</part-name>
      <part-abbreviation>Vln. I</part-abbreviation>
      <score-instrument id="P1-I1">
        <instrument-name>Violin</instrument-name>
      </score-instrument>
    </score-part>
    <score-part id="P2">
      <part-name>Cello</part-name>
    </score-part>
    <part-group number="1" type="stop"/>
  </part-list>
</score-partwise>"#;

        let events = parse_part_list(xml).unwrap();
        assert_eq!(
            events,
            vec![
                PartListEvent::GroupStart { number: 1, line: 4 },
                PartListEvent::GroupName {
                    value: "Strings".to_string(),
                    line: 5,
                },
                PartListEvent::GroupSymbol {
                    symbol: GroupSymbol::Bracket,
                    line: 6,
                },
                PartListEvent::GroupBarline {
                    barline: GroupBarline::Yes,
                    line: 7,
                },
                PartListEvent::ScorePart {
                    id: "P1".to_string(),
                    name: Some("Violin I".to_string()),
                    abbreviation: Some("Vln. I".to_string()),
                    instrument: Some("Violin".to_string()),
                    line: 9,
                },
                PartListEvent::ScorePart {
                    id: "P2".to_string(),
                    name: Some("Cello".to_string()),
                    abbreviation: None,
                    instrument: None,
                    line: 16,
                },
                PartListEvent::GroupStop { number: 1, line: 19 },
                PartListEvent::EndOfList { line: 20 },
            ]
        );
    }

    #[test]
    fn test_number_defaults_to_one() {
        let xml = r#"<score-partwise>
  <part-list>
    <part-group type="start"/>
    <score-part id="P1"/>
    <part-group type="stop"/>
  </part-list>
</score-partwise>"#;

        let events = parse_part_list(xml).unwrap();
        assert_eq!(events[0], PartListEvent::GroupStart { number: 1, line: 3 });
        assert_eq!(events[2], PartListEvent::GroupStop { number: 1, line: 5 });
    }

    #[test]
    fn test_rejects_non_musicxml() {
        let err = parse_part_list("<html></html>").unwrap_err();
        assert!(err.to_string().contains("not a MusicXML score"));

        let err = parse_part_list("<score-partwise/>").unwrap_err();
        assert!(err.to_string().contains("part-list"));
    }

    #[test]
    fn test_rejects_malformed_elements() {
        let err = parse_part_list(
            "<score-partwise>\n<part-list>\n<score-part/>\n</part-list>\n</score-partwise>",
        )
        .unwrap_err();
        assert!(err.to_string().contains("line 3"));

        let err = parse_part_list(
            "<score-partwise>\n<part-list>\n<part-group number=\"1\"/>\n</part-list>\n</score-partwise>",
        )
        .unwrap_err();
        assert!(err.to_string().contains("type"));

        let err = parse_part_list(
            "<score-partwise>\n<part-list>\n<part-group number=\"x\" type=\"start\"/>\n</part-list>\n</score-partwise>",
        )
        .unwrap_err();
        assert!(err.to_string().contains("number"));

        let err = parse_part_list(
            "<score-partwise>\n<part-list>\n<part-group number=\"1\" type=\"start\">\n<group-symbol>curly</group-symbol>\n</part-group>\n</part-list>\n</score-partwise>",
        )
        .unwrap_err();
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn test_diagnostic_lines_flow_from_the_source() {
        let xml = r#"<score-partwise>
  <part-list>
    <score-part id="P1"/>
    <part-group number="9" type="stop"/>
  </part-list>
</score-partwise>"#;

        let skeleton = build_skeleton(parse_part_list(xml).unwrap()).unwrap();
        assert_eq!(skeleton.diagnostics.len(), 1);
        assert_eq!(skeleton.diagnostics[0].kind, DiagnosticKind::UnmatchedStop);
        assert_eq!(skeleton.diagnostics[0].line, 4);
    }
}
