use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::SkeletonError;
use crate::positions::PositionTable;
use crate::registry::{GroupRegistry, PartRegistry};
use crate::skeleton::ScoreSkeleton;
use crate::types::event::PartListEvent;
use crate::types::part::Part;
use crate::types::part_group::{PartGroup, ScoreElement};
use log::{debug, warn};

/// LIFO of the descriptors whose groups contain the current position,
/// innermost on top. Pairing correctness is checked by the builder when
/// it pops; the stack itself does not validate anything.
#[derive(Debug)]
struct NestingStack {
    entries: Vec<usize>,
}

impl NestingStack {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn push(&mut self, descriptor: usize) {
        self.entries.push(descriptor);
    }

    fn top(&self) -> Option<usize> {
        self.entries.last().copied()
    }

    fn pop(&mut self) -> Option<usize> {
        self.entries.pop()
    }

    /// Remove a descriptor from anywhere in the stack. Only the overlap
    /// recovery path uses this.
    fn remove(&mut self, descriptor: usize) -> bool {
        match self.entries.iter().rposition(|&e| e == descriptor) {
            Some(at) => {
                self.entries.remove(at);
                true
            }
            None => false,
        }
    }
}

/// Builds the part/part-group skeleton of a score from its part-list
/// events.
///
/// The build is two passes. The first pass (`handle`) only records what
/// it sees: parts get positions, and every group descriptor closed by a
/// stop event is filed in the position table at both its endpoints.
/// Nothing is nested yet, because a group's stop position is unknown
/// until its stop event arrives. The second pass (`finish`) replays the
/// positions in order and resolves containment, which is where
/// overlapping markup is caught.
///
/// One builder serves one document; all counters live here, so separate
/// documents never contaminate each other.
pub struct SkeletonBuilder {
    parts: PartRegistry,
    groups: Vec<PartGroup>,
    registry: GroupRegistry,
    positions: PositionTable,
    diagnostics: Vec<Diagnostic>,
    /// Descriptor the next group-name/symbol/barline event applies to.
    last_opened: Option<usize>,
    /// Descriptor of the implicit outermost group.
    implicit: usize,
}

/// Run a full event stream through a fresh builder.
pub fn build_skeleton(
    events: impl IntoIterator<Item = PartListEvent>,
) -> Result<ScoreSkeleton, SkeletonError> {
    let mut builder = SkeletonBuilder::new();
    let mut end_line = 0;
    for event in events {
        if let PartListEvent::EndOfList { line } = event {
            end_line = line;
        } else {
            builder.handle(event);
        }
    }
    builder.finish(end_line)
}

impl Default for SkeletonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SkeletonBuilder {
    pub fn new() -> Self {
        // The implicit group exists before any event and outlives them
        // all; everything ends up inside it.
        let groups = vec![PartGroup::new(0, 0)];
        let mut registry = GroupRegistry::new();
        let implicit = registry.open_outermost(0);
        let mut positions = PositionTable::new();
        positions.extend();

        Self {
            parts: PartRegistry::new(),
            groups,
            registry,
            positions,
            diagnostics: Vec::new(),
            last_opened: None,
            implicit,
        }
    }

    /// First-pass handling of one part-list event. `EndOfList` is not
    /// consumed here; pass its line to [`SkeletonBuilder::finish`].
    pub fn handle(&mut self, event: PartListEvent) {
        match event {
            PartListEvent::GroupStart { number, line } => self.group_start(number, line),
            PartListEvent::GroupStop { number, line } => self.group_stop(number, line),
            PartListEvent::GroupName { value, line } => {
                if let Some(group) = self.open_group_mut("group-name", line) {
                    group.name = Some(value);
                }
            }
            PartListEvent::GroupAbbreviation { value, line } => {
                if let Some(group) = self.open_group_mut("group-abbreviation", line) {
                    group.abbreviation = Some(value);
                }
            }
            PartListEvent::GroupSymbol { symbol, line } => {
                if let Some(group) = self.open_group_mut("group-symbol", line) {
                    group.symbol = symbol;
                }
            }
            PartListEvent::GroupBarline { barline, line } => {
                if let Some(group) = self.open_group_mut("group-barline", line) {
                    group.barline = barline;
                }
            }
            PartListEvent::ScorePart {
                id,
                name,
                abbreviation,
                instrument,
                line,
            } => self.score_part(id, name, abbreviation, instrument, line),
            PartListEvent::EndOfList { .. } => {}
        }
    }

    /// End of the part-list: force-close anything left open, close the
    /// implicit group with the open-ended sentinel, then resolve nesting.
    pub fn finish(mut self, line: usize) -> Result<ScoreSkeleton, SkeletonError> {
        let stop_position = self.parts.len();
        for number in self.registry.open_numbers() {
            if let Some(descriptor) = self.registry.fetch_open(number) {
                self.report(
                    DiagnosticKind::UnclosedGroup,
                    line,
                    format!("part-group {} is never stopped", number),
                );
                self.registry
                    .close(descriptor, stop_position, line, &mut self.positions);
            }
        }

        self.registry
            .close(self.implicit, usize::MAX, line, &mut self.positions);

        self.nest_and_allocate()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn group_start(&mut self, number: i32, line: usize) {
        if self.registry.fetch_open(number).is_some() {
            self.report(
                DiagnosticKind::DuplicateStart,
                line,
                format!("part-group {} started again before being stopped", number),
            );
        }

        let index = self.groups.len();
        self.groups.push(PartGroup::new(number, index));
        let descriptor = self
            .registry
            .open(number, index, self.parts.len(), line);
        self.last_opened = Some(descriptor);
        debug!(
            "part-group {} starts at position {}",
            number,
            self.parts.len()
        );
    }

    fn group_stop(&mut self, number: i32, line: usize) {
        let Some(descriptor) = self.registry.fetch_open(number) else {
            self.report(
                DiagnosticKind::UnmatchedStop,
                line,
                format!("part-group {} stop without matching start", number),
            );
            return;
        };

        let stop_position = self.parts.len();
        if stop_position == self.registry.descriptor(descriptor).start_position {
            self.report(
                DiagnosticKind::EmptyGroup,
                line,
                format!("part-group {} contains no parts", number),
            );
        }
        self.registry
            .close(descriptor, stop_position, line, &mut self.positions);
        debug!("part-group {} stops at position {}", number, stop_position);
    }

    fn score_part(
        &mut self,
        id: String,
        name: Option<String>,
        abbreviation: Option<String>,
        instrument: Option<String>,
        line: usize,
    ) {
        if self.parts.contains(&id) {
            self.report(
                DiagnosticKind::DuplicatePartId,
                line,
                format!("score-part \"{}\" already declared", id),
            );
        }

        let position = self.parts.len() + 1;
        let mut part = Part::new(id, position, line);
        part.name = name;
        part.abbreviation = abbreviation;
        part.instrument = instrument;
        debug!("{} at position {}", part, position);
        self.parts.register(part, &mut self.positions);
    }

    /// The group the next presentation value applies to: the most
    /// recently opened descriptor, provided it has not been stopped yet.
    fn open_group_mut(&mut self, what: &str, line: usize) -> Option<&mut PartGroup> {
        match self.last_opened {
            Some(descriptor) if self.registry.descriptor(descriptor).is_open() => {
                let group = self.registry.descriptor(descriptor).group;
                Some(&mut self.groups[group])
            }
            _ => {
                self.report(
                    DiagnosticKind::StrayGroupAttribute,
                    line,
                    format!("{} outside an open part-group", what),
                );
                None
            }
        }
    }

    /// Second pass: replay positions 0..=partCount. At each position the
    /// pending part joins the innermost open group, then groups stopping
    /// here pop (innermost first) and link into their container, then
    /// groups starting here push (outermost first). A stop whose
    /// descriptor is not on top of the stack is an overlap.
    fn nest_and_allocate(mut self) -> Result<ScoreSkeleton, SkeletonError> {
        let mut stack = NestingStack::new();
        let part_count = self.parts.len();

        for position in 0..=part_count {
            if position > 0 {
                let Some(top) = stack.top() else {
                    return Err(SkeletonError::MissingContainer { position });
                };
                let group = self.registry.descriptor(top).group;
                let part_index = position - 1;
                self.parts.part_mut(part_index).group = Some(group);
                self.groups[group].children.push(ScoreElement::Part(part_index));
            }

            for descriptor in self.positions.stopping_at(position) {
                if stack.top() == Some(descriptor) {
                    stack.pop();
                    if descriptor != self.implicit {
                        let Some(container) = stack.top() else {
                            return Err(SkeletonError::MissingContainer { position });
                        };
                        let group = self.registry.descriptor(descriptor).group;
                        let container_group = self.registry.descriptor(container).group;
                        self.link(group, container_group);
                    }
                } else {
                    self.overlap(&mut stack, descriptor, position);
                }
            }

            for descriptor in self.positions.starting_at(position) {
                stack.push(descriptor);
            }
        }

        // Only the implicit descriptor may survive the replay.
        if stack.len() != 1 || stack.top() != Some(self.implicit) {
            return Err(SkeletonError::UnbalancedStack {
                remaining: stack.len(),
            });
        }

        let (parts, by_id) = self.parts.into_parts();
        Ok(ScoreSkeleton {
            parts,
            by_id,
            groups: self.groups,
            descriptors: self.registry.into_descriptors(),
            diagnostics: self.diagnostics,
        })
    }

    fn link(&mut self, group: usize, container: usize) {
        self.groups[group].parent = Some(container);
        self.groups[container].children.push(ScoreElement::Group(group));
        debug!(
            "{} nested inside {}",
            self.groups[group], self.groups[container]
        );
    }

    /// A group stopped while a different group sits on top of the stack:
    /// the two position intervals cross without one containing the other.
    /// Report it, then pull the stopped group out of the chain and attach
    /// it directly to the score so no part silently disappears.
    fn overlap(&mut self, stack: &mut NestingStack, descriptor: usize, position: usize) {
        let stopped = self.registry.descriptor(descriptor);
        let line = stopped.stop_line.unwrap_or(0);
        let message = match stack.top() {
            Some(rival) => {
                let rival = self.registry.descriptor(rival);
                let from = stopped.start_position.max(rival.start_position) + 1;
                let shared: Vec<&str> = (from..=position)
                    .map(|p| self.parts.part(p - 1).id.as_str())
                    .collect();
                format!(
                    "{} overlaps {}: parts {} belong to both, so neither group can \
                     contain the other; the stopped group was attached to the score \
                     instead (if this score is valid, please file a bug report)",
                    stopped,
                    rival,
                    shared.join(", "),
                )
            }
            None => format!("{} stops with no group left open", stopped),
        };
        self.report(DiagnosticKind::OverlappingGroups, line, message);

        if stack.remove(descriptor) {
            let group = self.registry.descriptor(descriptor).group;
            self.link(group, 0);
        }
    }

    fn report(&mut self, kind: DiagnosticKind, line: usize, message: String) {
        let diagnostic = Diagnostic::new(kind, line, message);
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}
