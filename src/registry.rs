use crate::positions::PositionTable;
use crate::types::descriptor::GroupDescriptor;
use crate::types::part::Part;
use std::collections::HashMap;

/// Parts in appearance order plus by-ID lookup.
///
/// Appearance order equals declaration order, and is the same order used
/// as "position" everywhere else in the build.
#[derive(Debug, Clone)]
pub struct PartRegistry {
    parts: Vec<Part>,
    by_id: HashMap<String, usize>,
}

impl Default for PartRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PartRegistry {
    pub fn new() -> Self {
        Self {
            parts: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Append a part and keep the position table aligned with the part
    /// count. On a duplicate ID the first registration keeps the lookup
    /// entry; the duplicate still occupies its position.
    pub fn register(&mut self, part: Part, positions: &mut PositionTable) -> usize {
        let index = self.parts.len();
        self.by_id.entry(part.id.clone()).or_insert(index);
        self.parts.push(part);
        positions.extend();
        index
    }

    pub fn get(&self, id: &str) -> Option<&Part> {
        self.by_id.get(id).map(|&index| &self.parts[index])
    }

    pub fn part(&self, index: usize) -> &Part {
        &self.parts[index]
    }

    pub fn part_mut(&mut self, index: usize) -> &mut Part {
        &mut self.parts[index]
    }

    pub fn into_parts(self) -> (Vec<Part>, HashMap<String, usize>) {
        (self.parts, self.by_id)
    }
}

/// The number-to-descriptor bookkeeping that lets stop events find their
/// matching start.
///
/// External numbers are reusable, so the all-time ledger is keyed by a
/// monotonic absolute index (the ledger position) while only the
/// "currently open" map is keyed by the external number.
#[derive(Debug, Clone)]
pub struct GroupRegistry {
    descriptors: Vec<GroupDescriptor>,
    open: HashMap<i32, usize>,
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            open: HashMap::new(),
        }
    }

    /// Open a descriptor for `number`. If the number is already open the
    /// new descriptor replaces it as the open one; the abandoned
    /// descriptor stays in the ledger but, never being closed, never
    /// reaches the position table. The caller reports that case.
    pub fn open(&mut self, number: i32, group: usize, start_position: usize, start_line: usize) -> usize {
        let index = self.descriptors.len();
        self.descriptors
            .push(GroupDescriptor::new(number, group, start_position, start_line));
        self.open.insert(number, index);
        index
    }

    /// Open the implicit outermost descriptor. It is not registered under
    /// any external number: the input can never address it, and a score
    /// using number 0 must not collide with it.
    pub fn open_outermost(&mut self, group: usize) -> usize {
        let index = self.descriptors.len();
        self.descriptors.push(GroupDescriptor::new(0, group, 0, 0));
        index
    }

    pub fn fetch_open(&self, number: i32) -> Option<usize> {
        self.open.get(&number).copied()
    }

    /// External numbers currently open, sorted for deterministic
    /// reporting.
    pub fn open_numbers(&self) -> Vec<i32> {
        let mut numbers: Vec<i32> = self.open.keys().copied().collect();
        numbers.sort_unstable();
        numbers
    }

    /// Fill in the stop fields and record the descriptor at both its
    /// start and stop positions (the stop position was unknown at open
    /// time). An empty span never reaches the table, and the outermost
    /// sentinel stop is never recorded as stopping anywhere: the root
    /// stays on the stack floor for the whole replay.
    pub fn close(
        &mut self,
        index: usize,
        stop_position: usize,
        stop_line: usize,
        positions: &mut PositionTable,
    ) {
        let descriptor = &mut self.descriptors[index];
        descriptor.stop_position = Some(stop_position);
        descriptor.stop_line = Some(stop_line);
        if self.open.get(&descriptor.number) == Some(&index) {
            self.open.remove(&descriptor.number);
        }

        if stop_position <= descriptor.start_position {
            return;
        }
        let start_position = descriptor.start_position;
        positions.record_start(start_position, index, stop_position);
        if stop_position < usize::MAX {
            positions.record_stop(stop_position, index, start_position);
        }
    }

    pub fn descriptor(&self, index: usize) -> &GroupDescriptor {
        &self.descriptors[index]
    }

    pub fn descriptors(&self) -> &[GroupDescriptor] {
        &self.descriptors
    }

    pub fn into_descriptors(self) -> Vec<GroupDescriptor> {
        self.descriptors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_parts(registry: &mut PartRegistry, positions: &mut PositionTable, ids: &[&str]) {
        for id in ids {
            let position = registry.len() + 1;
            registry.register(Part::new(id.to_string(), position, 0), positions);
        }
    }

    #[test]
    fn test_positions_increase_by_one() {
        let mut registry = PartRegistry::new();
        let mut positions = PositionTable::new();
        positions.extend();

        register_parts(&mut registry, &mut positions, &["P1", "P2", "P3"]);

        for (index, expected) in [1, 2, 3].into_iter().enumerate() {
            assert_eq!(registry.part(index).position, expected);
        }
        // One slot for position 0 plus one per part.
        assert_eq!(positions.len(), 4);
    }

    #[test]
    fn test_duplicate_id_keeps_first() {
        let mut registry = PartRegistry::new();
        let mut positions = PositionTable::new();
        positions.extend();

        registry.register(Part::new("P1".to_string(), 1, 3), &mut positions);
        registry.register(Part::new("P1".to_string(), 2, 8), &mut positions);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("P1").unwrap().line, 3);
    }

    #[test]
    fn test_number_reuse_yields_distinct_descriptors() {
        let mut registry = GroupRegistry::new();
        let mut positions = PositionTable::new();
        for _ in 0..3 {
            positions.extend();
        }

        let first = registry.open(5, 1, 0, 2);
        registry.close(first, 1, 4, &mut positions);
        let second = registry.open(5, 2, 1, 6);
        registry.close(second, 2, 8, &mut positions);

        assert_ne!(first, second);
        assert_eq!(registry.descriptors().len(), 2);
        assert_eq!(registry.descriptor(first).stop_position, Some(1));
        assert_eq!(registry.descriptor(second).stop_position, Some(2));
        assert!(registry.fetch_open(5).is_none());
    }

    #[test]
    fn test_close_records_both_ends() {
        let mut registry = GroupRegistry::new();
        let mut positions = PositionTable::new();
        for _ in 0..4 {
            positions.extend();
        }

        let descriptor = registry.open(1, 1, 1, 0);
        registry.close(descriptor, 3, 0, &mut positions);

        assert_eq!(positions.starting_at(1), vec![descriptor]);
        assert_eq!(positions.stopping_at(3), vec![descriptor]);
    }

    #[test]
    fn test_empty_span_is_not_recorded() {
        let mut registry = GroupRegistry::new();
        let mut positions = PositionTable::new();
        for _ in 0..2 {
            positions.extend();
        }

        let descriptor = registry.open(1, 1, 1, 0);
        registry.close(descriptor, 1, 0, &mut positions);

        assert!(positions.starting_at(1).is_empty());
        assert!(positions.stopping_at(1).is_empty());
        // The stop fields are still filled in for the ledger.
        assert!(!registry.descriptor(descriptor).is_open());
    }

    #[test]
    fn test_outermost_never_recorded_as_stopping() {
        let mut registry = GroupRegistry::new();
        let mut positions = PositionTable::new();
        positions.extend();

        let outermost = registry.open_outermost(0);
        assert!(registry.fetch_open(0).is_none());

        registry.close(outermost, usize::MAX, 0, &mut positions);
        assert_eq!(positions.starting_at(0), vec![outermost]);
        assert_eq!(positions.stopping_at(0), Vec::<usize>::new());
    }
}
