/// Per part position, the group descriptors starting and stopping there.
///
/// Positions are part counts: slot 0 is "before any part", slot N is
/// "after the Nth part". Both lists keep a deliberate order so that the
/// allocation pass can replay them without a secondary sort:
///
/// - groups starting at a position are kept in descending stop-position
///   order, so the outermost (last-closing) group is pushed first;
/// - groups stopping at a position are kept in descending start-position
///   order, so the innermost (latest-starting) group is popped first.
#[derive(Debug, Clone)]
pub struct PositionTable {
    starting: Vec<Vec<Entry>>,
    stopping: Vec<Vec<Entry>>,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    descriptor: usize,
    key: usize,
}

impl Default for PositionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionTable {
    pub fn new() -> Self {
        Self {
            starting: Vec::new(),
            stopping: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.starting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starting.is_empty()
    }

    /// Append one empty slot; called once for position 0 and once per
    /// registered part.
    pub fn extend(&mut self) {
        self.starting.push(Vec::new());
        self.stopping.push(Vec::new());
    }

    /// Record a descriptor as starting at `position`, ordered by
    /// descending `stop_position`. Equal keys land after existing equal
    /// entries.
    pub fn record_start(&mut self, position: usize, descriptor: usize, stop_position: usize) {
        Self::insert_descending(&mut self.starting[position], descriptor, stop_position);
    }

    /// Record a descriptor as stopping at `position`, ordered by
    /// descending `start_position`. Equal keys land after existing equal
    /// entries.
    pub fn record_stop(&mut self, position: usize, descriptor: usize, start_position: usize) {
        Self::insert_descending(&mut self.stopping[position], descriptor, start_position);
    }

    pub fn starting_at(&self, position: usize) -> Vec<usize> {
        self.starting[position].iter().map(|e| e.descriptor).collect()
    }

    pub fn stopping_at(&self, position: usize) -> Vec<usize> {
        self.stopping[position].iter().map(|e| e.descriptor).collect()
    }

    fn insert_descending(list: &mut Vec<Entry>, descriptor: usize, key: usize) {
        let at = list
            .iter()
            .position(|e| e.key < key)
            .unwrap_or(list.len());
        list.insert(at, Entry { descriptor, key });
    }
}
