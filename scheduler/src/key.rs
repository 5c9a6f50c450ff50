use std::cmp::Ordering;

/// Sort key of the schedule table. Smaller `score` means more urgent;
/// `hash` breaks ties and doubles as the PageDB lookup key.
///
/// This total order is the custom comparator the schedule is kept under:
/// strictly ascending by `score`, ties broken by ascending `hash`. It must
/// hold for every iteration so that cursor-first always yields the
/// smallest-score entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleKey {
    pub score: f32,
    pub hash: u64,
}

impl ScheduleKey {
    pub fn new(score: f32, hash: u64) -> Self {
        Self { score, hash }
    }
}

impl Eq for ScheduleKey {}

impl PartialOrd for ScheduleKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduleKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.hash.cmp(&other.hash))
    }
}
