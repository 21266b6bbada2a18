// src/model/queues.rs

use serde::Serialize;

/// A quantity that becomes due in a given week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scheduled {
    pub week: u32,
    pub amount: u32,
}

/// A week-keyed delay pipeline.
///
/// Used both for goods in transit (`pending_shipments`) and for orders that
/// the upstream neighbor has not seen yet (`pending_demands`). Entries are kept
/// sorted by week; several entries may share a week after a delay event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScheduledQueue {
    entries: Vec<Scheduled>,
}

impl ScheduledQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step 1: Items enter the pipeline.
    /// Merges into an existing entry for the same week, otherwise inserts in order.
    pub fn schedule(&mut self, week: u32, amount: u32) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.week == week) {
            entry.amount = entry.amount.saturating_add(amount);
            return;
        }
        let pos = self.entries.partition_point(|e| e.week <= week);
        self.entries.insert(pos, Scheduled { week, amount });
    }

    /// Step 2: Items arrive at the destination.
    /// Removes every entry due in `week` and returns their sum. A second call
    /// for the same week finds nothing and returns 0.
    pub fn drain_week(&mut self, week: u32) -> u32 {
        let mut total = 0u32;
        self.entries.retain(|e| {
            if e.week == week {
                total = total.saturating_add(e.amount);
                false
            } else {
                true
            }
        });
        total
    }

    /// Pushes the entry at `index` back by `weeks`. Returns the new due week.
    pub fn delay_entry(&mut self, index: usize, weeks: u32) -> Option<u32> {
        let entry = self.entries.get_mut(index)?;
        entry.week = entry.week.saturating_add(weeks);
        let new_week = entry.week;
        self.entries.sort_by_key(|e| e.week);
        Some(new_week)
    }

    /// Sum of the entries due in `week`, without removing them.
    pub fn amount_due(&self, week: u32) -> u32 {
        self.entries
            .iter()
            .filter(|e| e.week == week)
            .fold(0u32, |acc, e| acc.saturating_add(e.amount))
    }

    pub fn entry_for_week_mut(&mut self, week: u32) -> Option<&mut Scheduled> {
        self.entries.iter_mut().find(|e| e.week == week)
    }

    /// Everything still in the pipe.
    pub fn total(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |acc, e| acc.saturating_add(e.amount))
    }

    pub fn entries(&self) -> &[Scheduled] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
