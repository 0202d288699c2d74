//! Bounded undo/redo stack wrapping the in-memory current report.
//!
//! Every top-level mutation routes through [`ReportHistory::commit`]; this is
//! the single rule that keeps undo/redo coherent between manual edits and
//! assistant-driven changes.

use std::collections::VecDeque;

use super::Report;

/// Maximum number of past snapshots retained; the oldest is evicted first.
pub const HISTORY_CAP: usize = 50;

#[derive(Debug)]
pub struct ReportHistory {
    current: Report,
    past: VecDeque<Report>,
    future: VecDeque<Report>,
}

impl ReportHistory {
    pub fn new(report: Report) -> Self {
        Self {
            current: report,
            past: VecDeque::new(),
            future: VecDeque::new(),
        }
    }

    pub fn current(&self) -> &Report {
        &self.current
    }

    /// Replaces the current report, pushing the previous state onto the past
    /// stack and discarding any redo candidates.
    pub fn commit(&mut self, next: Report) {
        let previous = std::mem::replace(&mut self.current, next);
        self.past.push_back(previous);
        if self.past.len() > HISTORY_CAP {
            self.past.pop_front();
        }
        self.future.clear();
    }

    /// Steps back one snapshot. No-op (returns false) when the past is empty.
    pub fn undo(&mut self) -> bool {
        match self.past.pop_back() {
            Some(previous) => {
                let current = std::mem::replace(&mut self.current, previous);
                self.future.push_front(current);
                true
            }
            None => false,
        }
    }

    /// Steps forward one snapshot. No-op (returns false) when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.future.pop_front() {
            Some(next) => {
                let current = std::mem::replace(&mut self.current, next);
                self.past.push_back(current);
                true
            }
            None => false,
        }
    }

    /// Installs a freshly loaded report and clears both stacks. History never
    /// spans more than one (date, section) selection.
    pub fn reset(&mut self, report: Report) {
        self.current = report;
        self.past.clear();
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.past.len()
    }
}
