//! Attendance session walker.
//!
//! Steps a teacher through a class roster one student at a time. The walker
//! only holds drafts in memory; when the roster is exhausted it hands the
//! drafts back in roster order and the caller decides how to persist them.
//!
//! ```text
//! Idle --Start--> Viewing(0) --Next/Skip--> Viewing(i+1) ... --> Complete
//!                     ^            |
//!                     +--Previous--+          any --Cancel--> Cancelled
//! ```

use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceRecord, AttendanceStatus};
use crate::models::student::Student;
use std::collections::HashMap;

/// Status + comment for one student, held until the walk completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftRecord {
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkerState {
    Idle,
    Viewing(usize),
    Complete,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkerEvent {
    Start,
    Select(AttendanceStatus),
    /// Replace the comment for the current student; empty clears it.
    Comment(String),
    Next,
    Previous,
    Skip,
    Cancel,
}

/// Result of one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Viewing(usize),
    /// Selection or comment changed; still on the same student.
    Updated,
    Completed(Vec<DraftRecord>),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct AttendanceWalker {
    roster: Vec<Student>,
    existing: HashMap<i64, DraftRecord>,
    drafts: HashMap<i64, DraftRecord>,
    state: WalkerState,
    selection: Option<AttendanceStatus>,
    comment: String,
}

impl AttendanceWalker {
    pub fn new(roster: Vec<Student>) -> Self {
        Self {
            roster,
            existing: HashMap::new(),
            drafts: HashMap::new(),
            state: WalkerState::Idle,
            selection: None,
            comment: String::new(),
        }
    }

    /// Records already stored for this class and date; used to pre-populate
    /// each student's selection when no draft exists yet.
    pub fn with_existing(mut self, records: &[AttendanceRecord]) -> Self {
        for r in records {
            self.existing.insert(
                r.student_id,
                DraftRecord {
                    student_id: r.student_id,
                    status: r.status,
                    comment: r.notes.clone(),
                },
            );
        }
        self
    }

    pub fn state(&self) -> WalkerState {
        self.state
    }

    pub fn roster_len(&self) -> usize {
        self.roster.len()
    }

    pub fn current(&self) -> Option<&Student> {
        match self.state {
            WalkerState::Viewing(i) => self.roster.get(i),
            _ => None,
        }
    }

    pub fn selection(&self) -> Option<AttendanceStatus> {
        self.selection
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// `Next` is only allowed once a status is selected.
    pub fn can_advance(&self) -> bool {
        matches!(self.state, WalkerState::Viewing(_)) && self.selection.is_some()
    }

    /// `(index + 1) / total`, or 0 outside a walk.
    pub fn progress(&self) -> f64 {
        match self.state {
            WalkerState::Viewing(i) if !self.roster.is_empty() => {
                (i + 1) as f64 / self.roster.len() as f64
            }
            WalkerState::Complete => 1.0,
            _ => 0.0,
        }
    }

    pub fn apply(&mut self, event: WalkerEvent) -> AppResult<Step> {
        match (self.state, event) {
            (WalkerState::Idle, WalkerEvent::Start) => {
                if self.roster.is_empty() {
                    return Ok(self.finish());
                }
                self.enter(0);
                Ok(Step::Viewing(0))
            }
            (WalkerState::Idle, _) => Err(walker_err("the walk has not started")),

            (WalkerState::Complete | WalkerState::Cancelled, _) => {
                Err(walker_err("the walk is already closed"))
            }

            (WalkerState::Viewing(_), WalkerEvent::Start) => {
                Err(walker_err("the walk is already running"))
            }

            (WalkerState::Viewing(_), WalkerEvent::Select(status)) => {
                if status == AttendanceStatus::Excused {
                    return Err(walker_err(
                        "excused is recorded through an approved absence request",
                    ));
                }
                self.selection = Some(status);
                Ok(Step::Updated)
            }

            (WalkerState::Viewing(_), WalkerEvent::Comment(text)) => {
                self.comment = text.trim().to_string();
                Ok(Step::Updated)
            }

            (WalkerState::Viewing(i), WalkerEvent::Next) => {
                if !self.persist_current() {
                    return Err(walker_err("select a status before moving on"));
                }
                Ok(self.advance(i))
            }

            (WalkerState::Viewing(i), WalkerEvent::Previous) => {
                self.persist_current();
                let target = i.saturating_sub(1);
                self.enter(target);
                Ok(Step::Viewing(target))
            }

            (WalkerState::Viewing(i), WalkerEvent::Skip) => Ok(self.advance(i)),

            (WalkerState::Viewing(_), WalkerEvent::Cancel) => {
                self.state = WalkerState::Cancelled;
                self.selection = None;
                self.comment.clear();
                Ok(Step::Cancelled)
            }
        }
    }

    fn enter(&mut self, index: usize) {
        self.state = WalkerState::Viewing(index);
        let id = self.roster[index].id;
        let prior = self.drafts.get(&id).or_else(|| self.existing.get(&id));
        self.selection = prior.map(|d| d.status);
        self.comment = prior.and_then(|d| d.comment.clone()).unwrap_or_default();
    }

    /// Store the current selection as a draft; false when nothing is selected.
    fn persist_current(&mut self) -> bool {
        let (WalkerState::Viewing(i), Some(status)) = (self.state, self.selection) else {
            return false;
        };
        let student_id = self.roster[i].id;
        let comment = if self.comment.is_empty() {
            None
        } else {
            Some(self.comment.clone())
        };
        self.drafts.insert(
            student_id,
            DraftRecord {
                student_id,
                status,
                comment,
            },
        );
        true
    }

    fn advance(&mut self, index: usize) -> Step {
        if index + 1 < self.roster.len() {
            self.enter(index + 1);
            Step::Viewing(index + 1)
        } else {
            self.finish()
        }
    }

    fn finish(&mut self) -> Step {
        self.state = WalkerState::Complete;
        self.selection = None;
        self.comment.clear();
        let drafts = self
            .roster
            .iter()
            .filter_map(|s| self.drafts.get(&s.id).cloned())
            .collect();
        Step::Completed(drafts)
    }
}

fn walker_err(msg: &str) -> AppError {
    AppError::Walker(msg.to_string())
}
