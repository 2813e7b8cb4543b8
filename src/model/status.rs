use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Workflow position of a leave request.
///
/// Transitions only ever move forward: `pending_teacher` → `pending_admin` →
/// `approved`/`rejected` for student requests, `pending_admin` →
/// `approved`/`rejected` for a teacher's own leave.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveStatus {
    PendingTeacher,
    PendingAdmin,
    Approved,
    Rejected,
}

impl LeaveStatus {
    /// Returns true once the request has reached a final disposition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LeaveStatus::Approved | LeaveStatus::Rejected)
    }
}
