use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::status::LeaveStatus;

/// Payload collected by the leave-application form.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLeave {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

/// A teacher's own leave application. Never passes teacher review, so the
/// variant has no slot for a teacher remark or a class name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalLeave {
    pub requester_id: String,
    pub requester_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    #[serde(default)]
    pub admin_remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A student leave application, reviewed by the class teacher before it can
/// reach the admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentLeave {
    pub requester_id: String,
    pub requester_name: String,
    pub class_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    #[serde(default)]
    pub teacher_remark: Option<String>,
    #[serde(default)]
    pub admin_remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored leave request. The serde tag doubles as the persisted
/// `requester_role` field, so the requester role and the shape of the record
/// can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "requester_role")]
pub enum LeaveRequest {
    #[serde(rename = "teacher")]
    Personal(PersonalLeave),
    #[serde(rename = "student")]
    Student(StudentLeave),
}

impl LeaveRequest {
    pub fn status(&self) -> LeaveStatus {
        match self {
            LeaveRequest::Personal(p) => p.status,
            LeaveRequest::Student(s) => s.status,
        }
    }

    pub fn requester_id(&self) -> &str {
        match self {
            LeaveRequest::Personal(p) => &p.requester_id,
            LeaveRequest::Student(s) => &s.requester_id,
        }
    }

    pub fn requester_name(&self) -> &str {
        match self {
            LeaveRequest::Personal(p) => &p.requester_name,
            LeaveRequest::Student(s) => &s.requester_name,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            LeaveRequest::Personal(p) => p.created_at,
            LeaveRequest::Student(s) => s.created_at,
        }
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            LeaveRequest::Personal(p) => p.updated_at,
            LeaveRequest::Student(s) => s.updated_at,
        }
    }

    /// Always `None` for personal leave.
    pub fn teacher_remark(&self) -> Option<&str> {
        match self {
            LeaveRequest::Personal(_) => None,
            LeaveRequest::Student(s) => s.teacher_remark.as_deref(),
        }
    }

    pub fn admin_remark(&self) -> Option<&str> {
        match self {
            LeaveRequest::Personal(p) => p.admin_remark.as_deref(),
            LeaveRequest::Student(s) => s.admin_remark.as_deref(),
        }
    }
}

/// A leave request paired with its store-assigned document id. The id lives
/// outside the document fields, matching how the store addresses records.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveRecord {
    pub id: String,
    pub request: LeaveRequest,
}
