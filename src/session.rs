use serde::{Deserialize, Serialize};

use crate::model::ActorRole;

/// Identity of the human actor behind a workflow call.
///
/// Built by the host application once authentication has resolved, then
/// passed explicitly into every operation. The engine keeps no ambient
/// session state, so it can be driven in tests without a live store or any
/// auth plumbing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub actor_id: String,
    pub actor_name: String,
    pub role: ActorRole,
}

impl Session {
    pub fn new(actor_id: impl Into<String>, actor_name: impl Into<String>, role: ActorRole) -> Self {
        Self {
            actor_id: actor_id.into(),
            actor_name: actor_name.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }

    pub fn is_teacher(&self) -> bool {
        self.role == ActorRole::Teacher
    }

    pub fn is_student(&self) -> bool {
        self.role == ActorRole::Student
    }
}
