use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::error::WorkflowError;
use crate::model::{
    CreateLeave, LeaveRecord, LeaveRequest, LeaveStatus, PersonalLeave, StudentLeave,
};
use crate::notify::NotificationSink;
use crate::session::Session;
use crate::store::{Document, DocumentStore, Filter};

pub const DEFAULT_COLLECTION: &str = "leave_requests";

const FORWARD_REMARK: &str = "Forwarded by Class Teacher";
const APPROVE_REMARK: &str = "Approved";
const REJECT_REMARK: &str = "Rejected";

/// Live view: one sorted result set per change to the underlying collection.
pub type LeaveFeed = BoxStream<'static, Vec<LeaveRecord>>;

type WorkflowResult<T> = Result<T, WorkflowError>;

/// The leave-request state machine.
///
/// Creation routes on requester role: a teacher's own application starts at
/// `pending_admin` (a teacher cannot review their own leave), a student
/// application starts at `pending_teacher` and reaches the admin only once a
/// teacher forwards it. Every transition re-reads the record and verifies
/// both the invoking role and the current status before writing; a mismatch
/// fails without touching the store.
///
/// All read views sort client-side: the store cannot combine a range filter
/// with an order-by without a composite index, so ordering never leaves the
/// engine.
pub struct LeaveWorkflowEngine {
    store: Arc<dyn DocumentStore>,
    notify: Arc<dyn NotificationSink>,
    collection: String,
}

impl LeaveWorkflowEngine {
    pub fn new(store: Arc<dyn DocumentStore>, notify: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            notify,
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }

    /// Use a different store collection (see `Config::leave_collection`).
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    // ── Creation ──

    /// A teacher applies for their own leave. Skips teacher review entirely.
    #[instrument(name = "leave_apply_personal", skip(self, session, input), fields(actor = %session.actor_id))]
    pub async fn apply_personal_leave(
        &self,
        session: &Session,
        input: CreateLeave,
    ) -> WorkflowResult<LeaveRecord> {
        let outcome = self.create_personal(session, input).await;
        self.report(outcome, "Leave request submitted")
    }

    /// A student submits a leave application for their class. Lands in the
    /// class teacher's inbox first.
    #[instrument(name = "leave_apply_student", skip(self, session, input), fields(actor = %session.actor_id))]
    pub async fn apply_student_leave(
        &self,
        session: &Session,
        class_name: &str,
        input: CreateLeave,
    ) -> WorkflowResult<LeaveRecord> {
        let outcome = self.create_student(session, class_name, input).await;
        self.report(outcome, "Leave request submitted")
    }

    async fn create_personal(
        &self,
        session: &Session,
        input: CreateLeave,
    ) -> WorkflowResult<LeaveRecord> {
        if !session.is_teacher() {
            return Err(WorkflowError::Validation(
                "Only a teacher may apply for personal leave".to_string(),
            ));
        }
        validate_dates(&input)?;
        let reason = required_text(&input.reason, "Reason is required")?;

        let now = Utc::now();
        self.insert(LeaveRequest::Personal(PersonalLeave {
            requester_id: session.actor_id.clone(),
            requester_name: session.actor_name.clone(),
            start_date: input.start_date,
            end_date: input.end_date,
            reason,
            status: LeaveStatus::PendingAdmin,
            admin_remark: None,
            created_at: now,
            updated_at: now,
        }))
        .await
    }

    async fn create_student(
        &self,
        session: &Session,
        class_name: &str,
        input: CreateLeave,
    ) -> WorkflowResult<LeaveRecord> {
        if !session.is_student() {
            return Err(WorkflowError::Validation(
                "Only a student may submit a class leave request".to_string(),
            ));
        }
        let class_name = required_text(class_name, "Class name is required")?;
        validate_dates(&input)?;
        let reason = required_text(&input.reason, "Reason is required")?;

        let now = Utc::now();
        self.insert(LeaveRequest::Student(StudentLeave {
            requester_id: session.actor_id.clone(),
            requester_name: session.actor_name.clone(),
            class_name,
            start_date: input.start_date,
            end_date: input.end_date,
            reason,
            status: LeaveStatus::PendingTeacher,
            teacher_remark: None,
            admin_remark: None,
            created_at: now,
            updated_at: now,
        }))
        .await
    }

    async fn insert(&self, request: LeaveRequest) -> WorkflowResult<LeaveRecord> {
        let fields = serde_json::to_value(&request).map_err(anyhow::Error::from)?;
        let id = self.store.create(&self.collection, fields).await?;
        info!(leave_id = %id, status = %request.status(), "leave request created");
        Ok(LeaveRecord { id, request })
    }

    // ── Teacher review ──

    /// Teacher moves a student request on to the admin. A blank remark falls
    /// back to the stock forwarding note.
    #[instrument(name = "leave_forward", skip(self, session, id, remark), fields(actor = %session.actor_id, leave_id = %id))]
    pub async fn forward(
        &self,
        session: &Session,
        id: &str,
        remark: Option<&str>,
    ) -> WorkflowResult<LeaveRecord> {
        let outcome = self.forward_inner(session, id, remark).await;
        self.report(outcome, "Leave request forwarded to admin")
    }

    async fn forward_inner(
        &self,
        session: &Session,
        id: &str,
        remark: Option<&str>,
    ) -> WorkflowResult<LeaveRecord> {
        if !session.is_teacher() {
            return Err(self.deny(id, "only the class teacher may forward"));
        }
        let mut student = self.load_pending_teacher(id).await?;

        let remark = text_or_default(remark, FORWARD_REMARK);
        let now = Utc::now();
        self.store
            .update_partial(
                &self.collection,
                id,
                json!({
                    "status": LeaveStatus::PendingAdmin,
                    "teacher_remark": remark.clone(),
                    "updated_at": now,
                }),
            )
            .await?;

        student.status = LeaveStatus::PendingAdmin;
        student.teacher_remark = Some(remark);
        student.updated_at = now;
        info!("student leave forwarded to admin");
        Ok(LeaveRecord {
            id: id.to_string(),
            request: LeaveRequest::Student(student),
        })
    }

    /// Teacher turns a student request down. The remark is mandatory; a
    /// student must always see why.
    #[instrument(name = "leave_reject_teacher", skip(self, session, id, remark), fields(actor = %session.actor_id, leave_id = %id))]
    pub async fn reject_by_teacher(
        &self,
        session: &Session,
        id: &str,
        remark: &str,
    ) -> WorkflowResult<LeaveRecord> {
        let outcome = self.reject_by_teacher_inner(session, id, remark).await;
        self.report(outcome, "Leave request rejected")
    }

    async fn reject_by_teacher_inner(
        &self,
        session: &Session,
        id: &str,
        remark: &str,
    ) -> WorkflowResult<LeaveRecord> {
        let remark = required_text(remark, "A remark is required to reject a leave request")?;
        if !session.is_teacher() {
            return Err(self.deny(id, "only the class teacher may reject at this stage"));
        }
        let mut student = self.load_pending_teacher(id).await?;

        let now = Utc::now();
        self.store
            .update_partial(
                &self.collection,
                id,
                json!({
                    "status": LeaveStatus::Rejected,
                    "teacher_remark": remark.clone(),
                    "updated_at": now,
                }),
            )
            .await?;

        student.status = LeaveStatus::Rejected;
        student.teacher_remark = Some(remark);
        student.updated_at = now;
        info!("student leave rejected by teacher");
        Ok(LeaveRecord {
            id: id.to_string(),
            request: LeaveRequest::Student(student),
        })
    }

    // ── Admin disposition ──

    /// Admin approves a request awaiting final disposition.
    #[instrument(name = "leave_approve", skip(self, session, id, remark), fields(actor = %session.actor_id, leave_id = %id))]
    pub async fn approve(
        &self,
        session: &Session,
        id: &str,
        remark: Option<&str>,
    ) -> WorkflowResult<LeaveRecord> {
        let outcome = self
            .decide(session, id, LeaveStatus::Approved, remark, APPROVE_REMARK)
            .await;
        self.report(outcome, "Leave approved")
    }

    /// Admin turns a request down at final disposition.
    #[instrument(name = "leave_reject_admin", skip(self, session, id, remark), fields(actor = %session.actor_id, leave_id = %id))]
    pub async fn reject_by_admin(
        &self,
        session: &Session,
        id: &str,
        remark: Option<&str>,
    ) -> WorkflowResult<LeaveRecord> {
        let outcome = self
            .decide(session, id, LeaveStatus::Rejected, remark, REJECT_REMARK)
            .await;
        self.report(outcome, "Leave rejected")
    }

    async fn decide(
        &self,
        session: &Session,
        id: &str,
        verdict: LeaveStatus,
        remark: Option<&str>,
        default_remark: &str,
    ) -> WorkflowResult<LeaveRecord> {
        if !session.is_admin() {
            return Err(self.deny(id, "only an admin may decide at this stage"));
        }
        let mut request = self.load(id).await?;
        if request.status() != LeaveStatus::PendingAdmin {
            return Err(self.deny(id, "request is not awaiting admin disposition"));
        }

        let remark = text_or_default(remark, default_remark);
        let now = Utc::now();
        self.store
            .update_partial(
                &self.collection,
                id,
                json!({
                    "status": verdict,
                    "admin_remark": remark.clone(),
                    "updated_at": now,
                }),
            )
            .await?;

        match &mut request {
            LeaveRequest::Personal(p) => {
                p.status = verdict;
                p.admin_remark = Some(remark);
                p.updated_at = now;
            }
            LeaveRequest::Student(s) => {
                s.status = verdict;
                s.admin_remark = Some(remark);
                s.updated_at = now;
            }
        }
        info!(status = %verdict, "leave request decided");
        Ok(LeaveRecord {
            id: id.to_string(),
            request,
        })
    }

    // ── Reads ──

    /// Point lookup, any status.
    pub async fn fetch(&self, id: &str) -> WorkflowResult<Option<LeaveRecord>> {
        let Some(doc) = self.store.fetch(&self.collection, id).await? else {
            return Ok(None);
        };
        Ok(decode(doc))
    }

    /// Requests awaiting final admin disposition: teacher personal leave and
    /// forwarded student leave alike.
    pub async fn admin_inbox(&self) -> WorkflowResult<Vec<LeaveRecord>> {
        self.view(vec![status_filter(LeaveStatus::PendingAdmin)]).await
    }

    /// Student requests awaiting first-pass teacher review.
    pub async fn teacher_inbox(&self) -> WorkflowResult<Vec<LeaveRecord>> {
        self.view(vec![
            Filter::eq("requester_role", "student"),
            status_filter(LeaveStatus::PendingTeacher),
        ])
        .await
    }

    /// Every request one actor has ever submitted, any status.
    pub async fn actor_history(&self, actor_id: &str) -> WorkflowResult<Vec<LeaveRecord>> {
        self.view(vec![Filter::eq("requester_id", actor_id)]).await
    }

    async fn view(&self, filters: Vec<Filter>) -> WorkflowResult<Vec<LeaveRecord>> {
        let docs = self.store.query(&self.collection, &filters).await?;
        Ok(sort_newest_first(decode_all(docs)))
    }

    // ── Live views ──

    pub async fn watch_admin_inbox(&self) -> WorkflowResult<LeaveFeed> {
        self.watch(vec![status_filter(LeaveStatus::PendingAdmin)]).await
    }

    pub async fn watch_teacher_inbox(&self) -> WorkflowResult<LeaveFeed> {
        self.watch(vec![
            Filter::eq("requester_role", "student"),
            status_filter(LeaveStatus::PendingTeacher),
        ])
        .await
    }

    pub async fn watch_actor_history(&self, actor_id: &str) -> WorkflowResult<LeaveFeed> {
        self.watch(vec![Filter::eq("requester_id", actor_id)]).await
    }

    async fn watch(&self, filters: Vec<Filter>) -> WorkflowResult<LeaveFeed> {
        let snapshots = self.store.subscribe(&self.collection, filters).await?;
        Ok(snapshots
            .map(|docs| sort_newest_first(decode_all(docs)))
            .boxed())
    }

    // ── Internals ──

    async fn load(&self, id: &str) -> WorkflowResult<LeaveRequest> {
        let Some(doc) = self.store.fetch(&self.collection, id).await? else {
            return Err(self.deny(id, "leave request not found"));
        };
        let Document { id: doc_id, fields } = doc;
        serde_json::from_value(fields).map_err(|e| {
            warn!(leave_id = %doc_id, error = %e, "stored leave request failed to decode");
            WorkflowError::InvalidTransition { id: doc_id }
        })
    }

    /// Loads a record that must be a student request still in teacher review.
    async fn load_pending_teacher(&self, id: &str) -> WorkflowResult<StudentLeave> {
        match self.load(id).await? {
            LeaveRequest::Student(student) if student.status == LeaveStatus::PendingTeacher => {
                Ok(student)
            }
            LeaveRequest::Student(_) => Err(self.deny(id, "request is not awaiting teacher review")),
            LeaveRequest::Personal(_) => {
                Err(self.deny(id, "personal leave never passes teacher review"))
            }
        }
    }

    fn deny(&self, id: &str, why: &str) -> WorkflowError {
        warn!(leave_id = %id, "{why}");
        WorkflowError::InvalidTransition { id: id.to_string() }
    }

    fn report<T>(&self, outcome: WorkflowResult<T>, success: &str) -> WorkflowResult<T> {
        match &outcome {
            Ok(_) => self.notify.notify_success(success),
            Err(e) => self.notify.notify_error(&e.user_message()),
        }
        outcome
    }
}

fn status_filter(status: LeaveStatus) -> Filter {
    Filter::eq("status", status.to_string())
}

fn validate_dates(input: &CreateLeave) -> Result<(), WorkflowError> {
    if input.start_date > input.end_date {
        return Err(WorkflowError::Validation(
            "start_date cannot be after end_date".to_string(),
        ));
    }
    Ok(())
}

fn required_text(value: &str, message: &str) -> Result<String, WorkflowError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}

fn text_or_default(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => default.to_string(),
    }
}

fn decode(doc: Document) -> Option<LeaveRecord> {
    let Document { id, fields } = doc;
    match serde_json::from_value(fields) {
        Ok(request) => Some(LeaveRecord { id, request }),
        Err(e) => {
            warn!(leave_id = %id, error = %e, "skipping undecodable leave request");
            None
        }
    }
}

fn decode_all(docs: Vec<Document>) -> Vec<LeaveRecord> {
    docs.into_iter().filter_map(decode).collect()
}

/// Newest first. `sort_by` is stable, so equal timestamps keep the store's
/// insertion order.
fn sort_newest_first(mut records: Vec<LeaveRecord>) -> Vec<LeaveRecord> {
    records.sort_by(|a, b| b.request.created_at().cmp(&a.request.created_at()));
    records
}
