//! Renewal-application workflow: document collection, submission,
//! resubmission, and admin review transitions.
//!
//! State machine (server-authoritative, guarded here before any call):
//!
//! ```text
//! NoForm -> Submitted <-> UnderReview -> { Approved | Rejected }
//! ```
//!
//! Terminal forms are immutable. A student holds at most one
//! non-terminal form; two or more is a data-integrity violation that is
//! reported, never silently resolved.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};

use hostel_types::api::RenewalReviewRequest;
use hostel_types::models::{DocumentSlot, RenewalForm, RenewalStatus};

use crate::api::ApiClient;
use crate::error::{ClientError, Result};
use crate::upload::UploadManager;

/// What counts as a submittable document set. An explicit choice: the
/// lenient variant matches the deployed behavior, the strict one demands
/// every required slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPolicy {
    /// At least one uploaded document, any slot.
    #[default]
    AnyDocument,
    /// All required slots (aadhar, result, photo) must be populated.
    AllRequired,
}

/// Result of the invariant-checked pending-form lookup.
#[derive(Debug, Clone)]
pub enum PendingForm {
    /// No non-terminal form on record.
    None,
    /// Exactly one non-terminal form.
    Active(RenewalForm),
    /// More than one non-terminal form: a data-integrity violation.
    Conflict { count: usize },
}

/// Read-side filter for the admin listing. Has no effect on state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Submitted,
    UnderReview,
}

impl StatusFilter {
    fn matches(&self, status: RenewalStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Submitted => status == RenewalStatus::Submitted,
            StatusFilter::UnderReview => status == RenewalStatus::UnderReview,
        }
    }
}

pub struct RenewalWorkflow {
    api: ApiClient,
    uploads: UploadManager,
    policy: SubmitPolicy,
    current: Option<RenewalForm>,
}

impl RenewalWorkflow {
    pub fn new(api: ApiClient, policy: SubmitPolicy) -> Self {
        Self {
            api,
            uploads: UploadManager::new(),
            policy,
            current: None,
        }
    }

    pub fn uploads(&self) -> &UploadManager {
        &self.uploads
    }

    /// The pending form as of the last [`load`](Self::load).
    pub fn current(&self) -> Option<&RenewalForm> {
        self.current.as_ref()
    }

    /// Fetch the student's forms and select the pending one, if any.
    ///
    /// Selection is invariant-checked: zero non-terminal forms is
    /// [`PendingForm::None`], one is [`PendingForm::Active`] (and its
    /// files seed the upload slots), more than one is reported as
    /// [`PendingForm::Conflict`] and nothing is selected.
    pub async fn load(&mut self) -> Result<PendingForm> {
        let forms = self.api.renewal_forms().await?;
        let mut pending: Vec<RenewalForm> = forms
            .into_iter()
            .filter(|form| !form.status.is_terminal())
            .collect();

        match pending.len() {
            0 => {
                self.current = None;
                Ok(PendingForm::None)
            }
            1 => {
                let form = pending.remove(0);
                self.uploads.seed(&form.files);
                self.current = Some(form.clone());
                Ok(PendingForm::Active(form))
            }
            count => {
                warn!(count, "multiple non-terminal renewal forms on record");
                self.current = None;
                Ok(PendingForm::Conflict { count })
            }
        }
    }

    /// Full form history (terminal forms included), newest state as the
    /// backend returns it.
    pub async fn history(&self) -> Result<Vec<RenewalForm>> {
        self.api.renewal_forms().await
    }

    /// Upload a document into a slot. When a pending form exists its
    /// files mapping is pushed immediately, so the server copy follows
    /// every successful slot upload.
    pub async fn upload_document(&mut self, slot: DocumentSlot, path: &Path) -> Result<String> {
        let stored = self.uploads.upload(&self.api, path, slot).await?;

        if let Some(form_id) = self.current.as_ref().map(|form| form.id) {
            let files = self.uploads.files();
            self.api.update_renewal_files(form_id, &files).await?;
            self.apply_local_file_update(files);
        }
        Ok(stored)
    }

    /// Submit the collected documents: create a new form, or push the
    /// files onto the pending one. The policy gate runs before any
    /// network call, and zero documents is always rejected.
    pub async fn submit(&mut self) -> Result<RenewalForm> {
        let files = self.uploads.files();
        self.check_policy(&files)?;

        match self.current.as_ref().map(|form| (form.id, form.status)) {
            Some((form_id, status)) => {
                if status.is_terminal() {
                    return Err(ClientError::InvalidState(format!(
                        "form {form_id} is {status}; terminal forms cannot be updated"
                    )));
                }
                self.api.update_renewal_files(form_id, &files).await?;
                self.apply_local_file_update(files);
                info!(form_id = %form_id, "renewal form updated");
            }
            None => {
                self.api.create_renewal_form(files).await?;
                info!("renewal form submitted");
            }
        }

        match self.load().await? {
            PendingForm::Active(form) => Ok(form),
            PendingForm::None => Err(ClientError::Validation(
                "submission did not produce a pending form".into(),
            )),
            PendingForm::Conflict { count } => Err(ClientError::Validation(format!(
                "{count} non-terminal forms on record; data integrity violation"
            ))),
        }
    }

    /// Push the current slot mapping onto an explicit form. The terminal
    /// guard fires before any network call.
    pub async fn update_files_for(&self, form: &RenewalForm) -> Result<()> {
        if form.status.is_terminal() {
            return Err(ClientError::InvalidState(format!(
                "form {} is {}; terminal forms cannot be updated",
                form.id, form.status
            )));
        }
        let files = self.uploads.files();
        if files.is_empty() {
            return Err(ClientError::Validation(
                "no uploaded documents to apply".into(),
            ));
        }
        self.api.update_renewal_files(form.id, &files).await?;
        Ok(())
    }

    // ── Admin side ──────────────────────────────────────────────────────

    /// List forms for the admin view, filtered read-side.
    pub async fn list(&self, filter: StatusFilter) -> Result<Vec<RenewalForm>> {
        let forms = self.api.renewal_forms().await?;
        Ok(forms
            .into_iter()
            .filter(|form| filter.matches(form.status))
            .collect())
    }

    /// Apply an admin review transition with optional comments.
    ///
    /// Illegal transitions (per the status legality table) are rejected
    /// here before any network call. Returns the updated form.
    pub async fn review(
        &self,
        form: &RenewalForm,
        to: RenewalStatus,
        comments: Option<String>,
    ) -> Result<RenewalForm> {
        if !form.status.can_review_transition(to) {
            return Err(ClientError::InvalidState(format!(
                "cannot move form {} from {} to {}",
                form.id, form.status, to
            )));
        }

        self.api
            .review_renewal_form(
                form.id,
                &RenewalReviewRequest {
                    status: Some(to),
                    admin_comments: comments,
                },
            )
            .await?;
        info!(form_id = %form.id, from = %form.status, %to, "renewal form reviewed");
        self.api.renewal_form(form.id).await
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn check_policy(&self, files: &BTreeMap<DocumentSlot, String>) -> Result<()> {
        if files.is_empty() {
            return Err(ClientError::Validation(
                "upload at least one document before submitting".into(),
            ));
        }
        if self.policy == SubmitPolicy::AllRequired {
            let missing: Vec<&str> = DocumentSlot::REQUIRED
                .into_iter()
                .filter(|slot| !files.contains_key(slot))
                .map(|slot| slot.as_str())
                .collect();
            if !missing.is_empty() {
                return Err(ClientError::Validation(format!(
                    "missing required documents: {}",
                    missing.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Mirror the server's file PUT locally: merge the mapping and drop
    /// an under-review form back to submitted.
    fn apply_local_file_update(&mut self, files: BTreeMap<DocumentSlot, String>) {
        if let Some(form) = &mut self.current {
            form.files.extend(files);
            if form.status == RenewalStatus::UnderReview {
                form.status = RenewalStatus::Submitted;
            }
        }
    }
}
