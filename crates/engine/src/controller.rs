//! The wizard state machine.
//!
//! ```text
//! landing --choose--> shortReview | deepDive --submit ok--> success
//!    ^                        |                                  |
//!    +---------back-----------+                                  |
//!    +-------------------------- return_home (full reset) -------+
//! ```
//!
//! The controller owns the [`WizardState`] and is driven through `&mut self`
//! by a single owner. Timers and file encoding run as tokio tasks that post
//! [`WizardEvent`]s back on an internal channel; the owner applies them with
//! [`WizardController::pump`] or [`WizardController::pump_next`]. All
//! methods that may arm a timer or start an upload must be called inside a
//! tokio runtime.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use kudos_storage::{DraftStore, KeyValueStore};

use crate::config::WizardConfig;
use crate::debounce::Debouncer;
use crate::error::WizardError;
use crate::fields::{Track, FORM_TYPE};
use crate::state::{Page, Rating, WizardState};
use crate::submit::{
    build_payload, SubmissionPayload, SubmitError, Submitter, SUBMIT_FAILURE_MESSAGE,
};
use crate::upload::{admit_with_limit, AttachedFile, FileCandidate, RejectReason};
use crate::validate::validate;

/// Deferred work reported back to the controller.
#[derive(Debug)]
pub enum WizardEvent {
    /// The draft debounce window elapsed.
    DraftSaveDue { generation: u64 },
    /// The "draft saved" notice has been up long enough.
    DraftNoticeExpired { generation: u64 },
    /// A selected file finished reading and admission. `epoch` is the
    /// session the selection was made in.
    UploadSettled {
        epoch: u64,
        result: Result<AttachedFile, RejectReason>,
    },
}

/// What applying one event changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    DraftSaved,
    DraftSaveSkipped,
    DraftNoticeCleared,
    AttachmentReplaced,
    UploadRejected,
    /// A superseded timer or an upload from before a reset; nothing changed.
    Stale,
}

/// A submission between [`WizardController::begin_submit`] and
/// [`WizardController::finish_submit`].
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub track: Track,
    pub payload: SubmissionPayload,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// The endpoint took it; the wizard is on the success page.
    Accepted,
    /// Nothing changed except the error banner.
    Failed(SubmitError),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted)
    }
}

pub struct WizardController {
    config: WizardConfig,
    state: WizardState,
    drafts: DraftStore,
    submitter: Arc<dyn Submitter>,
    events_tx: UnboundedSender<WizardEvent>,
    events_rx: UnboundedReceiver<WizardEvent>,
    draft_timer: Debouncer,
    notice_timer: Debouncer,
    uploads_in_flight: usize,
    upload_epoch: u64,
}

impl WizardController {
    /// Build a controller whose draft slot lives on `backend`.
    ///
    /// Any unexpired draft is loaded immediately and seeds the record.
    pub fn new(
        config: WizardConfig,
        backend: Arc<dyn KeyValueStore>,
        submitter: Arc<dyn Submitter>,
    ) -> Self {
        let drafts = DraftStore::new(backend)
            .with_key(config.draft_key.clone())
            .with_ttl(config.draft_ttl());
        Self::with_draft_store(config, drafts, submitter)
    }

    /// Like [`WizardController::new`], with a pre-built draft store (custom clock, TTL).
    pub fn with_draft_store(
        config: WizardConfig,
        drafts: DraftStore,
        submitter: Arc<dyn Submitter>,
    ) -> Self {
        let record = drafts.load().unwrap_or_default();
        if !record.is_empty() {
            tracing::debug!(fields = record.len(), "restored draft");
        }
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        WizardController {
            draft_timer: Debouncer::new(config.debounce()),
            notice_timer: Debouncer::new(config.draft_notice()),
            config,
            state: WizardState::seeded(record),
            drafts,
            submitter,
            events_tx,
            events_rx,
            uploads_in_flight: 0,
            upload_epoch: 0,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn page(&self) -> Page {
        self.state.page
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    // ── Navigation ───────────────────────────────────────────────────────────

    pub fn choose(&mut self, track: Track) -> Result<(), WizardError> {
        if self.state.page != Page::Landing {
            return Err(WizardError::InvalidTransition {
                from: self.state.page,
                action: "choose a track",
            });
        }
        self.go_to(Page::for_track(track));
        Ok(())
    }

    /// Return to the landing page, keeping every answer.
    pub fn back(&mut self) -> Result<(), WizardError> {
        if self.state.page.track().is_none() {
            return Err(WizardError::InvalidTransition {
                from: self.state.page,
                action: "go back",
            });
        }
        self.go_to(Page::Landing);
        Ok(())
    }

    /// Leave the success page for a blank wizard. The only full reset.
    pub fn return_home(&mut self) -> Result<(), WizardError> {
        if self.state.page != Page::Success {
            return Err(WizardError::InvalidTransition {
                from: self.state.page,
                action: "return home",
            });
        }
        self.draft_timer.cancel();
        self.notice_timer.cancel();
        // Reads still running belong to the previous visitor.
        self.upload_epoch += 1;
        self.state.reset();
        tracing::debug!("wizard reset");
        Ok(())
    }

    fn go_to(&mut self, page: Page) {
        tracing::debug!(from = ?self.state.page, to = ?page, "page transition");
        self.state.page = page;
    }

    // ── Editing ──────────────────────────────────────────────────────────────

    /// Record an answer and revalidate that field.
    ///
    /// On the deep-dive page this also (re)arms the draft save timer.
    pub fn edit(&mut self, field_id: &str, value: impl Into<String>) {
        let value = value.into();
        let required = self
            .state
            .page
            .track()
            .map(|track| track.is_required(field_id))
            .unwrap_or(false);
        let verdict = validate(field_id, &value, required);
        self.state.validation.insert(field_id.to_string(), verdict);
        self.state.record.insert(field_id.to_string(), value);

        if self.state.page.track().is_some_and(Track::keeps_draft) {
            self.draft_timer.schedule(&self.events_tx, |generation| {
                WizardEvent::DraftSaveDue { generation }
            });
        }
    }

    pub fn set_rating(&mut self, stars: u8) -> Result<(), WizardError> {
        self.state.rating = Rating::new(stars).ok_or(WizardError::RatingOutOfRange(stars))?;
        Ok(())
    }

    pub fn has_pending_draft_save(&self) -> bool {
        self.draft_timer.is_pending()
    }

    // ── Uploads ──────────────────────────────────────────────────────────────

    /// Start admitting an already-read file. The result arrives as an event.
    pub fn select_file(&mut self, candidate: FileCandidate) {
        let limit = self.config.max_upload_bytes;
        self.spawn_upload(async move { admit_with_limit(candidate, limit) });
    }

    /// Start reading and admitting the file at `path`. The result arrives as an event.
    pub fn select_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        let limit = self.config.max_upload_bytes;
        self.spawn_upload(async move {
            let candidate = FileCandidate::from_path(&path).await?;
            admit_with_limit(candidate, limit)
        });
    }

    fn spawn_upload<Fut>(&mut self, work: Fut)
    where
        Fut: std::future::Future<Output = Result<AttachedFile, RejectReason>> + Send + 'static,
    {
        // Overlapping selections are not cancelled; whichever settles last wins.
        self.uploads_in_flight += 1;
        let epoch = self.upload_epoch;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = work.await;
            let _ = tx.send(WizardEvent::UploadSettled { epoch, result });
        });
    }

    pub fn clear_attachment(&mut self) {
        self.state.attachment = None;
        self.state.upload_error = None;
    }

    // ── Events ───────────────────────────────────────────────────────────────

    /// Apply every event that is already waiting. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next event and apply it.
    ///
    /// Returns `None` immediately when nothing is scheduled or in flight.
    pub async fn pump_next(&mut self) -> Option<Applied> {
        if let Ok(event) = self.events_rx.try_recv() {
            return Some(self.apply(event));
        }
        if !self.has_pending_work() {
            return None;
        }
        let event = self.events_rx.recv().await?;
        Some(self.apply(event))
    }

    fn has_pending_work(&self) -> bool {
        self.draft_timer.is_pending() || self.notice_timer.is_pending() || self.uploads_in_flight > 0
    }

    fn apply(&mut self, event: WizardEvent) -> Applied {
        match event {
            WizardEvent::DraftSaveDue { generation } => {
                if !self.draft_timer.complete(generation) {
                    return Applied::Stale;
                }
                if !self.drafts.save(&self.state.record) {
                    return Applied::DraftSaveSkipped;
                }
                self.state.draft_just_saved = true;
                self.notice_timer.schedule(&self.events_tx, |generation| {
                    WizardEvent::DraftNoticeExpired { generation }
                });
                Applied::DraftSaved
            }
            WizardEvent::DraftNoticeExpired { generation } => {
                if !self.notice_timer.complete(generation) {
                    return Applied::Stale;
                }
                self.state.draft_just_saved = false;
                Applied::DraftNoticeCleared
            }
            WizardEvent::UploadSettled { epoch, result } => {
                self.uploads_in_flight = self.uploads_in_flight.saturating_sub(1);
                if epoch != self.upload_epoch {
                    tracing::debug!(epoch, "dropping upload from a reset session");
                    return Applied::Stale;
                }
                match result {
                    Ok(file) => {
                        tracing::debug!(name = %file.name, bytes = file.size_bytes, "attachment accepted");
                        self.state.attachment = Some(file);
                        self.state.upload_error = None;
                        Applied::AttachmentReplaced
                    }
                    Err(reason) => {
                        tracing::debug!(reason = ?reason, "attachment rejected");
                        self.state.upload_error = Some(reason);
                        Applied::UploadRejected
                    }
                }
            }
        }
    }

    // ── Submission ───────────────────────────────────────────────────────────

    /// Mark the wizard as submitting and assemble the payload.
    ///
    /// Clears any previous submission error. In strict mode
    /// (`require_complete`), every question of the track is validated first
    /// and the submission is refused if any fails.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, WizardError> {
        let track = self
            .state
            .page
            .track()
            .ok_or(WizardError::NotOnTrack {
                page: self.state.page,
            })?;
        if self.state.submitting {
            return Err(WizardError::AlreadySubmitting);
        }
        if self.config.require_complete {
            self.check_complete(track)?;
        }

        self.state.submitting = true;
        self.state.submit_error = None;
        let payload = build_payload(
            track,
            &self.state,
            &self.config.client_context(),
            self.drafts.clock().now(),
        );
        Ok(PendingSubmission { track, payload })
    }

    /// Apply the network result of a submission started with `begin_submit`.
    pub fn finish_submit(
        &mut self,
        pending: PendingSubmission,
        outcome: Result<(), SubmitError>,
    ) -> SubmitOutcome {
        let result = match outcome {
            Ok(()) => {
                tracing::info!(track = %pending.track, "submission accepted");
                self.draft_timer.cancel();
                self.drafts.clear();
                self.state
                    .record
                    .insert(FORM_TYPE.to_string(), pending.track.label().to_string());
                self.go_to(Page::Success);
                SubmitOutcome::Accepted
            }
            Err(e) => {
                tracing::info!(track = %pending.track, error = %e, "submission failed");
                self.state.submit_error = Some(SUBMIT_FAILURE_MESSAGE.to_string());
                SubmitOutcome::Failed(e)
            }
        };
        self.state.submitting = false;
        result
    }

    /// Submit the current track through the configured [`Submitter`].
    pub async fn submit(&mut self) -> Result<SubmitOutcome, WizardError> {
        let pending = self.begin_submit()?;
        tracing::debug!(submitter = self.submitter.submitter_id(), "submitting");
        let outcome = self.submitter.submit(&pending.payload).await;
        Ok(self.finish_submit(pending, outcome))
    }

    fn check_complete(&mut self, track: Track) -> Result<(), WizardError> {
        let mut failing = Vec::new();
        for field in track.fields() {
            let value = self.state.value(field.id).unwrap_or("");
            let verdict = validate(field.id, value, field.required);
            if verdict.is_some() {
                failing.push(field.id.to_string());
            }
            self.state.validation.insert(field.id.to_string(), verdict);
        }
        if failing.is_empty() {
            Ok(())
        } else {
            Err(WizardError::Incomplete { fields: failing })
        }
    }
}
