//! Listing lifecycle state machine.
//!
//! [`apply`] is pure: it takes the current [`ListingState`] and a command and
//! returns the next state plus the image-generation work the transition
//! requires. The caller persists both in one transaction, so a transition
//! either fully commits or leaves the listing untouched.
//!
//! ```text
//! Draft ──submit──▶ Pending ──approve──▶ Approved ──publish──▶ Published
//!   ▲                │  │                                   │      ▲
//!   └─────cancel─────┘  └──reject──▶ Rejected                offline restore
//!                                      │                     ▼      │
//!                                      └─submit─▶ Pending   Offline ─┘
//! ```

use crate::error::CoreError;
use crate::listing::{ListingPatch, ListingState, ListingStatus};
use crate::overlay::{ensure_editable, resolve_view, resolve_write, ViewMode};
use crate::pricing::derive_min_price;
use crate::roles::Authority;
use crate::submission::{validate_for_submission, validate_reject_reason};

/// Maximum length of the free-text note attached to a review request.
pub const MAX_AUDIT_INFO_LENGTH: usize = 2000;

/// Maximum length of a rejection reason.
pub const MAX_REJECT_REASON_LENGTH: usize = 2000;

/// An operation on a listing.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingCommand {
    Edit(ListingPatch),
    /// Open an edit session without changing fields (e.g. before touching
    /// images of a published listing).
    BeginEditing,
    /// `images_changed` tells whether the draft image set differs from the
    /// published one; only the caller holding the image store can know.
    Submit {
        audit_info: Option<String>,
        images_changed: bool,
    },
    CancelSubmission,
    /// Throw away unapproved changes of a published or offline listing.
    DiscardChanges,
    Approve,
    Reject { reason: String },
    Publish,
    TakeOffline,
    Restore,
    SetBanner(bool),
}

impl ListingCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ListingCommand::Edit(_) => "edit",
            ListingCommand::BeginEditing => "begin_editing",
            ListingCommand::Submit { .. } => "submit",
            ListingCommand::CancelSubmission => "cancel_submission",
            ListingCommand::DiscardChanges => "discard_changes",
            ListingCommand::Approve => "approve",
            ListingCommand::Reject { .. } => "reject",
            ListingCommand::Publish => "publish",
            ListingCommand::TakeOffline => "take_offline",
            ListingCommand::Restore => "restore",
            ListingCommand::SetBanner(_) => "set_banner",
        }
    }
}

/// Who may issue `command`.
pub fn required_authority(command: &ListingCommand) -> Authority {
    match command {
        ListingCommand::Approve
        | ListingCommand::Reject { .. }
        | ListingCommand::Publish
        | ListingCommand::SetBanner(_) => Authority::Admin,
        ListingCommand::TakeOffline | ListingCommand::Restore => Authority::OwnerOrAdmin,
        ListingCommand::Edit(_)
        | ListingCommand::BeginEditing
        | ListingCommand::Submit { .. }
        | ListingCommand::CancelSubmission
        | ListingCommand::DiscardChanges => Authority::Owner,
    }
}

/// Image-generation work a transition requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEffect {
    None,
    /// Give every published image a draft working copy.
    CopyPublishedToDraft,
    /// Archive published images and publish the drafts.
    PromoteDrafts,
    /// Delete all draft images.
    DiscardDrafts,
}

/// The outcome of a successful command.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: ListingStatus,
    pub next: ListingState,
    pub image_effect: ImageEffect,
    /// Recomputed minimum room price when the live room types changed.
    pub min_price: Option<i64>,
}

impl Transition {
    fn new(from: ListingStatus, next: ListingState) -> Self {
        Self {
            from,
            next,
            image_effect: ImageEffect::None,
            min_price: None,
        }
    }

    fn with_images(mut self, effect: ImageEffect) -> Self {
        self.image_effect = effect;
        self
    }
}

fn illegal(command: &ListingCommand, status: ListingStatus) -> CoreError {
    CoreError::GuardViolation(format!(
        "Cannot {} a listing that is {status}",
        command.name().replace('_', " ")
    ))
}

fn bounded_text(
    value: Option<String>,
    max: usize,
    field: &str,
) -> Result<Option<String>, CoreError> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) if v.chars().count() > max => Err(CoreError::Validation(format!(
            "{field} must not exceed {max} characters"
        ))),
        other => Ok(other),
    }
}

/// Apply `command` to `state`.
///
/// Authorization is checked separately (see [`required_authority`]); this
/// function enforces status guards, validation, and produces the next state.
pub fn apply(state: &ListingState, command: ListingCommand) -> Result<Transition, CoreError> {
    let from = state.status;
    let transition = match (from, command) {
        // -- Editing ---------------------------------------------------------
        (_, ListingCommand::Edit(patch)) => {
            let outcome = resolve_write(state, patch)?;
            let copy = outcome.overlay_created
                && matches!(from, ListingStatus::Published | ListingStatus::Offline);
            let min_price = outcome
                .live_room_types_changed
                .then(|| derive_min_price(&outcome.next.live.room_types));
            let mut t = Transition::new(from, outcome.next);
            t.min_price = min_price;
            if copy {
                t = t.with_images(ImageEffect::CopyPublishedToDraft);
            }
            t
        }
        (_, ListingCommand::BeginEditing) => {
            ensure_editable(from)?;
            let mut next = state.clone();
            if !from.has_live_baseline() || next.overlay.is_some() {
                return Ok(Transition::new(from, next));
            }
            next.overlay = Some(ListingPatch::default());
            let t = Transition::new(from, next);
            if from == ListingStatus::Rejected {
                t
            } else {
                t.with_images(ImageEffect::CopyPublishedToDraft)
            }
        }
        (
            ListingStatus::Published | ListingStatus::Offline,
            ListingCommand::DiscardChanges,
        ) => {
            if state.overlay.is_none() {
                return Err(CoreError::GuardViolation(
                    "There are no unsubmitted changes to discard".into(),
                ));
            }
            let mut next = state.clone();
            next.overlay = None;
            Transition::new(from, next).with_images(ImageEffect::DiscardDrafts)
        }

        // -- Review ----------------------------------------------------------
        (
            ListingStatus::Draft
            | ListingStatus::Rejected
            | ListingStatus::Published
            | ListingStatus::Offline,
            ListingCommand::Submit {
                audit_info,
                images_changed,
            },
        ) => {
            // An overlay opened by BeginEditing carries no field changes.
            let has_changes = match &state.overlay {
                None => false,
                Some(overlay) => !overlay.is_empty() || images_changed,
            };
            if matches!(from, ListingStatus::Published | ListingStatus::Offline) && !has_changes {
                return Err(CoreError::GuardViolation(
                    "Nothing to review: the listing has no unsubmitted changes".into(),
                ));
            }
            let audit_info = bounded_text(audit_info, MAX_AUDIT_INFO_LENGTH, "audit_info")?;
            validate_for_submission(&resolve_view(state, ViewMode::Editing))?;

            let mut next = state.clone();
            next.status = ListingStatus::Pending;
            next.audit_info = audit_info;
            next.resume_status = Some(from);
            Transition::new(from, next)
        }
        (ListingStatus::Pending, ListingCommand::CancelSubmission) => {
            let mut next = state.clone();
            next.status = state.resume_status.unwrap_or_else(|| infer_resume_status(state));
            next.audit_info = None;
            next.resume_status = None;
            if !next.status.has_live_baseline() {
                next.overlay = None;
            }
            Transition::new(from, next)
        }
        (ListingStatus::Pending, ListingCommand::Approve) => {
            let mut next = state.clone();
            if let Some(overlay) = next.overlay.take() {
                overlay.merge_into(&mut next.live);
            }
            next.status = ListingStatus::Approved;
            next.reject_reason = None;
            next.audit_info = None;
            next.resume_status = None;

            let mut t = Transition::new(from, next).with_images(ImageEffect::PromoteDrafts);
            t.min_price = Some(derive_min_price(&t.next.live.room_types));
            t
        }
        (ListingStatus::Pending, ListingCommand::Reject { reason }) => {
            validate_reject_reason(&reason)?;
            let reason = bounded_text(Some(reason), MAX_REJECT_REASON_LENGTH, "reason")?;
            let mut next = state.clone();
            next.status = ListingStatus::Rejected;
            next.reject_reason = reason;
            next.audit_info = None;
            next.resume_status = None;
            Transition::new(from, next)
        }

        // -- Visibility ------------------------------------------------------
        (ListingStatus::Approved, ListingCommand::Publish) => {
            let mut next = state.clone();
            next.status = ListingStatus::Published;
            Transition::new(from, next)
        }
        (ListingStatus::Published, ListingCommand::TakeOffline) => {
            let mut next = state.clone();
            next.status = ListingStatus::Offline;
            next.is_banner = false;
            Transition::new(from, next)
        }
        (ListingStatus::Offline, ListingCommand::Restore) => {
            let mut next = state.clone();
            next.status = ListingStatus::Published;
            Transition::new(from, next)
        }
        (ListingStatus::Published, ListingCommand::SetBanner(flag)) => {
            let mut next = state.clone();
            next.is_banner = flag;
            Transition::new(from, next)
        }
        (_, ListingCommand::SetBanner(false)) => {
            let mut next = state.clone();
            next.is_banner = false;
            Transition::new(from, next)
        }

        (status, command) => return Err(illegal(&command, status)),
    };

    transition.next.check_invariants()?;
    Ok(transition)
}

/// Resume status for Pending rows written before `resume_status` existed:
/// Rejected if a rejection was recorded, else Published if an overlay
/// exists, else Draft.
fn infer_resume_status(state: &ListingState) -> ListingStatus {
    if state.reject_reason.is_some() {
        ListingStatus::Rejected
    } else if state.overlay.is_some() {
        ListingStatus::Published
    } else {
        ListingStatus::Draft
    }
}
