//! # Archive State Machine
//!
//! The archive workflow as data: the states a run passes through, the step
//! that leaves each state, the capability each step runs with, and the typed
//! record of what every step did.
//!
//! ## Transitions
//!
//! ```text
//! Pending ──Locate──▶ Located ──DetectDuplicate──▶ DuplicateChecked
//!    │                                                   │
//!    └──▶ NotFound                                       │ RemoveLiveTriples
//!                                                        ▼
//!                                               LiveTriplesRemoved
//!                                                        │ CopyToGraveyard
//!                                                        ▼
//!                                                CopiedToGraveyard
//!                                                        │ Reclassify
//!                                                        ▼
//!                                                 TypeReclassified
//!                                                        │ Annotate
//!                                                        ▼
//!                                                    Annotated
//!                 duplicate ┌────────────────────────────┴──────────────┐ no duplicate
//!            RelocateDuplicateLink                               InvalidateCache
//!                           ▼                                           ▼
//!               DuplicateLinkRelocated                          CacheInvalidated
//!              RedirectReferences                               RelocateReferences
//!                           ▼                                           ▼
//!                DuplicateBranchDone ──────────▶ Archived ◀──── NoDuplicateBranchDone
//! ```
//!
//! Any step failure moves the run to `Failed`. Nothing here performs I/O;
//! the service crate drives these transitions against a query executor.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// STATES
// =============================================================================

/// Where an archive run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArchiveState {
    Pending,
    Located,
    DuplicateChecked,
    LiveTriplesRemoved,
    CopiedToGraveyard,
    TypeReclassified,
    Annotated,
    DuplicateLinkRelocated,
    DuplicateBranchDone,
    CacheInvalidated,
    NoDuplicateBranchDone,
    Archived,
    NotFound,
    Failed,
}

impl ArchiveState {
    /// Check if no further step can run from this state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ArchiveState::Archived | ArchiveState::NotFound | ArchiveState::Failed
        )
    }

    /// Check if the state lies past the first mutation.
    #[must_use]
    pub fn has_mutated(&self) -> bool {
        !matches!(
            self,
            ArchiveState::Pending
                | ArchiveState::Located
                | ArchiveState::DuplicateChecked
                | ArchiveState::NotFound
        )
    }

    /// The step that leaves this state, given whether a duplicate was found.
    ///
    /// Returns `None` for terminal states and for the branch-done states, which
    /// complete directly into `Archived`.
    #[must_use]
    pub fn next_step(&self, has_duplicate: bool) -> Option<Step> {
        match self {
            ArchiveState::Pending => Some(Step::Locate),
            ArchiveState::Located => Some(Step::DetectDuplicate),
            ArchiveState::DuplicateChecked => Some(Step::RemoveLiveTriples),
            ArchiveState::LiveTriplesRemoved => Some(Step::CopyToGraveyard),
            ArchiveState::CopiedToGraveyard => Some(Step::Reclassify),
            ArchiveState::TypeReclassified => Some(Step::Annotate),
            ArchiveState::Annotated if has_duplicate => Some(Step::RelocateDuplicateLink),
            ArchiveState::Annotated => Some(Step::InvalidateCache),
            ArchiveState::DuplicateLinkRelocated => Some(Step::RedirectReferences),
            ArchiveState::CacheInvalidated => Some(Step::RelocateReferences),
            ArchiveState::DuplicateBranchDone
            | ArchiveState::NoDuplicateBranchDone
            | ArchiveState::Archived
            | ArchiveState::NotFound
            | ArchiveState::Failed => None,
        }
    }

    /// Where a run goes once no step remains: branch-done states close as
    /// `Archived`, everything else stays put.
    #[must_use]
    pub fn settle(self) -> ArchiveState {
        match self {
            ArchiveState::DuplicateBranchDone | ArchiveState::NoDuplicateBranchDone => {
                ArchiveState::Archived
            }
            other => other,
        }
    }
}

impl fmt::Display for ArchiveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// =============================================================================
// STEPS
// =============================================================================

/// One unit of work in the archive workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Locate,
    DetectDuplicate,
    RemoveLiveTriples,
    CopyToGraveyard,
    Reclassify,
    Annotate,
    RelocateDuplicateLink,
    RedirectReferences,
    InvalidateCache,
    RelocateReferences,
}

impl Step {
    /// Every step, in declaration order.
    pub const ALL: [Step; 10] = [
        Step::Locate,
        Step::DetectDuplicate,
        Step::RemoveLiveTriples,
        Step::CopyToGraveyard,
        Step::Reclassify,
        Step::Annotate,
        Step::RelocateDuplicateLink,
        Step::RedirectReferences,
        Step::InvalidateCache,
        Step::RelocateReferences,
    ];

    /// The state a successful run of this step ends in.
    #[must_use]
    pub fn target(&self) -> ArchiveState {
        match self {
            Step::Locate => ArchiveState::Located,
            Step::DetectDuplicate => ArchiveState::DuplicateChecked,
            Step::RemoveLiveTriples => ArchiveState::LiveTriplesRemoved,
            Step::CopyToGraveyard => ArchiveState::CopiedToGraveyard,
            Step::Reclassify => ArchiveState::TypeReclassified,
            Step::Annotate => ArchiveState::Annotated,
            Step::RelocateDuplicateLink => ArchiveState::DuplicateLinkRelocated,
            Step::RedirectReferences => ArchiveState::DuplicateBranchDone,
            Step::InvalidateCache => ArchiveState::CacheInvalidated,
            Step::RelocateReferences => ArchiveState::NoDuplicateBranchDone,
        }
    }

    /// Check if the step only reads.
    #[must_use]
    pub fn is_read(&self) -> bool {
        matches!(self, Step::Locate | Step::DetectDuplicate)
    }

    /// Stable name for logs and error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Step::Locate => "locate",
            Step::DetectDuplicate => "detect_duplicate",
            Step::RemoveLiveTriples => "remove_live_triples",
            Step::CopyToGraveyard => "copy_to_graveyard",
            Step::Reclassify => "reclassify",
            Step::Annotate => "annotate",
            Step::RelocateDuplicateLink => "relocate_duplicate_link",
            Step::RedirectReferences => "redirect_references",
            Step::InvalidateCache => "invalidate_cache",
            Step::RelocateReferences => "relocate_references",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// CAPABILITIES
// =============================================================================

/// Authorization context a statement runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Subject to the store's access control for the requesting user.
    AsUser,
    /// Bypasses access control.
    Privileged,
}

/// Which capability each step runs with.
///
/// The default proves the caller's rights with as-user reads and an as-user
/// removal of the entity's live triples, then runs every graveyard write
/// privileged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionPlan {
    pub locate: Capability,
    pub detect_duplicate: Capability,
    pub remove_live_triples: Capability,
    pub copy_to_graveyard: Capability,
    pub reclassify: Capability,
    pub annotate: Capability,
    pub relocate_duplicate_link: Capability,
    pub redirect_references: Capability,
    pub invalidate_cache: Capability,
    pub relocate_references: Capability,
}

impl Default for ExecutionPlan {
    fn default() -> Self {
        Self {
            locate: Capability::AsUser,
            detect_duplicate: Capability::AsUser,
            remove_live_triples: Capability::AsUser,
            copy_to_graveyard: Capability::Privileged,
            reclassify: Capability::Privileged,
            annotate: Capability::Privileged,
            relocate_duplicate_link: Capability::Privileged,
            redirect_references: Capability::Privileged,
            invalidate_cache: Capability::Privileged,
            relocate_references: Capability::Privileged,
        }
    }
}

impl ExecutionPlan {
    /// A plan running every step with one capability.
    #[must_use]
    pub fn uniform(capability: Capability) -> Self {
        Self {
            locate: capability,
            detect_duplicate: capability,
            remove_live_triples: capability,
            copy_to_graveyard: capability,
            reclassify: capability,
            annotate: capability,
            relocate_duplicate_link: capability,
            redirect_references: capability,
            invalidate_cache: capability,
            relocate_references: capability,
        }
    }

    /// The capability a step runs with.
    #[must_use]
    pub fn capability(&self, step: Step) -> Capability {
        match step {
            Step::Locate => self.locate,
            Step::DetectDuplicate => self.detect_duplicate,
            Step::RemoveLiveTriples => self.remove_live_triples,
            Step::CopyToGraveyard => self.copy_to_graveyard,
            Step::Reclassify => self.reclassify,
            Step::Annotate => self.annotate,
            Step::RelocateDuplicateLink => self.relocate_duplicate_link,
            Step::RedirectReferences => self.redirect_references,
            Step::InvalidateCache => self.invalidate_cache,
            Step::RelocateReferences => self.relocate_references,
        }
    }
}

/// What happens when a privileged write is not acknowledged.
///
/// A denied as-user write always aborts: privileged steps may only follow an
/// acknowledged as-user write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DenialPolicy {
    /// Fail the run.
    #[default]
    Abort,
    /// Log the denial and carry on with the next step.
    Log,
}

// =============================================================================
// STEP RECORDS
// =============================================================================

/// Result of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// The statement ran and was acknowledged.
    Applied,
    /// Nothing needed doing; no statement was sent.
    NoOp,
    /// The write ran but the store did not acknowledge it.
    Denied,
    /// The step raised an error.
    Failed,
}

/// Trail entry for one executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: Step,
    pub capability: Capability,
    pub outcome: StepOutcome,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(has_duplicate: bool) -> Vec<Step> {
        let mut state = ArchiveState::Pending;
        let mut steps = Vec::new();
        while let Some(step) = state.next_step(has_duplicate) {
            steps.push(step);
            state = step.target();
        }
        assert_eq!(state.settle(), ArchiveState::Archived);
        steps
    }

    #[test]
    fn duplicate_branch_sequence() {
        assert_eq!(
            walk(true),
            vec![
                Step::Locate,
                Step::DetectDuplicate,
                Step::RemoveLiveTriples,
                Step::CopyToGraveyard,
                Step::Reclassify,
                Step::Annotate,
                Step::RelocateDuplicateLink,
                Step::RedirectReferences,
            ]
        );
    }

    #[test]
    fn no_duplicate_branch_sequence() {
        assert_eq!(
            walk(false),
            vec![
                Step::Locate,
                Step::DetectDuplicate,
                Step::RemoveLiveTriples,
                Step::CopyToGraveyard,
                Step::Reclassify,
                Step::Annotate,
                Step::InvalidateCache,
                Step::RelocateReferences,
            ]
        );
    }

    #[test]
    fn duplicate_check_precedes_first_mutation() {
        for has_duplicate in [true, false] {
            let steps = walk(has_duplicate);
            let detect = steps.iter().position(|s| *s == Step::DetectDuplicate);
            let first_write = steps.iter().position(|s| !s.is_read());
            assert!(detect < first_write);
        }
    }

    #[test]
    fn removal_and_copy_each_reach_their_own_state() {
        assert_eq!(
            ArchiveState::DuplicateChecked.next_step(false),
            Some(Step::RemoveLiveTriples)
        );
        assert_eq!(
            Step::RemoveLiveTriples.target(),
            ArchiveState::LiveTriplesRemoved
        );
        assert_eq!(
            ArchiveState::LiveTriplesRemoved.next_step(true),
            Some(Step::CopyToGraveyard)
        );
        assert_eq!(
            Step::CopyToGraveyard.target(),
            ArchiveState::CopiedToGraveyard
        );
    }

    #[test]
    fn every_step_reaches_a_distinct_state() {
        let mut targets: Vec<ArchiveState> = Step::ALL.iter().map(Step::target).collect();
        targets.sort();
        targets.dedup();
        assert_eq!(targets.len(), Step::ALL.len());
    }

    #[test]
    fn terminal_states_have_no_next_step() {
        for state in [
            ArchiveState::Archived,
            ArchiveState::NotFound,
            ArchiveState::Failed,
        ] {
            assert!(state.is_terminal());
            assert_eq!(state.next_step(true), None);
            assert_eq!(state.next_step(false), None);
        }
    }

    #[test]
    fn mutation_boundary() {
        assert!(!ArchiveState::DuplicateChecked.has_mutated());
        assert!(ArchiveState::LiveTriplesRemoved.has_mutated());
        assert!(ArchiveState::CopiedToGraveyard.has_mutated());
        assert!(!ArchiveState::NotFound.has_mutated());
    }

    #[test]
    fn default_plan_removes_as_user_and_copies_privileged() {
        let plan = ExecutionPlan::default();
        assert_eq!(plan.capability(Step::Locate), Capability::AsUser);
        assert_eq!(plan.capability(Step::RemoveLiveTriples), Capability::AsUser);
        assert_eq!(plan.capability(Step::CopyToGraveyard), Capability::Privileged);
        assert_eq!(plan.capability(Step::Reclassify), Capability::Privileged);
        assert!(
            Step::ALL
                .iter()
                .all(|s| ExecutionPlan::uniform(Capability::AsUser).capability(*s)
                    == Capability::AsUser)
        );
    }
}
