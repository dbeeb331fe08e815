//! # Archive Orchestrator
//!
//! Drives the archive state machine from `graveyard_core::workflow` against
//! two query executors, one per capability.
//!
//! ## Run Rules
//!
//! - Steps run strictly in sequence; each sees the effect of the previous one.
//! - The duplicate check runs before the entity's triples are moved.
//! - The entity's live triples are removed as the user, then the triples
//!   captured when it was located are copied into the graveyard.
//! - Privileged statements are only sent once an as-user write has been
//!   acknowledged in the same run.
//! - A denied as-user write fails the run. A denied privileged write fails the
//!   run under `DenialPolicy::Abort` and is logged and skipped under
//!   `DenialPolicy::Log`.
//! - The first error fails the run. Committed steps are not rolled back.

use super::executor::{ExecutorError, QueryExecutor};
use graveyard_core::{
    ArchiveState, Capability, DenialPolicy, ExecutionPlan, Iri, Quad, Select, Step, StepOutcome,
    StepRecord, Update, Vocabulary, statements,
};
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// RESULT TYPES
// =============================================================================

/// What a run did, step by step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    /// The external identifier the run was asked to archive.
    pub identifier: String,
    /// The resolved entity.
    pub subject: Option<Iri>,
    /// The duplicate found before the move, if any.
    pub duplicate: Option<Iri>,
    /// Where the run ended.
    pub state: ArchiveState,
    /// Every state the run passed through, in order.
    pub visited: Vec<ArchiveState>,
    /// One record per executed step.
    pub trail: Vec<StepRecord>,
}

impl ArchiveReport {
    fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            subject: None,
            duplicate: None,
            state: ArchiveState::Pending,
            visited: vec![ArchiveState::Pending],
            trail: Vec::new(),
        }
    }

    fn enter(&mut self, state: ArchiveState) {
        self.state = state;
        self.visited.push(state);
    }

    fn record(&mut self, step: Step, capability: Capability, outcome: StepOutcome) {
        self.trail.push(StepRecord {
            step,
            capability,
            outcome,
        });
    }
}

/// Why a run did not archive the entity.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The identifier does not resolve to any entity.
    #[error("No mandataris found for identifier {identifier:?}")]
    NotFound { identifier: String },

    /// A write ran but the store did not acknowledge it.
    #[error("Write not acknowledged during {step} while archiving {identifier:?}")]
    AuthorizationDenied { identifier: String, step: Step },

    /// A privileged statement was due before the caller's rights were proven.
    #[error(
        "Privileged {step} requested before any acknowledged as-user write while archiving {identifier:?}"
    )]
    PrivilegeNotEstablished { identifier: String, step: Step },

    /// A step failed.
    #[error("Archiving {identifier:?} failed during {step}: {source}")]
    Execution {
        identifier: String,
        step: Step,
        #[source]
        source: ExecutorError,
    },
}

/// A failed run: the error plus everything the run did before it.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ArchiveFailure {
    pub error: ArchiveError,
    pub report: ArchiveReport,
}

impl ArchiveFailure {
    /// Check if the run stopped because the identifier did not resolve.
    pub fn is_not_found(&self) -> bool {
        matches!(self.error, ArchiveError::NotFound { .. })
    }
}

/// How a single step went wrong, before it is tied to the run.
enum StepFailure {
    NotFound,
    Unprivileged,
    Executor(ExecutorError),
}

impl From<ExecutorError> for StepFailure {
    fn from(error: ExecutorError) -> Self {
        StepFailure::Executor(error)
    }
}

// =============================================================================
// RUN CONTEXT
// =============================================================================

/// Mutable state of one run.
struct Run<'a> {
    as_user: &'a dyn QueryExecutor,
    privileged: &'a dyn QueryExecutor,
    report: ArchiveReport,
    /// The entity's own triples, read when it was located.
    triples: Vec<Quad>,
    /// Set once an as-user write has been acknowledged.
    authorization_proven: bool,
}

impl Run<'_> {
    fn executor(&self, capability: Capability) -> Result<&dyn QueryExecutor, StepFailure> {
        match capability {
            Capability::AsUser => Ok(self.as_user),
            Capability::Privileged if self.authorization_proven => Ok(self.privileged),
            Capability::Privileged => Err(StepFailure::Unprivileged),
        }
    }

    async fn read(&self, capability: Capability, query: &Select) -> Result<Vec<Quad>, StepFailure> {
        let executor = self.executor(capability)?;
        Ok(executor.read(query).await?)
    }

    async fn write(
        &mut self,
        capability: Capability,
        update: &Update,
    ) -> Result<StepOutcome, StepFailure> {
        if update.is_empty() {
            return Ok(StepOutcome::NoOp);
        }
        let executor = self.executor(capability)?;
        if !executor.write(update).await? {
            return Ok(StepOutcome::Denied);
        }
        if capability == Capability::AsUser {
            self.authorization_proven = true;
        }
        Ok(StepOutcome::Applied)
    }

    fn subject(&self) -> Result<Iri, StepFailure> {
        self.report.subject.clone().ok_or_else(|| {
            StepFailure::Executor(ExecutorError::Inconsistent(
                "entity was not located".to_string(),
            ))
        })
    }

    fn duplicate(&self) -> Result<Iri, StepFailure> {
        self.report.duplicate.clone().ok_or_else(|| {
            StepFailure::Executor(ExecutorError::Inconsistent(
                "no duplicate was detected".to_string(),
            ))
        })
    }
}

// =============================================================================
// ARCHIVER
// =============================================================================

/// Runs archive workflows with a fixed vocabulary, plan and denial policy.
#[derive(Debug, Clone, Default)]
pub struct Archiver {
    vocab: Vocabulary,
    plan: ExecutionPlan,
    denial_policy: DenialPolicy,
}

impl Archiver {
    /// Create an archiver.
    pub fn new(vocab: Vocabulary, plan: ExecutionPlan, denial_policy: DenialPolicy) -> Self {
        Self {
            vocab,
            plan,
            denial_policy,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    /// Archive the entity carrying `identifier`.
    pub async fn archive(
        &self,
        identifier: &str,
        as_user: &dyn QueryExecutor,
        privileged: &dyn QueryExecutor,
    ) -> Result<ArchiveReport, ArchiveFailure> {
        tracing::info!(identifier, "Archive requested");

        let mut run = Run {
            as_user,
            privileged,
            report: ArchiveReport::new(identifier),
            triples: Vec::new(),
            authorization_proven: false,
        };

        let mut state = run.report.state;
        while let Some(step) = state.next_step(run.report.duplicate.is_some()) {
            let capability = self.plan.capability(step);
            match self.execute(step, capability, &mut run).await {
                Ok(outcome) => {
                    run.report.record(step, capability, outcome);
                    tracing::debug!(identifier, step = %step, ?capability, ?outcome, "Step finished");

                    if outcome == StepOutcome::Denied {
                        tracing::warn!(
                            event = "write_denied",
                            identifier,
                            step = %step,
                            ?capability,
                            "Write was not acknowledged"
                        );
                        if capability == Capability::AsUser
                            || self.denial_policy == DenialPolicy::Abort
                        {
                            let error = ArchiveError::AuthorizationDenied {
                                identifier: identifier.to_string(),
                                step,
                            };
                            return Err(fail(run.report, error));
                        }
                    }

                    state = step.target();
                    run.report.enter(state);
                }
                Err(StepFailure::NotFound) => {
                    run.report.record(step, capability, StepOutcome::NoOp);
                    run.report.enter(ArchiveState::NotFound);
                    tracing::info!(identifier, "No mandataris found");
                    let error = ArchiveError::NotFound {
                        identifier: identifier.to_string(),
                    };
                    return Err(ArchiveFailure {
                        error,
                        report: run.report,
                    });
                }
                Err(StepFailure::Unprivileged) => {
                    run.report.record(step, capability, StepOutcome::Failed);
                    let error = ArchiveError::PrivilegeNotEstablished {
                        identifier: identifier.to_string(),
                        step,
                    };
                    return Err(fail(run.report, error));
                }
                Err(StepFailure::Executor(source)) => {
                    run.report.record(step, capability, StepOutcome::Failed);
                    let error = ArchiveError::Execution {
                        identifier: identifier.to_string(),
                        step,
                        source,
                    };
                    return Err(fail(run.report, error));
                }
            }
        }

        let settled = state.settle();
        if settled != state {
            run.report.enter(settled);
        }
        tracing::info!(
            identifier,
            subject = ?run.report.subject.as_ref().map(Iri::as_str),
            duplicate = ?run.report.duplicate.as_ref().map(Iri::as_str),
            "Archived"
        );
        Ok(run.report)
    }

    /// Run one step.
    async fn execute(
        &self,
        step: Step,
        capability: Capability,
        run: &mut Run<'_>,
    ) -> Result<StepOutcome, StepFailure> {
        let vocab = &self.vocab;
        match step {
            Step::Locate => {
                let found = run
                    .read(capability, &statements::locate(vocab, &run.report.identifier))
                    .await?;
                let Some(subject) = found.into_iter().next().map(|q| q.subject) else {
                    return Err(StepFailure::NotFound);
                };
                run.triples = run
                    .read(capability, &statements::describe(&subject))
                    .await?;
                run.report.subject = Some(subject);
                Ok(StepOutcome::Applied)
            }
            Step::DetectDuplicate => {
                let subject = run.subject()?;
                let found = run
                    .read(capability, &statements::find_duplicate(vocab, &subject))
                    .await?;
                run.report.duplicate = found.into_iter().find_map(|q| {
                    q.object
                        .as_iri()
                        .filter(|duplicate| **duplicate != subject)
                        .cloned()
                });
                Ok(StepOutcome::Applied)
            }
            Step::RemoveLiveTriples => {
                let subject = run.subject()?;
                run.write(capability, &statements::remove_live_triples(vocab, &subject))
                    .await
            }
            Step::CopyToGraveyard => {
                let copy = statements::copy_to_graveyard(vocab, &run.triples);
                run.write(capability, &copy).await
            }
            Step::Reclassify => {
                let subject = run.subject()?;
                run.write(capability, &statements::reclassify(vocab, &subject))
                    .await
            }
            Step::Annotate => {
                let subject = run.subject()?;
                run.write(capability, &statements::annotate(vocab, &subject))
                    .await
            }
            Step::RelocateDuplicateLink => {
                let duplicate = run.duplicate()?;
                run.write(
                    capability,
                    &statements::relocate_duplicate_link(vocab, &duplicate),
                )
                .await
            }
            Step::RedirectReferences => {
                let subject = run.subject()?;
                let duplicate = run.duplicate()?;
                run.write(
                    capability,
                    &statements::redirect_references(vocab, &subject, &duplicate),
                )
                .await
            }
            Step::InvalidateCache => {
                let mut outcome = StepOutcome::NoOp;
                for associated in statements::aliases(vocab, &run.triples) {
                    match run.write(capability, &statements::touch(&associated)).await? {
                        StepOutcome::Denied => return Ok(StepOutcome::Denied),
                        StepOutcome::Applied => outcome = StepOutcome::Applied,
                        StepOutcome::NoOp | StepOutcome::Failed => {}
                    }
                }
                Ok(outcome)
            }
            Step::RelocateReferences => {
                let subject = run.subject()?;
                run.write(capability, &statements::relocate_references(vocab, &subject))
                    .await
            }
        }
    }
}

/// Close a run as failed and log it.
fn fail(mut report: ArchiveReport, error: ArchiveError) -> ArchiveFailure {
    report.enter(ArchiveState::Failed);
    tracing::error!(identifier = %report.identifier, error = %error, "Archive failed");
    ArchiveFailure { error, report }
}
