// crates/static-subid-cli/src/workflow.rs
// ============================================================================
// Module: Assignment Workflow
// Description: Per-domain check, allocate, and assign sequence.
// Purpose: Drive one run from a raw user argument to applied ranges.
// Dependencies: static-subid-core, static-subid-config, thiserror
// ============================================================================

//! ## Overview
//! A run resolves the user, loads the configuration, checks the UID window,
//! and then processes each requested domain in order (UID side first):
//!
//! 1. reject a UID that falls inside the domain's subordinate pool,
//! 2. with `SKIP_IF_EXISTS`, stop early when the user already has ranges,
//! 3. allocate the block,
//! 4. assign it, or render the command in noop mode.
//!
//! The first failing step ends the run; a later domain is never attempted
//! after an earlier one failed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use static_subid_config::ConfigError;
use static_subid_config::ConfigSources;
use static_subid_config::SubidConfig;
use static_subid_config::load_configuration;
use static_subid_core::AssignOutcome;
use static_subid_core::IdentityError;
use static_subid_core::InvokeError;
use static_subid_core::RangeError;
use static_subid_core::ResolvedUser;
use static_subid_core::SubidInvoker;
use static_subid_core::SubidKind;
use static_subid_core::SubidPresence;
use static_subid_core::SubidRange;
use static_subid_core::ValidationError;
use static_subid_core::allocate;
use static_subid_core::resolve_user;
use static_subid_core::validate_uid_subid_overlap;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure of one workflow step.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The user argument could not be resolved.
    #[error("cannot resolve user {user}: {source}")]
    Identity {
        /// Raw user argument.
        user: String,
        /// Underlying failure.
        source: IdentityError,
    },
    /// Configuration could not be loaded or rejected the UID.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The UID lies inside a subordinate pool.
    #[error(transparent)]
    Overlap(ValidationError),
    /// The existence query failed.
    #[error("could not check existing {kind} ranges for {user}: {source}")]
    ExistenceCheck {
        /// Domain being processed.
        kind: SubidKind,
        /// Login name.
        user: String,
        /// Underlying failure.
        source: InvokeError,
    },
    /// No block could be computed.
    #[error("cannot allocate {kind} range for {user}: {source}")]
    Allocation {
        /// Domain being processed.
        kind: SubidKind,
        /// Login name.
        user: String,
        /// Underlying failure.
        source: RangeError,
    },
    /// The assignment command failed.
    #[error("failed to assign {kind} range for {user}: {source}")]
    Assignment {
        /// Domain being processed.
        kind: SubidKind,
        /// Login name.
        user: String,
        /// Underlying failure.
        source: InvokeError,
    },
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Result of processing one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeOutcome {
    /// `SKIP_IF_EXISTS` is set and the user already has ranges.
    AlreadyAssigned,
    /// The range was assigned.
    Assigned(SubidRange),
    /// Noop mode: the command that would have run.
    DryRun {
        /// Range that would be assigned.
        range: SubidRange,
        /// Rendered command line.
        command: String,
    },
}

/// One requested run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRequest {
    /// Username or decimal UID as given on the command line.
    pub user: String,
    /// Domains to process, in order.
    pub kinds: Vec<SubidKind>,
    /// Render commands instead of running them.
    pub noop: bool,
}

/// Outcome of a full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentReport {
    /// Resolved identity.
    pub user: ResolvedUser,
    /// Per-domain outcomes in processing order.
    pub outcomes: Vec<(SubidKind, ModeOutcome)>,
}

// ============================================================================
// SECTION: Workflow
// ============================================================================

/// Executes a full run against the host behind `invoker`.
///
/// # Errors
///
/// Returns [`WorkflowError`] for the first step that fails.
pub fn run_assignment(
    invoker: &SubidInvoker<'_>,
    sources: &ConfigSources,
    request: &AssignmentRequest,
) -> Result<AssignmentReport, WorkflowError> {
    let ops = invoker.ops();
    let diagnostics = invoker.diagnostics();
    let user = resolve_user(ops, &request.user, diagnostics).map_err(|source| {
        WorkflowError::Identity {
            user: request.user.clone(),
            source,
        }
    })?;
    let config = load_configuration(ops, sources, diagnostics)?;
    config.validate_uid(user.uid)?;
    let outcomes = assign_subids(invoker, &user, &config, &request.kinds, request.noop)?;
    Ok(AssignmentReport {
        user,
        outcomes,
    })
}

/// Processes each domain in `kinds`, stopping at the first failure.
///
/// # Errors
///
/// Returns [`WorkflowError`] from the first failing domain.
pub fn assign_subids(
    invoker: &SubidInvoker<'_>,
    user: &ResolvedUser,
    config: &SubidConfig,
    kinds: &[SubidKind],
    noop: bool,
) -> Result<Vec<(SubidKind, ModeOutcome)>, WorkflowError> {
    let mut outcomes = Vec::with_capacity(kinds.len());
    for kind in SubidKind::ALL {
        if kinds.contains(&kind) {
            outcomes.push((kind, process_mode(invoker, user, config, kind, noop)?));
        }
    }
    Ok(outcomes)
}

/// Runs the overlap, existence, allocation, and assignment steps for `kind`.
///
/// # Errors
///
/// Returns [`WorkflowError`] for the failing step.
pub fn process_mode(
    invoker: &SubidInvoker<'_>,
    user: &ResolvedUser,
    config: &SubidConfig,
    kind: SubidKind,
    noop: bool,
) -> Result<ModeOutcome, WorkflowError> {
    let diagnostics = invoker.diagnostics();
    diagnostics.debug("subid_mode", format!("processing mode: {kind}"));
    let domain = config.domain(kind);
    validate_uid_subid_overlap(user.uid, kind, domain).map_err(WorkflowError::Overlap)?;

    if config.skip_if_exists {
        let presence = invoker.check_exists(&user.name, kind).map_err(|source| {
            WorkflowError::ExistenceCheck {
                kind,
                user: user.name.clone(),
                source,
            }
        })?;
        if presence == SubidPresence::Present {
            diagnostics.debug(
                "subid_skipped",
                format!("{} already has {kind} ranges, skipping", user.name),
            );
            return Ok(ModeOutcome::AlreadyAssigned);
        }
    }

    let start = allocate(user.uid, config.uid_min, domain, config.allocation_mode()).map_err(
        |source| WorkflowError::Allocation {
            kind,
            user: user.name.clone(),
            source,
        },
    )?;
    diagnostics.debug(
        "subid_allocated",
        format!("calculated {kind} range for uid {}: {start}:{}", user.uid, domain.count),
    );

    let outcome = invoker
        .assign_range(&user.name, kind, start, domain.count, noop)
        .map_err(|source| WorkflowError::Assignment {
            kind,
            user: user.name.clone(),
            source,
        })?;
    Ok(match outcome {
        AssignOutcome::Applied(range) => ModeOutcome::Assigned(range),
        AssignOutcome::DryRun {
            range,
            command,
        } => ModeOutcome::DryRun {
            range,
            command,
        },
    })
}
