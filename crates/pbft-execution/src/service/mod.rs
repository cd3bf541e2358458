//! Replica Service - request intake and execution commit
//!
//! # Architecture
//! - Replica state (journal, pending set, cache, commit gate, view, timer)
//!   lives behind one `parking_lot` mutex, held only for short sections
//! - Commits are serialised by an async execution lane; the executor runs
//!   inside the lane but outside the state lock, so intake and queries are
//!   never blocked by a slow workload
//! - A digest is claimed (removed from pending) before the executor runs;
//!   once claimed, the commit finishes on its own task and the sequence
//!   slot is consumed whatever the outcome, even if the caller goes away

use crate::adapters::{sign_response, ExecutorAdapter, LivenessTimer, ResultDisseminator};
use crate::config::ReplicaConfig;
use crate::domain::invariants::{
    invariant_pending_subset_of_journal, invariant_timer_correlation,
};
use crate::domain::{
    CommitOutcome, ExecutionContext, ReplicaError, ReplicaResult, Request, SubmitAck,
};
use crate::metrics;
use crate::ports::{
    ClusterPublisher, PeerTransport, PostProcessor, ReplicaApi, ResultSigner, ViewChangeTrigger,
    WorkloadExecutor,
};
use crate::state::{Claim, ReplicaState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use shared_types::{Digest, ExecuteRequest, ExecuteResponse, ExecutionResult, PeerId, ResultCode};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

type SharedState = Arc<Mutex<ReplicaState>>;

/// Replica Service
pub struct ReplicaService<X, T, P, S>
where
    X: WorkloadExecutor,
    T: PeerTransport,
    P: ClusterPublisher,
    S: ResultSigner,
{
    identity: PeerId,
    replicas: Arc<[PeerId]>,
    executor: Arc<ExecutorAdapter<X>>,
    disseminator: Arc<ResultDisseminator<T, P>>,
    signer: Arc<S>,
    post_processors: Arc<[Arc<dyn PostProcessor>]>,
    state: SharedState,
    lane: Arc<tokio::sync::Mutex<()>>,
    config: ReplicaConfig,
}

/// Dependencies for ReplicaService
pub struct ReplicaDependencies<X, T, P, S> {
    pub executor: Arc<X>,
    pub transport: Arc<T>,
    pub publisher: Arc<P>,
    pub signer: Arc<S>,
    pub view_change: Arc<dyn ViewChangeTrigger>,
    /// Fixed, ordered replica set; `replicas[view % len]` is primary.
    pub replicas: Vec<PeerId>,
    pub config: ReplicaConfig,
}

impl<X, T, P, S> ReplicaService<X, T, P, S>
where
    X: WorkloadExecutor,
    T: PeerTransport,
    P: ClusterPublisher,
    S: ResultSigner,
{
    /// Create a new ReplicaService
    pub fn new(deps: ReplicaDependencies<X, T, P, S>) -> Self {
        let timer = LivenessTimer::new(deps.config.request_timeout, deps.view_change);

        Self {
            identity: deps.signer.identity(),
            replicas: deps.replicas.into(),
            executor: Arc::new(ExecutorAdapter::new(deps.executor)),
            disseminator: Arc::new(ResultDisseminator::new(
                deps.transport,
                deps.publisher,
                &deps.config,
            )),
            signer: deps.signer,
            post_processors: Vec::new().into(),
            state: Arc::new(Mutex::new(ReplicaState::new(timer))),
            lane: Arc::new(tokio::sync::Mutex::new(())),
            config: deps.config,
        }
    }

    /// Append a post-processing hook. Hooks run in the order added.
    pub fn with_post_processor(mut self, hook: Arc<dyn PostProcessor>) -> Self {
        let mut hooks = self.post_processors.to_vec();
        hooks.push(hook);
        self.post_processors = hooks.into();
        self
    }

    // === OBSERVERS ===

    pub fn identity(&self) -> &PeerId {
        &self.identity
    }

    pub fn replicas(&self) -> &[PeerId] {
        &self.replicas
    }

    pub fn config(&self) -> &ReplicaConfig {
        &self.config
    }

    pub fn current_view(&self) -> u64 {
        self.state.lock().current_view
    }

    /// Install a new view, as decided by the view-change manager.
    pub fn set_view(&self, view: u64) {
        let mut state = self.state.lock();
        if state.current_view != view {
            info!(old_view = state.current_view, new_view = view, "View changed");
            state.current_view = view;
        }
    }

    /// Whether this replica is primary in the current view.
    pub fn is_primary(&self) -> bool {
        let view = self.current_view();
        crate::domain::primary_for_view(view, &self.replicas) == Some(&self.identity)
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn journal_len(&self) -> usize {
        self.state.lock().journal.len()
    }

    pub fn timer_running(&self) -> bool {
        self.state.lock().timer.is_running()
    }

    // === INTERNALS ===

    /// Apply the configured deadline when the caller supplied none.
    fn bounded(&self, ctx: ExecutionContext) -> ExecutionContext {
        match (ctx.deadline, self.config.execution_deadline) {
            (None, Some(limit)) => ctx.with_timeout(limit),
            _ => ctx,
        }
    }

    fn log_declined(&self, view: u64, sequence: u64, digest: &Digest, outcome: &CommitOutcome) {
        match outcome {
            CommitOutcome::AlreadyExecuted => {
                warn!(
                    view,
                    sequence,
                    digest = %digest,
                    "No pending request with matching digest, likely already executed"
                );
            }
            CommitOutcome::SequenceGap { expected, received } => {
                info!(
                    view,
                    sequence,
                    digest = %digest,
                    expected,
                    received,
                    "Requests with lower sequence numbers have not been executed"
                );
            }
            CommitOutcome::OutOfOrder {
                last_executed,
                received,
            } => {
                error!(
                    view,
                    sequence,
                    digest = %digest,
                    last_executed,
                    received,
                    "Commit for an already executed sequence number"
                );
            }
            CommitOutcome::Executed { .. } => {}
        }
    }
}

/// Start the liveness timer. The expiry payload is read from live state
/// when the timer fires.
fn arm_timer(shared: &SharedState, state: &mut ReplicaState, override_running: bool) {
    let weak = Arc::downgrade(shared);
    state.timer.start(
        override_running,
        Box::new(move || {
            let state = weak.upgrade()?;
            let signal = state.lock().view_change_signal();
            signal
        }),
    );
}

/// A commit whose digest has left the pending set.
///
/// Runs on its own task: once started it executes, advances the sequence,
/// signs, caches and disseminates regardless of what happens to the caller.
struct ClaimedCommit<X, T, P, S>
where
    X: WorkloadExecutor,
    T: PeerTransport,
    P: ClusterPublisher,
    S: ResultSigner,
{
    identity: PeerId,
    replicas: Arc<[PeerId]>,
    executor: Arc<ExecutorAdapter<X>>,
    disseminator: Arc<ResultDisseminator<T, P>>,
    signer: Arc<S>,
    post_processors: Arc<[Arc<dyn PostProcessor>]>,
    state: SharedState,
    view: u64,
    sequence: u64,
    request: Request,
    ctx: ExecutionContext,
}

impl<X, T, P, S> ClaimedCommit<X, T, P, S>
where
    X: WorkloadExecutor,
    T: PeerTransport,
    P: ClusterPublisher,
    S: ResultSigner,
{
    async fn finish(self) -> ReplicaResult<CommitOutcome> {
        let (view, sequence) = (self.view, self.sequence);

        info!(
            view,
            sequence,
            request_id = %self.request.id,
            "Executing request"
        );

        let result = self
            .executor
            .run(&self.request.id, &self.request.execute, &self.ctx)
            .await;
        let code = result.code;

        let current_view = self.complete_execution();
        metrics::record_commit("executed");
        info!(
            view,
            sequence,
            request_id = %self.request.id,
            code = %code,
            "Executed request"
        );

        self.run_post_processors(&result);

        let mut response = ExecuteResponse::new(
            self.identity.clone(),
            current_view,
            self.request.timestamp,
            self.request.execute.function_id.clone(),
            result,
        );
        if let Err(source) = sign_response(self.signer.as_ref(), &mut response) {
            error!(request_id = %self.request.id, error = %source, "Could not sign execution result");
            return Err(ReplicaError::Signing {
                request_id: self.request.id,
                source,
            });
        }

        self.state
            .lock()
            .cache
            .insert(self.request.id.clone(), response.clone());

        let sink = self
            .disseminator
            .route(&self.identity, current_view, &self.replicas);
        self.disseminator.disseminate(&sink, &response).await?;

        Ok(CommitOutcome::Executed {
            sequence,
            request_id: self.request.id,
            code,
        })
    }

    /// Record the executed sequence and reset the liveness timer.
    /// Returns the view results are attributed to.
    fn complete_execution(&self) -> u64 {
        let mut state = self.state.lock();
        state.gate.advance(self.sequence);

        state.timer.stop();
        if !state.pending.is_empty() {
            arm_timer(&self.state, &mut state, true);
        }
        debug_assert!(invariant_timer_correlation(
            state.pending.len(),
            state.timer.is_running()
        ));

        metrics::record_executed(self.sequence, state.pending.len());
        state.current_view
    }

    /// Run every hook in order. A failing or panicking hook is logged and
    /// does not stop the others.
    fn run_post_processors(&self, result: &ExecutionResult) {
        let request = &self.request;
        for hook in self.post_processors.iter() {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                hook.process(&request.id, &request.origin, &request.execute, result)
            }));

            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(reason)) => {
                    metrics::record_hook_failure();
                    warn!(
                        request_id = %request.id,
                        hook = hook.name(),
                        error = %reason,
                        "Post-processor failed"
                    );
                }
                Err(_) => {
                    metrics::record_hook_failure();
                    warn!(request_id = %request.id, hook = hook.name(), "Post-processor panicked");
                }
            }
        }
    }
}

#[async_trait]
impl<X, T, P, S> ReplicaApi for ReplicaService<X, T, P, S>
where
    X: WorkloadExecutor + 'static,
    T: PeerTransport + 'static,
    P: ClusterPublisher + 'static,
    S: ResultSigner + 'static,
{
    async fn submit(
        &self,
        origin: PeerId,
        request_id: String,
        timestamp: DateTime<Utc>,
        payload: ExecuteRequest,
    ) -> ReplicaResult<SubmitAck> {
        let request = Request::new(request_id, timestamp, origin, payload);
        request.validate()?;
        let digest = request.digest()?;
        let request_id = request.id.clone();

        let (intake, pending) = {
            let mut state = self.state.lock();
            let intake = state.journal_request(digest, request);
            if intake.arm_timer {
                arm_timer(&self.state, &mut state, false);
            }
            debug_assert!(invariant_pending_subset_of_journal(
                &state.pending,
                &state.journal
            ));
            (intake, state.pending.len())
        };

        metrics::record_submitted(intake.newly_journaled, pending);
        if intake.newly_journaled {
            info!(request_id = %request_id, digest = %digest, pending, "Request journaled");
        } else {
            debug!(request_id = %request_id, digest = %digest, "Request already journaled");
        }

        Ok(SubmitAck {
            code: ResultCode::NoContent,
            request_id,
            digest,
            newly_journaled: intake.newly_journaled,
        })
    }

    async fn commit(
        &self,
        view: u64,
        sequence: u64,
        digest: Digest,
    ) -> ReplicaResult<CommitOutcome> {
        self.commit_with(view, sequence, digest, ExecutionContext::new())
            .await
    }

    async fn commit_with(
        &self,
        view: u64,
        sequence: u64,
        digest: Digest,
        ctx: ExecutionContext,
    ) -> ReplicaResult<CommitOutcome> {
        // Held until the result is disseminated, so results leave in order.
        let lane = Arc::clone(&self.lane).lock_owned().await;

        let claim = self.state.lock().claim(sequence, &digest);
        let request = match claim {
            Ok(Claim::Ready(request)) => request,
            Ok(Claim::Declined(outcome)) => {
                self.log_declined(view, sequence, &digest, &outcome);
                metrics::record_commit(outcome.label());
                return Ok(outcome);
            }
            Err(e) => {
                error!(view, sequence, digest = %digest, "Commit for unknown request");
                metrics::record_commit("unknown_request");
                return Err(e);
            }
        };

        debug!(view, sequence, digest = %digest, request_id = %request.id, "Request claimed");
        let request_id = request.id.clone();

        let claimed = ClaimedCommit {
            identity: self.identity.clone(),
            replicas: Arc::clone(&self.replicas),
            executor: Arc::clone(&self.executor),
            disseminator: Arc::clone(&self.disseminator),
            signer: Arc::clone(&self.signer),
            post_processors: Arc::clone(&self.post_processors),
            state: Arc::clone(&self.state),
            view,
            sequence,
            request,
            ctx: self.bounded(ctx),
        };

        // Dropping this future leaves the task running; the lane moves with it.
        let handle = tokio::spawn(async move {
            let _lane = lane;
            claimed.finish().await
        });

        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(sequence, request_id = %request_id, error = %e, "Execution task failed");
                Err(ReplicaError::ExecutionAborted {
                    request_id,
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn cached_result(&self, request_id: &str) -> Option<ExecuteResponse> {
        self.state.lock().cache.get(request_id).cloned()
    }

    async fn last_executed(&self) -> u64 {
        self.state.lock().gate.last_executed()
    }
}
