//! # Event Reactor
//!
//! One task per vote event kind, each draining its own filtered
//! subscription in delivery order. A task decides one event at a time under
//! the handler timeout, then broadcasts the vote. Handler failures are
//! logged and counted; the task moves on to the next event.
//!
//! A separate task listens for `oracle_upgrade_vote_ended` and refreshes the
//! [`UpgradeGate`].
//!
//! ## Shutdown
//!
//! `ReactorHandle::shutdown` stops every task from taking new events, gives
//! in-flight handlers the grace period to finish, then aborts the rest.

use crate::application::gate::UpgradeGate;
use crate::config::ReactorConfig;
use crate::domain::{ReactorError, VoteEvent, VoteEventKind, UPGRADE_VOTE_ENDED};
use crate::ports::{OracleCapabilities, ReactorMetrics};
use oc_04_vote_tx::BroadcastResult;
use shared_bus::{ChainEvent, EventFilter, EventSubscriber, Subscription};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{timeout, timeout_at};
use tracing::{debug, error, info, warn};

/// Reacts to vote events by deciding and broadcasting votes.
pub struct EventReactor<C: OracleCapabilities + 'static> {
    ctx: Arc<C>,
    config: ReactorConfig,
    gate: Arc<UpgradeGate>,
    metrics: Arc<dyn ReactorMetrics>,
}

impl<C: OracleCapabilities + 'static> EventReactor<C> {
    /// Create a reactor. Fails on an invalid config.
    pub fn new(
        ctx: Arc<C>,
        config: ReactorConfig,
        metrics: Arc<dyn ReactorMetrics>,
    ) -> Result<Self, ReactorError> {
        config.validate()?;
        let gate = Arc::new(UpgradeGate::new(config.start_enabled));
        Ok(Self {
            ctx,
            config,
            gate,
            metrics,
        })
    }

    /// Shared upgrade gate.
    pub fn gate(&self) -> Arc<UpgradeGate> {
        Arc::clone(&self.gate)
    }

    /// Subscribe every handler to `bus` and start them.
    pub async fn start<B: EventSubscriber + ?Sized>(&self, bus: &B) -> ReactorHandle {
        let identity = self.ctx.attest().self_identity();

        if self.config.sync_gate_on_start {
            if let Err(e) = self.gate.refresh(self.ctx.query(), &identity).await {
                warn!("[oc-05] Could not read the active enclave version at start: {}", e);
            }
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut tasks = Vec::with_capacity(VoteEventKind::ALL.len() + 1);

        for kind in VoteEventKind::ALL {
            let handler = VoteHandler {
                kind,
                ctx: Arc::clone(&self.ctx),
                gate: Arc::clone(&self.gate),
                metrics: Arc::clone(&self.metrics),
                handler_timeout: self.config.handler_timeout(),
            };
            let subscription = bus.subscribe(kind.filter(&identity));
            let shutdown = shutdown_rx.clone();
            tasks.push((
                kind.label(),
                tokio::spawn(handler.run(subscription, shutdown)),
            ));
        }

        let gate_task = GateHandler {
            ctx: Arc::clone(&self.ctx),
            gate: Arc::clone(&self.gate),
        };
        let subscription = bus.subscribe(EventFilter::with_key(UPGRADE_VOTE_ENDED, "unique_id"));
        tasks.push((
            UPGRADE_VOTE_ENDED,
            tokio::spawn(gate_task.run(subscription, shutdown_rx)),
        ));

        info!(handlers = tasks.len(), "[oc-05] Event reactor started");
        ReactorHandle {
            shutdown: shutdown_tx,
            tasks,
            grace: self.config.shutdown_grace(),
        }
    }
}

/// Running reactor tasks.
pub struct ReactorHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
    grace: Duration,
}

impl ReactorHandle {
    /// Whether any task is still running.
    pub fn is_running(&self) -> bool {
        self.tasks.iter().any(|(_, task)| !task.is_finished())
    }

    /// Stop taking events, wait out the grace period, abort stragglers.
    /// Returns the number of aborted tasks.
    pub async fn shutdown(self) -> usize {
        info!("[oc-05] Shutting down event reactor");
        if let Err(e) = self.shutdown.send(true) {
            debug!("[oc-05] No handler left to signal: {}", e);
        }

        let deadline = tokio::time::Instant::now() + self.grace;
        let mut aborted = 0;
        for (name, mut task) in self.tasks {
            if timeout_at(deadline, &mut task).await.is_err() {
                warn!(task = name, "[oc-05] Handler still busy after grace period, aborting");
                task.abort();
                aborted += 1;
            }
        }
        info!(aborted, "[oc-05] Event reactor stopped");
        aborted
    }
}

/// Handler for one vote event kind.
struct VoteHandler<C: OracleCapabilities + 'static> {
    kind: VoteEventKind,
    ctx: Arc<C>,
    gate: Arc<UpgradeGate>,
    metrics: Arc<dyn ReactorMetrics>,
    handler_timeout: Duration,
}

impl<C: OracleCapabilities + 'static> VoteHandler<C> {
    async fn run(self, mut subscription: Subscription, mut shutdown: watch::Receiver<bool>) {
        debug!(event = %self.kind, "[oc-05] Handler listening");
        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    info!(event = %self.kind, "[oc-05] Shutdown signal received");
                    break;
                }
                next = subscription.recv() => match next {
                    Some(event) => self.handle(event).await,
                    None => {
                        warn!(event = %self.kind, "[oc-05] Event bus closed");
                        break;
                    }
                },
            }
        }
    }

    async fn handle(&self, event: ChainEvent) {
        let kind = self.kind;
        if !self.gate.is_enabled(kind) {
            info!(event = %kind, height = event.height, "[oc-05] Votes disabled, dropping event");
            self.metrics.event_dropped(kind);
            return;
        }

        let parsed = match VoteEvent::parse(kind, &event) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(event = %kind, height = event.height, "[oc-05] {}", e);
                self.metrics.event_dropped(kind);
                return;
            }
        };

        let started = Instant::now();
        let outcome = self.process(&parsed).await;
        self.metrics
            .handler_duration(kind, started.elapsed().as_secs_f64());
        self.metrics
            .trusted_height(self.ctx.query().trusted_block().await.height);

        match outcome {
            Ok(result) => {
                debug!(event = %kind, tx_hash = %result.tx_hash, "[oc-05] Event handled");
            }
            Err(ReactorError::Broadcast(e)) => {
                error!(event = %kind, "[oc-05] Vote not delivered: {}", e);
                self.metrics.broadcast_failed(e.reason());
            }
            Err(e) => {
                error!(event = %kind, reason = e.reason(), "[oc-05] Event dropped: {}", e);
                self.metrics.event_dropped(kind);
            }
        }
    }

    async fn process(&self, event: &VoteEvent) -> Result<BroadcastResult, ReactorError> {
        let kind = self.kind;
        let decision = timeout(self.handler_timeout, event.decide(self.ctx.as_ref()))
            .await
            .map_err(|_| ReactorError::Timeout {
                event: kind,
                after_ms: self.handler_timeout.as_millis() as u64,
            })??;

        if let Some(rejection) = &decision.rejection {
            warn!(event = %kind, stage = rejection.stage, "[oc-05] Voting No: {}", rejection.reason);
            self.metrics
                .verification_failed(rejection.stage, &rejection.reason);
        }

        // The gate may have flipped while deciding.
        if !self.gate.is_enabled(kind) {
            return Err(ReactorError::Disabled { event: kind });
        }

        let option = decision.option();
        let result = self.ctx.sign().broadcast_vote(decision.vote).await?;
        info!(event = %kind, option = option.as_str(), "[oc-05] Vote cast");
        self.metrics.vote_cast(kind, option);
        Ok(result)
    }
}

/// Refreshes the upgrade gate whenever an upgrade vote ends.
struct GateHandler<C: OracleCapabilities + 'static> {
    ctx: Arc<C>,
    gate: Arc<UpgradeGate>,
}

impl<C: OracleCapabilities + 'static> GateHandler<C> {
    async fn run(self, mut subscription: Subscription, mut shutdown: watch::Receiver<bool>) {
        let identity = self.ctx.attest().self_identity();
        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                next = subscription.recv() => match next {
                    Some(event) => {
                        info!(height = event.height, "[oc-05] Upgrade vote ended, refreshing gate");
                        if let Err(e) = self.gate.refresh(self.ctx.query(), &identity).await {
                            error!("[oc-05] Gate refresh failed, flags unchanged: {}", e);
                        }
                    }
                    None => break,
                },
            }
        }
    }
}
