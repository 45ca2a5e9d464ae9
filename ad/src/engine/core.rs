//! AlarmEngine - owns the lanes and their worker tasks

use std::sync::Arc;

use eyre::{Context, Result, eyre};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::config::EngineConfig;
use super::dispatcher::Dispatcher;
use super::error::{CancelError, SubmitError};
use super::intake::{Accepted, Cancelled, Intake};
use super::reporter::Reporter;
use crate::events::{AlarmEvent, EventBus};
use crate::lane::{Lane, LaneSnapshot};

/// The running alarm scheduler.
///
/// Spawns one dispatcher and one reporter per lane on the current tokio
/// runtime. Requests come in through [`Intake`]; activity goes out on the
/// event bus.
pub struct AlarmEngine {
    config: EngineConfig,
    intake: Intake,
    bus: Arc<EventBus>,
    shutdown: CancellationToken,
    workers: Vec<(String, JoinHandle<()>)>,
}

impl AlarmEngine {
    /// Validate the config and start all lane workers
    pub fn start(config: EngineConfig) -> Result<Self> {
        debug!(?config, "AlarmEngine::start: called");
        config.validate().context("Invalid engine configuration")?;
        let bus = Arc::new(EventBus::new(config.event_capacity));
        Ok(Self::spawn(config, bus))
    }

    fn spawn(config: EngineConfig, bus: Arc<EventBus>) -> Self {
        let shutdown = CancellationToken::new();
        let lanes: Arc<[Arc<Lane>]> = (0..config.lanes).map(|i| Arc::new(Lane::new(i))).collect();

        let mut workers = Vec::with_capacity(lanes.len() * 2);
        for lane in lanes.iter() {
            let (handoff, dispatched) = mpsc::unbounded_channel();

            let dispatcher = Dispatcher::new(lane.clone(), handoff, shutdown.child_token());
            workers.push((format!("dispatcher-{}", lane.index()), tokio::spawn(dispatcher.run())));

            let reporter = Reporter::new(
                lane.clone(),
                bus.emitter_for(lane.index()),
                dispatched,
                config.report_interval(),
                config.reporter_poll(),
                shutdown.child_token(),
            );
            workers.push((format!("reporter-{}", lane.index()), tokio::spawn(reporter.run())));
        }

        let intake = Intake::new(lanes, &bus, &config, shutdown.clone());
        info!(lanes = config.lanes, "Alarm engine started");
        Self {
            config,
            intake,
            bus,
            shutdown,
            workers,
        }
    }

    /// Cloneable handle for submit/cancel
    pub fn intake(&self) -> Intake {
        self.intake.clone()
    }

    /// Subscribe to events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<AlarmEvent> {
        self.bus.subscribe()
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        self.bus.clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn submit(&self, id: Option<u64>, delay_secs: i64, message: &str) -> Result<Accepted, SubmitError> {
        self.intake.submit(id, delay_secs, message).await
    }

    pub async fn cancel(&self, id: u64) -> Result<Cancelled, CancelError> {
        self.intake.cancel(id).await
    }

    pub async fn snapshot(&self) -> Vec<LaneSnapshot> {
        self.intake.snapshot().await
    }

    /// Stop accepting requests, stop every worker and discard pending alarms.
    ///
    /// Fails if a worker panicked or did not stop within the shutdown timeout.
    pub async fn shutdown(self) -> Result<()> {
        debug!("AlarmEngine::shutdown: called");
        self.shutdown.cancel();

        let timeout = self.config.shutdown_timeout();
        let mut failures = Vec::new();
        for (name, handle) in self.workers {
            match tokio::time::timeout(timeout, handle).await {
                Ok(Ok(())) => debug!(%name, "AlarmEngine::shutdown: worker stopped"),
                Ok(Err(e)) => {
                    error!(%name, error = %e, "Lane worker failed");
                    failures.push(format!("{}: {}", name, e));
                }
                Err(_) => {
                    error!(%name, ?timeout, "Lane worker did not stop in time");
                    failures.push(format!("{}: timed out after {:?}", name, timeout));
                }
            }
        }

        if failures.is_empty() {
            info!("Alarm engine stopped");
            Ok(())
        } else {
            Err(eyre!("Alarm engine shutdown failed: {}", failures.join("; ")))
        }
    }
}
