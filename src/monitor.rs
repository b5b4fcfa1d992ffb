//! Refresh engine for Heliotrope
//!
//! This module contains the periodic update engine that coordinates the
//! signer, API client, and session store: one refresh cycle authenticates
//! if the session is due, runs the three telemetry fetches, and publishes a
//! complete snapshot for consumers. Cycles are serialized by construction;
//! the engine owns all of its state and runs in a single task, so no two
//! cycles (and no two re-authentications) can ever overlap.

use crate::api::{PortalApi, ShineClient};
use crate::config::{Config, CredentialsConfig};
use crate::error::{HeliotropeError, Result};
use crate::logging::{LogContext, get_logger_with_context};
use crate::persistence::SessionCache;
use crate::session::{AuthSession, SessionStore};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, MissedTickBehavior, interval};

/// Main monitor state
#[derive(Debug, Clone)]
pub enum MonitorState {
    /// Monitor is initializing (startup refresh not finished yet)
    Initializing,
    /// Monitor is running normally
    Running,
    /// Monitor is shutting down
    ShuttingDown,
}

/// Commands accepted by the monitor from the hosting layer
#[derive(Debug, Clone)]
pub enum MonitorCommand {
    /// Run a refresh cycle now instead of waiting for the next tick
    RefreshNow,
    /// Replace the stored credentials. Takes effect at the next
    /// re-authentication; the live session is not touched.
    UpdateCredentials(CredentialsConfig),
}

/// One complete set of telemetry values, always drawn from a single
/// refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlantSnapshot {
    /// Instantaneous output power in kW
    pub current_power_kw: f64,

    /// Energy produced today in kWh
    pub total_energy_kwh: f64,

    /// Today's profit in the portal's configured currency
    pub profit: f64,

    /// Standard coal equivalent saved today, kg
    pub coal_kg: f64,

    /// CO2 emission avoided today, kg
    pub co2_kg: f64,

    /// SO2 emission avoided today, kg
    pub so2_kg: f64,
}

/// The observable cell consumers read. The snapshot is sticky: a failed
/// cycle updates `last_error` and leaves the previous snapshot in place.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonitorStatus {
    /// Latest successfully assembled snapshot, if any
    pub snapshot: Option<PlantSnapshot>,

    /// Failure text of the most recent cycle, cleared on success
    pub last_error: Option<String>,

    /// When the last successful cycle completed
    pub last_refresh: Option<DateTime<Utc>>,
}

/// Periodic refresh engine for one monitored plant
pub struct PlantMonitor {
    /// Configuration
    config: Config,

    /// Portal client
    api: Box<dyn PortalApi>,

    /// Credentials used for (re-)authentication; replaceable at runtime
    credentials: CredentialsConfig,

    /// Current portal session
    sessions: SessionStore,

    /// On-disk session cache
    cache: SessionCache,

    /// Logger with context
    logger: crate::logging::StructuredLogger,

    /// Current monitor state
    state: watch::Sender<MonitorState>,

    /// Published status cell consumers subscribe to
    status_tx: watch::Sender<MonitorStatus>,

    /// Command receiver for external control
    commands_rx: mpsc::UnboundedReceiver<MonitorCommand>,

    /// Command sender handed out to hosting components
    commands_tx: mpsc::UnboundedSender<MonitorCommand>,

    /// Shutdown signal
    shutdown_tx: mpsc::UnboundedSender<()>,

    /// Shutdown receiver
    shutdown_rx: mpsc::UnboundedReceiver<()>,
}

impl PlantMonitor {
    /// Create a new monitor from the default configuration locations
    pub async fn new(
        commands_rx: mpsc::UnboundedReceiver<MonitorCommand>,
        commands_tx: mpsc::UnboundedSender<MonitorCommand>,
    ) -> Result<Self> {
        Self::new_with_config_override(commands_rx, commands_tx, None).await
    }

    /// Create a new monitor, optionally from an explicit config path
    pub async fn new_with_config_override(
        commands_rx: mpsc::UnboundedReceiver<MonitorCommand>,
        commands_tx: mpsc::UnboundedSender<MonitorCommand>,
        config_path: Option<PathBuf>,
    ) -> Result<Self> {
        let config = Config::load_from(config_path.as_deref()).map_err(|e| {
            eprintln!("Failed to load configuration: {}", e);
            e
        })?;

        // Initialize logging
        crate::logging::init_logging(&config.logging)?;

        config.validate()?;

        let api: Box<dyn PortalApi> = Box::new(ShineClient::new(&config.portal)?);
        Ok(Self::with_api(config, api, commands_rx, commands_tx))
    }

    /// Create a monitor over an explicit portal client implementation
    pub fn with_api(
        config: Config,
        api: Box<dyn PortalApi>,
        commands_rx: mpsc::UnboundedReceiver<MonitorCommand>,
        commands_tx: mpsc::UnboundedSender<MonitorCommand>,
    ) -> Self {
        let logger = get_logger_with_context(
            LogContext::new("monitor").with_plant_id(config.plant.plant_id),
        );

        logger.info("Initializing plant telemetry monitor");

        let max_age = ChronoDuration::hours(config.polling.reauth_interval_hours as i64);
        let sessions = SessionStore::new(max_age);
        let cache = SessionCache::new(&config.persistence.session_file);
        let credentials = config.credentials.clone();

        let (state_tx, _) = watch::channel(MonitorState::Initializing);
        let (status_tx, _) = watch::channel(MonitorStatus::default());
        let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();

        Self {
            config,
            api,
            credentials,
            sessions,
            cache,
            logger,
            state: state_tx,
            status_tx,
            commands_rx,
            commands_tx,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Subscribe to the published status cell
    pub fn subscribe_status(&self) -> watch::Receiver<MonitorStatus> {
        self.status_tx.subscribe()
    }

    /// Read the current status without subscribing
    pub fn status(&self) -> MonitorStatus {
        self.status_tx.borrow().clone()
    }

    /// Subscribe to monitor lifecycle state
    pub fn subscribe_state(&self) -> watch::Receiver<MonitorState> {
        self.state.subscribe()
    }

    /// Sender for external control commands
    pub fn command_sender(&self) -> mpsc::UnboundedSender<MonitorCommand> {
        self.commands_tx.clone()
    }

    /// Sender used to request shutdown
    pub fn shutdown_sender(&self) -> mpsc::UnboundedSender<()> {
        self.shutdown_tx.clone()
    }

    /// Install a session obtained by the hosting layer (onboarding handoff)
    pub fn install_session(&mut self, session: AuthSession) {
        self.sessions.install(session);
    }

    /// Current session, for hosts that persist it themselves
    pub fn current_session(&self) -> Option<AuthSession> {
        self.sessions.current().cloned()
    }

    /// Run the monitor main loop
    pub async fn run(&mut self) -> Result<()> {
        self.logger.info("Starting plant monitor main loop");

        self.bootstrap().await?;

        // Startup refresh completes, successfully or not, before the
        // monitor is considered ready.
        self.refresh_now().await;
        self.state.send(MonitorState::Running).ok();

        let mut poll_interval =
            interval(Duration::from_secs(self.config.polling.update_interval_secs));
        // A tick that lands while a cycle is running is delayed, not burst
        poll_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the startup refresh covered it
        poll_interval.tick().await;

        loop {
            tokio::select! {
                _ = poll_interval.tick() => {
                    self.refresh_now().await;
                }
                Some(cmd) = self.commands_rx.recv() => {
                    self.handle_command(cmd).await;
                }
                _ = self.shutdown_rx.recv() => {
                    self.logger.info("Shutdown signal received");
                    break;
                }
            }
        }

        self.state.send(MonitorState::ShuttingDown).ok();
        Ok(())
    }

    /// Seed the session store and verify a plant is selected
    async fn bootstrap(&mut self) -> Result<()> {
        // Prefer the cached session, then the onboarding seed. The seed
        // carries no issue timestamp, so it is treated as issued now.
        match self.cache.load() {
            Ok(Some(session)) => {
                self.sessions.install(session);
            }
            Ok(None) => {
                let seed = &self.config.session;
                if !seed.token.is_empty() && !seed.secret.is_empty() {
                    self.sessions
                        .install(AuthSession::new(seed.token.clone(), seed.secret.clone()));
                }
            }
            Err(e) => {
                self.logger
                    .warn(&format!("Failed to load cached session: {}", e));
            }
        }

        if self.config.plant.plant_id == 0 {
            return self.report_available_plants().await;
        }
        Ok(())
    }

    /// No plant selected: list the account's plants and fail startup with
    /// an instructive error
    async fn report_available_plants(&mut self) -> Result<()> {
        self.logger
            .info("No plant selected, querying account plant list");
        self.sessions
            .reauthenticate(self.api.as_ref(), &self.credentials)
            .await?;
        let session = self
            .sessions
            .current()
            .ok_or_else(|| HeliotropeError::generic("No session after authentication"))?;
        let plants = self.api.list_plants(session).await?;
        if plants.is_empty() {
            self.logger.warn("Account has no plants");
        }
        for plant in &plants {
            self.logger.info(&format!(
                "Available plant: {} (id {})",
                plant.plant_name, plant.plant_id
            ));
        }
        Err(HeliotropeError::validation(
            "plant.plant_id",
            "No plant selected; set plant.plant_id to one of the listed plants",
        ))
    }

    /// Run one cycle now and publish the outcome. Consumers that prefer a
    /// refresh-then-read flow over subscribing call this directly.
    pub async fn refresh_now(&mut self) {
        match self.refresh_once().await {
            Ok(snapshot) => {
                self.status_tx.send_modify(|status| {
                    status.snapshot = Some(snapshot);
                    status.last_error = None;
                    status.last_refresh = Some(Utc::now());
                });
                self.logger.debug(&format!(
                    "Refresh cycle complete: {:.3} kW now, {:.3} kWh today",
                    snapshot.current_power_kw, snapshot.total_energy_kwh
                ));
            }
            Err(e) => {
                self.logger.error(&format!("Refresh cycle failed: {}", e));
                // Prior snapshot is retained untouched
                self.status_tx.send_modify(|status| {
                    status.last_error = Some(e.to_string());
                });
            }
        }
    }

    /// One full refresh cycle: conditional re-auth, three fetches, and at
    /// most one forced re-auth + retry when the portal rejects the session
    pub async fn refresh_once(&mut self) -> Result<PlantSnapshot> {
        if self.sessions.is_stale(Utc::now()) {
            self.logger
                .info("Session stale, re-authenticating before fetch");
            self.reauthenticate().await?;
        }

        // Bounded retry: at most two fetch rounds per cycle
        let mut reauthenticated = false;
        loop {
            match self.fetch_snapshot().await {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) if e.is_auth_expired() && !reauthenticated => {
                    reauthenticated = true;
                    self.logger.warn(&format!(
                        "Portal rejected session ({}), re-authenticating once",
                        e
                    ));
                    self.reauthenticate().await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Re-authenticate and cache the fresh session
    async fn reauthenticate(&mut self) -> Result<()> {
        let session = self
            .sessions
            .reauthenticate(self.api.as_ref(), &self.credentials)
            .await?
            .clone();
        if let Err(e) = self.cache.save(&session) {
            // Losing the cache only costs a re-auth after restart
            self.logger.warn(&format!("Failed to cache session: {}", e));
        }
        Ok(())
    }

    /// Run the three telemetry fetches against the current session.
    /// All three must succeed; the assembled snapshot never mixes cycles.
    async fn fetch_snapshot(&self) -> Result<PlantSnapshot> {
        let session = self
            .sessions
            .current()
            .ok_or_else(|| HeliotropeError::generic("No session available for data fetch"))?;
        let plant_id = self.config.plant.plant_id;

        let current_power_kw = self.api.query_current_power(session, plant_id).await?;
        let total_energy_kwh = self.api.query_daily_energy(session, plant_id).await?;
        let profit = self.api.query_daily_profit(session, plant_id).await?;

        Ok(PlantSnapshot {
            current_power_kw,
            total_energy_kwh,
            profit: profit.profit,
            coal_kg: profit.coal,
            co2_kg: profit.co2,
            so2_kg: profit.so2,
        })
    }

    /// Handle an external command
    async fn handle_command(&mut self, cmd: MonitorCommand) {
        match cmd {
            MonitorCommand::RefreshNow => {
                self.logger.info("Immediate refresh requested");
                self.refresh_now().await;
            }
            MonitorCommand::UpdateCredentials(credentials) => {
                self.logger
                    .info("Credentials updated, effective at next re-authentication");
                self.credentials = credentials;
            }
        }
    }
}
