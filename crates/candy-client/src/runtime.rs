// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Embeddable game runtime.
//!
//! [`GameRuntime`] owns a [`Simulation`] and drives it from background tasks:
//!
//! | Task          | Default interval | Work                                   |
//! |---------------|------------------|----------------------------------------|
//! | Active tick   | 16 ms            | `tick(Cadence::Active)`                |
//! | Inactive tick | 1 s              | `tick(Cadence::Inactive)`              |
//! | Autosave      | 1 s              | write the local copy                   |
//! | Sync          | 30 s             | push to the server, adopt a newer copy |
//!
//! Every change publishes a snapshot on a `watch` channel.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use candy_client::{ClientConfig, FileStorage, GameApiClient, GameRuntime, GameStore};
//! use candy_core::PlanetSystem;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::from_env()?;
//!     let storage = Arc::new(FileStorage::new(&config.data_dir));
//!     let store = GameStore::new(Some(GameApiClient::new(&config)?), storage);
//!
//!     let runtime = GameRuntime::<PlanetSystem>::builder()
//!         .store(store)
//!         .build()?
//!         .start()
//!         .await?;
//!
//!     runtime.with_simulation(|game| game.click(candy_core::now_ms())).await?;
//!
//!     runtime.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use candy_core::migration::is_multi_planet;
use candy_core::{Cadence, Simulation, now_ms};
use serde_json::Value;
use tokio::sync::{Mutex, Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::{ClientError, StoreError};
use crate::store::{GameStore, SyncOutcome};

/// Task intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeOptions {
    /// Interval of the current-planet tick (default: 16ms)
    pub active_tick: Duration,
    /// Interval of the background-planet tick (default: 1s)
    pub inactive_tick: Duration,
    /// Interval of local saves (default: 1s)
    pub autosave_interval: Duration,
    /// Interval of server syncs (default: 30s)
    pub sync_interval: Duration,
    /// Syncs are skipped after this long without interaction (default: 60s)
    pub idle_threshold: Duration,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            active_tick: Duration::from_millis(16),
            inactive_tick: Duration::from_secs(1),
            autosave_interval: Duration::from_secs(1),
            sync_interval: Duration::from_secs(30),
            idle_threshold: Duration::from_secs(60),
        }
    }
}

/// Builder for [`GameRuntime`].
pub struct GameRuntimeBuilder<S> {
    store: Option<GameStore>,
    options: RuntimeOptions,
    _simulation: std::marker::PhantomData<fn() -> S>,
}

impl<S: Simulation> Default for GameRuntimeBuilder<S> {
    fn default() -> Self {
        Self {
            store: None,
            options: RuntimeOptions::default(),
            _simulation: std::marker::PhantomData,
        }
    }
}

impl<S: Simulation> GameRuntimeBuilder<S> {
    /// Create a builder with default intervals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the store (required).
    pub fn store(mut self, store: GameStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace all intervals.
    pub fn options(mut self, options: RuntimeOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the current-planet tick interval.
    pub fn active_tick(mut self, interval: Duration) -> Self {
        self.options.active_tick = interval;
        self
    }

    /// Set the background-planet tick interval.
    pub fn inactive_tick(mut self, interval: Duration) -> Self {
        self.options.inactive_tick = interval;
        self
    }

    /// Set the local save interval.
    pub fn autosave_interval(mut self, interval: Duration) -> Self {
        self.options.autosave_interval = interval;
        self
    }

    /// Set the server sync interval.
    pub fn sync_interval(mut self, interval: Duration) -> Self {
        self.options.sync_interval = interval;
        self
    }

    /// Set how long without interaction before syncs pause.
    pub fn idle_threshold(mut self, threshold: Duration) -> Self {
        self.options.idle_threshold = threshold;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<GameRuntimeConfig<S>> {
        let store = self
            .store
            .ok_or_else(|| anyhow::anyhow!("store is required"))?;

        let o = &self.options;
        for (name, value) in [
            ("active_tick", o.active_tick),
            ("inactive_tick", o.inactive_tick),
            ("autosave_interval", o.autosave_interval),
            ("sync_interval", o.sync_interval),
        ] {
            if value.is_zero() {
                anyhow::bail!("{name} must be greater than zero");
            }
        }

        Ok(GameRuntimeConfig {
            store,
            options: self.options,
            _simulation: std::marker::PhantomData,
        })
    }
}

/// Validated runtime configuration.
pub struct GameRuntimeConfig<S> {
    store: GameStore,
    options: RuntimeOptions,
    _simulation: std::marker::PhantomData<fn() -> S>,
}

impl<S: Simulation> GameRuntimeConfig<S> {
    /// Load the saved game and start the background tasks.
    ///
    /// A save that cannot be loaded from the server falls back to the local
    /// copy; one that cannot be parsed starts a fresh game.
    pub async fn start(self) -> Result<GameRuntime<S>> {
        let store = self.store;

        let doc = match store.load().await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "Falling back to local save");
                store.load_local().await.unwrap_or_else(|e| {
                    warn!(error = %e, "Local save unreadable, starting fresh");
                    None
                })
            }
        };

        let now = now_ms();
        let simulation = match doc {
            Some(doc) => restore::<S>(&store, doc, now).await,
            None => {
                info!(simulation = S::NAME, "Starting new game");
                S::fresh(now)
            }
        };

        let (snapshots, _) = watch::channel(simulation.snapshot());
        let shared = Arc::new(Shared {
            game: Mutex::new(simulation),
            snapshots,
            last_interaction: std::sync::Mutex::new(Instant::now()),
            store,
            idle_threshold: self.options.idle_threshold,
        });

        let active = spawn_loop(
            shared.clone(),
            "Active tick",
            self.options.active_tick,
            |shared| async move { shared.tick(Cadence::Active).await },
        );
        let inactive = spawn_loop(
            shared.clone(),
            "Inactive tick",
            self.options.inactive_tick,
            |shared| async move { shared.tick(Cadence::Inactive).await },
        );
        let autosave = spawn_loop(
            shared.clone(),
            "Autosave",
            self.options.autosave_interval,
            |shared| async move {
                if let Err(e) = shared.save_local().await {
                    error!(error = %e, "Autosave failed");
                }
            },
        );
        let sync = spawn_loop(
            shared.clone(),
            "Sync",
            self.options.sync_interval,
            |shared| async move {
                if shared.is_idle() {
                    debug!("No recent interaction, skipping sync");
                    return;
                }
                if let Err(e) = shared.sync().await {
                    warn!(error = %e, "Periodic sync failed");
                }
            },
        );

        info!(
            simulation = S::NAME,
            active_tick_ms = self.options.active_tick.as_millis() as u64,
            sync_interval_secs = self.options.sync_interval.as_secs(),
            "GameRuntime started"
        );

        Ok(GameRuntime {
            shared,
            tasks: vec![active, inactive, autosave, sync],
        })
    }
}

async fn restore<S: Simulation>(store: &GameStore, doc: Value, now: i64) -> S {
    let was_multi_planet = is_multi_planet(&doc);
    let simulation = match S::from_document(doc, now) {
        Ok(simulation) => simulation,
        Err(e) => {
            warn!(error = %e, simulation = S::NAME, "Saved game is invalid, starting fresh");
            return S::fresh(now);
        }
    };

    let upgraded = !was_multi_planet
        && simulation
            .to_document()
            .map(|doc| is_multi_planet(&doc))
            .unwrap_or(false);
    if upgraded {
        info!("Upgraded single-planet save");
        if let Err(e) = store.mark_migrated().await {
            warn!(error = %e, "Failed to record migration");
        }
    }
    simulation
}

struct Worker {
    name: &'static str,
    shutdown: Arc<Notify>,
    handle: JoinHandle<()>,
}

fn spawn_loop<S, F, Fut>(
    shared: Arc<Shared<S>>,
    name: &'static str,
    interval: Duration,
    work: F,
) -> Worker
where
    S: Simulation,
    F: Fn(Arc<Shared<S>>) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let shutdown = Arc::new(Notify::new());
    let signal = shutdown.clone();
    let handle = tokio::spawn(async move {
        debug!(task = name, interval_ms = interval.as_millis() as u64, "Task started");
        loop {
            tokio::select! {
                biased;

                _ = signal.notified() => break,

                _ = tokio::time::sleep(interval) => work(shared.clone()).await,
            }
        }
        debug!(task = name, "Task stopped");
    });
    Worker {
        name,
        shutdown,
        handle,
    }
}

struct Shared<S: Simulation> {
    game: Mutex<S>,
    snapshots: watch::Sender<S::Snapshot>,
    last_interaction: std::sync::Mutex<Instant>,
    store: GameStore,
    idle_threshold: Duration,
}

impl<S: Simulation> Shared<S> {
    async fn tick(&self, cadence: Cadence) {
        let mut game = self.game.lock().await;
        game.tick(cadence, now_ms());
        self.snapshots.send_replace(game.snapshot());
    }

    fn touch(&self) {
        if let Ok(mut last) = self.last_interaction.lock() {
            *last = Instant::now();
        }
    }

    fn is_idle(&self) -> bool {
        self.last_interaction
            .lock()
            .map(|last| last.elapsed() > self.idle_threshold)
            .unwrap_or(false)
    }

    async fn document(&self) -> Result<Value, StoreError> {
        let mut game = self.game.lock().await;
        game.mark_saved(now_ms());
        game.to_document()
            .map_err(|e| StoreError::Save(ClientError::Serialization(e)))
    }

    async fn save_local(&self) -> Result<(), StoreError> {
        let doc = self.document().await?;
        self.store.save_local(&doc).await
    }

    async fn sync(&self) -> Result<SyncOutcome, StoreError> {
        let doc = self.document().await?;
        let outcome = self.store.sync(&doc).await?;

        if let SyncOutcome::Synced(result) = &outcome
            && result.conflict_resolved
        {
            let replacement = S::from_document(result.game_data.clone(), now_ms())
                .map_err(|e| StoreError::Sync(ClientError::Document(e)))?;
            let mut game = self.game.lock().await;
            *game = replacement;
            self.snapshots.send_replace(game.snapshot());
            info!(
                total_candy_earned = game.total_candy_earned(),
                "Adopted server copy"
            );
        }
        Ok(outcome)
    }
}

/// A running game.
pub struct GameRuntime<S: Simulation> {
    shared: Arc<Shared<S>>,
    tasks: Vec<Worker>,
}

impl<S: Simulation> GameRuntime<S> {
    /// Create a builder.
    pub fn builder() -> GameRuntimeBuilder<S> {
        GameRuntimeBuilder::new()
    }

    /// Run a player action against the simulation.
    ///
    /// Counts as user interaction for the idle check and publishes a snapshot
    /// afterwards.
    pub async fn with_simulation<R>(&self, action: impl FnOnce(&mut S) -> R) -> R {
        self.shared.touch();
        let mut game = self.shared.game.lock().await;
        let result = action(&mut game);
        self.shared.snapshots.send_replace(game.snapshot());
        result
    }

    /// Sync with the server now, regardless of idleness.
    pub async fn sync_now(&self) -> Result<SyncOutcome, StoreError> {
        self.shared.sync().await
    }

    /// Write the local copy now.
    pub async fn save_now(&self) -> Result<(), StoreError> {
        self.shared.save_local().await
    }

    /// Receive a snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<S::Snapshot> {
        self.shared.snapshots.subscribe()
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> S::Snapshot {
        self.shared.snapshots.borrow().clone()
    }

    /// Check if every background task is still running.
    pub fn is_running(&self) -> bool {
        self.tasks.iter().all(|task| !task.handle.is_finished())
    }

    /// Stop all tasks, then save locally and attempt a final sync.
    pub async fn shutdown(self) -> Result<()> {
        info!("GameRuntime shutting down...");

        for task in &self.tasks {
            task.shutdown.notify_one();
        }
        for task in self.tasks {
            if let Err(e) = task.handle.await {
                error!("{} task panicked: {}", task.name, e);
            }
        }

        self.shared.save_local().await?;
        if let Err(e) = self.shared.sync().await {
            warn!(error = %e, "Final sync failed, progress kept locally");
        }

        info!("GameRuntime stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use candy_core::PlanetSystem;

    #[test]
    fn test_default_options() {
        let options = RuntimeOptions::default();
        assert_eq!(options.active_tick, Duration::from_millis(16));
        assert_eq!(options.inactive_tick, Duration::from_secs(1));
        assert_eq!(options.autosave_interval, Duration::from_secs(1));
        assert_eq!(options.sync_interval, Duration::from_secs(30));
        assert_eq!(options.idle_threshold, Duration::from_secs(60));
    }

    #[test]
    fn test_build_requires_store() {
        let err = GameRuntime::<PlanetSystem>::builder().build().err().unwrap();
        assert!(err.to_string().contains("store is required"));
    }

    #[test]
    fn test_build_rejects_zero_interval() {
        let store = GameStore::guest(Arc::new(MemoryStorage::new()));
        let err = GameRuntime::<PlanetSystem>::builder()
            .store(store)
            .autosave_interval(Duration::ZERO)
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("autosave_interval"));
    }
}
