//! State loading and file watching.
//!
//! Watches the simulation's state file and hands every successfully parsed
//! snapshot to the render engine. A file that fails to parse (for example
//! one caught mid-write) is logged and skipped; the previous snapshot stays
//! on screen.

use bevy::prelude::*;
use notify::{Event as NotifyEvent, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Instant;
use world_snapshot::Snapshot;

use crate::plugin::{Viewer, ViewerSettings, ViewerSystems};

/// Plugin for loading simulation state from files.
pub struct StateLoaderPlugin;

impl Plugin for StateLoaderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationState>()
            .add_event::<StateUpdatedEvent>()
            .add_systems(
                Update,
                (check_file_updates, handle_reload_key)
                    .chain()
                    .in_set(ViewerSystems::Ingress),
            );
    }
}

/// Bookkeeping about the watched state file.
#[derive(Resource, Default)]
pub struct SimulationState {
    /// When a snapshot was last loaded successfully.
    pub last_update: Option<Instant>,
    /// Path to the state file being watched.
    pub file_path: Option<PathBuf>,
    /// Any error from the last load attempt.
    pub last_error: Option<String>,
    /// Number of snapshots loaded so far.
    pub loads: u64,
}

impl SimulationState {
    /// Check if we have loaded state.
    pub fn has_state(&self) -> bool {
        self.loads > 0
    }
}

/// Event emitted when a new snapshot was applied.
#[derive(Event)]
pub struct StateUpdatedEvent {
    /// Simulation time step of the new snapshot, if it carries one.
    pub time_step: Option<u64>,
}

/// File watching state stored in Local (doesn't need Send+Sync).
#[derive(Default)]
struct FileWatcherState {
    /// The watcher instance.
    watcher: Option<RecommendedWatcher>,
    /// Receiver for file change events.
    rx: Option<Receiver<Result<NotifyEvent, notify::Error>>>,
    /// Whether we've initialized.
    initialized: bool,
}

impl FileWatcherState {
    /// Start watching the state file's directory.
    /// Returns the initial snapshot if the file already exists.
    fn ensure_initialized(
        &mut self,
        state_path: &Path,
        state: &mut SimulationState,
    ) -> Option<Snapshot> {
        if self.initialized {
            return None;
        }
        self.initialized = true;
        state.file_path = Some(state_path.to_path_buf());

        let watch_dir = watch_dir_for(state_path);
        let (tx, rx) = channel();

        match RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            notify::Config::default(),
        ) {
            Ok(mut watcher) => {
                if watch_dir.exists() {
                    if let Err(e) = watcher.watch(&watch_dir, RecursiveMode::NonRecursive) {
                        tracing::warn!("Failed to watch directory {:?}: {}", watch_dir, e);
                    } else {
                        tracing::info!("Watching directory: {:?}", watch_dir);
                    }
                } else {
                    tracing::info!(
                        "Watch directory {:?} does not exist yet, press R to reload manually",
                        watch_dir
                    );
                }

                self.watcher = Some(watcher);
                self.rx = Some(rx);
            }
            Err(e) => {
                tracing::error!("Failed to create file watcher: {}", e);
            }
        }

        if state_path.exists() {
            load_state_file(state_path, state)
        } else {
            None
        }
    }
}

/// Directory to watch for a state file.
fn watch_dir_for(state_path: &Path) -> PathBuf {
    state_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Whether a watcher event means the state file was written.
fn is_state_change(event: &NotifyEvent, state_path: &Path) -> bool {
    let Some(state_file_name) = state_path.file_name() else {
        return false;
    };
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(state_file_name))
}

fn apply_snapshot(
    snapshot: Snapshot,
    viewer: &mut Viewer,
    events: &mut EventWriter<StateUpdatedEvent>,
) {
    let time_step = snapshot.time_step;
    viewer.apply_snapshot(snapshot);
    events.send(StateUpdatedEvent { time_step });
}

/// Check for file updates and reload state if necessary.
fn check_file_updates(
    mut watcher_state: Local<FileWatcherState>,
    settings: Res<ViewerSettings>,
    mut state: ResMut<SimulationState>,
    mut viewer: ResMut<Viewer>,
    mut events: EventWriter<StateUpdatedEvent>,
) {
    if let Some(snapshot) = watcher_state.ensure_initialized(&settings.state_path, &mut state) {
        apply_snapshot(snapshot, &mut viewer, &mut events);
    }

    let Some(ref rx) = watcher_state.rx else {
        return;
    };

    // Only the newest snapshot matters, so a burst of events loads once
    let mut changed = false;
    while let Ok(result) = rx.try_recv() {
        match result {
            Ok(event) => {
                if is_state_change(&event, &settings.state_path) {
                    tracing::debug!("Detected file change: {:?}", event.paths);
                    changed = true;
                }
            }
            Err(e) => {
                tracing::warn!("File watcher error: {}", e);
            }
        }
    }

    if changed {
        if let Some(snapshot) = load_state_file(&settings.state_path, &mut state) {
            apply_snapshot(snapshot, &mut viewer, &mut events);
        }
    }
}

/// Handle R key to force reload.
fn handle_reload_key(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<SimulationState>,
    mut viewer: ResMut<Viewer>,
    mut events: EventWriter<StateUpdatedEvent>,
) {
    if !keyboard.just_pressed(KeyCode::KeyR) {
        return;
    }
    let Some(path) = state.file_path.clone() else {
        return;
    };
    tracing::info!("Manual reload triggered");
    if let Some(snapshot) = load_state_file(&path, &mut state) {
        apply_snapshot(snapshot, &mut viewer, &mut events);
    }
}

/// Load a snapshot from a file, recording the outcome in `state`.
fn load_state_file(path: &Path, state: &mut SimulationState) -> Option<Snapshot> {
    match Snapshot::from_file(path) {
        Ok(snapshot) => {
            state.last_update = Some(Instant::now());
            state.last_error = None;
            state.loads += 1;
            tracing::info!(
                "Loaded state from {:?} ({} agents, time step {:?})",
                path,
                snapshot.agents.len(),
                snapshot.time_step
            );
            Some(snapshot)
        }
        Err(e) => {
            let error_msg = e.to_string();
            tracing::error!("{}", error_msg);
            state.last_error = Some(error_msg);
            None
        }
    }
}
