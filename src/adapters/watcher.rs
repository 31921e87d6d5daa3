use crate::core::{ChangeSource, WatchEvent};
use crate::utils::error::Result;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

pub const DATA_EXTENSIONS: &[&str] = &["csv", "yml", "yaml"];
pub const TEMPLATE_EXTENSIONS: &[&str] = &["handlebars", "css"];

/// Decides which filesystem paths count as a change worth rebuilding for.
#[derive(Debug, Clone)]
pub struct WatchFilter {
    data_dir: PathBuf,
    template_dir: PathBuf,
    generated: Vec<String>,
}

impl WatchFilter {
    pub fn new(data_dir: impl Into<PathBuf>, template_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            template_dir: template_dir.into(),
            generated: Vec::new(),
        }
    }

    /// Files the build itself writes into the data directory.
    pub fn ignoring(mut self, file_names: impl IntoIterator<Item = String>) -> Self {
        self.generated.extend(file_names);
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    pub fn classify(&self, path: &Path) -> Option<ChangeSource> {
        let name = path.file_name()?.to_str()?;
        if name.starts_with('.') {
            return None;
        }
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();

        if path.parent() == Some(self.data_dir.as_path()) {
            if self.generated.iter().any(|g| g == name) {
                return None;
            }
            if DATA_EXTENSIONS.contains(&extension.as_str()) {
                return Some(ChangeSource::Data);
            }
        }

        if path.starts_with(&self.template_dir) && TEMPLATE_EXTENSIONS.contains(&extension.as_str())
        {
            return Some(ChangeSource::Template);
        }

        None
    }

    pub fn changes(&self, event: &Event) -> Vec<WatchEvent> {
        match event.kind {
            EventKind::Create(_) | EventKind::Remove(_) => {}
            EventKind::Modify(ModifyKind::Metadata(_)) => return Vec::new(),
            EventKind::Modify(_) => {}
            _ => return Vec::new(),
        }

        event
            .paths
            .iter()
            .filter_map(|path| {
                self.classify(path).map(|source| WatchEvent::Changed {
                    source,
                    path: path.clone(),
                })
            })
            .collect()
    }
}

/// Keeps the notify watcher alive; dropping it closes the event stream.
pub struct FsWatcher {
    _watcher: RecommendedWatcher,
}

impl FsWatcher {
    /// Watch both trees and send [`WatchEvent::Ready`] once registered.
    pub fn start(filter: WatchFilter, tx: mpsc::Sender<WatchEvent>) -> Result<Self> {
        let filter = WatchFilter {
            data_dir: canonical(&filter.data_dir),
            template_dir: canonical(&filter.template_dir),
            generated: filter.generated,
        };
        let data_dir = filter.data_dir.clone();
        let template_dir = filter.template_dir.clone();

        let events = tx.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    for change in filter.changes(&event) {
                        // Callback runs on the notify thread, outside the runtime.
                        if events.blocking_send(change).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => tracing::warn!("File watch error: {}", e),
            }
        })?;

        watcher.watch(&data_dir, RecursiveMode::NonRecursive)?;
        watcher.watch(&template_dir, RecursiveMode::Recursive)?;
        tracing::debug!(
            "Watching {} and {}",
            data_dir.display(),
            template_dir.display()
        );

        if tx.try_send(WatchEvent::Ready).is_err() {
            tracing::warn!("Could not announce watcher readiness");
        }

        Ok(Self { _watcher: watcher })
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
