//! Control File Watcher
//!
//! Each write to the control file forwards its content to the control port.
//! The parent directory is watched so editors that replace the file by
//! rename are still seen.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

pub struct ControlFileWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
}

impl ControlFileWatcher {
    pub fn spawn(path: PathBuf, sender: mpsc::Sender<String>) -> notify::Result<Self> {
        let file_name = path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| notify::Error::generic("control file path has no file name"))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let target = path.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if is_write(&event.kind) => {
                if event.paths.iter().any(|p| p.file_name() == Some(file_name.as_os_str())) {
                    forward(&target, &sender);
                }
            }
            Ok(_) => {}
            Err(e) => log::warn!("Control file watch error: {}", e),
        })?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        log::info!("Watching control file: {}", path.display());

        Ok(Self {
            path,
            _watcher: watcher,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Content changes only; metadata and access events are skipped
fn is_write(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Modify(ModifyKind::Any)
    )
}

fn forward(path: &Path, sender: &mpsc::Sender<String>) {
    let payload = match std::fs::read_to_string(path) {
        Ok(content) => content.trim().to_string(),
        Err(e) => {
            log::warn!("Failed to read control file {}: {}", path.display(), e);
            return;
        }
    };

    if payload.is_empty() {
        return;
    }

    // runs on the notify thread, outside the async runtime
    if sender.blocking_send(payload).is_err() {
        log::debug!("Control channel closed, dropping control message");
    }
}
