use crossbeam_channel::Sender;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};

/// Watches a single script; notify delivers events to the channel from its
/// own thread.
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    watched: Option<PathBuf>,
}

impl FileWatcher {
    pub fn new(tx: Sender<notify::Result<Event>>) -> notify::Result<Self> {
        let watcher = notify::recommended_watcher(move |res| {
            // Receiver gone means the REPL has shut down
            let _ = tx.send(res);
        })?;

        Ok(Self {
            watcher,
            watched: None,
        })
    }

    /// Watch `path`, replacing whatever file was watched before
    pub fn watch<P: AsRef<Path>>(&mut self, path: P) -> notify::Result<()> {
        let path = path.as_ref();
        if let Some(previous) = self.watched.take() {
            if let Err(e) = self.watcher.unwatch(&previous) {
                tracing::debug!(path = %previous.display(), error = %e, "unwatch failed");
            }
        }

        self.watcher.watch(path, RecursiveMode::NonRecursive)?;
        self.watched = Some(path.to_path_buf());
        Ok(())
    }

    pub fn unwatch(&mut self) -> notify::Result<()> {
        match self.watched.take() {
            Some(path) => self.watcher.unwatch(&path),
            None => Ok(()),
        }
    }

    pub fn watched(&self) -> Option<&Path> {
        self.watched.as_deref()
    }
}
