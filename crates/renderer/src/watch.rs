use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::debug;

/// How often the fragment source is re-read when the caller does not override
/// the interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Polls a shader source file for edits.
///
/// The watcher alternates between two states: idle until the poll interval
/// elapses, then a single read attempt. A read failure or an empty read is
/// treated as "nothing changed this tick" — editors routinely produce
/// momentarily-truncated files mid-save, and an empty file is never an
/// intentional clear of the shader.
///
/// On a genuine change the last-known-good text is updated *before* the
/// caller attempts to compile it. A known-bad edit is therefore reported
/// exactly once; the author has to save again to trigger another attempt.
pub struct SourceWatcher {
    path: PathBuf,
    interval: Duration,
    last_good: String,
    last_poll: Option<Instant>,
}

impl SourceWatcher {
    /// Creates a watcher seeded with the text of the initial successful read.
    pub fn new(path: impl Into<PathBuf>, interval: Duration, initial: String) -> Self {
        Self {
            path: path.into(),
            interval,
            last_good: initial,
            last_poll: None,
        }
    }

    /// Attempts one poll tick, returning changed source text if any.
    ///
    /// Returns `None` while the interval has not elapsed, on a read failure,
    /// on an empty read, and when the content is byte-identical to the
    /// last-known-good text.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        if let Some(last) = self.last_poll {
            if now.duration_since(last) < self.interval {
                return None;
            }
        }
        self.last_poll = Some(now);

        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "poll read failed; no change");
                return None;
            }
        };

        if text.is_empty() || text == self.last_good {
            return None;
        }

        self.last_good = text.clone();
        Some(text)
    }

    /// Text of the most recent non-empty read that differed, or the seed.
    pub fn last_known_good(&self) -> &str {
        &self.last_good
    }
}

/// Owns the watcher thread; dropping the handle shuts the thread down and
/// joins it.
pub(crate) struct WatcherHandle {
    shutdown: Sender<()>,
    join_handle: Option<JoinHandle<()>>,
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Spawns a thread that drives `watcher.poll` on its interval and publishes
/// changed source text on the returned channel.
///
/// Polling runs off the render thread so a slow disk never stalls frame
/// presentation; the render loop drains the channel between frames.
pub(crate) fn spawn(mut watcher: SourceWatcher) -> Result<(WatcherHandle, Receiver<String>)> {
    let (source_tx, source_rx) = unbounded();
    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

    let join_handle = thread::Builder::new()
        .name("fragview-watcher".into())
        .spawn(move || loop {
            match shutdown_rx.recv_timeout(watcher.interval) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
            if let Some(source) = watcher.poll(Instant::now()) {
                if source_tx.send(source).is_err() {
                    break;
                }
            }
        })
        .map_err(|err| anyhow!("failed to spawn watcher thread: {err}"))?;

    Ok((
        WatcherHandle {
            shutdown: shutdown_tx,
            join_handle: Some(join_handle),
        },
        source_rx,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn watched_file(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fragment.glsl");
        fs::write(&path, contents).expect("seed shader");
        (dir, path)
    }

    #[test]
    fn identical_content_reports_no_change() {
        let (_dir, path) = watched_file("A");
        let mut watcher = SourceWatcher::new(&path, Duration::ZERO, "A".into());
        assert_eq!(watcher.poll(Instant::now()), None);
    }

    #[test]
    fn changed_content_is_reported_once() {
        let (_dir, path) = watched_file("B");
        let mut watcher = SourceWatcher::new(&path, Duration::ZERO, "A".into());
        assert_eq!(watcher.poll(Instant::now()), Some("B".into()));
        assert_eq!(watcher.last_known_good(), "B");
        // The same content does not re-report, even if the first compile
        // attempt failed — that is the caller's concern, not ours.
        assert_eq!(watcher.poll(Instant::now()), None);
    }

    #[test]
    fn empty_read_is_ignored_and_state_unchanged() {
        let (_dir, path) = watched_file("");
        let mut watcher = SourceWatcher::new(&path, Duration::ZERO, "A".into());
        assert_eq!(watcher.poll(Instant::now()), None);
        assert_eq!(watcher.last_known_good(), "A");
    }

    #[test]
    fn read_failure_is_ignored_and_state_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.glsl");
        let mut watcher = SourceWatcher::new(&missing, Duration::ZERO, "A".into());
        assert_eq!(watcher.poll(Instant::now()), None);
        assert_eq!(watcher.last_known_good(), "A");
    }

    #[test]
    fn polls_are_gated_by_the_interval() {
        let (_dir, path) = watched_file("B");
        let interval = Duration::from_millis(500);
        let mut watcher = SourceWatcher::new(&path, interval, "A".into());

        let start = Instant::now();
        assert_eq!(watcher.poll(start), Some("B".into()));

        fs::write(&path, "C").expect("rewrite shader");
        // Second tick lands inside the interval: no read happens at all.
        assert_eq!(watcher.poll(start + Duration::from_millis(100)), None);
        assert_eq!(watcher.last_known_good(), "B");

        // Once the interval elapses the new content comes through.
        assert_eq!(watcher.poll(start + interval), Some("C".into()));
    }

    #[test]
    fn watcher_thread_publishes_changes_and_joins_on_drop() {
        let (_dir, path) = watched_file("A");
        let watcher = SourceWatcher::new(&path, Duration::from_millis(10), "A".into());
        let (handle, rx) = spawn(watcher).expect("spawn watcher");

        fs::write(&path, "B").expect("rewrite shader");
        let received = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("change should be published");
        assert_eq!(received, "B");

        drop(handle);
        assert!(rx.recv().is_err(), "channel closes once the thread exits");
    }
}
