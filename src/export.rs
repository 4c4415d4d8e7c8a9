//! Orders spreadsheet export: save the downloaded bytes, then tell the user.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use crate::error::{ExportError, FetchError};

pub const EXPORT_FILENAME: &str = "orders.xlsx";
pub const EXPORT_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const NOTICE_DURATION: Duration = Duration::from_millis(3000);

pub const EXPORT_OK: &str = "Export Successful";
pub const EXPORT_FAILED: &str = "Export Failed";

pub trait FileSaver {
    fn save(&self, bytes: &[u8], filename: &str, mime_type: &str) -> std::io::Result<PathBuf>;
}

/// Writes exports into a directory, replacing any previous file atomically.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, bytes: &[u8], filename: &str, mime_type: &str) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(filename);
        let temp = self.dir.join(format!(".{}.part", filename));
        if let Err(e) = fs::write(&temp, bytes).and_then(|_| fs::rename(&temp, &target)) {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
        tracing::debug!(path = %target.display(), mime_type, size = bytes.len(), "export written");
        Ok(target)
    }
}

/// A transient message shown to the user for `duration`, then dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub duration: Duration,
}

pub trait Notifier {
    fn notify(&self, message: &str, duration: Duration);
}

/// Forwards notices to a UI loop.
impl Notifier for mpsc::Sender<Notice> {
    fn notify(&self, message: &str, duration: Duration) {
        let _ = self.send(Notice {
            message: message.to_string(),
            duration,
        });
    }
}

/// Prints notices for one-shot commands, where nothing needs dismissing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn notify(&self, message: &str, _duration: Duration) {
        println!("{}", message);
    }
}

pub struct ExportCoordinator<S, N> {
    saver: S,
    notifier: N,
}

impl<S: FileSaver, N: Notifier> ExportCoordinator<S, N> {
    pub fn new(saver: S, notifier: N) -> Self {
        Self { saver, notifier }
    }

    /// Saves a downloaded export and emits the outcome notice.
    pub fn finish(&self, downloaded: Result<Vec<u8>, FetchError>) -> Result<(), ExportError> {
        let outcome = downloaded.map_err(ExportError::from).and_then(|bytes| {
            self.saver
                .save(&bytes, EXPORT_FILENAME, EXPORT_MIME)
                .map_err(ExportError::from)
        });

        match &outcome {
            Ok(path) => {
                tracing::info!(path = %path.display(), "orders exported");
                self.notifier.notify(EXPORT_OK, NOTICE_DURATION);
            }
            Err(e) => {
                tracing::warn!(error = %e, "orders export failed");
                self.notifier.notify(EXPORT_FAILED, NOTICE_DURATION);
            }
        }
        outcome.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Endpoint;
    use crate::controller::tests::{raw_order, FakeApi};
    use crate::controller::{Controller, Phase};
    use crate::datefmt::DatePattern;

    fn channel_coordinator(dir: &Path) -> (ExportCoordinator<DirectorySaver, mpsc::Sender<Notice>>, mpsc::Receiver<Notice>) {
        let (tx, rx) = mpsc::channel();
        (ExportCoordinator::new(DirectorySaver::new(dir), tx), rx)
    }

    #[test]
    fn directory_saver_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let saver = DirectorySaver::new(dir.path().join("exports"));
        saver.save(b"old", EXPORT_FILENAME, EXPORT_MIME).unwrap();
        let path = saver.save(b"new", EXPORT_FILENAME, EXPORT_MIME).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new");
        let leftovers: Vec<_> = fs::read_dir(saver.dir()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[tokio::test]
    async fn successful_export_saves_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let (coordinator, rx) = channel_coordinator(dir.path());
        let api = FakeApi {
            export: Some(vec![0x50, 0x4b, 0x03, 0x04]),
            ..Default::default()
        };
        let mut c = Controller::new(1, DatePattern::default());

        c.export_current(&api, &coordinator).await.unwrap();

        assert!(!c.view().is_exporting);
        assert_eq!(fs::read(dir.path().join(EXPORT_FILENAME)).unwrap(), vec![0x50, 0x4b, 0x03, 0x04]);
        assert_eq!(
            rx.try_recv().unwrap(),
            Notice {
                message: EXPORT_OK.to_string(),
                duration: Duration::from_millis(3000)
            }
        );
    }

    #[tokio::test]
    async fn failed_export_leaves_view_alone() {
        let dir = tempfile::tempdir().unwrap();
        let (coordinator, rx) = channel_coordinator(dir.path());
        let api = FakeApi {
            orders: vec![(1, raw_order(1, "Burger"))],
            ..Default::default()
        };
        let mut c = Controller::new(1, DatePattern::default());
        c.reload(&api).await;
        let rows = c.view().rows.clone();

        let err = c.export_current(&api, &coordinator).await.unwrap_err();

        assert!(matches!(err, ExportError::Fetch(ref e) if e.endpoint == Endpoint::OrdersExport));
        assert!(!c.view().is_exporting);
        assert_eq!(c.view().rows, rows);
        assert_eq!(c.phase(), Phase::Loaded);
        assert_eq!(rx.try_recv().unwrap().message, EXPORT_FAILED);
        assert!(!dir.path().join(EXPORT_FILENAME).exists());
    }

    #[test]
    fn save_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // a regular file where the export directory should be
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, b"").unwrap();
        let (coordinator, rx) = channel_coordinator(&blocker);

        let err = coordinator.finish(Ok(vec![1, 2, 3])).unwrap_err();
        assert!(matches!(err, ExportError::Save(_)));
        assert_eq!(rx.try_recv().unwrap().message, EXPORT_FAILED);
    }
}
