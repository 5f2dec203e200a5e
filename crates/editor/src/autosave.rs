//! Auto-save scheduler: a two-timer policy over the session document.
//!
//! A save is proposed `debounce` after the last mutation, but only
//! fires once the idle window has also elapsed ("not typing"). Unchanged
//! content is never re-saved; failures keep the last-saved snapshot so
//! the next attempt retries the same content. The scheduler runs as a
//! background task driven by a command channel and is fully cancellable
//! on session teardown, so a stale save can never fire against a
//! torn-down context.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use masthead_core::document::Document;
use masthead_core::error::{CoreError, CoreResult};

/// Default quiet period after the last mutation before a save fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(30);

/// Default idle window: a mutation more recent than this means the
/// writer is still typing and saving is suppressed.
pub const DEFAULT_IDLE: Duration = Duration::from_secs(3);

/// How long the `Saved` status is displayed before reverting to `Idle`.
pub const DEFAULT_SAVED_DISPLAY: Duration = Duration::from_secs(2);

/// Scheduler timing configuration.
#[derive(Debug, Clone)]
pub struct AutoSaveConfig {
    pub debounce: Duration,
    pub idle: Duration,
    pub saved_display: Duration,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            idle: DEFAULT_IDLE,
            saved_display: DEFAULT_SAVED_DISPLAY,
        }
    }
}

impl AutoSaveConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default |
    /// |------------------------------|---------|
    /// | `AUTOSAVE_DEBOUNCE_SECS`     | `30`    |
    /// | `AUTOSAVE_IDLE_SECS`         | `3`     |
    /// | `AUTOSAVE_SAVED_DISPLAY_SECS`| `2`     |
    pub fn from_env() -> Self {
        let debounce: u64 = std::env::var("AUTOSAVE_DEBOUNCE_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("AUTOSAVE_DEBOUNCE_SECS must be a valid u64");

        let idle: u64 = std::env::var("AUTOSAVE_IDLE_SECS")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("AUTOSAVE_IDLE_SECS must be a valid u64");

        let saved_display: u64 = std::env::var("AUTOSAVE_SAVED_DISPLAY_SECS")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("AUTOSAVE_SAVED_DISPLAY_SECS must be a valid u64");

        Self {
            debounce: Duration::from_secs(debounce),
            idle: Duration::from_secs(idle),
            saved_display: Duration::from_secs(saved_display),
        }
    }
}

/// External persistence callback for the session document.
#[async_trait]
pub trait SaveHandler: Send + Sync {
    async fn save(&self, document: &Document) -> CoreResult<()>;
}

/// Save status surfaced to the host (typically as an indicator next to
/// the editor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved,
    Error(String),
}

enum Command {
    Changed(Document),
    SaveNow(Document, oneshot::Sender<CoreResult<()>>),
}

/// Handle to the background scheduler task.
///
/// Dropping the handle (or calling [`shutdown`](AutoSaver::shutdown))
/// cancels both timers and stops the task.
pub struct AutoSaver {
    tx: mpsc::UnboundedSender<Command>,
    status_rx: watch::Receiver<SaveStatus>,
    last_saved_rx: watch::Receiver<Option<Document>>,
    cancel: CancellationToken,
}

impl AutoSaver {
    /// Spawn the scheduler task.
    ///
    /// `baseline` is the document state already known to be durably
    /// persisted (the just-loaded article); `None` means nothing has
    /// been saved yet, so any content counts as unsaved.
    pub fn spawn(
        handler: Arc<dyn SaveHandler>,
        config: AutoSaveConfig,
        baseline: Option<Document>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(SaveStatus::Idle);
        let (saved_tx, last_saved_rx) = watch::channel(baseline);
        let cancel = CancellationToken::new();

        let task = SchedulerTask {
            rx,
            handler,
            config,
            status: status_tx,
            last_saved: saved_tx,
            cancel: cancel.clone(),
            pending: None,
            last_mutation: None,
            debounce_deadline: None,
            revert_deadline: None,
        };
        tokio::spawn(task.run());

        Self {
            tx,
            status_rx,
            last_saved_rx,
            cancel,
        }
    }

    /// Notify the scheduler that the document mutated. Resets the idle
    /// window and re-arms the debounce timer; never blocks, even while
    /// a save is in flight.
    pub fn document_changed(&self, document: Document) {
        // A change racing session teardown is dropped by design of the
        // teardown contract; nothing must fire after cancellation.
        let _ = self.tx.send(Command::Changed(document));
    }

    /// Save immediately, bypassing both timers. Unchanged content still
    /// short-circuits to `Ok` without touching the handler.
    pub async fn save_now(&self, document: Document) -> CoreResult<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::SaveNow(document, reply_tx))
            .map_err(|_| CoreError::Persistence("auto-save scheduler is shut down".into()))?;
        reply_rx
            .await
            .map_err(|_| CoreError::Persistence("auto-save scheduler dropped the request".into()))?
    }

    /// Current save status.
    pub fn status(&self) -> SaveStatus {
        self.status_rx.borrow().clone()
    }

    /// Watch channel for status changes (for a host status indicator).
    pub fn subscribe_status(&self) -> watch::Receiver<SaveStatus> {
        self.status_rx.clone()
    }

    /// The last document state known to be durably persisted.
    pub fn last_saved(&self) -> Option<Document> {
        self.last_saved_rx.borrow().clone()
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.status(), SaveStatus::Saving)
    }

    /// Before-close contract: `true` while a save is in flight or
    /// `current` differs from the last durably persisted state. The
    /// host decides whether to warn or block the close.
    pub fn has_unsaved_changes(&self, current: &Document) -> bool {
        self.is_saving() || self.last_saved_rx.borrow().as_ref() != Some(current)
    }

    /// Cancel both timers and stop the scheduler task.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ---------------------------------------------------------------------------
// Scheduler task
// ---------------------------------------------------------------------------

struct SchedulerTask {
    rx: mpsc::UnboundedReceiver<Command>,
    handler: Arc<dyn SaveHandler>,
    config: AutoSaveConfig,
    status: watch::Sender<SaveStatus>,
    last_saved: watch::Sender<Option<Document>>,
    cancel: CancellationToken,
    /// Latest document proposed for the next save.
    pending: Option<Document>,
    /// When the last mutation arrived (drives idle detection).
    last_mutation: Option<Instant>,
    /// When the debounced save should be attempted.
    debounce_deadline: Option<Instant>,
    /// When the `Saved` status reverts to `Idle`.
    revert_deadline: Option<Instant>,
}

impl SchedulerTask {
    async fn run(mut self) {
        loop {
            let next_deadline = match (self.debounce_deadline, self.revert_deadline) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };

            tokio::select! {
                // Cancellation must win over a due timer; a stale save
                // firing against a torn-down session is the one thing
                // this component may never do.
                biased;

                _ = self.cancel.cancelled() => {
                    tracing::debug!("Auto-save scheduler cancelled");
                    break;
                }
                cmd = self.rx.recv() => {
                    match cmd {
                        Some(Command::Changed(document)) => self.on_changed(document),
                        Some(Command::SaveNow(document, reply)) => {
                            let result = self.attempt_save(document).await;
                            let _ = reply.send(result);
                        }
                        None => break,
                    }
                }
                _ = tokio::time::sleep_until(next_deadline.unwrap_or_else(Instant::now)),
                    if next_deadline.is_some() =>
                {
                    self.on_deadline().await;
                }
            }
        }
    }

    fn on_changed(&mut self, document: Document) {
        let now = Instant::now();
        self.pending = Some(document);
        self.last_mutation = Some(now);
        self.debounce_deadline = Some(now + self.config.debounce);
    }

    async fn on_deadline(&mut self) {
        let now = Instant::now();

        if let Some(deadline) = self.revert_deadline {
            if deadline <= now {
                self.revert_deadline = None;
                if *self.status.borrow() == SaveStatus::Saved {
                    self.status.send_replace(SaveStatus::Idle);
                }
            }
        }

        if let Some(deadline) = self.debounce_deadline {
            if deadline <= now {
                // Idle detector: a mutation inside the idle window means
                // the writer is still typing; check again once it lapses.
                if let Some(last) = self.last_mutation {
                    if now.duration_since(last) < self.config.idle {
                        self.debounce_deadline = Some(last + self.config.idle);
                        return;
                    }
                }
                self.debounce_deadline = None;
                if let Some(document) = self.pending.clone() {
                    if let Err(error) = self.attempt_save(document).await {
                        tracing::warn!(%error, "Auto-save failed; will retry");
                    }
                }
            }
        }
    }

    /// Run one save attempt. Skips when the candidate equals the last
    /// saved state; on failure the last saved state is left untouched so
    /// the retry proposes the same content.
    async fn attempt_save(&mut self, document: Document) -> CoreResult<()> {
        if self.last_saved.borrow().as_ref() == Some(&document) {
            tracing::debug!("Auto-save skipped; document unchanged since last save");
            self.debounce_deadline = None;
            return Ok(());
        }

        self.status.send_replace(SaveStatus::Saving);
        match self.handler.save(&document).await {
            Ok(()) => {
                tracing::debug!(blocks = document.len(), "Document auto-saved");
                self.last_saved.send_replace(Some(document));
                self.status.send_replace(SaveStatus::Saved);
                self.revert_deadline = Some(Instant::now() + self.config.saved_display);
                Ok(())
            }
            Err(error) => {
                self.status.send_replace(SaveStatus::Error(error.to_string()));
                // Re-arm so the failed content is retried on the next tick.
                self.debounce_deadline = Some(Instant::now() + self.config.debounce);
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masthead_core::block::BlockData;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::{advance, sleep};

    struct MockHandler {
        calls: AtomicUsize,
        saved: Mutex<Vec<Document>>,
        fail: AtomicBool,
    }

    impl MockHandler {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                saved: Mutex::new(Vec::new()),
                fail: AtomicBool::new(false),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SaveHandler for MockHandler {
        async fn save(&self, document: &Document) -> CoreResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(CoreError::Persistence("disk full".into()));
            }
            self.saved.lock().unwrap().push(document.clone());
            Ok(())
        }
    }

    fn config() -> AutoSaveConfig {
        AutoSaveConfig {
            debounce: Duration::from_secs(30),
            idle: Duration::from_secs(3),
            saved_display: Duration::from_secs(2),
        }
    }

    fn doc(texts: &[&str]) -> Document {
        let mut d = Document::new();
        for t in texts {
            d.push_block(BlockData::Paragraph { text: (*t).into() });
        }
        d
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_save_fires_after_the_quiet_period() {
        let handler = MockHandler::new();
        let saver = AutoSaver::spawn(handler.clone(), config(), None);

        saver.document_changed(doc(&["a"]));
        sleep(Duration::from_secs(29)).await;
        assert_eq!(handler.calls(), 0);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(handler.calls(), 1);
        assert_eq!(saver.last_saved(), Some(doc(&["a"])));
        assert_eq!(saver.status(), SaveStatus::Saved);

        // Status indicator reverts to Idle after the display window.
        sleep(Duration::from_secs(3)).await;
        assert_eq!(saver.status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn each_mutation_re_arms_the_debounce() {
        let handler = MockHandler::new();
        let saver = AutoSaver::spawn(handler.clone(), config(), None);

        for i in 0..3 {
            saver.document_changed(doc(&vec!["x"; i + 1]));
            sleep(Duration::from_secs(20)).await;
        }
        // 60s elapsed but never 30s of quiet; nothing saved yet.
        assert_eq!(handler.calls(), 0);

        sleep(Duration::from_secs(11)).await;
        assert_eq!(handler.calls(), 1);
        assert_eq!(saver.last_saved(), Some(doc(&["x", "x", "x"])));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_window_defers_a_due_debounce() {
        let handler = MockHandler::new();
        // Debounce shorter than idle so the idle detector is the gate.
        let saver = AutoSaver::spawn(
            handler.clone(),
            AutoSaveConfig {
                debounce: Duration::from_secs(1),
                idle: Duration::from_secs(5),
                saved_display: Duration::from_secs(2),
            },
            None,
        );

        saver.document_changed(doc(&["a"]));
        sleep(Duration::from_secs(2)).await;
        // Debounce elapsed but the mutation is still inside the idle
        // window: suppressed.
        assert_eq!(handler.calls(), 0);

        sleep(Duration::from_secs(4)).await;
        assert_eq!(handler.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_content_is_never_re_saved() {
        let handler = MockHandler::new();
        let saver = AutoSaver::spawn(handler.clone(), config(), None);

        let d = doc(&["a"]);
        saver.save_now(d.clone()).await.unwrap();
        assert_eq!(handler.calls(), 1);

        // Propose the identical content again; the scheduler must not
        // issue a save no matter how much time passes.
        saver.document_changed(d.clone());
        sleep(Duration::from_secs(120)).await;
        assert_eq!(handler.calls(), 1);
        assert!(!saver.has_unsaved_changes(&d));
    }

    #[tokio::test(start_paused = true)]
    async fn manual_save_bypasses_both_timers() {
        let handler = MockHandler::new();
        let saver = AutoSaver::spawn(handler.clone(), config(), None);

        let result = saver.save_now(doc(&["a"])).await;
        assert!(result.is_ok());
        assert_eq!(handler.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_save_keeps_the_snapshot_and_retries() {
        let handler = MockHandler::new();
        handler.fail.store(true, Ordering::SeqCst);
        let saver = AutoSaver::spawn(handler.clone(), config(), None);

        let d = doc(&["a"]);
        let err = saver.save_now(d.clone()).await.unwrap_err();
        assert!(matches!(err, CoreError::Persistence(_)));
        assert_eq!(saver.last_saved(), None);
        assert!(matches!(saver.status(), SaveStatus::Error(_)));
        assert!(saver.has_unsaved_changes(&d));

        // Identical content is attempted again because it never
        // actually landed.
        handler.fail.store(false, Ordering::SeqCst);
        saver.save_now(d.clone()).await.unwrap();
        assert_eq!(handler.calls(), 2);
        assert_eq!(saver.last_saved(), Some(d));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_auto_save_is_retried_on_the_next_tick() {
        let handler = MockHandler::new();
        handler.fail.store(true, Ordering::SeqCst);
        let saver = AutoSaver::spawn(handler.clone(), config(), None);

        saver.document_changed(doc(&["a"]));
        sleep(Duration::from_secs(31)).await;
        assert_eq!(handler.calls(), 1);
        assert!(matches!(saver.status(), SaveStatus::Error(_)));

        handler.fail.store(false, Ordering::SeqCst);
        sleep(Duration::from_secs(31)).await;
        assert_eq!(handler.calls(), 2);
        assert_eq!(saver.last_saved(), Some(doc(&["a"])));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_a_pending_save() {
        let handler = MockHandler::new();
        let saver = AutoSaver::spawn(handler.clone(), config(), None);

        saver.document_changed(doc(&["a"]));
        sleep(Duration::from_secs(1)).await;
        saver.shutdown();

        advance(Duration::from_secs(120)).await;
        sleep(Duration::from_millis(1)).await;
        assert_eq!(handler.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn baseline_counts_as_already_saved() {
        let handler = MockHandler::new();
        let d = doc(&["loaded"]);
        let saver = AutoSaver::spawn(handler.clone(), config(), Some(d.clone()));

        assert!(!saver.has_unsaved_changes(&d));
        let mut edited = d.clone();
        edited.push_block(BlockData::Divider);
        assert!(saver.has_unsaved_changes(&edited));

        // Saving the baseline content again is a no-op.
        saver.save_now(d).await.unwrap();
        assert_eq!(handler.calls(), 0);
    }
}
