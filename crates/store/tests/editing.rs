//! End-to-end editing test: session edits flow through the auto-save
//! scheduler into the store's document table.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use masthead_core::block::BlockData;
use masthead_core::document::Document;
use masthead_core::error::CoreResult;
use masthead_core::types::ArticleId;
use masthead_editor::{AutoSaveConfig, AutoSaver, EditorSession, SaveHandler, SaveStatus};
use masthead_store::MemoryStore;

/// Send scheduler/log output to the test harness when `RUST_LOG` is set.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Persists the session document into the store, the way a real host
/// wires the save callback to its persistence layer.
struct StoreSaveHandler {
    store: Arc<MemoryStore>,
    article_id: ArticleId,
}

#[async_trait]
impl SaveHandler for StoreSaveHandler {
    async fn save(&self, document: &Document) -> CoreResult<()> {
        self.store
            .save_document(self.article_id, document.clone())
            .await;
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn session_edits_end_up_persisted_after_the_quiet_period() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let article_id = uuid::Uuid::new_v4();

    let mut session = EditorSession::new(article_id, Document::new());
    let saver = AutoSaver::spawn(
        Arc::new(StoreSaveHandler {
            store: store.clone(),
            article_id,
        }),
        AutoSaveConfig::default(),
        Some(session.document().clone()),
    );

    session.push_block(BlockData::Heading {
        level: 1,
        text: "Dispatch".into(),
    });
    session.push_block(BlockData::Paragraph {
        text: "First paragraph.".into(),
    });
    saver.document_changed(session.document().clone());

    assert!(saver.has_unsaved_changes(session.document()));
    tokio::time::sleep(Duration::from_secs(35)).await;

    assert!(!saver.has_unsaved_changes(session.document()));
    assert_eq!(store.document(article_id).await, Some(session.document().clone()));
}

#[tokio::test(start_paused = true)]
async fn undo_after_a_save_marks_the_document_unsaved_again() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let article_id = uuid::Uuid::new_v4();

    let mut session = EditorSession::new(article_id, Document::new());
    let saver = AutoSaver::spawn(
        Arc::new(StoreSaveHandler {
            store: store.clone(),
            article_id,
        }),
        AutoSaveConfig::default(),
        None,
    );

    session.push_block(BlockData::Paragraph {
        text: "Keep me.".into(),
    });
    saver.save_now(session.document().clone()).await.unwrap();
    assert!(!saver.has_unsaved_changes(session.document()));
    assert_eq!(saver.status(), SaveStatus::Saved);

    // Undoing diverges from what was persisted.
    assert!(session.undo());
    assert!(saver.has_unsaved_changes(session.document()));

    // A manual save of the undone state reconciles them.
    saver.save_now(session.document().clone()).await.unwrap();
    assert_eq!(store.document(article_id).await, Some(Document::new()));
}
