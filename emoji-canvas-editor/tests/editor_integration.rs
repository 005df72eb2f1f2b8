//! Integration tests for the editor: document lifecycle across store
//! recreation (simulating an app restart), directory + controller wiring,
//! and committing group gestures through the transform pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use emoji_canvas_core::{GestureMode, Vec2, ViewTransform, Viewport};
use emoji_canvas_editor::{
    BackgroundFetcher, BlobStore, DocumentController, DocumentDirectory, FetchError, FsBlobStore, MemoryBlobStore,
    DEFAULT_EMOJI_SIZE, DEFAULT_PALETTE,
};

struct NoopFetcher;

#[async_trait]
impl BackgroundFetcher for NoopFetcher {
    async fn fetch(&self, _reference: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Status(404))
    }
}

fn open(key: &str, store: Arc<dyn BlobStore>) -> DocumentController {
    DocumentController::new(key, store, Arc::new(NoopFetcher))
}

/// Autosave is fire-and-forget; give the writer task a chance to drain.
async fn settle(store: &Arc<FsBlobStore>, key: &str, expected: &[u8]) {
    for _ in 0..1000 {
        if store.get(key).as_deref() == Some(expected) {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("autosave never settled for {key}");
}

// ===========================================================================
// Persistence across store recreation (simulates app restart)
// ===========================================================================

#[tokio::test]
async fn test_document_survives_store_recreation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let key = "restart-doc";

    let expected = {
        let store = Arc::new(FsBlobStore::with_data_dir(dir.path()).expect("store"));
        let mut controller = open(key, Arc::clone(&store) as Arc<dyn BlobStore>);
        let first = DEFAULT_PALETTE.chars().next().expect("palette glyph");
        controller.add_emoji(first.to_string(), Vec2::new(12.0, 34.0), DEFAULT_EMOJI_SIZE);
        controller.set_background(Some("https://example.com/room.jpg".to_string()));

        let expected = controller.document().to_json_bytes().expect("encode");
        settle(&store, key, &expected).await;
        expected
    };
    // Controller and store dropped — only disk files remain.

    let store = Arc::new(FsBlobStore::with_data_dir(dir.path()).expect("store2"));
    assert_eq!(store.get(key).as_deref(), Some(expected.as_slice()));

    let controller = open(key, store as Arc<dyn BlobStore>);
    assert_eq!(controller.document().item_count(), 1);
    assert_eq!(
        controller.document().background_reference(),
        Some("https://example.com/room.jpg")
    );
    // a reloaded document with a reference but no resolved bytes is loading
    assert!(controller.is_background_loading());
}

#[tokio::test]
async fn test_directory_and_documents_share_one_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(FsBlobStore::with_data_dir(dir.path()).expect("store"));

    let id = {
        let mut directory = DocumentDirectory::new(Arc::clone(&store) as Arc<dyn BlobStore>);
        let id = directory.create();
        directory.rename(id, "Hotel lobby");

        let mut controller = directory
            .open(id, Arc::new(NoopFetcher))
            .expect("listed document opens");
        controller.add_emoji("🛎", Vec2::ZERO, DEFAULT_EMOJI_SIZE);
        let expected = controller.document().to_json_bytes().expect("encode");
        settle(&store, &id.storage_key(), &expected).await;
        id
    };

    // Reopen everything from disk.
    let store = Arc::new(FsBlobStore::with_data_dir(dir.path()).expect("store2"));
    let directory = DocumentDirectory::new(Arc::clone(&store) as Arc<dyn BlobStore>);
    assert_eq!(directory.name(id), Some("Hotel lobby"));

    let controller = directory
        .open(id, Arc::new(NoopFetcher))
        .expect("document reopens");
    assert_eq!(controller.document().item_count(), 1);
}

// ===========================================================================
// Committing group gestures through the transform pipeline
// ===========================================================================

#[tokio::test]
async fn test_group_drag_commit_moves_each_selected_emoji() {
    let store = Arc::new(MemoryBlobStore::new());
    let mut controller = open("gesture-doc", store as Arc<dyn BlobStore>);

    let a = controller.add_emoji("🔑", Vec2::new(0.0, 0.0), 40.0);
    let b = controller.add_emoji("🎈", Vec2::new(100.0, 0.0), 40.0);
    let c = controller.add_emoji("🛏", Vec2::new(0.0, 100.0), 40.0);
    controller.select_emoji(a);
    controller.select_emoji(b);

    let mut transform = ViewTransform::new();
    let mode = GestureMode::for_selection(controller.has_selection());
    assert_eq!(mode, GestureMode::Selection);

    // Drag the selection by (30, -20) view pixels at zoom 1.
    transform.drag(transform.drag_offset_from_view(Vec2::new(30.0, -20.0)), mode);
    if let Some(offset) = transform.release_drag(mode) {
        for item in controller.selected_emojis() {
            controller.move_emoji(item.id(), offset);
        }
    }

    let doc = controller.document();
    assert_eq!((doc.item(a).unwrap().x(), doc.item(a).unwrap().y()), (30, -20));
    assert_eq!((doc.item(b).unwrap().x(), doc.item(b).unwrap().y()), (130, -20));
    // non-selected items stay fixed
    assert_eq!((doc.item(c).unwrap().x(), doc.item(c).unwrap().y()), (0, 100));
    // the live transform is back to identity after the commit
    assert_eq!(transform, ViewTransform::new());
}

#[tokio::test]
async fn test_group_pinch_commit_scales_each_selected_emoji() {
    let store = Arc::new(MemoryBlobStore::new());
    let mut controller = open("pinch-doc", store as Arc<dyn BlobStore>);

    let a = controller.add_emoji("🧺", Vec2::ZERO, 40.0);
    let b = controller.add_emoji("🧻", Vec2::ZERO, 50.0);
    controller.select_emoji(a);
    controller.select_emoji(b);

    let mut transform = ViewTransform::new();
    let mode = GestureMode::for_selection(controller.has_selection());

    transform.pinch(1.5, mode);
    // mid-gesture, only the displayed magnitude of selected items grows
    assert!((transform.magnitude_of(40.0, true) - 60.0).abs() < 1e-3);
    assert!((transform.magnitude_of(40.0, false) - 40.0).abs() < 1e-3);
    assert!((transform.zoom_scale() - 1.0).abs() < f32::EPSILON);

    if let Some(factor) = transform.release_pinch(mode) {
        for item in controller.selected_emojis() {
            controller.scale_emoji(item.id(), factor);
        }
    }

    let doc = controller.document();
    assert_eq!(doc.item(a).unwrap().size(), 60);
    assert_eq!(doc.item(b).unwrap().size(), 75);
}

#[tokio::test]
async fn test_drop_mapping_places_emoji_under_pointer() {
    let store = Arc::new(MemoryBlobStore::new());
    let mut controller = open("drop-doc", store as Arc<dyn BlobStore>);

    let viewport = Viewport::new(800.0, 600.0);
    let mut transform = ViewTransform::new();
    transform.pinch(2.0, GestureMode::Canvas);
    transform.release_pinch(GestureMode::Canvas);
    transform.drag(Vec2::new(15.0, -10.0), GestureMode::Canvas);
    transform.release_drag(GestureMode::Canvas);

    let drop_point = Vec2::new(500.0, 200.0);
    let model = transform.model_point_of(drop_point, viewport);
    let id = controller.add_emoji("🪑", model, DEFAULT_EMOJI_SIZE);

    // Rendering the stored item puts it back under the pointer, within the
    // truncation the integer model space introduces.
    let item = controller.document().item(id).expect("item");
    let rendered = transform.position_of(item.location(), viewport, false);
    assert!((rendered.x - drop_point.x).abs() <= transform.zoom_scale());
    assert!((rendered.y - drop_point.y).abs() <= transform.zoom_scale());
}
