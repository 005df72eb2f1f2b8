//! The document controller: intents, snapshot publishing, autosave, and the
//! single cancel-on-replace background fetch.
//!
//! One controller owns one [`Document`]. Every intent mutates the document,
//! publishes a fresh immutable snapshot to subscribers, and enqueues the
//! snapshot for autosave — unconditionally, even when the mutation referenced
//! an unknown id and changed nothing. Autosave writes never block the caller
//! and land in mutation order.
//!
//! All intents take `&mut self` and are expected to run on one coordination
//! context. The only internally synchronized state is the resolved background
//! image, so a fetch completion can land without re-entering that context;
//! stale completions are discarded by generation.

use std::sync::{Arc, PoisonError, RwLock};

use emoji_canvas_core::{Document, Item, Vec2};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::fetch::BackgroundFetcher;
use crate::store::BlobStore;

/// A resolved background image: decoded pixels plus intrinsic size.
///
/// The intrinsic size drives zoom-to-fit in the transform pipeline.
#[derive(Debug, Clone)]
pub struct BackgroundImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data, 4 bytes per pixel.
    pub rgba: Vec<u8>,
}

impl BackgroundImage {
    /// Decode fetched bytes. Undecodable bytes yield `None` — observable
    /// only as "the image never arrives", like any other fetch failure.
    fn decode(bytes: &[u8]) -> Option<Self> {
        match image::load_from_memory(bytes) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                let (width, height) = rgba.dimensions();
                Some(Self {
                    width,
                    height,
                    rgba: rgba.into_raw(),
                })
            }
            Err(e) => {
                tracing::debug!("background bytes did not decode as an image: {e}");
                None
            }
        }
    }

    /// Intrinsic size as a vector, for zoom-to-fit.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Resolved-image slot shared with the in-flight fetch task.
struct BackgroundSlot {
    generation: u64,
    image: Option<Arc<BackgroundImage>>,
}

struct SharedBackground {
    slot: RwLock<BackgroundSlot>,
    publisher: watch::Sender<Option<Arc<BackgroundImage>>>,
}

/// Wraps one document: mutating intents in, published snapshots out.
pub struct DocumentController {
    key: String,
    document: Document,
    snapshots: watch::Sender<Document>,
    autosave: mpsc::UnboundedSender<Document>,
    background: Arc<SharedBackground>,
    fetcher: Arc<dyn BackgroundFetcher>,
    fetch_task: Option<JoinHandle<()>>,
}

impl DocumentController {
    /// Open (or create) the document stored under `key`.
    ///
    /// Unreadable or absent blobs silently yield a fresh empty document. If
    /// the loaded document carries a background reference, its fetch starts
    /// immediately. Must be called within a Tokio runtime; the controller
    /// spawns its autosave writer here.
    pub fn new(
        key: impl Into<String>,
        store: Arc<dyn BlobStore>,
        fetcher: Arc<dyn BackgroundFetcher>,
    ) -> Self {
        let key = key.into();
        let document = Document::decode_or_default(store.get(&key).as_deref());
        let (snapshots, _) = watch::channel(document.clone());
        let (autosave, autosave_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_autosave(key.clone(), store, autosave_rx));

        let background = Arc::new(SharedBackground {
            slot: RwLock::new(BackgroundSlot {
                generation: 0,
                image: None,
            }),
            publisher: watch::channel(None).0,
        });

        let mut controller = Self {
            key,
            document,
            snapshots,
            autosave,
            background,
            fetcher,
            fetch_task: None,
        };
        // The autosave sink observes the initial state too.
        controller.publish();
        controller.refresh_background();
        controller
    }

    /// Open a brand-new document under a generated storage key.
    pub fn with_generated_key(
        store: Arc<dyn BlobStore>,
        fetcher: Arc<dyn BackgroundFetcher>,
    ) -> Self {
        Self::new(format!("document-{}", Uuid::new_v4()), store, fetcher)
    }

    // -----------------------------------------------------------------------
    // Intents
    // -----------------------------------------------------------------------

    /// Place a new emoji at a model-space location.
    ///
    /// Returns the allocated item id. Coordinates and size truncate to whole
    /// model units.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_emoji(&mut self, text: impl Into<String>, at: Vec2, size: f32) -> i32 {
        let id = self
            .document
            .add_item(text, at.x as i32, at.y as i32, size as i32);
        self.publish();
        id
    }

    /// Translate an emoji by an offset, rounded to the nearest model unit.
    ///
    /// Applies regardless of selection state; callers iterate a selected set
    /// themselves when committing a group drag.
    #[allow(clippy::cast_possible_truncation)]
    pub fn move_emoji(&mut self, id: i32, by: Vec2) {
        self.document
            .move_item(id, by.x.round() as i32, by.y.round() as i32);
        self.publish();
    }

    /// Multiply an emoji's base size by a factor, rounding ties to even.
    pub fn scale_emoji(&mut self, id: i32, factor: f32) {
        self.document.rescale_item(id, factor);
        self.publish();
    }

    /// Toggle an emoji's selection flag.
    pub fn select_emoji(&mut self, id: i32) {
        self.document.toggle_select(id);
        self.publish();
    }

    /// Clear selection and removal flags on every item.
    pub fn deselect_all(&mut self) {
        self.document.deselect_all();
        self.publish();
    }

    /// Flag an emoji so the next tap deletes it.
    pub fn mark_ready_to_remove(&mut self, id: i32) {
        self.document.mark_ready_to_remove(id);
        self.publish();
    }

    /// Delete an emoji.
    pub fn delete_emoji(&mut self, id: i32) {
        self.document.delete(id);
        self.publish();
    }

    /// Tap an emoji: deletes it when flagged ready-to-remove, otherwise
    /// toggles its selection.
    pub fn tap_emoji(&mut self, id: i32) {
        let ready = self
            .document
            .item(id)
            .is_some_and(Item::is_ready_to_remove);
        if ready {
            self.delete_emoji(id);
        } else {
            self.select_emoji(id);
        }
    }

    /// Replace the background reference.
    ///
    /// Cancels any in-flight fetch, clears the resolved image, and — when the
    /// new reference is present — starts a new fetch. Fetch failures are
    /// silent; they are observable only as an image that never arrives.
    pub fn set_background(&mut self, reference: Option<String>) {
        self.document.set_background(reference);
        self.publish();
        self.refresh_background();
    }

    // -----------------------------------------------------------------------
    // Derived state
    // -----------------------------------------------------------------------

    /// The current document state.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// All items in z order.
    #[must_use]
    pub fn emojis(&self) -> &[Item] {
        self.document.items()
    }

    /// The currently selected items, cloned out as a stable set for
    /// committing group gestures.
    #[must_use]
    pub fn selected_emojis(&self) -> Vec<Item> {
        self.document.selected_items().cloned().collect()
    }

    /// Whether any item is selected.
    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.document.has_selection()
    }

    /// The resolved background image, if the fetch has completed.
    #[must_use]
    pub fn background_image(&self) -> Option<Arc<BackgroundImage>> {
        let slot = self
            .background
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        slot.image.clone()
    }

    /// True while a background reference is set but its image has not
    /// resolved. A permanently failed fetch stays "loading" forever.
    #[must_use]
    pub fn is_background_loading(&self) -> bool {
        self.document.background_reference().is_some() && self.background_image().is_none()
    }

    /// Subscribe to document snapshots. The receiver holds the latest
    /// snapshot at all times; intermediate snapshots may be skipped.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Document> {
        self.snapshots.subscribe()
    }

    /// Subscribe to resolved-background changes (for zoom-to-fit).
    #[must_use]
    pub fn subscribe_background(&self) -> watch::Receiver<Option<Arc<BackgroundImage>>> {
        self.background.publisher.subscribe()
    }

    /// The stable storage key this controller persists under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Publish the current state wholesale and enqueue it for autosave.
    fn publish(&mut self) {
        let snapshot = self.document.clone();
        self.snapshots.send_replace(snapshot.clone());
        // The writer task lives as long as the controller, so a send only
        // fails during teardown.
        let _ = self.autosave.send(snapshot);
    }

    /// Cancel any in-flight fetch, clear the resolved image, and start a new
    /// fetch when a reference is present.
    fn refresh_background(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
        let generation = {
            let mut slot = self
                .background
                .slot
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            slot.generation += 1;
            slot.image = None;
            slot.generation
        };
        self.background.publisher.send_replace(None);

        let Some(reference) = self.document.background_reference().map(str::to_owned) else {
            return;
        };
        let fetcher = Arc::clone(&self.fetcher);
        let background = Arc::clone(&self.background);
        self.fetch_task = Some(tokio::spawn(async move {
            let image = match fetcher.fetch(&reference).await {
                Ok(bytes) => BackgroundImage::decode(&bytes),
                Err(e) => {
                    tracing::debug!("background fetch for {reference} failed: {e}");
                    None
                }
            };
            let Some(image) = image else {
                return;
            };
            let image = Arc::new(image);
            let applied = {
                let mut slot = background
                    .slot
                    .write()
                    .unwrap_or_else(PoisonError::into_inner);
                if slot.generation == generation {
                    slot.image = Some(Arc::clone(&image));
                    true
                } else {
                    false
                }
            };
            if applied {
                background.publisher.send_replace(Some(image));
            } else {
                tracing::debug!("discarding stale background fetch for {reference}");
            }
        }));
    }
}

impl Drop for DocumentController {
    fn drop(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
    }
}

/// Drain snapshots in mutation order, serializing and writing each one.
/// Failures are swallowed; autosave is best-effort.
async fn run_autosave(
    key: String,
    store: Arc<dyn BlobStore>,
    mut snapshots: mpsc::UnboundedReceiver<Document>,
) {
    while let Some(document) = snapshots.recv().await {
        match document.to_json_bytes() {
            Ok(bytes) => {
                if let Err(e) = store.set(&key, &bytes) {
                    tracing::warn!("autosave write for {key} failed: {e}");
                }
            }
            Err(e) => tracing::warn!("autosave serialization for {key} failed: {e}"),
        }
    }
}
