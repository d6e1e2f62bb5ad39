//! Shared in-memory fakes and fixtures for sync tests.

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::auth::StaticIdentity;
use crate::connectivity::SharedConnectivity;
use crate::media::CompressOptions;
use crate::models::{RemoteRow, RemoteRowPayload};
use crate::remote::RemoteStore;
use crate::store::ObservationStore;
use crate::sync::{SyncEngine, SyncOptions};
use crate::{Error, Result};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory stand-in for the remote observation table.
///
/// Counts every request and every successful write, can inject write
/// failures per local id, and can gate reads behind a semaphore so tests
/// can hold a cycle mid-flight.
pub(crate) struct MemoryRemote {
    rows: Mutex<Vec<RemoteRow>>,
    next_id: AtomicI64,
    calls: AtomicUsize,
    writes: AtomicUsize,
    failing: Mutex<HashSet<String>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl MemoryRemote {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            calls: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            failing: Mutex::new(HashSet::new()),
            gate: Mutex::new(None),
        })
    }

    /// Pre-populate a row, keeping server id assignment consistent.
    pub(crate) fn seed(&self, row: RemoteRow) {
        self.next_id.fetch_max(row.id + 1, Ordering::SeqCst);
        lock(&self.rows).push(row);
    }

    pub(crate) fn rows(&self) -> Vec<RemoteRow> {
        lock(&self.rows).clone()
    }

    /// Total requests served, reads included.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Successful inserts plus updates.
    pub(crate) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every write for `local_id` fail.
    pub(crate) fn fail_writes_for(&self, local_id: &str) {
        lock(&self.failing).insert(local_id.to_string());
    }

    /// Block reads until permits are added to the returned semaphore.
    pub(crate) fn gate_requests(&self) -> Arc<Semaphore> {
        let semaphore = Arc::new(Semaphore::new(0));
        *lock(&self.gate) = Some(Arc::clone(&semaphore));
        semaphore
    }

    async fn wait_gate(&self) {
        let gate = lock(&self.gate).clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn find(&self, user_id: &str, local_id: &str) -> Result<Option<RemoteRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate().await;
        Ok(lock(&self.rows)
            .iter()
            .find(|row| row.user_id == user_id && row.local_id == local_id)
            .cloned())
    }

    async fn insert(&self, payload: &RemoteRowPayload) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if lock(&self.failing).contains(&payload.local_id) {
            return Err(Error::Remote("injected write failure".to_string()));
        }

        let mut rows = lock(&self.rows);
        if rows
            .iter()
            .any(|row| row.user_id == payload.user_id && row.local_id == payload.local_id)
        {
            return Err(Error::Remote(format!(
                "duplicate row for ({}, {})",
                payload.user_id, payload.local_id
            )));
        }

        rows.push(RemoteRow {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id: payload.user_id.clone(),
            local_id: payload.local_id.clone(),
            created_at: payload.created_at,
            updated_at: payload.updated_at,
            photo_base64: payload.photo_base64.clone(),
            extra_photos_base64: payload.extra_photos_base64.clone(),
            view: payload.view.clone(),
            meta: payload.meta.clone(),
        });
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update(&self, server_id: i64, payload: &RemoteRowPayload) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if lock(&self.failing).contains(&payload.local_id) {
            return Err(Error::Remote("injected write failure".to_string()));
        }

        let mut rows = lock(&self.rows);
        let Some(row) = rows.iter_mut().find(|row| row.id == server_id) else {
            return Err(Error::Remote(format!("no row with id {server_id}")));
        };

        row.created_at = payload.created_at;
        row.updated_at = payload.updated_at;
        row.photo_base64 = payload.photo_base64.clone();
        row.extra_photos_base64 = payload.extra_photos_base64.clone();
        row.view = payload.view.clone();
        row.meta = payload.meta.clone();
        drop(rows);

        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_all(&self, user_id: &str) -> Result<Vec<RemoteRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate().await;
        Ok(lock(&self.rows)
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// Small valid PNG for observations whose photos must transcode.
pub(crate) fn png_photo(width: u32, height: u32) -> Vec<u8> {
    use image::{ImageBuffer, ImageFormat, Rgb};

    let image = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 40])
    });

    let mut cursor = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut cursor, ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

/// Engine options with lingers long enough to assert terminal statuses.
pub(crate) fn test_options() -> SyncOptions {
    SyncOptions {
        success_linger: Duration::from_secs(60),
        error_linger: Duration::from_secs(60),
        compress: CompressOptions {
            max_dimension: 64,
            jpeg_quality: 70,
        },
    }
}

/// Engine over an always-online connection and the given collaborators.
pub(crate) fn engine_over(
    store: &ObservationStore,
    remote: Option<Arc<MemoryRemote>>,
    identity: StaticIdentity,
    options: SyncOptions,
) -> SyncEngine {
    SyncEngine::new(
        Arc::new(store.clone()),
        remote.map(|remote| remote as Arc<dyn RemoteStore>),
        Arc::new(identity),
        Arc::new(SharedConnectivity::default()),
        options,
    )
}
