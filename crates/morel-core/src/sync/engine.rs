//! Bidirectional reconciliation between the local and remote stores.
//!
//! Each cycle uploads locally-newer observations, then downloads
//! remotely-newer ones, resolving conflicts last-writer-wins by watermark.
//! Failures scoped to one observation are absorbed and logged; only
//! guard-level failures end the cycle in the error state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::IdentityProvider;
use crate::connectivity::Connectivity;
use crate::media::{compress_photo, decode_base64, encode_base64, CompressOptions};
use crate::models::{Observation, ObservationId, RemoteRow, RemoteRowPayload};
use crate::quota::check_quota;
use crate::remote::RemoteStore;
use crate::store::LocalStore;
use crate::sync::status::{Subscription, SyncFailure, SyncState, SyncStatus};
use crate::util::unix_timestamp_ms;
use crate::{Error, Result};

/// Tuning knobs for a sync engine instance.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// How long the `Success` status lingers before settling to `Idle`
    pub success_linger: Duration,
    /// How long the `Error` status lingers before settling to `Idle`
    pub error_linger: Duration,
    /// Photo compression applied before upload
    pub compress: CompressOptions,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            success_linger: Duration::from_secs(3),
            error_linger: Duration::from_secs(5),
            compress: CompressOptions::default(),
        }
    }
}

/// Per-cycle accounting, logged when the cycle finishes.
#[derive(Debug, Default, Clone, Copy)]
struct SyncReport {
    uploaded: usize,
    downloaded: usize,
    skipped: usize,
    failed: usize,
}

enum CycleOutcome {
    SignedOut,
    Complete,
    QuotaDenied(String),
}

enum Reconcile {
    Applied,
    Skipped,
}

/// Orchestrates identity resolution, quota enforcement, and per-record
/// reconciliation between one local store and one remote table.
pub struct SyncEngine {
    local: Arc<dyn LocalStore>,
    remote: Option<Arc<dyn RemoteStore>>,
    identity: Arc<dyn IdentityProvider>,
    connectivity: Arc<dyn Connectivity>,
    options: SyncOptions,
    enabled: AtomicBool,
    in_flight: AtomicBool,
    state: Arc<SyncState>,
}

impl SyncEngine {
    /// Create an engine over the given collaborators.
    ///
    /// `remote` is `None` when no backend is configured; the engine then
    /// treats every invocation as a steady no-op.
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Option<Arc<dyn RemoteStore>>,
        identity: Arc<dyn IdentityProvider>,
        connectivity: Arc<dyn Connectivity>,
        options: SyncOptions,
    ) -> Self {
        Self {
            local,
            remote,
            identity,
            connectivity,
            options,
            enabled: AtomicBool::new(true),
            in_flight: AtomicBool::new(false),
            state: Arc::new(SyncState::new()),
        }
    }

    /// Run one sync cycle.
    ///
    /// Safe to invoke from timers and event listeners: re-entrant calls
    /// while a cycle is in flight are no-ops, and no error ever escapes to
    /// the caller. All outcomes are reported through the status machine.
    pub async fn sync(&self) {
        // The in-flight flag must be taken before the first suspension
        // point so a concurrent invocation always observes it.
        if self.in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!("Sync already in flight; ignoring re-entrant call");
            return;
        }

        if !self.enabled.load(Ordering::SeqCst) {
            self.release_guard("sync disabled");
            return;
        }
        let Some(remote) = self.remote.clone() else {
            self.release_guard("no remote backend configured");
            return;
        };
        if !self.connectivity.is_online() {
            self.release_guard("device offline");
            return;
        }

        self.state.set_status(SyncStatus::Syncing);

        match self.run_cycle(remote.as_ref()).await {
            Ok(CycleOutcome::SignedOut) => {
                self.state.set_status(SyncStatus::Idle);
            }
            Ok(CycleOutcome::Complete) => {
                let now = unix_timestamp_ms();
                self.state.set_last_sync_time(now);
                if let Err(error) = self.local.record_sync_time(now).await {
                    tracing::warn!("Failed to persist last sync time: {error}");
                }
                let epoch = self.state.set_status(SyncStatus::Success);
                self.settle_after(epoch, self.options.success_linger);
            }
            Ok(CycleOutcome::QuotaDenied(message)) => {
                tracing::warn!("Upload phase blocked by quota: {message}");
                let epoch = self
                    .state
                    .set_status(SyncStatus::Error(SyncFailure::QuotaExceeded(message)));
                self.settle_after(epoch, self.options.error_linger);
            }
            Err(error) => {
                tracing::warn!("Sync cycle failed: {error}");
                let epoch = self
                    .state
                    .set_status(SyncStatus::Error(SyncFailure::Cycle(error.to_string())));
                self.settle_after(epoch, self.options.error_linger);
            }
        }

        self.in_flight.store(false, Ordering::SeqCst);
    }

    /// Current status.
    pub fn status(&self) -> SyncStatus {
        self.state.status()
    }

    /// Timestamp of the last successful cycle in this process (Unix ms).
    pub fn last_sync_time(&self) -> Option<i64> {
        self.state.last_sync_time()
    }

    /// Register a status observer; returns the unsubscribe handle.
    pub fn subscribe(&self, listener: impl Fn(&SyncStatus) + Send + Sync + 'static) -> Subscription {
        self.state.subscribe(Box::new(listener))
    }

    /// Remove a previously registered observer.
    pub fn unsubscribe(&self, subscription: Subscription) {
        self.state.unsubscribe(subscription);
    }

    /// Toggle whether sync cycles run at all.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Whether sync cycles run at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn release_guard(&self, reason: &str) {
        tracing::debug!("Sync skipped: {reason}");
        if self.state.status() != SyncStatus::Idle {
            self.state.set_status(SyncStatus::Idle);
        }
        self.in_flight.store(false, Ordering::SeqCst);
    }

    fn settle_after(&self, epoch: u64, delay: Duration) {
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.set_status_if_epoch(SyncStatus::Idle, epoch);
        });
    }

    async fn run_cycle(&self, remote: &dyn RemoteStore) -> Result<CycleOutcome> {
        let Some(account) = self.identity.current_account().await? else {
            tracing::debug!("No signed-in account; nothing to sync");
            return Ok(CycleOutcome::SignedOut);
        };

        let observations = self.local.list().await?;
        let quota = check_quota(account.tier, observations.len());

        let mut report = SyncReport::default();
        if quota.allowed {
            self.upload_phase(remote, &account.user_id, &observations, &mut report)
                .await;
        }

        // Pulling remote state down is quota-exempt, so the download phase
        // runs even when the upload phase was denied.
        self.download_phase(remote, &account.user_id, &mut report)
            .await?;

        tracing::info!(
            "Sync cycle finished: {} uploaded, {} downloaded, {} skipped, {} failed",
            report.uploaded,
            report.downloaded,
            report.skipped,
            report.failed
        );

        if quota.allowed {
            Ok(CycleOutcome::Complete)
        } else {
            Ok(CycleOutcome::QuotaDenied(quota.message.unwrap_or_else(
                || "Sync quota exceeded".to_string(),
            )))
        }
    }

    async fn upload_phase(
        &self,
        remote: &dyn RemoteStore,
        user_id: &str,
        observations: &[Observation],
        report: &mut SyncReport,
    ) {
        for observation in observations {
            match self.reconcile_upload(remote, user_id, observation).await {
                Ok(Reconcile::Applied) => report.uploaded += 1,
                Ok(Reconcile::Skipped) => report.skipped += 1,
                Err(error) => {
                    report.failed += 1;
                    tracing::warn!("Upload failed for observation {}: {error}", observation.id);
                }
            }
        }
    }

    async fn reconcile_upload(
        &self,
        remote: &dyn RemoteStore,
        user_id: &str,
        observation: &Observation,
    ) -> Result<Reconcile> {
        let watermark = observation.watermark();

        let existing = remote.find(user_id, &observation.id.as_str()).await?;
        if let Some(row) = &existing {
            // Ties favor the existing remote row to avoid redundant writes
            if row.updated_at >= watermark {
                return Ok(Reconcile::Skipped);
            }
        }

        let payload = self.build_payload(user_id, observation, watermark)?;
        match existing {
            Some(row) => remote.update(row.id, &payload).await?,
            None => remote.insert(&payload).await?,
        }

        Ok(Reconcile::Applied)
    }

    fn build_payload(
        &self,
        user_id: &str,
        observation: &Observation,
        watermark: i64,
    ) -> Result<RemoteRowPayload> {
        let photo = compress_photo(&observation.photo, &self.options.compress)?;

        let mut extra_photos_base64 = Vec::with_capacity(observation.extra_photos.len());
        for bytes in &observation.extra_photos {
            let compressed = compress_photo(bytes, &self.options.compress)?;
            extra_photos_base64.push(encode_base64(&compressed));
        }

        Ok(RemoteRowPayload {
            user_id: user_id.to_string(),
            local_id: observation.id.as_str(),
            created_at: observation.created_at,
            updated_at: watermark,
            photo_base64: encode_base64(&photo),
            extra_photos_base64,
            view: observation.view.clone(),
            meta: observation.meta.clone(),
        })
    }

    async fn download_phase(
        &self,
        remote: &dyn RemoteStore,
        user_id: &str,
        report: &mut SyncReport,
    ) -> Result<()> {
        let rows = remote.list_all(user_id).await?;

        for row in rows {
            match self.reconcile_download(&row).await {
                Ok(Reconcile::Applied) => report.downloaded += 1,
                Ok(Reconcile::Skipped) => report.skipped += 1,
                Err(error) => {
                    report.failed += 1;
                    tracing::warn!("Download failed for observation {}: {error}", row.local_id);
                }
            }
        }

        Ok(())
    }

    async fn reconcile_download(&self, row: &RemoteRow) -> Result<Reconcile> {
        let id: ObservationId = row
            .local_id
            .parse()
            .map_err(|_| Error::InvalidInput(format!("Invalid remote local_id: {}", row.local_id)))?;

        let existing = self.local.get(&id).await?;
        if let Some(local) = &existing {
            if local.watermark() >= row.updated_at {
                return Ok(Reconcile::Skipped);
            }
        }

        let photo = decode_base64(&row.photo_base64)?;
        let mut extra_photos = Vec::with_capacity(row.extra_photos_base64.len());
        for encoded in &row.extra_photos_base64 {
            extra_photos.push(decode_base64(encoded)?);
        }

        let observation = Observation {
            id,
            created_at: row.created_at,
            photo,
            extra_photos,
            view: row.view.clone(),
            meta: row.meta.clone(),
        };

        match existing {
            Some(_) => self.local.update(&observation).await?,
            None => self.local.insert(&observation).await?,
        }

        Ok(Reconcile::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticIdentity;
    use crate::connectivity::SharedConnectivity;
    use crate::quota::Tier;
    use crate::store::ObservationStore;
    use crate::sync::support::{engine_over, png_photo, test_options, MemoryRemote};
    use serde_json::json;
    use std::sync::Mutex as StdMutex;

    async fn store_with(observations: &[Observation]) -> ObservationStore {
        let store = ObservationStore::open_in_memory().await.unwrap();
        for observation in observations {
            store.insert(observation).await.unwrap();
        }
        store
    }

    fn observation(created_at: i64, detail_updated_at: Option<i64>) -> Observation {
        let mut obs = Observation::new(png_photo(16, 16));
        obs.created_at = created_at;
        if let Some(updated_at) = detail_updated_at {
            obs.meta = json!({"detail": {"updatedAt": updated_at}});
        }
        obs
    }

    fn remote_row(id: i64, user_id: &str, local_id: &str, updated_at: i64) -> RemoteRow {
        RemoteRow {
            id,
            user_id: user_id.to_string(),
            local_id: local_id.to_string(),
            created_at: 100,
            updated_at,
            photo_base64: encode_base64(&[9, 9, 9]),
            extra_photos_base64: Vec::new(),
            view: None,
            meta: json!({"detail": {"updatedAt": updated_at}}),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn uploads_record_missing_from_remote() {
        let obs = observation(100, None);
        let store = store_with(std::slice::from_ref(&obs)).await;
        let remote = MemoryRemote::new();
        let engine = engine_over(
            &store,
            Some(remote.clone()),
            StaticIdentity::signed_in("user-a", Tier::Plus),
            test_options(),
        );

        engine.sync().await;

        let rows = remote.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, "user-a");
        assert_eq!(rows[0].local_id, obs.id.as_str());
        assert_eq!(rows[0].updated_at, 100);
        // The payload carries a decodable compressed photo
        assert!(!decode_base64(&rows[0].photo_base64).unwrap().is_empty());
        assert_eq!(engine.status(), SyncStatus::Success);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn downloads_newer_remote_content() {
        let obs = observation(100, None);
        let store = store_with(std::slice::from_ref(&obs)).await;
        let remote = MemoryRemote::new();
        remote.seed(remote_row(1, "user-a", &obs.id.as_str(), 200));

        let engine = engine_over(
            &store,
            Some(remote.clone()),
            StaticIdentity::signed_in("user-a", Tier::Plus),
            test_options(),
        );

        engine.sync().await;

        // No upload happened for the stale local record
        assert_eq!(remote.writes(), 0);

        let local = store.get(&obs.id).await.unwrap().unwrap();
        assert_eq!(local.photo, vec![9, 9, 9]);
        assert_eq!(local.watermark(), 200);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn uploads_newer_local_over_stale_remote() {
        let obs = observation(100, Some(200));
        let store = store_with(std::slice::from_ref(&obs)).await;
        let remote = MemoryRemote::new();
        remote.seed(remote_row(7, "user-a", &obs.id.as_str(), 100));

        let engine = engine_over(
            &store,
            Some(remote.clone()),
            StaticIdentity::signed_in("user-a", Tier::Plus),
            test_options(),
        );

        engine.sync().await;

        let rows = remote.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 7, "update must target the existing server row");
        assert_eq!(rows[0].updated_at, 200);
        assert_eq!(rows[0].meta, json!({"detail": {"updatedAt": 200}}));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn signed_out_settles_to_idle_without_remote_calls() {
        let store = store_with(&[observation(100, None)]).await;
        let remote = MemoryRemote::new();
        let engine = engine_over(
            &store,
            Some(remote.clone()),
            StaticIdentity::signed_out(),
            test_options(),
        );

        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine.subscribe(move |status| sink.lock().unwrap().push(status.clone()));

        engine.sync().await;

        assert_eq!(remote.calls(), 0);
        assert_eq!(engine.status(), SyncStatus::Idle);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![SyncStatus::Syncing, SyncStatus::Idle]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn second_cycle_is_idempotent() {
        let store = store_with(&[observation(100, None), observation(150, Some(175))]).await;
        let remote = MemoryRemote::new();
        let engine = engine_over(
            &store,
            Some(remote.clone()),
            StaticIdentity::signed_in("user-a", Tier::Plus),
            test_options(),
        );

        engine.sync().await;
        let writes_after_first = remote.writes();
        assert_eq!(writes_after_first, 2);
        let local_after_first = store.list().await.unwrap();

        engine.sync().await;
        assert_eq!(remote.writes(), writes_after_first, "no uploads on second run");
        assert_eq!(store.list().await.unwrap(), local_after_first, "no downloads on second run");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn equal_watermarks_favor_the_remote() {
        let obs = observation(100, None);
        let store = store_with(std::slice::from_ref(&obs)).await;
        let remote = MemoryRemote::new();
        remote.seed(remote_row(1, "user-a", &obs.id.as_str(), 100));

        let engine = engine_over(
            &store,
            Some(remote.clone()),
            StaticIdentity::signed_in("user-a", Tier::Plus),
            test_options(),
        );

        engine.sync().await;

        assert_eq!(remote.writes(), 0);
        let local = store.get(&obs.id).await.unwrap().unwrap();
        assert_eq!(local.photo, obs.photo, "tie must not rewrite local state");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn watermarks_converge_to_the_maximum_on_both_sides() {
        let local_newer = observation(100, Some(300));
        let remote_newer = observation(100, None);
        let store = store_with(&[local_newer.clone(), remote_newer.clone()]).await;

        let remote = MemoryRemote::new();
        remote.seed(remote_row(1, "user-a", &local_newer.id.as_str(), 250));
        remote.seed(remote_row(2, "user-a", &remote_newer.id.as_str(), 400));

        let engine = engine_over(
            &store,
            Some(remote.clone()),
            StaticIdentity::signed_in("user-a", Tier::Plus),
            test_options(),
        );

        engine.sync().await;

        for row in remote.rows() {
            let id: ObservationId = row.local_id.parse().unwrap();
            let local = store.get(&id).await.unwrap().unwrap();
            assert_eq!(local.watermark(), row.updated_at);
        }
        let converged = remote
            .rows()
            .iter()
            .map(|row| row.updated_at)
            .collect::<Vec<_>>();
        assert_eq!(converged, vec![300, 400]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn quota_denial_blocks_upload_but_not_download() {
        let mut observations = Vec::new();
        for _ in 0..101 {
            observations.push(observation(100, None));
        }
        let store = store_with(&observations).await;

        let remote = MemoryRemote::new();
        let downloaded = observation(50, None);
        remote.seed(remote_row(1, "user-a", &downloaded.id.as_str(), 500));

        let engine = engine_over(
            &store,
            Some(remote.clone()),
            StaticIdentity::signed_in("user-a", Tier::Plus),
            test_options(),
        );

        engine.sync().await;

        assert_eq!(remote.writes(), 0, "upload phase must not run over quota");
        assert!(
            store.get(&downloaded.id).await.unwrap().is_some(),
            "download phase is quota-exempt"
        );
        match engine.status() {
            SyncStatus::Error(SyncFailure::QuotaExceeded(message)) => {
                assert!(message.contains("101"));
            }
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn quota_allows_exactly_the_limit() {
        let observations: Vec<Observation> =
            (0..100).map(|_| observation(100, None)).collect();
        let store = store_with(&observations).await;
        let remote = MemoryRemote::new();

        let engine = engine_over(
            &store,
            Some(remote.clone()),
            StaticIdentity::signed_in("user-a", Tier::Plus),
            test_options(),
        );

        engine.sync().await;

        assert_eq!(remote.writes(), 100);
        assert_eq!(engine.status(), SyncStatus::Success);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn free_tier_still_downloads() {
        let store = ObservationStore::open_in_memory().await.unwrap();
        let remote = MemoryRemote::new();
        let downloaded = observation(50, None);
        remote.seed(remote_row(1, "user-a", &downloaded.id.as_str(), 500));

        let engine = engine_over(
            &store,
            Some(remote.clone()),
            StaticIdentity::signed_in("user-a", Tier::Free),
            test_options(),
        );

        engine.sync().await;

        assert_eq!(store.count().await.unwrap(), 1);
        assert!(matches!(
            engine.status(),
            SyncStatus::Error(SyncFailure::QuotaExceeded(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn one_failing_record_does_not_abort_the_batch() {
        let observations = vec![
            observation(100, None),
            observation(110, None),
            observation(120, None),
        ];
        let store = store_with(&observations).await;
        let remote = MemoryRemote::new();
        remote.fail_writes_for(&observations[1].id.as_str());

        let engine = engine_over(
            &store,
            Some(remote.clone()),
            StaticIdentity::signed_in("user-a", Tier::Plus),
            test_options(),
        );

        engine.sync().await;

        assert_eq!(remote.rows().len(), 2, "remaining records still upload");
        assert_eq!(
            engine.status(),
            SyncStatus::Success,
            "per-record failures do not change the terminal status"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn untranscodable_photo_skips_only_that_record() {
        let mut broken = observation(100, None);
        broken.photo = b"not-an-image".to_vec();
        let fine = observation(110, None);
        let store = store_with(&[broken, fine.clone()]).await;
        let remote = MemoryRemote::new();

        let engine = engine_over(
            &store,
            Some(remote.clone()),
            StaticIdentity::signed_in("user-a", Tier::Plus),
            test_options(),
        );

        engine.sync().await;

        let rows = remote.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].local_id, fine.id.as_str());
        assert_eq!(engine.status(), SyncStatus::Success);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn another_users_rows_are_never_touched() {
        let store = ObservationStore::open_in_memory().await.unwrap();
        let remote = MemoryRemote::new();
        let foreign = observation(50, None);
        remote.seed(remote_row(1, "user-b", &foreign.id.as_str(), 500));

        let engine = engine_over(
            &store,
            Some(remote.clone()),
            StaticIdentity::signed_in("user-a", Tier::Plus),
            test_options(),
        );

        engine.sync().await;

        assert_eq!(store.count().await.unwrap(), 0);
        let rows = remote.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, "user-b");
        assert_eq!(rows[0].updated_at, 500);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn reentrant_sync_is_a_no_op() {
        let store = store_with(&[observation(100, None)]).await;
        let remote = MemoryRemote::new();
        let gate = remote.gate_requests();

        let engine = Arc::new(engine_over(
            &store,
            Some(remote.clone()),
            StaticIdentity::signed_in("user-a", Tier::Plus),
            test_options(),
        ));

        let background = Arc::clone(&engine);
        let first = tokio::spawn(async move { background.sync().await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(engine.status(), SyncStatus::Syncing);
        let calls_mid_flight = remote.calls();

        // Second invocation returns immediately without touching the remote
        engine.sync().await;
        assert_eq!(engine.status(), SyncStatus::Syncing);
        assert_eq!(remote.calls(), calls_mid_flight);

        gate.add_permits(100);
        first.await.unwrap();
        assert_eq!(engine.status(), SyncStatus::Success);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn offline_device_skips_the_cycle() {
        let store = store_with(&[observation(100, None)]).await;
        let remote = MemoryRemote::new();
        let connectivity = Arc::new(SharedConnectivity::new(false));

        let engine = SyncEngine::new(
            Arc::new(store),
            Some(remote.clone() as Arc<dyn RemoteStore>),
            Arc::new(StaticIdentity::signed_in("user-a", Tier::Plus)),
            connectivity,
            test_options(),
        );

        engine.sync().await;

        assert_eq!(remote.calls(), 0);
        assert_eq!(engine.status(), SyncStatus::Idle);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_backend_is_a_steady_no_op() {
        let store = store_with(&[observation(100, None)]).await;
        let engine = engine_over(
            &store,
            None,
            StaticIdentity::signed_in("user-a", Tier::Plus),
            test_options(),
        );

        engine.sync().await;
        assert_eq!(engine.status(), SyncStatus::Idle);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn disabled_engine_skips_the_cycle() {
        let store = store_with(&[observation(100, None)]).await;
        let remote = MemoryRemote::new();
        let engine = engine_over(
            &store,
            Some(remote.clone()),
            StaticIdentity::signed_in("user-a", Tier::Plus),
            test_options(),
        );

        engine.set_enabled(false);
        engine.sync().await;

        assert_eq!(remote.calls(), 0);
        assert!(!engine.is_enabled());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn success_status_settles_to_idle() {
        let store = store_with(&[observation(100, None)]).await;
        let remote = MemoryRemote::new();
        let mut options = test_options();
        options.success_linger = Duration::from_millis(50);

        let engine = engine_over(
            &store,
            Some(remote),
            StaticIdentity::signed_in("user-a", Tier::Plus),
            options,
        );

        engine.sync().await;
        assert_eq!(engine.status(), SyncStatus::Success);
        assert!(engine.last_sync_time().is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(engine.status(), SyncStatus::Idle);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unsubscribed_listener_stops_receiving() {
        let store = ObservationStore::open_in_memory().await.unwrap();
        let remote = MemoryRemote::new();
        let engine = engine_over(
            &store,
            Some(remote),
            StaticIdentity::signed_out(),
            test_options(),
        );

        let seen = Arc::new(StdMutex::new(0usize));
        let sink = Arc::clone(&seen);
        let subscription = engine.subscribe(move |_| *sink.lock().unwrap() += 1);

        engine.sync().await;
        let after_first = *seen.lock().unwrap();
        assert!(after_first > 0);

        engine.unsubscribe(subscription);
        engine.sync().await;
        assert_eq!(*seen.lock().unwrap(), after_first);
    }
}
