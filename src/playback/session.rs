//! Playback session lifecycle.
//!
//! One session record per playback target, owned by the manager. The
//! invariant everything here serves: at most one engine is attached to a
//! target at any time, and a new attach always fully releases the previous
//! engine before the next one takes over.
//!
//! Overlapping attach calls on the same target are internally queued on the
//! session lock for their bookkeeping, but readiness is awaited outside the
//! lock: the loading engine already sits in the session slot, so a newer
//! attach (or a release) can forcibly destroy it mid-load. A generation
//! counter bumped on every attach and release makes the superseded call's
//! eventual resolution a no-op.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::PlaybackError;
use crate::models::{BackendKind, PlaybackPhase, PlaybackStatus, PlaybackTarget};

use super::classification::select_backend;
use super::engines::{EngineFactory, StreamingEngine};

/// Per-target session record: the only place engine handles live.
struct PlaybackSession {
    backend: BackendKind,
    engine: Option<Box<dyn StreamingEngine>>,
    media_url: Option<String>,
    generation: u64,
    status_tx: watch::Sender<PlaybackStatus>,
}

impl PlaybackSession {
    fn new() -> Self {
        let (status_tx, _) = watch::channel(PlaybackStatus::idle());
        Self {
            backend: BackendKind::None,
            engine: None,
            media_url: None,
            generation: 0,
            status_tx,
        }
    }

    fn publish(&self, phase: PlaybackPhase, error: Option<String>) {
        self.status_tx.send_replace(PlaybackStatus {
            phase,
            backend: self.backend,
            media_url: self.media_url.clone(),
            error,
            updated_at: Utc::now(),
        });
    }

    fn status(&self) -> PlaybackStatus {
        self.status_tx.borrow().clone()
    }

    /// Destroy whatever engine is held, if any. Idempotent.
    fn release_engine(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            debug!(backend = %engine.kind(), "destroying engine");
            engine.destroy();
        }
        self.backend = BackendKind::None;
        self.media_url = None;
    }
}

pub struct PlaybackSessionManager {
    factory: Arc<dyn EngineFactory>,
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<PlaybackSession>>>>,
}

impl PlaybackSessionManager {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    async fn session(&self, target: &PlaybackTarget) -> Arc<Mutex<PlaybackSession>> {
        if let Some(slot) = self.sessions.read().await.get(&target.id) {
            return slot.clone();
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(target.id)
            .or_insert_with(|| Arc::new(Mutex::new(PlaybackSession::new())))
            .clone()
    }

    /// Observe state transitions for a target (IDLE/ATTACHED/FAILED...),
    /// e.g. to drive loading indicators and error toasts.
    pub async fn subscribe(&self, target: &PlaybackTarget) -> watch::Receiver<PlaybackStatus> {
        self.session(target).await.lock().await.status_tx.subscribe()
    }

    /// Current status snapshot for a target.
    pub async fn status(&self, target: &PlaybackTarget) -> PlaybackStatus {
        match self.sessions.read().await.get(&target.id) {
            Some(slot) => slot.lock().await.status(),
            None => PlaybackStatus::idle(),
        }
    }

    /// Attach the right backend for `url` to the target.
    ///
    /// Resolves once the selected backend reports ready (semantics differ
    /// per backend), or fails with a [`PlaybackError`] carrying the
    /// attempted backend. Never retried here; retry policy is the caller's.
    pub async fn attach(
        &self,
        target: &PlaybackTarget,
        url: &str,
    ) -> Result<PlaybackStatus, PlaybackError> {
        let slot = self.session(target).await;

        let (generation, backend, ready) = {
            let mut session = slot.lock().await;

            session.generation = session.generation.wrapping_add(1);
            let generation = session.generation;

            // RELEASING: unconditional and idempotent, even when nothing
            // is attached. Guarantees no two engines ever coexist.
            session.publish(PlaybackPhase::Releasing, None);
            session.release_engine();

            session.publish(PlaybackPhase::Selecting, None);
            let backend = select_backend(url, self.factory.hls_supported());

            let mut engine = self.factory.create(backend);
            session.backend = backend;
            session.media_url = Some(url.to_string());
            session.publish(PlaybackPhase::Attaching, None);

            // The engine goes into the slot before readiness resolves, so
            // a superseding attach can reach it.
            let ready = engine.begin_attach(target, url);
            session.engine = Some(engine);

            (generation, backend, ready)
        };

        let outcome = ready.await;

        let mut session = slot.lock().await;
        if session.generation != generation {
            // Superseded while loading; the engine was already destroyed by
            // the newer request and this outcome must not touch the slot.
            debug!(target = %target, url, "stale attach result ignored");
            return Ok(session.status());
        }

        match outcome {
            Ok(()) => {
                session.publish(PlaybackPhase::Attached, None);
                info!(target = %target, url, backend = %backend, "backend attached");
                Ok(session.status())
            }
            Err(cause) => {
                warn!(target = %target, url, backend = %backend, error = %cause, "attach failed");
                session.publish(PlaybackPhase::Failed, Some(cause.to_string()));
                // The slot is already idle again; no caller release needed.
                session.release_engine();
                Err(PlaybackError::new(backend, cause))
            }
        }
    }

    /// Tear down whatever is attached to the target. Idempotent; safe to
    /// call when nothing is attached.
    pub async fn release(&self, target: &PlaybackTarget) {
        let Some(slot) = self.sessions.read().await.get(&target.id).cloned() else {
            return;
        };
        let mut session = slot.lock().await;
        // Any in-flight attach is superseded from here on.
        session.generation = session.generation.wrapping_add(1);
        if session.engine.is_some() {
            session.publish(PlaybackPhase::Releasing, None);
        }
        session.release_engine();
        session.publish(PlaybackPhase::Idle, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EngineError;
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Engine that resolves immediately and counts destroys.
    struct InstantEngine {
        kind: BackendKind,
        fail: bool,
        destroys: Arc<AtomicUsize>,
    }

    impl StreamingEngine for InstantEngine {
        fn kind(&self) -> BackendKind {
            self.kind
        }

        fn begin_attach(
            &mut self,
            _target: &PlaybackTarget,
            _url: &str,
        ) -> BoxFuture<'static, Result<(), EngineError>> {
            let fail = self.fail;
            Box::pin(async move {
                if fail {
                    Err(EngineError::Http("boom".to_string()))
                } else {
                    Ok(())
                }
            })
        }

        fn destroy(&mut self) {
            self.destroys.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct InstantFactory {
        fail: bool,
        destroys: Arc<AtomicUsize>,
        created: Arc<AtomicUsize>,
    }

    impl InstantFactory {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                destroys: Arc::new(AtomicUsize::new(0)),
                created: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl EngineFactory for InstantFactory {
        fn hls_supported(&self) -> bool {
            true
        }

        fn create(&self, kind: BackendKind) -> Box<dyn StreamingEngine> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Box::new(InstantEngine {
                kind,
                fail: self.fail,
                destroys: self.destroys.clone(),
            })
        }
    }

    #[tokio::test]
    async fn attach_reaches_attached_with_selected_backend() {
        let manager = PlaybackSessionManager::new(Arc::new(InstantFactory::new(false)));
        let target = PlaybackTarget::new();

        let status = manager.attach(&target, "http://x/video.m3u8").await.unwrap();
        assert_eq!(status.phase, PlaybackPhase::Attached);
        assert_eq!(status.backend, BackendKind::SegmentedHls);
        assert_eq!(status.media_url.as_deref(), Some("http://x/video.m3u8"));
    }

    #[tokio::test]
    async fn reattach_destroys_previous_engine_first() {
        let factory = Arc::new(InstantFactory::new(false));
        let destroys = factory.destroys.clone();
        let manager = PlaybackSessionManager::new(factory.clone());
        let target = PlaybackTarget::new();

        manager.attach(&target, "http://x/video.mpd").await.unwrap();
        assert_eq!(destroys.load(Ordering::SeqCst), 0);

        let status = manager.attach(&target, "http://x/video.m3u8").await.unwrap();
        assert_eq!(destroys.load(Ordering::SeqCst), 1, "dash engine torn down");
        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
        assert_eq!(status.backend, BackendKind::SegmentedHls);
    }

    #[tokio::test]
    async fn failed_attach_reports_backend_and_leaves_slot_reusable() {
        let manager = PlaybackSessionManager::new(Arc::new(InstantFactory::new(true)));
        let target = PlaybackTarget::new();

        let err = manager
            .attach(&target, "http://x/video.m3u8")
            .await
            .unwrap_err();
        assert_eq!(err.backend, BackendKind::SegmentedHls);
        assert!(matches!(err.cause, EngineError::Http(_)));

        let status = manager.status(&target).await;
        assert_eq!(status.phase, PlaybackPhase::Failed);
        assert!(status.error.is_some());
    }

    #[tokio::test]
    async fn release_is_idempotent_and_safe_when_idle() {
        let manager = PlaybackSessionManager::new(Arc::new(InstantFactory::new(false)));
        let target = PlaybackTarget::new();

        manager.release(&target).await;
        assert_eq!(manager.status(&target).await.phase, PlaybackPhase::Idle);

        manager.attach(&target, "http://x/video.mov").await.unwrap();
        manager.release(&target).await;
        manager.release(&target).await;
        let status = manager.status(&target).await;
        assert_eq!(status.phase, PlaybackPhase::Idle);
        assert_eq!(status.backend, BackendKind::None);
    }

    #[tokio::test]
    async fn status_for_unknown_target_is_idle() {
        let manager = PlaybackSessionManager::new(Arc::new(InstantFactory::new(false)));
        let status = manager.status(&PlaybackTarget::new()).await;
        assert_eq!(status.phase, PlaybackPhase::Idle);
        assert_eq!(status.backend, BackendKind::None);
    }
}
