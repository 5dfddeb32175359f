//! In-memory editing sessions.
//!
//! A session is one document, its auto-fit state and its export guard. Every
//! mutation goes through `Session` so that each content change is followed by a
//! re-measurement. Sessions live until deleted or until they sit unedited for
//! longer than the configured idle window.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::ExportGuard;
use crate::layout::page_fill::{analyze_fit, FitReport};
use crate::layout::{AutoFit, LayoutError, LayoutEvent, PageSpec, ScaleUpdate, Viewport};
use crate::models::edit::ResumeEdit;
use crate::models::resume::ResumeDocument;
use crate::render::LayoutHints;

/// How often the idle sweeper runs.
const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub document: ResumeDocument,
    pub autofit: AutoFit,
    pub exports: ExportGuard,
    pub page: PageSpec,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(document: ResumeDocument, page: PageSpec) -> Self {
        let now = Utc::now();
        let mut session = Self {
            id: Uuid::new_v4(),
            document,
            autofit: AutoFit::default(),
            exports: ExportGuard::default(),
            page,
            created_at: now,
            updated_at: now,
        };
        session.relayout(LayoutEvent::ContentChanged);
        session
    }

    fn relayout(&mut self, event: LayoutEvent) -> ScaleUpdate {
        self.autofit.handle(event, &self.document, self.page)
    }

    pub fn replace_document(&mut self, document: ResumeDocument) -> ScaleUpdate {
        self.document = document;
        self.updated_at = Utc::now();
        self.relayout(LayoutEvent::ContentChanged)
    }

    /// Applies one field-level edit. A rejected edit changes nothing.
    pub fn apply_edit(&mut self, edit: ResumeEdit) -> Result<ScaleUpdate, AppError> {
        edit.apply(&mut self.document)?;
        self.updated_at = Utc::now();
        Ok(self.relayout(LayoutEvent::ContentChanged))
    }

    pub fn resize(&mut self, viewport: Viewport) -> ScaleUpdate {
        self.relayout(LayoutEvent::ViewportResized(viewport))
    }

    /// Fit numbers for the last good measurement.
    pub fn fit_report(&self) -> Result<FitReport, LayoutError> {
        self.autofit
            .last_measurement()
            .map(|m| analyze_fit(&m, self.autofit.committed()))
            .ok_or_else(|| {
                LayoutError::MeasurementUnavailable("document has not been measured".to_string())
            })
    }

    /// What an export reads: the committed scale and the page.
    pub fn layout_hints(&self) -> LayoutHints {
        LayoutHints {
            scale: self.autofit.committed(),
            page: self.page,
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            document: self.document.clone(),
            scale: self.autofit.committed(),
            viewport: self.autofit.viewport(),
            fit: self.fit_report().ok(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Serializable snapshot returned by the session endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub document: ResumeDocument,
    pub scale: f32,
    pub viewport: Viewport,
    pub fit: Option<FitReport>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

type SharedSession = Arc<Mutex<Session>>;

/// Session map. The map lock is held only to find a session; work on a
/// session holds that session's own lock, so sessions never wait on each other.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionStore {
    pub async fn insert(&self, session: Session) -> Uuid {
        let id = session.id;
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        id
    }

    async fn get(&self, id: Uuid) -> Result<SharedSession, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// Runs `f` against the session.
    pub async fn read<T>(&self, id: Uuid, f: impl FnOnce(&Session) -> T) -> Result<T, AppError> {
        let session = self.get(id).await?;
        let session = session.lock().await;
        Ok(f(&session))
    }

    /// Runs `f` against the session with exclusive access to it.
    pub async fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let session = self.get(id).await?;
        let mut session = session.lock().await;
        f(&mut session)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    /// Drops sessions whose document has not changed for `max_idle`. A session
    /// that is busy at sweep time is kept.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let is_stale = |session: &SharedSession| {
            session
                .try_lock()
                .map(|s| s.updated_at < cutoff)
                .unwrap_or(false)
        };

        let stale: Vec<Uuid> = {
            let sessions = self.sessions.read().await;
            sessions
                .iter()
                .filter(|(_, session)| is_stale(*session))
                .map(|(id, _)| *id)
                .collect()
        };
        if stale.is_empty() {
            return 0;
        }

        let mut sessions = self.sessions.write().await;
        let mut evicted = 0;
        for id in stale {
            // re-checked: an edit may have landed between the two locks
            if sessions.get(&id).is_some_and(is_stale) {
                sessions.remove(&id);
                evicted += 1;
            }
        }
        evicted
    }

    /// Runs `evict_idle` every `SWEEP_INTERVAL` for the life of the process.
    pub fn spawn_idle_sweeper(&self, max_idle: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle(max_idle).await;
                if evicted > 0 {
                    let remaining = store.len().await;
                    info!(evicted, remaining, "evicted idle sessions");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::A4;
    use crate::models::edit::TextField;
    use crate::models::resume::Experience;

    fn crowded() -> ResumeDocument {
        let mut doc = ResumeDocument::sample();
        doc.experiences = (0..10)
            .map(|i| Experience {
                title: format!("Engineer {i}"),
                company: "Acme".to_string(),
                date_range: "2020 – 2021".to_string(),
                bullets: vec!["Did a thing that took a fair amount of words to describe well.".to_string(); 4],
            })
            .collect();
        doc
    }

    #[test]
    fn test_new_session_is_measured() {
        let session = Session::new(ResumeDocument::sample(), A4);
        let report = session.fit_report().unwrap();
        assert!(report.natural_height > 0.0);
        assert!(session.view().fit.is_some());
    }

    #[test]
    fn test_growing_content_shrinks_scale() {
        let mut session = Session::new(ResumeDocument::sample(), A4);
        let update = session.replace_document(crowded());
        assert!(matches!(update, ScaleUpdate::Committed { .. }));
        assert!(session.layout_hints().scale < 1.0);
    }

    #[test]
    fn test_rejected_edit_leaves_session_untouched() {
        let mut session = Session::new(ResumeDocument::sample(), A4);
        let before = session.document.clone();
        let scale = session.autofit.committed();
        let err = session.apply_edit(ResumeEdit::Remove {
            section: crate::models::edit::ListSection::Experiences,
            index: 5,
        });
        assert!(err.is_err());
        assert_eq!(session.document, before);
        assert_eq!(session.autofit.committed(), scale);
    }

    #[test]
    fn test_edit_updates_document() {
        let mut session = Session::new(ResumeDocument::sample(), A4);
        session
            .apply_edit(ResumeEdit::SetText {
                field: TextField::Name,
                value: "Sam Lee".to_string(),
            })
            .unwrap();
        assert_eq!(session.document.identity.name.as_deref(), Some("Sam Lee"));
    }

    #[test]
    fn test_short_viewport_shrinks_scale() {
        let mut session = Session::new(ResumeDocument::sample(), A4);
        session.resize(Viewport {
            sheet_height: Some(200.0),
        });
        assert!(session.autofit.committed() < 1.0);
        assert_eq!(session.view().viewport.sheet_height, Some(200.0));
    }

    #[tokio::test]
    async fn test_store_lookup() {
        let store = SessionStore::default();
        let id = store.insert(Session::new(ResumeDocument::default(), A4)).await;
        assert_eq!(store.len().await, 1);
        assert_eq!(store.read(id, |s| s.id).await.unwrap(), id);
        assert!(matches!(
            store.read(Uuid::new_v4(), |s| s.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_session() {
        let store = SessionStore::default();
        let id = store.insert(Session::new(ResumeDocument::default(), A4)).await;
        store.remove(id).await.unwrap();
        assert_eq!(store.len().await, 0);
        assert!(matches!(store.remove(id).await, Err(AppError::NotFound(_))));
    }

    fn backdate(session: &mut Session, by: Duration) -> Result<(), AppError> {
        session.updated_at = Utc::now() - by;
        Ok(())
    }

    #[tokio::test]
    async fn test_evict_idle_drops_only_stale_sessions() {
        let store = SessionStore::default();
        let stale = store.insert(Session::new(ResumeDocument::default(), A4)).await;
        let fresh = store.insert(Session::new(ResumeDocument::default(), A4)).await;
        store
            .update(stale, |s| backdate(s, Duration::hours(2)))
            .await
            .unwrap();

        assert_eq!(store.evict_idle(Duration::hours(1)).await, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.read(stale, |s| s.id).await.is_err());
        assert_eq!(store.read(fresh, |s| s.id).await.unwrap(), fresh);
        assert_eq!(store.evict_idle(Duration::hours(1)).await, 0);
    }

    #[tokio::test]
    async fn test_evict_idle_skips_busy_session() {
        let store = SessionStore::default();
        let id = store.insert(Session::new(ResumeDocument::default(), A4)).await;
        store
            .update(id, |s| backdate(s, Duration::hours(2)))
            .await
            .unwrap();

        let handle = store.get(id).await.unwrap();
        let held = handle.lock().await;
        assert_eq!(store.evict_idle(Duration::hours(1)).await, 0);
        drop(held);
        assert_eq!(store.evict_idle(Duration::hours(1)).await, 1);
    }

    #[tokio::test]
    async fn test_busy_session_does_not_block_others() {
        let store = SessionStore::default();
        let busy = store.insert(Session::new(ResumeDocument::sample(), A4)).await;
        let other = store.insert(Session::new(ResumeDocument::sample(), A4)).await;

        let handle = store.get(busy).await.unwrap();
        let _held = handle.lock().await;

        let edit = store.update(other, |s| {
            s.resize(Viewport {
                sheet_height: Some(200.0),
            });
            Ok(s.autofit.committed())
        });
        let scale = tokio::time::timeout(std::time::Duration::from_secs(1), edit)
            .await
            .expect("edit on another session waited for the busy one")
            .unwrap();
        assert!(scale < 1.0);
        assert_eq!(store.len().await, 2);
    }
}
