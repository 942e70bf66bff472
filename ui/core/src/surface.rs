//! Surface - the document the windows are drawn into
//!
//! The core never manipulates a DOM. It hands rendered markup and window
//! records to a [`Surface`], and receives user input back as
//! [`UiEvent`](crate::events::UiEvent)s.
//!
//! Insertion and restacking are synchronous so that registry updates and the
//! document change happen in the same step. Removal is asynchronous because
//! a surface may animate a window away before it is gone.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;

use crate::application::WindowRecord;
use crate::registry::WindowId;

/// Errors reported by a surface
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    /// The window is not present on the surface
    #[error("window {0} is not attached")]
    NotAttached(WindowId),

    /// The surface refused the operation
    #[error("surface rejected window {id}: {reason}")]
    Rejected {
        /// Window the operation targeted
        id: WindowId,
        /// Why the surface refused
        reason: String,
    },
}

/// Document bridge for application windows
#[async_trait]
pub trait Surface: Send + Sync {
    /// Insert or replace the markup for a window
    fn attach(&self, record: &WindowRecord, html: &str) -> Result<(), SurfaceError>;

    /// Apply a changed position, size or z-index
    fn update(&self, record: &WindowRecord);

    /// Remove a window, waiting for any exit animation
    async fn detach(&self, id: WindowId) -> Result<(), SurfaceError>;
}

/// A window as seen by the headless surface
#[derive(Clone, Debug, PartialEq)]
pub struct AttachedWindow {
    /// Latest record pushed for the window
    pub record: WindowRecord,
    /// Latest markup attached
    pub html: String,
}

/// Surface with no display, for tests and tooling
///
/// Keeps the latest markup and record of every attached window.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    windows: RwLock<HashMap<WindowId, AttachedWindow>>,
    detached: AtomicUsize,
}

impl HeadlessSurface {
    /// Create an empty surface
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of an attached window
    #[must_use]
    pub fn window(&self, id: WindowId) -> Option<AttachedWindow> {
        self.windows.read().get(&id).cloned()
    }

    /// Whether a window is currently attached
    #[must_use]
    pub fn is_attached(&self, id: WindowId) -> bool {
        self.windows.read().contains_key(&id)
    }

    /// IDs of attached windows, sorted
    #[must_use]
    pub fn attached_ids(&self) -> Vec<WindowId> {
        let mut ids: Vec<WindowId> = self.windows.read().keys().copied().collect();
        ids.sort();
        ids
    }

    /// Number of completed detaches
    #[must_use]
    pub fn detach_count(&self) -> usize {
        self.detached.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Surface for HeadlessSurface {
    fn attach(&self, record: &WindowRecord, html: &str) -> Result<(), SurfaceError> {
        self.windows.write().insert(
            record.id,
            AttachedWindow {
                record: record.clone(),
                html: html.to_string(),
            },
        );
        Ok(())
    }

    fn update(&self, record: &WindowRecord) {
        if let Some(window) = self.windows.write().get_mut(&record.id) {
            window.record = record.clone();
        }
    }

    async fn detach(&self, id: WindowId) -> Result<(), SurfaceError> {
        if self.windows.write().remove(&id).is_none() {
            return Err(SurfaceError::NotAttached(id));
        }
        self.detached.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{Position, Size};

    fn record(id: u64) -> WindowRecord {
        WindowRecord {
            id: WindowId::from_raw(id),
            z_index: Some(100),
            is_popped_out: true,
            size: Size::new(300, 200),
            position: Position::new(10, 20),
        }
    }

    #[tokio::test]
    async fn test_attach_update_detach() {
        let surface = HeadlessSurface::new();
        let mut rec = record(1);

        surface.attach(&rec, "<div>one</div>").unwrap();
        assert!(surface.is_attached(rec.id));

        rec.z_index = Some(101);
        surface.update(&rec);
        assert_eq!(surface.window(rec.id).unwrap().record.z_index, Some(101));

        surface.detach(rec.id).await.unwrap();
        assert!(!surface.is_attached(rec.id));
        assert_eq!(surface.detach_count(), 1);
    }

    #[tokio::test]
    async fn test_detach_unknown_window() {
        let surface = HeadlessSurface::new();
        let err = surface.detach(WindowId::from_raw(9)).await.unwrap_err();
        assert_eq!(err, SurfaceError::NotAttached(WindowId::from_raw(9)));
    }

    #[test]
    fn test_attach_replaces_markup() {
        let surface = HeadlessSurface::new();
        let rec = record(2);
        surface.attach(&rec, "first").unwrap();
        surface.attach(&rec, "second").unwrap();
        assert_eq!(surface.window(rec.id).unwrap().html, "second");
        assert_eq!(surface.attached_ids(), vec![rec.id]);
    }
}
