use std::sync::RwLock;

use crate::models::AnalysisSession;

/// In-memory holder for the current analysis session.
///
/// State is ephemeral: one session per process, reset by starting a new
/// analysis. Readers get cloned snapshots, never live references, so
/// consumers cannot mutate aggregator state from the outside.
#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<AnalysisSession>,
}

impl SessionStore {
    /// Immutable snapshot of the current session.
    pub fn snapshot(&self) -> AnalysisSession {
        self.inner
            .read()
            .map(|session| session.clone())
            .unwrap_or_default()
    }

    /// Replace the whole session.
    pub fn replace(&self, session: AnalysisSession) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = session;
        }
    }

    /// Apply an in-place update to the session.
    pub fn update<F>(&self, apply: F)
    where
        F: FnOnce(&mut AnalysisSession),
    {
        if let Ok(mut guard) = self.inner.write() {
            apply(&mut guard);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_starts_empty() {
        let store = SessionStore::default();
        let session = store.snapshot();
        assert!(session.company_name.is_empty());
        assert!(session.results.is_empty());
        assert!(session.metrics.is_none());
    }

    #[test]
    fn replace_and_update_round_trip() {
        let store = SessionStore::default();
        store.replace(AnalysisSession {
            company_name: "Acme".to_string(),
            ..Default::default()
        });
        store.update(|session| session.description = "Meeting notes".to_string());

        let session = store.snapshot();
        assert_eq!(session.company_name, "Acme");
        assert_eq!(session.description, "Meeting notes");
    }

    #[test]
    fn snapshots_are_detached_copies() {
        let store = SessionStore::default();
        store.replace(AnalysisSession {
            company_name: "Acme".to_string(),
            ..Default::default()
        });

        let mut snapshot = store.snapshot();
        snapshot.company_name = "Mutated".to_string();

        assert_eq!(store.snapshot().company_name, "Acme");
    }
}
