//! In-process registry
//!
//! Holds frontends in a map behind a mutex and counts calls per operation.
//! Used to exercise the session and projection flows without a Robin server.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{FrontendRegistry, RegistryError};
use crate::domain::FrontendRecord;

#[derive(Debug, Default)]
pub struct MemoryRegistry {
    frontends: Mutex<HashMap<String, FrontendRecord>>,
    add_calls: AtomicUsize,
    remove_calls: AtomicUsize,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registry with existing frontends
    pub fn with_frontends<I>(frontends: I) -> Self
    where
        I: IntoIterator<Item = (String, FrontendRecord)>,
    {
        let registry = Self::new();
        registry.lock().extend(frontends);
        registry
    }

    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    pub fn remove_calls(&self) -> usize {
        self.remove_calls.load(Ordering::SeqCst)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, FrontendRecord>> {
        // A poisoned map is still a consistent map: every write is a single insert/remove.
        self.frontends.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl FrontendRegistry for MemoryRegistry {
    async fn add(&self, id: &str, record: &FrontendRecord) -> Result<(), RegistryError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        self.lock().insert(id.to_string(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<FrontendRecord, RegistryError> {
        self.lock().get(id).cloned().ok_or(RegistryError::NotFound)
    }

    async fn all(&self) -> Result<HashMap<String, FrontendRecord>, RegistryError> {
        Ok(self.lock().clone())
    }

    async fn remove(&self, id: &str) -> Result<(), RegistryError> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        self.lock().remove(id).map(|_| ()).ok_or(RegistryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FrontendMode, FrontendSelectorRecord};

    #[tokio::test]
    async fn test_add_then_get_returns_same_record() {
        let registry = MemoryRegistry::new();
        let record = FrontendRecord {
            service: "web".to_string(),
            mode: Some(FrontendMode::Tcp),
            backup: true,
            selectors: vec![
                FrontendSelectorRecord { domain: "a.com".into(), weight: 10, ..Default::default() },
                FrontendSelectorRecord { frontend_port: 8443, private: true, ..Default::default() },
            ],
            ..Default::default()
        };

        registry.add("web", &record).await.unwrap();
        assert_eq!(registry.get("web").await.unwrap(), record);
        assert_eq!(registry.add_calls(), 1);
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let registry = MemoryRegistry::new();
        let err = registry.remove("ghost").await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound));
        assert_eq!(registry.remove_calls(), 1);
    }

    #[tokio::test]
    async fn test_seeded_all() {
        let registry = MemoryRegistry::with_frontends(vec![
            ("a".to_string(), FrontendRecord::default()),
            ("b".to_string(), FrontendRecord::default()),
        ]);
        let all = registry.all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(registry.contains("a"));
        assert!(!registry.is_empty());
    }
}
