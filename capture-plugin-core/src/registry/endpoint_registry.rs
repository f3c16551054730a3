use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::endpoint::port::{CapturePort, CapturePortFactory};
use crate::traits::capture_endpoint::{CaptureEndpoint, EndpointFactory};

/// Key → endpoint mapping with atomic get-or-create.
///
/// Lookups of existing endpoints take only a shared read lock, so routing to
/// established endpoints never serializes unrelated keys. The write lock is
/// held only while inserting a new endpoint, and the factory runs under it so
/// that exactly one endpoint is ever created per key.
///
/// The registry never removes endpoints on its own; `remove` is for the
/// collaborator that reaps idle endpoints.
pub struct EndpointRegistry<E: ?Sized = dyn CaptureEndpoint> {
    endpoints: RwLock<HashMap<String, Arc<E>>>,
    factory: Box<dyn EndpointFactory<E>>,
}

impl<E: CaptureEndpoint + ?Sized> EndpointRegistry<E> {
    pub fn new(factory: impl EndpointFactory<E> + 'static) -> Self {
        Self {
            endpoints: RwLock::new(HashMap::new()),
            factory: Box::new(factory),
        }
    }

    /// Return the endpoint for `key`, creating it on first reference.
    pub fn get_or_create(&self, key: &str) -> Arc<E> {
        if let Some(endpoint) = self.endpoints.read().get(key) {
            return Arc::clone(endpoint);
        }

        let mut endpoints = self.endpoints.write();
        // Another thread may have inserted between the two locks.
        let endpoint = endpoints.entry(key.to_owned()).or_insert_with(|| {
            log::debug!("creating capture endpoint {}", key);
            self.factory.create(key)
        });
        Arc::clone(endpoint)
    }

    pub fn get(&self, key: &str) -> Option<Arc<E>> {
        self.endpoints.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.endpoints.read().contains_key(key)
    }

    /// Drop the registry's reference to `key`'s endpoint.
    pub fn remove(&self, key: &str) -> Option<Arc<E>> {
        let removed = self.endpoints.write().remove(key);
        if removed.is_some() {
            log::debug!("removed capture endpoint {}", key);
        }
        removed
    }

    pub fn keys(&self) -> Vec<String> {
        self.endpoints.read().keys().cloned().collect()
    }

    /// Snapshot of all current endpoints.
    pub fn endpoints(&self) -> Vec<Arc<E>> {
        self.endpoints.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.endpoints.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.read().is_empty()
    }
}

impl EndpointRegistry<CapturePort> {
    /// Registry of default `CapturePort`s buffering up to `capacity` items each.
    pub fn with_capture_ports(capacity: usize) -> Self {
        Self::new(CapturePortFactory::new(capacity))
    }
}
