use std::sync::Arc;

use parking_lot::Mutex;

use super::module_image::HookFn;

/// External configuration system that takes ownership of the backend's
/// `configure` entry point. The plugin layer registers it but never calls it.
pub trait ConfigRegistrar: Send + Sync {
    fn add_configure_function(&self, configure: HookFn);

    /// Withdraw a hook previously added, matched by identity. Called when the
    /// module it belongs to is released.
    fn remove_configure_function(&self, configure: &HookFn);
}

/// Collects registered configure hooks so the configuration system can run
/// them once settings are available.
#[derive(Default)]
pub struct ConfigureHooks {
    hooks: Mutex<Vec<HookFn>>,
}

impl ConfigureHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.hooks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.lock().is_empty()
    }

    /// Invoke every registered hook in registration order.
    pub fn run_all(&self) {
        let hooks = self.hooks.lock().clone();
        for hook in hooks {
            hook();
        }
    }
}

impl ConfigRegistrar for ConfigureHooks {
    fn add_configure_function(&self, configure: HookFn) {
        self.hooks.lock().push(configure);
    }

    fn remove_configure_function(&self, configure: &HookFn) {
        self.hooks.lock().retain(|hook| !Arc::ptr_eq(hook, configure));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn registered_hooks_run_only_on_demand() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hooks = ConfigureHooks::new();

        let counter = Arc::clone(&calls);
        hooks.add_configure_function(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(hooks.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        hooks.run_all();
        hooks.run_all();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn removal_matches_by_identity() {
        let hooks = ConfigureHooks::new();
        let first: HookFn = Arc::new(|| {});
        let second: HookFn = Arc::new(|| {});
        hooks.add_configure_function(Arc::clone(&first));
        hooks.add_configure_function(Arc::clone(&second));

        hooks.remove_configure_function(&first);
        assert_eq!(hooks.len(), 1);
        assert_eq!(Arc::strong_count(&first), 1);

        hooks.remove_configure_function(&first);
        assert_eq!(hooks.len(), 1);
        hooks.remove_configure_function(&second);
        assert!(hooks.is_empty());
    }
}
