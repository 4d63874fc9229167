use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;

use crate::error::Result;
use crate::query::RawQuery;
use crate::store::ComponentStore;
use crate::system::AnySystem;

/// Observer invoked around each system's batch execution
///
/// Both callbacks are optional and receive the system together with its whole
/// matched batch, once per system run. They are never called for a system
/// whose selection is empty.
/// Components reached through `store` are live: writes made in
/// `before_system_update` are seen by the system about to run.
pub trait Hook: 'static {
    /// Get name for debugging
    fn name(&self) -> &str {
        "Hook"
    }

    /// Called before the system updates any entity
    /// Return error to stop the step
    fn before_system_update(
        &mut self,
        _system: &dyn AnySystem,
        _queries: &[RawQuery],
        _store: &mut ComponentStore,
    ) -> Result<()> {
        Ok(())
    }

    /// Called after the system updated every matched entity
    fn after_system_update(
        &mut self,
        _system: &dyn AnySystem,
        _queries: &[RawQuery],
        _store: &mut ComponentStore,
    ) -> Result<()> {
        Ok(())
    }
}

/// Registry that keeps hooks in registration order
#[derive(Default)]
pub struct HookRegistry {
    pub(crate) hooks: Vec<Box<dyn Hook>>,
}

impl HookRegistry {
    /// Create new registry
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Register hook
    pub fn register(&mut self, hook: Box<dyn Hook>) {
        self.hooks.push(hook);
    }

    /// Run every hook's `before_system_update`, in registration order
    pub fn before(
        &mut self,
        system: &dyn AnySystem,
        queries: &[RawQuery],
        store: &mut ComponentStore,
    ) -> Result<()> {
        for hook in &mut self.hooks {
            hook.before_system_update(system, queries, store)?;
        }
        Ok(())
    }

    /// Run every hook's `after_system_update`, in registration order
    pub fn after(
        &mut self,
        system: &dyn AnySystem,
        queries: &[RawQuery],
        store: &mut ComponentStore,
    ) -> Result<()> {
        for hook in &mut self.hooks {
            hook.after_system_update(system, queries, store)?;
        }
        Ok(())
    }

    /// Get number of registered hooks
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    pub fn hook_names(&self) -> Vec<&str> {
        self.hooks.iter().map(|hook| hook.name()).collect()
    }

    /// Clear all hooks
    pub fn clear(&mut self) {
        self.hooks.clear();
    }
}

/// Debug hook that logs every batch through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHook;

impl Hook for LoggingHook {
    fn name(&self) -> &str {
        "LoggingHook"
    }

    fn before_system_update(
        &mut self,
        system: &dyn AnySystem,
        queries: &[RawQuery],
        store: &mut ComponentStore,
    ) -> Result<()> {
        let name = system.name();
        tracing::info!(
            system = name,
            data = ?system.data_types(),
            matched = queries.len(),
            "system starting"
        );
        for query in queries {
            let names: Vec<&'static str> = query
                .components(store)
                .map(|components| components.iter().map(|c| (**c).component_name()).collect())
                .unwrap_or_default();
            tracing::debug!(system = name, entity = query.entity().id(), components = ?names);
        }
        Ok(())
    }

    fn after_system_update(
        &mut self,
        system: &dyn AnySystem,
        queries: &[RawQuery],
        store: &mut ComponentStore,
    ) -> Result<()> {
        let remaining = queries
            .iter()
            .filter(|query| store.exists(query.entity()))
            .count();
        tracing::info!(
            system = system.name(),
            matched = queries.len(),
            remaining,
            "system finished"
        );
        Ok(())
    }
}

/// Counters collected by [`StatisticsHook`]
#[derive(Debug, Clone, Default)]
pub struct HookStatistics {
    pub before_calls: u64,
    pub after_calls: u64,
    /// Sum of batch sizes seen by `before_system_update`
    pub queries_seen: u64,
    /// Batches observed per system name
    pub batches_by_system: AHashMap<String, u64>,
}

impl HookStatistics {
    /// Reset statistics
    pub fn reset(&mut self) {
        self.before_calls = 0;
        self.after_calls = 0;
        self.queries_seen = 0;
        self.batches_by_system.clear();
    }
}

/// Hook that counts invocations; keep the handle from [`StatisticsHook::stats`]
/// to read the counters after the hook is boxed into the runner.
#[derive(Debug, Clone, Default)]
pub struct StatisticsHook {
    stats: Arc<Mutex<HookStatistics>>,
}

impl StatisticsHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the counters
    pub fn stats(&self) -> Arc<Mutex<HookStatistics>> {
        Arc::clone(&self.stats)
    }
}

impl Hook for StatisticsHook {
    fn name(&self) -> &str {
        "StatisticsHook"
    }

    fn before_system_update(
        &mut self,
        system: &dyn AnySystem,
        queries: &[RawQuery],
        _store: &mut ComponentStore,
    ) -> Result<()> {
        let mut stats = self.stats.lock();
        stats.before_calls += 1;
        stats.queries_seen += queries.len() as u64;
        *stats
            .batches_by_system
            .entry(system.name().to_string())
            .or_insert(0) += 1;
        Ok(())
    }

    fn after_system_update(
        &mut self,
        _system: &dyn AnySystem,
        _queries: &[RawQuery],
        _store: &mut ComponentStore,
    ) -> Result<()> {
        self.stats.lock().after_calls += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::any::TypeId;

    use super::*;
    use crate::entity::Entity;
    use crate::error::EcsError;
    use crate::query::Query;
    use crate::system::System;

    struct Counter;
    impl System for Counter {
        type Data = (u32,);

        fn name(&self) -> &str {
            "Counter"
        }

        fn update(&mut self, _store: &mut ComponentStore, _query: &Query<(u32,)>) -> Result<()> {
            Ok(())
        }
    }

    struct Silent;
    impl Hook for Silent {}

    struct Failing;
    impl Hook for Failing {
        fn name(&self) -> &str {
            "Failing"
        }

        fn before_system_update(
            &mut self,
            system: &dyn AnySystem,
            _queries: &[RawQuery],
            _store: &mut ComponentStore,
        ) -> Result<()> {
            Err(EcsError::hook("Failing", format!("refused {}", system.name())))
        }
    }

    /// Remembers the requested types of every system it sees
    #[derive(Default)]
    struct DataRecorder {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl Hook for DataRecorder {
        fn before_system_update(
            &mut self,
            system: &dyn AnySystem,
            queries: &[RawQuery],
            _store: &mut ComponentStore,
        ) -> Result<()> {
            self.seen.lock().push(format!(
                "{}{:?}x{}",
                system.name(),
                system.data_types().as_slice(),
                queries.len()
            ));
            Ok(())
        }
    }

    fn counters() -> (ComponentStore, Vec<RawQuery>) {
        let mut store = ComponentStore::new();
        store.add(Entity::new(1), 1u32);
        store.add(Entity::new(2), 2u32);
        let queries = store.find_raw(&[TypeId::of::<u32>()]);
        (store, queries)
    }

    #[test]
    fn test_hook_registry_creation() {
        let registry = HookRegistry::new();
        assert_eq!(registry.hook_count(), 0);
    }

    #[test]
    fn test_hook_without_callbacks_is_noop() {
        let mut registry = HookRegistry::new();
        registry.register(Box::new(Silent));
        let mut store = ComponentStore::new();
        registry.before(&Counter, &[], &mut store).unwrap();
        registry.after(&Counter, &[], &mut store).unwrap();
        assert_eq!(registry.hook_names(), vec!["Hook"]);
    }

    #[test]
    fn test_hook_sees_system_data_types() {
        let recorder = DataRecorder::default();
        let seen = Arc::clone(&recorder.seen);

        let mut registry = HookRegistry::new();
        registry.register(Box::new(recorder));

        let (mut store, queries) = counters();
        registry.before(&Counter, &queries, &mut store).unwrap();

        assert_eq!(*seen.lock(), vec![r#"Counter["u32"]x2"#.to_string()]);
    }

    #[test]
    fn test_statistics_hook_counts() {
        let hook = StatisticsHook::new();
        let stats = hook.stats();

        let mut registry = HookRegistry::new();
        registry.register(Box::new(hook));

        let (mut store, queries) = counters();
        registry.before(&Counter, &queries, &mut store).unwrap();
        registry.after(&Counter, &queries, &mut store).unwrap();

        let stats = stats.lock();
        assert_eq!(stats.before_calls, 1);
        assert_eq!(stats.after_calls, 1);
        assert_eq!(stats.queries_seen, 2);
        assert_eq!(stats.batches_by_system.get("Counter"), Some(&1));
    }

    #[test]
    fn test_statistics_reset_clears_counters() {
        let hook = StatisticsHook::new();
        let stats = hook.stats();

        let mut registry = HookRegistry::new();
        registry.register(Box::new(hook));

        let (mut store, queries) = counters();
        registry.before(&Counter, &queries, &mut store).unwrap();
        stats.lock().reset();

        {
            let stats = stats.lock();
            assert_eq!(stats.before_calls, 0);
            assert_eq!(stats.queries_seen, 0);
            assert!(stats.batches_by_system.is_empty());
        }

        // The hook keeps counting into the same handle after a reset
        registry.after(&Counter, &queries, &mut store).unwrap();
        assert_eq!(stats.lock().after_calls, 1);
    }

    #[test]
    fn test_clear_removes_all_hooks() {
        let counting = StatisticsHook::new();
        let stats = counting.stats();

        let mut registry = HookRegistry::new();
        registry.register(Box::new(Failing));
        registry.register(Box::new(counting));
        assert_eq!(registry.hook_count(), 2);

        registry.clear();
        assert_eq!(registry.hook_count(), 0);
        assert!(registry.hook_names().is_empty());

        let mut store = ComponentStore::new();
        registry.before(&Counter, &[], &mut store).unwrap();
        assert_eq!(stats.lock().before_calls, 0);
    }

    #[test]
    fn test_failing_hook_stops_later_hooks() {
        let counting = StatisticsHook::new();
        let stats = counting.stats();

        let mut registry = HookRegistry::new();
        registry.register(Box::new(Failing));
        registry.register(Box::new(counting));

        let mut store = ComponentStore::new();
        let err = registry.before(&Counter, &[], &mut store).unwrap_err();
        assert_eq!(err, EcsError::hook("Failing", "refused Counter"));
        assert_eq!(stats.lock().before_calls, 0);
    }
}
