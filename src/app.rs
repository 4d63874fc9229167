use tracing::warn;

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::component::{Bundle, Component};
use crate::config::AppConfig;
use crate::entity::Entity;
use crate::error::{EcsError, Result};
use crate::hook::{Hook, HookRegistry};
use crate::schedule::{same_schedule, schedule_sequence, ScheduleRef};
use crate::store::ComponentStore;
use crate::system::{BoxedSystem, System, SystemId};

// Per-step chatter goes to `debug` when `log_steps` is set, `trace` otherwise
macro_rules! step_event {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::debug!($($arg)+)
        } else {
            tracing::trace!($($arg)+)
        }
    };
}

/// Position of the schedule cursor
#[derive(Debug, Clone)]
pub enum RunState {
    /// No schedule has been entered yet
    NotStarted,
    /// Executing the given schedule
    Active(ScheduleRef),
    /// Every schedule has been left. Terminal until [`App::reset_schedule`].
    Finished,
}

impl RunState {
    pub fn is_finished(&self) -> bool {
        matches!(self, RunState::Finished)
    }
}

/// A system bound to the schedule it was registered under
struct SystemEntry {
    schedule: ScheduleRef,
    system: BoxedSystem,
}

/// Main application entry point
///
/// Owns the component store, the registered systems and hooks, and the
/// schedule cursor.
pub struct App {
    store: ComponentStore,
    systems: Vec<SystemEntry>,
    hooks: HookRegistry,
    state: RunState,
    /// Next auto-assigned id candidate; `None` once `u64::MAX` was handed out
    next_entity_id: Option<u64>,
    config: AppConfig,
}

impl App {
    /// Create new application
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            store: ComponentStore::new(),
            systems: Vec::new(),
            hooks: HookRegistry::new(),
            state: RunState::NotStarted,
            next_entity_id: Some(config.first_entity_id),
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Register an entity with its components
    ///
    /// `None` asks for the next free sequential id. Reusing an id that is
    /// already in the store fails with [`EcsError::DuplicateEntity`] and
    /// leaves the store untouched. Once `u64::MAX` has been handed out, auto
    /// ids fail with [`EcsError::EntityIdsExhausted`].
    pub fn spawn(
        &mut self,
        id: Option<u64>,
        components: Vec<Box<dyn Component>>,
    ) -> Result<Entity> {
        let entity = match id {
            Some(id) => {
                let entity = Entity::new(id);
                if self.store.exists(entity) {
                    return Err(EcsError::DuplicateEntity(entity));
                }
                entity
            }
            None => self.allocate_entity()?,
        };

        step_event!(
            self.config.log_steps,
            entity = entity.id(),
            components = components.len(),
            "spawned entity"
        );
        self.store.add_all(entity, components);
        Ok(entity)
    }

    /// Register an entity from a tuple of components
    pub fn spawn_bundle<B: Bundle>(&mut self, id: Option<u64>, bundle: B) -> Result<Entity> {
        self.spawn(id, bundle.into_components())
    }

    fn allocate_entity(&mut self) -> Result<Entity> {
        let mut candidate = self.next_entity_id.ok_or(EcsError::EntityIdsExhausted)?;
        while self.store.exists(Entity::new(candidate)) {
            candidate = candidate
                .checked_add(1)
                .ok_or(EcsError::EntityIdsExhausted)?;
        }
        self.next_entity_id = candidate.checked_add(1);
        Ok(Entity::new(candidate))
    }

    /// Add a system under `schedule`
    ///
    /// The factory receives the shared store and builds the system.
    pub fn add_system<S, F>(&mut self, schedule: &ScheduleRef, factory: F) -> &mut Self
    where
        S: System,
        F: FnOnce(&ComponentStore) -> S,
    {
        let system = factory(&self.store);
        let name = System::name(&system);
        step_event!(
            self.config.log_steps,
            system = name,
            schedule = schedule.name(),
            "registered system"
        );
        self.systems.push(SystemEntry {
            schedule: ScheduleRef::clone(schedule),
            system: Box::new(system),
        });
        self
    }

    /// Add a hook; hooks run in registration order
    pub fn add_hook<H: Hook>(&mut self, hook: H) -> &mut Self {
        self.hooks.register(Box::new(hook));
        self
    }

    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ComponentStore {
        &mut self.store
    }

    /// Total number of registered systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.hook_count()
    }

    /// Ids of the systems registered under `schedule`, in registration order
    pub fn systems_in(&self, schedule: &ScheduleRef) -> Vec<SystemId> {
        self.systems
            .iter()
            .enumerate()
            .filter(|(_, entry)| same_schedule(&entry.schedule, schedule))
            .map(|(index, _)| SystemId(index as u32))
            .collect()
    }

    pub fn system_name(&self, id: SystemId) -> Option<&str> {
        self.systems
            .get(id.0 as usize)
            .map(|entry| entry.system.name())
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Schedule under the cursor, if any
    pub fn current_schedule(&self) -> Option<&ScheduleRef> {
        match &self.state {
            RunState::Active(schedule) => Some(schedule),
            _ => None,
        }
    }

    /// Move the cursor to the next schedule
    ///
    /// From `NotStarted` this enters the lowest-order schedule referenced by
    /// any system; from `Active` it enters the following one, or `Finished`
    /// when none remains. `Finished` stays `Finished`.
    pub fn advance_schedule(&mut self) -> Result<Option<ScheduleRef>> {
        if self.systems.is_empty() {
            return Err(EcsError::NoSystemsRegistered);
        }

        let sequence = schedule_sequence(self.systems.iter().map(|entry| &entry.schedule));
        let next = match &self.state {
            RunState::NotStarted => sequence.first().cloned(),
            RunState::Active(current) => sequence
                .iter()
                .position(|schedule| same_schedule(schedule, current))
                .and_then(|index| sequence.get(index + 1))
                .cloned(),
            RunState::Finished => {
                warn!("advance_schedule called after every schedule finished; call reset_schedule to replay");
                None
            }
        };

        match &next {
            Some(schedule) => {
                step_event!(
                    self.config.log_steps,
                    schedule = schedule.name(),
                    order = schedule.order(),
                    "entering schedule"
                );
                self.state = RunState::Active(ScheduleRef::clone(schedule));
            }
            None => {
                step_event!(self.config.log_steps, "all schedules finished");
                self.state = RunState::Finished;
            }
        }
        Ok(next)
    }

    /// Return the cursor to `NotStarted` so the sequence can be replayed
    pub fn reset_schedule(&mut self) {
        self.state = RunState::NotStarted;
    }

    /// Run every system registered under `schedule` once
    ///
    /// Systems go in registration order. For each one with a non-empty
    /// selection: every hook's `before_system_update`, then `update` per
    /// query, then every hook's `after_system_update`. The first error stops
    /// the step and is returned.
    pub fn step(&mut self, schedule: &ScheduleRef) -> Result<()> {
        #[cfg(feature = "profiling")]
        let span = info_span!("app.step", schedule = schedule.name());
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        let verbose = self.config.log_steps;
        let Self {
            store,
            systems,
            hooks,
            ..
        } = self;

        for entry in systems
            .iter_mut()
            .filter(|entry| same_schedule(&entry.schedule, schedule))
        {
            let queries = entry.system.select_raw(store);
            let name = entry.system.name().to_string();
            if queries.is_empty() {
                step_event!(verbose, system = %name, "no matches, skipping");
                continue;
            }

            #[cfg(feature = "profiling")]
            let system_span = info_span!("system", system = %name, matched = queries.len());
            #[cfg(feature = "profiling")]
            let _system_guard = system_span.enter();

            step_event!(verbose, system = %name, matched = queries.len(), "running system");
            hooks.before(&*entry.system, &queries, store)?;
            for query in &queries {
                tracing::trace!(system = %name, entity = query.entity().id(), "update");
                entry.system.update_raw(store, query)?;
            }
            hooks.after(&*entry.system, &queries, store)?;
        }
        Ok(())
    }

    /// Drive every schedule to completion
    ///
    /// Repeats the current schedule while its predicate holds, then advances.
    /// Returns once the cursor reaches `Finished`.
    pub fn run(&mut self) -> Result<()> {
        self.advance_schedule()?;
        while let Some(schedule) = self.current_schedule().cloned() {
            if schedule.should_run() {
                self.step(&schedule)?;
            } else {
                self.advance_schedule()?;
            }
        }
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
