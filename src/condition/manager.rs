//! Condition Manager
//!
//! Owns the hook registry and the conditions interested in each category.
//! The event source reports raw events here; the manager updates the
//! matching hook and returns every condition the event satisfied.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use super::hook::{Hook, HookCategory, HookContext, RawEvent};
use super::predicate::{Condition, ScriptEngine};
use crate::error::{EngineError, Result};

/// Hook plus the conditions registered for its category
struct Observer {
    hook: Option<Hook>,
    conditions: Vec<Condition>,
}

impl Observer {
    fn empty() -> Self {
        Self {
            hook: None,
            conditions: Vec::new(),
        }
    }
}

/// A condition satisfied by the latest event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionMatch {
    pub condition_id: String,
    pub quest: Option<String>,
}

pub struct ConditionManager {
    observers: HashMap<HookCategory, Observer>,
    scripts: ScriptEngine,
}

impl ConditionManager {
    pub fn new() -> Result<Self> {
        Ok(Self {
            observers: HashMap::new(),
            scripts: ScriptEngine::new()?,
        })
    }

    /// Register the hook for its category. Each category takes one hook.
    pub fn register_hook(&mut self, hook: Hook) -> Result<()> {
        let category = hook.category();
        let observer = self.observers.entry(category).or_insert_with(Observer::empty);

        if observer.hook.is_some() {
            return Err(EngineError::DuplicateHook(category));
        }

        observer.hook = Some(hook);
        info!("Registered {} hook", category);
        Ok(())
    }

    pub fn has_hook(&self, category: HookCategory) -> bool {
        self.observers
            .get(&category)
            .map_or(false, |o| o.hook.is_some())
    }

    /// Append a condition to its category. Evaluation follows registration order.
    pub fn register_condition(&mut self, condition: Condition) {
        debug!("Registered condition '{}' for {}", condition.id, condition.category);
        self.observers
            .entry(condition.category)
            .or_insert_with(Observer::empty)
            .conditions
            .push(condition);
    }

    /// Drop every condition the filter selects, keeping the order of the rest
    pub fn remove_conditions<F>(&mut self, mut filter: F) -> usize
    where
        F: FnMut(&Condition) -> bool,
    {
        let mut removed = 0;
        for observer in self.observers.values_mut() {
            let before = observer.conditions.len();
            observer.conditions.retain(|c| !filter(c));
            removed += before - observer.conditions.len();
        }
        removed
    }

    pub fn conditions(&self, category: HookCategory) -> &[Condition] {
        self.observers
            .get(&category)
            .map(|o| o.conditions.as_slice())
            .unwrap_or(&[])
    }

    /// Capture the event into its hook and observe.
    ///
    /// Events for categories without a registered hook are ignored.
    pub fn notify(&mut self, event: RawEvent) -> Vec<ConditionMatch> {
        let category = event.category();
        let Some(observer) = self.observers.get_mut(&category) else {
            debug!("No hook registered for {} events, ignoring", category);
            return Vec::new();
        };
        let Some(hook) = observer.hook.as_mut() else {
            debug!("No hook registered for {} events, ignoring", category);
            return Vec::new();
        };

        if !hook.capture(event) {
            return Vec::new();
        }

        hook.observe(&observer.conditions, &self.scripts)
            .into_iter()
            .map(|index| {
                let condition = &observer.conditions[index];
                ConditionMatch {
                    condition_id: condition.id.clone(),
                    quest: condition.quest.clone(),
                }
            })
            .collect()
    }

    /// Context captured by the category's hook from the latest event
    pub fn context(&self, category: HookCategory) -> Option<HookContext<'_>> {
        self.observers
            .get(&category)
            .and_then(|o| o.hook.as_ref())
            .and_then(|h| h.context())
    }
}
