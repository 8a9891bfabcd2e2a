//! Conditions and their predicates
//!
//! A condition is registered for one hook category and decides, from the
//! hook's captured context, whether it is satisfied. Predicates are
//! either built-in target matchers, native closures, or Lua expressions.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use mlua::{HookTriggers, Lua, LuaOptions, StdLib, Value, VmState};

use super::hook::{HookCategory, HookContext};
use crate::error::EvalError;

/// Native predicate over a hook context
pub type NativePredicate =
    Arc<dyn Fn(&HookContext<'_>) -> Result<bool, EvalError> + Send + Sync>;

/// What a condition checks
#[derive(Clone)]
pub enum Predicate {
    /// Event target (touch action, NPC name, or location for clock ticks)
    /// equals `target`; optionally the event must happen in `location`
    Target {
        target: String,
        location: Option<String>,
    },
    /// Lua expression evaluated with the context exposed as globals
    Script(String),
    /// Native closure
    Native(NativePredicate),
    /// Every inner predicate must hold (evaluated in order, stops at first false)
    All(Vec<Predicate>),
}

impl Predicate {
    pub fn target(target: impl Into<String>) -> Self {
        Predicate::Target {
            target: target.into(),
            location: None,
        }
    }

    pub fn native<F>(f: F) -> Self
    where
        F: Fn(&HookContext<'_>) -> Result<bool, EvalError> + Send + Sync + 'static,
    {
        Predicate::Native(Arc::new(f))
    }

    fn evaluate(&self, context: &HookContext<'_>, scripts: &ScriptEngine) -> Result<bool, EvalError> {
        match self {
            Predicate::Target { target, location } => Ok(context.target() == target
                && location.as_deref().map_or(true, |loc| context.location() == loc)),
            Predicate::Script(source) => scripts.evaluate(source, context),
            Predicate::Native(f) => f(context),
            Predicate::All(predicates) => {
                for predicate in predicates {
                    if !predicate.evaluate(context, scripts)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Target { target, location } => f
                .debug_struct("Target")
                .field("target", target)
                .field("location", location)
                .finish(),
            Predicate::Script(source) => f.debug_tuple("Script").field(source).finish(),
            Predicate::Native(_) => f.write_str("Native(..)"),
            Predicate::All(predicates) => f.debug_tuple("All").field(predicates).finish(),
        }
    }
}

/// A predicate registered for one hook category
#[derive(Debug, Clone)]
pub struct Condition {
    pub id: String,
    pub category: HookCategory,
    /// Quest this condition can offer, if any
    pub quest: Option<String>,
    pub predicate: Predicate,
}

impl Condition {
    pub fn new(id: impl Into<String>, category: HookCategory, predicate: Predicate) -> Self {
        Self {
            id: id.into(),
            category,
            quest: None,
            predicate,
        }
    }

    pub fn for_quest(mut self, quest: impl Into<String>) -> Self {
        self.quest = Some(quest.into());
        self
    }

    /// Evaluate the predicate, turning a panic into an error
    pub fn evaluate(&self, context: &HookContext<'_>, scripts: &ScriptEngine) -> Result<bool, EvalError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.predicate.evaluate(context, scripts)))
            .unwrap_or_else(|payload| {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(EvalError::Panicked(reason))
            })
    }
}

/// Instructions between budget checks
const BUDGET_STEP: u32 = 1_000;
/// Budget checks one condition may pass before it is aborted
const MAX_BUDGET_STEPS: u32 = 1_000;

/// Sandboxed Lua state used for script predicates.
///
/// Only the table, string and math libraries are loaded, and every
/// evaluation runs under an instruction budget.
pub struct ScriptEngine {
    lua: Lua,
    steps: Arc<AtomicU32>,
}

impl ScriptEngine {
    pub fn new() -> mlua::Result<Self> {
        let lua = Lua::new_with(StdLib::TABLE | StdLib::STRING | StdLib::MATH, LuaOptions::default())?;
        {
            let globals = lua.globals();
            for name in ["load", "loadstring", "loadfile", "dofile", "require", "collectgarbage"] {
                globals.set(name, Value::Nil)?;
            }
        }

        let steps = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&steps);
        lua.set_hook(
            HookTriggers::new().every_nth_instruction(BUDGET_STEP),
            move |_lua, _debug| {
                if counter.fetch_add(1, Ordering::Relaxed) >= MAX_BUDGET_STEPS {
                    return Err(mlua::Error::runtime("condition exceeded its instruction budget"));
                }
                Ok(VmState::Continue)
            },
        );

        Ok(Self { lua, steps })
    }

    /// Evaluate `source` as a boolean expression against the context.
    ///
    /// Every context global is rewritten before evaluation so fields from
    /// another category never leak into this one.
    pub fn evaluate(&self, source: &str, context: &HookContext<'_>) -> Result<bool, EvalError> {
        self.steps.store(0, Ordering::Relaxed);

        let globals = self.lua.globals();
        globals.set("category", context.category().as_str())?;
        globals.set("location", context.location())?;
        globals.set("player", context.player())?;

        let (x, y, action, npc, time, day) = match context {
            HookContext::Tile(ctx) => (
                Some(ctx.position.x),
                Some(ctx.position.y),
                Some(ctx.action.as_str()),
                None,
                None,
                None,
            ),
            HookContext::Npc(ctx) => (None, None, None, Some(ctx.npc.as_str()), None, None),
            HookContext::Time(ctx) => (None, None, None, None, Some(ctx.time), Some(ctx.day)),
        };
        globals.set("x", x)?;
        globals.set("y", y)?;
        globals.set("action", action)?;
        globals.set("npc", npc)?;
        globals.set("time", time)?;
        globals.set("day", day)?;

        let result = self
            .lua
            .load(format!("return ({})", source))
            .set_name("condition")
            .eval::<bool>()?;
        Ok(result)
    }
}

impl fmt::Debug for ScriptEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScriptEngine")
    }
}
