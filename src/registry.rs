//! Named native functions callable across the GUI bridge.
//!
//! Callbacks take one structured value and return one. The registry is the
//! only place where a callback failure turns into data: an `Err` or a panic
//! inside a callback comes back as
//! `{"status": "error", "message": ..., "data": null}`.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{json, Value};
use tracing::warn;

/// A registered callback.
pub type RegisteredFunction = Arc<dyn Fn(&Value) -> anyhow::Result<Value> + Send + Sync>;

/// Name to callback map.
///
/// Cloning is cheap and every clone sees the same functions, so a callback
/// may itself hold a clone (to list or call other functions).
#[derive(Default, Clone)]
pub struct FunctionRegistry {
    functions: Arc<RwLock<HashMap<String, RegisteredFunction>>>,
}

/// The `{status, message, data}` shape used for failures.
pub fn error_value(message: impl Into<String>) -> Value {
    json!({
        "status": "error",
        "message": message.into(),
        "data": null,
    })
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `func` under `name`. A later registration of the same name
    /// replaces the earlier one.
    pub fn register<F>(&self, name: impl Into<String>, func: F)
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.write().insert(name.into(), Arc::new(func));
    }

    pub fn has(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Calls `name` with `args`. Never fails; see the module docs for the
    /// error shape.
    pub fn call(&self, name: &str, args: &Value) -> Value {
        // Released before invoking, so callbacks may use the registry
        let Some(func) = self.read().get(name).cloned() else {
            return error_value(format!("Function not found: {name}"));
        };

        match panic::catch_unwind(AssertUnwindSafe(|| func(args))) {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                warn!(function = name, error = %e, "Function returned an error");
                error_value(e.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(function = name, message = %message, "Function panicked");
                error_value(message)
            }
        }
    }
}

impl FunctionRegistry {
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, RegisteredFunction>> {
        self.functions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, RegisteredFunction>> {
        self.functions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "function panicked".to_string()
    }
}
