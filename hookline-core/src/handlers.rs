// Copyright 2025 Hookline Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Handler traits and the registration-target adapter.
//!
//! A registration target is normalized exactly once, at registration time,
//! into a [`HandlerTarget`]: either a shared callable or a factory that
//! builds a fresh handler instance per dispatch.

use crate::args::HookArgs;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Errors produced by a handler during dispatch.
///
/// The dispatcher isolates these: they are routed to the failure reporter
/// and never propagate to the invoking caller.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("handler execution failed: {0}")]
    ExecutionFailed(String),

    #[error("handler panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HookError {
    /// Shorthand for [`HookError::ExecutionFailed`] with a formatted message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::ExecutionFailed(message.into())
    }
}

/// A registered unit of behavior invoked when its hook name is dispatched.
pub trait HookHandler: Send + Sync {
    /// Invoke the handler with the dispatch-time arguments.
    fn call(&self, args: &HookArgs) -> Result<Value, HookError>;

    /// Handler identity used in reports and introspection.
    fn name(&self) -> &str;
}

/// Shared handler as stored in the registry.
pub type SharedHandler = Arc<dyn HookHandler>;

/// Builds a fresh handler instance for every dispatch.
///
/// Stateful handlers register through a factory: each invocation gets a new
/// instance, is called once, and the instance is dropped. No per-instance
/// state survives across dispatches.
pub trait HandlerFactory: Send + Sync {
    /// Build one instance for one invocation.
    fn make(&self) -> Box<dyn HookHandler>;

    /// Factory identity used in reports and introspection.
    fn name(&self) -> &str;
}

/// Registration target, resolved once at registration time.
#[derive(Clone)]
pub enum HandlerTarget {
    /// Plain callable; one shared instance invoked directly.
    Callable(SharedHandler),
    /// Instantiable handler; [`HandlerFactory::make`] runs on every dispatch.
    Factory(Arc<dyn HandlerFactory>),
}

impl HandlerTarget {
    /// Uniform invocation shape over both variants.
    pub fn invoke(&self, args: &HookArgs) -> Result<Value, HookError> {
        match self {
            HandlerTarget::Callable(handler) => handler.call(args),
            HandlerTarget::Factory(factory) => factory.make().call(args),
        }
    }

    /// Identity of the underlying handler or factory.
    pub fn name(&self) -> &str {
        match self {
            HandlerTarget::Callable(handler) => handler.name(),
            HandlerTarget::Factory(factory) => factory.name(),
        }
    }
}

/// Handler that wraps a plain closure.
pub struct FnHandler<F>
where
    F: Fn(&HookArgs) -> Result<Value, HookError> + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&HookArgs) -> Result<Value, HookError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> HookHandler for FnHandler<F>
where
    F: Fn(&HookArgs) -> Result<Value, HookError> + Send + Sync,
{
    fn call(&self, args: &HookArgs) -> Result<Value, HookError> {
        (self.func)(args)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Factory that builds instances through a closure.
pub struct FnFactory<F>
where
    F: Fn() -> Box<dyn HookHandler> + Send + Sync,
{
    name: String,
    build: F,
}

impl<F> FnFactory<F>
where
    F: Fn() -> Box<dyn HookHandler> + Send + Sync,
{
    pub fn new(name: impl Into<String>, build: F) -> Self {
        Self {
            name: name.into(),
            build,
        }
    }
}

impl<F> HandlerFactory for FnFactory<F>
where
    F: Fn() -> Box<dyn HookHandler> + Send + Sync,
{
    fn make(&self) -> Box<dyn HookHandler> {
        (self.build)()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A no-op handler for wiring tests.
pub struct NoOpHandler {
    name: String,
}

impl NoOpHandler {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl HookHandler for NoOpHandler {
    fn call(&self, _args: &HookArgs) -> Result<Value, HookError> {
        Ok(Value::Null)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Handler that logs its invocation (for debugging).
pub struct LoggingHandler {
    name: String,
}

impl LoggingHandler {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl HookHandler for LoggingHandler {
    fn call(&self, args: &HookArgs) -> Result<Value, HookError> {
        tracing::info!(
            handler = %self.name,
            positional = args.positional().len(),
            named = args.named_map().len(),
            "hook handler invoked"
        );
        Ok(Value::Null)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fn_handler_calls_through() {
        let handler = FnHandler::new("doubler", |args: &HookArgs| {
            let n = args.get(0).and_then(|v| v.as_i64()).unwrap_or(0);
            Ok(json!(n * 2))
        });

        let result = handler.call(&HookArgs::new().arg(21)).unwrap();
        assert_eq!(result, json!(42));
        assert_eq!(handler.name(), "doubler");
    }

    #[test]
    fn noop_handler_returns_null() {
        let handler = NoOpHandler::new("noop");
        assert_eq!(handler.call(&HookArgs::new()).unwrap(), Value::Null);
    }

    #[test]
    fn factory_target_builds_per_invocation() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static BUILT: AtomicUsize = AtomicUsize::new(0);

        let target = HandlerTarget::Factory(Arc::new(FnFactory::new("fresh", || {
            BUILT.fetch_add(1, Ordering::SeqCst);
            Box::new(NoOpHandler::new("fresh"))
        })));

        target.invoke(&HookArgs::new()).unwrap();
        target.invoke(&HookArgs::new()).unwrap();
        assert_eq!(BUILT.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn error_shorthand() {
        let err = HookError::failed("boom");
        assert!(matches!(err, HookError::ExecutionFailed(m) if m == "boom"));
    }
}
