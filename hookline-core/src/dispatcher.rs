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

//! Dispatch with per-handler failure isolation.
//!
//! Handlers run one at a time, in registration order, on the invoking
//! thread. A failing handler is recorded and skipped; it never aborts the
//! remaining handlers and never surfaces as an error to the caller.

use crate::args::HookArgs;
use crate::config::HookConfig;
use crate::handlers::HookError;
use crate::registry::HookRegistry;
use serde_json::Value;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Identity and cause of one isolated handler failure, as handed to the
/// [`FailureReporter`].
#[derive(Debug)]
pub struct HandlerFailure<'a> {
    pub hook: &'a str,
    pub owner: &'a str,
    pub handler: &'a str,
    pub error: &'a HookError,
}

/// Sink for isolated handler failures.
///
/// Failures never propagate out of dispatch; they are handed here instead.
pub trait FailureReporter: Send + Sync {
    fn report(&self, failure: HandlerFailure<'_>);
}

/// Default reporter: emits a structured `tracing` error event per failure.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, failure: HandlerFailure<'_>) {
        tracing::error!(
            hook = %failure.hook,
            owner = %failure.owner,
            handler = %failure.handler,
            error = %failure.error,
            "hook handler failed"
        );
    }
}

/// Owned copy of a reported failure, as retained by [`CollectingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub hook: String,
    pub owner: String,
    pub handler: String,
    pub message: String,
}

/// Reporter that retains failures in memory, for tests and diagnostics.
#[derive(Default)]
pub struct CollectingReporter {
    failures: parking_lot::Mutex<Vec<FailureRecord>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return all recorded failures.
    pub fn take(&self) -> Vec<FailureRecord> {
        std::mem::take(&mut *self.failures.lock())
    }

    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }
}

impl FailureReporter for CollectingReporter {
    fn report(&self, failure: HandlerFailure<'_>) {
        self.failures.lock().push(FailureRecord {
            hook: failure.hook.to_string(),
            owner: failure.owner.to_string(),
            handler: failure.handler.to_string(),
            message: failure.error.to_string(),
        });
    }
}

/// Outcome of one handler within a dispatch.
#[derive(Debug)]
pub struct HandlerOutcome {
    pub owner: String,
    pub handler: String,
    pub result: Result<Value, HookError>,
}

/// Result of dispatching one hook invocation.
///
/// Outcomes appear in registration order, successes and failures both; the
/// success-only view is [`DispatchReport::into_values`].
#[derive(Debug)]
pub struct DispatchReport {
    pub hook: String,
    pub outcomes: Vec<HandlerOutcome>,
}

impl DispatchReport {
    /// Ordered success values; failed handlers leave no entry.
    pub fn into_values(self) -> Vec<Value> {
        self.outcomes
            .into_iter()
            .filter_map(|outcome| outcome.result.ok())
            .collect()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    pub fn all_successful(&self) -> bool {
        self.failure_count() == 0
    }
}

/// Dispatcher invoking all handlers for a hook name sequentially.
///
/// Multiple threads may dispatch concurrently through a shared dispatcher
/// while registrations occur; each dispatch reads the registry's current
/// sequence at entry.
pub struct HookDispatcher {
    registry: Arc<HookRegistry>,
    config: HookConfig,
    reporter: Arc<dyn FailureReporter>,
}

impl HookDispatcher {
    /// Create a dispatcher over `registry` reporting failures via
    /// [`TracingReporter`].
    pub fn new(registry: Arc<HookRegistry>, config: HookConfig) -> Self {
        Self {
            registry,
            config,
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Replace the failure reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn FailureReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &HookConfig {
        &self.config
    }

    /// Invoke all handlers for `hook_name` and return the ordered success
    /// values. An unknown hook name or all-failed dispatch yields an empty
    /// sequence, not an error.
    pub fn dispatch(&self, hook_name: &str, args: &HookArgs) -> Vec<Value> {
        self.dispatch_report(hook_name, args).into_values()
    }

    /// Invoke all handlers for `hook_name` and return the per-handler
    /// outcomes, failures included.
    pub fn dispatch_report(&self, hook_name: &str, args: &HookArgs) -> DispatchReport {
        let handlers = self.registry.handlers_for(hook_name);

        if self.config.trace_dispatch {
            tracing::debug!(
                hook = %hook_name,
                handler_count = handlers.len(),
                "dispatching hook"
            );
        }

        let mut outcomes = Vec::with_capacity(handlers.len());
        for registered in &handlers {
            let result = if self.config.catch_panics {
                match catch_unwind(AssertUnwindSafe(|| registered.target.invoke(args))) {
                    Ok(result) => result,
                    Err(payload) => Err(HookError::Panicked(panic_message(payload))),
                }
            } else {
                registered.target.invoke(args)
            };

            if let Err(error) = &result {
                self.reporter.report(HandlerFailure {
                    hook: hook_name,
                    owner: &registered.owner,
                    handler: registered.name(),
                    error,
                });
            }

            outcomes.push(HandlerOutcome {
                owner: registered.owner.clone(),
                handler: registered.name().to_string(),
                result,
            });
        }

        let report = DispatchReport {
            hook: hook_name.to_string(),
            outcomes,
        };

        if self.config.trace_dispatch {
            tracing::debug!(
                hook = %hook_name,
                success_count = report.success_count(),
                failure_count = report.failure_count(),
                "hook dispatch completed"
            );
        }

        report
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{FnHandler, NoOpHandler};
    use serde_json::json;

    fn dispatcher_with(registry: Arc<HookRegistry>) -> HookDispatcher {
        HookDispatcher::new(registry, HookConfig::default())
    }

    #[test]
    fn dispatch_unknown_hook_is_empty() {
        let registry = Arc::new(HookRegistry::new());
        let dispatcher = dispatcher_with(registry);
        assert!(dispatcher.dispatch("nobody.home", &HookArgs::new()).is_empty());
    }

    #[test]
    fn dispatch_preserves_registration_order() {
        let registry = Arc::new(HookRegistry::new());
        for i in 1..=3i64 {
            registry
                .register_callable(
                    "h",
                    "app",
                    FnHandler::new(format!("h{i}"), move |_args: &HookArgs| Ok(json!(i))),
                )
                .unwrap();
        }

        let dispatcher = dispatcher_with(registry);
        assert_eq!(
            dispatcher.dispatch("h", &HookArgs::new()),
            vec![json!(1), json!(2), json!(3)]
        );
    }

    #[test]
    fn failure_is_isolated_and_reported() {
        let registry = Arc::new(HookRegistry::new());
        registry
            .register_callable(
                "h",
                "flaky",
                FnHandler::new("boom", |_args: &HookArgs| Err(HookError::failed("boom"))),
            )
            .unwrap();
        registry
            .register_callable(
                "h",
                "steady",
                FnHandler::new("ok", |_args: &HookArgs| Ok(json!(7))),
            )
            .unwrap();

        let reporter = Arc::new(CollectingReporter::new());
        let dispatcher = dispatcher_with(registry).with_reporter(reporter.clone());

        let report = dispatcher.dispatch_report("h", &HookArgs::new());
        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failure_count(), 1);
        assert!(!report.all_successful());
        assert_eq!(report.into_values(), vec![json!(7)]);

        let failures = reporter.take();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].hook, "h");
        assert_eq!(failures[0].owner, "flaky");
        assert_eq!(failures[0].handler, "boom");
        assert!(failures[0].message.contains("boom"));
    }

    #[test]
    fn all_failed_dispatch_is_empty_not_error() {
        let registry = Arc::new(HookRegistry::new());
        registry
            .register_callable(
                "h",
                "app",
                FnHandler::new("f", |_args: &HookArgs| Err(HookError::failed("no"))),
            )
            .unwrap();

        let dispatcher =
            dispatcher_with(registry).with_reporter(Arc::new(CollectingReporter::new()));
        assert!(dispatcher.dispatch("h", &HookArgs::new()).is_empty());
    }

    #[test]
    fn panic_is_converted_to_failure() {
        let registry = Arc::new(HookRegistry::new());
        registry
            .register_callable(
                "h",
                "app",
                FnHandler::new("panicker", |_args: &HookArgs| panic!("handler blew up")),
            )
            .unwrap();
        registry
            .register_callable("h", "app", NoOpHandler::new("survivor"))
            .unwrap();

        let reporter = Arc::new(CollectingReporter::new());
        let dispatcher = dispatcher_with(registry).with_reporter(reporter.clone());

        let report = dispatcher.dispatch_report("h", &HookArgs::new());
        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failure_count(), 1);

        let failures = reporter.take();
        assert!(failures[0].message.contains("handler blew up"));
    }

    #[test]
    fn args_reach_every_handler() {
        let registry = Arc::new(HookRegistry::new());
        registry
            .register_callable(
                "h",
                "app",
                FnHandler::new("reader", |args: &HookArgs| {
                    Ok(args.get_named("k").cloned().unwrap_or(Value::Null))
                }),
            )
            .unwrap();

        let dispatcher = dispatcher_with(registry);
        let results = dispatcher.dispatch("h", &HookArgs::new().named("k", "v"));
        assert_eq!(results, vec![json!("v")]);
    }
}
