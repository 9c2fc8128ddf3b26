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

//! Top-level facade combining registry, dispatcher, and aggregation.

use crate::aggregate::AggregationError;
use crate::args::HookArgs;
use crate::config::HookConfig;
use crate::dispatcher::{DispatchReport, FailureReporter, HookDispatcher};
use crate::handlers::{FnHandler, HandlerFactory, HookError, HookHandler};
use crate::registry::{HookImplementation, HookRegistry, RegisteredHandler, RegistrationError};
use serde_json::Value;
use std::sync::Arc;

/// Owned registry + dispatcher pair exposing the public hook surface.
///
/// Construct one per application, or one per test; there is no
/// process-global instance. Registration is expected at startup but is
/// tolerated at any time: a handler registered after earlier invocations
/// participates from the next invocation on.
pub struct HookSystem {
    registry: Arc<HookRegistry>,
    dispatcher: HookDispatcher,
}

impl Default for HookSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl HookSystem {
    /// Create a hook system with the default configuration.
    pub fn new() -> Self {
        Self::with_config(HookConfig::default())
    }

    /// Create a hook system with an explicit configuration.
    pub fn with_config(config: HookConfig) -> Self {
        let registry = Arc::new(HookRegistry::new());
        let dispatcher = HookDispatcher::new(Arc::clone(&registry), config);
        Self {
            registry,
            dispatcher,
        }
    }

    /// Replace the failure reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn FailureReporter>) -> Self {
        self.dispatcher = self.dispatcher.with_reporter(reporter);
        self
    }

    /// Explicit registration of a pre-normalized handler.
    pub fn register(
        &self,
        hook_name: &str,
        handler: RegisteredHandler,
    ) -> Result<(), RegistrationError> {
        self.registry.register(hook_name, handler)
    }

    /// Register a plain closure under `hook_name`.
    ///
    /// This is the decorator-equivalent sugar over [`HookSystem::register`].
    pub fn register_fn<F>(
        &self,
        hook_name: &str,
        owner: &str,
        handler_name: &str,
        func: F,
    ) -> Result<(), RegistrationError>
    where
        F: Fn(&HookArgs) -> Result<Value, HookError> + Send + Sync + 'static,
    {
        self.registry
            .register_callable(hook_name, owner, FnHandler::new(handler_name, func))
    }

    /// Register a handler object invoked through one shared instance.
    pub fn register_handler(
        &self,
        hook_name: &str,
        owner: &str,
        handler: impl HookHandler + 'static,
    ) -> Result<(), RegistrationError> {
        self.registry.register_callable(hook_name, owner, handler)
    }

    /// Register a factory whose handler is instantiated fresh per dispatch.
    pub fn register_factory(
        &self,
        hook_name: &str,
        owner: &str,
        factory: impl HandlerFactory + 'static,
    ) -> Result<(), RegistrationError> {
        self.registry.register_factory(hook_name, owner, factory)
    }

    /// Invoke all handlers for `hook_name` and return the ordered success
    /// values. Failing handlers are isolated, reported, and leave no entry.
    pub fn invoke(&self, hook_name: &str, args: &HookArgs) -> Vec<Value> {
        self.dispatcher.dispatch(hook_name, args)
    }

    /// Invoke all handlers and return per-handler outcomes, failures
    /// included. Use this when "did every handler succeed" matters.
    pub fn invoke_report(&self, hook_name: &str, args: &HookArgs) -> DispatchReport {
        self.dispatcher.dispatch_report(hook_name, args)
    }

    /// Invoke all handlers and combine the success values through
    /// `aggregator`. Aggregation errors propagate to the caller.
    pub fn invoke_aggregate<A>(
        &self,
        hook_name: &str,
        aggregator: A,
        args: &HookArgs,
    ) -> Result<Value, AggregationError>
    where
        A: FnOnce(Vec<Value>) -> Result<Value, AggregationError>,
    {
        aggregator(self.dispatcher.dispatch(hook_name, args))
    }

    /// Introspection: (owner, handler identity) pairs for `hook_name`.
    pub fn implementations(&self, hook_name: &str) -> Vec<HookImplementation> {
        self.registry.implementations(hook_name)
    }

    /// All hook names with at least one registration.
    pub fn hook_names(&self) -> Vec<String> {
        self.registry.hook_names()
    }

    /// Remove every registration. Intended for test teardown.
    pub fn clear(&self) {
        self.registry.clear();
    }

    /// The underlying registry, for sharing with a separately constructed
    /// dispatcher or for direct registration.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    /// The active configuration.
    pub fn config(&self) -> &HookConfig {
        self.dispatcher.config()
    }
}
