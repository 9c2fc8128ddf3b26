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

//! Name-keyed registry of ordered handler sequences.

use crate::handlers::{HandlerFactory, HandlerTarget, HookHandler};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced synchronously to the registering caller.
///
/// A failed registration is fatal to that registration only; previously
/// registered handlers are unaffected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("hook name must not be empty")]
    EmptyHookName,

    #[error("handler name must not be empty")]
    EmptyHandlerName,
}

/// A handler registered under a hook name, tagged with its owner.
#[derive(Clone)]
pub struct RegisteredHandler {
    /// Registering namespace. Introspection only; never affects dispatch
    /// order, which is registration order.
    pub owner: String,
    /// Invocation target resolved at registration time.
    pub target: HandlerTarget,
}

impl RegisteredHandler {
    pub fn new(owner: impl Into<String>, target: HandlerTarget) -> Self {
        Self {
            owner: owner.into(),
            target,
        }
    }

    /// Identity of the underlying handler or factory.
    pub fn name(&self) -> &str {
        self.target.name()
    }
}

/// Introspection record for one registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookImplementation {
    pub owner: String,
    pub handler: String,
}

/// Registry mapping hook names to ordered handler sequences.
///
/// Insertion order is preserved per hook name and is the dispatch order.
/// Duplicate registrations of the same target are allowed; both execute.
///
/// Reads clone the current sequence out under the shard lock, so a dispatch
/// racing a registration observes the sequence either before or after the
/// append, never a partially updated one. Late registration is therefore
/// visible to the next dispatch, not a cached snapshot.
pub struct HookRegistry {
    hooks: DashMap<String, Vec<RegisteredHandler>>,
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            hooks: DashMap::new(),
        }
    }

    /// Append a handler to the sequence for `hook_name`, creating the
    /// sequence if absent.
    pub fn register(
        &self,
        hook_name: &str,
        handler: RegisteredHandler,
    ) -> Result<(), RegistrationError> {
        if hook_name.is_empty() {
            return Err(RegistrationError::EmptyHookName);
        }
        if handler.name().is_empty() {
            return Err(RegistrationError::EmptyHandlerName);
        }

        self.hooks
            .entry(hook_name.to_string())
            .or_default()
            .push(handler);
        Ok(())
    }

    /// Register a plain callable handler.
    pub fn register_callable(
        &self,
        hook_name: &str,
        owner: &str,
        handler: impl HookHandler + 'static,
    ) -> Result<(), RegistrationError> {
        self.register(
            hook_name,
            RegisteredHandler::new(owner, HandlerTarget::Callable(Arc::new(handler))),
        )
    }

    /// Register a factory-backed handler, instantiated fresh per dispatch.
    pub fn register_factory(
        &self,
        hook_name: &str,
        owner: &str,
        factory: impl HandlerFactory + 'static,
    ) -> Result<(), RegistrationError> {
        self.register(
            hook_name,
            RegisteredHandler::new(owner, HandlerTarget::Factory(Arc::new(factory))),
        )
    }

    /// Current handler sequence for `hook_name`, in registration order.
    ///
    /// Unknown names yield an empty sequence, not an error; invoking a hook
    /// no one implements is a valid no-op.
    pub fn handlers_for(&self, hook_name: &str) -> Vec<RegisteredHandler> {
        self.hooks
            .get(hook_name)
            .map(|handlers| handlers.value().clone())
            .unwrap_or_default()
    }

    /// Introspection: (owner, handler identity) pairs in registration order.
    pub fn implementations(&self, hook_name: &str) -> Vec<HookImplementation> {
        self.hooks
            .get(hook_name)
            .map(|handlers| {
                handlers
                    .iter()
                    .map(|h| HookImplementation {
                        owner: h.owner.clone(),
                        handler: h.name().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All hook names with at least one registration.
    pub fn hook_names(&self) -> Vec<String> {
        self.hooks.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of handlers registered under `hook_name`.
    pub fn handler_count(&self, hook_name: &str) -> usize {
        self.hooks.get(hook_name).map(|h| h.len()).unwrap_or(0)
    }

    /// True when no hook has any registration.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Remove every registration. Intended for test teardown.
    pub fn clear(&self) {
        self.hooks.clear();
    }
}
