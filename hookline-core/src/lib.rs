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

//! Hookline: an in-process, name-keyed hook registry.
//!
//! Application modules register handlers under a symbolic hook name; callers
//! later invoke every handler registered under that name and receive either
//! the raw ordered list of per-handler results or one value produced by an
//! aggregation strategy.
//!
//! # Design
//!
//! - **Failure isolation**: one failing (or panicking) handler never
//!   prevents the others from running and never corrupts the aggregate.
//!   Failures are routed to a [`FailureReporter`]; the default logs through
//!   `tracing`.
//! - **Ordering**: registration order is dispatch order; successes come
//!   back in exactly that order, failed handlers leave no entry.
//! - **No global state**: a [`HookSystem`] is an explicit owned instance,
//!   so tests construct their own instead of mutating shared process state.
//! - **Concurrency**: dispatch is sequential on the invoking thread, but
//!   many threads may dispatch concurrently while registrations occur; the
//!   registry's read path always yields a consistent current sequence.
//!
//! # Example
//!
//! ```
//! use hookline_core::{aggregate, HookArgs, HookSystem};
//! use serde_json::json;
//!
//! let hooks = HookSystem::new();
//! hooks
//!     .register_fn("pricing.quote", "billing", "base_rate", |_args| {
//!         Ok(json!({"base": 100}))
//!     })
//!     .unwrap();
//! hooks
//!     .register_fn("pricing.quote", "discounts", "seasonal", |_args| {
//!         Ok(json!({"discount": 15}))
//!     })
//!     .unwrap();
//!
//! let merged = hooks
//!     .invoke_aggregate("pricing.quote", aggregate::merge_objects, &HookArgs::new())
//!     .unwrap();
//! assert_eq!(merged, json!({"base": 100, "discount": 15}));
//! ```

pub mod aggregate;
pub mod args;
pub mod config;
pub mod dispatcher;
pub mod handlers;
pub mod registry;
pub mod system;

pub use aggregate::AggregationError;
pub use args::HookArgs;
pub use config::{HookConfig, HookConfigError};
pub use dispatcher::{
    CollectingReporter, DispatchReport, FailureRecord, FailureReporter, HandlerFailure,
    HandlerOutcome, HookDispatcher, TracingReporter,
};
pub use handlers::{
    FnFactory, FnHandler, HandlerFactory, HandlerTarget, HookError, HookHandler, LoggingHandler,
    NoOpHandler, SharedHandler,
};
pub use registry::{HookImplementation, HookRegistry, RegisteredHandler, RegistrationError};
pub use system::HookSystem;
