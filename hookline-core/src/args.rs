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

//! Dispatch-time arguments passed to every handler of an invocation.

use serde_json::{Map, Value};

/// Ordered positional arguments plus named arguments for one dispatch.
///
/// Every handler registered under the dispatched hook name receives the same
/// `HookArgs` by shared reference; arguments are read-only for the duration
/// of the dispatch.
///
/// # Example
///
/// ```
/// use hookline_core::HookArgs;
///
/// let args = HookArgs::new()
///     .arg("order-193")
///     .named("amount", 2500)
///     .named("currency", "EUR");
///
/// assert_eq!(args.get(0).and_then(|v| v.as_str()), Some("order-193"));
/// assert_eq!(args.get_named("amount").and_then(|v| v.as_i64()), Some(2500));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookArgs {
    positional: Vec<Value>,
    named: Map<String, Value>,
}

impl HookArgs {
    /// Create an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a named argument. Setting the same key again overwrites it.
    pub fn named(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(key.into(), value.into());
        self
    }

    /// Positional argument at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Named argument under `key`, if present.
    pub fn get_named(&self, key: &str) -> Option<&Value> {
        self.named.get(key)
    }

    /// All positional arguments in order.
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// All named arguments.
    pub fn named_map(&self) -> &Map<String, Value> {
        &self.named
    }

    /// True when there are no positional and no named arguments.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}
