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

//! Built-in result aggregation strategies.
//!
//! An aggregator is any `FnOnce(Vec<Value>) -> Result<Value,
//! AggregationError>`; it runs post-dispatch over the already-filtered
//! success values and never sees failures. Aggregation errors, unlike
//! handler failures, do propagate to the caller: they indicate a mismatch
//! between the chosen aggregator and the data the handlers actually
//! produce.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Errors raised by built-in aggregators.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("aggregator `{aggregator}` cannot combine a {found} value")]
    Type {
        aggregator: &'static str,
        found: &'static str,
    },

    #[error("sum produced a non-finite value")]
    NonFiniteSum,
}

fn type_error(aggregator: &'static str, value: &Value) -> AggregationError {
    AggregationError::Type {
        aggregator,
        found: kind_of(value),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Numeric addition over all success values.
///
/// Empty input yields the additive identity `0`. The result stays integral
/// as long as every input is integral and the running total fits in `i64`;
/// otherwise it is a float. Any non-numeric value is an
/// [`AggregationError::Type`].
pub fn sum(results: Vec<Value>) -> Result<Value, AggregationError> {
    let mut int_total: i64 = 0;
    let mut float_total: f64 = 0.0;
    let mut integral = true;

    for value in &results {
        let number = match value {
            Value::Number(n) => n,
            other => return Err(type_error("sum", other)),
        };

        if let Some(i) = number.as_i64() {
            match int_total.checked_add(i) {
                Some(total) => int_total = total,
                None => integral = false,
            }
            float_total += i as f64;
        } else if let Some(f) = number.as_f64() {
            // f64 or u64 beyond i64 range
            integral = false;
            float_total += f;
        } else {
            return Err(type_error("sum", value));
        }
    }

    if integral {
        Ok(Value::from(int_total))
    } else {
        Number::from_f64(float_total)
            .map(Value::Number)
            .ok_or(AggregationError::NonFiniteSum)
    }
}

/// Flattens array-valued results one level; a non-array value is appended
/// as a single element. Relative order is preserved. Empty input yields an
/// empty array.
pub fn flatten(results: Vec<Value>) -> Result<Value, AggregationError> {
    let mut flat = Vec::new();
    for value in results {
        match value {
            Value::Array(items) => flat.extend(items),
            other => flat.push(other),
        }
    }
    Ok(Value::Array(flat))
}

/// Left-to-right shallow merge of object-valued results; a later handler's
/// keys overwrite earlier ones on conflict. Empty input yields an empty
/// object. Any non-object value is an [`AggregationError::Type`].
pub fn merge_objects(results: Vec<Value>) -> Result<Value, AggregationError> {
    let mut merged = Map::new();
    for value in results {
        match value {
            Value::Object(entries) => merged.extend(entries),
            other => return Err(type_error("merge_objects", &other)),
        }
    }
    Ok(Value::Object(merged))
}

/// First success value that is not `Value::Null`, scanning in registration
/// order; `Value::Null` (the absent sentinel) if none qualify.
pub fn first_non_null(results: Vec<Value>) -> Result<Value, AggregationError> {
    Ok(results
        .into_iter()
        .find(|value| !value.is_null())
        .unwrap_or(Value::Null))
}

/// Identity: the ordered success values, unchanged.
pub fn all(results: Vec<Value>) -> Result<Value, AggregationError> {
    Ok(Value::Array(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sum_integers() {
        assert_eq!(sum(vec![json!(1), json!(2), json!(3)]).unwrap(), json!(6));
    }

    #[test]
    fn sum_empty_is_zero() {
        assert_eq!(sum(vec![]).unwrap(), json!(0));
    }

    #[test]
    fn sum_mixed_goes_float() {
        assert_eq!(sum(vec![json!(1), json!(0.5)]).unwrap(), json!(1.5));
    }

    #[test]
    fn sum_rejects_non_numeric() {
        let err = sum(vec![json!(1), json!("two")]).unwrap_err();
        assert_eq!(
            err,
            AggregationError::Type {
                aggregator: "sum",
                found: "string"
            }
        );
    }

    #[test]
    fn flatten_mixes_sequences_and_scalars() {
        let combined = flatten(vec![json!([1, 2]), json!(3), json!([4])]).unwrap();
        assert_eq!(combined, json!([1, 2, 3, 4]));
    }

    #[test]
    fn flatten_empty() {
        assert_eq!(flatten(vec![]).unwrap(), json!([]));
    }

    #[test]
    fn flatten_is_one_level_only() {
        let combined = flatten(vec![json!([[1], 2])]).unwrap();
        assert_eq!(combined, json!([[1], 2]));
    }

    #[test]
    fn merge_later_keys_win() {
        let merged = merge_objects(vec![json!({"x": 1, "y": 9}), json!({"x": 2})]).unwrap();
        assert_eq!(merged, json!({"x": 2, "y": 9}));
    }

    #[test]
    fn merge_empty_is_empty_object() {
        assert_eq!(merge_objects(vec![]).unwrap(), json!({}));
    }

    #[test]
    fn merge_rejects_non_objects() {
        let err = merge_objects(vec![json!({"a": 1}), json!([2])]).unwrap_err();
        assert_eq!(
            err,
            AggregationError::Type {
                aggregator: "merge_objects",
                found: "array"
            }
        );
    }

    #[test]
    fn first_non_null_skips_nulls() {
        let picked =
            first_non_null(vec![Value::Null, Value::Null, json!("value"), json!("later")])
                .unwrap();
        assert_eq!(picked, json!("value"));
    }

    #[test]
    fn first_non_null_all_null_is_null() {
        assert_eq!(first_non_null(vec![Value::Null]).unwrap(), Value::Null);
        assert_eq!(first_non_null(vec![]).unwrap(), Value::Null);
    }

    #[test]
    fn all_is_identity() {
        let values = vec![json!(1), json!("a")];
        assert_eq!(all(values.clone()).unwrap(), Value::Array(values));
    }
}
