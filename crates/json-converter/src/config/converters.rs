//! Per-type conversion functions that take precedence over `serde`.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::{JsonError, Result};

type ToJsonFn = Arc<dyn Fn(&dyn Any) -> anyhow::Result<Value> + Send + Sync>;
type FromJsonFn = Arc<dyn Fn(&Value) -> anyhow::Result<Option<Box<dyn Any>>> + Send + Sync>;

/// Registry of custom converters keyed by the Rust type they handle.
#[derive(Clone, Default)]
pub struct Converters {
    to_json: HashMap<TypeId, ToJsonFn>,
    from_json: HashMap<TypeId, FromJsonFn>,
}

impl Converters {
    /// Register the function used to turn a `T` into a JSON value.
    pub fn add_to_json<T, F>(&mut self, f: F)
    where
        T: 'static,
        F: Fn(&T) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let erased: ToJsonFn = Arc::new(move |any: &dyn Any| -> anyhow::Result<Value> {
            let value = any
                .downcast_ref::<T>()
                .ok_or_else(|| anyhow::anyhow!("converter registered for a different type"))?;
            f(value)
        });
        self.to_json.insert(TypeId::of::<T>(), erased);
    }

    /// Register the function used to build a `T` from a JSON value.
    ///
    /// Returning `Ok(None)` means the value converted to nothing, which the
    /// read path reports as a null result.
    pub fn add_from_json<T, F>(&mut self, f: F)
    where
        T: 'static,
        F: Fn(&Value) -> anyhow::Result<Option<T>> + Send + Sync + 'static,
    {
        let erased: FromJsonFn = Arc::new(move |value: &Value| -> anyhow::Result<Option<Box<dyn Any>>> {
            Ok(f(value)?.map(|v| Box::new(v) as Box<dyn Any>))
        });
        self.from_json.insert(TypeId::of::<T>(), erased);
    }

    pub fn has_to_json<T: 'static>(&self) -> bool {
        self.to_json.contains_key(&TypeId::of::<T>())
    }

    pub fn has_from_json<T: 'static>(&self) -> bool {
        self.from_json.contains_key(&TypeId::of::<T>())
    }

    /// Run the registered `to_json` converter for `T`, if any.
    pub fn to_json<T: 'static>(&self, value: &T) -> Option<Result<Value>> {
        let f = self.to_json.get(&TypeId::of::<T>())?;
        Some(f(value as &dyn Any).map_err(|e| JsonError::Conversion(format!("{:#}", e))))
    }

    /// Run the registered `from_json` converter for `T`, if any.
    pub fn from_json<T: 'static>(&self, value: &Value) -> Option<Result<T>> {
        let f = self.from_json.get(&TypeId::of::<T>())?;
        let result = match f(value) {
            Ok(Some(boxed)) => boxed
                .downcast::<T>()
                .map(|b| *b)
                .map_err(|_| JsonError::Conversion("converter produced a different type".into())),
            Ok(None) => Err(JsonError::NullResult),
            Err(e) => Err(JsonError::Conversion(format!("{:#}", e))),
        };
        Some(result)
    }

    pub fn is_empty(&self) -> bool {
        self.to_json.is_empty() && self.from_json.is_empty()
    }
}

impl fmt::Debug for Converters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converters")
            .field("to_json", &self.to_json.len())
            .field("from_json", &self.from_json.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }

    fn point_converters() -> Converters {
        let mut c = Converters::default();
        c.add_to_json::<Point, _>(|p| Ok(json!([p.x, p.y])));
        c.add_from_json::<Point, _>(|v| {
            let arr = v.as_array().ok_or_else(|| anyhow::anyhow!("expected array"))?;
            match arr.as_slice() {
                [Value::Null] => Ok(None),
                [x, y] => Ok(Some(Point {
                    x: x.as_i64().unwrap_or_default(),
                    y: y.as_i64().unwrap_or_default(),
                })),
                _ => anyhow::bail!("expected two elements"),
            }
        });
        c
    }

    #[test]
    fn to_json_uses_registered_function() {
        let c = point_converters();
        let value = c.to_json(&Point { x: 1, y: 2 }).unwrap().unwrap();
        assert_eq!(value, json!([1, 2]));
    }

    #[test]
    fn unregistered_type_returns_none() {
        let c = point_converters();
        assert!(c.to_json(&"plain").is_none());
        assert!(c.from_json::<String>(&json!("x")).is_none());
        assert!(!c.has_to_json::<String>());
        assert!(c.has_from_json::<Point>());
    }

    #[test]
    fn from_json_builds_value() {
        let c = point_converters();
        let p: Point = c.from_json(&json!([3, 4])).unwrap().unwrap();
        assert_eq!(p, Point { x: 3, y: 4 });
    }

    #[test]
    fn from_json_none_is_null_result() {
        let c = point_converters();
        let err = c.from_json::<Point>(&json!([null])).unwrap().unwrap_err();
        assert!(matches!(err, JsonError::NullResult));
    }

    #[test]
    fn from_json_failure_is_conversion_error() {
        let c = point_converters();
        let err = c.from_json::<Point>(&json!({"x": 1})).unwrap().unwrap_err();
        assert!(matches!(err, JsonError::Conversion(ref m) if m.contains("expected array")));
    }
}
