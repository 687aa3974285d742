//! Dependency snapshots and structural equality.
//!
//! A [`Snapshot`] is the tagged value a memoized call site hands over as its
//! dependency list. Two snapshots are compared structurally by
//! [`deep_equal_bounded`]:
//!
//! - identical references, and `Shared` values pointing at the same
//!   allocation, are equal without looking inside them (so a `NaN` compared
//!   with itself by reference is equal)
//! - primitives compare by value; `Int` and `Float` compare numerically and
//!   a `NaN` is unequal to any other value, including another `NaN`
//! - unwrapping a `Shared` layer counts toward the depth limit like a
//!   container level
//! - maps need identical key sets and recursively equal values (key order is
//!   irrelevant)
//! - lists compare element-wise; a list is never equal to a map

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::errors::{TimingError, TimingResult};

/// Nesting depth used by [`deep_equal`] and `PartialEq`.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Tagged dependency value.
#[derive(Debug, Clone, Default)]
pub enum Snapshot {
    /// Absent value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// String.
    Str(String),
    /// Ordered sequence.
    List(Vec<Snapshot>),
    /// String-keyed record.
    Map(BTreeMap<String, Snapshot>),
    /// Reference-counted value; two `Shared` values over the same allocation
    /// are identical.
    Shared(Arc<Snapshot>),
}

impl Snapshot {
    /// Wrap a value so that clones of the result share one allocation.
    pub fn shared(value: impl Into<Self>) -> Self {
        Self::Shared(Arc::new(value.into()))
    }

    /// Build a map snapshot from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Self>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a list snapshot.
    pub fn list<V, I>(items: I) -> Self
    where
        V: Into<Self>,
        I: IntoIterator<Item = V>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Name of the variant, looking through `Shared`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Shared(inner) => inner.kind(),
        }
    }

    /// Convert to JSON. Non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Str(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Shared(inner) => inner.to_json(),
        }
    }
}

/// Structural equality with [`DEFAULT_MAX_DEPTH`]; snapshots nested deeper
/// than that compare unequal.
pub fn deep_equal(a: &Snapshot, b: &Snapshot) -> bool {
    deep_equal_bounded(a, b, DEFAULT_MAX_DEPTH).unwrap_or(false)
}

/// Structural equality that refuses to descend more than `limit` container
/// levels below the roots.
///
/// Comparison stops at the first difference, so `DepthExceeded` is only
/// reported when the snapshots agree all the way down to the limit.
pub fn deep_equal_bounded(a: &Snapshot, b: &Snapshot, limit: usize) -> TimingResult<bool> {
    compare(a, b, 0, limit)
}

fn compare(mut a: &Snapshot, mut b: &Snapshot, mut depth: usize, limit: usize) -> TimingResult<bool> {
    // Each peeled `Shared` layer counts as one level
    loop {
        if std::ptr::eq(a, b) {
            return Ok(true);
        }
        match (a, b) {
            (Snapshot::Shared(x), Snapshot::Shared(y)) => {
                if Arc::ptr_eq(x, y) {
                    return Ok(true);
                }
                depth = descend(depth, limit)?;
                a = &**x;
                b = &**y;
            }
            (Snapshot::Shared(x), _) => {
                depth = descend(depth, limit)?;
                a = &**x;
            }
            (_, Snapshot::Shared(y)) => {
                depth = descend(depth, limit)?;
                b = &**y;
            }
            _ => break,
        }
    }

    match (a, b) {
        (Snapshot::Null, Snapshot::Null) => Ok(true),
        (Snapshot::Bool(x), Snapshot::Bool(y)) => Ok(x == y),
        (Snapshot::Int(x), Snapshot::Int(y)) => Ok(x == y),
        #[allow(clippy::float_cmp)]
        (Snapshot::Float(x), Snapshot::Float(y)) => Ok(x == y),
        (Snapshot::Int(i), Snapshot::Float(f)) | (Snapshot::Float(f), Snapshot::Int(i)) => {
            Ok(int_equals_float(*i, *f))
        }
        (Snapshot::Str(x), Snapshot::Str(y)) => Ok(x == y),
        (Snapshot::List(xs), Snapshot::List(ys)) => {
            if xs.len() != ys.len() {
                return Ok(false);
            }
            let depth = descend(depth, limit)?;
            for (x, y) in xs.iter().zip(ys) {
                if !compare(x, y, depth, limit)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        (Snapshot::Map(xs), Snapshot::Map(ys)) => {
            if xs.len() != ys.len() {
                return Ok(false);
            }
            let depth = descend(depth, limit)?;
            for (key, x) in xs {
                let Some(y) = ys.get(key) else {
                    return Ok(false);
                };
                if !compare(x, y, depth, limit)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn descend(depth: usize, limit: usize) -> TimingResult<usize> {
    if depth >= limit {
        return Err(TimingError::DepthExceeded { limit });
    }
    Ok(depth + 1)
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn int_equals_float(i: i64, f: f64) -> bool {
    // i64::MAX as f64 rounds up to 2^63, which is out of range
    f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 && f as i64 == i
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        deep_equal(self, other)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<serde_json::Value> for Snapshot {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            Value::String(s) => Self::Str(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(entries) => {
                Self::Map(entries.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Snapshot {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Snapshot {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Snapshot {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Snapshot {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Snapshot {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Snapshot {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Snapshot {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Snapshot {
    fn from(value: Vec<T>) -> Self {
        Self::list(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Snapshot {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<Arc<Self>> for Snapshot {
    fn from(value: Arc<Self>) -> Self {
        Self::Shared(value)
    }
}
