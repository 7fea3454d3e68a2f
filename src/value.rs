use serde_json::{Map, Number, Value as Json};

use crate::tree::{Key, Resolved, Slot, TreeError, TreeView};

/// A value produced while evaluating a statement.
///
/// Reads through `src` and `dst` yield scalars or [`Value::View`]s; array and
/// object literals written in a statement yield [`Value::Array`] and
/// [`Value::Object`], which are stored unwrapped when assigned.
///
/// # Examples
///
/// ```
/// use json_transformer::Value;
/// use serde_json::json;
///
/// let value = Value::from_json(json!({"a": [1, 2.5, "x"]}));
/// assert_eq!(value.to_json().unwrap(), json!({"a": [1, 2.5, "x"]}));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,

    /// JSON boolean
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (kept apart from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Array literal or plain array data
    Array(Vec<Value>),

    /// Object literal or plain object data, in insertion order
    Object(Vec<(String, Value)>),

    /// A tree view read from `src` or `dst`
    View(TreeView),
}

impl Value {
    /// Check if the value is truthy (for conditions)
    pub fn is_truthy(&self) -> bool {
        use Value::*;
        match self {
            Null => false,
            Boolean(b) => *b,
            Float(n) => *n != 0.0,
            Integer(n) => *n != 0,
            String(s) => !s.is_empty(),
            Array(arr) => !arr.is_empty(),
            Object(obj) => !obj.is_empty(),
            View(view) => !view.is_empty(),
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::Boolean(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }

    /// Get as integer, without rounding
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Boolean(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Human-readable type name, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::View(_) => "view",
        }
    }

    /// Converts a scalar into a tree key. Containers and null are not keys.
    pub fn to_key(&self) -> Option<Key> {
        match self {
            Value::String(s) => Some(Key::Str(s.clone())),
            Value::Integer(n) => Some(Key::Int(*n)),
            Value::Boolean(b) => Some(Key::Bool(*b)),
            Value::Float(f) => Some(Key::Float(*f)),
            _ => None,
        }
    }

    /// Text form used by `str()` and string concatenation.
    pub fn as_string(&self) -> Result<String, TreeError> {
        Ok(match self {
            Value::String(s) => s.clone(),
            Value::Float(n) => format!("{:?}", n),
            Value::Integer(n) => n.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Null => "null".to_string(),
            other => other.to_json()?.to_string(),
        })
    }

    /// Converts plain JSON into a value.
    pub fn from_json(v: Json) -> Value {
        match v {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Boolean(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s),
            Json::Array(arr) => Value::Array(arr.into_iter().map(Value::from_json).collect()),
            Json::Object(obj) => Value::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts the result of a tree read into a value.
    pub fn from_resolved(resolved: Resolved) -> Value {
        match resolved {
            Resolved::Scalar(json) => Value::from_json(json),
            Resolved::View(view) => Value::View(view),
        }
    }

    /// Materializes the value as plain JSON.
    ///
    /// Non-finite floats become `null`; views go through [`TreeView::to_plain`].
    pub fn to_json(&self) -> Result<Json, TreeError> {
        Ok(match self {
            Value::Null => Json::Null,
            Value::Boolean(b) => Json::Bool(*b),
            Value::Integer(i) => Json::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(arr) => {
                Json::Array(arr.iter().map(Value::to_json).collect::<Result<_, _>>()?)
            }
            Value::Object(obj) => {
                let mut map = Map::with_capacity(obj.len());
                for (k, v) in obj {
                    map.insert(k.clone(), v.to_json()?);
                }
                Json::Object(map)
            }
            Value::View(view) => view.to_plain()?,
        })
    }

    /// Converts the value into what a tree stores: views stay views, everything
    /// else is stored as raw JSON.
    pub fn into_slot(self) -> Result<Slot, TreeError> {
        match self {
            Value::View(view) => Ok(Slot::View(view)),
            other => other.to_json().map(Slot::Raw),
        }
    }
}
