use crate::{
    ast::Expr,
    evaluator::EvalError,
    tree::{Entry, Key, Slot, TreeView},
    value::Value,
};

/// One step of an access chain, before its keys are evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Accessor<'a> {
    /// `.name`
    Attr(&'a str),
    /// `[key]` or `[key, key, ...]`
    Index(&'a [Expr]),
}

/// One step of an access chain with its keys evaluated.
///
/// # Examples
/// - `dst.messages` → `Attr("messages")`
/// - `src.items[0]` → `[Attr("items"), Index(Integer(0))]`
/// - `src["a", "b"]` → `Tuple([String("a"), String("b")])`
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Attribute-style access by name
    Attr(String),

    /// Index-style access by a single key
    Index(Value),

    /// Index-style projection of several keys
    Tuple(Vec<Value>),
}

/// A sequence of evaluated path segments, outermost first.
pub type Path = Vec<PathSegment>;

/// Splits an access chain into its base expression and the accessors applied
/// to it, innermost first.
///
/// # Examples
/// ```text
/// dst.a.b[0]        → (dst, [Attr(a), Attr(b), Index([0])])
/// len(src.x)[0]     → (len(src.x), [Index([0])])
/// src.name.upper()  → (src.name.upper(), [])
/// ```
pub fn split_access(expr: &Expr) -> (&Expr, Vec<Accessor<'_>>) {
    let mut accessors = Vec::new();
    let mut current = expr;

    loop {
        match current {
            Expr::Attr { object, name } => {
                accessors.push(Accessor::Attr(name));
                current = object.as_ref();
            }
            Expr::Index { object, keys } => {
                accessors.push(Accessor::Index(keys));
                current = object.as_ref();
            }
            _ => break,
        }
    }

    accessors.reverse();
    (current, accessors)
}

/// Where an access chain currently points.
#[derive(Debug)]
pub enum Cursor<'t> {
    /// A view stored in `src` or `dst`; writes persist
    Live(&'t mut TreeView),
    /// A value that is no longer attached to a bound tree
    Detached(Value),
}

impl Cursor<'_> {
    pub fn into_value(self) -> Value {
        match self {
            Cursor::Live(view) => Value::View(view.clone()),
            Cursor::Detached(value) => value,
        }
    }
}

/// Converts a key value, rejecting containers and null.
pub fn to_key(value: &Value) -> Result<Key, EvalError> {
    value.to_key().ok_or_else(|| {
        EvalError::TypeError(format!("{} cannot be used as a key", value.type_name()))
    })
}

fn to_keys(values: &[Value]) -> Result<Vec<Key>, EvalError> {
    values.iter().map(to_key).collect()
}

/// Moves a cursor one segment further along a path.
pub fn step<'t>(cursor: Cursor<'t>, segment: &PathSegment) -> Result<Cursor<'t>, EvalError> {
    match cursor {
        Cursor::Live(view) => match segment {
            PathSegment::Attr(name) => Ok(from_entry(view.attr_entry(name)?)),
            PathSegment::Index(key) => Ok(from_entry(view.index_entry(&to_key(key)?)?)),
            PathSegment::Tuple(keys) => Ok(Cursor::Detached(Value::View(
                view.read_tuple(&to_keys(keys)?)?,
            ))),
        },
        Cursor::Detached(Value::View(mut view)) => {
            let value = match segment {
                PathSegment::Attr(name) => Value::from_resolved(view.read_attr(name)?),
                PathSegment::Index(key) => Value::from_resolved(view.read_index(&to_key(key)?)?),
                PathSegment::Tuple(keys) => Value::View(view.read_tuple(&to_keys(keys)?)?),
            };
            Ok(Cursor::Detached(value))
        }
        Cursor::Detached(value) => match segment {
            PathSegment::Attr(name) => Err(EvalError::AccessError(format!(
                "{} has no attribute '{}'",
                value.type_name(),
                name
            ))),
            PathSegment::Index(key) => index_value(&value, key).map(Cursor::Detached),
            PathSegment::Tuple(_) => Err(EvalError::TypeError(format!(
                "{} cannot be indexed by a tuple of keys",
                value.type_name()
            ))),
        },
    }
}

fn from_entry(entry: Entry<'_>) -> Cursor<'_> {
    match entry {
        Entry::Live(view) => Cursor::Live(view),
        Entry::Detached(resolved) => Cursor::Detached(Value::from_resolved(resolved)),
    }
}

/// Indexes plain values: arrays and strings by position, objects by field name.
fn index_value(value: &Value, key: &Value) -> Result<Value, EvalError> {
    match (value, key) {
        (Value::Array(arr), Value::Integer(n)) => position(*n, arr.len())
            .map(|i| arr[i].clone())
            .ok_or_else(|| EvalError::AccessError(format!("array index {} out of range", n))),
        (Value::String(s), Value::Integer(n)) => {
            let chars: Vec<char> = s.chars().collect();
            position(*n, chars.len())
                .map(|i| Value::String(chars[i].to_string()))
                .ok_or_else(|| EvalError::AccessError(format!("string index {} out of range", n)))
        }
        (Value::Object(fields), Value::String(name)) => fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| EvalError::AccessError(format!("key {:?} not found", name))),
        (v, k) => Err(EvalError::TypeError(format!(
            "cannot index {} with {}",
            v.type_name(),
            k.type_name()
        ))),
    }
}

/// Resolves a possibly negative index against a length.
fn position(n: i64, len: usize) -> Option<usize> {
    let index = if n < 0 {
        len.checked_sub(n.unsigned_abs() as usize)?
    } else {
        n as usize
    };
    (index < len).then_some(index)
}

/// Stores `slot` under the final segment of an assignment target.
pub fn write_segment(view: &mut TreeView, segment: &PathSegment, slot: Slot) -> Result<(), EvalError> {
    match segment {
        PathSegment::Attr(name) => view.write_attr(name, slot),
        PathSegment::Index(key) => view.write(to_key(key)?, slot),
        PathSegment::Tuple(_) => {
            return Err(EvalError::TypeError(
                "cannot assign to a tuple of keys".to_string(),
            ));
        }
    }
    Ok(())
}

/// Removes the final segment of a `del` target.
pub fn remove_segment(view: &mut TreeView, segment: &PathSegment) -> Result<(), EvalError> {
    let key = match segment {
        PathSegment::Attr(name) => Key::Str(name.clone()),
        PathSegment::Index(key) => to_key(key)?,
        PathSegment::Tuple(_) => {
            return Err(EvalError::TypeError(
                "cannot delete a tuple of keys".to_string(),
            ));
        }
    };
    view.remove(&key)?;
    Ok(())
}
