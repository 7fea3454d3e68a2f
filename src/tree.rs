//! # Tree views over JSON documents
//!
//! A [`TreeView`] wraps a JSON object or array and lets transformation
//! statements address it with attribute-style (`dst.a`) and index-style
//! (`dst[0]`) access.
//!
//! ## Object/list duality
//!
//! Every view carries a [`Form`]. Views built from fields start as
//! [`Form::Object`], views built from positional elements start as
//! [`Form::List`], and writing an integer key switches a view to
//! [`Form::List`]. The form only matters when the view is materialized back to
//! plain JSON with [`TreeView::to_plain`].
//!
//! ## Create-on-read
//!
//! Attribute reads of a missing key store an empty object placeholder and return
//! it, which is how statements grow new structure:
//!
//! ```
//! use json_transformer::tree::TreeView;
//!
//! let mut dst = TreeView::new();
//! dst.read_attr("messages").unwrap();
//! assert_eq!(dst.to_plain().unwrap(), serde_json::json!({"messages": {}}));
//! ```
//!
//! Index reads never create anything; a missing key is [`TreeError::KeyNotFound`].
//!
//! ## Raw data and transient views
//!
//! Values are stored unwrapped ([`Slot::Raw`]). Nested raw lists and objects are
//! wrapped when read, so the returned view is a copy: writing into it does not
//! reach the parent. Placeholders and views assigned with [`TreeView::write`]
//! are stored as [`Slot::View`] and are reached live through
//! [`TreeView::attr_entry`] / [`TreeView::index_entry`].

use std::fmt;

use serde_json::{Map, Value as Json};
use thiserror::Error;

/// Errors raised by tree view access and materialization.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// Index-style read of a key that is not present
    #[error("key not found: {0}")]
    KeyNotFound(Key),

    /// A stored or supplied value is neither a scalar, a list nor an object
    #[error("unsupported value type: {0}")]
    UnsupportedType(&'static str),

    /// A list-shaped view holds a key that is not an integer index
    #[error("malformed list index: {0}")]
    MalformedIndex(Key),
}

/// A key inside a [`TreeView`].
#[derive(Debug, Clone)]
pub enum Key {
    Str(String),
    Int(i64),
    Bool(bool),
    Float(f64),
}

impl Key {
    /// Normalizes textual keys that spell a literal.
    ///
    /// Integers are tried first, then floats, then booleans (`true`/`True`,
    /// `false`/`False`). Anything else stays a string key.
    ///
    /// ```
    /// use json_transformer::tree::Key;
    ///
    /// assert_eq!(Key::parse("0"), Key::Int(0));
    /// assert_eq!(Key::parse("1.5"), Key::Float(1.5));
    /// assert_eq!(Key::parse("True"), Key::Bool(true));
    /// assert_eq!(Key::parse("name"), Key::Str("name".to_string()));
    /// ```
    pub fn parse(text: &str) -> Key {
        if let Ok(n) = text.parse::<i64>() {
            return Key::Int(n);
        }
        if looks_numeric(text)
            && let Ok(f) = text.parse::<f64>()
        {
            return Key::Float(f);
        }
        match text {
            "true" | "True" => Key::Bool(true),
            "false" | "False" => Key::Bool(false),
            _ => Key::Str(text.to_string()),
        }
    }

    /// The literal form of this key. Non-string keys are already normalized.
    pub fn normalized(&self) -> Key {
        match self {
            Key::Str(s) => Key::parse(s),
            other => other.clone(),
        }
    }

    /// Whether two keys address the same slot.
    pub fn same_slot(&self, other: &Key) -> bool {
        self == other || self.normalized() == other.normalized()
    }

    /// Interprets the key as a list position.
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Key::Int(n) => Some(*n),
            Key::Bool(b) => Some(i64::from(*b)),
            Key::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Key::Float(_) => None,
            Key::Str(s) => s.trim().parse::<i64>().ok(),
        }
    }

    /// The key as a JSON object field name.
    pub fn to_field_name(&self) -> String {
        match self {
            Key::Str(s) => s.clone(),
            Key::Int(n) => n.to_string(),
            Key::Bool(b) => b.to_string(),
            Key::Float(f) => format!("{:?}", f),
        }
    }
}

fn looks_numeric(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Str(a), Key::Str(b)) => a == b,
            (Key::Int(a), Key::Int(b)) => a == b,
            (Key::Bool(a), Key::Bool(b)) => a == b,
            (Key::Float(a), Key::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other.to_field_name()),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

/// The shape a [`TreeView`] materializes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    /// Materializes to a JSON object
    Object,
    /// Materializes to a JSON array
    List,
}

/// A value stored under a key.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Plain JSON, stored unwrapped
    Raw(Json),
    /// A nested view, reached live through entry descent
    View(TreeView),
}

impl From<Json> for Slot {
    fn from(value: Json) -> Self {
        Slot::Raw(value)
    }
}

impl From<TreeView> for Slot {
    fn from(view: TreeView) -> Self {
        Slot::View(view)
    }
}

/// The result of reading a key.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// A string, boolean or number, returned unwrapped
    Scalar(Json),
    /// A nested list or object, wrapped as a view
    View(TreeView),
}

/// The result of descending into a key.
#[derive(Debug)]
pub enum Entry<'a> {
    /// A view stored in the tree; mutations persist
    Live(&'a mut TreeView),
    /// Raw data resolved into a standalone value; mutations are not stored back
    Detached(Resolved),
}

/// An auto-vivifying, order-preserving view over a JSON object or array.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeView {
    entries: Vec<(Key, Slot)>,
    form: Form,
}

impl Default for TreeView {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeView {
    /// Creates an empty object-shaped view.
    pub fn new() -> Self {
        TreeView {
            entries: Vec::new(),
            form: Form::Object,
        }
    }

    /// Creates a list-shaped view with elements under the keys `0..n-1`.
    pub fn from_elements<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Slot>,
    {
        let entries = elements
            .into_iter()
            .enumerate()
            .map(|(i, slot)| (Key::Int(i as i64), slot.into()))
            .collect();
        TreeView {
            entries,
            form: Form::List,
        }
    }

    /// Creates an object-shaped view from named fields, keeping their order.
    pub fn from_fields<I, K, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<Slot>,
    {
        let entries = fields
            .into_iter()
            .map(|(name, slot)| (Key::Str(name.into()), slot.into()))
            .collect();
        TreeView {
            entries,
            form: Form::Object,
        }
    }

    /// Wraps a plain JSON object or array.
    pub fn from_json(value: Json) -> Result<Self, TreeError> {
        match value {
            Json::Object(map) => Ok(Self::from_fields(map)),
            Json::Array(items) => Ok(Self::from_elements(items)),
            other => Err(TreeError::UnsupportedType(json_type_name(&other))),
        }
    }

    pub fn form(&self) -> Form {
        self.form
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Slot)> {
        self.entries.iter().map(|(k, s)| (k, s))
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.position(key).is_some()
    }

    fn position(&self, key: &Key) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k == key)
            .or_else(|| self.entries.iter().position(|(k, _)| k.same_slot(key)))
    }

    /// Attribute-style read. A missing name gets an empty object placeholder.
    pub fn read_attr(&mut self, name: &str) -> Result<Resolved, TreeError> {
        match self.attr_entry(name)? {
            Entry::Live(view) => Ok(Resolved::View(view.clone())),
            Entry::Detached(resolved) => Ok(resolved),
        }
    }

    /// Index-style read. A missing key is an error.
    pub fn read_index(&self, key: &Key) -> Result<Resolved, TreeError> {
        let idx = self
            .position(key)
            .ok_or_else(|| TreeError::KeyNotFound(key.clone()))?;
        resolve(&self.entries[idx].1)
    }

    /// Projects several keys into a new view, one index-style read per key.
    pub fn read_tuple(&self, keys: &[Key]) -> Result<TreeView, TreeError> {
        let mut projection = TreeView::new();
        for key in keys {
            let slot = match self.read_index(key)? {
                Resolved::Scalar(value) => Slot::Raw(value),
                Resolved::View(view) => Slot::View(view),
            };
            projection.write(key.clone(), slot);
        }
        Ok(projection)
    }

    /// Descends into `name`, creating a placeholder when it is missing.
    pub fn attr_entry(&mut self, name: &str) -> Result<Entry<'_>, TreeError> {
        let key = Key::Str(name.to_string());
        let idx = match self.position(&key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key, Slot::View(TreeView::new())));
                self.entries.len() - 1
            }
        };
        self.entry_at(idx)
    }

    /// Descends into `key` without creating anything.
    pub fn index_entry(&mut self, key: &Key) -> Result<Entry<'_>, TreeError> {
        let idx = self
            .position(key)
            .ok_or_else(|| TreeError::KeyNotFound(key.clone()))?;
        self.entry_at(idx)
    }

    fn entry_at(&mut self, idx: usize) -> Result<Entry<'_>, TreeError> {
        match &mut self.entries[idx].1 {
            Slot::View(view) => Ok(Entry::Live(view)),
            Slot::Raw(raw) => resolve_raw(raw).map(Entry::Detached),
        }
    }

    /// Stores `value` under `key`.
    ///
    /// Integer and boolean keys switch the view to [`Form::List`] (a boolean
    /// indexes as 0 or 1). Textual keys are normalized with [`Key::parse`]
    /// without touching the form.
    pub fn write(&mut self, key: Key, value: impl Into<Slot>) {
        let value = value.into();
        let key = match key {
            key @ (Key::Int(_) | Key::Bool(_)) => {
                self.form = Form::List;
                key
            }
            Key::Str(s) => Key::parse(&s),
            other => other,
        };

        match self.position(&key) {
            Some(idx) => self.entries[idx].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Attribute-style write, same contract as [`TreeView::write`].
    pub fn write_attr(&mut self, name: &str, value: impl Into<Slot>) {
        self.write(Key::Str(name.to_string()), value);
    }

    /// Removes `key` and returns what was stored there.
    pub fn remove(&mut self, key: &Key) -> Result<Slot, TreeError> {
        let idx = self
            .position(key)
            .ok_or_else(|| TreeError::KeyNotFound(key.clone()))?;
        Ok(self.entries.remove(idx).1)
    }

    /// Materializes the view back into plain JSON.
    ///
    /// List-shaped views are emitted in ascending index order; a key that is
    /// not an integer index fails with [`TreeError::MalformedIndex`].
    pub fn to_plain(&self) -> Result<Json, TreeError> {
        match self.form {
            Form::Object => {
                let mut map = Map::with_capacity(self.entries.len());
                for (key, slot) in &self.entries {
                    map.insert(key.to_field_name(), slot_to_plain(slot)?);
                }
                Ok(Json::Object(map))
            }
            Form::List => {
                let mut indexed = Vec::with_capacity(self.entries.len());
                for (key, slot) in &self.entries {
                    let index = key
                        .as_index()
                        .ok_or_else(|| TreeError::MalformedIndex(key.clone()))?;
                    indexed.push((index, slot));
                }
                indexed.sort_by_key(|(index, _)| *index);

                let mut items = Vec::with_capacity(indexed.len());
                for (_, slot) in indexed {
                    items.push(slot_to_plain(slot)?);
                }
                Ok(Json::Array(items))
            }
        }
    }
}

fn slot_to_plain(slot: &Slot) -> Result<Json, TreeError> {
    match slot {
        Slot::Raw(raw) => Ok(raw.clone()),
        Slot::View(view) => view.to_plain(),
    }
}

fn resolve(slot: &Slot) -> Result<Resolved, TreeError> {
    match slot {
        Slot::View(view) => Ok(Resolved::View(view.clone())),
        Slot::Raw(raw) => resolve_raw(raw),
    }
}

fn resolve_raw(raw: &Json) -> Result<Resolved, TreeError> {
    match raw {
        Json::String(_) | Json::Bool(_) | Json::Number(_) => Ok(Resolved::Scalar(raw.clone())),
        Json::Array(items) => Ok(Resolved::View(TreeView::from_elements(items.clone()))),
        Json::Object(map) => Ok(Resolved::View(TreeView::from_fields(map.clone()))),
        Json::Null => Err(TreeError::UnsupportedType("null")),
    }
}

pub(crate) fn json_type_name(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_form_sorts_indices() {
        let mut view = TreeView::new();
        view.write(Key::Int(2), json!("c"));
        view.write(Key::Int(0), json!("a"));
        view.write(Key::Int(1), json!("b"));
        assert_eq!(view.to_plain().unwrap(), json!(["a", "b", "c"]));
    }

    #[test]
    fn test_textual_numeral_shares_slot() {
        let mut view = TreeView::new();
        view.write(Key::Int(0), json!(1));
        view.write(Key::from("0"), json!(2));
        assert_eq!(view.len(), 1);
        assert_eq!(view.to_plain().unwrap(), json!([2]));
    }

    #[test]
    fn test_textual_numeral_keeps_object_form() {
        let mut view = TreeView::new();
        view.write(Key::from("7"), json!(true));
        assert_eq!(view.form(), Form::Object);
        assert_eq!(view.to_plain().unwrap(), json!({"7": true}));
    }

    #[test]
    fn test_string_key_in_list_is_malformed() {
        let mut view = TreeView::from_elements(vec![json!(1)]);
        view.write_attr("name", json!("x"));
        assert_eq!(
            view.to_plain(),
            Err(TreeError::MalformedIndex(Key::Str("name".into())))
        );
    }

    #[test]
    fn test_parse_rejects_word_floats() {
        assert_eq!(Key::parse("inf"), Key::Str("inf".into()));
        assert_eq!(Key::parse("NaN"), Key::Str("NaN".into()));
        assert_eq!(Key::parse("-3"), Key::Int(-3));
    }
}
