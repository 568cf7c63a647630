//! Core value types for tfplug
//!
//! Configuration, plan and state all travel as [`DynamicValue`]s. Resources
//! should read them once through the typed accessors below and work with their
//! own structs from there on.

use crate::error::{Result, TfplugError};
use std::collections::BTreeMap;
use std::fmt;

static NULL_VALUE: Dynamic = Dynamic::Null;
static UNKNOWN_VALUE: Dynamic = Dynamic::Unknown;

/// A Terraform value of any type.
///
/// Sets travel as `List`; whether order matters is a property of the schema,
/// see [`Dynamic::set_equals`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Dynamic {
    #[default]
    Null,
    Bool(bool),
    /// All numbers are f64 to match Terraform
    Number(f64),
    String(String),
    List(Vec<Dynamic>),
    /// Objects and maps share this representation
    Map(BTreeMap<String, Dynamic>),
    /// Value not yet known (during planning)
    Unknown,
}

impl Dynamic {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Dynamic::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Dynamic::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Dynamic]> {
        match self {
            Dynamic::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Dynamic>> {
        match self {
            Dynamic::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Dynamic::Unknown)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Number(_) => "number",
            Dynamic::String(_) => "string",
            Dynamic::List(_) => "list",
            Dynamic::Map(_) => "map",
            Dynamic::Unknown => "unknown",
        }
    }

    /// Equality for set-typed attributes: lists compare as multisets, so
    /// element order is ignored. Null and the empty list are the same set.
    pub fn set_equals(&self, other: &Dynamic) -> bool {
        match (self, other) {
            (Dynamic::List(a), Dynamic::List(b)) => {
                if a.len() != b.len() {
                    return false;
                }
                let mut unmatched: Vec<&Dynamic> = b.iter().collect();
                a.iter().all(|item| {
                    match unmatched.iter().position(|candidate| *candidate == item) {
                        Some(idx) => {
                            unmatched.swap_remove(idx);
                            true
                        }
                        None => false,
                    }
                })
            }
            (Dynamic::Null, Dynamic::List(l)) | (Dynamic::List(l), Dynamic::Null) => l.is_empty(),
            _ => self == other,
        }
    }
}

impl From<&str> for Dynamic {
    fn from(s: &str) -> Self {
        Dynamic::String(s.to_string())
    }
}

impl From<String> for Dynamic {
    fn from(s: String) -> Self {
        Dynamic::String(s)
    }
}

impl From<bool> for Dynamic {
    fn from(b: bool) -> Self {
        Dynamic::Bool(b)
    }
}

impl From<f64> for Dynamic {
    fn from(n: f64) -> Self {
        Dynamic::Number(n)
    }
}

impl<T: Into<Dynamic>> From<Vec<T>> for Dynamic {
    fn from(items: Vec<T>) -> Self {
        Dynamic::List(items.into_iter().map(Into::into).collect())
    }
}

/// Maps a "missing" lookup to `None` while still surfacing type errors.
///
/// ```ignore
/// let groups = into_optional(config.get_string_list(&AttributePath::new("security_groups")))?;
/// ```
pub fn into_optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_missing() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Wraps a [`Dynamic`] with path-based access.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DynamicValue {
    pub value: Dynamic,
}

impl DynamicValue {
    pub fn new(value: Dynamic) -> Self {
        Self { value }
    }

    pub fn null() -> Self {
        Self {
            value: Dynamic::Null,
        }
    }

    pub fn unknown() -> Self {
        Self {
            value: Dynamic::Unknown,
        }
    }

    /// An empty object, ready for `set_*` calls
    pub fn object() -> Self {
        Self {
            value: Dynamic::Map(BTreeMap::new()),
        }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn is_unknown(&self) -> bool {
        self.value.is_unknown()
    }

    /// Raw access to the value at `path`. Absent attributes resolve to
    /// `Dynamic::Null`, matching how Terraform sends unset attributes.
    pub fn get(&self, path: &AttributePath) -> Result<&Dynamic> {
        let mut current = &self.value;

        for step in &path.steps {
            current = match (current, step) {
                (Dynamic::Null, _) => return Ok(&NULL_VALUE),
                (Dynamic::Unknown, _) => return Ok(&UNKNOWN_VALUE),
                (Dynamic::Map(m), AttributePathStep::AttributeName(name))
                | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => {
                    match m.get(name) {
                        Some(value) => value,
                        None => return Ok(&NULL_VALUE),
                    }
                }
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => {
                    match usize::try_from(*idx).ok().and_then(|i| l.get(i)) {
                        Some(value) => value,
                        None => return Ok(&NULL_VALUE),
                    }
                }
                (other, _) => {
                    return Err(TfplugError::TypeMismatch {
                        path: path.to_string(),
                        expected: "object or list".to_string(),
                        actual: other.type_name().to_string(),
                    })
                }
            };
        }

        Ok(current)
    }

    /// Like [`get`](Self::get) but treats null as missing
    fn require(&self, path: &AttributePath) -> Result<&Dynamic> {
        match self.get(path)? {
            Dynamic::Null => Err(TfplugError::AttributeNotFound(path.to_string())),
            value => Ok(value),
        }
    }

    fn mismatch(path: &AttributePath, expected: &str, actual: &Dynamic) -> TfplugError {
        TfplugError::TypeMismatch {
            path: path.to_string(),
            expected: expected.to_string(),
            actual: actual.type_name().to_string(),
        }
    }

    pub fn get_string(&self, path: &AttributePath) -> Result<String> {
        let value = self.require(path)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Self::mismatch(path, "string", value))
    }

    pub fn get_number(&self, path: &AttributePath) -> Result<f64> {
        let value = self.require(path)?;
        value
            .as_f64()
            .ok_or_else(|| Self::mismatch(path, "number", value))
    }

    pub fn get_bool(&self, path: &AttributePath) -> Result<bool> {
        let value = self.require(path)?;
        value
            .as_bool()
            .ok_or_else(|| Self::mismatch(path, "bool", value))
    }

    pub fn get_list(&self, path: &AttributePath) -> Result<Vec<Dynamic>> {
        let value = self.require(path)?;
        value
            .as_list()
            .map(<[Dynamic]>::to_vec)
            .ok_or_else(|| Self::mismatch(path, "list", value))
    }

    pub fn get_map(&self, path: &AttributePath) -> Result<BTreeMap<String, Dynamic>> {
        let value = self.require(path)?;
        value
            .as_map()
            .cloned()
            .ok_or_else(|| Self::mismatch(path, "map", value))
    }

    /// A list or set of strings, in the order it was sent
    pub fn get_string_list(&self, path: &AttributePath) -> Result<Vec<String>> {
        let items = self.get_list(path)?;
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| Self::mismatch(&path.clone().index(idx as i64), "string", item))
            })
            .collect()
    }

    /// A map of strings, such as `tags`
    pub fn get_string_map(&self, path: &AttributePath) -> Result<BTreeMap<String, String>> {
        let entries = self.get_map(path)?;
        entries
            .into_iter()
            .map(|(key, value)| match value {
                Dynamic::String(s) => Ok((key, s)),
                other => Err(Self::mismatch(&path.clone().key(&key), "string", &other)),
            })
            .collect()
    }

    pub fn set_string(&mut self, path: &AttributePath, value: String) -> Result<()> {
        self.set_value(path, Dynamic::String(value))
    }

    pub fn set_number(&mut self, path: &AttributePath, value: f64) -> Result<()> {
        self.set_value(path, Dynamic::Number(value))
    }

    pub fn set_bool(&mut self, path: &AttributePath, value: bool) -> Result<()> {
        self.set_value(path, Dynamic::Bool(value))
    }

    pub fn set_list(&mut self, path: &AttributePath, value: Vec<Dynamic>) -> Result<()> {
        self.set_value(path, Dynamic::List(value))
    }

    pub fn set_map(&mut self, path: &AttributePath, value: BTreeMap<String, Dynamic>) -> Result<()> {
        self.set_value(path, Dynamic::Map(value))
    }

    pub fn set_null(&mut self, path: &AttributePath) -> Result<()> {
        self.set_value(path, Dynamic::Null)
    }

    /// Mark computed values as unknown during planning
    pub fn mark_unknown(&mut self, path: &AttributePath) -> Result<()> {
        self.set_value(path, Dynamic::Unknown)
    }

    /// Writes `new_value` at `path`, creating intermediate objects as needed.
    /// List elements must already exist.
    pub fn set_value(&mut self, path: &AttributePath, new_value: Dynamic) -> Result<()> {
        let Some((last, parents)) = path.steps.split_last() else {
            self.value = new_value;
            return Ok(());
        };

        if !matches!(self.value, Dynamic::Map(_)) {
            self.value = Dynamic::Map(BTreeMap::new());
        }

        let mut current = &mut self.value;
        for step in parents {
            current = match (current, step) {
                (Dynamic::Map(m), AttributePathStep::AttributeName(name))
                | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => {
                    let entry = m.entry(name.clone()).or_default();
                    if entry.is_null() {
                        *entry = Dynamic::Map(BTreeMap::new());
                    }
                    entry
                }
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => {
                    let slot = Self::list_slot(l.len(), *idx, path)?;
                    &mut l[slot]
                }
                (other, _) => {
                    return Err(Self::mismatch(path, "object or list", other));
                }
            };
        }

        match (current, last) {
            (Dynamic::Map(m), AttributePathStep::AttributeName(name))
            | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => {
                m.insert(name.clone(), new_value);
                Ok(())
            }
            (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => {
                let slot = Self::list_slot(l.len(), *idx, path)?;
                l[slot] = new_value;
                Ok(())
            }
            (other, _) => Err(Self::mismatch(path, "object or list", other)),
        }
    }

    fn list_slot(len: usize, idx: i64, path: &AttributePath) -> Result<usize> {
        usize::try_from(idx)
            .ok()
            .filter(|i| *i < len)
            .ok_or_else(|| {
                TfplugError::Custom(format!(
                    "list index {} out of bounds (len {}) in {}",
                    idx, len, path
                ))
            })
    }
}

/// Path to an attribute within a [`DynamicValue`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributePath {
    pub steps: Vec<AttributePathStep>,
}

impl AttributePath {
    pub fn new(name: &str) -> Self {
        Self {
            steps: vec![AttributePathStep::AttributeName(name.to_string())],
        }
    }

    pub fn root() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.steps
            .push(AttributePathStep::AttributeName(name.to_string()));
        self
    }

    pub fn index(mut self, idx: i64) -> Self {
        self.steps.push(AttributePathStep::ElementKeyInt(idx));
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.steps
            .push(AttributePathStep::ElementKeyString(key.to_string()));
        self
    }

    /// Name of the top-level attribute this path starts at
    pub fn root_name(&self) -> Option<&str> {
        match self.steps.first() {
            Some(AttributePathStep::AttributeName(name)) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                AttributePathStep::AttributeName(name) if i == 0 => write!(f, "{}", name)?,
                AttributePathStep::AttributeName(name) => write!(f, ".{}", name)?,
                AttributePathStep::ElementKeyString(key) => write!(f, "[{:?}]", key)?,
                AttributePathStep::ElementKeyInt(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributePathStep {
    /// Attribute of an object
    AttributeName(String),
    /// Element of a map
    ElementKeyString(String),
    /// Element of a list
    ElementKeyInt(i64),
}

/// A warning or error reported back to Terraform
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    pub detail: String,
    pub attribute: Option<AttributePath>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, path: AttributePath) -> Self {
        self.attribute = Some(path);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// Config represents configuration values
pub type Config = DynamicValue;

/// State represents resource state values
pub type State = DynamicValue;
