use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::document::{is_truthy, lookup};

/// Title used when a document has nothing to show.
pub const UNTITLED: &str = "Untitled";

type PrepareFn = dyn Fn(&Selection<'_>) -> Preview + Send + Sync;

/// List-view summary of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub title: String,
    pub subtitle: Option<String>,
    /// Opaque asset or document id; never dereferenced here.
    pub media: Option<String>,
}

impl Preview {
    /// Direct projection of the `title`, `subtitle` and `media` keys.
    pub fn from_selection(selection: &Selection<'_>) -> Self {
        Self {
            title: selection
                .text("title")
                .unwrap_or_else(|| UNTITLED.to_string()),
            subtitle: selection.text("subtitle"),
            media: selection.media("media"),
        }
    }
}

/// Which document values feed the preview, and how they become one.
///
/// Keys name the selected values (`title`, `subtitle`, `media`, or any extra
/// key the `prepare` transform reads); paths are dotted field paths.
#[derive(Clone, Default)]
pub struct PreviewRule {
    select: Vec<(String, String)>,
    prepare: Option<Arc<PrepareFn>>,
}

impl PreviewRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, key: &str, path: &str) -> Self {
        self.select.push((key.into(), path.into()));
        self
    }

    pub fn prepare<F>(mut self, prepare: F) -> Self
    where
        F: Fn(&Selection<'_>) -> Preview + Send + Sync + 'static,
    {
        self.prepare = Some(Arc::new(prepare));
        self
    }

    pub fn project(&self, document: &Value) -> Preview {
        let selection = Selection {
            values: self
                .select
                .iter()
                .map(|(key, path)| (key.as_str(), lookup(document, path)))
                .collect(),
        };
        match &self.prepare {
            Some(prepare) => prepare(&selection),
            None => Preview::from_selection(&selection),
        }
    }
}

/// Values picked out of a document by a [`PreviewRule`].
pub struct Selection<'a> {
    values: Vec<(&'a str, Option<&'a Value>)>,
}

impl<'a> Selection<'a> {
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.values
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| *v)
    }

    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_truthy)
    }

    /// Display text of a scalar value; empty strings count as missing.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Media id from an image (`asset._ref`), a reference (`_ref`) or a
    /// bare string.
    pub fn media(&self, key: &str) -> Option<String> {
        let value = self.get(key)?;
        let id = value
            .pointer("/asset/_ref")
            .or_else(|| value.get("_ref"))
            .unwrap_or(value);
        id.as_str().filter(|s| !s.is_empty()).map(str::to_string)
    }
}

impl fmt::Debug for PreviewRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewRule")
            .field("select", &self.select)
            .field("prepared", &self.prepare.is_some())
            .finish()
    }
}

#[derive(Serialize)]
struct PreviewDescription<'a> {
    select: BTreeMap<&'a str, &'a str>,
    prepared: bool,
}

impl Serialize for PreviewRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PreviewDescription {
            select: self
                .select
                .iter()
                .map(|(k, p)| (k.as_str(), p.as_str()))
                .collect(),
            prepared: self.prepare.is_some(),
        }
        .serialize(serializer)
    }
}
