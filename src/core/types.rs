//! Content data model
//!
//! Records are the unit of content (a product, a service, a team member,
//! a research article). Every editable field carries parallel Spanish and
//! English values. Legacy documents may still hold flat single-language
//! values; those are migrated into the bilingual shape once, at the load
//! boundary, so the rest of the crate only ever sees normalized data.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Supported content languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Es,
    En,
}

impl Lang {
    /// Language code as stored in documents ("es" / "en")
    pub fn code(&self) -> &'static str {
        match self {
            Lang::Es => "es",
            Lang::En => "en",
        }
    }

    /// The other language of the pair
    pub fn other(&self) -> Lang {
        match self {
            Lang::Es => Lang::En,
            Lang::En => Lang::Es,
        }
    }

    /// Parse a language code, defaulting unknown codes to Spanish
    /// (the authored source language of this catalog)
    pub fn parse(code: &str) -> Lang {
        match code {
            "en" => Lang::En,
            _ => Lang::Es,
        }
    }
}

/// A text value with parallel Spanish and English copies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BilingualText {
    #[serde(default)]
    pub es: String,
    #[serde(default)]
    pub en: String,
}

impl BilingualText {
    /// Build from a Spanish-only value (legacy flat strings are authored in Spanish)
    pub fn from_es(es: impl Into<String>) -> Self {
        Self {
            es: es.into(),
            en: String::new(),
        }
    }

    pub fn get(&self, lang: Lang) -> &str {
        match lang {
            Lang::Es => &self.es,
            Lang::En => &self.en,
        }
    }

    pub fn set(&mut self, lang: Lang, value: impl Into<String>) {
        match lang {
            Lang::Es => self.es = value.into(),
            Lang::En => self.en = value.into(),
        }
    }

    /// Display-time resolution: requested language, then es, then en.
    /// The fallback is never persisted.
    pub fn resolve(&self, lang: Lang) -> &str {
        let preferred = self.get(lang);
        if !preferred.is_empty() {
            return preferred;
        }
        if !self.es.is_empty() {
            return &self.es;
        }
        &self.en
    }

    /// True when both language slots are empty
    pub fn is_empty(&self) -> bool {
        self.es.is_empty() && self.en.is_empty()
    }
}

static LIST_ITEM_SEQ: AtomicU64 = AtomicU64::new(0);

/// One entry of a list-valued field (features, capabilities, skills).
///
/// Items are keyed by a stable per-item id so that editing, inserting or
/// removing entries in one language can never drift out of alignment with
/// the other language, which parallel per-language arrays were prone to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: String,
    #[serde(default)]
    pub text: BilingualText,
}

impl ListItem {
    /// New item with a freshly generated id
    pub fn new(text: BilingualText) -> Self {
        let seq = LIST_ITEM_SEQ.fetch_add(1, Ordering::Relaxed);
        Self {
            id: format!("li-{}-{}", chrono::Utc::now().timestamp_millis(), seq),
            text,
        }
    }

    pub fn with_id(id: impl Into<String>, text: BilingualText) -> Self {
        Self {
            id: id.into(),
            text,
        }
    }
}

/// A keyed-map field (specifications). Keys themselves are translated, so
/// the two languages' key sets may legitimately diverge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BilingualMap {
    #[serde(default)]
    pub es: BTreeMap<String, String>,
    #[serde(default)]
    pub en: BTreeMap<String, String>,
}

impl BilingualMap {
    pub fn side(&self, lang: Lang) -> &BTreeMap<String, String> {
        match lang {
            Lang::Es => &self.es,
            Lang::En => &self.en,
        }
    }

    pub fn side_mut(&mut self, lang: Lang) -> &mut BTreeMap<String, String> {
        match lang {
            Lang::Es => &mut self.es,
            Lang::En => &mut self.en,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.es.is_empty() && self.en.is_empty()
    }
}

/// One editable value of a record.
///
/// Variant order matters for deserialization: `Media` accepts any JSON and
/// must stay last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// `{es, en}` text pair
    Text(BilingualText),
    /// `[{id, text: {es, en}}]` keyed list
    List(Vec<ListItem>),
    /// `{es: {k: v}, en: {k: v}}` keyed map
    Map(BilingualMap),
    /// Untranslated shared data (image URLs, video ids, document links)
    Media(serde_json::Value),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&BilingualText> {
        match self {
            FieldValue::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ListItem]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BilingualMap> {
        match self {
            FieldValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// A single content record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Stable unique identifier, immutable after creation
    pub id: String,
    /// Display position among active records (1 = first). Only meaningful
    /// while `archived` is false; archived records keep their last value.
    #[serde(default, deserialize_with = "lenient_order")]
    pub order: u32,
    #[serde(default)]
    pub archived: bool,
    /// Everything else: bilingual fields and media, keyed by field name
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            order: 0,
            archived: false,
            fields: BTreeMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

/// Missing or malformed `order` values deserialize to 0; they sort first
/// and the next normalization pass assigns a real position.
fn lenient_order<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64().unwrap_or(0) as u32,
        serde_json::Value::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    })
}

/// Declares the field layout of one resource so that raw documents can be
/// migrated into the normalized bilingual shape at the load boundary.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    pub resource: &'static str,
    pub text_fields: &'static [&'static str],
    pub list_fields: &'static [&'static str],
    pub map_fields: &'static [&'static str],
}

impl RecordSchema {
    pub fn products() -> Self {
        Self {
            resource: "products",
            text_fields: &["name", "description", "tagline", "category"],
            list_fields: &["features", "capabilities"],
            map_fields: &["specifications"],
        }
    }

    pub fn services() -> Self {
        Self {
            resource: "services",
            text_fields: &["title", "description", "tagline"],
            list_fields: &["features"],
            map_fields: &[],
        }
    }

    pub fn team() -> Self {
        Self {
            resource: "team",
            text_fields: &["name", "role", "bio"],
            list_fields: &["skills"],
            map_fields: &[],
        }
    }

    pub fn research() -> Self {
        Self {
            resource: "research",
            text_fields: &["title", "summary", "category"],
            list_fields: &[],
            map_fields: &[],
        }
    }

    /// Look up the schema for a resource name
    pub fn for_resource(name: &str) -> Option<Self> {
        match name {
            "products" => Some(Self::products()),
            "services" => Some(Self::services()),
            "team" => Some(Self::team()),
            "research" => Some(Self::research()),
            _ => None,
        }
    }

    /// Migrate one raw document into a normalized [`Record`].
    ///
    /// Fields the schema does not know about are carried through verbatim
    /// as media so no data is ever dropped on load.
    pub fn migrate_record(&self, raw: &serde_json::Value) -> Record {
        let obj = match raw.as_object() {
            Some(o) => o,
            None => return Record::new(""),
        };

        let id = obj
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let order = match obj.get("order") {
            Some(serde_json::Value::Number(n)) => n.as_u64().unwrap_or(0) as u32,
            Some(serde_json::Value::String(s)) => s.parse().unwrap_or(0),
            _ => 0,
        };
        let archived = obj
            .get("archived")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let mut record = Record::new(id);
        record.order = order;
        record.archived = archived;

        for (name, value) in obj {
            if name == "id" || name == "order" || name == "archived" {
                continue;
            }
            let migrated = if self.text_fields.contains(&name.as_str()) {
                FieldValue::Text(migrate_text(value))
            } else if self.list_fields.contains(&name.as_str()) {
                FieldValue::List(migrate_list(value))
            } else if self.map_fields.contains(&name.as_str()) {
                FieldValue::Map(migrate_map(value))
            } else {
                FieldValue::Media(value.clone())
            };
            record.fields.insert(name.clone(), migrated);
        }

        record
    }

    /// Migrate a whole document array
    pub fn migrate_all(&self, raw: &[serde_json::Value]) -> Vec<Record> {
        raw.iter().map(|v| self.migrate_record(v)).collect()
    }
}

/// Flat legacy string -> `{es: value, en: ""}`; already-bilingual objects
/// pass through with missing slots defaulted.
fn migrate_text(raw: &serde_json::Value) -> BilingualText {
    match raw {
        serde_json::Value::String(s) => BilingualText::from_es(s.clone()),
        serde_json::Value::Object(map) => BilingualText {
            es: map.get("es").and_then(|v| v.as_str()).unwrap_or("").to_string(),
            en: map.get("en").and_then(|v| v.as_str()).unwrap_or("").to_string(),
        },
        _ => BilingualText::default(),
    }
}

/// Legacy list shapes become id-keyed items:
/// - `{es: [..], en: [..]}` parallel arrays are zipped to the longer
///   length, the missing side becoming the empty string;
/// - a bare string array is treated as Spanish-only;
/// - already-keyed `[{id, text}]` arrays pass through.
fn migrate_list(raw: &serde_json::Value) -> Vec<ListItem> {
    match raw {
        serde_json::Value::Array(items) => {
            if items.iter().all(|v| v.is_string()) {
                return items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| {
                        ListItem::with_id(
                            format!("li-{}", i + 1),
                            BilingualText::from_es(v.as_str().unwrap_or("")),
                        )
                    })
                    .collect();
            }
            items
                .iter()
                .filter_map(|v| serde_json::from_value::<ListItem>(v.clone()).ok())
                .collect()
        }
        serde_json::Value::Object(map) => {
            let side = |lang: &str| -> Vec<String> {
                map.get(lang)
                    .and_then(|v| v.as_array())
                    .map(|arr| {
                        arr.iter()
                            .map(|v| v.as_str().unwrap_or("").to_string())
                            .collect()
                    })
                    .unwrap_or_default()
            };
            let es = side("es");
            let en = side("en");
            let len = es.len().max(en.len());
            (0..len)
                .map(|i| {
                    ListItem::with_id(
                        format!("li-{}", i + 1),
                        BilingualText {
                            es: es.get(i).cloned().unwrap_or_default(),
                            en: en.get(i).cloned().unwrap_or_default(),
                        },
                    )
                })
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Legacy flat `{key: value}` maps are treated as Spanish-only; bilingual
/// `{es: {..}, en: {..}}` maps pass through.
fn migrate_map(raw: &serde_json::Value) -> BilingualMap {
    let obj = match raw.as_object() {
        Some(o) => o,
        None => return BilingualMap::default(),
    };

    let looks_bilingual = obj.keys().all(|k| k == "es" || k == "en")
        && obj.values().all(|v| v.is_object());

    let to_side = |v: Option<&serde_json::Value>| -> BTreeMap<String, String> {
        v.and_then(|v| v.as_object())
            .map(|m| {
                m.iter()
                    .map(|(k, v)| (k.clone(), v.as_str().unwrap_or("").to_string()))
                    .collect()
            })
            .unwrap_or_default()
    };

    if looks_bilingual && !obj.is_empty() {
        BilingualMap {
            es: to_side(obj.get("es")),
            en: to_side(obj.get("en")),
        }
    } else {
        BilingualMap {
            es: obj
                .iter()
                .map(|(k, v)| (k.clone(), v.as_str().unwrap_or("").to_string()))
                .collect(),
            en: BTreeMap::new(),
        }
    }
}
