//! Auto-translation of record fields
//!
//! Drives an external text-translation backend field by field over a
//! record. The backend is injected behind the [`Translator`] trait so the
//! orchestrator can be exercised with a canned implementation in tests,
//! and the inter-call delay is plain configuration rather than a hardcoded
//! sleep. The backend is treated as unreliable: a failed call falls back
//! to the original untranslated string instead of aborting the batch.

use crate::core::{FieldValue, Lang, Record, RecordSchema, Result, TranslateConfig};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Which fields of a record participate in translation. Supplied per
/// record type by the caller; the orchestrator itself is type-agnostic.
#[derive(Debug, Clone, Default)]
pub struct FieldConfig {
    pub simple_fields: Vec<String>,
    pub list_fields: Vec<String>,
    pub map_fields: Vec<String>,
}

impl FieldConfig {
    /// Derive the translation layout from a resource schema
    pub fn from_schema(schema: &RecordSchema) -> Self {
        Self {
            simple_fields: schema.text_fields.iter().map(|s| s.to_string()).collect(),
            list_fields: schema.list_fields.iter().map(|s| s.to_string()).collect(),
            map_fields: schema.map_fields.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Single-string translation backend
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: Lang, target: Lang) -> Result<String>;
}

/// LibreTranslate-compatible HTTP backend
pub struct HttpTranslator {
    client: reqwest::Client,
    url: String,
}

impl HttpTranslator {
    pub fn new(config: &TranslateConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            client,
            url: config.api_url.clone(),
        })
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, source: Lang, target: Lang) -> Result<String> {
        let body = serde_json::json!({
            "q": text,
            "source": source.code(),
            "target": target.code(),
            "format": "text",
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: serde_json::Value = response.json().await?;
        payload
            .get("translatedText")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                crate::core::Error::Api("translation response missing translatedText".to_string())
            })
    }
}

/// Outcome of a translation request
#[derive(Debug)]
pub enum TranslateOutcome {
    /// Fields processed; the updated record is attached. `untranslated`
    /// counts strings the backend failed on, which were kept in the
    /// source language — the caller must tell the operator when it is
    /// non-zero.
    Applied { record: Record, untranslated: usize },
    /// Every backend call failed; the record was left unchanged
    Failed,
    /// The target language already holds content and `force_overwrite`
    /// was false; nothing was mutated. Re-invoke with the flag set after
    /// the operator confirms.
    NeedsConfirmation,
    /// Another translation for this session is still in flight
    Busy,
}

/// Names of configured fields holding non-empty content in `lang`.
/// Drives the "translatable" badge in the editing UI; it does not compare
/// source against target content.
pub fn detect_content(record: &Record, lang: Lang, config: &FieldConfig) -> Vec<String> {
    let mut found = Vec::new();

    for name in &config.simple_fields {
        if let Some(FieldValue::Text(text)) = record.field(name) {
            if !text.get(lang).is_empty() {
                found.push(name.clone());
            }
        }
    }
    for name in &config.list_fields {
        if let Some(FieldValue::List(items)) = record.field(name) {
            if items.iter().any(|i| !i.text.get(lang).is_empty()) {
                found.push(name.clone());
            }
        }
    }
    for name in &config.map_fields {
        if let Some(FieldValue::Map(map)) = record.field(name) {
            if !map.side(lang).is_empty() {
                found.push(name.clone());
            }
        }
    }

    found
}

/// Placeholder specification keys ("temp_1694112000", etc.) are operator
/// bookkeeping, not content; they keep their key verbatim and only the
/// value is translated.
fn is_placeholder_key(key: &str) -> bool {
    key.starts_with("temp_")
}

/// Drives field-by-field translation of one record. One instance per
/// editing session; repeat invocation while a run is in flight returns
/// [`TranslateOutcome::Busy`].
pub struct Orchestrator {
    translator: Box<dyn Translator>,
    delay: Duration,
    translating: AtomicBool,
}

impl Orchestrator {
    pub fn new(translator: Box<dyn Translator>, delay: Duration) -> Self {
        Self {
            translator,
            delay,
            translating: AtomicBool::new(false),
        }
    }

    /// Build from configuration with the HTTP backend
    pub fn from_config(config: &TranslateConfig) -> Result<Self> {
        Ok(Self::new(
            Box::new(HttpTranslator::new(config)?),
            Duration::from_millis(config.delay_ms),
        ))
    }

    /// Whether a translation run is currently in flight
    pub fn is_translating(&self) -> bool {
        self.translating.load(Ordering::SeqCst)
    }

    /// Translate every configured field of `record` from `source` into
    /// `target`.
    ///
    /// When the target language already holds content in any configured
    /// field and `force_overwrite` is false, nothing is touched and the
    /// caller gets [`TranslateOutcome::NeedsConfirmation`] back. Per-string
    /// backend failures degrade to the original text and are counted in
    /// the outcome; when every call fails the whole run is reported as
    /// [`TranslateOutcome::Failed`] and nothing is applied.
    pub async fn translate_record(
        &self,
        record: &Record,
        config: &FieldConfig,
        source: Lang,
        target: Lang,
        force_overwrite: bool,
    ) -> TranslateOutcome {
        if self.translating.swap(true, Ordering::SeqCst) {
            return TranslateOutcome::Busy;
        }

        if !force_overwrite && !detect_content(record, target, config).is_empty() {
            self.translating.store(false, Ordering::SeqCst);
            return TranslateOutcome::NeedsConfirmation;
        }

        let mut updated = record.clone();
        let mut throttle = Throttle::new(self.delay);

        for name in &config.simple_fields {
            if let Some(FieldValue::Text(text)) = updated.fields.get_mut(name) {
                if !text.get(source).is_empty() {
                    let translated = throttle
                        .call(self.translator.as_ref(), text.get(source), source, target)
                        .await;
                    text.set(target, translated);
                }
            }
        }

        for name in &config.list_fields {
            if let Some(FieldValue::List(items)) = updated.fields.get_mut(name) {
                for item in items.iter_mut() {
                    if !item.text.get(source).is_empty() {
                        let translated = throttle
                            .call(self.translator.as_ref(), item.text.get(source), source, target)
                            .await;
                        item.text.set(target, translated);
                    }
                }
            }
        }

        for name in &config.map_fields {
            if let Some(FieldValue::Map(map)) = updated.fields.get_mut(name) {
                // The target side is rebuilt from scratch so stale keys
                // from a previous pass do not linger.
                let mut rebuilt = BTreeMap::new();
                let source_side = map.side(source).clone();
                for (key, value) in source_side {
                    let target_key = if is_placeholder_key(&key) {
                        key.clone()
                    } else {
                        throttle
                            .call(self.translator.as_ref(), &key, source, target)
                            .await
                    };
                    let target_value = if value.is_empty() {
                        value.clone()
                    } else {
                        throttle
                            .call(self.translator.as_ref(), &value, source, target)
                            .await
                    };
                    rebuilt.insert(target_key, target_value);
                }
                *map.side_mut(target) = rebuilt;
            }
        }

        self.translating.store(false, Ordering::SeqCst);

        if throttle.attempted > 0 && throttle.failed == throttle.attempted {
            return TranslateOutcome::Failed;
        }
        TranslateOutcome::Applied {
            record: updated,
            untranslated: throttle.failed,
        }
    }
}

/// Inserts the configured delay between consecutive backend calls and
/// maps per-string failures to the original text, keeping count so the
/// orchestrator can report partial or total failure.
struct Throttle {
    delay: Duration,
    first: bool,
    attempted: usize,
    failed: usize,
}

impl Throttle {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            first: true,
            attempted: 0,
            failed: 0,
        }
    }

    async fn call(
        &mut self,
        translator: &dyn Translator,
        text: &str,
        source: Lang,
        target: Lang,
    ) -> String {
        if self.first {
            self.first = false;
        } else if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.attempted += 1;
        match translator.translate(text, source, target).await {
            Ok(translated) => translated,
            Err(e) => {
                log::warn!("translation failed for one string, keeping original: {}", e);
                self.failed += 1;
                text.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BilingualMap, BilingualText, Error, ListItem};

    /// Deterministic fake backend: wraps input in the target code
    struct TagTranslator;

    #[async_trait]
    impl Translator for TagTranslator {
        async fn translate(&self, text: &str, _source: Lang, target: Lang) -> Result<String> {
            Ok(format!("[{}]{}", target.code(), text))
        }
    }

    /// Backend that always fails
    struct DownTranslator;

    #[async_trait]
    impl Translator for DownTranslator {
        async fn translate(&self, _text: &str, _source: Lang, _target: Lang) -> Result<String> {
            Err(Error::Api("backend unreachable".to_string()))
        }
    }

    /// Backend that fails on one specific string only
    struct FlakyTranslator {
        poison: &'static str,
    }

    #[async_trait]
    impl Translator for FlakyTranslator {
        async fn translate(&self, text: &str, _source: Lang, target: Lang) -> Result<String> {
            if text == self.poison {
                return Err(Error::Api("timeout".to_string()));
            }
            Ok(format!("[{}]{}", target.code(), text))
        }
    }

    fn product_config() -> FieldConfig {
        FieldConfig::from_schema(&RecordSchema::products())
    }

    fn spanish_product() -> Record {
        let mut map = BilingualMap::default();
        map.es.insert("Peso".into(), "2 kg".into());
        map.es.insert("temp_1694112000".into(), "Pendiente".into());

        Record::new("p1")
            .with_field("name", FieldValue::Text(BilingualText::from_es("Analizador")))
            .with_field(
                "features",
                FieldValue::List(vec![ListItem::with_id(
                    "li-1",
                    BilingualText::from_es("Medida rapida"),
                )]),
            )
            .with_field("specifications", FieldValue::Map(map))
    }

    fn orchestrator(translator: Box<dyn Translator>) -> Orchestrator {
        Orchestrator::new(translator, Duration::ZERO)
    }

    #[test]
    fn test_detect_content_reports_source_fields() {
        let record = spanish_product();
        let found = detect_content(&record, Lang::Es, &product_config());
        assert_eq!(found, vec!["name", "features", "specifications"]);

        let empty = detect_content(&record, Lang::En, &product_config());
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_translate_fills_all_field_kinds() {
        let orch = orchestrator(Box::new(TagTranslator));
        let record = spanish_product();

        let outcome = orch
            .translate_record(&record, &product_config(), Lang::Es, Lang::En, false)
            .await;

        let updated = match outcome {
            TranslateOutcome::Applied { record, .. } => record,
            other => panic!("expected Applied, got {:?}", other),
        };

        let name = updated.field("name").and_then(|f| f.as_text()).unwrap();
        assert_eq!(name.en, "[en]Analizador");
        assert_eq!(name.es, "Analizador");

        let items = updated.field("features").and_then(|f| f.as_list()).unwrap();
        assert_eq!(items[0].text.en, "[en]Medida rapida");

        let map = updated
            .field("specifications")
            .and_then(|f| f.as_map())
            .unwrap();
        assert_eq!(map.en.get("[en]Peso").unwrap(), "[en]2 kg");
    }

    #[tokio::test]
    async fn test_placeholder_keys_keep_their_name() {
        let orch = orchestrator(Box::new(TagTranslator));
        let record = spanish_product();

        let outcome = orch
            .translate_record(&record, &product_config(), Lang::Es, Lang::En, false)
            .await;
        let updated = match outcome {
            TranslateOutcome::Applied { record, .. } => record,
            other => panic!("expected Applied, got {:?}", other),
        };

        let map = updated
            .field("specifications")
            .and_then(|f| f.as_map())
            .unwrap();
        // key preserved verbatim, value still translated
        assert_eq!(map.en.get("temp_1694112000").unwrap(), "[en]Pendiente");
    }

    #[tokio::test]
    async fn test_existing_target_content_needs_confirmation() {
        let orch = orchestrator(Box::new(TagTranslator));
        let mut record = spanish_product();
        record = crate::bilingual::set_field(&record, "name", Lang::En, "Hello");

        let outcome = orch
            .translate_record(&record, &product_config(), Lang::Es, Lang::En, false)
            .await;
        assert!(matches!(outcome, TranslateOutcome::NeedsConfirmation));
        // record untouched: caller still holds the original
        let name = record.field("name").and_then(|f| f.as_text()).unwrap();
        assert_eq!(name.en, "Hello");

        // the confirmation retry overwrites
        let outcome = orch
            .translate_record(&record, &product_config(), Lang::Es, Lang::En, true)
            .await;
        let updated = match outcome {
            TranslateOutcome::Applied { record, .. } => record,
            other => panic!("expected Applied, got {:?}", other),
        };
        let name = updated.field("name").and_then(|f| f.as_text()).unwrap();
        assert_eq!(name.en, "[en]Analizador");
    }

    #[tokio::test]
    async fn test_stale_target_map_keys_are_replaced() {
        let orch = orchestrator(Box::new(TagTranslator));
        let mut record = spanish_product();
        if let Some(FieldValue::Map(map)) = record.fields.get_mut("specifications") {
            map.en.insert("Obsolete".into(), "old".into());
        }

        let outcome = orch
            .translate_record(&record, &product_config(), Lang::Es, Lang::En, true)
            .await;
        let updated = match outcome {
            TranslateOutcome::Applied { record, .. } => record,
            other => panic!("expected Applied, got {:?}", other),
        };

        let map = updated
            .field("specifications")
            .and_then(|f| f.as_map())
            .unwrap();
        assert!(!map.en.contains_key("Obsolete"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_reports_failure() {
        let orch = orchestrator(Box::new(DownTranslator));
        let record = spanish_product();

        let outcome = orch
            .translate_record(&record, &product_config(), Lang::Es, Lang::En, false)
            .await;
        assert!(matches!(outcome, TranslateOutcome::Failed));

        // the caller's record is untouched and the gate is released
        let name = record.field("name").and_then(|f| f.as_text()).unwrap();
        assert_eq!(name.en, "");
        assert!(!orch.is_translating());
    }

    #[tokio::test]
    async fn test_partial_failure_counts_untranslated_strings() {
        let orch = orchestrator(Box::new(FlakyTranslator {
            poison: "Medida rapida",
        }));
        let record = spanish_product();

        let outcome = orch
            .translate_record(&record, &product_config(), Lang::Es, Lang::En, false)
            .await;
        let (updated, untranslated) = match outcome {
            TranslateOutcome::Applied {
                record,
                untranslated,
            } => (record, untranslated),
            other => panic!("expected Applied, got {:?}", other),
        };
        assert_eq!(untranslated, 1);

        // the failed string fell back to the source language
        let items = updated.field("features").and_then(|f| f.as_list()).unwrap();
        assert_eq!(items[0].text.en, "Medida rapida");
        let name = updated.field("name").and_then(|f| f.as_text()).unwrap();
        assert_eq!(name.en, "[en]Analizador");
    }

    #[tokio::test]
    async fn test_in_flight_gate_returns_busy() {
        let orch = orchestrator(Box::new(TagTranslator));
        orch.translating.store(true, Ordering::SeqCst);

        let outcome = orch
            .translate_record(&spanish_product(), &product_config(), Lang::Es, Lang::En, true)
            .await;
        assert!(matches!(outcome, TranslateOutcome::Busy));
    }
}
