//! Bilingual field editing
//!
//! Keeps the Spanish and English copies of a record consistent while a
//! form edits one language at a time. All operations are copy-on-write:
//! they take a record by reference and return the updated record, which
//! keeps editing-session state handling trivial for the caller.
//!
//! Spanish is the authored source language of the catalog: the save-time
//! fallback fills an empty English slot from Spanish, never the reverse.

use crate::core::{BilingualText, FieldValue, Lang, ListItem, Record};

/// Read a field's value for one language, with display-time fallback to
/// the other language when the requested slot is empty. The fallback is
/// never written back.
pub fn get_field(record: &Record, name: &str, lang: Lang) -> String {
    match record.field(name) {
        Some(FieldValue::Text(text)) => text.resolve(lang).to_string(),
        Some(FieldValue::Media(value)) => value.as_str().unwrap_or_default().to_string(),
        _ => String::new(),
    }
}

/// Write a text field for one language, preserving whatever the other
/// language already holds. Creates the field when absent.
pub fn set_field(record: &Record, name: &str, lang: Lang, value: &str) -> Record {
    let mut updated = record.clone();
    let mut text = match updated.fields.get(name) {
        Some(FieldValue::Text(t)) => t.clone(),
        _ => BilingualText::default(),
    };
    text.set(lang, value);
    updated.fields.insert(name.to_string(), FieldValue::Text(text));
    updated
}

/// Update one list item's text in one language, addressed by item id.
/// Unknown ids leave the record unchanged.
pub fn set_list_item(record: &Record, name: &str, item_id: &str, lang: Lang, value: &str) -> Record {
    let mut updated = record.clone();
    if let Some(FieldValue::List(items)) = updated.fields.get_mut(name) {
        if let Some(item) = items.iter_mut().find(|i| i.id == item_id) {
            item.text.set(lang, value);
        }
    }
    updated
}

/// Append a new list item authored in `lang`. The other language's slot
/// starts empty; because items are id-keyed, the languages can never
/// drift out of positional alignment.
pub fn push_list_item(record: &Record, name: &str, lang: Lang, value: &str) -> Record {
    let mut updated = record.clone();
    let mut text = BilingualText::default();
    text.set(lang, value);
    let item = ListItem::new(text);
    match updated.fields.get_mut(name) {
        Some(FieldValue::List(items)) => items.push(item),
        _ => {
            updated
                .fields
                .insert(name.to_string(), FieldValue::List(vec![item]));
        }
    }
    updated
}

/// Remove a list item by id. Removal drops both language copies at once,
/// so there is no per-language length divergence to reconcile.
pub fn remove_list_item(record: &Record, name: &str, item_id: &str) -> Record {
    let mut updated = record.clone();
    if let Some(FieldValue::List(items)) = updated.fields.get_mut(name) {
        items.retain(|i| i.id != item_id);
    }
    updated
}

/// Set one entry of a keyed-map field for one language only.
pub fn set_map_entry(record: &Record, name: &str, lang: Lang, key: &str, value: &str) -> Record {
    let mut updated = record.clone();
    if let Some(FieldValue::Map(map)) = updated.fields.get_mut(name) {
        map.side_mut(lang).insert(key.to_string(), value.to_string());
    } else {
        let mut map = crate::core::BilingualMap::default();
        map.side_mut(lang).insert(key.to_string(), value.to_string());
        updated.fields.insert(name.to_string(), FieldValue::Map(map));
    }
    updated
}

/// Rename a key in one language's map. The other language's key set is
/// untouched; the two sets are allowed to diverge.
pub fn rename_map_key(record: &Record, name: &str, lang: Lang, from: &str, to: &str) -> Record {
    let mut updated = record.clone();
    if let Some(FieldValue::Map(map)) = updated.fields.get_mut(name) {
        let side = map.side_mut(lang);
        if let Some(value) = side.remove(from) {
            side.insert(to.to_string(), value);
        }
    }
    updated
}

/// Remove a key from one language's map.
pub fn remove_map_entry(record: &Record, name: &str, lang: Lang, key: &str) -> Record {
    let mut updated = record.clone();
    if let Some(FieldValue::Map(map)) = updated.fields.get_mut(name) {
        map.side_mut(lang).remove(key);
    }
    updated
}

/// Save-time fallback: every text value (top-level fields and list item
/// texts) with content in Spanish but an empty English slot gets the
/// Spanish text copied into English, so neither language ever displays a
/// blank required field. English content is never copied into Spanish.
pub fn prepare_for_save(record: &Record) -> Record {
    let mut updated = record.clone();
    for value in updated.fields.values_mut() {
        match value {
            FieldValue::Text(text) => fill_missing_english(text),
            FieldValue::List(items) => {
                for item in items.iter_mut() {
                    fill_missing_english(&mut item.text);
                }
            }
            _ => {}
        }
    }
    updated
}

fn fill_missing_english(text: &mut BilingualText) {
    if text.en.is_empty() && !text.es.is_empty() {
        text.en = text.es.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BilingualText;

    fn record_with_text(name: &str, es: &str, en: &str) -> Record {
        Record::new("r1").with_field(
            name,
            FieldValue::Text(BilingualText {
                es: es.into(),
                en: en.into(),
            }),
        )
    }

    #[test]
    fn test_get_field_falls_back_to_spanish() {
        let record = record_with_text("name", "Hola", "");
        assert_eq!(get_field(&record, "name", Lang::En), "Hola");
        // fallback is display-only, nothing is persisted
        let stored = record.field("name").and_then(|f| f.as_text()).unwrap();
        assert_eq!(stored.en, "");
    }

    #[test]
    fn test_set_field_preserves_other_language() {
        let record = record_with_text("name", "Hola", "Hello");
        let updated = set_field(&record, "name", Lang::Es, "Buenas");

        let text = updated.field("name").and_then(|f| f.as_text()).unwrap();
        assert_eq!(text.es, "Buenas");
        assert_eq!(text.en, "Hello");
        // input untouched
        let original = record.field("name").and_then(|f| f.as_text()).unwrap();
        assert_eq!(original.es, "Hola");
    }

    #[test]
    fn test_set_field_creates_missing_field() {
        let record = Record::new("r1");
        let updated = set_field(&record, "tagline", Lang::En, "Precision first");

        let text = updated.field("tagline").and_then(|f| f.as_text()).unwrap();
        assert_eq!(text.en, "Precision first");
        assert_eq!(text.es, "");
    }

    #[test]
    fn test_prepare_for_save_fills_empty_english() {
        let record = record_with_text("name", "Hola", "");
        let saved = prepare_for_save(&record);

        let text = saved.field("name").and_then(|f| f.as_text()).unwrap();
        assert_eq!(text.en, "Hola");
    }

    #[test]
    fn test_prepare_for_save_never_copies_into_spanish() {
        let record = record_with_text("name", "", "Hello");
        let saved = prepare_for_save(&record);

        let text = saved.field("name").and_then(|f| f.as_text()).unwrap();
        assert_eq!(text.es, "");
        assert_eq!(text.en, "Hello");
    }

    #[test]
    fn test_prepare_for_save_covers_list_items() {
        let record = Record::new("r1").with_field(
            "features",
            FieldValue::List(vec![
                ListItem::with_id("li-1", BilingualText::from_es("Uno")),
                ListItem::with_id(
                    "li-2",
                    BilingualText {
                        es: "Dos".into(),
                        en: "Two".into(),
                    },
                ),
            ]),
        );

        let saved = prepare_for_save(&record);
        let items = saved.field("features").and_then(|f| f.as_list()).unwrap();
        assert_eq!(items[0].text.en, "Uno");
        assert_eq!(items[1].text.en, "Two");
    }

    #[test]
    fn test_list_item_edit_touches_one_language_only() {
        let record = Record::new("r1").with_field(
            "features",
            FieldValue::List(vec![ListItem::with_id(
                "li-1",
                BilingualText {
                    es: "Uno".into(),
                    en: "One".into(),
                },
            )]),
        );

        let updated = set_list_item(&record, "features", "li-1", Lang::En, "First");
        let items = updated.field("features").and_then(|f| f.as_list()).unwrap();
        assert_eq!(items[0].text.es, "Uno");
        assert_eq!(items[0].text.en, "First");
    }

    #[test]
    fn test_push_and_remove_list_item() {
        let record = Record::new("r1");
        let updated = push_list_item(&record, "skills", Lang::Es, "Microscopia");
        let items = updated.field("skills").and_then(|f| f.as_list()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text.es, "Microscopia");
        assert_eq!(items[0].text.en, "");

        let item_id = items[0].id.clone();
        let removed = remove_list_item(&updated, "skills", &item_id);
        let items = removed.field("skills").and_then(|f| f.as_list()).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_map_key_rename_leaves_other_language_alone() {
        let record = Record::new("r1");
        let record = set_map_entry(&record, "specifications", Lang::Es, "Peso", "2 kg");
        let record = set_map_entry(&record, "specifications", Lang::En, "Weight", "2 kg");

        let renamed = rename_map_key(&record, "specifications", Lang::Es, "Peso", "Masa");
        let map = renamed
            .field("specifications")
            .and_then(|f| f.as_map())
            .unwrap();
        assert!(map.es.contains_key("Masa"));
        assert!(!map.es.contains_key("Peso"));
        assert!(map.en.contains_key("Weight"));
    }

    #[test]
    fn test_unknown_ids_degrade_to_no_op() {
        let record = Record::new("r1");
        let updated = set_list_item(&record, "features", "ghost", Lang::Es, "x");
        assert!(updated.field("features").is_none());

        let updated = remove_map_entry(&record, "specifications", Lang::Es, "ghost");
        assert!(updated.field("specifications").is_none());
    }
}
