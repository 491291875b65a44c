//! ContentDesk - Demo CLI
//!
//! Offline walkthrough of an editing session: legacy migration, bilingual
//! edits, ordering/archival, and auto-translation with a canned backend.
//! Nothing touches the network or the local cache.

use std::time::Duration;

// Import from our library
use contentdesk_lib::bilingual;
use contentdesk_lib::core::{Lang, Record, RecordSchema, Result};
use contentdesk_lib::order;
use contentdesk_lib::translate::{FieldConfig, Orchestrator, TranslateOutcome, Translator};
use async_trait::async_trait;
use serde_json::json;

/// Canned backend standing in for the real translation API
struct DemoTranslator;

#[async_trait]
impl Translator for DemoTranslator {
    async fn translate(&self, text: &str, _source: Lang, target: Lang) -> Result<String> {
        Ok(format!("{} [{}]", text, target.code()))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("==============================================");
    println!("   ContentDesk - Editing Session Demo");
    println!("==============================================\n");

    // 1. Migrate a legacy document
    println!("[1/4] Migrating legacy products document...");
    let schema = RecordSchema::products();
    let raw = vec![
        json!({
            "id": "fiber-scope",
            "order": 1,
            "name": "Analizador de fibra",
            "features": {"es": ["Medida rapida", "Portatil"], "en": ["Fast measurement"]},
            "specifications": {"Peso": "2 kg"},
            "image": "/img/fiber-scope.jpg"
        }),
        json!({
            "id": "fiber-bench",
            "order": 2,
            "name": {"es": "Banco de ensayo", "en": "Test bench"}
        }),
    ];
    let mut records = order::normalize(&schema.migrate_all(&raw));
    for r in &records {
        println!("      {} (order {})", r.id, r.order);
    }
    println!();

    // 2. Edit and insert
    println!("[2/4] Editing and inserting records...");
    let edited = bilingual::set_field(&records[0], "name", Lang::En, "Fiber analyzer");
    records = order::resolve_insertion(&records, edited, Some(1));

    let new_record = Record::new("fiber-kit");
    let new_record = bilingual::set_field(&new_record, "name", Lang::Es, "Kit de muestras");
    records = order::resolve_insertion(&records, new_record, Some(2));
    for r in &records {
        println!(
            "      order {}: {}",
            r.order,
            bilingual::get_field(r, "name", Lang::Es)
        );
    }
    println!();

    // 3. Archive and restore
    println!("[3/4] Archiving 'fiber-bench', then restoring it...");
    records = order::archive(&records, "fiber-bench");
    println!(
        "      active count after archive: {}",
        order::active_count(&records)
    );
    records = order::restore(&records, "fiber-bench", None);
    let restored = records.iter().find(|r| r.id == "fiber-bench").unwrap();
    println!("      restored at order {}\n", restored.order);

    // 4. Auto-translate
    println!("[4/4] Auto-translating 'fiber-scope' es -> en...");
    let orchestrator = Orchestrator::new(Box::new(DemoTranslator), Duration::ZERO);
    let field_config = FieldConfig::from_schema(&schema);
    let target = records.iter().find(|r| r.id == "fiber-scope").unwrap();

    // English already has content, so the first attempt asks to confirm
    match orchestrator
        .translate_record(target, &field_config, Lang::Es, Lang::En, false)
        .await
    {
        TranslateOutcome::NeedsConfirmation => {
            println!("      target has content -> confirmation required, retrying with force")
        }
        other => println!("      unexpected outcome: {:?}", other),
    }

    match orchestrator
        .translate_record(target, &field_config, Lang::Es, Lang::En, true)
        .await
    {
        TranslateOutcome::Applied { record: updated, .. } => {
            let prepared = bilingual::prepare_for_save(&updated);
            println!(
                "      name.en = {:?}",
                bilingual::get_field(&prepared, "name", Lang::En)
            );
            if let Some(items) = prepared.field("features").and_then(|f| f.as_list()) {
                for item in items {
                    println!("      feature.en = {:?}", item.text.en);
                }
            }
        }
        other => println!("      unexpected outcome: {:?}", other),
    }

    println!("\nDone.");
}
