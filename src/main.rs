//! ContentDesk - Main entry point
//!
//! Command-line admin tool for the bilingual content catalog: list, edit
//! ordering, archive/restore, auto-translate and sync collections against
//! the content API.

mod bilingual;
mod core;
mod db;
mod i18n;
mod order;
mod store;
mod translate;

use crate::core::{Config, Lang, Record, RecordSchema};
use crate::db::CacheDb;
use crate::i18n::I18n;
use crate::store::{ContentStore, LoadSource};
use crate::translate::{FieldConfig, Orchestrator, TranslateOutcome};
use anyhow::{bail, Context};

const USAGE: &str = "\
contentdesk <command> [args]

Commands:
  list <resource> [--lang es|en]        Show a collection
  push <resource> <file> [--allow-empty] [--message <text>]
                                        Save a JSON array as the collection
  archive <resource> <id>               Archive a record
  restore <resource> <id> [order]       Restore an archived record
  restore-backup <resource> <file>      Restore a server-side backup
  translate <resource> <id> [--force]   Auto-translate a record es -> en
  sync                                  Retry pending local saves

Resources: products, services, team, research";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load().context("failed to load configuration")?;
    let messages = I18n::new(&config.general.language);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match args.first() {
        Some(c) => c.as_str(),
        None => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    let cache = CacheDb::new().context("failed to open local cache")?;
    let store = ContentStore::new(config.api.clone(), cache)?;

    match command {
        "list" => {
            let resource = required(&args, 1, "resource")?;
            let lang = flag_value(&args, "--lang")
                .map(|c| Lang::parse(&c))
                .unwrap_or(Lang::Es);
            cmd_list(&store, &messages, &resource, lang).await
        }
        "push" => {
            let resource = required(&args, 1, "resource")?;
            let file = required(&args, 2, "file")?;
            let allow_empty = args.iter().any(|a| a == "--allow-empty");
            let message = flag_value(&args, "--message");
            cmd_push(&store, &messages, &resource, &file, allow_empty, message.as_deref()).await
        }
        "archive" => {
            let resource = required(&args, 1, "resource")?;
            let id = required(&args, 2, "id")?;
            cmd_archive(&store, &messages, &resource, &id).await
        }
        "restore" => {
            let resource = required(&args, 1, "resource")?;
            let id = required(&args, 2, "id")?;
            let position = args.get(3).and_then(|a| a.parse::<u32>().ok());
            cmd_restore(&store, &messages, &resource, &id, position).await
        }
        "restore-backup" => {
            let resource = required(&args, 1, "resource")?;
            let file = required(&args, 2, "file")?;
            let restored = store.restore_backup(&resource, &file).await?;
            println!("{}", messages.get_with("restore.backup_done", &restored));
            Ok(())
        }
        "translate" => {
            let resource = required(&args, 1, "resource")?;
            let id = required(&args, 2, "id")?;
            let force = args.iter().any(|a| a == "--force");
            cmd_translate(&store, &messages, &config, &resource, &id, force).await
        }
        "sync" => {
            let synced = store.sync_pending().await?;
            if synced.is_empty() {
                println!("{}", messages.get("sync.nothing"));
            } else {
                println!("{}", messages.get_with("sync.synced", &synced.join(", ")));
            }
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}\n\n{}", other, USAGE);
            std::process::exit(2);
        }
    }
}

fn required(args: &[String], index: usize, name: &str) -> anyhow::Result<String> {
    args.get(index)
        .filter(|a| !a.starts_with("--"))
        .cloned()
        .with_context(|| format!("missing argument: {}", name))
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn check_resource(resource: &str, messages: &I18n) -> anyhow::Result<RecordSchema> {
    match RecordSchema::for_resource(resource) {
        Some(schema) => Ok(schema),
        None => bail!("{}", messages.get_with("validation.unknown_resource", resource)),
    }
}

/// The record's display label: `name` for products/team, `title` otherwise
fn display_label(record: &Record, lang: Lang) -> String {
    let name = bilingual::get_field(record, "name", lang);
    if !name.is_empty() {
        return name;
    }
    bilingual::get_field(record, "title", lang)
}

async fn cmd_list(
    store: &ContentStore,
    messages: &I18n,
    resource: &str,
    lang: Lang,
) -> anyhow::Result<()> {
    check_resource(resource, messages)?;

    let (loaded, source) = store.load_with_source(resource).await;
    if source == LoadSource::Cache {
        println!("{}", messages.get_with("load.from_cache", resource));
    }

    let records = order::normalize(&loaded);
    if records.is_empty() {
        println!("{}", messages.get_with("load.empty", resource));
        return Ok(());
    }

    let mut active: Vec<&Record> = records.iter().filter(|r| !r.archived).collect();
    active.sort_by_key(|r| r.order);

    println!("{:<5} {:<24} {}", "ord", "id", "label");
    for record in active {
        println!(
            "{:<5} {:<24} {}",
            record.order,
            record.id,
            display_label(record, lang)
        );
    }
    for record in records.iter().filter(|r| r.archived) {
        println!(
            "{:<5} {:<24} {} (archived)",
            "-",
            record.id,
            display_label(record, lang)
        );
    }

    Ok(())
}

async fn cmd_push(
    store: &ContentStore,
    messages: &I18n,
    resource: &str,
    file: &str,
    allow_empty: bool,
    message: Option<&str>,
) -> anyhow::Result<()> {
    let schema = check_resource(resource, messages)?;

    let raw: Vec<serde_json::Value> = serde_json::from_str(&std::fs::read_to_string(file)?)
        .with_context(|| format!("failed to parse {}", file))?;
    let migrated = schema.migrate_all(&raw);
    let normalized = order::normalize(&migrated);

    save_and_report(store, messages, resource, &normalized, allow_empty, message).await
}

async fn cmd_archive(
    store: &ContentStore,
    messages: &I18n,
    resource: &str,
    id: &str,
) -> anyhow::Result<()> {
    check_resource(resource, messages)?;

    let records = store.load(resource).await;
    if !records.iter().any(|r| r.id == id) {
        bail!("{}", messages.get_with("validation.missing_id", id));
    }

    let updated = order::archive(&records, id);
    save_and_report(store, messages, resource, &updated, false, None).await?;
    println!("{}", messages.get("archive.done"));
    Ok(())
}

async fn cmd_restore(
    store: &ContentStore,
    messages: &I18n,
    resource: &str,
    id: &str,
    position: Option<u32>,
) -> anyhow::Result<()> {
    check_resource(resource, messages)?;

    let records = store.load(resource).await;
    if !records.iter().any(|r| r.id == id) {
        bail!("{}", messages.get_with("validation.missing_id", id));
    }

    let updated = order::restore(&records, id, position);
    let restored_order = updated
        .iter()
        .find(|r| r.id == id)
        .map(|r| r.order)
        .unwrap_or_default();

    save_and_report(store, messages, resource, &updated, false, None).await?;
    println!(
        "{}",
        messages.get_with("restore.done", &restored_order.to_string())
    );
    Ok(())
}

async fn cmd_translate(
    store: &ContentStore,
    messages: &I18n,
    config: &Config,
    resource: &str,
    id: &str,
    force: bool,
) -> anyhow::Result<()> {
    let schema = check_resource(resource, messages)?;

    let records = store.load(resource).await;
    let record = match records.iter().find(|r| r.id == id) {
        Some(r) => r.clone(),
        None => bail!("{}", messages.get_with("validation.missing_id", id)),
    };

    let orchestrator = Orchestrator::from_config(&config.translate)?;
    let field_config = FieldConfig::from_schema(&schema);
    let source = Lang::parse(&config.translate.source_lang);
    let target = Lang::parse(&config.translate.target_lang);

    match orchestrator
        .translate_record(&record, &field_config, source, target, force)
        .await
    {
        TranslateOutcome::NeedsConfirmation => {
            println!("{}", messages.get("translate.needs_confirmation"));
            println!("  contentdesk translate {} {} --force", resource, id);
            Ok(())
        }
        TranslateOutcome::Busy => {
            println!("{}", messages.get("translate.busy"));
            Ok(())
        }
        TranslateOutcome::Failed => {
            bail!("{}", messages.get("translate.failed"))
        }
        TranslateOutcome::Applied {
            record: updated,
            untranslated,
        } => {
            let merged: Vec<Record> = records
                .iter()
                .map(|r| if r.id == id { updated.clone() } else { r.clone() })
                .collect();
            save_and_report(store, messages, resource, &merged, false, None).await?;
            if untranslated > 0 {
                println!("{}", messages.get("translate.partial"));
            } else {
                println!("{}", messages.get("translate.done"));
            }
            Ok(())
        }
    }
}

/// Save a collection and tell the operator where the edits actually
/// landed. A failed remote push is a warning, never a silent success.
async fn save_and_report(
    store: &ContentStore,
    messages: &I18n,
    resource: &str,
    records: &[Record],
    allow_empty: bool,
    message: Option<&str>,
) -> anyhow::Result<()> {
    match store.save(resource, records, allow_empty, message).await {
        Ok(report) if report.remote_ok => {
            println!("{}", messages.get("save.ok"));
            Ok(())
        }
        Ok(_) => {
            println!("{}", messages.get("save.remote_failed"));
            Ok(())
        }
        Err(crate::core::Error::EmptyCollection(_)) => {
            bail!("{}", messages.get("save.empty_guard"))
        }
        Err(crate::core::Error::Api(msg)) => {
            bail!("{}", messages.get_with("save.rejected", &msg))
        }
        Err(e) => Err(e.into()),
    }
}
