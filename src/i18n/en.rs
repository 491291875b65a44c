//! English translations

use std::collections::HashMap;

pub fn get_translations() -> HashMap<String, String> {
    let mut t = HashMap::new();

    // App general
    t.insert("app.title".into(), "ContentDesk".into());
    t.insert("app.version".into(), "Version".into());

    // Save / persistence
    t.insert("save.ok".into(), "Changes saved successfully".into());
    t.insert(
        "save.remote_failed".into(),
        "Could not save to the server. Your changes are kept in the local copy and will be retried".into(),
    );
    t.insert(
        "save.empty_guard".into(),
        "Refusing to save an empty collection without explicit confirmation".into(),
    );
    t.insert("save.rejected".into(), "The server rejected the save: {}".into());

    // Load
    t.insert("load.empty".into(), "No content available for '{}'".into());
    t.insert(
        "load.from_cache".into(),
        "Showing the local copy of '{}' (server unreachable)".into(),
    );

    // Translation
    t.insert(
        "translate.needs_confirmation".into(),
        "The target language already has content. Confirm to overwrite it".into(),
    );
    t.insert("translate.busy".into(), "A translation is already running".into());
    t.insert("translate.done".into(), "Translation finished".into());
    t.insert(
        "translate.partial".into(),
        "Some texts could not be translated and were kept in the original language".into(),
    );
    t.insert(
        "translate.failed".into(),
        "The translation service is unreachable. No changes were applied".into(),
    );

    // Archive / restore
    t.insert("archive.done".into(), "Record archived".into());
    t.insert("restore.done".into(), "Record restored at position {}".into());
    t.insert("restore.backup_done".into(), "Backup restored: {}".into());

    // Sync
    t.insert("sync.synced".into(), "Synced: {}".into());
    t.insert("sync.nothing".into(), "No pending changes to sync".into());

    // Validation
    t.insert("validation.unknown_resource".into(), "Unknown resource: {}".into());
    t.insert("validation.missing_id".into(), "No record with id '{}'".into());

    t
}
