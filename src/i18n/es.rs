//! Spanish translations (primary operator language)

use std::collections::HashMap;

pub fn get_translations() -> HashMap<String, String> {
    let mut t = HashMap::new();

    // App general
    t.insert("app.title".into(), "ContentDesk".into());
    t.insert("app.version".into(), "Versi\u{00F3}n".into());

    // Save / persistence
    t.insert("save.ok".into(), "Cambios guardados correctamente".into());
    t.insert(
        "save.remote_failed".into(),
        "No se pudo guardar en el servidor. Los cambios quedaron en la copia local y se reintentar\u{00E1}n".into(),
    );
    t.insert(
        "save.empty_guard".into(),
        "No se puede guardar una colecci\u{00F3}n vac\u{00ED}a sin confirmaci\u{00F3}n expl\u{00ED}cita".into(),
    );
    t.insert("save.rejected".into(), "El servidor rechaz\u{00F3} el guardado: {}".into());

    // Load
    t.insert("load.empty".into(), "No hay contenido disponible para '{}'".into());
    t.insert(
        "load.from_cache".into(),
        "Mostrando la copia local de '{}' (el servidor no responde)".into(),
    );

    // Translation
    t.insert(
        "translate.needs_confirmation".into(),
        "El idioma de destino ya tiene contenido. Confirme para sobrescribirlo".into(),
    );
    t.insert("translate.busy".into(), "Ya hay una traducci\u{00F3}n en curso".into());
    t.insert("translate.done".into(), "Traducci\u{00F3}n completada".into());
    t.insert(
        "translate.partial".into(),
        "Algunos textos no se pudieron traducir y se conservaron en el idioma original".into(),
    );
    t.insert(
        "translate.failed".into(),
        "No se pudo contactar con el servicio de traducci\u{00F3}n. No se aplic\u{00F3} ning\u{00FA}n cambio".into(),
    );

    // Archive / restore
    t.insert("archive.done".into(), "Registro archivado".into());
    t.insert("restore.done".into(), "Registro restaurado en la posici\u{00F3}n {}".into());
    t.insert("restore.backup_done".into(), "Copia de seguridad restaurada: {}".into());

    // Sync
    t.insert("sync.synced".into(), "Sincronizado: {}".into());
    t.insert("sync.nothing".into(), "No hay cambios pendientes de sincronizar".into());

    // Validation
    t.insert("validation.unknown_resource".into(), "Recurso desconocido: {}".into());
    t.insert("validation.missing_id".into(), "No existe un registro con id '{}'".into());

    t
}
