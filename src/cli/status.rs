// src/cli/status.rs — Storage, auth, and backend status

use std::sync::Arc;

use crate::auth::AuthStore;
use crate::gallery::GalleryManager;
use crate::infra::config::Config;
use crate::infra::paths;
use crate::session::repository::SessionRepository;
use crate::session::store::FileKvStore;

pub fn show_status(config: &Config) -> anyhow::Result<()> {
    let repo = SessionRepository::new(Arc::new(FileKvStore::new(paths::sessions_dir())));
    let sessions = repo.all();

    let render_count = match GalleryManager::open(&paths::gallery_db_path()) {
        Ok(gallery) => gallery.store.count().unwrap_or(0),
        Err(_) => 0,
    };

    let auth = AuthStore::load().unwrap_or_default();

    println!("decora v{}", env!("CARGO_PKG_VERSION"));
    println!("  Backend:   {}", config.backend.base_url);
    if let Some(ref backup) = config.backend.backup_url {
        let armed = if config.backend.retry_backup {
            "enabled"
        } else {
            "disabled"
        };
        println!("  Backup:    {backup} (fallback {armed})");
    }
    println!(
        "  Auth:      {}",
        if auth.is_signed_in() {
            "signed in"
        } else {
            "not signed in"
        }
    );
    println!("  Sessions:  {} ({})", sessions.len(), paths::sessions_dir().display());
    println!(
        "  Renders:   {} ({})",
        render_count,
        paths::gallery_db_path().display()
    );
    Ok(())
}
