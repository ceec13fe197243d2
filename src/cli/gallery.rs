// src/cli/gallery.rs — Render gallery commands

use std::path::PathBuf;

use base64::Engine;

use crate::gallery::GalleryManager;
use crate::infra::paths;

pub fn run_list(session_id: &str) -> anyhow::Result<()> {
    let gallery = GalleryManager::open(&paths::gallery_db_path())?;
    let renders = gallery.store.images_by_session(session_id)?;

    if renders.is_empty() {
        println!("No renders for session {session_id}.");
        return Ok(());
    }

    println!("{} render(s) for session {session_id}:", renders.len());
    for render in renders {
        println!(
            "  #{} - {} ({} KiB)",
            render.id,
            render.created_at,
            render.base64_image.len() / 1024,
        );
    }
    Ok(())
}

pub fn run_export(id: i64, output: Option<&str>) -> anyhow::Result<()> {
    let gallery = GalleryManager::open(&paths::gallery_db_path())?;
    let Some(render) = gallery.store.get_image(id)? else {
        println!("No render with id {id}.");
        return Ok(());
    };

    let path = match output {
        Some(path) => PathBuf::from(path),
        None => {
            std::fs::create_dir_all(paths::exports_dir())?;
            paths::exports_dir().join(format!("render-{id}.png"))
        }
    };

    let bytes = base64::engine::general_purpose::STANDARD.decode(render.base64_image.as_bytes())?;
    std::fs::write(&path, bytes)?;
    println!("Wrote {}.", path.display());
    Ok(())
}
