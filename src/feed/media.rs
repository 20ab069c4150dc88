/// Preview image download and caching
///
/// The remote service hosts full-resolution photographs; the gallery
/// only needs a card-sized preview. Each image is downloaded once,
/// downscaled on a blocking task and cached on disk keyed by its date,
/// so revisiting a feed never refetches.

use std::fs;
use std::path::PathBuf;

use image::imageops::FilterType;

/// Bounding box (square) for cached previews, in pixels.
const PREVIEW_SIZE: u32 = 800;

/// Get the preview cache directory
/// Returns ~/.cache/stargram/previews on Linux
pub fn preview_cache_dir() -> PathBuf {
    let mut path = dirs_next::cache_dir()
        .or_else(|| dirs_next::home_dir())
        .expect("Could not determine cache directory");

    path.push("stargram");
    path.push("previews");
    path
}

/// Expected cache file for a date key (doesn't check existence).
pub fn preview_path(date: &str) -> PathBuf {
    preview_cache_dir().join(format!("{}.jpg", date))
}

/// Fetch the preview for one post, from cache when possible.
///
/// Returns the path of the cached file, or `None` on any failure; the
/// card then falls back to its placeholder instead of failing the feed.
pub async fn load_preview(client: reqwest::Client, date: String, url: String) -> Option<PathBuf> {
    let path = preview_path(&date);
    if path.exists() {
        return Some(path);
    }

    let response = client.get(&url).send().await.ok()?;
    let bytes = response.bytes().await.ok()?.to_vec();

    // Decoding and resizing are CPU-bound, keep them off the UI executor
    tokio::task::spawn_blocking(move || shrink_and_cache(bytes, path))
        .await
        .ok()?
}

/// Downscale the downloaded image and write it to the cache.
fn shrink_and_cache(bytes: Vec<u8>, path: PathBuf) -> Option<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }

    match image::load_from_memory(&bytes) {
        Ok(img) => {
            let preview = if img.width() > PREVIEW_SIZE || img.height() > PREVIEW_SIZE {
                img.resize(PREVIEW_SIZE, PREVIEW_SIZE, FilterType::Lanczos3)
            } else {
                img
            };
            // JPEG output has no alpha channel
            preview.to_rgb8().save(&path).ok()?;
        }
        Err(err) => {
            // Keep the original bytes untouched; the renderer may still
            // understand a format this decoder does not
            eprintln!("⚠️  Could not decode preview for {}: {}", path.display(), err);
            fs::write(&path, &bytes).ok()?;
        }
    }

    println!("📸 Cached preview: {}", path.display());
    Some(path)
}
