use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};
use std::time::{Duration, SystemTime};

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::config::{resolve_relative_path, AppConfig, DEFAULT_CACHE_DIR};

// Chosen once; `init_cache_dir` must run before the first `cache_dir` call
// for the configured location to win.
static CACHE_DIR_ONCE: OnceLock<PathBuf> = OnceLock::new();
static POSTER_DIR_ONCE: OnceLock<PathBuf> = OnceLock::new();
static POSTER_PRUNE_ONCE: Once = Once::new();

pub const POSTER_RETENTION_DAYS: u64 = 14;
const POSTER_RETENTION: Duration = Duration::from_secs(POSTER_RETENTION_DAYS * 24 * 60 * 60);

const POSTER_EXTS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

fn pick_cache_dir(cfg: Option<&AppConfig>) -> PathBuf {
    let configured = cfg
        .and_then(|c| c.cache_dir.clone())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| resolve_relative_path(DEFAULT_CACHE_DIR));
    let mut path = PathBuf::from(configured);
    if let Err(e) = fs::create_dir_all(&path) {
        warn!("failed to create cache dir {}: {e}", path.display());
        path = PathBuf::from(resolve_relative_path(DEFAULT_CACHE_DIR));
        let _ = fs::create_dir_all(&path);
    }
    path
}

/// Fix the cache location from config. Later calls keep the first choice.
pub fn init_cache_dir(cfg: &AppConfig) -> PathBuf {
    let dir = CACHE_DIR_ONCE.get_or_init(|| pick_cache_dir(Some(cfg)));
    info!("cache dir: {}", dir.display());
    dir.clone()
}

pub fn cache_dir() -> PathBuf {
    CACHE_DIR_ONCE.get_or_init(|| pick_cache_dir(None)).clone()
}

pub fn poster_cache_dir() -> PathBuf {
    let dir = POSTER_DIR_ONCE.get_or_init(|| {
        let mut path = cache_dir().join("posters");
        if let Err(e) = fs::create_dir_all(&path) {
            warn!("failed to create poster cache dir {}: {e}", path.display());
            path = cache_dir();
        }
        path
    });

    POSTER_PRUNE_ONCE.call_once({
        let path = dir.clone();
        move || {
            let swept = sweep_broken_in_dir(&path).unwrap_or(0);
            match prune_poster_cache_in_dir(&path, SystemTime::now()) {
                Ok(n) if n + swept > 0 => info!("poster cache: pruned {n} stale, {swept} broken"),
                Ok(_) => {}
                Err(err) => warn!("poster cache prune failed: {err}"),
            }
        }
    });

    dir.clone()
}

fn is_poster_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| POSTER_EXTS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Remove posters last written before `now - 14 days`.
pub fn prune_poster_cache_in_dir(dir: &Path, now: SystemTime) -> std::io::Result<usize> {
    let cutoff = now
        .checked_sub(POSTER_RETENTION)
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let mut removed = 0usize;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if !is_poster_file(&path) {
            continue;
        }
        let modified = entry
            .metadata()?
            .modified()
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if modified < cutoff && fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}

/// Drop leftovers from interrupted writes: `.part` files and empty posters.
pub fn sweep_broken_in_dir(dir: &Path) -> std::io::Result<usize> {
    let mut removed = 0usize;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let partial = path.extension().and_then(|e| e.to_str()) == Some("part");
        let empty = is_poster_file(&path) && entry.metadata()?.len() == 0;
        if (partial || empty) && fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}

pub fn url_to_cache_key(url: &str) -> String {
    format!("{:x}", md5::compute(url.as_bytes()))
}

/// `<image_base_url><posterPath>`; absolute poster URLs pass through.
pub fn poster_url(image_base_url: &str, poster_path: &str) -> Option<String> {
    let p = poster_path.trim();
    if p.is_empty() {
        return None;
    }
    if p.starts_with("http://") || p.starts_with("https://") {
        return Some(p.to_string());
    }
    let base = image_base_url.trim_end_matches('/');
    if p.starts_with('/') {
        Some(format!("{base}{p}"))
    } else {
        Some(format!("{base}/{p}"))
    }
}

pub fn find_cached_in(dir: &Path, key: &str) -> Option<PathBuf> {
    POSTER_EXTS
        .iter()
        .map(|ext| dir.join(format!("{key}.{ext}")))
        .find(|p| p.is_file())
}

/// Decode `bytes`, shrink to `max_width` keeping aspect, and write
/// `<dir>/<key>.jpg` through a `.part` file.
pub fn store_resized_in(
    dir: &Path,
    key: &str,
    bytes: &[u8],
    max_width: u32,
    quality: u8,
) -> Result<PathBuf, String> {
    let img = image::load_from_memory(bytes).map_err(|e| format!("decode poster: {e}"))?;

    let (w, h) = img.dimensions();
    let out: DynamicImage = if w > max_width {
        let new_h = ((h as f32) * (max_width as f32 / w as f32))
            .round()
            .max(1.0) as u32;
        img.resize_exact(max_width, new_h, FilterType::CatmullRom)
    } else {
        img
    };

    let mut jpeg_bytes: Vec<u8> = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg_bytes, quality)
        .encode_image(&out.to_rgb8())
        .map_err(|e| format!("jpeg encode: {e}"))?;

    fs::create_dir_all(dir).map_err(|e| format!("create {}: {e}", dir.display()))?;
    let dest = dir.join(format!("{key}.jpg"));
    let tmp = dest.with_extension("jpg.part");
    {
        let mut f = fs::File::create(&tmp).map_err(|e| format!("create tmp: {e}"))?;
        f.write_all(&jpeg_bytes)
            .map_err(|e| format!("write: {e}"))?;
    }
    fs::rename(&tmp, &dest).map_err(|e| format!("rename: {e}"))?;
    Ok(dest)
}

/// Download a poster with the shared pool client and cache it resized in `dir`.
pub fn download_and_store_resized_with_client(
    client: &Client,
    dir: &Path,
    url: &str,
    key: &str,
    max_width: u32,
    quality: u8,
) -> Result<PathBuf, String> {
    if let Some(hit) = find_cached_in(dir, key) {
        return Ok(hit);
    }

    let bytes = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .map_err(|e| format!("download {url}: {e}"))?;

    store_resized_in(dir, key, &bytes, max_width, quality)
}

/// Return (width, height, RGBA8 bytes) for a cached poster file.
pub fn load_rgba(path: &Path) -> Result<(u32, u32, Vec<u8>), String> {
    let img = image::ImageReader::open(path)
        .map_err(|e| format!("open image {}: {e}", path.display()))?
        .with_guessed_format()
        .map_err(|e| format!("guess format {}: {e}", path.display()))?
        .decode()
        .map_err(|e| format!("decode {}: {e}", path.display()))?;
    let (w, h) = img.dimensions();
    Ok((w, h, img.to_rgba8().into_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(w, h, Rgb([200, 40, 40]));
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn cache_key_is_stable_md5_hex() {
        let a = url_to_cache_key("https://image.tmdb.org/t/p/w500/abc.jpg");
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, url_to_cache_key("https://image.tmdb.org/t/p/w500/abc.jpg"));
        assert_ne!(a, url_to_cache_key("https://image.tmdb.org/t/p/w500/abd.jpg"));
    }

    #[test]
    fn poster_url_joins_base_and_path() {
        let base = "https://image.tmdb.org/t/p/w500/";
        assert_eq!(
            poster_url(base, "/abc.jpg").as_deref(),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg")
        );
        assert_eq!(
            poster_url(base, "abc.jpg").as_deref(),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg")
        );
        assert_eq!(
            poster_url(base, "https://cdn.example/x.png").as_deref(),
            Some("https://cdn.example/x.png")
        );
        assert_eq!(poster_url(base, "  "), None);
    }

    #[test]
    fn store_resized_shrinks_wide_posters() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_resized_in(dir.path(), "k1", &png_bytes(640, 960), 320, 75).unwrap();
        assert_eq!(path, dir.path().join("k1.jpg"));
        let (w, h, rgba) = load_rgba(&path).unwrap();
        assert_eq!((w, h), (320, 480));
        assert_eq!(rgba.len(), (w * h * 4) as usize);
        assert_eq!(find_cached_in(dir.path(), "k1"), Some(path));
        assert_eq!(find_cached_in(dir.path(), "missing"), None);
    }

    #[test]
    fn store_resized_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_resized_in(dir.path(), "bad", b"<html>nope</html>", 320, 75).is_err());
        assert_eq!(find_cached_in(dir.path(), "bad"), None);
    }

    #[test]
    fn prune_removes_only_stale_posters() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.jpg");
        let fresh = dir.path().join("fresh.jpg");
        let other = dir.path().join("session_token");
        for p in [&old, &fresh, &other] {
            fs::write(p, b"x").unwrap();
        }
        let now = SystemTime::now();
        let stale = now - Duration::from_secs((POSTER_RETENTION_DAYS + 1) * 24 * 60 * 60);
        for p in [&old, &other] {
            fs::File::options()
                .write(true)
                .open(p)
                .unwrap()
                .set_modified(stale)
                .unwrap();
        }

        assert_eq!(prune_poster_cache_in_dir(dir.path(), now).unwrap(), 1);
        assert!(!old.exists());
        assert!(fresh.exists());
        assert!(other.exists());
    }

    #[test]
    fn sweep_drops_partial_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg.part"), b"half").unwrap();
        fs::write(dir.path().join("b.jpg"), b"").unwrap();
        fs::write(dir.path().join("c.jpg"), b"ok").unwrap();
        assert_eq!(sweep_broken_in_dir(dir.path()).unwrap(), 2);
        assert!(dir.path().join("c.jpg").exists());
    }
}
