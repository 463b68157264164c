// src/app/gfx.rs
use std::path::Path;

use eframe::egui::{self as eg, ColorImage, TextureHandle};

/// Portrait sanity window around the usual 2:3 poster shape.
const POSTER_ASPECT: std::ops::RangeInclusive<f32> = 0.5..=0.9;

pub fn poster_aspect_ok(w: u32, h: u32) -> bool {
    if w == 0 || h == 0 {
        return false;
    }
    POSTER_ASPECT.contains(&((w as f32) / (h as f32)))
}

/// Upload an RGBA image to a GPU texture. (UI thread only)
pub fn upload_rgba(
    ctx: &eg::Context,
    w: u32,
    h: u32,
    bytes: &[u8],
    name: &str,
) -> TextureHandle {
    let img = ColorImage::from_rgba_unmultiplied([w as usize, h as usize], bytes);
    ctx.load_texture(name.to_string(), img, eg::TextureOptions::LINEAR)
}

/// Load a poster texture from a cached file. (UI thread only)
pub fn load_texture_from_path(
    ctx: &eg::Context,
    path: &Path,
    cache_name: &str,
) -> Result<TextureHandle, String> {
    let (w, h, bytes) = crate::app::cache::load_rgba(path)?;
    if !poster_aspect_ok(w, h) {
        return Err(format!("non-poster aspect {w}x{h}"));
    }
    if bytes.len() != (w as usize) * (h as usize) * 4 {
        return Err(format!("short pixel buffer for {w}x{h}"));
    }
    Ok(upload_rgba(ctx, w, h, &bytes, cache_name))
}
