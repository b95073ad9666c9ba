//! Link normalization: video ids, thumbnails and storage slugs

use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

const SLUG_SUFFIX_LEN: usize = 5;
const SLUG_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn video_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:youtube\.com/watch\?(?:[^#\s]*?&)??v=|youtu\.be/)([^&?#/\s]+)")
            .expect("video id pattern is valid")
    })
}

fn non_alphanumeric_run() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"))
}

/// Extract the video identifier from a `watch?v=` or `youtu.be/` link
///
/// Returns `None` for anything else; callers are expected to degrade
/// (e.g. store no thumbnail) rather than fail.
pub fn extract_video_id(url: &str) -> Option<String> {
    video_id_pattern()
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Full-resolution thumbnail for a video link, if an id can be found
pub fn thumbnail_url(url: &str) -> Option<String> {
    extract_video_id(url).map(|id| format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", id))
}

/// Lower-cased, hyphen-delimited form of a title with no random suffix
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let slug = non_alphanumeric_run().replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        "podcast".to_string()
    } else {
        slug.to_string()
    }
}

/// Slug for a new record: `slugify(title)` plus a short random suffix
pub fn create_slug(title: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SLUG_SUFFIX_LEN)
        .map(|_| SLUG_ALPHABET[rng.gen_range(0..SLUG_ALPHABET.len())] as char)
        .collect();

    format!("{}-{}", slugify(title), suffix)
}
