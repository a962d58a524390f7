use ab_glyph::FontArc;
use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Sans-serif faces tried in order when no font is given.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

pub fn load_font(path: &Path) -> Result<FontArc> {
    let bytes = fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
    FontArc::try_from_vec(bytes).map_err(|e| anyhow!("parsing font {}: {e}", path.display()))
}

/// First loadable font from the usual system locations.
pub fn find_system_font() -> Option<FontArc> {
    SYSTEM_FONTS.iter().find_map(|p| match load_font(Path::new(p)) {
        Ok(font) => {
            debug!(path = p, "using system font");
            Some(font)
        }
        Err(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_error() {
        let err = load_font(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/font.ttf"));
    }

    #[test]
    fn garbage_is_not_a_font() {
        let path = std::env::temp_dir().join("dims-render-not-a-font.ttf");
        fs::write(&path, b"definitely not a font").unwrap();
        assert!(load_font(&path).is_err());
        let _ = fs::remove_file(path);
    }
}
