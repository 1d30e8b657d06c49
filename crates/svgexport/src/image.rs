use crate::{pdf, png};
use std::path::Path;

/// Writes `svg_content` to `path`, converting it according to the path
/// extension. `dpi` only affects PNG output.
pub fn write(svg_content: &str, path: &Path, dpi: f32) -> Result<(), String> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| format!("Failed to get extension from path: {path:?}"))?;
    let bytes = match FileType::from_extension(extension) {
        Some(FileType::Svg) => svg_content.as_bytes().to_vec(),
        Some(FileType::Png) => png::render_to_bytes(svg_content, dpi)?,
        Some(FileType::Pdf) => pdf::render_to_bytes(svg_content)?,
        None => return Err(format!("Unsupported file extension: {extension:?}")),
    };
    std::fs::write(path, bytes).map_err(|e| format!("Unable to write {}: {e}", path.display()))
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum FileType {
    Svg,
    Png,
    Pdf,
}

impl FileType {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "svg" => Some(FileType::Svg),
            "png" => Some(FileType::Png),
            "pdf" => Some(FileType::Pdf),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOT: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"><circle cx="2" cy="2" r="1"/></svg>"#;

    #[test]
    fn file_type_from_extension_ignores_case() {
        assert_eq!(FileType::from_extension("SVG"), Some(FileType::Svg));
        assert_eq!(FileType::from_extension("png"), Some(FileType::Png));
        assert_eq!(FileType::from_extension("Pdf"), Some(FileType::Pdf));
        assert_eq!(FileType::from_extension("jpg"), None);
    }

    #[test]
    fn write_svg_is_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.svg");
        write(DOT, &path, 400.0).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DOT);
    }

    #[test]
    fn write_png_has_png_signature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        write(DOT, &path, 400.0).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn write_unknown_extension_err() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.gif");
        assert_eq!(
            write(DOT, &path, 400.0),
            Err("Unsupported file extension: \"gif\"".to_string())
        );
        assert!(!path.exists());
    }

    #[test]
    fn write_without_extension_err() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot");
        assert!(write(DOT, &path, 400.0)
            .unwrap_err()
            .starts_with("Failed to get extension"));
    }
}
