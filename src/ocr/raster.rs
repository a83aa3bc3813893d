//! PDF page rasterization.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::tools::run_tool;

/// File name prefix of rendered pages inside the work directory.
const PAGE_PREFIX: &str = "page";

/// Renders PDF pages to image files.
pub trait PageRasterizer: Send + Sync {
    /// Rasterizer name used in logs and errors.
    fn name(&self) -> &str;

    /// Render every page of `pdf` into `workdir` and return the image paths
    /// in page order.
    fn rasterize(&self, pdf: &Path, dpi: u32, workdir: &Path) -> Result<Vec<PathBuf>>;
}

/// Poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    program: OsString,
}

impl PdftoppmRasterizer {
    /// Create a rasterizer running `program`.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn name(&self) -> &str {
        "pdftoppm"
    }

    fn rasterize(&self, pdf: &Path, dpi: u32, workdir: &Path) -> Result<Vec<PathBuf>> {
        let dpi = dpi.to_string();
        let prefix = workdir.join(PAGE_PREFIX);
        run_tool(
            self.name(),
            &self.program,
            [
                "-r".as_ref(),
                dpi.as_ref(),
                "-png".as_ref(),
                pdf.as_os_str(),
                prefix.as_os_str(),
            ],
        )?;

        let pages = collect_pages(workdir)?;
        if pages.is_empty() {
            return Err(Error::conversion_failed(self.name(), "no pages rendered"));
        }
        log::debug!("Rendered {} pages at {} dpi", pages.len(), dpi);
        Ok(pages)
    }
}

/// Collect `page-N.png` files in numeric page order.
///
/// pdftoppm zero-pads the page number to the width of the page count, so
/// names are sorted by their parsed number rather than lexically.
pub(crate) fn collect_pages(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages: Vec<(u32, PathBuf)> = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if let Some(number) = page_number(&path) {
            pages.push((number, path));
        }
    }

    pages.sort_by_key(|(number, _)| *number);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

fn page_number(path: &Path) -> Option<u32> {
    if path.extension()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let number = stem.strip_prefix(PAGE_PREFIX)?.strip_prefix('-')?;
    number.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number() {
        assert_eq!(page_number(Path::new("/tmp/x/page-1.png")), Some(1));
        assert_eq!(page_number(Path::new("/tmp/x/page-012.png")), Some(12));
        assert_eq!(page_number(Path::new("/tmp/x/page-1.ppm")), None);
        assert_eq!(page_number(Path::new("/tmp/x/cover.png")), None);
    }

    #[test]
    fn test_collect_pages_numeric_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-2.png", "page-1.png", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let pages = collect_pages(dir.path()).unwrap();
        let names: Vec<_> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["page-1.png", "page-2.png", "page-10.png"]);
    }

    #[test]
    fn test_missing_pdftoppm_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let rasterizer = PdftoppmRasterizer::new("kurdocx-no-such-pdftoppm");
        let err = rasterizer
            .rasterize(Path::new("in.pdf"), 300, dir.path())
            .unwrap_err();
        assert!(matches!(err, Error::ToolUnavailable(_)));
    }
}
