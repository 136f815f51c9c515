//! PDF rasterisation: render every page to a PNG file via pdfium.
//!
//! pdfium keeps thread-local state and blocks for the whole render, so the
//! work runs inside `tokio::task::spawn_blocking`.

use crate::error::Error;
use image::ImageFormat;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Points per inch in PDF user space.
const PDF_POINTS_PER_INCH: f32 = 72.0;

/// Directory that receives the page images of `pdf_path`:
/// `<out_dir>/<stem>_pages`.
pub fn pages_dir(pdf_path: &Path, out_dir: &Path) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    out_dir.join(format!("{stem}_pages"))
}

/// File name of the 1-based page `page_num`, zero-padded so lexical order
/// is page order.
pub fn page_file_name(page_num: usize) -> String {
    format!("page_{page_num:03}.png")
}

/// Render every page of `pdf_path` at `dpi` into [`pages_dir`].
///
/// Returns the PNG paths in page order.
pub async fn rasterize_pdf(pdf_path: &Path, dpi: u32, out_dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let path = pdf_path.to_path_buf();
    let target = pages_dir(pdf_path, out_dir);

    tokio::task::spawn_blocking(move || rasterize_blocking(&path, dpi, &target))
        .await
        .map_err(|e| Error::Internal(format!("Render task panicked: {}", e)))?
}

fn rasterize_blocking(pdf_path: &Path, dpi: u32, target: &Path) -> Result<Vec<PathBuf>, Error> {
    let pdfium = Pdfium::new(bind_pdfium()?);

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| Error::RasterisationFailed {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    std::fs::create_dir_all(target).map_err(|e| Error::OutputWriteFailed {
        path: target.to_path_buf(),
        source: e,
    })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages, rendering at {} DPI", pages.len(), dpi);

    let render_config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / PDF_POINTS_PER_INCH);

    let mut files = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| Error::RasterisationFailed {
                path: pdf_path.to_path_buf(),
                detail: format!("page {}: {:?}", page_num, e),
            })?;

        let image = bitmap.as_image();
        let file = target.join(page_file_name(page_num));
        image
            .save_with_format(&file, ImageFormat::Png)
            .map_err(|e| Error::RasterisationFailed {
                path: pdf_path.to_path_buf(),
                detail: format!("page {}: {}", page_num, e),
            })?;
        debug!(
            "Rendered page {} → {}x{} px ({})",
            page_num,
            image.width(),
            image.height(),
            file.display()
        );
        files.push(file);
    }

    Ok(files)
}

/// Bind to pdfium: `PDFIUM_LIB_PATH` first, then a library in the working
/// directory, then the system library.
fn bind_pdfium() -> Result<Box<dyn PdfiumLibraryBindings>, Error> {
    if let Ok(path) = std::env::var("PDFIUM_LIB_PATH") {
        return Pdfium::bind_to_library(&path)
            .map_err(|e| Error::PdfiumBindingFailed(format!("{}: {:?}", path, e)));
    }
    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Error::PdfiumBindingFailed(format!("{:?}", e)))
}
