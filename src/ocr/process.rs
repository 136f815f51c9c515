//! OCR processing of one PDF or image into per-page and merged Markdown.

use super::client::{OcrClient, RecognizeResponse};
use super::rasterize;
use crate::config::OcrConfig;
use crate::error::{Error, PageError};
use crate::output::OcrReport;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Raster formats the OCR service accepts directly.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif"];

/// What kind of input a path is, judged by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Image,
}

impl InputKind {
    pub fn classify(path: &Path) -> Result<Self, Error> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if ext == "pdf" {
            Ok(Self::Pdf)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Ok(Self::Image)
        } else {
            Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: ext,
            })
        }
    }
}

/// OCR `input` page by page and merge the Markdown.
///
/// Steps:
/// 1. create `config.output_dir`
/// 2. check `input` exists and has a supported extension
/// 3. health-check the service
/// 4. expand a PDF into page images at `config.dpi` (an image is one page)
/// 5. recognise each page in order; a failed page is recorded and skipped
/// 6. write the merged Markdown to [`OcrConfig::merged_path`]
///
/// # Errors
/// Fatal errors only: missing input, unsupported format, unreachable
/// service, rasterisation failure, or an output directory that cannot be
/// created. Page failures are reported in [`OcrReport::page_errors`].
pub async fn process_document<C: OcrClient + ?Sized>(
    input: &Path,
    client: &C,
    config: &OcrConfig,
) -> Result<OcrReport, Error> {
    let started = Instant::now();
    let output_dir = config.output_dir.clone();

    std::fs::create_dir_all(&output_dir).map_err(|e| Error::OutputWriteFailed {
        path: output_dir.clone(),
        source: e,
    })?;

    if !input.exists() {
        return Err(Error::FileNotFound {
            path: input.to_path_buf(),
        });
    }
    let kind = InputKind::classify(input)?;

    if !client.health_check().await {
        return Err(Error::OcrServiceUnavailable {
            url: config.api_url.clone(),
        });
    }

    info!("Processing {}", input.display());

    // ── Step 1: Page images ──────────────────────────────────────────────
    let images = match kind {
        InputKind::Pdf => {
            info!("PDF input, rasterising at {} DPI", config.dpi);
            rasterize::rasterize_pdf(input, config.dpi, &output_dir).await?
        }
        InputKind::Image => vec![input.to_path_buf()],
    };
    let total = images.len();
    info!("OCR of {} page image(s)", total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total);
    }

    // ── Step 2: Recognise each page ──────────────────────────────────────
    let mut report = OcrReport {
        input_file: input.to_path_buf(),
        total_pages: total,
        success_pages: 0,
        failed_pages: Vec::new(),
        page_errors: Vec::new(),
        page_files: Vec::new(),
        merged_file: None,
        output_dir: output_dir.clone(),
    };
    let mut contents: Vec<(usize, String)> = Vec::new();

    for (idx, image) in images.iter().enumerate() {
        let page = idx + 1;
        info!(
            "Page {}/{}: {}",
            page,
            total,
            image.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
        );
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page, total);
        }

        match recognise_page(client, image, page, config).await {
            Ok((path, content)) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_complete(page, total, content.len());
                }
                report.success_pages += 1;
                report.page_files.push(path);
                contents.push((page, content));
            }
            Err(err) => {
                error!("{}", err);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(page, total, &err.to_string());
                }
                report.failed_pages.push(page);
                report.page_errors.push(err);
            }
        }
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total, report.success_pages);
    }

    // ── Step 3: Merge ────────────────────────────────────────────────────
    if contents.is_empty() {
        warn!("No page produced Markdown; nothing to merge");
    } else {
        let merged_path = config.merged_path();
        match std::fs::write(&merged_path, assemble_merged(&contents)) {
            Ok(()) => {
                info!("Merged {} page(s) into {}", contents.len(), merged_path.display());
                report.merged_file = Some(merged_path);
            }
            Err(e) => error!("Failed to write merged file {}: {}", merged_path.display(), e),
        }
    }

    info!("{} ({:.1}s)", report.summary(), started.elapsed().as_secs_f64());
    Ok(report)
}

/// OCR one page and return its Markdown file path and content.
async fn recognise_page<C: OcrClient + ?Sized>(
    client: &C,
    image: &Path,
    page: usize,
    config: &OcrConfig,
) -> Result<(PathBuf, String), PageError> {
    let response = client
        .recognize_image(image, true, config.save_json, &config.output_dir)
        .await
        .map_err(|e| PageError::OcrFailed {
            page,
            detail: e.to_string(),
        })?;

    if response.is_error() {
        return Err(PageError::OcrFailed {
            page,
            detail: response.message.unwrap_or_else(|| "OCR failed".to_string()),
        });
    }

    let RecognizeResponse {
        markdown_path,
        markdown,
        ..
    } = response;

    match (markdown_path, markdown) {
        (Some(path), _) => {
            let path = resolve_markdown_path(&path, &config.output_dir);
            let content = std::fs::read_to_string(&path).map_err(|e| PageError::MarkdownUnreadable {
                page,
                path: path.clone(),
                detail: e.to_string(),
            })?;
            Ok((path, content))
        }
        (None, Some(content)) => {
            let stem = image
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("page_{page:03}"));
            let path = config.output_dir.join(format!("{stem}.md"));
            std::fs::write(&path, &content).map_err(|e| PageError::MarkdownUnreadable {
                page,
                path: path.clone(),
                detail: e.to_string(),
            })?;
            Ok((path, content))
        }
        (None, None) => Err(PageError::OcrFailed {
            page,
            detail: "service returned no Markdown".to_string(),
        }),
    }
}

/// A relative path from the service names a file inside `output_dir`.
pub fn resolve_markdown_path(path: &Path, output_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match path.file_name() {
        Some(name) => output_dir.join(name),
        None => output_dir.join(path),
    }
}

/// Join page Markdown into one document: a `<!-- Page N -->` header before
/// each page and a `---` rule between pages.
pub fn assemble_merged(pages: &[(usize, String)]) -> String {
    let mut out = String::new();
    for (i, (page, content)) in pages.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n---\n\n");
        }
        out.push_str(&format!("<!-- Page {} -->\n\n", page));
        out.push_str(content);
    }
    out
}
