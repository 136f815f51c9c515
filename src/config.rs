//! Configuration types.
//!
//! Two independent knobs live here:
//!
//! * [`SheetStyle`]: cosmetic and positional rules for the generated
//!   worksheets (column width, row height, border, header fill, how many
//!   leading table rows count as header). Passed explicitly into the
//!   placement engine, the sheet renderer and the workbook writer.
//!
//! * [`OcrConfig`]: everything the OCR front-end needs (service URL, output
//!   directory, DPI, merged file name). Built via [`OcrConfigBuilder`].

use crate::error::Error;
use crate::progress::ProgressCallback;
use crate::workbook::MAX_ROWS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Excel limits sheet names to 31 characters.
pub const MAX_SHEET_TITLE_LEN: usize = 31;

/// Cell border drawn around every table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    None,
    #[default]
    Thin,
    Medium,
    Thick,
}

/// Cosmetic rules for generated worksheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetStyle {
    /// Width applied to every used column, in Excel character units. Default: 20.
    pub column_width: f64,

    /// Height applied to every used row, in points. Default: 30.
    pub row_height: f64,

    /// Border drawn on every table cell. Default: thin.
    pub border: BorderStyle,

    /// Background of header cells as `0xRRGGBB`. Default: light grey `0xD3D3D3`.
    pub header_fill: u32,

    /// Number of leading physical table rows styled as header. Default: 2.
    ///
    /// This is a positional rule, not header detection: a table whose
    /// logical header is one or three rows deep is still styled by this count.
    pub header_rows: u32,

    /// Maximum sheet title length in characters. Default: 31.
    pub max_title_len: usize,
}

impl Default for SheetStyle {
    fn default() -> Self {
        Self {
            column_width: 20.0,
            row_height: 30.0,
            border: BorderStyle::Thin,
            header_fill: 0xD3D3D3,
            header_rows: 2,
            max_title_len: MAX_SHEET_TITLE_LEN,
        }
    }
}

impl SheetStyle {
    /// Reject values the xlsx format cannot represent.
    pub fn validate(&self) -> Result<(), Error> {
        if !(0.0..=255.0).contains(&self.column_width) {
            return Err(Error::InvalidConfig(format!(
                "column width must be 0–255, got {}",
                self.column_width
            )));
        }
        if !(0.0..=409.0).contains(&self.row_height) {
            return Err(Error::InvalidConfig(format!(
                "row height must be 0–409, got {}",
                self.row_height
            )));
        }
        if self.header_fill > 0xFF_FFFF {
            return Err(Error::InvalidConfig(format!(
                "header fill must be an RGB value, got {:#x}",
                self.header_fill
            )));
        }
        if self.header_rows > MAX_ROWS {
            return Err(Error::InvalidConfig(format!(
                "header rows must be at most {MAX_ROWS}, got {}",
                self.header_rows
            )));
        }
        if self.max_title_len == 0 || self.max_title_len > MAX_SHEET_TITLE_LEN {
            return Err(Error::InvalidConfig(format!(
                "sheet title length must be 1–{MAX_SHEET_TITLE_LEN}, got {}",
                self.max_title_len
            )));
        }
        Ok(())
    }
}

/// Configuration for OCR processing of a PDF or image.
///
/// # Example
/// ```rust
/// use ocr2xlsx::OcrConfig;
///
/// let config = OcrConfig::builder()
///     .api_url("http://ocr.internal:8000")
///     .dpi(300)
///     .output_dir("results")
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 300);
/// ```
#[derive(Clone)]
pub struct OcrConfig {
    /// Base URL of the OCR service. Default: `http://localhost:8000`.
    pub api_url: String,

    /// Directory receiving per-page Markdown and the merged file. Default: `output`.
    pub output_dir: PathBuf,

    /// Rasterisation DPI for PDF pages. Range: 72–600. Default: 200.
    ///
    /// 200 DPI keeps small table text legible to the OCR model; 300 helps
    /// with dense financial statements at the cost of larger uploads.
    pub dpi: u32,

    /// File name of the merged Markdown inside `output_dir`. Default: `merged_output.md`.
    pub merged_name: String,

    /// Ask the service to also save its JSON result. Default: false.
    pub save_json: bool,

    /// Per-request timeout for OCR calls in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            output_dir: PathBuf::from("output"),
            dpi: 200,
            merged_name: "merged_output.md".to_string(),
            save_json: false,
            api_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrConfig")
            .field("api_url", &self.api_url)
            .field("output_dir", &self.output_dir)
            .field("dpi", &self.dpi)
            .field("merged_name", &self.merged_name)
            .field("save_json", &self.save_json)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn OcrProgressCallback>"),
            )
            .finish()
    }
}

impl OcrConfig {
    /// Create a new builder for `OcrConfig`.
    pub fn builder() -> OcrConfigBuilder {
        OcrConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full path of the merged Markdown file.
    pub fn merged_path(&self) -> PathBuf {
        self.output_dir.join(&self.merged_name)
    }
}

/// Builder for [`OcrConfig`].
#[derive(Debug)]
pub struct OcrConfigBuilder {
    config: OcrConfig,
}

impl OcrConfigBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn merged_name(mut self, name: impl Into<String>) -> Self {
        self.config.merged_name = name.into();
        self
    }

    pub fn save_json(mut self, v: bool) -> Self {
        self.config.save_json = v;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<OcrConfig, Error> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(Error::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if !(c.api_url.starts_with("http://") || c.api_url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!(
                "API URL must start with http:// or https://, got '{}'",
                c.api_url
            )));
        }
        if c.merged_name.trim().is_empty() {
            return Err(Error::InvalidConfig("merged file name is empty".into()));
        }
        Ok(self.config)
    }
}
