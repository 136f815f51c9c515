//! OCR front-end: turn a PDF or image into per-page Markdown.
//!
//! ```text
//! input ──▶ rasterize ──▶ client ──▶ process
//! (PDF)     (pdfium)      (HTTP)     (merge + report)
//! ```
//!
//! 1. [`rasterize`]: render PDF pages to PNG files; runs in
//!    `spawn_blocking` because pdfium blocks
//! 2. [`client`]: the OCR service contract and its HTTP implementation;
//!    the only network I/O
//! 3. [`process`]: drive the pages through the client in order, collect
//!    page failures and write the merged Markdown

pub mod client;
pub mod process;
pub mod rasterize;

pub use client::{HttpOcrClient, OcrClient, OcrClientError, RecognizeRequest, RecognizeResponse};
pub use process::{assemble_merged, process_document, InputKind};
