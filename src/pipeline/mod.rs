//! Pipeline stages for Markdown-table-to-sheet conversion.
//!
//! Each submodule implements exactly one transformation step, all of them
//! pure in-memory computation. Persistence lives in [`crate::workbook`].
//!
//! ## Data Flow
//!
//! ```text
//! text ──▶ extract ──▶ tokenize ──▶ place ──▶ sheet
//!          (split)     (rows/cells) (grid)   (SheetArtifact)
//! ```
//!
//! 1. [`extract`]: find the first `<table>` block; keep the text lines
//!    before and after it
//! 2. [`tokenize`]: split the block into rows of cells with their spans
//! 3. [`place`]: bind every cell to an absolute position, skipping
//!    positions already claimed by earlier spans
//! 4. [`sheet`]: lay preamble, table and trailer out as one sheet
//!
//! [`scan`] is the shallow tag-pair scanner the first two stages share.

pub mod extract;
pub mod place;
pub mod scan;
pub mod sheet;
pub mod tokenize;
