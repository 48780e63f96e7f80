//! # meda-editor — Editor core for meda
//!
//! - **[`position`]** — `Position` (line, col) and `ScreenPos` (row, col), 0-indexed
//! - **[`buffer`]** — `LineBuffer`, a rope of lines with dirty tracking
//! - **[`viewport`]** — `ViewportCursor`: cursor, sticky column, and the visible window
//! - **[`highlight`]** — per-line style classification and its content-keyed cache
//! - **[`overlay`]** — boxed widgets drawn over the text: list, yes/no, text input
//! - **[`router`]** — `FocusRouter`, which decides where each key goes
//! - **[`editor`]** — `Editor`, tying it all together
//!
//! The outside world comes in through three traits: [`surface::Surface`]
//! (drawing), [`keys::KeySource`] (keys) and [`files::FileStore`] (files).
//! [`config`] and [`error`] hold settings and error types.

pub mod buffer;
pub mod config;
pub mod editor;
pub mod error;
pub mod files;
pub mod highlight;
pub mod keys;
pub mod overlay;
pub mod position;
pub mod router;
pub mod surface;
pub mod viewport;
