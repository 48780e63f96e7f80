// SPDX-License-Identifier: MIT
//
// meda-term — terminal backend for meda.
//
// Direct terminal control via ANSI escape sequences and raw termios, no
// TUI framework in between. The editor paints a FrameBuffer of cells, the
// differential renderer writes only what changed, and the input parser
// decodes raw stdin bytes into key events.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod diff;
pub mod input;
pub mod output;
pub mod terminal;
