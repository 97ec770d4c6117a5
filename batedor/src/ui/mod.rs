//! UI module root: one widget per panel, each reading only its own buffer.

use ratatui::layout::Rect;
use ratatui::Frame;

pub mod cpu;
pub mod disks;
pub mod header;
pub mod history;
pub mod mem;
pub mod net;
pub mod processes;
pub mod theme;
pub mod util;

pub trait Drawable {
    fn draw(&self, f: &mut Frame<'_>, area: Rect);
}
