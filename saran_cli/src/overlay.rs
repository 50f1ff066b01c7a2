//! 终端里的“浮层”：只记录状态，由 REPL 在每条命令后打印。

use saran_core::{model::Rect, presentation::Overlay};
use tracing::debug;

#[derive(Debug, Default)]
pub struct TerminalOverlay {
    attached: bool,
    frame: Rect,
    rows: Vec<String>,
    highlight: Option<usize>,
}

impl TerminalOverlay {
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// 渲染成多行文本；未挂上时返回 None。
    pub fn render(&self) -> Option<String> {
        if !self.attached {
            return None;
        }
        let mut out = format!(
            "  +-- saran ({:.0},{:.0} {:.0}x{:.0})\n",
            self.frame.min_x(),
            self.frame.min_y(),
            self.frame.size.width,
            self.frame.size.height
        );
        for (i, row) in self.rows.iter().enumerate() {
            let marker = if self.highlight == Some(i) { '>' } else { ' ' };
            out.push_str(&format!("  |{marker} {}. {row}\n", i + 1));
        }
        out.push_str("  +--");
        Some(out)
    }
}

impl Overlay for TerminalOverlay {
    fn show(&mut self, frame: Rect) {
        debug!(?frame, "terminal overlay attached");
        self.attached = true;
        self.frame = frame;
    }

    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    fn update_content(&mut self, candidates: &[String], highlight: Option<usize>) {
        self.rows = candidates.to_vec();
        self.highlight = highlight;
    }

    fn hide(&mut self) {
        debug!("terminal overlay detached");
        self.attached = false;
        self.rows.clear();
        self.highlight = None;
    }
}
