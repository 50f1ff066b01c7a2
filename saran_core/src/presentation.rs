//! `presentation`：候选浮层的状态机与几何计算。
//!
//! 平台相关的浮动面板（不抢焦点、作为宿主窗口的子窗口）藏在 `Overlay` 后面；
//! 这里只负责“什么时候 attach/detach、放在哪里”。
//!
//! 状态转换：
//! - `Hidden -> Shown`：第一次拿到非空列表（`Overlay::show`）
//! - `Shown -> Shown`：列表或位置变化（`update_content`/`set_frame`，不会重复 `show`）
//! - `Shown -> Hidden`：空列表、确认、结束编辑、失去焦点、drop

use tracing::debug;

use crate::model::Rect;

/// 浮层能力接口（由 GUI/CLI 宿主实现）。
pub trait Overlay {
    /// 作为宿主窗口的子窗口挂上，并放到 `frame`。
    fn show(&mut self, frame: Rect);
    /// 已挂上时移动位置。
    fn set_frame(&mut self, frame: Rect);
    /// 刷新行内容与高亮行。
    fn update_content(&mut self, candidates: &[String], highlight: Option<usize>);
    /// 从宿主窗口上摘下。
    fn hide(&mut self);
}

/// 浮层状态。
#[derive(Debug, Clone, Copy, PartialEq)]
enum PresentationState {
    Hidden,
    Shown { frame: Rect },
}

/// 浮层几何参数。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub row_height: f64,
    pub gap: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            row_height: 21.0,
            gap: 5.0,
        }
    }
}

/// 计算浮层位置：与输入框同宽，默认放在下方；下方放不下且上方空间更大时放在上方。
///
/// `screen` 为 None 时不做边界处理。
pub fn layout(anchor: Rect, screen: Option<Rect>, rows: usize, metrics: Metrics) -> Rect {
    let height = rows as f64 * metrics.row_height;
    let width = anchor.size.width;
    let below = anchor.max_y() + metrics.gap;
    let above = anchor.min_y() - metrics.gap - height;

    let Some(screen) = screen else {
        return Rect::new(anchor.min_x(), below, width, height);
    };

    let room_below = screen.max_y() - below;
    let room_above = anchor.min_y() - metrics.gap - screen.min_y();
    let y = if room_below < height && room_above > room_below {
        above
    } else {
        below
    };
    let x = anchor
        .min_x()
        .min(screen.max_x() - width)
        .max(screen.min_x());
    Rect::new(x, y, width, height)
}

/// 浮层状态机；持有 `Overlay`，保证每个 `Shown` 都有对应的 `hide`。
pub struct Presentation<O: Overlay> {
    overlay: O,
    state: PresentationState,
    metrics: Metrics,
}

impl<O: Overlay> Presentation<O> {
    pub fn new(overlay: O, metrics: Metrics) -> Self {
        Self {
            overlay,
            state: PresentationState::Hidden,
            metrics,
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, PresentationState::Shown { .. })
    }

    pub fn frame(&self) -> Option<Rect> {
        match self.state {
            PresentationState::Shown { frame } => Some(frame),
            PresentationState::Hidden => None,
        }
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    /// 根据候选列表刷新浮层；空列表即隐藏。
    pub fn present(
        &mut self,
        candidates: &[String],
        highlight: Option<usize>,
        anchor: Rect,
        screen: Option<Rect>,
    ) {
        if candidates.is_empty() {
            self.hide();
            return;
        }
        let frame = layout(anchor, screen, candidates.len(), self.metrics);
        self.overlay.update_content(candidates, highlight);
        match self.state {
            PresentationState::Hidden => {
                debug!(?frame, rows = candidates.len(), "attach suggestion overlay");
                self.overlay.show(frame);
            }
            PresentationState::Shown { frame: old } if old != frame => {
                self.overlay.set_frame(frame);
            }
            PresentationState::Shown { .. } => {}
        }
        self.state = PresentationState::Shown { frame };
    }

    /// 仅刷新高亮（键盘导航）。
    pub fn highlight(&mut self, candidates: &[String], highlight: Option<usize>) {
        if self.is_visible() {
            self.overlay.update_content(candidates, highlight);
        }
    }

    pub fn hide(&mut self) {
        if let PresentationState::Shown { .. } = self.state {
            debug!("detach suggestion overlay");
            self.overlay.hide();
            self.state = PresentationState::Hidden;
        }
    }
}

impl<O: Overlay> Drop for Presentation<O> {
    fn drop(&mut self) {
        self.hide();
    }
}
