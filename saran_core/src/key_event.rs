use crate::{
    model::{FieldId, FieldRole, Rect},
    worker::FilterRequest,
};

/// 输入事件（逻辑事件）。
///
/// 说明：
/// - `Session`/processor 只关心“语义事件”，不关心具体平台的通知和键值。
/// - GUI/CLI 层负责把文本框通知、方向键、回车、鼠标点击转换成这些事件。
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// 开始编辑某个输入框（按角色加载词表）
    EditingStarted {
        field: FieldId,
        role: FieldRole,
        /// 输入框在屏幕上的位置
        anchor: Rect,
    },
    /// 输入框文本变化（完整文本）
    TextChanged(String),
    /// 结束编辑
    EditingEnded,
    /// 宿主窗口失去焦点
    FocusLost,
    /// 上移高亮
    MoveUp,
    /// 下移高亮
    MoveDown,
    /// 回车：写回高亮候选
    Confirm,
    /// Esc：关闭浮层，不写回
    Cancel,
    /// 鼠标点击第 n 行
    PointerSelect(usize),
}

/// 高亮移动方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// 引擎输出动作（对宿主的“副作用”请求）。
#[derive(Debug, Clone)]
pub enum Action {
    /// 交给过滤 worker 执行
    Filter(FilterRequest),
    /// 替换输入框文本，并把光标放到 `caret`
    Replace {
        field: FieldId,
        text: String,
        caret: usize,
    },
}
