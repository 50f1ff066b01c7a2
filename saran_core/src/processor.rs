//! `processor`：输入事件处理链。
//!
//! Processor 按顺序处理 `InputEvent`，对控制器做状态变更，并可产生 `Action`
//! （例如交给 worker 的过滤请求、写回输入框）。
//!
//! 当前链路（`Session::new` 默认组装）：
//! - `EditingProcessor`：开始/结束编辑、文本变化、失去焦点
//! - `NavigationProcessor`：上下移动高亮（仅在浮层可见时消费）
//! - `ConfirmProcessor`：回车/点击写回、Esc 关闭
//!
//! 没有 processor 消费的事件由宿主按普通输入框导航处理。

use crate::{
    controller::SuggestionController,
    key_event::{Action, Direction, InputEvent},
    model::FieldId,
    presentation::Overlay,
    token::Applied,
    vocabulary::VocabularySource,
};

/// Processor 执行结果：是否“消费”了本次事件。
///
/// - `Consume`：本 processor 已处理该事件，后续 processor 不再执行
/// - `Continue`：本 processor 不处理该事件，交给下一个 processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Consume,
    Continue,
}

/// Processor：处理输入事件并改变控制器；必要时产生输出动作。
pub trait Processor<O: Overlay> {
    fn process(
        &mut self,
        controller: &mut SuggestionController<O>,
        source: &dyn VocabularySource,
        input_event: &InputEvent,
    ) -> (ProcessStatus, Vec<Action>);
}

fn replace(field: Option<FieldId>, applied: Option<Applied>) -> Vec<Action> {
    match (field, applied) {
        (Some(field), Some(Applied { text, caret })) => vec![Action::Replace { field, text, caret }],
        _ => Vec::new(),
    }
}

/// 编辑相关事件的 processor。
pub struct EditingProcessor;

impl<O: Overlay> Processor<O> for EditingProcessor {
    fn process(
        &mut self,
        controller: &mut SuggestionController<O>,
        source: &dyn VocabularySource,
        input_event: &InputEvent,
    ) -> (ProcessStatus, Vec<Action>) {
        // 关闭时不绑定、不消费，所有事件都透传给宿主
        if !controller.config().enabled {
            return (ProcessStatus::Continue, Vec::new());
        }
        match input_event {
            InputEvent::EditingStarted {
                field,
                role,
                anchor,
            } => {
                controller.on_editing_started(*field, *role, *anchor, source.vocabulary(*role));
                (ProcessStatus::Consume, Vec::new())
            }
            InputEvent::TextChanged(text) => {
                // 宿主可能随时替换词表，每次文本变化都取最新快照
                if let Some(role) = controller.role() {
                    controller.set_vocabulary(source.vocabulary(role));
                }
                let actions = controller
                    .on_text_changed(text)
                    .map(Action::Filter)
                    .into_iter()
                    .collect();
                (ProcessStatus::Consume, actions)
            }
            InputEvent::EditingEnded => {
                controller.on_editing_ended();
                (ProcessStatus::Consume, Vec::new())
            }
            InputEvent::FocusLost => {
                controller.on_focus_lost();
                (ProcessStatus::Consume, Vec::new())
            }
            _ => (ProcessStatus::Continue, Vec::new()),
        }
    }
}

/// 方向键：浮层隐藏时不消费，交给输入框自己的导航。
pub struct NavigationProcessor;

impl<O: Overlay> Processor<O> for NavigationProcessor {
    fn process(
        &mut self,
        controller: &mut SuggestionController<O>,
        _source: &dyn VocabularySource,
        input_event: &InputEvent,
    ) -> (ProcessStatus, Vec<Action>) {
        let direction = match input_event {
            InputEvent::MoveUp => Direction::Up,
            InputEvent::MoveDown => Direction::Down,
            _ => return (ProcessStatus::Continue, Vec::new()),
        };
        if !controller.is_visible() {
            return (ProcessStatus::Continue, Vec::new());
        }
        controller.move_selection(direction);
        (ProcessStatus::Consume, Vec::new())
    }
}

/// 回车/点击/Esc。
pub struct ConfirmProcessor;

impl<O: Overlay> Processor<O> for ConfirmProcessor {
    fn process(
        &mut self,
        controller: &mut SuggestionController<O>,
        _source: &dyn VocabularySource,
        input_event: &InputEvent,
    ) -> (ProcessStatus, Vec<Action>) {
        if !controller.is_visible() {
            return (ProcessStatus::Continue, Vec::new());
        }
        let field = controller.field();
        match *input_event {
            // 没有高亮行时回车交还给输入框
            InputEvent::Confirm if controller.selection().is_none() => {
                (ProcessStatus::Continue, Vec::new())
            }
            InputEvent::Confirm => {
                let applied = controller.confirm_selection();
                (ProcessStatus::Consume, replace(field, applied))
            }
            InputEvent::PointerSelect(index) => {
                let applied = controller.select_by_pointer(index);
                (ProcessStatus::Consume, replace(field, applied))
            }
            InputEvent::Cancel => {
                controller.cancel();
                (ProcessStatus::Consume, Vec::new())
            }
            _ => (ProcessStatus::Continue, Vec::new()),
        }
    }
}
