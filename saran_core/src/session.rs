//! `Session`：对上层（GUI/CLI）提供的会话对象。
//!
//! `Session` 自身不做业务逻辑判断，而是：
//! - 持有 `SuggestionController`（状态）与 `VocabularySource`（按角色取词表）
//! - 持有 processors 链（可插拔）
//! - 把每次 `InputEvent` 依次交给 processors，直到被消费
//! - 输出 `Outcome`：是否消费、动作列表、最新快照

use crate::{
    config::SuggestionConfig,
    controller::SuggestionController,
    key_event::{Action, InputEvent},
    model::{Rect, Snapshot},
    presentation::Overlay,
    processor::{ConfirmProcessor, EditingProcessor, NavigationProcessor, ProcessStatus, Processor},
    vocabulary::VocabularySource,
    worker::FilterResponse,
};

/// 一次 `handle` 的结果。
#[derive(Debug, Clone)]
pub struct Outcome {
    /// false 表示宿主应按普通输入框行为处理该事件（例如方向键移动光标）
    pub consumed: bool,
    pub actions: Vec<Action>,
    pub snapshot: Snapshot,
}

pub struct Session<O: Overlay, S> {
    controller: SuggestionController<O>,
    source: S,
    processors: Vec<Box<dyn Processor<O>>>,
}

impl<O, S> Session<O, S>
where
    O: Overlay,
    S: VocabularySource,
{
    /// 创建会话，并组装默认 processors 链。
    pub fn new(overlay: O, source: S, config: SuggestionConfig) -> Self {
        Self {
            controller: SuggestionController::new(overlay, config),
            source,
            processors: vec![
                Box::new(EditingProcessor),
                Box::new(NavigationProcessor),
                Box::new(ConfirmProcessor),
            ],
        }
    }

    pub fn controller(&self) -> &SuggestionController<O> {
        &self.controller
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_visible(&self) -> bool {
        self.controller.is_visible()
    }

    pub fn set_screen(&mut self, screen: Option<Rect>) {
        self.controller.set_screen(screen);
    }

    /// 获取当前快照（只读）。
    pub fn snapshot(&self) -> Snapshot {
        self.controller.snapshot()
    }

    /// 处理一个输入事件。
    pub fn handle(&mut self, ev: InputEvent) -> Outcome {
        let mut actions = Vec::new();
        let mut consumed = false;
        for p in &mut self.processors {
            let (status, mut a) = p.process(&mut self.controller, &self.source, &ev);
            actions.append(&mut a);
            if status == ProcessStatus::Consume {
                consumed = true;
                break;
            }
        }
        Outcome {
            consumed,
            actions,
            snapshot: self.controller.snapshot(),
        }
    }

    /// 交付 worker 的过滤结果；返回是否被采用。
    pub fn deliver(&mut self, response: FilterResponse) -> bool {
        self.controller.on_filter_result(response)
    }
}
