//! `SuggestionController`：绑定到一个输入框的有状态协调者。
//!
//! 约定：
//! - 同一时刻最多绑定一个输入框；重新绑定会取消旧绑定上所有未完成的过滤
//! - 文本变化产生 `FilterRequest`，由宿主交给 worker；只有最新一代的结果会被接受
//! - 所有操作在无绑定/越界时静默不做事，没有错误返回
//! - 选中状态 `selection` 为 None 表示“未选中”

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{
    config::{ClickPolicy, SuggestionConfig},
    key_event::Direction,
    model::{FieldId, FieldRole, Rect, Snapshot},
    presentation::{Metrics, Overlay, Presentation},
    token::{Applied, apply_candidate, typed_token},
    vocabulary::Vocabulary,
    worker::{FilterRequest, FilterResponse, GenerationClock},
};

/// 当前绑定的输入框。
#[derive(Debug)]
struct Binding {
    field: FieldId,
    /// 词表按角色取，文本变化时重新取快照
    role: FieldRole,
    anchor: Rect,
    /// 输入框完整文本（最近一次 `on_text_changed`，或写回后的文本）
    text: String,
    /// 绑定级取消令牌；每个请求持有它的子令牌
    cancel: CancellationToken,
}

/// 已发出、尚未收到结果的请求。
#[derive(Debug)]
struct Pending {
    generation: u64,
    cancel: CancellationToken,
}

pub struct SuggestionController<O: Overlay> {
    config: SuggestionConfig,
    presentation: Presentation<O>,
    binding: Option<Binding>,
    vocabulary: Vocabulary,
    candidates: Vec<String>,
    selection: Option<usize>,
    generations: GenerationClock,
    pending: Option<Pending>,
    /// 屏幕可用区域；None 时浮层总在输入框下方
    screen: Option<Rect>,
}

impl<O: Overlay> SuggestionController<O> {
    pub fn new(overlay: O, config: SuggestionConfig) -> Self {
        let metrics = Metrics {
            row_height: config.row_height,
            gap: config.gap,
        };
        Self {
            config,
            presentation: Presentation::new(overlay, metrics),
            binding: None,
            vocabulary: Vocabulary::empty(),
            candidates: Vec::new(),
            selection: None,
            generations: GenerationClock::new(),
            pending: None,
            screen: None,
        }
    }

    pub fn config(&self) -> &SuggestionConfig {
        &self.config
    }

    pub fn overlay(&self) -> &O {
        self.presentation.overlay()
    }

    /// 宿主据此决定方向键/回车是否交给候选系统。
    pub fn is_visible(&self) -> bool {
        self.presentation.is_visible()
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn field(&self) -> Option<FieldId> {
        self.binding.as_ref().map(|b| b.field)
    }

    pub fn role(&self) -> Option<FieldRole> {
        self.binding.as_ref().map(|b| b.role)
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn set_screen(&mut self, screen: Option<Rect>) {
        self.screen = screen;
        self.refresh();
    }

    /// 输入框移动/改变大小后更新位置。
    pub fn set_anchor(&mut self, anchor: Rect) {
        if let Some(binding) = &mut self.binding {
            binding.anchor = anchor;
            self.refresh();
        }
    }

    /// 替换词表；下一次文本变化开始生效，已发出的请求仍用旧快照。
    pub fn set_vocabulary(&mut self, vocabulary: Vocabulary) {
        self.vocabulary = vocabulary;
    }

    /// 开始编辑：绑定输入框并加载该角色的词表。
    pub fn on_editing_started(
        &mut self,
        field: FieldId,
        role: FieldRole,
        anchor: Rect,
        vocabulary: Vocabulary,
    ) {
        self.unbind();
        debug!(?field, %role, words = vocabulary.len(), "bind suggestion field");
        self.binding = Some(Binding {
            field,
            role,
            anchor,
            text: String::new(),
            cancel: CancellationToken::new(),
        });
        self.vocabulary = vocabulary;
    }

    /// 文本变化：重新计算 token 并发出新的过滤请求（取代尚未完成的旧请求）。
    pub fn on_text_changed(&mut self, text: &str) -> Option<FilterRequest> {
        if !self.config.enabled {
            return None;
        }
        let binding = self.binding.as_mut()?;
        binding.text.clear();
        binding.text.push_str(text);
        let field = binding.field;
        let cancel = binding.cancel.child_token();

        let token = typed_token(text);
        if token.is_empty() {
            self.dismiss();
            return None;
        }

        if let Some(prev) = self.pending.take() {
            prev.cancel.cancel();
        }
        let generation = self.generations.next();
        self.pending = Some(Pending {
            generation,
            cancel: cancel.clone(),
        });
        let request = FilterRequest::new(
            field,
            generation,
            token,
            self.vocabulary.clone(),
            self.config.limit(),
            cancel,
        )
        .with_debounce(self.config.debounce());
        Some(request)
    }

    /// 接收过滤结果；过期结果（旧代数/旧绑定）直接丢弃并返回 false。
    pub fn on_filter_result(&mut self, response: FilterResponse) -> bool {
        let current = matches!(
            (&self.binding, &self.pending),
            (Some(b), Some(p)) if b.field == response.field && p.generation == response.generation
        );
        if !current {
            trace!(
                field = ?response.field,
                generation = response.generation,
                "discard stale filter result"
            );
            return false;
        }
        self.pending = None;
        self.candidates = response.candidates;
        self.selection = match self.selection {
            _ if self.candidates.is_empty() => None,
            Some(i) if i < self.candidates.len() => Some(i),
            _ => self.config.highlight_first.then_some(0),
        };
        self.refresh();
        true
    }

    /// 结束编辑：无条件隐藏，不写回，解除绑定。
    pub fn on_editing_ended(&mut self) {
        self.unbind();
    }

    /// 宿主窗口失去焦点：隐藏，保留绑定。
    pub fn on_focus_lost(&mut self) {
        self.dismiss();
    }

    /// Esc：隐藏，不写回。
    pub fn cancel(&mut self) {
        self.dismiss();
    }

    /// 循环移动高亮；浮层隐藏或列表为空时不做事。
    pub fn move_selection(&mut self, direction: Direction) {
        if !self.is_visible() || self.candidates.is_empty() {
            return;
        }
        let count = self.candidates.len();
        let next = match (direction, self.selection) {
            (Direction::Down, Some(i)) if i + 1 < count => i + 1,
            (Direction::Down, _) => 0,
            (Direction::Up, Some(i)) if i > 0 && i < count => i - 1,
            (Direction::Up, _) => count - 1,
        };
        self.selection = Some(next);
        self.presentation.highlight(&self.candidates, self.selection);
    }

    /// 写回高亮候选（替换末尾 token，追加分隔符，光标到末尾），然后隐藏。
    pub fn confirm_selection(&mut self) -> Option<Applied> {
        let index = self.selection?;
        let candidate = self.candidates.get(index)?.clone();
        let binding = self.binding.as_mut()?;
        let applied = apply_candidate(&binding.text, &candidate);
        binding.text = applied.text.clone();
        debug!(field = ?binding.field, %candidate, "apply suggestion");
        self.dismiss();
        Some(applied)
    }

    /// 鼠标点击第 `index` 行，行为由 `ClickPolicy` 决定。
    ///
    /// `SelectThenConfirm` 下点击已高亮的行直接写回；`highlight_first` 开启时
    /// 第 0 行一出现就是高亮的，所以单击第 0 行即写回。
    pub fn select_by_pointer(&mut self, index: usize) -> Option<Applied> {
        if !self.is_visible() || index >= self.candidates.len() {
            return None;
        }
        match self.config.click_policy {
            ClickPolicy::ConfirmImmediately => {
                self.selection = Some(index);
                self.confirm_selection()
            }
            ClickPolicy::SelectThenConfirm if self.selection == Some(index) => {
                self.confirm_selection()
            }
            ClickPolicy::SelectThenConfirm => {
                self.selection = Some(index);
                self.presentation.highlight(&self.candidates, self.selection);
                None
            }
        }
    }

    /// 生成宿主只读快照。
    pub fn snapshot(&self) -> Snapshot {
        let text = self
            .binding
            .as_ref()
            .map(|b| b.text.clone())
            .unwrap_or_default();
        Snapshot {
            field: self.field(),
            token: typed_token(&text).to_owned(),
            text,
            candidates: self.candidates.clone(),
            selection: self.selection,
            frame: self.presentation.frame(),
        }
    }

    /// 隐藏浮层并清空列表（保留绑定）。
    fn dismiss(&mut self) {
        if let Some(prev) = self.pending.take() {
            prev.cancel.cancel();
        }
        self.candidates.clear();
        self.selection = None;
        self.presentation.hide();
    }

    fn unbind(&mut self) {
        self.dismiss();
        if let Some(old) = self.binding.take() {
            debug!(field = ?old.field, "unbind suggestion field");
            old.cancel.cancel();
        }
    }

    fn refresh(&mut self) {
        let Some(binding) = &self.binding else {
            return;
        };
        if self.candidates.is_empty() {
            self.presentation.hide();
            return;
        }
        self.presentation
            .present(&self.candidates, self.selection, binding.anchor, self.screen);
    }
}

impl<O: Overlay> Drop for SuggestionController<O> {
    fn drop(&mut self) {
        // presentation 随后 drop 时会摘下浮层
        if let Some(binding) = &self.binding {
            binding.cancel.cancel();
        }
    }
}
