use std::{ops::Deref, sync::Arc};

use arc_swap::ArcSwap;

use crate::model::FieldRole;

/// 词表快照：不可变、廉价克隆。
///
/// 宿主替换词表时交出一个新快照，而不是原地修改，所以控制器和 worker
/// 读取时不需要加锁。允许重复，排序无要求（filter 会重新排序）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary(Arc<Vec<String>>);

impl Vocabulary {
    pub fn new(words: Vec<String>) -> Self {
        Self(Arc::new(words))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Deref for Vocabulary {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<Arc<Vec<String>>> for Vocabulary {
    fn from(words: Arc<Vec<String>>) -> Self {
        Self(words)
    }
}

impl<S: Into<String>> FromIterator<S> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// 可原子替换的词表槽位（copy-on-replace）。
#[derive(Debug)]
pub struct SharedVocabulary {
    slot: ArcSwap<Vec<String>>,
}

impl Default for SharedVocabulary {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SharedVocabulary {
    pub fn new(words: Vec<String>) -> Self {
        Self {
            slot: ArcSwap::from_pointee(words),
        }
    }

    /// 当前快照；之后的替换不影响已取出的快照。
    pub fn snapshot(&self) -> Vocabulary {
        Vocabulary::from(self.slot.load_full())
    }

    /// 整体替换。
    pub fn replace(&self, words: Vec<String>) {
        self.slot.store(Arc::new(words));
    }

    /// read-copy-update：`f` 可能因并发写入被调用多次。
    pub fn update<F>(&self, mut f: F)
    where
        F: FnMut(&[String]) -> Vec<String>,
    {
        self.slot.rcu(|current| f(current.as_slice()));
    }
}

/// 词表来源抽象：core 不关心词表来自文件/数据库/内存。
pub trait VocabularySource: Send + Sync {
    /// 某个角色的输入框应使用的词表。
    fn vocabulary(&self, role: FieldRole) -> Vocabulary;
}

/// 所有角色共用同一份词表（测试、演示用）。
impl VocabularySource for Vocabulary {
    fn vocabulary(&self, _role: FieldRole) -> Vocabulary {
        self.clone()
    }
}

/// 所有角色共用一个可替换的词表。
impl VocabularySource for SharedVocabulary {
    fn vocabulary(&self, _role: FieldRole) -> Vocabulary {
        self.snapshot()
    }
}
