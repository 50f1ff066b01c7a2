use std::{collections::BTreeSet, fs, io, path::Path};

use saran_core::{
    model::{FieldRole, UnknownRole},
    token::capitalized_and_trimmed,
    vocabulary::{SharedVocabulary, Vocabulary, VocabularySource},
};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum VocabError {
    #[error("failed to read vocabulary file: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: {source}")]
    Role { line: usize, source: UnknownRole },
    #[error("line {line}: missing role or value")]
    Missing { line: usize },
}

/// 从一条记录的字段值里提取候选词。
///
/// - 按空白切分，保留长度大于 2、或长度大于 1 且以字母开头的词
/// - 整个值（首字母大写、去首尾空白）也作为一个候选
///
/// 例如 `"jl. merdeka 5"` -> `["jl.", "merdeka", "Jl. Merdeka 5"]`
pub fn harvest(value: &str) -> Vec<String> {
    let value = value.trim();
    if value.is_empty() {
        return Vec::new();
    }
    let mut out: Vec<String> = value
        .split_whitespace()
        .filter(|w| {
            let n = w.chars().count();
            n > 2 || (n > 1 && w.chars().next().is_some_and(char::is_alphabetic))
        })
        .map(str::to_owned)
        .collect();
    out.push(capitalized_and_trimmed(value));
    out
}

/// 按角色分组的词表仓库。
///
/// 每个角色一个可原子替换的槽位：写入（新记录、整体替换）发布新快照，
/// 正在使用旧快照的控制器/worker 不受影响。
#[derive(Debug)]
pub struct VocabularyStore {
    /// 下标为 `FieldRole as usize`
    slots: [SharedVocabulary; FieldRole::ALL.len()],
}

impl Default for VocabularyStore {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| SharedVocabulary::default()),
        }
    }
}

impl VocabularyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, role: FieldRole) -> &SharedVocabulary {
        &self.slots[role as usize]
    }

    /// 整体替换某个角色的词表。
    pub fn replace(&self, role: FieldRole, words: Vec<String>) {
        debug!(%role, words = words.len(), "replace vocabulary");
        self.slot(role).replace(words);
    }

    /// 记录一个新字段值：提取出的词并入该角色词表（去重、排序）。
    pub fn record(&self, role: FieldRole, value: &str) {
        let words = harvest(value);
        if words.is_empty() {
            return;
        }
        self.slot(role).update(|current| {
            let mut set: BTreeSet<String> = current.iter().cloned().collect();
            set.extend(words.iter().cloned());
            set.into_iter().collect()
        });
    }

    /// 每个角色的词数。
    pub fn counts(&self) -> Vec<(FieldRole, usize)> {
        FieldRole::ALL
            .into_iter()
            .map(|role| (role, self.slot(role).snapshot().len()))
            .collect()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, VocabError> {
        let s = fs::read_to_string(path.as_ref())?;
        let store = Self::from_tsv_str(&s)?;
        info!(path = %path.as_ref().display(), "loaded vocabulary");
        Ok(store)
    }

    /// TSV 格式（简化版）：
    ///
    /// - `role<TAB>value`，role 为 `namaguru`/`namasiswa`/`alamat`/`ttl`/`mapel`/`jabatan`
    /// - value 按 [`harvest`] 的规则拆成候选词
    /// - 允许 `#` 开头注释行与空行
    pub fn from_tsv_str(s: &str) -> Result<Self, VocabError> {
        let store = Self::new();
        for (idx, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut it = line.splitn(2, '\t');
            let role = it.next().unwrap_or("").trim();
            let value = it.next().unwrap_or("").trim();
            if role.is_empty() || value.is_empty() {
                return Err(VocabError::Missing { line: idx + 1 });
            }
            let role: FieldRole = role.parse().map_err(|source| VocabError::Role {
                line: idx + 1,
                source,
            })?;
            store.record(role, value);
        }
        Ok(store)
    }
}

impl VocabularySource for VocabularyStore {
    fn vocabulary(&self, role: FieldRole) -> Vocabulary {
        self.slot(role).snapshot()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn harvest_keeps_meaningful_words_and_full_value() {
        assert_eq!(
            harvest("jl. merdeka 5"),
            ["jl.", "merdeka", "Jl. Merdeka 5"]
        );
        assert_eq!(harvest("Siti Nur Aminah"), ["Siti", "Nur", "Aminah", "Siti Nur Aminah"]);
    }

    #[test]
    fn harvest_drops_short_tokens() {
        // "12" 长度 2 但不以字母开头；"A" 太短
        assert_eq!(harvest("A 12 Bu"), ["Bu", "A 12 Bu"]);
        assert!(harvest("   ").is_empty());
    }

    #[test]
    fn record_merges_and_dedups() {
        let store = VocabularyStore::new();
        store.record(FieldRole::Mapel, "matematika");
        store.record(FieldRole::Mapel, "Matematika");
        store.record(FieldRole::Mapel, "bahasa indonesia");
        let v = store.vocabulary(FieldRole::Mapel);
        assert_eq!(
            v.as_slice(),
            ["Bahasa Indonesia", "Matematika", "bahasa", "indonesia", "matematika"]
        );
        assert!(store.vocabulary(FieldRole::Alamat).is_empty());
    }

    #[test]
    fn snapshots_are_isolated_from_later_records() {
        let store = VocabularyStore::new();
        store.record(FieldRole::NamaGuru, "Budi");
        let before = store.vocabulary(FieldRole::NamaGuru);
        store.record(FieldRole::NamaGuru, "Sari");
        assert_eq!(before.len(), 1);
        assert_eq!(store.vocabulary(FieldRole::NamaGuru).len(), 2);
    }

    #[test]
    fn replace_swaps_whole_pool() {
        let store = VocabularyStore::new();
        store.record(FieldRole::Jabatan, "Kepala Sekolah");
        store.replace(FieldRole::Jabatan, vec!["Wali Kelas".into()]);
        assert_eq!(store.vocabulary(FieldRole::Jabatan).as_slice(), ["Wali Kelas"]);
    }

    #[test]
    fn parses_tsv() {
        let store = VocabularyStore::from_tsv_str(
            "# contoh\n\
             alamat\tJl. Merdeka\n\
             \n\
             namasiswa\tSiti Aminah\n",
        )
        .unwrap();
        assert_eq!(
            store.vocabulary(FieldRole::Alamat).as_slice(),
            ["Jl.", "Jl. Merdeka", "Merdeka"]
        );
        let counts = store.counts();
        assert!(counts.contains(&(FieldRole::NamaSiswa, 3)));
    }

    #[test]
    fn tsv_errors_carry_line_numbers() {
        let err = VocabularyStore::from_tsv_str("alamat\tBandung\nkelas\t5A\n").unwrap_err();
        assert!(matches!(err, VocabError::Role { line: 2, .. }));
        assert_eq!(err.to_string(), "line 2: unknown field role `kelas`");

        let err = VocabularyStore::from_tsv_str("mapel\n").unwrap_err();
        assert!(matches!(err, VocabError::Missing { line: 1 }));
    }
}
