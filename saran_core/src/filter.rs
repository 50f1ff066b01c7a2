//! `filter`：词表 -> 候选（前缀匹配/排序/截断）。

use std::cmp::Ordering;

/// 候选数量默认值。
pub const DEFAULT_LIMIT: usize = 5;

/// Filter：把词表按 token 过滤成候选列表。纯计算，不会失败。
pub trait Filter: Send + Sync {
    fn apply(&self, vocabulary: &[String], token: &str) -> Vec<String>;
}

/// 默认 filter：大小写不敏感的前缀匹配，按 (长度, 小写字典序) 升序，截断到 limit。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixFilter {
    pub limit: usize,
}

impl Default for PrefixFilter {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Filter for PrefixFilter {
    fn apply(&self, vocabulary: &[String], token: &str) -> Vec<String> {
        filter_candidates(vocabulary, token, self.limit)
    }
}

/// 过滤并排序；空 token 匹配全部（调用方通常在 token 为空时直接隐藏浮层）。
pub fn filter_candidates(vocabulary: &[String], token: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let needle = token.to_lowercase();

    // 预先算好小写形式和长度，避免排序时反复分配
    let mut matched: Vec<(usize, String, &String)> = vocabulary
        .iter()
        .filter_map(|word| {
            let lower = word.to_lowercase();
            lower
                .starts_with(&needle)
                .then(|| (word.chars().count(), lower, word))
        })
        .collect();
    matched.sort_by(|a, b| compare_rank((a.0, &a.1), (b.0, &b.1)));
    matched.truncate(limit);
    matched.into_iter().map(|(_, _, word)| word.clone()).collect()
}

fn compare_rank(a: (usize, &str), b: (usize, &str)) -> Ordering {
    a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn vocab(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_owned()).collect()
    }

    #[test]
    fn shorter_matches_come_first() {
        let v = vocab(&["Bandung", "Ban", "Banten"]);
        assert_eq!(filter_candidates(&v, "Ban", 5), vocab(&["Ban", "Banten", "Bandung"]));
    }

    #[test]
    fn result_is_truncated_to_limit() {
        let v = vocab(&["Bandung", "Ban", "Banten"]);
        assert_eq!(filter_candidates(&v, "Ban", 2), vocab(&["Ban", "Banten"]));
    }

    #[test]
    fn matching_ignores_case() {
        let v = vocab(&["merdeka", "Merapi", "MEDAN", "Sudirman"]);
        assert_eq!(filter_candidates(&v, "mER", 5), vocab(&["Merapi", "merdeka"]));
    }

    #[test]
    fn zero_limit_behaves_like_one() {
        let v = vocab(&["Ani", "Anita"]);
        assert_eq!(filter_candidates(&v, "an", 0), vocab(&["Ani"]));
    }

    #[test]
    fn empty_token_matches_everything() {
        let v = vocab(&["Budi", "Ani", "Cahya"]);
        assert_eq!(filter_candidates(&v, "", 10), vocab(&["Ani", "Budi", "Cahya"]));
    }

    #[test]
    fn prefix_filter_uses_its_limit() {
        let v = vocab(&["Ani", "Anita", "Anisa"]);
        assert_eq!(PrefixFilter { limit: 1 }.apply(&v, "an"), vocab(&["Ani"]));
        assert_eq!(PrefixFilter::default().limit, DEFAULT_LIMIT);
    }

    proptest! {
        #[test]
        fn every_candidate_starts_with_token(
            words in prop::collection::vec("[a-zA-Z]{0,8}", 0..40),
            token in "[a-zA-Z]{0,3}",
            limit in 1usize..20,
        ) {
            let out = filter_candidates(&words, &token, limit);
            let needle = token.to_lowercase();
            for c in &out {
                prop_assert!(c.to_lowercase().starts_with(&needle));
            }
            prop_assert!(out.len() <= limit);
        }

        #[test]
        fn candidates_are_ranked_by_length_then_alphabet(
            words in prop::collection::vec("[a-zA-Z]{1,8}", 0..40),
            token in "[a-zA-Z]{0,2}",
        ) {
            let out = filter_candidates(&words, &token, 20);
            for pair in out.windows(2) {
                let a = (pair[0].chars().count(), pair[0].to_lowercase());
                let b = (pair[1].chars().count(), pair[1].to_lowercase());
                prop_assert!(a <= b);
            }
        }
    }
}
