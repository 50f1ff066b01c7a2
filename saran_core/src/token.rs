//! `token`：从输入框文本中取出“正在补全的词”，以及把候选写回文本。
//!
//! 约定：
//! - 词边界是任意空白字符（`char::is_whitespace`）
//! - 写回时保留边界及其之前的全部文本，候选之后追加一个空格
//! - 光标位置以字符数计，总在文本末尾

/// 候选写回后的输入框内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub text: String,
    /// 光标位置（字符数），等于 `text` 的字符数
    pub caret: usize,
}

/// 分隔符：写回候选后追加在末尾。
pub const DELIMITER: char = ' ';

/// 最后一个空白之后的部分；没有空白时返回整个文本。
pub fn typed_token(text: &str) -> &str {
    match text.char_indices().rev().find(|(_, c)| c.is_whitespace()) {
        Some((i, c)) => &text[i + c.len_utf8()..],
        None => text,
    }
}

/// 用 `candidate` 替换 `text` 末尾的 token。
pub fn apply_candidate(text: &str, candidate: &str) -> Applied {
    let token = typed_token(text);
    let head = &text[..text.len() - token.len()];
    let mut out = String::with_capacity(head.len() + candidate.len() + 1);
    out.push_str(head);
    out.push_str(candidate);
    out.push(DELIMITER);
    let caret = out.chars().count();
    Applied { text: out, caret }
}

/// 每个词首字母大写并去掉首尾空白；全大写的字符串原样返回（例如缩写 `SDN`）。
pub fn capitalized_and_trimmed(s: &str) -> String {
    if s.chars().all(char::is_uppercase) {
        return s.to_owned();
    }
    let words: Vec<String> = s
        .split(' ')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    words.join(" ").trim().to_owned()
}
