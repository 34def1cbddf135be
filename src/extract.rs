use crate::types::TokenSet;
use regex::Regex;
use std::sync::OnceLock;

const TOKEN_PATTERN: &str = r"\b[A-Za-z0-9_]{8,16}\b";

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is valid"))
}

/// 从文本中提取所有疑似邀请码（8-16 位字母/数字/下划线，按单词边界切分）
pub fn extract_tokens(text: &str) -> TokenSet {
    token_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
