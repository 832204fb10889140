use chrono::{DateTime, Utc};

/// 将每个单词的首字母大写，其余字符保持不变。
///
/// 字母、数字和下划线视为单词内部字符，其它字符（如 `-`、空格）开始一个新单词。
pub fn title_case(s: &str) -> String {
    let mut output = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            output.extend(c.to_uppercase());
        } else {
            output.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    output
}

/// 规范化挂载前缀：补上缺失的开头 `/`，空字符串保持为空
pub fn normalize_base_path(base_path: &str) -> String {
    let base = base_path.trim();
    if base.is_empty() || base.starts_with('/') {
        base.to_string()
    } else {
        format!("/{}", base)
    }
}

/// 剥离挂载前缀。请求路径不在前缀之下时返回 `None`。
///
/// 前缀只在段边界上匹配：`/api` 可以匹配 `/api` 与 `/api/users`，但不匹配 `/apix`。
pub fn strip_base_path<'a>(path: &'a str, base_path: &str) -> Option<&'a str> {
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        return Some(path);
    }
    match path.strip_prefix(base) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => Some(rest),
        _ => None,
    }
}

/// 按 `Date` 头的格式输出时间
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
