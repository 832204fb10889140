//! 路径分词。
//!
//! 请求路径和路由模式都经过同一个 `split_path`，因此两者的段数可以直接比较。

use crate::param::PATH_SEPARATOR;

/// 将路径切分为非空的段序列。
///
/// 去掉开头的一个分隔符，其余部分按 `/` 切分，丢弃所有空段（来自重复或结尾的分隔符）。
/// 任何输入都不会失败，空路径得到空序列。
pub fn split_path(path: &str) -> Vec<&str> {
    if path.is_empty() {
        return Vec::new();
    }
    let path = path.strip_prefix(PATH_SEPARATOR).unwrap_or(path);
    path.split(PATH_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect()
}
