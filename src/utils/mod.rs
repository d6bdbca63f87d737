pub mod ip;
pub mod url_validator;

/// 与路由冲突、不能作为自定义别名的路径段
pub const RESERVED_ALIASES: &[&str] = &["health", "info", "stats", "shrink", "api"];

/// 自定义别名最大长度
pub const MAX_ALIAS_LENGTH: usize = 64;

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    // 62 个字符：大小写字母 + 数字
    let chars = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}

/// 别名只允许 `[A-Za-z0-9_-]`，长度 1..=64
pub fn is_valid_alias(alias: &str) -> bool {
    !alias.is_empty()
        && alias.len() <= MAX_ALIAS_LENGTH
        && alias
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

pub fn is_reserved_alias(alias: &str) -> bool {
    RESERVED_ALIASES.contains(&alias)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_code_length_and_alphabet() {
        for len in [1, 6, 32] {
            let code = generate_random_code(len);
            assert_eq!(code.len(), len);
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_generate_random_code_varies() {
        let codes: std::collections::HashSet<String> =
            (0..50).map(|_| generate_random_code(6)).collect();
        assert!(codes.len() > 1);
    }

    #[test]
    fn test_alias_rules() {
        assert!(is_valid_alias("promo"));
        assert!(is_valid_alias("Summer_Sale-2024"));
        assert!(!is_valid_alias(""));
        assert!(!is_valid_alias("has space"));
        assert!(!is_valid_alias("a/b"));
        assert!(!is_valid_alias("ünï"));
        assert!(!is_valid_alias(&"x".repeat(65)));
        assert!(is_valid_alias(&"x".repeat(64)));
    }

    #[test]
    fn test_reserved_aliases_are_case_sensitive() {
        assert!(is_reserved_alias("health"));
        assert!(is_reserved_alias("stats"));
        assert!(!is_reserved_alias("Health"));
        assert!(!is_reserved_alias("promo"));
    }
}
