// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持法语（默认）、英文和中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 支持的语言
pub const SUPPORTED_LOCALES: [&str; 3] = ["fr", "en", "zh-CN"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"fr"、"en" 或 "zh-CN"）
///
/// # 返回
/// - false: 不支持的语言，保持当前语言不变
pub fn set_locale(locale: &str) -> bool {
    if SUPPORTED_LOCALES.contains(&locale) {
        rust_i18n::set_locale(locale);
        true
    } else {
        false
    }
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use moulinette::i18n::t;
/// let msg = t("validation.quarantine_present");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use moulinette::i18n::t_with_args;
/// let msg = t_with_args("cli.template_written", &[("path", "/tmp/INV01_SITE1_TEMPLATE.xlsx")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
