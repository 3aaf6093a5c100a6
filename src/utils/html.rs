use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Post bodies arrive as rich-text editor HTML. This applies a
/// whitelist-based sanitization: safe tags (like <b>, <p>) are preserved
/// while dangerous tags (like <script>, <iframe>) and malicious attributes
/// (like onclick) are stripped before storage.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
