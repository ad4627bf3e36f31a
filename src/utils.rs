use url::Url;

/// 接続URLのパスワードを伏せ字にする関数
pub fn redact_password(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() && url.set_password(Some("****")).is_err() {
                return "<invalid url>".to_string();
            }
            url.to_string()
        }
        Err(_) => "<invalid url>".to_string(),
    }
}

/// 指定された文字数だけ文字列を短縮し、残りを「...」で置き換える関数
pub fn truncate_string(s: &str, max_length: usize) -> String {
    match s.char_indices().nth(max_length) {
        None => s.to_string(),
        Some((idx, _)) => format!("{}...", &s[..idx]),
    }
}
