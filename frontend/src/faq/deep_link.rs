use web_sys::window;

/// Entry id named by a URL fragment such as `#request-refund`.
pub fn entry_id_from_hash(hash: &str) -> Option<String> {
    let fragment = hash.strip_prefix('#').unwrap_or(hash);
    if fragment.is_empty() {
        return None;
    }
    let id = match urlencoding::decode(fragment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => fragment.to_string(),
    };
    Some(id)
}

/// Entry id requested by the current page URL, if any.
pub fn current_entry_request() -> Option<String> {
    let hash = window()?.location().hash().ok()?;
    entry_id_from_hash(&hash)
}
