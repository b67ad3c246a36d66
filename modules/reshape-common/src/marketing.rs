/// Ad-click identifiers stripped from canonical URLs. Any `utm_*` key is stripped as well.
pub const MARKETING_PARAMS: &[&str] = &["fbclid", "gclid", "msclkid", "mc_cid", "mc_eid"];

pub fn is_marketing_param(key: &str) -> bool {
    key.starts_with("utm_") || MARKETING_PARAMS.contains(&key)
}

fn pair_key(pair: &str) -> &str {
    pair.split_once('=').map_or(pair, |(k, _)| k)
}

pub fn has_marketing_params(query: &str) -> bool {
    query
        .trim_start_matches('?')
        .split('&')
        .any(|pair| is_marketing_param(pair_key(pair)))
}

/// Remove marketing pairs from a raw query string (with or without the leading `?`).
/// Remaining pairs keep their original text and order. Returns `None` when nothing is left.
pub fn strip_marketing_params(query: &str) -> Option<String> {
    let kept: Vec<&str> = query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty() && !is_marketing_param(pair_key(pair)))
        .collect();
    if kept.is_empty() {
        None
    } else {
        Some(kept.join("&"))
    }
}
