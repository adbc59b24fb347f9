use crate::Result;
use url::Url;

/// Returns `url` with query parameter `param` set to `value`.
///
/// The first occurrence of `param` keeps its position and later duplicates
/// are dropped. Every other pair is re-emitted in its original order. If
/// `param` is absent it is appended. Serialization is
/// `application/x-www-form-urlencoded`.
pub fn mutate_url(url: &Url, param: &str, value: &str) -> Url {
    let mut replaced = false;
    let mut pairs: Vec<(String, String)> = Vec::new();

    for (key, current) in url.query_pairs() {
        if key == param {
            if !replaced {
                pairs.push((key.into_owned(), value.to_string()));
                replaced = true;
            }
        } else {
            pairs.push((key.into_owned(), current.into_owned()));
        }
    }

    if !replaced {
        pairs.push((param.to_string(), value.to_string()));
    }

    let mut mutated = url.clone();
    mutated.query_pairs_mut().clear().extend_pairs(pairs);
    mutated
}

pub fn mutate(url: &str, param: &str, value: &str) -> Result<String> {
    let parsed = Url::parse(url)?;
    Ok(mutate_url(&parsed, param, value).into())
}

/// Query parameter names in first-appearance order, without duplicates.
pub fn query_parameters(url: &Url) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (key, _) in url.query_pairs() {
        if !names.iter().any(|name| *name == key) {
            names.push(key.into_owned());
        }
    }
    names
}
