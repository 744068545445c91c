use reqwest::Url;

use crate::language::Language;
use crate::{GenieError, Result};

pub const DEFAULT_SHARE_BASE: &str = "http://localhost:8080";

/// Builds `{base}/share?code=...&lang=...` with both values percent-encoded.
/// Any path already on `base` is kept.
pub fn share_url(base: &str, code: &str, language: Language) -> Result<Url> {
    if code.trim().is_empty() {
        return Err(GenieError::Validation("There is no code to share.".to_string()));
    }
    let mut url = Url::parse(base)
        .map_err(|err| GenieError::Validation(format!("invalid share base url {base}: {err}")))?;
    url.set_query(None);
    url.path_segments_mut()
        .map_err(|()| GenieError::Validation(format!("share base url cannot hold a path: {base}")))?
        .pop_if_empty()
        .push("share");
    url.query_pairs_mut()
        .append_pair("code", code)
        .append_pair("lang", language.id());
    Ok(url)
}

/// Recovers the language and code carried by a share link.
pub fn parse_share_url(link: &str) -> Result<(Language, String)> {
    let url = Url::parse(link)
        .map_err(|err| GenieError::Validation(format!("invalid share link: {err}")))?;
    let mut code = None;
    let mut language = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "lang" => language = Some(value.parse::<Language>()?),
            _ => (),
        }
    }
    match (language, code) {
        (Some(language), Some(code)) if !code.is_empty() => Ok((language, code)),
        _ => Err(GenieError::Validation(
            "share link must carry both `code` and `lang`".to_string(),
        )),
    }
}
