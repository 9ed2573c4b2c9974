use axum::http::{HeaderMap, Uri, header::ACCEPT_LANGUAGE};
use dashmap::DashMap;
use std::collections::HashMap;

/// Query parameter that overrides the negotiated locale.
pub const LANG_PARAM: &str = "lang";

/// Translation collaborator.
///
/// Returns `None` when there is no message for `key`; callers fall back to the
/// key itself.
pub trait Translator: Send + Sync + 'static {
    fn translate(&self, locale: &str, key: &str) -> Option<String>;
}

/// In-memory message catalog keyed by locale.
#[derive(Clone, Default)]
pub struct MessageCatalog {
    messages: DashMap<String, HashMap<String, String>>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages<I, K, V>(self, locale: &str, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.add_messages(locale, messages);
        self
    }

    pub fn add_messages<I, K, V>(&self, locale: &str, messages: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entry = self.messages.entry(normalize(locale)).or_default();
        entry.extend(messages.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    pub fn locales(&self) -> Vec<String> {
        self.messages.iter().map(|e| e.key().clone()).collect()
    }
}

impl Translator for MessageCatalog {
    fn translate(&self, locale: &str, key: &str) -> Option<String> {
        let locale = normalize(locale);
        if let Some(found) = self
            .messages
            .get(&locale)
            .and_then(|messages| messages.get(key).cloned())
        {
            return Some(found);
        }
        // `en-US` falls back to `en`
        let language = locale.split('-').next()?;
        if language == locale {
            return None;
        }
        self.messages
            .get(language)
            .and_then(|messages| messages.get(key).cloned())
    }
}

/// Pick the locale for a request: `?lang=`, then the first `Accept-Language`
/// tag, then `default`.
pub fn negotiate_locale(uri: &Uri, headers: &HeaderMap, default: &str) -> String {
    let from_query = uri.query().and_then(|query| {
        serde_urlencoded::from_str::<Vec<(String, String)>>(query)
            .ok()?
            .into_iter()
            .find(|(key, value)| key == LANG_PARAM && !value.is_empty())
            .map(|(_, value)| value)
    });
    if let Some(locale) = from_query {
        return normalize(&locale);
    }

    let from_header = headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|tag| tag.split(';').next().unwrap_or(tag).trim())
        .filter(|tag| !tag.is_empty() && *tag != "*");
    match from_header {
        Some(tag) => normalize(tag),
        None => normalize(default),
    }
}

fn normalize(locale: &str) -> String {
    locale.trim().replace('_', "-").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn catalog() -> MessageCatalog {
        MessageCatalog::new()
            .with_messages("en", [("success", "success")])
            .with_messages("zh-CN", [("success", "成功")])
    }

    #[test]
    fn test_translate_exact_and_language_fallback() {
        let catalog = catalog();
        assert_eq!(catalog.translate("zh-CN", "success").as_deref(), Some("成功"));
        assert_eq!(catalog.translate("en-US", "success").as_deref(), Some("success"));
        assert_eq!(catalog.translate("fr", "success"), None);
        assert_eq!(catalog.translate("en", "missing"), None);

        let mut locales = catalog.locales();
        locales.sort();
        assert_eq!(locales, vec!["en", "zh-cn"]);
    }

    #[test]
    fn test_negotiate_prefers_query_then_header() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9"));

        let uri: Uri = "/hello?lang=en_US".parse().unwrap();
        assert_eq!(negotiate_locale(&uri, &headers, "fr"), "en-us");

        let uri: Uri = "/hello".parse().unwrap();
        assert_eq!(negotiate_locale(&uri, &headers, "fr"), "zh-cn");
        assert_eq!(negotiate_locale(&uri, &HeaderMap::new(), "fr"), "fr");
    }
}
