use axum::http::{header, HeaderMap};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

pub const COOKIE_NAME: &str = "stockviz_flash";
const MAX_AGE_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Danger,
    Warning,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Danger => "danger",
            Self::Warning => "warning",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "danger" => Some(Self::Danger),
            "warning" => Some(Self::Warning),
            _ => None,
        }
    }
}

/// A one-shot message carried across a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

impl Flash {
    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: Level::Danger,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
        }
    }

    /// `Set-Cookie` value that stores this flash.
    pub fn set_cookie(&self) -> String {
        let raw = format!("{}:{}", self.level.as_str(), self.message);
        let value = URL_SAFE_NO_PAD.encode(raw.as_bytes());
        format!("{COOKIE_NAME}={value}; Path=/; Max-Age={MAX_AGE_SECS}; HttpOnly; SameSite=Lax")
    }

    /// `Set-Cookie` value that expires a previously stored flash.
    pub fn clear_cookie() -> String {
        format!("{COOKIE_NAME}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
    }

    /// Reads the flash cookie from request headers. Tampered or foreign values are ignored.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == COOKIE_NAME && !value.is_empty())
            .and_then(|(_, value)| Self::decode(value))
    }

    fn decode(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
        let raw = String::from_utf8(bytes).ok()?;
        let (level, message) = raw.split_once(':')?;
        Some(Self {
            level: Level::parse(level)?,
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn set_cookie_is_read_back_among_other_cookies() {
        let flash = Flash::warning("No data for selected range.");
        let set = flash.set_cookie();
        let pair = set.split(';').next().unwrap();

        let headers = headers_with_cookie(&format!("theme=dark; {pair}; other=1"));
        assert_eq!(Flash::from_headers(&headers), Some(flash));
    }

    #[test]
    fn message_may_contain_separators() {
        let flash = Flash::danger("Could not create chart: a: b; c");
        let pair = flash.set_cookie().split(';').next().unwrap().to_string();
        assert_eq!(Flash::from_headers(&headers_with_cookie(&pair)), Some(flash));
    }

    #[test]
    fn cleared_or_garbage_cookie_yields_nothing() {
        assert_eq!(Flash::from_headers(&headers_with_cookie("stockviz_flash=")), None);
        assert_eq!(
            Flash::from_headers(&headers_with_cookie("stockviz_flash=%%%not-base64")),
            None
        );
        let unknown_level = URL_SAFE_NO_PAD.encode("info:hello");
        assert_eq!(
            Flash::from_headers(&headers_with_cookie(&format!("stockviz_flash={unknown_level}"))),
            None
        );
        assert_eq!(Flash::from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        assert!(Flash::clear_cookie().contains("Max-Age=0"));
    }
}
