//! Outbound response descriptor.

use serde::de::DeserializeOwned;

use crate::error::DomainError;
use crate::latin1;

/// A fully buffered response handed back to the synchronous caller.
///
/// Header names and values are kept as raw bytes, in wire order, with their
/// original case. Use [`ResponseDescriptor::header`] or
/// [`ResponseDescriptor::headers_latin1`] for text views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDescriptor {
    status: u16,
    reason: String,
    headers: Vec<(Vec<u8>, Vec<u8>)>,
    body: Vec<u8>,
}

impl ResponseDescriptor {
    /// Build a descriptor, checking the status code.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidStatus`] if `status` is outside `100..=999`.
    pub fn new(
        status: u16,
        reason: impl Into<String>,
        headers: Vec<(Vec<u8>, Vec<u8>)>,
        body: Vec<u8>,
    ) -> Result<Self, DomainError> {
        if !(100..=999).contains(&status) {
            return Err(DomainError::InvalidStatus(status));
        }
        Ok(Self {
            status,
            reason: reason.into(),
            headers,
            body,
        })
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Status line text, e.g. `200 OK`.
    #[must_use]
    pub fn status_line(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.reason)
        }
    }

    /// Raw header pairs in wire order.
    #[must_use]
    pub fn raw_headers(&self) -> &[(Vec<u8>, Vec<u8>)] {
        &self.headers
    }

    /// Header pairs decoded as ISO-8859-1.
    #[must_use]
    pub fn headers_latin1(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|(name, value)| (latin1::decode(name), latin1::decode(value)))
            .collect()
    }

    /// First value of `name` (case-insensitive), decoded as ISO-8859-1.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name.as_bytes()))
            .map(|(_, value)| latin1::decode(value))
    }

    /// Media type from `Content-Type`, without parameters, lower-cased.
    #[must_use]
    pub fn content_type(&self) -> Option<String> {
        let raw = self.header("content-type")?;
        let media = raw.split(';').next().unwrap_or_default().trim();
        if media.is_empty() {
            None
        } else {
            Some(media.to_ascii_lowercase())
        }
    }

    /// `charset` parameter of `Content-Type`, lower-cased and unquoted.
    #[must_use]
    pub fn charset(&self) -> Option<String> {
        let raw = self.header("content-type")?;
        raw.split(';').skip(1).find_map(|param| {
            let (key, value) = param.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches('"').to_ascii_lowercase())
        })
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Decode the body using the declared charset.
    ///
    /// UTF-8 is assumed when no charset is declared, which covers JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnsupportedCharset`] for charsets other than
    /// UTF-8, US-ASCII and ISO-8859-1, or [`DomainError::Decode`] when the
    /// bytes are not valid UTF-8.
    pub fn text(&self) -> Result<String, DomainError> {
        match self.charset().as_deref() {
            None | Some("utf-8" | "utf8" | "us-ascii" | "ascii") => {
                String::from_utf8(self.body.clone()).map_err(|source| DomainError::Decode {
                    charset: "utf-8",
                    source,
                })
            }
            Some("iso-8859-1" | "latin-1" | "latin1") => Ok(latin1::decode(&self.body)),
            Some(other) => Err(DomainError::UnsupportedCharset(other.to_string())),
        }
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Json`] when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, DomainError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(headers: &[(&str, &str)], body: &[u8]) -> ResponseDescriptor {
        ResponseDescriptor::new(
            200,
            "OK",
            headers
                .iter()
                .map(|(name, value)| {
                    (name.as_bytes().to_vec(), latin1::encode(value).unwrap())
                })
                .collect(),
            body.to_vec(),
        )
        .unwrap()
    }

    #[test]
    fn should_reject_out_of_range_status() {
        assert!(matches!(
            ResponseDescriptor::new(42, "", vec![], vec![]),
            Err(DomainError::InvalidStatus(42))
        ));
        assert!(matches!(
            ResponseDescriptor::new(1000, "", vec![], vec![]),
            Err(DomainError::InvalidStatus(1000))
        ));
    }

    #[test]
    fn should_format_status_line() {
        let res = response(&[], b"");
        assert_eq!(res.status_line(), "200 OK");
    }

    #[test]
    fn should_split_content_type_and_charset() {
        let res = response(
            &[("Content-Type", "Text/HTML; Charset=\"UTF-8\"")],
            b"<p>hi</p>",
        );
        assert_eq!(res.content_type().as_deref(), Some("text/html"));
        assert_eq!(res.charset().as_deref(), Some("utf-8"));
    }

    #[test]
    fn should_have_no_charset_for_plain_json() {
        let res = response(&[("content-type", "application/json")], b"{}");
        assert_eq!(res.content_type().as_deref(), Some("application/json"));
        assert_eq!(res.charset(), None);
    }

    #[test]
    fn should_keep_header_order_case_and_bytes() {
        let res = response(
            &[
                ("Set-Cookie", "a=1"),
                ("X-Raw", "café"),
                ("set-cookie", "b=2"),
            ],
            b"",
        );
        let decoded = res.headers_latin1();
        assert_eq!(
            decoded,
            vec![
                ("Set-Cookie".to_string(), "a=1".to_string()),
                ("X-Raw".to_string(), "café".to_string()),
                ("set-cookie".to_string(), "b=2".to_string()),
            ]
        );
        assert_eq!(res.raw_headers()[1].1, b"caf\xe9".to_vec());
    }

    #[test]
    fn should_decode_latin1_body_when_declared() {
        let res = response(&[("Content-Type", "text/plain; charset=iso-8859-1")], b"caf\xe9");
        assert_eq!(res.text().unwrap(), "café");
    }

    #[test]
    fn should_fail_on_unsupported_charset() {
        let res = response(&[("Content-Type", "text/plain; charset=shift_jis")], b"x");
        assert!(matches!(res.text(), Err(DomainError::UnsupportedCharset(_))));
    }

    #[test]
    fn should_fail_on_invalid_utf8_body() {
        let res = response(&[], b"\xff\xfe");
        assert!(matches!(res.text(), Err(DomainError::Decode { .. })));
    }

    #[test]
    fn should_deserialize_json_body() {
        let res = response(
            &[("Content-Type", "application/json")],
            br#"{"message":"Hello world"}"#,
        );
        let value: serde_json::Value = res.json().unwrap();
        assert_eq!(value, serde_json::json!({"message": "Hello world"}));
    }
}
