use bytes::BytesMut;
use cookie::Cookie;
use http_body_util::Full;
use hyper::{
    HeaderMap, Response as HyperResponse, StatusCode,
    body::Bytes,
    header::{self, HeaderValue, IntoHeaderName},
};
use log::warn;

pub mod error;

use error::ResponseError;

/// Response under construction for one request.
///
/// The status is written at most once: the first `write_status` wins and later
/// calls are ignored, so a status already chosen by an upstream link is never
/// overwritten.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    status_written: bool,
    body: BytesMut,
    headers: HeaderMap,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Response {
            status: StatusCode::OK,
            status_written: false,
            body: BytesMut::with_capacity(512),
            headers: HeaderMap::with_capacity(8),
        }
    }

    /// Bare response carrying `status` and its reason phrase as body.
    pub fn error(status: StatusCode) -> Self {
        let mut res = Self::new();
        res.write_status(status);
        res.send(status.canonical_reason().unwrap_or("Error"));
        res
    }

    pub fn internal_error() -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Sets the status unless one was already written. Returns whether this
    /// call took effect.
    pub fn write_status(&mut self, status: StatusCode) -> bool {
        if self.status_written {
            if cfg!(debug_assertions) && status != self.status {
                warn!(
                    "superfluous write_status({}) ignored, status already {}",
                    status.as_u16(),
                    self.status.as_u16()
                );
            }
            return false;
        }

        self.status = status;
        self.status_written = true;
        true
    }

    pub fn status_code(&mut self, status: u16) -> Result<&mut Self, ResponseError> {
        let status =
            StatusCode::from_u16(status).map_err(|_| ResponseError::InvalidStatusCode(status))?;
        self.write_status(status);
        Ok(self)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Status that goes on the wire: an OK response without a body is sent
    /// as 204.
    pub fn sent_status(&self) -> StatusCode {
        if self.body.is_empty() && self.status == StatusCode::OK {
            StatusCode::NO_CONTENT
        } else {
            self.status
        }
    }

    pub fn set<K: IntoHeaderName>(&mut self, key: K, val: HeaderValue) -> &mut Self {
        self.headers.insert(key, val);
        self
    }

    pub fn append<K: IntoHeaderName>(&mut self, key: K, val: HeaderValue) -> &mut Self {
        self.headers.append(key, val);
        self
    }

    pub fn get<K: header::AsHeaderName>(&self, key: K) -> Option<&HeaderValue> {
        self.headers.get(key)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn write(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        self.body.extend_from_slice(data.as_ref());
        self
    }

    pub fn send(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        let data = data.as_ref();

        self.body.clear();
        self.body.extend_from_slice(data);

        if !self.headers.contains_key(header::CONTENT_TYPE) {
            // Best guess: plain text if it's utf8
            let guess = if std::str::from_utf8(data).is_ok() {
                "text/plain; charset=utf-8"
            } else {
                "application/octet-stream"
            };
            self.set(header::CONTENT_TYPE, HeaderValue::from_static(guess));
        }

        self
    }

    pub fn redirect(&mut self, location: &str) -> Result<&mut Self, ResponseError> {
        let location = HeaderValue::from_str(location)?;
        self.write_status(StatusCode::FOUND);
        self.set(header::LOCATION, location);
        Ok(self)
    }

    pub fn r#type(&mut self, mime: &str) -> Result<&mut Self, ResponseError> {
        let mime = HeaderValue::from_str(mime)?;
        Ok(self.set(header::CONTENT_TYPE, mime))
    }

    pub fn set_cookie(&mut self, cookie: &Cookie<'_>) -> Result<&mut Self, ResponseError> {
        let value = HeaderValue::from_str(&cookie.to_string())?;
        Ok(self.append(header::SET_COOKIE, value))
    }

    pub fn into_hyper(self) -> HyperResponse<Full<Bytes>> {
        let status = self.sent_status();
        let body = self.body.freeze();

        let mut response = HyperResponse::new(Full::new(body));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl From<Response> for HyperResponse<Full<Bytes>> {
    fn from(resp: Response) -> Self {
        resp.into_hyper()
    }
}
