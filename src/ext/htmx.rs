//! Headers of the htmx partial-update protocol.
//!
//! Requests sent by htmx carry `HX-Request: true`; responses can ask the
//! client to fire events through `HX-Trigger` and friends without swapping
//! any content.

use crate::handler::{Context, response::error::ResponseError};
use hyper::{header::HeaderName, http::request::Parts};
use serde::Serialize;
use std::collections::BTreeMap;

pub const HX_REQUEST_HEADER: &str = "HX-Request";

pub static HX_REQUEST: HeaderName = HeaderName::from_static("hx-request");
pub static HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");

/// Event name to payload, serialized as one JSON object.
pub type HxHeader<V> = BTreeMap<String, V>;

/// `true` when the request was issued by htmx.
pub fn is_htmx_request(request: &Parts) -> bool {
    request
        .headers
        .get(&HX_REQUEST)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("true") || value.trim() == "1")
}

/// Writes `events` as the JSON value of the response header `name`.
pub fn write_header<V: Serialize>(
    ctx: &mut Context,
    name: &HeaderName,
    events: &HxHeader<V>,
) -> crate::Result<()> {
    let json = serde_json::to_string(events).map_err(ResponseError::from)?;
    ctx.set_header(name.clone(), &json)
}

/// Asks the client to fire each event of `events` once the response arrives.
pub fn write_trigger<V: Serialize>(ctx: &mut Context, events: &HxHeader<V>) -> crate::Result<()> {
    write_header(ctx, &HX_TRIGGER, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use hyper::Request;

    #[test]
    fn test_trigger_header_is_json() {
        let mut ctx = Context::new(Request::builder().body(Bytes::new()).unwrap());
        let events = HxHeader::from([(
            "showMessage".to_owned(),
            "Email or password is incorrect",
        )]);

        write_trigger(&mut ctx, &events).unwrap();

        assert_eq!(
            ctx.response().get(&HX_TRIGGER).unwrap(),
            r#"{"showMessage":"Email or password is incorrect"}"#
        );
    }

    #[test]
    fn test_detects_htmx_requests() {
        let htmx = Request::builder()
            .header("HX-Request", "true")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        let plain = Request::builder().body(()).unwrap().into_parts().0;

        assert!(is_htmx_request(&htmx));
        assert!(!is_htmx_request(&plain));
    }
}
