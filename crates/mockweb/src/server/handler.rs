//! HTTP request handling: bridges hyper requests and responses to the dispatcher.

use super::core::Dispatcher;
use super::types::DeliveryError;
use crate::recording::IncomingRequest;
use crate::response::MockResponse;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::ext::ReasonPhrase;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;
use tracing::{debug, warn};

/// Handle one request to the mock server.
///
/// When the dispatcher resolves no response the returned future never
/// completes, so the client is left waiting until it gives up or the server
/// shuts down.
pub async fn handle_mock_request(
    req: Request<Incoming>,
    dispatcher: Arc<Dispatcher>,
) -> Result<Response<Full<Bytes>>, DeliveryError> {
    let incoming = read_incoming(req).await?;

    let mut delivered = None;
    dispatcher
        .handle(incoming, |response| delivered = Some(response))
        .await?;

    match delivered {
        Some(response) => build_response(response),
        None => {
            debug!("Holding connection open for unanswered request");
            std::future::pending().await
        }
    }
}

async fn read_incoming(req: Request<Incoming>) -> Result<IncomingRequest, DeliveryError> {
    let (parts, body) = req.into_parts();

    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let headers = parts
        .headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect();

    let body = body.collect().await.map_err(DeliveryError::Body)?.to_bytes();

    Ok(IncomingRequest {
        method: parts.method.to_string(),
        path,
        headers,
        body,
    })
}

/// Convert a mock response into the hyper response written on the wire.
pub(crate) fn build_response(response: MockResponse) -> Result<Response<Full<Bytes>>, DeliveryError> {
    let code = response.status().code();
    let status = StatusCode::from_u16(code).map_err(|_| DeliveryError::InvalidStatus(code))?;
    // hyper rewrites a final 1xx response to 500.
    if status.is_informational() {
        return Err(DeliveryError::InvalidStatus(code));
    }

    let mut builder = Response::builder().status(status);
    for (name, value) in response.headers() {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let reason = response.status().reason();
    if status.canonical_reason() != Some(reason) {
        match ReasonPhrase::try_from(reason.to_string()) {
            Ok(phrase) => builder = builder.extension(phrase),
            Err(_) => warn!("Reason phrase {:?} is not valid on a status line, using default", reason),
        }
    }

    Ok(builder.body(Full::new(response.body().clone()))?)
}
