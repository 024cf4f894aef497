//! HTTP upgrade request checks: only the Engine.IO v4 websocket endpoint.

use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::{StatusCode, Uri};

const ENGINE_PATH: &str = "/socket.io/";

/// Why an upgrade request was turned away.
#[derive(Debug, PartialEq, Eq)]
pub struct Rejection {
    pub status: StatusCode,
    pub reason: &'static str,
}

pub fn check_target(uri: &Uri) -> Result<(), Rejection> {
    let path = uri.path();
    if path != ENGINE_PATH && path != "/socket.io" {
        return Err(Rejection {
            status: StatusCode::NOT_FOUND,
            reason: "unknown path",
        });
    }

    let query = uri.query().unwrap_or("");
    let mut eio = None;
    let mut transport = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "EIO" => eio = Some(value.into_owned()),
            "transport" => transport = Some(value.into_owned()),
            _ => {}
        }
    }

    if eio.as_deref() != Some("4") {
        return Err(Rejection {
            status: StatusCode::BAD_REQUEST,
            reason: "unsupported protocol version",
        });
    }
    if transport.as_deref() != Some("websocket") {
        return Err(Rejection {
            status: StatusCode::BAD_REQUEST,
            reason: "unsupported transport",
        });
    }
    Ok(())
}

/// Callback for `accept_hdr_async`.
pub fn accept_request(request: &Request, response: Response) -> Result<Response, ErrorResponse> {
    match check_target(request.uri()) {
        Ok(()) => Ok(response),
        Err(rejection) => {
            tracing::debug!(uri = %request.uri(), reason = rejection.reason, "Rejected upgrade");
            let mut error = ErrorResponse::new(Some(rejection.reason.to_string()));
            *error.status_mut() = rejection.status;
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(target: &str) -> Result<(), Rejection> {
        check_target(&target.parse::<Uri>().unwrap())
    }

    #[test]
    fn accepts_engine_io_v4_websocket() {
        assert!(check("/socket.io/?EIO=4&transport=websocket").is_ok());
        assert!(check("/socket.io/?transport=websocket&EIO=4&t=abc").is_ok());
        assert!(check("/socket.io?EIO=4&transport=websocket").is_ok());
    }

    #[test]
    fn rejects_other_paths() {
        assert_eq!(check("/").unwrap_err().status, StatusCode::NOT_FOUND);
        assert_eq!(
            check("/ws?EIO=4&transport=websocket").unwrap_err().status,
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn rejects_old_protocol_and_polling() {
        assert_eq!(
            check("/socket.io/?EIO=3&transport=websocket").unwrap_err().reason,
            "unsupported protocol version"
        );
        assert_eq!(
            check("/socket.io/?EIO=4&transport=polling").unwrap_err().reason,
            "unsupported transport"
        );
        assert_eq!(
            check("/socket.io/").unwrap_err().status,
            StatusCode::BAD_REQUEST
        );
    }
}
