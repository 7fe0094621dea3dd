//! Status probe for the agent's web service.
//!
//! One GET against the configured status endpoint. A refused connection
//! is the common case on a host where the agent is simply not running,
//! so it gets its own error kind and friendlier guidance upstream.

use std::time::Duration;

use serde::Deserialize;

use kagecheck_common::error::ProbeError;

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// JSON body of the status endpoint.
#[derive(Debug, Deserialize)]
pub struct AgentStatus {
    #[serde(default)]
    pub message: Option<String>,
}

/// What the endpoint said, when it answered at all.
#[derive(Debug)]
pub enum StatusProbe {
    /// 200 with a decodable body.
    Running { message: String },
    /// The service answered with a non-200 status.
    BadStatus { code: u16 },
}

pub async fn agent_status(url: &str) -> Result<StatusProbe, ProbeError> {
    let client = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| ProbeError::Unreachable {
            detail: e.to_string(),
        })?;

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) if e.is_connect() => {
            return Err(ProbeError::Unreachable {
                detail: "connection refused".to_string(),
            });
        }
        Err(e) if e.is_timeout() => {
            return Err(ProbeError::Timeout {
                tool: "status endpoint".to_string(),
                after: HTTP_TIMEOUT,
            });
        }
        Err(e) => {
            return Err(ProbeError::Unreachable {
                detail: e.to_string(),
            });
        }
    };

    let code = response.status().as_u16();
    if code != 200 {
        return Ok(StatusProbe::BadStatus { code });
    }

    let body = response.text().await.map_err(|e| ProbeError::Unreachable {
        detail: e.to_string(),
    })?;
    let status: AgentStatus = serde_json::from_str(&body)
        .map_err(|e| ProbeError::MalformedReport(format!("status body is not JSON: {e}")))?;

    Ok(StatusProbe::Running {
        message: status.message.unwrap_or_else(|| "OK".to_string()),
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });

        format!("http://{addr}/api/kage/status/")
    }

    #[tokio::test]
    async fn running_agent_reports_its_message() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 31\r\n\r\n{\"message\":\"Kage agent is up\"}\n",
        )
        .await;

        match agent_status(&url).await.unwrap() {
            StatusProbe::Running { message } => assert_eq!(message, "Kage agent is up"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_message_field_defaults_to_ok() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\n\r\n{}",
        )
        .await;

        match agent_status(&url).await.unwrap() {
            StatusProbe::Running { message } => assert_eq!(message, "OK"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_status_is_surfaced_with_its_code() {
        let url = serve_once("HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\n\r\n").await;

        match agent_status(&url).await.unwrap() {
            StatusProbe::BadStatus { code } => assert_eq!(code, 503),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: 14\r\n\r\n<html></html>\n",
        )
        .await;

        assert!(matches!(
            agent_status(&url).await,
            Err(ProbeError::MalformedReport(_))
        ));
    }

    #[tokio::test]
    async fn refused_connection_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = agent_status(&format!("http://{addr}/api/kage/status/"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProbeError::Unreachable { .. }));
    }
}
