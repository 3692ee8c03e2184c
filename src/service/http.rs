// src/service/http.rs

//! HTTP client for the remote mode solver.

use super::{ServiceSession, SimulationService};
use crate::model::{ModeData, ModeSolverRequest};
use crate::provenance::fingerprint;
use crate::EngineError;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

const SOLVE_PATH: &str = "modesolver/solve";

/// Talks to the service over HTTPS. One request per solve, no retries.
pub struct HttpSimulationService {
    client: reqwest::Client,
    session: ServiceSession,
}

impl HttpSimulationService {
    pub fn new(session: ServiceSession) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("waveguide-engine/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpSimulationService { client, session })
    }

    pub fn solve_url(&self) -> String {
        format!("{}/{}", self.session.base_url(), SOLVE_PATH)
    }

    async fn post_request(&self, request: &ModeSolverRequest) -> Result<ModeData, EngineError> {
        let body = request.to_json()?;
        let request_fingerprint = fingerprint(body.as_bytes());
        let url = self.solve_url();
        log::info!("Submitting mode solve to {} (fingerprint {})", url, &request_fingerprint[..12]);

        let response = self
            .client
            .post(&url)
            .header("simcloud-api-key", self.session.credential().expose())
            .header("x-request-fingerprint", request_fingerprint.as_str())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(EngineError::RemoteService {
                status: status.as_u16(),
                body,
            });
        }

        let payload: serde_json::Value = response.json().await?;
        log::info!("Mode solve finished with status {}", status);
        Ok(ModeData::Solved(payload))
    }
}

impl SimulationService for HttpSimulationService {
    fn name(&self) -> &str {
        "http"
    }

    fn solve_modes<'a>(&'a self, request: &'a ModeSolverRequest) -> BoxFuture<'a, Result<ModeData, EngineError>> {
        self.post_request(request).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    #[test]
    fn test_solve_url_joins_endpoint() {
        let session = ServiceSession::with_endpoint("key", "https://api.example.test/v1/").unwrap();
        let service = HttpSimulationService::new(session).unwrap();
        assert_eq!(service.solve_url(), "https://api.example.test/v1/modesolver/solve");
        assert_eq!(service.name(), "http");
    }

    /// Serves one canned HTTP response on a loopback port and hands back the raw request.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let raw = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            raw
        });
        (endpoint, handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&raw).to_string();
            if let Some(split) = text.find("\r\n\r\n") {
                let content_length = text[..split]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if raw.len() >= split + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8(raw).unwrap()
    }

    fn header<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
        let (head, _) = raw.split_once("\r\n\r\n")?;
        head.lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(n, _)| n.trim().eq_ignore_ascii_case(name))
            .map(|(_, value)| value.trim())
    }

    fn default_request() -> ModeSolverRequest {
        crate::SimulationConfigurator::with_credential("key", crate::ConfiguratorParams::default())
            .unwrap()
            .build_mode_solver()
    }

    fn assert_wire_request(raw: &str, request: &ModeSolverRequest) {
        let body = request.to_json().unwrap();
        assert!(raw.starts_with("POST /modesolver/solve HTTP/1.1\r\n"), "request line: {}", raw.lines().next().unwrap_or(""));
        assert_eq!(header(raw, "simcloud-api-key"), Some("secret-key"));
        assert_eq!(header(raw, "x-request-fingerprint"), Some(fingerprint(body.as_bytes()).as_str()));
        assert_eq!(header(raw, "content-type"), Some("application/json"));
        assert_eq!(raw.split_once("\r\n\r\n").unwrap().1, body);
    }

    #[actix_rt::test]
    async fn test_rejection_carries_status_and_body() {
        let (endpoint, server) = serve_once("429 Too Many Requests", "quota exhausted");
        let session = ServiceSession::with_endpoint("secret-key", &endpoint).unwrap();
        let service = HttpSimulationService::new(session).unwrap();
        let request = default_request();

        match service.solve_modes(&request).await {
            Err(EngineError::RemoteService { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota exhausted");
            }
            other => panic!("expected a remote service error, got {:?}", other),
        }
        assert_wire_request(&server.join().unwrap(), &request);
    }

    #[actix_rt::test]
    async fn test_success_returns_payload_untouched() {
        let payload = r#"{"n_eff":[[2.31,2.12],[2.30,2.11]],"task_id":"fdve-42"}"#;
        let (endpoint, server) = serve_once("200 OK", payload);
        let session = ServiceSession::with_endpoint("secret-key", &endpoint).unwrap();
        let service = HttpSimulationService::new(session).unwrap();
        let request = default_request();

        let data = service.solve_modes(&request).await.unwrap();
        let expected: serde_json::Value = serde_json::from_str(payload).unwrap();
        assert_eq!(data, ModeData::Solved(expected));
        assert_wire_request(&server.join().unwrap(), &request);
    }

    #[actix_rt::test]
    async fn test_non_json_success_is_transport_error() {
        let (endpoint, server) = serve_once("200 OK", "not json");
        let session = ServiceSession::with_endpoint("secret-key", &endpoint).unwrap();
        let service = HttpSimulationService::new(session).unwrap();
        let request = default_request();

        match service.solve_modes(&request).await {
            Err(err @ EngineError::Transport(_)) => assert!(err.is_remote()),
            other => panic!("expected a transport error, got {:?}", other),
        }
        server.join().unwrap();
    }
}
