use std::time::Duration;

use signalman::{BackoffPolicy, PollConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Poll config with a short deadline and millisecond backoff
pub fn fast_config(deadline: Duration) -> PollConfig {
    let mut config = PollConfig::new(deadline);
    config.backoff = BackoffPolicy {
        initial_delay: 50,
        multiplier: 2,
        max_delay: 200,
    };
    config.request_timeout = 2000;
    config
}

/// Mock server answering every GET /health with `status` and `body`
pub async fn health_server(status: u16, body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    server
}

/// `host:port/health` for a mock server, without scheme
pub fn health_endpoint(server: &MockServer) -> String {
    format!("{}/health", server.address())
}
