//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use meownest::config::GatewayConfig;
use meownest::http::HttpServer;
use meownest::lifecycle::Shutdown;

/// A gateway serving on an ephemeral local port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub updates: mpsc::UnboundedSender<GatewayConfig>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    #[allow(dead_code)]
    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let result = tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked");
        result.expect("server returned an error");
    }
}

/// Parse a TOML config for tests.
pub fn config(toml_src: &str) -> GatewayConfig {
    let config: GatewayConfig = toml::from_str(toml_src).expect("test config must parse");
    meownest::config::validate_config(&config).expect("test config must validate");
    config
}

pub async fn spawn_gateway(config: GatewayConfig) -> TestGateway {
    let server = HttpServer::new(config).expect("gateway must build");
    spawn_server(server).await
}

pub async fn spawn_server(server: HttpServer) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    let (updates, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(server.run(listener, rx, stop));

    TestGateway {
        addr,
        shutdown,
        updates,
        handle,
    }
}

/// HTTP client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
