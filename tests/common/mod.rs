//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use adaptive_webp::config::{LiveConfig, ServerConfig};
use adaptive_webp::imaging::transform::{
    ImageTransform, RenderPlan, SourceFormat, SourceImage, TransformError,
};
use adaptive_webp::imaging::RasterTransform;
use adaptive_webp::{HttpServer, Shutdown};
use image::{Rgba, RgbaImage};
use tokio::net::TcpListener;

/// Write a `width`×`height` PNG with a simple gradient.
pub fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    image.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Configuration serving `root` for every host.
pub fn config_for_root(root: &Path) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.delivery.hostmap = format!(":{}", root.display());
    config
}

/// Transform that records plans and returns a fixed body instead of encoding.
pub struct RecordingTransform {
    pub source: SourceImage,
    pub plans: Mutex<Vec<RenderPlan>>,
}

impl RecordingTransform {
    pub fn new(width: u32, height: u32) -> Arc<Self> {
        Arc::new(Self {
            source: SourceImage {
                width,
                height,
                format: SourceFormat::Jpeg,
            },
            plans: Mutex::new(Vec::new()),
        })
    }

    pub fn last_plan(&self) -> Option<RenderPlan> {
        self.plans.lock().unwrap().last().cloned()
    }
}

impl ImageTransform for RecordingTransform {
    fn inspect(&self, _source: &Path) -> Result<SourceImage, TransformError> {
        Ok(self.source.clone())
    }

    fn render(&self, _source: &Path, plan: &RenderPlan) -> Result<Vec<u8>, TransformError> {
        self.plans.lock().unwrap().push(plan.clone());
        Ok(b"encoded".to_vec())
    }
}

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub live: Arc<LiveConfig>,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the real server with the real codec.
pub async fn start_server(config: ServerConfig) -> TestServer {
    start_server_with(config, Arc::new(RasterTransform)).await
}

pub async fn start_server_with(config: ServerConfig, transform: Arc<dyn ImageTransform>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let live = Arc::new(LiveConfig::new(config));
    let shutdown = Shutdown::new();

    let server = HttpServer::new(live.clone(), transform);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    TestServer { addr, live, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
