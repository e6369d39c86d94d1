use serde::{Deserialize, Serialize};

pub const DEFAULT_REMOTE_ADDR: &str = "127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub remote_addr: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            remote_addr: DEFAULT_REMOTE_ADDR.to_string(),
            poll_interval_ms: 5_000,
            request_timeout_ms: 10_000,
        }
    }
}

impl ClientConfig {
    pub fn sanitize(&mut self) {
        let trimmed = self.remote_addr.trim();
        self.remote_addr = if trimmed.is_empty() {
            DEFAULT_REMOTE_ADDR.to_string()
        } else {
            trimmed.to_string()
        };

        self.poll_interval_ms = self.poll_interval_ms.clamp(250, 600_000);
        self.request_timeout_ms = self.request_timeout_ms.clamp(500, 60_000);
    }

    pub fn base_url(&self) -> String {
        let addr = self.remote_addr.trim_end_matches('/');
        if addr.starts_with("http://") || addr.starts_with("https://") {
            addr.to_string()
        } else {
            format!("http://{addr}")
        }
    }
}
