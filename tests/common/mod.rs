#![allow(dead_code)]

use async_trait::async_trait;
use rprobe::config::Config;
use rprobe::fetcher::{Fetch, HttpResponse};
use rprobe::{Result, ScanError};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One request seen by the [`ScriptedFetcher`].
#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// In-memory fetcher answering from a queue, in call order. Once the queue
/// is drained every call fails with a network error.
pub struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.push(Ok(HttpResponse::new("scripted", status, body)))
    }

    pub fn respond_times(mut self, times: usize, status: u16, body: &str) -> Self {
        for _ in 0..times {
            self = self.respond(status, body);
        }
        self
    }

    pub fn fail(self) -> Self {
        self.push(Err(ScanError::Network("connection reset by peer".to_string())))
    }

    pub fn push(mut self, response: Result<HttpResponse>) -> Self {
        self.responses.get_mut().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetch for ScriptedFetcher {
    async fn fetch_with_headers(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ScanError::Network(format!("no scripted response for {}", url))))
    }
}

/// Defaults with the inter-request delay switched off.
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.scan.rate_limit_delay = 0;
    config.scan.request_timeout = 5;
    config
}
