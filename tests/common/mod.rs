#![allow(dead_code)]

use async_trait::async_trait;
use rmcs::{CameraId, Engine, Error, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Calls observed by a [`MockEngine`]
#[derive(Debug, Default)]
pub struct EngineCalls {
    pub starts: usize,
    pub stops: usize,
    pub switches: Vec<CameraId>,
}

/// Scriptable engine for session tests
pub struct MockEngine {
    calls: Arc<Mutex<EngineCalls>>,
    fail_start: bool,
    rejected: Vec<CameraId>,
    stop_delay: Duration,
}

impl MockEngine {
    pub fn new() -> (Self, Arc<Mutex<EngineCalls>>) {
        let calls = Arc::new(Mutex::new(EngineCalls::default()));
        let engine = Self {
            calls: Arc::clone(&calls),
            fail_start: false,
            rejected: Vec::new(),
            stop_delay: Duration::ZERO,
        };
        (engine, calls)
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn rejecting(mut self, camera: CameraId) -> Self {
        self.rejected.push(camera);
        self
    }

    pub fn slow_stop(mut self, delay: Duration) -> Self {
        self.stop_delay = delay;
        self
    }
}

#[async_trait]
impl Engine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn start(&mut self) -> Result<()> {
        self.calls.lock().unwrap().starts += 1;
        if self.fail_start {
            return Err(Error::Engine("broker unreachable".to_string()));
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        tokio::time::sleep(self.stop_delay).await;
        self.calls.lock().unwrap().stops += 1;
        Ok(())
    }

    async fn switch_camera(&mut self, camera: CameraId) -> Result<()> {
        if self.rejected.contains(&camera) {
            return Err(Error::UnknownCamera(camera));
        }
        self.calls.lock().unwrap().switches.push(camera);
        Ok(())
    }
}
