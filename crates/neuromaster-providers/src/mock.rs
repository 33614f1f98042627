//! Mock provider for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use neuromaster_core::model::NerveRecord;
use neuromaster_core::traits::{ClinicalScenario, ContentProvider, Illustration};

use crate::error::ProviderError;

/// 1×1 transparent PNG.
const PIXEL_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// A mock content provider for exercising sessions without real API calls.
///
/// Returns canned content, or fails every call when built with
/// [`MockProvider::failing`].
pub struct MockProvider {
    /// Target of every generated clinical case.
    target_id: u8,
    /// Whether every call fails.
    fail: bool,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Nerve id of the last illustration request.
    last_illustrated: Mutex<Option<u8>>,
}

impl MockProvider {
    /// Clinical cases always target nerve `target_id`.
    pub fn with_target(target_id: u8) -> Self {
        Self {
            target_id,
            fail: false,
            call_count: AtomicU32::new(0),
            last_illustrated: Mutex::new(None),
        }
    }

    /// Every call fails with a network error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_target(1)
        }
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Nerve id of the last illustration request.
    pub fn last_illustrated(&self) -> Option<u8> {
        self.last_illustrated.lock().ok().and_then(|guard| *guard)
    }
}

#[async_trait]
impl ContentProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn clinical_scenario(&self) -> anyhow::Result<ClinicalScenario> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if self.fail {
            return Err(ProviderError::NetworkError("mock failure".into()).into());
        }
        Ok(ClinicalScenario {
            text: format!("Mock clinical case #{}", self.call_count()),
            target_id: self.target_id,
            offline: false,
        })
    }

    async fn illustration(&self, nerve: &NerveRecord) -> anyhow::Result<Illustration> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_illustrated.lock() {
            *last = Some(nerve.id);
        }
        if self.fail {
            return Err(ProviderError::NetworkError("mock failure".into()).into());
        }
        Ok(Illustration {
            mime_type: "image/png".into(),
            data_base64: PIXEL_PNG_BASE64.into(),
        })
    }
}
