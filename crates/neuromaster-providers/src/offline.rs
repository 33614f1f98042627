//! Provider used when no generative backend is configured.

use async_trait::async_trait;

use neuromaster_core::model::NerveRecord;
use neuromaster_core::traits::{ClinicalScenario, ContentProvider, Illustration};

use crate::error::ProviderError;

/// Fails every request.
///
/// Clinical sessions keep working on the built-in offline case; visual
/// rounds report themselves unavailable.
#[derive(Debug, Default)]
pub struct OfflineProvider;

#[async_trait]
impl ContentProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    async fn clinical_scenario(&self) -> anyhow::Result<ClinicalScenario> {
        Err(ProviderError::Unavailable("no content provider configured".into()).into())
    }

    async fn illustration(&self, _nerve: &NerveRecord) -> anyhow::Result<Illustration> {
        Err(ProviderError::Unavailable("no content provider configured".into()).into())
    }
}
