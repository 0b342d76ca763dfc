//! Config-driven provider registry
//!
//! Providers are declared in configuration; each entry carries the base
//! URL calls on that provider live under. Join URLs are the base URL plus
//! the call id, with per-user details appended as query parameters.

use crate::config::{ProviderConfig, ProviderSettings};
use crate::domain::provider::{CallDescriptor, JoinOptions, ProviderInfo, ProviderRegistry};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::user::UserRef;
use async_trait::async_trait;

pub struct StaticProviderRegistry {
    active: Option<String>,
    providers: Vec<ProviderSettings>,
}

impl StaticProviderRegistry {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            active: config.active.clone(),
            providers: config.providers.clone(),
        }
    }

    fn entry(&self, name: &str) -> Option<&ProviderSettings> {
        self.providers.iter().find(|p| p.key == name)
    }
}

#[async_trait]
impl ProviderRegistry for StaticProviderRegistry {
    fn active_provider(&self) -> Option<String> {
        // An active key with no matching entry counts as no provider
        self.active.clone().filter(|key| self.entry(key).is_some())
    }

    fn is_available(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    async fn generate_url(&self, name: &str, call: &CallDescriptor) -> Result<String> {
        let entry = self
            .entry(name)
            .ok_or(DomainError::ProviderUnavailable)?;

        Ok(format!(
            "{}/{}",
            entry.base_url.trim_end_matches('/'),
            call.id
        ))
    }

    async fn customize_url<'a>(
        &self,
        name: &str,
        call: &CallDescriptor,
        user: Option<&'a UserRef>,
        options: &JoinOptions,
    ) -> Result<String> {
        let base = match &call.url {
            Some(url) => url.clone(),
            None => self.generate_url(name, call).await?,
        };

        let mut params = Vec::new();
        if let Some(user) = user {
            params.push(format!("username={}", user.username));
        }
        if let Some(mic) = options.mic {
            params.push(format!("mic={}", mic));
        }
        if let Some(cam) = options.cam {
            params.push(format!("cam={}", cam));
        }

        if params.is_empty() {
            return Ok(base);
        }

        let sep = if base.contains('?') { '&' } else { '?' };
        Ok(format!("{}{}{}", base, sep, params.join("&")))
    }

    fn provider_list(&self) -> Vec<ProviderInfo> {
        self.providers
            .iter()
            .map(|p| ProviderInfo {
                key: p.key.clone(),
                label: p.label.clone(),
            })
            .collect()
    }
}
