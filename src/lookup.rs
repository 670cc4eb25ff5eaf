//! URL builders for the external public-registry lookup. Only the company
//! name goes out; the response is left to the caller.

use crate::config::RegistryConfig;
use crate::error::ConfigError;

const PLACEHOLDER: &str = "{name}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryLookup {
    search_template: Option<String>,
    profile_template: Option<String>,
}

impl RegistryLookup {
    /// Validate that each configured template carries a `{name}` slot.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, ConfigError> {
        for template in [&config.search_url, &config.profile_url].into_iter().flatten() {
            if !template.contains(PLACEHOLDER) {
                return Err(ConfigError::Template(template.clone()));
            }
        }
        Ok(Self {
            search_template: config.search_url.clone(),
            profile_template: config.profile_url.clone(),
        })
    }

    /// Keyword-search API URL, if a search template is configured.
    pub fn search_url(&self, company_name: &str) -> Option<String> {
        self.search_template
            .as_deref()
            .map(|t| fill(t, company_name))
    }

    /// Deep link to the company's registry page, if configured.
    pub fn profile_url(&self, company_name: &str) -> Option<String> {
        self.profile_template
            .as_deref()
            .map(|t| fill(t, company_name))
    }
}

fn fill(template: &str, company_name: &str) -> String {
    template.replace(PLACEHOLDER, &urlencoding::encode(company_name.trim()))
}
