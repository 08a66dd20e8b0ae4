//! Element-set sources
//!
//! `CelestrakSource` talks to the Celestrak GP endpoint; `StaticSource` serves
//! a fixed in-memory table for offline runs and tests.

use anyhow::Context;
use bevy::log::debug;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use crate::config::TrackerSettings;
use crate::error::{OrbitError, OrbitResult};
use crate::tle::mock_data::{BUNDLED, mock_block};
use crate::tle::parser::{extract_tle_block, parse_tle_epoch_to_utc};
use crate::tle::types::ElementSet;

/// Asynchronous supplier of element sets by NORAD id.
pub trait ElementSetSource: Send + Sync + 'static {
    fn fetch_element_set(&self, norad: u32)
    -> impl Future<Output = OrbitResult<ElementSet>> + Send;
}

/// Celestrak GP endpoint (`FORMAT=TLE`)
pub struct CelestrakSource {
    client: reqwest::Client,
    base_url: String,
}

impl CelestrakSource {
    pub fn new(settings: &TrackerSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            base_url: settings.celestrak_base_url.clone(),
        })
    }

    pub fn url_for(&self, norad: u32) -> String {
        format!("{}?CATNR={}&FORMAT=TLE", self.base_url, norad)
    }

    async fn fetch(&self, norad: u32) -> anyhow::Result<ElementSet> {
        let url = self.url_for(norad);
        let resp = self
            .client
            .get(&url)
            .header("accept", "text/plain")
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;
        let status = resp.status();
        let body = resp.text().await.context("reading response body")?;
        debug!(
            "[TLE FETCH] norad={} status={} bytes={}",
            norad,
            status,
            body.len()
        );
        if !status.is_success() {
            anyhow::bail!("HTTP {}", status);
        }
        let (name, line1, line2) = extract_tle_block(&body, norad)?;
        let epoch_utc = parse_tle_epoch_to_utc(&line1)
            .with_context(|| format!("unreadable epoch in {:?}", line1))?;
        Ok(ElementSet {
            name,
            line1,
            line2,
            epoch_utc,
        })
    }
}

impl ElementSetSource for CelestrakSource {
    fn fetch_element_set(
        &self,
        norad: u32,
    ) -> impl Future<Output = OrbitResult<ElementSet>> + Send {
        async move {
            self.fetch(norad)
                .await
                .map_err(|e| OrbitError::fetch(norad, format!("{:#}", e)))
        }
    }
}

/// Fixed table of element sets
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    sets: HashMap<u32, ElementSet>,
}

impl StaticSource {
    /// Source preloaded with the bundled element sets.
    pub fn bundled() -> Self {
        let mut source = Self::default();
        for (norad, block) in BUNDLED {
            let (name, line1, line2) = mock_block(block);
            // Bundled blocks all carry a readable epoch.
            if let Some(epoch_utc) = parse_tle_epoch_to_utc(&line1) {
                source.insert(
                    *norad,
                    ElementSet {
                        name,
                        line1,
                        line2,
                        epoch_utc,
                    },
                );
            }
        }
        source
    }

    pub fn insert(&mut self, norad: u32, set: ElementSet) {
        self.sets.insert(norad, set);
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl ElementSetSource for StaticSource {
    fn fetch_element_set(
        &self,
        norad: u32,
    ) -> impl Future<Output = OrbitResult<ElementSet>> + Send {
        let result = self
            .sets
            .get(&norad)
            .cloned()
            .ok_or_else(|| OrbitError::fetch(norad, "no element set available offline"));
        std::future::ready(result)
    }
}
