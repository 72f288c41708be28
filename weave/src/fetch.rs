//! Blocking HTTP transport for spreadsheet exports.

use std::{io::Read, time::Duration};

use tracing::{debug, info};
use ureq::Agent;

use crate::{error::Error, traits::Fetch};

/// Fetches sources over HTTP(S) with a shared `ureq` agent.
///
/// Redirects are followed; anything other than `200 OK` at the end of the
/// chain is reported as [`Error::HttpStatus`].
pub struct HttpFetcher {
    agent: Agent,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(60))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build();
        HttpFetcher {
            agent: config.into(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Box<dyn Read>, Error> {
        info!(%url, "connecting");
        let response = self.agent.get(url).call()?;

        let status = response.status().as_u16();
        debug!(%url, status, "response received");
        if status != 200 {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        Ok(Box::new(response.into_body().into_reader()))
    }
}
