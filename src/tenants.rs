//! Tenant fixture lookup: tenant identifier to subdomain.
//!
//! Static fixture data consumed only to build URLs.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{HarnessError, Result};

pub const DEFAULT_FIXTURE: &str = "fixtures/tenants.json";

#[derive(Clone, Debug, Deserialize)]
pub struct Tenant {
    pub subdomain: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Tenants(BTreeMap<String, Tenant>);

impl Tenants {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| HarnessError::Fixture {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|err| HarnessError::Fixture {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
        })
    }

    pub fn subdomain(&self, tenant: &str) -> Option<&str> {
        self.0.get(tenant).map(|tenant| tenant.subdomain.as_str())
    }
}
