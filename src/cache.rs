use std::{fmt::Debug, fs, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{core::price::PriceSeries, prelude::*};

/// Last successfully fetched price series.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub fetched_at: DateTime<Utc>,
    pub prices: PriceSeries,
}

impl Snapshot {
    /// Returns [`None`] if there is no snapshot yet.
    #[instrument(name = "reading the snapshot…")]
    pub fn read_from<P: AsRef<Path> + Debug>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(None);
        }
        let contents = fs::read(path).with_context(|| format!("failed to read `{}`", path.display()))?;
        let snapshot: Self = toml::from_slice(&contents)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;
        debug!(len = snapshot.prices.len(), %snapshot.fetched_at, "read");
        Ok(Some(snapshot))
    }

    #[instrument(skip(self), name = "writing the snapshot…")]
    pub fn write_to<P: AsRef<Path> + Debug>(&self, path: P) -> Result {
        fs::write(path, toml::to_string(self)?)?;
        Ok(())
    }
}
