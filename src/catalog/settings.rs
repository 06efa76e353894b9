use std::{fs, io, path::Path};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::BatchError;

use super::product::{Currency, parse_lenient};

/// Catalog defaults: profit rate and currency for new products, and the
/// manual dollar to LBP conversion rate used to display dollar prices.
///
/// Stored as JSON with the keys `dollarByLbp`, `profitRate` and
/// `productCurrency`. Missing keys take their default value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Conversion rate as typed by the user; may be blank.
    pub dollar_by_lbp: String,
    pub profit_rate: i32,
    pub product_currency: Currency,
}

impl Settings {
    /// Loads settings from `path`, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    /// `BatchError::Io` if the file exists but cannot be read, and
    /// `BatchError::Configuration` if its content is not valid settings JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings, BatchError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", path.display());
                return Ok(Settings::default());
            }
            Err(error) => return Err(error.into()),
        };

        serde_json::from_str(&content).map_err(|error| {
            BatchError::Configuration(format!("invalid settings {}: {}", path.display(), error))
        })
    }

    /// Saves settings to `path` as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), BatchError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)
            .map_err(|error| BatchError::Configuration(error.to_string()))?;
        fs::write(path, content)?;
        info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// The conversion rate, when it is set to a number.
    pub fn dollar_rate(&self) -> Option<f64> {
        parse_lenient(&self.dollar_by_lbp)
    }
}
