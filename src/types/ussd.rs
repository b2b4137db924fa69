//! USSD reply

use crate::envelope::XmlMap;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Terminal value of a USSD request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UssdResult {
    /// Reply text from the carrier
    pub content: String,
}

impl TryFrom<&XmlMap> for UssdResult {
    type Error = Error;

    fn try_from(fields: &XmlMap) -> Result<Self> {
        Ok(Self {
            content: fields.text("content")?.to_string(),
        })
    }
}
