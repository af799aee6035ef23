use serde::{Deserialize, Serialize};

use crate::store::Record;

/// One guest RSVP, exactly as it is stored and listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub confirmation_id: String,
    pub name: String,
    pub surname: String,
    pub attending: bool,
    pub eating: String,
    pub allergies: String,
    pub textfield: String,
}

impl Record for Confirmation {
    const KEY_ATTRIBUTE: &'static str = "confirmationId";

    fn key(&self) -> &str {
        &self.confirmation_id
    }
}

/// One entry on the gift registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Present {
    pub present_id: String,
    pub present_title: String,
    pub img_url: String,
    pub product_url: String,
    pub bought: bool,
}

impl Record for Present {
    const KEY_ATTRIBUTE: &'static str = "presentId";

    fn key(&self) -> &str {
        &self.present_id
    }
}
