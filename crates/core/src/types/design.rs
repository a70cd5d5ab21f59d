//! Custom-print design orders: uploaded front/back artwork plus two lines of
//! free text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::DesignOrderId;

/// A design order that has not been persisted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDesignOrder {
    /// Public URL of the front image.
    pub image_url: Option<String>,
    /// Public URL of the back image.
    pub image_url2: Option<String>,
    pub text: String,
    pub text2: String,
}

/// A persisted design order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignOrder {
    #[serde(rename = "_id")]
    pub id: DesignOrderId,
    pub image_url: Option<String>,
    pub image_url2: Option<String>,
    pub text: String,
    pub text2: String,
    pub created_at: DateTime<Utc>,
}

impl DesignOrder {
    /// Attach the repository-assigned identity to a draft.
    #[must_use]
    pub fn from_new(id: DesignOrderId, order: NewDesignOrder, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            image_url: order.image_url,
            image_url2: order.image_url2,
            text: order.text,
            text2: order.text2,
            created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_design_order_serializes_null_images() {
        let order = DesignOrder::from_new(
            DesignOrderId::generate(),
            NewDesignOrder {
                text: "Hello".to_string(),
                ..NewDesignOrder::default()
            },
            Utc::now(),
        );
        let value = serde_json::to_value(&order).unwrap();
        assert!(value["imageUrl"].is_null());
        assert!(value["imageUrl2"].is_null());
        assert_eq!(value["text"], "Hello");
        assert_eq!(value["text2"], "");
    }
}
