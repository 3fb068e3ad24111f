//! Registry item model and its client-facing view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use registry_core::types::{Money, RegistryItemId};

use crate::gift::GiftComment;

/// Something on the registry that visitors can contribute towards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RegistryItem {
    /// Unique registry item identifier.
    pub id: RegistryItemId,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Target amount.
    pub total_price: Money,
    /// Sum of all gifts recorded so far.
    pub total_given: Money,
    /// `total_given >= total_price`.
    pub goal_reached: bool,
    /// When the item was seeded.
    pub created_at: DateTime<Utc>,
    /// Last increment.
    pub updated_at: DateTime<Utc>,
}

impl RegistryItem {
    /// Amount still needed to reach the target (zero once reached).
    pub fn remaining(&self) -> Money {
        Money::from_minor((self.total_price.minor() - self.total_given.minor()).max(0))
    }

    /// Add a gift amount and recompute the goal flag.
    pub fn apply_gift(&mut self, amount: Money) {
        self.total_given = self.total_given + amount;
        self.goal_reached = self.total_given >= self.total_price;
        self.updated_at = Utc::now();
    }
}

/// Data required to seed a registry item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegistryItem {
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Target amount.
    pub total_price: Money,
}

impl CreateRegistryItem {
    /// Materialize the document under a fresh id with nothing given yet.
    pub fn into_item(self, id: RegistryItemId) -> RegistryItem {
        let now = Utc::now();
        RegistryItem {
            id,
            title: self.title,
            description: self.description,
            goal_reached: !self.total_price.is_positive(),
            total_price: self.total_price,
            total_given: Money::ZERO,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A registry item joined with the comments of every gift towards it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RegistryItemView {
    /// The item itself.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub item: RegistryItem,
    /// Gift comments, oldest first.
    #[sqlx(json)]
    pub comments: Vec<GiftComment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: i64) -> RegistryItem {
        CreateRegistryItem {
            title: "Snorkelling trip".to_string(),
            description: "Two days on the reef".to_string(),
            total_price: Money::from_minor(price),
        }
        .into_item(RegistryItemId::new())
    }

    #[test]
    fn test_apply_gift_recomputes_goal() {
        let mut item = item(10_000);
        item.apply_gift(Money::from_minor(4_000));
        assert!(!item.goal_reached);
        assert_eq!(item.remaining(), Money::from_minor(6_000));

        item.apply_gift(Money::from_minor(6_000));
        assert!(item.goal_reached);
        assert_eq!(item.remaining(), Money::ZERO);

        item.apply_gift(Money::from_minor(500));
        assert!(item.goal_reached);
        assert_eq!(item.total_given, Money::from_minor(10_500));
        assert_eq!(item.remaining(), Money::ZERO);
    }

    #[test]
    fn test_view_flattens_item_fields() {
        let view = RegistryItemView {
            item: item(2_500),
            comments: Vec::new(),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["title"], "Snorkelling trip");
        assert_eq!(json["totalPrice"], 25.0);
        assert_eq!(json["totalGiven"], 0.0);
        assert_eq!(json["goalReached"], false);
        assert!(json["comments"].as_array().unwrap().is_empty());
    }
}
