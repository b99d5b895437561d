//! Status and role enumerations aligned with persisted database enums.
//!
//! Membership is the only rule: any member may replace any other member, and the
//! last committed write wins.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a label does not belong to the targeted enumeration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("`{value}` is not a valid {kind}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownLabel {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Lifecycle of articles and products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "content_status", rename_all = "snake_case")]
pub enum ContentStatus {
    Draft,
    Published,
    Banned,
}

impl ContentStatus {
    pub const ALL: [ContentStatus; 3] = [Self::Draft, Self::Published, Self::Banned];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
            ContentStatus::Banned => "banned",
        }
    }

    pub fn is_public(self) -> bool {
        matches!(self, ContentStatus::Published)
    }
}

impl FromStr for ContentStatus {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownLabel::new("content status", value))
    }
}

/// Moderation state of talents and communities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "review_status", rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub const ALL: [ReviewStatus; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    pub fn as_str(self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }

    pub fn is_public(self) -> bool {
        matches!(self, ReviewStatus::Approved)
    }
}

impl FromStr for ReviewStatus {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownLabel::new("review status", value))
    }
}

/// Availability of a hub program. Only used for display ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "hub_status", rename_all = "snake_case")]
pub enum HubStatus {
    Active,
    Inactive,
    Soon,
}

impl HubStatus {
    pub const ALL: [HubStatus; 3] = [Self::Active, Self::Inactive, Self::Soon];

    pub fn as_str(self) -> &'static str {
        match self {
            HubStatus::Active => "active",
            HubStatus::Inactive => "inactive",
            HubStatus::Soon => "soon",
        }
    }

    /// Listing rank: active programs first, upcoming next, inactive last.
    pub fn display_rank(self) -> u8 {
        match self {
            HubStatus::Active => 0,
            HubStatus::Soon => 1,
            HubStatus::Inactive => 2,
        }
    }
}

impl FromStr for HubStatus {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownLabel::new("hub status", value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Member,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Member => "member",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

display_as_str!(ContentStatus, ReviewStatus, HubStatus, UserRole);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_member_parses_from_its_label() {
        for status in ContentStatus::ALL {
            assert_eq!(status.as_str().parse::<ContentStatus>(), Ok(status));
        }
        for status in ReviewStatus::ALL {
            assert_eq!(status.as_str().parse::<ReviewStatus>(), Ok(status));
        }
        for status in HubStatus::ALL {
            assert_eq!(status.as_str().parse::<HubStatus>(), Ok(status));
        }
    }

    #[test]
    fn labels_outside_the_set_are_rejected() {
        let err = "archived".parse::<ContentStatus>().unwrap_err();
        assert_eq!(err.kind, "content status");
        assert_eq!(err.value, "archived");

        assert!("Published".parse::<ContentStatus>().is_err());
        assert!("published".parse::<ReviewStatus>().is_err());
        assert!("".parse::<HubStatus>().is_err());
    }

    #[test]
    fn hubs_rank_active_then_soon_then_inactive() {
        let mut statuses = vec![HubStatus::Inactive, HubStatus::Soon, HubStatus::Active];
        statuses.sort_by_key(|status| status.display_rank());
        assert_eq!(
            statuses,
            vec![HubStatus::Active, HubStatus::Soon, HubStatus::Inactive]
        );
    }

    #[test]
    fn only_published_and_approved_are_public() {
        assert!(ContentStatus::Published.is_public());
        assert!(!ContentStatus::Draft.is_public());
        assert!(!ContentStatus::Banned.is_public());
        assert!(ReviewStatus::Approved.is_public());
        assert!(!ReviewStatus::Pending.is_public());
    }
}
