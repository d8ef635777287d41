//! Basic demonstration routes
//!
//! Root, profile lookups, subscription plans, and rest-of-path captures.

use serde_json::{json, Value};

use crate::params::ValidatedRequest;

/// Subscription plans selectable in the path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionPlan {
    Free,
    Weekly,
    Monthly,
    Yearly,
}

impl SubscriptionPlan {
    pub const NAMES: &'static [&'static str] = &["FREE", "WEEKLY", "MONTHLY", "YEARLY"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "FREE" => Some(Self::Free),
            "WEEKLY" => Some(Self::Weekly),
            "MONTHLY" => Some(Self::Monthly),
            "YEARLY" => Some(Self::Yearly),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }
}

pub fn root(_req: &ValidatedRequest) -> Value {
    json!({ "data": "This is root path", "path": "/" })
}

pub fn profile_me(_req: &ValidatedRequest) -> Value {
    json!({ "data": "returns the current user" })
}

pub fn profile_by_id(req: &ValidatedRequest) -> Value {
    json!({
        "data": "Here your profile data will be served",
        "path": "/profile",
        "user_id": req.value("user_id"),
    })
}

/// Unknown plan names get a fallback body, not a validation error
pub fn get_plan(req: &ValidatedRequest) -> Value {
    let plan = req.text("plan_id").and_then(SubscriptionPlan::from_name);
    match plan {
        Some(plan) => json!({ "plan_type": plan.as_str() }),
        None => json!({ "plan_type": "This plan does not exist any more" }),
    }
}

pub fn read_file(req: &ValidatedRequest) -> Value {
    let file_path = req.text("file_path").unwrap_or_default();
    let file_name = file_path.rsplit('/').next().unwrap_or_default();
    json!({ "file_path": file_path, "file_name": file_name })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_names_round_trip() {
        for name in SubscriptionPlan::NAMES {
            let plan = SubscriptionPlan::from_name(name).unwrap();
            assert_eq!(plan.as_str(), *name);
        }
        assert!(SubscriptionPlan::from_name("DAILY").is_none());
        assert!(SubscriptionPlan::from_name("free").is_none());
    }
}
