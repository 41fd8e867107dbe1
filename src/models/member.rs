use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One user's membership of one trip. `email` is denormalized from the
/// user record so invites key on the address the organizer typed;
/// (trip_id, email) is unique in the store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TripMember {
    pub id: i64,
    pub trip_id: i64,
    pub member_id: i64,
    pub email: String,
    pub organizer: bool,
    pub accept_reqd: bool,
}

/// How an email address relates to a trip, as reported to the invite
/// form. Pending and accepted memberships are collapsed here on purpose:
/// either one blocks a re-invite, and that is all the form needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    EligibleInvitee,
    CurrentMember,
    NotAUser,
}

impl MembershipStatus {
    /// Wire token used by the membership JSON endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::EligibleInvitee => "valid",
            MembershipStatus::CurrentMember => "current_member",
            MembershipStatus::NotAUser => "non_user",
        }
    }

    /// Classifies an email against a trip. The order matters: a
    /// registered user with no membership row for *this* trip is
    /// eligible even if they belong to other trips, so the eligibility
    /// check must run before the membership check.
    pub fn classify(user_exists: bool, has_membership: bool) -> Self {
        if user_exists && !has_membership {
            MembershipStatus::EligibleInvitee
        } else if has_membership {
            MembershipStatus::CurrentMember
        } else {
            MembershipStatus::NotAUser
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_total() {
        assert_eq!(
            MembershipStatus::classify(true, false),
            MembershipStatus::EligibleInvitee
        );
        assert_eq!(
            MembershipStatus::classify(true, true),
            MembershipStatus::CurrentMember
        );
        assert_eq!(
            MembershipStatus::classify(false, true),
            MembershipStatus::CurrentMember
        );
        assert_eq!(
            MembershipStatus::classify(false, false),
            MembershipStatus::NotAUser
        );
    }

    #[test]
    fn wire_tokens_are_stable() {
        assert_eq!(MembershipStatus::EligibleInvitee.as_str(), "valid");
        assert_eq!(MembershipStatus::CurrentMember.as_str(), "current_member");
        assert_eq!(MembershipStatus::NotAUser.as_str(), "non_user");
    }
}
