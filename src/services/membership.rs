use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

use crate::db::DbPool;
use crate::error::{AppError, WorkflowError};
use crate::models::member::{MembershipStatus, TripMember};
use crate::models::notification::ItemNotification;
use crate::models::user::User;

/// Owns the trip-membership lifecycle: invitation, acceptance, removal,
/// and the classification of an email address against a trip.
///
/// The store's UNIQUE(trip_id, email) constraint is the authoritative
/// guard against duplicate invites; `classify` is advisory for the UI.
#[derive(Clone)]
pub struct MembershipService {
    db: DbPool,
}

/// Invite-form payload: the invited account, as confirmed by the server.
#[derive(Debug, Clone, Serialize)]
pub struct InvitedMember {
    pub email: String,
    pub preferred_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Roster {
    pub pending: Vec<TripMember>,
    pub current: Vec<TripMember>,
}

/// A pending invite as shown on the notifications view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TripInvite {
    pub trip_id: i64,
    pub title: String,
    pub start_date: NaiveDate,
}

impl MembershipService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Three-way status of `email` relative to `trip_id`. Eligibility is
    /// checked before membership so a user who belongs to *other* trips
    /// still classifies as an eligible invitee for this one.
    pub async fn classify(&self, trip_id: i64, email: &str) -> Result<MembershipStatus, AppError> {
        let trip_exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM trips WHERE id = ?)",
        )
        .bind(trip_id)
        .fetch_one(&self.db)
        .await?
            != 0;
        if !trip_exists {
            return Err(AppError::NotFound);
        }

        let user_exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)",
        )
        .bind(email)
        .fetch_one(&self.db)
        .await?
            != 0;
        let has_membership = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM trip_members WHERE trip_id = ? AND email = ?)",
        )
        .bind(trip_id)
        .bind(email)
        .fetch_one(&self.db)
        .await?
            != 0;
        Ok(MembershipStatus::classify(user_exists, has_membership))
    }

    /// Organizer action: invites a registered user onto a trip. The new
    /// membership starts pending until the invitee accepts it.
    pub async fn invite(&self, trip_id: i64, email: &str) -> Result<InvitedMember, AppError> {
        let mut tx = self.db.begin().await?;

        let trip_exists = sqlx::query_scalar::<_, i64>("SELECT EXISTS(SELECT 1 FROM trips WHERE id = ?)")
            .bind(trip_id)
            .fetch_one(&mut *tx)
            .await?
            != 0;
        if !trip_exists {
            return Err(AppError::NotFound);
        }

        let user: User = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(WorkflowError::UnknownUser)?;

        let insert = sqlx::query(
            "INSERT INTO trip_members (trip_id, member_id, email, organizer, accept_reqd) \
             VALUES (?, ?, ?, 1, 1)",
        )
        .bind(trip_id)
        .bind(user.id)
        .bind(&user.email)
        .execute(&mut *tx)
        .await;

        match insert {
            Ok(_) => {}
            // A concurrent invite to the same address loses the race on
            // the (trip_id, email) constraint.
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(WorkflowError::AlreadyMember.into());
            }
            Err(err) => return Err(err.into()),
        }

        tx.commit().await?;

        Ok(InvitedMember {
            email: user.email.clone(),
            preferred_name: user.preferred_name.clone().unwrap_or_default(),
        })
    }

    /// Invitee action: marks the acting user's pending membership as
    /// accepted.
    pub async fn accept(&self, trip_id: i64, user_id: i64) -> Result<(), AppError> {
        let updated = sqlx::query(
            "UPDATE trip_members SET accept_reqd = 0 \
             WHERE trip_id = ? AND member_id = ? AND accept_reqd = 1",
        )
        .bind(trip_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(WorkflowError::NoPendingInvite.into());
        }
        Ok(())
    }

    /// Removes the acting user's membership, pending or accepted.
    pub async fn remove(&self, trip_id: i64, user_id: i64) -> Result<(), AppError> {
        let deleted = sqlx::query("DELETE FROM trip_members WHERE trip_id = ? AND member_id = ?")
            .bind(trip_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(WorkflowError::NoMembership.into());
        }
        Ok(())
    }

    pub async fn roster(&self, trip_id: i64) -> Result<Roster, AppError> {
        let pending: Vec<TripMember> = sqlx::query_as(
            "SELECT * FROM trip_members WHERE trip_id = ? AND accept_reqd = 1 ORDER BY email",
        )
        .bind(trip_id)
        .fetch_all(&self.db)
        .await?;
        let current: Vec<TripMember> = sqlx::query_as(
            "SELECT * FROM trip_members WHERE trip_id = ? AND accept_reqd = 0 ORDER BY email",
        )
        .bind(trip_id)
        .fetch_all(&self.db)
        .await?;
        Ok(Roster { pending, current })
    }

    pub async fn membership(
        &self,
        trip_id: i64,
        user_id: i64,
    ) -> Result<Option<TripMember>, AppError> {
        let row = sqlx::query_as("SELECT * FROM trip_members WHERE trip_id = ? AND member_id = ?")
            .bind(trip_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    pub async fn require_member(&self, trip_id: i64, user_id: i64) -> Result<TripMember, AppError> {
        self.membership(trip_id, user_id)
            .await?
            .ok_or(AppError::Forbidden)
    }

    pub async fn require_organizer(
        &self,
        trip_id: i64,
        user_id: i64,
    ) -> Result<TripMember, AppError> {
        let member = self.require_member(trip_id, user_id).await?;
        if !member.organizer {
            return Err(AppError::Forbidden);
        }
        Ok(member)
    }

    /// Pending invites for the notifications view, newest trip first.
    pub async fn pending_invites_for(&self, user_id: i64) -> Result<Vec<TripInvite>, AppError> {
        let invites = sqlx::query_as(
            "SELECT t.id AS trip_id, t.title, t.start_date \
             FROM trip_members m JOIN trips t ON t.id = m.trip_id \
             WHERE m.member_id = ? AND m.accept_reqd = 1 \
             ORDER BY t.start_date",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(invites)
    }

    pub async fn item_notifications_for(
        &self,
        user_id: i64,
    ) -> Result<Vec<ItemNotification>, AppError> {
        let items = sqlx::query_as(
            "SELECT * FROM item_notifications WHERE owner_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(items)
    }
}
