use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::location::{LocationType, TripLocation};
use crate::models::trip::{DateChoice, Trip};

/// Owns trip and location records, including the date-choice derivation
/// that location forms are built from.
#[derive(Clone)]
pub struct TripService {
    db: DbPool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripLists {
    pub upcoming: Vec<Trip>,
    pub past: Vec<Trip>,
}

/// Everything the trip-detail page shows: the itinerary endpoints plus
/// objectives and camps grouped by date.
#[derive(Debug, Clone, Serialize)]
pub struct TripDetail {
    pub trip: Trip,
    pub end_date: Option<NaiveDate>,
    pub trailhead: Option<TripLocation>,
    pub endpoint: Option<TripLocation>,
    pub objectives: BTreeMap<NaiveDate, Vec<TripLocation>>,
    pub camps: BTreeMap<NaiveDate, Vec<TripLocation>>,
}

impl TripService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn get(&self, trip_id: i64) -> Result<Trip, AppError> {
        sqlx::query_as("SELECT * FROM trips WHERE id = ?")
            .bind(trip_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Creates a trip and its organizer membership in one transaction.
    /// The creator is the organizer and never goes through the pending
    /// state.
    pub async fn create(
        &self,
        user_id: i64,
        user_email: &str,
        title: &str,
        start_date: NaiveDate,
        number_nights: i64,
    ) -> Result<Trip, AppError> {
        validate_trip_fields(title, number_nights)?;
        let mut tx = self.db.begin().await?;
        let trip_id = sqlx::query(
            "INSERT INTO trips (title, start_date, number_nights) VALUES (?, ?, ?)",
        )
        .bind(title)
        .bind(start_date)
        .bind(number_nights)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query(
            "INSERT INTO trip_members (trip_id, member_id, email, organizer, accept_reqd) \
             VALUES (?, ?, ?, 1, 0)",
        )
        .bind(trip_id)
        .bind(user_id)
        .bind(user_email)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(Trip {
            id: trip_id,
            title: title.to_string(),
            start_date,
            number_nights,
        })
    }

    pub async fn update(
        &self,
        trip_id: i64,
        title: &str,
        start_date: NaiveDate,
        number_nights: i64,
    ) -> Result<Trip, AppError> {
        validate_trip_fields(title, number_nights)?;
        let updated = sqlx::query(
            "UPDATE trips SET title = ?, start_date = ?, number_nights = ? WHERE id = ?",
        )
        .bind(title)
        .bind(start_date)
        .bind(number_nights)
        .bind(trip_id)
        .execute(&self.db)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        self.get(trip_id).await
    }

    /// Deletes the trip; locations and memberships go with it via the
    /// schema's cascade rules.
    pub async fn delete(&self, trip_id: i64) -> Result<(), AppError> {
        let deleted = sqlx::query("DELETE FROM trips WHERE id = ?")
            .bind(trip_id)
            .execute(&self.db)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// The acting user's trips, split around `today` as the list page
    /// shows them.
    pub async fn list_for(&self, user_id: i64, today: NaiveDate) -> Result<TripLists, AppError> {
        let upcoming: Vec<Trip> = sqlx::query_as(
            "SELECT t.* FROM trips t JOIN trip_members m ON m.trip_id = t.id \
             WHERE m.member_id = ? AND t.start_date >= ? ORDER BY t.start_date",
        )
        .bind(user_id)
        .bind(today)
        .fetch_all(&self.db)
        .await?;
        let past: Vec<Trip> = sqlx::query_as(
            "SELECT t.* FROM trips t JOIN trip_members m ON m.trip_id = t.id \
             WHERE m.member_id = ? AND t.start_date < ? ORDER BY t.start_date",
        )
        .bind(user_id)
        .bind(today)
        .fetch_all(&self.db)
        .await?;
        Ok(TripLists { upcoming, past })
    }

    pub async fn detail(&self, trip_id: i64) -> Result<TripDetail, AppError> {
        let trip = self.get(trip_id).await?;
        let end_date = trip.end_date();
        let trailhead = self.first_of(trip_id, LocationType::Trailhead).await?;
        let endpoint = self.first_of(trip_id, LocationType::Endpoint).await?;
        let objectives = self.grouped_by_date(trip_id, LocationType::Objective).await?;
        let camps = self.grouped_by_date(trip_id, LocationType::Camp).await?;
        Ok(TripDetail {
            trip,
            end_date,
            trailhead,
            endpoint,
            objectives,
            camps,
        })
    }

    /// Labeled date choices for a location form of the given type.
    pub async fn date_choices(
        &self,
        trip_id: i64,
        kind: LocationType,
    ) -> Result<Vec<DateChoice>, AppError> {
        let trip = self.get(trip_id).await?;
        trip.date_choices(kind.granularity())
    }

    pub async fn add_location(
        &self,
        trip_id: i64,
        kind: LocationType,
        date: NaiveDate,
        details: Option<String>,
    ) -> Result<TripLocation, AppError> {
        let trip = self.get(trip_id).await?;
        check_location_date(&trip, kind, date)?;
        let id = sqlx::query(
            "INSERT INTO trip_locations (trip_id, location_type, date, details) VALUES (?, ?, ?, ?)",
        )
        .bind(trip_id)
        .bind(kind.code())
        .bind(date)
        .bind(&details)
        .execute(&self.db)
        .await?
        .last_insert_rowid();
        Ok(TripLocation {
            id,
            trip_id,
            location_type: kind.code().to_string(),
            date,
            details,
        })
    }

    pub async fn update_location(
        &self,
        trip_id: i64,
        kind: LocationType,
        location_id: i64,
        date: NaiveDate,
        details: Option<String>,
    ) -> Result<TripLocation, AppError> {
        let trip = self.get(trip_id).await?;
        check_location_date(&trip, kind, date)?;
        let updated = sqlx::query(
            "UPDATE trip_locations SET date = ?, details = ? \
             WHERE id = ? AND trip_id = ? AND location_type = ?",
        )
        .bind(date)
        .bind(&details)
        .bind(location_id)
        .bind(trip_id)
        .bind(kind.code())
        .execute(&self.db)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(TripLocation {
            id: location_id,
            trip_id,
            location_type: kind.code().to_string(),
            date,
            details,
        })
    }

    pub async fn delete_location(
        &self,
        trip_id: i64,
        kind: LocationType,
        location_id: i64,
    ) -> Result<(), AppError> {
        let deleted = sqlx::query(
            "DELETE FROM trip_locations WHERE id = ? AND trip_id = ? AND location_type = ?",
        )
        .bind(location_id)
        .bind(trip_id)
        .bind(kind.code())
        .execute(&self.db)
        .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn first_of(
        &self,
        trip_id: i64,
        kind: LocationType,
    ) -> Result<Option<TripLocation>, AppError> {
        let row = sqlx::query_as(
            "SELECT * FROM trip_locations WHERE trip_id = ? AND location_type = ? \
             ORDER BY date LIMIT 1",
        )
        .bind(trip_id)
        .bind(kind.code())
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn grouped_by_date(
        &self,
        trip_id: i64,
        kind: LocationType,
    ) -> Result<BTreeMap<NaiveDate, Vec<TripLocation>>, AppError> {
        let rows: Vec<TripLocation> = sqlx::query_as(
            "SELECT * FROM trip_locations WHERE trip_id = ? AND location_type = ? \
             ORDER BY date, id",
        )
        .bind(trip_id)
        .bind(kind.code())
        .fetch_all(&self.db)
        .await?;
        let mut grouped: BTreeMap<NaiveDate, Vec<TripLocation>> = BTreeMap::new();
        for row in rows {
            grouped.entry(row.date).or_default().push(row);
        }
        Ok(grouped)
    }
}

fn validate_trip_fields(title: &str, number_nights: i64) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("title must not be empty".into()));
    }
    if number_nights < 0 {
        return Err(AppError::Validation(
            "number_nights must be zero or more".into(),
        ));
    }
    Ok(())
}

fn check_location_date(trip: &Trip, kind: LocationType, date: NaiveDate) -> Result<(), AppError> {
    if !trip.date_in_range(date, kind.granularity())? {
        return Err(AppError::Validation(format!(
            "{date} is not a valid {} for this trip",
            kind.granularity().prefix().to_ascii_lowercase()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_is_rejected() {
        assert!(matches!(
            validate_trip_fields("  ", 2),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn negative_nights_are_rejected() {
        assert!(matches!(
            validate_trip_fields("Sahale", -1),
            Err(AppError::Validation(_))
        ));
        assert!(validate_trip_fields("Sahale", 0).is_ok());
    }

    #[test]
    fn camp_dates_must_be_nights() {
        let trip = Trip {
            id: 1,
            title: "Sahale".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            number_nights: 2,
        };
        let final_day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        // The last day of the trip is a valid objective date but not a
        // valid camp night.
        assert!(check_location_date(&trip, LocationType::Objective, final_day).is_ok());
        assert!(matches!(
            check_location_date(&trip, LocationType::Camp, final_day),
            Err(AppError::Validation(_))
        ));
    }
}
