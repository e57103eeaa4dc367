use std::collections::HashMap;

use axum::{extract::State, Json};
use sea_orm::sea_query::{Expr, JoinType};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};
use serde::Serialize;

use crate::entities::booking::BookingStatus;
use crate::entities::{booking, booking_detail, tour, user};
use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub cancel: u64,
    pub approved: u64,
    pub refund: u64,
    pub refunded: u64,
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub users: u64,
    pub tours: u64,
    pub bookings: u64,
    pub by_status: StatusCounts,
    /// Sum of approved booking totals.
    pub revenue: f64,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct TourReport {
    pub tour_id: i32,
    pub title: String,
    pub bookings: u64,
    pub passengers: u64,
    pub revenue: f64,
}

/// Per-tour aggregates computed by the database.
#[derive(Debug, Default)]
pub struct TourTotals {
    pub bookings: HashMap<i32, i64>,
    pub passengers: HashMap<i32, i64>,
    pub revenue: HashMap<i32, f64>,
}

pub fn count_statuses(rows: &[(BookingStatus, i64)]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for (status, count) in rows {
        let slot = match status {
            BookingStatus::Pending => &mut counts.pending,
            BookingStatus::Cancel => &mut counts.cancel,
            BookingStatus::Approved => &mut counts.approved,
            BookingStatus::Refund => &mut counts.refund,
            BookingStatus::Refunded => &mut counts.refunded,
        };
        *slot += (*count).max(0) as u64;
    }
    counts
}

/// One row per tour. Cancelled bookings are counted but carry no passengers
/// or revenue.
pub fn tour_reports(tours: Vec<(i32, String)>, totals: &TourTotals) -> Vec<TourReport> {
    let count = |map: &HashMap<i32, i64>, id: i32| map.get(&id).copied().unwrap_or(0).max(0) as u64;

    tours
        .into_iter()
        .map(|(tour_id, title)| TourReport {
            tour_id,
            title,
            bookings: count(&totals.bookings, tour_id),
            passengers: count(&totals.passengers, tour_id),
            revenue: totals.revenue.get(&tour_id).copied().unwrap_or(0.0),
        })
        .collect()
}

async fn approved_revenue(db: &DatabaseConnection) -> AppResult<f64> {
    let revenue = booking::Entity::find()
        .select_only()
        .column_as(Expr::col(booking::Column::Total).sum(), "revenue")
        .filter(booking::Column::Status.eq(BookingStatus::Approved))
        .into_tuple::<Option<f64>>()
        .one(db)
        .await?;

    Ok(revenue.flatten().unwrap_or(0.0))
}

async fn tour_totals(db: &DatabaseConnection) -> AppResult<TourTotals> {
    let bookings = booking::Entity::find()
        .select_only()
        .column(booking::Column::TourId)
        .column_as(Expr::col(booking::Column::Code).count(), "bookings")
        .group_by(booking::Column::TourId)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?;

    let passengers = booking_detail::Entity::find()
        .select_only()
        .column(booking::Column::TourId)
        .column_as(Expr::col(booking_detail::Column::Id).count(), "passengers")
        .join(JoinType::InnerJoin, booking_detail::Relation::Booking.def())
        .filter(
            booking::Column::Status.is_not_in([BookingStatus::Cancel, BookingStatus::Refunded]),
        )
        .group_by(booking::Column::TourId)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?;

    let revenue = booking::Entity::find()
        .select_only()
        .column(booking::Column::TourId)
        .column_as(Expr::col(booking::Column::Total).sum(), "revenue")
        .filter(booking::Column::Status.eq(BookingStatus::Approved))
        .group_by(booking::Column::TourId)
        .into_tuple::<(i32, f64)>()
        .all(db)
        .await?;

    Ok(TourTotals {
        bookings: bookings.into_iter().collect(),
        passengers: passengers.into_iter().collect(),
        revenue: revenue.into_iter().collect(),
    })
}

/// Dashboard totals (admin)
pub async fn summary(State(state): State<AppState>) -> AppResult<Json<SummaryReport>> {
    let users = user::Entity::find().count(&state.db).await?;
    let tours = tour::Entity::find().count(&state.db).await?;
    let bookings = booking::Entity::find().count(&state.db).await?;

    let by_status = booking::Entity::find()
        .select_only()
        .column(booking::Column::Status)
        .column_as(Expr::col(booking::Column::Code).count(), "count")
        .group_by(booking::Column::Status)
        .into_tuple::<(BookingStatus, i64)>()
        .all(&state.db)
        .await?;

    Ok(Json(SummaryReport {
        users,
        tours,
        bookings,
        by_status: count_statuses(&by_status),
        revenue: approved_revenue(&state.db).await?,
    }))
}

/// Bookings, passengers and revenue per tour (admin)
pub async fn tours(State(state): State<AppState>) -> AppResult<Json<Vec<TourReport>>> {
    let tours = tour::Entity::find()
        .select_only()
        .column(tour::Column::Id)
        .column(tour::Column::Title)
        .order_by_asc(tour::Column::Id)
        .into_tuple::<(i32, String)>()
        .all(&state.db)
        .await?;
    let totals = tour_totals(&state.db).await?;

    Ok(Json(tour_reports(tours, &totals)))
}
