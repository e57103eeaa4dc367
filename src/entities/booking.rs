use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "booking_status")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "cancel")]
    Cancel,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "refund")]
    Refund,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl BookingStatus {
    /// Map a gateway `transaction_status` onto the booking lifecycle.
    /// Returns `None` for statuses that do not move the booking.
    pub fn from_transaction_status(status: &str) -> Option<Self> {
        match status {
            "capture" | "settlement" => Some(BookingStatus::Approved),
            "pending" => Some(BookingStatus::Pending),
            "deny" | "cancel" | "expire" | "failure" => Some(BookingStatus::Cancel),
            "refund" | "partial_refund" => Some(BookingStatus::Refunded),
            _ => None,
        }
    }

    /// Whether seats held by a booking in this status go back to the tour.
    pub fn releases_seats(self) -> bool {
        matches!(self, BookingStatus::Cancel | BookingStatus::Refunded)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: i64,
    pub tour_id: i32,
    pub user_id: i32,
    pub total: f64,
    pub status: BookingStatus,
    pub booked_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tour::Entity",
        from = "Column::TourId",
        to = "super::tour::Column::Id"
    )]
    Tour,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::booking_detail::Entity")]
    Details,
    #[sea_orm(has_one = "super::payment::Entity")]
    Payment,
}

impl Related<super::tour::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tour.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::booking_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Details.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_approves() {
        assert_eq!(
            BookingStatus::from_transaction_status("settlement"),
            Some(BookingStatus::Approved)
        );
        assert_eq!(
            BookingStatus::from_transaction_status("capture"),
            Some(BookingStatus::Approved)
        );
    }

    #[test]
    fn test_expire_cancels_and_releases() {
        let status = BookingStatus::from_transaction_status("expire").unwrap();
        assert_eq!(status, BookingStatus::Cancel);
        assert!(status.releases_seats());
        assert!(!BookingStatus::Approved.releases_seats());
    }

    #[test]
    fn test_unknown_status_is_ignored() {
        assert_eq!(BookingStatus::from_transaction_status("authorize"), None);
    }
}
