use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tour")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub airline_id: i32,
    pub location_id: i32,
    pub price: f64,
    pub admin_fee: f64,
    /// Whole percentage, 0-100.
    pub discount: i32,
    pub quota: i32,
    pub available: i32,
    pub start_at: DateTimeWithTimeZone,
    pub finish_at: DateTimeWithTimeZone,
    pub image_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::airline::Entity",
        from = "Column::AirlineId",
        to = "super::airline::Column::Id"
    )]
    Airline,
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id"
    )]
    Location,
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::airline::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Airline.def()
    }
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::facility::Entity> for Entity {
    fn to() -> RelationDef {
        super::tour_facility::Relation::Facility.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::tour_facility::Relation::Tour.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
