use sea_orm_migration::{prelude::*, schema::*};

use super::m20241001_000002_create_catalog::{Airline, Facility, Location};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tour::Table)
                    .if_not_exists()
                    .col(pk_auto(Tour::Id))
                    .col(string_len(Tour::Title, 200).not_null())
                    .col(text(Tour::Description).not_null())
                    .col(integer(Tour::AirlineId).not_null())
                    .col(integer(Tour::LocationId).not_null())
                    .col(double(Tour::Price).not_null())
                    .col(double(Tour::AdminFee).not_null())
                    .col(integer(Tour::Discount).not_null().default(0))
                    .col(integer(Tour::Quota).not_null())
                    .col(integer(Tour::Available).not_null())
                    .col(timestamp_with_time_zone(Tour::StartAt).not_null())
                    .col(timestamp_with_time_zone(Tour::FinishAt).not_null())
                    .col(string_len_null(Tour::ImageUrl, 500))
                    .col(
                        timestamp_with_time_zone(Tour::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Tour::Available).lte(Expr::col(Tour::Quota)))
                    .check(Expr::col(Tour::Available).gte(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tour_airline")
                            .from(Tour::Table, Tour::AirlineId)
                            .to(Airline::Table, Airline::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tour_location")
                            .from(Tour::Table, Tour::LocationId)
                            .to(Location::Table, Location::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TourFacility::Table)
                    .if_not_exists()
                    .col(integer(TourFacility::TourId).not_null())
                    .col(integer(TourFacility::FacilityId).not_null())
                    .primary_key(
                        Index::create()
                            .col(TourFacility::TourId)
                            .col(TourFacility::FacilityId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tour_facility_tour")
                            .from(TourFacility::Table, TourFacility::TourId)
                            .to(Tour::Table, Tour::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tour_facility_facility")
                            .from(TourFacility::Table, TourFacility::FacilityId)
                            .to(Facility::Table, Facility::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TourFacility::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tour::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Tour {
    Table,
    Id,
    Title,
    Description,
    AirlineId,
    LocationId,
    Price,
    AdminFee,
    Discount,
    Quota,
    Available,
    StartAt,
    FinishAt,
    ImageUrl,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum TourFacility {
    Table,
    TourId,
    FacilityId,
}
