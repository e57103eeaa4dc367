use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20241001_000001_create_users::User;
use super::m20241001_000003_create_tours::Tour;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(BookingStatus::Enum)
                    .values([
                        BookingStatus::Pending,
                        BookingStatus::Cancel,
                        BookingStatus::Approved,
                        BookingStatus::Refund,
                        BookingStatus::Refunded,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(big_integer(Booking::Code).primary_key())
                    .col(integer(Booking::TourId).not_null())
                    .col(integer(Booking::UserId).not_null())
                    .col(double(Booking::Total).not_null())
                    .col(
                        ColumnDef::new(Booking::Status)
                            .custom(BookingStatus::Enum)
                            .not_null(),
                    )
                    .col(timestamp_with_time_zone(Booking::BookedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_tour")
                            .from(Booking::Table, Booking::TourId)
                            .to(Tour::Table, Tour::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_user")
                            .from(Booking::Table, Booking::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BookingDetail::Table)
                    .if_not_exists()
                    .col(pk_auto(BookingDetail::Id))
                    .col(big_integer(BookingDetail::BookingCode).not_null())
                    .col(string_len(BookingDetail::DocumentNumber, 50).not_null())
                    .col(string_len(BookingDetail::Greeting, 20).not_null())
                    .col(string_len(BookingDetail::Name, 100).not_null())
                    .col(string_len(BookingDetail::Nationality, 60).not_null())
                    .col(date(BookingDetail::Dob).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_detail_booking")
                            .from(BookingDetail::Table, BookingDetail::BookingCode)
                            .to(Booking::Table, Booking::Code)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payment::Table)
                    .if_not_exists()
                    .col(pk_auto(Payment::Id))
                    .col(big_integer(Payment::BookingCode).not_null().unique_key())
                    .col(string_len(Payment::Method, 50).not_null())
                    .col(string_len(Payment::Bank, 20).not_null())
                    .col(string_len_null(Payment::VirtualNumber, 50))
                    .col(string_len_null(Payment::BillKey, 50))
                    .col(string_len_null(Payment::BillCode, 50))
                    .col(string_len(Payment::Status, 30).not_null())
                    .col(double(Payment::Total).not_null())
                    .col(timestamp_with_time_zone(Payment::CreatedAt).not_null())
                    .col(timestamp_with_time_zone_null(Payment::ExpiredAt))
                    .col(timestamp_with_time_zone_null(Payment::PaidAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_booking")
                            .from(Payment::Table, Payment::BookingCode)
                            .to(Booking::Table, Booking::Code)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payment::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BookingDetail::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(BookingStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Booking {
    Table,
    Code,
    TourId,
    UserId,
    Total,
    Status,
    BookedAt,
}

#[derive(DeriveIden)]
pub enum BookingDetail {
    Table,
    Id,
    BookingCode,
    DocumentNumber,
    Greeting,
    Name,
    Nationality,
    Dob,
}

#[derive(DeriveIden)]
pub enum Payment {
    Table,
    Id,
    BookingCode,
    Method,
    Bank,
    VirtualNumber,
    BillKey,
    BillCode,
    Status,
    Total,
    CreatedAt,
    ExpiredAt,
    PaidAt,
}

#[derive(DeriveIden)]
pub enum BookingStatus {
    #[sea_orm(iden = "booking_status")]
    Enum,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "cancel")]
    Cancel,
    #[sea_orm(iden = "approved")]
    Approved,
    #[sea_orm(iden = "refund")]
    Refund,
    #[sea_orm(iden = "refunded")]
    Refunded,
}
