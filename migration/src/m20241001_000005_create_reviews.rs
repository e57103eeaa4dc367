use sea_orm_migration::{prelude::*, schema::*};

use super::m20241001_000001_create_users::User;
use super::m20241001_000003_create_tours::Tour;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(pk_auto(Review::Id))
                    .col(integer(Review::TourId).not_null())
                    .col(integer(Review::UserId).not_null())
                    .col(double(Review::Rating).not_null())
                    .col(text(Review::Comment).not_null())
                    .col(
                        timestamp_with_time_zone(Review::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_tour")
                            .from(Review::Table, Review::TourId)
                            .to(Tour::Table, Tour::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_user")
                            .from(Review::Table, Review::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Review::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Review {
    Table,
    Id,
    TourId,
    UserId,
    Rating,
    Comment,
    CreatedAt,
}
