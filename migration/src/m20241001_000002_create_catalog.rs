use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Airline::Table)
                    .if_not_exists()
                    .col(pk_auto(Airline::Id))
                    .col(string_len(Airline::Name, 100).not_null().unique_key())
                    .col(
                        timestamp_with_time_zone(Airline::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Location::Table)
                    .if_not_exists()
                    .col(pk_auto(Location::Id))
                    .col(string_len(Location::Name, 100).not_null().unique_key())
                    .col(text_null(Location::Description))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Facility::Table)
                    .if_not_exists()
                    .col(pk_auto(Facility::Id))
                    .col(string_len(Facility::Name, 100).not_null().unique_key())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Facility::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Location::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Airline::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Airline {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Location {
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
pub enum Facility {
    Table,
    Id,
    Name,
}
