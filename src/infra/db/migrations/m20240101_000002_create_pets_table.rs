//! Migration: Create pets table.
//!
//! Pets carry no owner column; profiles are not tied to a user.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Pets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Pets::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Pets::Class).string_len(100).not_null())
                    .col(ColumnDef::new(Pets::Breed).string_len(100).not_null())
                    .col(ColumnDef::new(Pets::Age).integer().not_null())
                    .col(ColumnDef::new(Pets::Color).string_len(100).not_null())
                    .col(ColumnDef::new(Pets::Weight).double().not_null())
                    .col(ColumnDef::new(Pets::Birthday).date().not_null())
                    .col(ColumnDef::new(Pets::EyeColor).string_len(100).not_null())
                    .col(ColumnDef::new(Pets::Bio).text().not_null())
                    .col(ColumnDef::new(Pets::Location).string_len(255).not_null())
                    .col(ColumnDef::new(Pets::ImageLocator).string().not_null())
                    .col(
                        ColumnDef::new(Pets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Pets {
    Table,
    Id,
    Name,
    Class,
    Breed,
    Age,
    Color,
    Weight,
    Birthday,
    EyeColor,
    Bio,
    Location,
    ImageLocator,
    CreatedAt,
}
