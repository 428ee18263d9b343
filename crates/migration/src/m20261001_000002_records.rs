//! Record collections of the office dashboard.
//!
//! - `employees`: staff register, optional photo
//! - `incoming_letters` / `outgoing_letters`: correspondence, optional scan
//! - `archives`: archived documents, optional scan
//! - `transactions`: income and expense ledger
//!
//! Attachment columns hold the public URL of the stored object.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Employees {
    Table,
    Id,
    Name,
    BadgeNumber,
    JobTitle,
    WorkUnit,
    Contact,
    PhotoUrl,
    CreatedAt,
}

#[derive(Iden)]
enum IncomingLetters {
    Table,
    Id,
    LetterNumber,
    Sender,
    Date,
    Subject,
    FileUrl,
    CreatedAt,
}

#[derive(Iden)]
enum OutgoingLetters {
    Table,
    Id,
    LetterNumber,
    Recipient,
    Date,
    Subject,
    FileUrl,
    CreatedAt,
}

#[derive(Iden)]
enum Archives {
    Table,
    Id,
    Title,
    DocumentType,
    Date,
    Notes,
    FileUrl,
    CreatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    Date,
    Category,
    AmountMinor,
    Description,
    CreatedAt,
}

fn id(column: impl IntoIden) -> ColumnDef {
    ColumnDef::new(column).uuid().not_null().primary_key().to_owned()
}

fn text(column: impl IntoIden) -> ColumnDef {
    ColumnDef::new(column).string().not_null().to_owned()
}

fn created_at(column: impl IntoIden) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(id(Employees::Id))
                    .col(text(Employees::Name))
                    .col(text(Employees::BadgeNumber))
                    .col(text(Employees::JobTitle))
                    .col(text(Employees::WorkUnit))
                    .col(text(Employees::Contact))
                    .col(ColumnDef::new(Employees::PhotoUrl).string())
                    .col(created_at(Employees::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IncomingLetters::Table)
                    .if_not_exists()
                    .col(id(IncomingLetters::Id))
                    .col(text(IncomingLetters::LetterNumber))
                    .col(text(IncomingLetters::Sender))
                    .col(ColumnDef::new(IncomingLetters::Date).date().not_null())
                    .col(text(IncomingLetters::Subject))
                    .col(ColumnDef::new(IncomingLetters::FileUrl).string())
                    .col(created_at(IncomingLetters::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OutgoingLetters::Table)
                    .if_not_exists()
                    .col(id(OutgoingLetters::Id))
                    .col(text(OutgoingLetters::LetterNumber))
                    .col(text(OutgoingLetters::Recipient))
                    .col(ColumnDef::new(OutgoingLetters::Date).date().not_null())
                    .col(text(OutgoingLetters::Subject))
                    .col(ColumnDef::new(OutgoingLetters::FileUrl).string())
                    .col(created_at(OutgoingLetters::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Archives::Table)
                    .if_not_exists()
                    .col(id(Archives::Id))
                    .col(text(Archives::Title))
                    .col(text(Archives::DocumentType))
                    .col(ColumnDef::new(Archives::Date).date().not_null())
                    .col(text(Archives::Notes))
                    .col(ColumnDef::new(Archives::FileUrl).string())
                    .col(created_at(Archives::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(id(Transactions::Id))
                    .col(ColumnDef::new(Transactions::Date).date().not_null())
                    .col(text(Transactions::Category))
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(text(Transactions::Description))
                    .col(created_at(Transactions::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-date")
                    .table(Transactions::Table)
                    .col(Transactions::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-incoming_letters-created_at")
                    .table(IncomingLetters::Table)
                    .col(IncomingLetters::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Transactions::Table.into_iden(),
            Archives::Table.into_iden(),
            OutgoingLetters::Table.into_iden(),
            IncomingLetters::Table.into_iden(),
            Employees::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}
