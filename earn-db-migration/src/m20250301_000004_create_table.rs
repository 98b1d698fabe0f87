use earn_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000004_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(deposit_request::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(deposit_request::Column::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(deposit_request::Column::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(deposit_request::Column::AccountHolder).string())
                    .col(
                        ColumnDef::new(deposit_request::Column::TransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(deposit_request::Column::Amount)
                            .decimal()
                            .not_null(),
                    )
                    .col(ColumnDef::new(deposit_request::Column::Method).string())
                    .col(ColumnDef::new(deposit_request::Column::PackageId).string())
                    .col(ColumnDef::new(deposit_request::Column::Screenshot).string())
                    .col(
                        ColumnDef::new(deposit_request::Column::Status)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(deposit_request::Column::SubmitIp).string())
                    .col(
                        ColumnDef::new(deposit_request::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(deposit_request::Entity).to_owned())
            .await
    }
}
