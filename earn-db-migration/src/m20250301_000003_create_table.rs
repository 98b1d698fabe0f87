use earn_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000003_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(wallet_ledger::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(wallet_ledger::Column::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(wallet_ledger::Column::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(wallet_ledger::Column::Kind)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(wallet_ledger::Column::Amount)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(wallet_ledger::Column::Status)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(wallet_ledger::Column::Fee).decimal())
                    .col(ColumnDef::new(wallet_ledger::Column::Net).decimal())
                    .col(ColumnDef::new(wallet_ledger::Column::PayoutName).string())
                    .col(ColumnDef::new(wallet_ledger::Column::PayoutMethod).string())
                    .col(ColumnDef::new(wallet_ledger::Column::PayoutAccount).string())
                    .col(ColumnDef::new(wallet_ledger::Column::PackageId).string())
                    .col(ColumnDef::new(wallet_ledger::Column::DepositId).string())
                    .col(
                        ColumnDef::new(wallet_ledger::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(wallet_ledger::Entity).to_owned())
            .await
    }
}
