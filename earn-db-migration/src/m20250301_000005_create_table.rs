use earn_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000005_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(blocked_ip::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(blocked_ip::Column::Ip)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(blocked_ip::Column::Reason)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(blocked_ip::Column::BlockedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(blocked_ip::Entity).to_owned())
            .await
    }
}
