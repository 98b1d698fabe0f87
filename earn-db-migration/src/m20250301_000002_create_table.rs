use earn_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000002_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(earn_package::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(earn_package::Column::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(earn_package::Column::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(earn_package::Column::Price)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(earn_package::Column::DurationDays)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(earn_package::Column::DailyReward)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(earn_package::Column::Locked)
                            .boolean()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(earn_package::Entity).to_owned())
            .await
    }
}
