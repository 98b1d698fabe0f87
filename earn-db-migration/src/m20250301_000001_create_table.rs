use earn_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000001_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(earn_user::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(earn_user::Column::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(earn_user::Column::Name).string())
                    .col(
                        ColumnDef::new(earn_user::Column::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(earn_user::Column::Phone).string())
                    .col(
                        ColumnDef::new(earn_user::Column::PasswordHash)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(earn_user::Column::Role).string().not_null())
                    .col(
                        ColumnDef::new(earn_user::Column::Wallet)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(earn_user::Column::InviteCode)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(earn_user::Column::ReferredBy).string())
                    .col(ColumnDef::new(earn_user::Column::PayoutName).string())
                    .col(ColumnDef::new(earn_user::Column::PayoutMethod).string())
                    .col(ColumnDef::new(earn_user::Column::PayoutAccount).string())
                    .col(ColumnDef::new(earn_user::Column::CurrentPackageId).string())
                    .col(ColumnDef::new(earn_user::Column::PackageActivatedAt).big_integer())
                    .col(ColumnDef::new(earn_user::Column::PackageExpiresAt).big_integer())
                    .col(ColumnDef::new(earn_user::Column::LastClaimedAt).big_integer())
                    .col(ColumnDef::new(earn_user::Column::SignupIp).string())
                    .col(
                        ColumnDef::new(earn_user::Column::IsActive)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(earn_user::Column::RegistrationBonusPending)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(earn_user::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(earn_user::Entity).to_owned())
            .await
    }
}
