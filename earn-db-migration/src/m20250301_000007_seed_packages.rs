use earn_db_entity::db::earn_package;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{
    prelude::Decimal, ActiveValue, ColumnTrait, EntityTrait, QueryFilter,
};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000007_seed_packages"
    }
}

const TIERS: [(&str, &str, i64, i32, i64, bool); 9] = [
    ("p700", "Starter", 700, 90, 130, false),
    ("p1600", "Bronze", 1600, 90, 280, false),
    ("p2000", "Silver", 2000, 90, 350, false),
    ("p4000", "Gold", 4000, 90, 720, false),
    ("p8000", "Platinum", 8000, 90, 1450, false),
    ("p12000", "Diamond", 12000, 90, 2200, false),
    ("p20000", "Elite", 20000, 90, 0, true),
    ("p40000", "Pro", 40000, 90, 0, true),
    ("p80000", "Ultra", 80000, 90, 0, true),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let tiers = TIERS
            .iter()
            .map(
                |(id, name, price, duration_days, daily_reward, locked)| earn_package::ActiveModel {
                    id: ActiveValue::Set((*id).to_owned()),
                    name: ActiveValue::Set((*name).to_owned()),
                    price: ActiveValue::Set(Decimal::from(*price)),
                    duration_days: ActiveValue::Set(*duration_days),
                    daily_reward: ActiveValue::Set(Decimal::from(*daily_reward)),
                    locked: ActiveValue::Set(*locked),
                },
            )
            .collect::<Vec<_>>();
        earn_package::Entity::insert_many(tiers).exec(db).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let ids = TIERS.iter().map(|(id, ..)| *id).collect::<Vec<_>>();
        earn_package::Entity::delete_many()
            .filter(earn_package::Column::Id.is_in(ids))
            .exec(db)
            .await?;
        Ok(())
    }
}
