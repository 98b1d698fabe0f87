use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "earn_user", schema_name = "public")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub wallet: Decimal,
    pub invite_code: String,
    pub referred_by: Option<String>,
    pub payout_name: Option<String>,
    pub payout_method: Option<String>,
    pub payout_account: Option<String>,
    pub current_package_id: Option<String>,
    pub package_activated_at: Option<i64>,
    pub package_expires_at: Option<i64>,
    pub last_claimed_at: Option<i64>,
    pub signup_ip: Option<String>,
    pub is_active: bool,
    pub registration_bonus_pending: bool,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
