use sea_orm::entity::prelude::*;

/// Append-only record of wallet-affecting events. Rows are immutable after
/// insert except for the status column of withdraw entries.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallet_ledger", schema_name = "public")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub amount: Decimal,
    pub status: String,
    pub fee: Option<Decimal>,
    pub net: Option<Decimal>,
    pub payout_name: Option<String>,
    pub payout_method: Option<String>,
    pub payout_account: Option<String>,
    pub package_id: Option<String>,
    pub deposit_id: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
