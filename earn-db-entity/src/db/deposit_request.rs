use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "deposit_request", schema_name = "public")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: String,
    pub user_id: String,
    pub account_holder: Option<String>,
    pub transaction_id: String,
    pub amount: Decimal,
    pub method: Option<String>,
    pub package_id: Option<String>,
    // opaque reference to an externally stored screenshot
    pub screenshot: Option<String>,
    pub status: String,
    pub submit_ip: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
