use sea_orm::entity::prelude::*;

/// Whitelist entries suppress blocking regardless of blocked_ip presence.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "whitelisted_ip", schema_name = "public")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub ip: String,
    pub note: Option<String>,
    pub added_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
