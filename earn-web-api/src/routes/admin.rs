use crate::abuse;
use crate::dto::{
    AdminAccess, BlockIpRequest, BlockedIpDetails, DepositDetails, DepositStatus,
    LedgerEntryDetails, LedgerKind, LedgerPage, PackageDetails, PackageUpsertRequest,
    ReconciliationReport, ResponseData, UserProfile, WhitelistIpRequest, WhitelistedIpDetails,
    WithdrawStatus, RESPONSE_BAD_REQUEST, RESPONSE_INTERNAL_ERROR, RESPONSE_NOT_FOUND,
    RESPONSE_OK,
};
use crate::pool::Db;
use crate::routes::wallet::failure;
use crate::sql_stmt::{ADMIN_LEDGER, ADMIN_LEDGER_COUNT, DB_BACKEND};
use crate::wallet_service;
use earn_db_entity::db::blocked_ip::{Column as BlockedIpColumn, Entity as BlockedIp};
use earn_db_entity::db::deposit_request::{Column as DepositColumn, Entity as Deposit};
use earn_db_entity::db::earn_package::{
    ActiveModel as PackageActiveModel, Entity as Package,
};
use earn_db_entity::db::earn_user::{Column as UserColumn, Entity as User};
use earn_db_entity::db::wallet_ledger::{Column as LedgerColumn, Entity as Ledger};
use earn_db_entity::db::whitelisted_ip::{Column as WhitelistedIpColumn, Entity as WhitelistedIp};
use rocket::serde::json::Json;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Statement,
};
use sea_orm_rocket::Connection;
use tracing::{info, warn};

fn internal_error<T>() -> Json<ResponseData<T>> {
    Json(ResponseData::new(
        RESPONSE_INTERNAL_ERROR,
        "System error. Please contact administrator!".to_owned(),
        None,
    ))
}

#[get("/admin/deposits?<status>", format = "application/json")]
pub async fn get_deposits(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
    status: Option<DepositStatus>,
) -> Json<ResponseData<Vec<DepositDetails>>> {
    let db = conn.into_inner();
    let status = status.unwrap_or(DepositStatus::Pending);
    match Deposit::find()
        .filter(DepositColumn::Status.eq(status.to_string()))
        .order_by_desc(DepositColumn::CreatedAt)
        .all(db)
        .await
    {
        Ok(deposits) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(deposits.iter().map(DepositDetails::new).collect()),
        )),
        Err(error) => {
            warn!("Deposit listing failed: {}", error);
            internal_error()
        }
    }
}

#[post("/admin/deposits/<id>/approve")]
pub async fn approve_deposit(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
    id: String,
) -> Json<ResponseData<&'static str>> {
    let db = conn.into_inner();
    match wallet_service::approve_deposit(db, &id).await {
        Ok(()) => {
            info!("Deposit {} approved", id);
            Json(ResponseData::new(RESPONSE_OK, "".to_owned(), Some("ok")))
        }
        Err(error) => failure(&error),
    }
}

#[post("/admin/deposits/<id>/reject")]
pub async fn reject_deposit(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
    id: String,
) -> Json<ResponseData<&'static str>> {
    let db = conn.into_inner();
    match wallet_service::reject_deposit(db, &id).await {
        Ok(()) => {
            info!("Deposit {} rejected", id);
            Json(ResponseData::new(RESPONSE_OK, "".to_owned(), Some("ok")))
        }
        Err(error) => failure(&error),
    }
}

#[get("/admin/withdraws", format = "application/json")]
pub async fn get_withdraws(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
) -> Json<ResponseData<Vec<LedgerEntryDetails>>> {
    let db = conn.into_inner();
    match Ledger::find()
        .filter(LedgerColumn::Kind.eq(LedgerKind::Withdraw.to_string()))
        .order_by_desc(LedgerColumn::CreatedAt)
        .all(db)
        .await
    {
        Ok(entries) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(entries.iter().map(LedgerEntryDetails::new).collect()),
        )),
        Err(error) => {
            warn!("Withdraw listing failed: {}", error);
            internal_error()
        }
    }
}

#[post("/admin/withdraws/<id>/approve")]
pub async fn approve_withdraw(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
    id: String,
) -> Json<ResponseData<&'static str>> {
    transition(conn, id, WithdrawStatus::Approved).await
}

#[post("/admin/withdraws/<id>/sent")]
pub async fn sent_withdraw(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
    id: String,
) -> Json<ResponseData<&'static str>> {
    transition(conn, id, WithdrawStatus::Sent).await
}

#[post("/admin/withdraws/<id>/complete")]
pub async fn complete_withdraw(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
    id: String,
) -> Json<ResponseData<&'static str>> {
    transition(conn, id, WithdrawStatus::Completed).await
}

/// The only transition that credits funds back.
#[post("/admin/withdraws/<id>/reject")]
pub async fn reject_withdraw(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
    id: String,
) -> Json<ResponseData<&'static str>> {
    transition(conn, id, WithdrawStatus::Rejected).await
}

async fn transition(
    conn: Connection<'_, Db>,
    id: String,
    target: WithdrawStatus,
) -> Json<ResponseData<&'static str>> {
    let db = conn.into_inner();
    match wallet_service::transition_withdraw(db, &id, target).await {
        Ok(()) => {
            info!("Withdraw {} moved to {}", id, target);
            Json(ResponseData::new(RESPONSE_OK, "".to_owned(), Some("ok")))
        }
        Err(error) => failure(&error),
    }
}

#[get("/admin/blocked", format = "application/json")]
pub async fn get_blocked(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
) -> Json<ResponseData<Vec<BlockedIpDetails>>> {
    let db = conn.into_inner();
    match BlockedIp::find()
        .order_by_desc(BlockedIpColumn::BlockedAt)
        .all(db)
        .await
    {
        Ok(entries) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(entries.iter().map(BlockedIpDetails::new).collect()),
        )),
        Err(error) => {
            warn!("Blocklist listing failed: {}", error);
            internal_error()
        }
    }
}

#[post("/admin/blocked", format = "application/json", data = "<block_request>")]
pub async fn block_ip(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
    block_request: Json<BlockIpRequest>,
) -> Json<ResponseData<&'static str>> {
    let db = conn.into_inner();
    if block_request.ip.trim().is_empty() {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Missing ip".to_owned(),
            None,
        ));
    }
    let reason = block_request.reason.as_deref().unwrap_or("manual_block");
    match abuse::block_ip(db, block_request.ip.trim(), reason).await {
        Ok(()) => Json(ResponseData::new(RESPONSE_OK, "".to_owned(), Some("ok"))),
        Err(error) => {
            warn!("Could not block IP: {}", error);
            internal_error()
        }
    }
}

#[post("/admin/blocked/<ip>/unblock")]
pub async fn unblock_ip(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
    ip: String,
) -> Json<ResponseData<&'static str>> {
    let db = conn.into_inner();
    match BlockedIp::delete_by_id(ip).exec(db).await {
        Ok(result) if result.rows_affected > 0 => {
            Json(ResponseData::new(RESPONSE_OK, "".to_owned(), Some("ok")))
        }
        Ok(_) => Json(ResponseData::new(
            RESPONSE_NOT_FOUND,
            "Not found".to_owned(),
            None,
        )),
        Err(error) => {
            warn!("Could not unblock IP: {}", error);
            internal_error()
        }
    }
}

#[get("/admin/whitelist", format = "application/json")]
pub async fn get_whitelist(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
) -> Json<ResponseData<Vec<WhitelistedIpDetails>>> {
    let db = conn.into_inner();
    match WhitelistedIp::find()
        .order_by_desc(WhitelistedIpColumn::AddedAt)
        .all(db)
        .await
    {
        Ok(entries) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(entries.iter().map(WhitelistedIpDetails::new).collect()),
        )),
        Err(error) => {
            warn!("Whitelist listing failed: {}", error);
            internal_error()
        }
    }
}

#[post("/admin/whitelist", format = "application/json", data = "<whitelist_request>")]
pub async fn whitelist_ip(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
    whitelist_request: Json<WhitelistIpRequest>,
) -> Json<ResponseData<&'static str>> {
    let db = conn.into_inner();
    if whitelist_request.ip.trim().is_empty() {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Missing ip".to_owned(),
            None,
        ));
    }
    match abuse::whitelist_ip(
        db,
        whitelist_request.ip.trim(),
        whitelist_request.note.to_owned(),
    )
    .await
    {
        Ok(()) => Json(ResponseData::new(RESPONSE_OK, "".to_owned(), Some("ok"))),
        Err(error) => {
            warn!("Could not whitelist IP: {}", error);
            internal_error()
        }
    }
}

#[post("/admin/whitelist/<ip>/remove")]
pub async fn remove_whitelist(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
    ip: String,
) -> Json<ResponseData<&'static str>> {
    let db = conn.into_inner();
    match WhitelistedIp::delete_by_id(ip).exec(db).await {
        Ok(result) if result.rows_affected > 0 => {
            Json(ResponseData::new(RESPONSE_OK, "".to_owned(), Some("ok")))
        }
        Ok(_) => Json(ResponseData::new(
            RESPONSE_NOT_FOUND,
            "Not found".to_owned(),
            None,
        )),
        Err(error) => {
            warn!("Could not remove whitelist entry: {}", error);
            internal_error()
        }
    }
}

#[get("/admin/users", format = "application/json")]
pub async fn get_users(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
) -> Json<ResponseData<Vec<UserProfile>>> {
    let db = conn.into_inner();
    match User::find()
        .order_by_desc(UserColumn::CreatedAt)
        .all(db)
        .await
    {
        Ok(users) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(users.iter().map(UserProfile::new).collect()),
        )),
        Err(error) => {
            warn!("User listing failed: {}", error);
            internal_error()
        }
    }
}

#[get("/admin/transactions?<page>&<limit>", format = "application/json")]
pub async fn get_transactions(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
    page: Option<i64>,
    limit: Option<i64>,
) -> Json<ResponseData<LedgerPage>> {
    let db = conn.into_inner();
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(50).clamp(1, 100);
    let start = (page - 1) * limit;

    let total_records = match db
        .query_one(Statement::from_string(
            DB_BACKEND,
            ADMIN_LEDGER_COUNT.to_owned(),
        ))
        .await
    {
        Ok(Some(row)) => row.try_get::<i64>("", "total_records").unwrap_or(0),
        Ok(None) => 0,
        Err(error) => {
            warn!("Ledger count failed: {}", error);
            return internal_error();
        }
    };
    let if_remainder = if total_records % limit > 0 { 1 } else { 0 };
    let total_pages = (total_records / limit) + if_remainder;

    match db
        .query_all(Statement::from_sql_and_values(
            DB_BACKEND,
            ADMIN_LEDGER,
            vec![start.into(), limit.into()],
        ))
        .await
    {
        Ok(rows) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(LedgerPage {
                total_pages,
                entries: rows.iter().map(LedgerEntryDetails::from_query).collect(),
            }),
        )),
        Err(error) => {
            warn!("Ledger page failed: {}", error);
            internal_error()
        }
    }
}

/// Admin-curated catalog entry: update when the id exists, insert otherwise.
#[post("/admin/packages", format = "application/json", data = "<package_request>")]
pub async fn upsert_package(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
    package_request: Json<PackageUpsertRequest>,
) -> Json<ResponseData<PackageDetails>> {
    let db = conn.into_inner();
    let request = package_request.into_inner();
    if request.id.trim().is_empty() || request.name.trim().is_empty() {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Missing id or name".to_owned(),
            None,
        ));
    }
    let existing = match Package::find_by_id(request.id.to_owned()).one(db).await {
        Ok(existing) => existing,
        Err(error) => {
            warn!("Package lookup failed: {}", error);
            return internal_error();
        }
    };
    let result = match existing {
        Some(package) => {
            let mut row: PackageActiveModel = package.into();
            row.name = ActiveValue::Set(request.name);
            row.price = ActiveValue::Set(request.price);
            row.duration_days = ActiveValue::Set(request.duration_days);
            row.daily_reward = ActiveValue::Set(request.daily_reward);
            row.locked = ActiveValue::Set(request.locked);
            row.update(db).await
        }
        None => {
            let row = PackageActiveModel {
                id: ActiveValue::Set(request.id),
                name: ActiveValue::Set(request.name),
                price: ActiveValue::Set(request.price),
                duration_days: ActiveValue::Set(request.duration_days),
                daily_reward: ActiveValue::Set(request.daily_reward),
                locked: ActiveValue::Set(request.locked),
            };
            row.insert(db).await
        }
    };
    match result {
        Ok(package) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(PackageDetails::new(&package)),
        )),
        Err(error) => {
            warn!("Package upsert failed: {}", error);
            internal_error()
        }
    }
}

/// Replays the ledger from zero and compares with the stored balance.
#[get("/admin/users/<id>/reconcile", format = "application/json")]
pub async fn reconcile_user(
    conn: Connection<'_, Db>,
    _admin: AdminAccess,
    id: String,
) -> Json<ResponseData<ReconciliationReport>> {
    let db = conn.into_inner();
    match wallet_service::reconcile(db, &id).await {
        Ok(report) => Json(ResponseData::new(RESPONSE_OK, "".to_owned(), Some(report))),
        Err(error) => failure(&error),
    }
}
