use crate::dto::{
    AuthClaims, ClaimReceipt, LedgerEntryDetails, ResponseData, WalletBalance, WithdrawReceipt,
    WithdrawRequestData, RESPONSE_INTERNAL_ERROR, RESPONSE_NOT_FOUND, RESPONSE_OK,
};
use crate::pool::{Db, EarnConfig};
use crate::wallet_service::{self, WalletError};
use earn_db_entity::db::earn_user::Entity as User;
use earn_db_entity::db::wallet_ledger::{Column as LedgerColumn, Entity as Ledger};
use rocket::{serde::json::Json, State};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use sea_orm_rocket::Connection;
use tracing::warn;

/// Maps a wallet rule violation onto the response envelope.
pub fn failure<T>(error: &WalletError) -> Json<ResponseData<T>> {
    if let WalletError::Db(db_error) = error {
        warn!("Wallet operation failed: {}", db_error);
    }
    Json(ResponseData::new(
        error.response_code(),
        error.to_string(),
        None,
    ))
}

#[get("/wallet/balance", format = "application/json")]
pub async fn get_balance(
    conn: Connection<'_, Db>,
    claims: AuthClaims,
) -> Json<ResponseData<WalletBalance>> {
    let db = conn.into_inner();
    match User::find_by_id(claims.user_id.to_owned()).one(db).await {
        Ok(Some(user)) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(WalletBalance {
                wallet: user.wallet,
            }),
        )),
        Ok(None) => Json(ResponseData::new(
            RESPONSE_NOT_FOUND,
            "Not found".to_owned(),
            None,
        )),
        Err(error) => {
            warn!("Balance lookup failed: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "System error. Please contact administrator!".to_owned(),
                None,
            ))
        }
    }
}

#[get("/wallet/transactions", format = "application/json")]
pub async fn get_transactions(
    conn: Connection<'_, Db>,
    claims: AuthClaims,
) -> Json<ResponseData<Vec<LedgerEntryDetails>>> {
    let db = conn.into_inner();
    match Ledger::find()
        .filter(LedgerColumn::UserId.eq(claims.user_id.to_owned()))
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
            warn!("Ledger listing failed: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "System error. Please contact administrator!".to_owned(),
                None,
            ))
        }
    }
}

#[post("/wallet/withdraw", format = "application/json", data = "<withdraw_request>")]
pub async fn withdraw(
    conn: Connection<'_, Db>,
    earn_config: &State<EarnConfig>,
    claims: AuthClaims,
    withdraw_request: Json<WithdrawRequestData>,
) -> Json<ResponseData<WithdrawReceipt>> {
    let db = conn.into_inner();
    match wallet_service::request_withdraw(
        db,
        &claims.user_id,
        withdraw_request.amount,
        earn_config.min_withdraw_amount,
    )
    .await
    {
        Ok(outcome) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(WithdrawReceipt {
                wallet: outcome.wallet,
                fee: outcome.fee,
                net: outcome.net,
            }),
        )),
        Err(error) => failure(&error),
    }
}

#[post("/wallet/claim")]
pub async fn claim(
    conn: Connection<'_, Db>,
    claims: AuthClaims,
) -> Json<ResponseData<ClaimReceipt>> {
    let db = conn.into_inner();
    match wallet_service::daily_claim(db, &claims.user_id).await {
        Ok(outcome) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(ClaimReceipt {
                wallet: outcome.wallet,
                amount: outcome.amount,
            }),
        )),
        Err(error) => failure(&error),
    }
}

#[post("/wallet/bonus")]
pub async fn claim_bonus(
    conn: Connection<'_, Db>,
    earn_config: &State<EarnConfig>,
    claims: AuthClaims,
) -> Json<ResponseData<ClaimReceipt>> {
    let db = conn.into_inner();
    match wallet_service::claim_registration_bonus(
        db,
        &claims.user_id,
        earn_config.registration_bonus_amount,
    )
    .await
    {
        Ok(outcome) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(ClaimReceipt {
                wallet: outcome.wallet,
                amount: outcome.amount,
            }),
        )),
        Err(error) => failure(&error),
    }
}
