use crate::abuse::{self, GateDecision};
use crate::dto::{
    AuthClaims, ClientIp, DepositCreateRequest, DepositDetails, DepositStatus, ResponseData,
    RESPONSE_BAD_REQUEST, RESPONSE_FORBIDDEN, RESPONSE_INTERNAL_ERROR, RESPONSE_OK,
};
use crate::pool::Db;
use earn_db_entity::db::deposit_request::{
    ActiveModel as DepositActiveModel, Column as DepositColumn, Entity as Deposit,
};
use rocket::serde::json::Json;
use sea_orm::prelude::Decimal;
use sea_orm::{ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use sea_orm_rocket::Connection;
use tracing::{info, warn};
use uuid::Uuid;

/// Claimed payment details go in pending; nothing is credited and the
/// account stays inactive until an admin decides.
#[post("/deposits", format = "application/json", data = "<deposit_request>")]
pub async fn create(
    conn: Connection<'_, Db>,
    claims: AuthClaims,
    client_ip: ClientIp,
    deposit_request: Json<DepositCreateRequest>,
) -> Json<ResponseData<DepositDetails>> {
    let db = conn.into_inner();

    match abuse::screen_deposit(db, &client_ip.0, &claims.user_id).await {
        Ok(GateDecision::Allow) => {}
        Ok(GateDecision::Block) => {
            return Json(ResponseData::new(
                RESPONSE_FORBIDDEN,
                "Deposit blocked from this IP".to_owned(),
                None,
            ))
        }
        Err(error) => {
            warn!("Deposit screening failed: {}", error);
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "System error. Please contact administrator!".to_owned(),
                None,
            ));
        }
    }

    let request = deposit_request.into_inner();
    if request.amount <= Decimal::ZERO || request.transaction_id.trim().is_empty() {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Missing required fields".to_owned(),
            None,
        ));
    }

    let submit_ip = if client_ip.0.is_empty() {
        None
    } else {
        Some(client_ip.0.to_owned())
    };
    let deposit = DepositActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        user_id: ActiveValue::Set(claims.user_id.to_owned()),
        account_holder: ActiveValue::Set(request.account_holder),
        transaction_id: ActiveValue::Set(request.transaction_id),
        amount: ActiveValue::Set(request.amount),
        method: ActiveValue::Set(request.method),
        package_id: ActiveValue::Set(request.package_id),
        screenshot: ActiveValue::Set(request.screenshot),
        status: ActiveValue::Set(DepositStatus::Pending.to_string()),
        submit_ip: ActiveValue::Set(submit_ip),
        created_at: ActiveValue::Set(chrono::Utc::now().timestamp()),
    };

    match Deposit::insert(deposit).exec_with_returning(db).await {
        Ok(created) => {
            info!("Deposit {} submitted by {}", created.id, claims.user_id);
            Json(ResponseData::new(
                RESPONSE_OK,
                "".to_owned(),
                Some(DepositDetails::new(&created)),
            ))
        }
        Err(error) => {
            warn!("Could not insert deposit: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "System error. Please contact administrator!".to_owned(),
                None,
            ))
        }
    }
}

#[get("/deposits", format = "application/json")]
pub async fn get_own(
    conn: Connection<'_, Db>,
    claims: AuthClaims,
) -> Json<ResponseData<Vec<DepositDetails>>> {
    let db = conn.into_inner();
    match Deposit::find()
        .filter(DepositColumn::UserId.eq(claims.user_id.to_owned()))
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
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "System error. Please contact administrator!".to_owned(),
                None,
            ))
        }
    }
}
