use crate::dto::{PackageDetails, ResponseData, RESPONSE_INTERNAL_ERROR, RESPONSE_OK};
use crate::pool::Db;
use earn_db_entity::db::earn_package::{Column as PackageColumn, Entity as Package};
use rocket::serde::json::Json;
use sea_orm::{EntityTrait, QueryOrder};
use sea_orm_rocket::Connection;
use tracing::warn;

#[get("/packages", format = "application/json")]
pub async fn get_catalog(conn: Connection<'_, Db>) -> Json<ResponseData<Vec<PackageDetails>>> {
    let db = conn.into_inner();
    match Package::find()
        .order_by_asc(PackageColumn::Price)
        .all(db)
        .await
    {
        Ok(packages) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(packages.iter().map(PackageDetails::new).collect()),
        )),
        Err(error) => {
            warn!("Package listing failed: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "System error. Please contact administrator!".to_owned(),
                None,
            ))
        }
    }
}
