use crate::dto::{
    AuthClaims, AuthSession, ChangePasswordRequest, ClientIp, LoginRequest, ResponseData,
    SignupRequest, UpdateProfileRequest, UserProfile, RESPONSE_BAD_REQUEST, RESPONSE_FORBIDDEN,
    RESPONSE_INTERNAL_ERROR, RESPONSE_NOT_FOUND, RESPONSE_OK, ROLE_USER,
};
use crate::abuse::{self, GateDecision};
use crate::pool::{Db, EarnConfig};
use chrono::Days;
use earn_db_entity::db::earn_user::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as User, Model as UserModel,
};
use hmac::{Hmac, Mac};
use jwt::token::verified::VerifyWithKey;
use jwt::SignWithKey;
use rand::{distributions::Alphanumeric, Rng};
use rocket::{serde::json::Json, State};
use scrypt::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use scrypt::Scrypt;
use sea_orm::prelude::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter};
use sea_orm_rocket::Connection;
use sha2::Sha256;
use std::{collections::BTreeMap, str::FromStr};
use tracing::{info, warn};
use uuid::Uuid;

#[post("/auth/signup", format = "application/json", data = "<signup_request>")]
pub async fn signup(
    conn: Connection<'_, Db>,
    earn_config: &State<EarnConfig>,
    client_ip: ClientIp,
    signup_request: Json<SignupRequest>,
) -> Json<ResponseData<AuthSession>> {
    let db = conn.into_inner();
    let request = signup_request.into_inner();
    let email = request.email.trim().to_owned();
    if email.is_empty() || request.password.is_empty() {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "email & password required".to_owned(),
            None,
        ));
    }

    match User::find().filter(UserColumn::Email.eq(email.to_owned())).one(db).await {
        Ok(Some(_)) => {
            return Json(ResponseData::new(
                RESPONSE_BAD_REQUEST,
                "User exists".to_owned(),
                None,
            ))
        }
        Ok(None) => {}
        Err(error) => {
            warn!("Signup lookup failed: {}", error);
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "System error. Please contact administrator!".to_owned(),
                None,
            ));
        }
    }

    match abuse::screen_signup(db, &client_ip.0).await {
        Ok(GateDecision::Allow) => {}
        Ok(GateDecision::Block) => {
            return Json(ResponseData::new(
                RESPONSE_FORBIDDEN,
                "Signups from this IP are blocked".to_owned(),
                None,
            ))
        }
        Err(error) => {
            warn!("Signup screening failed: {}", error);
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "System error. Please contact administrator!".to_owned(),
                None,
            ));
        }
    }

    let password_hash = match hash_password(&request.password) {
        Ok(password_hash) => password_hash,
        Err(error) => {
            warn!("Password hashing failed: {}", error);
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "System error. Please contact administrator!".to_owned(),
                None,
            ));
        }
    };

    let referred_by = match resolve_referral(db, request.referral.as_deref()).await {
        Ok(referred_by) => referred_by,
        Err(error) => {
            warn!("Referral lookup failed: {}", error);
            None
        }
    };

    let signup_ip = if client_ip.0.is_empty() {
        None
    } else {
        Some(client_ip.0.to_owned())
    };
    let user = UserModel {
        id: Uuid::new_v4().to_string(),
        name: request.name,
        email,
        phone: request.phone,
        password_hash,
        role: ROLE_USER.to_owned(),
        wallet: Decimal::ZERO,
        invite_code: generate_invite_code(),
        referred_by,
        payout_name: None,
        payout_method: None,
        payout_account: None,
        current_package_id: None,
        package_activated_at: None,
        package_expires_at: None,
        last_claimed_at: None,
        signup_ip,
        is_active: false,
        registration_bonus_pending: true,
        created_at: chrono::Utc::now().timestamp(),
    };

    if let Err(error) = User::insert(active_from(&user)).exec(db).await {
        warn!("Could not insert user: {}", error);
        return Json(ResponseData::new(
            RESPONSE_INTERNAL_ERROR,
            "System error. Please contact administrator!".to_owned(),
            None,
        ));
    }
    info!("New signup: {}", user.id);

    match generate_token(&earn_config.jwt_key, &user.id, &user.role) {
        Ok(token) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(AuthSession {
                user: UserProfile::new(&user),
                token,
            }),
        )),
        Err(error) => Json(ResponseData::new(RESPONSE_INTERNAL_ERROR, error, None)),
    }
}

#[post("/auth/login", format = "application/json", data = "<login_request>")]
pub async fn login(
    conn: Connection<'_, Db>,
    earn_config: &State<EarnConfig>,
    login_request: Json<LoginRequest>,
) -> Json<ResponseData<AuthSession>> {
    let db = conn.into_inner();
    let user = match User::find()
        .filter(UserColumn::Email.eq(login_request.email.to_owned()))
        .one(db)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Json(ResponseData::new(
                RESPONSE_BAD_REQUEST,
                "Invalid credentials".to_owned(),
                None,
            ))
        }
        Err(error) => {
            warn!("Login lookup failed: {}", error);
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "System error. Please contact administrator!".to_owned(),
                None,
            ));
        }
    };
    if !verify_password(&login_request.password, &user.password_hash) {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Invalid credentials".to_owned(),
            None,
        ));
    }
    match generate_token(&earn_config.jwt_key, &user.id, &user.role) {
        Ok(token) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(AuthSession {
                user: UserProfile::new(&user),
                token,
            }),
        )),
        Err(error) => Json(ResponseData::new(RESPONSE_INTERNAL_ERROR, error, None)),
    }
}

#[get("/auth/me", format = "application/json")]
pub async fn me(
    conn: Connection<'_, Db>,
    claims: AuthClaims,
) -> Json<ResponseData<UserProfile>> {
    let db = conn.into_inner();
    match User::find_by_id(claims.user_id.to_owned()).one(db).await {
        Ok(Some(user)) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(UserProfile::new(&user)),
        )),
        Ok(None) => Json(ResponseData::new(
            RESPONSE_NOT_FOUND,
            "Not found".to_owned(),
            None,
        )),
        Err(error) => {
            warn!("Profile lookup failed: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "System error. Please contact administrator!".to_owned(),
                None,
            ))
        }
    }
}

#[put("/auth/me", format = "application/json", data = "<update_request>")]
pub async fn update_profile(
    conn: Connection<'_, Db>,
    claims: AuthClaims,
    update_request: Json<UpdateProfileRequest>,
) -> Json<ResponseData<UserProfile>> {
    let db = conn.into_inner();
    let user = match User::find_by_id(claims.user_id.to_owned()).one(db).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Json(ResponseData::new(
                RESPONSE_NOT_FOUND,
                "Not found".to_owned(),
                None,
            ))
        }
        Err(error) => {
            warn!("Profile lookup failed: {}", error);
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "System error. Please contact administrator!".to_owned(),
                None,
            ));
        }
    };

    let request = update_request.into_inner();
    let mut account: UserActiveModel = user.into();
    if let Some(name) = request.name {
        account.name = ActiveValue::Set(Some(name));
    }
    if let Some(payout_name) = request.payout_name {
        account.payout_name = ActiveValue::Set(Some(payout_name));
    }
    if let Some(payout_method) = request.payout_method {
        account.payout_method = ActiveValue::Set(Some(payout_method));
    }
    if let Some(payout_account) = request.payout_account {
        account.payout_account = ActiveValue::Set(Some(payout_account));
    }
    match account.update(db).await {
        Ok(user) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(UserProfile::new(&user)),
        )),
        Err(error) => {
            warn!("Profile update failed: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "System error. Please contact administrator!".to_owned(),
                None,
            ))
        }
    }
}

#[post(
    "/auth/change_password",
    format = "application/json",
    data = "<change_request>"
)]
pub async fn change_password(
    conn: Connection<'_, Db>,
    claims: AuthClaims,
    change_request: Json<ChangePasswordRequest>,
) -> Json<ResponseData<&'static str>> {
    let db = conn.into_inner();
    if change_request.old_password.is_empty() || change_request.new_password.is_empty() {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "oldPassword and newPassword required".to_owned(),
            None,
        ));
    }
    let user = match User::find_by_id(claims.user_id.to_owned()).one(db).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Json(ResponseData::new(
                RESPONSE_NOT_FOUND,
                "Not found".to_owned(),
                None,
            ))
        }
        Err(error) => {
            warn!("Password change lookup failed: {}", error);
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "System error. Please contact administrator!".to_owned(),
                None,
            ));
        }
    };
    if !verify_password(&change_request.old_password, &user.password_hash) {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Invalid current password".to_owned(),
            None,
        ));
    }
    let password_hash = match hash_password(&change_request.new_password) {
        Ok(password_hash) => password_hash,
        Err(error) => {
            warn!("Password hashing failed: {}", error);
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "System error. Please contact administrator!".to_owned(),
                None,
            ));
        }
    };
    let mut account: UserActiveModel = user.into();
    account.password_hash = ActiveValue::Set(password_hash);
    match account.update(db).await {
        Ok(_) => Json(ResponseData::new(RESPONSE_OK, "".to_owned(), Some("ok"))),
        Err(error) => {
            warn!("Password update failed: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "System error. Please contact administrator!".to_owned(),
                None,
            ))
        }
    }
}

async fn resolve_referral(
    db: &sea_orm::DatabaseConnection,
    referral: Option<&str>,
) -> Result<Option<String>, sea_orm::DbErr> {
    let code = match referral {
        Some(code) if !code.is_empty() => code,
        _ => return Ok(None),
    };
    Ok(User::find()
        .filter(UserColumn::InviteCode.eq(code))
        .one(db)
        .await?
        .map(|referrer| referrer.id))
}

fn active_from(user: &UserModel) -> UserActiveModel {
    UserActiveModel {
        id: ActiveValue::Set(user.id.to_owned()),
        name: ActiveValue::Set(user.name.to_owned()),
        email: ActiveValue::Set(user.email.to_owned()),
        phone: ActiveValue::Set(user.phone.to_owned()),
        password_hash: ActiveValue::Set(user.password_hash.to_owned()),
        role: ActiveValue::Set(user.role.to_owned()),
        wallet: ActiveValue::Set(user.wallet),
        invite_code: ActiveValue::Set(user.invite_code.to_owned()),
        referred_by: ActiveValue::Set(user.referred_by.to_owned()),
        payout_name: ActiveValue::Set(user.payout_name.to_owned()),
        payout_method: ActiveValue::Set(user.payout_method.to_owned()),
        payout_account: ActiveValue::Set(user.payout_account.to_owned()),
        current_package_id: ActiveValue::Set(user.current_package_id.to_owned()),
        package_activated_at: ActiveValue::Set(user.package_activated_at),
        package_expires_at: ActiveValue::Set(user.package_expires_at),
        last_claimed_at: ActiveValue::Set(user.last_claimed_at),
        signup_ip: ActiveValue::Set(user.signup_ip.to_owned()),
        is_active: ActiveValue::Set(user.is_active),
        registration_bonus_pending: ActiveValue::Set(user.registration_bonus_pending),
        created_at: ActiveValue::Set(user.created_at),
    }
}

fn generate_invite_code() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("INV{}", suffix.to_uppercase())
}

fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    match Scrypt.hash_password(password.as_bytes(), &salt) {
        Ok(hashed) => Ok(hashed.to_string()),
        Err(error) => Err(error.to_string()),
    }
}

fn verify_password(password: &str, stored: &str) -> bool {
    let parsed = match PasswordHash::new(stored) {
        Ok(parsed) => parsed,
        Err(error) => {
            warn!("Stored password hash is unreadable: {}", error);
            return false;
        }
    };
    Scrypt
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn generate_token(jwt_key: &str, user_id: &str, role: &str) -> Result<String, String> {
    let key: Hmac<Sha256> = match Hmac::new_from_slice(jwt_key.as_bytes()) {
        Ok(key) => key,
        Err(error) => {
            warn!("Invalid key: {}", error);
            return Err("Invalid key".to_string());
        }
    };
    let expiry = chrono::Local::now()
        .checked_add_days(Days::new(7))
        .unwrap()
        .to_string();

    let mut claims: BTreeMap<&str, &str> = BTreeMap::new();
    claims.insert("sub", user_id);
    claims.insert("role", role);
    claims.insert("expiry", &expiry);

    match claims.sign_with_key(&key) {
        Ok(token) => Ok(token),
        Err(error) => Err(error.to_string()),
    }
}

pub fn decode_claims(jwt_key: &str, token: &str) -> Option<AuthClaims> {
    let key: Hmac<Sha256> = match Hmac::new_from_slice(jwt_key.as_bytes()) {
        Ok(key) => key,
        Err(error) => {
            warn!("Faulty JWT key: {}", error);
            return None;
        }
    };
    let claims: BTreeMap<String, String> = match token.verify_with_key(&key) {
        Ok(claims) => claims,
        Err(error) => {
            info!("JWT verification error: {}", error);
            return None;
        }
    };
    let user_id = claims.get("sub")?.to_owned();
    let role = claims.get("role")?.to_owned();
    let expiry: chrono::DateTime<chrono::Local> =
        match chrono::DateTime::from_str(claims.get("expiry")?) {
            Ok(expiry) => expiry,
            Err(error) => {
                warn!("Bad expiry string: {}", error);
                return None;
            }
        };
    if chrono::Local::now().le(&expiry) {
        Some(AuthClaims { user_id, role })
    } else {
        info!("JWT token is expired");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_claims() {
        let token = generate_token("test-key", "u1", "user").unwrap();
        let claims = decode_claims("test-key", &token).unwrap();
        assert_eq!(claims.user_id, "u1");
        assert_eq!(claims.role, "user");
    }

    #[test]
    fn token_rejects_wrong_key() {
        let token = generate_token("test-key", "u1", "user").unwrap();
        assert!(decode_claims("other-key", &token).is_none());
    }

    #[test]
    fn invite_codes_have_prefix_and_length() {
        let code = generate_invite_code();
        assert!(code.starts_with("INV"));
        assert_eq!(code.len(), 9);
    }

    #[test]
    fn password_hash_verifies() {
        let hashed = hash_password("secret").unwrap();
        assert!(verify_password("secret", &hashed));
        assert!(!verify_password("wrong", &hashed));
    }
}
