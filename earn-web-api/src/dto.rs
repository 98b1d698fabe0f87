use crate::pool::EarnConfig;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use sea_orm::prelude::Decimal;
use sea_orm::QueryResult;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

use earn_db_entity::db::blocked_ip::Model as BlockedIpModel;
use earn_db_entity::db::deposit_request::Model as DepositModel;
use earn_db_entity::db::earn_package::Model as PackageModel;
use earn_db_entity::db::earn_user::Model as UserModel;
use earn_db_entity::db::wallet_ledger::Model as LedgerModel;
use earn_db_entity::db::whitelisted_ip::Model as WhitelistedIpModel;

pub const RESPONSE_OK: u16 = 200;
pub const RESPONSE_BAD_REQUEST: u16 = 400;
pub const RESPONSE_FORBIDDEN: u16 = 403;
pub const RESPONSE_NOT_FOUND: u16 = 404;
pub const RESPONSE_INTERNAL_ERROR: u16 = 500;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ResponseData<T> {
    pub code: Option<u16>,
    #[serde(rename = "statusCode")]
    pub status_code: Option<u16>,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ResponseData<T> {
    pub fn new(code: u16, message: String, data: Option<T>) -> ResponseData<T> {
        ResponseData {
            code: Some(code),
            status_code: None,
            message,
            data,
        }
    }
}

/// Wallet-affecting event kinds recorded in the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize, Display, EnumString)]
#[serde(crate = "rocket::serde")]
#[strum(serialize_all = "kebab-case")]
pub enum LedgerKind {
    #[serde(rename = "deposit")]
    Deposit,
    #[serde(rename = "withdraw")]
    Withdraw,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "registration-bonus")]
    RegistrationBonus,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize, Display, EnumString)]
#[serde(crate = "rocket::serde")]
#[strum(serialize_all = "snake_case")]
pub enum WithdrawStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "approved")]
    Approved,
    #[serde(rename = "sent")]
    Sent,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "rejected")]
    Rejected,
}

impl WithdrawStatus {
    /// pending -> approved -> sent -> completed, with rejected reachable
    /// from any non-terminal state. Rejection is the only refunding path.
    pub fn can_become(self, next: WithdrawStatus) -> bool {
        matches!(
            (self, next),
            (WithdrawStatus::Pending, WithdrawStatus::Approved)
                | (WithdrawStatus::Approved, WithdrawStatus::Sent)
                | (WithdrawStatus::Sent, WithdrawStatus::Completed)
                | (WithdrawStatus::Pending, WithdrawStatus::Rejected)
                | (WithdrawStatus::Approved, WithdrawStatus::Rejected)
                | (WithdrawStatus::Sent, WithdrawStatus::Rejected)
        )
    }

    pub fn parse(status: &str) -> Option<WithdrawStatus> {
        WithdrawStatus::from_str(status).ok()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, FromFormField, Deserialize, Serialize, Display, EnumString)]
#[serde(crate = "rocket::serde")]
#[strum(serialize_all = "snake_case")]
pub enum DepositStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "approved")]
    Approved,
    #[serde(rename = "rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub referral: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    #[serde(rename = "payoutName")]
    pub payout_name: Option<String>,
    #[serde(rename = "payoutMethod")]
    pub payout_method: Option<String>,
    #[serde(rename = "payoutAccount")]
    pub payout_account: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ChangePasswordRequest {
    #[serde(rename = "oldPassword")]
    pub old_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct WithdrawRequestData {
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DepositCreateRequest {
    #[serde(rename = "accountHolder")]
    pub account_holder: Option<String>,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    pub amount: Decimal,
    pub method: Option<String>,
    #[serde(rename = "packageId")]
    pub package_id: Option<String>,
    pub screenshot: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct BlockIpRequest {
    pub ip: String,
    pub reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct WhitelistIpRequest {
    pub ip: String,
    pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct PackageUpsertRequest {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(rename = "durationDays")]
    pub duration_days: i32,
    #[serde(rename = "dailyReward")]
    pub daily_reward: Decimal,
    pub locked: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct UserProfile {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub role: String,
    pub wallet: Decimal,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "inviteCode")]
    pub invite_code: String,
    #[serde(rename = "referredBy")]
    pub referred_by: Option<String>,
    #[serde(rename = "currentPackageId")]
    pub current_package_id: Option<String>,
    #[serde(rename = "packageExpiresAt")]
    pub package_expires_at: Option<i64>,
    #[serde(rename = "payoutName")]
    pub payout_name: Option<String>,
    #[serde(rename = "payoutMethod")]
    pub payout_method: Option<String>,
    #[serde(rename = "payoutAccount")]
    pub payout_account: Option<String>,
    #[serde(rename = "registrationBonusPending")]
    pub registration_bonus_pending: bool,
}

impl UserProfile {
    pub fn new(user: &UserModel) -> UserProfile {
        UserProfile {
            id: user.id.to_owned(),
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            role: user.role.to_owned(),
            wallet: user.wallet,
            is_active: user.is_active,
            invite_code: user.invite_code.to_owned(),
            referred_by: user.referred_by.to_owned(),
            current_package_id: user.current_package_id.to_owned(),
            package_expires_at: user.package_expires_at,
            payout_name: user.payout_name.to_owned(),
            payout_method: user.payout_method.to_owned(),
            payout_account: user.payout_account.to_owned(),
            registration_bonus_pending: user.registration_bonus_pending,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct AuthSession {
    pub user: UserProfile,
    pub token: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct WalletBalance {
    pub wallet: Decimal,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct WithdrawReceipt {
    pub wallet: Decimal,
    pub fee: Decimal,
    pub net: Decimal,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ClaimReceipt {
    pub wallet: Decimal,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct LedgerEntryDetails {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "userEmail")]
    pub user_email: Option<String>,
    pub kind: String,
    pub amount: Decimal,
    pub status: String,
    pub fee: Option<Decimal>,
    pub net: Option<Decimal>,
    #[serde(rename = "packageId")]
    pub package_id: Option<String>,
    #[serde(rename = "depositId")]
    pub deposit_id: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl LedgerEntryDetails {
    pub fn new(entry: &LedgerModel) -> LedgerEntryDetails {
        LedgerEntryDetails {
            id: entry.id.to_owned(),
            user_id: entry.user_id.to_owned(),
            user_email: None,
            kind: entry.kind.to_owned(),
            amount: entry.amount,
            status: entry.status.to_owned(),
            fee: entry.fee,
            net: entry.net,
            package_id: entry.package_id.to_owned(),
            deposit_id: entry.deposit_id.to_owned(),
            created_at: entry.created_at,
        }
    }

    pub fn from_query(row: &QueryResult) -> LedgerEntryDetails {
        LedgerEntryDetails {
            id: row.try_get("", "id").unwrap_or_default(),
            user_id: row.try_get("", "user_id").unwrap_or_default(),
            user_email: row.try_get("", "email").ok(),
            kind: row.try_get("", "kind").unwrap_or_default(),
            amount: row.try_get("", "amount").unwrap_or(Decimal::ZERO),
            status: row.try_get("", "status").unwrap_or_default(),
            fee: row.try_get("", "fee").ok(),
            net: row.try_get("", "net").ok(),
            package_id: row.try_get("", "package_id").ok(),
            deposit_id: row.try_get("", "deposit_id").ok(),
            created_at: row.try_get("", "created_at").unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct LedgerPage {
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
    pub entries: Vec<LedgerEntryDetails>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DepositDetails {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "accountHolder")]
    pub account_holder: Option<String>,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    pub amount: Decimal,
    pub method: Option<String>,
    #[serde(rename = "packageId")]
    pub package_id: Option<String>,
    pub screenshot: Option<String>,
    pub status: String,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl DepositDetails {
    pub fn new(deposit: &DepositModel) -> DepositDetails {
        DepositDetails {
            id: deposit.id.to_owned(),
            user_id: deposit.user_id.to_owned(),
            account_holder: deposit.account_holder.to_owned(),
            transaction_id: deposit.transaction_id.to_owned(),
            amount: deposit.amount,
            method: deposit.method.to_owned(),
            package_id: deposit.package_id.to_owned(),
            screenshot: deposit.screenshot.to_owned(),
            status: deposit.status.to_owned(),
            created_at: deposit.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct PackageDetails {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(rename = "durationDays")]
    pub duration_days: i32,
    #[serde(rename = "dailyReward")]
    pub daily_reward: Decimal,
    pub locked: bool,
}

impl PackageDetails {
    pub fn new(package: &PackageModel) -> PackageDetails {
        PackageDetails {
            id: package.id.to_owned(),
            name: package.name.to_owned(),
            price: package.price,
            duration_days: package.duration_days,
            daily_reward: package.daily_reward,
            locked: package.locked,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct BlockedIpDetails {
    pub ip: String,
    pub reason: String,
    #[serde(rename = "blockedAt")]
    pub blocked_at: i64,
}

impl BlockedIpDetails {
    pub fn new(entry: &BlockedIpModel) -> BlockedIpDetails {
        BlockedIpDetails {
            ip: entry.ip.to_owned(),
            reason: entry.reason.to_owned(),
            blocked_at: entry.blocked_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct WhitelistedIpDetails {
    pub ip: String,
    pub note: Option<String>,
    #[serde(rename = "addedAt")]
    pub added_at: i64,
}

impl WhitelistedIpDetails {
    pub fn new(entry: &WhitelistedIpModel) -> WhitelistedIpDetails {
        WhitelistedIpDetails {
            ip: entry.ip.to_owned(),
            note: entry.note.to_owned(),
            added_at: entry.added_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ReconciliationReport {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub stored: Decimal,
    pub replayed: Decimal,
    pub consistent: bool,
}

#[derive(Debug)]
pub enum AuthError {
    Missing,
    Invalid,
    Forbidden,
}

/// Claims decoded from a verified bearer token.
#[derive(Clone, Debug)]
pub struct AuthClaims {
    pub user_id: String,
    pub role: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthClaims {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = match req.guard::<&State<EarnConfig>>().await {
            Outcome::Success(config) => config,
            _ => return Outcome::Failure((Status::InternalServerError, AuthError::Missing)),
        };
        match req.headers().get_one("Authorization") {
            None => Outcome::Failure((Status::BadRequest, AuthError::Missing)),
            Some(header) => {
                let token = header.strip_prefix("Bearer ").unwrap_or(header);
                match crate::routes::auth::decode_claims(&config.jwt_key, token) {
                    Some(claims) => Outcome::Success(claims),
                    None => Outcome::Failure((Status::Unauthorized, AuthError::Invalid)),
                }
            }
        }
    }
}

/// Admin gate: a valid admin bearer token, or the shared operational secret
/// via the `x-admin-secret` header or `admin_secret` query parameter.
#[derive(Debug)]
pub struct AdminAccess;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminAccess {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = match req.guard::<&State<EarnConfig>>().await {
            Outcome::Success(config) => config,
            _ => return Outcome::Failure((Status::InternalServerError, AuthError::Missing)),
        };
        if let Some(secret) = req.headers().get_one("x-admin-secret") {
            if secret == config.admin_secret {
                return Outcome::Success(AdminAccess);
            }
        }
        if let Some(Ok(secret)) = req.query_value::<String>("admin_secret") {
            if secret == config.admin_secret {
                return Outcome::Success(AdminAccess);
            }
        }
        match AuthClaims::from_request(req).await {
            Outcome::Success(claims) if claims.role == ROLE_ADMIN => Outcome::Success(AdminAccess),
            _ => Outcome::Failure((Status::Forbidden, AuthError::Forbidden)),
        }
    }
}

/// Requester IP as reported by the proxy header or the socket. An empty
/// string means unresolvable, which every guard treats as pass-through.
#[derive(Clone, Debug)]
pub struct ClientIp(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientIp {
    type Error = std::convert::Infallible;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(ClientIp(client_ip_of(req)))
    }
}

pub fn client_ip_of(req: &Request<'_>) -> String {
    if let Some(forwarded) = req.headers().get_one("X-Forwarded-For") {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_owned();
            }
        }
    }
    match req.client_ip() {
        Some(ip) => ip.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_kind_wire_names() {
        assert_eq!(LedgerKind::Deposit.to_string(), "deposit");
        assert_eq!(LedgerKind::Withdraw.to_string(), "withdraw");
        assert_eq!(LedgerKind::Daily.to_string(), "daily");
        assert_eq!(LedgerKind::RegistrationBonus.to_string(), "registration-bonus");
    }

    #[test]
    fn withdraw_status_happy_path() {
        assert!(WithdrawStatus::Pending.can_become(WithdrawStatus::Approved));
        assert!(WithdrawStatus::Approved.can_become(WithdrawStatus::Sent));
        assert!(WithdrawStatus::Sent.can_become(WithdrawStatus::Completed));
    }

    #[test]
    fn withdraw_rejection_from_any_non_terminal_state() {
        assert!(WithdrawStatus::Pending.can_become(WithdrawStatus::Rejected));
        assert!(WithdrawStatus::Approved.can_become(WithdrawStatus::Rejected));
        assert!(WithdrawStatus::Sent.can_become(WithdrawStatus::Rejected));
        assert!(!WithdrawStatus::Rejected.can_become(WithdrawStatus::Rejected));
        assert!(!WithdrawStatus::Completed.can_become(WithdrawStatus::Rejected));
    }

    #[test]
    fn withdraw_no_skips_or_reversals() {
        assert!(!WithdrawStatus::Pending.can_become(WithdrawStatus::Sent));
        assert!(!WithdrawStatus::Pending.can_become(WithdrawStatus::Completed));
        assert!(!WithdrawStatus::Approved.can_become(WithdrawStatus::Pending));
        assert!(!WithdrawStatus::Completed.can_become(WithdrawStatus::Approved));
        assert!(!WithdrawStatus::Rejected.can_become(WithdrawStatus::Approved));
    }

    #[test]
    fn status_parsing_round_trips() {
        assert_eq!(WithdrawStatus::parse("pending"), Some(WithdrawStatus::Pending));
        assert_eq!(WithdrawStatus::parse("sent"), Some(WithdrawStatus::Sent));
        assert_eq!(WithdrawStatus::parse("bogus"), None);
        assert_eq!(DepositStatus::from_str("approved").ok(), Some(DepositStatus::Approved));
    }
}
