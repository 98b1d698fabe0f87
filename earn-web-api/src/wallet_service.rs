use crate::dto::{DepositStatus, LedgerKind, ReconciliationReport, WithdrawStatus};
use crate::fin_cal;
use crate::sql_stmt::{DB_BACKEND, WITHDRAWS_TODAY_COUNT};
use chrono::{Local, Timelike, Utc};
use earn_db_entity::db::{deposit_request, earn_package, earn_user, wallet_ledger};
use sea_orm::prelude::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, Statement, TransactionError, TransactionTrait,
};
use thiserror::Error;
use uuid::Uuid;

/// Wallet/ledger rule violations. Every variant leaves the store untouched;
/// messages go into the response envelope as-is.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Account not active. Withdrawals not allowed.")]
    AccountNotActive,
    #[error("Please add withdrawal account details in your profile before requesting a withdrawal.")]
    PayoutDetailsMissing,
    #[error("Minimum withdraw is {0}")]
    BelowMinimum(u64),
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Only one withdrawal allowed per day")]
    DailyWithdrawLimit,
    #[error("Withdrawals are allowed between 12:00 PM and 12:00 AM only")]
    OutsideWithdrawWindow,
    #[error("Invalid amount")]
    InvalidAmount,
    #[error("No active package")]
    NoPackage,
    #[error("Package not found")]
    PackageMissing,
    #[error("Package expired")]
    PackageExpired,
    #[error("No daily reward for this package")]
    NoDailyReward,
    #[error("Already claimed today")]
    AlreadyClaimedToday,
    #[error("Registration bonus already claimed")]
    BonusAlreadyClaimed,
    #[error("Not found")]
    NotFound,
    #[error("Not a withdraw")]
    NotAWithdraw,
    #[error("Already processed")]
    AlreadyDecided,
    #[error("Cannot move withdrawal from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

impl WalletError {
    pub fn response_code(&self) -> u16 {
        match self {
            WalletError::AccountNotActive => crate::dto::RESPONSE_FORBIDDEN,
            WalletError::NotFound => crate::dto::RESPONSE_NOT_FOUND,
            WalletError::Db(_) => crate::dto::RESPONSE_INTERNAL_ERROR,
            _ => crate::dto::RESPONSE_BAD_REQUEST,
        }
    }
}

pub struct WithdrawOutcome {
    pub wallet: Decimal,
    pub fee: Decimal,
    pub net: Decimal,
}

pub struct ClaimOutcome {
    pub wallet: Decimal,
    pub amount: Decimal,
}

fn flatten(error: TransactionError<WalletError>) -> WalletError {
    match error {
        TransactionError::Connection(error) => WalletError::Db(error),
        TransactionError::Transaction(error) => error,
    }
}

fn ledger_row(
    user_id: &str,
    kind: LedgerKind,
    amount: Decimal,
    status: &str,
) -> wallet_ledger::ActiveModel {
    wallet_ledger::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        user_id: ActiveValue::Set(user_id.to_owned()),
        kind: ActiveValue::Set(kind.to_string()),
        amount: ActiveValue::Set(amount),
        status: ActiveValue::Set(status.to_owned()),
        created_at: ActiveValue::Set(Utc::now().timestamp()),
        ..Default::default()
    }
}

/// Debits the full amount up front and records a pending withdraw entry
/// carrying fee, net and a payout snapshot. The debit reserves funds; the
/// reject transition is the only compensation path.
pub async fn request_withdraw(
    db: &DatabaseConnection,
    user_id: &str,
    amount: Decimal,
    min_withdraw: u64,
) -> Result<WithdrawOutcome, WalletError> {
    let amount = fin_cal::round2(amount);
    if amount <= Decimal::ZERO {
        return Err(WalletError::InvalidAmount);
    }
    let user_id = user_id.to_owned();
    db.transaction::<_, WithdrawOutcome, WalletError>(move |txn| {
        Box::pin(async move {
            let user = earn_user::Entity::find_by_id(user_id.to_owned())
                .one(txn)
                .await?
                .ok_or(WalletError::NotFound)?;
            if !user.is_active {
                return Err(WalletError::AccountNotActive);
            }
            if user.payout_name.is_none()
                || user.payout_method.is_none()
                || user.payout_account.is_none()
            {
                return Err(WalletError::PayoutDetailsMissing);
            }
            if amount < Decimal::from(min_withdraw) {
                return Err(WalletError::BelowMinimum(min_withdraw));
            }
            if user.wallet < amount {
                return Err(WalletError::InsufficientBalance);
            }

            let now = Local::now();
            let (day_start, day_end) = fin_cal::local_day_bounds(now);
            let today_withdraws = txn
                .query_one(Statement::from_sql_and_values(
                    DB_BACKEND,
                    WITHDRAWS_TODAY_COUNT,
                    vec![
                        user.id.to_owned().into(),
                        LedgerKind::Withdraw.to_string().into(),
                        day_start.into(),
                        day_end.into(),
                    ],
                ))
                .await?
                .map(|row| row.try_get::<i64>("", "total_records").unwrap_or(0))
                .unwrap_or(0);
            if today_withdraws > 0 {
                return Err(WalletError::DailyWithdrawLimit);
            }
            if !fin_cal::within_withdraw_window(now.hour()) {
                return Err(WalletError::OutsideWithdrawWindow);
            }

            let (fee, net) = fin_cal::withdraw_fee(amount);
            let wallet = user.wallet - amount;
            let payout_name = user.payout_name.to_owned();
            let payout_method = user.payout_method.to_owned();
            let payout_account = user.payout_account.to_owned();

            let mut account: earn_user::ActiveModel = user.into();
            account.wallet = ActiveValue::Set(wallet);
            account.update(txn).await?;

            let mut entry = ledger_row(
                &user_id,
                LedgerKind::Withdraw,
                amount,
                &WithdrawStatus::Pending.to_string(),
            );
            entry.fee = ActiveValue::Set(Some(fee));
            entry.net = ActiveValue::Set(Some(net));
            entry.payout_name = ActiveValue::Set(payout_name);
            entry.payout_method = ActiveValue::Set(payout_method);
            entry.payout_account = ActiveValue::Set(payout_account);
            wallet_ledger::Entity::insert(entry).exec(txn).await?;

            Ok(WithdrawOutcome { wallet, fee, net })
        })
    })
    .await
    .map_err(flatten)
}

/// Admin-driven status write. Rejection additionally credits back the
/// original pre-fee amount; no other transition touches the wallet.
pub async fn transition_withdraw(
    db: &DatabaseConnection,
    entry_id: &str,
    target: WithdrawStatus,
) -> Result<(), WalletError> {
    let entry_id = entry_id.to_owned();
    db.transaction::<_, (), WalletError>(move |txn| {
        Box::pin(async move {
            let entry = wallet_ledger::Entity::find_by_id(entry_id)
                .one(txn)
                .await?
                .ok_or(WalletError::NotFound)?;
            if entry.kind != LedgerKind::Withdraw.to_string() {
                return Err(WalletError::NotAWithdraw);
            }
            let current =
                WithdrawStatus::parse(&entry.status).ok_or_else(|| WalletError::InvalidTransition {
                    from: entry.status.to_owned(),
                    to: target.to_string(),
                })?;
            if !current.can_become(target) {
                return Err(WalletError::InvalidTransition {
                    from: current.to_string(),
                    to: target.to_string(),
                });
            }

            if target == WithdrawStatus::Rejected {
                let user = earn_user::Entity::find_by_id(entry.user_id.to_owned())
                    .one(txn)
                    .await?
                    .ok_or(WalletError::NotFound)?;
                let wallet = user.wallet + entry.amount;
                let mut account: earn_user::ActiveModel = user.into();
                account.wallet = ActiveValue::Set(wallet);
                account.update(txn).await?;
            }

            let mut row: wallet_ledger::ActiveModel = entry.into();
            row.status = ActiveValue::Set(target.to_string());
            row.update(txn).await?;
            Ok(())
        })
    })
    .await
    .map_err(flatten)
}

/// Credits the claimed amount, activates the account, appends the deposit
/// ledger entry, and assigns the selected package when one is named and
/// purchasable. Valid only from pending.
pub async fn approve_deposit(db: &DatabaseConnection, deposit_id: &str) -> Result<(), WalletError> {
    let deposit_id = deposit_id.to_owned();
    db.transaction::<_, (), WalletError>(move |txn| {
        Box::pin(async move {
            let deposit = deposit_request::Entity::find_by_id(deposit_id)
                .one(txn)
                .await?
                .ok_or(WalletError::NotFound)?;
            if deposit.status != DepositStatus::Pending.to_string() {
                return Err(WalletError::AlreadyDecided);
            }
            let user = earn_user::Entity::find_by_id(deposit.user_id.to_owned())
                .one(txn)
                .await?
                .ok_or(WalletError::NotFound)?;

            let mut assignment = None;
            if let Some(package_id) = deposit.package_id.to_owned() {
                if let Some(package) = earn_package::Entity::find_by_id(package_id)
                    .one(txn)
                    .await?
                {
                    if !package.locked {
                        let now = Utc::now().timestamp();
                        let expires = now + i64::from(package.duration_days) * 86_400;
                        assignment = Some((package.id, now, expires));
                    }
                }
            }

            let wallet = user.wallet + deposit.amount;
            let mut account: earn_user::ActiveModel = user.into();
            account.wallet = ActiveValue::Set(wallet);
            account.is_active = ActiveValue::Set(true);
            if let Some((package_id, activated_at, expires_at)) = assignment {
                account.current_package_id = ActiveValue::Set(Some(package_id));
                account.package_activated_at = ActiveValue::Set(Some(activated_at));
                account.package_expires_at = ActiveValue::Set(Some(expires_at));
            }
            account.update(txn).await?;

            let mut entry = ledger_row(
                &deposit.user_id,
                LedgerKind::Deposit,
                deposit.amount,
                &WithdrawStatus::Completed.to_string(),
            );
            entry.deposit_id = ActiveValue::Set(Some(deposit.id.to_owned()));
            wallet_ledger::Entity::insert(entry).exec(txn).await?;

            let mut row: deposit_request::ActiveModel = deposit.into();
            row.status = ActiveValue::Set(DepositStatus::Approved.to_string());
            row.update(txn).await?;
            Ok(())
        })
    })
    .await
    .map_err(flatten)
}

/// Status change only; the claimed funds were never credited.
pub async fn reject_deposit(db: &DatabaseConnection, deposit_id: &str) -> Result<(), WalletError> {
    let deposit_id = deposit_id.to_owned();
    db.transaction::<_, (), WalletError>(move |txn| {
        Box::pin(async move {
            let deposit = deposit_request::Entity::find_by_id(deposit_id)
                .one(txn)
                .await?
                .ok_or(WalletError::NotFound)?;
            if deposit.status != DepositStatus::Pending.to_string() {
                return Err(WalletError::AlreadyDecided);
            }
            let mut row: deposit_request::ActiveModel = deposit.into();
            row.status = ActiveValue::Set(DepositStatus::Rejected.to_string());
            row.update(txn).await?;
            Ok(())
        })
    })
    .await
    .map_err(flatten)
}

/// One claim per UTC calendar date against the assigned, unexpired package.
pub async fn daily_claim(db: &DatabaseConnection, user_id: &str) -> Result<ClaimOutcome, WalletError> {
    let user_id = user_id.to_owned();
    db.transaction::<_, ClaimOutcome, WalletError>(move |txn| {
        Box::pin(async move {
            let user = earn_user::Entity::find_by_id(user_id)
                .one(txn)
                .await?
                .ok_or(WalletError::NotFound)?;
            let package_id = user
                .current_package_id
                .to_owned()
                .ok_or(WalletError::NoPackage)?;
            let package = earn_package::Entity::find_by_id(package_id)
                .one(txn)
                .await?
                .ok_or(WalletError::PackageMissing)?;

            let now = Utc::now().timestamp();
            if let Some(last) = user.last_claimed_at {
                if fin_cal::same_utc_day(last, now) {
                    return Err(WalletError::AlreadyClaimedToday);
                }
            }
            if let Some(expires_at) = user.package_expires_at {
                if expires_at < now {
                    return Err(WalletError::PackageExpired);
                }
            }
            let amount = package.daily_reward;
            if amount <= Decimal::ZERO {
                return Err(WalletError::NoDailyReward);
            }

            let wallet = user.wallet + amount;
            let owner = user.id.to_owned();
            let mut account: earn_user::ActiveModel = user.into();
            account.wallet = ActiveValue::Set(wallet);
            account.last_claimed_at = ActiveValue::Set(Some(now));
            account.update(txn).await?;

            let mut entry = ledger_row(
                &owner,
                LedgerKind::Daily,
                amount,
                &WithdrawStatus::Completed.to_string(),
            );
            entry.package_id = ActiveValue::Set(Some(package.id));
            wallet_ledger::Entity::insert(entry).exec(txn).await?;

            Ok(ClaimOutcome { wallet, amount })
        })
    })
    .await
    .map_err(flatten)
}

/// One-shot signup bonus, armed at account creation.
pub async fn claim_registration_bonus(
    db: &DatabaseConnection,
    user_id: &str,
    bonus_amount: u64,
) -> Result<ClaimOutcome, WalletError> {
    let user_id = user_id.to_owned();
    db.transaction::<_, ClaimOutcome, WalletError>(move |txn| {
        Box::pin(async move {
            let user = earn_user::Entity::find_by_id(user_id)
                .one(txn)
                .await?
                .ok_or(WalletError::NotFound)?;
            if !user.registration_bonus_pending {
                return Err(WalletError::BonusAlreadyClaimed);
            }
            let amount = Decimal::from(bonus_amount);
            let wallet = user.wallet + amount;
            let owner = user.id.to_owned();
            let mut account: earn_user::ActiveModel = user.into();
            account.wallet = ActiveValue::Set(wallet);
            account.registration_bonus_pending = ActiveValue::Set(false);
            account.update(txn).await?;

            let entry = ledger_row(
                &owner,
                LedgerKind::RegistrationBonus,
                amount,
                &WithdrawStatus::Completed.to_string(),
            );
            wallet_ledger::Entity::insert(entry).exec(txn).await?;

            Ok(ClaimOutcome { wallet, amount })
        })
    })
    .await
    .map_err(flatten)
}

/// Replays a wallet from its ledger: credits for deposit/daily/bonus kinds,
/// debits for withdraws that were not rejected (a rejected withdraw nets to
/// zero because the debit was credited back).
pub fn replay_balance(entries: &[wallet_ledger::Model]) -> Decimal {
    let withdraw = LedgerKind::Withdraw.to_string();
    let rejected = WithdrawStatus::Rejected.to_string();
    entries.iter().fold(Decimal::ZERO, |balance, entry| {
        if entry.kind == withdraw {
            if entry.status == rejected {
                balance
            } else {
                balance - entry.amount
            }
        } else {
            balance + entry.amount
        }
    })
}

pub async fn reconcile(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<ReconciliationReport, WalletError> {
    let user = earn_user::Entity::find_by_id(user_id.to_owned())
        .one(db)
        .await?
        .ok_or(WalletError::NotFound)?;
    let entries = wallet_ledger::Entity::find()
        .filter(wallet_ledger::Column::UserId.eq(user_id))
        .all(db)
        .await?;
    let replayed = replay_balance(&entries);
    Ok(ReconciliationReport {
        user_id: user.id,
        stored: user.wallet,
        replayed,
        consistent: replayed == user.wallet,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: LedgerKind, amount: i64, status: &str) -> wallet_ledger::Model {
        wallet_ledger::Model {
            id: format!("{}-{}", kind, amount),
            user_id: "u1".to_owned(),
            kind: kind.to_string(),
            amount: Decimal::from(amount),
            status: status.to_owned(),
            fee: None,
            net: None,
            payout_name: None,
            payout_method: None,
            payout_account: None,
            package_id: None,
            deposit_id: None,
            created_at: 0,
        }
    }

    #[test]
    fn replay_credits_and_debits() {
        let entries = vec![
            entry(LedgerKind::Deposit, 500, "completed"),
            entry(LedgerKind::RegistrationBonus, 100, "completed"),
            entry(LedgerKind::Daily, 130, "completed"),
            entry(LedgerKind::Withdraw, 200, "pending"),
        ];
        assert_eq!(replay_balance(&entries), Decimal::from(530));
    }

    #[test]
    fn rejected_withdraw_nets_to_zero() {
        let entries = vec![
            entry(LedgerKind::Deposit, 1000, "completed"),
            entry(LedgerKind::Withdraw, 400, "rejected"),
        ];
        assert_eq!(replay_balance(&entries), Decimal::from(1000));
    }

    #[test]
    fn completed_withdraw_stays_debited() {
        let entries = vec![
            entry(LedgerKind::Deposit, 1000, "completed"),
            entry(LedgerKind::Withdraw, 400, "completed"),
        ];
        assert_eq!(replay_balance(&entries), Decimal::from(600));
    }

    #[test]
    fn empty_ledger_replays_to_zero() {
        assert_eq!(replay_balance(&[]), Decimal::ZERO);
    }

    #[test]
    fn error_codes_follow_taxonomy() {
        assert_eq!(WalletError::AccountNotActive.response_code(), 403);
        assert_eq!(WalletError::NotFound.response_code(), 404);
        assert_eq!(WalletError::InsufficientBalance.response_code(), 400);
        assert_eq!(WalletError::DailyWithdrawLimit.response_code(), 400);
    }
}
