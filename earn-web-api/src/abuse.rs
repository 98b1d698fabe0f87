use chrono::Utc;
use earn_db_entity::db::{blocked_ip, deposit_request, earn_user, whitelisted_ip};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
};
use tracing::info;

pub const REASON_MULTIPLE_SIGNUPS: &str = "multiple_signups";
pub const REASON_DUPLICATE_DEPOSIT: &str = "duplicate_deposit";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GateDecision {
    Allow,
    Block,
}

/// Empty IPs are unverifiable and pass through; whitelisting beats any
/// prior hit.
pub fn decide(ip: &str, whitelisted: bool, prior_hit: bool) -> GateDecision {
    if ip.is_empty() || whitelisted {
        GateDecision::Allow
    } else if prior_hit {
        GateDecision::Block
    } else {
        GateDecision::Allow
    }
}

pub async fn is_whitelisted<C: ConnectionTrait>(db: &C, ip: &str) -> Result<bool, DbErr> {
    Ok(whitelisted_ip::Entity::find_by_id(ip.to_owned())
        .one(db)
        .await?
        .is_some())
}

pub async fn is_blocked<C: ConnectionTrait>(db: &C, ip: &str) -> Result<bool, DbErr> {
    Ok(blocked_ip::Entity::find_by_id(ip.to_owned())
        .one(db)
        .await?
        .is_some())
}

/// Signup honeypot: a second account from an already-seen IP blocks the IP.
pub async fn screen_signup<C: ConnectionTrait>(db: &C, ip: &str) -> Result<GateDecision, DbErr> {
    if ip.is_empty() {
        return Ok(GateDecision::Allow);
    }
    let whitelisted = is_whitelisted(db, ip).await?;
    let prior_hit = earn_user::Entity::find()
        .filter(earn_user::Column::SignupIp.eq(ip))
        .one(db)
        .await?
        .is_some();
    let decision = decide(ip, whitelisted, prior_hit);
    if decision == GateDecision::Block {
        block_ip(db, ip, REASON_MULTIPLE_SIGNUPS).await?;
    } else if whitelisted && prior_hit {
        info!("Signup attempt from whitelisted IP, allowing: {}", ip);
    }
    Ok(decision)
}

/// Deposit honeypot: a deposit from an IP already used by a different
/// account blocks the IP.
pub async fn screen_deposit<C: ConnectionTrait>(
    db: &C,
    ip: &str,
    user_id: &str,
) -> Result<GateDecision, DbErr> {
    if ip.is_empty() {
        return Ok(GateDecision::Allow);
    }
    let whitelisted = is_whitelisted(db, ip).await?;
    let prior_hit = deposit_request::Entity::find()
        .filter(deposit_request::Column::SubmitIp.eq(ip))
        .filter(deposit_request::Column::UserId.ne(user_id))
        .one(db)
        .await?
        .is_some();
    let decision = decide(ip, whitelisted, prior_hit);
    if decision == GateDecision::Block {
        block_ip(db, ip, REASON_DUPLICATE_DEPOSIT).await?;
    } else if whitelisted && prior_hit {
        info!("Deposit submit IP is whitelisted, skipping block: {}", ip);
    }
    Ok(decision)
}

pub async fn block_ip<C: ConnectionTrait>(db: &C, ip: &str, reason: &str) -> Result<(), DbErr> {
    match blocked_ip::Entity::find_by_id(ip.to_owned()).one(db).await? {
        Some(existing) => {
            let mut entry: blocked_ip::ActiveModel = existing.into();
            entry.reason = ActiveValue::Set(reason.to_owned());
            entry.blocked_at = ActiveValue::Set(Utc::now().timestamp());
            entry.update(db).await?;
        }
        None => {
            let entry = blocked_ip::ActiveModel {
                ip: ActiveValue::Set(ip.to_owned()),
                reason: ActiveValue::Set(reason.to_owned()),
                blocked_at: ActiveValue::Set(Utc::now().timestamp()),
            };
            blocked_ip::Entity::insert(entry).exec(db).await?;
        }
    }
    Ok(())
}

pub async fn whitelist_ip<C: ConnectionTrait>(
    db: &C,
    ip: &str,
    note: Option<String>,
) -> Result<(), DbErr> {
    match whitelisted_ip::Entity::find_by_id(ip.to_owned())
        .one(db)
        .await?
    {
        Some(existing) => {
            let mut entry: whitelisted_ip::ActiveModel = existing.into();
            entry.note = ActiveValue::Set(note);
            entry.added_at = ActiveValue::Set(Utc::now().timestamp());
            entry.update(db).await?;
        }
        None => {
            let entry = whitelisted_ip::ActiveModel {
                ip: ActiveValue::Set(ip.to_owned()),
                note: ActiveValue::Set(note),
                added_at: ActiveValue::Set(Utc::now().timestamp()),
            };
            whitelisted_ip::Entity::insert(entry).exec(db).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ip_always_passes() {
        assert_eq!(decide("", false, true), GateDecision::Allow);
        assert_eq!(decide("", true, true), GateDecision::Allow);
    }

    #[test]
    fn whitelist_suppresses_blocking() {
        assert_eq!(decide("10.0.0.1", true, true), GateDecision::Allow);
    }

    #[test]
    fn prior_hit_blocks_unlisted_ip() {
        assert_eq!(decide("10.0.0.1", false, true), GateDecision::Block);
    }

    #[test]
    fn fresh_ip_is_allowed() {
        assert_eq!(decide("10.0.0.1", false, false), GateDecision::Allow);
    }
}
