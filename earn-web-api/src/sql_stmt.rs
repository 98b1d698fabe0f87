use sea_orm::DbBackend;

pub const DB_BACKEND: DbBackend = DbBackend::Postgres;

pub const WITHDRAWS_TODAY_COUNT: &str = r#"SELECT COUNT(*) AS total_records
    FROM wallet_ledger
    WHERE user_id = $1 AND kind = $2
    AND created_at >= $3 AND created_at < $4"#;

pub const ADMIN_LEDGER: &str = r#"SELECT wallet_ledger.id,
    wallet_ledger.user_id,
    earn_user.email,
    wallet_ledger.kind,
    wallet_ledger.amount,
    wallet_ledger.status,
    wallet_ledger.fee,
    wallet_ledger.net,
    wallet_ledger.package_id,
    wallet_ledger.deposit_id,
    wallet_ledger.created_at
    FROM wallet_ledger
    JOIN earn_user ON earn_user.id = wallet_ledger.user_id
    ORDER BY wallet_ledger.created_at DESC OFFSET $1 ROWS LIMIT $2"#;

pub const ADMIN_LEDGER_COUNT: &str = r#"SELECT COUNT(*) AS total_records
    FROM wallet_ledger"#;
