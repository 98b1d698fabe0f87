use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, TimeZone, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Flat fee taken off every withdrawal, in percent.
const WITHDRAW_FEE_PERCENT: i64 = 20;
/// Withdrawals are processed between 12:00 and 24:00 server local time.
const WITHDRAW_OPEN_HOUR: u32 = 12;

/// Rounds to currency precision, half away from zero.
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Fee and net payout for a withdrawal of `amount`.
pub fn withdraw_fee(amount: Decimal) -> (Decimal, Decimal) {
    let fee = round2(amount * Decimal::new(WITHDRAW_FEE_PERCENT, 2));
    let net = round2(amount - fee);
    (fee, net)
}

/// One claim per UTC calendar date, compared by date components rather than
/// elapsed hours.
pub fn same_utc_day(a: i64, b: i64) -> bool {
    match (Utc.timestamp_opt(a, 0).single(), Utc.timestamp_opt(b, 0).single()) {
        (Some(x), Some(y)) => x.date_naive() == y.date_naive(),
        _ => false,
    }
}

/// Unix-second bounds [start, end) of the server-local calendar day holding
/// `now`. Used for the one-withdrawal-per-day count.
pub fn local_day_bounds(now: DateTime<Local>) -> (i64, i64) {
    let date = now.date_naive();
    (local_midnight(date), local_midnight(date + Duration::days(1)))
}

fn local_midnight(date: NaiveDate) -> i64 {
    let naive = date.and_hms_opt(0, 0, 0).unwrap();
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.timestamp(),
        LocalResult::None => Utc.from_utc_datetime(&naive).timestamp(),
    }
}

pub fn within_withdraw_window(hour: u32) -> bool {
    hour >= WITHDRAW_OPEN_HOUR
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn fee_for_1000_is_200() {
        let (fee, net) = withdraw_fee(Decimal::from(1000));
        assert_eq!(fee, Decimal::new(20000, 2));
        assert_eq!(net, Decimal::new(80000, 2));
    }

    #[test]
    fn fee_for_333_rounds_to_2_decimals() {
        let (fee, net) = withdraw_fee(Decimal::from(333));
        assert_eq!(fee, Decimal::new(6660, 2));
        assert_eq!(net, Decimal::new(26640, 2));
    }

    #[test]
    fn fee_rounds_half_away_from_zero() {
        // 0.125 * 20% = 0.025 -> 0.03, not banker's 0.02
        let (fee, _) = withdraw_fee(Decimal::new(125, 3));
        assert_eq!(fee, Decimal::new(3, 2));
    }

    #[test]
    fn fee_plus_net_equals_amount() {
        for amount in [200i64, 333, 1000, 12345] {
            let amount = Decimal::from(amount);
            let (fee, net) = withdraw_fee(amount);
            assert_eq!(fee + net, amount);
        }
    }

    #[test]
    fn same_utc_day_by_date_components() {
        // 1970-01-01T00:00:00Z and 1970-01-01T23:59:59Z
        assert!(same_utc_day(0, 86_399));
        // 23:59:59 vs 00:00:00 next day is under 24h apart but a new date
        assert!(!same_utc_day(86_399, 86_400));
    }

    #[test]
    fn local_day_bounds_contain_now() {
        let now = Local::now();
        let (start, end) = local_day_bounds(now);
        assert!(start <= now.timestamp());
        assert!(now.timestamp() < end);
    }

    #[test]
    fn withdraw_window_opens_at_noon() {
        assert!(!within_withdraw_window(0));
        assert!(!within_withdraw_window(11));
        assert!(within_withdraw_window(12));
        assert!(within_withdraw_window(23));
    }

    #[test]
    fn window_check_accepts_chrono_hours() {
        let now = Local::now();
        let _ = within_withdraw_window(now.hour());
    }
}
