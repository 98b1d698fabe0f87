pub mod blocked_ip;
pub mod deposit_request;
pub mod earn_package;
pub mod earn_user;
pub mod wallet_ledger;
pub mod whitelisted_ip;
