use rocket::fairing::AdHoc;

pub mod admin;
pub mod auth;
pub mod deposit;
pub mod package;
pub mod wallet;

pub fn mount() -> AdHoc {
    AdHoc::on_ignite("Attaching Routes", |rocket| async {
        rocket.mount(
            "/",
            routes![
                admin::approve_deposit,
                admin::approve_withdraw,
                admin::block_ip,
                admin::complete_withdraw,
                admin::get_blocked,
                admin::get_deposits,
                admin::get_transactions,
                admin::get_users,
                admin::get_whitelist,
                admin::get_withdraws,
                admin::reconcile_user,
                admin::reject_deposit,
                admin::reject_withdraw,
                admin::remove_whitelist,
                admin::sent_withdraw,
                admin::unblock_ip,
                admin::upsert_package,
                admin::whitelist_ip,
                auth::change_password,
                auth::login,
                auth::me,
                auth::signup,
                auth::update_profile,
                deposit::create,
                deposit::get_own,
                package::get_catalog,
                wallet::claim,
                wallet::claim_bonus,
                wallet::get_balance,
                wallet::get_transactions,
                wallet::withdraw
            ],
        )
    })
}
