mod abuse;
mod cors;
mod datadog;
mod dto;
mod fin_cal;
mod ip_gate;
mod pool;
mod routes;
mod sql_stmt;
mod wallet_service;

use dto::{ResponseData, RESPONSE_BAD_REQUEST, RESPONSE_FORBIDDEN, RESPONSE_INTERNAL_ERROR};
use pool::Db;
use rocket::{serde::json::Json, Config, Request};
use sea_orm_rocket::Database;
use std::collections::HashSet;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

#[macro_use]
extern crate rocket;

#[get("/")]
async fn health_ping() -> &'static str {
    ""
}

/// Target of the IP gate rewrite; blocked callers get no detail beyond this.
#[get("/access_blocked")]
async fn access_blocked() -> Json<ResponseData<&'static str>> {
    Json(ResponseData::new(
        RESPONSE_FORBIDDEN,
        "Access blocked from this IP".to_owned(),
        None,
    ))
}

#[catch(404)]
async fn bad_request(req: &Request<'_>) -> Json<ResponseData<String>> {
    let message = format!("Couldn't find '{}'", req.uri());
    Json(ResponseData::new(RESPONSE_BAD_REQUEST, message, None))
}

#[catch(500)]
async fn internal_error() -> Json<ResponseData<String>> {
    Json(ResponseData::new(
        RESPONSE_INTERNAL_ERROR,
        "Whoops! Looks like we messed up.".to_owned(),
        None,
    ))
}

#[launch]
async fn rocket() -> _ {
    let earn_config = Config::figment().extract::<pool::EarnConfig>().unwrap();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", &earn_config.rust_log);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                format!("earn_web_api={}", &earn_config.web_api_log)
                    .parse()
                    .expect("Error parsing directive"),
            ),
        )
        .with_span_events(FmtSpan::FULL)
        .init();

    let allowed_domains: HashSet<String> = earn_config
        .cors_allowed_domains
        .split(',')
        .map(|s| s.to_owned())
        .collect();

    let datadog_client = datadog_apm::Client::new(datadog_apm::Config {
        env: Some("prod".to_owned()),
        service: "earn-web-api".to_owned(),
        host: earn_config.datadog_host.to_owned(),
        port: earn_config.datadog_port.to_owned(),
        ..Default::default()
    });

    rocket::build()
        .register("/", catchers![internal_error, bad_request])
        .attach(Db::init())
        .attach(datadog::RequestTrace)
        .attach(ip_gate::IpGate)
        .manage(earn_config)
        .manage(datadog_client)
        .attach(cors::OriginHeader { allowed_domains })
        .attach(routes::mount())
        .mount("/", routes![health_ping, access_blocked])
}
