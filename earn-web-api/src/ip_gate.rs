use crate::abuse;
use crate::dto::{client_ip_of, ROLE_ADMIN};
use crate::pool::{Db, EarnConfig};
use rocket::{
    fairing::{Fairing, Info, Kind},
    http::{uri::Origin, Method},
    Data, Request, State,
};
use sea_orm_rocket::Database;
use tracing::{info, warn};

/// Inbound gate: requests from blocked, non-whitelisted IPs are rewritten to
/// the access_blocked route before routing. Admin credentials bypass the
/// gate so an operator can still manage the block lists.
pub struct IpGate;

#[rocket::async_trait]
impl Fairing for IpGate {
    fn info(&self) -> Info {
        Info {
            name: "IP Gate",
            kind: Kind::Request,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        let config = request
            .guard::<&State<EarnConfig>>()
            .await
            .unwrap();
        if !config.enable_ip_gate {
            return;
        }
        let url = request.uri().to_string();
        if url.eq("/") || url.eq("/access_blocked") {
            return;
        }
        let ip = client_ip_of(request);
        if ip.is_empty() {
            return;
        }
        let db = match Db::fetch(request.rocket()) {
            Some(db) => &db.conn,
            None => return,
        };
        match abuse::is_whitelisted(db, &ip).await {
            Ok(true) => return,
            Ok(false) => {}
            Err(error) => {
                warn!("Whitelist lookup failed for {}: {}", ip, error);
                return;
            }
        }
        match abuse::is_blocked(db, &ip).await {
            Ok(true) => {}
            Ok(false) => return,
            Err(error) => {
                warn!("Blocklist lookup failed for {}: {}", ip, error);
                return;
            }
        }
        if let Some(secret) = request.headers().get_one("x-admin-secret") {
            if secret == config.admin_secret {
                return;
            }
        }
        if let Some(header) = request.headers().get_one("Authorization") {
            let token = header.strip_prefix("Bearer ").unwrap_or(header);
            if let Some(claims) = crate::routes::auth::decode_claims(&config.jwt_key, token) {
                if claims.role == ROLE_ADMIN {
                    return;
                }
            }
        }
        info!("Blocked request from {}", ip);
        let uri = Origin::parse("/access_blocked").unwrap();
        request.set_uri(uri);
        request.set_method(Method::Get);
    }
}
