use datadog_apm::{ErrorInfo, HttpInfo, Span, Trace};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Data, Request, Response, State,
};
use std::{
    collections::HashMap,
    time::{Duration, SystemTime},
};
use tracing::warn;

/// Ships one APM trace per handled request, tagged with method, path and
/// response code.
pub struct RequestTrace;

#[derive(Clone)]
struct StartedAt(Option<SystemTime>);

#[rocket::async_trait]
impl Fairing for RequestTrace {
    fn info(&self) -> Info {
        Info {
            name: "Datadog trace",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        let earn_config = request
            .guard::<&State<crate::pool::EarnConfig>>()
            .await
            .unwrap();
        if !earn_config.enable_datadog || request.uri().to_string().eq("/") {
            return;
        }
        request.local_cache(|| StartedAt(Some(SystemTime::now())));
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let earn_config = request
            .guard::<&State<crate::pool::EarnConfig>>()
            .await
            .unwrap();
        if !earn_config.enable_datadog || request.uri().to_string().eq("/") {
            return;
        }
        let started_at = match request.local_cache(|| StartedAt(None)).0 {
            Some(started_at) => started_at,
            None => return,
        };
        let duration = match SystemTime::now().duration_since(started_at) {
            Ok(duration) => duration,
            Err(error) => {
                warn!("Failed calculating request duration: {}", error);
                Duration::from_millis(0)
            }
        };

        let datadog_client = request
            .guard::<&State<datadog_apm::Client>>()
            .await
            .unwrap()
            .inner()
            .clone();

        let method = request.method().as_str();
        let path = request.uri().path().as_str();
        let status_code = response.status().code;
        let error = match status_code {
            200 => None,
            500 => Some(trace_error("Internal error")),
            _ => Some(trace_error("Bad input error")),
        };

        let span = Span {
            id: 1,
            parent_id: None,
            name: "request".to_owned(),
            resource: method.to_owned() + " " + path,
            r#type: "web".to_owned(),
            start: started_at,
            duration,
            http: Some(HttpInfo {
                url: request.uri().to_string(),
                method: method.to_owned(),
                status_code: status_code.to_string(),
            }),
            error,
            sql: None,
            tags: HashMap::new(),
        };
        datadog_client.send_trace(Trace {
            id: 1,
            priority: 1,
            spans: vec![span],
        });
    }
}

fn trace_error(msg: &str) -> ErrorInfo {
    ErrorInfo {
        r#type: "unknown".to_owned(),
        msg: msg.to_owned(),
        stack: "".to_owned(),
    }
}
