use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use fitbot_bot::Bot;
use log::{debug, error, warn};

use crate::update::Update;

pub const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Shared secret Telegram echoes back on every webhook call.
#[derive(Clone, Debug)]
pub struct WebhookSecret(pub Option<String>);

impl WebhookSecret {
    fn accepts(&self, req: &HttpRequest) -> bool {
        let Some(expected) = &self.0 else {
            return true;
        };
        req.headers()
            .get(SECRET_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == expected)
    }
}

#[get("/healthz")]
async fn healthz() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("ok")
}

#[post("/telegram")]
async fn telegram(
    req: HttpRequest,
    body: web::Bytes,
    secret: web::Data<WebhookSecret>,
    bot: web::Data<Bot>,
) -> impl Responder {
    if !secret.accepts(&req) {
        warn!("Rejected webhook call with a wrong secret token");
        return HttpResponse::Unauthorized()
            .content_type("text/plain")
            .body("unauthorized");
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!("Malformed update: {}", e);
            return HttpResponse::BadRequest()
                .content_type("text/plain")
                .body("bad request");
        }
    };
    let Some(message) = update.into_incoming() else {
        debug!("Ignoring update without a message");
        return ok();
    };

    match bot.handle_message(message).await {
        Ok(()) => ok(),
        Err(e) => {
            error!("Failed to handle message: {:?}", e);
            HttpResponse::InternalServerError()
                .content_type("text/plain")
                .body("internal error")
        }
    }
}

fn ok() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body("ok")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(healthz).service(telegram);
}
