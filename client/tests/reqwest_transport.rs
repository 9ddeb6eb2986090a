//! End-to-end checks of the reqwest transport against a local backend.
//!
//! A small Actix application stands in for the portal backend so the tests
//! exercise real cookies, status codes and headers over loopback.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use portal_client::domain::{
    LoginCredentials, PortalApi, RequestGateway, StudentFilter, UserRole,
};
use portal_client::outbound::http::{ReqwestTransport, SessionCookies};
use reqwest::Url;
use serde_json::json;

const SESSION_COOKIE: &str = "JSESSIONID";
const SESSION_VALUE: &str = "loopback-session";

async fn login() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(
            Cookie::build(SESSION_COOKIE, SESSION_VALUE)
                .path("/")
                .http_only(true)
                .finish(),
        )
        .json(json!({"role": "ADMIN", "id": 3, "name": "Root"}))
}

async fn profile(request: HttpRequest) -> HttpResponse {
    match request.cookie(SESSION_COOKIE) {
        Some(cookie) if cookie.value() == SESSION_VALUE => {
            HttpResponse::Ok().json(json!({"data": {"name": "Root"}}))
        }
        _ => HttpResponse::Unauthorized().json(json!({"error": "Unauthorized"})),
    }
}

async fn update_profile() -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "message": "Validation failure",
        "data": {"phone": "must be 10 digits"}
    }))
}

async fn logout() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

async fn export() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((
            header::CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ))
        .insert_header((
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"students_2024.xlsx\"",
        ))
        .body(vec![0x50, 0x4b, 0x03, 0x04])
}

fn spawn_backend() -> SocketAddr {
    let server = HttpServer::new(|| {
        App::new()
            .route("/auth/login-user", web::post().to(login))
            .route("/auth/logout-user", web::post().to(logout))
            .route("/admin/profile", web::get().to(profile))
            .route("/admin/profile/update", web::patch().to(update_profile))
            .route(
                "/admin/students/filter/export/excel",
                web::get().to(export),
            )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind loopback");
    let addr = *server.addrs().first().expect("bound address");
    actix_web::rt::spawn(server.run());
    addr
}

fn api_for(addr: SocketAddr) -> (PortalApi<ReqwestTransport>, Arc<SessionCookies>) {
    let origin = Url::parse(&format!("http://{addr}")).expect("origin");
    let cookies = Arc::new(SessionCookies::in_memory());
    let transport =
        ReqwestTransport::new(origin, Arc::clone(&cookies), None).expect("build transport");
    (PortalApi::new(RequestGateway::new(transport, "")), cookies)
}

#[actix_web::test]
async fn session_cookie_round_trips_until_cleared() {
    let (api, cookies) = api_for(spawn_backend());

    let denied = api
        .get_profile(UserRole::Admin)
        .await
        .expect_err("no session yet");
    assert!(denied.is_unauthorized());

    let credentials =
        LoginCredentials::from_identifier("root@example.edu", "secret").expect("credentials");
    let user = api
        .login(&credentials)
        .await
        .expect("login")
        .expect("user payload");
    assert_eq!(user.as_json().and_then(|body| body.get("role")), Some(&json!("ADMIN")));
    assert!(!cookies.is_empty());

    let profile = api
        .get_profile(UserRole::Admin)
        .await
        .expect("cookie accepted")
        .expect("profile payload")
        .into_json();
    assert_eq!(profile, json!({"data": {"name": "Root"}}));

    cookies.clear();
    let after_clear = api
        .get_profile(UserRole::Admin)
        .await
        .expect_err("cookie forgotten");
    assert!(after_clear.is_unauthorized());
}

#[actix_web::test]
async fn no_content_yields_no_payload() {
    let (api, _cookies) = api_for(spawn_backend());
    assert_eq!(api.logout().await.expect("logout"), None);
}

#[actix_web::test]
async fn validation_failures_carry_field_errors() {
    let (api, _cookies) = api_for(spawn_backend());
    let err = api
        .update_profile(UserRole::Admin, &json!({"phone": "123"}))
        .await
        .expect_err("rejected");
    let api_error = err.api().expect("normalized");
    assert_eq!(api_error.status(), 400);
    assert_eq!(api_error.field_error("phone"), Some("must be 10 digits"));
}

#[actix_web::test]
async fn export_uses_the_server_filename() {
    let (api, _cookies) = api_for(spawn_backend());
    let filter = StudentFilter {
        keyword: Some("asha".to_owned()),
        ..StudentFilter::default()
    };
    let export = api.export_students(&filter).await.expect("export");
    assert_eq!(export.filename, "students_2024.xlsx");
    assert_eq!(export.bytes, vec![0x50, 0x4b, 0x03, 0x04]);
}
