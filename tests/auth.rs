use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use dotenv::dotenv;
use serde_json::json;
use sqlx::PgPool;
use tasknest::auth::{AuthMiddleware, AuthResponse, TokenService};
use tasknest::routes::{self, health};

fn token_service() -> web::Data<TokenService> {
    let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set for tests");
    web::Data::new(TokenService::new(&secret))
}

async fn test_pool() -> PgPool {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB")
}

async fn cleanup_user(pool: &PgPool, email: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}

macro_rules! test_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(token_service())
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(Logger::default())
                .service(health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware)
                        .configure(routes::config),
                ),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_register_login_me_logout_flow() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let email = "integration@example.com";
    cleanup_user(&pool, email).await;

    // Register a new user
    let register_payload = json!({
        "name": "integuser",
        "email": email,
        "password": "Password123!"
    });
    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(&register_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body_bytes = test::read_body(resp).await;
    assert_eq!(
        status,
        actix_web::http::StatusCode::CREATED,
        "Registration failed. Body: {:?}",
        String::from_utf8_lossy(&body_bytes)
    );
    let registered: AuthResponse =
        serde_json::from_slice(&body_bytes).expect("Failed to parse registration response");
    assert_eq!(registered.user.name, "integuser");
    assert_eq!(registered.user.email, email);
    assert!(!registered.token.is_empty());

    // The registration token must resolve back to the new user
    let req_me = test::TestRequest::get()
        .uri("/api/users/me")
        .append_header(("Authorization", format!("Bearer {}", registered.token)))
        .to_request();
    let resp_me = test::call_service(&app, req_me).await;
    assert_eq!(resp_me.status(), actix_web::http::StatusCode::OK);
    let me: tasknest::models::User = test::read_body_json(resp_me).await;
    assert_eq!(me.id, registered.user.id);

    // Duplicate registration fails with 400
    let req_conflict = test::TestRequest::post()
        .uri("/api/users")
        .set_json(&register_payload)
        .to_request();
    let resp_conflict = test::call_service(&app, req_conflict).await;
    assert_eq!(
        resp_conflict.status(),
        actix_web::http::StatusCode::BAD_REQUEST,
        "Duplicate registration did not fail as expected"
    );

    // The stored hash before any further activity
    let (hash_before,): (String,) =
        sqlx::query_as("SELECT password_hash FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&pool)
            .await
            .unwrap();

    // Login with the registered user
    let req_login = test::TestRequest::post()
        .uri("/api/users/login")
        .set_json(&json!({ "email": email, "password": "Password123!" }))
        .to_request();
    let resp_login = test::call_service(&app, req_login).await;
    assert_eq!(resp_login.status(), actix_web::http::StatusCode::OK);
    let logged_in: AuthResponse = test::read_body_json(resp_login).await;
    assert_eq!(logged_in.user.id, registered.user.id);

    // Login and profile reads never re-hash: the stored hash is
    // byte-identical afterwards
    let (hash_after,): (String,) =
        sqlx::query_as("SELECT password_hash FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(hash_before, hash_after);

    // Logout endpoints acknowledge; tokens are stateless so the token keeps
    // working until it expires or the client discards it
    for uri in ["/api/users/logout", "/api/users/logoutAll"] {
        let req = test::TestRequest::post()
            .uri(uri)
            .append_header(("Authorization", format!("Bearer {}", logged_in.token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK, "{}", uri);
    }
    let req_me_again = test::TestRequest::get()
        .uri("/api/users/me")
        .append_header(("Authorization", format!("Bearer {}", logged_in.token)))
        .to_request();
    let resp_me_again = test::call_service(&app, req_me_again).await;
    assert_eq!(resp_me_again.status(), actix_web::http::StatusCode::OK);

    cleanup_user(&pool, email).await;
}

#[actix_rt::test]
async fn test_invalid_registration_inputs() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let test_cases = vec![
        // Deserialization errors for missing fields
        (
            json!({ "email": "test@example.com", "password": "Password123!" }),
            "missing name",
        ),
        (
            json!({ "name": "testuser", "password": "Password123!" }),
            "missing email",
        ),
        (
            json!({ "name": "testuser", "email": "test@example.com" }),
            "missing password",
        ),
        // Validation errors
        (
            json!({ "name": "testuser", "email": "invalid-email", "password": "Password123!" }),
            "invalid email format",
        ),
        (
            json!({ "name": "abc", "email": "test@example.com", "password": "Password123!" }),
            "name too short",
        ),
        (
            json!({ "name": "abcdefghijkl", "email": "test@example.com", "password": "Password123!" }),
            "name too long",
        ),
        (
            json!({ "name": "user name!", "email": "test@example.com", "password": "Password123!" }),
            "name with invalid chars",
        ),
        (
            json!({ "name": "testuser", "email": "test@example.com", "password": "Pw1!" }),
            "password too short",
        ),
        (
            json!({ "name": "testuser", "email": "test@example.com", "password": "password123!" }),
            "password without uppercase",
        ),
        (
            json!({ "name": "testuser", "email": "test@example.com", "password": "PASSWORD123!" }),
            "password without lowercase",
        ),
        (
            json!({ "name": "testuser", "email": "test@example.com", "password": "Password!!!!" }),
            "password without digit",
        ),
        (
            json!({ "name": "testuser", "email": "test@example.com", "password": "Password1234" }),
            "password without symbol",
        ),
    ];

    for (payload, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/api/users")
            .set_json(&payload)
            .to_request();

        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body_bytes = test::read_body(resp).await;

        assert_eq!(
            status,
            actix_web::http::StatusCode::BAD_REQUEST,
            "Test case failed: {}. Got {}. Body: {:?}",
            description,
            status,
            String::from_utf8_lossy(&body_bytes)
        );
    }
}

#[actix_rt::test]
async fn test_invalid_login_inputs() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let valid_user_email = "login_test@example.com";
    let valid_user_password = "Password123!";
    cleanup_user(&pool, valid_user_email).await;

    // Register the user for the cases that need an existing account
    let reg_req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(&json!({
            "name": "loginuser",
            "email": valid_user_email,
            "password": valid_user_password
        }))
        .to_request();
    let reg_resp = test::call_service(&app, reg_req).await;
    assert!(
        reg_resp.status().is_success(),
        "Setup: Failed to register test user"
    );

    let test_cases = vec![
        (
            json!({ "password": "Password123!" }),
            actix_web::http::StatusCode::BAD_REQUEST,
            "missing email",
        ),
        (
            json!({ "email": valid_user_email }),
            actix_web::http::StatusCode::BAD_REQUEST,
            "missing password",
        ),
        (
            json!({ "email": "invalid-email", "password": "Password123!" }),
            actix_web::http::StatusCode::BAD_REQUEST,
            "invalid email format",
        ),
        (
            json!({ "email": valid_user_email, "password": "123" }),
            actix_web::http::StatusCode::BAD_REQUEST,
            "password too short",
        ),
        (
            json!({ "email": valid_user_email, "password": "WrongPassword123!" }),
            actix_web::http::StatusCode::UNAUTHORIZED,
            "incorrect password",
        ),
        (
            json!({ "email": "nonexistent@example.com", "password": "Password123!" }),
            actix_web::http::StatusCode::UNAUTHORIZED,
            "non-existent user",
        ),
    ];

    for (payload, expected_status, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/api/users/login")
            .set_json(&payload)
            .to_request();

        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body_bytes = test::read_body(resp).await;

        assert_eq!(
            status,
            expected_status,
            "Test case failed: {}. Expected {}, got {}. Body: {:?}",
            description,
            expected_status,
            status,
            String::from_utf8_lossy(&body_bytes)
        );
    }

    cleanup_user(&pool, valid_user_email).await;
}

#[actix_rt::test]
async fn test_rejected_tokens() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    // No Authorization header
    let req = test::TestRequest::get().uri("/api/users/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

    // Wrong scheme
    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .append_header(("Authorization", "Token abcdef"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

    // Garbage bearer token
    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .append_header(("Authorization", "Bearer not.a.jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

    // Expired token signed with the real secret
    let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set for tests");
    let expired_claims = tasknest::auth::Claims {
        sub: 1,
        exp: (chrono::Utc::now() - chrono::Duration::hours(1)).timestamp() as usize,
    };
    let expired_token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &expired_claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap();
    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .append_header(("Authorization", format!("Bearer {}", expired_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

    // Token signed with a different secret
    let foreign = TokenService::new("some-other-secret").issue(1).unwrap();
    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .append_header(("Authorization", format!("Bearer {}", foreign)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_token_for_deleted_user_is_rejected() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let email = "ghost_user@example.com";
    cleanup_user(&pool, email).await;

    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(&json!({
            "name": "ghostuser",
            "email": email,
            "password": "Password123!"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let registered: AuthResponse = test::read_body_json(resp).await;

    // The account disappears while the token is still live
    cleanup_user(&pool, email).await;

    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .append_header(("Authorization", format!("Bearer {}", registered.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::UNAUTHORIZED,
        "A valid token whose user is gone must be rejected like a bad token"
    );
}
