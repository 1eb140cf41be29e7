use crate::{
    auth::{hash_password, verify_password, AuthResponse, CurrentUser, LoginRequest,
        RegisterRequest, TokenService},
    error::AppError,
    repo,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Register a new user
///
/// Creates a user account and returns the profile together with a fresh
/// token. Duplicate emails and policy violations are 400s.
#[post("")]
pub async fn register(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    if repo::users::email_exists(&pool, &register_data.email).await? {
        return Err(AppError::BadRequest("User already exists".into()));
    }

    // The only point where a plaintext password becomes a hash
    let password_hash = hash_password(&register_data.password)?;
    let user = repo::users::create(&pool, &register_data.name, &register_data.email, &password_hash)
        .await?;

    let token = tokens.issue(user.id)?;

    Ok(HttpResponse::Created().json(AuthResponse { user, token }))
}

/// Login
///
/// Verifies the credentials and returns the profile with a fresh token.
/// Unknown email and wrong password produce the same 401.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = repo::users::find_by_email(&pool, &login_data.email).await?;

    match user {
        Some(user) if verify_password(&login_data.password, &user.password_hash) => {
            let token = tokens.issue(user.id)?;
            Ok(HttpResponse::Ok().json(AuthResponse {
                user: user.into_profile(),
                token,
            }))
        }
        _ => Err(AppError::Unauthorized("Invalid email or password".into())),
    }
}

/// Logout
///
/// Tokens are stateless JWTs, so there is no server-side session to tear
/// down; the client discards its copy of the token. The endpoint exists so
/// clients have a uniform logout call and still requires a valid token.
#[post("/logout")]
pub async fn logout(_user: CurrentUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(json!({ "message": "Logged out" })))
}

/// Logout everywhere
///
/// Same stateless semantics as `logout`: with no server-tracked session
/// list there is nothing to clear per device, so this acknowledges and
/// leaves token discard to the clients.
#[post("/logoutAll")]
pub async fn logout_all(_user: CurrentUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(json!({ "message": "Logged out on all devices" })))
}

/// Returns the authenticated caller's profile.
#[get("/me")]
pub async fn me(pool: web::Data<PgPool>, user: CurrentUser) -> Result<impl Responder, AppError> {
    let profile = repo::users::find_by_id(&pool, user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not authorized, token failed".into()))?;

    Ok(HttpResponse::Ok().json(profile))
}
