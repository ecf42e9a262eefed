use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, verify_token};
use crate::auth::password::verify_password;
use crate::config::Config;
use crate::error::ApiError;
use crate::model::user::UserResponse;
use crate::models::{AuthResponse, LoginRequest, OtpVerificationRequest, TokenType};
use crate::service::{Registration, user};

/// Session issuer. Every credential failure collapses into one generic
/// `Unauthorized`: the caller never learns whether the email exists.
#[instrument(name = "auth_login", skip(pool, config, body), fields(email = %body.email))]
pub async fn login(
    body: web::Json<LoginRequest>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::InvalidRequest(
            "Email and password must not be empty".into(),
        ));
    }

    debug!("Fetching user from database");

    let db_user = match user::get_by_email(pool.get_ref(), &body.email).await? {
        Some(u) => u,
        None => {
            info!("Invalid credentials: user not found");
            return Err(ApiError::Unauthorized);
        }
    };

    debug!("Verifying password");

    if verify_password(&body.password, &db_user.password).is_err() {
        info!("Invalid credentials: password mismatch");
        return Err(ApiError::Unauthorized);
    }

    if !db_user.is_active {
        info!("Invalid credentials: account deactivated");
        return Err(ApiError::Unauthorized);
    }

    let role = db_user.role().ok_or(ApiError::Unauthorized)?;

    debug!("Generating tokens");

    let access_token = generate_access_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    let (refresh_token, refresh_claims) = generate_refresh_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    debug!(user_id = db_user.id, jti = %refresh_claims.jti, "Storing refresh token");

    sqlx::query(
        "INSERT INTO refresh_tokens (user_id, jti, expires_at) VALUES (?, ?, FROM_UNIXTIME(?))",
    )
    .bind(db_user.id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool.get_ref())
    .await?;

    // non-fatal bookkeeping
    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(db_user.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!("Login successful");

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token,
        refresh_token,
        email: db_user.email.clone(),
        role,
        name: db_user.full_name(),
        user_id: db_user.id,
    }))
}

/// Registration completion: the invitee submits the emailed code and the
/// orchestrator materializes the account.
pub async fn verify_otp(
    body: web::Json<OtpVerificationRequest>,
    registration: web::Data<Registration>,
) -> Result<HttpResponse, ApiError> {
    let user = registration.complete(&body.email, &body.otp).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Registration successful! Check your email for credentials.",
        "user": UserResponse::from(user),
    })))
}

pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let token = bearer_token(&req).ok_or(ApiError::Unauthorized)?;

    let claims = verify_token(token, &config.jwt_secret).map_err(|_| ApiError::Unauthorized)?;

    if claims.token_type != TokenType::Refresh {
        return Err(ApiError::Unauthorized);
    }

    let record = sqlx::query_as::<_, (u64, u64, bool)>(
        "SELECT id, user_id, revoked FROM refresh_tokens WHERE jti = ?",
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await?;

    let (record_id, user_id) = match record {
        Some((id, user_id, revoked)) if !revoked => (id, user_id),
        _ => return Err(ApiError::Unauthorized),
    };

    // rotate: revoke the old refresh token before issuing its replacement
    sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(record_id)
        .execute(pool.get_ref())
        .await?;

    let (new_refresh_token, new_claims) = generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    sqlx::query(
        "INSERT INTO refresh_tokens (user_id, jti, expires_at) VALUES (?, ?, FROM_UNIXTIME(?))",
    )
    .bind(user_id)
    .bind(&new_claims.jti)
    .bind(new_claims.exp as i64)
    .execute(pool.get_ref())
    .await?;

    let access_token = generate_access_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    Ok(HttpResponse::Ok().json(json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token,
    })))
}

/// Revokes the presented refresh token. Succeeds quietly no matter what:
/// logging out with a bad token is not an error worth reporting.
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let token = match bearer_token(&req) {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    let _ = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ?")
        .bind(&claims.jti)
        .execute(pool.get_ref())
        .await;

    HttpResponse::NoContent().finish()
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}
