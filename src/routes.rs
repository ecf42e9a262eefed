use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

use crate::{
    api::{admin, employee, manager},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(build_limiter(config.rate_login_per_min))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/verify-otp")
                    .wrap(build_limiter(config.rate_otp_per_min))
                    .route(web::post().to(handlers::verify_otp)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(build_limiter(config.rate_refresh_per_min))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(build_limiter(config.rate_login_per_min))
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication + role table
            .wrap(build_limiter(config.rate_protected_per_min)) // rate limiting
            .service(
                web::scope("/admin")
                    .service(
                        web::resource("/managers/initiate-registration")
                            .route(web::post().to(admin::initiate_manager_registration)),
                    )
                    .service(
                        web::resource("/employees/initiate-registration")
                            .route(web::post().to(admin::initiate_employee_registration)),
                    )
                    // /admin/users
                    .service(web::resource("/users").route(web::get().to(admin::list_users)))
                    // /admin/users/{id}
                    .service(
                        web::resource("/users/{user_id}")
                            .route(web::get().to(admin::get_user))
                            .route(web::put().to(admin::update_user))
                            .route(web::delete().to(admin::delete_user)),
                    )
                    .service(
                        web::resource("/users/{user_id}/toggle-status")
                            .route(web::put().to(admin::toggle_user_status)),
                    )
                    .service(web::resource("/managers").route(web::get().to(admin::list_managers)))
                    .service(
                        web::resource("/employees").route(web::get().to(admin::list_employees)),
                    )
                    .service(
                        web::resource("/managers/{manager_id}/employees")
                            .route(web::get().to(admin::manager_employees)),
                    )
                    .service(
                        web::resource("/profile")
                            .route(web::get().to(admin::get_profile))
                            .route(web::put().to(admin::update_profile)),
                    )
                    .service(
                        web::resource("/change-password")
                            .route(web::post().to(admin::change_password)),
                    ),
            )
            .service(
                web::scope("/managers")
                    .service(
                        web::resource("/profile")
                            .route(web::get().to(manager::get_profile))
                            .route(web::put().to(manager::update_profile)),
                    )
                    .service(
                        web::resource("/change-password")
                            .route(web::post().to(manager::change_password)),
                    )
                    .service(web::resource("/team").route(web::get().to(manager::get_team)))
                    .service(
                        web::resource("/team/{employee_id}")
                            .route(web::get().to(manager::get_team_member)),
                    ),
            )
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("/profile")
                            .route(web::get().to(employee::get_profile))
                            .route(web::put().to(employee::update_profile)),
                    )
                    .service(
                        web::resource("/change-password")
                            .route(web::post().to(employee::change_password)),
                    )
                    .service(web::resource("/manager").route(web::get().to(employee::get_manager)))
                    .service(
                        web::resource("/team-mates")
                            .route(web::get().to(employee::get_team_mates)),
                    ),
            ),
    );
}

// REGISTRATION
//  ├─ POST /api/admin/.../initiate-registration  (admin, sends OTP)
//  └─ POST /auth/verify-otp                      (invitee, materializes account)

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns new access_token
