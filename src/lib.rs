//! Self-hosted blog backend.
//!
//! Posts and comments persist to a flat JSON file; a single operator account
//! authenticates with a salted password hash and receives signed session tokens.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod images;
pub mod models;
pub mod settings;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::AuthService;
use config::Config;
use db::BlogRepository;
use errors::AppError;
use images::{FileImageStore, ImageStore};
use models::{Credentials, Secret};
use settings::{SiteService, WritableSettings, CREDENTIALS_FILE, SECRET_FILE};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<BlogRepository>,
    pub auth: Arc<AuthService>,
    pub site: Arc<SiteService>,
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    /// Open every store under the configured directories.
    ///
    /// On first run the credentials and secret records are created from the
    /// `BLOG_ADMIN_*` / `BLOG_SECRET` settings.
    pub async fn open(config: &Config) -> Result<Self, AppError> {
        db::init_data_dir(&config.data_dir).await?;

        let credentials =
            WritableSettings::open_or_init(config.data_dir.join(CREDENTIALS_FILE), || {
                bootstrap_credentials(config)
            })
            .await?;
        let secret = WritableSettings::open_or_init(config.data_dir.join(SECRET_FILE), || {
            bootstrap_secret(config)
        })
        .await?;

        let images: Arc<dyn ImageStore> = Arc::new(FileImageStore::new(&config.images_dir));
        let site = SiteService::open(&config.data_dir, images.clone()).await?;

        Ok(Self {
            repo: Arc::new(BlogRepository::open(&config.data_dir)),
            auth: Arc::new(AuthService::new(credentials, secret)),
            site: Arc::new(site),
            images,
        })
    }
}

fn bootstrap_credentials(config: &Config) -> Result<Credentials, AppError> {
    let (Some(login), Some(password)) = (&config.admin_login, &config.admin_password) else {
        return Err(AppError::Validation(
            "BLOG_ADMIN_LOGIN and BLOG_ADMIN_PASSWORD must be set on first run".to_string(),
        ));
    };
    if login.trim().is_empty() || password.trim().is_empty() {
        return Err(AppError::Validation(
            "BLOG_ADMIN_LOGIN and BLOG_ADMIN_PASSWORD must not be empty".to_string(),
        ));
    }

    tracing::info!("Creating operator account {:?}", login);
    Ok(Credentials {
        login: login.clone(),
        password_hash: auth::hash_password(password)?,
    })
}

fn bootstrap_secret(config: &Config) -> Result<Secret, AppError> {
    let value = match &config.secret {
        Some(secret) => {
            auth::check_secret(secret)?;
            secret.clone()
        }
        None => {
            tracing::info!("No BLOG_SECRET configured, generating a random signing secret");
            auth::generate_secret()?
        }
    };
    Ok(Secret { value })
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth = state.auth.clone();

    // Operator-only routes
    let admin_routes = Router::new()
        .route("/posts", post(api::create_post))
        .route("/posts/{id}", put(api::update_post))
        .route("/posts/{id}", delete(api::delete_post))
        .route(
            "/posts/{id}/comments/{comment_id}",
            delete(api::delete_comment),
        )
        .route("/admin/password", post(api::change_password))
        .route("/admin/login", post(api::change_login))
        .route("/admin/secret", post(api::change_secret))
        .route("/admin/credentials", post(api::update_credentials))
        .route("/admin/about", post(api::update_about))
        .route("/admin/header", post(api::update_header))
        .route("/admin/upload", post(api::upload_image))
        .route("/admin/images", get(api::list_images))
        .route("/admin/images/{id}", delete(api::delete_image))
        .layer(middleware::from_fn(move |req, next| {
            auth::bearer_auth_layer(auth.clone(), req, next)
        }));

    // Public routes
    let public_routes = Router::new()
        .route("/posts", get(api::list_posts))
        .route("/posts/{id}", get(api::get_post))
        .route("/posts/{id}/comments", post(api::add_comment))
        .route("/tags", get(api::list_tags))
        .route("/about", get(api::get_about))
        .route("/header", get(api::get_header))
        .route("/admin/auth", post(api::authenticate));

    Router::new()
        .nest("/api", admin_routes.merge(public_routes))
        .route("/images/{id}", get(api::serve_image))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
