//! Account registration and login.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::store::{AccountStore, DUPLICATE_EMAIL};
use crate::auth::token::TokenIssuer;
use crate::errors::{AppError, FieldError};
use crate::models::account::{NewAccount, PublicProfile, Role};

const MIN_PASSWORD_LEN: usize = 8;
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Registration payload. Fields are optional at the serde level so missing
/// ones come back as field errors instead of a generic parse failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicProfile,
}

struct ValidRegistration {
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    role: Role,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    tokens: TokenIssuer,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<PublicProfile, AppError> {
        let valid = validate_registration(request)?;

        if self.store.find_by_email(&valid.email).await?.is_some() {
            return Err(AppError::BadRequest(DUPLICATE_EMAIL.to_string()));
        }

        let password_hash = hash_password(valid.password).await?;
        let account = self
            .store
            .insert(NewAccount {
                email: valid.email,
                password_hash,
                first_name: valid.first_name,
                last_name: valid.last_name,
                role: valid.role,
            })
            .await?;

        info!("Registered account {} ({})", account.id, account.role);
        Ok(PublicProfile::from(&account))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let (email, password) = match (non_blank(request.email), request.password) {
            (Some(email), Some(password)) if !password.is_empty() => {
                (normalize_email(&email), password)
            }
            _ => {
                return Err(AppError::BadRequest(
                    "Email and password are required".to_string(),
                ))
            }
        };

        let account = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(password, account.password_hash.clone()).await? {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        if !account.is_active {
            warn!("Login refused for deactivated account {}", account.id);
            return Err(AppError::Unauthorized("Account is deactivated".to_string()));
        }

        let token = self.tokens.issue(account.id, account.role)?;
        info!("Account {} logged in", account.id);

        Ok(LoginResponse {
            token,
            user: PublicProfile::from(&account),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

fn validate_registration(request: RegisterRequest) -> Result<ValidRegistration, AppError> {
    let mut errors = Vec::new();

    let email = non_blank(request.email).map(|e| normalize_email(&e));
    match &email {
        None => errors.push(FieldError::new("email", "\"email\" is required")),
        Some(e) if !is_valid_email(e) => {
            errors.push(FieldError::new("email", "\"email\" must be a valid email"))
        }
        Some(_) => {}
    }

    let password = request.password.filter(|p| !p.is_empty());
    match &password {
        None => errors.push(FieldError::new("password", "\"password\" is required")),
        Some(p) if p.chars().count() < MIN_PASSWORD_LEN => errors.push(FieldError::new(
            "password",
            format!("\"password\" length must be at least {MIN_PASSWORD_LEN} characters long"),
        )),
        Some(_) => {}
    }

    let first_name = non_blank(request.first_name);
    if first_name.is_none() {
        errors.push(FieldError::new("firstName", "\"firstName\" is required"));
    }
    let last_name = non_blank(request.last_name);
    if last_name.is_none() {
        errors.push(FieldError::new("lastName", "\"lastName\" is required"));
    }

    let role = match non_blank(request.role) {
        None => Some(Role::default()),
        Some(raw) => match raw.parse::<Role>() {
            Ok(role) => Some(role),
            Err(_) => {
                errors.push(FieldError::new(
                    "role",
                    "\"role\" must be one of [admin, manager, auditor, viewer]",
                ));
                None
            }
        },
    };

    match (email, password, first_name, last_name, role) {
        (Some(email), Some(password), Some(first_name), Some(last_name), Some(role))
            if errors.is_empty() =>
        {
            Ok(ValidRegistration {
                email,
                password,
                first_name,
                last_name,
                role,
            })
        }
        _ => Err(AppError::Validation(errors)),
    }
}
