// src/backend/handlers.rs
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::backend::{
    auth::{mint_token, AuthUser},
    error::ApiError,
    AppState,
};
use crate::store::{Allocations, Category, CategoryUpdate, Profile, Rule, UserUpdate};

// ============= Categories =============

#[derive(Debug, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub priority: u8,
    pub budget: Decimal,
}

pub async fn list_categories(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Json<Vec<Category>> {
    Json(state.categories.list())
}

pub async fn create_category(
    _user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateCategory>,
) -> (StatusCode, Json<Category>) {
    let category = state.categories.create(body.name, body.priority, body.budget);
    (StatusCode::CREATED, Json(category))
}

pub async fn update_category(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<CategoryUpdate>,
) -> Result<Json<Category>, ApiError> {
    state
        .categories
        .update(&id, patch)
        .map(Json)
        .ok_or(ApiError::NotFound("Category"))
}

pub async fn delete_category(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.categories.delete(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Category"))
    }
}

// ============= Rules =============

#[derive(Debug, Deserialize)]
pub struct CustomizeRule {
    pub allocations: Allocations,
}

pub async fn list_rules(_user: AuthUser, State(state): State<AppState>) -> Json<Vec<Rule>> {
    Json(state.rules.list())
}

pub async fn active_rule(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Rule>, ApiError> {
    state.rules.active().map(Json).ok_or(ApiError::NotFound("Rule"))
}

pub async fn activate_rule(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Rule>, ApiError> {
    state
        .rules
        .activate(&id)
        .map(Json)
        .ok_or(ApiError::NotFound("Rule"))
}

pub async fn customize_rule(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CustomizeRule>,
) -> Result<Json<Rule>, ApiError> {
    state
        .rules
        .customize(&id, body.allocations)
        .map(Json)
        .ok_or(ApiError::NotFound("Rule"))
}

// ============= Users =============

pub async fn get_profile(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Profile>, ApiError> {
    state
        .users
        .profile(&user.user_id)
        .map(Json)
        .ok_or(ApiError::NotFound("User"))
}

pub async fn update_profile(
    user: AuthUser,
    State(state): State<AppState>,
    Json(patch): Json<UserUpdate>,
) -> Result<Json<Profile>, ApiError> {
    state
        .users
        .update(&user.user_id, patch)
        .map(Json)
        .ok_or(ApiError::NotFound("User"))
}

// ============= Auth =============

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .users
        .register(body.username, body.email, body.password)
        .map_err(ApiError::BadRequest)?;
    let token = mint_token(&user.id, &state.config.jwt_secret)?;
    Ok(Json(json!({ "token": token, "user": user })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .users
        .login(&body.email, &body.password)
        .ok_or(ApiError::BadCredentials)?;
    let token = mint_token(&user.id, &state.config.jwt_secret)?;
    Ok(Json(json!({ "token": token, "user": user })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn state() -> AppState {
        AppState::new(Config {
            port: 0,
            jwt_secret: "test-secret".into(),
        })
    }

    fn caller(id: &str) -> AuthUser {
        AuthUser {
            user_id: id.into(),
        }
    }

    #[tokio::test]
    async fn create_category_returns_201_with_zero_spent() {
        let state = state();
        let (status, Json(category)) = create_category(
            caller("u1"),
            State(state),
            Json(CreateCategory {
                name: "Food".into(),
                priority: 2,
                budget: Decimal::from(5000),
            }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        let value = serde_json::to_value(&category).unwrap();
        assert!(value["id"].is_string());
        assert_eq!(value["name"], "Food");
        assert_eq!(value["priority"], 2);
        assert_eq!(value["budget"], json!(5000.0));
        assert_eq!(value["spent"], json!(0.0));
    }

    #[tokio::test]
    async fn update_missing_category_is_404() {
        let result = update_category(
            caller("u1"),
            State(state()),
            Path("123".into()),
            Json(CategoryUpdate::default()),
        )
        .await;
        assert!(matches!(result, Err(ApiError::NotFound("Category"))));
    }

    #[tokio::test]
    async fn delete_missing_category_leaves_store_length_alone() {
        let state = state();
        state
            .categories
            .create("Rent".into(), 1, Decimal::from(11000));

        let result =
            delete_category(caller("u1"), State(state.clone()), Path("123".into())).await;
        assert!(matches!(result, Err(ApiError::NotFound("Category"))));
        assert_eq!(state.categories.len(), 1);
    }

    #[tokio::test]
    async fn activating_the_second_seed_changes_the_active_rule() {
        let state = state();
        let activated = activate_rule(caller("u1"), State(state.clone()), Path("2".into()))
            .await
            .unwrap();
        assert_eq!(activated.id, "2");

        let active = active_rule(caller("u1"), State(state)).await.unwrap();
        assert_eq!(active.id, "2");
    }

    #[tokio::test]
    async fn customize_overwrites_the_allocation_object() {
        let state = state();
        let rule = customize_rule(
            caller("u1"),
            State(state),
            Path("1".into()),
            Json(CustomizeRule {
                allocations: Allocations {
                    needs: 40,
                    wants: 40,
                    savings: 20,
                },
            }),
        )
        .await
        .unwrap();
        assert_eq!(
            rule.allocations,
            Allocations {
                needs: 40,
                wants: 40,
                savings: 20
            }
        );
    }

    #[tokio::test]
    async fn profile_404s_until_registered_then_round_trips() {
        let state = state();
        let miss = get_profile(caller("ghost"), State(state.clone())).await;
        assert!(matches!(miss, Err(ApiError::NotFound("User"))));

        let Json(registered) = register(
            State(state.clone()),
            Json(RegisterBody {
                username: "alice".into(),
                email: "alice@example.com".into(),
                password: "hunter2".into(),
            }),
        )
        .await
        .unwrap();
        let user_id = registered["user"]["id"].as_str().unwrap().to_string();
        assert!(registered["token"].is_string());

        let profile = get_profile(caller(&user_id), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(profile.username, "alice");

        let updated = update_profile(
            caller(&user_id),
            State(state),
            Json(UserUpdate {
                age: Some(30),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        // The sanitized shape: identity fields only, extended fields dropped.
        assert_eq!(updated.email, "alice@example.com");
    }

    #[tokio::test]
    async fn login_with_bad_password_is_401() {
        let state = state();
        register(
            State(state.clone()),
            Json(RegisterBody {
                username: "alice".into(),
                email: "alice@example.com".into(),
                password: "hunter2".into(),
            }),
        )
        .await
        .unwrap();

        let result = login(
            State(state),
            Json(LoginBody {
                email: "alice@example.com".into(),
                password: "wrong".into(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadCredentials)));
    }
}
