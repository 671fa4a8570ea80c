// End-to-end coverage: bind an ephemeral port, serve the real router, and
// drive it through the same typed client the TUI uses.
use budget_planner::backend::{self, auth, AppState};
use budget_planner::cli::api::Client;
use budget_planner::config::Config;
use budget_planner::store::{Allocations, CategoryUpdate, UserUpdate};
use rust_decimal::Decimal;

const SECRET: &str = "test-secret";

async fn spawn_server() -> String {
    let state = AppState::new(Config {
        port: 0,
        jwt_secret: SECRET.into(),
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, backend::app(state)).await.unwrap();
    });
    format!("http://{addr}/api")
}

async fn logged_in_client(base: &str) -> Client {
    let mut client = Client::new(base, None);
    client
        .register("alice", "alice@example.com", "hunter2")
        .await
        .unwrap();
    client
}

#[tokio::test]
async fn requests_without_a_token_are_rejected_with_the_exact_message() {
    let base = spawn_server().await;

    let anonymous = Client::new(&base, None);
    let err = anonymous.list_categories().await.unwrap_err();
    assert_eq!(err.status, Some(401));
    assert_eq!(err.message, "No token provided");

    let garbage = Client::new(&base, Some("not-a-jwt".into()));
    let err = garbage.list_rules().await.unwrap_err();
    assert_eq!(err.status, Some(401));
    assert_eq!(err.message, "Invalid token");
}

#[tokio::test]
async fn category_crud_flow() {
    let base = spawn_server().await;
    let client = logged_in_client(&base).await;

    let created = client
        .create_category("Food", 2, Decimal::from(5000))
        .await
        .unwrap();
    assert_eq!(created.name, "Food");
    assert_eq!(created.priority, 2);
    assert_eq!(created.budget, Decimal::from(5000));
    assert_eq!(created.spent, Decimal::ZERO);
    assert!(!created.id.is_empty());

    let listed = client.list_categories().await.unwrap();
    assert_eq!(listed.len(), 1);

    // A spent-only patch touches nothing else, including a zero value.
    let patch = CategoryUpdate {
        spent: Some(Decimal::ZERO),
        ..Default::default()
    };
    let updated = client.update_category(&created.id, &patch).await.unwrap();
    assert_eq!(updated.spent, Decimal::ZERO);
    assert_eq!(updated.name, "Food");
    assert_eq!(updated.budget, Decimal::from(5000));

    client.delete_category(&created.id).await.unwrap();
    assert!(client.list_categories().await.unwrap().is_empty());

    let err = client.delete_category(&created.id).await.unwrap_err();
    assert_eq!(err.status, Some(404));
    assert_eq!(err.message, "Category not found");
}

#[tokio::test]
async fn activating_the_second_seed_rule_changes_the_active_rule() {
    let base = spawn_server().await;
    let client = logged_in_client(&base).await;

    assert_eq!(client.active_rule().await.unwrap().id, "1");

    let activated = client.activate_rule("2").await.unwrap();
    assert_eq!(activated.id, "2");
    assert_eq!(client.active_rule().await.unwrap().id, "2");

    // Activation is a reference swap; the listing order is untouched.
    let order: Vec<String> = client
        .list_rules()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(order, vec!["1", "2"]);

    let err = client.activate_rule("9").await.unwrap_err();
    assert_eq!(err.status, Some(404));
    assert_eq!(err.message, "Rule not found");
}

#[tokio::test]
async fn customize_overwrites_allocations_wholesale() {
    let base = spawn_server().await;
    let client = logged_in_client(&base).await;

    let custom = Allocations {
        needs: 40,
        wants: 40,
        savings: 20,
    };
    let rule = client.customize_rule("1", custom).await.unwrap();
    assert_eq!(rule.allocations, custom);

    let listed = client.list_rules().await.unwrap();
    assert_eq!(listed[0].allocations, custom);
}

#[tokio::test]
async fn profile_round_trip_returns_the_sanitized_shape() {
    let base = spawn_server().await;
    let client = logged_in_client(&base).await;

    let profile = client.get_profile().await.unwrap();
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.email, "alice@example.com");

    let patch = UserUpdate {
        age: Some(30),
        ..Default::default()
    };
    let updated = client.update_profile(&patch).await.unwrap();
    assert_eq!(updated.username, "alice");
    assert_eq!(updated.email, "alice@example.com");
}

#[tokio::test]
async fn a_valid_token_for_a_missing_user_is_a_404() {
    let base = spawn_server().await;
    // The store starts empty, so a token minted out of band (or surviving a
    // restart) points at nobody.
    let token = auth::mint_token("ghost", SECRET).unwrap();
    let client = Client::new(&base, Some(token));

    let err = client.get_profile().await.unwrap_err();
    assert_eq!(err.status, Some(404));
    assert_eq!(err.message, "User not found");
}

#[tokio::test]
async fn login_round_trips_after_register() {
    let base = spawn_server().await;
    let mut client = Client::new(&base, None);
    client
        .register("bob", "bob@example.com", "pw123")
        .await
        .unwrap();

    let mut fresh = Client::new(&base, None);
    let err = fresh.login("bob@example.com", "wrong").await.unwrap_err();
    assert_eq!(err.status, Some(401));
    assert_eq!(err.message, "Invalid credentials");

    let user = fresh.login("bob@example.com", "pw123").await.unwrap();
    assert_eq!(user.username, "bob");
    assert_eq!(fresh.get_profile().await.unwrap().username, "bob");
}
