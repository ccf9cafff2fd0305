pub mod health;
pub mod rules;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::state::AppState;

const SCOPE_PATH: &str =
    "/project/{project}/service-project/{service_project}/application/{application}";
const RULE_PATH: &str =
    "/project/{project}/service-project/{service_project}/application/{application}/rule/{rule}";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/_healthz", get(health::health_check))
        .route(
            SCOPE_PATH,
            get(rules::list_rules)
                .post(rules::create_rules)
                .delete(rules::delete_rules),
        )
        .route(
            RULE_PATH,
            get(rules::get_rule)
                .post(rules::create_rule)
                .put(rules::update_rule)
                .delete(rules::delete_rule),
        )
}
