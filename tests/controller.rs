//! Construction-time behavior of resource controllers: option
//! validation, convention derivation, and router assembly. No live
//! database is needed; router tests use a lazy pool.

use restkit::{
    ConfigError, Controller, ControllerOptions, FieldDef, FieldType, Model, ResourceSpec, Schema,
    SchemaIntrospect, SettingsAccess, Verb,
};

fn user_schema() -> Schema {
    Schema::new(vec![
        FieldDef::new("email", FieldType::Text).required().unique(),
        FieldDef::new("name", FieldType::Text),
        FieldDef::new("age", FieldType::Integer),
    ])
    .unwrap()
}

fn user_model() -> Model {
    Model::new("user", user_schema())
}

fn lazy_pool() -> sqlx::PgPool {
    sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://localhost/restkit_test")
        .unwrap()
}

#[test]
fn missing_singular_fails() {
    let err = Controller::new(user_model(), ControllerOptions::default()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingSingular));

    let err = Controller::new(user_model(), "").unwrap_err();
    assert!(matches!(err, ConfigError::MissingSingular));
}

#[test]
fn singular_must_match_injected_model() {
    let err = Controller::new(user_model(), "account").unwrap_err();
    assert!(matches!(err, ConfigError::ModelMismatch { .. }));
}

#[test]
fn base_path_must_start_and_not_end_with_slash() {
    let err = Controller::new(
        user_model(),
        ControllerOptions::named("user").base_path("users"),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::BasePathMissingSlash(_)));

    let err = Controller::new(
        user_model(),
        ControllerOptions::named("user").base_path("/users/"),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::BasePathTrailingSlash(_)));

    // the bare root is a trailing slash too when supplied explicitly
    let err = Controller::new(
        user_model(),
        ControllerOptions::named("user").base_path("/"),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::BasePathTrailingSlash(_)));
}

#[test]
fn find_by_must_name_a_unique_field() {
    let err = Controller::new(
        user_model(),
        ControllerOptions::named("user").find_by("name"),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::NonUniqueLookup { .. }));

    let err = Controller::new(
        user_model(),
        ControllerOptions::named("user").find_by("missing"),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownLookupField { .. }));

    let controller = Controller::new(
        user_model(),
        ControllerOptions::named("user").find_by("email"),
    )
    .unwrap();
    assert_eq!(controller.settings().find_by, "email");
}

#[test]
fn plural_derives_by_inflection_unless_supplied() {
    let controller = Controller::new(user_model(), "user").unwrap();
    assert_eq!(controller.settings().plural, "users");

    let controller = Controller::new(
        user_model(),
        ControllerOptions::named("user").plural("people"),
    )
    .unwrap();
    assert_eq!(controller.settings().plural, "people");
}

#[test]
fn bare_string_is_equivalent_to_named_options() {
    let from_str = Controller::new(user_model(), "user").unwrap();
    let from_options = Controller::new(user_model(), ControllerOptions::named("user")).unwrap();

    let a = from_str.settings();
    let b = from_options.settings();
    assert_eq!(a.singular, b.singular);
    assert_eq!(a.plural, b.plural);
    assert_eq!(a.find_by, b.find_by);
    assert_eq!(a.base_path, b.base_path);
    assert_eq!(a.base_path_with_id, b.base_path_with_id);
    assert_eq!(a.base_path_with_optional_id, b.base_path_with_optional_id);
}

#[test]
fn spec_conversions_cover_all_inputs() {
    for spec in [
        ResourceSpec::from("user"),
        ResourceSpec::from("user".to_string()),
        ResourceSpec::from(ControllerOptions::named("user")),
    ] {
        assert_eq!(spec.into_options().singular, "user");
    }
}

#[test]
fn extra_option_keys_are_copied_onto_settings() {
    let options = ControllerOptions::named("user")
        .extra("page_size", serde_json::json!(25))
        .extra("owner_only", serde_json::json!(true));
    let mut controller = Controller::new(user_model(), options).unwrap();

    assert_eq!(
        controller.settings().get("page_size"),
        Some(&serde_json::json!(25))
    );
    assert_eq!(
        controller.settings().get("owner_only"),
        Some(&serde_json::json!(true))
    );

    controller
        .settings_mut()
        .set("page_size", serde_json::json!(50));
    assert_eq!(
        controller.settings().get("page_size"),
        Some(&serde_json::json!(50))
    );
}

#[test]
fn derived_path_variants() {
    let controller = Controller::new(
        user_model(),
        ControllerOptions::named("user").base_path("/users"),
    )
    .unwrap();
    let settings = controller.settings();
    assert_eq!(settings.base_path, "/users");
    assert_eq!(settings.base_path_with_id, "/users/:id");
    assert_eq!(settings.base_path_with_optional_id, "/users/:id?");
}

#[test]
fn disabled_verbs_leave_active_set() {
    let mut controller = Controller::new(user_model(), "user").unwrap();
    controller.settings_mut().disable_verb(Verb::Delete);
    let active = controller.settings().active_verbs();
    assert!(!active.contains(&Verb::Delete));
    assert!(active.contains(&Verb::Get));
}

#[test]
fn initialize_is_idempotent() {
    let mut controller = Controller::new(user_model(), "user").unwrap();
    assert!(!controller.is_initialized());
    controller.initialize();
    assert!(controller.is_initialized());
    controller.initialize();
    assert!(controller.is_initialized());
}

#[tokio::test]
async fn router_builds_without_live_database() {
    let controller = Controller::new(
        user_model(),
        ControllerOptions::named("user").base_path("/users"),
    )
    .unwrap();
    let _router: axum::Router = controller.into_router(lazy_pool());
}

#[tokio::test]
async fn router_builds_with_verbs_disabled() {
    let mut controller = Controller::new(
        user_model(),
        ControllerOptions::named("user").base_path("/users"),
    )
    .unwrap();
    controller.settings_mut().disable_verb(Verb::Post);
    controller.settings_mut().disable_verb(Verb::Put);
    controller.settings_mut().disable_verb(Verb::Delete);
    let _router: axum::Router = controller.into_router(lazy_pool());
}

#[test]
fn openapi_document_reflects_mounted_paths() {
    let controller = Controller::new(
        user_model(),
        ControllerOptions::named("user").base_path("/users"),
    )
    .unwrap();
    let doc = controller.openapi_document();
    assert_eq!(doc["openapi"], "3.0.3");
    assert!(doc["paths"]["/users"]["get"].is_object());
    assert!(doc["paths"]["/users/{id}"]["delete"].is_object());
    assert!(doc["components"]["schemas"]["user"]["properties"]["email"].is_object());
}
