use super::*;
use serde_json::json;

#[test]
fn page_fills_missing_fields_with_defaults() {
    let page: Page<Comment> = serde_json::from_value(json!({ "content": [] })).unwrap();
    assert_eq!(page, Page::default());

    let page: Page<Comment> = serde_json::from_value(json!({
        "content": [{ "id": 1, "text": "nice lift" }],
        "totalElements": 41,
        "totalPages": 3,
        "number": 2,
        "size": 20
    }))
    .unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.total_elements, 41);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.number, 2);
}

#[test]
fn page_request_defaults_to_first_page() {
    assert_eq!(PageRequest::default(), PageRequest::new(0, 20));
}

#[test]
fn register_request_uses_camel_case() {
    let body = RegisterRequest {
        full_name: "Kim Lifter".into(),
        email: "kim@sweatlo.test".into(),
        username: "kim".into(),
        password: "pw".into(),
    };
    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        json!({ "fullName": "Kim Lifter", "email": "kim@sweatlo.test", "username": "kim", "password": "pw" })
    );
}

#[test]
fn login_response_keeps_snake_case_token() {
    let response: LoginResponse = serde_json::from_value(json!({
        "user": { "id": 3, "fullName": "Park", "email": "p@sweatlo.test" },
        "access_token": "jwt"
    }))
    .unwrap();
    assert_eq!(response.user.id, 3);
    assert_eq!(response.user.full_name, "Park");
    assert_eq!(response.access_token, "jwt");
}

#[test]
fn profile_settings_omit_unset_fields() {
    let settings = ProfileSettings { nickname: Some("new".into()), height: Some(180.5), ..ProfileSettings::default() };
    assert_eq!(serde_json::to_value(&settings).unwrap(), json!({ "nickname": "new", "height": 180.5 }));
}

#[test]
fn profile_avatar_checks_known_field_names() {
    let profile: Profile = serde_json::from_value(json!({ "id": 1, "avatarUrl": "https://img.test/a.png" })).unwrap();
    assert_eq!(profile.avatar_url(), Some("https://img.test/a.png"));

    let bare: Profile = serde_json::from_value(json!({ "id": 1 })).unwrap();
    assert_eq!(bare.avatar_url(), None);
}

#[test]
fn goal_kind_maps_to_type_field() {
    let goal = NewGoal { kind: "WEIGHT".into(), exercise_name: None, target_value: 70.0, unit: Some("kg".into()) };
    assert_eq!(
        serde_json::to_value(&goal).unwrap(),
        json!({ "type": "WEIGHT", "targetValue": 70.0, "unit": "kg" })
    );
}

#[test]
fn clean_details_drops_blank_names_and_trims() {
    let rows = vec![
        ExerciseDetail { name: "  squat ".into(), weight: Some(100.0), reps: Some(5), sets: Some(5), duration: None },
        ExerciseDetail::named("   "),
        ExerciseDetail::named(""),
        ExerciseDetail::named("plank"),
    ];
    let cleaned = clean_details(rows);
    assert_eq!(cleaned.len(), 2);
    assert_eq!(cleaned[0].name, "squat");
    assert_eq!(cleaned[0].weight, Some(100.0));
    assert_eq!(cleaned[1].name, "plank");
}

#[test]
fn exercise_detail_serializes_unset_numbers_as_null() {
    let value = serde_json::to_value(ExerciseDetail::named("row")).unwrap();
    assert_eq!(value, json!({ "name": "row", "weight": null, "reps": null, "sets": null }));
}

#[test]
fn comment_body_and_author_fall_back_to_alternate_fields() {
    let comment: Comment =
        serde_json::from_value(json!({ "id": 9, "content": "great form", "authorName": "lee" })).unwrap();
    assert_eq!(comment.body(), Some("great form"));
    assert_eq!(comment.author_name(), Some("lee"));

    let comment: Comment = serde_json::from_value(json!({ "id": 9, "text": "hi", "author": "kim" })).unwrap();
    assert_eq!(comment.body(), Some("hi"));
    assert_eq!(comment.author_name(), Some("kim"));
}

#[test]
fn routine_display_name_falls_back_to_name() {
    let routine: Routine = serde_json::from_value(json!({ "id": 2, "name": "push day" })).unwrap();
    assert_eq!(routine.display_name(), "push day");
    assert!(routine.details.is_empty());

    let routine: Routine = serde_json::from_value(json!({ "id": 2, "routineName": "legs" })).unwrap();
    assert_eq!(routine.display_name(), "legs");
}
