// src/tests/application_tests.rs
#[cfg(test)]
mod tests {
    use crate::models::UserRole;
    use crate::tests::{bearer, seed_project, seed_user, test_state};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    #[actix_rt::test]
    async fn anonymous_application_is_accepted() {
        let state = test_state();
        let (owner, _) = seed_user(&state, "Owner", UserRole::TeamLead);
        let project = seed_project(&state, &owner, "Alpha", 3, &["rust"]);
        let app = test_app!(state);

        let request = test::TestRequest::post()
            .uri("/api/applications")
            .set_json(&json!({ "projectId": project.id, "role": "dev", "message": "hi" }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["application"]["status"], "new");
        assert_eq!(body["application"]["name"], "anonymous");
        assert!(body["application"].get("userId").is_none());
    }

    #[actix_rt::test]
    async fn signed_in_applicant_overrides_supplied_name() {
        let state = test_state();
        let (owner, _) = seed_user(&state, "Owner", UserRole::TeamLead);
        let (dev, dev_token) = seed_user(&state, "Dev", UserRole::Developer);
        let project = seed_project(&state, &owner, "Alpha", 3, &["rust"]);
        let app = test_app!(state);

        let request = test::TestRequest::post()
            .uri("/api/applications")
            .insert_header(bearer(&dev_token))
            .set_json(&json!({
                "projectId": project.id,
                "name": "Someone Else",
                "role": "dev",
                "message": "pick me"
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["application"]["name"], "Dev");
        assert_eq!(body["application"]["userId"], dev.id.as_str());

        // And it shows up in the applicant's own list with the project attached
        let request = test::TestRequest::get()
            .uri("/api/applications")
            .insert_header(bearer(&dev_token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        let applications = body["applications"].as_array().unwrap();
        assert_eq!(applications.len(), 1);
        assert_eq!(applications[0]["project"]["name"], "Alpha");
    }

    #[actix_rt::test]
    async fn application_needs_an_existing_project() {
        let state = test_state();
        let app = test_app!(state);

        let request = test::TestRequest::post()
            .uri("/api/applications")
            .set_json(&json!({
                "projectId": uuid::Uuid::new_v4().to_string(),
                "role": "dev",
                "message": "hi"
            }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["error"]["code"], "PROJECT_NOT_FOUND");

        let request = test::TestRequest::post()
            .uri("/api/applications")
            .set_json(&json!({ "projectId": "42", "role": "dev", "message": "hi" }))
            .to_request();
        let response = test::call_service(&app, request).await;
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["error"]["code"], "INVALID_ID");
    }

    #[actix_rt::test]
    async fn own_list_requires_a_token() {
        let state = test_state();
        let app = test_app!(state);

        let request = test::TestRequest::get().uri("/api/applications").to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["error"]["code"], "AUTHENTICATION_REQUIRED");
    }

    #[actix_rt::test]
    async fn project_listing_is_admin_only() {
        let state = test_state();
        let (owner, owner_token) = seed_user(&state, "Owner", UserRole::TeamLead);
        let (_, admin_token) = seed_user(&state, "Root", UserRole::Admin);
        let project = seed_project(&state, &owner, "Alpha", 3, &["rust"]);
        let app = test_app!(state);

        for message in ["first", "second"] {
            let request = test::TestRequest::post()
                .uri("/api/applications")
                .set_json(&json!({ "projectId": project.id, "role": "dev", "message": message }))
                .to_request();
            assert_eq!(test::call_service(&app, request).await.status(), StatusCode::CREATED);
        }

        let uri = format!("/api/applications/projects/{}", project.id);
        let request = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(&owner_token))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["error"]["code"], "INSUFFICIENT_PERMISSIONS");

        let request = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(&admin_token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["applications"].as_array().unwrap().len(), 2);
    }

    #[actix_rt::test]
    async fn unknown_project_listing_is_still_admin_only() {
        let state = test_state();
        let (_, dev_token) = seed_user(&state, "Dev", UserRole::Developer);
        let app = test_app!(state);

        let uri = format!("/api/applications/projects/{}", uuid::Uuid::new_v4());
        let request = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(&dev_token))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["error"]["code"], "INSUFFICIENT_PERMISSIONS");
    }

    #[actix_rt::test]
    async fn status_changes_follow_project_ownership() {
        let state = test_state();
        let (owner, owner_token) = seed_user(&state, "Owner", UserRole::TeamLead);
        let (_, stranger_token) = seed_user(&state, "Stranger", UserRole::TeamLead);
        let project = seed_project(&state, &owner, "Alpha", 3, &["rust"]);
        let app = test_app!(state);

        let request = test::TestRequest::post()
            .uri("/api/applications")
            .set_json(&json!({ "projectId": project.id, "role": "dev", "message": "hi" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        let application_id = body["application"]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/applications/{}", application_id);

        let request = test::TestRequest::patch()
            .uri(&uri)
            .insert_header(bearer(&stranger_token))
            .set_json(&json!({ "status": "accepted" }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["error"]["code"], "APPLICATION_ACCESS_DENIED");

        // Any status may follow any other
        for status in ["accepted", "new", "under-review"] {
            let request = test::TestRequest::patch()
                .uri(&uri)
                .insert_header(bearer(&owner_token))
                .set_json(&json!({ "status": status }))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, request).await;
            assert_eq!(body["application"]["status"], status);
        }

        let request = test::TestRequest::patch()
            .uri(&uri)
            .insert_header(bearer(&owner_token))
            .set_json(&json!({ "status": "archived" }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
