// src/tests/middleware_tests.rs
#[cfg(test)]
mod tests {
    use crate::tests::test_state;
    use crate::utils::{security_headers, Authentication, RateLimit};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::Value;
    use std::net::SocketAddr;
    use std::time::Duration;

    #[actix_rt::test]
    async fn excess_requests_get_429_per_client() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .wrap(Authentication::new(state.config.jwt.clone()))
                .wrap(RateLimit::new(Duration::from_secs(60), 2))
                .wrap(security_headers())
                .configure(|cfg| crate::routes::init_routes(cfg, "/api")),
        )
        .await;
        let first: SocketAddr = "10.0.0.1:4000".parse().unwrap();
        let second: SocketAddr = "10.0.0.2:4000".parse().unwrap();

        for _ in 0..2 {
            let request = test::TestRequest::get().uri("/health").peer_addr(first).to_request();
            assert_eq!(test::call_service(&app, request).await.status(), StatusCode::OK);
        }

        let request = test::TestRequest::get().uri("/health").peer_addr(first).to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("retry-after"));
        assert_eq!(response.headers().get("x-content-type-options").unwrap(), "nosniff");
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["error"]["code"], "RATE_LIMIT_EXCEEDED");

        // Another client still has its own budget
        let request = test::TestRequest::get().uri("/health").peer_addr(second).to_request();
        assert_eq!(test::call_service(&app, request).await.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn responses_carry_hardening_headers() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .wrap(security_headers())
                .configure(|cfg| crate::routes::init_routes(cfg, "/api")),
        )
        .await;

        for uri in ["/health", "/api/nothing-here"] {
            let request = test::TestRequest::get().uri(uri).to_request();
            let response = test::call_service(&app, request).await;
            let headers = response.headers();
            assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
            assert_eq!(headers.get("x-frame-options").unwrap(), "SAMEORIGIN");
            assert_eq!(headers.get("referrer-policy").unwrap(), "no-referrer");
            assert!(headers.contains_key("strict-transport-security"));
        }
    }
}
