//! Outbound credential handling and session recovery through the full pipeline.

mod support;

use anyhow::Result;
use inkwell_access::classify::Access;
use inkwell_access::{AccessError, ApiRequest, Classifier, Method, NavigationRequest, NoticeLevel};
use serde_json::json;
use support::Harness;

const AUTH: &str = "Authorization";

fn public_calls() -> Vec<ApiRequest> {
    vec![
        ApiRequest::get("/search").query("keyword", "rust"),
        ApiRequest::get("/article/3/comments"),
        ApiRequest::get("/article/comment/list").query("articleId", 3),
        ApiRequest::post("/article/list"),
        ApiRequest::get("/article/home"),
        ApiRequest::get("/home/article"),
        ApiRequest::get("/article/published"),
        ApiRequest::get("/article/public/detail"),
        ApiRequest::get("/public-detail/3"),
        ApiRequest::get("/article/detail-page"),
        ApiRequest::post("/api/sms/send-code"),
        ApiRequest::post("/user/register-by-phone"),
        ApiRequest::post("/user/login-by-phone"),
        ApiRequest::get("/user/check-phone"),
    ]
}

fn protected_calls() -> Vec<ApiRequest> {
    vec![
        ApiRequest::get("/user/userInfo"),
        ApiRequest::get("/article"),
        ApiRequest::get("/article/detail").query("id", 3),
        ApiRequest::post("/article/3/comment"),
        ApiRequest::post("/article/comment"),
        ApiRequest::post("/comment/add"),
        ApiRequest::get("/category/list"),
        ApiRequest::put("/admin/users/4/ban"),
        ApiRequest::post("/api/email/verify"),
    ]
}

#[tokio::test]
async fn public_calls_never_carry_a_credential() -> Result<()> {
    for harness in [
        Harness::anonymous()?,
        Harness::signed_in("abc")?,
        Harness::signed_in("Bearer abc")?,
    ] {
        for call in public_calls() {
            let spoofed = call.header("authorization", "Bearer forged");
            let _ = harness.api.pipeline().send(spoofed).await;
        }
        for request in harness.transport().requests() {
            assert_eq!(
                request.header_count(AUTH),
                0,
                "{} {} leaked a credential",
                request.method,
                request.path
            );
        }
    }
    Ok(())
}

#[tokio::test]
async fn protected_calls_carry_exactly_one_prefixed_header() -> Result<()> {
    for token in ["abc", "Bearer abc"] {
        let harness = Harness::signed_in(token)?;
        for call in protected_calls() {
            let _ = harness
                .api
                .pipeline()
                .send(call.header("AUTHORIZATION", "Bearer stale"))
                .await;
        }
        for request in harness.transport().requests() {
            assert_eq!(request.header_count(AUTH), 1, "{}", request.path);
            assert_eq!(request.header_value(AUTH), Some("Bearer abc"));
        }
    }
    Ok(())
}

#[tokio::test]
async fn anonymous_protected_calls_go_out_bare() -> Result<()> {
    let harness = Harness::anonymous()?;
    for call in protected_calls() {
        let _ = harness
            .api
            .pipeline()
            .send(call.header("authorization", "Bearer forged"))
            .await;
    }
    assert!(!harness.transport().requests().is_empty());
    assert!(
        harness
            .transport()
            .requests()
            .iter()
            .all(|request| request.header_count(AUTH) == 0)
    );
    Ok(())
}

#[tokio::test]
async fn inbound_interpretation_matches_outbound_classification() -> Result<()> {
    let classifier = Classifier::standard()?;
    let calls = public_calls().into_iter().chain(protected_calls());
    for call in calls {
        let harness = Harness::signed_in("abc")?;
        harness
            .transport()
            .respond(call.method, &call.path, 401, json!({"code": 0, "message": "expired"}));
        let outbound = classifier.classify(&call.path, call.method);
        let err = harness.api.pipeline().send(call.clone()).await.err();
        let cleared = matches!(
            err,
            Some(AccessError::Unauthorized {
                session_cleared: true,
                ..
            })
        );
        assert_eq!(
            cleared,
            outbound == Access::Protected,
            "{} {} disagreed between directions",
            call.method,
            call.path
        );
        assert_eq!(harness.session().is_authenticated(), !cleared);
    }
    Ok(())
}

#[tokio::test]
async fn session_expiry_clears_navigates_and_notifies() -> Result<()> {
    let harness = Harness::signed_in("abc")?;
    harness
        .transport()
        .respond(Method::Get, "/user/collections", 401, json!({"code": 0}));

    let err = harness.api.collections().await.err();
    assert!(matches!(
        err,
        Some(AccessError::Unauthorized {
            session_cleared: true,
            ..
        })
    ));
    assert!(!harness.session().is_authenticated());
    assert_eq!(
        harness.recorder.navigations.borrow().as_slice(),
        &[NavigationRequest::replace("/login")]
    );
    let notices = harness.recorder.notices.borrow();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    Ok(())
}

#[tokio::test]
async fn transport_timeouts_leave_session_alone() -> Result<()> {
    let harness = Harness::signed_in("abc")?;
    harness.transport().time_out(Method::Get, "/user/followers");
    let err = harness.api.followers().await.err();
    assert!(err.as_ref().is_some_and(AccessError::is_transport));
    assert!(harness.session().is_authenticated());
    assert!(harness.recorder.navigations.borrow().is_empty());
    Ok(())
}

#[tokio::test]
async fn requests_are_addressed_under_the_base_path() -> Result<()> {
    let harness = Harness::anonymous()?;
    harness
        .transport()
        .respond(Method::Get, "/category/list", 200, json!({"code": 200, "data": []}));
    let _ = harness.api.list_categories().await?;
    assert_eq!(harness.transport().urls(), vec!["/api/category/list"]);
    Ok(())
}
