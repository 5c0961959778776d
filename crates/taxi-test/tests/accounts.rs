//! Login, logout and the visit counter.

use taxi_db::drivers;
use taxi_test::{TestApp, TEST_PASSWORD};

#[tokio::test]
async fn test_login_redirects_to_next() {
    let app = TestApp::new().await.unwrap();
    app.create_driver("driver", "DRV12345").await.unwrap();
    let mut client = app.client();

    let response = client.get("/cars/").await;
    assert_eq!(response.location(), Some("/accounts/login/?next=/cars/"));

    let response = client.get("/accounts/login/?next=/cars/").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.context_value("next").unwrap(), "/cars/");

    let response = client
        .post(
            "/accounts/login/",
            &[("username", "driver"), ("password", TEST_PASSWORD), ("next", "/cars/")],
        )
        .await;
    assert_eq!(response.status_code(), 302);
    assert_eq!(response.location(), Some("/cars/"));

    assert_eq!(client.get("/cars/").await.status_code(), 200);
    let driver = drivers::get_by_username(app.db(), "driver")
        .await
        .unwrap()
        .unwrap();
    assert!(driver.last_login.is_some());
}

#[tokio::test]
async fn test_login_defaults_to_home() {
    let app = TestApp::new().await.unwrap();
    app.create_driver("driver", "DRV12345").await.unwrap();
    let mut client = app.client();
    let response = client
        .post(
            "/accounts/login/",
            &[
                ("username", "driver"),
                ("password", TEST_PASSWORD),
                ("next", "https://elsewhere.example/"),
            ],
        )
        .await;
    assert_eq!(response.location(), Some("/"));
}

#[tokio::test]
async fn test_login_ignores_backslash_next() {
    let app = TestApp::new().await.unwrap();
    app.create_driver("driver", "DRV12345").await.unwrap();
    let mut client = app.client();
    let response = client
        .post(
            "/accounts/login/",
            &[
                ("username", "driver"),
                ("password", TEST_PASSWORD),
                ("next", "/\\evil.example/"),
            ],
        )
        .await;
    assert_eq!(response.status_code(), 302);
    assert_eq!(response.location(), Some("/"));
}

#[tokio::test]
async fn test_wrong_password_rerenders_login() {
    let app = TestApp::new().await.unwrap();
    app.create_driver("driver", "DRV12345").await.unwrap();
    let mut client = app.client();
    let response = client
        .post(
            "/accounts/login/",
            &[("username", "driver"), ("password", "wrong-password")],
        )
        .await;
    assert_eq!(response.status_code(), 200);
    assert!(response.contains("Please enter a correct username and password."));
    assert_eq!(client.get("/").await.status_code(), 302);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new().await.unwrap();
    let driver = app.create_driver("driver", "DRV12345").await.unwrap();
    let mut client = app.login_client(&driver).await.unwrap();
    assert_eq!(client.get("/").await.status_code(), 200);

    let response = client.post("/accounts/logout/", &[]).await;
    assert_eq!(response.status_code(), 302);
    assert_eq!(response.location(), Some("/accounts/login/"));
    assert_eq!(client.get("/").await.status_code(), 302);
}

#[tokio::test]
async fn test_index_counts_and_visits() {
    let app = TestApp::new().await.unwrap();
    let driver = app.create_driver("driver", "DRV12345").await.unwrap();
    let mut client = app.login_client(&driver).await.unwrap();

    let response = client.get("/").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.context_value("num_drivers").unwrap(), 1);
    assert_eq!(response.context_value("num_cars").unwrap(), 0);
    assert_eq!(response.context_value("num_manufacturers").unwrap(), 0);
    assert_eq!(response.context_value("num_visits").unwrap(), 1);

    let response = client.get("/").await;
    assert_eq!(response.context_value("num_visits").unwrap(), 2);
    assert!(response.contains("You have visited this page 2 times."));
}
