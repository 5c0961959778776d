//! Every taxi page needs a logged-in driver.

use taxi_db::cars::{self, CarData};
use taxi_db::manufacturers::{self, ManufacturerData};
use taxi_test::TestApp;

async fn seeded_app() -> TestApp {
    let app = TestApp::new().await.unwrap();
    let manufacturer = manufacturers::create(
        app.db(),
        &ManufacturerData {
            name: "test name".to_string(),
            country: "test country".to_string(),
        },
    )
    .await
    .unwrap();
    app.create_driver("test_user", "TST12345").await.unwrap();
    cars::create(
        app.db(),
        &CarData {
            model: "test model".to_string(),
            manufacturer_id: manufacturer.id,
            driver_ids: vec![],
        },
    )
    .await
    .unwrap();
    app
}

#[tokio::test]
async fn test_main_pages_need_login() {
    let app = seeded_app().await;
    let mut client = app.client();
    for path in [
        "/",
        "/manufacturers/",
        "/manufacturers/create/",
        "/cars/",
        "/cars/create/",
        "/drivers/",
        "/drivers/create/",
    ] {
        let response = client.get(path).await;
        assert_ne!(response.status_code(), 200, "{path}");
        assert_eq!(response.status_code(), 302, "{path}");
        assert_eq!(
            response.location(),
            Some(format!("/accounts/login/?next={path}").as_str())
        );
    }
}

#[tokio::test]
async fn test_pages_with_pk_need_login() {
    let app = seeded_app().await;
    let mut client = app.client();
    for path in [
        "/manufacturers/1/update/",
        "/manufacturers/1/delete/",
        "/cars/1/",
        "/cars/1/update/",
        "/cars/1/delete/",
        "/drivers/1/",
        "/drivers/1/update/",
        "/drivers/1/delete/",
        "/cars/1/toggle-assign/",
    ] {
        let response = client.get(path).await;
        assert_ne!(response.status_code(), 200, "{path}");
    }
}

#[tokio::test]
async fn test_anonymous_post_changes_nothing() {
    let app = seeded_app().await;
    let mut client = app.client();

    let response = client.post("/cars/1/toggle-assign/", &[]).await;
    assert_eq!(response.status_code(), 302);
    assert!(cars::drivers(app.db(), 1).await.unwrap().is_empty());

    let response = client.post("/manufacturers/1/delete/", &[]).await;
    assert_eq!(response.status_code(), 302);
    assert_eq!(manufacturers::count(app.db()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_logged_in_pages_render() {
    let app = seeded_app().await;
    let driver = app.create_driver("viewer", "VWR12345").await.unwrap();
    let mut client = app.login_client(&driver).await.unwrap();
    for path in [
        "/",
        "/manufacturers/",
        "/manufacturers/create/",
        "/manufacturers/1/update/",
        "/manufacturers/1/delete/",
        "/cars/",
        "/cars/create/",
        "/cars/1/",
        "/cars/1/update/",
        "/cars/1/delete/",
        "/drivers/",
        "/drivers/create/",
        "/drivers/1/",
        "/drivers/1/update/",
        "/drivers/1/delete/",
    ] {
        let response = client.get(path).await;
        assert_eq!(response.status_code(), 200, "{path}");
    }
}

#[tokio::test]
async fn test_missing_objects_are_404() {
    let app = seeded_app().await;
    let driver = app.create_driver("viewer", "VWR12345").await.unwrap();
    let mut client = app.login_client(&driver).await.unwrap();
    for path in [
        "/manufacturers/99/update/",
        "/cars/99/",
        "/cars/99/delete/",
        "/drivers/99/",
        "/drivers/99/update/",
    ] {
        assert_eq!(client.get(path).await.status_code(), 404, "{path}");
    }
}
