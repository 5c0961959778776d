//! Manufacturer and car create/update/delete pages.

use taxi_db::cars::{self, CarData};
use taxi_db::manufacturers::{self, ManufacturerData};
use taxi_test::{TestApp, TestClient};

async fn logged_in() -> (TestApp, TestClient) {
    let app = TestApp::new().await.unwrap();
    let user = app.create_driver("user", "USR12345").await.unwrap();
    let client = app.login_client(&user).await.unwrap();
    (app, client)
}

#[tokio::test]
async fn test_manufacturer_crud() {
    let (app, mut client) = logged_in().await;

    let response = client
        .post("/manufacturers/create/", &[("name", "Tesla"), ("country", "USA")])
        .await;
    assert_eq!(response.status_code(), 302);
    assert_eq!(response.location(), Some("/manufacturers/"));
    let tesla = manufacturers::list(app.db(), &Default::default())
        .await
        .unwrap()
        .remove(0);
    assert_eq!(tesla.to_string(), "Tesla USA");

    let response = client
        .post(
            &format!("/manufacturers/{}/update/", tesla.id),
            &[("name", "Tesla"), ("country", "United States")],
        )
        .await;
    assert_eq!(response.status_code(), 302);
    assert_eq!(
        manufacturers::get(app.db(), tesla.id).await.unwrap().country,
        "United States"
    );

    let response = client
        .get(&format!("/manufacturers/{}/delete/", tesla.id))
        .await;
    assert!(response.contains("Are you sure you want to delete Tesla United States?"));

    let response = client
        .post(&format!("/manufacturers/{}/delete/", tesla.id), &[])
        .await;
    assert_eq!(response.status_code(), 302);
    assert_eq!(manufacturers::count(app.db()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_manufacturer_form_errors() {
    let (app, mut client) = logged_in().await;
    client
        .post("/manufacturers/create/", &[("name", "Tesla"), ("country", "USA")])
        .await;

    let response = client
        .post("/manufacturers/create/", &[("name", "Tesla"), ("country", "USA")])
        .await;
    assert_eq!(response.status_code(), 200);
    assert!(response.contains("Manufacturer with this Name already exists."));

    let response = client
        .post("/manufacturers/create/", &[("name", ""), ("country", "USA")])
        .await;
    assert_eq!(response.status_code(), 200);
    assert!(response.contains("This field is required."));
    assert_eq!(manufacturers::count(app.db()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_car_crud_with_drivers() {
    let (app, mut client) = logged_in().await;
    let manufacturer = manufacturers::create(
        app.db(),
        &ManufacturerData {
            name: "Ford".to_string(),
            country: "USA".to_string(),
        },
    )
    .await
    .unwrap();
    let first = app.create_driver("first", "FST12345").await.unwrap();
    let second = app.create_driver("second", "SND12345").await.unwrap();
    let manufacturer_id = manufacturer.id.to_string();
    let first_id = first.id.to_string();
    let second_id = second.id.to_string();

    let response = client.get("/cars/create/").await;
    assert!(response.contains("Ford USA"));

    let response = client
        .post(
            "/cars/create/",
            &[
                ("model", "Focus"),
                ("manufacturer", manufacturer_id.as_str()),
                ("drivers", first_id.as_str()),
                ("drivers", second_id.as_str()),
            ],
        )
        .await;
    assert_eq!(response.status_code(), 302);
    assert_eq!(response.location(), Some("/cars/"));
    let car = cars::list(app.db(), &Default::default())
        .await
        .unwrap()
        .remove(0);
    let mut ids = cars::driver_ids(app.db(), car.id).await.unwrap();
    ids.sort_unstable();
    assert_eq!(ids, vec![first.id, second.id]);

    let response = client
        .post(
            &format!("/cars/{}/update/", car.id),
            &[("model", "Mondeo"), ("manufacturer", manufacturer_id.as_str())],
        )
        .await;
    assert_eq!(response.status_code(), 302);
    assert_eq!(cars::get(app.db(), car.id).await.unwrap().model, "Mondeo");
    assert!(cars::driver_ids(app.db(), car.id).await.unwrap().is_empty());

    let response = client
        .post(&format!("/cars/{}/delete/", car.id), &[])
        .await;
    assert_eq!(response.status_code(), 302);
    assert_eq!(cars::count(app.db()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_car_form_rejects_unknown_manufacturer() {
    let (app, mut client) = logged_in().await;
    let response = client
        .post("/cars/create/", &[("model", "Focus"), ("manufacturer", "42")])
        .await;
    assert_eq!(response.status_code(), 200);
    assert!(response.contains("Select a valid choice."));
    assert_eq!(cars::count(app.db()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_deleting_manufacturer_removes_its_cars() {
    let (app, mut client) = logged_in().await;
    let manufacturer = manufacturers::create(
        app.db(),
        &ManufacturerData {
            name: "Ford".to_string(),
            country: "USA".to_string(),
        },
    )
    .await
    .unwrap();
    cars::create(
        app.db(),
        &CarData {
            model: "Focus".to_string(),
            manufacturer_id: manufacturer.id,
            driver_ids: vec![],
        },
    )
    .await
    .unwrap();
    client
        .post(&format!("/manufacturers/{}/delete/", manufacturer.id), &[])
        .await;
    assert_eq!(cars::count(app.db()).await.unwrap(), 0);
}
