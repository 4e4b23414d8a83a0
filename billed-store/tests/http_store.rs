use billed_core::{BillStatus, DraftFields, KeyValueStorage, MemoryStorage, NewBillDraft, JWT_KEY};
use billed_store::{ApiStore, Attachment, CreateBill, Store, StoreError, UpdateBill};
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn bill_json(id: &str, date: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "date": date,
        "amount": 400,
        "status": status,
        "fileUrl": "https://localhost:3456/images/test.jpg",
        "fileName": "test.jpg",
        "email": "a@a",
        "type": "Hôtel et logement",
        "name": "encore",
        "vat": "80",
        "pct": 20,
        "commentary": "séminaire billed",
        "commentAdmin": "ok"
    })
}

#[tokio::test]
async fn test_list_decodes_bills_and_sends_bearer_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/bills")
                .header("authorization", "Bearer t0k3n");
            then.status(200).json_body(json!([
                bill_json("47qAXb6fIm2zOKkLzMro", "2004-04-04", "pending"),
                bill_json("UIUZtnPQvnbFnB0ozvJh", "2003-03-03", "accepted"),
            ]));
        })
        .await;

    let storage = Arc::new(MemoryStorage::new());
    storage.set_item(JWT_KEY, "t0k3n");
    let store = ApiStore::parse(&server.base_url()).unwrap().with_storage(storage);

    let bills = store.bills().list().await.unwrap();
    mock.assert_async().await;
    assert_eq!(bills.len(), 2);
    assert_eq!(bills[0].date, "2004-04-04");
    assert_eq!(bills[1].status, BillStatus::Accepted);
}

#[tokio::test]
async fn test_get_maps_404_to_http_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/bills/invalid-id");
            then.status(404);
        })
        .await;

    let store = ApiStore::parse(&server.base_url()).unwrap();
    let err = store.bills().get("invalid-id").await.unwrap_err();
    assert_eq!(err, StoreError::http(404));
    assert_eq!(err.to_string(), "404 Not Found");
}

#[tokio::test]
async fn test_list_maps_500_to_http_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/bills");
            then.status(500);
        })
        .await;

    let store = ApiStore::parse(&server.base_url()).unwrap();
    let err = store.bills().list().await.unwrap_err();
    assert_eq!(err.to_string(), "500 Internal Server Error");
}

#[tokio::test]
async fn test_create_uploads_and_returns_key() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/bills");
            then.status(200).json_body(json!({
                "fileUrl": "https://localhost:3456/images/test.jpg",
                "key": "1234"
            }));
        })
        .await;

    let store = ApiStore::parse(&server.base_url()).unwrap();
    let created = store
        .bills()
        .create(CreateBill {
            email: "a@a".into(),
            file: Some(Attachment::new("test.jpg", "image/jpeg", b"image".to_vec())),
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(created.key, "1234");
    assert_eq!(created.file_url.as_deref(), Some("https://localhost:3456/images/test.jpg"));
}

#[tokio::test]
async fn test_update_patches_selected_bill() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PATCH).path("/bills/1234");
            then.status(200).json_body(bill_json("1234", "2022-02-15", "pending"));
        })
        .await;

    let store = ApiStore::parse(&server.base_url()).unwrap();
    let draft = NewBillDraft::from_form(
        &DraftFields { name: "encore", date: "2022-02-15", amount: "400", ..Default::default() },
        "a@a",
    );
    let updated = store
        .bills()
        .update(UpdateBill { selector: "1234".into(), data: draft })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(updated.id, "1234");
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/bills");
            then.status(200).body("not json");
        })
        .await;

    let store = ApiStore::parse(&server.base_url()).unwrap();
    let err = store.bills().list().await.unwrap_err();
    assert!(matches!(err, StoreError::Decode(_)), "got {err:?}");
}
