mod common;

use axum::http::StatusCode;
use common::{JPEG, TestApp, delete, get, listing_payload, multipart_request, user};
use dress_rental::db;
use serde_json::json;

// Owner lists a dress, a renter browses it, the owner edits and finally removes it.
#[tokio::test]
async fn create_browse_edit_and_soft_delete() -> anyhow::Result<()> {
    let app = TestApp::new();
    let owner = user("owner@berkeley.edu");
    let other = user("other@berkeley.edu");

    let (status, body) = app
        .send(multipart_request(
            "POST",
            "/api/dresses",
            Some(&owner.token),
            &listing_payload("Black slip dress"),
            &[JPEG, ("images", "back.PNG", "image/png", &b"png-bytes"[..])],
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let dress_id = body["data"]["id"].as_str().expect("id").to_string();
    assert_eq!(body["data"]["owner_id"], owner.id.to_string());
    assert_eq!(body["data"]["price"], 20.0);

    let urls = body["data"]["image_url"].as_array().expect("urls").clone();
    assert_eq!(urls.len(), 2);
    let first = urls[0].as_str().unwrap();
    assert!(first.starts_with("http://localhost:54321/storage/v1/object/public/dresses/dress-images/"));
    assert!(first.ends_with(".jpg"));
    assert!(urls[1].as_str().unwrap().ends_with(".png"));
    assert_eq!(app.backend.object_count().await, 2);

    // Browse with filters.
    let (status, body) = app
        .send(get("/api/dresses?types=Party&sizes=S,M&max_price=25", None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["meta"]["total"], 1);

    let (_, body) = app.send(get("/api/dresses?types=Formal", None)).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    let (_, body) = app.send(get("/api/dresses?q=SLIP", None)).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    // Detail carries the rental bounds.
    let (status, body) = app.send(get(&format!("/api/dresses/{dress_id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dress"]["title"], "Black slip dress");
    assert_eq!(body["data"]["min_rental_days"], 1);
    assert!(body["data"]["owner"].is_null());

    // Only the owner gets the edit form.
    let edit_uri = format!("/api/dresses/{dress_id}/edit");
    let (status, _) = app.send(get(&edit_uri, Some(&other.token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app.send(get(&edit_uri, Some(&owner.token))).await;
    assert_eq!(status, StatusCode::OK);
    let mut form = body["data"].clone();
    assert_eq!(form["pickup_location"], "Sproul Plaza");

    // Keep the second photo, add a new one, switch to a custom color.
    form["existing_image_urls"] = json!([urls[1]]);
    form["colors"] = json!(["Black", "Other"]);
    form["custom_color"] = json!("Teal");
    form["price"] = json!(22.5);
    let (status, body) = app
        .send(multipart_request(
            "PUT",
            &format!("/api/dresses/{dress_id}"),
            Some(&owner.token),
            &form,
            &[JPEG],
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let images = body["data"]["image_url"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0], urls[1]);
    assert_eq!(body["data"]["colors"], json!(["Black", "Teal"]));
    assert_eq!(body["data"]["price"], 22.5);

    // Soft delete hides it from browse but keeps the row.
    let (status, _) = app
        .send(delete(&format!("/api/dresses/{dress_id}"), Some(&other.token)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .send(delete(&format!("/api/dresses/{dress_id}"), Some(&owner.token)))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.send(get("/api/dresses", None)).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
    let (status, _) = app.send(get(&format!("/api/dresses/{dress_id}"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let rows = app.backend.rows(db::DRESSES).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["is_active"], false);
    Ok(())
}

#[tokio::test]
async fn invalid_form_uploads_nothing() {
    let app = TestApp::new();
    let owner = user("owner@berkeley.edu");

    let mut payload = listing_payload("No types");
    payload["types"] = json!([]);
    let (status, body) = app
        .send(multipart_request("POST", "/api/dresses", Some(&owner.token), &payload, &[JPEG]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please select at least one dress type");

    let (status, body) = app
        .send(multipart_request(
            "POST",
            "/api/dresses",
            Some(&owner.token),
            &listing_payload("No photos"),
            &[],
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please upload at least one image");

    // A non-image anywhere in the batch is caught before the first upload.
    let (status, body) = app
        .send(multipart_request(
            "POST",
            "/api/dresses",
            Some(&owner.token),
            &listing_payload("Mixed files"),
            &[JPEG, ("images", "notes.pdf", "application/pdf", &b"%PDF"[..])],
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "File must be an image");

    assert_eq!(app.backend.object_count().await, 0);
    assert!(app.backend.rows(db::DRESSES).await.is_empty());
}

#[tokio::test]
async fn failed_upload_aborts_the_submission() {
    let app = TestApp::new();
    let owner = user("owner@berkeley.edu");
    app.backend.fail_uploads_after(1).await;

    let (status, body) = app
        .send(multipart_request(
            "POST",
            "/api/dresses",
            Some(&owner.token),
            &listing_payload("Two photos"),
            &[JPEG, JPEG],
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["message"].as_str().unwrap().starts_with("Image upload failed"));

    // The first photo stays in storage; no listing row is written.
    assert_eq!(app.backend.object_count().await, 1);
    assert!(app.backend.rows(db::DRESSES).await.is_empty());
}

#[tokio::test]
async fn browse_pages_and_sorts() {
    let app = TestApp::new();
    let owner = user("owner@berkeley.edu");

    for (title, price) in [("Alpha", "30"), ("Bravo", "10"), ("Charlie", "20")] {
        let mut payload = listing_payload(title);
        payload["price"] = json!(price);
        let (status, _) = app
            .send(multipart_request("POST", "/api/dresses", Some(&owner.token), &payload, &[JPEG]))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = app
        .send(get("/api/dresses?sort_by=price&sort_order=asc&per_page=2", None))
        .await;
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Bravo", "Charlie"]);
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(body["meta"]["total_pages"], 2);

    let (_, body) = app
        .send(get("/api/dresses?sort_by=title&sort_order=desc&page=2&per_page=2", None))
        .await;
    assert_eq!(body["data"][0]["title"], "Alpha");

    // Pages past the end are empty, however far out.
    let (status, body) = app
        .send(get("/api/dresses?page=9223372036854775807", None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["total"], 3);
}

#[tokio::test]
async fn edit_keeps_only_images_already_on_the_listing() {
    let app = TestApp::new();
    let owner = user("owner@berkeley.edu");

    let (status, body) = app
        .send(multipart_request(
            "POST",
            "/api/dresses",
            Some(&owner.token),
            &listing_payload("Lilac midi"),
            &[JPEG],
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let dress_id = body["data"]["id"].as_str().unwrap().to_string();
    let own_url = body["data"]["image_url"][0].clone();
    let foreign = "https://elsewhere.example/stolen.jpg";
    let update_uri = format!("/api/dresses/{dress_id}");

    // A URL from somewhere else does not count as a retained image.
    let mut form = listing_payload("Lilac midi, edited");
    form["existing_image_urls"] = json!([foreign]);
    let (status, body) = app
        .send(multipart_request("PUT", &update_uri, Some(&owner.token), &form, &[]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please upload at least one image");

    let rows = app.backend.rows(db::DRESSES).await;
    assert_eq!(rows[0]["title"], "Lilac midi");
    assert_eq!(rows[0]["image_url"], json!([own_url]));

    form["existing_image_urls"] = json!([foreign, own_url]);
    let (status, body) = app
        .send(multipart_request("PUT", &update_uri, Some(&owner.token), &form, &[]))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["image_url"], json!([own_url]));
    assert_eq!(body["data"]["title"], "Lilac midi, edited");
    assert_eq!(app.backend.object_count().await, 1);
}
