mod common;

use axum::http::StatusCode;
use chrono::{Days, NaiveDate, Utc};
use common::{JPEG, TestApp, get, json_request, listing_payload, multipart_request, user};
use serde_json::{Value, json};

fn day(offset: u64) -> NaiveDate {
    Utc::now().date_naive() + Days::new(offset)
}

fn dates(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(|d| d.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

async fn create_dress(app: &TestApp, token: &str) -> String {
    let (status, body) = app
        .send(multipart_request(
            "POST",
            "/api/dresses",
            Some(token),
            &listing_payload("Emerald gown"),
            &[JPEG],
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn blocked_dates_flow_through_detail_check_browse_and_calendar() -> anyhow::Result<()> {
    let app = TestApp::new();
    let owner = user("owner@berkeley.edu");
    let renter = user("renter@berkeley.edu");
    let dress_id = create_dress(&app, &owner.token).await;
    let availability_uri = format!("/api/dresses/{dress_id}/availability");

    let block = json!({
        "start_date": day(10),
        "end_date": day(12),
        "status": "reserved"
    });
    let (status, _) = app
        .send(json_request("POST", &availability_uri, Some(&renter.token), &block))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(json_request("POST", &availability_uri, Some(&owner.token), &block))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["is_available"], false);
    let record_id = body["data"]["id"].as_str().unwrap().to_string();

    let inverted = json!({ "start_date": day(5), "end_date": day(4) });
    let (status, body) = app
        .send(json_request("POST", &availability_uri, Some(&owner.token), &inverted))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "End date must be on or after start date");

    // Detail expands the block day by day.
    let (_, body) = app.send(get(&format!("/api/dresses/{dress_id}"), None)).await;
    assert_eq!(
        dates(&body["data"]["unavailable_dates"]),
        vec![day(10).to_string(), day(11).to_string(), day(12).to_string()]
    );
    assert_eq!(body["data"]["availability"].as_array().map(Vec::len), Some(1));

    // Overlap check and quote.
    let check_uri = |start: NaiveDate, end: NaiveDate| {
        format!("/api/dresses/{dress_id}/availability/check?start={start}&end={end}")
    };
    let (_, body) = app.send(get(&check_uri(day(12), day(14)), None)).await;
    assert_eq!(body["data"]["available"], false);
    assert_eq!(body["data"]["conflicts"].as_array().map(Vec::len), Some(1));

    let (_, body) = app.send(get(&check_uri(day(13), day(16)), None)).await;
    assert_eq!(body["data"]["available"], true);
    assert_eq!(body["data"]["quote"]["days"], 3);
    assert_eq!(body["data"]["quote"]["total"], 60.0);

    // A same-day check still prices one day.
    let (_, body) = app.send(get(&check_uri(day(13), day(13)), None)).await;
    assert_eq!(body["data"]["available"], true);
    assert_eq!(body["data"]["quote"]["days"], 1);
    assert_eq!(body["data"]["quote"]["total"], 20.0);

    // Browse hides the dress for an overlapping window only.
    let browse = |from: NaiveDate, to: NaiveDate| {
        format!("/api/dresses?available_from={from}&available_to={to}")
    };
    let (_, body) = app.send(get(&browse(day(11), day(11)), None)).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
    let (_, body) = app.send(get(&browse(day(1), day(9)), None)).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    // Calendar grid marks the block.
    let month = day(11).format("%Y-%m").to_string();
    let (status, body) = app
        .send(get(&format!("/api/dresses/{dress_id}/calendar?month={month}"), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    let cell = body["data"]["grid"]["days"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["date"] == day(11).to_string())
        .cloned()
        .expect("blocked day in grid");
    assert_eq!(cell["unavailable"], true);
    assert_eq!(cell["disabled"], true);

    // Releasing the record frees the dates.
    let (status, body) = app
        .send(json_request(
            "PUT",
            &format!("/api/availability/{record_id}"),
            Some(&owner.token),
            &json!({ "status": "available", "is_available": true }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (_, body) = app.send(get(&check_uri(day(12), day(14)), None)).await;
    assert_eq!(body["data"]["available"], true);

    let (status, _) = app
        .send(json_request(
            "PUT",
            &format!("/api/availability/{record_id}"),
            Some(&renter.token),
            &json!({ "status": "rented" }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn calendar_select_follows_click_rules() {
    let app = TestApp::new();
    let owner = user("owner@berkeley.edu");
    let dress_id = create_dress(&app, &owner.token).await;
    let (status, _) = app
        .send(json_request(
            "POST",
            &format!("/api/dresses/{dress_id}/availability"),
            Some(&owner.token),
            &json!({ "start_date": day(15), "end_date": day(15), "is_available": false }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let select_uri = format!("/api/dresses/{dress_id}/calendar/select");
    let click = |selected: Vec<NaiveDate>, clicked: NaiveDate| {
        json_request(
            "POST",
            &select_uri,
            None,
            &json!({ "selected": selected, "clicked": clicked }),
        )
    };

    // Blocked and past days are ignored.
    let (_, body) = app.send(click(vec![], day(15))).await;
    assert_eq!(body["data"]["accepted"], false);
    assert_eq!(body["data"]["selection"], json!([]));
    let yesterday = Utc::now().date_naive() - Days::new(1);
    let (_, body) = app.send(click(vec![], yesterday)).await;
    assert_eq!(body["data"]["accepted"], false);

    let (_, body) = app.send(click(vec![], day(10))).await;
    assert_eq!(body["data"]["accepted"], true);
    assert_eq!(dates(&body["data"]["selection"]), vec![day(10).to_string()]);

    // Ten days exceeds the seven-day maximum: restart from the clicked day.
    let (_, body) = app.send(click(vec![day(10)], day(20))).await;
    assert_eq!(dates(&body["data"]["selection"]), vec![day(20).to_string()]);

    // Earlier second click still yields an ordered range.
    let (_, body) = app.send(click(vec![day(20)], day(18))).await;
    assert_eq!(
        dates(&body["data"]["selection"]),
        vec![day(18).to_string(), day(20).to_string()]
    );
    assert_eq!(body["data"]["quote"]["days"], 2);
    assert_eq!(body["data"]["quote"]["total"], 40.0);

    // A complete range resets to the clicked day.
    let (_, body) = app.send(click(vec![day(18), day(20)], day(25))).await;
    assert_eq!(dates(&body["data"]["selection"]), vec![day(25).to_string()]);

    let (status, body) = app
        .send(get(
            &format!("/api/dresses/{dress_id}/calendar?month=2024-13"),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid month '2024-13', expected YYYY-MM");
}

#[tokio::test]
async fn calendar_rejects_dates_beyond_supported_years() {
    let app = TestApp::new();
    let owner = user("owner@berkeley.edu");
    let dress_id = create_dress(&app, &owner.token).await;
    let select_uri = format!("/api/dresses/{dress_id}/calendar/select");

    let (status, body) = app
        .send(json_request(
            "POST",
            &select_uri,
            None,
            &json!({ "selected": [], "clicked": "+262142-12-31" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Date '+262142-12-31' is out of range");

    let (status, _) = app
        .send(json_request(
            "POST",
            &select_uri,
            None,
            &json!({ "selected": ["1800-01-01"], "clicked": day(3) }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The last supported month still renders with navigation links.
    let (status, body) = app
        .send(get(&format!("/api/dresses/{dress_id}/calendar?month=9999-12"), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["next_month"], "10000-01");
    assert_eq!(body["data"]["grid"]["days"].as_array().map(Vec::len), Some(31));
}
