use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    calendar::{RentalCalendar, Selection, YearMonth, is_supported, parse_day, quote},
    db,
    dto::{
        availability::{
            AvailabilityCheck, AvailabilityCheckQuery, AvailabilityList, CreateAvailabilityRequest,
            UpdateAvailabilityRequest,
        },
        calendar::{CalendarQuery, CalendarView, SelectDateRequest, SelectDateResponse},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner},
    models::{Availability, AvailabilityStatus, Dress, NewAvailability},
    response::{ApiResponse, Meta},
    services::dress_service::find_owned,
    state::AppState,
};

/// Longest stretch a single record contributes to the calendar.
const MAX_BLOCKED_SPAN_DAYS: usize = 366;

/// Every day covered by a blocking record, sorted and deduplicated.
pub fn unavailable_dates(records: &[Availability]) -> Vec<NaiveDate> {
    let mut days = BTreeSet::new();
    for record in records.iter().filter(|r| r.blocks_rental()) {
        let span = record
            .start_date
            .iter_days()
            .take_while(|day| *day <= record.end_date)
            .take(MAX_BLOCKED_SPAN_DAYS);
        days.extend(span);
    }
    days.into_iter().collect()
}

fn check_range(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if end < start {
        return Err(AppError::BadRequest(
            "End date must be on or after start date".into(),
        ));
    }
    Ok(())
}

async fn find_dress(state: &AppState, dress_id: Uuid) -> AppResult<Dress> {
    match db::dresses::get(state.backend.as_ref(), dress_id, None).await? {
        Some(dress) if dress.is_active => Ok(dress),
        _ => Err(AppError::NotFound),
    }
}

pub async fn list_availability(
    state: &AppState,
    dress_id: Uuid,
) -> AppResult<ApiResponse<AvailabilityList>> {
    find_dress(state, dress_id).await?;
    let items = db::availability::list_for_dress(state.backend.as_ref(), dress_id, None).await?;
    Ok(ApiResponse::success("Availability", AvailabilityList { items }, None))
}

pub async fn create_availability(
    state: &AppState,
    user: &AuthUser,
    dress_id: Uuid,
    payload: CreateAvailabilityRequest,
) -> AppResult<ApiResponse<Availability>> {
    find_owned(state, user, dress_id).await?;
    check_range(payload.start_date, payload.end_date)?;

    let status = payload.status.unwrap_or_default();
    let record = NewAvailability {
        dress_id,
        start_date: payload.start_date,
        end_date: payload.end_date,
        is_available: payload
            .is_available
            .unwrap_or(status == AvailabilityStatus::Available),
        renter_id: payload.renter_id,
        status,
    };
    let created = db::availability::create(state.backend.as_ref(), &record, user.token()).await?;

    tracing::info!(
        dress_id = %dress_id,
        availability_id = %created.id,
        status = created.status.as_str(),
        "availability recorded"
    );
    Ok(ApiResponse::success("Availability created", created, Some(Meta::empty())))
}

pub async fn update_availability(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateAvailabilityRequest,
) -> AppResult<ApiResponse<Availability>> {
    let backend = state.backend.as_ref();
    let existing = db::availability::get(backend, id, user.token())
        .await?
        .ok_or(AppError::NotFound)?;
    let dress = db::dresses::get(backend, existing.dress_id, user.token())
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_owner(user, dress.owner_id)?;

    check_range(
        payload.start_date.unwrap_or(existing.start_date),
        payload.end_date.unwrap_or(existing.end_date),
    )?;

    let changes = serde_json::to_value(&payload).map_err(anyhow::Error::from)?;
    if changes.as_object().is_none_or(|fields| fields.is_empty()) {
        return Err(AppError::BadRequest("Nothing to update".into()));
    }

    let updated = db::availability::update(backend, id, changes, user.token()).await?;
    Ok(ApiResponse::success("Availability updated", updated, Some(Meta::empty())))
}

pub async fn check_availability(
    state: &AppState,
    dress_id: Uuid,
    query: AvailabilityCheckQuery,
) -> AppResult<ApiResponse<AvailabilityCheck>> {
    check_range(query.start, query.end)?;
    let dress = find_dress(state, dress_id).await?;
    let conflicts =
        db::availability::conflicts(state.backend.as_ref(), dress_id, query.start, query.end, None)
            .await?;

    // A same-day check is a one-day rental.
    let selection = if query.start == query.end {
        Selection::Single(query.start)
    } else {
        Selection::Range {
            start: query.start,
            end: query.end,
        }
    };
    let check = AvailabilityCheck {
        available: conflicts.is_empty(),
        conflicts,
        quote: quote(dress.price, &selection),
    };
    Ok(ApiResponse::success("Availability check", check, None))
}

async fn load_calendar(state: &AppState, dress: &Dress) -> AppResult<RentalCalendar> {
    let records = db::availability::list_for_dress(state.backend.as_ref(), dress.id, None).await?;
    Ok(RentalCalendar::with_dates(
        unavailable_dates(&records),
        state.config.min_rental_days,
        state.config.max_rental_days,
        Utc::now().date_naive(),
    ))
}

fn ensure_supported(date: NaiveDate) -> AppResult<NaiveDate> {
    if is_supported(date) {
        Ok(date)
    } else {
        Err(AppError::BadRequest(format!("Date '{date}' is out of range")))
    }
}

fn parse_month(raw: Option<&str>) -> AppResult<Option<YearMonth>> {
    raw.map(|m| {
        YearMonth::parse(m)
            .filter(|month| is_supported(month.first_day()))
            .ok_or_else(|| AppError::BadRequest(format!("Invalid month '{m}', expected YYYY-MM")))
    })
    .transpose()
}

fn parse_selection(raw: Option<&str>) -> AppResult<Selection> {
    let dates = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            parse_day(s)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid date '{s}'")))
                .and_then(ensure_supported)
        })
        .collect::<AppResult<Vec<_>>>()?;
    Selection::from_dates(&dates)
        .ok_or_else(|| AppError::BadRequest("A selection holds at most two dates".into()))
}

pub async fn calendar_view(
    state: &AppState,
    dress_id: Uuid,
    query: CalendarQuery,
) -> AppResult<ApiResponse<CalendarView>> {
    let dress = find_dress(state, dress_id).await?;
    let mut calendar = load_calendar(state, &dress).await?;

    if let Some(month) = parse_month(query.month.as_deref())? {
        calendar.show_month(month);
    }
    calendar.restore(parse_selection(query.selected.as_deref())?);

    let selection = calendar.selection();
    let view = CalendarView {
        grid: calendar.grid(),
        prev_month: calendar.month().prev().to_string(),
        next_month: calendar.month().next().to_string(),
        selection: selection.dates(),
        quote: quote(dress.price, &selection),
        min_rental_days: state.config.min_rental_days,
        max_rental_days: state.config.max_rental_days,
    };
    Ok(ApiResponse::success("Calendar", view, None))
}

pub async fn select_date(
    state: &AppState,
    dress_id: Uuid,
    payload: SelectDateRequest,
) -> AppResult<ApiResponse<SelectDateResponse>> {
    ensure_supported(payload.clicked)?;
    for date in &payload.selected {
        ensure_supported(*date)?;
    }
    let dress = find_dress(state, dress_id).await?;
    let mut calendar = load_calendar(state, &dress).await?;

    let previous = Selection::from_dates(&payload.selected)
        .ok_or_else(|| AppError::BadRequest("A selection holds at most two dates".into()))?;
    calendar.restore(previous);
    let month = parse_month(payload.month.as_deref())?
        .unwrap_or_else(|| YearMonth::containing(payload.clicked));
    calendar.show_month(month);

    let accepted = calendar.click(payload.clicked).is_some();
    if !accepted {
        tracing::debug!(dress_id = %dress_id, clicked = %payload.clicked, "ignored click on disabled day");
    }

    let selection = calendar.selection();
    let response = SelectDateResponse {
        accepted,
        selection: selection.dates(),
        quote: quote(dress.price, &selection),
        grid: calendar.grid(),
    };
    Ok(ApiResponse::success("Selection", response, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(start: &str, end: &str, status: AvailabilityStatus, is_available: bool) -> Availability {
        Availability {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            dress_id: Uuid::new_v4(),
            start_date: parse_day(start).unwrap(),
            end_date: parse_day(end).unwrap(),
            is_available,
            renter_id: None,
            status,
        }
    }

    #[test]
    fn blocking_records_expand_to_days() {
        let records = vec![
            record("2024-03-14", "2024-03-16", AvailabilityStatus::Reserved, true),
            record("2024-03-16", "2024-03-17", AvailabilityStatus::Available, false),
            record("2024-03-20", "2024-03-25", AvailabilityStatus::Available, true),
        ];
        let days: Vec<String> = unavailable_dates(&records)
            .iter()
            .map(|d| d.to_string())
            .collect();
        assert_eq!(days, vec!["2024-03-14", "2024-03-15", "2024-03-16", "2024-03-17"]);
    }

    #[test]
    fn inverted_record_contributes_nothing() {
        let records = vec![record("2024-03-14", "2024-03-10", AvailabilityStatus::Rented, false)];
        assert!(unavailable_dates(&records).is_empty());
    }

    #[test]
    fn long_blocks_are_capped() {
        let records = vec![record("2024-01-01", "2030-01-01", AvailabilityStatus::Unavailable, false)];
        assert_eq!(unavailable_dates(&records).len(), MAX_BLOCKED_SPAN_DAYS);
    }

    #[test]
    fn selection_query_parses_up_to_two_dates() {
        assert_eq!(parse_selection(None).unwrap(), Selection::Empty);
        assert_eq!(
            parse_selection(Some("2024-03-20,2024-03-18")).unwrap(),
            Selection::Range {
                start: parse_day("2024-03-18").unwrap(),
                end: parse_day("2024-03-20").unwrap(),
            }
        );
        assert!(parse_selection(Some("2024-03-20,2024-03-21,2024-03-22")).is_err());
        assert!(parse_selection(Some("soon")).is_err());
    }
}
