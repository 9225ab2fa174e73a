//! Request-to-entity mapping.
//!
//! Every mapping validates the raw request first and collects all messages.
//! Conversion runs only on a clean pass; a conversion failure at that point is
//! a `Mapping` error, not a client validation error.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::api::rest::dto::{CreateSubscriptionReq, TotalQuery, UpdateSubscriptionReq};
use crate::contract::model::{NewSubscription, SubscriptionPatch, TotalFilter};
use crate::domain::error::DomainError;
use crate::domain::month_year::parse_month_year;
use crate::domain::validator::Validator;

pub const MAX_SERVICE_NAME_LEN: usize = 255;

fn invalid_start(raw: &str) -> String {
    format!("Invalid start_date format. Expected MM-YYYY (e.g., 01-2025). Got: {raw}")
}

fn invalid_end(raw: &str) -> String {
    format!("Invalid end_date format. Expected MM-YYYY (e.g., 12-2025). Got: {raw}")
}

fn end_before_start(end: &str, start: &str) -> String {
    format!("end_date must be after start_date. Got: end_date={end}, start_date={start}")
}

fn parse_uuid(raw: &str, field: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw).map_err(|e| DomainError::mapping(format!("failed to parse {field}: {e}")))
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, DomainError> {
    parse_month_year(raw).map_err(|e| DomainError::mapping(format!("failed to parse {field}: {e}")))
}

fn parse_price(raw: i64) -> Result<i32, DomainError> {
    i32::try_from(raw).map_err(|e| DomainError::mapping(format!("failed to parse price: {e}")))
}

pub fn to_new_subscription(req: &CreateSubscriptionReq) -> Result<NewSubscription, DomainError> {
    // An empty end_date means "not provided".
    let end_raw = req.end_date.as_deref().filter(|s| !s.is_empty());

    let mut v = Validator::new();
    v.check_string(&req.service_name, "service_name")
        .is_min(1)
        .is_max(MAX_SERVICE_NAME_LEN);
    v.check_string(&req.user_id, "user_id").is_uuid();
    v.check_number(req.price, "price").is_min(0).is_max(i32::MAX);

    let start = parse_month_year(&req.start_date).ok();
    if start.is_none() {
        v.add_error(invalid_start(&req.start_date));
    }
    if let Some(raw) = end_raw {
        match parse_month_year(raw) {
            Err(_) => v.add_error(invalid_end(raw)),
            Ok(end) if start.is_some_and(|s| end < s) => {
                v.add_error(end_before_start(raw, &req.start_date))
            }
            Ok(_) => {}
        }
    }
    v.into_result()?;

    Ok(NewSubscription {
        service_name: req.service_name.clone(),
        price: parse_price(req.price)?,
        user_id: parse_uuid(&req.user_id, "user_id")?,
        start_date: parse_date(&req.start_date, "start_date")?,
        end_date: end_raw.map(|raw| parse_date(raw, "end_date")).transpose()?,
    })
}

pub fn to_patch(req: &UpdateSubscriptionReq) -> Result<SubscriptionPatch, DomainError> {
    let mut v = Validator::new();
    v.check_string(&req.id, "id").is_uuid();

    if let Some(name) = &req.service_name {
        v.check_string(name, "service_name")
            .is_min(1)
            .is_max(MAX_SERVICE_NAME_LEN);
    }
    if let Some(price) = req.price {
        v.check_number(price, "price").is_min(0).is_max(i32::MAX);
    }
    if let Some(user_id) = &req.user_id {
        v.check_string(user_id, "user_id").is_uuid();
    }

    let mut start = None;
    if let Some(raw) = &req.start_date {
        match parse_month_year(raw) {
            Ok(d) => start = Some(d),
            Err(_) => v.add_error(invalid_start(raw)),
        }
    }
    if let Some(Some(raw)) = &req.end_date {
        match parse_month_year(raw) {
            Err(_) => v.add_error(invalid_end(raw)),
            Ok(end) if start.is_some_and(|s| end < s) => {
                let start_raw = req.start_date.as_deref().unwrap_or_default();
                v.add_error(end_before_start(raw, start_raw))
            }
            Ok(_) => {}
        }
    }
    v.into_result()?;

    let end_date = match &req.end_date {
        None => None,
        Some(None) => Some(None),
        Some(Some(raw)) => Some(Some(parse_date(raw, "end_date")?)),
    };

    Ok(SubscriptionPatch {
        id: parse_uuid(&req.id, "id")?,
        service_name: req.service_name.clone(),
        price: req.price.map(parse_price).transpose()?,
        user_id: req
            .user_id
            .as_deref()
            .map(|raw| parse_uuid(raw, "user_id"))
            .transpose()?,
        start_date: req
            .start_date
            .as_deref()
            .map(|raw| parse_date(raw, "start_date"))
            .transpose()?,
        end_date,
    })
}

/// Empty query values count as absent.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

pub fn to_total_filter(query: &TotalQuery) -> Result<TotalFilter, DomainError> {
    let start_raw = query.start.as_deref().unwrap_or_default();
    let end_raw = query.end.as_deref().unwrap_or_default();
    let user_id = non_empty(&query.user_id);
    let service_name = non_empty(&query.service_name);

    let mut v = Validator::new();
    let start = parse_month_year(start_raw).ok();
    if start.is_none() {
        v.add_error("Please provide start param in next format: mm-yyyy");
    }
    let end = parse_month_year(end_raw).ok();
    if end.is_none() {
        v.add_error("Please provide end param in next format: mm-yyyy");
    }
    if let (Some(s), Some(e)) = (start, end) {
        if e < s {
            v.add_error(format!(
                "end must be after start. Got: end={end_raw}, start={start_raw}"
            ));
        }
    }
    if let Some(raw) = user_id {
        v.check_string(raw, "user_id").is_uuid();
    }
    if let Some(raw) = service_name {
        v.check_string(raw, "service_name").is_max(MAX_SERVICE_NAME_LEN);
    }
    v.into_result()?;

    Ok(TotalFilter {
        start: parse_date(start_raw, "start")?,
        end: parse_date(end_raw, "end")?,
        user_id: user_id.map(|raw| parse_uuid(raw, "user_id")).transpose()?,
        service_name: service_name.map(str::to_owned),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: &str = "60601fee-2bf1-4721-ae6f-7636e79a0cba";

    fn create_req() -> CreateSubscriptionReq {
        CreateSubscriptionReq {
            service_name: "Yandex Plus".into(),
            price: 400,
            user_id: USER.into(),
            start_date: "01-2025".into(),
            end_date: None,
        }
    }

    fn validation_errors(e: DomainError) -> Vec<String> {
        match e {
            DomainError::Validation { errors } => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_maps_to_open_ended_entity() {
        let new = to_new_subscription(&create_req()).unwrap();
        assert_eq!(new.service_name, "Yandex Plus");
        assert_eq!(new.price, 400);
        assert_eq!(new.user_id, Uuid::parse_str(USER).unwrap());
        assert_eq!(new.start_date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(new.end_date, None);
    }

    #[test]
    fn create_treats_empty_end_date_as_absent() {
        let req = CreateSubscriptionReq {
            end_date: Some(String::new()),
            ..create_req()
        };
        assert_eq!(to_new_subscription(&req).unwrap().end_date, None);
    }

    #[test]
    fn create_rejects_end_before_start() {
        let req = CreateSubscriptionReq {
            start_date: "02-2025".into(),
            end_date: Some("01-2025".into()),
            ..create_req()
        };
        let errors = validation_errors(to_new_subscription(&req).unwrap_err());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("02-2025"));
        assert!(errors[0].contains("01-2025"));
    }

    #[test]
    fn create_collects_every_problem() {
        let req = CreateSubscriptionReq {
            service_name: String::new(),
            price: -1,
            user_id: "nope".into(),
            start_date: "2025-01".into(),
            end_date: Some("13-2025".into()),
        };
        let errors = validation_errors(to_new_subscription(&req).unwrap_err());
        assert_eq!(
            errors,
            vec![
                "[service_name] - Min required length is 1, Provided: 0",
                "[user_id] - Invalid uuid",
                "[price] - Min required: 0, Provided: -1",
                "Invalid start_date format. Expected MM-YYYY (e.g., 01-2025). Got: 2025-01",
                "Invalid end_date format. Expected MM-YYYY (e.g., 12-2025). Got: 13-2025",
            ]
        );
    }

    #[test]
    fn create_rejects_price_beyond_column_range() {
        let req = CreateSubscriptionReq {
            price: i64::from(i32::MAX) + 1,
            ..create_req()
        };
        let errors = validation_errors(to_new_subscription(&req).unwrap_err());
        assert!(errors[0].starts_with("[price] - Max available"));
    }

    #[test]
    fn create_counts_name_in_characters() {
        let req = CreateSubscriptionReq {
            service_name: "я".repeat(MAX_SERVICE_NAME_LEN),
            ..create_req()
        };
        assert!(to_new_subscription(&req).is_ok());
    }

    #[test]
    fn patch_with_price_only() {
        let req = UpdateSubscriptionReq {
            id: USER.into(),
            price: Some(500),
            ..Default::default()
        };
        let patch = to_patch(&req).unwrap();
        assert_eq!(patch.price, Some(500));
        assert!(patch.service_name.is_none());
        assert!(patch.end_date.is_none());
        assert!(!patch.is_empty());
    }

    #[test]
    fn patch_requires_valid_id() {
        let req = UpdateSubscriptionReq {
            id: "42".into(),
            price: Some(1),
            ..Default::default()
        };
        let errors = validation_errors(to_patch(&req).unwrap_err());
        assert_eq!(errors, vec!["[id] - Invalid uuid"]);
    }

    #[test]
    fn patch_null_end_date_clears() {
        let req = UpdateSubscriptionReq {
            id: USER.into(),
            end_date: Some(None),
            ..Default::default()
        };
        assert_eq!(to_patch(&req).unwrap().end_date, Some(None));
    }

    #[test]
    fn patch_empty_end_date_is_invalid() {
        let req = UpdateSubscriptionReq {
            id: USER.into(),
            end_date: Some(Some(String::new())),
            ..Default::default()
        };
        let errors = validation_errors(to_patch(&req).unwrap_err());
        assert!(errors[0].starts_with("Invalid end_date format"));
    }

    #[test]
    fn patch_cross_checks_only_when_both_dates_present() {
        let only_end = UpdateSubscriptionReq {
            id: USER.into(),
            end_date: Some(Some("01-2020".into())),
            ..Default::default()
        };
        assert!(to_patch(&only_end).is_ok());

        let both = UpdateSubscriptionReq {
            start_date: Some("02-2020".into()),
            ..only_end
        };
        let errors = validation_errors(to_patch(&both).unwrap_err());
        assert_eq!(
            errors,
            vec!["end_date must be after start_date. Got: end_date=01-2020, start_date=02-2020"]
        );
    }

    #[test]
    fn patch_start_date_only_keeps_end_date_untouched() {
        let req = UpdateSubscriptionReq {
            id: USER.into(),
            start_date: Some("03-2025".into()),
            ..Default::default()
        };
        let patch = to_patch(&req).unwrap();
        assert_eq!(patch.start_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(patch.end_date, None);
    }

    #[test]
    fn total_filter_parses_optional_parts() {
        let q = TotalQuery {
            start: Some("01-2025".into()),
            end: Some("12-2025".into()),
            user_id: Some(USER.into()),
            service_name: Some(String::new()),
        };
        let f = to_total_filter(&q).unwrap();
        assert_eq!(f.start, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(f.end, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(f.user_id, Some(Uuid::parse_str(USER).unwrap()));
        assert_eq!(f.service_name, None);
    }

    #[test]
    fn total_filter_requires_both_bounds() {
        let errors = validation_errors(to_total_filter(&TotalQuery::default()).unwrap_err());
        assert_eq!(
            errors,
            vec![
                "Please provide start param in next format: mm-yyyy",
                "Please provide end param in next format: mm-yyyy",
            ]
        );
    }

    #[test]
    fn total_filter_rejects_reversed_period_and_bad_user() {
        let q = TotalQuery {
            start: Some("12-2025".into()),
            end: Some("01-2025".into()),
            user_id: Some("nope".into()),
            service_name: None,
        };
        let errors = validation_errors(to_total_filter(&q).unwrap_err());
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("end=01-2025"));
        assert_eq!(errors[1], "[user_id] - Invalid uuid");
    }
}
