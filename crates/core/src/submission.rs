//! Required-field checks gating submission for review, plus pagination
//! bounds shared by list queries.

use crate::error::CoreError;
use crate::listing::ListingFields;

/// Lowest valid star rating.
pub const MIN_STAR_RATING: i16 = 1;

/// Highest valid star rating.
pub const MAX_STAR_RATING: i16 = 5;

/// Default page size for listing queries.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Collect the names of every missing or invalid required field.
pub fn submission_violations(fields: &ListingFields) -> Vec<String> {
    let mut violations = Vec::new();

    if fields.name_local.trim().is_empty() {
        violations.push("name_local".to_string());
    }
    if fields.name_intl.trim().is_empty() {
        violations.push("name_intl".to_string());
    }
    if fields.address.trim().is_empty() {
        violations.push("address".to_string());
    }
    if !(MIN_STAR_RATING..=MAX_STAR_RATING).contains(&fields.star_rating) {
        violations.push("star_rating".to_string());
    }
    if fields.room_types.is_empty() {
        violations.push("room_types".to_string());
    }
    for (i, room) in fields.room_types.iter().enumerate() {
        if room.price <= 0 {
            violations.push(format!("room_types[{i}].price"));
        }
    }
    if fields.open_date.is_none() {
        violations.push("open_date".to_string());
    }
    for (i, discount) in fields.discounts.iter().enumerate() {
        if discount.validate().is_err() {
            violations.push(format!("discounts[{i}].value"));
        }
    }

    violations
}

/// Check that `fields` may be submitted for review. Reports all violations
/// at once.
pub fn validate_for_submission(fields: &ListingFields) -> Result<(), CoreError> {
    let violations = submission_violations(fields);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(CoreError::ValidationFailed { violations })
    }
}

/// Validate a review rejection reason: it must not be blank.
pub fn validate_reject_reason(reason: &str) -> Result<(), CoreError> {
    if reason.trim().is_empty() {
        return Err(CoreError::Validation(
            "A rejection reason is required".to_string(),
        ));
    }
    Ok(())
}

/// Clamp a 1-based page number and page size into `(limit, offset)`.
pub fn clamp_page(page: Option<i64>, page_size: Option<i64>) -> (i64, i64) {
    let limit = page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let page = page.unwrap_or(1).max(1);
    (limit, (page - 1).saturating_mul(limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::RoomType;
    use chrono::NaiveDate;

    fn complete() -> ListingFields {
        ListingFields {
            name_local: "海景酒店".into(),
            name_intl: "Seaview Hotel".into(),
            address: "1 Harbour Rd".into(),
            star_rating: 4,
            room_types: vec![RoomType {
                name: "Deluxe".into(),
                price: 500,
                ..Default::default()
            }],
            open_date: NaiveDate::from_ymd_opt(2019, 5, 1),
            ..Default::default()
        }
    }

    #[test]
    fn complete_listing_passes() {
        assert!(validate_for_submission(&complete()).is_ok());
    }

    #[test]
    fn missing_open_date_is_reported() {
        let mut fields = complete();
        fields.open_date = None;
        let err = validate_for_submission(&fields).unwrap_err();
        assert_eq!(
            err,
            CoreError::ValidationFailed {
                violations: vec!["open_date".into()]
            }
        );
    }

    #[test]
    fn all_violations_are_reported_together() {
        let violations = submission_violations(&ListingFields::default());
        assert_eq!(
            violations,
            vec![
                "name_local",
                "name_intl",
                "address",
                "star_rating",
                "room_types",
                "open_date"
            ]
        );
    }

    #[test]
    fn zero_priced_rooms_are_flagged_by_index() {
        let mut fields = complete();
        fields.room_types.push(RoomType {
            name: "Suite".into(),
            price: 0,
            ..Default::default()
        });
        assert_eq!(submission_violations(&fields), vec!["room_types[1].price"]);
    }

    #[test]
    fn star_rating_must_be_in_range() {
        let mut fields = complete();
        fields.star_rating = 6;
        assert_eq!(submission_violations(&fields), vec!["star_rating"]);
    }

    #[test]
    fn blank_names_count_as_missing() {
        let mut fields = complete();
        fields.name_intl = "   ".into();
        assert_eq!(submission_violations(&fields), vec!["name_intl"]);
    }

    #[test]
    fn out_of_range_discounts_are_flagged_by_index() {
        use crate::listing::{Discount, DiscountKind};
        let mut fields = complete();
        fields.discounts = vec![
            Discount {
                kind: DiscountKind::Fixed,
                value: 50,
                name: None,
            },
            Discount {
                kind: DiscountKind::Fixed,
                value: -50,
                name: None,
            },
        ];
        assert_eq!(submission_violations(&fields), vec!["discounts[1].value"]);
    }

    #[test]
    fn reject_reason_must_not_be_blank() {
        assert!(validate_reject_reason("Photos are blurry").is_ok());
        assert!(validate_reject_reason("  ").is_err());
    }

    #[test]
    fn clamp_page_defaults_and_bounds() {
        assert_eq!(clamp_page(None, None), (20, 0));
        assert_eq!(clamp_page(Some(3), Some(10)), (10, 20));
        assert_eq!(clamp_page(Some(0), Some(500)), (100, 0));
        assert_eq!(clamp_page(Some(-2), Some(0)), (1, 0));
        assert_eq!(clamp_page(Some(i64::MAX), Some(100)).1, i64::MAX);
    }
}
