use chrono::{FixedOffset, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::America::New_York;

use crate::{
    domain::{AvailabilitySlot, Platform, Provider, ProviderId},
    error::{ApiException, ErrorCode},
    protocol::{CreateAppointmentRequest, DayAvailabilityQuery, RouteParams},
    schedule::{
        appointment_time, format_hour, minimum_bookable_date, same_time_on, slots_in_period,
        DayPeriod, HourSlot,
    },
};

fn brt() -> FixedOffset {
    FixedOffset::west_opt(3 * 3600).expect("offset")
}

#[test]
fn minimum_date_is_today_before_cutoff() {
    for hour in [0, 8, 12, 16] {
        let now = brt()
            .with_ymd_and_hms(2026, 3, 9, hour, 59, 0)
            .single()
            .expect("time");
        assert_eq!(minimum_bookable_date(now), now, "hour {hour}");
    }
}

#[test]
fn minimum_date_is_tomorrow_from_cutoff_on() {
    for hour in [17, 18, 23] {
        let now = brt()
            .with_ymd_and_hms(2026, 3, 9, hour, 0, 0)
            .single()
            .expect("time");
        let minimum = minimum_bookable_date(now);
        assert_eq!(
            minimum.date_naive(),
            NaiveDate::from_ymd_opt(2026, 3, 10).expect("date"),
            "hour {hour}"
        );
    }
}

#[test]
fn minimum_date_rolls_over_month_end() {
    let now = brt()
        .with_ymd_and_hms(2026, 12, 31, 19, 30, 0)
        .single()
        .expect("time");
    assert_eq!(
        minimum_bookable_date(now).date_naive(),
        NaiveDate::from_ymd_opt(2027, 1, 1).expect("date")
    );
}

#[test]
fn splits_availability_into_morning_and_afternoon() {
    let availability = vec![
        AvailabilitySlot {
            hour: 9,
            available: true,
        },
        AvailabilitySlot {
            hour: 14,
            available: false,
        },
    ];

    assert_eq!(
        slots_in_period(&availability, DayPeriod::Morning),
        vec![HourSlot {
            hour: 9,
            hour_formatted: "09:00".to_string(),
            available: true,
        }]
    );
    assert_eq!(
        slots_in_period(&availability, DayPeriod::Afternoon),
        vec![HourSlot {
            hour: 14,
            hour_formatted: "14:00".to_string(),
            available: false,
        }]
    );
}

#[test]
fn periods_partition_a_full_day() {
    let availability: Vec<_> = (0..24u8)
        .map(|hour| AvailabilitySlot {
            hour,
            available: hour % 3 != 0,
        })
        .collect();

    let morning = slots_in_period(&availability, DayPeriod::Morning);
    let afternoon = slots_in_period(&availability, DayPeriod::Afternoon);

    assert!(morning.iter().all(|slot| slot.hour < 12));
    assert!(afternoon.iter().all(|slot| slot.hour >= 12));

    let rebuilt: Vec<_> = morning
        .iter()
        .chain(afternoon.iter())
        .map(|slot| AvailabilitySlot {
            hour: slot.hour,
            available: slot.available,
        })
        .collect();
    assert_eq!(rebuilt, availability);
}

#[test]
fn formats_hours_with_leading_zero() {
    assert_eq!(format_hour(0), "00:00");
    assert_eq!(format_hour(8), "08:00");
    assert_eq!(format_hour(12), "12:00");
    assert_eq!(format_hour(23), "23:00");
}

#[test]
fn appointment_time_lands_on_the_hour() {
    let date = brt()
        .with_ymd_and_hms(2026, 3, 10, 10, 37, 12)
        .single()
        .expect("time");

    let at = appointment_time(&date, 14).expect("valid hour");
    assert_eq!(at.date_naive(), date.date_naive());
    assert_eq!((at.hour(), at.minute(), at.second()), (14, 0, 0));
    assert_eq!(at.offset(), date.offset());
}

#[test]
fn day_across_dst_change_books_that_days_offset() {
    let now = New_York
        .with_ymd_and_hms(2026, 3, 1, 10, 0, 0)
        .single()
        .expect("time");
    let picked = same_time_on(&now, NaiveDate::from_ymd_opt(2026, 3, 20).expect("date"))
        .expect("local time exists");
    assert_eq!((picked.hour(), picked.minute()), (10, 0));

    let at = appointment_time(&picked, 14).expect("valid hour");
    assert_eq!(
        at.with_timezone(&Utc),
        Utc.with_ymd_and_hms(2026, 3, 20, 18, 0, 0)
            .single()
            .expect("time")
    );
}

#[test]
fn appointment_time_in_spring_forward_gap_is_none() {
    let day = New_York
        .with_ymd_and_hms(2026, 3, 8, 9, 0, 0)
        .single()
        .expect("time");
    assert!(appointment_time(&day, 2).is_none());
    assert!(appointment_time(&day, 3).is_some());
}

#[test]
fn appointment_time_rejects_out_of_range_hour() {
    let date = brt()
        .with_ymd_and_hms(2026, 3, 10, 10, 0, 0)
        .single()
        .expect("time");
    assert!(appointment_time(&date, 24).is_none());
}

#[test]
fn availability_query_uses_one_indexed_month() {
    let date = NaiveDate::from_ymd_opt(2026, 1, 31).expect("date");
    assert_eq!(
        DayAvailabilityQuery::for_date(&date),
        DayAvailabilityQuery {
            year: 2026,
            month: 1,
            day: 31,
        }
    );
}

#[test]
fn route_params_read_camel_case_provider_id() {
    let params: RouteParams =
        serde_json::from_str(r#"{"providerId":"p1"}"#).expect("route params");
    assert_eq!(params.provider_id, ProviderId::new("p1"));
}

#[test]
fn provider_round_trips_wire_shape() {
    let provider: Provider = serde_json::from_str(
        r#"{"id":"b6f1","name":"Diego","avatar_url":"http://cdn.local/diego.png"}"#,
    )
    .expect("provider");
    assert_eq!(provider.id.as_str(), "b6f1");
    assert_eq!(provider.avatar_url, "http://cdn.local/diego.png");
}

#[test]
fn appointment_request_serializes_utc_date() {
    let request = CreateAppointmentRequest {
        provider_id: ProviderId::new("p1"),
        date: Utc
            .with_ymd_and_hms(2026, 3, 10, 17, 0, 0)
            .single()
            .expect("time"),
    };
    let value = serde_json::to_value(&request).expect("json");
    assert_eq!(value["provider_id"], "p1");
    assert_eq!(value["date"], "2026-03-10T17:00:00Z");
}

#[test]
fn platform_parses_case_insensitively() {
    assert_eq!("Android".parse::<Platform>().expect("android"), Platform::Android);
    assert_eq!(" ios ".parse::<Platform>().expect("ios"), Platform::Ios);
    assert!("web".parse::<Platform>().is_err());
    assert!(Platform::Android.dismisses_picker_on_select());
    assert!(!Platform::Ios.dismisses_picker_on_select());
}

#[test]
fn api_exception_reads_server_message() {
    let err = ApiException::from_response(
        401,
        r#"{"status":"error","message":"Incorrect email/password combination."}"#,
    );
    assert_eq!(err.code, ErrorCode::Unauthorized);
    assert_eq!(err.message, "Incorrect email/password combination.");

    let err = ApiException::from_response(502, "<html>bad gateway</html>");
    assert_eq!(err.code, ErrorCode::Internal);
    assert_eq!(err.message, "HTTP 502");
}
