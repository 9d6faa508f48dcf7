#[cfg(test)]
mod tests {
    use crate::models::EventTime;
    use crate::normalize::{
        DateInferenceStrategy, DateNormalizer, MockDateInferenceStrategy, RegexDateInference,
    };
    use chrono::{NaiveDate, TimeZone};
    use chrono_tz::Tz;
    use mockall::predicate::{always, function};
    use std::sync::Arc;
    use studyplan_common::models::EventDateTimePayload;
    use studyplan_config::SchedulingConfig;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn normalizer() -> DateNormalizer {
        DateNormalizer::new(Tz::Asia__Jakarta, 2025)
    }

    #[test]
    fn complete_timed_input_is_an_identity_transform() {
        let start = EventDateTimePayload::timed("2025-06-09T10:00:00", Some("Asia/Jakarta"));
        let end = EventDateTimePayload::timed("2025-06-09T12:00:00", Some("Asia/Jakarta"));

        let (s, e) = normalizer().normalize(Some(&start), Some(&end), "ignored");

        let expected_start = Tz::Asia__Jakarta.with_ymd_and_hms(2025, 6, 9, 10, 0, 0).unwrap();
        let expected_end = Tz::Asia__Jakarta.with_ymd_and_hms(2025, 6, 9, 12, 0, 0).unwrap();
        assert_eq!(s, EventTime::timed(expected_start));
        assert_eq!(e, EventTime::timed(expected_end));
        assert_eq!(s.zone(), Some(Tz::Asia__Jakarta));
    }

    #[test]
    fn summary_inference_yields_all_day_pair() {
        let (s, e) = normalizer().normalize(None, None, "Software Engineering Exam on 9th of June 2025");
        assert_eq!(s, EventTime::all_day(date(2025, 6, 9)));
        assert_eq!(e, EventTime::all_day(date(2025, 6, 9)));
    }

    #[test]
    fn all_day_date_stays_all_day() {
        let start = EventDateTimePayload::all_day("2025-06-09");
        let end = EventDateTimePayload::all_day("2025-06-10");
        let (s, e) = normalizer().normalize(Some(&start), Some(&end), "");
        assert_eq!(s, EventTime::all_day(date(2025, 6, 9)));
        assert_eq!(e, EventTime::all_day(date(2025, 6, 10)));
    }

    #[test]
    fn missing_zone_gets_the_default_zone() {
        let start = EventDateTimePayload::timed("2025-06-09T08:30:00", None);
        let (s, _) = normalizer().normalize(Some(&start), None, "");
        assert_eq!(s.zone(), Some(Tz::Asia__Jakarta));
    }

    #[test]
    fn offset_timestamp_is_converted_into_the_named_zone() {
        let start = EventDateTimePayload::timed("2025-06-09T03:00:00Z", Some("Asia/Jakarta"));
        let (s, _) = normalizer().normalize(Some(&start), None, "");
        let expected = Tz::Asia__Jakarta.with_ymd_and_hms(2025, 6, 9, 10, 0, 0).unwrap();
        assert_eq!(s, EventTime::timed(expected));
    }

    #[test]
    fn unknown_zone_falls_back_to_default() {
        let start = EventDateTimePayload::timed("2025-06-09T10:00:00", Some("Mars/Olympus"));
        let (s, _) = normalizer().normalize(Some(&start), None, "");
        assert_eq!(s.zone(), Some(Tz::Asia__Jakarta));
    }

    #[test]
    fn missing_end_collapses_onto_start() {
        let start = EventDateTimePayload::all_day("2025-06-09");
        let (s, e) = normalizer().normalize(Some(&start), None, "");
        assert_eq!(s, e);
    }

    #[test]
    fn no_match_falls_back_to_today_in_default_year() {
        let today = date(2024, 3, 14);
        let (s, e) = normalizer().normalize_on(None, None, "Study group", today);
        assert_eq!(s, EventTime::all_day(date(2025, 3, 14)));
        assert_eq!(s, e);
    }

    #[test]
    fn leap_day_fallback_in_non_leap_year() {
        let today = date(2024, 2, 29);
        let (s, _) = normalizer().normalize_on(None, None, "", today);
        assert_eq!(s, EventTime::all_day(date(2025, 2, 28)));
    }

    #[test]
    fn invalid_day_falls_back_to_today() {
        let today = date(2025, 1, 2);
        let (s, _) = normalizer().normalize_on(None, None, "Exam on 31st of June", today);
        assert_eq!(s, EventTime::all_day(today));
    }

    #[test]
    fn regex_inference_understands_both_orders() {
        let strategy = RegexDateInference;
        assert_eq!(strategy.infer_date("Exam on June 9", 2025), Some(date(2025, 6, 9)));
        assert_eq!(strategy.infer_date("due Dec 21st, 2024", 2025), Some(date(2024, 12, 21)));
        assert_eq!(strategy.infer_date("21 of december", 2026), Some(date(2026, 12, 21)));
        assert_eq!(strategy.infer_date("Room 12 booked for 3 sept", 2025), Some(date(2025, 9, 3)));
        assert_eq!(strategy.infer_date("Chapter 4 review", 2025), None);
    }

    #[test]
    fn summary_is_handed_to_the_strategy() {
        let mut strategy = MockDateInferenceStrategy::new();
        strategy
            .expect_infer_date()
            .with(function(|text: &str| text == "Thesis defense"), always())
            .times(1)
            .returning(|_, year| NaiveDate::from_ymd_opt(year, 7, 1));

        let normalizer = normalizer().with_strategy(Arc::new(strategy));
        let (s, _) = normalizer.normalize(None, None, "Thesis defense");
        assert_eq!(s, EventTime::all_day(date(2025, 7, 1)));
    }

    #[test]
    fn strategy_is_not_consulted_when_start_is_present() {
        let mut strategy = MockDateInferenceStrategy::new();
        strategy.expect_infer_date().times(0);

        let normalizer = normalizer().with_strategy(Arc::new(strategy));
        let start = EventDateTimePayload::all_day("2025-06-09");
        normalizer.normalize(Some(&start), None, "9th of June");
    }

    #[test]
    fn config_with_bad_zone_is_rejected() {
        let config = SchedulingConfig {
            default_time_zone: "Nowhere/City".to_string(),
            ..Default::default()
        };
        assert!(DateNormalizer::from_config(&config).is_err());

        let normalizer = DateNormalizer::from_config(&SchedulingConfig::default()).unwrap();
        assert_eq!(normalizer.default_zone(), Tz::Asia__Jakarta);
        assert_eq!(normalizer.default_year(), 2025);
    }
}
