#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use jaql_model::jaql::FilterJaql;
    use jaql_model::model::filter::{classify, create_condition_filter, ConditionType, FilterKind};
    use jaql_model::model::{Attribute, DateDimension, Measure};

    fn parse(json: &str) -> FilterJaql {
        serde_json::from_str(json).unwrap()
    }

    fn age() -> Attribute {
        Attribute::numeric("Age", "[Commerce.Age]")
    }

    fn brand() -> Attribute {
        Attribute::text("Brand", "[Commerce.Brand]")
    }

    #[test]
    fn test_classification_table() {
        let cases = [
            (r#"{"top":3}"#, ConditionType::Top),
            (r#"{"bottom":3}"#, ConditionType::Bottom),
            (r#"{"exclude":{"members":["a"]}}"#, ConditionType::IsNot),
            (r#"{"last":{"offset":0,"count":2}}"#, ConditionType::IsWithin),
            (r#"{"fromNotEqual":1}"#, ConditionType::GreaterThan),
            (r#"{"toNotEqual":1}"#, ConditionType::LessThan),
            (r#"{"equals":""}"#, ConditionType::IsEmpty),
            (r#"{"doesntEqual":""}"#, ConditionType::IsNotEmpty),
            (r#"{"equals":"a"}"#, ConditionType::Equals),
            (r#"{"doesntEqual":4}"#, ConditionType::DoesntEqual),
            (r#"{"from":1,"to":2}"#, ConditionType::Between),
            (r#"{"exclude":{"from":1,"to":2}}"#, ConditionType::IsNotBetween),
            (r#"{"from":1}"#, ConditionType::GreaterThanOrEqual),
            (r#"{"to":1}"#, ConditionType::LessThanOrEqual),
            (r#"{"contains":"a"}"#, ConditionType::Contains),
            (r#"{"doesntContain":"a"}"#, ConditionType::DoesntContain),
            (r#"{"startsWith":"a"}"#, ConditionType::StartsWith),
            (r#"{"doesntStartWith":"a"}"#, ConditionType::DoesntStartWith),
            (r#"{"endsWith":"a"}"#, ConditionType::EndsWith),
            (r#"{"doesntEndWith":"a"}"#, ConditionType::DoesntEndWith),
            (r#"{"like":"a%"}"#, ConditionType::Like),
            (r#"{"or":[{"contains":"a"}]}"#, ConditionType::MultipleCondition),
            (r#"{"members":["a"]}"#, ConditionType::None),
        ];
        for (json, expected) in cases {
            assert_eq!(classify(&parse(json)), expected, "classifying {}", json);
        }
    }

    #[test]
    fn test_earlier_keys_win() {
        // fromNotEqual is checked before from/to
        assert_eq!(
            classify(&parse(r#"{"from":1,"to":2,"fromNotEqual":0}"#)),
            ConditionType::GreaterThan
        );
        assert_eq!(
            classify(&parse(r#"{"contains":"a","bottom":2}"#)),
            ConditionType::Bottom
        );
        assert_eq!(ConditionType::IsNotBetween.to_string(), "isNotBetween");
    }

    #[test]
    fn test_top_ranking_uses_ranking_message() {
        let f = create_condition_filter(
            &brand(),
            &parse(
                r#"{"top":10,"by":{"dim":"[Commerce.Revenue]","agg":"sum","datatype":"numeric"},"rankingMessage":"Revenue"}"#,
            ),
            "r1",
        )
        .unwrap();
        assert_eq!(f.guid(), "r1");
        match &f.kind {
            FilterKind::Ranking { measure, count, .. } => {
                assert_eq!(*count, 10);
                assert_eq!(measure.name(), "Revenue");
                assert!(matches!(measure, Measure::Base(_)));
            }
            other => panic!("Expected ranking filter, got {:?}", other),
        }
    }

    #[test]
    fn test_ranking_without_measure_is_an_error() {
        let err = create_condition_filter(&brand(), &parse(r#"{"top":10}"#), "r1").unwrap_err();
        assert_eq!(err.key(), "errors.filter.rankingWithoutMeasure");
    }

    #[test]
    fn test_is_not_becomes_excluded_members() {
        let f = create_condition_filter(
            &brand(),
            &parse(r#"{"exclude":{"members":["Apple","Sony"]},"multiSelection":false}"#),
            "g",
        )
        .unwrap();
        assert_eq!(f.type_name(), "members");
        assert!(f.config.exclude_members);
        assert!(!f.config.enable_multi_selection);
        assert_snapshot!(
            serde_json::to_string(&f.filter_jaql()).unwrap(),
            @r#"{"multiSelection":false,"exclude":{"members":["Apple","Sony"]}}"#
        );
    }

    #[test]
    fn test_is_not_between_wraps_a_range() {
        let f = create_condition_filter(&age(), &parse(r#"{"exclude":{"from":1,"to":5}}"#), "g")
            .unwrap();
        assert_eq!(f.type_name(), "exclude");
        assert_snapshot!(
            serde_json::to_string(&f.filter_jaql()).unwrap(),
            @r#"{"exclude":{"from":1,"to":5}}"#
        );
    }

    #[test]
    fn test_exclusive_range() {
        let f = create_condition_filter(&age(), &parse(r#"{"fromNotEqual":18,"toNotEqual":65}"#), "g")
            .unwrap();
        assert_eq!(f.type_name(), "numeric");
        assert_snapshot!(
            serde_json::to_string(&f.filter_jaql()).unwrap(),
            @r#"{"fromNotEqual":18,"toNotEqual":65}"#
        );
    }

    #[test]
    fn test_date_between_becomes_date_range() {
        let months = DateDimension::for_column("Commerce", "Date").months();
        let f = create_condition_filter(
            &months,
            &parse(r#"{"from":"2024-01-01","to":"2024-03-31"}"#),
            "d",
        )
        .unwrap();
        assert_eq!(f.type_name(), "dateRange");

        let err = create_condition_filter(&months, &parse(r#"{"from":"soon"}"#), "d").unwrap_err();
        assert_eq!(err.key(), "errors.filter.invalidDate");
    }

    #[test]
    fn test_empty_checks_use_text_equality() {
        let f = create_condition_filter(&brand(), &parse(r#"{"doesntEqual":""}"#), "e").unwrap();
        assert_eq!(f.type_name(), "text");
        assert_snapshot!(
            serde_json::to_string(&f.filter_jaql()).unwrap(),
            @r#"{"doesntEqual":""}"#
        );
    }

    #[test]
    fn test_multiple_condition_builds_logical_filter() {
        let f = create_condition_filter(
            &brand(),
            &parse(r#"{"and":[{"startsWith":"A"},{"doesntContain":"x"}]}"#),
            "m",
        )
        .unwrap();
        assert_eq!(f.type_name(), "logical");
        assert_eq!(f.guid(), "m");
        assert_snapshot!(
            serde_json::to_string(&f.filter_jaql()).unwrap(),
            @r#"{"and":[{"startsWith":"A"},{"doesntContain":"x"}]}"#
        );
    }
}
