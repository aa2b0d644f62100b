#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use jaql_model::model::filter::{factory, FilterKind};
    use jaql_model::model::{Attribute, DataType, Granularity, Measure, Sort};
    use jaql_model::nlq::{
        is_supported, to_query_json, translate_query_json, translate_query_str, DataSchema,
        NlqCategory, QueryJson,
    };
    use jaql_model::QueryDescription;
    use serde_json::{json, Value};

    fn schema() -> DataSchema {
        serde_json::from_str(include_str!("../../demos/ecommerce_schema.json")).unwrap()
    }

    fn demo_query() -> QueryJson {
        serde_json::from_str(include_str!("../../demos/nlq_query.json")).unwrap()
    }

    fn query(value: serde_json::Value) -> QueryJson {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_translate_demo_query() {
        let q = translate_query_json(&demo_query(), &schema())
            .into_result()
            .unwrap();

        assert_eq!(q.data_source.title, "Sample ECommerce");
        let dims: Vec<_> = q.dimensions.iter().map(Attribute::id).collect();
        assert_eq!(dims, vec!["[Category.Category]", "[Commerce.Date (Calendar)].Years"]);
        assert_eq!(q.dimensions[1].granularity, Some(Granularity::Years));

        assert_eq!(q.measures.len(), 1);
        assert_eq!(q.measures[0].name(), "Total Revenue");
        assert_eq!(q.measures[0].sort(), Sort::Descending);

        assert_eq!(q.filters.len(), 1);
        match &q.filters[0].kind {
            FilterKind::Members { attribute, members } => {
                assert_eq!(attribute.expression, "[Commerce.Condition]");
                assert_eq!(members, &vec!["New".to_string(), "Used".to_string()]);
            }
            other => panic!("Expected members filter, got {:?}", other),
        }
    }

    #[test]
    fn test_translation_back_to_query_json() {
        let q = translate_query_json(&demo_query(), &schema())
            .into_result()
            .unwrap();
        assert_eq!(to_query_json(&q).unwrap(), demo_query());
    }

    #[test]
    fn test_errors_are_collected_per_item() {
        let input = query(json!({
            "dimensions": ["DM.Commerce.Nope", "DM.Commerce.Condition"],
            "measures": [
                {"function": "measureFactory.sum", "args": ["DM.Commerce.Revenue"]},
                {"function": "measureFactory.frobnicate", "args": []}
            ],
            "filters": [
                {"function": "filterFactory.greaterThan", "args": ["DM.Commerce.Revenue", "ten"]},
                {"function": "filterFactory.between", "args": ["DM.Commerce.Revenue", 1]}
            ],
            "highlights": [
                {"function": "measureFactory.sum", "args": ["DM.Commerce.Revenue"]}
            ]
        }));
        let result = translate_query_json(&input, &schema());
        assert!(!result.is_success());

        let errors: Vec<_> = result
            .errors()
            .iter()
            .map(|e| (e.category, e.index, e.message.as_str()))
            .collect();
        assert_eq!(
            errors,
            vec![
                (
                    NlqCategory::Dimensions,
                    0,
                    "Dimension \"DM.Commerce.Nope\" not found in the data schema"
                ),
                (
                    NlqCategory::Measures,
                    1,
                    "Function \"measureFactory.frobnicate\" is not supported"
                ),
                (
                    NlqCategory::Filters,
                    0,
                    "Invalid argument 2 of \"filterFactory.greaterThan\": expected a number, got \"ten\""
                ),
                (
                    NlqCategory::Filters,
                    1,
                    "Missing argument 3 of \"filterFactory.between\": expected a number"
                ),
                (
                    NlqCategory::Highlights,
                    0,
                    "Function \"measureFactory.sum\" is not a filter function"
                ),
            ]
        );
    }

    #[test]
    fn test_failure_json() {
        let input = query(json!({"dimensions": ["DM.Commerce.Nope"]}));
        let result = translate_query_json(&input, &schema());
        assert_snapshot!(
            serde_json::to_string(&result).unwrap(),
            @r#"{"success":false,"errors":[{"category":"dimensions","index":0,"input":"DM.Commerce.Nope","message":"Dimension \"DM.Commerce.Nope\" not found in the data schema"}]}"#
        );
    }

    #[test]
    fn test_nested_calls() {
        let input = query(json!({
            "measures": [{
                "function": "measureFactory.divide",
                "args": [
                    {"function": "measureFactory.sum", "args": ["DM.Commerce.Revenue"]},
                    {"function": "measureFactory.sum", "args": ["DM.Commerce.Cost"]},
                    "Margin"
                ]
            }],
            "filters": [{
                "function": "filterFactory.topRanking",
                "args": [
                    "DM.Category.Category",
                    {"function": "measureFactory.sum", "args": ["DM.Commerce.Revenue"]},
                    5
                ]
            }]
        }));
        let q = translate_query_json(&input, &schema()).into_result().unwrap();

        assert!(matches!(&q.measures[0], Measure::Calculated(m) if m.name == "Margin"));
        match &q.filters[0].kind {
            FilterKind::Ranking { count, measure, .. } => {
                assert_eq!(*count, 5);
                assert_eq!(measure.name(), "sum Revenue");
            }
            other => panic!("Expected ranking filter, got {:?}", other),
        }
    }

    #[test]
    fn test_fractional_counts_rejected() {
        let ranking = |count: Value| {
            query(json!({
                "filters": [{
                    "function": "filterFactory.topRanking",
                    "args": [
                        "DM.Category.Category",
                        {"function": "measureFactory.sum", "args": ["DM.Commerce.Revenue"]},
                        count
                    ]
                }]
            }))
        };

        let result = translate_query_json(&ranking(json!(2.7)), &schema());
        let errors = result.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].category, NlqCategory::Filters);
        assert_eq!(
            errors[0].message,
            "Failed to apply \"filterFactory.topRanking\": argument 3 has an unexpected type"
        );

        let q = translate_query_json(&ranking(json!(3.0)), &schema())
            .into_result()
            .unwrap();
        assert!(matches!(q.filters[0].kind, FilterKind::Ranking { count: 3, .. }));
    }

    #[test]
    fn test_date_filters_validate_dates() {
        let input = query(json!({
            "filters": [
                {"function": "filterFactory.dateRange", "args": ["DM.Commerce.Date.Months", "2024-01-01", null]},
                {"function": "filterFactory.dateFrom", "args": ["DM.Commerce.Date", "next week"]}
            ]
        }));
        let result = translate_query_json(&input, &schema());
        let errors = result.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].index, 1);
        assert!(errors[0].message.starts_with("Failed to apply \"filterFactory.dateFrom\""));
    }

    #[test]
    fn test_custom_filters_have_no_call_form() {
        let revenue = Attribute::new("Revenue", "[Commerce.Revenue]", DataType::Numeric);
        let q = QueryDescription::default()
            .with_dimension(revenue.clone())
            .with_filter(factory::custom(&revenue, Default::default()));
        let errors = to_query_json(&q).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].category, NlqCategory::Filters);
        assert_eq!(
            errors[0].message,
            "Custom filters cannot be expressed as function calls"
        );
    }

    #[test]
    fn test_registry_and_bad_json() {
        assert!(is_supported("filterFactory.measureBetween"));
        assert!(is_supported("measureFactory.yearToDateSum"));
        assert!(!is_supported("filterFactory.nope"));
        assert!(translate_query_str("{not json", &schema()).is_err());
    }
}
