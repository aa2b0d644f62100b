#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use jaql_model::model::filter::factory;
    use jaql_model::model::{
        measure_factory, AggregationType, Attribute, ContextItem, Measure, Sort,
    };
    use std::collections::BTreeMap;

    fn revenue() -> Attribute {
        Attribute::numeric("Revenue", "[Commerce.Revenue]")
    }

    fn cost() -> Attribute {
        Attribute::numeric("Cost", "[Commerce.Cost]")
    }

    fn calculated(m: &Measure) -> &jaql_model::model::CalculatedMeasure {
        match m {
            Measure::Calculated(c) => c,
            other => panic!("Expected calculated measure, got {:?}", other),
        }
    }

    #[test]
    fn test_count_aggregations_swap_on_the_wire() {
        let count = measure_factory::count(&revenue(), None);
        let distinct = measure_factory::count_distinct(&revenue(), None);
        assert_eq!(count.to_jaql().agg.as_deref(), Some("countduplicates"));
        assert_eq!(distinct.to_jaql().agg.as_deref(), Some("count"));

        match Measure::from_jaql(&distinct.to_jaql()).unwrap() {
            Measure::Base(m) => assert_eq!(m.aggregation, AggregationType::CountDistinct),
            other => panic!("Expected base measure, got {:?}", other),
        }
    }

    #[test]
    fn test_base_measure_jaql() {
        let m = measure_factory::sum(&revenue(), Some("Total Revenue")).with_sort(Sort::Ascending);
        assert_snapshot!(
            serde_json::to_string(&m.to_jaql()).unwrap(),
            @r#"{"dim":"[Commerce.Revenue]","title":"Total Revenue","datatype":"numeric","agg":"sum","sort":"asc"}"#
        );
    }

    #[test]
    fn test_default_measure_name() {
        let m = measure_factory::average(&cost(), None);
        assert_eq!(m.name(), "average Cost");
    }

    #[test]
    fn test_arithmetic_expressions() {
        let profit = measure_factory::subtract(
            measure_factory::sum(&revenue(), None),
            measure_factory::sum(&cost(), None),
            Some("Profit"),
        );
        let c = calculated(&profit);
        assert_eq!(c.expression, "[a] - [b]");
        assert_eq!(c.context.keys().collect::<Vec<_>>(), vec!["[a]", "[b]"]);

        let half = measure_factory::divide(measure_factory::sum(&revenue(), None), 2.0, None);
        let c = calculated(&half);
        assert_eq!(c.expression, "([a] / 2)");
        assert_eq!(c.name, "([a] / 2)");
        assert_eq!(c.context.len(), 1);
    }

    #[test]
    fn test_measured_value_context() {
        let brand = Attribute::text("Brand", "[Commerce.Brand]");
        let m = measure_factory::measured_value(
            &measure_factory::sum(&revenue(), None),
            &[factory::members(&brand, &["Apple", "Samsung"])],
            Some("Phones revenue"),
        );
        let c = calculated(&m);
        assert_eq!(c.expression, "([m], [f0])");
        assert!(matches!(c.context["[f0]"], ContextItem::Filter(_)));

        let jaql = m.to_jaql();
        let ctx = jaql.context.unwrap();
        assert!(ctx["[f0]"].filter.is_some());
        assert_eq!(ctx["[m]"].agg.as_deref(), Some("sum"));
    }

    #[test]
    fn test_calculated_round_trip_keeps_formula() {
        let m = measure_factory::growth(&measure_factory::sum(&revenue(), None), None);
        assert_eq!(m.name(), "growth sum Revenue");

        let parsed = Measure::from_jaql(&m.to_jaql()).unwrap();
        let c = calculated(&parsed);
        assert_eq!(c.expression, "growth([m])");
        assert!(matches!(c.context["[m]"], ContextItem::Measure(_)));
    }

    #[test]
    fn test_custom_formula_unknown_key() {
        let mut ctx = BTreeMap::new();
        ctx.insert("[rev]".to_string(), ContextItem::from(revenue()));
        let err = measure_factory::custom_formula("Ratio", "SUM([rev]) / SUM([cost])", ctx)
            .unwrap_err();
        assert_eq!(err.key(), "errors.measure.unknownContextKey");
        assert_eq!(err.params()["key"], "[cost]");
    }

    #[test]
    fn test_constant() {
        let m = measure_factory::constant(42.0, None);
        assert_eq!(m.name(), "42");
        assert_eq!(m.to_jaql().formula.as_deref(), Some("42"));
    }

    #[test]
    fn test_unknown_aggregation() {
        let mut el = measure_factory::sum(&revenue(), None).to_jaql();
        el.agg = Some("mode".into());
        let err = Measure::from_jaql(&el).unwrap_err();
        assert_eq!(err.key(), "errors.measure.unknownAggregation");
    }
}
