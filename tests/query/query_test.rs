#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use jaql_model::jaql::{DataSource, JaqlQuery, Panel};
    use jaql_model::model::filter::factory;
    use jaql_model::model::{measure_factory, Attribute, FilterRelations};
    use jaql_model::QueryDescription;

    fn gender() -> Attribute {
        Attribute::text("Gender", "[Commerce.Gender]")
    }

    fn brand() -> Attribute {
        Attribute::text("Brand", "[Commerce.Brand]")
    }

    fn revenue() -> Attribute {
        Attribute::numeric("Revenue", "[Commerce.Revenue]")
    }

    fn base_query() -> QueryDescription {
        QueryDescription::new(DataSource::new("Sample ECommerce"))
            .with_dimension(gender())
            .with_measure(measure_factory::sum(&revenue(), None))
    }

    #[test]
    fn test_panels_and_scope_instanceids() {
        let q = base_query()
            .with_filter(factory::members(&brand(), &["Apple"]).with_guid("f1"))
            .with_count(100);
        assert_snapshot!(
            serde_json::to_string(&q.jaql_query_unchecked()).unwrap(),
            @r#"{"datasource":{"title":"Sample ECommerce"},"metadata":[{"jaql":{"dim":"[Commerce.Gender]","title":"Gender","datatype":"text"},"panel":"rows"},{"jaql":{"dim":"[Commerce.Revenue]","title":"sum Revenue","datatype":"numeric","agg":"sum"},"panel":"measures"},{"jaql":{"dim":"[Commerce.Brand]","title":"Brand","datatype":"text","filter":{"explicit":true,"multiSelection":true,"members":["Apple"]}},"panel":"scope","instanceid":"f1"}],"count":100}"#
        );
    }

    #[test]
    fn test_matching_highlight_attaches_to_dimension() {
        let q = base_query().with_highlight(factory::members(&gender(), &["Female"]));
        let metadata = q.metadata();
        assert_eq!(metadata.len(), 2);
        assert_snapshot!(
            serde_json::to_string(&metadata[0]).unwrap(),
            @r#"{"jaql":{"dim":"[Commerce.Gender]","title":"Gender","datatype":"text","in":{"selected":{"jaql":{"dim":"[Commerce.Gender]","title":"Gender","datatype":"text","filter":{"explicit":true,"multiSelection":true,"members":["Female"]}}}}},"panel":"rows"}"#
        );
    }

    #[test]
    fn test_unmatched_highlight_becomes_scope_filter() {
        let q = base_query().with_highlight(factory::members(&brand(), &["Sony"]).with_guid("h1"));
        let metadata = q.metadata();
        assert_eq!(metadata.len(), 3);
        assert!(metadata[0].jaql.in_selection.is_none());
        assert_eq!(metadata[2].panel, Some(Panel::Scope));
        assert_eq!(metadata[2].instanceid.as_deref(), Some("h1"));
    }

    #[test]
    fn test_disabled_highlight_is_dropped() {
        let q = base_query().with_highlight(factory::members(&brand(), &["Sony"]).with_disabled(true));
        assert_eq!(q.metadata().len(), 2);
    }

    #[test]
    fn test_cascading_filter_shares_instanceid() {
        let country = Attribute::text("Country", "[Geo.Country]");
        let city = Attribute::text("City", "[Geo.City]");
        let cascading = factory::cascading(vec![
            factory::members(&country, &["US"]),
            factory::members(&city, &["Boston"]),
        ])
        .with_guid("c1");
        let q = base_query().with_filter(cascading);

        let query = q.to_jaql_query().unwrap();
        let scope: Vec<_> = query
            .metadata
            .iter()
            .filter(|item| item.panel == Some(Panel::Scope))
            .collect();
        assert_eq!(scope.len(), 2);
        assert!(scope.iter().all(|item| item.instanceid.as_deref() == Some("c1")));

        let parsed = QueryDescription::from_jaql(&query).unwrap();
        assert_eq!(parsed.filters.len(), 1);
        assert_eq!(parsed.filters[0].type_name(), "cascading");
        assert_eq!(parsed.filters[0].guid(), "c1");
        assert_eq!(parsed.filters[0].metadata_items().len(), 2);
    }

    #[test]
    fn test_relations_must_reference_filters() {
        let q = base_query()
            .with_filter(factory::members(&brand(), &["Apple"]).with_guid("f1"))
            .with_relations(FilterRelations::or(
                FilterRelations::leaf("f1"),
                FilterRelations::leaf("missing"),
            ));
        let err = q.to_jaql_query().unwrap_err();
        assert_eq!(err.key(), "errors.filterRelations.unknownFilter");
        assert_eq!(err.params().get("guid").map(String::as_str), Some("missing"));
    }

    #[test]
    fn test_from_jaql_reads_demo_request() {
        let query: JaqlQuery =
            serde_json::from_str(include_str!("../../demos/relations_query.json")).unwrap();
        let q = QueryDescription::from_jaql(&query).unwrap();

        assert_eq!(q.data_source.title, "Sample ECommerce");
        assert_eq!(q.dimensions, vec![Attribute::text("Category", "[Category.Category]")]);
        assert!(q.measures.is_empty());

        let kinds: Vec<_> = q.filters.iter().map(|f| (f.guid(), f.type_name())).collect();
        assert_eq!(kinds, vec![("f-condition", "members"), ("f-revenue", "numeric")]);
        assert_eq!(
            q.filter_relations,
            Some(FilterRelations::or(
                FilterRelations::leaf("f-condition"),
                FilterRelations::leaf("f-revenue"),
            ))
        );
    }

    #[test]
    fn test_round_trip_keeps_dimensions_and_filters() {
        let q = base_query()
            .with_filter(factory::between(&revenue(), 10, 20).with_guid("r"))
            .with_filter(factory::contains(&brand(), "a").with_guid("b"))
            .with_relations(FilterRelations::or(
                FilterRelations::leaf("r"),
                FilterRelations::leaf("b"),
            ))
            .with_offset(20);
        let parsed = QueryDescription::from_jaql(&q.to_jaql_query().unwrap()).unwrap();

        assert_eq!(parsed.dimensions, q.dimensions);
        assert_eq!(parsed.filters, q.filters);
        assert_eq!(parsed.filter_relations, q.filter_relations);
        assert_eq!(parsed.offset, Some(20));
        assert_eq!(parsed.measures.len(), 1);
        assert_eq!(parsed.measures[0].name(), "sum Revenue");
    }
}
