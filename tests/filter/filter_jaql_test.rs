#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use jaql_model::jaql::{JaqlElement, MetadataItem};
    use jaql_model::model::filter::{
        factory, filter_from_jaql, filter_from_metadata_item, filter_to_dto, filters_from_dtos,
        FilterConfig,
    };
    use jaql_model::model::{measure_factory, Attribute, DateDimension, Filter};

    fn gender() -> Attribute {
        Attribute::text("Gender", "[Commerce.Gender]")
    }

    fn revenue() -> Attribute {
        Attribute::numeric("Revenue", "[Commerce.Revenue]")
    }

    fn element_json(filter: &Filter) -> String {
        serde_json::to_string(&filter.jaql_element()).unwrap()
    }

    fn round_trip(filter: &Filter) -> Filter {
        filter_from_jaql(&filter.jaql_element(), Some(filter.guid()))
    }

    #[test]
    fn test_members_jaql() {
        let f = factory::members(&gender(), &["Female", "Male"]);
        assert_snapshot!(
            element_json(&f),
            @r#"{"dim":"[Commerce.Gender]","title":"Gender","datatype":"text","filter":{"explicit":true,"multiSelection":true,"members":["Female","Male"]}}"#
        );
    }

    #[test]
    fn test_disabled_filter_emits_empty_object() {
        let f = factory::members(&gender(), &["Female"]).with_disabled(true);
        assert_snapshot!(
            element_json(&f),
            @r#"{"dim":"[Commerce.Gender]","title":"Gender","datatype":"text","filter":{}}"#
        );
        // The real body is still available
        assert_eq!(f.filter_jaql().members.map(|m| m.len()), Some(1));
    }

    #[test]
    fn test_excluded_members_jaql() {
        let f = factory::exclude_members(&gender(), &["Male"]);
        assert_snapshot!(
            serde_json::to_string(&f.filter_jaql()).unwrap(),
            @r#"{"multiSelection":true,"exclude":{"members":["Male"]}}"#
        );
    }

    #[test]
    fn test_deactivated_members_fall_back_to_all() {
        let f = factory::members(&gender(), &["Male"])
            .with_config(FilterConfig::new().with_deactivated_members(vec!["Male".into()]));
        assert_eq!(f.filter_jaql().all, Some(true));
    }

    #[test]
    fn test_background_filter_nested() {
        let background = factory::members(&gender(), &["Female", "Male"]);
        let f = factory::members(&gender(), &["Female"])
            .with_config(FilterConfig::new().with_background_filter(background));
        let jaql = f.filter_jaql();
        let nested = jaql.filter.expect("background filter");
        assert_eq!(nested.members.map(|m| m.len()), Some(2));
    }

    #[test]
    fn test_ranking_jaql() {
        let brand = Attribute::text("Brand", "[Commerce.Brand]");
        let f = factory::top_ranking(&brand, &measure_factory::sum(&revenue(), None), 5);
        assert_snapshot!(
            serde_json::to_string(&f.filter_jaql()).unwrap(),
            @r#"{"top":5,"by":{"dim":"[Commerce.Revenue]","title":"sum Revenue","datatype":"numeric","agg":"sum"}}"#
        );
    }

    #[test]
    fn test_relative_date_jaql() {
        let days = DateDimension::for_column("Commerce", "Date").days();
        let f = factory::date_relative_to(&days, 0, 7, Some("2024-06-30")).unwrap();
        assert_snapshot!(
            serde_json::to_string(&f.filter_jaql()).unwrap(),
            @r#"{"last":{"offset":0,"count":7,"anchor":"2024-06-30"}}"#
        );
    }

    #[test]
    fn test_invalid_date_rejected() {
        let days = DateDimension::for_column("Commerce", "Date").days();
        let err = factory::date_from(&days, "31/12/2024").unwrap_err();
        assert_eq!(err.key(), "errors.filter.invalidDate");
        assert!(factory::date_from(&days, "2024-12-31T10:00:00").is_ok());
    }

    #[test]
    fn test_typed_filters_round_trip() {
        let years = DateDimension::for_column("Commerce", "Date").years();
        let filters = vec![
            factory::members(&gender(), &["Female"]),
            factory::between(&revenue(), 10, 100),
            factory::greater_than(&revenue(), 5),
            factory::less_than_or_equal(&revenue(), 50),
            factory::contains(&gender(), "ale"),
            factory::doesnt_end_with(&gender(), "e"),
            factory::equals(&gender(), "Male"),
            factory::date_range(&years, Some("2023-01-01"), Some("2023-12-31")).unwrap(),
            factory::date_relative_from(&years, 1, 2, None).unwrap(),
        ];
        for f in &filters {
            assert_eq!(&round_trip(f), f, "round trip of {}", element_json(f));
        }
    }

    #[test]
    fn test_measure_filter_round_trip() {
        let f = factory::measure_between(&measure_factory::sum(&revenue(), None), 10, 100);
        let parsed = round_trip(&f);
        assert_eq!(parsed.type_name(), "measure");
        assert_eq!(parsed.filter_jaql(), f.filter_jaql());
        assert_eq!(parsed.guid(), f.guid());
    }

    #[test]
    fn test_union_requires_one_attribute() {
        let country = Attribute::text("Country", "[Geo.Country]");
        let err = factory::union(vec![
            factory::contains(&gender(), "a"),
            factory::contains(&country, "a"),
        ])
        .unwrap_err();
        assert_eq!(err.key(), "errors.filter.mixedAttributes");
        assert_eq!(
            factory::intersection(vec![]).unwrap_err().key(),
            "errors.filter.emptyLogical"
        );
    }

    #[test]
    fn test_union_jaql() {
        let f = factory::union(vec![
            factory::starts_with(&gender(), "F"),
            factory::ends_with(&gender(), "e"),
        ])
        .unwrap();
        assert_snapshot!(
            serde_json::to_string(&f.filter_jaql()).unwrap(),
            @r#"{"or":[{"startsWith":"F"},{"endsWith":"e"}]}"#
        );
        assert_eq!(round_trip(&f).type_name(), "logical");
    }

    #[test]
    fn test_cascading_metadata_items() {
        let country = Attribute::text("Country", "[Geo.Country]");
        let city = Attribute::text("City", "[Geo.City]");
        let f = factory::cascading(vec![
            factory::members(&country, &["US"]),
            factory::members(&city, &["Boston"]),
        ])
        .with_disabled(true);

        let items = f.metadata_items();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.jaql.filter.as_ref().is_some_and(|f| f.is_empty())));
        assert!(f.jaql().is_array());
    }

    #[test]
    fn test_metadata_item_flags() {
        let item: MetadataItem = serde_json::from_str(
            r#"{"jaql":{"dim":"[Commerce.Gender]","datatype":"text","filter":{"members":["Male"]}},"instanceid":"abc","disabled":true}"#,
        )
        .unwrap();
        let f = filter_from_metadata_item(&item);
        assert_eq!(f.guid(), "abc");
        assert!(f.is_disabled());
        assert_eq!(f.type_name(), "members");
    }

    #[test]
    fn test_unknown_shape_kept_as_custom() {
        let el: JaqlElement = serde_json::from_str(
            r#"{"dim":"[Commerce.Gender]","datatype":"text","filter":{"custom":true,"isAdvanced":true}}"#,
        )
        .unwrap();
        let f = filter_from_jaql(&el, None);
        assert_eq!(f.type_name(), "custom");
        assert_eq!(f.filter_jaql().custom, Some(true));
        assert!(!f.guid().is_empty());
    }

    #[test]
    fn test_dto_round_trip() {
        let original = factory::members(&gender(), &["Female"]).with_disabled(true);
        let dto = filter_to_dto(&original);
        let parsed = filters_from_dtos(&[dto]);
        assert_eq!(parsed, vec![original]);
    }
}
