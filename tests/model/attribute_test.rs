#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use jaql_model::jaql::JaqlElement;
    use jaql_model::model::{
        Attribute, DataType, DateDimension, Dimension, Granularity, Sort,
    };

    fn to_json(el: &JaqlElement) -> String {
        serde_json::to_string(el).unwrap()
    }

    #[test]
    fn test_text_attribute_jaql() {
        let attr = Attribute::text("Age Range", "[Commerce.Age Range]").with_sort(Sort::Descending);
        assert_snapshot!(
            to_json(&attr.to_jaql()),
            @r#"{"dim":"[Commerce.Age Range]","title":"Age Range","datatype":"text","sort":"desc"}"#
        );
    }

    #[test]
    fn test_rounded_minutes_level() {
        let date = DateDimension::for_column("Commerce", "Date");
        let attr = date.minutes_round_to_30();

        assert_eq!(attr.name, "Date in minutesroundto30");
        assert_eq!(attr.id(), "[Commerce.Date (Calendar)].MinutesRoundTo30");
        assert_eq!(attr.type_name(), "datetime-level");
        assert_snapshot!(
            to_json(&attr.to_jaql()),
            @r#"{"dim":"[Commerce.Date (Calendar)]","title":"Date in minutesroundto30","datatype":"datetime","level":"minutes","bucket":"30"}"#
        );
    }

    #[test]
    fn test_level_round_trip() {
        let date = DateDimension::for_column("Commerce", "Date");
        for level in date.levels() {
            let parsed = Attribute::from_jaql(&level.to_jaql()).unwrap();
            assert_eq!(parsed, level);
        }
    }

    #[test]
    fn test_level_default_format() {
        let months = DateDimension::new("Order Date", "[Orders.Date (Calendar)]").months();
        assert_eq!(months.effective_format().as_deref(), Some("yyyy-MM"));
        let custom = months.with_format("MMM yy");
        assert_eq!(custom.effective_format().as_deref(), Some("MMM yy"));
    }

    #[test]
    fn test_from_jaql_defaults() {
        let el = JaqlElement {
            dim: Some("[Commerce.Brand]".into()),
            ..Default::default()
        };
        let attr = Attribute::from_jaql(&el).unwrap();
        assert_eq!(attr.name, "Brand");
        assert_eq!(attr.data_type, DataType::Text);
        assert_eq!(attr.sort, Sort::None);
    }

    #[test]
    fn test_from_jaql_level_forces_datetime() {
        let el = JaqlElement {
            dim: Some("[Commerce.Date (Calendar)]".into()),
            datatype: Some(DataType::Text),
            level: Some("quarters".into()),
            ..Default::default()
        };
        let attr = Attribute::from_jaql(&el).unwrap();
        assert_eq!(attr.data_type, DataType::DateTime);
        assert_eq!(attr.granularity, Some(Granularity::Quarters));
    }

    #[test]
    fn test_unknown_level() {
        let el = JaqlElement {
            dim: Some("[Commerce.Date (Calendar)]".into()),
            level: Some("fortnights".into()),
            ..Default::default()
        };
        let err = Attribute::from_jaql(&el).unwrap_err();
        assert_eq!(err.key(), "errors.attribute.unknownLevel");
        assert_eq!(err.params()["level"], "fortnights");
    }

    #[test]
    fn test_dimension_default_attribute() {
        let dim = Dimension::new("Commerce", "[Commerce]")
            .with_attribute(Attribute::text("Brand", "[Commerce.Brand]"))
            .with_attribute(Attribute::text("Condition", "[Commerce.Condition]"));
        assert_eq!(dim.default_attribute().unwrap().name, "Brand");

        let dim = dim.with_default("Condition");
        assert_eq!(dim.to_jaql().dim.as_deref(), Some("[Commerce.Condition]"));
        assert!(dim.attribute("Missing").is_none());
    }

    #[test]
    fn test_empty_dimension_jaql() {
        let dim = Dimension::new("Country", "[Country.Country]");
        let el = dim.to_jaql();
        assert_eq!(el.title.as_deref(), Some("Country"));
        assert_eq!(el.datatype, Some(DataType::Text));
    }
}
