#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use jaql_model::jaql::{FilterRelationsJaql, RelationOperator};
    use jaql_model::model::filter::{
        calculate_new_relations, factory, merge_filters_and_relations,
        split_filters_and_relations, FilterTree, FiltersOrRelations,
    };
    use jaql_model::model::{Attribute, Filter, FilterRelations};

    fn filter(guid: &str) -> Filter {
        factory::members(&Attribute::text("Brand", "[Commerce.Brand]"), &["Apple"]).with_guid(guid)
    }

    fn leaf(guid: &str) -> FilterRelations {
        FilterRelations::leaf(guid)
    }

    #[test]
    fn test_replaced_filter_keeps_its_place() {
        let prev = vec![filter("a"), filter("b")];
        let next = vec![filter("a"), filter("c")];
        let rel = FilterRelations::or(leaf("a"), leaf("b"));
        assert_eq!(
            calculate_new_relations(&prev, Some(&rel), &next),
            Some(FilterRelations::or(leaf("a"), leaf("c")))
        );
    }

    #[test]
    fn test_removed_filter_is_pruned() {
        let prev = vec![filter("a"), filter("b"), filter("c")];
        let next = vec![filter("a"), filter("b")];
        let rel = FilterRelations::or(leaf("a"), FilterRelations::and(leaf("b"), leaf("c")));
        assert_eq!(
            calculate_new_relations(&prev, Some(&rel), &next),
            Some(FilterRelations::or(leaf("a"), leaf("b")))
        );
    }

    #[test]
    fn test_added_filter_is_anded_at_root() {
        let prev = vec![filter("a"), filter("b")];
        let next = vec![filter("a"), filter("b"), filter("d")];
        let rel = FilterRelations::or(leaf("a"), leaf("b"));
        assert_eq!(
            calculate_new_relations(&prev, Some(&rel), &next),
            Some(FilterRelations::and(
                FilterRelations::or(leaf("a"), leaf("b")),
                leaf("d")
            ))
        );
    }

    #[test]
    fn test_only_and_left_means_no_relations() {
        let prev = vec![filter("a"), filter("b"), filter("c")];
        let next = vec![filter("a"), filter("c")];
        let rel = FilterRelations::and(FilterRelations::or(leaf("a"), leaf("b")), leaf("c"));
        assert_eq!(calculate_new_relations(&prev, Some(&rel), &next), None);
        assert_eq!(calculate_new_relations(&prev, None, &next), None);
    }

    #[test]
    fn test_wire_form() {
        let rel = FilterRelations::or(leaf("f1"), FilterRelations::and(leaf("f2"), leaf("f3")));
        assert_snapshot!(
            serde_json::to_string(&rel.to_jaql()).unwrap(),
            @r#"{"operator":"OR","left":{"instanceid":"f1"},"right":{"operator":"AND","left":{"instanceid":"f2"},"right":{"instanceid":"f3"}}}"#
        );

        let filters = vec![filter("f1"), filter("f2"), filter("f3")];
        assert_eq!(FilterRelations::from_jaql(&rel.to_jaql(), &filters).unwrap(), rel);
    }

    #[test]
    fn test_unknown_instanceid_rejected() {
        let jaql = FilterRelationsJaql::Node {
            operator: RelationOperator::Or,
            left: Box::new(FilterRelationsJaql::Leaf {
                instanceid: "f1".into(),
            }),
            right: Box::new(FilterRelationsJaql::Leaf {
                instanceid: "ghost".into(),
            }),
        };
        let err = FilterRelations::from_jaql(&jaql, &[filter("f1")]).unwrap_err();
        assert_eq!(err.key(), "errors.filterRelations.unknownFilter");
        assert_eq!(err.params().get("guid").map(String::as_str), Some("ghost"));
    }

    #[test]
    fn test_split_and_merge() {
        let tree = FilterTree::Node {
            operator: RelationOperator::Or,
            left: Box::new(FilterTree::Leaf(filter("f1"))),
            right: Box::new(FilterTree::Leaf(filter("f2"))),
        };
        let (filters, relations) = split_filters_and_relations(&FiltersOrRelations::Tree(tree.clone()));
        let guids: Vec<_> = filters.iter().map(|f| f.guid().to_string()).collect();
        assert_eq!(guids, vec!["f1", "f2"]);
        assert_eq!(relations, Some(FilterRelations::or(leaf("f1"), leaf("f2"))));

        let mut with_extra = filters.clone();
        with_extra.push(filter("f3"));
        let merged = merge_filters_and_relations(&with_extra, relations.as_ref()).unwrap();
        assert_eq!(
            merged,
            FiltersOrRelations::Tree(FilterTree::Node {
                operator: RelationOperator::And,
                left: Box::new(tree),
                right: Box::new(FilterTree::Leaf(filter("f3"))),
            })
        );
    }

    #[test]
    fn test_and_only_tree_splits_to_plain_filters() {
        let tree = FilterTree::Node {
            operator: RelationOperator::And,
            left: Box::new(FilterTree::Leaf(filter("f1"))),
            right: Box::new(FilterTree::Leaf(filter("f2"))),
        };
        let (filters, relations) = split_filters_and_relations(&FiltersOrRelations::Tree(tree));
        assert_eq!(filters.len(), 2);
        assert!(relations.is_none());
        assert_eq!(
            merge_filters_and_relations(&filters, None).unwrap(),
            FiltersOrRelations::Filters(filters)
        );
    }
}
