#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use jaql_model::pivot::{
        CellContext, CellKind, FormattedCell, PivotError, PivotGrid, PivotNode, PivotPlugin,
        PluginService,
    };

    fn grid() -> PivotGrid {
        let rows = vec![
            PivotNode::member("Bikes").with_children(vec![
                PivotNode::member("Mountain"),
                PivotNode::member("Road"),
            ]),
            PivotNode::grandtotal("Total"),
        ];
        let columns = vec![
            PivotNode::member("Revenue").with_measure(0),
            PivotNode::member("Units").with_measure(1),
        ];
        PivotGrid::new(
            &rows,
            &columns,
            vec![
                vec![Some(1200.5), Some(10.0)],
                vec![None, Some(4.0)],
                vec![Some(1200.5), Some(14.0)],
            ],
        )
        .unwrap()
        .with_measures(vec!["Revenue".into(), "Units".into()])
    }

    struct Highlight;

    impl PivotPlugin for Highlight {
        fn name(&self) -> &str {
            "highlight"
        }

        fn process_cell(&self, cell: &mut FormattedCell, context: &CellContext<'_>) {
            if context.metadata.kind == CellKind::Grandtotal {
                cell.style.insert("fontWeight".into(), "bold".into());
            }
        }
    }

    struct Units;

    impl PivotPlugin for Units {
        fn name(&self) -> &str {
            "units"
        }

        fn process_cell(&self, cell: &mut FormattedCell, context: &CellContext<'_>) {
            if context.metadata.measure.as_deref() == Some("Units") && cell.value.is_some() {
                cell.text = format!("{} pcs", cell.text);
            }
        }
    }

    #[test]
    fn test_header_tree_shape() {
        let g = grid();
        assert_eq!(g.row_count(), 3);
        assert_eq!(g.column_count(), 2);
        assert_eq!(g.rows.depth(), 2);
        assert_eq!(g.rows.node_at(0, 1).unwrap().value, "Bikes");
        assert_eq!(g.rows.node_at(0, 2).unwrap().value, "Total");
        assert!(g.rows.node_at(1, 2).is_none());
    }

    #[test]
    fn test_cell_metadata_json() {
        let meta = grid().cell_metadata(1, 1).unwrap();
        assert_snapshot!(
            serde_json::to_string(&meta).unwrap(),
            @r#"{"kind":"value","rowPath":["Bikes","Road"],"columnPath":["Units"],"measure":"Units","value":4.0}"#
        );
    }

    #[test]
    fn test_plugins_run_in_registration_order() {
        let service = PluginService::new().with_plugin(Highlight).with_plugin(Units);
        assert_eq!(service.plugin_names(), vec!["highlight", "units"]);

        let cells = service.process_grid(&grid()).unwrap();
        let text: Vec<Vec<&str>> = cells
            .iter()
            .map(|row| row.iter().map(|c| c.text.as_str()).collect())
            .collect();
        assert_eq!(
            text,
            vec![
                vec!["1200.5", "10 pcs"],
                vec!["", "4 pcs"],
                vec!["1200.5", "14 pcs"],
            ]
        );
        assert!(cells[0][0].style.is_empty());
        assert_eq!(cells[2][1].style.get("fontWeight").map(String::as_str), Some("bold"));
    }

    #[test]
    fn test_out_of_range_cell() {
        let err = PluginService::new().process_cell(&grid(), 0, 2).unwrap_err();
        assert_eq!(
            err,
            PivotError::CellOutOfRange {
                row: 0,
                column: 2,
                rows: 3,
                columns: 2
            }
        );
        assert_eq!(err.to_string(), "Cell (0, 2) is outside the 3x2 grid");
    }

    #[test]
    fn test_ragged_values_rejected() {
        let err = PivotGrid::new(
            &[PivotNode::member("a"), PivotNode::member("b")],
            &[PivotNode::member("x"), PivotNode::member("y")],
            vec![vec![Some(1.0), Some(2.0)], vec![Some(3.0)]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            PivotError::ColumnCountMismatch {
                row: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_pivot_nodes_deserialize() {
        let nodes: Vec<PivotNode> = serde_json::from_str(
            r#"[{"value":"2024","children":[{"value":"Q1"},{"value":"Total","nodeType":"subtotal"}]}]"#,
        )
        .unwrap();
        let g = PivotGrid::new(&nodes, &[PivotNode::member("Revenue")], vec![vec![Some(1.0)], vec![Some(1.0)]])
            .unwrap();
        assert_eq!(g.cell_metadata(1, 0).unwrap().kind, CellKind::Subtotal);
        // A single measure applies to every cell
        assert_eq!(
            g.with_measures(vec!["Revenue".into()])
                .cell_metadata(0, 0)
                .unwrap()
                .measure
                .as_deref(),
            Some("Revenue")
        );
    }
}
