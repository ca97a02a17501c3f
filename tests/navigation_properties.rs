//! Navigation property tests.
//!
//! Random trees with unique ids and unique sibling names, driven by random
//! operation sequences.

use drilldown::{DrillDownConfig, DrillDownEngine, NavOp, Node};
use proptest::prelude::*;

/// Build a tree from nested child counts. Names are unique among siblings
/// and ids are unique globally.
fn tree(shape: &[Vec<u8>]) -> Vec<Node> {
    let mut next_id = 0usize;
    build_level(shape, 0, &mut next_id)
}

fn build_level(shape: &[Vec<u8>], depth: usize, next_id: &mut usize) -> Vec<Node> {
    let Some(widths) = shape.get(depth) else {
        return Vec::new();
    };
    let width = widths.get(*next_id % widths.len().max(1)).copied().unwrap_or(0);
    (0..width)
        .map(|i| {
            *next_id += 1;
            let id = format!("n{}", next_id);
            Node::new(id, format!("S{}", i), *next_id as f64)
                .with_children(build_level(shape, depth + 1, next_id))
        })
        .collect()
}

fn all_ids(nodes: &[Node], out: &mut Vec<String>) {
    for node in nodes {
        out.push(node.id.clone());
        all_ids(&node.children, out);
    }
}

fn check_levels(nodes: &[Node], depth: usize) -> bool {
    nodes
        .iter()
        .all(|n| n.level == depth && check_levels(&n.children, depth + 1))
}

fn shape_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(0u8..4, 1..4), 1..5)
}

fn op_strategy(ids: Vec<String>) -> impl Strategy<Value = NavOp> {
    let ids = if ids.is_empty() {
        vec!["missing".to_string()]
    } else {
        ids
    };
    prop_oneof![
        4 => prop::sample::select(ids).prop_map(|id| NavOp::DrillDown { id }),
        2 => Just(NavOp::DrillUp),
        1 => (0usize..7).prop_map(|level| NavOp::DrillToLevel { level }),
        1 => Just(NavOp::Reset),
        1 => prop::collection::vec(
            prop::sample::select(vec!["S0".to_string(), "S1".to_string(), "S9".to_string()]),
            0..4
        )
        .prop_map(|names| NavOp::GoToPath { names }),
    ]
}

fn scenario() -> impl Strategy<Value = (Vec<Node>, Vec<NavOp>, usize)> {
    (shape_strategy(), 1usize..5).prop_flat_map(|(shape, max_depth)| {
        let data = tree(&shape);
        let mut ids = Vec::new();
        all_ids(&data, &mut ids);
        (
            Just(data),
            prop::collection::vec(op_strategy(ids), 0..24),
            Just(max_depth),
        )
    })
}

proptest! {
    #[test]
    fn levels_match_ancestor_count(shape in shape_strategy()) {
        let engine = DrillDownEngine::new(tree(&shape), DrillDownConfig::default());
        prop_assert!(check_levels(engine.root_data(), 0));
    }

    #[test]
    fn depth_bounded_and_data_consistent((data, ops, max_depth) in scenario()) {
        let config = DrillDownConfig::default().with_max_depth(max_depth);
        let mut engine = DrillDownEngine::new(data, config);

        for op in &ops {
            let depth_before = engine.current_depth();
            let before = engine.state();
            let applied = engine.execute(op);

            if !applied {
                prop_assert_eq!(engine.state(), before);
            }
            if let (NavOp::DrillDown { .. }, true) = (op, applied) {
                prop_assert_eq!(engine.current_depth(), depth_before + 1);
            }
            if let NavOp::DrillDown { .. } = op {
                if depth_before == max_depth {
                    prop_assert!(!applied);
                }
            }
            prop_assert!(engine.current_depth() <= max_depth);
            prop_assert_eq!(engine.breadcrumbs(), engine.current_path());
        }
    }

    #[test]
    fn reset_restores_root((data, ops, max_depth) in scenario()) {
        let config = DrillDownConfig::default().with_max_depth(max_depth);
        let mut engine = DrillDownEngine::new(data, config);
        for op in &ops {
            engine.execute(op);
        }

        engine.reset();
        prop_assert!(engine.current_path().is_empty());
        prop_assert!(engine.breadcrumbs().is_empty());
        prop_assert_eq!(engine.current_data(), engine.root_data());
    }

    #[test]
    fn drill_down_then_up_is_inverse((data, ops, max_depth) in scenario()) {
        let config = DrillDownConfig::default().with_max_depth(max_depth);
        let mut engine = DrillDownEngine::new(data, config);
        for op in &ops {
            engine.execute(op);
        }

        // Only child-of-current drills keep names on a root path
        let target = engine
            .current_data()
            .iter()
            .find(|n| n.has_children())
            .map(|n| n.id.clone());
        let path = engine.current_path();
        let on_root_path = path.first().map_or(true, |e| e.level == 0)
            && path.windows(2).all(|pair| {
                engine
                    .get_node_by_id(&pair[0].id)
                    .map_or(false, |parent| parent.children.iter().any(|c| c.id == pair[1].id))
            });

        if let (Some(id), true) = (target, on_root_path) {
            let before = engine.state();
            if engine.drill_down(&id) {
                prop_assert!(engine.drill_up());
                prop_assert_eq!(engine.state(), before);
            }
        }
    }

    #[test]
    fn breadcrumbs_disabled_stay_empty((data, ops, max_depth) in scenario()) {
        let config = DrillDownConfig::default()
            .with_max_depth(max_depth)
            .with_breadcrumbs(false);
        let mut engine = DrillDownEngine::new(data, config);

        for op in &ops {
            engine.execute(op);
            prop_assert!(engine.breadcrumbs().is_empty());
        }
    }
}
