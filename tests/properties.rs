use concur::community::{ResolutionMode, Selector};
use concur::similarity;
use concur::{
    CommunityDetection, ConcurrenceGraph, Cpm, Dbscan, Louvain, Modularity, Partition, Quality,
    QualityModel, SimilarityKind, SingleLinkage,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Random graph on 1..=20 nodes with weights in 1..20.
fn arb_graph() -> impl Strategy<Value = ConcurrenceGraph> {
    (1usize..=20).prop_flat_map(|n| {
        proptest::collection::vec((0..n, 0..n, 1u64..20), 0..60).prop_map(move |edges| {
            let edges: Vec<_> = edges.into_iter().filter(|(u, v, _)| u != v).collect();
            ConcurrenceGraph::from_edges(n, edges).unwrap()
        })
    })
}

/// Random graph plus a complete labeling with at most four groups.
fn arb_labeled() -> impl Strategy<Value = (ConcurrenceGraph, Vec<usize>)> {
    arb_graph().prop_flat_map(|g| {
        let n = g.node_count();
        (Just(g), proptest::collection::vec(0usize..4, n))
    })
}

fn arb_kind() -> impl Strategy<Value = SimilarityKind> {
    prop_oneof![
        Just(SimilarityKind::Plain),
        Just(SimilarityKind::Normalized),
        Just(SimilarityKind::Jaccard),
        Just(SimilarityKind::WeightedJaccard),
        Just(SimilarityKind::NormalizedJaccard),
    ]
}

/// `a == b` up to a tolerance relative to `scale`, the magnitude of the qualities involved.
fn close(a: f64, b: f64, scale: f64) -> bool {
    (a - b).abs() <= 1e-9 * (1.0 + scale.abs())
}

fn move_node(p: &Partition, node: usize, from: usize, to: usize) -> Partition {
    let mut groups: Vec<BTreeSet<usize>> = p.groups().to_vec();
    let _ = groups[from].remove(&node);
    let _ = groups[to].insert(node);
    groups.into_iter().collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_graph_is_symmetric(g in arb_graph()) {
        let n = g.node_count();
        let mut total = 0;
        for u in 0..n {
            let row_sum: u64 = g.neighbors(u).values().sum();
            prop_assert_eq!(g.strength(u), row_sum);
            total += row_sum;
            for v in 0..n {
                prop_assert_eq!(g.weight(u, v), g.weight(v, u));
            }
        }
        prop_assert_eq!(g.total_weight(), total);
    }

    #[test]
    fn prop_complete_partition_is_idempotent((g, labels) in arb_labeled(), keep in 0usize..=20) {
        let n = g.node_count();
        let full = Partition::from_labels(&labels);
        // Keep only the members below `keep` to get a partial partition.
        let partial: Partition = full
            .iter()
            .map(|grp| grp.iter().copied().filter(|&u| u < keep).collect::<BTreeSet<_>>())
            .collect();

        let once = g.complete_partition(&partial).unwrap();
        prop_assert!(once.validate(n).is_ok());
        prop_assert!(once.labels(n).is_ok());
        prop_assert_eq!(g.complete_partition(&once).unwrap(), once.clone());
        prop_assert_eq!(&once.groups()[..partial.len()], partial.groups());
    }

    #[test]
    fn prop_delta_matches_quality_difference(
        (g, labels) in arb_labeled(),
        node_seed in 0usize..1000,
        target_seed in 0usize..1000,
        r in 0.0f64..2.0,
    ) {
        let n = g.node_count();
        let before = Partition::from_labels(&labels);
        let node = node_seed % n;
        let from = labels_group(&before, node);
        let to = target_seed % before.len();
        let after = move_node(&before, node, from, to);

        let models = [QualityModel::modularity(g.clone(), r), QualityModel::cpm(g, r)];
        for m in &models {
            let delta = m.delta_quality(&before, node, from, to);
            let (q0, q1) = (m.quality(&before), m.quality(&after));
            let diff = q1 - q0;
            prop_assert!(close(delta, diff, q0.abs() + q1.abs()), "delta {} vs diff {}", delta, diff);
            if from == to {
                prop_assert_eq!(delta, 0.0);
            }
        }
    }

    #[test]
    fn prop_optimizer_never_lowers_quality(
        (g, labels) in arb_labeled(),
        r in 0.0f64..2.0,
        priority in any::<bool>(),
        multi in any::<bool>(),
    ) {
        let n = g.node_count();
        let initial = Partition::from_labels(&labels);
        let selector = if priority { Selector::Priority } else { Selector::Sequential };
        let mode = if multi { ResolutionMode::Multiple } else { ResolutionMode::Single };
        let louvain = Louvain::new().with_selector(selector).with_resolution_mode(mode);

        let modularity = Modularity::with_resolution(g.clone(), r);
        let cpm = Cpm::new(g, r);

        let p = louvain.detect(&modularity, &initial).unwrap();
        prop_assert!(p.validate(n).is_ok());
        prop_assert_eq!(p.member_count(), n);
        prop_assert!(p.iter().all(|grp| !grp.is_empty()));
        prop_assert!(modularity.quality(&p) >= modularity.quality(&initial) - 1e-9);

        let p = louvain.detect(&cpm, &initial).unwrap();
        prop_assert_eq!(p.member_count(), n);
        prop_assert!(cpm.quality(&p) >= cpm.quality(&initial) - 1e-9);
    }

    #[test]
    fn prop_aggregation_round_trip((g, labels) in arb_labeled(), r in 0.0f64..2.0) {
        let p = Partition::from_labels(&labels);
        let agg = g.aggregate(&p).unwrap();
        let k = p.len();

        prop_assert_eq!(agg.node_count(), k);
        prop_assert_eq!(agg.total_weight(), g.total_weight());
        prop_assert_eq!(Partition::singletons(k).flatten(&p).unwrap(), p.clone());
        let sizes: usize = (0..k).map(|i| agg.node_size(i)).sum();
        prop_assert_eq!(sizes, g.node_count());

        // Merging two super-nodes changes quality exactly as merging their groups does.
        if k >= 2 {
            let merged = Partition::singletons(k).flatten(&p).unwrap();
            let mut groups = merged.into_groups();
            let second = groups.remove(1);
            groups[0].extend(second);
            let merged: Partition = groups.into_iter().collect();

            for m in [QualityModel::modularity(g.clone(), r), QualityModel::cpm(g.clone(), r)] {
                let coarse = m.aggregate(&p).unwrap();
                let (q0, q1) = (m.quality(&p), m.quality(&merged));
                let lifted = coarse.delta_quality(&Partition::singletons(k), 1, 1, 0);
                prop_assert!(close(q1 - q0, lifted, q0.abs() + q1.abs()), "{} vs {}", q1 - q0, lifted);
            }
        }
    }

    #[test]
    fn prop_similarities_are_symmetric(g in arb_graph(), kind in arb_kind()) {
        let m = similarity::induce(&g, kind);
        prop_assert_eq!(m.len(), g.node_count());
        for (a, row) in m.rows() {
            prop_assert_eq!(m.get(a, a), 1.0);
            for (b, &s) in row {
                prop_assert!((0.0..=1.0).contains(&s));
                prop_assert_eq!(m.get(b, a), s);
            }
        }
    }

    #[test]
    fn prop_dbscan_covers_every_node(
        g in arb_graph(),
        kind in arb_kind(),
        eps in 0.0f64..1.0,
        min_pts in 1usize..5,
    ) {
        let n = g.node_count();
        let p = Dbscan::new(eps, min_pts).with_similarity(kind).fit_nodes(&g).unwrap();
        prop_assert!(p.validate(n).is_ok());
        prop_assert_eq!(p.member_count(), n);
    }

    #[test]
    fn prop_dendrogram_cut_matches_scan(g in arb_graph(), kind in arb_kind(), eps in 0.0f64..0.99) {
        let sims = similarity::induce(&g, kind);
        let scan = SingleLinkage::new(eps).fit_matrix(&sims).unwrap();
        let dendro = SingleLinkage::dendrogram_matrix(&sims);
        prop_assert_eq!(dendro.cut_at_distance(eps), scan);
    }
}

fn labels_group(p: &Partition, node: usize) -> usize {
    p.iter().position(|g| g.contains(&node)).unwrap_or(0)
}
