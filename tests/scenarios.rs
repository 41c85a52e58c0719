use concur::community::{OptimizerOption, ResolutionMode, Selector};
use concur::similarity;
use concur::{
    CommunityDetection, ConcurrenceGraph, Concurrences, Cpm, Dbscan, Error, Leiden, Louvain,
    Modularity, OptimizerConfig, Partition, Quality, QualityModel, SimilarityKind,
    SingleLinkage,
};
use std::collections::BTreeMap;

fn two_triangles() -> ConcurrenceGraph {
    ConcurrenceGraph::from_edges(
        6,
        [
            (0, 1, 10),
            (1, 2, 10),
            (0, 2, 10),
            (3, 4, 10),
            (4, 5, 10),
            (3, 5, 10),
            (1, 3, 1),
        ],
    )
    .unwrap()
}

fn triangles() -> Partition {
    Partition::from_groups([vec![0, 1, 2], vec![3, 4, 5]])
}

const KINDS: [SimilarityKind; 5] = [
    SimilarityKind::Plain,
    SimilarityKind::Normalized,
    SimilarityKind::Jaccard,
    SimilarityKind::WeightedJaccard,
    SimilarityKind::NormalizedJaccard,
];

#[test]
fn louvain_and_leiden_split_two_triangles() {
    let model = Modularity::new(two_triangles());
    for selector in [Selector::Sequential, Selector::Priority] {
        for mode in [ResolutionMode::Single, ResolutionMode::Multiple] {
            let louvain = Louvain::new()
                .with_selector(selector)
                .with_resolution_mode(mode)
                .detect_from_singletons(&model)
                .unwrap();
            assert_eq!(louvain.canonical(), triangles(), "{selector:?} {mode:?}");

            let leiden = Leiden::new()
                .with_selector(selector)
                .with_resolution_mode(mode)
                .detect_from_singletons(&model)
                .unwrap();
            assert_eq!(leiden.canonical(), triangles(), "{selector:?} {mode:?}");
        }
    }
}

#[test]
fn shuffled_runs_still_find_the_triangles() {
    let model = QualityModel::modularity(two_triangles(), 1.0);
    for seed in 0..8 {
        let p = Louvain::new()
            .with_shuffle(true)
            .with_seed(seed)
            .detect_from_singletons(&model)
            .unwrap();
        assert_eq!(p.canonical(), triangles(), "seed {seed}");
    }
}

#[test]
fn deterministic_without_shuffle() {
    let model = Cpm::new(two_triangles(), 1.5);
    let a = Leiden::new().detect_from_singletons(&model).unwrap();
    let b = Leiden::new().detect_from_singletons(&model).unwrap();
    assert_eq!(a, b);
}

#[test]
fn optimizer_improves_on_initial_partition() {
    let model = Modularity::new(two_triangles());
    let initial: Partition = Partition::from_groups([vec![0, 3], vec![1, 4]]);
    let p = Louvain::new().detect(&model, &initial).unwrap();
    assert!(model.quality(&p) >= model.quality(&model.complete_partition(&initial).unwrap()));
    assert_eq!(p.canonical(), triangles());
}

#[test]
fn options_configure_the_optimizer() {
    let config = OptimizerConfig::from_options(["priority selector", "single resolution"]);
    assert_eq!(
        config,
        OptimizerConfig::new()
            .with_selector(Selector::Priority)
            .with_resolution_mode(ResolutionMode::Single)
    );
    let p = Louvain::with_config(config)
        .detect_from_singletons(&Modularity::new(two_triangles()))
        .unwrap();
    assert_eq!(p.canonical(), triangles());

    assert_eq!(
        "multi resolution".parse::<OptimizerOption>(),
        Err(Error::UnknownOption("multi resolution".into()))
    );
}

#[test]
fn dbscan_plain_two_triangles() {
    let p = Dbscan::new(0.6, 3)
        .with_similarity(SimilarityKind::Plain)
        .fit_nodes(&two_triangles())
        .unwrap();
    assert_eq!(p.len(), 2);
    assert_eq!(p.canonical(), triangles());
}

#[test]
fn clustering_always_covers_every_subject() {
    let g = two_triangles();
    for kind in KINDS {
        for eps in [0.0, 0.3, 0.6, 0.9] {
            let p = Dbscan::new(eps, 2).with_similarity(kind).fit_nodes(&g).unwrap();
            assert!(p.validate(6).is_ok());
            assert_eq!(p.member_count(), 6);

            let p = SingleLinkage::new(eps).with_similarity(kind).fit_nodes(&g).unwrap();
            assert!(p.validate(6).is_ok());
            assert_eq!(p.member_count(), 6);
        }
    }
}

#[test]
fn single_linkage_matches_dbscan_with_min_pts_one() {
    // With min_pts = 1 every subject is core, so DBSCAN clusters are the components of
    // the eps-neighborhood graph, which is exactly what single linkage computes.
    let g = two_triangles();
    for eps in [0.2, 0.52, 0.6, 0.96] {
        let dense = Dbscan::new(eps, 1).fit_nodes(&g).unwrap();
        let linked = SingleLinkage::new(eps).fit_nodes(&g).unwrap();
        assert_eq!(dense.canonical(), linked.canonical(), "eps = {eps}");
    }
}

#[test]
fn pair_and_group_clustering() {
    let g = two_triangles();
    let pairs = Dbscan::new(0.5, 2).fit_pairs(&g).unwrap();
    let covered: usize = pairs.iter().map(|c| c.len()).sum();
    assert_eq!(covered, 7);

    let groups: Partition = Partition::from_groups([vec![0, 1], vec![1, 2], vec![3, 4], vec![4, 5]]);
    let p = SingleLinkage::new(0.5).fit_groups(&g, &groups).unwrap();
    assert_eq!(p, Partition::from_groups([vec![0, 1], vec![2, 3]]));
}

#[test]
fn every_transform_is_symmetric_with_unit_diagonal() {
    let g = two_triangles();
    for kind in KINDS {
        let m = similarity::induce(&g, kind);
        assert_eq!(m.len(), 6);
        for (a, row) in m.rows() {
            assert_eq!(m.get(a, a), 1.0, "{kind:?}");
            for (b, &s) in row {
                assert!((0.0..=1.0).contains(&s), "{kind:?}: {s}");
                assert_eq!(m.get(b, a), s, "{kind:?}");
            }
        }
    }
}

#[test]
fn malformed_graphs_are_rejected() {
    let mut c: Concurrences = BTreeMap::new();
    c.entry(0).or_default().insert(1, 3);
    c.entry(1).or_default().insert(0, 2);
    assert_eq!(
        ConcurrenceGraph::new(2, c),
        Err(Error::AsymmetricConcurrence { u: 0, v: 1 })
    );

    assert_eq!(
        ConcurrenceGraph::from_edges(2, [(0, 2, 1)]),
        Err(Error::NodeOutOfRange { node: 2, n: 2 })
    );
}

#[test]
fn invalid_partitions_are_rejected_before_optimizing() {
    let model = Modularity::new(two_triangles());
    let dup: Partition = Partition::from_groups([vec![0, 1], vec![1]]);
    assert_eq!(
        Louvain::new().detect(&model, &dup),
        Err(Error::DuplicateAssignment { node: 1 })
    );
    let oob: Partition = Partition::from_groups([vec![7]]);
    assert_eq!(
        Leiden::new().detect(&model, &oob),
        Err(Error::NodeOutOfRange { node: 7, n: 6 })
    );
}
