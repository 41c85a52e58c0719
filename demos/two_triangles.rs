use concur::community::{CommunityDetection, Cpm, Leiden, Louvain, Modularity};
use concur::{ConcurrenceGraph, Dbscan, SimilarityKind, SingleLinkage};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Two dense triangles joined by one weak concurrence (1-3).
    //
    // Every algorithm in the crate should report the two triangles. The example is small
    // on purpose: it exercises each public entry point once.
    let graph = ConcurrenceGraph::from_edges(
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
    )?;

    let louvain = Louvain::new().detect_from_singletons(&Modularity::new(graph.clone()))?;
    println!("louvain (modularity, r = 1): {:?}", louvain.groups());

    let leiden = Leiden::new().detect_from_singletons(&Cpm::new(graph.clone(), 2.0))?;
    println!("leiden (cpm, r = 2):         {:?}", leiden.groups());

    let dbscan = Dbscan::new(0.6, 3)
        .with_similarity(SimilarityKind::Plain)
        .fit_nodes(&graph)?;
    println!("dbscan (eps 0.6, min 3):     {:?}", dbscan.groups());

    let linkage = SingleLinkage::new(0.6).fit_nodes(&graph)?;
    println!("single linkage (eps 0.6):    {:?}", linkage.groups());

    let dendrogram = SingleLinkage::new(0.6).dendrogram_nodes(&graph);
    println!("merge distances:             {:?}", dendrogram.distances());

    Ok(())
}
