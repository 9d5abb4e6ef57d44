use {
    super::parser::*,
    std::path::{Path, PathBuf},
    crate::{
        error::*,
        sir_model::*,
        attack_orderings::*,
    },
};

pub fn store_path(opt: &Orderings) -> PathBuf
{
    opt.out
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| default_store_path(&opt.network))
}

pub fn execute_orderings(opt: &Orderings) -> SirResult<()>
{
    let path = store_path(opt);
    if path == Path::new(&opt.network) {
        return Err(
            SirError::Config(
                format!("refusing to overwrite the network {} with its orderings", opt.network)
            )
        );
    }
    let graph = load_edge_list(&opt.network)?;
    let store = compute_orderings(&graph, opt)?;
    log::info!("Creating: {}", path.display());
    store.write(&path)
}

pub fn compute_orderings(graph: &SirGraph, opt: &Orderings) -> SirResult<OrderingStore>
{
    match opt.betweenness_pivots {
        None => compute_all(graph, opt.seed(), &ExactCentrality),
        Some(pivots) => {
            log::info!("estimating betweenness from {pivots} pivots");
            let backend = PivotBetweenness{
                pivots,
                seed: opt.seed()
            };
            compute_all(graph, opt.seed(), &backend)
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use std::num::NonZeroUsize;

    #[test]
    fn writes_a_complete_store_next_to_the_network()
    {
        let dir = std::env::temp_dir().join(format!("sir_orderings_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let network = dir.join("net.txt");
        std::fs::write(&network, "# ring with a tail\n1 2\n2 3\n3 4\n4 1\n4 5\n6\n").unwrap();
        let opt = Orderings{
            network: network.to_str().unwrap().to_owned(),
            betweenness_pivots: NonZeroUsize::new(2),
            ..Orderings::default()
        };
        execute_orderings(&opt).unwrap();

        let store = OrderingStore::read(dir.join("net.ord")).unwrap();
        assert_eq!(store.vertex_count(), 6);
        assert_eq!(store.len(), 12);
        for (_, ordering) in store.iter() {
            let mut sorted = ordering.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..6).collect::<Vec<_>>());
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn never_overwrites_the_network()
    {
        let opt = Orderings{
            network: "graph.ord".to_owned(),
            ..Orderings::default()
        };
        assert!(matches!(execute_orderings(&opt), Err(SirError::Config(_))));
    }
}
