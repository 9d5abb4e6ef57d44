use {
    std::{
        collections::{HashMap, HashSet, VecDeque},
        fs::File,
        io::{BufRead, BufReader},
        path::Path,
    },
    net_ensembles::{AdjContainer, GenericGraph, Node},
    rand::Rng,
    super::*,
    crate::error::*,
};

/// The contact network. Node payload is the infection state, so a clone of
/// the graph doubles as the private population of one trial.
pub type SirGraph = net_ensembles::Graph<InfectionState>;

pub fn neighbor_indices<T, A>(graph: &GenericGraph<T, A>, index: usize) -> impl Iterator<Item = usize> + '_
where A: AdjContainer<T>, T: Node
{
    graph.contained_iter_neighbors_with_index(index)
        .map(|(n_index, _)| n_index)
}

/// Uniformly drawn neighbor of `index`, None for isolated vertices
pub fn random_neighbor<T, A, R>(graph: &GenericGraph<T, A>, index: usize, rng: &mut R) -> Option<usize>
where A: AdjContainer<T>, T: Node, R: Rng
{
    let degree = graph.degree(index)?;
    if degree == 0 {
        return None;
    }
    let which = rng.gen_range(0..degree);
    neighbor_indices(graph, index).nth(which)
}

/// Members of every connected component, largest first.
/// Equal sized components are ordered by their smallest vertex.
pub fn component_members<T, A>(graph: &GenericGraph<T, A>) -> Vec<Vec<usize>>
where A: AdjContainer<T>, T: Node
{
    let n = graph.vertex_count();
    let mut seen = vec![false; n];
    let mut components = Vec::new();
    let mut queue = VecDeque::new();
    for root in 0..n {
        if seen[root] {
            continue;
        }
        seen[root] = true;
        queue.push_back(root);
        let mut members = Vec::new();
        while let Some(current) = queue.pop_front() {
            members.push(current);
            for n_index in neighbor_indices(graph, current) {
                if !seen[n_index] {
                    seen[n_index] = true;
                    queue.push_back(n_index);
                }
            }
        }
        members.sort_unstable();
        components.push(members);
    }
    // stable sort keeps discovery order, i.e. smallest vertex first, for ties
    components.sort_by(|a, b| b.len().cmp(&a.len()));
    components
}

/// `component_id[v]` for every vertex, ids as in [component_members]
pub fn component_ids(components: &[Vec<usize>], n: usize) -> Vec<usize>
{
    let mut ids = vec![0; n];
    for (id, members) in components.iter().enumerate() {
        for &v in members {
            ids[v] = id;
        }
    }
    ids
}

pub fn largest_component<T, A>(graph: &GenericGraph<T, A>) -> Vec<usize>
where A: AdjContainer<T>, T: Node
{
    component_members(graph)
        .into_iter()
        .next()
        .unwrap_or_default()
}

/// Builds a graph with `n` vertices from an edge list over dense ids.
/// Self loops and repeated edges are ignored.
pub fn graph_from_edges(n: usize, edges: &[(usize, usize)]) -> SirResult<SirGraph>
{
    let mut graph = SirGraph::new(n);
    let mut known = HashSet::with_capacity(edges.len());
    for &(a, b) in edges {
        if a >= n || b >= n {
            return Err(SirError::Graph(format!("edge ({a}, {b}) out of range for {n} vertices")));
        }
        if a == b || !known.insert((a.min(b), a.max(b))) {
            continue;
        }
        graph.add_edge(a, b)
            .map_err(|e| SirError::Graph(format!("unable to add edge ({a}, {b}): {e:?}")))?;
    }
    Ok(graph)
}

/// Reads an edge list. Labels are arbitrary tokens renumbered to `0..n-1`
/// in order of first appearance.
pub fn parse_edge_list<R: BufRead>(reader: R, path: &str) -> SirResult<SirGraph>
{
    let mut labels: HashMap<String, usize> = HashMap::new();
    let mut edges = Vec::new();
    let id_of = |label: &str, labels: &mut HashMap<String, usize>| {
        let next = labels.len();
        *labels.entry(label.to_owned()).or_insert(next)
    };

    for (line_index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| SirError::io(path, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('%') {
            continue;
        }
        let tokens: Vec<_> = trimmed.split_whitespace().collect();
        match tokens.as_slice() {
            [single] => {
                id_of(*single, &mut labels);
            },
            [a, b] => {
                let a = id_of(*a, &mut labels);
                let b = id_of(*b, &mut labels);
                edges.push((a, b));
            },
            _ => return Err(
                SirError::NetworkFormat{
                    path: path.to_owned(),
                    line: line_index + 1,
                    reason: format!("expected one or two vertex labels, found {}", tokens.len())
                }
            )
        }
    }
    if labels.is_empty() {
        return Err(
            SirError::NetworkFormat{
                path: path.to_owned(),
                line: 0,
                reason: "network has no vertices".to_owned()
            }
        );
    }
    graph_from_edges(labels.len(), &edges)
}

pub fn load_edge_list<P: AsRef<Path>>(path: P) -> SirResult<SirGraph>
{
    let file = File::open(path.as_ref())
        .map_err(|e| SirError::io(path.as_ref(), e))?;
    let name = path.as_ref().display().to_string();
    let graph = parse_edge_list(BufReader::new(file), &name)?;
    log::info!(
        "Loaded {name}: {} vertices, {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Private copy of the network that supports vertex removal.
///
/// A removed vertex loses all its edges and is no longer alive.
/// Every removal bumps the generation, which invalidates cached measures.
#[derive(Clone)]
pub struct WorkingNetwork
{
    graph: SirGraph,
    alive: Vec<bool>,
    alive_list: Vec<usize>,
    position: Vec<usize>,
    generation: u64,
}

impl WorkingNetwork
{
    pub fn new(graph: &SirGraph) -> Self
    {
        let n = graph.vertex_count();
        Self{
            graph: graph.clone(),
            alive: vec![true; n],
            alive_list: (0..n).collect(),
            position: (0..n).collect(),
            generation: 0
        }
    }

    pub fn graph(&self) -> &SirGraph
    {
        &self.graph
    }

    pub fn vertex_count(&self) -> usize
    {
        self.alive.len()
    }

    pub fn alive_count(&self) -> usize
    {
        self.alive_list.len()
    }

    pub fn is_alive(&self, index: usize) -> bool
    {
        self.alive[index]
    }

    /// Alive vertices in ascending order
    pub fn alive_vertices(&self) -> impl Iterator<Item = usize> + '_
    {
        self.alive.iter()
            .enumerate()
            .filter_map(|(index, &alive)| alive.then_some(index))
    }

    pub fn generation(&self) -> u64
    {
        self.generation
    }

    pub fn degree(&self, index: usize) -> usize
    {
        self.graph.degree(index).unwrap_or(0)
    }

    pub fn random_alive<R: Rng>(&self, rng: &mut R) -> Option<usize>
    {
        if self.alive_list.is_empty() {
            None
        } else {
            Some(self.alive_list[rng.gen_range(0..self.alive_list.len())])
        }
    }

    pub fn random_neighbor<R: Rng>(&self, index: usize, rng: &mut R) -> Option<usize>
    {
        random_neighbor(&self.graph, index, rng)
    }

    /// Adjacency snapshot, empty lists for removed vertices
    pub fn neighbor_lists(&self) -> Vec<Vec<usize>>
    {
        (0..self.vertex_count())
            .map(|index| neighbor_indices(&self.graph, index).collect())
            .collect()
    }

    pub fn remove_vertex(&mut self, index: usize) -> SirResult<()>
    {
        if !self.alive[index] {
            return Ok(());
        }
        let neighbors: Vec<_> = neighbor_indices(&self.graph, index).collect();
        for n_index in neighbors {
            self.graph.remove_edge(index, n_index)
                .map_err(|e| SirError::Graph(format!("unable to remove edge ({index}, {n_index}): {e:?}")))?;
        }
        self.alive[index] = false;
        let pos = self.position[index];
        self.alive_list.swap_remove(pos);
        if let Some(&moved) = self.alive_list.get(pos) {
            self.position[moved] = pos;
        }
        self.generation += 1;
        Ok(())
    }
}

#[cfg(test)]
pub mod test_graphs
{
    use super::*;

    pub fn path(n: usize) -> SirGraph
    {
        let edges: Vec<_> = (1..n).map(|i| (i - 1, i)).collect();
        graph_from_edges(n, &edges).unwrap()
    }

    pub fn cycle(n: usize) -> SirGraph
    {
        let edges: Vec<_> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        graph_from_edges(n, &edges).unwrap()
    }

    /// vertex 0 is the hub
    pub fn star(leaves: usize) -> SirGraph
    {
        let edges: Vec<_> = (1..=leaves).map(|i| (0, i)).collect();
        graph_from_edges(leaves + 1, &edges).unwrap()
    }

    /// triangle 0-1-2, path 3-4 and isolated 5 and 6
    pub fn fragmented() -> SirGraph
    {
        graph_from_edges(7, &[(0, 1), (1, 2), (2, 0), (3, 4)]).unwrap()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use super::test_graphs::*;
    use rand_pcg::Pcg64;
    use rand::SeedableRng;

    #[test]
    fn edge_list_is_renumbered_by_first_appearance()
    {
        let text = "# comment\nalice bob\nbob carol\n\n% other comment\ncarol alice\nalice alice\nbob alice\ndave\n";
        let graph = parse_edge_list(text.as_bytes(), "inline").unwrap();
        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.degree(3), Some(0));
        let mut n: Vec<_> = neighbor_indices(&graph, 0).collect();
        n.sort_unstable();
        assert_eq!(n, vec![1, 2]);
    }

    #[test]
    fn malformed_line_reports_line_number()
    {
        let text = "0 1\n1 2 3\n";
        match parse_edge_list(text.as_bytes(), "inline") {
            Err(SirError::NetworkFormat { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result {:?}", other.map(|g| g.vertex_count()))
        }
        assert!(parse_edge_list("# nothing\n".as_bytes(), "inline").is_err());
    }

    #[test]
    fn components_are_sorted_by_size()
    {
        let graph = fragmented();
        let components = component_members(&graph);
        assert_eq!(components, vec![vec![0, 1, 2], vec![3, 4], vec![5], vec![6]]);
        assert_eq!(largest_component(&graph), vec![0, 1, 2]);
        let ids = component_ids(&components, 7);
        assert_eq!(ids, vec![0, 0, 0, 1, 1, 2, 3]);
    }

    #[test]
    fn random_neighbor_stays_adjacent()
    {
        let graph = star(5);
        let mut rng = Pcg64::seed_from_u64(3);
        for _ in 0..50 {
            let n = random_neighbor(&graph, 0, &mut rng).unwrap();
            assert!((1..=5).contains(&n));
            assert_eq!(random_neighbor(&graph, n, &mut rng), Some(0));
        }
        let lonely = graph_from_edges(2, &[]).unwrap();
        assert_eq!(random_neighbor(&lonely, 1, &mut rng), None);
    }

    #[test]
    fn removal_isolates_vertex_and_bumps_generation()
    {
        let graph = star(4);
        let mut working = WorkingNetwork::new(&graph);
        working.remove_vertex(0).unwrap();
        assert_eq!(working.generation(), 1);
        assert_eq!(working.alive_count(), 4);
        assert!(!working.is_alive(0));
        assert!((1..=4).all(|v| working.degree(v) == 0));
        // removing twice is a no-op
        working.remove_vertex(0).unwrap();
        assert_eq!(working.generation(), 1);
        assert_eq!(working.alive_vertices().collect::<Vec<_>>(), vec![1, 2, 3, 4]);

        let mut rng = Pcg64::seed_from_u64(1);
        for _ in 0..20 {
            let v = working.random_alive(&mut rng).unwrap();
            assert!(working.is_alive(v));
        }
        // base graph untouched
        assert_eq!(graph.degree(0), Some(4));
    }
}
