use {
    std::{
        collections::{HashMap, VecDeque},
        num::NonZeroUsize,
    },
    serde::{Serialize, Deserialize},
    rand::{SeedableRng, seq::index},
    rand_pcg::Pcg64,
    super::*,
    crate::sir_model::WorkingNetwork,
};

const EIGENVECTOR_TOLERANCE: f64 = 1e-10;
const EIGENVECTOR_MAX_ITER: usize = 1000;
/// scores are compared on this grid after scaling the maximum to 1
const RANK_RESOLUTION: f64 = 1e9;

/// Structural importance measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
pub enum Measure{
    Betweenness,
    Closeness,
    Degree,
    Eigenvector,
}

impl Measure{
    pub const ALL: [Measure; 4] = [
        Self::Betweenness,
        Self::Closeness,
        Self::Degree,
        Self::Eigenvector
    ];

    pub fn from_kind(kind: OrderingKind) -> Option<Self>
    {
        match kind{
            OrderingKind::Betweenness => Some(Self::Betweenness),
            OrderingKind::Closeness => Some(Self::Closeness),
            OrderingKind::Degree => Some(Self::Degree),
            OrderingKind::Eigenvector => Some(Self::Eigenvector),
            OrderingKind::RandomWalk | OrderingKind::Referral => None
        }
    }

    pub fn kind(self) -> OrderingKind
    {
        match self{
            Self::Betweenness => OrderingKind::Betweenness,
            Self::Closeness => OrderingKind::Closeness,
            Self::Degree => OrderingKind::Degree,
            Self::Eigenvector => OrderingKind::Eigenvector,
        }
    }
}

/// Computes one score per vertex of the working network.
/// Scores of removed vertices are ignored by the caller.
pub trait CentralityBackend: Sync
{
    fn scores(&self, measure: Measure, network: &WorkingNetwork) -> Vec<f64>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExactCentrality;

impl CentralityBackend for ExactCentrality
{
    fn scores(&self, measure: Measure, network: &WorkingNetwork) -> Vec<f64>
    {
        match measure{
            Measure::Degree => degree_scores(network),
            Measure::Betweenness => betweenness_scores(network),
            Measure::Closeness => closeness_scores(network),
            Measure::Eigenvector => eigenvector_scores(network),
        }
    }
}

/// Betweenness estimated from a seeded sample of source pivots,
/// all other measures are exact
#[derive(Debug, Clone, Copy)]
pub struct PivotBetweenness
{
    pub pivots: NonZeroUsize,
    pub seed: u64,
}

impl CentralityBackend for PivotBetweenness
{
    fn scores(&self, measure: Measure, network: &WorkingNetwork) -> Vec<f64>
    {
        match measure{
            Measure::Betweenness => {
                let alive: Vec<_> = network.alive_vertices().collect();
                if alive.len() <= self.pivots.get() {
                    return betweenness_scores(network);
                }
                // same generation, same pivots
                let mut rng = Pcg64::seed_from_u64(self.seed.wrapping_add(network.generation()));
                let sources: Vec<_> = index::sample(&mut rng, alive.len(), self.pivots.get())
                    .into_iter()
                    .map(|i| alive[i])
                    .collect();
                let scale = alive.len() as f64 / sources.len() as f64;
                let mut scores = brandes(&network.neighbor_lists(), &sources);
                scores.iter_mut()
                    .for_each(|s| *s *= scale);
                normalize_betweenness(&mut scores, alive.len());
                scores
            },
            _ => ExactCentrality.scores(measure, network)
        }
    }
}

pub fn degree_scores(network: &WorkingNetwork) -> Vec<f64>
{
    let n = network.alive_count();
    let norm = if n > 1 { 1.0 / (n - 1) as f64 } else { 1.0 };
    (0..network.vertex_count())
        .map(|index| network.degree(index) as f64 * norm)
        .collect()
}

pub fn betweenness_scores(network: &WorkingNetwork) -> Vec<f64>
{
    let sources: Vec<_> = network.alive_vertices().collect();
    let mut scores = brandes(&network.neighbor_lists(), &sources);
    normalize_betweenness(&mut scores, sources.len());
    scores
}

fn normalize_betweenness(scores: &mut [f64], alive: usize)
{
    // every undirected path was counted from both ends
    let norm = if alive > 2 {
        1.0 / ((alive - 1) * (alive - 2)) as f64
    } else {
        0.5
    };
    scores.iter_mut()
        .for_each(|s| *s *= norm);
}

/// Brandes' accumulation of shortest path dependencies for the given sources
fn brandes(adj: &[Vec<usize>], sources: &[usize]) -> Vec<f64>
{
    let n = adj.len();
    let mut centrality = vec![0.0; n];
    let mut stack = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0_f64; n];
    let mut dist = vec![usize::MAX; n];
    let mut delta = vec![0.0_f64; n];
    let mut queue = VecDeque::with_capacity(n);

    for &source in sources {
        sigma[source] = 1.0;
        dist[source] = 0;
        queue.push_back(source);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let next = dist[v] + 1;
            for &w in adj[v].iter() {
                if dist[w] == usize::MAX {
                    dist[w] = next;
                    queue.push_back(w);
                }
                if dist[w] == next {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            let coeff = (1.0 + delta[w]) / sigma[w];
            for &v in predecessors[w].iter() {
                delta[v] += sigma[v] * coeff;
            }
            if w != source {
                centrality[w] += delta[w];
            }
            // reset only what this source touched
            predecessors[w].clear();
            sigma[w] = 0.0;
            dist[w] = usize::MAX;
            delta[w] = 0.0;
        }
    }
    centrality
}

/// Wasserman-Faust closeness, scaled by the reachable fraction
/// so that disconnected networks rank sensibly
pub fn closeness_scores(network: &WorkingNetwork) -> Vec<f64>
{
    let adj = network.neighbor_lists();
    let n = network.vertex_count();
    let alive = network.alive_count();
    let mut scores = vec![0.0; n];
    if alive < 2 {
        return scores;
    }
    let mut dist = vec![usize::MAX; n];
    let mut visited = Vec::with_capacity(n);
    let mut queue = VecDeque::with_capacity(n);

    for source in network.alive_vertices() {
        dist[source] = 0;
        queue.push_back(source);
        let mut total = 0_usize;
        while let Some(v) = queue.pop_front() {
            visited.push(v);
            total += dist[v];
            for &w in adj[v].iter() {
                if dist[w] == usize::MAX {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
            }
        }
        let reachable = (visited.len() - 1) as f64;
        if total > 0 {
            scores[source] = (reachable / (alive - 1) as f64) * (reachable / total as f64);
        }
        for v in visited.drain(..) {
            dist[v] = usize::MAX;
        }
    }
    scores
}

/// Power iteration on `A + I`, the shift keeps bipartite networks from
/// oscillating. Largest score is scaled to 1.
pub fn eigenvector_scores(network: &WorkingNetwork) -> Vec<f64>
{
    let adj = network.neighbor_lists();
    let n = network.vertex_count();
    let mut x: Vec<f64> = (0..n)
        .map(|v| if network.is_alive(v) { 1.0 } else { 0.0 })
        .collect();
    let mut y = vec![0.0; n];

    for _ in 0..EIGENVECTOR_MAX_ITER {
        for v in 0..n {
            y[v] = if network.is_alive(v) {
                x[v] + adj[v].iter().map(|&w| x[w]).sum::<f64>()
            } else {
                0.0
            };
        }
        let norm = y.iter().map(|val| val * val).sum::<f64>().sqrt();
        if norm == 0.0 {
            break;
        }
        let mut change = 0.0_f64;
        for v in 0..n {
            let new = y[v] / norm;
            change = change.max((new - x[v]).abs());
            x[v] = new;
        }
        if change < EIGENVECTOR_TOLERANCE {
            break;
        }
    }
    let max = x.iter().cloned().fold(0.0, f64::max);
    if max > 0.0 {
        x.iter_mut()
            .for_each(|val| *val /= max);
    }
    x
}

/// Alive vertices by descending score, ties by ascending vertex id.
/// Scores are compared after scaling the maximum to 1 and rounding to
/// [RANK_RESOLUTION], so floating point noise cannot reorder equal scores.
pub fn rank_vertices(scores: &[f64], network: &WorkingNetwork) -> Vec<usize>
{
    let max = network.alive_vertices()
        .map(|v| scores[v])
        .fold(0.0, f64::max);
    let scale = if max > 0.0 { RANK_RESOLUTION / max } else { 0.0 };
    let mut keyed: Vec<(i64, usize)> = network.alive_vertices()
        .map(|v| ((scores[v] * scale).round() as i64, v))
        .collect();
    keyed.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    keyed.into_iter()
        .map(|(_, v)| v)
        .collect()
}

/// Memoized scores of one working network.
///
/// Entries remember the generation they were computed for and are
/// recomputed as soon as the network has been mutated.
/// Use one cache per working network.
#[derive(Debug, Clone, Default)]
pub struct CentralityCache
{
    entries: HashMap<Measure, (u64, Vec<f64>)>,
}

impl CentralityCache
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn scores<B>(&mut self, backend: &B, measure: Measure, network: &WorkingNetwork) -> &[f64]
    where B: CentralityBackend + ?Sized
    {
        let generation = network.generation();
        let entry = self.entries
            .entry(measure)
            .or_insert_with(|| (u64::MAX, Vec::new()));
        if entry.0 != generation {
            entry.1 = backend.scores(measure, network);
            entry.0 = generation;
        }
        &entry.1
    }

    pub fn ranking<B>(&mut self, backend: &B, measure: Measure, network: &WorkingNetwork) -> Vec<usize>
    where B: CentralityBackend + ?Sized
    {
        let scores = self.scores(backend, measure, network);
        rank_vertices(scores, network)
    }

    pub fn is_fresh(&self, measure: Measure, network: &WorkingNetwork) -> bool
    {
        self.entries.get(&measure)
            .map_or(false, |(generation, _)| *generation == network.generation())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::sir_model::{graph_from_edges, test_graphs::*};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn close(a: f64, b: f64) -> bool
    {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn star_hub_dominates_every_measure()
    {
        let working = WorkingNetwork::new(&star(5));
        for measure in Measure::ALL {
            let ranking = rank_vertices(&ExactCentrality.scores(measure, &working), &working);
            assert_eq!(ranking, vec![0, 1, 2, 3, 4, 5], "{measure:?}");
        }
    }

    #[test]
    fn path_betweenness_and_closeness()
    {
        // 0-1-2-3-4
        let working = WorkingNetwork::new(&path(5));
        let bet = betweenness_scores(&working);
        // raw pair counts 0,3,4,3,0 normalized by (n-1)(n-2)/2 = 6
        let expected = [0.0, 0.5, 4.0 / 6.0, 0.5, 0.0];
        for (b, e) in bet.iter().zip(expected) {
            assert!(close(*b, e), "{bet:?}");
        }
        let clo = closeness_scores(&working);
        assert!(close(clo[2], 4.0 / 6.0));
        assert!(close(clo[0], 4.0 / 10.0));
        assert_eq!(rank_vertices(&bet, &working), vec![2, 1, 3, 0, 4]);
        assert_eq!(rank_vertices(&clo, &working), vec![2, 1, 3, 0, 4]);
    }

    #[test]
    fn removed_vertices_are_not_ranked()
    {
        let mut working = WorkingNetwork::new(&path(5));
        working.remove_vertex(2).unwrap();
        let deg = degree_scores(&working);
        let ranking = rank_vertices(&deg, &working);
        assert_eq!(ranking.len(), 4);
        assert!(!ranking.contains(&2));
        // closeness of the two halves is symmetric
        let clo = closeness_scores(&working);
        assert!(close(clo[0], clo[1]));
        assert!(close(clo[3], clo[4]));
    }

    #[test]
    fn eigenvector_handles_bipartite_and_empty_graphs()
    {
        let working = WorkingNetwork::new(&cycle(4));
        let eig = eigenvector_scores(&working);
        assert!(eig.iter().all(|&e| close(e, 1.0)), "{eig:?}");

        let empty = WorkingNetwork::new(&graph_from_edges(3, &[]).unwrap());
        let eig = eigenvector_scores(&empty);
        assert_eq!(rank_vertices(&eig, &empty), vec![0, 1, 2]);
    }

    #[test]
    fn pivot_backend_uses_all_vertices_when_pivots_suffice()
    {
        let working = WorkingNetwork::new(&path(5));
        let backend = PivotBetweenness{pivots: NonZeroUsize::new(10).unwrap(), seed: 1};
        assert_eq!(
            backend.scores(Measure::Betweenness, &working),
            betweenness_scores(&working)
        );
        let small = PivotBetweenness{pivots: NonZeroUsize::new(2).unwrap(), seed: 1};
        let first = small.scores(Measure::Betweenness, &working);
        assert_eq!(first, small.scores(Measure::Betweenness, &working));
    }

    struct CountingBackend(AtomicUsize);

    impl CentralityBackend for CountingBackend
    {
        fn scores(&self, measure: Measure, network: &WorkingNetwork) -> Vec<f64>
        {
            self.0.fetch_add(1, Ordering::Relaxed);
            ExactCentrality.scores(measure, network)
        }
    }

    #[test]
    fn cache_recomputes_only_after_mutation()
    {
        let backend = CountingBackend(AtomicUsize::new(0));
        let calls = || backend.0.load(Ordering::Relaxed);
        let mut cache = CentralityCache::new();
        let mut working = WorkingNetwork::new(&star(3));

        cache.ranking(&backend, Measure::Degree, &working);
        cache.ranking(&backend, Measure::Degree, &working);
        assert_eq!(calls(), 1);
        assert!(cache.is_fresh(Measure::Degree, &working));

        working.remove_vertex(0).unwrap();
        assert!(!cache.is_fresh(Measure::Degree, &working));
        let ranking = cache.ranking(&backend, Measure::Degree, &working);
        assert_eq!(calls(), 2);
        assert_eq!(ranking, vec![1, 2, 3]);
    }
}
