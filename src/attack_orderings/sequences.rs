use {
    rand::{Rng, SeedableRng, distributions::{Uniform, Distribution}},
    rand_pcg::Pcg64,
    rayon::prelude::*,
    super::*,
    crate::{
        error::*,
        sir_model::{SirGraph, WorkingNetwork, random_neighbor, component_members, component_ids},
    },
};

/// Keeps track of which vertices already made it into the ordering
struct Recorder
{
    recorded: Vec<bool>,
    ordering: Vec<usize>,
}

impl Recorder
{
    fn new(n: usize) -> Self
    {
        Self{
            recorded: vec![false; n],
            ordering: Vec::with_capacity(n)
        }
    }

    /// true if `index` was new
    fn record(&mut self, index: usize) -> bool
    {
        if self.recorded[index] {
            false
        } else {
            self.recorded[index] = true;
            self.ordering.push(index);
            true
        }
    }

    fn is_complete(&self) -> bool
    {
        self.ordering.len() == self.recorded.len()
    }

    fn into_ordering(self) -> Vec<usize>
    {
        self.ordering
    }
}

pub struct StructuralOrderings
{
    pub simultaneous: Vec<usize>,
    pub sequential: Vec<usize>,
}

/// Ranks once over the full network
pub fn structural_simultaneous<B>(graph: &SirGraph, measure: Measure, backend: &B) -> Vec<usize>
where B: CentralityBackend + ?Sized
{
    let working = WorkingNetwork::new(graph);
    CentralityCache::new().ranking(backend, measure, &working)
}

/// Removes the top ranked vertex and re-ranks the rest, until one vertex
/// is left. That last vertex is appended as well, so the result is a
/// permutation of all vertices.
pub fn structural_sequential<B>(graph: &SirGraph, measure: Measure, backend: &B) -> SirResult<Vec<usize>>
where B: CentralityBackend + ?Sized
{
    let mut working = WorkingNetwork::new(graph);
    let mut cache = CentralityCache::new();
    sequential_removal(&mut working, &mut cache, measure, backend)
}

/// Both modes, sharing the measure computation on the intact network
pub fn structural_orderings<B>(graph: &SirGraph, measure: Measure, backend: &B) -> SirResult<StructuralOrderings>
where B: CentralityBackend + ?Sized
{
    let mut working = WorkingNetwork::new(graph);
    let mut cache = CentralityCache::new();
    let simultaneous = cache.ranking(backend, measure, &working);
    let sequential = sequential_removal(&mut working, &mut cache, measure, backend)?;
    Ok(
        StructuralOrderings{
            simultaneous,
            sequential
        }
    )
}

fn sequential_removal<B>(
    working: &mut WorkingNetwork,
    cache: &mut CentralityCache,
    measure: Measure,
    backend: &B
) -> SirResult<Vec<usize>>
where B: CentralityBackend + ?Sized
{
    let mut ordering = Vec::with_capacity(working.alive_count());
    while working.alive_count() > 1 {
        let top = cache.ranking(backend, measure, working)[0];
        ordering.push(top);
        working.remove_vertex(top)?;
    }
    ordering.extend(working.alive_vertices());
    Ok(ordering)
}

/// Order in which a random walker discovers the vertices
pub fn random_walk_ordering<R: Rng>(graph: &SirGraph, mode: AttackMode, rng: &mut R) -> SirResult<Vec<usize>>
{
    if graph.vertex_count() == 0 {
        return Ok(Vec::new());
    }
    match mode{
        AttackMode::Simultaneous => Ok(random_walk_simultaneous(graph, rng)),
        AttackMode::Sequential => random_walk_sequential(graph, rng),
    }
}

fn random_walk_simultaneous<R: Rng>(graph: &SirGraph, rng: &mut R) -> Vec<usize>
{
    let n = graph.vertex_count();
    let components = component_members(graph);
    let ids = component_ids(&components, n);
    // unrecorded vertices per component, a walker stuck in an exhausted
    // component has to jump
    let mut unrecorded: Vec<usize> = components.iter().map(Vec::len).collect();
    let uniform = Uniform::new(0, n);
    let mut recorder = Recorder::new(n);
    let mut current = uniform.sample(rng);

    while !recorder.is_complete() {
        if unrecorded[ids[current]] == 0 {
            current = uniform.sample(rng);
            continue;
        }
        match random_neighbor(graph, current, rng) {
            None => {
                if recorder.record(current) {
                    unrecorded[ids[current]] -= 1;
                }
                current = uniform.sample(rng);
            },
            Some(next) => {
                current = next;
                if recorder.record(next) {
                    unrecorded[ids[next]] -= 1;
                }
            }
        }
    }
    recorder.into_ordering()
}

fn random_walk_sequential<R: Rng>(graph: &SirGraph, rng: &mut R) -> SirResult<Vec<usize>>
{
    let mut working = WorkingNetwork::new(graph);
    let mut recorder = Recorder::new(graph.vertex_count());
    let mut current = match working.random_alive(rng) {
        Some(start) => start,
        None => return Ok(Vec::new())
    };

    // recorded vertices are removed right away, alive <=> unrecorded
    while !recorder.is_complete() {
        if !working.is_alive(current) {
            match working.random_alive(rng) {
                Some(jump) => {
                    current = jump;
                    recorder.record(jump);
                    working.remove_vertex(jump)?;
                },
                None => break
            }
            continue;
        }
        match working.random_neighbor(current, rng) {
            None => {
                recorder.record(current);
                working.remove_vertex(current)?;
                if let Some(jump) = working.random_alive(rng) {
                    current = jump;
                }
            },
            Some(next) => {
                current = next;
                recorder.record(next);
                working.remove_vertex(next)?;
            }
        }
    }
    Ok(recorder.into_ordering())
}

/// Vertices in the order they are named as the random neighbor of a
/// random vertex ("friend of a friend")
pub fn referral_ordering<R: Rng>(graph: &SirGraph, mode: AttackMode, rng: &mut R) -> SirResult<Vec<usize>>
{
    let n = graph.vertex_count();
    if n == 0 {
        return Ok(Vec::new());
    }
    let mut recorder = Recorder::new(n);
    match mode{
        AttackMode::Simultaneous => {
            let uniform = Uniform::new(0, n);
            while !recorder.is_complete() {
                let p = uniform.sample(rng);
                match random_neighbor(graph, p, rng) {
                    Some(q) => recorder.record(q),
                    None => recorder.record(p)
                };
            }
        },
        AttackMode::Sequential => {
            let mut working = WorkingNetwork::new(graph);
            while let Some(p) = working.random_alive(rng) {
                let chosen = working.random_neighbor(p, rng)
                    .unwrap_or(p);
                recorder.record(chosen);
                working.remove_vertex(chosen)?;
            }
        }
    }
    Ok(recorder.into_ordering())
}

/// Every ordering kind in both modes.
///
/// Structural measures run in parallel, the randomized processes get their
/// own generators derived from `seed`.
pub fn compute_all<B>(graph: &SirGraph, seed: u64, backend: &B) -> SirResult<OrderingStore>
where B: CentralityBackend + ?Sized
{
    let mut store = OrderingStore::new(graph.vertex_count());
    let mut rng = Pcg64::seed_from_u64(seed);

    for mode in [AttackMode::Simultaneous, AttackMode::Sequential] {
        let mut walk_rng = Pcg64::seed_from_u64(rng.gen());
        let key = OrderingKey::new(OrderingKind::RandomWalk, mode);
        store.insert(key, random_walk_ordering(graph, mode, &mut walk_rng)?);
        log::info!("{key} done");

        let mut referral_rng = Pcg64::seed_from_u64(rng.gen());
        let key = OrderingKey::new(OrderingKind::Referral, mode);
        store.insert(key, referral_ordering(graph, mode, &mut referral_rng)?);
        log::info!("{key} done");
    }

    let structural: Vec<(Measure, StructuralOrderings)> = Measure::ALL
        .par_iter()
        .map(
            |&measure|
            {
                let orderings = structural_orderings(graph, measure, backend)?;
                log::info!("{} orderings done", measure.kind().short_name());
                Ok::<_, SirError>((measure, orderings))
            }
        ).collect::<SirResult<_>>()?;

    for (measure, orderings) in structural {
        store.insert(OrderingKey::new(measure.kind(), AttackMode::Simultaneous), orderings.simultaneous);
        store.insert(OrderingKey::new(measure.kind(), AttackMode::Sequential), orderings.sequential);
    }
    Ok(store)
}
