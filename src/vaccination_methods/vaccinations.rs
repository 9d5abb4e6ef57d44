use {
    serde::{Serialize, Deserialize},
    rand::{Rng, distributions::{Uniform, Distribution}, seq::index},
    crate::{
        attack_orderings::*,
        error::*,
        misc_types::*,
        sir_model::{SirGraph, random_neighbor, component_members, component_ids},
    },
};

/// Where the live random walk is allowed to go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalkScope{
    /// walk the largest connected component only, the target is clamped to its size
    LargestComponent,
    /// walk everything, jumping to a random vertex when stuck
    WholeNetwork,
}

fn default_teleport_ratio() -> f64
{
    DEFAULT_TELEPORT_RATIO
}

/// How the vaccinated vertices are chosen.
/// Unknown names are rejected when the configuration is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VaccinationType{
    Random,
    Betweenness,
    Closeness,
    Degree,
    Eigenvector,
    /// precomputed random walk ordering
    RandomWalk,
    /// precomputed referral ordering
    Referral,
    LiveReferral{
        #[serde(default)]
        attempt_budget: Option<usize>
    },
    LiveRandomWalk{
        scope: WalkScope,
        #[serde(default)]
        attempt_budget: Option<usize>
    },
    /// page rank like: follow an edge with probability `teleport_ratio`,
    /// jump anywhere otherwise
    BiasedWalk{
        #[serde(default = "default_teleport_ratio")]
        teleport_ratio: f64,
        #[serde(default)]
        attempt_budget: Option<usize>
    },
}

impl VaccinationType{
    pub fn ordering_kind(&self) -> Option<OrderingKind>
    {
        match self{
            Self::Betweenness => Some(OrderingKind::Betweenness),
            Self::Closeness => Some(OrderingKind::Closeness),
            Self::Degree => Some(OrderingKind::Degree),
            Self::Eigenvector => Some(OrderingKind::Eigenvector),
            Self::RandomWalk => Some(OrderingKind::RandomWalk),
            Self::Referral => Some(OrderingKind::Referral),
            _ => None
        }
    }

    pub fn name(&self) -> &'static str
    {
        match self{
            Self::Random => "Random",
            Self::Betweenness => "Betweenness",
            Self::Closeness => "Closeness",
            Self::Degree => "Degree",
            Self::Eigenvector => "Eigenvector",
            Self::RandomWalk => "RandomWalk",
            Self::Referral => "Referral",
            Self::LiveReferral{..} => "LiveReferral",
            Self::LiveRandomWalk{..} => "LiveRandomWalk",
            Self::BiasedWalk{..} => "BiasedWalk",
        }
    }

    pub fn validate(&self) -> Result<(), String>
    {
        match *self{
            Self::BiasedWalk{teleport_ratio, attempt_budget} => {
                check_probability("teleport_ratio", teleport_ratio)?;
                check_budget(attempt_budget)
            },
            Self::LiveReferral{attempt_budget} | Self::LiveRandomWalk{attempt_budget, ..} => check_budget(attempt_budget),
            _ => Ok(())
        }
    }

    /// Chooses up to `target` distinct vertices.
    /// `target` has to be clamped to the vertex count by the caller.
    pub fn select<R: Rng>(
        &self,
        graph: &SirGraph,
        target: usize,
        mode: AttackMode,
        store: Option<&OrderingStore>,
        rng: &mut R
    ) -> SirResult<Selection>
    {
        let n = graph.vertex_count();
        debug_assert!(target <= n);
        if let Some(kind) = self.ordering_kind() {
            let store = store.ok_or_else(
                || SirError::Config(format!("{} vaccination needs an ordering store", self.name()))
            )?;
            let ordering = store.get(OrderingKey::new(kind, mode))?;
            return Ok(Selection::from_ordering(ordering, target));
        }
        if target == 0 {
            return Ok(Selection::new(Vec::new(), 0));
        }
        let budget = |b: Option<usize>| b.unwrap_or(DEFAULT_ATTEMPTS_PER_VERTEX * n);
        let selection = match *self{
            Self::Random => {
                Selection::new(index::sample(rng, n, target).into_vec(), target)
            },
            Self::LiveReferral{attempt_budget} => live_referral(graph, target, budget(attempt_budget), rng),
            Self::LiveRandomWalk{scope: WalkScope::LargestComponent, attempt_budget} => {
                component_walk(graph, target, budget(attempt_budget), rng)
            },
            Self::LiveRandomWalk{scope: WalkScope::WholeNetwork, attempt_budget} => {
                network_walk(graph, target, budget(attempt_budget), rng)
            },
            Self::BiasedWalk{teleport_ratio, attempt_budget} => {
                biased_walk(graph, target, teleport_ratio, budget(attempt_budget), rng)
            },
            _ => unreachable!("ordering based strategies are handled above")
        };
        Ok(selection)
    }
}

fn check_budget(budget: Option<usize>) -> Result<(), String>
{
    match budget{
        Some(0) => Err("attempt_budget has to be positive".to_owned()),
        _ => Ok(())
    }
}

/// How many vertices to vaccinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VaccineAmount{
    /// fraction of all vertices, truncated
    Fraction(f64),
    Count(usize),
}

impl VaccineAmount{
    pub fn target(&self, n: usize) -> usize
    {
        match *self{
            Self::Fraction(frac) => ((frac * n as f64).floor() as usize).min(n),
            Self::Count(count) => count.min(n)
        }
    }

    pub fn validate(&self) -> Result<(), String>
    {
        match *self{
            Self::Fraction(frac) => check_probability("vaccinated fraction", frac),
            Self::Count(_) => Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VaccinationParams{
    pub strategy: VaccinationType,
    pub amount: VaccineAmount,
    /// use the sequential instead of the simultaneous ordering
    pub sequential: bool,
}

impl VaccinationParams{
    pub fn mode(&self) -> AttackMode
    {
        AttackMode::from_sequential(self.sequential)
    }

    pub fn ordering_key(&self) -> Option<OrderingKey>
    {
        self.strategy
            .ordering_kind()
            .map(|kind| OrderingKey::new(kind, self.mode()))
    }

    pub fn validate(&self) -> Result<(), String>
    {
        self.strategy.validate()?;
        self.amount.validate()
    }
}

/// Result of a vaccination strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection{
    pub vertices: Vec<usize>,
    pub requested: usize,
}

impl Selection{
    pub fn new(vertices: Vec<usize>, requested: usize) -> Self
    {
        Self{vertices, requested}
    }

    fn from_ordering(ordering: &[usize], target: usize) -> Self
    {
        let end = target.min(ordering.len());
        Self::new(ordering[..end].to_vec(), target)
    }

    pub fn achieved(&self) -> usize
    {
        self.vertices.len()
    }

    /// The strategy gave up before reaching its target
    pub fn exhausted(&self) -> bool
    {
        self.vertices.len() < self.requested
    }
}

struct Marker{
    marked: Vec<bool>,
    vertices: Vec<usize>,
}

impl Marker{
    fn new(n: usize) -> Self
    {
        Self{
            marked: vec![false; n],
            vertices: Vec::new()
        }
    }

    fn mark(&mut self, index: usize) -> bool
    {
        if self.marked[index] {
            false
        } else {
            self.marked[index] = true;
            self.vertices.push(index);
            true
        }
    }

    fn count(&self) -> usize
    {
        self.vertices.len()
    }

    fn into_selection(self, requested: usize) -> Selection
    {
        Selection::new(self.vertices, requested)
    }
}

/// Random neighbors of random vertices, on the untouched network
fn live_referral<R: Rng>(graph: &SirGraph, target: usize, budget: usize, rng: &mut R) -> Selection
{
    let n = graph.vertex_count();
    let uniform = Uniform::new(0, n);
    let mut marker = Marker::new(n);
    let mut attempts = 0;
    while marker.count() < target && attempts < budget {
        attempts += 1;
        let p = uniform.sample(rng);
        if let Some(q) = random_neighbor(graph, p, rng) {
            marker.mark(q);
        }
    }
    marker.into_selection(target)
}

/// Walk on the largest component, vaccinating whoever is met unvaccinated
fn component_walk<R: Rng>(graph: &SirGraph, target: usize, budget: usize, rng: &mut R) -> Selection
{
    let component = crate::sir_model::largest_component(graph);
    let target = target.min(component.len());
    let mut marker = Marker::new(graph.vertex_count());
    let mut current = component[rng.gen_range(0..component.len())];
    let mut attempts = 0;
    while marker.count() < target && attempts < budget {
        attempts += 1;
        if !marker.mark(current) {
            match random_neighbor(graph, current, rng) {
                Some(next) => current = next,
                // a lone vertex, already vaccinated
                None => break
            }
        }
    }
    marker.into_selection(target)
}

/// Walk on the whole network. Isolated vertices and fully vaccinated
/// components make the walker jump to a uniformly drawn vertex.
fn network_walk<R: Rng>(graph: &SirGraph, target: usize, budget: usize, rng: &mut R) -> Selection
{
    let n = graph.vertex_count();
    let components = component_members(graph);
    let ids = component_ids(&components, n);
    let mut unmarked: Vec<usize> = components.iter().map(Vec::len).collect();
    let uniform = Uniform::new(0, n);
    let mut marker = Marker::new(n);
    let mut current = uniform.sample(rng);
    let mut attempts = 0;
    while marker.count() < target && attempts < budget {
        attempts += 1;
        if marker.mark(current) {
            unmarked[ids[current]] -= 1;
            continue;
        }
        current = if unmarked[ids[current]] == 0 {
            uniform.sample(rng)
        } else {
            match random_neighbor(graph, current, rng) {
                Some(next) => next,
                None => uniform.sample(rng)
            }
        };
    }
    marker.into_selection(target)
}

fn biased_walk<R: Rng>(graph: &SirGraph, target: usize, teleport_ratio: f64, budget: usize, rng: &mut R) -> Selection
{
    let n = graph.vertex_count();
    let uniform = Uniform::new(0, n);
    let mut marker = Marker::new(n);
    let mut current = uniform.sample(rng);
    let mut attempts = 0;
    while marker.count() < target && attempts < budget {
        attempts += 1;
        if marker.mark(current) {
            continue;
        }
        current = if rng.gen::<f64>() < teleport_ratio {
            match random_neighbor(graph, current, rng) {
                Some(next) => next,
                None => uniform.sample(rng)
            }
        } else {
            uniform.sample(rng)
        };
    }
    marker.into_selection(target)
}
