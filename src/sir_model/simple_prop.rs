use {
    rand::{Rng, SeedableRng, distributions::{Uniform, Distribution}},
    rand_pcg::Pcg64,
    super::*,
    crate::{
        error::*,
        misc_types::DEFAULT_MAX_ROUNDS,
        attack_orderings::OrderingStore,
        vaccination_methods::{VaccinationParams, Selection},
    },
};

/// Fractions of susceptible, infected and recovered vertices,
/// one entry per recorded time step
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SirCurve
{
    pub s: Vec<f64>,
    pub i: Vec<f64>,
    pub r: Vec<f64>,
}

impl SirCurve
{
    pub fn push(&mut self, [s, i, r]: [f64; 3])
    {
        self.s.push(s);
        self.i.push(i);
        self.r.push(r);
    }

    pub fn len(&self) -> usize
    {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.s.is_empty()
    }
}

/// Individual based SIR dynamics on a private copy of the network.
///
/// One round consists of n update attempts, each on a uniformly drawn
/// vertex (with replacement). A susceptible vertex with k infected
/// neighbors gets infected with probability 1-(1-beta)^k, an infected
/// vertex recovers with probability gamma.
#[derive(Clone)]
pub struct SimpleSampleSir
{
    graph: SirGraph,
    beta: f64,
    gamma: f64,
    rng_type: Pcg64,
    counts: StateCounts,
    max_rounds: usize,
}

impl SimpleSampleSir
{
    pub fn from_graph(graph: &SirGraph, sir_seed: u64) -> Self
    {
        let mut res = Self{
            graph: graph.clone(),
            beta: 0.0,
            gamma: 1.0,
            rng_type: Pcg64::seed_from_u64(sir_seed),
            counts: StateCounts::default(),
            max_rounds: DEFAULT_MAX_ROUNDS
        };
        res.reset();
        res
    }

    pub fn set_rng(&mut self, rng: Pcg64)
    {
        self.rng_type = rng;
    }

    /// The generator driving this model, vaccination strategies draw from it too
    pub fn rng_mut(&mut self) -> &mut Pcg64
    {
        &mut self.rng_type
    }

    pub fn graph(&self) -> &SirGraph
    {
        &self.graph
    }

    pub fn n(&self) -> usize
    {
        self.graph.vertex_count()
    }

    pub fn set_beta(&mut self, beta: f64)
    {
        self.beta = beta;
    }

    pub fn set_gamma(&mut self, gamma: f64)
    {
        self.gamma = gamma;
    }

    pub fn set_max_rounds(&mut self, max_rounds: usize)
    {
        self.max_rounds = max_rounds;
    }

    pub fn counts(&self) -> StateCounts
    {
        self.counts
    }

    pub fn fractions(&self) -> [f64; 3]
    {
        self.counts.fractions()
    }

    pub fn state(&self, index: usize) -> InfectionState
    {
        *self.graph.at(index)
    }

    /// Everyone susceptible again
    pub fn reset(&mut self)
    {
        self.graph
            .contained_iter_mut()
            .for_each(|s| *s = InfectionState::Susceptible);
        self.counts = StateCounts{
            s: self.n(),
            ..StateCounts::default()
        };
    }

    /// Only valid before the infection is seeded.
    /// Vertices that are already vaccinated are skipped.
    pub fn vaccinate(&mut self, vertices: &[usize])
    {
        debug_assert_eq!(self.counts.i + self.counts.r, 0);
        for &index in vertices {
            let state = self.graph.at_mut(index);
            if state.sus_check() {
                *state = InfectionState::Vaccinated;
                self.counts.s -= 1;
                self.counts.v += 1;
            }
        }
    }

    /// Lets the strategy pick the vertices, using the generator of this model,
    /// and vaccinates them
    pub fn vaccinate_with(
        &mut self,
        params: &VaccinationParams,
        store: Option<&OrderingStore>
    ) -> SirResult<Selection>
    {
        let target = params.amount.target(self.n());
        let selection = params.strategy.select(
            &self.graph,
            target,
            params.mode(),
            store,
            &mut self.rng_type
        )?;
        self.vaccinate(&selection.vertices);
        Ok(selection)
    }

    /// Infects one vertex, drawn uniformly among the susceptible ones.
    /// Returns None if nobody is left to infect.
    pub fn seed_infection(&mut self) -> Option<usize>
    {
        let susceptible: Vec<_> = self.graph
            .contained_iter()
            .enumerate()
            .filter_map(|(index, state)| state.sus_check().then_some(index))
            .collect();
        if susceptible.is_empty() {
            return None;
        }
        let patient_zero = susceptible[self.rng_type.gen_range(0..susceptible.len())];
        self.infect_patient(patient_zero);
        Some(patient_zero)
    }

    fn infect_patient(&mut self, patient: usize)
    {
        *self.graph.at_mut(patient) = InfectionState::Infected;
        self.counts.s -= 1;
        self.counts.i += 1;
    }

    fn infected_neighbors(&self, index: usize) -> i32
    {
        self.graph
            .contained_iter_neighbors_with_index(index)
            .filter(|(_, neighbour)| neighbour.inf_check())
            .count() as i32
    }

    fn update_vertex(&mut self, index: usize)
    {
        match self.state(index) {
            InfectionState::Susceptible => {
                let k = self.infected_neighbors(index);
                if k == 0 {
                    return;
                }
                let prob = 1.0 - (1.0 - self.beta).powi(k);
                if self.rng_type.gen::<f64>() < prob {
                    self.infect_patient(index);
                }
            },
            InfectionState::Infected => {
                if self.rng_type.gen::<f64>() < self.gamma {
                    *self.graph.at_mut(index) = InfectionState::Recovered;
                    self.counts.i -= 1;
                    self.counts.r += 1;
                }
            },
            InfectionState::Recovered | InfectionState::Vaccinated => ()
        }
    }

    /// n single vertex updates on uniformly drawn vertices
    pub fn propagate_one_round(&mut self)
    {
        let n = self.n();
        let uniform = Uniform::new(0, n);
        for _ in 0..n {
            let index = uniform.sample(&mut self.rng_type);
            self.update_vertex(index);
        }
    }

    /// Runs until nobody is infected, returns the number of rounds
    pub fn propagate_until_extinction(&mut self) -> SirResult<usize>
    {
        let mut rounds = 0;
        while self.counts.i > 0 {
            if rounds == self.max_rounds {
                return Err(self.round_cap_exceeded(rounds));
            }
            self.propagate_one_round();
            rounds += 1;
        }
        debug_assert_eq!(self.counts, self.recount());
        Ok(rounds)
    }

    /// Like [Self::propagate_until_extinction] but records the fractions
    /// before the first round and after every round
    pub fn propagate_curve(&mut self) -> SirResult<SirCurve>
    {
        let mut curve = SirCurve::default();
        curve.push(self.fractions());
        let mut rounds = 0;
        while self.counts.i > 0 {
            if rounds == self.max_rounds {
                return Err(self.round_cap_exceeded(rounds));
            }
            self.propagate_one_round();
            rounds += 1;
            curve.push(self.fractions());
        }
        Ok(curve)
    }

    fn round_cap_exceeded(&self, rounds: usize) -> SirError
    {
        SirError::RoundCapExceeded{
            rounds,
            beta: self.beta,
            gamma: self.gamma
        }
    }

    /// Counts recomputed from the vertex states
    pub fn recount(&self) -> StateCounts
    {
        let mut counts = StateCounts::default();
        self.graph.contained_iter()
            .for_each(
                |contained|
                match contained{
                    InfectionState::Susceptible => counts.s += 1,
                    InfectionState::Infected => counts.i += 1,
                    InfectionState::Recovered => counts.r += 1,
                    InfectionState::Vaccinated => counts.v += 1,
                }
            );
        counts
    }
}
