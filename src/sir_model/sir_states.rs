use {
    serde::{Serialize, Deserialize},
    net_ensembles::Node
};

#[derive(Clone, Debug, PartialEq, Eq, Copy)]
#[derive(Serialize, Deserialize)]
pub enum InfectionState{
    Susceptible,
    Infected,
    Recovered,
    Vaccinated,
}

impl InfectionState{
    pub fn sus_check(&self) -> bool{
        matches!(self, InfectionState::Susceptible)
    }
    pub fn inf_check(&self) -> bool{
        matches!(self, InfectionState::Infected)
    }
}

impl Default for InfectionState{
    fn default() -> Self{
        InfectionState::Susceptible
    }
}

impl Node for InfectionState{
    fn new_from_index(_index: usize) -> Self{
        InfectionState::Susceptible
    }
}

/// Number of vertices in each state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StateCounts
{
    pub s: usize,
    pub i: usize,
    pub r: usize,
    pub v: usize,
}

impl StateCounts
{
    pub fn total(&self) -> usize
    {
        self.s + self.i + self.r + self.v
    }

    /// fractions (s, i, r) of the whole population, vaccinated vertices count
    /// towards the denominator only
    pub fn fractions(&self) -> [f64; 3]
    {
        let n = self.total() as f64;
        [
            self.s as f64 / n,
            self.i as f64 / n,
            self.r as f64 / n
        ]
    }
}
