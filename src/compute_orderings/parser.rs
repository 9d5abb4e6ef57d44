use{
    structopt::StructOpt,
    std::num::*,
    crate::misc_types::*,
    crate::error::*,
};

#[derive(Debug, StructOpt, Clone)]
/// Compute every attack ordering of a network and store them,
/// so that simulations can vaccinate by them
pub struct Orderings
{
    /// Edge list of the network
    #[structopt(long)]
    pub network: String,

    /// Where to store the orderings.
    /// Default: network path with extension ord
    #[structopt(long)]
    pub out: Option<String>,

    /// Seed for the random walk and referral orderings,
    /// a fixed default seed is used if not given
    #[structopt(long)]
    pub seed: Option<u64>,

    /// Estimate betweenness from this many source vertices instead of all of them
    #[structopt(long)]
    pub betweenness_pivots: Option<NonZeroUsize>,

    /// Number of threads to use
    #[structopt(long)]
    pub num_threads: Option<NonZeroUsize>
}

impl Orderings {
    pub fn seed(&self) -> u64
    {
        self.seed.unwrap_or(DEFAULT_ORDERING_SEED)
    }

    pub fn execute(&self) -> SirResult<()>
    {
        crate::set_num_threads(self.num_threads)?;
        super::execute::execute_orderings(self)
    }
}

impl Default for Orderings
{
    fn default() -> Self {
        Self{
            network: "network.txt".to_owned(),
            out: None,
            seed: None,
            betweenness_pivots: None,
            num_threads: None
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn command_line_defaults()
    {
        let opt = Orderings::from_iter_safe(["orderings", "--network", "net.txt"]).unwrap();
        assert_eq!(opt.network, "net.txt");
        assert_eq!(opt.seed(), DEFAULT_ORDERING_SEED);
        assert_eq!(opt.seed(), Orderings::default().seed());
        assert!(opt.out.is_none());
        assert!(opt.betweenness_pivots.is_none());

        let opt = Orderings::from_iter_safe(
            ["orderings", "--network", "net.txt", "--betweenness-pivots", "12", "--seed", "3"]
        ).unwrap();
        assert_eq!(opt.betweenness_pivots.map(NonZeroUsize::get), Some(12));
        assert_eq!(opt.seed(), 3);

        assert!(Orderings::from_iter_safe(["orderings"]).is_err());
        assert!(Orderings::from_iter_safe(["orderings", "--network", "n", "--betweenness-pivots", "0"]).is_err());
    }
}
