use{
    structopt::StructOpt,
    serde::{Serialize, Deserialize},
    serde_json::Value,
    std::num::*,
    crate::vaccination_methods::*,
    crate::misc_types::*,
    crate::json_parsing::*,
    crate::error::*,
};

#[derive(Debug, StructOpt, Clone)]
/// Run SIR trials on a network, optionally after vaccinating part of it,
/// and print the averaged outcome
pub struct Simulate
{
    /// Specify the json file with the options
    /// If not given, an example json will be printed
    #[structopt(long)]
    json: Option<String>,

    /// Average the S, I and R curves instead of the final state
    #[structopt(long)]
    curves: bool,

    /// Write the result into this file instead of stdout
    #[structopt(long)]
    out: Option<String>,

    /// Number of threads to use
    #[structopt(long)]
    num_threads: Option<NonZeroUsize>
}

impl Simulate {
    pub fn parse(&self) -> SirResult<(SimulateParams, Value)>
    {
        parse(self.json.as_ref())
    }

    pub fn execute(&self) -> SirResult<()>
    {
        let (param, json) = self.parse()?;
        param.validate()?;
        crate::set_num_threads(self.num_threads)?;
        if self.curves {
            crate::simplecurves::execute_curves(param, json, self.out.as_ref())
        } else {
            super::execute::execute_endpoint(param, json, self.out.as_ref())
        }
    }
}

fn default_max_rounds() -> usize
{
    DEFAULT_MAX_ROUNDS
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SimulateParams
{
    /// edge list of the network
    pub network: String,
    /// ordering store, defaults to the network path with extension `ord`
    #[serde(default)]
    pub orderings: Option<String>,
    /// drawn uniformly for every trial if null
    pub beta: Option<f64>,
    /// drawn uniformly for every trial if null
    pub gamma: Option<f64>,
    #[serde(default)]
    pub vaccination: Option<VaccinationParams>,
    pub trials: NonZeroUsize,
    pub sir_seed: u64,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
}

impl SimulateParams
{
    pub fn validate(&self) -> SirResult<()>
    {
        self.check().map_err(SirError::Config)
    }

    fn check(&self) -> Result<(), String>
    {
        if let Some(beta) = self.beta {
            check_probability("beta", beta)?;
        }
        if let Some(gamma) = self.gamma {
            check_probability("gamma", gamma)?;
            if gamma == 0.0 {
                return Err("gamma = 0: nobody ever recovers, the epidemic would never end".to_owned());
            }
        }
        if self.max_rounds == 0 {
            return Err("max_rounds has to be positive".to_owned());
        }
        match &self.vaccination {
            Some(vaccination) => vaccination.validate(),
            None => Ok(())
        }
    }
}

impl Default for SimulateParams
{
    fn default() -> Self {
        Self{
            network: "network.txt".to_owned(),
            orderings: None,
            beta: Some(DEFAULT_TRANSMISSION_PROB),
            gamma: Some(DEFAULT_RECOVERY_PROB),
            vaccination: Some(
                VaccinationParams{
                    strategy: VaccinationType::Degree,
                    amount: VaccineAmount::Fraction(DEFAULT_VACCINATED_FRACTION),
                    sequential: false
                }
            ),
            trials: DEFAULT_TRIALS,
            sir_seed: DEFAULT_SIR_SEED,
            max_rounds: DEFAULT_MAX_ROUNDS
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn default_params_are_valid()
    {
        assert!(SimulateParams::default().validate().is_ok());
    }

    #[test]
    fn recovery_has_to_be_possible()
    {
        let param = SimulateParams{
            beta: Some(1.0),
            gamma: Some(0.0),
            ..SimulateParams::default()
        };
        assert!(matches!(param.validate(), Err(SirError::Config(_))));
    }

    #[test]
    fn out_of_range_values_are_rejected()
    {
        let bad = [
            SimulateParams{beta: Some(1.2), ..SimulateParams::default()},
            SimulateParams{gamma: Some(-0.1), ..SimulateParams::default()},
            SimulateParams{max_rounds: 0, ..SimulateParams::default()},
            SimulateParams{
                vaccination: Some(VaccinationParams{
                    strategy: VaccinationType::Random,
                    amount: VaccineAmount::Fraction(1.5),
                    sequential: false
                }),
                ..SimulateParams::default()
            },
        ];
        for param in bad {
            assert!(param.validate().is_err(), "{param:?}");
        }
        let boundary = SimulateParams{beta: Some(0.0), gamma: Some(1.0), ..SimulateParams::default()};
        assert!(boundary.validate().is_ok());
    }

    #[test]
    fn minimal_json_uses_defaults()
    {
        let json = r#"{
            "network": "net.txt",
            "beta": null,
            "gamma": 0.2,
            "trials": 10,
            "sir_seed": 1
        }"#;
        let param: SimulateParams = serde_json::from_str(json).unwrap();
        assert_eq!(param.max_rounds, DEFAULT_MAX_ROUNDS);
        assert!(param.vaccination.is_none());
        assert!(param.orderings.is_none());
        assert!(param.beta.is_none());

        let zero_trials = json.replace("\"trials\": 10", "\"trials\": 0");
        assert!(serde_json::from_str::<SimulateParams>(&zero_trials).is_err());
    }
}
