use {
    super::parser::*,
    serde_json::Value,
    std::path::PathBuf,
    crate::{
        indication_bar,
        error::*,
        misc_types::*,
        sir_model::*,
        attack_orderings::*,
        stats_methods::*,
    },
    rayon::prelude::*,
    rand::{Rng, SeedableRng},
    rand_pcg::Pcg64,
};

/// Loads the network and, if the vaccination strategy needs one, the
/// ordering store. A missing ordering is reported here, before any trial runs.
pub fn prepare(param: &SimulateParams) -> SirResult<(SimpleSampleSir, Option<OrderingStore>)>
{
    let graph = load_edge_list(&param.network)?;
    if graph.vertex_count() == 0 {
        return Err(SirError::Config(format!("network {} has no vertices", param.network)));
    }

    let key = param.vaccination
        .as_ref()
        .and_then(|vaccination| vaccination.ordering_key());
    let store = match key {
        None => None,
        Some(key) => {
            let path = param.orderings
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(|| default_store_path(&param.network));
            let store = OrderingStore::read(&path)?;
            check_store(&store, key, graph.vertex_count())?;
            log::info!("using ordering {key} from {}", path.display());
            Some(store)
        }
    };

    let mut model = SimpleSampleSir::from_graph(&graph, param.sir_seed);
    model.set_max_rounds(param.max_rounds);
    Ok((model, store))
}

pub fn check_store(store: &OrderingStore, key: OrderingKey, vertex_count: usize) -> SirResult<()>
{
    store.check_vertex_count(vertex_count)?;
    store.get(key)
        .map(|_| ())
}

/// Resets the model for one trial: fresh generator, transmission and
/// recovery probability, vaccination and patient zero.
/// Returns true if the vaccination strategy fell short of its target.
pub fn prepare_trial(
    model: &mut SimpleSampleSir,
    param: &SimulateParams,
    store: Option<&OrderingStore>,
    trial_seed: u64
) -> SirResult<bool>
{
    model.set_rng(Pcg64::seed_from_u64(trial_seed));
    model.reset();
    let beta = param.beta
        .unwrap_or_else(|| model.rng_mut().gen());
    // (0, 1], so that a drawn gamma always allows recovery
    let gamma = param.gamma
        .unwrap_or_else(|| 1.0 - model.rng_mut().gen::<f64>());
    model.set_beta(beta);
    model.set_gamma(gamma);

    let exhausted = match &param.vaccination {
        Some(vaccination) => {
            let selection = model.vaccinate_with(vaccination, store)?;
            if selection.exhausted() {
                log::debug!(
                    "{} vaccinated {} of {} vertices",
                    vaccination.strategy.name(),
                    selection.achieved(),
                    selection.requested
                );
            }
            selection.exhausted()
        },
        None => false
    };

    if model.seed_infection().is_none() {
        log::debug!("nobody left to infect, trial ends without outbreak");
    }
    Ok(exhausted)
}

/// Runs `trials` trials in chunks of [TRIALS_PER_CHUNK] on the rayon pool.
///
/// Every trial gets its own seed drawn from `sir_seed`, every chunk its own
/// clone of the model and its own accumulator. The accumulators are returned
/// in chunk order, so the result does not depend on the number of threads.
pub fn run_chunks<A, F>(
    trials: usize,
    sir_seed: u64,
    model: &SimpleSampleSir,
    trial: F
) -> SirResult<Vec<A>>
where A: Default + Send,
    F: Fn(&mut SimpleSampleSir, u64, &mut A) -> SirResult<bool> + Sync
{
    let mut master_rng = Pcg64::seed_from_u64(sir_seed);
    let seeds: Vec<u64> = (0..trials)
        .map(|_| master_rng.gen())
        .collect();

    let bar = indication_bar(trials as u64);
    let partials: Vec<(A, usize)> = seeds.par_chunks(TRIALS_PER_CHUNK)
        .map(
            |chunk|
            {
                let mut model = model.clone();
                let mut acc = A::default();
                let mut exhausted = 0;
                for &seed in chunk
                {
                    if trial(&mut model, seed, &mut acc)? {
                        exhausted += 1;
                    }
                }
                bar.inc(chunk.len() as u64);
                Ok::<_, SirError>((acc, exhausted))
            }
        ).collect::<SirResult<_>>()?;
    bar.finish_with_message("Done");

    let exhausted: usize = partials.iter().map(|(_, e)| e).sum();
    if exhausted > 0 {
        log::warn!("vaccination strategy fell short of its target in {exhausted} of {trials} trials");
    }
    Ok(
        partials.into_iter()
            .map(|(acc, _)| acc)
            .collect()
    )
}

pub fn endpoint_aggregate(
    param: &SimulateParams,
    model: &SimpleSampleSir,
    store: Option<&OrderingStore>
) -> SirResult<EndpointAggregate>
{
    let partials = run_chunks(
        param.trials.get(),
        param.sir_seed,
        model,
        |model, seed, acc: &mut EndpointAggregate|
        {
            let exhausted = prepare_trial(model, param, store, seed)?;
            model.propagate_until_extinction()?;
            acc.add(model.fractions());
            Ok(exhausted)
        }
    )?;

    let mut total = EndpointAggregate::default();
    partials.iter()
        .for_each(|partial| total.merge(partial));
    Ok(total)
}

pub fn execute_endpoint(
    param: SimulateParams,
    json: Value,
    out: Option<&String>
) -> SirResult<()>
{
    let (model, store) = prepare(&param)?;
    let aggregate = endpoint_aggregate(&param, &model, store.as_ref())?;
    let mut writer = SirWriter::new(out, &json)?;
    writer.write_endpoint(aggregate.mean(), aggregate.dispersion())?;
    writer.finish()
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::vaccination_methods::*;
    use crate::sir_model::test_graphs::*;
    use std::num::NonZeroUsize;

    fn params(trials: usize) -> SimulateParams
    {
        SimulateParams{
            network: "unused".to_owned(),
            orderings: None,
            beta: Some(0.5),
            gamma: Some(0.3),
            vaccination: None,
            trials: NonZeroUsize::new(trials).unwrap(),
            sir_seed: 42,
            max_rounds: DEFAULT_MAX_ROUNDS
        }
    }

    #[test]
    fn single_edge_without_transmission()
    {
        let param = SimulateParams{
            beta: Some(0.0),
            gamma: Some(1.0),
            ..params(100)
        };
        let model = SimpleSampleSir::from_graph(&path(2), param.sir_seed);
        let agg = endpoint_aggregate(&param, &model, None).unwrap();
        assert_eq!(agg.count, 100);
        assert_eq!(agg.mean(), [0.5, 0.0, 0.5]);
        assert_eq!(agg.dispersion(), 0.0);
    }

    #[test]
    fn results_do_not_depend_on_the_thread_count()
    {
        let param = params(300);
        let model = SimpleSampleSir::from_graph(&cycle(40), param.sir_seed);
        let run = |threads: usize| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap()
                .install(|| endpoint_aggregate(&param, &model, None).unwrap())
        };
        let single = run(1);
        let many = run(4);
        assert_eq!(single, many);
        assert_eq!(single.count, 300);
        assert!(single.mean()[1] == 0.0);
        let total: f64 = single.mean().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn drawn_probabilities_still_terminate()
    {
        let param = SimulateParams{
            beta: None,
            gamma: None,
            ..params(50)
        };
        let model = SimpleSampleSir::from_graph(&star(10), param.sir_seed);
        let agg = endpoint_aggregate(&param, &model, None).unwrap();
        assert_eq!(agg.count, 50);
        assert!(agg.mean()[2] > 0.0);
    }

    #[test]
    fn everyone_vaccinated_means_no_outbreak()
    {
        let param = SimulateParams{
            vaccination: Some(VaccinationParams{
                strategy: VaccinationType::Random,
                amount: VaccineAmount::Fraction(1.0),
                sequential: false
            }),
            ..params(10)
        };
        let model = SimpleSampleSir::from_graph(&cycle(8), param.sir_seed);
        let agg = endpoint_aggregate(&param, &model, None).unwrap();
        assert_eq!(agg.mean(), [0.0, 0.0, 0.0]);
        assert_eq!(agg.dispersion(), 0.0);
    }

    #[test]
    fn vaccinating_the_hub_protects_the_star()
    {
        let graph = star(20);
        let store = compute_all(&graph, 1, &ExactCentrality).unwrap();
        let param = SimulateParams{
            beta: Some(1.0),
            gamma: Some(0.5),
            vaccination: Some(VaccinationParams{
                strategy: VaccinationType::Degree,
                amount: VaccineAmount::Count(1),
                sequential: true
            }),
            ..params(64)
        };
        let model = SimpleSampleSir::from_graph(&graph, param.sir_seed);
        let agg = endpoint_aggregate(&param, &model, Some(&store)).unwrap();
        // without the hub every leaf is isolated, only patient zero gets sick
        assert!((agg.mean()[2] - 1.0 / 21.0).abs() < 1e-12);
        assert!((agg.mean()[0] - 19.0 / 21.0).abs() < 1e-12);
    }

    #[test]
    fn missing_ordering_fails_before_trials()
    {
        let graph = cycle(6);
        let mut store = OrderingStore::new(6);
        store.insert(
            OrderingKey::new(OrderingKind::Degree, AttackMode::Simultaneous),
            (0..6).collect()
        );
        let wanted = OrderingKey::new(OrderingKind::Degree, AttackMode::Sequential);
        assert!(matches!(check_store(&store, wanted, 6), Err(SirError::MissingOrdering(_))));
        assert!(check_store(&store, OrderingKey::new(OrderingKind::Degree, AttackMode::Simultaneous), 6).is_ok());
        assert!(matches!(
            check_store(&store, OrderingKey::new(OrderingKind::Degree, AttackMode::Simultaneous), graph.vertex_count() + 1),
            Err(SirError::StoreMismatch{..})
        ));
    }

    #[test]
    fn round_cap_aborts_the_run()
    {
        let param = SimulateParams{
            beta: Some(1.0),
            gamma: Some(0.0),
            max_rounds: 20,
            ..params(3)
        };
        let mut model = SimpleSampleSir::from_graph(&cycle(4), param.sir_seed);
        model.set_max_rounds(param.max_rounds);
        let res = endpoint_aggregate(&param, &model, None);
        assert!(matches!(res, Err(SirError::RoundCapExceeded{rounds: 20, ..})));
    }

    #[test]
    fn round_cap_reports_the_drawn_recovery_probability()
    {
        let param = SimulateParams{
            beta: Some(1.0),
            gamma: None,
            max_rounds: 1,
            ..params(64)
        };
        let mut model = SimpleSampleSir::from_graph(&cycle(40), param.sir_seed);
        model.set_max_rounds(param.max_rounds);
        let err = endpoint_aggregate(&param, &model, None).unwrap_err();
        match err {
            SirError::RoundCapExceeded{rounds: 1, beta, gamma} => {
                assert_eq!(beta, 1.0);
                assert!(gamma > 0.0 && gamma <= 1.0);
                assert!(err.to_string().contains(&format!("gamma = {gamma}")));
            },
            ref other => panic!("expected round cap, got {other:?}")
        }
    }

    #[test]
    fn prepare_reads_network_and_store()
    {
        let dir = std::env::temp_dir().join(format!("sir_prepare_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let network = dir.join("net.txt");
        std::fs::write(&network, "a b\nb c\nc a\nd\n").unwrap();
        let network = network.to_str().unwrap().to_owned();

        let graph = load_edge_list(&network).unwrap();
        compute_all(&graph, 2, &ExactCentrality)
            .unwrap()
            .write(default_store_path(&network))
            .unwrap();

        let param = SimulateParams{
            network: network.clone(),
            vaccination: Some(VaccinationParams{
                strategy: VaccinationType::Closeness,
                amount: VaccineAmount::Count(2),
                sequential: false
            }),
            ..params(5)
        };
        let (model, store) = prepare(&param).unwrap();
        assert_eq!(model.n(), 4);
        assert_eq!(store.unwrap().vertex_count(), 4);

        let no_store = SimulateParams{
            orderings: Some(dir.join("missing.ord").to_str().unwrap().to_owned()),
            ..param
        };
        assert!(matches!(prepare(&no_store), Err(SirError::Io{..})));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
