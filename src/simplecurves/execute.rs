use {
    serde_json::Value,
    crate::{
        error::*,
        sir_model::*,
        attack_orderings::OrderingStore,
        stats_methods::*,
        simple_sampling::*,
    },
};

/// Mean S, I and R curves over all trials
pub fn curve_aggregate(
    param: &SimulateParams,
    model: &SimpleSampleSir,
    store: Option<&OrderingStore>
) -> SirResult<CurveAggregate>
{
    let partials = run_chunks(
        param.trials.get(),
        param.sir_seed,
        model,
        |model, seed, acc: &mut CurveAggregate|
        {
            let exhausted = prepare_trial(model, param, store, seed)?;
            let curve = model.propagate_curve()?;
            acc.add(&curve);
            Ok(exhausted)
        }
    )?;

    let mut total = CurveAggregate::default();
    partials.iter()
        .for_each(|partial| total.merge(partial));
    log::info!("longest outbreak: {} rounds", total.len().saturating_sub(1));
    Ok(total)
}

pub fn execute_curves(
    param: SimulateParams,
    json: Value,
    out: Option<&String>
) -> SirResult<()>
{
    let (model, store) = prepare(&param)?;
    let aggregate = curve_aggregate(&param, &model, store.as_ref())?;
    let mut writer = SirWriter::new(out, &json)?;
    writer.write_curve(&aggregate.mean)?;
    writer.finish()
}
