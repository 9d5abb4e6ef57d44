//all the methods of calculating averages and variances of the trials

use crate::sir_model::SirCurve;

/// Running mean of the final (s, i, r) fractions and running variance
/// of the recovered fraction (Welford)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EndpointAggregate
{
    pub count: usize,
    pub mean: [f64; 3],
    /// sum of squared deviations of r
    pub m2_r: f64,
}

impl EndpointAggregate{

    pub fn add(&mut self, fractions: [f64; 3])
    {
        self.count += 1;
        let count = self.count as f64;
        let old_r = self.mean[2];
        self.mean
            .iter_mut()
            .zip(fractions)
            .for_each(|(mean, val)| *mean += (val - *mean) / count);
        self.m2_r += (fractions[2] - self.mean[2]) * (fractions[2] - old_r);
    }

    /// Combines two partial results as if all samples were added to one
    pub fn merge(&mut self, other: &Self)
    {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let total = n_a + n_b;
        let delta_r = other.mean[2] - self.mean[2];
        self.m2_r += other.m2_r + delta_r * delta_r * n_a * n_b / total;
        self.mean
            .iter_mut()
            .zip(other.mean)
            .for_each(|(mean, other_mean)| *mean = (*mean * n_a + other_mean * n_b) / total);
        self.count += other.count;
    }

    pub fn mean(&self) -> [f64; 3]
    {
        self.mean
    }

    /// Population standard deviation of the recovered fraction
    pub fn dispersion(&self) -> f64
    {
        if self.count == 0 {
            0.0
        } else {
            (self.m2_r / self.count as f64).sqrt()
        }
    }
}

/// Repeats the last entry until the vector has length `len`
pub fn extend_with_last(vec: &mut Vec<f64>, len: usize)
{
    if let Some(&last) = vec.last() {
        vec.resize(len.max(vec.len()), last);
    }
}

/// Running mean of SIR curves.
/// Curves that died out earlier are continued with their final value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CurveAggregate
{
    pub count: usize,
    pub mean: SirCurve,
}

impl CurveAggregate{

    pub fn len(&self) -> usize
    {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.mean.is_empty()
    }

    fn align(&mut self, len: usize)
    {
        extend_with_last(&mut self.mean.s, len);
        extend_with_last(&mut self.mean.i, len);
        extend_with_last(&mut self.mean.r, len);
    }

    pub fn add(&mut self, curve: &SirCurve)
    {
        if curve.is_empty() {
            return;
        }
        if self.count == 0 {
            self.mean = curve.clone();
            self.count = 1;
            return;
        }
        let mut curve = curve.clone();
        let len = self.len().max(curve.len());
        self.align(len);
        extend_with_last(&mut curve.s, len);
        extend_with_last(&mut curve.i, len);
        extend_with_last(&mut curve.r, len);

        self.count += 1;
        let count = self.count as f64;
        let update = |mean: &mut [f64], new: &[f64]| {
            mean.iter_mut()
                .zip(new)
                .for_each(|(m, val)| *m += (val - *m) / count)
        };
        update(&mut self.mean.s, &curve.s);
        update(&mut self.mean.i, &curve.i);
        update(&mut self.mean.r, &curve.r);
    }

    pub fn merge(&mut self, other: &Self)
    {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }
        let mut other = other.clone();
        let len = self.len().max(other.len());
        self.align(len);
        other.align(len);

        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let total = n_a + n_b;
        let weighted = |mean: &mut [f64], new: &[f64]| {
            mean.iter_mut()
                .zip(new)
                .for_each(|(m, val)| *m = (*m * n_a + val * n_b) / total)
        };
        weighted(&mut self.mean.s, &other.mean.s);
        weighted(&mut self.mean.i, &other.mean.i);
        weighted(&mut self.mean.r, &other.mean.r);
        self.count += other.count;
    }
}
