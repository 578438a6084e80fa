//! Objective strategies folded over production-well streams.

use rf_components::Stream;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectiveKind {
    /// Cumulative oil (Sm3).
    CumulativeOil,
    /// Cumulative gas (Sm3).
    CumulativeGas,
    /// Negated cumulative water, so that less water scores higher.
    CumulativeWater,
    /// Net present value with annual discounting on `t / 365`.
    Npv {
        oil_price: f64,
        gas_price: f64,
        water_cost: f64,
        discount_rate: f64,
    },
}

impl ObjectiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectiveKind::CumulativeOil => "cumulative_oil",
            ObjectiveKind::CumulativeGas => "cumulative_gas",
            ObjectiveKind::CumulativeWater => "cumulative_water",
            ObjectiveKind::Npv { .. } => "npv",
        }
    }
}

/// Objective value plus the strategy that derives it.
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub kind: ObjectiveKind,
    pub value: f64,
}

impl Objective {
    pub fn new(kind: ObjectiveKind) -> Self {
        Self { kind, value: 0.0 }
    }

    /// Fold the streams of every producer over the schedule.
    ///
    /// Step `i` covers `(schedule[i-1], schedule[i]]`, starting at day 0.
    pub fn evaluate<'a>(
        &self,
        schedule: &[f64],
        producers: impl IntoIterator<Item = &'a [Stream]>,
    ) -> f64 {
        let mut total = 0.0;
        for streams in producers {
            let mut start = 0.0;
            for (stream, end) in streams.iter().zip(schedule) {
                let dt = end - start;
                start = *end;
                total += self.step_value(stream, *end, dt);
            }
        }
        total
    }

    fn step_value(&self, s: &Stream, time: f64, dt: f64) -> f64 {
        match &self.kind {
            ObjectiveKind::CumulativeOil => s.oil_rate * dt,
            ObjectiveKind::CumulativeGas => s.gas_rate * dt,
            ObjectiveKind::CumulativeWater => -s.water_rate * dt,
            ObjectiveKind::Npv {
                oil_price,
                gas_price,
                water_cost,
                discount_rate,
            } => {
                let cash = (oil_price * s.oil_rate + gas_price * s.gas_rate
                    - water_cost * s.water_rate)
                    * dt;
                cash / (1.0 + discount_rate).powf(time / 365.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streams() -> Vec<Stream> {
        vec![
            Stream::new(100.0, 10.0, 1000.0, 5.0, 50.0),
            Stream::new(365.0, 20.0, 2000.0, 10.0, 45.0),
        ]
    }

    #[test]
    fn cumulative_uses_interval_lengths() {
        let schedule = [100.0, 365.0];
        let s = streams();
        let oil = Objective::new(ObjectiveKind::CumulativeOil);
        assert!((oil.evaluate(&schedule, [s.as_slice()]) - (1000.0 + 5300.0)).abs() < 1e-9);

        let water = Objective::new(ObjectiveKind::CumulativeWater);
        assert!((water.evaluate(&schedule, [s.as_slice()]) + (500.0 + 2650.0)).abs() < 1e-9);
    }

    #[test]
    fn npv_discounts_annually() {
        let schedule = [365.0];
        let s = [Stream::new(365.0, 1.0, 0.0, 0.0, 0.0)];
        let npv = Objective::new(ObjectiveKind::Npv {
            oil_price: 100.0,
            gas_price: 0.0,
            water_cost: 0.0,
            discount_rate: 0.1,
        });
        let v = npv.evaluate(&schedule, [s.as_slice()]);
        assert!((v - 36_500.0 / 1.1).abs() < 1e-6);
    }
}
