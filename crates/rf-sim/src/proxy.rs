//! In-process analytic reservoir.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rf_components::{ControlMode, Stream, WellKind};
use rf_model::Model;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::exchange::{
    ControlSnapshot, IntervalControl, WellStreams, WellStreamsFile, ensure_folder, write_json,
};
use crate::simulator::ReservoirSimulator;

/// Inflow behaviour of one well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyWellParams {
    /// Liquid productivity (producers) or water injectivity (injectors),
    /// Sm3/day per bar of drawdown.
    pub productivity_index: f64,
    /// Produced gas per produced oil (Sm3/Sm3).
    pub gas_oil_ratio: f64,
    /// Water fraction of the produced liquid.
    pub water_cut: f64,
    /// Extra delivery pressure per unit gas-lift rate (bar per Sm3/day).
    pub lift_gain: f64,
}

impl Default for ProxyWellParams {
    fn default() -> Self {
        Self {
            productivity_index: 10.0,
            gas_oil_ratio: 100.0,
            water_cut: 0.2,
            lift_gain: 1e-4,
        }
    }
}

/// Tank-model reservoir: one average pressure, depleted by net voidage.
///
/// Producers follow a linear inflow relation `q_liq = PI (p_res - p_wf)`;
/// rate-controlled wells are capped by what the reservoir can deliver at the
/// minimum bottomhole pressure.
#[derive(Debug, Clone)]
pub struct ProxySimulator {
    folder: PathBuf,
    initial_pressure: f64,
    /// Reservoir pressure loss per Sm3 of net voidage (bar/Sm3).
    depletion: f64,
    min_bhp: f64,
    defaults: ProxyWellParams,
    wells: HashMap<String, ProxyWellParams>,
    write_files: bool,
    input: Option<ControlSnapshot>,
    output: Option<WellStreamsFile>,
    launches: usize,
}

impl ProxySimulator {
    pub fn new(folder: impl Into<PathBuf>, initial_pressure: f64, depletion: f64) -> Self {
        Self {
            folder: folder.into(),
            initial_pressure,
            depletion,
            min_bhp: 1.0,
            defaults: ProxyWellParams::default(),
            wells: HashMap::new(),
            write_files: true,
            input: None,
            output: None,
            launches: 0,
        }
    }

    pub fn with_defaults(mut self, params: ProxyWellParams) -> Self {
        self.defaults = params;
        self
    }

    pub fn with_well(mut self, name: impl Into<String>, params: ProxyWellParams) -> Self {
        self.wells.insert(name.into(), params);
        self
    }

    pub fn with_min_bhp(mut self, min_bhp: f64) -> Self {
        self.min_bhp = min_bhp;
        self
    }

    /// Keep input and output snapshots in memory only.
    pub fn in_memory(mut self) -> Self {
        self.write_files = false;
        self
    }

    fn params(&self, well: &str) -> &ProxyWellParams {
        self.wells.get(well).unwrap_or(&self.defaults)
    }

    /// Well streams for every schedule step of `snapshot`.
    pub fn simulate(&self, snapshot: &ControlSnapshot) -> WellStreamsFile {
        let mut streams: Vec<Vec<Stream>> = vec![Vec::new(); snapshot.wells.len()];
        let mut p_res = self.initial_pressure;
        let mut start = 0.0;

        for (k, t) in snapshot.schedule.iter().enumerate() {
            let dt = t - start;
            start = *t;
            let mut voidage = 0.0;

            for (w, well) in snapshot.wells.iter().enumerate() {
                let params = self.params(&well.name);
                let stream = match (well.kind, well.intervals.get(k)) {
                    (_, None) => Stream::new(*t, 0.0, 0.0, 0.0, p_res),
                    (WellKind::Production, Some(ctrl)) => {
                        let s = self.produce(params, ctrl, p_res, *t);
                        voidage += s.liquid_rate();
                        s
                    }
                    (WellKind::Injection, Some(ctrl)) => {
                        let s = self.inject(params, ctrl, p_res, *t);
                        voidage -= s.water_rate;
                        s
                    }
                };
                streams[w].push(stream);
            }

            p_res = (p_res - self.depletion * voidage * dt).max(self.min_bhp);
            debug!(time = t, reservoir_pressure = p_res, "Proxy step");
        }

        WellStreamsFile {
            wells: snapshot
                .wells
                .iter()
                .zip(streams)
                .map(|(w, streams)| WellStreams {
                    name: w.name.clone(),
                    streams,
                })
                .collect(),
        }
    }

    fn produce(&self, p: &ProxyWellParams, ctrl: &IntervalControl, p_res: f64, t: f64) -> Stream {
        let pi = p.productivity_index.max(0.0);
        let wc = p.water_cut.clamp(0.0, 1.0);
        let oil_share = 1.0 - wc;
        let max_liquid = pi * (p_res - self.min_bhp).max(0.0);

        let target = match ctrl.mode {
            ControlMode::Bhp => pi * (p_res - ctrl.value).max(0.0),
            ControlMode::LiquidRate => ctrl.value,
            ControlMode::OilRate => ratio(ctrl.value, oil_share),
            ControlMode::WaterRate => ratio(ctrl.value, wc),
            ControlMode::GasRate => ratio(ctrl.value, p.gas_oil_ratio * oil_share),
        };
        let liquid = target.clamp(0.0, max_liquid);
        let p_wf = if pi > 0.0 { p_res - liquid / pi } else { p_res };

        let oil = liquid * oil_share;
        let gas_lift = ctrl.gas_lift.max(0.0);
        Stream::new(
            t,
            oil,
            oil * p.gas_oil_ratio + gas_lift,
            liquid * wc,
            p_wf + p.lift_gain * gas_lift,
        )
    }

    fn inject(&self, p: &ProxyWellParams, ctrl: &IntervalControl, p_res: f64, t: f64) -> Stream {
        let ii = p.productivity_index.max(0.0);
        let (rate, p_wf) = match ctrl.mode {
            ControlMode::Bhp => (ii * (ctrl.value - p_res).max(0.0), ctrl.value),
            _ => {
                let rate = ctrl.value.max(0.0);
                let p_wf = if ii > 0.0 { p_res + rate / ii } else { p_res };
                (rate, p_wf)
            }
        };
        Stream::new(t, 0.0, 0.0, rate, p_wf)
    }
}

fn ratio(value: f64, share: f64) -> f64 {
    if share > 0.0 { value / share } else { 0.0 }
}

impl ReservoirSimulator for ProxySimulator {
    fn name(&self) -> &str {
        "proxy"
    }

    fn folder(&self) -> &Path {
        &self.folder
    }

    fn generate_input_files(&mut self, model: &Model) -> SimResult<()> {
        let snapshot = ControlSnapshot::from_model(model)?;
        if self.write_files {
            ensure_folder(&self.folder)?;
            write_json(&self.folder.join("proxy_input.json"), &snapshot)?;
        }
        self.input = Some(snapshot);
        Ok(())
    }

    fn launch_simulator(&mut self) -> SimResult<()> {
        let input = self.input.as_ref().ok_or(SimError::OutOfOrder {
            what: "launch before input generation",
        })?;
        let output = self.simulate(input);
        if self.write_files {
            write_json(&self.folder.join("proxy_output.json"), &output)?;
        }
        self.output = Some(output);
        self.launches += 1;
        Ok(())
    }

    fn read_output(&mut self, model: &mut Model) -> SimResult<()> {
        let output = self.output.as_ref().ok_or(SimError::OutOfOrder {
            what: "read before launch",
        })?;
        output.apply(model)
    }

    fn launches(&self) -> usize {
        self.launches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::WellControls;

    fn snapshot(mode: ControlMode, value: f64) -> ControlSnapshot {
        let schedule = vec![100.0, 200.0];
        ControlSnapshot {
            wells: vec![WellControls {
                name: "W1".into(),
                kind: WellKind::Production,
                intervals: schedule
                    .iter()
                    .map(|t| IntervalControl {
                        end_time: *t,
                        mode,
                        value,
                        gas_lift: 0.0,
                    })
                    .collect(),
            }],
            schedule,
        }
    }

    #[test]
    fn bhp_control_follows_inflow_relation() {
        let sim = ProxySimulator::new("unused", 200.0, 0.0).in_memory();
        let out = sim.simulate(&snapshot(ControlMode::Bhp, 150.0));
        let s = out.wells[0].streams[0];
        // PI 10 * 50 bar = 500 liquid, 20% water
        assert!((s.liquid_rate() - 500.0).abs() < 1e-9);
        assert!((s.oil_rate - 400.0).abs() < 1e-9);
        assert!((s.gas_rate - 40_000.0).abs() < 1e-6);
        assert!((s.pressure - 150.0).abs() < 1e-9);
    }

    #[test]
    fn depletion_lowers_later_rates() {
        let sim = ProxySimulator::new("unused", 200.0, 1e-4).in_memory();
        let out = sim.simulate(&snapshot(ControlMode::Bhp, 150.0));
        let [first, second] = [out.wells[0].streams[0], out.wells[0].streams[1]];
        assert!(second.oil_rate < first.oil_rate);
    }

    #[test]
    fn rate_control_is_capped_by_deliverability() {
        let sim = ProxySimulator::new("unused", 101.0, 0.0).in_memory();
        let out = sim.simulate(&snapshot(ControlMode::OilRate, 10_000.0));
        let s = out.wells[0].streams[0];
        // max liquid: 10 * (101 - 1)
        assert!((s.liquid_rate() - 1000.0).abs() < 1e-9);
        assert!((s.pressure - 1.0).abs() < 1e-9);
    }

    #[test]
    fn gas_lift_raises_delivery_pressure() {
        let sim = ProxySimulator::new("unused", 200.0, 0.0).in_memory();
        let mut snap = snapshot(ControlMode::Bhp, 150.0);
        snap.wells[0].intervals[0].gas_lift = 10_000.0;
        let out = sim.simulate(&snap);
        let s = out.wells[0].streams[0];
        assert!((s.pressure - 151.0).abs() < 1e-9);
        assert!((s.gas_rate - 50_000.0).abs() < 1e-6);
    }

    #[test]
    fn launch_requires_input() {
        let mut sim = ProxySimulator::new("unused", 200.0, 0.0).in_memory();
        assert!(matches!(
            sim.launch_simulator(),
            Err(SimError::OutOfOrder { .. })
        ));
        assert_eq!(sim.launches(), 0);
    }
}
