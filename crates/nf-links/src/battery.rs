//! Battery of series cells with table-driven open-circuit potential.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use nf_core::LinearTable;

use crate::common::{limit_conductance, port_drop, require_fraction, require_positive, two_port_flows};
use crate::contribution::Contribution;
use crate::error::{LinkError, LinkResult};
use crate::state::LinkState;
use crate::traits::Link;

/// Series string of identical cells between a negative terminal (port 0) and
/// a positive terminal (port 1).
///
/// Acts as a potential source: open-circuit potential
/// `cells * voc_table(soc)` behind conductance `1 / (cells * cell_resistance)`.
/// State of charge is an input and is not integrated.
#[derive(Clone)]
pub struct Battery {
    name: String,
    pub cells: usize,
    /// Internal resistance per cell
    pub cell_resistance: f64,
    /// Capacity in amp-hours
    pub max_capacity: f64,
    /// State of charge in [0, 1]
    pub soc: f64,
    /// Open-circuit malfunction: terminals disconnected from the cells
    pub open_circuit: bool,
    voc_table: Arc<LinearTable>,
    conductance: f64,
    open_circuit_potential: f64,
    flux: f64,
}

impl fmt::Debug for Battery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Battery")
            .field("name", &self.name)
            .field("cells", &self.cells)
            .field("cell_resistance", &self.cell_resistance)
            .field("soc", &self.soc)
            .field("open_circuit", &self.open_circuit)
            .finish()
    }
}

impl Battery {
    pub fn new(
        name: impl Into<String>,
        cells: usize,
        cell_resistance: f64,
        max_capacity: f64,
        soc: f64,
        voc_table: Arc<LinearTable>,
    ) -> Self {
        let mut battery = Self {
            name: name.into(),
            cells,
            cell_resistance,
            max_capacity,
            soc,
            open_circuit: false,
            voc_table,
            conductance: 0.0,
            open_circuit_potential: 0.0,
            flux: 0.0,
        };
        battery.refresh();
        battery
    }

    /// Potential across the cells with no current.
    pub fn open_circuit_potential(&self) -> f64 {
        self.open_circuit_potential
    }

    /// Current out of the positive terminal from the last step.
    pub fn current(&self) -> f64 {
        self.flux
    }

    fn refresh(&mut self) -> bool {
        let resistance = self.cells as f64 * self.cell_resistance;
        let g = if self.open_circuit || resistance <= 0.0 {
            0.0
        } else {
            limit_conductance(1.0 / resistance)
        };
        let voc = self.cells as f64 * self.voc_table.eval(self.soc.clamp(0.0, 1.0));
        let changed = g != self.conductance || voc != self.open_circuit_potential;
        self.conductance = g;
        self.open_circuit_potential = voc;
        changed
    }
}

impl Link for Battery {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> LinkResult<()> {
        if self.cells == 0 {
            return Err(LinkError::InvalidArg {
                link: self.name.clone(),
                what: "battery needs at least one cell",
            });
        }
        require_positive(&self.name, "cell resistance", self.cell_resistance)?;
        require_positive(&self.name, "max capacity", self.max_capacity)?;
        require_fraction(&self.name, "state of charge", self.soc)
    }

    fn step(&mut self, _dt: f64) -> bool {
        self.refresh()
    }

    fn contribute(&self, out: &mut Contribution) {
        out.add_conductance(0, 1, self.conductance);
        out.add_flux(0, 1, self.conductance * self.open_circuit_potential);
    }

    fn compute_flows(&mut self, potentials: &[f64], _dt: f64, flows: &mut [f64]) {
        self.flux = self.conductance * (port_drop(potentials) + self.open_circuit_potential);
        two_port_flows(self.flux, flows);
    }

    fn flux(&self) -> f64 {
        self.flux
    }

    fn save_state(&self) -> LinkState {
        LinkState::new().with("soc", self.soc)
    }

    fn restore_state(&mut self, state: &LinkState) -> LinkResult<()> {
        self.soc = state.require(&self.name, "soc")?;
        self.refresh();
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
