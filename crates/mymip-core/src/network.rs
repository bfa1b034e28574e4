//! Minimum-cost flow networks.
//!
//! A [`Network`] is a tabular model of nodes with supply and arcs with bounds
//! and cost. It is loaded into the backend as a flow-conservation LP: one
//! equality row per node (`out-flow - in-flow = supply`) and one column per
//! arc. Like [`crate::Model`], edits made after loading are applied
//! incrementally.

use std::fmt;
use std::time::Instant;

use mymip_expr::ComparisonSense;
use mymip_solver::{
    BoundKind, ColumnBatch, LpArrays, ObjectiveSense, ProblemBackend, RowBatch, SolverError,
    SolverStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn inner(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArcId(u32);

impl ArcId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn inner(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

impl fmt::Display for ArcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub name: String,
    pub supply: f64,
    /// Dual of the node's conservation row at the last solve.
    pub dual: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArcRecord {
    pub name: String,
    pub tail: NodeId,
    pub head: NodeId,
    pub lower: f64,
    pub upper: f64,
    pub cost: f64,
    /// Flow at the last solve.
    pub flow: Option<f64>,
}

impl ArcRecord {
    /// Conservation-row entries of this arc, by increasing row.
    fn entries(&self) -> Vec<(usize, f64)> {
        let (tail, head) = (self.tail.index(), self.head.index());
        match tail.cmp(&head) {
            std::cmp::Ordering::Less => vec![(tail, 1.0), (head, -1.0)],
            std::cmp::Ordering::Greater => vec![(head, -1.0), (tail, 1.0)],
            // A self-loop leaves and re-enters the same node.
            std::cmp::Ordering::Equal => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    InvalidNodeId(NodeId),
    InvalidArcId(ArcId),
    InvalidArcBounds { lower: f64, upper: f64 },
    InvalidValue { value: f64 },
}

impl NetworkError {
    pub fn code(&self) -> &'static str {
        match self {
            NetworkError::InvalidNodeId(_) => "NETWORK_INVALID_NODE_ID",
            NetworkError::InvalidArcId(_) => "NETWORK_INVALID_ARC_ID",
            NetworkError::InvalidArcBounds { .. } => "NETWORK_INVALID_ARC_BOUNDS",
            NetworkError::InvalidValue { .. } => "NETWORK_INVALID_VALUE",
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.code();
        match self {
            NetworkError::InvalidNodeId(id) => write!(f, "[{code}] Unknown node {id}"),
            NetworkError::InvalidArcId(id) => write!(f, "[{code}] Unknown arc {id}"),
            NetworkError::InvalidArcBounds { lower, upper } => {
                write!(f, "[{code}] Invalid arc bounds [{lower}, {upper}]")
            }
            NetworkError::InvalidValue { value } => {
                write!(f, "[{code}] Value must be finite, got {value}")
            }
        }
    }
}

impl std::error::Error for NetworkError {}

/// A flow network bound to one backend problem instance.
pub struct Network {
    name: String,
    backend: Box<dyn ProblemBackend>,
    nodes: Vec<NodeRecord>,
    arcs: Vec<ArcRecord>,
    sense: ObjectiveSense,
    loaded: bool,
    last_error: Option<SolverError>,
}

impl Network {
    pub fn new(name: impl Into<String>, backend: Box<dyn ProblemBackend>) -> Self {
        let name = name.into();
        tracing::debug!(
            component = "network",
            operation = "create",
            status = "success",
            network = %name,
            backend = backend.name(),
            "Created network"
        );
        Self {
            name,
            backend,
            nodes: Vec::new(),
            arcs: Vec::new(),
            sense: ObjectiveSense::Minimize,
            loaded: false,
            last_error: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    pub fn last_error(&self) -> Option<&SolverError> {
        self.last_error.as_ref()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_arcs(&self) -> usize {
        self.arcs.len()
    }

    pub fn node(&self, id: NodeId) -> Result<&NodeRecord, NetworkError> {
        self.nodes
            .get(id.index())
            .ok_or(NetworkError::InvalidNodeId(id))
    }

    pub fn arc(&self, id: ArcId) -> Result<&ArcRecord, NetworkError> {
        self.arcs.get(id.index()).ok_or(NetworkError::InvalidArcId(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeRecord)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, record)| (NodeId::new(idx as u32), record))
    }

    pub fn arcs(&self) -> impl Iterator<Item = (ArcId, &ArcRecord)> {
        self.arcs
            .iter()
            .enumerate()
            .map(|(idx, record)| (ArcId::new(idx as u32), record))
    }

    /// Arcs leaving `node`.
    pub fn out_arcs(&self, node: NodeId) -> impl Iterator<Item = ArcId> + '_ {
        self.arcs()
            .filter(move |(_, arc)| arc.tail == node)
            .map(|(id, _)| id)
    }

    /// Arcs entering `node`.
    pub fn in_arcs(&self, node: NodeId) -> impl Iterator<Item = ArcId> + '_ {
        self.arcs()
            .filter(move |(_, arc)| arc.head == node)
            .map(|(id, _)| id)
    }

    /// Add a node. Positive supply is a source, negative supply a demand.
    pub fn add_node(&mut self, supply: f64, name: &str) -> Result<NodeId, NetworkError> {
        if !supply.is_finite() {
            return Err(NetworkError::InvalidValue { value: supply });
        }
        let id = NodeId::new(self.nodes.len() as u32);
        let name = if name.is_empty() {
            format!("N{}", id.inner())
        } else {
            name.to_string()
        };

        if self.loaded {
            let mut batch = RowBatch::new();
            batch.push(std::iter::empty(), ComparisonSense::Equal, supply, name.clone());
            let result = self.backend.add_rows(&batch);
            self.report("add_rows", result);
        }
        self.nodes.push(NodeRecord {
            name,
            supply,
            dual: None,
        });
        Ok(id)
    }

    /// Add an arc from `tail` to `head` carrying flow in `[lower, upper]`.
    pub fn add_arc(
        &mut self,
        tail: NodeId,
        head: NodeId,
        lower: f64,
        upper: f64,
        cost: f64,
        name: &str,
    ) -> Result<ArcId, NetworkError> {
        self.node(tail)?;
        self.node(head)?;
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(NetworkError::InvalidArcBounds { lower, upper });
        }
        if !cost.is_finite() {
            return Err(NetworkError::InvalidValue { value: cost });
        }

        let id = ArcId::new(self.arcs.len() as u32);
        let arc = ArcRecord {
            name: if name.is_empty() {
                format!("A{}", id.inner())
            } else {
                name.to_string()
            },
            tail,
            head,
            lower,
            upper,
            cost,
            flow: None,
        };

        if self.loaded {
            let mut batch = ColumnBatch::new();
            batch.push(arc.entries(), cost, lower, upper, arc.name.clone());
            let result = self.backend.add_columns(&batch);
            self.report("add_columns", result);
        }
        self.arcs.push(arc);

        tracing::trace!(
            component = "network",
            operation = "add_arc",
            status = "success",
            arc_id = id.inner(),
            tail = tail.inner(),
            head = head.inner(),
            "Added arc"
        );
        Ok(id)
    }

    pub fn minimize(&mut self) {
        self.set_sense(ObjectiveSense::Minimize);
    }

    pub fn maximize(&mut self) {
        self.set_sense(ObjectiveSense::Maximize);
    }

    fn set_sense(&mut self, sense: ObjectiveSense) {
        self.sense = sense;
        if self.loaded {
            let result = self.backend.change_objective_sense(sense);
            self.report("change_objective_sense", result);
        }
    }

    pub fn set_arc_cost(&mut self, arc: ArcId, cost: f64) -> Result<(), NetworkError> {
        self.set_costs(&[(arc, cost)])
    }

    /// Patch the cost of every listed arc.
    pub fn set_costs(&mut self, costs: &[(ArcId, f64)]) -> Result<(), NetworkError> {
        for (arc, cost) in costs {
            self.arc(*arc)?;
            if !cost.is_finite() {
                return Err(NetworkError::InvalidValue { value: *cost });
            }
        }
        for (arc, cost) in costs {
            self.arcs[arc.index()].cost = *cost;
        }

        if self.loaded {
            let cols = costs.iter().map(|(arc, _)| arc.index()).collect::<Vec<_>>();
            let values = costs.iter().map(|(_, cost)| *cost).collect::<Vec<_>>();
            let result = self.backend.change_objective(&cols, &values);
            self.report("change_objective", result);
        }
        Ok(())
    }

    pub fn set_arc_bounds(&mut self, arc: ArcId, lower: f64, upper: f64) -> Result<(), NetworkError> {
        self.arc(arc)?;
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(NetworkError::InvalidArcBounds { lower, upper });
        }
        let record = &mut self.arcs[arc.index()];
        record.lower = lower;
        record.upper = upper;

        if self.loaded {
            let result = self
                .backend
                .change_bounds(&[arc.index()], BoundKind::Lower, &[lower]);
            self.report("change_bounds", result);
            let result = self
                .backend
                .change_bounds(&[arc.index()], BoundKind::Upper, &[upper]);
            self.report("change_bounds", result);
        }
        Ok(())
    }

    pub fn set_supply(&mut self, node: NodeId, supply: f64) -> Result<(), NetworkError> {
        self.node(node)?;
        if !supply.is_finite() {
            return Err(NetworkError::InvalidValue { value: supply });
        }
        self.nodes[node.index()].supply = supply;

        if self.loaded {
            let result = self.backend.change_rhs(&[node.index()], &[supply]);
            self.report("change_rhs", result);
        }
        Ok(())
    }

    /// Flow-conservation arrays for the current nodes and arcs.
    pub fn build_arrays(&self) -> LpArrays {
        let mut col_start = Vec::with_capacity(self.arcs.len() + 1);
        let mut row_index = Vec::with_capacity(self.arcs.len() * 2);
        let mut values = Vec::with_capacity(self.arcs.len() * 2);
        col_start.push(0);
        for arc in &self.arcs {
            for (row, value) in arc.entries() {
                row_index.push(row);
                values.push(value);
            }
            col_start.push(values.len());
        }

        LpArrays {
            num_cols: self.arcs.len(),
            num_rows: self.nodes.len(),
            sense: self.sense,
            objective: self.arcs.iter().map(|arc| arc.cost).collect(),
            lower: self.arcs.iter().map(|arc| arc.lower).collect(),
            upper: self.arcs.iter().map(|arc| arc.upper).collect(),
            rhs: self.nodes.iter().map(|node| node.supply).collect(),
            row_senses: vec![ComparisonSense::Equal; self.nodes.len()],
            col_start,
            row_index,
            values,
            col_names: self.arcs.iter().map(|arc| arc.name.clone()).collect(),
            row_names: self.nodes.iter().map(|node| node.name.clone()).collect(),
            kinds: None,
        }
    }

    /// Load the network into the backend. A no-op once loaded.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        let arrays = self.build_arrays();
        let result = self.backend.load(&arrays);
        self.report("load", result);
        self.loaded = true;

        tracing::debug!(
            component = "network",
            operation = "load",
            status = "success",
            network = %self.name,
            nodes = arrays.num_rows,
            arcs = arrays.num_cols,
            "Loaded network"
        );
    }

    /// Solve, storing arc flows and node duals.
    pub fn optimize(&mut self) -> SolverStatus {
        self.load();

        let started = Instant::now();
        let result = self.backend.solve_lp();
        self.report("solve_lp", result);

        match self.backend.primal() {
            Ok(flows) => {
                for (arc, flow) in self.arcs.iter_mut().zip(flows) {
                    arc.flow = Some(flow);
                }
            }
            Err(err) => self.report("primal", Err(err)),
        }
        match self.backend.dual() {
            Ok(duals) => {
                for (node, dual) in self.nodes.iter_mut().zip(duals) {
                    node.dual = Some(dual);
                }
            }
            Err(err) => self.report("dual", Err(err)),
        }

        let status = self.backend.status();
        tracing::debug!(
            component = "network",
            operation = "optimize",
            status = status.as_str(),
            network = %self.name,
            objective = self.backend.objective_value(),
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Solved network"
        );
        status
    }

    pub fn flow(&self, arc: ArcId) -> Option<f64> {
        self.arcs.get(arc.index()).and_then(|record| record.flow)
    }

    pub fn dual(&self, node: NodeId) -> Option<f64> {
        self.nodes.get(node.index()).and_then(|record| record.dual)
    }

    pub fn objective_value(&self) -> f64 {
        self.backend.objective_value()
    }

    pub fn solve_status(&self) -> SolverStatus {
        if !self.loaded {
            return SolverStatus::NotSolved;
        }
        self.backend.status()
    }

    pub fn status(&self) -> String {
        self.backend.status_string(self.backend.status_code())
    }

    fn report(&mut self, operation: &'static str, result: Result<(), SolverError>) {
        if let Err(err) = result {
            tracing::warn!(
                component = "network",
                operation,
                status = "error",
                network = %self.name,
                error_code = err.code(),
                error = %err,
                "Backend call failed"
            );
            self.last_error = Some(err);
        }
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("name", &self.name)
            .field("backend", &self.backend.name())
            .field("nodes", &self.nodes.len())
            .field("arcs", &self.arcs.len())
            .field("loaded", &self.loaded)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::{ArcId, Network, NetworkError, NodeId};
    use crate::model::tests::support::{Call, calls_after_load, recording};
    use mymip_expr::ComparisonSense;
    use mymip_solver::{ObjectiveSense, SolverStatus};

    fn triangle() -> (Network, std::rc::Rc<std::cell::RefCell<crate::model::tests::support::Mirror>>) {
        let (backend, mirror) = recording();
        let mut net = Network::new("flow", backend);
        let s = net.add_node(4.0, "s").unwrap();
        let m = net.add_node(0.0, "").unwrap();
        let t = net.add_node(-4.0, "t").unwrap();
        net.add_arc(s, m, 0.0, 3.0, 1.0, "").unwrap();
        net.add_arc(m, t, 0.0, 3.0, 1.0, "").unwrap();
        net.add_arc(t, s, 0.0, f64::INFINITY, 5.0, "back").unwrap();
        (net, mirror)
    }

    #[test]
    fn conservation_rows_use_out_minus_in() {
        let (net, _) = triangle();
        let arrays = net.build_arrays();

        assert_eq!(arrays.validate(), Ok(()));
        assert_eq!(arrays.rhs, vec![4.0, 0.0, -4.0]);
        assert_eq!(arrays.row_senses, vec![ComparisonSense::Equal; 3]);
        assert_eq!(arrays.column(0).collect::<Vec<_>>(), vec![(0, 1.0), (1, -1.0)]);
        assert_eq!(arrays.column(2).collect::<Vec<_>>(), vec![(0, -1.0), (2, 1.0)]);
        assert_eq!(arrays.row_names, vec!["s", "N1", "t"]);
        assert_eq!(arrays.col_names, vec!["A0", "A1", "back"]);
        assert_eq!(arrays.sense, ObjectiveSense::Minimize);
    }

    #[test]
    fn arcs_require_known_nodes_and_ordered_bounds() {
        let (mut net, _) = triangle();
        let ghost = NodeId::new(7);
        assert_eq!(
            net.add_arc(NodeId::new(0), ghost, 0.0, 1.0, 0.0, ""),
            Err(NetworkError::InvalidNodeId(ghost))
        );
        assert_eq!(
            net.add_arc(NodeId::new(0), NodeId::new(1), 2.0, 1.0, 0.0, ""),
            Err(NetworkError::InvalidArcBounds {
                lower: 2.0,
                upper: 1.0
            })
        );
        assert_eq!(net.num_arcs(), 3);
        assert_eq!(net.out_arcs(NodeId::new(0)).collect::<Vec<_>>(), vec![ArcId::new(0)]);
        assert_eq!(net.in_arcs(NodeId::new(0)).collect::<Vec<_>>(), vec![ArcId::new(2)]);
    }

    #[test]
    fn optimize_stores_flows_and_duals() {
        let (mut net, mirror) = triangle();
        mirror.borrow_mut().primal = vec![3.0, 3.0, 0.0];

        let status = net.optimize();

        assert_eq!(status, SolverStatus::Optimal);
        assert_eq!(net.flow(ArcId::new(1)), Some(3.0));
        assert_eq!(net.dual(NodeId::new(2)), Some(2.5));
        assert_eq!(net.objective_value(), 6.0);
        assert!(mirror.borrow().calls.contains(&Call::SolveLp));
    }

    #[test]
    fn edits_after_loading_are_incremental() {
        let (mut net, mirror) = triangle();
        net.load();
        let s = NodeId::new(0);

        net.set_arc_cost(ArcId::new(2), 2.0).unwrap();
        net.set_supply(s, 5.0).unwrap();
        net.maximize();
        let extra = net.add_node(-1.0, "sink").unwrap();
        net.add_arc(s, extra, 0.0, 1.0, 0.0, "").unwrap();

        assert_eq!(
            calls_after_load(&mirror),
            vec![
                Call::ChangeObjective(vec![2], vec![2.0]),
                Call::ChangeRhs(vec![0], vec![5.0]),
                Call::ChangeObjectiveSense(ObjectiveSense::Maximize),
                Call::AddRows(1),
                Call::AddColumns(1),
            ]
        );
        assert_eq!(mirror.borrow().row_nnz, vec![3, 2, 2, 1]);
        assert_eq!(net.node(s).unwrap().supply, 5.0);
    }

    #[test]
    fn arc_bounds_change_both_sides() {
        let (mut net, mirror) = triangle();
        net.load();
        net.set_arc_bounds(ArcId::new(0), 1.0, 2.0).unwrap();

        let mirror = mirror.borrow();
        assert_eq!((mirror.lower[0], mirror.upper[0]), (1.0, 2.0));
        assert!(net.set_arc_bounds(ArcId::new(9), 0.0, 1.0).is_err());
    }
}
