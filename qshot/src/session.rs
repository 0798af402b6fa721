//! Scoped simulation session
//!
//! A [`Session`] owns one circuit under construction, the executor that runs
//! it and the histogram of the latest execution. Building calls validate
//! before recording and leave the log untouched on error.

use qshot_core::{export, Basis, Circuit, LatexConfig, Operation, QuantumError, Result};
use qshot_gates::GateKind;
use qshot_sim::{ExecutionStatistics, Executor, ExecutorConfig, Histogram, Preview};

pub use qshot_state::MAX_QUBITS;

/// Circuit builder, executor and result holder in one scope
///
/// The session is finalized exactly once: by [`close`](Session::close), by
/// leaving [`scoped`](Session::scoped), or on drop.
///
/// # Example
/// ```
/// use qshot::Session;
///
/// let mut session = Session::new(2, 5).unwrap();
/// session.rx(1.23, 0).unwrap();
/// let p = session.peek(0, 0).unwrap();
/// assert!((p - (1.23f64 / 2.0).sin().powi(2)).abs() < 1e-12);
///
/// let counts = session.execute(256).unwrap();
/// assert_eq!(counts.total(), 256);
/// ```
#[derive(Debug)]
pub struct Session {
    circuit: Circuit,
    executor: Executor,
    histogram: Histogram,
    statistics: Option<ExecutionStatistics>,
    preview: Option<Preview>,
    closed: bool,
}

macro_rules! fixed_gates {
    ($($(#[$doc:meta])* $name:ident => $kind:ident, [$($q:ident),+];)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&mut self, $($q: usize),+) -> Result<&mut Self> {
                self.apply(GateKind::$kind, &[$($q),+])
            }
        )*
    };
}

macro_rules! rotation_gates {
    ($($(#[$doc:meta])* $name:ident => $kind:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&mut self, theta: f64, qubit: usize) -> Result<&mut Self> {
                self.apply(GateKind::$kind(theta), &[qubit])
            }
        )*
    };
}

impl Session {
    /// Open a session over `num_qubits` qubits and `num_bits` classical bits
    ///
    /// # Errors
    /// `InvalidArgument` for zero qubits or more than [`MAX_QUBITS`]
    pub fn new(num_qubits: usize, num_bits: usize) -> Result<Self> {
        let circuit = Circuit::new(num_qubits, num_bits)?;
        tracing::debug!(qubits = num_qubits, bits = num_bits, "session opened");
        Ok(Self {
            circuit,
            executor: Executor::default(),
            histogram: Histogram::new(),
            statistics: None,
            preview: None,
            closed: false,
        })
    }

    /// Run `body` with a fresh session and finalize it on every exit path
    ///
    /// # Example
    /// ```
    /// use qshot::{QuantumError, Session};
    ///
    /// let p = Session::scoped(1, 0, |s| -> Result<f64, QuantumError> {
    ///     s.x(0)?;
    ///     s.probability(0)
    /// })
    /// .unwrap();
    /// assert_eq!(p, 1.0);
    /// ```
    pub fn scoped<T, E, F>(num_qubits: usize, num_bits: usize, body: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Session) -> std::result::Result<T, E>,
        E: From<QuantumError>,
    {
        let mut session = Session::new(num_qubits, num_bits)?;
        let output = body(&mut session);
        session.close();
        output
    }

    /// Replace the executor configuration
    ///
    /// # Errors
    /// `InvalidArgument` if the configuration does not validate
    pub fn with_config(mut self, config: ExecutorConfig) -> Result<Self> {
        config.validate()?;
        self.executor = Executor::new(config);
        Ok(self)
    }

    /// Set the executor configuration in place
    pub fn set_config(&mut self, config: ExecutorConfig) -> Result<()> {
        config.validate()?;
        self.executor = Executor::new(config);
        Ok(())
    }

    /// Executor configuration
    pub fn config(&self) -> &ExecutorConfig {
        self.executor.config()
    }

    /// Number of qubits
    pub fn num_qubits(&self) -> usize {
        self.circuit.num_qubits()
    }

    /// Number of classical bits
    pub fn num_bits(&self) -> usize {
        self.circuit.num_bits()
    }

    /// The recorded circuit
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Record `gate` on `targets`
    pub fn apply(&mut self, gate: GateKind, targets: &[usize]) -> Result<&mut Self> {
        self.circuit.add_gate(gate, targets)?;
        Ok(self)
    }

    fixed_gates! {
        /// Identity
        i => I, [qubit];
        /// Pauli X
        x => X, [qubit];
        /// Pauli Y
        y => Y, [qubit];
        /// Pauli Z
        z => Z, [qubit];
        /// Hadamard
        h => H, [qubit];
        /// Phase gate
        s => S, [qubit];
        /// Inverse phase gate
        sdg => Sdg, [qubit];
        /// π/8 gate
        t => T, [qubit];
        /// Inverse π/8 gate
        tdg => Tdg, [qubit];
        /// Square root of X
        v => V, [qubit];
        /// Inverse square root of X
        vdg => Vdg, [qubit];
        /// Controlled X
        cx => CX, [control, target];
        /// Controlled Y
        cy => CY, [control, target];
        /// Controlled Z
        cz => CZ, [control, target];
        /// Controlled Hadamard
        ch => CH, [control, target];
        /// Swap two qubits
        swap => Swap, [a, b];
        /// Toffoli
        ccx => CCX, [control_a, control_b, target];
    }

    rotation_gates! {
        /// Rotation about X
        rx => RX;
        /// Rotation about Y
        ry => RY;
        /// Rotation about Z
        rz => RZ;
        /// Phase rotation `u1(λ)`
        u1 => U1;
    }

    /// `u2(φ, λ)`
    pub fn u2(&mut self, phi: f64, lambda: f64, qubit: usize) -> Result<&mut Self> {
        self.apply(GateKind::U2(phi, lambda), &[qubit])
    }

    /// `u3(θ, φ, λ)`
    pub fn u3(&mut self, theta: f64, phi: f64, lambda: f64, qubit: usize) -> Result<&mut Self> {
        self.apply(GateKind::U3(theta, phi, lambda), &[qubit])
    }

    /// Measure `qubit` in the computational basis into `cbit`
    pub fn measure(&mut self, qubit: usize, cbit: usize) -> Result<&mut Self> {
        self.circuit.measure(qubit, cbit)?;
        Ok(self)
    }

    /// Measure `qubit` in the X basis into `cbit`
    pub fn measure_x(&mut self, qubit: usize, cbit: usize) -> Result<&mut Self> {
        self.circuit.measure_in(qubit, cbit, Basis::X)?;
        Ok(self)
    }

    /// Measure `qubit` in the Y basis into `cbit`
    pub fn measure_y(&mut self, qubit: usize, cbit: usize) -> Result<&mut Self> {
        self.circuit.measure_in(qubit, cbit, Basis::Y)?;
        Ok(self)
    }

    /// Measure every qubit `q` into classical bit `q`
    ///
    /// # Errors
    /// `InvalidArgument` if there are fewer classical bits than qubits; no
    /// measurement is recorded in that case.
    pub fn measure_all(&mut self) -> Result<&mut Self> {
        if self.num_bits() < self.num_qubits() {
            return Err(QuantumError::InvalidArgument(format!(
                "measure_all needs {} classical bits, session has {}",
                self.num_qubits(),
                self.num_bits()
            )));
        }
        for qubit in 0..self.num_qubits() {
            self.circuit.measure(qubit, qubit)?;
        }
        Ok(self)
    }

    /// Force `qubit` back to |0⟩
    pub fn reset(&mut self, qubit: usize) -> Result<&mut Self> {
        self.circuit.reset(qubit)?;
        Ok(self)
    }

    /// Scheduling barrier; an empty slice covers every qubit
    pub fn barrier(&mut self, qubits: &[usize]) -> Result<&mut Self> {
        self.circuit.barrier(qubits)?;
        Ok(self)
    }

    /// Apply `gate` only when `cbits` (first bit least significant) read `value`
    pub fn apply_if(
        &mut self,
        cbits: &[usize],
        value: u64,
        gate: GateKind,
        targets: &[usize],
    ) -> Result<&mut Self> {
        self.circuit.add_conditional(cbits, value, gate, targets)?;
        Ok(self)
    }

    /// Record a non-destructive measurement and return its exact probability
    ///
    /// Every later shot samples `qubit` into `cbit` without collapsing it.
    /// The returned value is the probability that `qubit` reads 1 given
    /// everything recorded so far.
    ///
    /// The preview behind it is kept between calls and only replays the
    /// operations recorded since, unless one of them is a conditional.
    ///
    /// # Errors
    /// `OutOfRange` for a bad index, `ResourceExhausted` if the exact
    /// preview does not fit in memory
    pub fn peek(&mut self, qubit: usize, cbit: usize) -> Result<f64> {
        let operation = Operation::peek(qubit, cbit);
        self.circuit.validate_operation(&operation)?;
        let probability = self.refresh_preview()?.probability_one(qubit)?;
        self.circuit.push(operation)?;
        Ok(probability)
    }

    /// Exact probability that `qubit` reads 1; records nothing
    pub fn probability(&self, qubit: usize) -> Result<f64> {
        if qubit >= self.num_qubits() {
            return Err(QuantumError::invalid_qubit(qubit, self.num_qubits()));
        }
        match &self.preview {
            Some(cached) if cached.len() == self.circuit.len() => cached.probability_one(qubit),
            Some(cached) => {
                let mut preview = cached.clone();
                preview.update(&self.circuit)?;
                preview.probability_one(qubit)
            }
            None => Preview::of(&self.circuit)?.probability_one(qubit),
        }
    }

    fn refresh_preview(&mut self) -> Result<&Preview> {
        let preview = match self.preview.take() {
            Some(mut cached) => {
                cached.update(&self.circuit)?;
                cached
            }
            None => Preview::of(&self.circuit)?,
        };
        let preview: &Preview = self.preview.insert(preview);
        Ok(preview)
    }

    /// Run the circuit `shots` times and keep the histogram
    pub fn execute(&mut self, shots: usize) -> qshot_sim::Result<&Histogram> {
        let result = self.executor.execute(&self.circuit, shots)?;
        self.histogram = result.histogram;
        self.statistics = result.statistics;
        Ok(&self.histogram)
    }

    /// [`execute`](Self::execute) for callers holding a signed count
    ///
    /// # Errors
    /// `InvalidArgument` for a negative count
    pub fn execute_signed(&mut self, shots: i64) -> qshot_sim::Result<&Histogram> {
        let shots = usize::try_from(shots).map_err(|_| {
            QuantumError::InvalidArgument(format!("shot count must be >= 0, got {}", shots))
        })?;
        self.execute(shots)
    }

    /// Histogram of the latest execution; empty before the first one
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Statistics of the latest execution, if collection is enabled
    pub fn statistics(&self) -> Option<&ExecutionStatistics> {
        self.statistics.as_ref()
    }

    /// LaTeX `qcircuit` rendering with default settings
    pub fn latex(&self) -> String {
        export::latex(&self.circuit, &LatexConfig::default())
    }

    /// LaTeX rendering with explicit settings
    pub fn latex_with(&self, config: &LatexConfig) -> String {
        export::latex(&self.circuit, config)
    }

    /// OpenQASM 2.0 program
    pub fn open_qasm(&self) -> String {
        export::open_qasm(&self.circuit)
    }

    /// cQASM 1.0 program
    pub fn c_qasm(&self) -> String {
        export::c_qasm(&self.circuit)
    }

    /// Finalize the session and hand back the latest histogram
    pub fn close(mut self) -> Histogram {
        self.finalize();
        std::mem::take(&mut self.histogram)
    }

    fn finalize(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        tracing::debug!(
            operations = self.circuit.len(),
            shots = self.histogram.total(),
            "session closed"
        );
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.finalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qshot_sim::ExecutionError;

    #[test]
    fn test_new_rejects_bad_sizes() {
        assert!(matches!(
            Session::new(0, 1),
            Err(QuantumError::InvalidArgument(_))
        ));
        assert!(Session::new(MAX_QUBITS + 1, 0).is_err());
    }

    #[test]
    fn test_chained_building() {
        let mut session = Session::new(3, 3).unwrap();
        session.h(0).unwrap().cx(0, 1).unwrap().ccx(0, 1, 2).unwrap();
        session.u3(0.1, 0.2, 0.3, 2).unwrap().u2(0.4, 0.5, 1).unwrap();
        assert_eq!(session.circuit().len(), 5);
    }

    #[test]
    fn test_rejected_calls_leave_log_unchanged() {
        let mut session = Session::new(2, 1).unwrap();
        session.x(0).unwrap();
        assert!(session.cx(0, 0).is_err());
        assert!(session.h(2).is_err());
        assert!(session.measure(0, 1).is_err());
        assert!(session.peek(5, 0).is_err());
        assert!(session.measure_all().is_err());
        assert!(session.apply(GateKind::CX, &[0]).is_err());
        assert_eq!(session.circuit().len(), 1);
    }

    #[test]
    fn test_peek_records_and_returns_probability() {
        let mut session = Session::new(1, 2).unwrap();
        assert_abs_diff_eq!(session.peek(0, 0).unwrap(), 0.0, epsilon = 1e-12);
        session.x(0).unwrap();
        assert_abs_diff_eq!(session.peek(0, 1).unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(session.circuit().len(), 3);
        assert_eq!(session.execute(10).unwrap().get("01"), 10);
    }

    #[test]
    fn test_probability_records_nothing() {
        let mut session = Session::new(2, 0).unwrap();
        session.ry(std::f64::consts::FRAC_PI_2, 1).unwrap();
        assert_abs_diff_eq!(session.probability(1).unwrap(), 0.5, epsilon = 1e-12);
        assert_eq!(session.circuit().len(), 1);
        assert!(session.probability(2).is_err());
    }

    #[test]
    fn test_peek_after_repeated_measurements() {
        let mut session = Session::new(10, 1).unwrap();
        for _ in 0..13 {
            session.h(0).unwrap().measure(0, 0).unwrap();
        }
        assert_abs_diff_eq!(session.peek(1, 0).unwrap(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(session.probability(1).unwrap(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(session.probability(0).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_peek_on_large_register() {
        let mut session = Session::new(22, 1).unwrap();
        session.h(0).unwrap().measure(0, 0).unwrap();
        assert_abs_diff_eq!(session.peek(0, 0).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_cached_preview_tracks_new_operations() {
        let mut session = Session::new(3, 2).unwrap();
        let mut peeks = Vec::new();
        for round in 0..6 {
            let angle = 0.3 + 0.25 * round as f64;
            session.ry(angle, round % 3).unwrap();
            session.cx(round % 3, (round + 1) % 3).unwrap();
            session.measure(round % 3, 0).unwrap();
            if round % 2 == 1 {
                session.apply_if(&[0], 1, GateKind::H, &[(round + 2) % 3]).unwrap();
            }
            let expected = Preview::of(session.circuit())
                .unwrap()
                .probability_one(2)
                .unwrap();
            peeks.push((session.peek(2, 1).unwrap(), expected));

            let fresh = Preview::of(session.circuit())
                .unwrap()
                .probability_one(1)
                .unwrap();
            assert_abs_diff_eq!(session.probability(1).unwrap(), fresh, epsilon = 1e-12);
        }
        for (cached, fresh) in peeks {
            assert_abs_diff_eq!(cached, fresh, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_condition_wider_than_64_bits_rejected() {
        let mut session = Session::new(1, 65).unwrap();
        let all: Vec<usize> = (0..65).collect();
        let err = session.apply_if(&all, 0, GateKind::X, &[0]).unwrap_err();
        assert!(matches!(err, QuantumError::InvalidArgument(_)));
        assert!(session.circuit().is_empty());
        assert_eq!(session.execute(1).unwrap().total(), 1);
    }

    #[test]
    fn test_execute_signed() {
        let mut session = Session::new(1, 1).unwrap();
        session.measure(0, 0).unwrap();
        let err = session.execute_signed(-1).unwrap_err();
        assert_eq!(err.kind(), qshot_sim::ErrorKind::InvalidArgument);
        assert_eq!(session.execute_signed(3).unwrap().total(), 3);
    }

    #[test]
    fn test_histogram_empty_before_execute() {
        let session = Session::new(1, 1).unwrap();
        assert!(session.histogram().is_empty());
        assert!(session.statistics().is_none());
    }

    #[test]
    fn test_config() {
        let session = Session::new(1, 1)
            .unwrap()
            .with_config(ExecutorConfig::deterministic(3).with_statistics(true))
            .unwrap();
        assert_eq!(session.config().seed, Some(3));

        let bad = Session::new(1, 1)
            .unwrap()
            .with_config(ExecutorConfig::new().with_max_shots(0));
        assert!(bad.is_err());
    }

    #[test]
    fn test_scoped_propagates_errors() {
        let result: std::result::Result<(), ExecutionError> = Session::scoped(1, 1, |s| {
            s.h(0)?;
            s.execute_signed(-5)?;
            Ok(())
        });
        assert!(result.is_err());

        let size_error: std::result::Result<(), QuantumError> = Session::scoped(0, 0, |_| Ok(()));
        assert!(size_error.is_err());
    }

    #[test]
    fn test_close_returns_histogram() {
        let mut session = Session::new(1, 1)
            .unwrap()
            .with_config(ExecutorConfig::deterministic(1))
            .unwrap();
        session.x(0).unwrap().measure(0, 0).unwrap();
        session.execute(7).unwrap();
        let hist = session.close();
        assert_eq!(hist.get("1"), 7);
    }
}
