//! # Simulation engine
//!
//! The evaluator and the driver share one struct. Node values live in a
//! dense `current` table indexed by node id and are computed lazily: asking
//! for a value walks the operator DAG depth-first, memoising every node it
//! touches. A cycle boundary (`transition`) clears the whole table and
//! promotes the `next` snapshot, so all values observed within a cycle
//! refer to one consistent state.
//!
//! Random mode fills inputs and stateless latches from the deterministic
//! [`Rng`]; checking mode (the witness checker drives the same routines)
//! fills them with zeros unless the witness supplied a value.

use crate::bitvec::{BitVector, LiteralError};
use crate::model::{resolve, Model, Nid, Tag};
use crate::rng::Rng;
use itertools::Itertools;
use log::{debug, info};
use std::io::Write;
use thiserror::Error;

pub mod defaults {
    pub const BOUND: i64 = 20;
    pub const SEED: u32 = 0;
}

#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Number of transitions to generate in random mode.
    pub bound: i64,
    /// Seed for the multiply-with-carry generator.
    pub seed: u32,
    /// Emit the trace on the output sink.
    pub print_trace: bool,
    /// Print state assignments at every cycle, not just at `#0`.
    pub print_states: bool,
    /// Pre-declare a bad property index in the trace header.
    pub fake_bad: Option<i64>,
}

impl Default for SimulationOptions {
    fn default() -> SimulationOptions {
        SimulationOptions {
            bound: defaults::BOUND,
            seed: defaults::SEED,
            print_trace: true,
            print_states: false,
            fake_bad: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("state {0} has an init but no next function")]
    InitWithoutNext(Nid),
    #[error("invalid faked bad state property number {0}")]
    InvalidFakeBad(i64),
    #[error("cannot simulate operator '{tag}' at line {lineno}")]
    UnsupportedOperator { tag: &'static str, lineno: u64 },
    #[error("internal error: unexpected empty ID {0}")]
    MissingNode(Nid),
    #[error("invalid constant at line {lineno}: {reason}")]
    BadConstant { lineno: u64, reason: LiteralError },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
pub struct Simulation<'a, W: Write> {
    model: &'a Model,
    options: SimulationOptions,
    rng: Rng,
    current: Vec<Option<BitVector>>,
    next: Vec<Option<BitVector>>,
    /// Cycle at which each bad property was first reached, -1 if never.
    reached_bads: Vec<i64>,
    num_unreached_bads: usize,
    /// Cycle of the first constraint violation, -1 if none.
    constraints_violated: i64,
    out: W,
}

impl<'a, W: Write> Simulation<'a, W> {
    pub fn new(
        model: &'a Model,
        options: SimulationOptions,
        out: W,
    ) -> Result<Self, SimulationError> {
        for &state in &model.states {
            let has_init = model.inits[state as usize].is_some();
            let has_next = model.nexts[state as usize].is_some();
            if has_init && !has_next {
                return Err(SimulationError::InitWithoutNext(state));
            }
            if !has_next {
                info!("state {state} without next function");
            }
        }
        if let Some(fake) = options.fake_bad {
            if fake as usize >= model.bads.len() {
                return Err(SimulationError::InvalidFakeBad(fake));
            }
        }
        let len = model.len();
        Ok(Simulation {
            model,
            rng: Rng::new(options.seed),
            current: vec![None; len],
            next: vec![None; len],
            reached_bads: vec![-1; model.bads.len()],
            num_unreached_bads: model.bads.len(),
            constraints_violated: -1,
            options,
            out,
        })
    }

    /// Run the random simulation loop: initialise, then step until the
    /// bound is reached, every bad property has been seen, or a constraint
    /// broke.
    pub fn run_random(&mut self) -> Result<(), SimulationError> {
        let bound = self.options.bound;
        info!("starting random simulation up to bound {bound}");
        if self.options.print_trace {
            if let Some(fake) = self.options.fake_bad {
                writeln!(self.out, "sat")?;
                writeln!(self.out, "b{fake}")?;
            }
        }
        self.initialize_states(true)?;
        self.initialize_inputs(0, true)?;
        self.step(0, true)?;
        for k in 1..=bound {
            if self.constraints_violated >= 0 {
                break;
            }
            if self.num_unreached_bads == 0 {
                break;
            }
            self.transition(k)?;
            self.initialize_inputs(k, true)?;
            self.step(k, true)?;
        }
        if self.options.print_trace {
            writeln!(self.out, ".")?;
            self.out.flush()?;
        }
        self.report();
        Ok(())
    }

    /// The value of node `signed_id` in the current cycle. A negative id
    /// yields the bitwise complement of the referenced node's value.
    pub(crate) fn simulate(&mut self, signed_id: Nid) -> Result<BitVector, SimulationError> {
        let (id, negate) = resolve(signed_id);
        let model = self.model;
        let res = match &self.current[id as usize] {
            Some(value) => value.clone(),
            None => {
                let node = model.node(id).ok_or(SimulationError::MissingNode(id))?;
                let mut args = Vec::with_capacity(node.args.len());
                for &arg in &node.args {
                    args.push(self.simulate(arg)?);
                }
                let bad_constant = |reason| SimulationError::BadConstant {
                    lineno: node.lineno,
                    reason,
                };
                let value = match node.tag {
                    Tag::Add => args[0].add(&args[1]),
                    Tag::And => args[0].and(&args[1]),
                    Tag::Concat => args[0].concat(&args[1]),
                    Tag::Const => BitVector::from_binary_str(
                        node.constant.as_deref().unwrap_or_default(),
                    )
                    .map_err(bad_constant)?,
                    Tag::Constd => BitVector::from_decimal_str(
                        node.constant.as_deref().unwrap_or_default(),
                        node.width,
                    )
                    .map_err(bad_constant)?,
                    Tag::Consth => BitVector::from_hex_str(
                        node.constant.as_deref().unwrap_or_default(),
                        node.width,
                    )
                    .map_err(bad_constant)?,
                    Tag::Dec => args[0].dec(),
                    Tag::Eq => args[0].eq(&args[1]),
                    Tag::Iff | Tag::Xnor => args[0].xnor(&args[1]),
                    Tag::Implies => args[0].implies(&args[1]),
                    Tag::Inc => args[0].inc(),
                    Tag::Ite => BitVector::ite(&args[0], &args[1], &args[2]),
                    Tag::Mul => args[0].mul(&args[1]),
                    Tag::Nand => args[0].nand(&args[1]),
                    Tag::Neg => args[0].neg(),
                    Tag::Neq => args[0].neq(&args[1]),
                    Tag::Nor => args[0].nor(&args[1]),
                    Tag::Not => args[0].not(),
                    Tag::One => BitVector::one(node.width),
                    Tag::Ones => BitVector::ones(node.width),
                    Tag::Or => args[0].or(&args[1]),
                    Tag::Redand => args[0].redand(),
                    Tag::Redor => args[0].redor(),
                    Tag::Sdiv => args[0].sdiv(&args[1]),
                    Tag::Sext => args[0].sext(node.imms[0]),
                    Tag::Sgt => args[0].sgt(&args[1]),
                    Tag::Sgte => args[0].sgte(&args[1]),
                    Tag::Slice => args[0].slice(node.imms[0], node.imms[1]),
                    Tag::Sll => args[0].sll(&args[1]),
                    Tag::Slt => args[0].slt(&args[1]),
                    Tag::Slte => args[0].slte(&args[1]),
                    Tag::Sra => args[0].sra(&args[1]),
                    Tag::Srem => args[0].srem(&args[1]),
                    Tag::Srl => args[0].srl(&args[1]),
                    Tag::Sub => args[0].sub(&args[1]),
                    Tag::Udiv => args[0].udiv(&args[1]),
                    Tag::Uext => args[0].uext(node.imms[0]),
                    Tag::Ugt => args[0].ugt(&args[1]),
                    Tag::Ugte => args[0].ugte(&args[1]),
                    Tag::Ult => args[0].ult(&args[1]),
                    Tag::Ulte => args[0].ulte(&args[1]),
                    Tag::Urem => args[0].urem(&args[1]),
                    Tag::Xor => args[0].xor(&args[1]),
                    Tag::Zero => BitVector::zero(node.width),
                    _ => {
                        return Err(SimulationError::UnsupportedOperator {
                            tag: node.tag.into(),
                            lineno: node.lineno,
                        })
                    }
                };
                self.current[id as usize] = Some(value.clone());
                value
            }
        };
        Ok(if negate { res.not() } else { res })
    }

    /// Fill every state that has no value yet: init expression when there
    /// is one, otherwise random or zero. Emits the `#0` trace section.
    pub(crate) fn initialize_states(&mut self, randomize: bool) -> Result<(), SimulationError> {
        let model = self.model;
        info!("initializing states at #0");
        if self.options.print_trace {
            writeln!(self.out, "#0")?;
        }
        for (index, &state) in model.states.iter().enumerate() {
            if self.current[state as usize].is_some() {
                continue;
            }
            let width = model.node(state).ok_or(SimulationError::MissingNode(state))?.width;
            let init = model.init_of(state);
            let update = match init {
                Some(init_node) => {
                    let value_ref = init_node.args[1];
                    self.simulate(value_ref)?
                }
                None if randomize => BitVector::random(&mut self.rng, width),
                None => BitVector::zero(width),
            };
            if self.options.print_trace && init.is_none() {
                let symbol = model.node(state).and_then(|n| n.symbol.clone());
                self.print_row(index, &update, symbol.as_deref(), '#', 0)?;
            }
            self.current[state as usize] = Some(update);
        }
        Ok(())
    }

    /// Fill every input that has no value yet. Emits the `@k` trace
    /// section.
    pub(crate) fn initialize_inputs(
        &mut self,
        k: i64,
        randomize: bool,
    ) -> Result<(), SimulationError> {
        let model = self.model;
        info!("initializing inputs @{k}");
        if self.options.print_trace {
            writeln!(self.out, "@{k}")?;
        }
        for (index, &input) in model.inputs.iter().enumerate() {
            if self.current[input as usize].is_some() {
                continue;
            }
            let node = model.node(input).ok_or(SimulationError::MissingNode(input))?;
            let update = if randomize {
                BitVector::random(&mut self.rng, node.width)
            } else {
                BitVector::zero(node.width)
            };
            if self.options.print_trace {
                let symbol = node.symbol.clone();
                self.print_row(index, &update, symbol.as_deref(), '@', k)?;
            }
            self.current[input as usize] = Some(update);
        }
        Ok(())
    }

    /// Evaluate every operator node of the cycle, compute each state's next
    /// value, then check constraints and bad properties.
    pub(crate) fn step(&mut self, k: i64, randomize: bool) -> Result<(), SimulationError> {
        let model = self.model;
        info!("simulating step {k}");
        for id in 1..model.len() as Nid {
            let Some(node) = model.node(id) else { continue };
            if matches!(
                node.tag,
                Tag::Sort | Tag::Init | Tag::Next | Tag::Bad | Tag::Constraint | Tag::Output
            ) {
                continue;
            }
            self.simulate(id)?;
        }
        for &state in &model.states {
            let update = match model.next_of(state) {
                Some(next_node) => {
                    let value_ref = next_node.args[1];
                    self.simulate(value_ref)?
                }
                None => {
                    let width =
                        model.node(state).ok_or(SimulationError::MissingNode(state))?.width;
                    if randomize {
                        BitVector::random(&mut self.rng, width)
                    } else {
                        BitVector::zero(width)
                    }
                }
            };
            debug_assert!(self.next[state as usize].is_none());
            self.next[state as usize] = Some(update);
        }
        if self.constraints_violated < 0 {
            for (index, &constraint) in model.constraints.iter().enumerate() {
                let node = model
                    .node(constraint)
                    .ok_or(SimulationError::MissingNode(constraint))?;
                let condition = node.args[0];
                if !self.simulate(condition)?.is_zero() {
                    continue;
                }
                info!(
                    "constraint({index}) '{constraint} constraint {condition}' violated at time {k}"
                );
                self.constraints_violated = k;
            }
        }
        if self.constraints_violated < 0 {
            for (index, &bad) in model.bads.iter().enumerate() {
                if self.reached_bads[index] >= 0 {
                    continue;
                }
                let node = model.node(bad).ok_or(SimulationError::MissingNode(bad))?;
                if self.simulate(node.args[0])?.is_zero() {
                    continue;
                }
                debug!("bad {index} reached at time {k}");
                self.reached_bads[index] = k;
                self.num_unreached_bads -= 1;
                if self.num_unreached_bads == 0 {
                    info!("all {} bad state properties reached", model.bads.len());
                }
            }
        }
        Ok(())
    }

    /// Cycle boundary: release every cached value and promote the next
    /// state snapshot.
    pub(crate) fn transition(&mut self, k: i64) -> Result<(), SimulationError> {
        let model = self.model;
        info!("transition {k}");
        for slot in self.current.iter_mut() {
            *slot = None;
        }
        let print = self.options.print_trace && self.options.print_states;
        if print {
            writeln!(self.out, "#{k}")?;
        }
        for (index, &state) in model.states.iter().enumerate() {
            let update = self.next[state as usize]
                .take()
                .expect("every state gets a next value during step");
            if print {
                let symbol = model.node(state).and_then(|n| n.symbol.clone());
                self.print_row(index, &update, symbol.as_deref(), '#', k)?;
            }
            self.current[state as usize] = Some(update);
        }
        Ok(())
    }

    /// Log which bad properties were reached and whether the constraints
    /// held.
    pub(crate) fn report(&self) {
        if self.reached_bads.iter().any(|&r| r >= 0) {
            let list = self
                .reached_bads
                .iter()
                .enumerate()
                .filter(|(_, &reached)| reached >= 0)
                .map(|(index, reached)| format!("b{index}@{reached}"))
                .join(" ");
            info!("reached bad state properties {{ {list} }}");
        } else if !self.model.bads.is_empty() {
            info!("no bad state property reached");
        }
        if self.constraints_violated >= 0 {
            info!("constraints violated at time {}", self.constraints_violated);
        } else if !self.model.constraints.is_empty() {
            info!("constraints always satisfied");
        }
    }

    /// First cycle each bad property was reached, -1 for never.
    pub fn reached_bads(&self) -> &[i64] {
        &self.reached_bads
    }

    pub fn constraints_violated(&self) -> Option<i64> {
        if self.constraints_violated >= 0 {
            Some(self.constraints_violated)
        } else {
            None
        }
    }

    pub(crate) fn has_current(&self, id: Nid) -> bool {
        self.current[id as usize].is_some()
    }

    pub(crate) fn current_value(&self, id: Nid) -> Option<&BitVector> {
        self.current[id as usize].as_ref()
    }

    pub(crate) fn set_current(&mut self, id: Nid, value: BitVector) {
        self.current[id as usize] = Some(value);
    }

    pub(crate) fn finish_trace(&mut self) -> Result<(), SimulationError> {
        if self.options.print_trace {
            writeln!(self.out, ".")?;
            self.out.flush()?;
        }
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn print_row(
        &mut self,
        index: usize,
        value: &BitVector,
        symbol: Option<&str>,
        part: char,
        k: i64,
    ) -> Result<(), SimulationError> {
        match symbol {
            Some(symbol) => writeln!(self.out, "{index} {value} {symbol}{part}{k}")?,
            None => writeln!(self.out, "{index} {value}")?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_model;
    use std::io::Cursor;

    const COUNTER: &str = "1 sort bitvec 8
        2 zero 1
        3 state 1 s
        4 init 1 3 2
        5 one 1
        6 add 1 3 5
        7 next 1 3 6
        8 ones 1
        9 sort bitvec 1
        10 eq 9 3 8
        11 bad 10
        ";

    fn model(text: &str) -> Model {
        parse_model(Cursor::new(text), "<test>").unwrap()
    }

    fn run(text: &str, options: SimulationOptions) -> (Vec<i64>, Option<i64>, Vec<u8>) {
        let model = model(text);
        let mut sim = Simulation::new(&model, options, Vec::new()).unwrap();
        sim.run_random().unwrap();
        let reached = sim.reached_bads().to_vec();
        let violated = sim.constraints_violated();
        (reached, violated, sim.into_output())
    }

    #[test]
    fn counter_reaches_its_bad_state() {
        let options = SimulationOptions {
            bound: 300,
            print_trace: false,
            ..Default::default()
        };
        let (reached, violated, _) = run(COUNTER, options);
        assert_eq!(reached, vec![255]);
        assert_eq!(violated, None);
    }

    #[test]
    fn counter_stops_short_of_the_bound() {
        let options = SimulationOptions {
            bound: 100,
            print_trace: false,
            ..Default::default()
        };
        let (reached, _, _) = run(COUNTER, options);
        assert_eq!(reached, vec![-1]);
    }

    #[test]
    fn input_bad_reached_when_rng_yields_one() {
        // for seed 0 the 1-bit random sequence starts 0, 0, 1
        let text = "1 sort bitvec 1
            2 input 1
            3 bad 2
            ";
        let options = SimulationOptions {
            bound: 5,
            print_trace: false,
            ..Default::default()
        };
        let (reached, _, _) = run(text, options);
        assert_eq!(reached, vec![2]);
    }

    #[test]
    fn violated_constraint_masks_bad_properties() {
        // seed 88 drives the input to 1 in cycle 0
        let text = "1 sort bitvec 1
            2 input 1
            3 constraint -2
            4 one 1
            5 bad 4
            ";
        let options = SimulationOptions {
            bound: 1,
            seed: 88,
            print_trace: false,
            ..Default::default()
        };
        let (reached, violated, _) = run(text, options);
        assert_eq!(violated, Some(0));
        assert_eq!(reached, vec![-1]);
    }

    #[test]
    fn trace_is_deterministic() {
        let options = SimulationOptions {
            bound: 20,
            seed: 3,
            ..Default::default()
        };
        let (_, _, first) = run(
            "1 sort bitvec 4
            2 input 1 data
            3 state 1
            4 next 1 3 2
            5 sort bitvec 1
            6 redand 5 3
            7 bad 6
            ",
            options.clone(),
        );
        let (_, _, second) = run(
            "1 sort bitvec 4
            2 input 1 data
            3 state 1
            4 next 1 3 2
            5 sort bitvec 1
            6 redand 5 3
            7 bad 6
            ",
            options,
        );
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn trace_format_for_the_counter() {
        let options = SimulationOptions {
            bound: 1,
            fake_bad: Some(0),
            ..Default::default()
        };
        let (_, _, out) = run(COUNTER, options);
        let text = String::from_utf8(out).unwrap();
        // initialised state is not listed in #0, input sections are empty
        assert_eq!(text, "sat\nb0\n#0\n@0\n@1\n.\n");
    }

    #[test]
    fn states_are_printed_every_cycle_when_asked() {
        let options = SimulationOptions {
            bound: 2,
            print_states: true,
            ..Default::default()
        };
        let (_, _, out) = run(COUNTER, options);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("#1\n0 00000001 s#1\n"));
        assert!(text.contains("#2\n0 00000010 s#2\n"));
    }

    #[test]
    fn transition_clears_combinational_values() {
        let model = model(COUNTER);
        let mut sim =
            Simulation::new(&model, SimulationOptions::default(), std::io::sink()).unwrap();
        sim.initialize_states(true).unwrap();
        sim.initialize_inputs(0, true).unwrap();
        sim.step(0, true).unwrap();
        assert!(sim.has_current(6));
        sim.transition(1).unwrap();
        assert!(!sim.has_current(6));
        assert!(sim.has_current(3));
        // re-simulation inside one cycle is stable
        let first = sim.simulate(6).unwrap();
        assert_eq!(first, sim.simulate(6).unwrap());
        assert_eq!(first, BitVector::from_u64(2, 8));
    }

    #[test]
    fn negated_references_complement_the_value() {
        let model = model(COUNTER);
        let mut sim =
            Simulation::new(&model, SimulationOptions::default(), std::io::sink()).unwrap();
        sim.initialize_states(false).unwrap();
        let plain = sim.simulate(3).unwrap();
        let negated = sim.simulate(-3).unwrap();
        assert_eq!(negated, plain.not());
    }

    #[test]
    fn init_without_next_is_rejected() {
        let text = "1 sort bitvec 4
            2 zero 1
            3 state 1
            4 init 1 3 2
            ";
        let model = model(text);
        let err = Simulation::new(&model, SimulationOptions::default(), std::io::sink())
            .unwrap_err();
        assert!(matches!(err, SimulationError::InitWithoutNext(3)));
    }

    #[test]
    fn fake_bad_index_is_validated() {
        let model = model(COUNTER);
        let options = SimulationOptions {
            fake_bad: Some(1),
            ..Default::default()
        };
        let err = Simulation::new(&model, options, std::io::sink()).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidFakeBad(1)));
    }
}
