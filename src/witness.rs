//! # Witness parsing and checking
//!
//! Replays a BTOR2 witness against a model frame by frame, using the same
//! step routines as random mode with randomisation turned off. The reader
//! works character by character with one-character pushback so errors can
//! name the exact line and column, which matters for hand-edited
//! witnesses.

use crate::bitvec::BitVector;
use crate::engine::{Simulation, SimulationError, SimulationOptions};
use crate::model::{Model, Nid};
use log::{debug, info, trace};
use std::io::{BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WitnessError {
    #[error("parse error in '{path}' at line {line} column {col}: {msg}")]
    Parse {
        path: String,
        line: u64,
        col: u64,
        msg: String,
    },
    #[error("claimed bad state property 'b{index}' id {id} not reached")]
    UnreachedClaim { index: i64, id: Nid },
    #[error("'unsat' witnesses not supported yet")]
    UnsatWitness,
    #[error("more than one actual witness not supported yet")]
    MultipleWitnesses,
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WitnessError {
    /// Positional errors carry their own "parse error in ..." rendering;
    /// the caller prefixes everything else with a plain error marker.
    pub fn is_positional(&self) -> bool {
        matches!(self, WitnessError::Parse { .. })
    }
}

/// Parse all witnesses in `reader` and check them against `model`.
/// At most one actual witness is supported; interleaved junk lines are
/// skipped the way the original tool skips them.
pub fn check_witnesses<R: BufRead, W: Write>(
    model: &Model,
    reader: R,
    path: &str,
    options: SimulationOptions,
    out: W,
) -> Result<(), WitnessError> {
    let sim = Simulation::new(model, options, out)?;
    let mut checker = WitnessChecker {
        path: path.to_string(),
        chars: Chars::new(reader),
        model,
        sim,
        found_end_of_witness: false,
        found_initial_frame: false,
        count_sat: 0,
        count_unknown: 0,
        count_witnesses: 0,
        claimed_bads: Vec::new(),
    };
    checker.parse_and_check_all()
}

/// Character reader with position tracking and one-character pushback.
struct Chars<R> {
    inner: R,
    line: u64,
    col: u64,
    charno: u64,
    last_line_len: u64,
    saved: Option<Option<u8>>,
}

impl<R: BufRead> Chars<R> {
    fn new(inner: R) -> Self {
        Chars {
            inner,
            line: 1,
            col: 0,
            charno: 0,
            last_line_len: 0,
            saved: None,
        }
    }

    fn next(&mut self) -> std::io::Result<Option<u8>> {
        let ch = match self.saved.take() {
            Some(saved) => saved,
            None => {
                let buf = self.inner.fill_buf()?;
                if buf.is_empty() {
                    None
                } else {
                    let byte = buf[0];
                    self.inner.consume(1);
                    Some(byte)
                }
            }
        };
        match ch {
            Some(b'\n') => {
                self.last_line_len = self.col;
                self.col = 0;
                self.line += 1;
                self.charno += 1;
            }
            Some(_) => {
                self.col += 1;
                self.charno += 1;
            }
            None => {}
        }
        Ok(ch)
    }

    fn unread(&mut self, ch: Option<u8>) {
        debug_assert!(self.saved.is_none());
        match ch {
            Some(b'\n') => {
                self.col = self.last_line_len;
                self.line -= 1;
                self.charno -= 1;
            }
            Some(_) => {
                self.col -= 1;
                self.charno -= 1;
            }
            None => {}
        }
        self.saved = Some(ch);
    }
}

/// One `index constant [symbol]` line, with the positions needed for
/// error reporting.
struct Assignment {
    index: i64,
    constant: String,
    symbol: Option<String>,
    line: u64,
    index_col: u64,
    constant_col: u64,
}

struct WitnessChecker<'a, R: BufRead, W: Write> {
    path: String,
    chars: Chars<R>,
    model: &'a Model,
    sim: Simulation<'a, W>,
    found_end_of_witness: bool,
    found_initial_frame: bool,
    count_sat: u64,
    count_unknown: u64,
    count_witnesses: u64,
    claimed_bads: Vec<i64>,
}

impl<'a, R: BufRead, W: Write> WitnessChecker<'a, R, W> {
    fn err(&self, msg: impl Into<String>) -> WitnessError {
        self.err_at(self.chars.line, self.chars.col, msg)
    }

    fn err_at(&self, line: u64, col: u64, msg: impl Into<String>) -> WitnessError {
        WitnessError::Parse {
            path: self.path.clone(),
            line,
            col,
            msg: msg.into(),
        }
    }

    fn next(&mut self) -> Result<Option<u8>, WitnessError> {
        Ok(self.chars.next()?)
    }

    fn parse_and_check_all(&mut self) -> Result<(), WitnessError> {
        while self.parse_and_check_witness()? {}
        info!(
            "finished parsing {} witnesses after reading {} bytes",
            self.count_witnesses, self.chars.charno
        );
        Ok(())
    }

    fn parse_and_check_witness(&mut self) -> Result<bool, WitnessError> {
        let Some(first) = self.next()? else {
            return Ok(false);
        };
        self.found_end_of_witness = false;
        self.found_initial_frame = false;

        match first {
            b'#' => {
                self.count_witnesses += 1;
                self.count_unknown += 1;
                if self.count_sat + self.count_unknown > 1 {
                    return Err(WitnessError::MultipleWitnesses);
                }
                self.chars.unread(Some(b'#'));
                self.parse_unknown_witness()?;
                return Ok(true);
            }
            b's' => {
                let mut last = self.next()?;
                if last == Some(b'a') {
                    last = self.next()?;
                    if last == Some(b't') {
                        last = self.next()?;
                        if last == Some(b'\n') {
                            self.count_witnesses += 1;
                            self.count_sat += 1;
                            info!(
                                "found witness {} header 'sat' in '{}' at line {}",
                                self.count_sat,
                                self.path,
                                self.chars.line - 1
                            );
                            if self.count_witnesses > 1 {
                                return Err(WitnessError::MultipleWitnesses);
                            }
                            self.parse_sat_witness()?;
                            return Ok(true);
                        }
                    }
                }
                self.skip_line_from(last)?;
                return Ok(true);
            }
            b'u' => {
                let mut last = self.next()?;
                for expected in [b'n', b's', b'a', b't'] {
                    if last != Some(expected) {
                        self.skip_line_from(last)?;
                        return Ok(true);
                    }
                    last = self.next()?;
                }
                if last == Some(b'\n') {
                    return Err(WitnessError::UnsatWitness);
                }
                self.skip_line_from(last)?;
                return Ok(true);
            }
            other => {
                self.skip_line_from(Some(other))?;
            }
        }
        Ok(true)
    }

    fn skip_line_from(&mut self, mut ch: Option<u8>) -> Result<(), WitnessError> {
        loop {
            match ch {
                Some(b'\n') => return Ok(()),
                None => return Err(self.err("unexpected end-of-file before new-line")),
                Some(_) => ch = self.next()?,
            }
        }
    }

    fn parse_sat_witness(&mut self) -> Result<(), WitnessError> {
        info!("parsing 'sat' witness {}", self.count_sat);
        self.claimed_bads.clear();
        loop {
            let ch = self.next()?;
            match ch {
                Some(b' ') => continue,
                Some(b'\n') => break,
                Some(kind @ (b'b' | b'j')) => {
                    let (number, after) = self.parse_unsigned_number()?;
                    match after {
                        Some(b' ') | Some(b'\n') => {}
                        Some(other) if other.is_ascii_graphic() => {
                            return Err(self.err(format!(
                                "unexpected '{}' after number (expected space or new-line)",
                                other as char
                            )))
                        }
                        Some(other) => {
                            return Err(self.err(format!(
                                "unexpected character 0x{other:02x} after number (expected space or new-line)"
                            )))
                        }
                        None => {
                            return Err(
                                self.err("unexpected end-of-file after number".to_string())
                            )
                        }
                    }
                    if kind == b'b' {
                        if number as usize >= self.model.bads.len() {
                            return Err(self.err(format!(
                                "invalid bad state property number {number}"
                            )));
                        }
                        trace!(
                            "... claims to be witness of bad state property number 'b{number}'"
                        );
                        self.claimed_bads.push(number);
                    } else {
                        return Err(self.err("can not handle justice properties yet"));
                    }
                    if after == Some(b'\n') {
                        break;
                    }
                }
                _ => return Err(self.err("expected 'b' or 'j'")),
            }
        }

        let mut k = 0;
        while self.parse_frame(k)? {
            k += 1;
        }
        if !self.found_initial_frame {
            return Err(self.err("initial frame missing"));
        }
        info!("finished parsing k = {k} frames");

        self.sim.report();
        self.sim.finish_trace()?;

        for &claimed in &self.claimed_bads {
            if self.sim.reached_bads()[claimed as usize] < 0 {
                return Err(WitnessError::UnreachedClaim {
                    index: claimed,
                    id: self.model.bads[claimed as usize],
                });
            }
        }
        Ok(())
    }

    fn parse_unknown_witness(&mut self) -> Result<(), WitnessError> {
        info!("parsing unknown witness {}", self.count_unknown);
        let mut k = 0;
        while self.parse_frame(k)? {
            k += 1;
        }
        if !self.found_initial_frame {
            return Err(self.err("initial frame missing"));
        }
        self.sim.report();
        self.sim.finish_trace()?;
        info!("finished parsing k = {k} frames");
        Ok(())
    }

    fn parse_frame(&mut self, k: i64) -> Result<bool, WitnessError> {
        if k > 0 {
            self.sim.transition(k)?;
        }
        debug!("parsing frame {k}");
        self.parse_state_part(k)?;
        self.parse_input_part(k)?;
        if k == 0 {
            self.sim.initialize_states(false)?;
        }
        self.sim.initialize_inputs(k, false)?;
        self.sim.step(k, false)?;
        Ok(!self.found_end_of_witness)
    }

    fn parse_state_part(&mut self, k: i64) -> Result<(), WitnessError> {
        let ch = self.next()?;
        if ch != Some(b'#') {
            if k == 0 {
                return Err(
                    self.err(format!("missing '#{k}' state part header of frame {k}"))
                );
            }
            self.chars.unread(ch);
            return Ok(());
        }
        let (number, after) = self.parse_unsigned_number()?;
        if number != k || after != Some(b'\n') {
            return Err(self.err(format!("missing '#{k}' state part header of frame {k}")));
        }

        while let Some(assignment) = self.parse_assignment()? {
            let model = self.model;
            let position = assignment.index;
            if position as usize >= model.states.len() {
                return Err(self.err_at(
                    assignment.line,
                    assignment.index_col,
                    format!("less than {position} states defined"),
                ));
            }
            match &assignment.symbol {
                Some(symbol) => trace!(
                    "state assignment '{} {} {}' at time frame {}",
                    position,
                    assignment.constant,
                    symbol,
                    k
                ),
                None => trace!(
                    "state assignment '{} {}' at time frame {}",
                    position,
                    assignment.constant,
                    k
                ),
            }
            let state = model.states[position as usize];
            let node = model
                .node(state)
                .ok_or(SimulationError::MissingNode(state))?;
            if assignment.constant.len() as u32 != node.width {
                return Err(self.err_at(
                    assignment.line,
                    assignment.constant_col,
                    format!("expected constant of width '{}'", node.width),
                ));
            }
            let has_next = model.nexts[state as usize].is_some();
            if self.sim.has_current(state) && has_next {
                return Err(self.err_at(
                    assignment.line,
                    assignment.index_col,
                    format!("state {position} id {state} assigned twice in frame {k}"),
                ));
            }
            let value = BitVector::from_binary_str(&assignment.constant)
                .expect("the lexer only collects binary digits");
            if has_next {
                if let Some(init_node) = model.init_of(state) {
                    let expected = self.sim.simulate(init_node.args[1])?;
                    if expected != value {
                        return Err(self.err_at(
                            assignment.line,
                            assignment.index_col,
                            format!("incompatible initialized state {position} id {state}"),
                        ));
                    }
                }
                if k > 0 && self.sim.current_value(state) != Some(&value) {
                    return Err(self.err_at(
                        assignment.line,
                        assignment.index_col,
                        format!(
                            "incompatible assignment for state {position} id {state} in time frame {k}"
                        ),
                    ));
                }
            }
            self.sim.set_current(state, value);
        }
        if k == 0 {
            self.found_initial_frame = true;
        }
        Ok(())
    }

    fn parse_input_part(&mut self, k: i64) -> Result<(), WitnessError> {
        let ch = self.next()?;
        if ch == Some(b'@') {
            let (number, after) = self.parse_unsigned_number()?;
            if number != k || after != Some(b'\n') {
                return Err(
                    self.err(format!("missing '@{k}' input part header of frame {k}"))
                );
            }
        } else {
            self.chars.unread(ch);
        }
        while let Some(assignment) = self.parse_assignment()? {
            let model = self.model;
            let position = assignment.index;
            if position as usize >= model.inputs.len() {
                return Err(self.err_at(
                    assignment.line,
                    assignment.index_col,
                    format!("less than {position} inputs defined"),
                ));
            }
            match &assignment.symbol {
                Some(symbol) => trace!(
                    "input assignment '{} {} {}' at time frame {}",
                    position,
                    assignment.constant,
                    symbol,
                    k
                ),
                None => trace!(
                    "input assignment '{} {}' at time frame {}",
                    position,
                    assignment.constant,
                    k
                ),
            }
            let input = model.inputs[position as usize];
            let node = model
                .node(input)
                .ok_or(SimulationError::MissingNode(input))?;
            if assignment.constant.len() as u32 != node.width {
                return Err(self.err_at(
                    assignment.line,
                    assignment.constant_col,
                    format!("expected constant of width '{}'", node.width),
                ));
            }
            if self.sim.has_current(input) {
                return Err(self.err_at(
                    assignment.line,
                    assignment.index_col,
                    format!("input {position} id {input} assigned twice in frame {k}"),
                ));
            }
            let value = BitVector::from_binary_str(&assignment.constant)
                .expect("the lexer only collects binary digits");
            self.sim.set_current(input, value);
        }
        Ok(())
    }

    /// One assignment line, or `None` at a section boundary (`@`, `#`) or
    /// the terminating `.`.
    fn parse_assignment(&mut self) -> Result<Option<Assignment>, WitnessError> {
        let ch = self.next()?;
        match ch {
            None => Err(self.err("unexpected end-of-file (without '.')")),
            Some(b'.') => {
                let mut ch = self.next()?;
                while ch == Some(b' ') {
                    ch = self.next()?;
                }
                match ch {
                    None => Err(self.err("end-of-file after '.' instead of new-line")),
                    Some(b'\n') => {
                        trace!("read terminating '.'");
                        self.found_end_of_witness = true;
                        Ok(None)
                    }
                    Some(other) if other.is_ascii_graphic() => Err(self.err(format!(
                        "unexpected character '{}' after '.'",
                        other as char
                    ))),
                    Some(other) => Err(self.err(format!(
                        "unexpected character code 0x{other:02x} after '.'"
                    ))),
                }
            }
            Some(b'@') | Some(b'#') => {
                self.chars.unread(ch);
                Ok(None)
            }
            Some(_) => {
                self.chars.unread(ch);
                let line = self.chars.line;
                let index_col = self.chars.col + 1;
                let (index, after) = self.parse_unsigned_number()?;
                if after != Some(b' ') {
                    return Err(self.err(format!("space missing after '{index}'")));
                }
                let constant_col = self.chars.col + 1;
                let mut constant = String::new();
                let mut ch = self.next()?;
                while let Some(bit @ (b'0' | b'1')) = ch {
                    constant.push(bit as char);
                    ch = self.next()?;
                }
                if ch == Some(b'[') {
                    return Err(self.err("can not handle array assignments yet"));
                }
                if constant.is_empty() {
                    return Err(self.err("empty constant"));
                }
                let mut symbol = String::new();
                while ch != Some(b'\n') {
                    ch = self.next()?;
                    match ch {
                        None => return Err(self.err("unexpected end-of-file in assignment")),
                        Some(b'\n') => {}
                        Some(other) => symbol.push(other as char),
                    }
                }
                Ok(Some(Assignment {
                    index,
                    constant,
                    symbol: if symbol.is_empty() { None } else { Some(symbol) },
                    line,
                    index_col,
                    constant_col,
                }))
            }
        }
    }

    /// Strict unsigned number: no leading zeros, overflow capped. Returns
    /// the value and the first character after it (already consumed).
    fn parse_unsigned_number(&mut self) -> Result<(i64, Option<u8>), WitnessError> {
        let mut ch = self.next()?;
        let mut res: i64 = 0;
        match ch {
            Some(b'0') => {
                ch = self.next()?;
                if let Some(digit) = ch.filter(|c| c.is_ascii_digit()) {
                    return Err(self.err(format!(
                        "unexpected digit '{}' after '0'",
                        digit as char
                    )));
                }
            }
            Some(first) if first.is_ascii_digit() => {
                res = (first - b'0') as i64;
                loop {
                    ch = self.next()?;
                    match ch {
                        Some(digit) if digit.is_ascii_digit() => {
                            if i64::MAX / 10 < res {
                                return Err(
                                    self.err("number too large (too many digits)")
                                );
                            }
                            res *= 10;
                            let value = (digit - b'0') as i64;
                            if i64::MAX - value < res {
                                return Err(self.err("number too large"));
                            }
                            res += value;
                        }
                        _ => break,
                    }
                }
            }
            _ => return Err(self.err("expected digit")),
        }
        Ok((res, ch))
    }
}
