//! # BTOR2 model parser
//!
//! Line-oriented parser producing a [`Model`]. Every operator line is
//! type-checked against its arguments as it is read, so the evaluator can
//! rely on the width rules without re-checking them. Errors carry the file
//! path and line number of the offending line.

use crate::bitvec::BitVector;
use crate::model::{Model, Nid, Node, Sort, Tag};
use log::debug;
use std::collections::HashMap;
use std::io::BufRead;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error in '{path}' at line {lineno}: {msg}")]
pub struct ParseError {
    pub path: String,
    pub lineno: u64,
    pub msg: String,
}

/// Strict unsigned number: digits only, no surplus leading zeros, capped at
/// `i64::MAX`.
fn parse_num(token: &str) -> Option<i64> {
    if token.is_empty() || (token.len() > 1 && token.starts_with('0')) {
        return None;
    }
    let mut res: i64 = 0;
    for ch in token.bytes() {
        if !ch.is_ascii_digit() {
            return None;
        }
        res = res.checked_mul(10)?.checked_add((ch - b'0') as i64)?;
    }
    Some(res)
}

pub fn parse_model<R: BufRead>(reader: R, path: &str) -> Result<Model, ParseError> {
    let mut parser = ModelParser::new(path);
    for (number, line) in reader.lines().enumerate() {
        let lineno = number as u64 + 1;
        let line = line.map_err(|e| parser.error(lineno, format!("read failed: {e}")))?;
        parser.parse_line(lineno, &line)?;
    }
    Ok(parser.finish())
}

struct ModelParser {
    path: String,
    sorts: HashMap<Nid, Sort>,
    nodes: HashMap<Nid, Node>,
    inputs: Vec<Nid>,
    states: Vec<Nid>,
    bads: Vec<Nid>,
    constraints: Vec<Nid>,
    inits: HashMap<Nid, Nid>,
    nexts: HashMap<Nid, Nid>,
    max_id: Nid,
}

impl ModelParser {
    fn new(path: &str) -> Self {
        ModelParser {
            path: path.to_string(),
            sorts: HashMap::new(),
            nodes: HashMap::new(),
            inputs: Vec::new(),
            states: Vec::new(),
            bads: Vec::new(),
            constraints: Vec::new(),
            inits: HashMap::new(),
            nexts: HashMap::new(),
            max_id: 0,
        }
    }

    fn error(&self, lineno: u64, msg: impl Into<String>) -> ParseError {
        ParseError {
            path: self.path.clone(),
            lineno,
            msg: msg.into(),
        }
    }

    fn parse_line(&mut self, lineno: u64, line: &str) -> Result<(), ParseError> {
        let text = line.split(';').next().unwrap_or_default();
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(());
        }
        let id = parse_num(tokens[0])
            .filter(|&v| v > 0)
            .ok_or_else(|| self.error(lineno, format!("invalid line id '{}'", tokens[0])))?;
        if self.sorts.contains_key(&id) || self.nodes.contains_key(&id) {
            return Err(self.error(lineno, format!("id {id} already defined")));
        }
        let tag_token = *tokens
            .get(1)
            .ok_or_else(|| self.error(lineno, "missing tag".to_string()))?;
        let tag = Tag::from_str(tag_token)
            .map_err(|_| self.error(lineno, format!("invalid tag '{tag_token}'")))?;

        match tag {
            Tag::Sort => return self.parse_sort(lineno, id, &tokens),
            // properties and outputs reference a node directly, with no sort
            Tag::Bad | Tag::Constraint | Tag::Output => {
                return self.parse_property(lineno, id, tag, &tokens)
            }
            Tag::Fair | Tag::Justice => {
                return Err(self.error(lineno, unsupported(id, tag, &tokens)))
            }
            Tag::Read
            | Tag::Write
            | Tag::Redxor
            | Tag::Rol
            | Tag::Ror
            | Tag::Smod
            | Tag::Saddo
            | Tag::Sdivo
            | Tag::Smulo
            | Tag::Ssubo
            | Tag::Uaddo
            | Tag::Umulo
            | Tag::Usubo => return Err(self.error(lineno, unsupported(id, tag, &tokens))),
            _ => {}
        }

        let width = self.sort_width(lineno, self.token(lineno, &tokens, 2, "sort id")?)?;
        let mut node = Node {
            id,
            tag,
            width,
            args: Vec::new(),
            imms: Vec::new(),
            constant: None,
            symbol: None,
            lineno,
        };

        match tag {
            Tag::Input => {
                node.symbol = self.optional_symbol(lineno, &tokens, 3)?;
                debug!("input {} at line {}", self.inputs.len(), lineno);
                self.inputs.push(id);
            }
            Tag::State => {
                node.symbol = self.optional_symbol(lineno, &tokens, 3)?;
                debug!("state {} at line {}", self.states.len(), lineno);
                self.states.push(id);
            }
            Tag::Init | Tag::Next => {
                let state_token = self.token(lineno, &tokens, 3, "state id")?;
                let state = parse_num(state_token)
                    .filter(|&v| v > 0)
                    .ok_or_else(|| {
                        self.error(lineno, format!("invalid state id '{state_token}'"))
                    })?;
                match self.nodes.get(&state) {
                    Some(n) if n.tag == Tag::State => {
                        if n.width != width {
                            return Err(self.error(
                                lineno,
                                format!("sort of '{tag}' does not match sort of state {state}"),
                            ));
                        }
                    }
                    _ => {
                        return Err(
                            self.error(lineno, format!("id {state} is not a state"))
                        )
                    }
                }
                let (value, value_width) =
                    self.value_ref(lineno, self.token(lineno, &tokens, 4, "value id")?)?;
                if value_width != width {
                    return Err(self.error(
                        lineno,
                        format!("sort of '{tag}' value does not match sort of state {state}"),
                    ));
                }
                self.expect_end(lineno, &tokens, 5)?;
                let previous = if tag == Tag::Init {
                    self.inits.insert(state, id)
                } else {
                    self.nexts.insert(state, id)
                };
                if previous.is_some() {
                    return Err(
                        self.error(lineno, format!("second '{tag}' for state {state}"))
                    );
                }
                node.args = vec![state, value];
            }
            Tag::One | Tag::Ones | Tag::Zero => {
                self.expect_end(lineno, &tokens, 3)?;
            }
            Tag::Const | Tag::Constd | Tag::Consth => {
                let literal = self.token(lineno, &tokens, 3, "constant")?;
                let parsed = match tag {
                    Tag::Const => BitVector::from_binary_str(literal).and_then(|bv| {
                        if bv.width() == width {
                            Ok(bv)
                        } else {
                            Err(crate::bitvec::LiteralError::DoesNotFit(width))
                        }
                    }),
                    Tag::Constd => BitVector::from_decimal_str(literal, width),
                    _ => BitVector::from_hex_str(literal, width),
                };
                if let Err(reason) = parsed {
                    return Err(self.error(
                        lineno,
                        format!("invalid '{tag}' constant '{literal}': {reason}"),
                    ));
                }
                self.expect_end(lineno, &tokens, 4)?;
                node.constant = Some(literal.to_string());
            }
            Tag::Not | Tag::Inc | Tag::Dec | Tag::Neg => {
                let (arg, arg_width) =
                    self.value_ref(lineno, self.token(lineno, &tokens, 3, "argument")?)?;
                if arg_width != width {
                    return Err(self.error(
                        lineno,
                        format!("result width of '{tag}' must match its argument"),
                    ));
                }
                self.expect_end(lineno, &tokens, 4)?;
                node.args = vec![arg];
            }
            Tag::Redand | Tag::Redor => {
                let (arg, _) =
                    self.value_ref(lineno, self.token(lineno, &tokens, 3, "argument")?)?;
                if width != 1 {
                    return Err(
                        self.error(lineno, format!("'{tag}' result must have width 1"))
                    );
                }
                self.expect_end(lineno, &tokens, 4)?;
                node.args = vec![arg];
            }
            Tag::And
            | Tag::Or
            | Tag::Xor
            | Tag::Nand
            | Tag::Nor
            | Tag::Xnor
            | Tag::Add
            | Tag::Sub
            | Tag::Mul
            | Tag::Udiv
            | Tag::Urem
            | Tag::Sdiv
            | Tag::Srem
            | Tag::Sll
            | Tag::Srl
            | Tag::Sra => {
                let (a, aw, b, bw) = self.two_value_refs(lineno, &tokens)?;
                if aw != bw {
                    return Err(self.error(
                        lineno,
                        format!("arguments of '{tag}' must have the same width"),
                    ));
                }
                if aw != width {
                    return Err(self.error(
                        lineno,
                        format!("result width of '{tag}' must match its arguments"),
                    ));
                }
                node.args = vec![a, b];
            }
            Tag::Implies | Tag::Iff => {
                let (a, aw, b, bw) = self.two_value_refs(lineno, &tokens)?;
                if aw != 1 || bw != 1 || width != 1 {
                    return Err(
                        self.error(lineno, format!("'{tag}' is only defined on width 1"))
                    );
                }
                node.args = vec![a, b];
            }
            Tag::Eq
            | Tag::Neq
            | Tag::Ult
            | Tag::Ulte
            | Tag::Ugt
            | Tag::Ugte
            | Tag::Slt
            | Tag::Slte
            | Tag::Sgt
            | Tag::Sgte => {
                let (a, aw, b, bw) = self.two_value_refs(lineno, &tokens)?;
                if aw != bw {
                    return Err(self.error(
                        lineno,
                        format!("arguments of '{tag}' must have the same width"),
                    ));
                }
                if width != 1 {
                    return Err(
                        self.error(lineno, format!("'{tag}' result must have width 1"))
                    );
                }
                node.args = vec![a, b];
            }
            Tag::Concat => {
                let (a, aw, b, bw) = self.two_value_refs(lineno, &tokens)?;
                if aw + bw != width {
                    return Err(self.error(
                        lineno,
                        format!(
                            "result width of 'concat' should be {} bits",
                            aw + bw
                        ),
                    ));
                }
                node.args = vec![a, b];
            }
            Tag::Ite => {
                let (cond, cond_width) =
                    self.value_ref(lineno, self.token(lineno, &tokens, 3, "condition")?)?;
                if cond_width != 1 {
                    return Err(
                        self.error(lineno, "'ite' condition must have width 1".to_string())
                    );
                }
                let (then, then_width) =
                    self.value_ref(lineno, self.token(lineno, &tokens, 4, "argument")?)?;
                let (other, other_width) =
                    self.value_ref(lineno, self.token(lineno, &tokens, 5, "argument")?)?;
                if then_width != width || other_width != width {
                    return Err(self.error(
                        lineno,
                        "result width of 'ite' must match its branches".to_string(),
                    ));
                }
                self.expect_end(lineno, &tokens, 6)?;
                node.args = vec![cond, then, other];
            }
            Tag::Slice => {
                let (arg, arg_width) =
                    self.value_ref(lineno, self.token(lineno, &tokens, 3, "argument")?)?;
                let hi = self.immediate(lineno, &tokens, 4, "upper slice index")?;
                let lo = self.immediate(lineno, &tokens, 5, "lower slice index")?;
                if hi >= arg_width {
                    return Err(self.error(
                        lineno,
                        format!("upper slice index {hi} exceeds argument width {arg_width}"),
                    ));
                }
                if lo > hi {
                    return Err(self.error(
                        lineno,
                        format!("lower slice index {lo} above upper index {hi}"),
                    ));
                }
                if width != hi - lo + 1 {
                    return Err(self.error(
                        lineno,
                        format!("result width of 'slice' should be {} bits", hi - lo + 1),
                    ));
                }
                self.expect_end(lineno, &tokens, 6)?;
                node.args = vec![arg];
                node.imms = vec![hi, lo];
            }
            Tag::Uext | Tag::Sext => {
                let (arg, arg_width) =
                    self.value_ref(lineno, self.token(lineno, &tokens, 3, "argument")?)?;
                let added = self.immediate(lineno, &tokens, 4, "extension width")?;
                if arg_width + added != width {
                    return Err(self.error(
                        lineno,
                        format!(
                            "result width of '{tag}' should be {} bits",
                            arg_width + added
                        ),
                    ));
                }
                self.expect_end(lineno, &tokens, 5)?;
                node.args = vec![arg];
                node.imms = vec![added];
            }
            // handled above
            Tag::Sort
            | Tag::Bad
            | Tag::Constraint
            | Tag::Output
            | Tag::Fair
            | Tag::Justice
            | Tag::Read
            | Tag::Write
            | Tag::Redxor
            | Tag::Rol
            | Tag::Ror
            | Tag::Smod
            | Tag::Saddo
            | Tag::Sdivo
            | Tag::Smulo
            | Tag::Ssubo
            | Tag::Uaddo
            | Tag::Umulo
            | Tag::Usubo => unreachable!(),
        }

        self.max_id = self.max_id.max(id);
        self.nodes.insert(id, node);
        Ok(())
    }

    fn parse_property(
        &mut self,
        lineno: u64,
        id: Nid,
        tag: Tag,
        tokens: &[&str],
    ) -> Result<(), ParseError> {
        let (arg, arg_width) =
            self.value_ref(lineno, self.token(lineno, tokens, 2, "condition id")?)?;
        if tag != Tag::Output && arg_width != 1 {
            return Err(self.error(lineno, format!("argument of '{tag}' must have width 1")));
        }
        let symbol = self.optional_symbol(lineno, tokens, 3)?;
        match tag {
            Tag::Bad => {
                debug!("bad {} at line {}", self.bads.len(), lineno);
                self.bads.push(id);
            }
            Tag::Constraint => {
                debug!("constraint {} at line {}", self.constraints.len(), lineno);
                self.constraints.push(id);
            }
            _ => {}
        }
        self.max_id = self.max_id.max(id);
        self.nodes.insert(
            id,
            Node {
                id,
                tag,
                width: arg_width,
                args: vec![arg],
                imms: Vec::new(),
                constant: None,
                symbol,
                lineno,
            },
        );
        Ok(())
    }

    fn parse_sort(&mut self, lineno: u64, id: Nid, tokens: &[&str]) -> Result<(), ParseError> {
        let kind = self.token(lineno, tokens, 2, "sort kind")?;
        match kind {
            "bitvec" => {
                let width_token = self.token(lineno, tokens, 3, "bit width")?;
                let width = parse_num(width_token)
                    .filter(|&w| w >= 1 && w <= u32::MAX as i64)
                    .ok_or_else(|| {
                        self.error(lineno, format!("invalid bit width '{width_token}'"))
                    })?;
                self.expect_end(lineno, tokens, 4)?;
                debug!("sort bitvec {} at line {}", width, lineno);
                self.max_id = self.max_id.max(id);
                self.sorts.insert(
                    id,
                    Sort::Bitvec {
                        width: width as u32,
                    },
                );
                Ok(())
            }
            "array" => {
                // recognised so the error names the construct, not the syntax
                let index = parse_num(self.token(lineno, tokens, 3, "index sort id")?)
                    .ok_or_else(|| self.error(lineno, "invalid index sort id".to_string()))?;
                let element = parse_num(self.token(lineno, tokens, 4, "element sort id")?)
                    .ok_or_else(|| self.error(lineno, "invalid element sort id".to_string()))?;
                self.sorts.insert(id, Sort::Array { index, element });
                Err(self.error(lineno, "unsupported sort 'array'".to_string()))
            }
            other => Err(self.error(lineno, format!("invalid sort kind '{other}'"))),
        }
    }

    fn finish(self) -> Model {
        let len = self.max_id as usize + 1;
        let mut nodes = vec![None; len];
        for (id, node) in self.nodes {
            nodes[id as usize] = Some(node);
        }
        let mut inits = vec![None; len];
        for (state, init) in self.inits {
            inits[state as usize] = Some(init);
        }
        let mut nexts = vec![None; len];
        for (state, next) in self.nexts {
            nexts[state as usize] = Some(next);
        }
        Model {
            nodes,
            inputs: self.inputs,
            states: self.states,
            bads: self.bads,
            constraints: self.constraints,
            inits,
            nexts,
        }
    }

    fn token<'a>(
        &self,
        lineno: u64,
        tokens: &[&'a str],
        index: usize,
        what: &str,
    ) -> Result<&'a str, ParseError> {
        tokens
            .get(index)
            .copied()
            .ok_or_else(|| self.error(lineno, format!("missing {what}")))
    }

    fn expect_end(&self, lineno: u64, tokens: &[&str], index: usize) -> Result<(), ParseError> {
        match tokens.get(index) {
            None => Ok(()),
            Some(extra) => Err(self.error(lineno, format!("unexpected token '{extra}'"))),
        }
    }

    fn optional_symbol(
        &self,
        lineno: u64,
        tokens: &[&str],
        index: usize,
    ) -> Result<Option<String>, ParseError> {
        self.expect_end(lineno, tokens, index + 1)?;
        Ok(tokens.get(index).map(|s| s.to_string()))
    }

    fn sort_width(&self, lineno: u64, token: &str) -> Result<u32, ParseError> {
        let id = parse_num(token)
            .filter(|&v| v > 0)
            .ok_or_else(|| self.error(lineno, format!("invalid sort id '{token}'")))?;
        match self.sorts.get(&id) {
            Some(Sort::Bitvec { width }) => Ok(*width),
            Some(Sort::Array { .. }) => {
                Err(self.error(lineno, format!("array sort {id} is not supported")))
            }
            None => Err(self.error(lineno, format!("undefined sort id '{id}'"))),
        }
    }

    /// A signed argument reference; returns the signed id and the width of
    /// the referenced node.
    fn value_ref(&self, lineno: u64, token: &str) -> Result<(Nid, u32), ParseError> {
        let (negated, digits) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        let id = parse_num(digits)
            .filter(|&v| v > 0)
            .ok_or_else(|| self.error(lineno, format!("invalid argument id '{token}'")))?;
        match self.nodes.get(&id) {
            Some(node) if node.tag.is_value() => {
                Ok((if negated { -id } else { id }, node.width))
            }
            Some(node) => Err(self.error(
                lineno,
                format!("argument id {} is a '{}' line, not a value", id, node.tag),
            )),
            None => Err(self.error(lineno, format!("undefined argument id '{id}'"))),
        }
    }

    fn two_value_refs(
        &self,
        lineno: u64,
        tokens: &[&str],
    ) -> Result<(Nid, u32, Nid, u32), ParseError> {
        let (a, aw) = self.value_ref(lineno, self.token(lineno, tokens, 3, "argument")?)?;
        let (b, bw) = self.value_ref(lineno, self.token(lineno, tokens, 4, "argument")?)?;
        self.expect_end(lineno, tokens, 5)?;
        Ok((a, aw, b, bw))
    }

    fn immediate(
        &self,
        lineno: u64,
        tokens: &[&str],
        index: usize,
        what: &str,
    ) -> Result<u32, ParseError> {
        let token = self.token(lineno, tokens, index, what)?;
        parse_num(token)
            .filter(|&v| v <= u32::MAX as i64)
            .map(|v| v as u32)
            .ok_or_else(|| self.error(lineno, format!("invalid {what} '{token}'")))
    }
}

fn unsupported(id: Nid, tag: Tag, tokens: &[&str]) -> String {
    if tokens.len() > 2 {
        format!("unsupported '{id} {tag} ...'")
    } else {
        format!("unsupported '{id} {tag}'")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<Model, ParseError> {
        parse_model(Cursor::new(text), "<test>")
    }

    #[test]
    fn parses_a_counter() {
        let model = parse(
            "; an eight bit counter
            1 sort bitvec 8
            2 zero 1
            3 state 1 counter
            4 init 1 3 2
            5 one 1
            6 add 1 3 5
            7 next 1 3 6
            8 ones 1
            9 sort bitvec 1
            10 eq 9 3 8 ; reached the maximum
            11 bad 10
            ",
        )
        .unwrap();
        assert_eq!(model.states, vec![3]);
        assert_eq!(model.bads, vec![11]);
        assert!(model.inputs.is_empty());
        assert_eq!(model.inits[3], Some(4));
        assert_eq!(model.nexts[3], Some(7));
        let state = model.node(3).unwrap();
        assert_eq!(state.width, 8);
        assert_eq!(state.symbol.as_deref(), Some("counter"));
        assert_eq!(model.node(10).unwrap().width, 1);
    }

    #[test]
    fn negated_arguments_and_immediates() {
        let model = parse(
            "1 sort bitvec 4
            2 input 1
            3 not 1 -2
            4 sort bitvec 2
            5 slice 4 3 2 1
            6 sort bitvec 6
            7 uext 6 5 4
            8 sext 6 5 4
            ",
        )
        .unwrap();
        assert_eq!(model.node(3).unwrap().args, vec![-2]);
        assert_eq!(model.node(5).unwrap().imms, vec![2, 1]);
        assert_eq!(model.node(7).unwrap().imms, vec![4]);
        assert_eq!(model.node(8).unwrap().width, 6);
    }

    #[test]
    fn rejects_unknown_tags_and_bad_ids() {
        assert!(parse("1 sort bitvec 8\n2 frob 1\n")
            .unwrap_err()
            .msg
            .contains("invalid tag 'frob'"));
        assert!(parse("0 sort bitvec 8\n").unwrap_err().msg.contains("invalid line id"));
        assert!(parse("01 sort bitvec 8\n")
            .unwrap_err()
            .msg
            .contains("invalid line id"));
        let err = parse("1 sort bitvec 8\n1 input 1\n").unwrap_err();
        assert_eq!(err.lineno, 2);
        assert!(err.msg.contains("already defined"));
    }

    #[test]
    fn rejects_unsupported_constructs() {
        assert!(parse("1 sort array 2 2\n")
            .unwrap_err()
            .msg
            .contains("unsupported sort 'array'"));
        let err = parse("1 sort bitvec 1\n2 input 1\n3 justice 1 2\n").unwrap_err();
        assert!(err.msg.contains("unsupported '3 justice ...'"));
        assert!(parse("1 sort bitvec 8\n2 input 1\n3 input 1\n4 rol 1 2 3\n")
            .unwrap_err()
            .msg
            .contains("unsupported '4 rol ...'"));
    }

    #[test]
    fn type_checks_operator_widths() {
        let err = parse(
            "1 sort bitvec 8
            2 sort bitvec 4
            3 input 1
            4 input 2
            5 add 1 3 4
            ",
        )
        .unwrap_err();
        assert_eq!(err.lineno, 5);
        assert!(err.msg.contains("same width"));

        assert!(parse("1 sort bitvec 8\n2 input 1\n3 eq 1 2 2\n")
            .unwrap_err()
            .msg
            .contains("width 1"));
        assert!(parse("1 sort bitvec 8\n2 input 1\n3 slice 1 2 8 0\n")
            .unwrap_err()
            .msg
            .contains("exceeds argument width"));
        assert!(parse("1 sort bitvec 8\n2 input 1\n3 slice 1 2 3 5\n")
            .unwrap_err()
            .msg
            .contains("above upper index"));
        assert!(parse(
            "1 sort bitvec 1\n2 sort bitvec 8\n3 input 2\n4 input 2\n5 input 2\n6 ite 2 3 4 5\n"
        )
        .unwrap_err()
        .msg
        .contains("condition must have width 1"));
    }

    #[test]
    fn validates_constants_at_parse_time() {
        assert!(parse("1 sort bitvec 4\n2 const 1 10100\n").is_err());
        assert!(parse("1 sort bitvec 4\n2 constd 1 16\n").is_err());
        assert!(parse("1 sort bitvec 4\n2 consth 1 1f\n")
            .unwrap_err()
            .msg
            .contains("does not fit"));
        // the minimum signed value must be accepted
        let model = parse("1 sort bitvec 4\n2 constd 1 -8\n").unwrap();
        assert_eq!(model.node(2).unwrap().constant.as_deref(), Some("-8"));
    }

    #[test]
    fn init_and_next_bookkeeping() {
        let err = parse(
            "1 sort bitvec 4
            2 state 1
            3 zero 1
            4 init 1 2 3
            5 init 1 2 3
            ",
        )
        .unwrap_err();
        assert!(err.msg.contains("second 'init' for state 2"));

        assert!(parse("1 sort bitvec 4\n2 zero 1\n3 init 1 2 2\n")
            .unwrap_err()
            .msg
            .contains("not a state"));
    }

    #[test]
    fn arguments_must_reference_value_lines() {
        assert!(parse("1 sort bitvec 1\n2 input 1\n3 bad 2\n4 not 1 3\n")
            .unwrap_err()
            .msg
            .contains("not a value"));
        assert!(parse("1 sort bitvec 1\n2 not 1 7\n")
            .unwrap_err()
            .msg
            .contains("undefined argument id"));
    }
}
