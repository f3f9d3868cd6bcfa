//! Parser for SPICE-style netlists.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{Result, SymmetryError};

/// Parser for netlists.
///
/// Each logical statement (a line plus its `+` continuations) is collected
/// first and then interpreted, so continuation lines behave exactly like
/// one long line.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    /// Name of the open `.subckt` block
    subckt: Option<String>,
}

/// Tokens of one logical statement.
struct Statement {
    tokens: Vec<Token>,
    line: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            current: Token {
                kind: TokenKind::Newline,
                text: String::new(),
                line: 0,
                column: 0,
            },
            subckt: None,
        }
    }

    /// Parse the entire netlist.
    pub fn parse(&mut self) -> Result<NetlistAst> {
        let mut ast = NetlistAst::new();
        self.advance()?;

        while let Some(statement) = self.next_statement()? {
            let first = &statement.tokens[0];
            match first.kind {
                TokenKind::Directive => {
                    if !self.parse_directive(&statement, &mut ast)? {
                        break;
                    }
                }
                TokenKind::Identifier => {
                    let name = first.text.clone();
                    if name.starts_with(['M', 'm']) {
                        let mut instance = parse_instance(&statement)?;
                        instance.subckt = self.subckt.clone();
                        ast.instances.push(instance);
                    } else {
                        debug!(
                            element = %name,
                            line = statement.line,
                            "skipping non-transistor element"
                        );
                        ast.skipped.push(SkippedElement {
                            name,
                            line: statement.line,
                        });
                    }
                }
                _ => {
                    return Err(SymmetryError::netlist(
                        statement.line,
                        format!("unexpected token: {:?}", first.text),
                    ));
                }
            }
        }

        scope_subcircuit_names(&mut ast);
        debug!(
            instances = ast.instances.len(),
            skipped = ast.skipped.len(),
            "parsed netlist"
        );
        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    /// Collect the tokens of the next non-empty statement, folding in
    /// continuation lines.
    fn next_statement(&mut self) -> Result<Option<Statement>> {
        while self.current.kind == TokenKind::Newline {
            self.advance()?;
        }
        if self.current.kind == TokenKind::Eof {
            return Ok(None);
        }
        if self.current.kind == TokenKind::Continuation {
            return Err(SymmetryError::netlist(
                self.current.line,
                "continuation line without a statement to continue",
            ));
        }

        let line = self.current.line;
        let mut tokens = Vec::new();
        loop {
            match self.current.kind {
                TokenKind::Eof => break,
                TokenKind::Newline => {
                    self.advance()?;
                    // Skip blank lines between a statement and its continuation
                    while self.current.kind == TokenKind::Newline {
                        self.advance()?;
                    }
                    if self.current.kind == TokenKind::Continuation {
                        self.advance()?;
                    } else {
                        break;
                    }
                }
                _ => {
                    tokens.push(self.current.clone());
                    self.advance()?;
                }
            }
        }

        Ok(Some(Statement { tokens, line }))
    }

    /// Interpret a dot command. Returns `false` when parsing should stop.
    fn parse_directive(&mut self, statement: &Statement, ast: &mut NetlistAst) -> Result<bool> {
        let directive = statement.tokens[0].text.to_lowercase();
        match directive.as_str() {
            ".subckt" => {
                let name = statement.tokens.get(1).ok_or_else(|| {
                    SymmetryError::netlist(statement.line, ".subckt needs a name")
                })?;
                if let Some(open) = &self.subckt {
                    return Err(SymmetryError::netlist(
                        statement.line,
                        format!(".subckt '{}' opened inside '{}'", name.text, open),
                    ));
                }
                if ast.subcircuits.contains(&name.text) {
                    return Err(SymmetryError::netlist(
                        statement.line,
                        format!(".subckt '{}' is defined twice", name.text),
                    ));
                }
                ast.subcircuits.push(name.text.clone());
                self.subckt = Some(name.text.clone());
            }
            ".ends" => {
                if self.subckt.take().is_none() {
                    debug!(line = statement.line, ".ends without an open .subckt");
                }
            }
            ".global" => {
                ast.globals.extend(statement.tokens[1..].iter().map(|t| t.text.clone()));
            }
            ".end" => return Ok(false),
            _ => {
                debug!(directive = %directive, line = statement.line, "ignoring directive");
            }
        }
        Ok(true)
    }
}

/// Interpret `M<name> <d> <g> <s> [<b>] <model> [key=value ...]`.
fn parse_instance(statement: &Statement) -> Result<InstanceDef> {
    let tokens = &statement.tokens;
    let name = tokens[0].text.clone();
    let line = statement.line;

    let mut positional = Vec::new();
    let mut params = BTreeMap::new();
    let mut i = 1;
    while i < tokens.len() {
        let is_assignment = tokens
            .get(i + 1)
            .map(|t| t.kind == TokenKind::Equals)
            .unwrap_or(false);

        if is_assignment {
            let key = tokens[i].text.to_lowercase();
            let value_tok = tokens.get(i + 2).ok_or_else(|| {
                SymmetryError::netlist(line, format!("missing value for parameter '{}'", key))
            })?;
            let value = parse_value(&value_tok.text).ok_or_else(|| {
                SymmetryError::InvalidParameter {
                    device: name.clone(),
                    param: key.clone(),
                    message: format!("'{}' is not a number", value_tok.text),
                }
            })?;
            params.insert(key, value);
            i += 3;
        } else if tokens[i].kind == TokenKind::Equals {
            return Err(SymmetryError::netlist(line, "'=' without a parameter name"));
        } else {
            if !params.is_empty() {
                return Err(SymmetryError::netlist(
                    line,
                    format!("positional token '{}' after parameters", tokens[i].text),
                ));
            }
            positional.push(tokens[i].text.clone());
            i += 1;
        }
    }

    // Three or four terminals followed by the model name
    if positional.len() < 4 || positional.len() > 5 {
        return Err(SymmetryError::netlist(
            line,
            format!(
                "transistor '{}' needs 3 or 4 nets and a model, got {} tokens",
                name,
                positional.len()
            ),
        ));
    }

    let model = positional.pop().unwrap_or_default();
    Ok(InstanceDef {
        name,
        nodes: positional,
        subckt: None,
        model,
        params,
        line,
    })
}

/// Prefix instance names and local nets inside `.subckt` bodies with the
/// subcircuit name, so bodies that reuse `M1` or `tail` stay distinct once
/// flattened. Ground (`0`) and `.global` nets are shared.
fn scope_subcircuit_names(ast: &mut NetlistAst) {
    let globals: HashSet<String> = ast.globals.iter().map(|g| g.to_lowercase()).collect();
    for instance in &mut ast.instances {
        let Some(subckt) = &instance.subckt else {
            continue;
        };
        instance.name = format!("{}.{}", subckt, instance.name);
        for node in &mut instance.nodes {
            if node != "0" && !globals.contains(&node.to_lowercase()) {
                *node = format!("{}.{}", subckt, node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{Orientation, SymmetryPair};
    use approx::assert_relative_eq;

    fn parse(input: &str) -> Result<NetlistAst> {
        super::super::parse(input)
    }

    #[test]
    fn test_parse_mos_instance() {
        let ast = parse("M1 out in vss vss nch w=10u l=0.5u nf=2").unwrap();
        assert_eq!(ast.instances.len(), 1);
        let m1 = &ast.instances[0];
        assert_eq!(m1.name, "M1");
        assert_eq!(m1.nodes, vec!["out", "in", "vss", "vss"]);
        assert_eq!(m1.model, "nch");
        assert_relative_eq!(m1.param("w").unwrap(), 10e-6);
        assert_relative_eq!(m1.param("nf").unwrap(), 2.0);
    }

    #[test]
    fn test_three_terminal_instance() {
        let ast = parse("M2 d g s pmos").unwrap();
        assert_eq!(ast.instances[0].nodes.len(), 3);
        assert_eq!(ast.instances[0].model, "pmos");
    }

    #[test]
    fn test_continuation_and_comments() {
        let input = "* two-line instance\nM1 out in\n+ vss vss nch $ trailing\n+ w=1u\n";
        let ast = parse(input).unwrap();
        assert_eq!(ast.instances.len(), 1);
        assert_eq!(ast.instances[0].line, 2);
        assert_relative_eq!(ast.instances[0].param("w").unwrap(), 1e-6);
    }

    #[test]
    fn test_subckt_flattened_and_others_skipped() {
        let input = "\
.subckt ota in out vdd vss
R1 out vdd 10k
M1 out in vss vss nch
.ends ota
M2 out in 0 0 nch
.end
M9 a b c d nch
";
        let ast = parse(input).unwrap();
        assert_eq!(ast.subcircuits, vec!["ota"]);
        assert_eq!(ast.instances.len(), 2);
        assert_eq!(ast.instances[0].name, "ota.M1");
        assert_eq!(ast.instances[0].subckt.as_deref(), Some("ota"));
        assert_eq!(ast.instances[0].nodes, vec!["ota.out", "ota.in", "ota.vss", "ota.vss"]);
        assert_eq!(ast.instances[1].name, "M2");
        assert_eq!(ast.instances[1].nodes, vec!["out", "in", "0", "0"]);
        assert_eq!(ast.skipped.len(), 1);
        assert_eq!(ast.skipped[0].name, "R1");
    }

    #[test]
    fn test_subckts_reusing_local_names() {
        let input = "\
.global vdd
.subckt a in
M1 x in tail 0 nch w=2u
M2 y in tail 0 nch w=2u
.ends a
.subckt b in
M1 x in tail vdd pch w=4u
M2 y in tail vdd pch w=4u
.ends b
";
        let circuit = crate::circuit::Circuit::from_netlist(parse(input).unwrap()).unwrap();
        assert_eq!(circuit.device_ids(), vec!["a.M1", "a.M2", "b.M1", "b.M2"]);
        assert_eq!(circuit.endpoints_of("a.tail").unwrap().len(), 2);
        assert_eq!(circuit.endpoints_of("0").unwrap().len(), 2);
        assert_eq!(circuit.endpoints_of("vdd").unwrap().len(), 2);

        let set = crate::detect::detect(&circuit);
        assert_eq!(
            set.pairs,
            vec![
                SymmetryPair::new("a.M1", "a.M2", Orientation::Vertical),
                SymmetryPair::new("b.M1", "b.M2", Orientation::Vertical),
            ]
        );
    }

    #[test]
    fn test_nested_or_repeated_subckt_rejected() {
        let nested = parse(".subckt a x\n.subckt b y\n.ends b\n.ends a\n").unwrap_err();
        assert!(matches!(nested, SymmetryError::NetlistParse { line: 2, .. }));
        let repeated = parse(".subckt a x\n.ends a\n.subckt a x\n.ends a\n").unwrap_err();
        assert!(matches!(repeated, SymmetryError::NetlistParse { line: 3, .. }));
    }

    #[test]
    fn test_hash_in_instance_name_rejected() {
        let err = parse("M#1 out in vss vss nch\n").unwrap_err();
        assert!(matches!(err, SymmetryError::Lexer { line: 1, .. }));
    }

    #[test]
    fn test_too_few_terminals() {
        let err = parse("M1 out in nch").unwrap_err();
        assert!(matches!(err, SymmetryError::NetlistParse { line: 1, .. }));
    }

    #[test]
    fn test_bad_parameter_value() {
        let err = parse("M1 d g s b nch w=wide").unwrap_err();
        assert!(matches!(err, SymmetryError::InvalidParameter { .. }));
    }

    #[test]
    fn test_dangling_continuation() {
        assert!(parse("+ w=1u").is_err());
    }
}
