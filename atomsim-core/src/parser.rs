use crate::ast::{
    AtomDecl, AtomShape, Axis, CollisionsDecl, DetectorDecl, DetectorKind, Scenario,
    SimulateDecl, TypeDecl, WorldDecl,
};
use crate::collision::{PairTraversal, Resolution};
use crate::diagnostics::Span;
use crate::vector::{vector2, Vector2};
use thiserror::Error;

/// Parse error with optional span information
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{message}")]
    SyntaxError {
        message: String,
        span: Option<Span>,
    },
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Option<Span>) -> Self {
        Self::SyntaxError {
            message: message.into(),
            span,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::SyntaxError {
            message: message.into(),
            span: None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::SyntaxError { span, .. } => *span,
        }
    }
}

/// Helper to track byte offsets while parsing
struct ParseContext {
    line_offsets: Vec<usize>, // Byte offset of start of each line
    len: usize,
}

impl ParseContext {
    fn new(source: &str) -> Self {
        let mut line_offsets = vec![0];
        for (idx, ch) in source.char_indices() {
            if ch == '\n' {
                line_offsets.push(idx + 1);
            }
        }
        Self {
            line_offsets,
            len: source.len(),
        }
    }

    /// Get byte offset for start of line (0-indexed)
    fn line_start(&self, line: usize) -> usize {
        self.line_offsets.get(line).copied().unwrap_or(self.len)
    }

    /// Create a span for the entire line
    fn full_line_span(&self, line: usize) -> Span {
        Span::new(self.line_start(line), self.line_start(line + 1))
    }
}

/// Parse a scenario from source text
pub fn parse_scenario(source: &str) -> Result<Scenario, ParseError> {
    let ctx = ParseContext::new(source);
    let mut worlds = Vec::new();
    let mut types = Vec::new();
    let mut atoms = Vec::new();
    let mut simulate: Option<SimulateDecl> = None;
    let mut collisions = Vec::new();
    let mut detectors = Vec::new();

    for (i, raw) in source.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }
        let span = Some(ctx.full_line_span(i));

        let keyword = line.split_whitespace().next().unwrap_or("");
        match keyword {
            "world" => worlds.push(parse_world(line, span)?),
            "type" => types.push(parse_type(line, span)?),
            "atom" => atoms.push(parse_atom(line, span)?),
            "simulate" => {
                if simulate.is_some() {
                    return Err(ParseError::new("Duplicate 'simulate' declaration", span));
                }
                simulate = Some(parse_simulate(line, span)?);
            }
            "collisions" => collisions.push(parse_collisions(line, span)?),
            "detect" => detectors.push(parse_detector(line, span)?),
            other => {
                return Err(ParseError::new(format!("Unexpected token: {}", other), span));
            }
        }
    }

    let simulate =
        simulate.ok_or_else(|| ParseError::message("Missing 'simulate' declaration"))?;

    Ok(Scenario {
        worlds,
        types,
        atoms,
        simulate,
        collisions,
        detectors,
    })
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_identifier(name: &str, what: &str, span: Option<Span>) -> Result<String, ParseError> {
    let name = name.trim();
    if !is_identifier(name) {
        return Err(ParseError::new(
            format!("Invalid {} name: '{}'", what, name),
            span,
        ));
    }
    Ok(name.to_string())
}

fn parse_number(text: &str, span: Option<Span>) -> Result<f64, ParseError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| ParseError::new(format!("Invalid number: '{}'", text.trim()), span))
}

/// Split the leading number off `text`, returning it and the remainder
fn next_number(text: &str, span: Option<Span>) -> Result<(f64, &str), ParseError> {
    let text = text.trim_start();
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    let value = parse_number(&text[..end], span)?;
    Ok((value, text[end..].trim_start()))
}

/// Parse `(x, y)` at the start of `text`, returning it and the remainder
fn parse_vector(text: &str, span: Option<Span>) -> Result<(Vector2, &str), ParseError> {
    let text = text.trim_start();
    let inner = text
        .strip_prefix('(')
        .ok_or_else(|| ParseError::new(format!("Expected '(' in vector: {}", text), span))?;
    let close = inner
        .find(')')
        .ok_or_else(|| ParseError::new(format!("Expected ')' in vector: {}", text), span))?;

    let coords: Vec<&str> = inner[..close].split(',').collect();
    if coords.len() != 2 {
        return Err(ParseError::new(
            format!("Expected two coordinates in vector: ({})", &inner[..close]),
            span,
        ));
    }
    let x = parse_number(coords[0], span)?;
    let y = parse_number(coords[1], span)?;
    Ok((vector2(x, y), inner[close + 1..].trim_start()))
}

/// Parse `key = value key = value ...`
fn parse_assignments<'a>(
    text: &'a str,
    what: &str,
    span: Option<Span>,
) -> Result<Vec<(&'a str, &'a str)>, ParseError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() % 3 != 0 {
        return Err(ParseError::new(
            format!("Expected 'key = value' pairs in {}: {}", what, text),
            span,
        ));
    }
    tokens
        .chunks(3)
        .map(|chunk| {
            if chunk[1] != "=" {
                return Err(ParseError::new(
                    format!("Expected '=' after '{}' in {}", chunk[0], what),
                    span,
                ));
            }
            Ok((chunk[0], chunk[2]))
        })
        .collect()
}

/// Parse a world declaration: `world drag = d`
fn parse_world(line: &str, span: Option<Span>) -> Result<WorldDecl, ParseError> {
    let rest = line
        .strip_prefix("world")
        .ok_or_else(|| ParseError::new("Expected 'world' keyword", span))?;

    let mut drag = None;
    for (key, value) in parse_assignments(rest, "world", span)? {
        match key {
            "drag" => drag = Some(parse_number(value, span)?),
            _ => {
                return Err(ParseError::new(
                    format!("Unknown world setting: {}", key),
                    span,
                ))
            }
        }
    }

    let drag = drag.ok_or_else(|| ParseError::new("Expected 'drag =' in world", span))?;
    Ok(WorldDecl { drag, span })
}

/// Parse a type declaration: `type name radius r mass m`
fn parse_type(line: &str, span: Option<Span>) -> Result<TypeDecl, ParseError> {
    let rest = line
        .strip_prefix("type ")
        .ok_or_else(|| ParseError::new("Expected 'type' keyword", span))?;

    let radius_pos = rest.find(" radius ").ok_or_else(|| {
        ParseError::new(format!("Expected 'radius' in type declaration: {}", line), span)
    })?;
    let name = parse_identifier(&rest[..radius_pos], "type", span)?;

    let (radius, rest) = next_number(&rest[radius_pos + 8..], span)?;
    let mass_str = rest.strip_prefix("mass ").ok_or_else(|| {
        ParseError::new(format!("Expected 'mass' in type declaration: {}", line), span)
    })?;
    let mass = parse_number(mass_str, span)?;

    Ok(TypeDecl {
        name,
        radius,
        mass,
        span,
    })
}

/// Parse an atom declaration:
/// `atom name : type at (x, y) [velocity (vx, vy)]` or
/// `atom name at (x, y) [velocity (vx, vy)] radius r mass m`
fn parse_atom(line: &str, span: Option<Span>) -> Result<AtomDecl, ParseError> {
    let rest = line
        .strip_prefix("atom ")
        .ok_or_else(|| ParseError::new("Expected 'atom' keyword", span))?;

    let at_pos = rest.find(" at ").ok_or_else(|| {
        ParseError::new(format!("Expected 'at' in atom declaration: {}", line), span)
    })?;

    let head = &rest[..at_pos];
    let (name, type_name) = match head.split_once(':') {
        Some((name, type_name)) => (
            parse_identifier(name, "atom", span)?,
            Some(parse_identifier(type_name, "type", span)?),
        ),
        None => (parse_identifier(head, "atom", span)?, None),
    };

    let (position, mut rest) = parse_vector(&rest[at_pos + 4..], span)?;

    let mut velocity = None;
    let mut radius = None;
    let mut mass = None;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("velocity") {
            if velocity.is_some() {
                return Err(ParseError::new("Duplicate 'velocity' in atom declaration", span));
            }
            let (v, after) = parse_vector(after, span)?;
            velocity = Some(v);
            rest = after;
        } else if let Some(after) = rest.strip_prefix("radius ") {
            if radius.is_some() {
                return Err(ParseError::new("Duplicate 'radius' in atom declaration", span));
            }
            let (r, after) = next_number(after, span)?;
            radius = Some(r);
            rest = after;
        } else if let Some(after) = rest.strip_prefix("mass ") {
            if mass.is_some() {
                return Err(ParseError::new("Duplicate 'mass' in atom declaration", span));
            }
            let (m, after) = next_number(after, span)?;
            mass = Some(m);
            rest = after;
        } else {
            return Err(ParseError::new(
                format!("Unexpected '{}' in atom declaration", rest),
                span,
            ));
        }
    }

    Ok(AtomDecl {
        name,
        position,
        velocity: velocity.unwrap_or(Vector2::ZERO),
        shape: AtomShape {
            type_name,
            radius,
            mass,
        },
        span,
    })
}

/// Parse a simulate declaration: `simulate dt = x steps = n`
fn parse_simulate(line: &str, span: Option<Span>) -> Result<SimulateDecl, ParseError> {
    let rest = line
        .strip_prefix("simulate")
        .ok_or_else(|| ParseError::new("Expected 'simulate' keyword", span))?;

    let mut dt = None;
    let mut steps = None;
    for (key, value) in parse_assignments(rest, "simulate", span)? {
        match key {
            "dt" => dt = Some(parse_number(value, span)?),
            "steps" => {
                let n = value.parse::<u32>().map_err(|_| {
                    ParseError::new(format!("Invalid step count: '{}'", value), span)
                })?;
                steps = Some(n);
            }
            _ => {
                return Err(ParseError::new(
                    format!("Unknown simulate setting: {}", key),
                    span,
                ))
            }
        }
    }

    let dt = dt.ok_or_else(|| ParseError::new("Expected 'dt =' in simulate", span))?;
    let steps = steps.ok_or_else(|| ParseError::new("Expected 'steps =' in simulate", span))?;
    Ok(SimulateDecl { dt, steps, span })
}

/// Parse a collisions declaration: `collisions pairs = unordered resolve = sequential`
fn parse_collisions(line: &str, span: Option<Span>) -> Result<CollisionsDecl, ParseError> {
    let rest = line
        .strip_prefix("collisions")
        .ok_or_else(|| ParseError::new("Expected 'collisions' keyword", span))?;

    let mut decl = CollisionsDecl {
        pairs: None,
        resolution: None,
        span,
    };
    for (key, value) in parse_assignments(rest, "collisions", span)? {
        match (key, value) {
            ("pairs", "unordered") => decl.pairs = Some(PairTraversal::Unordered),
            ("pairs", "ordered") => decl.pairs = Some(PairTraversal::Ordered),
            ("resolve", "sequential") => decl.resolution = Some(Resolution::Sequential),
            ("resolve", "deferred") => decl.resolution = Some(Resolution::Deferred),
            ("pairs", _) | ("resolve", _) => {
                return Err(ParseError::new(
                    format!("Unknown {} mode: {}", key, value),
                    span,
                ))
            }
            _ => {
                return Err(ParseError::new(
                    format!("Unknown collisions setting: {}", key),
                    span,
                ))
            }
        }
    }
    Ok(decl)
}

/// Parse a detector declaration: `detect name = observable`
fn parse_detector(line: &str, span: Option<Span>) -> Result<DetectorDecl, ParseError> {
    let rest = line
        .strip_prefix("detect ")
        .ok_or_else(|| ParseError::new("Expected 'detect' keyword", span))?;

    let eq_pos = rest
        .find(" = ")
        .ok_or_else(|| ParseError::new(format!("Expected '=' in detector: {}", line), span))?;

    let name = parse_identifier(&rest[..eq_pos], "detector", span)?;
    let observable = rest[eq_pos + 3..].trim();

    let open = observable.find('(').ok_or_else(|| {
        ParseError::new(format!("Expected '(' in detector: {}", line), span)
    })?;
    let close = observable.find(')').ok_or_else(|| {
        ParseError::new(format!("Expected ')' in detector: {}", line), span)
    })?;
    if close < open {
        return Err(ParseError::new(format!("Malformed detector: {}", line), span));
    }

    let func = observable[..open].trim();
    let args_str = observable[open + 1..close].trim();
    let args: Vec<&str> = if args_str.is_empty() {
        Vec::new()
    } else {
        args_str.split(',').map(str::trim).collect()
    };
    let axis = match observable[close + 1..].trim() {
        "" => None,
        ".x" => Some(Axis::X),
        ".y" => Some(Axis::Y),
        other => {
            return Err(ParseError::new(
                format!("Unknown detector suffix: {}", other),
                span,
            ))
        }
    };

    let expect_args = |n: usize| -> Result<(), ParseError> {
        if args.len() != n {
            return Err(ParseError::new(
                format!("{} detector expects {} argument(s), got {}", func, n, args.len()),
                span,
            ));
        }
        Ok(())
    };
    let no_axis = || -> Result<(), ParseError> {
        if axis.is_some() {
            return Err(ParseError::new(
                format!("{} detector does not take a component", func),
                span,
            ));
        }
        Ok(())
    };
    let atom = |idx: usize| parse_identifier(args[idx], "atom", span);

    let kind = match func {
        "position" => {
            expect_args(1)?;
            DetectorKind::Position(atom(0)?, axis.unwrap_or(Axis::X))
        }
        "velocity" => {
            expect_args(1)?;
            let axis = axis.ok_or_else(|| {
                ParseError::new("velocity detector needs a component (.x or .y)", span)
            })?;
            DetectorKind::Velocity(atom(0)?, axis)
        }
        "speed" => {
            expect_args(1)?;
            no_axis()?;
            DetectorKind::Speed(atom(0)?)
        }
        "distance" => {
            expect_args(2)?;
            no_axis()?;
            DetectorKind::Distance {
                a: atom(0)?,
                b: atom(1)?,
            }
        }
        "energy" => {
            expect_args(0)?;
            no_axis()?;
            DetectorKind::Energy
        }
        "momentum" => {
            expect_args(0)?;
            no_axis()?;
            DetectorKind::Momentum
        }
        _ => {
            return Err(ParseError::new(
                format!("Unknown detector type: {}", func),
                span,
            ))
        }
    };

    Ok(DetectorDecl { name, kind, span })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let src = "# header\n\nsimulate dt = 0.5 steps = 2 # trailing\n";
        let scenario = parse_scenario(src).unwrap();
        assert_eq!(scenario.simulate.dt, 0.5);
        assert_eq!(scenario.simulate.steps, 2);
        assert!(scenario.atoms.is_empty());
    }

    #[test]
    fn spans_cover_the_offending_line() {
        let src = "simulate dt = 1 steps = 1\nbogus line\n";
        let err = parse_scenario(src).unwrap_err();
        assert_eq!(err.span(), Some(Span::new(26, 37)));
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn vector_parsing() {
        let (v, rest) = parse_vector("( 1.5 , -2 ) tail", None).unwrap();
        assert_eq!(v, vector2(1.5, -2.0));
        assert_eq!(rest, "tail");
        assert!(parse_vector("(1.0)", None).is_err());
        assert!(parse_vector("1.0, 2.0", None).is_err());
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("h2o"));
        assert!(is_identifier("_tmp"));
        assert!(!is_identifier("2x"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn detector_requires_component_for_velocity() {
        let err = parse_detector("detect v = velocity(a)", None).unwrap_err();
        assert!(err.to_string().contains("component"));
    }
}
