/// A small text template engine for help output, modelled on Go's
/// `text/template`.
///
/// Data is any `Serialize` value, converted to JSON and walked with field
/// paths. Supported actions:
///
/// - `{{.}}`, `{{.Field}}`, `{{.Field.Nested}}`
/// - pipelines: `{{.Name | printf "%-11s"}}`, `{{.Long | trim}}`
/// - functions: `printf`, `trim`, `upper`, `lower`, `pad WIDTH`
/// - `{{if PIPELINE}} ... {{else}} ... {{end}}`
/// - `{{range PIPELINE}} ... {{else}} ... {{end}}` (`.` is the element)
/// - `{{/* comment */}}`
/// - `{{- ` and ` -}}` trim whitespace before / after the action
use std::fmt::Write as _;
use std::num::FpCategory;

use serde::Serialize;
use serde_json::Value;

use super::errors::TemplateError;

/// Functions callable from a pipeline.
const FUNCTIONS: [&str; 5] = ["printf", "trim", "upper", "lower", "pad"];

/// Largest field width `printf` and `pad` accept.
const MAX_WIDTH: usize = 1024;

/// A parsed template, ready to render any number of times.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template text.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::Parse` for malformed actions or unbalanced
    /// blocks, and `TemplateError::UnknownFunction` for undefined functions.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let pieces = lex(source)?;
        let mut parser = Parser {
            pieces: pieces.into_iter(),
        };
        let (nodes, stop) = parser.parse_list()?;
        if let Some((stop, offset)) = stop {
            return Err(TemplateError::parse(
                offset,
                format!("unexpected {{{{{}}}}}", stop.keyword()),
            ));
        }
        Ok(Self {
            source: source.to_owned(),
            nodes,
        })
    }

    /// The text this template was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate the template against `data`.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::Exec` when a field is missing, a function gets
    /// the wrong arguments, or `data` cannot be serialized.
    pub fn render<T: Serialize + ?Sized>(&self, data: &T) -> Result<String, TemplateError> {
        let value = serde_json::to_value(data).map_err(|e| TemplateError::exec(e.to_string()))?;
        let mut out = String::new();
        exec(&self.nodes, &value, &mut out)?;
        Ok(out)
    }
}

// --- Lexing ---

#[derive(Debug)]
enum Piece {
    Text(String),
    Action { body: String, offset: usize },
}

fn lex(source: &str) -> Result<Vec<Piece>, TemplateError> {
    let mut pieces = Vec::new();
    let mut pos = 0;
    let mut trim_next = false;

    loop {
        let rest = &source[pos..];
        let Some(open) = rest.find("{{") else {
            push_text(&mut pieces, rest, trim_next, false);
            return Ok(pieces);
        };
        let body_start = pos + open + 2;
        let Some(close) = source[body_start..].find("}}") else {
            return Err(TemplateError::parse(pos + open, "unclosed action"));
        };

        let mut body = &source[body_start..body_start + close];
        let trim_prev = body.starts_with('-') && body[1..].starts_with(char::is_whitespace);
        if trim_prev {
            body = &body[1..];
        }
        let trim_after =
            body.ends_with('-') && body[..body.len() - 1].ends_with(char::is_whitespace);
        if trim_after {
            body = &body[..body.len() - 1];
        }

        push_text(&mut pieces, &rest[..open], trim_next, trim_prev);
        let body = body.trim();
        if !(body.starts_with("/*") && body.ends_with("*/")) {
            pieces.push(Piece::Action {
                body: body.to_owned(),
                offset: pos + open,
            });
        }

        trim_next = trim_after;
        pos = body_start + close + 2;
    }
}

fn push_text(pieces: &mut Vec<Piece>, text: &str, trim_start: bool, trim_end: bool) {
    let mut text = text;
    if trim_start {
        text = text.trim_start();
    }
    if trim_end {
        text = text.trim_end();
    }
    if !text.is_empty() {
        pieces.push(Piece::Text(text.to_owned()));
    }
}

// --- Parsing ---

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Output(Pipeline),
    If {
        cond: Pipeline,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    Range {
        over: Pipeline,
        body: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

#[derive(Debug, Clone)]
struct Pipeline {
    calls: Vec<Call>,
}

#[derive(Debug, Clone)]
enum Call {
    Value(Operand),
    Func { name: String, args: Vec<Operand> },
}

#[derive(Debug, Clone)]
enum Operand {
    Dot,
    Field(Vec<String>),
    Str(String),
    Int(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    End,
    Else,
}

impl Stop {
    fn keyword(self) -> &'static str {
        match self {
            Self::End => "end",
            Self::Else => "else",
        }
    }
}

struct Parser {
    pieces: std::vec::IntoIter<Piece>,
}

type ParsedList = (Vec<Node>, Option<(Stop, usize)>);

impl Parser {
    /// Parse nodes until `{{end}}`, `{{else}}` or the end of input.
    fn parse_list(&mut self) -> Result<ParsedList, TemplateError> {
        let mut nodes = Vec::new();

        while let Some(piece) = self.pieces.next() {
            let (body, offset) = match piece {
                Piece::Text(text) => {
                    nodes.push(Node::Text(text));
                    continue;
                }
                Piece::Action { body, offset } => (body, offset),
            };

            let (keyword, rest) = body
                .split_once(char::is_whitespace)
                .map_or((body.as_str(), ""), |(k, r)| (k, r.trim()));

            match keyword {
                "end" | "else" => {
                    if !rest.is_empty() {
                        return Err(TemplateError::parse(
                            offset,
                            format!("unexpected {rest:?} after {keyword}"),
                        ));
                    }
                    let stop = if keyword == "end" { Stop::End } else { Stop::Else };
                    return Ok((nodes, Some((stop, offset))));
                }
                "if" | "range" => {
                    if rest.is_empty() {
                        return Err(TemplateError::parse(
                            offset,
                            format!("missing value for {keyword}"),
                        ));
                    }
                    let pipeline = parse_pipeline(rest, offset)?;
                    let (body, otherwise) = self.parse_block(keyword, offset)?;
                    nodes.push(if keyword == "if" {
                        Node::If {
                            cond: pipeline,
                            then: body,
                            otherwise,
                        }
                    } else {
                        Node::Range {
                            over: pipeline,
                            body,
                            otherwise,
                        }
                    });
                }
                _ => nodes.push(Node::Output(parse_pipeline(&body, offset)?)),
            }
        }

        Ok((nodes, None))
    }

    /// Parse the body of an `if`/`range` plus its optional `else` branch.
    fn parse_block(
        &mut self,
        keyword: &str,
        offset: usize,
    ) -> Result<(Vec<Node>, Vec<Node>), TemplateError> {
        let unclosed = || TemplateError::parse(offset, format!("missing {{{{end}}}} for {keyword}"));

        let (body, stop) = self.parse_list()?;
        match stop {
            Some((Stop::End, _)) => Ok((body, Vec::new())),
            Some((Stop::Else, _)) => match self.parse_list()? {
                (otherwise, Some((Stop::End, _))) => Ok((body, otherwise)),
                (_, Some((Stop::Else, at))) => {
                    Err(TemplateError::parse(at, "unexpected {{else}}"))
                }
                (_, None) => Err(unclosed()),
            },
            None => Err(unclosed()),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Tok {
    Pipe,
    Word(String),
    Str(String),
}

fn tokenize(src: &str, offset: usize) -> Result<Vec<Tok>, TemplateError> {
    let mut toks = Vec::new();
    let mut chars = src.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '|' {
            chars.next();
            toks.push(Tok::Pipe);
        } else if c == '"' {
            chars.next();
            let mut s = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.next() {
                        Some('n') => s.push('\n'),
                        Some('t') => s.push('\t'),
                        Some(other) => s.push(other),
                        None => break,
                    },
                    c => s.push(c),
                }
            }
            if !closed {
                return Err(TemplateError::parse(offset, "unterminated quoted string"));
            }
            toks.push(Tok::Str(s));
        } else {
            let mut word = String::new();
            while let Some(c) = chars.next_if(|c| !c.is_whitespace() && *c != '|' && *c != '"') {
                word.push(c);
            }
            toks.push(Tok::Word(word));
        }
    }

    Ok(toks)
}

fn parse_pipeline(src: &str, offset: usize) -> Result<Pipeline, TemplateError> {
    let toks = tokenize(src, offset)?;
    let mut calls = Vec::new();

    for (i, group) in toks.split(|t| *t == Tok::Pipe).enumerate() {
        let Some((first, rest)) = group.split_first() else {
            return Err(TemplateError::parse(offset, "missing command in pipeline"));
        };

        let func = match first {
            Tok::Word(name) if is_identifier(name) => Some(name),
            _ => None,
        };
        if let Some(name) = func {
            if !FUNCTIONS.contains(&name.as_str()) {
                return Err(TemplateError::UnknownFunction { name: name.clone() });
            }
            let args = rest
                .iter()
                .map(|t| parse_operand(t, offset))
                .collect::<Result<Vec<_>, _>>()?;
            calls.push(Call::Func {
                name: name.clone(),
                args,
            });
            continue;
        }

        if i > 0 {
            return Err(TemplateError::parse(
                offset,
                "only functions can follow `|` in a pipeline",
            ));
        }
        if !rest.is_empty() {
            return Err(TemplateError::parse(
                offset,
                "a value cannot take arguments",
            ));
        }
        calls.push(Call::Value(parse_operand(first, offset)?));
    }

    Ok(Pipeline { calls })
}

fn parse_operand(tok: &Tok, offset: usize) -> Result<Operand, TemplateError> {
    match tok {
        Tok::Str(s) => Ok(Operand::Str(s.clone())),
        Tok::Word(w) if w == "." => Ok(Operand::Dot),
        Tok::Word(w) if w.starts_with('.') => {
            let path: Vec<String> = w[1..].split('.').map(str::to_owned).collect();
            if path.iter().any(String::is_empty) {
                return Err(TemplateError::parse(offset, format!("bad field path {w:?}")));
            }
            Ok(Operand::Field(path))
        }
        Tok::Word(w) => w
            .parse::<i64>()
            .map(Operand::Int)
            .map_err(|_| TemplateError::parse(offset, format!("unexpected {w:?} in operand"))),
        Tok::Pipe => Err(TemplateError::parse(offset, "unexpected `|`")),
    }
}

fn is_identifier(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_alphabetic)
        && word.chars().all(|c| c.is_alphanumeric() || c == '_')
}

// --- Evaluation ---

fn exec(nodes: &[Node], dot: &Value, out: &mut String) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Output(pipeline) => out.push_str(&display(&eval(pipeline, dot)?)),
            Node::If {
                cond,
                then,
                otherwise,
            } => {
                let branch = if truthy(&eval(cond, dot)?) { then } else { otherwise };
                exec(branch, dot, out)?;
            }
            Node::Range {
                over,
                body,
                otherwise,
            } => match eval(over, dot)? {
                Value::Array(items) if !items.is_empty() => {
                    for item in &items {
                        exec(body, item, out)?;
                    }
                }
                Value::Object(map) if !map.is_empty() => {
                    for item in map.values() {
                        exec(body, item, out)?;
                    }
                }
                Value::Array(_) | Value::Object(_) | Value::Null => exec(otherwise, dot, out)?,
                other => {
                    return Err(TemplateError::exec(format!(
                        "range can't iterate over {}",
                        type_name(&other)
                    )));
                }
            },
        }
    }
    Ok(())
}

fn eval(pipeline: &Pipeline, dot: &Value) -> Result<Value, TemplateError> {
    let mut piped: Option<Value> = None;

    for call in &pipeline.calls {
        let value = match call {
            Call::Value(operand) => operand_value(operand, dot)?,
            Call::Func { name, args } => {
                let mut values = args
                    .iter()
                    .map(|a| operand_value(a, dot))
                    .collect::<Result<Vec<_>, _>>()?;
                values.extend(piped.take());
                call_function(name, &values)?
            }
        };
        piped = Some(value);
    }

    Ok(piped.unwrap_or(Value::Null))
}

fn operand_value(operand: &Operand, dot: &Value) -> Result<Value, TemplateError> {
    match operand {
        Operand::Dot => Ok(dot.clone()),
        Operand::Str(s) => Ok(Value::String(s.clone())),
        Operand::Int(n) => Ok(Value::from(*n)),
        Operand::Field(path) => {
            let mut current = dot;
            for segment in path {
                current = match current {
                    Value::Object(map) => map.get(segment).ok_or_else(|| {
                        TemplateError::exec(format!("can't evaluate field {segment}"))
                    })?,
                    other => {
                        return Err(TemplateError::exec(format!(
                            "can't evaluate field {segment} in type {}",
                            type_name(other)
                        )));
                    }
                };
            }
            Ok(current.clone())
        }
    }
}

fn call_function(name: &str, args: &[Value]) -> Result<Value, TemplateError> {
    let arity = |expected: usize| {
        TemplateError::exec(format!(
            "wrong number of args for {name}: want {expected} got {}",
            args.len()
        ))
    };

    match name {
        "printf" => {
            let Some((Value::String(format), rest)) = args.split_first() else {
                return Err(TemplateError::exec("printf: first argument must be a format string"));
            };
            sprintf(format, rest).map(Value::String)
        }
        "trim" | "upper" | "lower" => {
            let [arg] = args else {
                return Err(arity(1));
            };
            let s = display(arg);
            Ok(Value::String(match name {
                "trim" => s.trim().to_owned(),
                "upper" => s.to_uppercase(),
                _ => s.to_lowercase(),
            }))
        }
        "pad" => {
            let [width, arg] = args else {
                return Err(arity(2));
            };
            let width = width
                .as_u64()
                .and_then(|w| usize::try_from(w).ok())
                .filter(|w| *w <= MAX_WIDTH)
                .ok_or_else(|| {
                    TemplateError::exec(format!("pad: width must be an integer in 0..={MAX_WIDTH}"))
                })?;
            Ok(Value::String(format!("{:<width$}", display(arg))))
        }
        other => Err(TemplateError::UnknownFunction {
            name: other.to_owned(),
        }),
    }
}

/// `printf` subset: `%s`, `%v`, `%d`, `%q`, `%%`, with optional `-` and width.
fn sprintf(format: &str, args: &[Value]) -> Result<String, TemplateError> {
    let mut out = String::new();
    let mut args = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.next_if_eq(&'%').is_some() {
            out.push('%');
            continue;
        }

        let left = chars.next_if_eq(&'-').is_some();
        let mut digits = String::new();
        while let Some(d) = chars.next_if(char::is_ascii_digit) {
            digits.push(d);
        }
        let width = if digits.is_empty() {
            0
        } else {
            digits
                .parse::<usize>()
                .ok()
                .filter(|w| *w <= MAX_WIDTH)
                .ok_or_else(|| TemplateError::exec("printf: bad width"))?
        };

        let verb = chars
            .next()
            .ok_or_else(|| TemplateError::exec("printf: format ends with %"))?;
        let arg = args
            .next()
            .ok_or_else(|| TemplateError::exec(format!("printf: missing argument for %{verb}")))?;

        let text = match verb {
            's' | 'v' => display(arg),
            'q' => format!("{:?}", display(arg)),
            'd' => match arg {
                Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
                other => {
                    return Err(TemplateError::exec(format!(
                        "printf: %d needs an integer, got {}",
                        type_name(other)
                    )));
                }
            },
            other => {
                return Err(TemplateError::exec(format!(
                    "printf: unsupported verb %{other}"
                )));
            }
        };

        if left {
            let _ = write!(out, "{text:<width$}");
        } else {
            let _ = write!(out, "{text:>width$}");
        }
    }

    Ok(out)
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "<no value>".to_owned(),
        other => other.to_string(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x.classify() != FpCategory::Zero),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(source: &str, data: &Value) -> String {
        Template::parse(source).unwrap().render(data).unwrap()
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(render("no actions here\n", &json!({})), "no actions here\n");
    }

    #[test]
    fn test_field_access() {
        let data = json!({"Name": "build", "Meta": {"Owner": "ci"}});
        assert_eq!(render("{{.Name}} by {{.Meta.Owner}}", &data), "build by ci");
    }

    #[test]
    fn test_printf_padding() {
        let data = json!({"Name": "run", "Short": "compile and run"});
        assert_eq!(
            render(r#"{{.Name | printf "%-6s"}}|{{.Short}}"#, &data),
            "run   |compile and run"
        );
        assert_eq!(render(r#"{{printf "%5s|%d%%" .Name 7}}"#, &data), "  run|7%");
    }

    #[test]
    fn test_range_with_if() {
        let data = json!({"Commands": [
            {"Name": "a", "Runnable": true},
            {"Name": "b", "Runnable": false},
            {"Name": "c", "Runnable": true},
        ]});
        assert_eq!(
            render("{{range .Commands}}{{if .Runnable}}[{{.Name}}]{{end}}{{end}}", &data),
            "[a][c]"
        );
    }

    #[test]
    fn test_else_branches() {
        let tpl = "{{if .Flags}}flags{{else}}none{{end}}/{{range .Items}}x{{else}}empty{{end}}";
        assert_eq!(render(tpl, &json!({"Flags": "", "Items": []})), "none/empty");
        assert_eq!(render(tpl, &json!({"Flags": "-v", "Items": [1, 2]})), "flags/xx");
    }

    #[test]
    fn test_functions() {
        let data = json!({"Long": "\n  Some text.  \n", "Name": "go"});
        assert_eq!(render("{{.Long | trim}}", &data), "Some text.");
        assert_eq!(render("{{.Name | upper}}", &data), "GO");
        assert_eq!(render("{{.Name | pad 4}}|", &data), "go  |");
        assert_eq!(render("{{\"ABC\" | lower}}", &data), "abc");
    }

    #[test]
    fn test_trim_markers_and_comments() {
        let data = json!({"A": "x", "B": "y"});
        assert_eq!(render("{{.A}}  \n  {{- .B}}", &data), "xy");
        assert_eq!(render("{{.A -}}  \n  {{.B}}", &data), "xy");
        assert_eq!(render("a{{/* hidden */}}b", &data), "ab");
    }

    #[test]
    fn test_missing_field_is_exec_error() {
        let tpl = Template::parse("{{.Nope}}").unwrap();
        assert!(matches!(
            tpl.render(&json!({"Name": "x"})),
            Err(TemplateError::Exec(_))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Template::parse("{{if .A}}open"),
            Err(TemplateError::Parse { .. })
        ));
        assert!(matches!(
            Template::parse("stray {{end}}"),
            Err(TemplateError::Parse { .. })
        ));
        assert!(matches!(
            Template::parse("{{.A"),
            Err(TemplateError::Parse { offset: 0, .. })
        ));
        assert!(matches!(
            Template::parse("{{.A | nosuch}}"),
            Err(TemplateError::UnknownFunction { .. })
        ));
        assert!(matches!(
            Template::parse("{{.A | .B}}"),
            Err(TemplateError::Parse { .. })
        ));
    }

    #[test]
    fn test_printf_missing_argument() {
        let tpl = Template::parse(r#"{{printf "%s %s" .A}}"#).unwrap();
        assert!(tpl.render(&json!({"A": "x"})).is_err());
    }

    #[test]
    fn test_printf_width_out_of_range() {
        for format in ["%99999999999999999999999s", "%999999999999s", "%-1025s"] {
            let tpl = Template::parse(&format!(r#"{{{{printf "{format}" "x"}}}}"#)).unwrap();
            assert!(
                matches!(tpl.render(&json!({})), Err(TemplateError::Exec(_))),
                "{format}"
            );
        }
    }

    #[test]
    fn test_printf_width_at_limit() {
        let tpl = Template::parse(r#"{{printf "%1024s" "x"}}"#).unwrap();
        assert_eq!(tpl.render(&json!({})).unwrap().len(), 1024);
    }

    #[test]
    fn test_pad_rejects_bad_widths() {
        for width in ["-1", "4096", "99999999999999"] {
            let tpl = Template::parse(&format!("{{{{.A | pad {width}}}}}")).unwrap();
            assert!(
                matches!(tpl.render(&json!({"A": "x"})), Err(TemplateError::Exec(_))),
                "{width}"
            );
        }
        let tpl = Template::parse(r#"{{.A | pad "wide"}}"#).unwrap();
        assert!(matches!(
            tpl.render(&json!({"A": "x"})),
            Err(TemplateError::Exec(_))
        ));
    }

    #[test]
    fn test_source_is_kept() {
        let tpl = Template::parse("{{.A}}").unwrap();
        assert_eq!(tpl.source(), "{{.A}}");
    }
}
