//! Reading the scene description.
//!
//! The text is split into **Statement**s by a [pest] grammar
//! (`scenefile.pest`). A statement is a keyword, its positional
//! arguments (strings and numbers, brackets are flattened) and its
//! typed parameters, already converted into a **ParamSet**:
//!
//! ```text
//! Volume "homogeneous" "spectrum sigma_a" [ 0.01 ] "float g" 0.9
//! Sensor "disk" "float radius" 2 "string name" "top"
//! ```
//!
//! [pest]: https://pest.rs

// others
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
// fluo
use crate::core::error::{FluoError, Result};
use crate::core::paramset::ParamSet;
use crate::core::pbrt::Float;

#[derive(Parser)]
#[grammar = "core/scenefile.pest"]
struct SceneParser;

#[derive(Debug, Default, Clone)]
pub struct Statement {
    pub keyword: String,
    /// quoted positional arguments, e.g. the type name
    pub strings: Vec<String>,
    /// numeric positional arguments, e.g. for `Translate`
    pub numbers: Vec<Float>,
    pub params: ParamSet,
    /// line the statement starts on
    pub line: usize,
}

impl Statement {
    /// The first positional string, usually the type name.
    pub fn name(&self) -> &str {
        self.strings.first().map(|s| s.as_str()).unwrap_or("")
    }
}

enum Value<'i> {
    Number(&'i str),
    Text(String),
}

fn text_of(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|text| text.as_str().to_string())
        .unwrap_or_default()
}

fn parse_error(line: usize, msg: String) -> FluoError {
    FluoError::Parse(format!("line {}: {}", line, msg))
}

fn to_float(s: &str, line: usize) -> Result<Float> {
    s.parse::<Float>()
        .map_err(|_| parse_error(line, format!("{:?} is not a number", s)))
}

/// Split a parameter's values into numbers or strings, whichever the
/// declared type needs.
fn numbers_of(values: &[Value], name: &str, line: usize) -> Result<Vec<Float>> {
    values
        .iter()
        .map(|v| match v {
            Value::Number(s) => to_float(s, line),
            Value::Text(s) => Err(parse_error(
                line,
                format!("parameter {:?} expects numbers, found {:?}", name, s),
            )),
        })
        .collect()
}

fn texts_of(values: &[Value], name: &str, line: usize) -> Result<Vec<String>> {
    values
        .iter()
        .map(|v| match v {
            Value::Text(s) => Ok(s.clone()),
            Value::Number(s) => Err(parse_error(
                line,
                format!("parameter {:?} expects strings, found {}", name, s),
            )),
        })
        .collect()
}

fn triples_of(values: &[Value], type_name: &str, name: &str, line: usize) -> Result<Vec<Float>> {
    let floats: Vec<Float> = numbers_of(values, name, line)?;
    if floats.is_empty() || floats.len() % 3 != 0 {
        return Err(parse_error(
            line,
            format!(
                "{} parameter {:?} needs a multiple of 3 values, found {}",
                type_name,
                name,
                floats.len()
            ),
        ));
    }
    Ok(floats)
}

fn add_parameter(params: &mut ParamSet, pair: Pair<Rule>, line: usize) -> Result<()> {
    let mut inner = pair.into_inner();
    let mut type_name: &str = "";
    let mut name: &str = "";
    if let Some(decl) = inner.next() {
        for part in decl.into_inner() {
            match part.as_rule() {
                Rule::param_type => type_name = part.as_str(),
                Rule::param_name => name = part.as_str(),
                _ => {}
            }
        }
    }
    let mut values: Vec<Value> = Vec::new();
    for value in inner {
        match value.as_rule() {
            Rule::number => values.push(Value::Number(value.as_str())),
            Rule::string => values.push(Value::Text(text_of(value))),
            Rule::list => {
                for item in value.into_inner() {
                    match item.as_rule() {
                        Rule::number => values.push(Value::Number(item.as_str())),
                        Rule::string => values.push(Value::Text(text_of(item))),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    match type_name {
        "integer" => {
            let ints: Vec<i32> = values
                .iter()
                .map(|v| match v {
                    Value::Number(s) => s.parse::<i32>().map_err(|_| {
                        parse_error(line, format!("parameter {:?} expects integers, found {}", name, s))
                    }),
                    Value::Text(s) => Err(parse_error(
                        line,
                        format!("parameter {:?} expects integers, found {:?}", name, s),
                    )),
                })
                .collect::<Result<Vec<i32>>>()?;
            params.add_ints(name, ints);
        }
        "float" => params.add_floats(name, numbers_of(&values, name, line)?),
        "point" | "point3" => params.add_point3fs(name, &triples_of(&values, type_name, name, line)?),
        "vector" | "vector3" => params.add_vector3fs(name, &triples_of(&values, type_name, name, line)?),
        "normal" | "normal3" => params.add_normal3fs(name, &triples_of(&values, type_name, name, line)?),
        "spectrum" => {
            let floats: Vec<Float> = numbers_of(&values, name, line)?;
            if floats.is_empty() {
                return Err(parse_error(line, format!("spectrum parameter {:?} has no values", name)));
            }
            params.add_spectrum(name, &floats);
        }
        "bool" => {
            let bools: Vec<bool> = texts_of(&values, name, line)?
                .iter()
                .map(|s| match s.as_str() {
                    "true" => Ok(true),
                    "false" => Ok(false),
                    _ => Err(parse_error(
                        line,
                        format!("bool parameter {:?} must be \"true\" or \"false\", found {:?}", name, s),
                    )),
                })
                .collect::<Result<Vec<bool>>>()?;
            params.add_bools(name, bools);
        }
        "string" => params.add_strings(name, texts_of(&values, name, line)?),
        _ => {
            return Err(parse_error(line, format!("unknown parameter type {:?}", type_name)));
        }
    }
    Ok(())
}

fn extract_statement(pair: Pair<Rule>) -> Result<Statement> {
    let (line, _column) = pair.as_span().start_pos().line_col();
    let mut statement: Statement = Statement {
        line,
        ..Default::default()
    };
    for inner_pair in pair.into_inner() {
        match inner_pair.as_rule() {
            Rule::keyword => statement.keyword = inner_pair.as_str().to_string(),
            Rule::string => statement.strings.push(text_of(inner_pair)),
            Rule::number => statement.numbers.push(to_float(inner_pair.as_str(), line)?),
            Rule::list => {
                for item in inner_pair.into_inner() {
                    match item.as_rule() {
                        Rule::number => statement.numbers.push(to_float(item.as_str(), line)?),
                        Rule::string => statement.strings.push(text_of(item)),
                        _ => {}
                    }
                }
            }
            Rule::parameter => add_parameter(&mut statement.params, inner_pair, line)?,
            _ => {}
        }
    }
    Ok(statement)
}

/// Split a whole scene description into statements.
pub fn parse_scene(input: &str) -> Result<Vec<Statement>> {
    let scene = SceneParser::parse(Rule::scene, input)
        .map_err(|e| FluoError::Parse(e.to_string()))?
        .next()
        .ok_or_else(|| FluoError::Parse("empty scene description".to_string()))?;
    let mut statements: Vec<Statement> = Vec::new();
    for pair in scene.into_inner() {
        if pair.as_rule() == Rule::statement {
            statements.push(extract_statement(pair)?);
        }
    }
    Ok(statements)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::geometry::Point3f;
    use crate::core::pbrt::Spectrum;

    #[test]
    fn statements_and_parameters() {
        let input = r#"
# camera looking down the z axis
LookAt 0 0 -10  0 0 0   0 1 0
Translate 1 2.5 -3e-1
Volume "tissuelayer" "point p0" [ -5 -5 0 ] "point p1" [5 5 10]
    "spectrum sigma_a_ex" 0.5 "float g_ex" 0.9 # trailing comment
Sensor "disk" "string name" "top" "integer xresolution" [ 32 ]
    "bool records" "true"
WorldEnd
"#;
        let statements = parse_scene(input).unwrap();
        let keywords: Vec<&str> = statements.iter().map(|s| s.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["LookAt", "Translate", "Volume", "Sensor", "WorldEnd"]);
        assert_eq!(statements[0].numbers.len(), 9);
        assert_eq!(statements[0].line, 3);
        assert_eq!(statements[1].numbers, vec![1.0, 2.5, -0.3]);
        let volume = &statements[2];
        assert_eq!(volume.name(), "tissuelayer");
        assert_eq!(
            volume.params.find_one_point3f("p1", Point3f::default()),
            Point3f::new(5.0, 5.0, 10.0)
        );
        assert_eq!(
            volume.params.find_one_spectrum("sigma_a_ex", Spectrum::new(0.0)),
            Spectrum::new(0.5)
        );
        assert_eq!(volume.params.find_one_float("g_ex", 0.0), 0.9);
        let sensor = &statements[3];
        assert_eq!(sensor.params.find_one_string("name", ""), "top");
        assert_eq!(sensor.params.find_one_int("xresolution", 0), 32);
        assert!(sensor.params.find_one_bool("records", false));
        assert!(statements[4].strings.is_empty());
    }

    #[test]
    fn type_mismatches_are_errors() {
        assert!(matches!(
            parse_scene("Volume \"homogeneous\" \"float g\" \"high\""),
            Err(FluoError::Parse(_))
        ));
        assert!(matches!(
            parse_scene("Integrator \"mcfee\" \"integer numberphotons\" 1.5"),
            Err(FluoError::Parse(_))
        ));
        assert!(matches!(
            parse_scene("LightSource \"laser\" \"point from\" [ 0 0 ]"),
            Err(FluoError::Parse(_))
        ));
        assert!(matches!(
            parse_scene("Shape \"bead\" \"bool visible\" \"maybe\""),
            Err(FluoError::Parse(_))
        ));
        // not a statement at all
        assert!(matches!(parse_scene("translate 1 2 3"), Err(FluoError::Parse(_))));
    }

    #[test]
    fn empty_input() {
        assert!(parse_scene("").unwrap().is_empty());
        assert!(parse_scene("# nothing but a comment\n\n").unwrap().is_empty());
    }
}
