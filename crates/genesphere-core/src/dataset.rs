use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::LoadError;

/// Weight assigned to tabular rows without a numeric third column.
pub const TABULAR_DEFAULT_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub val: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLink {
    #[serde(deserialize_with = "lenient_id")]
    pub source: String,
    #[serde(deserialize_with = "lenient_id")]
    pub target: String,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub score: Option<f64>,
}

/// The shape both input encodings produce.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub links: Vec<RawLink>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Structured,
    Tabular,
}

impl DatasetFormat {
    pub fn from_path(path: &Path) -> Self {
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::Structured
        } else {
            Self::Tabular
        }
    }
}

// Non-numeric values are treated as absent rather than rejecting the document.
fn lenient_number<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(de)?;
    Ok(value.and_then(|v| v.as_f64()))
}

// Numeric ids are keyed by their decimal text, so `7` and `"7"` name the same gene.
fn lenient_id<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(de)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) => f.to_string(),
            (None, None) => n.to_string(),
        }),
        other => Err(D::Error::custom(format!(
            "expected a string or number id, found {other}"
        ))),
    }
}

/// Longest numeric prefix of `raw`, so `"0.9x"` reads as 0.9 and `"high"` as nothing.
fn leading_number(raw: &str) -> Option<f64> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |mut at: usize| {
        while bytes.get(at).is_some_and(u8::is_ascii_digit) {
            at += 1;
        }
        at
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if frac_end > end + 1 {
            has_digits = true;
            end = frac_end;
        }
    }
    if !has_digits {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    text[..end].parse().ok()
}

impl Dataset {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn load_str(text: &str, format: DatasetFormat) -> Result<Dataset, LoadError> {
    match format {
        DatasetFormat::Structured => parse_structured(text),
        DatasetFormat::Tabular => parse_tabular(text),
    }
}

pub fn load_path(path: &Path) -> Result<Dataset, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_str(&text, DatasetFormat::from_path(path))
}

pub fn parse_structured(text: &str) -> Result<Dataset, LoadError> {
    let mut data: Dataset = serde_json::from_str(text)?;
    if data.nodes.is_empty() {
        return Err(LoadError::NoNodes);
    }
    for node in data.nodes.iter_mut() {
        if node.name.trim().is_empty() {
            node.name = node.id.clone();
        }
    }
    Ok(data)
}

fn is_header(first_line: &str) -> bool {
    let line = first_line.to_lowercase();
    line.contains("source") || line.contains("target") || line.matches("gene").count() >= 2
}

/// Parses tab-separated `source<TAB>target[<TAB>score]` rows.
///
/// Node order follows first appearance, so layouts are stable for a given file.
pub fn parse_tabular(text: &str) -> Result<Dataset, LoadError> {
    let mut lines = text.trim().lines().peekable();
    if lines.peek().map(|first| is_header(first)).unwrap_or(false) {
        lines.next();
    }

    let mut links = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut nodes = Vec::new();
    let mut add_node = |id: &str| {
        if seen.insert(id.to_string()) {
            nodes.push(RawNode {
                id: id.to_string(),
                name: id.to_string(),
                val: None,
            });
        }
    };

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split('\t').filter(|p| !p.is_empty()).collect();
        if parts.len() < 2 {
            continue;
        }
        let source = parts[0].trim();
        let target = parts[1].trim();
        if source.is_empty() || target.is_empty() {
            continue;
        }
        let score = parts
            .get(2)
            .and_then(|raw| leading_number(raw))
            .filter(|v| v.is_finite())
            .unwrap_or(TABULAR_DEFAULT_WEIGHT);

        add_node(source);
        add_node(target);
        links.push(RawLink {
            source: source.to_string(),
            target: target.to_string(),
            score: Some(score),
        });
    }

    if nodes.is_empty() {
        return Err(LoadError::NoNodes);
    }
    Ok(Dataset { nodes, links })
}

/// Synthetic ring-like network: every node links to its next 2..=5 neighbours.
pub fn demo(count: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let nodes = (0..count)
        .map(|i| RawNode {
            id: format!("id_{i}"),
            name: format!("Gene-{}", i + 1),
            val: Some(rng.gen::<f64>()),
        })
        .collect();

    let mut links = Vec::new();
    for i in 0..count {
        let neighbours = rng.gen_range(2..=5);
        for k in 0..neighbours {
            let target = (i + 1 + k) % count;
            links.push(RawLink {
                source: format!("id_{i}"),
                target: format!("id_{target}"),
                score: Some(rng.gen::<f64>()),
            });
        }
    }
    Dataset { nodes, links }
}
