//! Quote source: a one-shot fetch of display strings from a published sheet.
//!
//! The sheet endpoint answers with a JavaScript callback wrapper around a
//! JSON table; the first column of every row is the quote text. Failures are
//! returned as [`QuoteError`] and the caller keeps an empty quote list.

use fastrand::Rng;
use serde::Deserialize;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

const RESPONSE_WRAPPER: &str = "google.visualization.Query.setResponse(";

/// Errors from loading quotes.
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
	/// The request could not be made or completed.
	#[error("fetch failed: {0}")]
	Fetch(String),

	/// The source answered with a non-success status.
	#[error("quote source answered with status {0}")]
	Status(u16),

	/// The body was not a readable sheet response.
	#[error("malformed quote response: {0}")]
	Malformed(String),
}

impl QuoteError {
	fn from_js(value: JsValue) -> Self {
		QuoteError::Fetch(format!("{value:?}"))
	}
}

impl From<serde_json::Error> for QuoteError {
	fn from(err: serde_json::Error) -> Self {
		QuoteError::Malformed(err.to_string())
	}
}

/// Identifies a sheet tab holding quotes in its first column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuoteSource {
	/// Spreadsheet identifier.
	pub sheet_id: String,
	/// Sheet tab name.
	pub sheet_name: String,
}

impl QuoteSource {
	/// Query URL for the sheet tab.
	pub fn url(&self) -> String {
		format!(
			"https://docs.google.com/spreadsheets/d/{}/gviz/tq?sheet={}",
			self.sheet_id,
			urlencoding::encode(&self.sheet_name)
		)
	}
}

#[derive(Deserialize)]
struct GvizResponse {
	table: GvizTable,
}

#[derive(Deserialize)]
struct GvizTable {
	#[serde(default)]
	rows: Vec<GvizRow>,
}

#[derive(Deserialize)]
struct GvizRow {
	#[serde(default)]
	c: Vec<Option<GvizCell>>,
}

#[derive(Deserialize)]
struct GvizCell {
	#[serde(default)]
	v: Value,
	/// Display form of the value, present for numbers and dates.
	#[serde(default)]
	f: Option<String>,
}

impl GvizCell {
	fn into_text(self) -> Option<String> {
		let text = match self.v {
			Value::String(s) => s,
			Value::Number(n) => match self.f {
				Some(formatted) => formatted,
				None => match n.as_f64() {
					Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
					_ => n.to_string(),
				},
			},
			_ => return None,
		};
		(!text.is_empty()).then_some(text)
	}
}

/// Extract first-column quotes from a wrapped sheet response.
///
/// Null cells, null values and empty strings are skipped.
pub fn parse_gviz(body: &str) -> Result<Vec<String>, QuoteError> {
	let start = body
		.find(RESPONSE_WRAPPER)
		.map(|i| i + RESPONSE_WRAPPER.len())
		.ok_or_else(|| QuoteError::Malformed("missing response wrapper".into()))?;
	let end = body
		.rfind(')')
		.filter(|&end| end >= start)
		.ok_or_else(|| QuoteError::Malformed("unterminated response wrapper".into()))?;

	let response: GvizResponse = serde_json::from_str(&body[start..end])?;
	Ok(response
		.table
		.rows
		.into_iter()
		.filter_map(|row| row.c.into_iter().next().flatten())
		.filter_map(GvizCell::into_text)
		.collect())
}

/// Fetch and parse the quotes of `source`.
pub async fn fetch_quotes(source: &QuoteSource) -> Result<Vec<String>, QuoteError> {
	let window = web_sys::window().ok_or_else(|| QuoteError::Fetch("no window".into()))?;
	let response: Response = JsFuture::from(window.fetch_with_str(&source.url()))
		.await
		.map_err(QuoteError::from_js)?
		.dyn_into()
		.map_err(QuoteError::from_js)?;
	if !response.ok() {
		return Err(QuoteError::Status(response.status()));
	}

	let body = JsFuture::from(response.text().map_err(QuoteError::from_js)?)
		.await
		.map_err(QuoteError::from_js)?
		.as_string()
		.ok_or_else(|| QuoteError::Malformed("response body is not text".into()))?;
	parse_gviz(&body)
}

/// The loaded quotes. Empty until the fetch resolves, or forever if it fails.
#[derive(Clone, Debug, Default)]
pub struct QuoteBook {
	quotes: Vec<String>,
}

impl QuoteBook {
	/// Book of `quotes`, dropping blank entries.
	pub fn new(quotes: Vec<String>) -> Self {
		let quotes = quotes.into_iter().filter(|q| !q.trim().is_empty()).collect();
		Self { quotes }
	}

	/// Number of quotes.
	pub fn len(&self) -> usize {
		self.quotes.len()
	}

	/// True until quotes have loaded.
	pub fn is_empty(&self) -> bool {
		self.quotes.is_empty()
	}

	/// Pick one quote uniformly at random.
	pub fn random(&self, rng: &mut Rng) -> Option<&str> {
		if self.quotes.is_empty() {
			return None;
		}
		let index = rng.usize(..self.quotes.len());
		self.quotes.get(index).map(String::as_str)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const BODY: &str = r#"/*O_o*/
google.visualization.Query.setResponse({"version":"0.6","reqId":"0","status":"ok","table":{"cols":[{"id":"A","label":"","type":"string"}],"rows":[{"c":[{"v":"Stay hungry"}]},{"c":[null]},{"c":[{"v":""}]},{"c":[{"v":null}]},{"c":[{"v":42.0,"f":"42"}]},{"c":[]},{"c":[{"v":"Stay foolish (really)"},{"v":"ignored"}]}]}});"#;

	#[test]
	fn test_parse_keeps_first_column_text() {
		let quotes = parse_gviz(BODY).unwrap();
		assert_eq!(quotes, vec!["Stay hungry", "42", "Stay foolish (really)"]);
	}

	#[test]
	fn test_parse_numeric_cells() {
		let body = r#"google.visualization.Query.setResponse({"table":{"rows":[{"c":[{"v":42.0}]},{"c":[{"v":2.5}]},{"c":[{"v":1000.0,"f":"1,000"}]},{"c":[{"v":7,"f":""}]}]}});"#;
		assert_eq!(parse_gviz(body).unwrap(), vec!["42", "2.5", "1,000"]);
	}

	#[test]
	fn test_source_url_encodes_sheet_name() {
		let source = QuoteSource {
			sheet_id: "abc123".into(),
			sheet_name: "Quotes & Sayings".into(),
		};
		assert_eq!(
			source.url(),
			"https://docs.google.com/spreadsheets/d/abc123/gviz/tq?sheet=Quotes%20%26%20Sayings"
		);
	}

	#[test]
	fn test_parse_rejects_missing_wrapper() {
		assert!(matches!(
			parse_gviz(r#"{"table":{"rows":[]}}"#),
			Err(QuoteError::Malformed(_))
		));
	}

	#[test]
	fn test_parse_rejects_bad_json() {
		let body = "google.visualization.Query.setResponse({\"status\":\"error\"});";
		assert!(matches!(parse_gviz(body), Err(QuoteError::Malformed(_))));
	}

	#[test]
	fn test_parse_empty_table() {
		let body = "google.visualization.Query.setResponse({\"table\":{}});";
		assert!(parse_gviz(body).unwrap().is_empty());
	}

	#[test]
	fn test_empty_book_has_no_quote() {
		let mut rng = Rng::with_seed(1);
		let book = QuoteBook::default();
		assert!(book.is_empty());
		assert_eq!(book.random(&mut rng), None);
	}

	#[test]
	fn test_random_quote_comes_from_book() {
		let mut rng = Rng::with_seed(1);
		let book = QuoteBook::new(vec!["one".into(), "  ".into(), "two".into()]);
		assert_eq!(book.len(), 2);
		let mut seen = [false; 2];
		for _ in 0..100 {
			match book.random(&mut rng) {
				Some("one") => seen[0] = true,
				Some("two") => seen[1] = true,
				other => panic!("unexpected quote {other:?}"),
			}
		}
		assert!(seen.iter().all(|&s| s));
	}
}
