use std::path::Path;

use serde::de::DeserializeOwned;

/// Structured document formats accepted for root configs and fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
	Yaml,
	Json,
	Toml,
}

impl DocumentFormat {
	/// Pick the format from a file extension. Anything that is not `json` or
	/// `toml` is read as YAML, which is the native format for project files.
	pub fn from_path(path: &Path) -> Self {
		let extension = path
			.extension()
			.and_then(|e| e.to_str())
			.unwrap_or("")
			.to_ascii_lowercase();

		match extension.as_str() {
			"json" => Self::Json,
			"toml" => Self::Toml,
			_ => Self::Yaml,
		}
	}

	/// Deserialize `content` in this format. The error is returned as a plain
	/// message so callers can wrap it in the variant that fits the document.
	pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, String> {
		match self {
			Self::Yaml => serde_yaml_ng::from_str(content).map_err(|e| e.to_string()),
			Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
			Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
		}
	}
}
