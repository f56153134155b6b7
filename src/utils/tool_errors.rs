use crate::constants::limits::MAX_SUGGESTIONS;
use crate::errors::ToolError;
use crate::utils::suggest::suggest;

pub fn unknown_tool_error(tool: &str, known_tools: &[&str]) -> ToolError {
    let suggestions = suggest(tool, known_tools, MAX_SUGGESTIONS);
    let mut hint = format!("Use one of: {}.", known_tools.join(", "));
    if !suggestions.is_empty() {
        hint = format!("Did you mean: {}? {}", suggestions.join(", "), hint);
    }
    ToolError::not_found(format!("Unknown tool: {}", tool))
        .with_hint(hint)
        .with_details(serde_json::json!({
            "known_tools": known_tools,
            "did_you_mean": suggestions,
        }))
}
