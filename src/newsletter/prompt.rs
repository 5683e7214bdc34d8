//! Fixed agent configuration: prompt, names, features and tools.

use serde_json::json;

use crate::platform::{EnvironmentFeature, EnvironmentSpec, FeatureKind};

pub const ENVIRONMENT_NAME: &str = "Newsletter Environment";
pub const AGENT_NAME: &str = "Newsletter Agent";

/// External search tool the agent may call.
pub const SEARCH_TOOL: &str = "perplexity_search";

/// Attempts the platform gets per tool call.
pub const TOOL_CALL_MAX_TRIES: u32 = 3;

pub const SYSTEM_PROMPT: &str = r#"Act like an experienced newsletter writer skilled in crafting engaging and informative content.
Use a perplexity search to find the most relevant and current information on Given Topic.
Your goal is to summarize the key insights and trends into a concise, well-structured newsletter that keeps readers informed and interested.
Include engaging headlines, clear sections, and a call to action.

Take a deep breath and work on this problem step-by-step."#;

/// Environment with tool calling, short-term memory and the search tool.
pub fn environment_spec() -> EnvironmentSpec {
    EnvironmentSpec {
        name: ENVIRONMENT_NAME.to_string(),
        features: vec![
            EnvironmentFeature {
                kind: FeatureKind::ToolCalling,
                config: json!({ "max_tries": TOOL_CALL_MAX_TRIES }),
                priority: 0,
            },
            EnvironmentFeature {
                kind: FeatureKind::ShortTermMemory,
                config: json!({}),
                priority: 0,
            },
        ],
        tools: vec![SEARCH_TOOL.to_string()],
    }
}
