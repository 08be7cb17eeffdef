// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Common instruction appended to all analysis prompts.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Base every role, company and salary figure on current market data from \
    web searches and the search results provided. NEVER use synthetic or placeholder \
    information. If current data is not available for an item, say so instead of guessing.";
