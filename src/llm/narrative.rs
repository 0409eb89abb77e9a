use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::search::context::ContextRecord;

const MAX_SUMMARY_TOKENS: u32 = 350;

/// Generate a grounded narrative summary for the reranked results.
///
/// The system prompt pins the model to strict evidence mode: it may only
/// cite values present in the serialized context, which is the same
/// payload the hallucination guard later verifies against.
pub async fn generate_summary(
    client: &reqwest::Client,
    config: &LlmConfig,
    query: &str,
    context: &[ContextRecord],
    total_count: u64,
) -> Result<String> {
    let context_json =
        serde_json::to_string_pretty(context).context("Failed to serialize grounding context")?;
    let system_prompt = build_system_prompt(&context_json, context.len());
    let user_prompt = build_user_prompt(query, total_count);

    let messages = vec![
        ChatMessage {
            role: "system".to_string(),
            content: system_prompt,
        },
        ChatMessage {
            role: "user".to_string(),
            content: user_prompt,
        },
    ];

    match config.provider.as_str() {
        "ollama" => call_ollama(client, config, messages).await,
        "openai" => call_openai(client, config, messages).await,
        other => anyhow::bail!("Unknown LLM provider: {other}"),
    }
}

fn build_system_prompt(context_json: &str, context_len: usize) -> String {
    format!(
        "You are a domain-restricted real estate assistant operating in STRICT EVIDENCE MODE.\n\
         The retrieved property context below has been filtered, merged, and re-ranked.\n\
         \n\
         NON-NEGOTIABLE RULES:\n\
         1. Answer ONLY using the RETRIEVED CONTEXT provided in this prompt.\n\
         2. Do NOT use your training knowledge.\n\
         3. Do NOT infer, estimate, or extrapolate any values.\n\
         4. Do NOT fabricate prices, areas, or property counts.\n\
         5. Every numeric claim MUST match a field in the context exactly.\n\
         6. If the context lacks information, say exactly: \
         'The provided documents do not contain sufficient information to answer this.'\n\
         7. Separate each property clearly using its property ID.\n\
         8. Do NOT use phrases like 'typically', 'in general', 'it is likely'.\n\
         \n\
         FORMAT:\n\
         - Bullet points for features.\n\
         - Structured summary per property: Property ID | Location | Price | Key Features.\n\
         - Maximum five sentences total. Be concise and precise.\n\
         \n\
         RETRIEVED CONTEXT (top-{context_len} re-ranked results):\n\
         {context_json}"
    )
}

fn build_user_prompt(query: &str, total_count: u64) -> String {
    let query = sanitize_for_prompt(query);
    format!(
        "User Query: {query}\n\
         Total matching properties in database: {total_count}\n\
         Answer strictly from the retrieved context above."
    )
}

/// Strip ChatML control tokens so user text cannot escape its message.
pub fn sanitize_for_prompt(text: &str) -> String {
    text.replace("<|im_start|>", "").replace("<|im_end|>", "")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
}

async fn call_ollama(
    client: &reqwest::Client,
    config: &LlmConfig,
    messages: Vec<ChatMessage>,
) -> Result<String> {
    let url = format!("{}/api/chat", config.base_url);

    let req = OllamaChatRequest {
        model: config.chat_model.clone(),
        messages,
        stream: false,
    };

    let resp = client
        .post(&url)
        .json(&req)
        .send()
        .await
        .context("Failed to call Ollama chat API for summary")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Ollama chat API returned {status}: {body}");
    }

    let body: OllamaChatResponse = resp.json().await?;
    Ok(body.message.content)
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: String,
}

async fn call_openai(
    client: &reqwest::Client,
    config: &LlmConfig,
    messages: Vec<ChatMessage>,
) -> Result<String> {
    let url = format!("{}/v1/chat/completions", config.base_url);
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let req = OpenAiChatRequest {
        model: config.chat_model.clone(),
        messages,
        // Deterministic summaries: no creative headroom for numbers
        temperature: 0.0,
        max_tokens: MAX_SUMMARY_TOKENS,
    };

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&req)
        .send()
        .await
        .context("Failed to call OpenAI chat API for summary")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("OpenAI chat API returned {status}: {body}");
    }

    let body: OpenAiChatResponse = resp.json().await?;
    Ok(body
        .choices
        .first()
        .map(|c| c.message.content.clone())
        .unwrap_or_default())
}
