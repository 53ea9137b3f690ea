//! The single HTML page served at `/`.

use crate::presets::PresetSummary;
use crate::utils::escape_html;

#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub prompt: String,
    pub schema: String,
    pub model: String,
    pub video_input: String,
    pub presets: Vec<PresetSummary>,
    pub default_preset_id: String,
    pub result_json: Option<String>,
    pub error: Option<String>,
}

const SCRIPT: &str = r#"
const select = document.getElementById("preset");
if (select) {
  select.addEventListener("change", async () => {
    if (!select.value) return;
    const res = await fetch(`/api/presets/${encodeURIComponent(select.value)}`);
    if (!res.ok) return;
    const preset = await res.json();
    if (typeof preset.prompt === "string") document.getElementById("prompt").value = preset.prompt;
    document.getElementById("schema_json").value = JSON.stringify(preset.schema, null, 2);
  });
}
"#;

pub fn render(ctx: &PageContext) -> String {
    let options: String = ctx
        .presets
        .iter()
        .map(|p| {
            let selected = if p.id == ctx.default_preset_id { " selected" } else { "" };
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                escape_html(&p.id),
                selected,
                escape_html(&p.name)
            )
        })
        .collect();

    let error = ctx
        .error
        .as_deref()
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape_html(e)))
        .unwrap_or_default();

    let result = ctx
        .result_json
        .as_deref()
        .map(|r| format!("<h2>Result</h2>\n<pre>{}</pre>", escape_html(r)))
        .unwrap_or_default();

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>YouTube Summarize</title>
<style>
body {{ font-family: sans-serif; max-width: 60rem; margin: 2rem auto; }}
textarea, input, select {{ width: 100%; box-sizing: border-box; }}
.error {{ color: #b00020; }}
pre {{ background: #f4f4f4; padding: 1rem; overflow-x: auto; }}
</style>
</head>
<body>
<h1>YouTube Summarize</h1>
{error}
<form method="post" action="/summarize">
<label for="video_input">YouTube URL or video id</label>
<input id="video_input" name="video_input" value="{video_input}" required>
<label for="preset">Preset</label>
<select id="preset"><option value="">(custom)</option>{options}</select>
<label for="prompt">Prompt</label>
<textarea id="prompt" name="prompt" rows="8">{prompt}</textarea>
<label for="schema_json">JSON Schema</label>
<textarea id="schema_json" name="schema_json" rows="14">{schema}</textarea>
<label for="model">Model</label>
<input id="model" name="model" value="{model}">
<button type="submit">Summarize</button>
</form>
{result}
<script>{script}</script>
</body>
</html>
"#,
        error = error,
        video_input = escape_html(&ctx.video_input),
        options = options,
        prompt = escape_html(&ctx.prompt),
        schema = escape_html(&ctx.schema),
        model = escape_html(&ctx.model),
        result = result,
        script = SCRIPT,
    )
}
