//! HTML views rendered with Handlebars. Everything interpolated with
//! `{{...}}` is HTML escaped, which matters here since both user
//! input and model output end up on the page.

use std::fmt;

use anyhow::Result;
use handlebars::Handlebars;
use serde_json::json;

use crate::chat::Transcript;

#[derive(Debug)]
pub enum View {
    ChatIndex,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const CHAT_INDEX_VIEW: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Chat</title>
<style>
body { font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }
.message { padding: 0.5rem 0.75rem; margin: 0.5rem 0; border-radius: 0.5rem; white-space: pre-wrap; }
.message.user { background: #e8f0fe; }
.message.assistant { background: #f1f3f4; }
.role { font-weight: bold; display: block; margin-bottom: 0.25rem; }
form { display: flex; gap: 0.5rem; margin-top: 1rem; }
textarea { flex: 1; }
</style>
</head>
<body>
<h1>Chat</h1>
<p>Deployment: {{deployment}}</p>
<div id="transcript">
{{#each messages}}
<div class="message {{role}}"><span class="role">{{role}}</span>{{content}}</div>
{{else}}
<p class="empty">No messages yet.</p>
{{/each}}
</div>
<form method="post" action="/chat/send">
<textarea name="user_message" rows="3" placeholder="Type a message"></textarea>
<button type="submit">Send</button>
</form>
<form method="post" action="/chat/clear">
<button type="submit">Clear</button>
</form>
</body>
</html>
"#;

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry
        .register_template_string(&View::ChatIndex.to_string(), CHAT_INDEX_VIEW)
        .expect("Failed to register template");
    registry
}

/// Render the chat page for a transcript
pub fn render_chat_index(
    registry: &Handlebars,
    deployment: &str,
    transcript: &Transcript,
) -> Result<String> {
    let html = registry.render(
        &View::ChatIndex.to_string(),
        &json!({
            "deployment": deployment,
            "messages": transcript,
        }),
    )?;
    Ok(html)
}
