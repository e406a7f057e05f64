//! System prompt templating and chat message construction.
//!
//! The full prompt text lives in one template file and is rendered from a
//! single code path with the captured shell context.

use crate::context::ShellContext;
use crate::types::ChatMessage;
use std::collections::BTreeMap;

const SYSTEM_PROMPT_TEMPLATE: &str = include_str!("templates/system_prompt.template");

/// Render the system prompt for one shell context.
pub fn render_system_prompt(ctx: &ShellContext) -> String {
    let mut vars = BTreeMap::<&str, &str>::new();
    vars.insert("CWD", &ctx.cwd);
    vars.insert("HOME", &ctx.home);
    vars.insert("USER", &ctx.user);
    vars.insert("SHELL", &ctx.shell);
    vars.insert("PATH", &ctx.path);
    render_template(SYSTEM_PROMPT_TEMPLATE, &vars)
        .trim_end()
        .to_string()
}

/// Build the message list for one generation request.
pub fn build_messages(ctx: &ShellContext, query: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(render_system_prompt(ctx)),
        ChatMessage::user(query),
    ]
}

fn render_template(template: &str, vars: &BTreeMap<&str, &str>) -> String {
    let mut rendered = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("{{{{{key}}}}}");
        rendered = rendered.replace(&placeholder, value);
    }
    rendered
}
