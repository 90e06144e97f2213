//! CLI channel: stdin/stdout REPL for local testing.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use uuid::Uuid;

use crate::channels::{Activity, ActivityType, ChannelAccount};
use crate::dialog::Bot;
use crate::error::ChannelError;

const CLI_USER: &str = "local-user";

/// A REPL that talks to the bot as a single local user.
pub struct CliChannel {
    bot: Arc<Bot>,
    bot_id: String,
    conversation_id: String,
}

impl CliChannel {
    pub fn new(bot: Arc<Bot>, bot_id: impl Into<String>) -> Self {
        Self {
            bot,
            bot_id: bot_id.into(),
            conversation_id: format!("cli-{}", Uuid::new_v4()),
        }
    }

    /// Run against the process's stdin and stdout until EOF or `/quit`.
    pub async fn run(&self) -> Result<(), ChannelError> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.run_with(stdin, stdout).await
    }

    /// Run against any line source and sink.
    pub async fn run_with<R, W>(&self, reader: R, mut out: W) -> Result<(), ChannelError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let joined = Activity::conversation_update(
            &self.conversation_id,
            CLI_USER,
            &self.bot_id,
            vec![ChannelAccount::new(&self.bot_id)],
        );
        self.exchange(&joined, &mut out).await?;

        let mut lines = reader.lines();
        loop {
            out.write_all(b"> ").await?;
            out.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "/quit" {
                break;
            }

            let message = Activity::message(&self.conversation_id, CLI_USER, &self.bot_id, line);
            self.exchange(&message, &mut out).await?;
        }
        out.flush().await?;
        Ok(())
    }

    async fn exchange<W>(&self, activity: &Activity, out: &mut W) -> Result<(), ChannelError>
    where
        W: AsyncWrite + Unpin,
    {
        match self.bot.process(activity).await {
            Ok(replies) => {
                for reply in &replies {
                    out.write_all(render_reply(reply).as_bytes()).await?;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Turn failed");
                out.write_all(format!("(error: {e})\n").as_bytes()).await?;
            }
        }
        Ok(())
    }
}

/// Plain-text rendering of an outbound activity.
pub fn render_reply(reply: &Activity) -> String {
    if reply.kind == ActivityType::EndOfConversation {
        return "(conversation ended)\n".to_string();
    }

    let mut out = String::new();
    if !reply.text().is_empty() {
        out.push_str(reply.text());
        out.push('\n');
    }
    for attachment in &reply.attachments {
        out.push_str(&attachment.to_plain_text());
        out.push('\n');
    }
    if let Some(suggested) = &reply.suggested_actions {
        let buttons: Vec<String> = suggested
            .actions
            .iter()
            .map(|a| format!("[{}]", a.title))
            .collect();
        out.push_str(&buttons.join(" "));
        out.push('\n');
    }
    out
}
