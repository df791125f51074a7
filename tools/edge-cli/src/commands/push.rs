//! Push payload preview.

use anyhow::Result;
use edge_worker::{PushMessage, PushPayload};

use super::PushArgs;
use crate::context::Context;

/// Run the push command.
pub async fn run(args: PushArgs, ctx: &Context) -> Result<()> {
    let message = match args.payload {
        Some(payload) => PushMessage::new(payload),
        None => PushMessage::empty(),
    };
    let payload = message.payload();
    let notification = payload.to_notification(&ctx.config.push);

    if ctx.output.is_json() {
        ctx.output.json(&notification);
        return Ok(());
    }

    if matches!(payload, PushPayload::PlainText(_)) {
        ctx.output
            .warn("Payload is not a JSON object with string fields; showing it as plain text");
    }

    ctx.output.header("Notification");
    ctx.output.kv("Title", &notification.title);
    ctx.output.kv("Body", &notification.body);
    ctx.output.kv("Opens", &notification.data.url);
    ctx.output.kv("Icon", &notification.icon);
    ctx.output.kv("Badge", &notification.badge);
    ctx.output.kv("Vibrate", &format!("{:?}", notification.vibrate));
    Ok(())
}
