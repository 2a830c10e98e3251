use crate::app::AppContext;
use crate::cli::{NotifyCommand, NotifySetArgs};
use crate::output::print_notification_settings;

pub fn handle(ctx: &AppContext, command: &NotifyCommand) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    let user = ctx.login(&service)?;

    match command {
        NotifyCommand::Show(args) => {
            let settings = service.notification_settings(&user.id)?;
            print_notification_settings(&settings, args.json)
        }
        NotifyCommand::Set(args) => {
            let mut settings = service.notification_settings(&user.id)?;
            apply_changes(&mut settings, args);
            service.save_notification_settings(&settings)?;
            if !ctx.quiet() {
                println!("Notification settings saved");
            }
            Ok(())
        }
    }
}

fn apply_changes(settings: &mut diary_core::storage::NotificationSettings, args: &NotifySetArgs) {
    if let Some(enabled) = args.email_enabled {
        settings.email_enabled = enabled;
    }
    if let Some(ref value) = args.email_address {
        settings.email_address = Some(value.clone());
    }
    if let Some(enabled) = args.wecom_enabled {
        settings.wecom_enabled = enabled;
    }
    if let Some(ref value) = args.wecom_webhook_url {
        settings.wecom_webhook_url = Some(value.clone());
    }
    if let Some(enabled) = args.dingtalk_enabled {
        settings.dingtalk_enabled = enabled;
    }
    if let Some(ref value) = args.dingtalk_webhook_url {
        settings.dingtalk_webhook_url = Some(value.clone());
    }
    if let Some(enabled) = args.telegram_enabled {
        settings.telegram_enabled = enabled;
    }
    if let Some(ref value) = args.telegram_bot_token {
        settings.telegram_bot_token = Some(value.clone());
    }
    if let Some(ref value) = args.telegram_chat_id {
        settings.telegram_chat_id = Some(value.clone());
    }
}
