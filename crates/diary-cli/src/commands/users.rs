use crate::app::AppContext;
use crate::cli::RegisterArgs;
use crate::helpers::prompt_new_password;

pub fn handle_register(ctx: &AppContext, args: &RegisterArgs) -> anyhow::Result<()> {
    let username = ctx.username()?;
    let service = ctx.open_service()?;
    let password = prompt_new_password()?;

    let user = service.register(username, &password, args.email.as_deref())?;

    if !ctx.quiet() {
        println!("Registered {} ({})", user.username, user.id);
    } else {
        println!("{}", user.id);
    }
    Ok(())
}
