use diary_core::storage::{DiaryFilter, DiaryUpdate, NewDiary};

use crate::app::AppContext;
use crate::cli::{DiaryAddArgs, DiaryCommand, DiaryEditArgs, DiaryListArgs, DiaryShowArgs, IdArgs};
use crate::helpers::{parse_datetime, parse_id, parse_range_end, read_body};
use crate::output::{print_diary, print_diary_list, print_stats};

pub fn handle(ctx: &AppContext, command: &DiaryCommand) -> anyhow::Result<()> {
    match command {
        DiaryCommand::Add(args) => handle_add(ctx, args),
        DiaryCommand::List(args) => handle_list(ctx, args),
        DiaryCommand::Show(args) => handle_show(ctx, args),
        DiaryCommand::Edit(args) => handle_edit(ctx, args),
        DiaryCommand::Delete(args) => handle_delete(ctx, args),
        DiaryCommand::Stats(args) => {
            let service = ctx.open_service()?;
            let user = ctx.login(&service)?;
            let stats = service.diary_stats(&user.id)?;
            print_stats(&stats, args.json)
        }
    }
}

fn handle_add(ctx: &AppContext, args: &DiaryAddArgs) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    let user = ctx.login(&service)?;

    let mut new_diary = NewDiary::new(read_body(args.body.clone())?).encrypted(args.encrypt);
    if let Some(ref title) = args.title {
        new_diary = new_diary.with_title(title);
    }
    if let Some(ref date) = args.date {
        new_diary = new_diary.with_entry_date(parse_datetime(date)?);
    }
    if let Some(ref rating) = args.rating {
        new_diary = new_diary.with_rating(rating);
    }

    let diary = service.create_diary(&user.id, &new_diary)?;
    if ctx.quiet() {
        println!("{}", diary.id);
    } else {
        println!(
            "Added {}diary entry {}",
            if diary.is_encrypted { "encrypted " } else { "" },
            diary.id
        );
    }
    Ok(())
}

fn handle_list(ctx: &AppContext, args: &DiaryListArgs) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    let user = ctx.login(&service)?;

    let mut filter = DiaryFilter::new().skip(args.skip).limit(args.limit);
    if let Some(ref since) = args.since {
        filter = filter.since(parse_datetime(since)?);
    }
    if let Some(ref until) = args.until {
        filter = filter.until(parse_range_end(until)?);
    }

    let diaries = service.list_diaries(&user.id, &filter, args.decrypt)?;
    print_diary_list(&diaries, args.json, ctx.quiet())
}

fn handle_show(ctx: &AppContext, args: &DiaryShowArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id)?;
    let service = ctx.open_service()?;
    let user = ctx.login(&service)?;

    let diary = service.get_diary(&user.id, &id, args.decrypt)?;
    print_diary(&diary, args.json, ctx.quiet())
}

fn handle_edit(ctx: &AppContext, args: &DiaryEditArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id)?;

    let mut update = DiaryUpdate::new();
    if let Some(ref title) = args.title {
        update = update.title(title);
    }
    if let Some(ref body) = args.body {
        update = update.content(body);
    }
    if args.encrypt {
        update = update.encrypted(true);
    } else if args.no_encrypt {
        update = update.encrypted(false);
    }
    if let Some(ref date) = args.date {
        update = update.entry_date(parse_datetime(date)?);
    }
    if let Some(ref rating) = args.rating {
        update = update.rating(rating);
    }

    let service = ctx.open_service()?;
    let user = ctx.login(&service)?;
    let diary = service.update_diary(&user.id, &id, &update)?;

    if !ctx.quiet() {
        println!(
            "Updated diary entry {} (encrypted: {})",
            diary.id,
            if diary.is_encrypted { "yes" } else { "no" }
        );
    }
    Ok(())
}

fn handle_delete(ctx: &AppContext, args: &IdArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id)?;
    let service = ctx.open_service()?;
    let user = ctx.login(&service)?;

    service.delete_diary(&user.id, &id)?;
    if !ctx.quiet() {
        println!("Deleted diary entry {}", id);
    }
    Ok(())
}
