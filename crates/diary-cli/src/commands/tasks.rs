use diary_core::storage::{NewTask, TaskFilter, TaskUpdate};

use crate::app::AppContext;
use crate::cli::{IdArgs, TaskAddArgs, TaskCommand, TaskEditArgs, TaskListArgs, TaskShowArgs};
use crate::helpers::{parse_id, parse_importance, parse_optional_datetime};
use crate::output::{print_task, print_task_list};

pub fn handle(ctx: &AppContext, command: &TaskCommand) -> anyhow::Result<()> {
    match command {
        TaskCommand::Add(args) => handle_add(ctx, args),
        TaskCommand::List(args) => handle_list(ctx, args),
        TaskCommand::Show(args) => handle_show(ctx, args),
        TaskCommand::Edit(args) => handle_edit(ctx, args),
        TaskCommand::Delete(args) => handle_delete(ctx, args),
    }
}

fn handle_add(ctx: &AppContext, args: &TaskAddArgs) -> anyhow::Result<()> {
    let mut new_task = NewTask::new(&args.title).with_importance(parse_importance(&args.importance)?);
    if let Some(ref description) = args.description {
        new_task = new_task.with_description(description);
    }
    if let Some(due) = parse_optional_datetime(args.due.as_deref())? {
        new_task = new_task.with_due_date(due);
    }
    if let Some(reminder) = parse_optional_datetime(args.reminder.as_deref())? {
        new_task = new_task.with_reminder(reminder);
    }

    let service = ctx.open_service()?;
    let user = ctx.login(&service)?;
    let task = service.create_task(&user.id, &new_task)?;

    if ctx.quiet() {
        println!("{}", task.id);
    } else {
        println!("Added task {}", task.id);
    }
    Ok(())
}

fn handle_list(ctx: &AppContext, args: &TaskListArgs) -> anyhow::Result<()> {
    let mut filter = TaskFilter::new().skip(args.skip).limit(args.limit);
    if args.done {
        filter = filter.completed(true);
    } else if args.open {
        filter = filter.completed(false);
    }
    if let Some(ref importance) = args.importance {
        filter = filter.importance(parse_importance(importance)?);
    }

    let service = ctx.open_service()?;
    let user = ctx.login(&service)?;
    let tasks = service.list_tasks(&user.id, &filter)?;
    print_task_list(&tasks, args.json, ctx.quiet())
}

fn handle_show(ctx: &AppContext, args: &TaskShowArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id)?;
    let service = ctx.open_service()?;
    let user = ctx.login(&service)?;
    let task = service.get_task(&user.id, &id)?;
    print_task(&task, args.json)
}

fn handle_edit(ctx: &AppContext, args: &TaskEditArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id)?;
    let update = TaskUpdate {
        title: args.title.clone(),
        description: args.description.clone(),
        importance: args.importance.as_deref().map(parse_importance).transpose()?,
        completed: if args.done {
            Some(true)
        } else if args.reopen {
            Some(false)
        } else {
            None
        },
        due_date: parse_optional_datetime(args.due.as_deref())?,
        reminder_time: parse_optional_datetime(args.reminder.as_deref())?,
    };

    let service = ctx.open_service()?;
    let user = ctx.login(&service)?;
    let task = service.update_task(&user.id, &id, &update)?;

    if !ctx.quiet() {
        println!("Updated task {}", task.id);
    }
    Ok(())
}

fn handle_delete(ctx: &AppContext, args: &IdArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id)?;
    let service = ctx.open_service()?;
    let user = ctx.login(&service)?;

    service.delete_task(&user.id, &id)?;
    if !ctx.quiet() {
        println!("Deleted task {}", id);
    }
    Ok(())
}
