mod init;
pub use init::cmd_init;

use std::error::Error;
use std::path::PathBuf;

use crate::auth::{LocalSession, Session};
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::compose::Composer;
use crate::io::config_io;
use crate::model::{CommentWithAuthor, Config, TagFilter, TagScope, TaskFlag};
use crate::ops::submit::{Posted, SubmitError, post_from_composer};
use crate::ops::tag_ops::{self, TagEdit};
use crate::ops::topic_ops::{self, TopicEdit};
use crate::ops::{search, task_ops};
use crate::store::{FileStore, Store};
use crate::util::unicode::{byte_to_char_offset, char_to_byte_offset};

type CmdResult = Result<(), Box<dyn Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let dir = cli.dir.as_deref();

    match cli.command {
        // Init runs before workspace discovery
        Commands::Init(args) => cmd_init(args, dir),

        Commands::Topic(cmd) => cmd_topic(cmd, &mut open_workspace(dir)?, json),

        Commands::Post(args) => cmd_post(args, &mut open_workspace(dir)?, json),
        Commands::Tasks(args) => cmd_tasks(args, &open_workspace(dir)?, json),
        Commands::Show(args) => cmd_show(args, &open_workspace(dir)?, json),
        Commands::Comment(args) => cmd_comment(args, &mut open_workspace(dir)?, json),
        Commands::Edit(args) => cmd_edit(args, &mut open_workspace(dir)?, json),
        Commands::Toggle(args) => cmd_toggle(args, &mut open_workspace(dir)?, json),
        Commands::Rm(args) => cmd_rm(args, &mut open_workspace(dir)?),

        Commands::Tags(args) => cmd_tags(args, &open_workspace(dir)?, json),
        Commands::Tag(cmd) => cmd_tag(cmd, &mut open_workspace(dir)?, json),

        Commands::Suggest(args) => cmd_suggest(args, &open_workspace(dir)?, json),
        Commands::Complete(args) => cmd_complete(args, &open_workspace(dir)?, json),
        Commands::Search(args) => cmd_search(args, &open_workspace(dir)?, json),
        Commands::Ongoing => cmd_ongoing(&open_workspace(dir)?, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Loaded config, store and session for one command
struct Workspace {
    config: Config,
    store: FileStore,
    session: LocalSession,
}

impl Workspace {
    fn user(&self) -> Result<String, SubmitError> {
        self.session
            .current_user_id()
            .map(String::from)
            .ok_or(SubmitError::NotSignedIn)
    }

    fn preview_chars(&self) -> usize {
        self.config.display.preview_chars
    }
}

fn open_workspace(dir: Option<&str>) -> Result<Workspace, Box<dyn Error>> {
    let start = match dir {
        Some(d) => std::fs::canonicalize(d)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", d, e))?,
        None => std::env::current_dir()?,
    };
    let root: PathBuf = config_io::discover_root(&start)?;
    let config = config_io::load_config(&root)?;
    let store = FileStore::open(&config_io::store_path(&root, &config))?;
    let session = LocalSession::from_config(&config);
    tracing::debug!(root = %root.display(), "opened workspace");
    Ok(Workspace {
        config,
        store,
        session,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

/// Resolve `--topic` (id or name) for the current user
fn topic_id_arg(ws: &Workspace, topic: Option<&str>) -> Result<Option<String>, Box<dyn Error>> {
    match topic {
        Some(key) => {
            let user = ws.user()?;
            Ok(Some(topic_ops::lookup_topic(&ws.store, &user, key)?.id))
        }
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

fn cmd_topic(cmd: TopicCmd, ws: &mut Workspace, json: bool) -> CmdResult {
    let user = ws.user()?;
    let topic = match cmd.action {
        TopicAction::Add(args) => {
            topic_ops::create_topic(&mut ws.store, &user, &args.name, args.description, args.icon)?
        }
        TopicAction::List(args) => {
            let topics = ws
                .store
                .list_topics(&user, args.query.as_deref(), args.archived)?;
            if json {
                let out: Vec<TopicJson> = topics.iter().map(topic_to_json).collect();
                return print_json(&out);
            }
            for topic in &topics {
                println!("{}", format_topic_line(topic));
            }
            return Ok(());
        }
        TopicAction::Edit(args) => {
            let id = topic_ops::lookup_topic(&ws.store, &user, &args.topic)?.id;
            let edit = TopicEdit {
                name: args.name,
                description: args.description,
                icon: args.icon,
            };
            topic_ops::edit_topic(&mut ws.store, &id, edit)?
        }
        TopicAction::Archive(arg) => {
            let id = topic_ops::lookup_topic(&ws.store, &user, &arg.topic)?.id;
            topic_ops::set_archived(&mut ws.store, &id, true)?
        }
        TopicAction::Unarchive(arg) => {
            let id = topic_ops::lookup_topic(&ws.store, &user, &arg.topic)?.id;
            topic_ops::set_archived(&mut ws.store, &id, false)?
        }
        TopicAction::Pin(arg) => {
            let id = topic_ops::lookup_topic(&ws.store, &user, &arg.topic)?.id;
            topic_ops::set_pinned(&mut ws.store, &id, true)?
        }
        TopicAction::Unpin(arg) => {
            let id = topic_ops::lookup_topic(&ws.store, &user, &arg.topic)?.id;
            topic_ops::set_pinned(&mut ws.store, &id, false)?
        }
        TopicAction::Rm(arg) => {
            let topic = topic_ops::lookup_topic(&ws.store, &user, &arg.topic)?;
            topic_ops::delete_topic(&mut ws.store, &topic.id)?;
            println!("Deleted topic: {}", topic.name);
            return Ok(());
        }
    };

    if json {
        print_json(&topic_to_json(&topic))
    } else {
        println!("{}", format_topic_line(&topic));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

fn cmd_post(args: PostArgs, ws: &mut Workspace, json: bool) -> CmdResult {
    let context = topic_id_arg(ws, args.topic.as_deref())?;
    let mut composer = Composer::for_task(context);
    composer.set_input(args.text.as_str(), args.text.len());
    for url in &args.images {
        composer.append_image(url);
    }

    let submitted = match post_from_composer(&mut composer, &mut ws.store, &ws.session)? {
        Posted::Task(s) => s,
        Posted::Comment(_) => return Err("composer posted a comment".into()),
    };
    let task = ws
        .store
        .get_task(&submitted.task.id)?
        .ok_or_else(|| format!("task not found: {}", submitted.task.id))?;

    if json {
        return print_json(&PostedJson {
            topic: submitted.topic.name,
            task: task_to_json(&task, ws.preview_chars()),
        });
    }
    println!("Posted to {}:", submitted.topic.name);
    println!("{}", format_task_line(&task, ws.preview_chars()));
    Ok(())
}

fn cmd_tasks(args: TasksArgs, ws: &Workspace, json: bool) -> CmdResult {
    let user = ws.user()?;
    let topic = topic_ops::lookup_topic(&ws.store, &user, &args.topic)?;
    let mut split = task_ops::list_topic_tasks(&ws.store, &topic.id)?;
    if args.open {
        split.completed.clear();
    }

    let width = ws.preview_chars();
    if json {
        return print_json(&TaskListJson {
            topic: topic_to_json(&topic),
            incomplete: split.incomplete.iter().map(|t| task_to_json(t, width)).collect(),
            completed: split.completed.iter().map(|t| task_to_json(t, width)).collect(),
        });
    }

    println!("== {} ==", topic.name);
    for task in &split.incomplete {
        println!("{}", format_task_line(task, width));
    }
    if !split.completed.is_empty() {
        if !split.incomplete.is_empty() {
            println!();
        }
        println!("-- Completed --");
        for task in &split.completed {
            println!("{}", format_task_line(task, width));
        }
    }
    Ok(())
}

fn cmd_show(args: TaskIdArg, ws: &Workspace, json: bool) -> CmdResult {
    let task = task_ops::find_task(&ws.store, &args.id)?;
    let comments = ws.store.list_comments(&args.id)?;
    if json {
        return print_json(&task_detail_json(&task, &comments, ws.preview_chars()));
    }
    print_lines(&format_task_detail(&task, &comments));
    Ok(())
}

fn cmd_comment(args: CommentArgs, ws: &mut Workspace, json: bool) -> CmdResult {
    task_ops::find_task(&ws.store, &args.id)?;
    let mut composer = Composer::for_comment(args.id.as_str());
    composer.set_input(args.text.as_str(), args.text.len());

    let comment = match post_from_composer(&mut composer, &mut ws.store, &ws.session)? {
        Posted::Comment(c) => c,
        Posted::Task(_) => return Err("composer posted a task".into()),
    };
    if json {
        let author = ws.store.get_profile(&comment.user_id)?;
        return print_json(&comment_to_json(&CommentWithAuthor {
            comment,
            author,
        }));
    }
    println!("Commented on {}", args.id);
    Ok(())
}

fn cmd_edit(args: EditArgs, ws: &mut Workspace, json: bool) -> CmdResult {
    task_ops::edit_content(&mut ws.store, &args.id, &args.text)?;
    let task = task_ops::find_task(&ws.store, &args.id)?;
    if json {
        return print_json(&task_to_json(&task, ws.preview_chars()));
    }
    println!("{}", format_task_line(&task, ws.preview_chars()));
    Ok(())
}

fn cmd_toggle(args: ToggleArgs, ws: &mut Workspace, json: bool) -> CmdResult {
    let flag = TaskFlag::parse(&args.flag)
        .ok_or_else(|| format!("unknown flag '{}' (expected: done, pin, fav)", args.flag))?;
    let mut task = task_ops::find_task(&ws.store, &args.id)?;
    task_ops::toggle_flag(&mut ws.store, &mut task.task, flag)?;
    if json {
        return print_json(&task_to_json(&task, ws.preview_chars()));
    }
    println!("{}", format_task_line(&task, ws.preview_chars()));
    Ok(())
}

fn cmd_rm(args: TaskIdArg, ws: &mut Workspace) -> CmdResult {
    task_ops::delete_task(&mut ws.store, &args.id)?;
    println!("Deleted task {}", args.id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

fn cmd_tags(args: TagsArgs, ws: &Workspace, json: bool) -> CmdResult {
    let user = ws.user()?;
    let filter = match (topic_id_arg(ws, args.topic.as_deref())?, args.global) {
        (Some(id), _) => TagFilter::Scope(TagScope::Topic(id)),
        (None, true) => TagFilter::Scope(TagScope::Global),
        (None, false) => TagFilter::Any,
    };
    let tags = ws.store.list_tags(&user, &filter)?;
    // Parents may sit outside the filter; resolve names against everything
    let all = ws.store.list_tags(&user, &TagFilter::Any)?;

    if json {
        let out: Vec<TagJson> = tags.iter().map(|t| tag_to_json(t, &all)).collect();
        return print_json(&out);
    }
    for tag in &tags {
        println!("{}", format_tag_line(tag, &all));
    }
    Ok(())
}

fn cmd_tag(cmd: TagCmd, ws: &mut Workspace, json: bool) -> CmdResult {
    let user = ws.user()?;
    match cmd.action {
        TagAction::Edit(args) => {
            let scope = TagScope::from_topic_id(
                topic_id_arg(ws, args.target.topic.as_deref())?.as_deref(),
            );
            let tag = tag_ops::lookup_tag(&ws.store, &user, &args.target.tag, &scope)?;
            let emoji = if args.no_emoji {
                Some(None)
            } else {
                args.emoji.map(Some)
            };
            let edit = TagEdit {
                name: args.name,
                emoji,
                color: args.color,
            };
            let edited = tag_ops::edit_tag(&mut ws.store, &tag.id, edit)?;
            let all = ws.store.list_tags(&user, &TagFilter::Any)?;
            if json {
                return print_json(&tag_to_json(&edited, &all));
            }
            println!("{}", format_tag_line(&edited, &all));
        }
        TagAction::Rm(args) => {
            let scope =
                TagScope::from_topic_id(topic_id_arg(ws, args.topic.as_deref())?.as_deref());
            let tag = tag_ops::lookup_tag(&ws.store, &user, &args.tag, &scope)?;
            tag_ops::delete_tag(&mut ws.store, &tag.id)?;
            println!("Deleted tag: {}", tag.name);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Autocomplete
// ---------------------------------------------------------------------------

/// Load `args.text` into a composer and fill in the suggestion list for the
/// cursor position
fn composer_with_suggestions(args: &SuggestArgs, ws: &Workspace) -> Result<Composer, Box<dyn Error>> {
    let user = ws.user()?;
    let context = topic_id_arg(ws, args.topic.as_deref())?;
    let cursor = args
        .cursor
        .map_or(args.text.len(), |c| char_to_byte_offset(&args.text, c));

    let mut composer = Composer::for_task(context.clone());
    if let Some((ticket, query)) = composer.set_input(args.text.as_str(), cursor) {
        let scope = search::suggestion_scope(&ws.store, &user, &args.text, context.as_deref())?;
        let items = search::suggest(&ws.store, &user, &query, &scope, ws.config.suggest.limit())?;
        composer.apply_suggestions(ticket, items);
    }
    Ok(composer)
}

fn cmd_suggest(args: SuggestArgs, ws: &Workspace, json: bool) -> CmdResult {
    let composer = composer_with_suggestions(&args, ws)?;
    let state = composer.suggestions();
    if json {
        return print_json(&SuggestJson {
            active: state.query(),
            candidates: state.items(),
        });
    }
    if state.query().is_none() {
        println!("(no #tag or @topic at cursor)");
        return Ok(());
    }
    for (i, candidate) in state.items().iter().enumerate() {
        println!("{}", format_candidate(i, candidate));
    }
    Ok(())
}

fn cmd_complete(args: CompleteArgs, ws: &Workspace, json: bool) -> CmdResult {
    let mut composer = composer_with_suggestions(&args.input, ws)?;
    if composer.suggestions().query().is_none() {
        return Err("no #tag or @topic at cursor".into());
    }
    if !composer.pick(args.pick) {
        return Err(format!("no candidate at index {}", args.pick).into());
    }
    let out = CompleteJson {
        text: composer.text().to_string(),
        cursor: byte_to_char_offset(composer.text(), composer.cursor()),
    };
    if json {
        return print_json(&out);
    }
    println!("{}", out.text);
    println!("cursor: {}", out.cursor);
    Ok(())
}

// ---------------------------------------------------------------------------
// Cross-topic views
// ---------------------------------------------------------------------------

fn cmd_search(args: SearchArgs, ws: &Workspace, json: bool) -> CmdResult {
    let user = ws.user()?;
    let hits = search::search_tasks(&ws.store, &user, &args.keyword)?;
    let width = ws.preview_chars();
    if json {
        let out: Vec<TaskJson> = hits.iter().map(|t| task_to_json(t, width)).collect();
        return print_json(&out);
    }
    if hits.is_empty() {
        println!("no matches for \"{}\"", args.keyword);
    }
    for task in &hits {
        println!("{}", format_task_line(task, width));
    }
    Ok(())
}

fn cmd_ongoing(ws: &Workspace, json: bool) -> CmdResult {
    let user = ws.user()?;
    let tasks = ws.store.ongoing_tasks(&user)?;
    let width = ws.preview_chars();
    if json {
        let out: Vec<TaskJson> = tasks.iter().map(|t| task_to_json(t, width)).collect();
        return print_json(&out);
    }
    for task in &tasks {
        println!("{}", format_task_line(task, width));
    }
    Ok(())
}
