use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tf", about = concat!("topicflow v", env!("CARGO_PKG_VERSION"), " - topics and tasks with #tags and @mentions"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create .topicflow/ in the current directory
    Init(InitArgs),
    /// Manage topics
    Topic(TopicCmd),
    /// Post a task; `@topic` and `#tag` tokens are resolved
    Post(PostArgs),
    /// List a topic's tasks
    Tasks(TasksArgs),
    /// Show a task with its tags and comments
    Show(TaskIdArg),
    /// Comment on a task
    Comment(CommentArgs),
    /// Replace a task's text (tags are not re-derived)
    Edit(EditArgs),
    /// Flip a task flag: done, pin or fav
    Toggle(ToggleArgs),
    /// Delete a task
    Rm(TaskIdArg),
    /// List tags
    Tags(TagsArgs),
    /// Edit or delete a tag
    Tag(TagCmd),
    /// Show autocomplete candidates at the cursor
    Suggest(SuggestArgs),
    /// Accept an autocomplete candidate and print the new text
    Complete(CompleteArgs),
    /// Search task text across topics
    Search(SearchArgs),
    /// Incomplete tasks in active topics
    Ongoing,
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// User id to post as (default: a new random id)
    #[arg(long)]
    pub user: Option<String>,
    /// Display name shown on comments
    #[arg(long)]
    pub nickname: Option<String>,
}

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TopicCmd {
    #[command(subcommand)]
    pub action: TopicAction,
}

#[derive(Subcommand)]
pub enum TopicAction {
    /// Create a topic
    Add(TopicAddArgs),
    /// List topics, pinned first
    List(TopicListArgs),
    /// Change name, description or icon
    Edit(TopicEditArgs),
    /// Hide a topic from lists and mentions
    Archive(TopicArg),
    /// Bring an archived topic back
    Unarchive(TopicArg),
    /// Pin a topic to the top
    Pin(TopicArg),
    /// Unpin a topic
    Unpin(TopicArg),
    /// Delete a topic and all of its tasks
    Rm(TopicArg),
}

#[derive(Args)]
pub struct TopicAddArgs {
    pub name: String,
    #[arg(long)]
    pub description: Option<String>,
    /// Emoji or image URL
    #[arg(long)]
    pub icon: Option<String>,
}

#[derive(Args)]
pub struct TopicListArgs {
    /// List archived topics instead
    #[arg(long)]
    pub archived: bool,
    /// Filter by name or description
    #[arg(long, short)]
    pub query: Option<String>,
}

#[derive(Args)]
pub struct TopicEditArgs {
    /// Topic id or name
    pub topic: String,
    #[arg(long)]
    pub name: Option<String>,
    /// New description; empty clears it
    #[arg(long)]
    pub description: Option<String>,
    /// New icon; empty clears it
    #[arg(long)]
    pub icon: Option<String>,
}

#[derive(Args)]
pub struct TopicArg {
    /// Topic id or name
    pub topic: String,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct PostArgs {
    /// Task text. Markdown images and links are rewritten.
    pub text: String,
    /// Topic to post into when the text has no @mention
    #[arg(long, short)]
    pub topic: Option<String>,
    /// Append an uploaded image by URL (repeatable)
    #[arg(long = "image")]
    pub images: Vec<String>,
}

#[derive(Args)]
pub struct TasksArgs {
    /// Topic id or name
    pub topic: String,
    /// Hide completed tasks
    #[arg(long)]
    pub open: bool,
}

#[derive(Args)]
pub struct TaskIdArg {
    pub id: String,
}

#[derive(Args)]
pub struct CommentArgs {
    /// Task id
    pub id: String,
    pub text: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task id
    pub id: String,
    pub text: String,
}

#[derive(Args)]
pub struct ToggleArgs {
    /// Task id
    pub id: String,
    /// done, pin or fav
    pub flag: String,
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TagsArgs {
    /// Only tags scoped to this topic (id or name)
    #[arg(long, conflicts_with = "global")]
    pub topic: Option<String>,
    /// Only global tags
    #[arg(long)]
    pub global: bool,
}

#[derive(Args)]
pub struct TagCmd {
    #[command(subcommand)]
    pub action: TagAction,
}

#[derive(Subcommand)]
pub enum TagAction {
    /// Rename a tag or change its emoji or colour
    Edit(TagEditArgs),
    /// Delete a tag (children of a parent go with it)
    Rm(TagRefArgs),
}

#[derive(Args)]
pub struct TagRefArgs {
    /// Tag id, name or parent/child
    pub tag: String,
    /// Topic the tag is scoped to (id or name); global when omitted
    #[arg(long)]
    pub topic: Option<String>,
}

#[derive(Args)]
pub struct TagEditArgs {
    #[command(flatten)]
    pub target: TagRefArgs,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, conflicts_with = "no_emoji")]
    pub emoji: Option<String>,
    /// Remove the emoji
    #[arg(long)]
    pub no_emoji: bool,
    /// #RRGGBB
    #[arg(long)]
    pub color: Option<String>,
}

// ---------------------------------------------------------------------------
// Autocomplete
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SuggestArgs {
    /// Text in the composer
    pub text: String,
    /// Cursor position in characters (default: end of text)
    #[arg(long)]
    pub cursor: Option<usize>,
    /// Topic the composer belongs to (id or name)
    #[arg(long, short)]
    pub topic: Option<String>,
}

#[derive(Args)]
pub struct CompleteArgs {
    #[command(flatten)]
    pub input: SuggestArgs,
    /// Index of the candidate to accept
    #[arg(long, default_value = "0")]
    pub pick: usize,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SearchArgs {
    pub keyword: String,
}
