use std::path::PathBuf;

use anyhow::Context;
use forum_client::{
    api::{Attachment, CommentId, SortField, ThreadId, UserId},
    Backend, Placement, ThreadView,
};
use forum_mock_server::{MockServer, Seed};

mod api;
mod prefs;
mod print;

use api::HttpBackend;
use prefs::FilePreferences;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Base URL of the forum API
    #[structopt(short, long, required_unless = "seed")]
    host: Option<String>,

    /// Run against an in-memory server loaded from this JSON seed file
    #[structopt(long, conflicts_with = "host")]
    seed: Option<PathBuf>,

    /// User to act as on the in-memory server
    #[structopt(long, default_value = "demo")]
    user: String,

    #[structopt(long, default_value = "forum-prefs.json")]
    prefs: PathBuf,

    #[structopt(long, default_value = "25")]
    page_size: usize,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Print a thread's comments
    Show {
        thread: String,

        /// Number of root pages to walk through
        #[structopt(long, default_value = "1")]
        pages: usize,

        /// How many levels of replies to expand
        #[structopt(long, default_value = "1")]
        depth: usize,
    },

    /// Select the sort field, selecting the current one flips the direction
    Sort {
        #[structopt(parse(try_from_str = parse_field))]
        field: SortField,
    },

    /// Post a comment
    Reply {
        thread: String,

        content: String,

        /// Comment to reply to
        #[structopt(long)]
        parent: Option<String>,

        /// File to attach
        #[structopt(long)]
        file: Option<PathBuf>,
    },

    /// Change a comment's content
    Edit {
        thread: String,
        comment: String,
        content: String,
    },

    /// Delete a comment and its replies
    Delete { thread: String, comment: String },
}

fn parse_field(s: &str) -> anyhow::Result<SortField> {
    SortField::from_query(s)
        .with_context(|| format!("unknown sort field {s:?}, expected userName, email or createdAt"))
}

fn content_type(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

fn read_attachment(path: &std::path::Path) -> anyhow::Result<Attachment> {
    let data = std::fs::read(path).with_context(|| format!("reading attachment {path:?}"))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("attachment path {path:?} has no usable file name"))?;
    Ok(Attachment {
        file_name: String::from(file_name),
        content_type: String::from(content_type(path)),
        data,
    })
}

async fn show<B: Backend>(
    view: &mut ThreadView<B, FilePreferences>,
    pages: usize,
    depth: usize,
) -> anyhow::Result<()> {
    view.load().await.context("loading first page")?;
    for _ in 1..pages {
        if !view.cursors().has_more() {
            break;
        }
        view.next_page().await.context("loading next page")?;
    }

    let mut level = view
        .roots()
        .iter()
        .map(|n| n.id().clone())
        .collect::<Vec<_>>();
    for _ in 0..depth {
        let with_replies = level
            .into_iter()
            .filter(|id| view.find(id).map(|n| n.reply_count > 0).unwrap_or(false))
            .collect::<Vec<_>>();
        let mut next = Vec::new();
        for (id, res) in view.load_next_all(&with_replies).await {
            match res {
                Ok(outcome) => {
                    if let Some(w) = outcome.warning {
                        eprintln!("warning: {w}");
                    }
                    view.expand(&id).await?;
                    if let Some(n) = view.find(&id) {
                        next.extend(n.children.iter().map(|c| c.id().clone()));
                    }
                }
                Err(e) => eprintln!("failed loading replies of {id}: {e}"),
            }
        }
        level = next;
    }

    println!(
        "thread {} - page {} - sorted by {} {}",
        view.thread(),
        view.cursors().page_number(),
        view.sort().field.as_query(),
        match view.sort().direction.is_ascending() {
            true => "ascending",
            false => "descending",
        },
    );
    print::forest(&mut std::io::stdout().lock(), view.roots(), 0)?;
    if view.cursors().has_more() {
        println!("(more pages available)");
    }
    Ok(())
}

async fn run<B: Backend>(backend: B, opt: Opt) -> anyhow::Result<()> {
    let prefs = FilePreferences::open(opt.prefs.clone())?;
    let view = |thread: String, prefs: FilePreferences| {
        ThreadView::new(backend, prefs, ThreadId(thread)).with_page_size(opt.page_size, opt.page_size)
    };

    match opt.cmd {
        Command::Show {
            thread,
            pages,
            depth,
        } => show(&mut view(thread, prefs), pages, depth).await?,
        Command::Sort { field } => {
            let mut c = forum_client::SortController::new(prefs);
            let sort = c.select(field);
            println!("now sorting by {} {:?}", sort.field.as_query(), sort.direction);
        }
        Command::Reply {
            thread,
            content,
            parent,
            file,
        } => {
            let attachment = file.as_deref().map(read_attachment).transpose()?;
            let mut v = view(thread, prefs);
            let created = v
                .create(parent.map(CommentId), content, attachment)
                .await
                .context("posting comment")?;
            println!("created comment {}", created.comment.id);
            if let Placement::ReloadFailed(e) = created.placement {
                eprintln!("warning: could not refresh the thread: {e}");
            }
        }
        Command::Edit {
            thread,
            comment,
            content,
        } => {
            let updated = view(thread, prefs)
                .update(&CommentId(comment), content)
                .await
                .context("editing comment")?;
            println!("updated comment {}", updated.id);
        }
        Command::Delete { thread, comment } => {
            view(thread, prefs)
                .delete(&CommentId(comment.clone()))
                .await
                .context("deleting comment")?;
            println!("deleted comment {comment}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let opt = <Opt as structopt::StructOpt>::from_args();

    match (opt.host.clone(), opt.seed.clone()) {
        (_, Some(path)) => {
            let seed = std::fs::read_to_string(&path)
                .with_context(|| format!("reading seed file {path:?}"))?;
            let server = MockServer::from_seed(Seed::from_json(&seed)?)
                .context("loading seed into the in-memory server")?;
            let backend = server.session(UserId(opt.user.clone()));
            run(backend, opt).await
        }
        (Some(host), None) => {
            let token = std::env::var("FORUM_TOKEN").ok();
            let backend = HttpBackend::new(&host, token);
            run(backend, opt).await
        }
        (None, None) => anyhow::bail!("either --host or --seed is required"),
    }
}
