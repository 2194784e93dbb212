//! In-process driver built on libgit2.

use std::path::{Path, PathBuf};

use git2::{ErrorCode, IndexAddOption, Repository, Signature, Time};
use greenify_core::{AuthorConfig, CommitTimestamp, GreenifyError};
use tracing::{debug, info};

use crate::content::ContentWriter;
use crate::driver::{reset_repository_dir, CommitOptions, RepositoryDriver};

fn git_err(operation: &'static str) -> impl Fn(git2::Error) -> GreenifyError {
    move |e| GreenifyError::repository(operation, e.message())
}

struct OpenRepository {
    repo: Repository,
    workdir: PathBuf,
    identity: AuthorConfig,
}

/// Writes commits through `git2` without spawning processes.
///
/// The author identity comes from [`CommitOptions::author`] or, failing
/// that, from `user.name` / `user.email` in the git configuration visible to
/// the new repository.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use greenify_repo::{CommitOptions, Git2Driver, RepositoryDriver};
///
/// let mut driver = Git2Driver::new(CommitOptions::default());
/// driver.initialize_repository(Path::new("MyProject")).unwrap();
/// ```
pub struct Git2Driver {
    options: CommitOptions,
    content: ContentWriter,
    open: Option<OpenRepository>,
}

impl Git2Driver {
    pub fn new(options: CommitOptions) -> Self {
        let content = ContentWriter::new(options.file_name.clone(), options.content_seed);
        Self {
            options,
            content,
            open: None,
        }
    }
}

fn resolve_identity(
    repo: &Repository,
    configured: Option<&AuthorConfig>,
) -> Result<AuthorConfig, GreenifyError> {
    if let Some(author) = configured {
        return Ok(author.clone());
    }

    let config = repo.config().map_err(git_err("identity"))?;
    let name = config.get_string("user.name");
    let email = config.get_string("user.email");
    match (name, email) {
        (Ok(name), Ok(email)) => Ok(AuthorConfig { name, email }),
        _ => Err(GreenifyError::repository(
            "identity",
            "no author configured: set git user.name and user.email, or add an \"author\" entry to the config file",
        )),
    }
}

impl RepositoryDriver for Git2Driver {
    fn initialize_repository(&mut self, path: &Path) -> Result<(), GreenifyError> {
        reset_repository_dir(path)?;
        let repo = Repository::init(path).map_err(git_err("init"))?;
        let identity = resolve_identity(&repo, self.options.author.as_ref())?;
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| path.to_path_buf());

        info!(path = %workdir.display(), author = %identity.name, "initialized repository");
        self.open = Some(OpenRepository {
            repo,
            workdir,
            identity,
        });
        Ok(())
    }

    fn commit_at(&mut self, timestamp: &CommitTimestamp) -> Result<(), GreenifyError> {
        let Self {
            options,
            content,
            open,
        } = self;
        let open = open
            .as_ref()
            .ok_or_else(|| GreenifyError::repository("commit", "repository not initialized"))?;
        let repo = &open.repo;

        content.write(&open.workdir)?;

        let mut index = repo.index().map_err(git_err("add"))?;
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .map_err(git_err("add"))?;
        index.write().map_err(git_err("add"))?;
        let tree_id = index.write_tree().map_err(git_err("add"))?;
        let tree = repo.find_tree(tree_id).map_err(git_err("add"))?;

        let time = Time::new(timestamp.timestamp(), timestamp.offset().local_minus_utc() / 60);
        let signature = Signature::new(&open.identity.name, &open.identity.email, &time)
            .map_err(git_err("commit"))?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit().map_err(git_err("commit"))?),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => None,
            Err(e) => return Err(git_err("commit")(e)),
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                &options.message,
                &tree,
                &parents,
            )
            .map_err(git_err("commit"))?;
        debug!(%oid, %timestamp, "created commit");
        Ok(())
    }
}
