use core::fmt::{Display, Formatter};
use core::str::FromStr;
use ohno::bail;
use std::sync::Arc;

/// The organization/repository pair whose issues are exported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSpec {
    owner: Arc<str>,
    repo: Arc<str>,
}

impl RepoSpec {
    pub fn new(owner: &str, repo: &str) -> crate::Result<Self> {
        let owner = owner.trim();
        let repo = repo.trim().trim_end_matches(".git");

        if owner.is_empty() || repo.is_empty() {
            bail!("invalid repository '{owner}/{repo}': empty organization or repository name");
        }

        if owner.contains('/') || repo.contains('/') {
            bail!("invalid repository '{owner}/{repo}': names must not contain '/'");
        }

        Ok(Self {
            owner: Arc::from(owner),
            repo: Arc::from(repo),
        })
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl FromStr for RepoSpec {
    type Err = ohno::AppError;

    fn from_str(s: &str) -> crate::Result<Self> {
        let Some((owner, repo)) = s.split_once('/') else {
            bail!("invalid repository '{s}': expected 'organization/repository'");
        };

        Self::new(owner, repo)
    }
}

impl Display for RepoSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
