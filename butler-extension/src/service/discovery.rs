//! Job-tree discovery
//!
//! `TreeWalker` flattens the remote folder tree into runnable jobs,
//! `AttributeProjector` turns them into targets and `DiscoveryService` keeps
//! the last successful result around for the HTTP surface.

use butler_core::domain::job::DiscoveredJob;
use butler_core::domain::target::{TARGET_TYPE_JOB, Target, attributes};
use butler_core::dto::job::JobKind;
use butler_core::{DiscoveryError, JobAddress, JobServerClient};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

/// A tree node that still has to be resolved
struct Pending {
    address: JobAddress,
    kind: JobKind,
    /// Display names of the enclosing folders, outermost first
    folder_labels: Vec<String>,
}

/// Depth-first walk over the remote job tree
pub struct TreeWalker {
    client: Arc<dyn JobServerClient>,
}

impl TreeWalker {
    pub fn new(client: Arc<dyn JobServerClient>) -> Self {
        Self { client }
    }

    /// Resolves every runnable job in pre-order
    ///
    /// Any failed remote call aborts the whole walk.
    pub async fn walk(&self) -> Result<Vec<DiscoveredJob>, DiscoveryError> {
        let roots = self
            .client
            .list_root_jobs()
            .await
            .map_err(DiscoveryError::Fetch)?;

        // Children are pushed in reverse so they pop in listing order
        let mut stack: Vec<Pending> = roots
            .iter()
            .rev()
            .map(|job| Pending {
                address: JobAddress::root(job.name.clone()),
                kind: job.kind(),
                folder_labels: Vec::new(),
            })
            .collect();

        let mut jobs = Vec::new();
        while let Some(pending) = stack.pop() {
            let details = self
                .client
                .get_job(&pending.address.name, &pending.address.parent_path)
                .await
                .map_err(DiscoveryError::Fetch)?;

            match pending.kind {
                JobKind::Folder => {
                    tracing::debug!(
                        folder = %pending.address,
                        children = details.jobs.len(),
                        "Descending into folder"
                    );
                    let mut labels = pending.folder_labels.clone();
                    labels.push(details.label().to_string());
                    for child in details.jobs.iter().rev() {
                        stack.push(Pending {
                            address: pending.address.child(child.name.clone()),
                            kind: child.kind(),
                            folder_labels: labels.clone(),
                        });
                    }
                }
                JobKind::Job => {
                    jobs.push(DiscoveredJob::from_details(
                        pending.address,
                        &details,
                        &pending.folder_labels,
                    ));
                }
            }
        }

        Ok(jobs)
    }
}

/// Maps discovered jobs to targets, dropping excluded attribute keys
#[derive(Debug, Clone, Default)]
pub struct AttributeProjector {
    excluded: HashSet<String>,
}

impl AttributeProjector {
    pub fn new(excluded: impl IntoIterator<Item = String>) -> Self {
        Self {
            excluded: excluded
                .into_iter()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
                .collect(),
        }
    }

    pub fn project(&self, jobs: &[DiscoveredJob]) -> Vec<Target> {
        jobs.iter().map(|job| self.project_one(job)).collect()
    }

    fn project_one(&self, job: &DiscoveredJob) -> Target {
        let mut attrs: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut put = |key: &str, value: &str| {
            if !value.is_empty() {
                attrs.insert(key.to_string(), vec![value.to_string()]);
            }
        };
        put(attributes::NAME, &job.address.name);
        put(attributes::FULL_NAME, &job.full_name);
        put(attributes::FULL_DISPLAY_NAME, &job.full_display_name);
        put(attributes::URL, &job.url);
        put(attributes::CLASS, &job.class);

        if !job.parameter_names.is_empty() {
            attrs.insert(attributes::PARAMETER.to_string(), job.parameter_names.clone());
        }

        attrs.retain(|key, _| !self.excluded.contains(key));

        Target {
            id: if job.url.is_empty() {
                job.full_name.clone()
            } else {
                job.url.clone()
            },
            target_type: TARGET_TYPE_JOB.to_string(),
            label: job.full_display_name.clone(),
            attributes: attrs,
        }
    }
}

/// Cached discovery with periodic background refresh
pub struct DiscoveryService {
    walker: TreeWalker,
    projector: AttributeProjector,
    cache: RwLock<Vec<Target>>,
}

impl DiscoveryService {
    pub fn new(client: Arc<dyn JobServerClient>, excluded: Vec<String>) -> Self {
        Self {
            walker: TreeWalker::new(client),
            projector: AttributeProjector::new(excluded),
            cache: RwLock::new(Vec::new()),
        }
    }

    /// Walks the tree, projects and caches the targets
    ///
    /// Targets are sorted by their full display name. A failed run keeps the
    /// previous cache.
    pub async fn discover_now(&self) -> Result<Vec<Target>, DiscoveryError> {
        let jobs = self.walker.walk().await?;
        let mut targets = self.projector.project(&jobs);
        targets.sort_by(|a, b| a.label.cmp(&b.label));

        *self.cache.write().await = targets.clone();
        tracing::info!(targets = targets.len(), "Discovered jobs");
        Ok(targets)
    }

    /// Targets of the last successful discovery run
    pub async fn targets(&self) -> Vec<Target> {
        self.cache.read().await.clone()
    }

    /// Refreshes right away and then on every interval tick
    pub fn spawn_refresh(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = refresh_ticker(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = self.discover_now().await {
                    tracing::warn!(error = %e, "Job discovery failed, keeping previous targets");
                }
            }
        })
    }
}

/// Ticks immediately; a slow walk pushes the next tick back instead of bursting
fn refresh_ticker(interval: Duration) -> Interval {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{FakeJobServer, Operation};

    fn tree() -> FakeJobServer {
        FakeJobServer::new()
            .with_job(&[], "my-job", "my-job", &["Are you sure?", "Say something"])
            .with_folder(&[], "Folder", "This is a folder")
            .with_job(&["Folder"], "Folder-project", "Folder-project", &[])
            .with_folder(&["Folder"], "Nested", "Nested")
            .with_job(&["Folder", "Nested"], "deep", "Deep job", &["x"])
            .with_job(&[], "another-job", "Another job", &[])
    }

    #[tokio::test]
    async fn test_walk_is_pre_order() {
        let walker = TreeWalker::new(Arc::new(tree()));

        let jobs = walker.walk().await.unwrap();
        let names: Vec<_> = jobs.iter().map(|j| j.full_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["my-job", "Folder/Folder-project", "Folder/Nested/deep", "another-job"]
        );

        let deep = &jobs[2];
        assert_eq!(deep.address.parent_path, vec!["Folder", "Nested"]);
        assert_eq!(deep.full_display_name, "This is a folder » Nested » Deep job");
        assert_eq!(deep.parameter_names, vec!["x"]);
    }

    #[tokio::test]
    async fn test_walk_empty_tree() {
        let walker = TreeWalker::new(Arc::new(FakeJobServer::new()));
        assert!(walker.walk().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_walk_fails_fast() {
        let server = Arc::new(tree());
        server.fail_on(Operation::GetJob);
        let walker = TreeWalker::new(server.clone());

        let err = walker.walk().await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to fetch jobs."));
        assert_eq!(server.count(Operation::GetJob), 1);
    }

    #[tokio::test]
    async fn test_project_attributes() {
        let jobs = TreeWalker::new(Arc::new(tree())).walk().await.unwrap();
        let targets = AttributeProjector::default().project(&jobs);

        let my_job = &targets[0];
        assert_eq!(my_job.id, "http://jenkins:8080/job/my-job/");
        assert_eq!(my_job.target_type, TARGET_TYPE_JOB);
        assert_eq!(my_job.label, "my-job");
        assert_eq!(my_job.attribute(attributes::NAME), Some("my-job"));
        assert_eq!(my_job.attribute(attributes::CLASS), Some("hudson.model.FreeStyleProject"));
        assert_eq!(
            my_job.attributes[attributes::PARAMETER],
            vec!["Are you sure?", "Say something"]
        );

        let folder_project = &targets[1];
        assert_eq!(folder_project.attribute(attributes::FULL_NAME), Some("Folder/Folder-project"));
        assert_eq!(
            folder_project.attribute(attributes::FULL_DISPLAY_NAME),
            Some("This is a folder » Folder-project")
        );
        assert!(!folder_project.attributes.contains_key(attributes::PARAMETER));
    }

    #[test]
    fn test_project_excludes_by_key() {
        let job = DiscoveredJob {
            address: JobAddress::root("my-job"),
            full_name: "my-job".to_string(),
            full_display_name: "my-job".to_string(),
            url: String::new(),
            class: "hudson.model.FreeStyleProject".to_string(),
            parameter_names: vec!["jenkins.job.url".to_string()],
        };
        let projector = AttributeProjector::new(vec![
            "jenkins.job.url".to_string(),
            " jenkins.job.class".to_string(),
            "jenkins.job.name.full.display".to_string(),
        ]);

        let target = &projector.project(&[job])[0];
        assert_eq!(target.id, "my-job");
        let keys: Vec<_> = target.attributes.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["jenkins.job.name", "jenkins.job.name.full", "jenkins.job.parameter"]
        );
        assert_eq!(target.attributes["jenkins.job.parameter"], vec!["jenkins.job.url"]);
    }

    #[tokio::test]
    async fn test_discover_now_sorts_and_caches() {
        let service = DiscoveryService::new(Arc::new(tree()), Vec::new());
        assert!(service.targets().await.is_empty());

        let targets = service.discover_now().await.unwrap();
        let labels: Vec<_> = targets.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Another job",
                "This is a folder » Folder-project",
                "This is a folder » Nested » Deep job",
                "my-job",
            ]
        );
        assert_eq!(service.targets().await, targets);
    }

    #[tokio::test]
    async fn test_failed_discovery_keeps_cache() {
        let server = Arc::new(tree());
        let service = DiscoveryService::new(server.clone(), Vec::new());
        let first = service.discover_now().await.unwrap();

        server.fail_on(Operation::ListRootJobs);
        assert!(service.discover_now().await.is_err());
        assert_eq!(service.targets().await, first);
    }

    #[tokio::test]
    async fn test_spawn_refresh_runs_immediately() {
        let service = Arc::new(DiscoveryService::new(Arc::new(tree()), Vec::new()));
        let handle = service.clone().spawn_refresh(Duration::from_secs(300));

        for _ in 0..100 {
            if !service.targets().await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(service.targets().await.len(), 4);
        handle.abort();
    }

    #[tokio::test]
    async fn test_refresh_ticker_delays_missed_ticks() {
        let ticker = refresh_ticker(Duration::from_secs(300));
        assert_eq!(ticker.missed_tick_behavior(), MissedTickBehavior::Delay);
        assert_eq!(ticker.period(), Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_repeated_walks_agree() {
        let server = Arc::new(tree());
        let walker = TreeWalker::new(server.clone());

        let mut first = walker.walk().await.unwrap();
        let mut second = walker.walk().await.unwrap();
        first.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        second.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        assert_eq!(first, second);

        let service = DiscoveryService::new(server, Vec::new());
        let ids = |targets: Vec<Target>| targets.into_iter().map(|t| t.id).collect::<HashSet<_>>();
        let once = ids(service.discover_now().await.unwrap());
        let twice = ids(service.discover_now().await.unwrap());
        assert_eq!(once.len(), 4);
        assert_eq!(once, twice);
    }
}
