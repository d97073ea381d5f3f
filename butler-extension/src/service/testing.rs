//! Scripted in-memory job server for service and API tests

use async_trait::async_trait;
use butler_core::domain::address::{DISPLAY_NAME_SEPARATOR, JobAddress};
use butler_core::dto::build::Build;
use butler_core::dto::job::{FOLDER_CLASS, JobDetails, JobProperty, JobRef, ParameterDefinition};
use butler_core::dto::queue::{Executable, QueueItem};
use butler_core::server::{JobServerClient, ServerResult};
use butler_core::ServerError;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};

const BASE_URL: &str = "http://jenkins:8080/";
const JOB_CLASS: &str = "hudson.model.FreeStyleProject";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListRootJobs,
    GetJob,
    InvokeJob,
    GetQueueItem,
    GetBuild,
    CancelQueueItem,
    StopBuild,
}

/// How a queued run behaves once `invoke_job` picked it up
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub queue_id: i64,
    pub build_number: i64,
    /// Queue poll on which the executable shows up
    pub start_after_polls: u32,
    /// Build poll on which the build reports it is no longer building
    pub finish_on_poll: u32,
    pub result: String,
}

impl RunPlan {
    pub fn new(queue_id: i64, build_number: i64) -> Self {
        Self {
            queue_id,
            build_number,
            start_after_polls: 1,
            finish_on_poll: 2,
            result: "SUCCESS".to_string(),
        }
    }

    pub fn start_after_polls(mut self, polls: u32) -> Self {
        self.start_after_polls = polls;
        self
    }

    pub fn finish_on_poll(mut self, poll: u32) -> Self {
        self.finish_on_poll = poll;
        self
    }

    pub fn never_starts(self) -> Self {
        self.start_after_polls(u32::MAX)
    }

    pub fn result(mut self, result: &str) -> Self {
        self.result = result.to_string();
        self
    }
}

#[derive(Default)]
struct FakeState {
    root: Vec<JobRef>,
    jobs: HashMap<String, JobDetails>,
    pending: VecDeque<RunPlan>,
    runs: HashMap<i64, RunPlan>,
    queue_polls: HashMap<i64, u32>,
    build_polls: HashMap<i64, u32>,
    failing: HashSet<Operation>,
    cancel_rejected: bool,
    stop_rejected: bool,
    calls: Vec<Operation>,
    invocations: Vec<(JobAddress, HashMap<String, String>)>,
}

#[derive(Default)]
pub struct FakeJobServer {
    state: Mutex<FakeState>,
}

fn job_url(address: &JobAddress) -> String {
    let mut url = BASE_URL.to_string();
    for segment in address.segments() {
        url.push_str("job/");
        url.push_str(segment);
        url.push('/');
    }
    url
}

impl FakeJobServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a folder below `parent`
    pub fn with_folder(self, parent: &[&str], name: &str, display_name: &str) -> Self {
        self.insert(parent, name, display_name, FOLDER_CLASS, &[])
    }

    /// Adds a runnable job below `parent`
    pub fn with_job(self, parent: &[&str], name: &str, display_name: &str, parameters: &[&str]) -> Self {
        self.insert(parent, name, display_name, JOB_CLASS, parameters)
    }

    /// Queues a run plan for the next `invoke_job`
    pub fn schedule(self, plan: RunPlan) -> Self {
        self.state.lock().pending.push_back(plan);
        self
    }

    fn insert(self, parent: &[&str], name: &str, display_name: &str, class: &str, parameters: &[&str]) -> Self {
        let address = JobAddress::new(name, parent.iter().map(|p| p.to_string()).collect());
        let url = job_url(&address);

        {
            let mut state = self.state.lock();
            let mut labels: Vec<String> = Vec::new();
            for depth in 1..=parent.len() {
                let folder = parent[..depth].join("/");
                if let Some(details) = state.jobs.get(&folder) {
                    labels.push(details.label().to_string());
                }
            }
            labels.push(display_name.to_string());

            let reference = JobRef {
                class: class.to_string(),
                name: name.to_string(),
                url: url.clone(),
                color: None,
            };
            if parent.is_empty() {
                state.root.push(reference);
            } else if let Some(folder) = state.jobs.get_mut(&parent.join("/")) {
                folder.jobs.push(reference);
            }

            let property = if parameters.is_empty() {
                Vec::new()
            } else {
                vec![JobProperty {
                    parameter_definitions: parameters
                        .iter()
                        .map(|p| ParameterDefinition {
                            name: p.to_string(),
                            kind: Some("StringParameterDefinition".to_string()),
                        })
                        .collect(),
                }]
            };

            state.jobs.insert(
                address.full_name(),
                JobDetails {
                    class: class.to_string(),
                    name: name.to_string(),
                    display_name: display_name.to_string(),
                    full_name: address.full_name(),
                    full_display_name: labels.join(DISPLAY_NAME_SEPARATOR),
                    url,
                    jobs: Vec::new(),
                    property,
                },
            );
        }
        self
    }

    /// Makes every following call of `operation` fail with a transport error
    pub fn fail_on(&self, operation: Operation) {
        self.state.lock().failing.insert(operation);
    }

    pub fn recover(&self, operation: Operation) {
        self.state.lock().failing.remove(&operation);
    }

    pub fn reject_cancel(&self) {
        self.state.lock().cancel_rejected = true;
    }

    pub fn reject_stop(&self) {
        self.state.lock().stop_rejected = true;
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == operation).count()
    }

    pub fn invocations(&self) -> Vec<(JobAddress, HashMap<String, String>)> {
        self.state.lock().invocations.clone()
    }

    fn record(&self, operation: Operation) -> ServerResult<()> {
        let mut state = self.state.lock();
        state.calls.push(operation);
        if state.failing.contains(&operation) {
            return Err(ServerError::transport("connection reset by peer"));
        }
        Ok(())
    }
}

#[async_trait]
impl JobServerClient for FakeJobServer {
    async fn list_root_jobs(&self) -> ServerResult<Vec<JobRef>> {
        self.record(Operation::ListRootJobs)?;
        Ok(self.state.lock().root.clone())
    }

    async fn get_job(&self, name: &str, parent_path: &[String]) -> ServerResult<JobDetails> {
        self.record(Operation::GetJob)?;
        let full_name = JobAddress::new(name, parent_path.to_vec()).full_name();
        self.state
            .lock()
            .jobs
            .get(&full_name)
            .cloned()
            .ok_or(ServerError::NotFound(full_name))
    }

    async fn invoke_job(
        &self,
        job: &JobAddress,
        parameters: &HashMap<String, String>,
    ) -> ServerResult<i64> {
        self.record(Operation::InvokeJob)?;
        let mut state = self.state.lock();
        state.invocations.push((job.clone(), parameters.clone()));
        let plan = state
            .pending
            .pop_front()
            .ok_or_else(|| ServerError::rejected(500, "nothing scheduled"))?;
        let queue_id = plan.queue_id;
        state.runs.insert(queue_id, plan);
        Ok(queue_id)
    }

    async fn get_queue_item(&self, id: i64) -> ServerResult<QueueItem> {
        self.record(Operation::GetQueueItem)?;
        let mut state = self.state.lock();
        let plan = state
            .runs
            .get(&id)
            .cloned()
            .ok_or_else(|| ServerError::NotFound(format!("queue/item/{}", id)))?;
        let polls = state.queue_polls.entry(id).or_default();
        *polls += 1;

        let executable = (*polls >= plan.start_after_polls).then(|| Executable {
            number: plan.build_number,
            url: String::new(),
        });
        Ok(QueueItem {
            id,
            url: format!("queue/item/{}/", id),
            why: executable.is_none().then(|| "Waiting for next available executor".to_string()),
            cancelled: false,
            executable,
        })
    }

    async fn get_build(&self, job: &JobAddress, number: i64) -> ServerResult<Build> {
        self.record(Operation::GetBuild)?;
        let mut state = self.state.lock();
        let plan = state
            .runs
            .values()
            .find(|plan| plan.build_number == number)
            .cloned()
            .ok_or_else(|| ServerError::NotFound(format!("{}/{}", job.full_name(), number)))?;
        let polls = state.build_polls.entry(number).or_default();
        *polls += 1;

        let building = *polls < plan.finish_on_poll;
        Ok(Build {
            number,
            url: format!("{}{}/", job_url(job), number),
            building,
            result: (!building).then(|| plan.result.clone()),
            full_display_name: format!("{} #{}", job.full_name(), number),
        })
    }

    async fn cancel_queue_item(&self, _id: i64) -> ServerResult<bool> {
        self.record(Operation::CancelQueueItem)?;
        Ok(!self.state.lock().cancel_rejected)
    }

    async fn stop_build(&self, _build: &Build) -> ServerResult<bool> {
        self.record(Operation::StopBuild)?;
        Ok(!self.state.lock().stop_rejected)
    }
}
